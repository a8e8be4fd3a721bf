use colored::*;
use log::{Level, LevelFilter, Log, Metadata, Record};

pub enum Kind {
    Info,
    Success,
    Warn,
    Fatal,
    Trace,
}

pub struct Status(pub Kind, pub &'static str);

impl Status {
    pub fn info() -> Status { Status(Kind::Info, "Info") }

    pub fn success() -> Status { Status(Kind::Success, "Success") }

    pub fn warn() -> Status { Status(Kind::Warn, "Warning") }

    pub fn fatal() -> Status { Status(Kind::Fatal, "Fatal") }

    pub fn trace() -> Status { Status(Kind::Trace, "Trace") }

    fn tag(&self) -> ColoredString {
        match self.0 {
            Kind::Info => self.1.blue(),
            Kind::Success => self.1.green(),
            Kind::Warn => self.1.yellow(),
            Kind::Fatal => self.1.red(),
            Kind::Trace => self.1.dimmed(),
        }
        .bold()
    }

    fn multiline(&self, lines: Vec<&str>) {
        eprint!("\n{} ", self.tag());
        for line in lines {
            eprintln!("{}", line);
        }
        eprintln!()
    }

    pub fn log(&self, message: &str) {
        let lines = message.lines().collect::<Vec<&str>>();

        if lines.len() > 1 {
            self.multiline(lines);
        } else {
            eprintln!("{:>12} {}", self.tag(), message);
        }
    }
}

/// Routes the library's `log` records through `Status` tags.
pub struct StatusLogger;

static LOGGER: StatusLogger = StatusLogger;

impl StatusLogger {
    /// Installs the logger. `verbosity` counts `-v` flags:
    /// none shows warnings, one adds debug output, two adds tracing.
    pub fn init(verbosity: u8) {
        let level = match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        // a logger may only be installed once; a second call keeps the first
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
    }
}

impl Log for StatusLogger {
    fn enabled(&self, metadata: &Metadata) -> bool { metadata.level() <= log::max_level() }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let status = match record.level() {
            Level::Error => Status::fatal(),
            Level::Warn => Status::warn(),
            Level::Info | Level::Debug => Status::info(),
            Level::Trace => Status::trace(),
        };
        status.log(&record.args().to_string());
    }

    fn flush(&self) {}
}
