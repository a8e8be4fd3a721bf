use std::{env::current_dir, ffi::OsStr, path::PathBuf};

use structopt::StructOpt;

pub fn package_dir(path: &OsStr) -> PathBuf {
    if path == "." {
        current_dir().unwrap_or_else(|_| PathBuf::from("."))
    } else {
        PathBuf::from(path)
    }
}

#[derive(StructOpt, Debug)]
pub struct File {
    /// The source file to read
    #[structopt(parse(from_os_str))]
    pub path: PathBuf,
}

#[derive(StructOpt, Debug)]
pub struct Package {
    /// Where to start looking for `aether.toml`
    #[structopt(default_value = ".", parse(from_os_str = package_dir))]
    pub path: PathBuf,
}

#[derive(StructOpt, Debug)]
pub enum Command {
    /// Prints the tokens of a single file
    Lex(File),
    /// Prints the expanded IR of a file and everything it includes
    Parse(File),
    /// Compiles the entry point of the package containing a directory
    Build(Package),
}

#[derive(StructOpt, Debug)]
#[structopt(name = "Aether", bin_name = "aether", about)]
pub struct Aether {
    /// Log inclusions and file scans (-v), or macro expansion too (-vv)
    #[structopt(short, long, parse(from_occurrences), global = true)]
    pub verbose: u8,

    #[structopt(subcommand)]
    pub command: Command,
}
