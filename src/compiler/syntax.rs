use std::fmt;

use crate::common::span::{Position, Span};

/// Represents a note attached to a Syntax error,
/// i.e. a location in source code with an optional
/// specific hint or tip corresponding this this specific location
#[derive(Debug, PartialEq, Eq)]
pub struct Note {
    pub span: Span,
    pub hint: Option<String>,
}

impl Note {
    pub fn new(span: Span) -> Note { Note { span, hint: None } }

    pub fn new_with_hint(hint: &str, span: &Span) -> Note {
        Note {
            span: span.clone(),
            hint: Some(hint.to_string()),
        }
    }
}

/// Which stage of the front end gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No lexical rule matched, or a string literal was never closed.
    Lex,
    /// A token outside the set a grammar rule accepts.
    Syntax,
    /// No declared macro matches an invocation's name and arity.
    Macro,
    /// A variadic argument run used somewhere it can't be spliced.
    Unpack,
    /// An included file could not be read.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Lex => "Lex",
            ErrorKind::Syntax => "Syntax",
            ErrorKind::Macro => "Macro",
            ErrorKind::Unpack => "Unpack",
            ErrorKind::Io => "IO",
        };

        write!(f, "{}", name)
    }
}

/// Represents a static error found while turning source into IR.
/// Every error is fatal to the whole compile.
/// Ideally, each note included should have a distinct `Span` and hint.
/// Usually, one `Note` per error is enough.
#[derive(Debug, PartialEq, Eq)]
pub struct Syntax {
    pub kind:   ErrorKind,
    pub reason: String,
    pub notes:  Vec<Note>,
}

impl Syntax {
    /// Creates a new static error with a single note that does not have a
    /// hint.
    pub fn error(kind: ErrorKind, reason: &str, span: &Span) -> Syntax {
        Syntax::error_with_note(kind, reason, Note::new(span.clone()))
    }

    /// Creates a new static error with a single note that may or may not
    /// have a hint.
    pub fn error_with_note(kind: ErrorKind, reason: &str, note: Note) -> Syntax {
        Syntax {
            kind,
            reason: reason.to_string(),
            notes: vec![note],
        }
    }

    /// Creates an error without a note. This error will not
    /// contain any location information, so only use it when there is
    /// no source to point at.
    pub fn error_no_note(kind: ErrorKind, reason: &str) -> Syntax {
        Syntax {
            kind,
            reason: reason.to_string(),
            notes: vec![],
        }
    }

    /// The file and position of the first note, if any.
    pub fn location(&self) -> Option<(String, Position)> {
        self.notes
            .first()
            .map(|note| (note.span.path(), note.span.position()))
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for note in self.notes.iter() {
            let formatted = note.span.format();

            match (&note.hint, formatted.carets()) {
                (Some(hint), Some(carets)) => {
                    let padding = " ".repeat(formatted.gutter_padding());
                    writeln!(
                        f,
                        "In {}:{}:{}",
                        formatted.path,
                        formatted.start + 1,
                        formatted.start_col + 1
                    )?;
                    writeln!(f, "{} |", padding)?;
                    writeln!(
                        f,
                        "{:<width$} | {}",
                        formatted.start + 1,
                        formatted.lines[0],
                        width = formatted.gutter_padding()
                    )?;
                    writeln!(
                        f,
                        "{} | {}{} note: {}",
                        padding,
                        " ".repeat(formatted.start_col),
                        "^".repeat(carets),
                        hint,
                    )?;
                    writeln!(f, "{} |", padding)?;
                },
                (Some(hint), None) => {
                    write!(f, "{}", formatted)?;
                    writeln!(f, "{} |- note: {}", " ".repeat(formatted.gutter_padding()), hint)?;
                },
                (None, _) => write!(f, "{}", formatted)?,
            }
        }
        write!(f, "{} Error: {}", self.kind, self.reason)
    }
}
