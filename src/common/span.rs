use std::{
    fmt::{self, Debug, Display, Formatter},
    rc::Rc,
};

use crate::common::source::Source;

/// A zero-based row and column in a source file.
/// Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Position { Position { row, col } }
}

impl Display for Position {
    /// Positions are displayed one-based, the way editors count.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row + 1, self.col + 1)
    }
}

/// A `Span` refers to a section of a source,
/// much like a `&str`, but with a reference to a `Source` rather than a
/// `String`. A `Span` is meant to be paired with other datastructures,
/// to be used during error reporting.
#[derive(Clone, Eq, PartialEq)]
pub struct Span {
    source: Rc<Source>,
    offset: usize,
    length: usize,
}

impl Span {
    /// Create a new `Span` from a byte offset with a byte length.
    pub fn new(source: &Rc<Source>, offset: usize, length: usize) -> Span {
        Span {
            source: Rc::clone(source),
            offset,
            length,
        }
    }

    /// A `Span` that points at a specific point in the source.
    /// Has a length of `0`.
    pub fn point(source: &Rc<Source>, offset: usize) -> Span {
        Span::new(source, offset, 0)
    }

    /// A zero-length `Span` just past the last character of a source,
    /// used to report an unexpected end of input.
    pub fn eof(source: &Rc<Source>) -> Span {
        Span::point(source, source.contents.len())
    }

    /// Return the index of the end of the `Span`.
    pub fn end(&self) -> usize { self.offset + self.length }

    pub fn len(&self) -> usize { self.length }

    pub fn is_empty(&self) -> bool { self.length == 0 }

    pub fn source(&self) -> &Rc<Source> { &self.source }

    /// Returns the contents of a `Span`.
    pub fn contents(&self) -> String {
        self.source.contents[self.offset..self.end()].to_string()
    }

    pub fn path(&self) -> String {
        self.source.path.to_string_lossy().to_string()
    }

    /// The zero-based line the byte `index` falls on.
    pub fn line(&self, index: usize) -> usize {
        self.source.contents[..index].matches('\n').count()
    }

    /// The zero-based character column of the byte `index`.
    pub fn col(&self, index: usize) -> usize {
        let before = &self.source.contents[..index];
        match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count(),
            None => before.chars().count(),
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line(self.offset), self.col(self.offset))
    }

    pub fn lines(&self) -> Vec<String> {
        let start_line = self.line(self.offset);
        let end_line = self.line(self.end());
        self.source
            .contents
            .split('\n')
            .skip(start_line)
            .take(end_line - start_line + 1)
            .map(|s| s.trim_end_matches('\r').to_string())
            .collect()
    }

    pub fn format(&self) -> FormattedSpan {
        FormattedSpan {
            path:      self.path(),
            start:     self.line(self.offset),
            lines:     self.lines(),
            start_col: self.col(self.offset),
            end_col:   self.col(self.end()),
        }
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Span")
            .field("contents", &self.contents())
            .field("start", &self.offset)
            .field("end", &self.end())
            .finish()
    }
}

impl Display for Span {
    /// Given a `Span`, `fmt` will print out where the `Span` occurs in
    /// its source. Single-line `Span`s:
    /// ```plain
    /// 12 | (let x (blatant error)
    ///    |        ^^^^^^^^^^^^^^^
    /// ```
    /// Multi-line `Span`s:
    /// ```plain
    /// 12 > (fun f [x]
    /// 13 >   (another error))
    /// ```
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// Represents a formatted span, ready to be displayed.
/// Contains information about where the span is from,
/// and where in the text it starts and ends
/// relative to the lines in the source.
pub struct FormattedSpan {
    pub path:      String,
    pub start:     usize,
    pub lines:     Vec<String>,
    pub start_col: usize,
    pub end_col:   usize,
}

impl FormattedSpan {
    pub fn is_multiline(&self) -> bool { self.lines.len() != 1 }

    pub fn gutter_padding(&self) -> usize {
        (self.start + self.lines.len()).to_string().len()
    }

    /// If a single line span, returns the number of carets between cols.
    pub fn carets(&self) -> Option<usize> {
        if self.is_multiline() {
            None
        } else {
            Some(self.end_col.saturating_sub(self.start_col).max(1))
        }
    }
}

impl Display for FormattedSpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "In {}:{}:{}",
            self.path,
            self.start + 1,
            self.start_col + 1
        )?;
        writeln!(f, "{} |", " ".repeat(self.gutter_padding()))?;

        match self.carets() {
            Some(carets) => {
                let line_no = (self.start + 1).to_string();
                let padding = " ".repeat(self.gutter_padding() - line_no.len());
                writeln!(f, "{}{} | {}", line_no, padding, self.lines[0])?;
                writeln!(
                    f,
                    "{} | {}{}",
                    " ".repeat(self.gutter_padding()),
                    " ".repeat(self.start_col),
                    "^".repeat(carets),
                )?;
            },
            None => {
                for (index, line) in self.lines.iter().enumerate() {
                    let line_no = (self.start + index + 1).to_string();
                    let padding = " ".repeat(self.gutter_padding() - line_no.len());
                    writeln!(f, "{}{} > {}", line_no, padding, line)?;
                }
            },
        }

        Ok(())
    }
}

/// A wrapper for spanning types.
/// A token, for instance, is spanned to indicate
/// where it was scanned from (a `Spanned<Token>`).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Spanned<T> {
    pub item: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    /// Takes a generic item, and wraps in in a `Span` to make it
    /// `Spanned`.
    pub fn new(item: T, span: Span) -> Spanned<T> { Spanned { item, span } }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn span_and_contents() {
        let source = Source::source("(let x 1)");
        let span = Span::new(&source, 1, 3);
        assert_eq!(span.contents(), "let");
    }

    #[test]
    fn position_after_newline() {
        let source = Source::source("(f 1)\n  (g 2)");
        let span = Span::new(&source, 9, 1);
        assert_eq!(span.position(), Position::new(1, 3));
        assert_eq!(format!("{}", span.position()), "2:4");
    }

    #[test]
    fn position_counts_chars() {
        let source = Source::source("\"ñ\" x");
        // `ñ` is two bytes wide
        let span = Span::new(&source, 5, 1);
        assert_eq!(span.contents(), "x");
        assert_eq!(span.position(), Position::new(0, 4));
    }

    #[test]
    fn single_line_format() {
        let source = Source::source("(let x (oops 1))");
        let span = Span::new(&source, 7, 8);
        let target = "In ./source:1:8\n  |\n1 | (let x (oops 1))\n  |        ^^^^^^^^\n";
        assert_eq!(format!("{}", span), target);
    }

    #[test]
    fn eof_span_formats() {
        let source = Source::source("(f 1\n");
        let span = Span::eof(&source);
        assert_eq!(span.position(), Position::new(1, 0));
        format!("{}", span);
    }

    #[test]
    fn empty() {
        let source = Source::source("");
        let span = Span::point(&source, 0);
        format!("{}", span);
    }
}
