use std::rc::Rc;

use log::debug;

use crate::{
    common::{
        source::Source,
        span::{Position, Span, Spanned},
    },
    compiler::{
        syntax::{ErrorKind, Syntax},
        table::TransitionTable,
    },
    construct::token::{Token, TokenKind, Tokens},
};

/// Maps the second character of a two-character escape to what it
/// stands for. Anything without a special meaning stands for itself.
fn escape_char(c: char) -> char {
    match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\x0b',
        other => other,
    }
}

pub struct Lexer<'t> {
    source:   Rc<Source>,
    table:    &'t dyn TransitionTable,
    index:    usize,
    position: Position,
    tokens:   Tokens,
}

impl<'t> Lexer<'t> {
    /// Lexes a source file into a stream of tokens.
    /// Whitespace, newlines and comments are dropped, but still move
    /// the row and column counters along.
    pub fn lex(
        source: Rc<Source>,
        table: &'t dyn TransitionTable,
    ) -> Result<Spanned<Tokens>, Syntax> {
        // get a span that spans the entire source file:
        let span = Span::new(&source, 0, source.contents.len());

        // build a base lexer for this file
        let mut lexer = Lexer {
            source,
            table,
            index: 0,
            position: Position::default(),
            tokens: vec![],
        };

        // consume all!
        while lexer.index < lexer.source.contents.len() {
            lexer.next_token()?;
        }

        debug!(
            "scanned {} token(s) from {}",
            lexer.tokens.len(),
            lexer.source.path.display()
        );

        // phew, nothing broke. Your tokens, sir!
        Ok(Spanned::new(lexer.tokens, span))
    }

    /// Returns all characters after the current index position.
    fn remaining(&self) -> &str { &self.source.contents[self.index..] }

    /// Moves the index `len` bytes forward, keeping the row and column
    /// in step with every character passed over.
    fn advance(&mut self, len: usize) {
        let end = self.index + len;
        for c in self.source.contents[self.index..end].chars() {
            if c == '\n' {
                self.position.row += 1;
                self.position.col = 0;
            } else {
                self.position.col += 1;
            }
        }
        self.index = end;
    }

    fn unexpected(&self) -> Syntax {
        let c = self.remaining().chars().next().unwrap_or_default();
        Syntax::error(
            ErrorKind::Lex,
            &format!("Unexpected `{}` at {}", c, self.position),
            &Span::new(&self.source, self.index, c.len_utf8()),
        )
    }

    fn next_token(&mut self) -> Result<(), Syntax> {
        let (kind, len) = self
            .table
            .longest_match(self.remaining())
            .ok_or_else(|| self.unexpected())?;

        // a table handing back nonsense must not bring the scanner down
        if len == 0
            || len > self.remaining().len()
            || !self.remaining().is_char_boundary(len)
        {
            return Err(self.unexpected());
        }

        match kind {
            TokenKind::Str => self.string()?,
            TokenKind::Comment => {
                let line = self.remaining().find('\n').unwrap_or(self.remaining().len());
                self.advance(line);
            },
            trivia if trivia.is_trivia() => self.advance(len),
            kind => {
                let span = Span::new(&self.source, self.index, len);
                let token = Token::new(kind, &self.remaining()[..len], self.position, span);
                self.tokens.push(token);
                self.advance(len);
            },
        }

        Ok(())
    }

    /// Consumes a string literal, opening quote included, up to the
    /// first unescaped copy of that quote.
    fn string(&mut self) -> Result<(), Syntax> {
        let source = Rc::clone(&self.source);
        let remaining = &source.contents[self.index..];
        let quote = remaining.chars().next().unwrap_or('"');

        let mut len = quote.len_utf8();
        let mut escape = false;
        let mut lexeme = String::from(quote);

        for c in remaining[len..].chars() {
            len += c.len_utf8();
            if escape {
                escape = false;
                lexeme.push(escape_char(c));
            } else if c == '\\' {
                escape = true;
            } else {
                lexeme.push(c);
                if c == quote {
                    let span = Span::new(&self.source, self.index, len);
                    self.tokens
                        .push(Token::new(TokenKind::Str, &lexeme, self.position, span));
                    self.advance(len);
                    return Ok(());
                }
            }
        }

        Err(Syntax::error(
            ErrorKind::Lex,
            &format!("String literal at {} was not closed", self.position),
            &Span::new(&self.source, self.index, len),
        ))
    }
}
