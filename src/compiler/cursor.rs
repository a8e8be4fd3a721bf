use std::rc::Rc;

use crate::{
    common::{
        source::Source,
        span::{Span, Spanned},
    },
    compiler::syntax::{ErrorKind, Syntax},
    construct::token::{Kinds, Token, TokenKind, Tokens},
};

/// A read position over one file's tokens.
/// Grammar rules only ever look at tokens through `peek`, `next` and
/// `expect`, so every syntax error is reported from one place.
#[derive(Debug)]
pub struct Cursor {
    tokens: Spanned<Tokens>,
    index:  usize,
}

impl Cursor {
    pub fn new(tokens: Spanned<Tokens>) -> Cursor { Cursor { tokens, index: 0 } }

    /// The source the tokens were scanned from.
    pub fn source(&self) -> &Rc<Source> { self.tokens.span.source() }

    /// Returns the next token without consuming it.
    pub fn peek(&self) -> Option<&Token> { self.tokens.item.get(self.index) }

    pub fn peek_kind(&self) -> Option<TokenKind> { self.peek().map(|t| t.kind) }

    /// Whether the next token is one of `kinds`.
    /// Always false at the end of the stream.
    pub fn at(&self, kinds: impl Into<Kinds>) -> bool {
        let kinds = kinds.into();
        self.peek_kind().map_or(false, |kind| kinds.contains(kind))
    }

    pub fn is_done(&self) -> bool { self.index >= self.tokens.item.len() }

    /// Returns the next token, advancing the cursor by 1.
    pub fn next(&mut self) -> Option<Token> {
        let token = self.tokens.item.get(self.index)?;
        self.index += 1;
        // We can clone here because it's not that expensive
        Some(token.clone())
    }

    /// Consumes the next token if its kind is one of `accepted`,
    /// and fails naming everything that would have been accepted
    /// otherwise.
    pub fn expect(&mut self, accepted: impl Into<Kinds>) -> Result<Token, Syntax> {
        let accepted = accepted.into();

        match self.next() {
            Some(token) if accepted.contains(token.kind) => Ok(token),
            Some(token) => Err(Syntax::error(
                ErrorKind::Syntax,
                &format!("Expected {}, but got `{}`", accepted, token.lexeme),
                &token.span,
            )),
            None => Err(Syntax::error(
                ErrorKind::Syntax,
                &format!("Expected {}, but got EOF", accepted),
                &Span::eof(self.source()),
            )),
        }
    }
}
