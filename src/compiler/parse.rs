use crate::{
    common::span::Span,
    compiler::{
        cursor::Cursor,
        session::Session,
        syntax::{ErrorKind, Note, Syntax},
    },
    construct::{
        rule,
        token::{Kinds, Token, TokenKind},
        tree::{self, IrBlock, IrExpr, RecordField},
    },
};

use TokenKind::*;

/// Tokens that may start an expression.
const ATOMS: Kinds = Kinds::of(&[
    OpenParen, OpenSquare, Str, Ident, Int, Float, Bool, OpenCurly,
]);

/// Tokens that may follow the `(` of a compound form.
const FORM_HEADS: Kinds = Kinds::of(&[
    Fun, Let, If, Ident, MacroName, Macro, While, Set, Use, Field,
]);

/// Ends an `if` or `elif` body.
const BRANCH_END: Kinds = Kinds::of(&[CloseParen, Elif, Else]);

/// Strips the quotes off a string literal lexeme.
/// Escapes have already been processed by the scanner.
fn unquote(lexeme: &str) -> String {
    let mut chars = lexeme.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

/// The bracket that closes `open`.
fn closer(open: TokenKind) -> TokenKind {
    match open {
        OpenParen => CloseParen,
        OpenCurly => CloseCurly,
        _ => CloseSquare,
    }
}

/// A recursive-descent parser over one file's tokens.
/// Each file, included ones too, gets its own parser and cursor;
/// all of them share the session, and with it the macro table.
pub struct Parser<'s> {
    cursor:  Cursor,
    session: &'s mut Session,
}

impl<'s> Parser<'s> {
    /// Parses a whole file into its top-level block.
    pub fn parse(cursor: Cursor, session: &'s mut Session) -> Result<IrBlock, Syntax> {
        let mut parser = Parser { cursor, session };
        parser.block(Kinds::NONE)
    }

    /// Parses expressions until the next token is one of `end`,
    /// or the tokens run out. Macro definitions leave no trace.
    fn block(&mut self, end: Kinds) -> Result<IrBlock, Syntax> {
        let mut block = vec![];

        while !self.cursor.is_done() && !self.cursor.at(end) {
            if let Some(expr) = self.item()? {
                block.push(expr);
            }
        }

        Ok(block)
    }

    /// The span of the next token, or of the end of the file.
    fn here(&self) -> Span {
        match self.cursor.peek() {
            Some(token) => token.span.clone(),
            None => Span::eof(self.cursor.source()),
        }
    }

    /// Parses an expression in a position where a value is required.
    fn expr(&mut self) -> Result<IrExpr, Syntax> {
        let span = self.here();

        self.item()?.ok_or_else(|| {
            Syntax::error(
                ErrorKind::Syntax,
                "A macro definition can only appear directly inside a block",
                &span,
            )
        })
    }

    /// Parses one expression, one level deeper than the caller.
    /// Returns `None` if it was a macro definition.
    fn item(&mut self) -> Result<Option<IrExpr>, Syntax> {
        if !self.session.nest() {
            return Err(Syntax::error_with_note(
                ErrorKind::Syntax,
                &format!(
                    "Expressions nest more than {} levels deep",
                    self.session.config().max_nesting_depth
                ),
                Note::new_with_hint(
                    "raise `max-nesting-depth` in the manifest if this is intended",
                    &self.here(),
                ),
            ));
        }

        let result = self.term();
        self.session.unnest();
        result
    }

    fn term(&mut self) -> Result<Option<IrExpr>, Syntax> {
        let token = self.cursor.expect(ATOMS)?;

        let expr = match token.kind {
            Str => IrExpr::String(unquote(&token.lexeme)),
            Ident => IrExpr::Ident(token.lexeme),
            Int => IrExpr::Int(self.int(&token)?),
            Float => IrExpr::Float(self.float(&token)?),
            Bool => IrExpr::Bool(token.lexeme == "true"),
            OpenSquare => {
                let content = self.block(CloseSquare.into())?;
                self.cursor.expect(CloseSquare)?;
                IrExpr::List(content)
            },
            OpenCurly => self.record()?,
            _ => return self.form(),
        };

        Ok(Some(expr))
    }

    fn int(&self, token: &Token) -> Result<i64, Syntax> {
        token.lexeme.parse().map_err(|_| {
            Syntax::error(
                ErrorKind::Lex,
                &format!(
                    "Integer literal `{}` does not fit in a signed 64-bit integer",
                    token.lexeme
                ),
                &token.span,
            )
        })
    }

    fn float(&self, token: &Token) -> Result<f64, Syntax> {
        token.lexeme.parse().map_err(|_| {
            Syntax::error(
                ErrorKind::Lex,
                &format!("Malformed float literal `{}`", token.lexeme),
                &token.span,
            )
        })
    }

    /// `{key: expr ...}`, with the `{` already consumed.
    fn record(&mut self) -> Result<IrExpr, Syntax> {
        let mut fields = vec![];

        loop {
            let token = self.cursor.expect(Key | CloseCurly)?;
            if token.kind == CloseCurly {
                break;
            }

            let key = token.lexeme.trim_end_matches(':').to_string();
            let expr = Box::new(self.expr()?);
            fields.push(RecordField { key, expr });
        }

        Ok(IrExpr::Record(fields))
    }

    /// A compound form, with the `(` already consumed.
    /// Every form ends by consuming its closing `)`.
    fn form(&mut self) -> Result<Option<IrExpr>, Syntax> {
        let head = self.cursor.expect(FORM_HEADS)?;

        let expr = match head.kind {
            Fun => self.func_def()?,
            Let => {
                let name = self.cursor.expect(Ident)?.lexeme;
                let init = Box::new(self.expr()?);
                IrExpr::VarDef { name, init }
            },
            If => self.if_chain()?,
            While => {
                let cond = Box::new(self.expr()?);
                let body = self.block(CloseParen.into())?;
                IrExpr::While { cond, body }
            },
            Set => {
                let dest = self.cursor.expect(Ident)?.lexeme;
                let src = Box::new(self.expr()?);
                IrExpr::Set { dest, src }
            },
            Field => {
                let record = Box::new(self.expr()?);
                let name = self.cursor.expect(Ident)?.lexeme;
                let value = match self.cursor.at(CloseParen) {
                    true => None,
                    false => Some(Box::new(self.expr()?)),
                };
                IrExpr::Field {
                    record,
                    name,
                    value,
                }
            },
            Use => {
                let path = self.cursor.expect(Str)?;
                self.cursor.expect(CloseParen)?;
                let source = self.cursor.source().clone();
                let block = self
                    .session
                    .include(&source, &unquote(&path.lexeme), &path.span)?;
                return Ok(Some(IrExpr::Block(block)));
            },
            Macro => {
                self.macro_def()?;
                return Ok(None);
            },
            MacroName => {
                let args = self.block(CloseParen.into())?;
                self.cursor.expect(CloseParen)?;
                let name = head.lexeme.strip_prefix('!').unwrap_or(&head.lexeme);
                let body = self.session.macros().expand(name, args, &head.span)?;
                return Ok(Some(IrExpr::Block(body)));
            },
            _ => {
                let args = self.block(CloseParen.into())?;
                IrExpr::FuncCall {
                    name: head.lexeme,
                    args,
                }
            },
        };

        self.cursor.expect(CloseParen)?;
        Ok(Some(expr))
    }

    /// Opens a parameter list, which may be bracketed either way.
    /// Returns the kind of token that will close it.
    fn open_params(&mut self) -> Result<TokenKind, Syntax> {
        let open = self.cursor.expect(OpenSquare | OpenParen)?;
        Ok(closer(open.kind))
    }

    /// `fun [name] [params] body...`; the caller consumes the `)`.
    fn func_def(&mut self) -> Result<IrExpr, Syntax> {
        let name = match self.cursor.at(Ident) {
            true => self.cursor.next().map(|t| t.lexeme),
            false => None,
        };

        let close = self.open_params()?;
        let mut params = vec![];
        loop {
            let token = self.cursor.expect(Ident | close)?;
            if token.kind == close {
                break;
            }
            params.push(token.lexeme);
        }

        let body = self.block(CloseParen.into())?;
        Ok(IrExpr::FuncDef { name, params, body })
    }

    /// `if cond body... (elif cond body...)* [else body...]`;
    /// the caller consumes the `)`.
    fn if_chain(&mut self) -> Result<IrExpr, Syntax> {
        let cond = Box::new(self.expr()?);
        let body = self.block(BRANCH_END)?;
        let mut elifs = vec![];
        let mut else_body = None;

        while self.cursor.at(Elif | Else) {
            let branch = self.cursor.expect(Elif | Else)?;
            if branch.kind == Else {
                else_body = Some(self.block(CloseParen.into())?);
                break;
            }

            let cond = Box::new(self.expr()?);
            let body = self.block(BRANCH_END)?;
            elifs.push(tree::Elif { cond, body });
        }

        Ok(IrExpr::If {
            cond,
            body,
            elifs,
            else_body,
        })
    }

    /// `macro name [formals] body...)`, declaring the macro in the
    /// session's table.
    fn macro_def(&mut self) -> Result<(), Syntax> {
        let name = self.cursor.expect(Ident)?.lexeme;
        let close = self.open_params()?;

        let mut formals = vec![];
        let mut variadic = false;
        loop {
            let token = self.cursor.expect(Ident | Ellipsis | close)?;
            match token.kind {
                Ellipsis => {
                    formals.push(self.cursor.expect(Ident)?.lexeme);
                    variadic = true;
                    if !self.cursor.at(close) {
                        return Err(Syntax::error_with_note(
                            ErrorKind::Syntax,
                            "Only the last macro parameter may be variadic",
                            Note::new_with_hint(
                                "`...` must come right before the last parameter",
                                &token.span,
                            ),
                        ));
                    }
                },
                Ident => formals.push(token.lexeme),
                _ => break,
            }
        }

        let body = self.block(CloseParen.into())?;
        self.cursor.expect(CloseParen)?;

        self.session.macros_mut().declare(rule::Macro {
            name,
            formals,
            variadic,
            body,
        });
        Ok(())
    }
}
