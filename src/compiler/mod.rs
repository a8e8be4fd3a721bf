//! This module contains the front end implementation.
//!
//! Each step in the pipeline turns one datatype into another,
//! starting with `Source` (string + path):
//!
//! 1. Tokens: `lex.rs`, driven by the transition table in `table.rs`.
//! 2. IR:     `parse.rs`, reading tokens through `cursor.rs`.
//!
//! Macro expansion (`expand.rs`) and file inclusion happen inline,
//! while parsing, so the IR handed out is already fully expanded.
//! Both share state through the compile `Session` in `session.rs`.

pub mod cursor;
pub mod expand;
pub mod lex;
pub mod parse;
pub mod session;
pub mod syntax;
pub mod table;

use std::rc::Rc;

pub use session::Session;
pub use syntax::{ErrorKind, Syntax};

use crate::{
    common::{source::Source, span::Spanned},
    construct::{token::Tokens, tree::IrBlock},
};

/// Scans a source with the default grammar.
#[inline(always)]
pub fn lex(source: Rc<Source>) -> Result<Spanned<Tokens>, Syntax> { Session::new().lex(source) }

/// Scans and parses a source in a fresh session,
/// reading any included files from disk.
#[inline(always)]
pub fn parse(source: Rc<Source>) -> Result<IrBlock, Syntax> { Session::new().compile(source) }
