//! # Aether
//! This crate contains the front end of the Aether scripting language:
//! the scanner, the parser, and the macro expander that together turn
//! source text into a tree-shaped IR for a separate virtual machine.
//! If you're looking for the command line driver, see the `aether`
//! binary instead.
//!
//! ## Embedding Aether in Rust
//! Add aether to your `Cargo.toml`:
//! ```toml
//! aether = "0.3"
//! ```
//! Then simply:
//! ```
//! use aether::{common::Source, construct::tree::print_block};
//!
//! let ir = aether::compile(Source::source("(macro dup [x] (f x x)) (!dup 7)")).unwrap();
//! assert_eq!(print_block(&ir), "(block (f 7 7))");
//! ```
//!
//! ## Overview of the compilation process
//! Within the pipeline, source code is represented as a `Source` object,
//! which is scanned into `Token`s, which are parsed into an `IrBlock`.
//! Macro invocations and `use` forms are resolved while parsing; a
//! `Session` carries the macro table across every file of one compile.
//! Any error is fatal and reported as a `Syntax` error pointing into
//! the offending file.

pub mod common;
pub mod compiler;
pub mod construct;

use std::{path::Path, rc::Rc};

pub use common::{Config, Source};
pub use compiler::{ErrorKind, Session, Syntax};
pub use construct::tree::{IrBlock, IrExpr};

/// Compiles a root source, and every file it includes, into IR.
pub fn compile(source: Rc<Source>) -> Result<IrBlock, Syntax> { compiler::parse(source) }

/// Reads a root file from disk and compiles it into IR.
pub fn compile_path(path: &Path) -> Result<IrBlock, Syntax> { Session::new().compile_path(path) }
