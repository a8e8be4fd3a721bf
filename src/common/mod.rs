//! Contains datastructures and utility functions
//! shared by every stage of the front end.
//!
//! - Source code representation and span annotations.
//! - Resolution and loading of included files.
//! - Package manifests and compiler configuration.

pub mod manifest;
pub mod module;
pub mod source;
pub mod span;

pub use manifest::{Config, Manifest};
pub use module::{FsLoader, Loader, MemoryLoader};
pub use source::Source;
pub use span::{Position, Span, Spanned};
