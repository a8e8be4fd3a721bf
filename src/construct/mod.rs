//! The datastructures each stage of the front end hands to the next:
//! tokens, the IR tree, and macro templates.

pub mod rule;
pub mod token;
pub mod tree;
