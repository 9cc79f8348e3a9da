//! CSS value parser for cssm.
//!
//! Parses declaration values such as `url(a.png) no-repeat, 1px / 2px`
//! into a flat list of [`ValueNode`]s, with functions owning their
//! arguments. Printing the nodes with [`stringify`] reproduces the input.
//!
//! The parser never fails: unterminated strings, comments, and functions
//! are marked `unclosed` and print without their missing terminator.

mod node;
mod parse;
mod unit;
mod walk;

pub use node::{stringify, ValueKind, ValueNode};
pub use parse::parse;
pub use unit::{unit, Unit};
pub use walk::{walk, walk_mut, walk_post};
