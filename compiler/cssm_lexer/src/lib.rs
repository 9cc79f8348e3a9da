//! Selector tokenizer for cssm.
//!
//! [`tokenize`] turns selector text into [`Token`]s carrying their kind,
//! line/column positions, and byte range. The tokenizer never interprets
//! escapes; it only keeps escaped characters inside the word they belong
//! to.

mod char_class;
mod cursor;
mod token;
mod tokenizer;

pub use token::{Token, TokenKind};
pub use tokenizer::{tokenize, TokenStream, Tokenizer};
