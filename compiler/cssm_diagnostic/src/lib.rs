//! Diagnostics for cssm.
//!
//! Every phase reports failures as a [`Diagnostic`] carrying an
//! [`ErrorCode`], a message, and a byte offset into the phase's input.

mod diagnostic;
mod error_code;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
