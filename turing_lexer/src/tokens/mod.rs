//! Token model
//!
//! The scanner produces [`Lexeme`]s: raw, bounded substrings with their byte
//! offset. The classifier turns each one into exactly one [`Token`], which
//! adds a [`TokenKind`], a validity flag and, for invalid tokens, the
//! [`LexicalIssue`] that explains why.
//!
//! A [`TokenStream`] holds the ordered output of a run. Two properties hold
//! for every stream the pipeline returns:
//!
//! - **Lossless**: concatenating the token texts in order reproduces the source.
//! - **Monotonic**: offsets strictly increase and no token overlaps the next.
//!
//! [`TokenStream::verify`] checks both against the original source.

pub mod token;
pub mod token_stream;

pub use token::{LexicalIssue, Lexeme, Token, TokenClass, TokenKind};
pub use token_stream::{StreamViolation, TokenStream};
