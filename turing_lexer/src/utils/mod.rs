//! Shared primitives: source positions, spans and offset-to-line lookup

pub mod span;

pub use span::{LineIndex, Position, Span};
