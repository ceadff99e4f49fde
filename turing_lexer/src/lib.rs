//! Profile-driven tokenizer with a chunked parallel classification pipeline
//!
//! Source text is scanned sequentially into lexemes, classified in parallel
//! chunks against a [`profile::LexiconProfile`], and reassembled into a
//! lossless, offset-ordered [`tokens::TokenStream`].

// Internal modules
pub mod classifier;
pub mod config;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod profile;
pub mod scanner;
pub mod scheduler;
pub mod state_machine;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use pipeline::{
    process_source, process_source_with_config, PipelineConfig, PipelineError, PipelineResult,
    RunMetrics,
};
pub use profile::{LexiconProfile, ProfileDefinition, ProfileError};
pub use scheduler::FailurePolicy;
pub use tokens::{LexicalIssue, Token, TokenKind, TokenStream};
