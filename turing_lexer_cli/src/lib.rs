//! # Turing Lexer CLI
//!
//! Argument definitions and command handlers behind the `turing-lex` binary.
//! The library crate does no file I/O; this crate loads sources and profiles,
//! runs the pipeline and renders its results.

pub mod commands;
pub mod input;
pub mod output;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use turing_lexer::FailurePolicy;

#[derive(Parser, Debug)]
#[command(
    name = "turing-lex",
    version,
    about = "Profile-driven tokenizer with chunked parallel classification"
)]
pub struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Stdout carries JSON or TOML that must not interleave with log lines
    pub fn wants_clean_stdout(&self) -> bool {
        match &self.command {
            Commands::Tokenize(args) => args.format == OutputFormat::Json,
            Commands::Benchmark(args) => args.json,
            Commands::Profiles { name } => name.is_some(),
            Commands::Info { json } => *json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tokenize a file, or `-` for stdin
    Tokenize(TokenizeArgs),
    /// Time the pipeline across several worker counts
    Benchmark(BenchmarkArgs),
    /// List built-in profiles, or dump one as TOML
    Profiles {
        /// Profile id or alias to dump
        name: Option<String>,
    },
    /// Print the system report
    Info {
        #[arg(long)]
        json: bool,
    },
}

/// How the profile is chosen; the file extension decides when neither is given
#[derive(Args, Debug, Clone, Default)]
pub struct ProfileArgs {
    /// Built-in profile id or alias (imperative, python, symbolic, racket, query, sql, ...)
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Load the profile from a TOML file
    #[arg(long, value_name = "TOML", conflicts_with = "profile")]
    pub profile_file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TokenizeArgs {
    /// Source file, or `-` for stdin
    pub input: String,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Worker threads (defaults to cores - 1)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// What a failed chunk does to the run: abort or degrade
    #[arg(long)]
    pub policy: Option<FailurePolicy>,

    /// Replay fast-path verdicts through the state machine
    #[arg(long)]
    pub cross_check: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Append the run metrics
    #[arg(short, long)]
    pub metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BenchmarkArgs {
    pub input: String,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Comma-separated worker counts (default: 1,2,4,cores/2,cores-1,cores)
    #[arg(short, long, value_delimiter = ',')]
    pub workers: Vec<usize>,

    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
