//! # Turing Lexer CLI
//!

use clap::Parser;
use turing_lexer::config::runtime::{LogLevel, LoggingPreferences};
use turing_lexer::logging;
use turing_lexer::{log_info, pipeline};
use turing_lexer_cli::{commands, Cli};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(&cli)?;
    pipeline::validate_pipeline()?;
    log_info!("turing-lex starting", "version" => env!("CARGO_PKG_VERSION"));

    if let Err(e) = commands::dispatch(&cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Console logging per the environment, or warnings only when stdout must stay parseable
fn init_logging(cli: &Cli) -> Result<(), String> {
    if cli.quiet || cli.wants_clean_stdout() {
        logging::config::init_runtime_preferences(LoggingPreferences {
            min_log_level: LogLevel::Warning,
            ..LoggingPreferences::default()
        })?;
    }
    logging::init_global_logging()
}
