use std::time::Instant;

use turing_lexer::{log_error, log_info, process_source_with_config, PipelineConfig, PipelineResult};

use super::CommandResult;
use crate::input;
use crate::output::{self, TokenizeReport};
use crate::{OutputFormat, TokenizeArgs};

/// Pipeline preferences from the environment, overridden by flags
pub fn pipeline_config(args: &TokenizeArgs) -> PipelineConfig {
    let mut config = PipelineConfig::default().with_label(args.input.as_str());
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }
    if let Some(policy) = args.policy {
        config = config.with_policy(policy);
    }
    if args.cross_check {
        config = config.with_cross_check(true);
    }
    config
}

pub fn run(args: &TokenizeArgs) -> CommandResult {
    let start = Instant::now();
    let profile = input::resolve_profile(&args.profile, &args.input)?;
    let source = input::read_source(&args.input)?;

    log_info!("Tokenizing input",
        "input" => &args.input,
        "profile" => profile.id(),
        "bytes" => source.len()
    );

    let config = pipeline_config(args);
    let result = process_source_with_config(&source, profile, &config).map_err(|e| {
        log_error!(e.error_code(), "Tokenization failed",
            "input" => &args.input,
            "error" => e.to_string()
        );
        e
    })?;

    match args.format {
        OutputFormat::Text => print_text(args, &source, &result),
        OutputFormat::Json => {
            let report = TokenizeReport {
                source: &args.input,
                profile: &result.metrics.profile,
                token_count: result.tokens.len(),
                invalid_count: result.tokens.invalid_count(),
                tokens: result.tokens.tokens(),
                metrics: args.metrics.then_some(&result.metrics),
            };
            println!("{}", output::render_json(&report)?);
        }
    }

    log_info!("Tokenize command finished",
        "duration_ms" => start.elapsed().as_millis()
    );
    Ok(())
}

fn print_text(args: &TokenizeArgs, source: &str, result: &PipelineResult) {
    let rows = output::render_text(source, &result.tokens, false);
    if !rows.is_empty() {
        println!("{}", rows);
    }

    for diagnostic in output::render_diagnostics(source, &result.tokens) {
        eprintln!("{}", diagnostic);
    }

    if args.metrics {
        println!("\n=== Run Metrics ===");
        println!("{}", result.metrics.report());
    } else {
        println!("\n{}", result.metrics.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProfileArgs;
    use turing_lexer::FailurePolicy;

    fn args() -> TokenizeArgs {
        TokenizeArgs {
            input: "query.sql".to_string(),
            profile: ProfileArgs::default(),
            workers: None,
            policy: None,
            cross_check: false,
            format: OutputFormat::Text,
            metrics: false,
        }
    }

    #[test]
    fn test_flags_override_environment() {
        let mut args = args();
        args.workers = Some(5);
        args.policy = Some(FailurePolicy::DegradeChunk);
        args.cross_check = true;

        let config = pipeline_config(&args);
        assert_eq!(config.scheduler.worker_count, Some(5));
        assert_eq!(config.scheduler.failure_policy, FailurePolicy::DegradeChunk);
        assert!(config.classifier.cross_check_fast_path);
        assert_eq!(config.label.as_deref(), Some("query.sql"));
    }

    #[test]
    fn test_unset_flags_keep_defaults() {
        let defaults = PipelineConfig::default();
        let config = pipeline_config(&args());
        assert_eq!(config.scheduler.worker_count, defaults.scheduler.worker_count);
        assert_eq!(config.scheduler.failure_policy, defaults.scheduler.failure_policy);
    }

    #[test]
    fn test_run_on_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.rkt");
        std::fs::write(&path, "(define (inc x) (+ x 1))\n").unwrap();

        let mut args = args();
        args.input = path.to_string_lossy().into_owned();
        args.workers = Some(2);
        assert!(run(&args).is_ok());

        args.input = dir.path().join("missing.rkt").to_string_lossy().into_owned();
        assert!(run(&args).is_err());
    }
}
