use turing_lexer::pipeline::{benchmark, default_worker_counts};
use turing_lexer::{log_error, log_info, PipelineConfig};

use super::CommandResult;
use crate::input;
use crate::BenchmarkArgs;

/// Requested counts, or the defaults for this machine
pub fn worker_counts(requested: &[usize]) -> Vec<usize> {
    if requested.is_empty() {
        default_worker_counts(num_cpus::get())
    } else {
        requested.to_vec()
    }
}

pub fn run(args: &BenchmarkArgs) -> CommandResult {
    let profile = input::resolve_profile(&args.profile, &args.input)?;
    let source = input::read_source(&args.input)?;
    let counts = worker_counts(&args.workers);

    log_info!("Benchmarking",
        "input" => &args.input,
        "profile" => profile.id(),
        "runs" => counts.len()
    );

    let config = PipelineConfig::default().with_label(args.input.as_str());
    let report = benchmark(&source, profile, &counts, &config).map_err(|e| {
        log_error!(e.error_code(), "Benchmark failed", "error" => e.to_string());
        e
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("=== Benchmark ===");
        println!("{}", report.report());
        println!(
            "Cores: {} logical, {} physical",
            num_cpus::get(),
            num_cpus::get_physical()
        );
    }
    Ok(())
}
