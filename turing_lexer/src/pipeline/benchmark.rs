//! Worker-count benchmark over one source
use serde::Serialize;
use std::sync::Arc;

use crate::config::compile_time;
use crate::logging::codes;
use crate::profile::LexiconProfile;
use crate::tokens::TokenStream;

use super::{process_source_with_config, PipelineConfig, PipelineError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRun {
    pub workers: usize,
    pub chunks: usize,
    pub elapsed_ms: f64,
    pub tokens_per_second: f64,
    /// Relative to the single-worker run (or the first run when 1 was not requested)
    pub speedup: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub profile: String,
    pub source_bytes: usize,
    pub tokens: usize,
    pub runs: Vec<BenchmarkRun>,
    pub best_workers: usize,
}

impl BenchmarkReport {
    pub fn best(&self) -> Option<&BenchmarkRun> {
        self.runs.iter().find(|r| r.workers == self.best_workers)
    }

    pub fn report(&self) -> String {
        let mut lines = vec![
            format!(
                "Benchmark: profile '{}', {} bytes, {} tokens",
                self.profile, self.source_bytes, self.tokens
            ),
            format!(
                "{:>8} {:>7} {:>12} {:>14} {:>8} {:>11}",
                "workers", "chunks", "time (ms)", "tokens/sec", "speedup", "efficiency"
            ),
        ];
        for run in &self.runs {
            lines.push(format!(
                "{:>8} {:>7} {:>12.3} {:>14.0} {:>7.2}x {:>10.0}%",
                run.workers,
                run.chunks,
                run.elapsed_ms,
                run.tokens_per_second,
                run.speedup,
                run.efficiency * 100.0
            ));
        }
        lines.push(format!("Best worker count: {}", self.best_workers));
        lines.join("\n")
    }
}

/// `[1, 2, 4, cores/2, cores-1, cores]`, deduplicated and clamped
pub fn default_worker_counts(cores: usize) -> Vec<usize> {
    let mut counts: Vec<usize> = [1, 2, 4, cores / 2, cores.saturating_sub(1), cores]
        .into_iter()
        .map(|n| n.clamp(1, compile_time::scheduler::MAX_WORKER_THREADS))
        .collect();
    counts.sort_unstable();
    counts.dedup();
    counts
}

/// Run the pipeline once per worker count and compare.
///
/// Every run must produce the same token stream; a mismatch is an error.
pub fn benchmark(
    source: &str,
    profile: Arc<LexiconProfile>,
    worker_counts: &[usize],
    config: &PipelineConfig,
) -> Result<BenchmarkReport, PipelineError> {
    let mut counts: Vec<usize> = worker_counts
        .iter()
        .map(|&n| n.clamp(1, compile_time::scheduler::MAX_WORKER_THREADS))
        .collect();
    counts.dedup();
    if counts.is_empty() {
        return Err(PipelineError::pipeline_error("No worker counts to benchmark"));
    }

    let mut reference: Option<TokenStream> = None;
    let mut timings = Vec::with_capacity(counts.len());

    for &workers in &counts {
        let run_config = config.clone().with_workers(workers).always_parallel();
        let result = process_source_with_config(source, Arc::clone(&profile), &run_config)?;

        match &reference {
            Some(expected) if *expected != result.tokens => {
                return Err(PipelineError::Pipeline {
                    message: format!("Token stream with {} workers differs from the first run", workers),
                });
            }
            Some(_) => {}
            None => reference = Some(result.tokens.clone()),
        }

        crate::log_debug!("Benchmark run finished",
            "workers" => workers,
            "tokens" => result.metrics.tokens
        );
        timings.push((workers, result.metrics));
    }

    let baseline = timings
        .iter()
        .find(|(workers, _)| *workers == 1)
        .or_else(|| timings.first())
        .map(|(_, m)| m.durations.total.as_secs_f64())
        .unwrap_or(0.0);

    let runs: Vec<BenchmarkRun> = timings
        .iter()
        .map(|(workers, metrics)| {
            let secs = metrics.durations.total.as_secs_f64();
            let speedup = if secs > 0.0 { baseline / secs } else { 1.0 };
            BenchmarkRun {
                workers: *workers,
                chunks: metrics.chunks.len(),
                elapsed_ms: secs * 1000.0,
                tokens_per_second: metrics.tokens_per_second(),
                speedup,
                efficiency: speedup / metrics.workers_used.max(1) as f64,
            }
        })
        .collect();

    let best_workers = runs
        .iter()
        .min_by(|a, b| a.elapsed_ms.total_cmp(&b.elapsed_ms))
        .map_or(1, |r| r.workers);

    let report = BenchmarkReport {
        profile: profile.id().to_string(),
        source_bytes: source.len(),
        tokens: reference.as_ref().map_or(0, TokenStream::len),
        runs,
        best_workers,
    };

    crate::log_success!(codes::success::BENCHMARK_COMPLETE, "Benchmark complete",
        "runs" => report.runs.len(),
        "best_workers" => report.best_workers
    );

    Ok(report)
}
