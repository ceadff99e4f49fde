pub mod benchmark;
mod error;
mod info;
pub mod metrics;
mod result;
mod validation;

// Re-export public types
pub use benchmark::{benchmark, default_worker_counts, BenchmarkReport, BenchmarkRun};
pub use error::PipelineError;
pub use info::{get_pipeline_info, PipelineInfo, ProfileSummary};
pub use metrics::{InvalidTokenRecord, RunMetrics, StageDurations, WorkerSummary};
pub use result::PipelineResult;
pub use validation::validate_pipeline;

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

use crate::config::runtime::{
    ClassifierPreferences, RuntimeConfig, ScannerPreferences, SchedulerPreferences,
};
use crate::logging::{self, RunContext};
use crate::profile::LexiconProfile;
use crate::scanner::Scanner;
use crate::scheduler::{ChunkScheduler, ChunkWorker, ClassifierWorker, FailurePolicy};
use crate::tokens::TokenStream;

/// Preferences for one run, normally taken from the environment
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub scanner: ScannerPreferences,
    pub classifier: ClassifierPreferences,
    pub scheduler: SchedulerPreferences,
    /// Run label for log context; defaults to the profile id
    pub label: Option<String>,
    /// Check losslessness and offsets before returning
    pub verify_output: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_runtime(RuntimeConfig::default())
    }
}

impl PipelineConfig {
    pub fn from_runtime(runtime: RuntimeConfig) -> Self {
        Self {
            scanner: runtime.scanner,
            classifier: runtime.classifier,
            scheduler: runtime.scheduler,
            label: None,
            verify_output: true,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.scheduler.worker_count = Some(workers);
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.scheduler.failure_policy = policy;
        self
    }

    pub fn with_cross_check(mut self, enabled: bool) -> Self {
        self.classifier.cross_check_fast_path = enabled;
        self
    }

    /// Drop the single-worker threshold so small inputs still fan out
    pub fn always_parallel(mut self) -> Self {
        self.scheduler.parallel_threshold = 0;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Tokenize `source` with environment-derived preferences
pub fn process_source(
    source: &str,
    profile: Arc<LexiconProfile>,
) -> Result<PipelineResult, PipelineError> {
    process_source_with_config(source, profile, &PipelineConfig::default())
}

pub fn process_source_with_config(
    source: &str,
    profile: Arc<LexiconProfile>,
    config: &PipelineConfig,
) -> Result<PipelineResult, PipelineError> {
    let worker_profile = Arc::clone(&profile);
    let classifier = config.classifier.clone();
    process_source_with_workers(source, profile, config, move |_| {
        ClassifierWorker::new(Arc::clone(&worker_profile), classifier.clone())
    })
}

/// Scan, classify in chunks with workers from `make_worker`, reassemble
pub fn process_source_with_workers<W, F>(
    source: &str,
    profile: Arc<LexiconProfile>,
    config: &PipelineConfig,
    make_worker: F,
) -> Result<PipelineResult, PipelineError>
where
    W: ChunkWorker,
    F: Fn(usize) -> W + Sync,
{
    let started_at = Utc::now();
    let start_time = Instant::now();
    let label = config
        .label
        .clone()
        .unwrap_or_else(|| profile.id().to_string());

    logging::with_run_context(RunContext::new(&label), || {
        crate::log_info!("Starting tokenization pipeline",
            "profile" => profile.id(),
            "bytes" => source.len()
        );

        // Stage 1: sequential scan
        let mut scanner = Scanner::with_preferences(Arc::clone(&profile), config.scanner.clone());
        let lexemes = scanner.scan(source)?;
        let scan_metrics = scanner.metrics().clone();

        // Stage 2: chunked classification and reassembly
        let scheduler = ChunkScheduler::new(Arc::clone(&profile), config.scheduler.clone())
            .with_classifier_preferences(config.classifier.clone())
            .with_label(label.as_str());
        let mut run = scheduler.run_with(source, lexemes, make_worker)?;

        let tokens = TokenStream::new(std::mem::take(&mut run.reassembly.tokens));
        if config.verify_output {
            tokens.verify(source)?;
        }

        crate::log_success!(
            crate::logging::codes::success::CLASSIFICATION_COMPLETE,
            "Classification complete",
            "tokens" => tokens.len(),
            "invalid" => tokens.invalid_count(),
            "fast_path" => run.reassembly.chunks.iter().map(|c| c.classification.fast_path).sum::<usize>(),
            "slow_path" => run.reassembly.chunks.iter().map(|c| c.classification.slow_path).sum::<usize>()
        );

        let durations = StageDurations {
            scan: scan_metrics.elapsed,
            classify: run.elapsed,
            reassemble: run.reassembly.elapsed,
            total: start_time.elapsed(),
        };
        let metrics = RunMetrics::collect(
            started_at,
            profile.id(),
            scan_metrics,
            &run,
            &tokens,
            durations,
        );

        let result = PipelineResult::new(tokens, metrics);
        result.log_success(&label);
        Ok(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin;
    use crate::tokens::TokenKind;

    fn config(workers: usize) -> PipelineConfig {
        PipelineConfig::default()
            .with_workers(workers)
            .with_policy(FailurePolicy::AbortRun)
            .always_parallel()
    }

    #[test]
    fn test_validate_pipeline() {
        let _ = crate::logging::init_global_logging();
        let result = validate_pipeline();
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_pipeline_error_creation() {
        let error = PipelineError::pipeline_error("Test error");
        match error {
            PipelineError::Pipeline { message } => {
                assert_eq!(message, "Test error");
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_process_source_round_trip() {
        let source = "for i in range(10):\n    total += i ** 2  # squares\n";
        let result =
            process_source_with_config(source, builtin::imperative().unwrap(), &config(2)).unwrap();

        assert_eq!(result.tokens.reconstruct(), source);
        assert_eq!(result.metrics.tokens, result.tokens.len());
        assert_eq!(result.metrics.lexemes, result.tokens.len());
        assert_eq!(result.metrics.invalid, 0);
        assert_eq!(result.metrics.kind_counts.get(&TokenKind::Keyword), Some(&2));
        assert_eq!(result.metrics.profile, "imperative");
    }

    #[test]
    fn test_invalid_tokens_are_listed() {
        let source = "x = \"open";
        let result =
            process_source_with_config(source, builtin::imperative().unwrap(), &config(1)).unwrap();
        assert_eq!(result.metrics.invalid, 1);
        assert_eq!(result.metrics.invalid_tokens[0].offset, 4);
        assert_eq!(result.metrics.invalid_tokens[0].kind, TokenKind::String);
    }

    #[test]
    fn test_empty_source() {
        let result =
            process_source_with_config("", builtin::query().unwrap(), &config(4)).unwrap();
        assert!(result.tokens.is_empty());
        assert!(result.metrics.chunks.is_empty());
    }

    #[test]
    fn test_config_builders() {
        let config = PipelineConfig::default()
            .with_workers(3)
            .with_policy(FailurePolicy::DegradeChunk)
            .with_cross_check(true)
            .with_label("demo");
        assert_eq!(config.scheduler.worker_count, Some(3));
        assert_eq!(config.scheduler.failure_policy, FailurePolicy::DegradeChunk);
        assert!(config.classifier.cross_check_fast_path);
        assert_eq!(config.label.as_deref(), Some("demo"));
    }
}
