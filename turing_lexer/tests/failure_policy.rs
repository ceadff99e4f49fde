//! Abort and degrade handling when a chunk worker fails

use std::sync::Arc;

use assert_matches::assert_matches;
use turing_lexer::config::runtime::ClassifierPreferences;
use turing_lexer::pipeline::{process_source_with_workers, PipelineConfig};
use turing_lexer::profile::builtin;
use turing_lexer::scheduler::{Chunk, ChunkOutput, ChunkWorker, ClassifierWorker, SchedulerError};
use turing_lexer::{FailurePolicy, LexicalIssue, LexiconProfile, PipelineError, TokenKind};

/// Classifies normally except for one chunk, where it errors or panics
struct Flaky {
    inner: ClassifierWorker,
    broken_chunk: usize,
    panics: bool,
}

impl ChunkWorker for Flaky {
    fn process(&mut self, chunk: Chunk) -> Result<ChunkOutput, String> {
        if chunk.id == self.broken_chunk {
            if self.panics {
                panic!("lookup table corrupted");
            }
            return Err("classifier unavailable".to_string());
        }
        self.inner.process(chunk)
    }
}

fn flaky(
    profile: &Arc<LexiconProfile>,
    broken_chunk: usize,
    panics: bool,
) -> impl Fn(usize) -> Flaky + Sync {
    let profile = Arc::clone(profile);
    move |_| Flaky {
        inner: ClassifierWorker::new(Arc::clone(&profile), ClassifierPreferences::default()),
        broken_chunk,
        panics,
    }
}

fn config(policy: FailurePolicy) -> PipelineConfig {
    let mut config = PipelineConfig::default()
        .with_workers(3)
        .with_policy(policy)
        .always_parallel();
    config.scheduler.min_chunk_size = 1;
    config
}

const SOURCE: &str = "SELECT a, b FROM t WHERE a > 1 AND b < 2;\n";

#[test]
fn abort_policy_fails_the_whole_run() {
    let profile = builtin::query().unwrap();
    let source = SOURCE.repeat(10);
    let result = process_source_with_workers(
        &source,
        Arc::clone(&profile),
        &config(FailurePolicy::AbortRun),
        flaky(&profile, 1, false),
    );

    assert_matches!(
        result,
        Err(PipelineError::Scheduler(SchedulerError::WorkerFault(fault)))
            if fault.chunk_id == 1 && !fault.panicked
    );
}

#[test]
fn degrade_policy_replaces_only_the_failed_chunk() {
    let profile = builtin::query().unwrap();
    let source = SOURCE.repeat(10);
    let result = process_source_with_workers(
        &source,
        Arc::clone(&profile),
        &config(FailurePolicy::DegradeChunk),
        flaky(&profile, 2, false),
    )
    .unwrap();

    assert_eq!(result.tokens.reconstruct(), source);
    assert_eq!(result.metrics.degraded_chunks, vec![2]);
    assert!(result.metrics.is_degraded());

    let degraded: Vec<_> = result
        .tokens
        .iter()
        .filter(|t| t.issue == Some(LexicalIssue::DegradedChunk))
        .collect();
    assert_eq!(degraded.len(), 1);
    assert_eq!(degraded[0].kind, TokenKind::Unknown);
    assert!(!degraded[0].valid);

    // everything outside the failed chunk is still classified
    assert_eq!(result.tokens.invalid_count(), 1);
    assert!(result.tokens.of_kind(TokenKind::Keyword).count() > 0);
}

#[test]
fn worker_panic_is_contained() {
    let profile = builtin::query().unwrap();
    let source = SOURCE.repeat(10);

    let aborted = process_source_with_workers(
        &source,
        Arc::clone(&profile),
        &config(FailurePolicy::AbortRun),
        flaky(&profile, 0, true),
    );
    assert_matches!(
        aborted,
        Err(PipelineError::Scheduler(SchedulerError::WorkerFault(fault)))
            if fault.panicked && fault.message.contains("corrupted")
    );

    let degraded = process_source_with_workers(
        &source,
        Arc::clone(&profile),
        &config(FailurePolicy::DegradeChunk),
        flaky(&profile, 0, true),
    )
    .unwrap();
    assert_eq!(degraded.metrics.degraded_chunks, vec![0]);
    assert_eq!(degraded.tokens.reconstruct(), source);
    assert!(degraded.tokens.tokens()[0].text.starts_with("SELECT"));
}

#[test]
fn zero_workers_is_rejected() {
    let profile = builtin::imperative().unwrap();
    let config = PipelineConfig::default().with_workers(0);
    let result = turing_lexer::process_source_with_config("x = 1", profile, &config);
    assert_matches!(
        result,
        Err(PipelineError::Scheduler(SchedulerError::InvalidWorkerCount { requested: 0, .. }))
    );
}
