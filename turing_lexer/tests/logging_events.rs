//! Events a degraded run reports through the global logger
//!
//! Kept to a single test: the global logger can only be installed once per
//! test binary.

use std::sync::Arc;

use turing_lexer::config::runtime::ClassifierPreferences;
use turing_lexer::logging::codes;
use turing_lexer::logging::service::create_test_logger;
use turing_lexer::logging::{self, LogLevel, LoggingService};
use turing_lexer::pipeline::{process_source_with_workers, PipelineConfig};
use turing_lexer::profile::builtin;
use turing_lexer::scheduler::{Chunk, ChunkOutput, ChunkWorker, ClassifierWorker};
use turing_lexer::FailurePolicy;

struct FailsFirstChunk(ClassifierWorker);

impl ChunkWorker for FailsFirstChunk {
    fn process(&mut self, chunk: Chunk) -> Result<ChunkOutput, String> {
        if chunk.id == 0 {
            return Err("first chunk refused".to_string());
        }
        self.0.process(chunk)
    }
}

#[test]
fn degraded_run_logs_fault_and_completion() {
    let memory = create_test_logger();
    let service = LoggingService::new(memory.clone(), LogLevel::Debug);
    logging::init_global_logging_with_service(Arc::new(service)).unwrap();

    let profile = builtin::symbolic().unwrap();
    let source = "(define (twice f) (lambda (x) (f (f x))))\n".repeat(20);
    let mut config = PipelineConfig::default()
        .with_workers(2)
        .with_policy(FailurePolicy::DegradeChunk)
        .always_parallel()
        .with_label("logcheck");
    config.scheduler.min_chunk_size = 1;

    let worker_profile = Arc::clone(&profile);
    let result = process_source_with_workers(&source, profile, &config, move |_| {
        FailsFirstChunk(ClassifierWorker::new(
            Arc::clone(&worker_profile),
            ClassifierPreferences::default(),
        ))
    })
    .unwrap();
    assert_eq!(result.metrics.degraded_chunks, vec![0]);

    assert!(memory.has_error_with_code(codes::scheduler::WORKER_FAILURE));
    assert!(!memory
        .get_events_with_code(codes::scheduler::CHUNK_DEGRADED)
        .is_empty());
    assert!(memory.has_success_with_code(codes::success::PIPELINE_COMPLETE));

    let failure = &memory.get_events_with_code(codes::scheduler::WORKER_FAILURE)[0];
    assert_eq!(failure.context.get("chunk").map(String::as_str), Some("0"));
    assert_eq!(
        failure.context.get("message").map(String::as_str),
        Some("first chunk refused")
    );
}
