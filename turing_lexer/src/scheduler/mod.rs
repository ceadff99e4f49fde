//! Chunked parallel classification
//!
//! Scanning is sequential; only classification fans out. The lexeme list is
//! cut into ordered chunks, each classified on a worker thread with its own
//! `Classifier`, and the results are put back together by chunk id so the
//! output never depends on completion order.

pub mod chunk;
pub mod pool;
pub mod reassembler;
pub mod worker;

pub use chunk::{default_worker_count, Chunk, ChunkPlan, ChunkRange};
pub use pool::WorkerPool;
pub use reassembler::{Reassembler, Reassembly};
pub use worker::{ChunkMetrics, ChunkOutput, ChunkWorker, ClassifierWorker, WorkerFault, WorkerResult};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::compile_time;
use crate::config::runtime::{ClassifierPreferences, SchedulerPreferences};
use crate::logging::codes::{self, Code};
use crate::profile::LexiconProfile;
use crate::tokens::Lexeme;
use crate::{log_info, log_performance};

/// What a worker fault does to the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Discard everything and fail; tokens are positional
    #[default]
    AbortRun,
    /// Replace the failed chunk with one invalid token over its source range
    DegradeChunk,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::AbortRun => "abort",
            FailurePolicy::DegradeChunk => "degrade",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" | "abort_run" => Ok(FailurePolicy::AbortRun),
            "degrade" | "degrade_chunk" => Ok(FailurePolicy::DegradeChunk),
            other => Err(format!("unknown failure policy '{}' (expected abort or degrade)", other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error(transparent)]
    WorkerFault(#[from] WorkerFault),

    #[error("worker {worker_id} panicked outside a chunk: {message}")]
    WorkerPanic { worker_id: usize, message: String },

    #[error("no result for chunk {chunk_id}")]
    ChunkMissing { chunk_id: usize },

    #[error("invalid worker count {requested} (allowed 1..={max})")]
    InvalidWorkerCount { requested: usize, max: usize },

    #[error("result channel closed after {received} of {expected} chunks")]
    ChannelClosed { received: usize, expected: usize },
}

impl SchedulerError {
    pub fn error_code(&self) -> Code {
        match self {
            SchedulerError::WorkerFault(_) | SchedulerError::WorkerPanic { .. } => {
                codes::scheduler::WORKER_FAILURE
            }
            SchedulerError::ChunkMissing { .. } => codes::scheduler::CHUNK_MISSING,
            SchedulerError::InvalidWorkerCount { .. } => codes::scheduler::INVALID_WORKER_COUNT,
            SchedulerError::ChannelClosed { .. } => codes::scheduler::CHANNEL_CLOSED,
        }
    }
}

/// Outcome of one scheduled classification run
#[derive(Debug, Clone)]
pub struct ScheduledRun {
    pub plan: ChunkPlan,
    pub reassembly: Reassembly,
    pub elapsed: Duration,
}

pub struct ChunkScheduler {
    profile: Arc<LexiconProfile>,
    preferences: SchedulerPreferences,
    classifier: ClassifierPreferences,
    label: String,
}

impl ChunkScheduler {
    pub fn new(profile: Arc<LexiconProfile>, preferences: SchedulerPreferences) -> Self {
        Self {
            label: profile.id().to_string(),
            profile,
            preferences,
            classifier: ClassifierPreferences::default(),
        }
    }

    pub fn with_classifier_preferences(mut self, preferences: ClassifierPreferences) -> Self {
        self.classifier = preferences;
        self
    }

    /// Source label attached to every event the workers log
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn preferences(&self) -> &SchedulerPreferences {
        &self.preferences
    }

    /// Requested worker count, or the hardware default
    pub fn worker_count(&self) -> Result<usize, SchedulerError> {
        let max = compile_time::scheduler::MAX_WORKER_THREADS;
        match self.preferences.worker_count {
            Some(0) => Err(SchedulerError::InvalidWorkerCount { requested: 0, max }),
            Some(n) => Ok(n.min(max)),
            None => Ok(default_worker_count()),
        }
    }

    pub fn plan(&self, total: usize) -> Result<ChunkPlan, SchedulerError> {
        Ok(ChunkPlan::compute(
            total,
            self.worker_count()?,
            self.preferences.min_chunk_size,
            self.preferences.parallel_threshold,
        ))
    }

    /// Classify `lexemes` with the default `ClassifierWorker`
    pub fn run(&self, source: &str, lexemes: Vec<Lexeme>) -> Result<ScheduledRun, SchedulerError> {
        let profile = &self.profile;
        let preferences = &self.classifier;
        self.run_with(source, lexemes, |_| {
            ClassifierWorker::new(Arc::clone(profile), preferences.clone())
        })
    }

    /// Classify `lexemes` with workers built by `make_worker`
    pub fn run_with<W, F>(
        &self,
        source: &str,
        lexemes: Vec<Lexeme>,
        make_worker: F,
    ) -> Result<ScheduledRun, SchedulerError>
    where
        W: ChunkWorker,
        F: Fn(usize) -> W + Sync,
    {
        let started = Instant::now();
        let plan = self.plan(lexemes.len())?;

        log_info!("Dispatching chunks",
            "lexemes" => plan.total_lexemes,
            "chunks" => plan.chunk_count,
            "chunk_len" => plan.chunk_len,
            "workers" => plan.workers,
            "policy" => self.preferences.failure_policy
        );

        let chunks = plan.split(lexemes);
        let pool = WorkerPool::new(plan.workers, self.preferences.failure_policy, &self.label);
        let reassembly = pool.run(source, chunks, make_worker)?;
        let elapsed = started.elapsed();

        log_performance!(codes::success::REASSEMBLY_COMPLETE, "Chunks reassembled",
            duration = elapsed,
            "chunks" => plan.chunk_count,
            "tokens" => reassembly.tokens.len(),
            "degraded" => reassembly.degraded.len()
        );

        Ok(ScheduledRun {
            plan,
            reassembly,
            elapsed,
        })
    }
}
