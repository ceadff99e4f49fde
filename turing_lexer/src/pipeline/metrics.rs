//! Aggregate metrics for one tokenization run
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::classifier::{ClassificationMetrics, Disagreement};
use crate::config::compile_time::classifier::{MAX_DISAGREEMENT_SAMPLES, MAX_INVALID_SAMPLES};
use crate::scanner::ScanMetrics;
use crate::scheduler::{ChunkMetrics, ScheduledRun};
use crate::tokens::{LexicalIssue, TokenKind, TokenStream};

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

fn per_second(count: usize, duration: Duration) -> f64 {
    let secs = duration.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidTokenRecord {
    pub offset: usize,
    pub text: String,
    pub kind: TokenKind,
    pub issue: Option<LexicalIssue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkerSummary {
    pub worker_id: usize,
    pub chunks: usize,
    pub tokens: usize,
    #[serde(serialize_with = "as_millis", rename = "busy_ms")]
    pub busy: Duration,
    pub tokens_per_second: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageDurations {
    #[serde(serialize_with = "as_millis", rename = "scan_ms")]
    pub scan: Duration,
    /// Dispatch to join, including reassembly
    #[serde(serialize_with = "as_millis", rename = "classify_ms")]
    pub classify: Duration,
    #[serde(serialize_with = "as_millis", rename = "reassemble_ms")]
    pub reassemble: Duration,
    #[serde(serialize_with = "as_millis", rename = "total_ms")]
    pub total: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMetrics {
    pub started_at: DateTime<Utc>,
    pub profile: String,
    pub source_bytes: usize,
    pub lexemes: usize,
    pub tokens: usize,
    pub invalid: usize,
    pub kind_counts: BTreeMap<TokenKind, usize>,
    /// First invalid tokens in source order, capped by the compile-time limit
    pub invalid_tokens: Vec<InvalidTokenRecord>,
    pub workers_used: usize,
    pub chunk_len: usize,
    pub chunks: Vec<ChunkMetrics>,
    pub workers: Vec<WorkerSummary>,
    pub degraded_chunks: Vec<usize>,
    pub classification: ClassificationMetrics,
    pub disagreements: Vec<Disagreement>,
    pub scan: ScanMetrics,
    pub durations: StageDurations,
}

impl RunMetrics {
    pub fn collect(
        started_at: DateTime<Utc>,
        profile: &str,
        scan: ScanMetrics,
        run: &ScheduledRun,
        stream: &TokenStream,
        durations: StageDurations,
    ) -> Self {
        let chunks = run.reassembly.chunks.clone();

        let mut classification = ClassificationMetrics::default();
        let mut disagreements = Vec::new();
        let mut workers: BTreeMap<usize, WorkerSummary> = BTreeMap::new();
        for chunk in &chunks {
            classification.merge(&chunk.classification);
            let room = MAX_DISAGREEMENT_SAMPLES.saturating_sub(disagreements.len());
            disagreements.extend(chunk.disagreements.iter().take(room).cloned());

            let summary = workers.entry(chunk.worker_id).or_insert_with(|| WorkerSummary {
                worker_id: chunk.worker_id,
                ..WorkerSummary::default()
            });
            summary.chunks += 1;
            summary.tokens += chunk.tokens;
            summary.busy += chunk.elapsed;
        }
        let workers: Vec<WorkerSummary> = workers
            .into_values()
            .map(|mut w| {
                w.tokens_per_second = per_second(w.tokens, w.busy);
                w
            })
            .collect();

        let invalid_tokens = stream
            .invalid_tokens()
            .take(MAX_INVALID_SAMPLES)
            .map(|t| InvalidTokenRecord {
                offset: t.offset,
                text: t.text.clone(),
                kind: t.kind,
                issue: t.issue,
            })
            .collect();

        Self {
            started_at,
            profile: profile.to_string(),
            source_bytes: scan.source_bytes,
            lexemes: scan.lexemes,
            tokens: stream.len(),
            invalid: stream.invalid_count(),
            kind_counts: stream.counts_by_kind(),
            invalid_tokens,
            workers_used: run.plan.workers,
            chunk_len: run.plan.chunk_len,
            chunks,
            workers,
            degraded_chunks: run.reassembly.degraded.clone(),
            classification,
            disagreements,
            scan,
            durations,
        }
    }

    pub fn tokens_per_second(&self) -> f64 {
        per_second(self.tokens, self.durations.total)
    }

    /// Summed chunk busy time over classification wall time
    pub fn estimated_speedup(&self) -> f64 {
        let wall = self.durations.classify.as_secs_f64();
        if wall <= 0.0 {
            return 1.0;
        }
        let busy: f64 = self.chunks.iter().map(|c| c.elapsed.as_secs_f64()).sum();
        busy / wall
    }

    pub fn parallel_efficiency(&self) -> f64 {
        self.estimated_speedup() / self.workers_used.max(1) as f64
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded_chunks.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} tokens ({} invalid) from {} bytes with profile '{}' on {} worker(s) in {:.2}ms ({:.0} tokens/sec)",
            self.tokens,
            self.invalid,
            self.source_bytes,
            self.profile,
            self.workers_used,
            self.durations.total.as_secs_f64() * 1000.0,
            self.tokens_per_second()
        )
    }

    /// Multi-line report for terminal output
    pub fn report(&self) -> String {
        let mut lines = vec![
            format!("Profile:        {}", self.profile),
            format!("Started:        {}", self.started_at.to_rfc3339()),
            format!("Source bytes:   {}", self.source_bytes),
            format!("Lexemes:        {}", self.lexemes),
            format!("Tokens:         {} ({} invalid)", self.tokens, self.invalid),
            format!(
                "Workers:        {} (chunk length {}, {} chunks)",
                self.workers_used,
                self.chunk_len,
                self.chunks.len()
            ),
            format!(
                "Durations:      scan {:.2}ms, classify {:.2}ms, reassemble {:.2}ms, total {:.2}ms",
                self.durations.scan.as_secs_f64() * 1000.0,
                self.durations.classify.as_secs_f64() * 1000.0,
                self.durations.reassemble.as_secs_f64() * 1000.0,
                self.durations.total.as_secs_f64() * 1000.0
            ),
            format!(
                "Throughput:     {:.0} tokens/sec, speedup {:.2}x, efficiency {:.0}%",
                self.tokens_per_second(),
                self.estimated_speedup(),
                self.parallel_efficiency() * 100.0
            ),
        ];

        lines.push("Kinds:".to_string());
        for (kind, count) in &self.kind_counts {
            lines.push(format!("  {:<12} {}", kind.as_str(), count));
        }

        if !self.workers.is_empty() {
            lines.push("Per worker:".to_string());
            for w in &self.workers {
                lines.push(format!(
                    "  worker {:<3} {} chunks, {} tokens, {:.2}ms busy, {:.0} tokens/sec",
                    w.worker_id,
                    w.chunks,
                    w.tokens,
                    w.busy.as_secs_f64() * 1000.0,
                    w.tokens_per_second
                ));
            }
        }

        if self.is_degraded() {
            lines.push(format!("Degraded chunks: {:?}", self.degraded_chunks));
        }
        if self.classification.disagreements > 0 {
            lines.push(format!(
                "Path disagreements: {} ({} sampled)",
                self.classification.disagreements,
                self.disagreements.len()
            ));
        }
        lines.join("\n")
    }
}
