use crate::logging::codes;
use crate::tokens::TokenStream;

use super::metrics::RunMetrics;

/// Token stream plus the metrics of the run that produced it
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub tokens: TokenStream,
    pub metrics: RunMetrics,
}

impl PipelineResult {
    pub fn new(tokens: TokenStream, metrics: RunMetrics) -> Self {
        Self { tokens, metrics }
    }

    pub fn into_parts(self) -> (TokenStream, RunMetrics) {
        (self.tokens, self.metrics)
    }

    pub fn log_success(&self, label: &str) {
        crate::log_success!(
            codes::success::PIPELINE_COMPLETE,
            "Tokenization pipeline succeeded",
            "run" => label,
            "tokens" => self.metrics.tokens,
            "invalid" => self.metrics.invalid,
            "workers" => self.metrics.workers_used,
            "degraded_chunks" => self.metrics.degraded_chunks.len(),
            "duration_ms" => format!("{:.2}", self.metrics.durations.total.as_secs_f64() * 1000.0),
            "processing_rate_bytes_per_sec" => format!("{:.0}",
                self.metrics.source_bytes as f64 / self.metrics.durations.total.as_secs_f64().max(f64::EPSILON)),
            "processing_rate_tokens_per_sec" => format!("{:.0}", self.metrics.tokens_per_second())
        );
    }
}
