//! Ordered reassembly of out-of-order worker results
use std::time::{Duration, Instant};

use crate::logging::codes;
use crate::tokens::{Lexeme, LexicalIssue, Token, TokenKind};
use crate::{log_error, log_warning};

use super::chunk::ChunkRange;
use super::worker::{ChunkMetrics, WorkerFault, WorkerResult};
use super::{FailurePolicy, SchedulerError};

/// Final token stream and per-chunk metrics in chunk id order
#[derive(Debug, Clone, Default)]
pub struct Reassembly {
    pub tokens: Vec<Token>,
    pub chunks: Vec<ChunkMetrics>,
    pub degraded: Vec<usize>,
    pub faults: Vec<WorkerFault>,
    /// Time spent concatenating slots
    pub elapsed: Duration,
}

/// Slot array indexed by chunk id; arrival order never matters
pub struct Reassembler {
    slots: Vec<Option<WorkerResult>>,
    ranges: Vec<ChunkRange>,
    faults: Vec<Option<WorkerFault>>,
    policy: FailurePolicy,
    received: usize,
}

impl Reassembler {
    pub fn new(ranges: Vec<ChunkRange>, policy: FailurePolicy) -> Self {
        let count = ranges.len();
        Self {
            slots: (0..count).map(|_| None).collect(),
            faults: (0..count).map(|_| None).collect(),
            ranges,
            policy,
            received: 0,
        }
    }

    pub fn expected(&self) -> usize {
        self.slots.len()
    }

    pub fn received(&self) -> usize {
        self.received
    }

    pub fn is_complete(&self) -> bool {
        self.received == self.slots.len()
    }

    /// Slot one message. Under `AbortRun` the first fault ends the run.
    pub fn accept(&mut self, message: Result<WorkerResult, WorkerFault>) -> Result<(), SchedulerError> {
        match message {
            Ok(result) => {
                let id = result.chunk_id;
                let slot = self
                    .slots
                    .get_mut(id)
                    .ok_or(SchedulerError::ChunkMissing { chunk_id: id })?;
                if slot.replace(result).is_none() {
                    self.received += 1;
                }
                Ok(())
            }
            Err(fault) => {
                log_error!(codes::scheduler::WORKER_FAILURE, "Worker fault",
                    "chunk" => fault.chunk_id,
                    "worker" => fault.worker_id,
                    "panicked" => fault.panicked,
                    "message" => &fault.message
                );
                match self.policy {
                    FailurePolicy::AbortRun => Err(SchedulerError::WorkerFault(fault)),
                    FailurePolicy::DegradeChunk => {
                        let id = fault.chunk_id;
                        let slot = self
                            .faults
                            .get_mut(id)
                            .ok_or(SchedulerError::ChunkMissing { chunk_id: id })?;
                        if slot.replace(fault).is_none() && self.slots[id].is_none() {
                            self.received += 1;
                        }
                        Ok(())
                    }
                }
            }
        }
    }

    /// Concatenate slots 0..N. Degraded chunks become one invalid token
    /// spanning the chunk's source bytes.
    pub fn finish(self, source: &str) -> Result<Reassembly, SchedulerError> {
        let started = Instant::now();
        let mut out = Reassembly::default();
        let capacity = self.ranges.iter().map(|r| r.lexemes).sum();
        out.tokens.reserve(capacity);

        for ((slot, fault), range) in self.slots.into_iter().zip(self.faults).zip(self.ranges) {
            match (slot, fault) {
                (Some(result), _) => {
                    out.tokens.extend(result.tokens);
                    out.chunks.push(result.metrics);
                }
                (None, Some(fault)) => {
                    let text = source
                        .get(range.start..range.end)
                        .ok_or(SchedulerError::ChunkMissing { chunk_id: range.id })?;
                    log_warning!(codes::scheduler::CHUNK_DEGRADED, "Chunk replaced by a degraded token",
                        "chunk" => range.id,
                        "start" => range.start,
                        "end" => range.end
                    );
                    let token = Token::invalid(
                        TokenKind::Unknown,
                        Lexeme::new(text, range.start),
                        LexicalIssue::DegradedChunk,
                    );
                    let mut metrics =
                        ChunkMetrics::from_tokens(range.id, fault.worker_id, range.lexemes, std::slice::from_ref(&token));
                    metrics.degraded = true;
                    out.tokens.push(token);
                    out.chunks.push(metrics);
                    out.degraded.push(range.id);
                    out.faults.push(fault);
                }
                (None, None) => return Err(SchedulerError::ChunkMissing { chunk_id: range.id }),
            }
        }
        out.elapsed = started.elapsed();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::worker::ChunkOutput;
    use assert_matches::assert_matches;

    const SOURCE: &str = "ab cd";

    fn ranges() -> Vec<ChunkRange> {
        vec![
            ChunkRange { id: 0, start: 0, end: 2, lexemes: 1 },
            ChunkRange { id: 1, start: 2, end: 5, lexemes: 2 },
        ]
    }

    fn result(chunk_id: usize, lexemes: &[(&str, usize)]) -> WorkerResult {
        let tokens = lexemes
            .iter()
            .map(|(text, offset)| Token::valid(TokenKind::Identifier, Lexeme::new(*text, *offset)))
            .collect();
        let output = ChunkOutput {
            tokens,
            ..ChunkOutput::default()
        };
        WorkerResult::new(chunk_id, chunk_id, lexemes.len(), output, Duration::ZERO)
    }

    fn fault(chunk_id: usize) -> WorkerFault {
        WorkerFault {
            chunk_id,
            worker_id: 7,
            message: "injected".into(),
            panicked: false,
        }
    }

    #[test]
    fn test_out_of_order_arrival() {
        let mut reassembler = Reassembler::new(ranges(), FailurePolicy::AbortRun);
        reassembler.accept(Ok(result(1, &[(" ", 2), ("cd", 3)]))).unwrap();
        assert!(!reassembler.is_complete());
        reassembler.accept(Ok(result(0, &[("ab", 0)]))).unwrap();
        assert!(reassembler.is_complete());

        let out = reassembler.finish(SOURCE).unwrap();
        let offsets: Vec<usize> = out.tokens.iter().map(|t| t.offset).collect();
        assert_eq!(offsets, vec![0, 2, 3]);
        assert_eq!(out.chunks[0].chunk_id, 0);
    }

    #[test]
    fn test_abort_on_fault() {
        let mut reassembler = Reassembler::new(ranges(), FailurePolicy::AbortRun);
        reassembler.accept(Ok(result(0, &[("ab", 0)]))).unwrap();
        let err = reassembler.accept(Err(fault(1))).unwrap_err();
        assert_matches!(err, SchedulerError::WorkerFault(WorkerFault { chunk_id: 1, .. }));
    }

    #[test]
    fn test_degrade_spans_chunk_source() {
        let mut reassembler = Reassembler::new(ranges(), FailurePolicy::DegradeChunk);
        reassembler.accept(Err(fault(1))).unwrap();
        reassembler.accept(Ok(result(0, &[("ab", 0)]))).unwrap();
        assert!(reassembler.is_complete());

        let out = reassembler.finish(SOURCE).unwrap();
        assert_eq!(out.tokens.len(), 2);
        let degraded = &out.tokens[1];
        assert_eq!((degraded.text.as_str(), degraded.offset), (" cd", 2));
        assert_eq!(degraded.issue, Some(LexicalIssue::DegradedChunk));
        assert_eq!(out.degraded, vec![1]);
        assert!(out.chunks[1].degraded);
    }

    #[test]
    fn test_missing_chunk() {
        let mut reassembler = Reassembler::new(ranges(), FailurePolicy::DegradeChunk);
        reassembler.accept(Ok(result(0, &[("ab", 0)]))).unwrap();
        assert_matches!(
            reassembler.finish(SOURCE),
            Err(SchedulerError::ChunkMissing { chunk_id: 1 })
        );
    }

    #[test]
    fn test_unknown_chunk_id() {
        let mut reassembler = Reassembler::new(ranges(), FailurePolicy::AbortRun);
        assert_matches!(
            reassembler.accept(Ok(result(9, &[]))),
            Err(SchedulerError::ChunkMissing { chunk_id: 9 })
        );
    }
}
