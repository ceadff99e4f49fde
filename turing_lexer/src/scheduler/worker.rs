//! Worker seam and per-chunk results
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::classifier::{ClassificationMetrics, Classifier, Disagreement};
use crate::config::runtime::ClassifierPreferences;
use crate::profile::LexiconProfile;
use crate::tokens::{Token, TokenKind};

use super::chunk::Chunk;

/// Classifies one chunk at a time on a worker thread
pub trait ChunkWorker: Send {
    fn process(&mut self, chunk: Chunk) -> Result<ChunkOutput, String>;
}

/// What a worker hands back for one chunk before timing is attached
#[derive(Debug, Clone, Default)]
pub struct ChunkOutput {
    pub tokens: Vec<Token>,
    pub classification: ClassificationMetrics,
    pub disagreements: Vec<Disagreement>,
}

/// Default worker: a private `Classifier` over the shared profile
pub struct ClassifierWorker {
    classifier: Classifier,
}

impl ClassifierWorker {
    pub fn new(profile: Arc<LexiconProfile>, preferences: ClassifierPreferences) -> Self {
        Self {
            classifier: Classifier::with_preferences(profile, preferences),
        }
    }
}

impl ChunkWorker for ClassifierWorker {
    fn process(&mut self, chunk: Chunk) -> Result<ChunkOutput, String> {
        let tokens = self.classifier.classify_all(chunk.lexemes);
        let (classification, disagreements) = self.classifier.take_results();
        Ok(ChunkOutput {
            tokens,
            classification,
            disagreements,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("worker {worker_id} failed on chunk {chunk_id}: {message}")]
pub struct WorkerFault {
    pub chunk_id: usize,
    pub worker_id: usize,
    pub message: String,
    pub panicked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChunkMetrics {
    pub chunk_id: usize,
    pub worker_id: usize,
    pub lexemes: usize,
    pub tokens: usize,
    pub invalid: usize,
    pub kind_counts: BTreeMap<TokenKind, usize>,
    pub elapsed: Duration,
    pub classification: ClassificationMetrics,
    pub disagreements: Vec<Disagreement>,
    pub degraded: bool,
}

impl ChunkMetrics {
    pub fn from_tokens(chunk_id: usize, worker_id: usize, lexemes: usize, tokens: &[Token]) -> Self {
        let mut kind_counts = BTreeMap::new();
        for token in tokens {
            *kind_counts.entry(token.kind).or_insert(0) += 1;
        }
        Self {
            chunk_id,
            worker_id,
            lexemes,
            tokens: tokens.len(),
            invalid: tokens.iter().filter(|t| !t.valid).count(),
            kind_counts,
            ..Self::default()
        }
    }

    pub fn tokens_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.tokens as f64 / secs
        } else {
            0.0
        }
    }
}

/// One chunk's classified tokens, keyed by chunk id
#[derive(Debug, Clone)]
pub struct WorkerResult {
    pub chunk_id: usize,
    pub worker_id: usize,
    pub tokens: Vec<Token>,
    pub metrics: ChunkMetrics,
}

impl WorkerResult {
    pub fn new(
        chunk_id: usize,
        worker_id: usize,
        lexemes: usize,
        output: ChunkOutput,
        elapsed: Duration,
    ) -> Self {
        let mut metrics = ChunkMetrics::from_tokens(chunk_id, worker_id, lexemes, &output.tokens);
        metrics.elapsed = elapsed;
        metrics.classification = output.classification;
        metrics.disagreements = output.disagreements;
        Self {
            chunk_id,
            worker_id,
            tokens: output.tokens,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin;
    use crate::tokens::Lexeme;

    #[test]
    fn test_classifier_worker_keeps_order() {
        let mut worker = ClassifierWorker::new(
            builtin::imperative().unwrap(),
            ClassifierPreferences::default(),
        );
        let chunk = Chunk {
            id: 0,
            lexemes: vec![
                Lexeme::new("x", 0),
                Lexeme::new(" ", 1),
                Lexeme::new("=", 2),
                Lexeme::new(" ", 3),
                Lexeme::new("1", 4),
            ],
        };
        let output = worker.process(chunk).unwrap();
        let kinds: Vec<TokenKind> = output.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Whitespace,
                TokenKind::Operator,
                TokenKind::Whitespace,
                TokenKind::Number
            ]
        );
        assert_eq!(output.classification.fast_path, 5);
    }

    #[test]
    fn test_metrics_from_tokens() {
        let tokens = vec![
            Token::valid(TokenKind::Number, Lexeme::new("1", 0)),
            Token::valid(TokenKind::Number, Lexeme::new("2", 1)),
            Token::invalid(
                TokenKind::Unknown,
                Lexeme::new("$", 2),
                crate::tokens::LexicalIssue::InvalidCharacter,
            ),
        ];
        let metrics = ChunkMetrics::from_tokens(3, 1, 3, &tokens);
        assert_eq!(metrics.invalid, 1);
        assert_eq!(metrics.kind_counts.get(&TokenKind::Number), Some(&2));
        assert_eq!(metrics.tokens_per_second(), 0.0);
    }

    #[test]
    fn test_fault_display() {
        let fault = WorkerFault {
            chunk_id: 4,
            worker_id: 2,
            message: "boom".into(),
            panicked: true,
        };
        assert_eq!(fault.to_string(), "worker 2 failed on chunk 4: boom");
    }
}
