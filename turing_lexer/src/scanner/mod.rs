//! Sequential boundary scanner
//!
//! One forward pass over the source. At every position the rules in
//! `ScanRule::PRIORITY` are tried in order and the first one to claim a
//! prefix bounds the next lexeme. Scanning never fails on content: malformed
//! input still yields lexemes and is flagged later by the classifier. The only
//! errors are the compile-time size limits.

pub(crate) mod cursor;
pub mod rules;

pub use rules::ScanRule;

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::compile_time::scanner::{MAX_LEXEME_COUNT, MAX_SOURCE_BYTES};
use crate::config::runtime::ScannerPreferences;
use crate::logging::codes;
use crate::profile::LexiconProfile;
use crate::tokens::Lexeme;
use crate::utils::LineIndex;
use crate::{log_debug, log_error, log_performance};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScanError {
    #[error("Source too large: {size} bytes (max {MAX_SOURCE_BYTES})")]
    SourceTooLarge { size: usize },

    #[error("Too many lexemes: more than {MAX_LEXEME_COUNT} before offset {offset}")]
    TooManyLexemes { offset: usize },
}

impl ScanError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ScanError::SourceTooLarge { .. } => codes::lexical::SOURCE_TOO_LARGE,
            ScanError::TooManyLexemes { .. } => codes::lexical::LEXEME_LIMIT_EXCEEDED,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanMetrics {
    pub source_bytes: usize,
    pub lexemes: usize,
    /// Lexemes bounded by each rule
    pub rule_hits: BTreeMap<ScanRule, usize>,
    pub longest_lexeme: usize,
    /// Only recorded when line tracking is enabled
    pub line_count: Option<usize>,
    pub elapsed: Duration,
}

impl ScanMetrics {
    pub fn hits(&self, rule: ScanRule) -> usize {
        self.rule_hits.get(&rule).copied().unwrap_or(0)
    }

    /// Single characters nothing else claimed
    pub fn fallback_count(&self) -> usize {
        self.hits(ScanRule::Fallback)
    }
}

pub struct Scanner {
    profile: Arc<LexiconProfile>,
    preferences: ScannerPreferences,
    metrics: ScanMetrics,
}

impl Scanner {
    pub fn new(profile: Arc<LexiconProfile>) -> Self {
        Self::with_preferences(profile, ScannerPreferences::default())
    }

    pub fn with_preferences(profile: Arc<LexiconProfile>, preferences: ScannerPreferences) -> Self {
        Self {
            profile,
            preferences,
            metrics: ScanMetrics::default(),
        }
    }

    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    pub fn profile(&self) -> &Arc<LexiconProfile> {
        &self.profile
    }

    /// Bounds `source` into ordered, contiguous lexemes
    pub fn scan(&mut self, source: &str) -> Result<Vec<Lexeme>, ScanError> {
        let start = Instant::now();
        self.metrics = ScanMetrics {
            source_bytes: source.len(),
            ..ScanMetrics::default()
        };

        if source.len() > MAX_SOURCE_BYTES {
            let error = ScanError::SourceTooLarge { size: source.len() };
            log_error!(error.error_code(), "Source exceeds scanner limit",
                "size" => source.len(),
                "limit" => MAX_SOURCE_BYTES,
                "profile" => self.profile.id()
            );
            return Err(error);
        }

        log_debug!("Starting scan",
            "profile" => self.profile.id(),
            "bytes" => source.len()
        );

        let mut lexemes = Vec::new();
        let mut offset = 0;
        while offset < source.len() {
            if lexemes.len() >= MAX_LEXEME_COUNT {
                let error = ScanError::TooManyLexemes { offset };
                log_error!(error.error_code(), "Lexeme limit exceeded",
                    "offset" => offset,
                    "limit" => MAX_LEXEME_COUNT
                );
                return Err(error);
            }

            let rest = &source[offset..];
            let (rule, len) = self.next_boundary(rest);
            *self.metrics.rule_hits.entry(rule).or_insert(0) += 1;
            self.metrics.longest_lexeme = self.metrics.longest_lexeme.max(len);

            lexemes.push(Lexeme::new(&rest[..len], offset));
            offset += len;
        }

        self.metrics.lexemes = lexemes.len();
        if self.preferences.track_line_columns {
            self.metrics.line_count = Some(LineIndex::new(source).line_count());
        }
        self.metrics.elapsed = start.elapsed();

        if self.preferences.log_scan_summary {
            log_performance!(codes::success::SCAN_COMPLETE, "Scan complete",
                duration = self.metrics.elapsed,
                "profile" => self.profile.id(),
                "lexemes" => self.metrics.lexemes,
                "fallback_chars" => self.metrics.fallback_count()
            );
        }

        Ok(lexemes)
    }

    /// First rule in priority order that claims a non-empty prefix
    fn next_boundary(&self, rest: &str) -> (ScanRule, usize) {
        for rule in ScanRule::PRIORITY {
            if let Some(len) = rule.apply(rest, &self.profile) {
                if len > 0 && rest.is_char_boundary(len) {
                    return (rule, len);
                }
            }
        }
        // unreachable for non-empty input: Fallback claims one character
        let len = rest.chars().next().map_or(rest.len(), char::len_utf8);
        (ScanRule::Fallback, len)
    }
}

/// One-shot scan with default preferences
pub fn scan(source: &str, profile: Arc<LexiconProfile>) -> Result<Vec<Lexeme>, ScanError> {
    Scanner::new(profile).scan(source)
}
