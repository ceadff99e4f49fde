//! Lexeme classification
//!
//! Fast path: ordered shape predicates, first match wins. Slow path: replay
//! through the `StateMachine` when nothing matched. Classification never
//! fails; problems become invalid tokens carrying a `LexicalIssue`.
//!
//! The fast path is authoritative. With cross-checking enabled every valid
//! fast-path verdict is replayed through the automaton as well, and any
//! difference is logged and sampled for inspection.

pub mod numeric;

pub use numeric::NumericForm;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::compile_time::classifier::MAX_DISAGREEMENT_SAMPLES;
use crate::config::runtime::ClassifierPreferences;
use crate::logging::codes;
use crate::profile::LexiconProfile;
use crate::scanner::rules::{block_comment_extent, literal_extent, string_extent};
use crate::state_machine::StateMachine;
use crate::tokens::{Lexeme, LexicalIssue, Token, TokenKind};
use crate::log_warning;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub fast_path: usize,
    pub slow_path: usize,
    pub rejected: usize,
    pub cross_checked: usize,
    pub disagreements: usize,
}

impl ClassificationMetrics {
    pub fn total(&self) -> usize {
        self.fast_path + self.slow_path + self.rejected
    }

    pub fn merge(&mut self, other: &ClassificationMetrics) {
        self.fast_path += other.fast_path;
        self.slow_path += other.slow_path;
        self.rejected += other.rejected;
        self.cross_checked += other.cross_checked;
        self.disagreements += other.disagreements;
    }
}

/// Fast path and automaton reached different verdicts for one lexeme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disagreement {
    pub offset: usize,
    pub text: String,
    pub fast: TokenKind,
    /// `None` when the automaton rejected the lexeme
    pub dfa: Option<TokenKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Valid(TokenKind),
    Invalid(TokenKind, LexicalIssue),
}

/// Per-worker classifier with its own private automaton
pub struct Classifier {
    profile: Arc<LexiconProfile>,
    machine: StateMachine,
    preferences: ClassifierPreferences,
    metrics: ClassificationMetrics,
    disagreements: Vec<Disagreement>,
}

impl Classifier {
    pub fn new(profile: Arc<LexiconProfile>) -> Self {
        Self::with_preferences(profile, ClassifierPreferences::default())
    }

    pub fn with_preferences(profile: Arc<LexiconProfile>, preferences: ClassifierPreferences) -> Self {
        Self {
            machine: StateMachine::new(Arc::clone(&profile)),
            profile,
            preferences,
            metrics: ClassificationMetrics::default(),
            disagreements: Vec::new(),
        }
    }

    pub fn metrics(&self) -> &ClassificationMetrics {
        &self.metrics
    }

    pub fn disagreements(&self) -> &[Disagreement] {
        &self.disagreements
    }

    /// Drains metrics and disagreement samples, leaving the classifier fresh
    pub fn take_results(&mut self) -> (ClassificationMetrics, Vec<Disagreement>) {
        (
            std::mem::take(&mut self.metrics),
            std::mem::take(&mut self.disagreements),
        )
    }

    pub fn classify(&mut self, lexeme: Lexeme) -> Token {
        let outcome = match self.fast_path(&lexeme.text) {
            Some(outcome) => {
                self.metrics.fast_path += 1;
                if let Outcome::Valid(kind) = outcome {
                    if self.preferences.cross_check_fast_path {
                        self.cross_check(&lexeme, kind);
                    }
                }
                outcome
            }
            None => self.slow_path(&lexeme.text),
        };

        match outcome {
            Outcome::Valid(kind) => Token::valid(kind, lexeme),
            Outcome::Invalid(kind, issue) => {
                if self.preferences.log_invalid_tokens {
                    log_warning!(issue.code(), issue.describe(),
                        "offset" => lexeme.offset,
                        "text" => lexeme.text.escape_debug(),
                        "kind" => kind
                    );
                }
                Token::invalid(kind, lexeme, issue)
            }
        }
    }

    pub fn classify_all(&mut self, lexemes: Vec<Lexeme>) -> Vec<Token> {
        lexemes.into_iter().map(|lexeme| self.classify(lexeme)).collect()
    }

    fn fast_path(&self, text: &str) -> Option<Outcome> {
        let profile = &*self.profile;
        let len = text.len();
        let first = text.chars().next()?;

        if let Some(extent) = string_extent(text, profile).filter(|e| e.len == len) {
            return Some(closed_or_not(TokenKind::String, extent.terminated));
        }

        if let Some(marker) = profile.line_comment() {
            if text.starts_with(marker) && !text.contains(['\n', '\r']) {
                return Some(Outcome::Valid(TokenKind::Comment));
            }
        }
        if let Some(extent) = block_comment_extent(text, profile).filter(|e| e.len == len) {
            return Some(closed_or_not(TokenKind::Comment, extent.terminated));
        }

        if profile.is_literal_lead(first) {
            let literal = profile.literals().iter().find_map(|form| {
                literal_extent(text, form, profile)
                    .filter(|e| e.len == len)
                    .map(|e| closed_or_not(form.kind(), e.terminated))
            });
            if literal.is_some() {
                return literal;
            }
        }

        if numeric::parse(text, profile.numbers()).is_some() {
            return Some(Outcome::Valid(TokenKind::Number));
        }

        if profile.is_operator(text) {
            return Some(Outcome::Valid(TokenKind::Operator));
        }
        if first.len_utf8() == len && profile.is_delimiter(first) {
            return Some(Outcome::Valid(TokenKind::Delimiter));
        }

        if let Some(kind) = profile.word_kind(text) {
            return Some(Outcome::Valid(kind));
        }

        if text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r')) {
            return Some(Outcome::Valid(TokenKind::Whitespace));
        }

        let mut chars = text.chars();
        let identifier = chars.next().is_some_and(|c| profile.is_identifier_start(c))
            && chars.all(|c| profile.is_identifier_continue(c));
        if identifier {
            return Some(Outcome::Valid(TokenKind::Identifier));
        }

        None
    }

    fn slow_path(&mut self, text: &str) -> Outcome {
        match self.machine.classify(text) {
            Some(kind) => {
                self.metrics.slow_path += 1;
                Outcome::Valid(kind)
            }
            None => {
                self.metrics.rejected += 1;
                let mut chars = text.chars();
                let issue = match (chars.next(), chars.next()) {
                    (Some(only), None) if !self.profile.in_alphabet(only) => {
                        LexicalIssue::InvalidCharacter
                    }
                    _ => LexicalIssue::UnclassifiableLexeme,
                };
                Outcome::Invalid(TokenKind::Unknown, issue)
            }
        }
    }

    fn cross_check(&mut self, lexeme: &Lexeme, fast: TokenKind) {
        self.metrics.cross_checked += 1;
        let dfa = self.machine.classify(&lexeme.text);
        if dfa == Some(fast) {
            return;
        }

        self.metrics.disagreements += 1;
        log_warning!(codes::lexical::PATH_DISAGREEMENT, "Fast path and automaton disagree",
            "offset" => lexeme.offset,
            "text" => lexeme.text.escape_debug(),
            "fast" => fast,
            "dfa" => dfa.map_or("REJECT", |kind| kind.as_str())
        );

        if self.disagreements.len() < MAX_DISAGREEMENT_SAMPLES {
            self.disagreements.push(Disagreement {
                offset: lexeme.offset,
                text: lexeme.text.clone(),
                fast,
                dfa,
            });
        }
    }
}

fn closed_or_not(kind: TokenKind, terminated: bool) -> Outcome {
    if terminated {
        Outcome::Valid(kind)
    } else {
        Outcome::Invalid(kind, LexicalIssue::UnterminatedLiteral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin;

    fn classify(profile: Arc<LexiconProfile>, text: &str) -> Token {
        Classifier::new(profile).classify(Lexeme::new(text, 0))
    }

    fn checking(profile: Arc<LexiconProfile>) -> Classifier {
        Classifier::with_preferences(
            profile,
            ClassifierPreferences {
                cross_check_fast_path: true,
                log_invalid_tokens: false,
            },
        )
    }

    #[test]
    fn test_keyword_case_rule() {
        assert_eq!(classify(builtin::query().unwrap(), "Select").kind, TokenKind::Keyword);
        assert_eq!(
            classify(builtin::imperative().unwrap(), "Select").kind,
            TokenKind::Identifier
        );
    }

    #[test]
    fn test_unterminated_literals_keep_best_guess_kind() {
        let py = builtin::imperative().unwrap();
        let token = classify(py, "\"abc");
        assert_eq!(token.kind, TokenKind::String);
        assert!(!token.valid);
        assert_eq!(token.issue, Some(LexicalIssue::UnterminatedLiteral));

        let racket = builtin::symbolic().unwrap();
        let token = classify(racket.clone(), "#| open");
        assert_eq!((token.kind, token.valid), (TokenKind::Comment, false));
        let token = classify(racket, "'(a (b)");
        assert_eq!((token.kind, token.valid), (TokenKind::Symbol, false));
    }

    #[test]
    fn test_invalid_character() {
        let token = classify(builtin::imperative().unwrap(), "$");
        assert_eq!(token.kind, TokenKind::Unknown);
        assert_eq!(token.issue, Some(LexicalIssue::InvalidCharacter));

        let token = classify(builtin::query().unwrap(), "#");
        assert_eq!(token.issue, Some(LexicalIssue::UnclassifiableLexeme));
    }

    #[test]
    fn test_literal_forms() {
        let racket = builtin::symbolic().unwrap();
        assert_eq!(classify(racket.clone(), "#f").kind, TokenKind::Boolean);
        assert_eq!(classify(racket.clone(), "#\\newline").kind, TokenKind::Character);
        assert_eq!(classify(racket.clone(), ",@rest").kind, TokenKind::Symbol);
        assert_eq!(classify(builtin::query().unwrap(), "@total").kind, TokenKind::Variable);
    }

    #[test]
    fn test_words_and_numbers() {
        let py = builtin::imperative().unwrap();
        assert_eq!(classify(py.clone(), "0x1A").kind, TokenKind::Number);
        assert_eq!(classify(py.clone(), "print").kind, TokenKind::Builtin);
        assert_eq!(classify(py.clone(), "//=").kind, TokenKind::Operator);
        assert_eq!(classify(py.clone(), ":").kind, TokenKind::Delimiter);
        assert_eq!(classify(py, "    ").kind, TokenKind::Whitespace);

        let sql = builtin::query().unwrap();
        assert_eq!(classify(sql.clone(), "row_number").kind, TokenKind::Function);
        assert_eq!(classify(sql, "nclob").kind, TokenKind::Datatype);
    }

    #[test]
    fn test_slow_path_requires_whole_lexeme() {
        let sql = builtin::query().unwrap();
        let mut classifier = Classifier::new(sql);
        let token = classifier.classify(Lexeme::new("===", 4));
        assert_eq!(token.kind, TokenKind::Unknown);
        assert_eq!(token.issue, Some(LexicalIssue::UnclassifiableLexeme));
        assert_eq!(classifier.metrics().rejected, 1);
    }

    #[test]
    fn test_cross_check_agrees_on_builtin_profiles() {
        let samples: [(Arc<LexiconProfile>, &[&str]); 3] = [
            (
                builtin::imperative().unwrap(),
                &["def", "x_1", "**=", "0b101", "2.5e3", "f'{x}'", "# c", "(", " "],
            ),
            (
                builtin::symbolic().unwrap(),
                &["define", "->list", "-5", "3/4", "#t", "#\\a", "'(a b)", "#| x |#", "<="],
            ),
            (
                builtin::query().unwrap(),
                &["SELECT", "count", "@v", "::", "'it'", "-- c", "/* c */", "varchar2"],
            ),
        ];

        for (profile, texts) in samples {
            let mut classifier = checking(profile);
            for text in texts {
                assert!(classifier.classify(Lexeme::new(*text, 0)).valid, "{}", text);
            }
            assert_eq!(classifier.metrics().disagreements, 0, "{:?}", classifier.disagreements());
            assert_eq!(classifier.metrics().cross_checked, texts.len());
        }
    }

    #[test]
    fn test_disagreement_is_recorded() {
        // a digit identifier start: the fast path sees a word, the automaton a bad number
        let mut def = builtin::imperative_definition();
        def.identifier_start = "1".to_string();
        let profile = LexiconProfile::from_definition(def).unwrap().into_shared();

        let mut classifier = checking(profile);
        classifier.classify(Lexeme::new("1abc", 3));
        let (metrics, samples) = classifier.take_results();
        assert_eq!(metrics.disagreements, 1);
        assert_eq!(samples[0].fast, TokenKind::Identifier);
        assert_eq!(samples[0].dfa, None);
        assert!(classifier.disagreements().is_empty());
    }

    #[test]
    fn test_metrics_merge() {
        let mut total = ClassificationMetrics::default();
        let part = ClassificationMetrics {
            fast_path: 3,
            slow_path: 1,
            rejected: 2,
            cross_checked: 3,
            disagreements: 0,
        };
        total.merge(&part);
        total.merge(&part);
        assert_eq!(total.total(), 12);
    }
}
