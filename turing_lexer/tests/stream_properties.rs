//! Stream-level properties that must hold for every profile and worker count

use std::sync::Arc;

use turing_lexer::pipeline::{process_source_with_config, PipelineConfig};
use turing_lexer::profile::builtin;
use turing_lexer::{FailurePolicy, LexiconProfile, LexicalIssue, TokenKind, TokenStream};

const PYTHON: &str = r#"
import os
from typing import List

class Greeter:
    """Says hello."""
    def __init__(self, name: str) -> None:
        self.name = name  # keep it

    def greet(self, times=3):
        for i in range(times):
            print(f"hi {self.name}!", i ** 2, 0x1F, 0b101, 1.5e-3)
        return not self.name or True

x //= 2; y <<= 1; z = x if x != y else y
s = 'it\'s' + "open
"#;

const RACKET: &str = r#"#lang racket
#| block #| nested |# comment |#
(define (string->label x)
  (cond [(< x 0) "negative"]
        [(= x 0) #\space]
        [else (list 'positive 3/4 -5 2.5i #t #f `(a ,b ,@rest))]))
(define *debug* #true) ; flag
"#;

const SQL: &str = r#"-- report
SELECT u.id, COUNT(*) AS total, ROW_NUMBER() OVER (ORDER BY u.id)
FROM users u /* all users */
WHERE u.created_at >= @since AND u.name <> N'bob' AND u.score::int === 1
  AND `weird col` IS NOT NULL;
select Cast(price AS nvarchar2) from items
"#;

fn config(workers: usize) -> PipelineConfig {
    PipelineConfig::default()
        .with_workers(workers)
        .with_policy(FailurePolicy::AbortRun)
        .always_parallel()
}

fn run(source: &str, profile: Arc<LexiconProfile>, workers: usize) -> TokenStream {
    process_source_with_config(source, profile, &config(workers))
        .expect("pipeline run")
        .tokens
}

fn profiles() -> Vec<(Arc<LexiconProfile>, &'static str)> {
    vec![
        (builtin::imperative().unwrap(), PYTHON),
        (builtin::symbolic().unwrap(), RACKET),
        (builtin::query().unwrap(), SQL),
    ]
}

#[test]
fn stream_is_lossless_for_every_profile() {
    for (profile, source) in profiles() {
        let tokens = run(source, profile.clone(), 2);
        assert_eq!(tokens.reconstruct(), source, "profile {}", profile.id());
        assert!(tokens.verify(source).is_ok(), "profile {}", profile.id());
    }
}

#[test]
fn offsets_strictly_increase_without_overlap() {
    for (profile, source) in profiles() {
        let tokens = run(source, profile, 3);
        for pair in tokens.tokens().windows(2) {
            assert!(pair[0].offset < pair[1].offset);
            assert!(pair[0].offset + pair[0].text.len() <= pair[1].offset);
        }
    }
}

#[test]
fn worker_count_does_not_change_output() {
    for (profile, source) in profiles() {
        let source = source.repeat(40);
        let single = run(&source, profile.clone(), 1);
        for workers in [2, 4, 7] {
            let parallel = run(&source, profile.clone(), workers);
            assert_eq!(single, parallel, "profile {} with {} workers", profile.id(), workers);
        }
    }
}

#[test]
fn query_operators_use_maximal_munch() {
    let tokens = run("===", builtin::query().unwrap(), 1);
    assert_eq!(
        tokens.kinds_and_texts(),
        vec![(TokenKind::Operator, "=="), (TokenKind::Operator, "=")]
    );
}

#[test]
fn keyword_case_rule_follows_profile() {
    let sql = run("Select", builtin::query().unwrap(), 1);
    assert_eq!(sql.tokens()[0].kind, TokenKind::Keyword);

    let py = run("Select", builtin::imperative().unwrap(), 1);
    assert_eq!(py.tokens()[0].kind, TokenKind::Identifier);
}

#[test]
fn unterminated_string_is_one_invalid_token() {
    let tokens = run("\"abc", builtin::imperative().unwrap(), 1);
    assert_eq!(tokens.len(), 1);
    let token = &tokens.tokens()[0];
    assert_eq!(token.text, "\"abc");
    assert!(!token.valid);
    assert_eq!(token.issue, Some(LexicalIssue::UnterminatedLiteral));
}

#[test]
fn numeric_grammar_follows_profile() {
    let hex = run("0x1A", builtin::imperative().unwrap(), 1);
    assert_eq!(hex.kinds_and_texts(), vec![(TokenKind::Number, "0x1A")]);

    let racket = run("3/4", builtin::symbolic().unwrap(), 1);
    assert_eq!(racket.kinds_and_texts(), vec![(TokenKind::Number, "3/4")]);

    let python = run("3/4", builtin::imperative().unwrap(), 1);
    assert_eq!(
        python.kinds_and_texts(),
        vec![
            (TokenKind::Number, "3"),
            (TokenKind::Operator, "/"),
            (TokenKind::Number, "4")
        ]
    );
}

#[test]
fn chunks_never_split_a_lexeme() {
    // long strings and comments straddle every plausible chunk edge
    let line = "x = \"a long string with spaces and # no comment\"  # trailing comment\n";
    let source = line.repeat(300);
    let profile = builtin::imperative().unwrap();

    let result = process_source_with_config(&source, profile, &config(4)).unwrap();
    assert!(result.metrics.chunks.len() > 1);
    let strings = result.tokens.of_kind(TokenKind::String).count();
    let comments = result.tokens.of_kind(TokenKind::Comment).count();
    assert_eq!(strings, 300);
    assert_eq!(comments, 300);
    assert_eq!(result.metrics.invalid, 0);
}

#[test]
fn symbolic_forms_classify_as_expected() {
    let tokens = run(RACKET, builtin::symbolic().unwrap(), 1);
    let kind_of = |text: &str| {
        tokens
            .iter()
            .find(|t| t.text == text)
            .map(|t| t.kind)
            .unwrap_or_else(|| panic!("no token {:?}", text))
    };

    assert_eq!(kind_of("string->label"), TokenKind::Identifier);
    assert_eq!(kind_of("*debug*"), TokenKind::Identifier);
    assert_eq!(kind_of("-5"), TokenKind::Number);
    assert_eq!(kind_of("2.5i"), TokenKind::Number);
    assert_eq!(kind_of("#\\space"), TokenKind::Character);
    assert_eq!(kind_of("#true"), TokenKind::Boolean);
    assert_eq!(kind_of("'positive"), TokenKind::Symbol);
    assert_eq!(kind_of("`(a ,b ,@rest)"), TokenKind::Symbol);
    assert_eq!(kind_of("#| block #| nested |# comment |#"), TokenKind::Comment);
    assert_eq!(kind_of("<"), TokenKind::Operator);
}

#[test]
fn query_words_and_literals() {
    let tokens = run(SQL, builtin::query().unwrap(), 1);
    let kind_of = |text: &str| tokens.iter().find(|t| t.text == text).map(|t| t.kind);

    assert_eq!(kind_of("@since"), Some(TokenKind::Variable));
    assert_eq!(kind_of("N'bob'"), Some(TokenKind::String));
    assert_eq!(kind_of("`weird col`"), Some(TokenKind::String));
    assert_eq!(kind_of("ROW_NUMBER"), Some(TokenKind::Function));
    assert_eq!(kind_of("nvarchar2"), Some(TokenKind::Datatype));
    assert_eq!(kind_of("::"), Some(TokenKind::Operator));
    assert_eq!(kind_of("/* all users */"), Some(TokenKind::Comment));
    assert_eq!(kind_of("select"), Some(TokenKind::Keyword));
}

#[test]
fn invalid_characters_stay_in_the_stream() {
    let source = "a = 1 $ 2";
    let tokens = run(source, builtin::imperative().unwrap(), 1);
    assert_eq!(tokens.reconstruct(), source);
    let invalid: Vec<_> = tokens.invalid_tokens().collect();
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].text, "$");
    assert_eq!(invalid[0].kind, TokenKind::Unknown);
    assert_eq!(invalid[0].issue, Some(LexicalIssue::InvalidCharacter));
}
