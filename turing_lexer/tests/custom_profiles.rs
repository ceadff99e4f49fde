//! Profiles loaded from TOML files drive the same pipeline as the built-ins

use std::io::Write;
use std::sync::Arc;

use assert_matches::assert_matches;
use tempfile::NamedTempFile;
use turing_lexer::profile::builtin;
use turing_lexer::{process_source_with_config, LexiconProfile, PipelineConfig, ProfileError, TokenKind};

const TINY: &str = r#"
id = "tiny"
aliases = ["tn"]
description = "Tiny test language"
case_rule = "insensitive"
keywords = ["let", "print"]
operators = ["=", "+", "==", "=>"]
delimiters = "();"
quotes = "\""
line_comment = "//"

[numbers]
hex = true

[[literals]]
form = "variable"
sigil = "$"
"#;

fn write_profile(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn toml_profile_drives_tokenization() {
    let file = write_profile(TINY);
    let profile = LexiconProfile::from_toml_file(file.path()).unwrap().into_shared();
    assert_eq!(profile.id(), "tiny");
    assert_eq!(profile.aliases(), ["tn".to_string()]);

    let source = "LET $x = 0xFF + 2; // sum\nprint($x == \"done\")";
    let config = PipelineConfig::default().with_workers(2).always_parallel();
    let result = process_source_with_config(source, profile, &config).unwrap();

    assert_eq!(result.tokens.reconstruct(), source);
    assert_eq!(result.metrics.invalid, 0);

    let significant: Vec<(TokenKind, &str)> = result
        .tokens
        .significant()
        .map(|t| (t.kind, t.text.as_str()))
        .collect();
    assert_eq!(
        significant,
        vec![
            (TokenKind::Keyword, "LET"),
            (TokenKind::Variable, "$x"),
            (TokenKind::Operator, "="),
            (TokenKind::Number, "0xFF"),
            (TokenKind::Operator, "+"),
            (TokenKind::Number, "2"),
            (TokenKind::Delimiter, ";"),
            (TokenKind::Keyword, "print"),
            (TokenKind::Delimiter, "("),
            (TokenKind::Variable, "$x"),
            (TokenKind::Operator, "=="),
            (TokenKind::String, "\"done\""),
            (TokenKind::Delimiter, ")"),
        ]
    );
    assert_eq!(result.tokens.of_kind(TokenKind::Comment).count(), 1);
}

#[test]
fn builtin_profile_survives_a_file_round_trip() {
    let original = builtin::query().unwrap();
    let file = write_profile(&original.to_toml_string().unwrap());
    let reloaded = LexiconProfile::from_toml_file(file.path()).unwrap().into_shared();
    assert_eq!(reloaded.definition(), original.definition());

    let source = "select Count(*) from t where x::int <> @limit -- done\n";
    let config = PipelineConfig::default().with_workers(1);
    let a = process_source_with_config(source, Arc::clone(&original), &config).unwrap();
    let b = process_source_with_config(source, reloaded, &config).unwrap();
    assert_eq!(a.tokens, b.tokens);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = LexiconProfile::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
    assert_matches!(err, ProfileError::Io { .. });
    assert_eq!(err.error_code().as_str(), "E011");
}

#[test]
fn invalid_definitions_are_rejected() {
    let too_long = write_profile("id = \"bad\"\noperators = [\"====\"]\n");
    assert_matches!(
        LexiconProfile::from_toml_file(too_long.path()),
        Err(ProfileError::OperatorTooLong { length: 4, .. })
    );

    let overlap = write_profile("id = \"bad\"\noperators = [\";\"]\ndelimiters = \";\"\n");
    assert_matches!(
        LexiconProfile::from_toml_file(overlap.path()),
        Err(ProfileError::OperatorDelimiterOverlap { .. })
    );

    let malformed = write_profile("id = [");
    let err = LexiconProfile::from_toml_file(malformed.path()).unwrap_err();
    assert_matches!(err, ProfileError::Parse(_));
}
