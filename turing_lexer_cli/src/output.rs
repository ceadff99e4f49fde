//! Token stream rendering: aligned text table or JSON
use serde::Serialize;

use turing_lexer::utils::LineIndex;
use turing_lexer::{RunMetrics, Token, TokenStream};

/// JSON document written by `tokenize --format json`
#[derive(Debug, Serialize)]
pub struct TokenizeReport<'a> {
    pub source: &'a str,
    pub profile: &'a str,
    pub token_count: usize,
    pub invalid_count: usize,
    pub tokens: &'a [Token],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<&'a RunMetrics>,
}

pub fn render_json(report: &TokenizeReport<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// One row per token: `line:col  KIND  "text"`, invalid rows flagged with the issue code
pub fn render_text(source: &str, tokens: &TokenStream, include_trivia: bool) -> String {
    let index = LineIndex::new(source);
    let mut lines = Vec::with_capacity(tokens.len());

    for token in tokens.iter() {
        if !include_trivia && token.valid && !token.is_significant() {
            continue;
        }
        let position = index.position_at(token.offset);
        let location = format!("{}:{}", position.line, position.column);
        let mut row = format!("{:>9}  {:<11} {:?}", location, token.kind.as_str(), token.text);
        if let Some(issue) = token.issue {
            row.push_str(&format!("  [{}] {}", issue.code(), issue.describe()));
        }
        lines.push(row);
    }

    lines.join("\n")
}

/// Invalid tokens with a source snippet each, for stderr
pub fn render_diagnostics(source: &str, tokens: &TokenStream) -> Vec<String> {
    let index = LineIndex::new(source);
    tokens
        .invalid_tokens()
        .map(|token| {
            let span = index.span_of(token.offset, token.text.len());
            let message = match token.issue {
                Some(issue) => format!("{} [{}]: {}", token.kind, issue.code(), issue.describe()),
                None => format!("{}: invalid token", token.kind),
            };
            index.format_snippet(&span, &message)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use turing_lexer::profile::builtin;
    use turing_lexer::{process_source_with_config, PipelineConfig};

    fn tokenize(source: &str) -> TokenStream {
        let config = PipelineConfig::default().with_workers(1);
        process_source_with_config(source, builtin::query().unwrap(), &config)
            .unwrap()
            .tokens
    }

    #[test]
    fn test_text_rows_skip_trivia() {
        let source = "SELECT x\nFROM t -- all";
        let tokens = tokenize(source);
        let text = render_text(source, &tokens, false);
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].contains("1:1") && rows[0].contains("KEYWORD"));
        assert!(rows[2].contains("2:1") && rows[2].contains("\"FROM\""));

        let full = render_text(source, &tokens, true);
        assert_eq!(full.lines().count(), tokens.len());
    }

    #[test]
    fn test_invalid_rows_carry_issue_code() {
        let source = "SELECT 'open";
        let tokens = tokenize(source);
        let text = render_text(source, &tokens, false);
        assert!(text.contains("[E021]"));
        let diagnostics = render_diagnostics(source, &tokens);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].contains("1:8"));
    }

    #[test]
    fn test_json_report_shape() {
        let source = "select 1";
        let tokens = tokenize(source);
        let report = TokenizeReport {
            source: "inline",
            profile: "query",
            token_count: tokens.len(),
            invalid_count: tokens.invalid_count(),
            tokens: tokens.tokens(),
            metrics: None,
        };
        let value: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert_eq!(value["token_count"], 3);
        assert_eq!(value["tokens"][0]["kind"], serde_json::json!(tokens.tokens()[0].kind));
        assert!(value.get("metrics").is_none());
    }
}
