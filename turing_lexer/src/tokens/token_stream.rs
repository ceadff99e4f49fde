//! Ordered token output of one run

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tokens::token::{Token, TokenKind};

/// A broken stream property, found by [`TokenStream::verify`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamViolation {
    #[error("token {index} starts at {offset}, expected {expected}")]
    Gap {
        index: usize,
        offset: usize,
        expected: usize,
    },

    #[error("token {index} at {offset} does not match the source text")]
    TextMismatch { index: usize, offset: usize },

    #[error("empty token at index {index}")]
    EmptyToken { index: usize },

    #[error("stream covers {covered} bytes of a {source_len}-byte source")]
    Truncated { covered: usize, source_len: usize },
}

/// Tokens in source order plus an index of the significant ones
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStream {
    tokens: Vec<Token>,
    #[serde(skip)]
    significant_indices: Vec<usize>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        let significant_indices = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.is_significant())
            .map(|(i, _)| i)
            .collect();
        Self {
            tokens,
            significant_indices,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Tokens other than whitespace and comments, in order
    pub fn significant(&self) -> impl Iterator<Item = &Token> + '_ {
        self.significant_indices.iter().map(|&i| &self.tokens[i])
    }

    pub fn significant_count(&self) -> usize {
        self.significant_indices.len()
    }

    /// Concatenated token text; equals the source for a lossless stream
    pub fn reconstruct(&self) -> String {
        let capacity = self.tokens.iter().map(|t| t.text.len()).sum();
        self.tokens
            .iter()
            .fold(String::with_capacity(capacity), |mut acc, token| {
                acc.push_str(&token.text);
                acc
            })
    }

    /// Check losslessness and monotonic offsets against the source
    pub fn verify(&self, source: &str) -> Result<(), StreamViolation> {
        let mut expected = 0usize;
        for (index, token) in self.tokens.iter().enumerate() {
            if token.text.is_empty() {
                return Err(StreamViolation::EmptyToken { index });
            }
            if token.offset != expected {
                return Err(StreamViolation::Gap {
                    index,
                    offset: token.offset,
                    expected,
                });
            }
            if source.get(token.offset..token.end()) != Some(token.text.as_str()) {
                return Err(StreamViolation::TextMismatch {
                    index,
                    offset: token.offset,
                });
            }
            expected = token.end();
        }

        if expected != source.len() {
            return Err(StreamViolation::Truncated {
                covered: expected,
                source_len: source.len(),
            });
        }
        Ok(())
    }

    pub fn invalid_tokens(&self) -> impl Iterator<Item = &Token> + '_ {
        self.tokens.iter().filter(|t| !t.valid)
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid_tokens().count()
    }

    pub fn of_kind(&self, kind: TokenKind) -> impl Iterator<Item = &Token> + '_ {
        self.tokens.iter().filter(move |t| t.kind == kind)
    }

    pub fn counts_by_kind(&self) -> BTreeMap<TokenKind, usize> {
        let mut counts = BTreeMap::new();
        for token in &self.tokens {
            *counts.entry(token.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Token covering a byte offset
    pub fn token_at_offset(&self, offset: usize) -> Option<&Token> {
        let index = match self.tokens.binary_search_by(|t| t.offset.cmp(&offset)) {
            Ok(exact) => exact,
            Err(0) => return None,
            Err(insert) => insert - 1,
        };
        self.tokens.get(index).filter(|t| offset < t.end())
    }

    /// Kind and text pairs, handy for comparing runs
    pub fn kinds_and_texts(&self) -> Vec<(TokenKind, &str)> {
        self.tokens
            .iter()
            .map(|t| (t.kind, t.text.as_str()))
            .collect()
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::token::{LexicalIssue, Lexeme};
    use assert_matches::assert_matches;

    fn stream(parts: &[(TokenKind, &str)]) -> TokenStream {
        let mut offset = 0;
        let tokens = parts
            .iter()
            .map(|(kind, text)| {
                let token = Token::valid(*kind, Lexeme::new(*text, offset));
                offset += text.len();
                token
            })
            .collect();
        TokenStream::new(tokens)
    }

    #[test]
    fn test_reconstruct_and_verify() {
        let s = stream(&[
            (TokenKind::Keyword, "if"),
            (TokenKind::Whitespace, " "),
            (TokenKind::Identifier, "x"),
        ]);
        assert_eq!(s.reconstruct(), "if x");
        assert!(s.verify("if x").is_ok());
        assert_eq!(s.significant_count(), 2);
    }

    #[test]
    fn test_verify_detects_truncation_and_mismatch() {
        let s = stream(&[(TokenKind::Identifier, "ab")]);
        assert_matches!(s.verify("abc"), Err(StreamViolation::Truncated { covered: 2, .. }));
        assert_matches!(s.verify("xy"), Err(StreamViolation::TextMismatch { index: 0, .. }));
    }

    #[test]
    fn test_verify_detects_gap() {
        let tokens = vec![
            Token::valid(TokenKind::Identifier, Lexeme::new("a", 0)),
            Token::valid(TokenKind::Identifier, Lexeme::new("b", 2)),
        ];
        assert_matches!(
            TokenStream::new(tokens).verify("a b"),
            Err(StreamViolation::Gap { index: 1, offset: 2, expected: 1 })
        );
    }

    #[test]
    fn test_token_at_offset() {
        let s = stream(&[
            (TokenKind::Identifier, "abc"),
            (TokenKind::Operator, "=="),
            (TokenKind::Number, "1"),
        ]);
        assert_eq!(s.token_at_offset(0).map(|t| t.text.as_str()), Some("abc"));
        assert_eq!(s.token_at_offset(4).map(|t| t.text.as_str()), Some("=="));
        assert_eq!(s.token_at_offset(5).map(|t| t.text.as_str()), Some("1"));
        assert!(s.token_at_offset(6).is_none());
    }

    #[test]
    fn test_counts_and_invalid() {
        let tokens = vec![
            Token::valid(TokenKind::Number, Lexeme::new("1", 0)),
            Token::invalid(
                TokenKind::Unknown,
                Lexeme::new("$", 1),
                LexicalIssue::InvalidCharacter,
            ),
            Token::valid(TokenKind::Number, Lexeme::new("2", 2)),
        ];
        let s = TokenStream::new(tokens);
        assert_eq!(s.counts_by_kind().get(&TokenKind::Number), Some(&2));
        assert_eq!(s.invalid_count(), 1);
        assert_eq!(s.of_kind(TokenKind::Unknown).count(), 1);
    }
}
