//! Lexemes, tokens and token kinds
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::logging::codes::{self, Code};

/// Raw substring bounded by the scanner, with its starting byte offset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexeme {
    pub text: String,
    pub offset: usize,
}

impl Lexeme {
    pub fn new(text: impl Into<String>, offset: usize) -> Self {
        Self {
            text: text.into(),
            offset,
        }
    }

    /// Byte offset one past the last byte
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Keyword,
    Identifier,
    Operator,
    Delimiter,
    Number,
    String,
    Comment,
    Whitespace,
    Builtin,
    Function,
    Datatype,
    Variable,
    Boolean,
    Character,
    Symbol,
    Unknown,
}

/// Coarse grouping used by renderers and stream filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenClass {
    /// Keywords and other reserved or well-known words
    Word,
    Identifier,
    Operation,
    Literal,
    Punctuation,
    /// Whitespace and comments
    Trivia,
    Invalid,
}

impl TokenKind {
    pub const ALL: [TokenKind; 16] = [
        TokenKind::Keyword,
        TokenKind::Identifier,
        TokenKind::Operator,
        TokenKind::Delimiter,
        TokenKind::Number,
        TokenKind::String,
        TokenKind::Comment,
        TokenKind::Whitespace,
        TokenKind::Builtin,
        TokenKind::Function,
        TokenKind::Datatype,
        TokenKind::Variable,
        TokenKind::Boolean,
        TokenKind::Character,
        TokenKind::Symbol,
        TokenKind::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Delimiter => "DELIMITER",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Comment => "COMMENT",
            TokenKind::Whitespace => "WHITESPACE",
            TokenKind::Builtin => "BUILTIN",
            TokenKind::Function => "FUNCTION",
            TokenKind::Datatype => "DATATYPE",
            TokenKind::Variable => "VARIABLE",
            TokenKind::Boolean => "BOOLEAN",
            TokenKind::Character => "CHARACTER",
            TokenKind::Symbol => "SYMBOL",
            TokenKind::Unknown => "UNKNOWN",
        }
    }

    pub fn class(&self) -> TokenClass {
        match self {
            TokenKind::Keyword | TokenKind::Builtin | TokenKind::Function | TokenKind::Datatype => {
                TokenClass::Word
            }
            TokenKind::Identifier | TokenKind::Variable => TokenClass::Identifier,
            TokenKind::Operator => TokenClass::Operation,
            TokenKind::Number
            | TokenKind::String
            | TokenKind::Boolean
            | TokenKind::Character
            | TokenKind::Symbol => TokenClass::Literal,
            TokenKind::Delimiter => TokenClass::Punctuation,
            TokenKind::Whitespace | TokenKind::Comment => TokenClass::Trivia,
            TokenKind::Unknown => TokenClass::Invalid,
        }
    }

    pub fn is_trivia(&self) -> bool {
        self.class() == TokenClass::Trivia
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a token was flagged invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LexicalIssue {
    /// Single character outside the profile alphabet
    InvalidCharacter,
    /// String, comment or quoted list with no closer before end of input
    UnterminatedLiteral,
    /// Rejected by the fallback state machine
    UnclassifiableLexeme,
    /// Chunk lost to a worker fault under the degrade policy
    DegradedChunk,
}

impl LexicalIssue {
    pub fn code(&self) -> Code {
        match self {
            LexicalIssue::InvalidCharacter => codes::lexical::INVALID_CHARACTER,
            LexicalIssue::UnterminatedLiteral => codes::lexical::UNTERMINATED_LITERAL,
            LexicalIssue::UnclassifiableLexeme => codes::lexical::UNCLASSIFIABLE_LEXEME,
            LexicalIssue::DegradedChunk => codes::scheduler::CHUNK_DEGRADED,
        }
    }

    pub fn describe(&self) -> &'static str {
        codes::get_description(self.code().as_str())
    }
}

/// Classified lexeme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<LexicalIssue>,
}

impl Token {
    pub fn valid(kind: TokenKind, lexeme: Lexeme) -> Self {
        Self {
            kind,
            text: lexeme.text,
            offset: lexeme.offset,
            valid: true,
            issue: None,
        }
    }

    /// Invalid token keeping its best-guess kind
    pub fn invalid(kind: TokenKind, lexeme: Lexeme, issue: LexicalIssue) -> Self {
        Self {
            kind,
            text: lexeme.text,
            offset: lexeme.offset,
            valid: false,
            issue: Some(issue),
        }
    }

    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    pub fn is_significant(&self) -> bool {
        !self.kind.is_trivia()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})@{}", self.kind, self.text, self.offset)?;
        if !self.valid {
            write!(f, " invalid")?;
        }
        Ok(())
    }
}
