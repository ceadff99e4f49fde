use serde::Serialize;
use std::fmt;

use crate::tokens::TokenKind;

/// One tape symbol: a character or the synthetic end-of-lexeme sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Char(char),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    Read,
    Accept,
    /// Token ends before the triggering character, which stays unconsumed
    AcceptAndPushback,
    Reject,
}

impl Action {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Action::Read)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum State {
    Initial,
    KeywordCandidate,
    StringStarted { quote: char },
    StringEscaped { quote: char },
    StringComplete,
    NumberStarted,
    NumberRadix { radix: u32, digits: bool },
    NumberDecimal,
    NumberFraction { digits: bool },
    NumberExponent { signed: bool, digits: bool },
    NumberComplex,
    NumberComplete,
    LineComment,
    BlockComment { depth: usize },
    CommentComplete,
    /// Symbol run that may still become an operator, comment marker or literal
    OperatorStarted,
    OperatorComplete,
    LiteralStarted,
    LiteralComplete(TokenKind),
    IdentifierComplete,
    Delimiter,
    Whitespace,
    WhitespaceComplete,
    Reject,
}

impl State {
    /// States a run may legitimately end in
    pub fn is_accepting(&self) -> bool {
        matches!(
            self,
            State::StringComplete
                | State::NumberComplete
                | State::CommentComplete
                | State::OperatorComplete
                | State::LiteralComplete(_)
                | State::IdentifierComplete
                | State::Delimiter
                | State::WhitespaceComplete
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            State::Initial => "INITIAL",
            State::KeywordCandidate => "KEYWORD_CANDIDATE",
            State::StringStarted { .. } => "STRING_STARTED",
            State::StringEscaped { .. } => "STRING_ESCAPED",
            State::StringComplete => "STRING_COMPLETE",
            State::NumberStarted => "NUMBER_STARTED",
            State::NumberRadix { .. } => "NUMBER_RADIX",
            State::NumberDecimal => "NUMBER_DECIMAL",
            State::NumberFraction { .. } => "NUMBER_FRACTION",
            State::NumberExponent { .. } => "NUMBER_EXPONENT",
            State::NumberComplex => "NUMBER_COMPLEX",
            State::NumberComplete => "NUMBER_COMPLETE",
            State::LineComment => "LINE_COMMENT",
            State::BlockComment { .. } => "BLOCK_COMMENT",
            State::CommentComplete => "COMMENT_COMPLETE",
            State::OperatorStarted => "OPERATOR_STARTED",
            State::OperatorComplete => "OPERATOR_COMPLETE",
            State::LiteralStarted => "LITERAL_STARTED",
            State::LiteralComplete(_) => "LITERAL_COMPLETE",
            State::IdentifierComplete => "IDENTIFIER_COMPLETE",
            State::Delimiter => "DELIMITER",
            State::Whitespace => "WHITESPACE",
            State::WhitespaceComplete => "WHITESPACE_COMPLETE",
            State::Reject => "REJECT",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
