//! Fallback deterministic automaton
//!
//! Replays one lexeme character by character, plus a trailing `Input::End`
//! sentinel, through an explicit transition function. Every `(state, input)`
//! pair has exactly one outcome and nothing is re-read. The classifier only
//! consults it when no fast-path predicate matched, or to cross-check them.
//!
//! The machine's tape is its buffer: transitions look at the characters read
//! so far (for operator prefixes and comment markers) as well as the state.

mod state;

pub use state::{Action, Input, State};

use std::sync::Arc;

use crate::profile::LexiconProfile;
use crate::scanner::rules::literal_extent;
use crate::tokens::TokenKind;

/// Outcome of replaying one lexeme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// State after the terminal action
    pub state: State,
    pub action: Action,
    /// Bytes the accepted token covers
    pub consumed: usize,
    pub kind: Option<TokenKind>,
}

impl Verdict {
    pub fn accepted(&self) -> bool {
        matches!(self.action, Action::Accept | Action::AcceptAndPushback)
    }

    /// Accepted and covering exactly `len` bytes
    pub fn covers(&self, len: usize) -> bool {
        self.accepted() && self.consumed == len
    }
}

pub struct StateMachine {
    profile: Arc<LexiconProfile>,
    state: State,
    buffer: String,
    /// Start of the block-comment text not yet matched against markers
    marker_from: usize,
    steps: usize,
}

impl StateMachine {
    pub fn new(profile: Arc<LexiconProfile>) -> Self {
        Self {
            profile,
            state: State::Initial,
            buffer: String::new(),
            marker_from: 0,
            steps: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Transitions taken since construction
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn reset(&mut self) {
        self.state = State::Initial;
        self.buffer.clear();
        self.marker_from = 0;
    }

    /// Applies one transition and returns its action
    pub fn step(&mut self, input: Input) -> Action {
        let (next, action) = self.transition(input);
        self.steps += 1;

        if action == Action::Read {
            if let Input::Char(ch) = input {
                self.buffer.push(ch);
            }
        }
        if let State::BlockComment { depth: new_depth } = next {
            let unchanged = matches!(self.state, State::BlockComment { depth } if depth == new_depth);
            if !unchanged {
                self.marker_from = self.buffer.len();
            }
        }

        self.state = next;
        action
    }

    /// Replays `text` and reports the terminal state
    pub fn run(&mut self, text: &str) -> Verdict {
        self.reset();
        for ch in text.chars() {
            let action = self.step(Input::Char(ch));
            if action.is_terminal() {
                return self.verdict(action);
            }
        }
        let action = self.step(Input::End);
        self.verdict(action)
    }

    /// Token kind when the whole of `text` is accepted
    pub fn classify(&mut self, text: &str) -> Option<TokenKind> {
        let verdict = self.run(text);
        if verdict.covers(text.len()) {
            verdict.kind
        } else {
            None
        }
    }

    fn verdict(&self, action: Action) -> Verdict {
        let accepted = matches!(action, Action::Accept | Action::AcceptAndPushback);
        Verdict {
            state: self.state,
            action,
            consumed: if accepted { self.buffer.len() } else { 0 },
            kind: if accepted { self.kind_of_state() } else { None },
        }
    }

    fn kind_of_state(&self) -> Option<TokenKind> {
        match self.state {
            State::WhitespaceComplete => Some(TokenKind::Whitespace),
            State::StringComplete => Some(TokenKind::String),
            State::NumberComplete => Some(TokenKind::Number),
            State::CommentComplete => Some(TokenKind::Comment),
            State::OperatorComplete => Some(TokenKind::Operator),
            State::Delimiter => Some(TokenKind::Delimiter),
            State::LiteralComplete(kind) => Some(kind),
            State::IdentifierComplete => Some(
                self.profile
                    .word_kind(&self.buffer)
                    .unwrap_or(TokenKind::Identifier),
            ),
            _ => None,
        }
    }

    /// The transition function
    pub fn transition(&self, input: Input) -> (State, Action) {
        use Action::*;

        let profile = &*self.profile;
        match (self.state, input) {
            (State::Initial, Input::End) => (State::Reject, Reject),
            (State::Initial, Input::Char(c)) => {
                if is_blank(c) {
                    (State::Whitespace, Read)
                } else if profile.is_quote(c) {
                    (State::StringStarted { quote: c }, Read)
                } else if let Some(next) = self.symbol_state(c.encode_utf8(&mut [0; 4])) {
                    (next, Read)
                } else if profile.is_literal_lead(c) || (profile.numbers().signed && is_sign(c)) {
                    (State::OperatorStarted, Read)
                } else if profile.is_delimiter(c) {
                    (State::Delimiter, Read)
                } else if c.is_ascii_digit() {
                    (State::NumberStarted, Read)
                } else if profile.is_identifier_start(c) {
                    (State::KeywordCandidate, Read)
                } else {
                    (State::Reject, Reject)
                }
            }

            (State::Whitespace, Input::Char(c)) if is_blank(c) => (State::Whitespace, Read),
            (State::Whitespace, Input::Char(_)) => (State::WhitespaceComplete, AcceptAndPushback),
            (State::Whitespace, Input::End) => (State::WhitespaceComplete, Accept),

            (State::KeywordCandidate, Input::Char(c)) => {
                if profile.is_identifier_continue(c) {
                    (State::KeywordCandidate, Read)
                } else if profile.is_quote(c) && self.buffer_is_string_prefix() {
                    (State::StringStarted { quote: c }, Read)
                } else {
                    (State::IdentifierComplete, AcceptAndPushback)
                }
            }
            (State::KeywordCandidate, Input::End) => (State::IdentifierComplete, Accept),

            (State::StringStarted { quote }, Input::Char('\\')) => {
                (State::StringEscaped { quote }, Read)
            }
            (State::StringStarted { quote }, Input::Char(c)) if c == quote => {
                (State::StringComplete, Read)
            }
            (State::StringStarted { quote }, Input::Char(_)) => {
                (State::StringStarted { quote }, Read)
            }
            (State::StringEscaped { quote }, Input::Char(_)) => {
                (State::StringStarted { quote }, Read)
            }
            (State::StringStarted { .. } | State::StringEscaped { .. }, Input::End) => {
                (State::Reject, Reject)
            }
            (State::StringComplete, Input::Char(_)) => (State::StringComplete, AcceptAndPushback),
            (State::StringComplete, Input::End) => (State::StringComplete, Accept),

            (State::NumberStarted, Input::Char(c)) => self.number_started(c),
            (State::NumberStarted, Input::End) => (State::NumberComplete, Accept),

            (State::NumberRadix { radix, digits }, Input::Char(c)) => {
                if c.is_digit(radix) {
                    (State::NumberRadix { radix, digits: true }, Read)
                } else if c.is_ascii_alphanumeric() {
                    (State::Reject, Reject)
                } else if digits {
                    (State::NumberComplete, AcceptAndPushback)
                } else {
                    (State::Reject, Reject)
                }
            }
            (State::NumberRadix { digits, .. }, Input::End) => {
                if digits {
                    (State::NumberComplete, Accept)
                } else {
                    (State::Reject, Reject)
                }
            }

            (State::NumberDecimal, Input::Char(c)) => {
                let grammar = profile.numbers();
                if c.is_ascii_digit() {
                    (State::NumberDecimal, Read)
                } else if grammar.exponent && (c == 'e' || c == 'E') {
                    (State::NumberExponent { signed: false, digits: false }, Read)
                } else if grammar.complex && c == 'i' {
                    (State::NumberComplex, Read)
                } else {
                    self.number_end(c)
                }
            }
            (State::NumberDecimal, Input::End) => (State::NumberComplete, Accept),

            (State::NumberFraction { digits }, Input::Char(c)) => {
                let grammar = profile.numbers();
                if c.is_ascii_digit() {
                    (State::NumberFraction { digits: true }, Read)
                } else if digits && grammar.exponent && (c == 'e' || c == 'E') {
                    (State::NumberExponent { signed: false, digits: false }, Read)
                } else if digits && grammar.complex && c == 'i' {
                    (State::NumberComplex, Read)
                } else if digits {
                    self.number_end(c)
                } else {
                    (State::Reject, Reject)
                }
            }
            (State::NumberFraction { digits }, Input::End) => {
                if digits {
                    (State::NumberComplete, Accept)
                } else {
                    (State::Reject, Reject)
                }
            }

            (State::NumberExponent { signed, digits }, Input::Char(c)) => {
                if c.is_ascii_digit() {
                    (State::NumberExponent { signed, digits: true }, Read)
                } else if is_sign(c) && !signed && !digits {
                    (State::NumberExponent { signed: true, digits }, Read)
                } else if digits && profile.numbers().complex && c == 'i' {
                    (State::NumberComplex, Read)
                } else if digits {
                    self.number_end(c)
                } else {
                    (State::Reject, Reject)
                }
            }
            (State::NumberExponent { digits, .. }, Input::End) => {
                if digits {
                    (State::NumberComplete, Accept)
                } else {
                    (State::Reject, Reject)
                }
            }

            (State::NumberComplex, Input::Char(c)) => self.number_end(c),
            (State::NumberComplex, Input::End) => (State::NumberComplete, Accept),
            (State::NumberComplete, Input::Char(_)) => (State::NumberComplete, AcceptAndPushback),
            (State::NumberComplete, Input::End) => (State::NumberComplete, Accept),

            (State::LineComment, Input::Char('\n' | '\r')) => {
                (State::CommentComplete, AcceptAndPushback)
            }
            (State::LineComment, Input::Char(_)) => (State::LineComment, Read),
            (State::LineComment, Input::End) => (State::CommentComplete, Accept),

            (State::BlockComment { depth }, Input::Char(c)) => self.block_comment(depth, c),
            (State::BlockComment { .. }, Input::End) => (State::Reject, Reject),
            (State::CommentComplete, Input::Char(_)) => {
                (State::CommentComplete, AcceptAndPushback)
            }
            (State::CommentComplete, Input::End) => (State::CommentComplete, Accept),

            (State::OperatorStarted, Input::Char(c)) => self.operator_started(c),
            (State::OperatorStarted, Input::End) => {
                if let Some(kind) = self.literal_kind(&self.buffer) {
                    (State::LiteralComplete(kind), Accept)
                } else if profile.is_operator(&self.buffer) {
                    (State::OperatorComplete, Accept)
                } else if self.identifier_shaped(&self.buffer) {
                    (State::IdentifierComplete, Accept)
                } else {
                    (State::Reject, Reject)
                }
            }
            (State::OperatorComplete, Input::Char(_)) => {
                (State::OperatorComplete, AcceptAndPushback)
            }
            (State::OperatorComplete, Input::End) => (State::OperatorComplete, Accept),

            // literal bodies are bounded by the scanner, so read to the sentinel
            (State::LiteralStarted, Input::Char(_)) => (State::LiteralStarted, Read),
            (State::LiteralStarted, Input::End) => {
                if let Some(kind) = self.literal_kind(&self.buffer) {
                    (State::LiteralComplete(kind), Accept)
                } else if self.identifier_shaped(&self.buffer) {
                    (State::IdentifierComplete, Accept)
                } else {
                    (State::Reject, Reject)
                }
            }
            (State::LiteralComplete(kind), Input::Char(_)) => {
                (State::LiteralComplete(kind), AcceptAndPushback)
            }
            (State::LiteralComplete(kind), Input::End) => (State::LiteralComplete(kind), Accept),

            (State::IdentifierComplete, Input::Char(_)) => {
                (State::IdentifierComplete, AcceptAndPushback)
            }
            (State::IdentifierComplete, Input::End) => (State::IdentifierComplete, Accept),

            (State::Delimiter, Input::Char(_)) => (State::Delimiter, AcceptAndPushback),
            (State::Delimiter, Input::End) => (State::Delimiter, Accept),

            (State::WhitespaceComplete, Input::Char(_)) => {
                (State::WhitespaceComplete, AcceptAndPushback)
            }
            (State::WhitespaceComplete, Input::End) => (State::WhitespaceComplete, Accept),

            (State::Reject, _) => (State::Reject, Reject),
        }
    }

    /// Comment or operator state for a symbol run, if any marker or operator
    /// still matches it
    fn symbol_state(&self, candidate: &str) -> Option<State> {
        let profile = &*self.profile;
        let line = profile.line_comment();
        let block_open = profile.block_comment().map(|block| block.open.as_str());

        if line == Some(candidate) {
            Some(State::LineComment)
        } else if block_open == Some(candidate) {
            Some(State::BlockComment { depth: 1 })
        } else if profile.is_operator_prefix(candidate)
            || line.is_some_and(|m| m.starts_with(candidate))
            || block_open.is_some_and(|m| m.starts_with(candidate))
        {
            Some(State::OperatorStarted)
        } else {
            None
        }
    }

    fn operator_started(&self, c: char) -> (State, Action) {
        let profile = &*self.profile;
        let mut candidate = self.buffer.clone();
        candidate.push(c);

        if let Some(next) = self.symbol_state(&candidate) {
            return (next, Action::Read);
        }

        let lead = self.buffer.chars().next();
        if lead.is_some_and(|ch| profile.is_literal_lead(ch)) {
            (State::LiteralStarted, Action::Read)
        } else if profile.numbers().signed && is_sign_str(&self.buffer) && c.is_ascii_digit() {
            (State::NumberStarted, Action::Read)
        } else if profile.is_operator(&self.buffer) {
            if profile.operator_boundary()
                && profile.is_identifier_continue(c)
                && self.identifier_shaped(&self.buffer)
            {
                (State::KeywordCandidate, Action::Read)
            } else {
                (State::OperatorComplete, Action::AcceptAndPushback)
            }
        } else if self.identifier_shaped(&self.buffer) && profile.is_identifier_continue(c) {
            (State::KeywordCandidate, Action::Read)
        } else {
            (State::Reject, Action::Reject)
        }
    }

    fn number_started(&self, c: char) -> (State, Action) {
        let grammar = self.profile.numbers();
        let radix = match c {
            'x' | 'X' if grammar.hex => Some(16),
            'o' | 'O' if grammar.octal => Some(8),
            'b' | 'B' if grammar.binary => Some(2),
            _ => None,
        };
        let unsigned = self.buffer.trim_start_matches(['+', '-']);

        if c.is_ascii_digit() {
            (State::NumberStarted, Action::Read)
        } else if let (Some(radix), "0") = (radix, unsigned) {
            (State::NumberRadix { radix, digits: false }, Action::Read)
        } else if c == '.' {
            (State::NumberDecimal, Action::Read)
        } else if grammar.fractions && c == '/' {
            (State::NumberFraction { digits: false }, Action::Read)
        } else if grammar.exponent && (c == 'e' || c == 'E') {
            (State::NumberExponent { signed: false, digits: false }, Action::Read)
        } else if grammar.complex && c == 'i' {
            (State::NumberComplex, Action::Read)
        } else {
            self.number_end(c)
        }
    }

    /// A number may not run straight into identifier characters
    fn number_end(&self, c: char) -> (State, Action) {
        if c.is_ascii_alphanumeric() || c == '_' {
            (State::Reject, Action::Reject)
        } else {
            (State::NumberComplete, Action::AcceptAndPushback)
        }
    }

    fn block_comment(&self, depth: usize, c: char) -> (State, Action) {
        let Some(block) = self.profile.block_comment() else {
            return (State::Reject, Action::Reject);
        };
        let body = &self.buffer[self.marker_from..];
        let closes_with = |marker: &str| {
            let mut chars = marker.chars();
            chars.next_back() == Some(c) && body.ends_with(chars.as_str())
        };

        if closes_with(&block.close) {
            if depth <= 1 {
                (State::CommentComplete, Action::Read)
            } else {
                (State::BlockComment { depth: depth - 1 }, Action::Read)
            }
        } else if block.nesting && closes_with(&block.open) {
            (State::BlockComment { depth: depth + 1 }, Action::Read)
        } else {
            (State::BlockComment { depth }, Action::Read)
        }
    }

    fn literal_kind(&self, text: &str) -> Option<TokenKind> {
        self.profile
            .literals()
            .iter()
            .find(|form| {
                literal_extent(text, form, &self.profile)
                    .is_some_and(|extent| extent.terminated && extent.len == text.len())
            })
            .map(|form| form.kind())
    }

    fn identifier_shaped(&self, text: &str) -> bool {
        let mut chars = text.chars();
        chars
            .next()
            .is_some_and(|first| self.profile.is_identifier_start(first))
            && chars.all(|c| self.profile.is_identifier_continue(c))
    }

    fn buffer_is_string_prefix(&self) -> bool {
        self.profile
            .string_prefixes()
            .iter()
            .any(|prefix| *prefix == self.buffer)
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn is_sign(c: char) -> bool {
    c == '+' || c == '-'
}

fn is_sign_str(text: &str) -> bool {
    text == "+" || text == "-"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::builtin;

    fn kind(profile: Arc<LexiconProfile>, text: &str) -> Option<TokenKind> {
        StateMachine::new(profile).classify(text)
    }

    #[test]
    fn test_words() {
        let sql = builtin::query().unwrap();
        assert_eq!(kind(sql.clone(), "select"), Some(TokenKind::Keyword));
        assert_eq!(kind(sql.clone(), "users"), Some(TokenKind::Identifier));
        assert_eq!(kind(sql, "N'abc'"), Some(TokenKind::String));
    }

    #[test]
    fn test_operator_pushback_stops_short() {
        let sql = builtin::query().unwrap();
        let mut machine = StateMachine::new(sql);
        let verdict = machine.run("===");
        assert_eq!(verdict.action, Action::AcceptAndPushback);
        assert_eq!(verdict.consumed, 2);
        assert!(!verdict.covers(3));
        assert_eq!(machine.classify("==="), None);
        assert_eq!(machine.classify("::"), Some(TokenKind::Operator));
    }

    #[test]
    fn test_strings() {
        let py = builtin::imperative().unwrap();
        assert_eq!(kind(py.clone(), r#""a\"b""#), Some(TokenKind::String));
        assert_eq!(kind(py.clone(), "rb'x'"), Some(TokenKind::String));
        assert_eq!(kind(py, "\"open"), None);
    }

    #[test]
    fn test_numbers() {
        let py = builtin::imperative().unwrap();
        assert_eq!(kind(py.clone(), "0x1A"), Some(TokenKind::Number));
        assert_eq!(kind(py.clone(), "0b102"), None);
        assert_eq!(kind(py.clone(), "2.5e-3"), Some(TokenKind::Number));
        assert_eq!(kind(py.clone(), "1."), Some(TokenKind::Number));
        assert_eq!(kind(py.clone(), "12ab"), None);
        assert_eq!(kind(py, "3/4"), None);

        let racket = builtin::symbolic().unwrap();
        assert_eq!(kind(racket.clone(), "3/4"), Some(TokenKind::Number));
        assert_eq!(kind(racket.clone(), "-5"), Some(TokenKind::Number));
        assert_eq!(kind(racket.clone(), "2.5i"), Some(TokenKind::Number));
        assert_eq!(kind(racket, "3/"), None);
    }

    #[test]
    fn test_comments() {
        let racket = builtin::symbolic().unwrap();
        assert_eq!(kind(racket.clone(), "; note"), Some(TokenKind::Comment));
        assert_eq!(kind(racket.clone(), "#| a #| b |# c |#"), Some(TokenKind::Comment));
        assert_eq!(kind(racket.clone(), "#| a #| b |#"), None);
        assert_eq!(kind(racket, "#|#"), None);

        let sql = builtin::query().unwrap();
        assert_eq!(kind(sql.clone(), "/* x */"), Some(TokenKind::Comment));
        assert_eq!(kind(sql.clone(), "/**/"), Some(TokenKind::Comment));
        assert_eq!(kind(sql, "-- note"), Some(TokenKind::Comment));
    }

    #[test]
    fn test_symbolic_literals_and_identifiers() {
        let racket = builtin::symbolic().unwrap();
        assert_eq!(kind(racket.clone(), "#t"), Some(TokenKind::Boolean));
        assert_eq!(kind(racket.clone(), "#\\space"), Some(TokenKind::Character));
        assert_eq!(kind(racket.clone(), "'(a b)"), Some(TokenKind::Symbol));
        assert_eq!(kind(racket.clone(), "->string"), Some(TokenKind::Identifier));
        assert_eq!(kind(racket.clone(), "#lang"), Some(TokenKind::Keyword));
        assert_eq!(kind(racket.clone(), "<="), Some(TokenKind::Operator));
        assert_eq!(kind(racket, "string<?"), Some(TokenKind::Builtin));
    }

    #[test]
    fn test_reject_is_terminal() {
        let py = builtin::imperative().unwrap();
        let mut machine = StateMachine::new(py);
        let verdict = machine.run("$x");
        assert_eq!(verdict.state, State::Reject);
        assert_eq!(verdict.action, Action::Reject);
        assert_eq!(machine.step(Input::Char('a')), Action::Reject);
        assert_eq!(machine.step(Input::End), Action::Reject);
    }

    #[test]
    fn test_transition_is_deterministic() {
        let sql = builtin::query().unwrap();
        let machine = StateMachine::new(sql);
        let first = machine.transition(Input::Char('<'));
        let second = machine.transition(Input::Char('<'));
        assert_eq!(first, second);
        assert_eq!(first, (State::OperatorStarted, Action::Read));
        assert_eq!(machine.transition(Input::End), (State::Reject, Action::Reject));
    }

    #[test]
    fn test_whitespace_and_delimiters() {
        let sql = builtin::query().unwrap();
        assert_eq!(kind(sql.clone(), " \t"), Some(TokenKind::Whitespace));
        assert_eq!(kind(sql.clone(), "\n"), Some(TokenKind::Whitespace));
        assert_eq!(kind(sql.clone(), "("), Some(TokenKind::Delimiter));
        assert_eq!(kind(sql, "@v"), Some(TokenKind::Variable));
    }
}
