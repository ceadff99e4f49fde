//! Boundary rules, tried in `ScanRule::PRIORITY` order at every lexeme start
//!
//! Each rule looks at the unscanned remainder and either claims a prefix
//! (returning its byte length) or declines. `Fallback` always claims one
//! character, so the scanner can never stall.

use serde::{Deserialize, Serialize};

use super::cursor::Cursor;
use crate::profile::{LexiconProfile, LiteralForm, NumericGrammar};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanRule {
    Whitespace,
    Newline,
    QuotedString,
    PrefixedString,
    LineComment,
    BlockComment,
    PrefixedLiteral,
    Delimiter,
    Operator,
    Number,
    Identifier,
    Fallback,
}

impl ScanRule {
    pub const PRIORITY: [ScanRule; 12] = [
        ScanRule::Whitespace,
        ScanRule::Newline,
        ScanRule::QuotedString,
        ScanRule::PrefixedString,
        ScanRule::LineComment,
        ScanRule::BlockComment,
        ScanRule::PrefixedLiteral,
        ScanRule::Delimiter,
        ScanRule::Operator,
        ScanRule::Number,
        ScanRule::Identifier,
        ScanRule::Fallback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanRule::Whitespace => "whitespace",
            ScanRule::Newline => "newline",
            ScanRule::QuotedString => "quoted_string",
            ScanRule::PrefixedString => "prefixed_string",
            ScanRule::LineComment => "line_comment",
            ScanRule::BlockComment => "block_comment",
            ScanRule::PrefixedLiteral => "prefixed_literal",
            ScanRule::Delimiter => "delimiter",
            ScanRule::Operator => "operator",
            ScanRule::Number => "number",
            ScanRule::Identifier => "identifier",
            ScanRule::Fallback => "fallback",
        }
    }

    /// Byte length of the lexeme this rule claims at the start of `rest`
    pub fn apply(self, rest: &str, profile: &LexiconProfile) -> Option<usize> {
        let mut cursor = Cursor::new(rest);
        match self {
            ScanRule::Whitespace => whitespace(&mut cursor),
            ScanRule::Newline => newline(&mut cursor),
            ScanRule::QuotedString => quoted_string(&mut cursor, profile),
            ScanRule::PrefixedString => prefixed_string(&mut cursor, profile),
            ScanRule::LineComment => line_comment(&mut cursor, profile),
            ScanRule::BlockComment => block_comment(&mut cursor, profile),
            ScanRule::PrefixedLiteral => prefixed_literal(&mut cursor, profile),
            ScanRule::Delimiter => delimiter(&mut cursor, profile),
            ScanRule::Operator => operator(&mut cursor, profile),
            ScanRule::Number => number(&mut cursor, profile.numbers()),
            ScanRule::Identifier => identifier(&mut cursor, profile),
            ScanRule::Fallback => {
                cursor.bump();
                cursor.finish()
            }
        }
    }
}

fn whitespace(cursor: &mut Cursor) -> Option<usize> {
    cursor.eat_while(|c| c == ' ' || c == '\t');
    cursor.finish()
}

fn newline(cursor: &mut Cursor) -> Option<usize> {
    match cursor.peek() {
        Some('\n') | Some('\r') => {
            cursor.bump();
            cursor.finish()
        }
        _ => None,
    }
}

/// Length of a string, comment or literal, and whether its closer was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Extent {
    pub len: usize,
    pub terminated: bool,
}

fn quoted_string(cursor: &mut Cursor, profile: &LexiconProfile) -> Option<usize> {
    cursor.peek().filter(|c| profile.is_quote(*c))?;
    string_extent(cursor.remaining(), profile).map(|extent| extent.len)
}

fn prefixed_string(cursor: &mut Cursor, profile: &LexiconProfile) -> Option<usize> {
    matching_prefix(cursor.remaining(), profile)?;
    string_extent(cursor.remaining(), profile).map(|extent| extent.len)
}

/// String prefix immediately followed by a quote
fn matching_prefix<'p>(rest: &str, profile: &'p LexiconProfile) -> Option<&'p str> {
    profile
        .string_prefixes()
        .iter()
        .find(|prefix| {
            rest.starts_with(prefix.as_str())
                && rest[prefix.len()..]
                    .chars()
                    .next()
                    .is_some_and(|c| profile.is_quote(c))
        })
        .map(String::as_str)
}

/// Plain or prefixed string at the start of `rest`
pub(crate) fn string_extent(rest: &str, profile: &LexiconProfile) -> Option<Extent> {
    let mut cursor = Cursor::new(rest);
    if !cursor.peek().is_some_and(|c| profile.is_quote(c)) {
        cursor.eat_str(matching_prefix(rest, profile)?);
    }
    let quote = cursor.bump()?;

    // `\` takes the next character unconditionally
    let mut terminated = false;
    while let Some(ch) = cursor.bump() {
        if ch == '\\' {
            cursor.bump();
        } else if ch == quote {
            terminated = true;
            break;
        }
    }

    Some(Extent {
        len: cursor.consumed(),
        terminated,
    })
}

fn line_comment(cursor: &mut Cursor, profile: &LexiconProfile) -> Option<usize> {
    let marker = profile.line_comment()?;
    if !cursor.eat_str(marker) {
        return None;
    }
    cursor.eat_while(|c| c != '\n' && c != '\r');
    cursor.finish()
}

fn block_comment(cursor: &mut Cursor, profile: &LexiconProfile) -> Option<usize> {
    block_comment_extent(cursor.remaining(), profile).map(|extent| extent.len)
}

/// Closers are only matched after the opener, so `#|#` stays open
pub(crate) fn block_comment_extent(rest: &str, profile: &LexiconProfile) -> Option<Extent> {
    let block = profile.block_comment()?;
    let mut cursor = Cursor::new(rest);
    if !cursor.eat_str(&block.open) {
        return None;
    }

    let mut depth = 1usize;
    while !cursor.is_eof() {
        if block.nesting && cursor.eat_str(&block.open) {
            depth += 1;
        } else if cursor.eat_str(&block.close) {
            depth -= 1;
            if depth == 0 {
                break;
            }
        } else {
            cursor.bump();
        }
    }

    Some(Extent {
        len: cursor.consumed(),
        terminated: depth == 0,
    })
}

fn prefixed_literal(cursor: &mut Cursor, profile: &LexiconProfile) -> Option<usize> {
    let lead = cursor.peek()?;
    if !profile.is_literal_lead(lead) {
        return None;
    }
    profile
        .literals()
        .iter()
        .find_map(|form| literal_extent(cursor.remaining(), form, profile))
        .map(|extent| extent.len)
}

/// Extent of `form` at the start of `rest`
pub(crate) fn literal_extent(rest: &str, form: &LiteralForm, profile: &LexiconProfile) -> Option<Extent> {
    let mut cursor = Cursor::new(rest);
    let closed = |len: usize| Extent {
        len,
        terminated: true,
    };

    match form {
        LiteralForm::Variable { sigil } => {
            if cursor.peek() != Some(*sigil) {
                return None;
            }
            cursor.eat_while(|c| c == *sigil);
            if cursor.eat_while(|c| profile.is_identifier_continue(c)) == 0 {
                return None;
            }
            Some(closed(cursor.consumed()))
        }
        LiteralForm::Boolean { spellings } => spellings
            .iter()
            .filter(|spelling| {
                rest.starts_with(spelling.as_str()) && at_boundary(&rest[spelling.len()..], profile)
            })
            .map(|spelling| spelling.len())
            .max()
            .map(closed),
        LiteralForm::Character { prefix, names } => {
            if !cursor.eat_str(prefix) {
                return None;
            }
            let after = cursor.remaining();
            let named = names
                .iter()
                .filter(|name| {
                    after.starts_with(name.as_str()) && at_boundary(&after[name.len()..], profile)
                })
                .map(|name| name.len())
                .max();
            match named {
                Some(len) => Some(closed(cursor.consumed() + len)),
                None => {
                    let terminated = cursor.bump().is_some();
                    Some(Extent {
                        len: cursor.consumed(),
                        terminated,
                    })
                }
            }
        }
        LiteralForm::QuotedSymbol { sigil } => {
            if cursor.peek() != Some(*sigil) {
                return None;
            }
            match cursor.peek_nth(1) {
                Some('(') => {
                    cursor.bump();
                    let mut depth = 0usize;
                    let mut terminated = false;
                    while let Some(ch) = cursor.bump() {
                        match ch {
                            '(' => depth += 1,
                            ')' => {
                                depth -= 1;
                                if depth == 0 {
                                    terminated = true;
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                    Some(Extent {
                        len: cursor.consumed(),
                        terminated,
                    })
                }
                Some(next) if profile.is_identifier_continue(next) => {
                    cursor.bump();
                    cursor.eat_while(|c| profile.is_identifier_continue(c));
                    Some(closed(cursor.consumed()))
                }
                _ => None,
            }
        }
    }
}

/// No identifier character follows
fn at_boundary(after: &str, profile: &LexiconProfile) -> bool {
    after
        .chars()
        .next()
        .map_or(true, |c| !profile.is_identifier_continue(c))
}

fn delimiter(cursor: &mut Cursor, profile: &LexiconProfile) -> Option<usize> {
    cursor.peek().filter(|c| profile.is_delimiter(*c))?;
    cursor.bump();
    cursor.finish()
}

/// Maximal munch over 3-, 2- then 1-character candidates
fn operator(cursor: &mut Cursor, profile: &LexiconProfile) -> Option<usize> {
    let rest = cursor.remaining();
    let ends: Vec<usize> = rest
        .char_indices()
        .skip(1)
        .map(|(i, _)| i)
        .chain(std::iter::once(rest.len()))
        .take(profile.max_operator_chars())
        .collect();

    let end = ends
        .iter()
        .rev()
        .copied()
        .find(|end| profile.is_operator(&rest[..*end]))?;

    if profile.operator_boundary() && !at_boundary(&rest[end..], profile) {
        return None;
    }
    Some(end)
}

pub(crate) fn number(cursor: &mut Cursor, grammar: &NumericGrammar) -> Option<usize> {
    let first = cursor.peek()?;
    if grammar.signed && (first == '+' || first == '-') {
        if !cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }
        cursor.bump();
    } else if !first.is_ascii_digit() {
        return None;
    }

    if cursor.peek() == Some('0') {
        let radix_enabled = match cursor.peek_nth(1) {
            Some('x') | Some('X') => grammar.hex,
            Some('o') | Some('O') => grammar.octal,
            Some('b') | Some('B') => grammar.binary,
            _ => false,
        };
        if radix_enabled {
            cursor.bump();
            cursor.bump();
            cursor.eat_while(|c| c.is_ascii_alphanumeric());
            return cursor.finish();
        }
    }

    cursor.eat_while(|c| c.is_ascii_digit());

    let mut decimal = false;
    if cursor.peek() == Some('.') {
        cursor.bump();
        cursor.eat_while(|c| c.is_ascii_digit());
        decimal = true;
    }

    if grammar.fractions
        && !decimal
        && cursor.peek() == Some('/')
        && cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
    {
        cursor.bump();
        cursor.eat_while(|c| c.is_ascii_digit());
    }

    if grammar.exponent && matches!(cursor.peek(), Some('e') | Some('E')) {
        let digit_at = match cursor.peek_nth(1) {
            Some('+') | Some('-') => 2,
            _ => 1,
        };
        if cursor.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
            for _ in 0..digit_at {
                cursor.bump();
            }
            cursor.eat_while(|c| c.is_ascii_digit());
        }
    }

    if grammar.complex
        && cursor.peek() == Some('i')
        && !cursor
            .peek_nth(1)
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        cursor.bump();
    }

    cursor.finish()
}

fn identifier(cursor: &mut Cursor, profile: &LexiconProfile) -> Option<usize> {
    cursor.peek().filter(|c| profile.is_identifier_start(*c))?;
    cursor.bump();
    cursor.eat_while(|c| profile.is_identifier_continue(c));
    cursor.finish()
}
