//! Numeric literal parsing against a profile's `NumericGrammar`
use serde::Serialize;

use crate::profile::NumericGrammar;
use crate::scanner::cursor::Cursor;
use crate::scanner::rules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumericForm {
    Integer,
    Radix(u32),
    Decimal,
    Fraction,
    Exponent,
    Complex,
}

/// Shape of `text` when the whole of it is one number; `None` falls through
pub fn parse(text: &str, grammar: &NumericGrammar) -> Option<NumericForm> {
    let mut cursor = Cursor::new(text);
    if rules::number(&mut cursor, grammar)? != text.len() {
        return None;
    }

    let body = if grammar.signed {
        text.strip_prefix(['+', '-']).unwrap_or(text)
    } else {
        text
    };

    if let Some(radix) = radix_of(body, grammar) {
        let digits = &body[2..];
        return (!digits.is_empty() && digits.chars().all(|c| c.is_digit(radix)))
            .then_some(NumericForm::Radix(radix));
    }

    let form = if grammar.complex && body.ends_with('i') {
        NumericForm::Complex
    } else if grammar.exponent && body.contains(['e', 'E']) {
        NumericForm::Exponent
    } else if body.contains('/') {
        NumericForm::Fraction
    } else if body.contains('.') {
        NumericForm::Decimal
    } else {
        NumericForm::Integer
    };
    Some(form)
}

fn radix_of(body: &str, grammar: &NumericGrammar) -> Option<u32> {
    let mut chars = body.chars();
    if chars.next() != Some('0') {
        return None;
    }
    match chars.next()? {
        'x' | 'X' if grammar.hex => Some(16),
        'o' | 'O' if grammar.octal => Some(8),
        'b' | 'B' if grammar.binary => Some(2),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python() -> NumericGrammar {
        NumericGrammar {
            hex: true,
            octal: true,
            binary: true,
            ..NumericGrammar::default()
        }
    }

    fn racket() -> NumericGrammar {
        NumericGrammar {
            fractions: true,
            complex: true,
            signed: true,
            ..NumericGrammar::default()
        }
    }

    #[test]
    fn test_radix_literals() {
        assert_eq!(parse("0x1A", &python()), Some(NumericForm::Radix(16)));
        assert_eq!(parse("0o17", &python()), Some(NumericForm::Radix(8)));
        assert_eq!(parse("0b102", &python()), None);
        assert_eq!(parse("0x", &python()), None);
        assert_eq!(parse("0x1A", &NumericGrammar::default()), None);
    }

    #[test]
    fn test_plain_forms() {
        assert_eq!(parse("42", &python()), Some(NumericForm::Integer));
        assert_eq!(parse("3.14", &python()), Some(NumericForm::Decimal));
        assert_eq!(parse("1e-9", &python()), Some(NumericForm::Exponent));
        assert_eq!(parse("1.2.3", &python()), None);
        assert_eq!(parse("abc", &python()), None);
    }

    #[test]
    fn test_symbolic_forms() {
        assert_eq!(parse("3/4", &racket()), Some(NumericForm::Fraction));
        assert_eq!(parse("3/4", &python()), None);
        assert_eq!(parse("-5", &racket()), Some(NumericForm::Integer));
        assert_eq!(parse("-5", &python()), None);
        assert_eq!(parse("2i", &racket()), Some(NumericForm::Complex));
    }
}
