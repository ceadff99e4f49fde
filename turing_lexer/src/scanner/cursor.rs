//! Forward-only character cursor over the unscanned remainder of a source

pub(crate) struct Cursor<'a> {
    rest: &'a str,
    consumed: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(rest: &'a str) -> Self {
        Self { rest, consumed: 0 }
    }

    /// Bytes consumed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn remaining(&self) -> &'a str {
        &self.rest[self.consumed..]
    }

    pub fn is_eof(&self) -> bool {
        self.consumed >= self.rest.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining().chars().nth(n)
    }

    pub fn starts_with(&self, pattern: &str) -> bool {
        self.remaining().starts_with(pattern)
    }

    pub fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.consumed += ch.len_utf8();
        Some(ch)
    }

    /// Consumes `pattern` if the remainder starts with it
    pub fn eat_str(&mut self, pattern: &str) -> bool {
        if self.starts_with(pattern) {
            self.consumed += pattern.len();
            true
        } else {
            false
        }
    }

    /// Returns the number of bytes eaten
    pub fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> usize {
        let before = self.consumed;
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.consumed += ch.len_utf8();
        }
        self.consumed - before
    }

    /// `Some(consumed)` when anything was consumed
    pub fn finish(&self) -> Option<usize> {
        (self.consumed > 0).then_some(self.consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_walks_multibyte() {
        let mut cursor = Cursor::new("λx");
        assert_eq!(cursor.bump(), Some('λ'));
        assert_eq!(cursor.consumed(), 2);
        assert_eq!(cursor.peek(), Some('x'));
        assert_eq!(cursor.peek_nth(1), None);
    }

    #[test]
    fn test_eat_helpers() {
        let mut cursor = Cursor::new("--  note\nrest");
        assert!(cursor.eat_str("--"));
        assert!(!cursor.eat_str("--"));
        assert_eq!(cursor.eat_while(|c| c == ' '), 2);
        cursor.eat_while(|c| c != '\n');
        assert_eq!(cursor.remaining(), "\nrest");
        assert_eq!(cursor.finish(), Some(8));
        assert!(!cursor.is_eof());
    }
}
