use std::rc::Rc;

use crate::diagnostics::{EvalError, SourceSpan};

/// Read position into the text currently being parsed.
///
/// There is no token stream: the grammar looks one raw character ahead and
/// consumes characters directly. `position` is always a char boundary and
/// never exceeds `source.len()`.
#[derive(Debug, Clone)]
pub struct Cursor {
    source: Rc<str>,
    position: usize,
}

impl Cursor {
    pub fn new(source: impl Into<Rc<str>>) -> Self {
        Self {
            source: source.into(),
            position: 0,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    /// Consumes and returns the current character.
    pub fn advance(&mut self) -> Result<char, EvalError> {
        match self.peek() {
            Some(ch) => {
                self.position += ch.len_utf8();
                Ok(ch)
            }
            None => Err(EvalError::syntax(
                "unexpected end of input",
                SourceSpan::point(self.position),
            )),
        }
    }

    /// Consumes `expected` if it is the current character.
    pub fn matches(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.position += expected.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    /// Consumes the longest run of characters satisfying `predicate`.
    pub fn take_while<F>(&mut self, mut predicate: F) -> &str
    where
        F: FnMut(char) -> bool,
    {
        let start = self.position;
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.position += ch.len_utf8();
        }
        &self.source[start..self.position]
    }

    /// Consumes a name if the cursor is on a letter.
    pub fn take_name(&mut self) -> Option<&str> {
        if self.peek().is_some_and(is_alpha) {
            Some(self.take_while(is_name_char))
        } else {
            None
        }
    }

    /// Consumes `keyword` when it is immediately followed by whitespace.
    /// `variance` therefore never matches the keyword `var`.
    pub fn consume_keyword(&mut self, keyword: &str) -> bool {
        let rest = &self.source[self.position..];
        let Some(after) = rest.strip_prefix(keyword) else {
            return false;
        };
        if after.chars().next().is_some_and(char::is_whitespace) {
            self.position += keyword.len();
            true
        } else {
            false
        }
    }

    pub fn span_from(&self, start: usize) -> SourceSpan {
        SourceSpan::new(start, self.position)
    }
}

pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Names start with an ASCII letter.
pub fn is_alpha(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

/// After the first letter a name may continue with letters or `_`
/// (`sum_of_squares`), never digits.
pub fn is_name_char(ch: char) -> bool {
    is_alpha(ch) || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_walks_the_source_and_fails_at_end() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.advance(), Ok('a'));
        assert_eq!(cursor.peek(), Some('b'));
        assert_eq!(cursor.advance(), Ok('b'));
        assert!(cursor.is_at_end());
        let err = cursor.advance().unwrap_err();
        assert_eq!(err.span(), Some(SourceSpan::point(2)));
    }

    #[test]
    fn take_while_stops_at_first_mismatch() {
        let mut cursor = Cursor::new("abc1");
        assert_eq!(cursor.take_while(is_alpha), "abc");
        assert_eq!(cursor.position(), 3);
        assert_eq!(cursor.take_while(is_alpha), "");
    }

    #[test]
    fn keyword_requires_trailing_whitespace() {
        let mut cursor = Cursor::new("variance(1)");
        assert!(!cursor.consume_keyword("var"));
        assert_eq!(cursor.position(), 0);

        let mut cursor = Cursor::new("var x = 1");
        assert!(cursor.consume_keyword("var"));
        cursor.skip_whitespace();
        assert_eq!(cursor.peek(), Some('x'));

        let mut cursor = Cursor::new("var");
        assert!(!cursor.consume_keyword("var"));
    }

    #[test]
    fn identifiers_are_ascii_letters_only() {
        assert!(is_alpha('q'));
        assert!(!is_alpha('_'));
        assert!(!is_alpha('7'));
        assert!(!is_alpha('é'));
        assert!(is_digit('7'));
        assert!(is_name_char('_'));
        assert!(!is_name_char('1'));
    }

    #[test]
    fn names_start_with_a_letter() {
        let mut cursor = Cursor::new("sum_of_squares2");
        assert_eq!(cursor.take_name(), Some("sum_of_squares"));
        assert_eq!(cursor.peek(), Some('2'));

        let mut cursor = Cursor::new("_x");
        assert_eq!(cursor.take_name(), None);
        assert_eq!(cursor.position(), 0);
    }
}
