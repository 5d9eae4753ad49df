//! Word scanning: the maximal run of letters, digits, and underscores that
//! starts with a letter or underscore (spec.md §4.1). A word is not yet
//! classified as identifier or keyword here — that happens during phrase
//! folding in `core.rs`, since a single word can be the start, middle, or
//! tail of a multi-word keyword phrase.

use crate::cursor::Cursor;

pub fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_word_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Scans one word starting at the cursor's current position, returning its
/// original-case text. Panics if the cursor isn't at a word start; callers
/// dispatch on [`is_word_start`] first.
pub fn scan_word(cursor: &mut Cursor<'_>) -> String {
    let start = cursor.position();
    debug_assert!(is_word_start(cursor.current_char()));
    cursor.advance();
    while is_word_continue(cursor.current_char()) {
        cursor.advance();
    }
    cursor.slice_from(start).to_owned()
}

/// True if the cursor sits at a possessive marker `'s` that terminates the
/// word just scanned — `'` then `s` then a character that cannot continue
/// an identifier (so `bob's` splits into word `bob` + possessive, but a
/// char literal like `'s'` never reaches this check since it starts a new
/// token rather than following a word).
pub fn at_possessive_marker(cursor: &Cursor<'_>) -> bool {
    cursor.current_char() == '\''
        && cursor.peek_char(1) == 's'
        && !is_word_continue(cursor.peek_char(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_plain_word() {
        let mut cursor = Cursor::new("hello world");
        assert_eq!(scan_word(&mut cursor), "hello");
    }

    #[test]
    fn scans_word_with_digits_and_underscore() {
        let mut cursor = Cursor::new("user_age_1 rest");
        assert_eq!(scan_word(&mut cursor), "user_age_1");
    }

    #[test]
    fn preserves_original_case() {
        let mut cursor = Cursor::new("Bob");
        assert_eq!(scan_word(&mut cursor), "Bob");
    }

    #[test]
    fn detects_possessive_marker() {
        let mut cursor = Cursor::new("bob's age");
        let _ = scan_word(&mut cursor);
        assert!(at_possessive_marker(&cursor));
    }

    #[test]
    fn possessive_requires_non_continuing_char_after_s() {
        let mut cursor = Cursor::new("bobs age");
        let _ = scan_word(&mut cursor);
        assert!(!at_possessive_marker(&cursor));
    }
}
