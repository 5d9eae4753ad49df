//! Comment recognition: `note:`/`reminder:` to end of line, `notes: … end
//! notes` blocks, `//` to end of line, and `/* … */` spans (spec.md §4.1).
//! Comments are dropped entirely; they never produce a token.

use crate::cursor::Cursor;

/// If the cursor sits at the start of a comment, consumes it and returns
/// `true`. Otherwise leaves the cursor untouched and returns `false`.
pub fn skip_comment(cursor: &mut Cursor<'_>) -> bool {
    if cursor.remaining().starts_with("//") {
        while !cursor.is_at_end() && cursor.current_char() != '\n' {
            cursor.advance();
        }
        return true;
    }

    if cursor.remaining().starts_with("/*") {
        cursor.advance_n(2);
        while !cursor.is_at_end() && !cursor.remaining().starts_with("*/") {
            cursor.advance();
        }
        if !cursor.is_at_end() {
            cursor.advance_n(2);
        }
        return true;
    }

    if word_colon_ci(cursor, "notes") {
        cursor.advance_n(6); // "notes:"
        while !cursor.is_at_end() && !two_words_ci(cursor, "end", "notes") {
            cursor.advance();
        }
        if !cursor.is_at_end() {
            cursor.advance_n(3); // "end"
            cursor.skip_inline_whitespace();
            cursor.advance_n(5); // "notes"
        }
        return true;
    }

    if word_colon_ci(cursor, "note") || word_colon_ci(cursor, "reminder") {
        while !cursor.is_at_end() && cursor.current_char() != '\n' {
            cursor.advance();
        }
        return true;
    }

    false
}

/// True if the cursor sits at `word` followed immediately by `:`, compared
/// case-insensitively (keyword recognition is case-insensitive, spec.md §4.1).
fn word_colon_ci(cursor: &Cursor<'_>, word: &str) -> bool {
    let remaining = cursor.remaining();
    remaining.len() > word.len()
        && remaining[..word.len()].eq_ignore_ascii_case(word)
        && remaining.as_bytes()[word.len()] == b':'
}

fn two_words_ci(cursor: &Cursor<'_>, first: &str, second: &str) -> bool {
    let remaining = cursor.remaining();
    if remaining.len() < first.len() || !remaining[..first.len()].eq_ignore_ascii_case(first) {
        return false;
    }
    let rest = remaining[first.len()..].trim_start_matches([' ', '\t']);
    rest.len() >= second.len() && rest[..second.len()].eq_ignore_ascii_case(second)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> (bool, &str) {
        let mut cursor = Cursor::new(source);
        let consumed = skip_comment(&mut cursor);
        (consumed, cursor.remaining())
    }

    #[test]
    fn slash_slash_to_end_of_line() {
        let (consumed, rest) = run("// hello\nsay x");
        assert!(consumed);
        assert_eq!(rest, "\nsay x");
    }

    #[test]
    fn block_comment_spans_lines() {
        let (consumed, rest) = run("/* a\nb */say x");
        assert!(consumed);
        assert_eq!(rest, "say x");
    }

    #[test]
    fn note_colon_to_end_of_line() {
        let (consumed, rest) = run("note: ignore me\nsay x");
        assert!(consumed);
        assert_eq!(rest, "\nsay x");
    }

    #[test]
    fn notes_block_to_end_notes() {
        let (consumed, rest) = run("notes: one two\nthree\nend notes\nsay x");
        assert!(consumed);
        assert_eq!(rest, "\nsay x");
    }

    #[test]
    fn non_comment_is_untouched() {
        let (consumed, rest) = run("say x");
        assert!(!consumed);
        assert_eq!(rest, "say x");
    }
}
