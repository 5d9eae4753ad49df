//! Numeric literal scanning: integers `[0-9]+` and decimals `[0-9]+\.[0-9]+`
//! (spec.md §4.1). Zinc has no hex/octal/binary/exponent forms.

use crate::cursor::Cursor;
use crate::token::TokenKind;

/// Scans a number starting at the cursor's current digit, producing either
/// `IntLiteral` or `DecimalLiteral`. A `.` is only consumed as part of the
/// literal when followed by another digit, so `3.say x` still lexes `3` as
/// an integer followed by a `.` punctuation token.
pub fn scan_number(cursor: &mut Cursor<'_>) -> TokenKind {
    let start = cursor.position();
    while cursor.current_char().is_ascii_digit() {
        cursor.advance();
    }

    if cursor.current_char() == '.' && cursor.peek_char(1).is_ascii_digit() {
        cursor.advance();
        while cursor.current_char().is_ascii_digit() {
            cursor.advance();
        }
        let text = cursor.slice_from(start);
        let value: f64 = text.parse().unwrap_or(0.0);
        return TokenKind::DecimalLiteral(value);
    }

    let text = cursor.slice_from(start);
    let value: i64 = text.parse().unwrap_or(i64::MAX);
    TokenKind::IntLiteral(value)
}
