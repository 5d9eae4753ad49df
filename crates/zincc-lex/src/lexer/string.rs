//! String and character literal scanning, with escapes `\n \t \" \\ \'`
//! (spec.md §4.1). Fails with [`crate::LexError`] on an unterminated
//! literal or a stray backslash.

use crate::cursor::Cursor;
use crate::LexError;

pub fn scan_string(cursor: &mut Cursor<'_>) -> Result<String, LexError> {
    let start_line = cursor.line();
    let start_col = cursor.column();
    cursor.advance(); // opening quote
    let mut content = String::new();

    loop {
        if cursor.is_at_end() || cursor.current_char() == '\n' {
            return Err(LexError::UnterminatedString {
                line: start_line,
                column: start_col,
            });
        }
        match cursor.current_char() {
            '"' => {
                cursor.advance();
                return Ok(content);
            }
            '\\' => {
                cursor.advance();
                content.push(scan_escape(cursor)?);
            }
            c => {
                content.push(c);
                cursor.advance();
            }
        }
    }
}

pub fn scan_char(cursor: &mut Cursor<'_>) -> Result<char, LexError> {
    let start_line = cursor.line();
    let start_col = cursor.column();
    cursor.advance(); // opening quote

    if cursor.is_at_end() || cursor.current_char() == '\n' {
        return Err(LexError::UnterminatedChar {
            line: start_line,
            column: start_col,
        });
    }

    let value = if cursor.current_char() == '\\' {
        cursor.advance();
        scan_escape(cursor)?
    } else {
        let c = cursor.current_char();
        cursor.advance();
        c
    };

    if cursor.current_char() != '\'' {
        return Err(LexError::UnterminatedChar {
            line: start_line,
            column: start_col,
        });
    }
    cursor.advance();
    Ok(value)
}

fn scan_escape(cursor: &mut Cursor<'_>) -> Result<char, LexError> {
    if cursor.is_at_end() {
        return Err(LexError::StrayBackslash {
            line: cursor.line(),
            column: cursor.column(),
        });
    }
    let c = cursor.current_char();
    let escaped = match c {
        'n' => '\n',
        't' => '\t',
        '"' => '"',
        '\\' => '\\',
        '\'' => '\'',
        _ => {
            return Err(LexError::StrayBackslash {
                line: cursor.line(),
                column: cursor.column(),
            })
        }
    };
    cursor.advance();
    Ok(escaped)
}
