//! The closed type system (spec.md §3): a base kind, or a one-level
//! constructor over a type. No generics, no type variables.

use zincc_lex::{Token, TokenKind};
use zincc_util::Symbol;

use crate::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Integer,
    Decimal,
    Character,
    Text,
    Boolean,
    Void,
    Pointer(Box<Type>),
    FixedArray(Box<Type>, usize),
    OpenArray(Box<Type>),
    Struct(Symbol),
}

impl Type {
    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }
}

/// Scans one type phrase starting at `tokens[*pos]`, advancing `*pos` past
/// it. Free-standing (not a `Parser` method) so the forward-declaration
/// prepass (`items::prepass`) can reuse it before a `Parser` exists.
///
/// Grammar:
/// ```text
/// type_phrase := `a`|`an` base_type
///              | `a` `pointer` `to` type_phrase
///              | `a` `list` `of` type_phrase
///              | `an` `array` `of` INT type_phrase
/// ```
pub fn scan_type(tokens: &[Token], pos: &mut usize) -> Result<Type, ParseError> {
    eat_article(tokens, pos);

    if eat_word_ci(tokens, pos, "pointer") {
        eat_word_ci(tokens, pos, "to");
        let inner = scan_type(tokens, pos)?;
        return Ok(Type::Pointer(Box::new(inner)));
    }

    if eat_word_ci(tokens, pos, "list") {
        eat_word_ci(tokens, pos, "of");
        let inner = scan_type(tokens, pos)?;
        return Ok(Type::OpenArray(Box::new(inner)));
    }

    if eat_word_ci(tokens, pos, "array") {
        eat_word_ci(tokens, pos, "of");
        let size = match tokens[*pos].kind {
            TokenKind::IntLiteral(n) => {
                *pos += 1;
                n as usize
            }
            _ => return Err(unexpected(tokens, *pos, "an array size")),
        };
        let inner = scan_type(tokens, pos)?;
        return Ok(Type::FixedArray(Box::new(inner), size));
    }

    match &tokens[*pos].kind {
        TokenKind::Keyword(k) if k.as_str() == "number" => {
            *pos += 1;
            Ok(Type::Integer)
        }
        TokenKind::Keyword(k) if k.as_str() == "decimal" => {
            *pos += 1;
            Ok(Type::Decimal)
        }
        TokenKind::Keyword(k) if k.as_str() == "text" => {
            *pos += 1;
            Ok(Type::Text)
        }
        TokenKind::Keyword(k) if k.as_str() == "character" => {
            *pos += 1;
            Ok(Type::Character)
        }
        TokenKind::Keyword(k) if k.as_str() == "boolean" => {
            *pos += 1;
            Ok(Type::Boolean)
        }
        TokenKind::Ident(name) => {
            let name = *name;
            *pos += 1;
            Ok(Type::Struct(name))
        }
        _ => Err(unexpected(tokens, *pos, "a type")),
    }
}

fn eat_article(tokens: &[Token], pos: &mut usize) {
    eat_word_ci(tokens, pos, "a") || eat_word_ci(tokens, pos, "an");
}

/// Matches a plain identifier or keyword token whose text equals `word`
/// case-insensitively, without requiring it be in the keyword table (type
/// phrase filler words like `pointer`/`to`/`list`/`of`/`array` are plain
/// identifiers unless separately reserved).
fn eat_word_ci(tokens: &[Token], pos: &mut usize, word: &str) -> bool {
    let matches = match &tokens[*pos].kind {
        TokenKind::Ident(s) => s.as_str().eq_ignore_ascii_case(word),
        TokenKind::Keyword(s) => s.as_str().eq_ignore_ascii_case(word),
        _ => false,
    };
    if matches {
        *pos += 1;
    }
    matches
}

fn unexpected(tokens: &[Token], pos: usize, expected: &str) -> ParseError {
    let tok = &tokens[pos.min(tokens.len() - 1)];
    ParseError {
        position: tok.span,
        expected: expected.to_string(),
        found: format!("{:?}", tok.kind),
    }
}

impl crate::Parser {
    pub fn parse_type(&mut self) -> Result<Type, ParseError> {
        self.with_cursor(scan_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Type {
        let tokens = zincc_lex::tokenize(source, zincc_util::FileId::DUMMY).unwrap();
        let mut pos = 0;
        scan_type(&tokens, &mut pos).unwrap()
    }

    #[test]
    fn scans_number() {
        assert_eq!(scan("a number"), Type::Integer);
    }

    #[test]
    fn scans_text() {
        assert_eq!(scan("a text"), Type::Text);
    }

    #[test]
    fn scans_pointer_to_number() {
        assert_eq!(scan("a pointer to a number"), Type::Pointer(Box::new(Type::Integer)));
    }

    #[test]
    fn scans_list_of_number() {
        assert_eq!(scan("a list of a number"), Type::OpenArray(Box::new(Type::Integer)));
    }

    #[test]
    fn scans_struct_name() {
        match scan("a Person") {
            Type::Struct(s) => assert_eq!(s.as_str(), "Person"),
            other => panic!("expected struct, got {other:?}"),
        }
    }
}
