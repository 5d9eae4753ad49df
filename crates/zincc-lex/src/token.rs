//! The classified lexical unit the lexer produces and the parser consumes.

use zincc_util::{Span, Symbol};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TokenKind {
    Ident(Symbol),
    /// A recognized keyword or multi-word phrase, folded to its canonical
    /// lowercase text (e.g. `divided by`, `is greater than`). Interned so
    /// the variant stays `Copy` even though the phrase is built at runtime.
    Keyword(Symbol),
    IntLiteral(i64),
    DecimalLiteral(f64),
    StringLiteral(Symbol),
    CharLiteral(char),
    /// The possessive marker `'s`, as in `bob's age` (spec.md §3: struct
    /// field access, possessive form).
    Possessive,
    /// Single-character punctuation not covered above: `( ) [ ] { } , : ; .`
    Punct(char),
    Eol,
    Eof,
}

impl TokenKind {
    pub fn keyword(text: &str) -> TokenKind {
        TokenKind::Keyword(Symbol::intern(text))
    }

    pub fn is_keyword(&self, text: &str) -> bool {
        matches!(self, TokenKind::Keyword(k) if k.as_str() == text)
    }

    pub fn is_punct(&self, c: char) -> bool {
        matches!(self, TokenKind::Punct(p) if *p == c)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, TokenKind::Eof)
    }

    pub fn is_eol(&self) -> bool {
        matches!(self, TokenKind::Eol)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
