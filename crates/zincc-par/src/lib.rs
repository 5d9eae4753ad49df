//! Recursive-descent parser for Zinc (spec.md §4.2).
//!
//! Two-pass strategy: [`items::prepass`] scans the token stream once to
//! index every top-level function's name phrase, parameter count, and
//! return type, so [`Parser::parse`]'s second pass can resolve call-site
//! phrases (even calls preceding their definition) by longest match
//! against that index.

pub mod ast;
#[cfg(test)]
mod edge_cases;
mod expr;
mod items;
mod stmt;
pub mod types;

pub use ast::*;
pub use items::{FnSignature, NameTrie};

use thiserror::Error;
use zincc_lex::{Token, TokenKind};
use zincc_util::Span;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("unexpected token at {}:{}: expected {expected}, found {found}", position.line, position.column)]
pub struct ParseError {
    pub position: Span,
    pub expected: String,
    pub found: String,
}

pub struct Parser {
    tokens: Vec<Token>,
    /// The original source text, kept so the C-fallback rule can slice out
    /// a raw line verbatim instead of reconstructing it from tokens.
    /// Empty when the parser is built directly from tokens (e.g. in
    /// unit tests), in which case the fallback reconstructs from tokens.
    source: String,
    pub(crate) pos: usize,
    pub(crate) fn_table: std::collections::HashMap<String, FnSignature>,
    pub(crate) fn_trie: NameTrie,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_source(tokens, String::new())
    }

    pub fn with_source(tokens: Vec<Token>, source: String) -> Self {
        let (fn_table, fn_trie) = items::prepass(&tokens);
        Self {
            tokens,
            source,
            pos: 0,
            fn_table,
            fn_trie,
        }
    }

    pub fn parse(source: &str, file_id: zincc_util::FileId) -> Result<Program, ParseError> {
        let tokens =
            zincc_lex::tokenize(source, file_id).map_err(|e| ParseError {
                position: Span::DUMMY,
                expected: "valid lexical input".to_string(),
                found: e.to_string(),
            })?;
        let mut parser = Parser::with_source(tokens, source.to_string());
        parser.parse_program()
    }

    /// Slices the original source text for `span`, if the parser was built
    /// with one and the span falls within it.
    pub(crate) fn source_slice(&self, span: Span) -> Option<&str> {
        self.source.get(span.start..span.end)
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        items::parse_program(self)
    }

    // ---- token stream helpers ----

    fn at(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn peek(&self) -> &Token {
        self.at(0)
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.peek_kind().is_eof()
    }

    pub(crate) fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)];
        if !self.is_eof() {
            self.pos += 1;
        }
        tok
    }

    /// Skips any run of end-of-line tokens (statements end at EOL, but
    /// runs of blank lines are tolerated — spec.md §4.1).
    pub(crate) fn skip_eols(&mut self) {
        while self.peek_kind().is_eol() {
            self.bump();
        }
    }

    pub(crate) fn check_keyword(&self, kw: &str) -> bool {
        self.peek_kind().is_keyword(kw)
    }

    pub(crate) fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.check_keyword(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_keyword(&mut self, kw: &str) -> Result<Span, ParseError> {
        if self.check_keyword(kw) {
            Ok(self.bump().span)
        } else {
            Err(self.unexpected(format!("`{kw}`")))
        }
    }

    pub(crate) fn check_punct(&self, c: char) -> bool {
        self.peek_kind().is_punct(c)
    }

    pub(crate) fn eat_punct(&mut self, c: char) -> bool {
        if self.check_punct(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consumes an optional introducer colon (`:`) — spec.md §4.2 "Optional
    /// punctuation": colons after `:` introducers are never required.
    pub(crate) fn eat_optional_colon(&mut self) {
        self.eat_punct(':');
    }

    /// Consumes an optional `then` after a condition.
    pub(crate) fn eat_optional_then(&mut self) {
        self.eat_keyword("then");
    }

    pub(crate) fn ident(&mut self) -> Result<(zincc_util::Symbol, Span), ParseError> {
        match self.peek_kind() {
            TokenKind::Ident(sym) => {
                let sym = *sym;
                let span = self.bump().span;
                Ok((sym, span))
            }
            _ => Err(self.unexpected("an identifier".to_string())),
        }
    }

    /// Matches a plain identifier whose text equals `word` case-insensitively
    /// without it being a registered keyword — the copula `is` in `now x is
    /// 5` and the preposition `by` in `multiply x by 2` are ordinary words,
    /// not phrase-table entries.
    pub(crate) fn eat_word_ci(&mut self, word: &str) -> bool {
        let matches = matches!(self.peek_kind(), TokenKind::Ident(s) if s.as_str().eq_ignore_ascii_case(word));
        if matches {
            self.bump();
        }
        matches
    }

    /// Collects up to `max` consecutive identifier words starting at the
    /// current position, without consuming them — used to test a call
    /// phrase against `fn_trie` before committing to parse it.
    pub(crate) fn peek_ident_words(&self, max: usize) -> Vec<String> {
        let mut words = Vec::new();
        let mut offset = 0;
        while words.len() < max {
            if let TokenKind::Ident(sym) = &self.at(offset).kind {
                words.push(sym.as_str());
                offset += 1;
            } else {
                break;
            }
        }
        words
    }

    /// Runs a free function that scans directly over `self.tokens` using a
    /// local cursor, then commits the advanced position back to `self.pos`.
    /// Lets `types::scan_type` (shared with the prepass) plug into the
    /// main parser without duplicating its cursor logic.
    pub(crate) fn with_cursor<T>(
        &mut self,
        f: impl FnOnce(&[Token], &mut usize) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let mut pos = self.pos;
        let result = f(&self.tokens, &mut pos)?;
        self.pos = pos;
        Ok(result)
    }

    pub(crate) fn unexpected(&self, expected: String) -> ParseError {
        ParseError {
            position: self.span(),
            expected,
            found: describe(self.peek_kind()),
        }
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Ident(s) => format!("identifier `{}`", s.as_str()),
        TokenKind::Keyword(s) => format!("`{}`", s.as_str()),
        TokenKind::IntLiteral(v) => format!("integer `{v}`"),
        TokenKind::DecimalLiteral(v) => format!("decimal `{v}`"),
        TokenKind::StringLiteral(_) => "a string literal".to_string(),
        TokenKind::CharLiteral(c) => format!("character `{c}`"),
        TokenKind::Possessive => "`'s`".to_string(),
        TokenKind::Punct(c) => format!("`{c}`"),
        TokenKind::Eol => "end of line".to_string(),
        TokenKind::Eof => "end of file".to_string(),
    }
}
