//! The main two-pass tokenizer: a raw scan that splits source into words,
//! literals, punctuation, and line breaks, followed by a phrase-folding
//! sweep that collapses runs of words into the longest matching keyword
//! phrase (spec.md §4.1).

use thiserror::Error;
use zincc_util::{FileId, Span, Symbol};

use super::comment::skip_comment;
use super::identifier::{at_possessive_marker, is_word_start, scan_word};
use super::number::scan_number;
use super::string::{scan_char, scan_string};
use crate::cursor::Cursor;
use crate::keywords::KeywordTrie;
use crate::token::{Token, TokenKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal at {line}:{column}")]
    UnterminatedString { line: u32, column: u32 },
    #[error("unterminated character literal at {line}:{column}")]
    UnterminatedChar { line: u32, column: u32 },
    #[error("stray backslash at {line}:{column}")]
    StrayBackslash { line: u32, column: u32 },
}

/// One raw token before phrase folding: a plain `Word` (not yet classified
/// as identifier or keyword), or an already-final token kind.
enum Raw {
    Word(String),
    Final(TokenKind),
}

struct Positioned<T> {
    value: T,
    span: Span,
}

/// Tokenizes `source`, returning a final stream terminated by `Eof`.
///
/// `file_id` is stamped onto every span so multi-file diagnostics point at
/// the right file; pass [`FileId::DUMMY`] when the caller has only one
/// in-memory source and doesn't track files separately.
pub fn tokenize(source: &str, file_id: FileId) -> Result<Vec<Token>, LexError> {
    let raw = scan_raw(source, file_id)?;
    Ok(fold_phrases(raw))
}

fn scan_raw(source: &str, file_id: FileId) -> Result<Vec<Positioned<Raw>>, LexError> {
    let mut cursor = Cursor::new(source);
    let mut out = Vec::new();

    loop {
        cursor.skip_inline_whitespace();
        while skip_comment(&mut cursor) {
            cursor.skip_inline_whitespace();
        }

        let start = cursor.position();
        let (start_line, start_col) = (cursor.line(), cursor.column());

        if cursor.is_at_end() {
            out.push(Positioned {
                value: Raw::Final(TokenKind::Eof),
                span: span_of(&cursor, start, file_id, start_line, start_col),
            });
            break;
        }

        let c = cursor.current_char();
        let value = match c {
            '\n' => {
                cursor.advance();
                Raw::Final(TokenKind::Eol)
            }
            '"' => Raw::Final(TokenKind::StringLiteral(Symbol::intern(&scan_string(
                &mut cursor,
            )?))),
            '\'' => Raw::Final(TokenKind::CharLiteral(scan_char(&mut cursor)?)),
            d if d.is_ascii_digit() => Raw::Final(scan_number(&mut cursor)),
            w if is_word_start(w) => {
                let word = scan_word(&mut cursor);
                out.push(Positioned {
                    value: Raw::Word(word),
                    span: span_of(&cursor, start, file_id, start_line, start_col),
                });
                if at_possessive_marker(&cursor) {
                    let poss_start = cursor.position();
                    let (pl, pc) = (cursor.line(), cursor.column());
                    cursor.advance_n(2);
                    out.push(Positioned {
                        value: Raw::Final(TokenKind::Possessive),
                        span: span_of(&cursor, poss_start, file_id, pl, pc),
                    });
                }
                continue;
            }
            p => {
                cursor.advance();
                Raw::Final(TokenKind::Punct(p))
            }
        };

        out.push(Positioned {
            value,
            span: span_of(&cursor, start, file_id, start_line, start_col),
        });
    }

    Ok(out)
}

fn span_of(cursor: &Cursor<'_>, start: usize, file_id: FileId, line: u32, column: u32) -> Span {
    Span::with_file(start, cursor.position(), file_id, line, column)
}

/// Collapses consecutive `Raw::Word` runs into the longest matching
/// keyword phrase, falling back to a plain identifier one word at a time
/// when no phrase matches. Never looks across an intervening literal,
/// newline, or punctuation token — each `Raw::Final` token breaks the run.
fn fold_phrases(raw: Vec<Positioned<Raw>>) -> Vec<Token> {
    let trie = KeywordTrie::new();
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        match &raw[i].value {
            Raw::Final(kind) => {
                out.push(Token::new(*kind, raw[i].span));
                i += 1;
            }
            Raw::Word(_) => {
                // Collect the contiguous run of words starting at `i`.
                let run_start = i;
                let mut j = i;
                while j < raw.len() && matches!(raw[j].value, Raw::Word(_)) {
                    j += 1;
                }
                let words: Vec<String> = raw[run_start..j]
                    .iter()
                    .map(|p| match &p.value {
                        Raw::Word(w) => w.to_lowercase(),
                        _ => unreachable!(),
                    })
                    .collect();

                let mut k = 0;
                while k < words.len() {
                    let matched = trie.longest_match(&words[k..]);
                    if matched > 0 {
                        let first = &raw[run_start + k];
                        let last = &raw[run_start + k + matched - 1];
                        let phrase = words[k..k + matched].join(" ");
                        out.push(Token::new(
                            TokenKind::keyword(&phrase),
                            first.span.merge(last.span),
                        ));
                        k += matched;
                    } else {
                        let original = match &raw[run_start + k].value {
                            Raw::Word(w) => w.as_str(),
                            _ => unreachable!(),
                        };
                        out.push(Token::new(
                            TokenKind::Ident(Symbol::intern(original)),
                            raw[run_start + k].span,
                        ));
                        k += 1;
                    }
                }
                i = j;
            }
        }
    }

    out
}
