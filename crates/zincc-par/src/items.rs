//! Top-level item parsing (spec.md §4.2): includes, structure definitions,
//! function definitions, and the main function, plus the
//! forward-declaration prepass that lets call sites resolve a multi-word
//! function name before — or after — its definition appears.

use std::collections::HashMap;

use zincc_lex::{Token, TokenKind};
use zincc_util::Symbol;

use crate::ast::*;
use crate::types::{scan_type, Type};
use crate::{ParseError, Parser};

#[derive(Debug, Clone)]
pub struct FnSignature {
    pub param_count: usize,
    pub ret_type: Option<Type>,
}

#[derive(Default)]
struct TrieNode {
    children: HashMap<String, TrieNode>,
    terminal: bool,
}

/// A trie over case-sensitive word sequences, built from every function
/// name the prepass discovered. Mirrors `zincc-lex::KeywordTrie`'s
/// longest-match shape, but over dynamic data (function names) rather
/// than a static keyword table, and case-sensitive (spec.md §3:
/// "identifiers are case-sensitive").
#[derive(Default)]
pub struct NameTrie {
    root: TrieNode,
}

impl NameTrie {
    pub fn from_names(names: &[Vec<String>]) -> Self {
        let mut trie = NameTrie::default();
        for words in names {
            let mut node = &mut trie.root;
            for word in words {
                node = node.children.entry(word.clone()).or_default();
            }
            node.terminal = true;
        }
        trie
    }

    /// Longest run of `words` (starting at index 0) that names a known
    /// function, or `0` if `words[0]` doesn't start any known name.
    pub fn longest_match(&self, words: &[String]) -> usize {
        let mut node = &self.root;
        let mut best = 0;
        for (i, word) in words.iter().enumerate() {
            match node.children.get(word) {
                Some(next) => {
                    node = next;
                    if node.terminal {
                        best = i + 1;
                    }
                }
                None => break,
            }
        }
        best
    }
}

/// Joins a multi-word Zinc name into its sanitized identifier form
/// (spec.md §3 invariants: "Multi-word Zinc names collapse to snake-case
/// by joining with underscores").
pub fn sanitize_name(words: &[String]) -> String {
    words.join("_")
}

/// Scans the whole token stream once, indexing every top-level `to`
/// introducer by its name phrase, parameter count, and return type
/// (spec.md §4.2/§9). Tracks block nesting so a bare `to` inside a
/// for-range bound (`from 1 to 5`) is never mistaken for a function
/// definition: only a `to` at nesting depth 0 starts one.
pub fn prepass(tokens: &[Token]) -> (HashMap<String, FnSignature>, NameTrie) {
    let mut table = HashMap::new();
    let mut names: Vec<Vec<String>> = Vec::new();
    let mut depth: i32 = 0;
    let mut i = 0;

    while i < tokens.len() {
        if let TokenKind::Keyword(k) = &tokens[i].kind {
            let text = k.as_str();
            match text.as_str() {
                "to" if depth == 0 => {
                    i += 1;
                    let mut words = Vec::new();
                    while let TokenKind::Ident(sym) = &tokens[i].kind {
                        words.push(sym.as_str());
                        i += 1;
                    }

                    let mut param_count = 0;
                    if tokens[i].kind.is_keyword("with") {
                        i += 1;
                        while !tokens[i].kind.is_keyword("and return a")
                            && !tokens[i].kind.is_punct(':')
                            && !tokens[i].kind.is_eol()
                            && !tokens[i].kind.is_eof()
                        {
                            if tokens[i].kind.is_keyword("called") {
                                param_count += 1;
                            }
                            i += 1;
                        }
                    }

                    let ret_type = if tokens[i].kind.is_keyword("and return a") {
                        i += 1;
                        scan_type(tokens, &mut i).ok()
                    } else {
                        None
                    };

                    table.insert(
                        sanitize_name(&words),
                        FnSignature {
                            param_count,
                            ret_type,
                        },
                    );
                    names.push(words);
                    depth += 1;
                    continue;
                }
                "to do the main thing" | "define" | "if" | "while" | "for each" | "for"
                | "repeat" => depth += 1,
                "end" => depth = (depth - 1).max(0),
                _ => {}
            }
        }
        i += 1;
    }

    (table, NameTrie::from_names(&names))
}

pub fn parse_program(p: &mut Parser) -> Result<Program, ParseError> {
    let mut includes = Vec::new();
    let mut structs = Vec::new();
    let mut functions = Vec::new();
    let mut main = None;

    p.skip_eols();
    while !p.is_eof() {
        if p.check_keyword("include") {
            includes.push(parse_include(p)?);
        } else if p.check_keyword("define") {
            structs.push(parse_struct_def(p)?);
        } else if p.check_keyword("to do the main thing") {
            main = Some(parse_main_def(p)?);
        } else if p.check_keyword("to") {
            functions.push(parse_fn_def(p)?);
        } else {
            return Err(p.unexpected(
                "`include`, `define`, `to`, or `to do the main thing`".to_string(),
            ));
        }
        p.skip_eols();
    }

    Ok(Program {
        includes,
        structs,
        functions,
        main,
    })
}

fn parse_include(p: &mut Parser) -> Result<Include, ParseError> {
    let span = p.expect_keyword("include")?;
    let mut words = Vec::new();
    // The include target is free text up to end of line, so every
    // keyword-folded filler word (`and`, `of`, ...) is captured verbatim
    // rather than treated as syntax.
    loop {
        match p.peek_kind() {
            TokenKind::Ident(sym) | TokenKind::Keyword(sym) => {
                words.push(sym.as_str());
                p.bump();
            }
            TokenKind::StringLiteral(sym) => {
                words.push(format!("\"{}\"", sym.as_str()));
                p.bump();
            }
            _ => break,
        }
    }
    Ok(Include {
        target: words.join(" "),
        span,
    })
}

fn parse_struct_def(p: &mut Parser) -> Result<StructDef, ParseError> {
    let span = p.expect_keyword("define")?;
    // `define a` IDENT `as having:` — `a`/`an` is filler, not a reserved
    // keyword (spec.md §4.2 grammar sketch).
    eat_filler_article(p);
    let (name, _) = p.ident()?;
    p.expect_keyword("as")?;
    p.expect_keyword("having")?;
    p.eat_optional_colon();
    p.skip_eols();

    let mut fields = Vec::new();
    while !p.check_keyword("end") {
        let field_span = p.span();
        let ty = p.parse_type()?;
        p.expect_keyword("called")?;
        let (field_name, _) = p.ident()?;
        fields.push(FieldDef {
            ty,
            name: field_name,
            span: field_span,
        });
        p.skip_eols();
    }
    p.expect_keyword("end")?;

    Ok(StructDef { name, fields, span })
}

fn parse_fn_def(p: &mut Parser) -> Result<FnDef, ParseError> {
    let span = p.expect_keyword("to")?;
    let mut words = Vec::new();
    while let TokenKind::Ident(sym) = p.peek_kind() {
        words.push(sym.as_str());
        p.bump();
    }

    let mut params = Vec::new();
    if p.eat_keyword("with") {
        loop {
            let param_span = p.span();
            let ty = p.parse_type()?;
            p.expect_keyword("called")?;
            let (name, _) = p.ident()?;
            params.push(Param {
                ty,
                name,
                span: param_span,
            });
            if !p.eat_keyword("and") {
                break;
            }
        }
    }

    let ret_type = if p.eat_keyword("and return a") {
        Some(p.parse_type()?)
    } else {
        None
    };

    p.eat_optional_colon();
    let body = p.parse_block()?;
    p.expect_keyword("end")?;

    Ok(FnDef {
        name: Symbol::intern(&sanitize_name(&words)),
        params,
        ret_type,
        body,
        span,
    })
}

fn parse_main_def(p: &mut Parser) -> Result<MainDef, ParseError> {
    let span = p.expect_keyword("to do the main thing")?;
    p.eat_optional_colon();
    let body = p.parse_block()?;
    p.expect_keyword("end")?;
    Ok(MainDef { body, span })
}

fn eat_filler_article(p: &mut Parser) {
    if let TokenKind::Ident(sym) = p.peek_kind() {
        if sym.as_str() == "a" || sym.as_str() == "an" {
            p.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zincc_util::FileId;

    fn tokenize(source: &str) -> Vec<Token> {
        zincc_lex::tokenize(source, FileId::DUMMY).unwrap()
    }

    #[test]
    fn prepass_indexes_simple_function() {
        let tokens = tokenize("to greet the user with a number called age:\nsay age\nend");
        let (table, trie) = prepass(&tokens);
        assert!(table.contains_key("greet_the_user"));
        assert_eq!(table["greet_the_user"].param_count, 1);
        let words: Vec<String> = "greet the user"
            .split_whitespace()
            .map(str::to_owned)
            .collect();
        assert_eq!(trie.longest_match(&words), 3);
    }

    #[test]
    fn prepass_ignores_to_inside_for_range() {
        let tokens = tokenize(
            "to do the main thing:\nfor each number i from 1 to 5:\nsay i\nend\nend",
        );
        let (table, _) = prepass(&tokens);
        assert!(table.is_empty());
    }

    #[test]
    fn prepass_captures_return_type() {
        let tokens = tokenize("to square it with a number called x and return a number:\nend");
        let (table, _) = prepass(&tokens);
        assert_eq!(table["square_it"].ret_type, Some(Type::Integer));
    }

    #[test]
    fn parses_struct_definition() {
        let tokens = tokenize("define a Person as having:\na number called age\nend");
        let mut parser = Parser::new(tokens);
        let program = parser.parse_program().unwrap();
        assert_eq!(program.structs.len(), 1);
        assert_eq!(program.structs[0].name.as_str(), "Person");
        assert_eq!(program.structs[0].fields[0].name.as_str(), "age");
    }

    #[test]
    fn parses_include_directive() {
        let tokens = tokenize("include the standard input and output");
        let mut parser = Parser::new(tokens);
        let program = parser.parse_program().unwrap();
        assert_eq!(program.includes.len(), 1);
        assert_eq!(program.includes[0].target, "the standard input and output");
    }

    #[test]
    fn parses_main_def() {
        let tokens = tokenize("to do the main thing:\nsay \"hi\"\nend");
        let mut parser = Parser::new(tokens);
        let program = parser.parse_program().unwrap();
        assert!(program.main.is_some());
    }
}
