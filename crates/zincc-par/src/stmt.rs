//! Statement parsing (spec.md §4.2/§4.4): declarations, assignment and its
//! synonymous surface forms, compound assignment, control flow, I/O,
//! memory, file, and the C-fallback passthrough.

use zincc_lex::TokenKind;
use zincc_util::Span;

use crate::ast::*;
use crate::expr::{self, parse_comparison, parse_postfix};
use crate::types::Type;
use crate::ParseError;
use crate::Parser;

impl Parser {
    pub fn parse_block(&mut self) -> Result<Block, ParseError> {
        let mut block = Vec::new();
        self.skip_eols();
        while !self.is_eof()
            && !self.check_keyword("end")
            && !self.check_keyword("otherwise")
            && !self.check_keyword("otherwise if")
        {
            parse_stmt(self, &mut block)?;
            self.skip_eols();
        }
        Ok(block)
    }
}

fn parse_stmt(p: &mut Parser, block: &mut Block) -> Result<(), ParseError> {
    let span = p.span();

    if p.check_keyword("there is a") {
        parse_decl(p, block)
    } else if p.check_keyword("set") {
        block.push(parse_assign(p, "set")?);
        Ok(())
    } else if p.check_keyword("change") {
        block.push(parse_assign(p, "change")?);
        Ok(())
    } else if p.check_keyword("now") {
        block.push(parse_assign(p, "now")?);
        Ok(())
    } else if p.check_keyword("let") {
        block.push(parse_assign(p, "let")?);
        Ok(())
    } else if p.check_keyword("make") {
        block.push(parse_assign(p, "make")?);
        Ok(())
    } else if p.check_keyword("add") {
        block.push(parse_compound(p, "add")?);
        Ok(())
    } else if p.check_keyword("subtract") {
        block.push(parse_compound(p, "subtract")?);
        Ok(())
    } else if p.check_keyword("multiply") {
        block.push(parse_compound(p, "multiply")?);
        Ok(())
    } else if p.check_keyword("divide") {
        block.push(parse_compound(p, "divide")?);
        Ok(())
    } else if p.check_keyword("increase") {
        block.push(parse_compound(p, "increase")?);
        Ok(())
    } else if p.check_keyword("decrease") {
        block.push(parse_compound(p, "decrease")?);
        Ok(())
    } else if p.check_keyword("if") {
        block.push(parse_if(p)?);
        Ok(())
    } else if p.check_keyword("while") {
        block.push(parse_while(p)?);
        Ok(())
    } else if p.check_keyword("for each") {
        block.push(parse_for(p)?);
        Ok(())
    } else if p.check_keyword("repeat") {
        block.push(parse_repeat(p)?);
        Ok(())
    } else if p.check_keyword("break") || p.check_keyword("stop the loop") {
        p.bump();
        block.push(Stmt::new(StmtKind::Break, span));
        Ok(())
    } else if p.check_keyword("continue") || p.check_keyword("skip to the next one") {
        p.bump();
        block.push(Stmt::new(StmtKind::Continue, span));
        Ok(())
    } else if p.check_keyword("return") {
        block.push(parse_return(p)?);
        Ok(())
    } else if p.check_keyword("say")
        || p.check_keyword("print")
        || p.check_keyword("show")
        || p.check_keyword("display")
    {
        block.push(parse_output(p)?);
        Ok(())
    } else if p.check_keyword("ask the user for") {
        block.push(parse_ask(p)?);
        Ok(())
    } else if p.check_keyword("allocate space for") {
        block.push(parse_allocate(p)?);
        Ok(())
    } else if p.check_keyword("free the memory at") {
        block.push(parse_free(p)?);
        Ok(())
    } else if p.check_keyword("open the file called") {
        block.push(parse_file_open(p)?);
        Ok(())
    } else if p.check_keyword("close the file") {
        block.push(parse_file_close(p)?);
        Ok(())
    } else if p.check_keyword("read a line from") {
        block.push(parse_file_read(p)?);
        Ok(())
    } else if p.check_keyword("call the graphics function") {
        block.push(parse_graphics_call(p)?);
        Ok(())
    } else if let Some(call) = try_parse_call_stmt(p, span)? {
        block.push(call);
        Ok(())
    } else {
        block.push(parse_raw_c(p, span));
        Ok(())
    }
}

/// `there is a` type_phrase `called` IDENT, with an optional scalar
/// initializer (`which is` EXPR) or a conservative field-assignment
/// desugaring for inline struct init (`which has` field {`and` field}) —
/// spec.md §9 Open Question: emit field assignments, not a C initializer
/// list.
fn parse_decl(p: &mut Parser, block: &mut Block) -> Result<(), ParseError> {
    let span = p.expect_keyword("there is a")?;
    let ty = p.parse_type()?;
    p.expect_keyword("called")?;
    let (name, _) = p.ident()?;

    if p.eat_keyword("which") {
        if p.eat_word_ci("is") {
            let init = p.parse_expr()?;
            block.push(Stmt::new(
                StmtKind::VarDecl {
                    ty: Some(ty),
                    name,
                    init: Some(init),
                },
                span,
            ));
            return Ok(());
        }
        if p.expect_keyword("has").is_ok() {
            block.push(Stmt::new(
                StmtKind::VarDecl {
                    ty: Some(ty),
                    name,
                    init: None,
                },
                span,
            ));
            loop {
                let field_span = p.span();
                let (field, _) = p.ident()?;
                let value = parse_postfix(p)?;
                block.push(Stmt::new(
                    StmtKind::Assign {
                        target: Expr::new(
                            ExprKind::FieldAccess {
                                base: Box::new(Expr::new(ExprKind::Var(name), field_span)),
                                field,
                                possessive: true,
                            },
                            field_span,
                        ),
                        value,
                    },
                    field_span,
                ));
                if !p.eat_keyword("and") {
                    break;
                }
            }
            return Ok(());
        }
    }

    block.push(Stmt::new(
        StmtKind::VarDecl {
            ty: Some(ty),
            name,
            init: None,
        },
        span,
    ));
    Ok(())
}

fn parse_assign(p: &mut Parser, kw: &str) -> Result<Stmt, ParseError> {
    let span = p.expect_keyword(kw)?;
    let target = parse_postfix(p)?;
    match kw {
        "set" | "change" => {
            p.expect_keyword("to")?;
        }
        "now" => {
            p.eat_word_ci("is");
        }
        "let" => {
            p.expect_keyword("be")?;
        }
        "make" => {
            p.expect_keyword("equal to")?;
        }
        _ => unreachable!(),
    }
    let value = p.parse_expr()?;
    Ok(Stmt::new(StmtKind::Assign { target, value }, span))
}

fn parse_compound(p: &mut Parser, kw: &str) -> Result<Stmt, ParseError> {
    let span = p.expect_keyword(kw)?;
    let (op, target, value) = match kw {
        "add" => {
            let value = p.parse_expr()?;
            p.expect_keyword("to")?;
            let target = parse_postfix(p)?;
            (CompoundOp::Add, target, value)
        }
        "subtract" => {
            let value = p.parse_expr()?;
            p.expect_keyword("from")?;
            let target = parse_postfix(p)?;
            (CompoundOp::Subtract, target, value)
        }
        "multiply" | "divide" | "increase" | "decrease" => {
            let target = parse_postfix(p)?;
            p.eat_word_ci("by");
            let value = p.parse_expr()?;
            let op = match kw {
                "multiply" => CompoundOp::Multiply,
                "divide" => CompoundOp::Divide,
                "increase" => CompoundOp::Increase,
                "decrease" => CompoundOp::Decrease,
                _ => unreachable!(),
            };
            (op, target, value)
        }
        _ => unreachable!(),
    };
    Ok(Stmt::new(StmtKind::CompoundAssign { op, target, value }, span))
}

fn parse_if(p: &mut Parser) -> Result<Stmt, ParseError> {
    let span = p.expect_keyword("if")?;
    let cond = p.parse_expr()?;
    p.eat_optional_then();
    p.eat_optional_colon();
    let then_block = p.parse_block()?;

    let mut else_ifs = Vec::new();
    while p.check_keyword("otherwise if") {
        p.bump();
        let cond = p.parse_expr()?;
        p.eat_optional_then();
        p.eat_optional_colon();
        let body = p.parse_block()?;
        else_ifs.push((cond, body));
    }

    let else_block = if p.eat_keyword("otherwise") {
        p.eat_optional_colon();
        Some(p.parse_block()?)
    } else {
        None
    };

    p.expect_keyword("end")?;
    Ok(Stmt::new(
        StmtKind::If {
            cond,
            then_block,
            else_ifs,
            else_block,
        },
        span,
    ))
}

fn parse_while(p: &mut Parser) -> Result<Stmt, ParseError> {
    let span = p.expect_keyword("while")?;
    let cond = p.parse_expr()?;
    p.eat_optional_then();
    p.eat_optional_colon();
    let body = p.parse_block()?;
    p.expect_keyword("end")?;
    Ok(Stmt::new(StmtKind::While { cond, body }, span))
}

/// `for each` [type_phrase] IDENT (`from` EXPR (`to`|`down to`) EXPR | `in`
/// EXPR) block `end`. The declared element type, if present, only narrows
/// the induction variable and carries no further AST payload (spec.md
/// §4.3: loop variables are bound within the body only).
fn parse_for(p: &mut Parser) -> Result<Stmt, ParseError> {
    let span = p.expect_keyword("for each")?;
    if is_base_type_keyword(p) {
        p.parse_type()?;
    }
    let (var, _) = p.ident()?;

    if p.eat_keyword("from") {
        let start = p.parse_expr()?;
        let descending = if p.eat_keyword("down to") {
            true
        } else {
            p.expect_keyword("to")?;
            false
        };
        let end = p.parse_expr()?;
        p.eat_optional_colon();
        let body = p.parse_block()?;
        p.expect_keyword("end")?;
        Ok(Stmt::new(
            StmtKind::ForRange {
                var,
                start,
                end,
                descending,
                body,
            },
            span,
        ))
    } else {
        p.expect_keyword("in")?;
        let list = p.parse_expr()?;
        p.eat_optional_colon();
        let body = p.parse_block()?;
        p.expect_keyword("end")?;
        Ok(Stmt::new(StmtKind::ForEach { var, list, body }, span))
    }
}

fn is_base_type_keyword(p: &Parser) -> bool {
    matches!(
        p.peek_kind(),
        TokenKind::Keyword(k) if matches!(
            k.as_str().as_str(),
            "number" | "decimal" | "text" | "character" | "boolean"
        )
    )
}

fn parse_repeat(p: &mut Parser) -> Result<Stmt, ParseError> {
    let span = p.expect_keyword("repeat")?;
    let count = p.parse_expr()?;
    p.expect_keyword("times")?;
    p.eat_optional_colon();
    let body = p.parse_block()?;
    p.expect_keyword("end")?;
    Ok(Stmt::new(StmtKind::RepeatTimes { count, body }, span))
}

fn parse_return(p: &mut Parser) -> Result<Stmt, ParseError> {
    let span = p.expect_keyword("return")?;
    let value = if p.is_eof() || p.check_keyword("end") || matches!(p.peek_kind(), TokenKind::Eol)
    {
        None
    } else {
        Some(p.parse_expr()?)
    };
    Ok(Stmt::new(StmtKind::Return(value), span))
}

/// `say`/`print`/`show`/`display` EXPR {(`and then`|`followed by`) EXPR} —
/// the synonymous output verbs all collapse to one node (spec.md §9).
fn parse_output(p: &mut Parser) -> Result<Stmt, ParseError> {
    let span = p.bump().span;
    let mut items = vec![p.parse_expr()?];
    while p.eat_keyword("and then") || p.eat_keyword("followed by") {
        items.push(p.parse_expr()?);
    }
    Ok(Stmt::new(StmtKind::Output { items }, span))
}

/// `ask the user for` type_phrase `and store it in` TARGET.
fn parse_ask(p: &mut Parser) -> Result<Stmt, ParseError> {
    let span = p.expect_keyword("ask the user for")?;
    let ty = p.parse_type()?;
    p.expect_keyword("and store it in")?;
    let target = parse_postfix(p)?;
    Ok(match ty {
        Type::Text => Stmt::new(StmtKind::ReadText { target }, span),
        _ => Stmt::new(StmtKind::ReadNumber { target }, span),
    })
}

/// `allocate space for` EXPR elem_type `and call it` IDENT. The element
/// type word is plural in practice (`numbers`) but the keyword table only
/// knows singular base-type words, so the trailing `s` is stripped before
/// matching (spec.md §4.4 concrete example: `allocate space for N numbers
/// and call it p`).
fn parse_allocate(p: &mut Parser) -> Result<Stmt, ParseError> {
    let span = p.expect_keyword("allocate space for")?;
    let count = p.parse_expr()?;
    let elem_ty = base_type_from_word(&p.bump_text()).unwrap_or(Type::Integer);
    p.expect_keyword("and call it")?;
    let (name, _) = p.ident()?;
    Ok(Stmt::new(
        StmtKind::AllocateArray {
            count,
            elem_ty,
            name,
        },
        span,
    ))
}

fn base_type_from_word(word: &str) -> Option<Type> {
    match word.trim_end_matches('s') {
        "number" => Some(Type::Integer),
        "decimal" => Some(Type::Decimal),
        "text" => Some(Type::Text),
        "character" => Some(Type::Character),
        "boolean" => Some(Type::Boolean),
        _ => None,
    }
}

fn parse_free(p: &mut Parser) -> Result<Stmt, ParseError> {
    let span = p.expect_keyword("free the memory at")?;
    let target = parse_postfix(p)?;
    Ok(Stmt::new(StmtKind::FreeMemory { target }, span))
}

fn parse_file_open(p: &mut Parser) -> Result<Stmt, ParseError> {
    let span = p.expect_keyword("open the file called")?;
    let path = p.parse_expr()?;
    let mode = if p.eat_keyword("for reading and call it") {
        FileMode::Read
    } else if p.eat_keyword("for writing and call it") {
        FileMode::Write
    } else if p.eat_keyword("for appending and call it") {
        FileMode::Append
    } else {
        return Err(p.unexpected(
            "`for reading and call it`, `for writing and call it`, or `for appending and call it`"
                .to_string(),
        ));
    };
    let (handle, _) = p.ident()?;
    Ok(Stmt::new(StmtKind::FileOpen { path, mode, handle }, span))
}

fn parse_file_close(p: &mut Parser) -> Result<Stmt, ParseError> {
    let span = p.expect_keyword("close the file")?;
    let handle = parse_postfix(p)?;
    Ok(Stmt::new(StmtKind::FileClose { handle }, span))
}

fn parse_file_read(p: &mut Parser) -> Result<Stmt, ParseError> {
    let span = p.expect_keyword("read a line from")?;
    let handle = parse_postfix(p)?;
    p.expect_keyword("and store it in")?;
    let target = parse_postfix(p)?;
    Ok(Stmt::new(StmtKind::FileRead { handle, target }, span))
}

/// `call the graphics function` STRING [`with` arg {`and` arg}] — the
/// language's typed escape hatch into a graphics library such as raylib
/// (spec.md §6's `include the graphics library` mapping), distinct from
/// the untyped C-fallback rule because its arguments are ordinary Zinc
/// expressions that get resolved and lowered like any other call's.
fn parse_graphics_call(p: &mut Parser) -> Result<Stmt, ParseError> {
    let span = p.expect_keyword("call the graphics function")?;
    let name = match p.peek_kind() {
        TokenKind::StringLiteral(sym) => {
            let sym = *sym;
            p.bump();
            sym
        }
        _ => return Err(p.unexpected("a string literal naming the graphics function".to_string())),
    };

    let mut args = Vec::new();
    if p.eat_keyword("with") {
        loop {
            args.push(parse_comparison(p)?);
            if !p.eat_keyword("and") {
                break;
            }
        }
    }

    Ok(Stmt::new(StmtKind::Graphics { call: name, args }, span))
}

/// A call used as a statement: matches iff the leading identifier run
/// resolves against the known function table (spec.md §4.2 "C fallback" —
/// a call to an undeclared name is never mistaken for one, it falls
/// through to [`parse_raw_c`] instead).
fn try_parse_call_stmt(p: &mut Parser, span: Span) -> Result<Option<Stmt>, ParseError> {
    if !matches!(p.peek_kind(), TokenKind::Ident(_)) {
        return Ok(None);
    }
    let words = p.peek_ident_words(8);
    if p.fn_trie.longest_match(&words) == 0 {
        return Ok(None);
    }
    let call = expr::parse_call(p, span)?;
    Ok(Some(Stmt::new(StmtKind::Call(call), span)))
}

/// Captures the rest of the physical line verbatim as raw C (spec.md §4.2
/// "C fallback"), preferring the original source text when available and
/// falling back to a whitespace-joined reconstruction from tokens
/// otherwise (e.g. when the parser was built directly from tokens).
fn parse_raw_c(p: &mut Parser, span: Span) -> Stmt {
    let mut end = span;
    let mut words = Vec::new();
    while !p.is_eof() && !matches!(p.peek_kind(), TokenKind::Eol) {
        end = p.span();
        words.push(p.bump_text());
    }
    let merged = span.merge(end);
    let text = p
        .source_slice(merged)
        .map(str::to_string)
        .unwrap_or_else(|| words.join(" "));
    Stmt::new(StmtKind::RawC(text), span)
}

impl Parser {
    /// Consumes the current token and renders it back to approximate
    /// source text, for contexts (raw-C reconstruction without a source
    /// string, the `allocate` element-type word) that need a token's text
    /// rather than its parsed meaning.
    pub(crate) fn bump_text(&mut self) -> String {
        let text = match self.peek_kind() {
            TokenKind::Ident(s) => s.as_str(),
            TokenKind::Keyword(s) => s.as_str(),
            TokenKind::IntLiteral(n) => n.to_string(),
            TokenKind::DecimalLiteral(n) => n.to_string(),
            TokenKind::StringLiteral(s) => format!("\"{}\"", s.as_str()),
            TokenKind::CharLiteral(c) => format!("'{c}'"),
            TokenKind::Possessive => "'s".to_string(),
            TokenKind::Punct(c) => c.to_string(),
            TokenKind::Eol => String::new(),
            TokenKind::Eof => String::new(),
        };
        self.bump();
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zincc_util::FileId;

    fn parse_fn_body(source: &str) -> Block {
        let full = format!("to f:\n{source}\nend");
        let tokens = zincc_lex::tokenize(&full, FileId::DUMMY).unwrap();
        let mut p = Parser::with_source(tokens, full);
        p.parse_program().unwrap().functions.remove(0).body
    }

    #[test]
    fn parses_decl_with_scalar_init() {
        let block = parse_fn_body("there is a number called x which is 2 plus 3 times 4");
        assert_eq!(block.len(), 1);
        assert!(matches!(block[0].kind, StmtKind::VarDecl { .. }));
    }

    #[test]
    fn parses_synonymous_assignment_forms() {
        for src in [
            "set x to 5",
            "change x to 5",
            "now x is 5",
            "let x be 5",
            "make x equal to 5",
        ] {
            let block = parse_fn_body(src);
            assert_eq!(block.len(), 1, "source: {src}");
            assert!(matches!(block[0].kind, StmtKind::Assign { .. }), "source: {src}");
        }
    }

    #[test]
    fn parses_if_otherwise_chain() {
        let block = parse_fn_body(
            "if 7 modulo 2 equals 0 then say \"even\" otherwise say \"odd\" end",
        );
        match &block[0].kind {
            StmtKind::If { else_block, .. } => assert!(else_block.is_some()),
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn parses_for_range_descending() {
        let block = parse_fn_body("for each number i from 5 down to 1:\nsay i\nend");
        match &block[0].kind {
            StmtKind::ForRange { descending, .. } => assert!(descending),
            other => panic!("expected for-range, got {other:?}"),
        }
    }

    #[test]
    fn unknown_call_falls_through_to_raw_c() {
        let block = parse_fn_body("printf(\"raw %d\\n\", 42);");
        assert!(matches!(block[0].kind, StmtKind::RawC(_)));
    }

    #[test]
    fn output_with_concatenation_list() {
        let block = parse_fn_body("say \"total: \" and then 5 plus 5");
        match &block[0].kind {
            StmtKind::Output { items } => assert_eq!(items.len(), 2),
            other => panic!("expected output, got {other:?}"),
        }
    }
}
