//! Expression parsing by precedence climbing (spec.md §4.2): `or` binds
//! loosest, postfix (index/field) binds tightest. Each tier is a small
//! function that parses the tier below it and then folds in zero or more
//! operators at its own level — the conventional recursive-descent shape
//! for a fixed precedence table.

use zincc_lex::TokenKind;
use zincc_util::Symbol;

use crate::ast::*;
use crate::ParseError;
use crate::Parser;

impl Parser {
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        parse_or(self)
    }
}

fn parse_or(p: &mut Parser) -> Result<Expr, ParseError> {
    let mut lhs = parse_and(p)?;
    while p.check_keyword("or") {
        let span = p.bump().span;
        let rhs = parse_and(p)?;
        lhs = Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        );
    }
    Ok(lhs)
}

fn parse_and(p: &mut Parser) -> Result<Expr, ParseError> {
    let mut lhs = parse_not(p)?;
    while p.check_keyword("and") {
        let span = p.bump().span;
        let rhs = parse_not(p)?;
        lhs = Expr::new(
            ExprKind::Binary {
                op: BinaryOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        );
    }
    Ok(lhs)
}

fn parse_not(p: &mut Parser) -> Result<Expr, ParseError> {
    if p.check_keyword("not") {
        let span = p.bump().span;
        let inner = parse_not(p)?;
        return Ok(Expr::new(
            ExprKind::Unary {
                op: UnaryOp::Not,
                expr: Box::new(inner),
            },
            span,
        ));
    }
    parse_comparison(p)
}

/// Comparisons are non-associative: at most one comparison operator per
/// expression (spec.md §4.2).
pub(crate) fn parse_comparison(p: &mut Parser) -> Result<Expr, ParseError> {
    let lhs = parse_additive(p)?;

    if p.check_keyword("is between") {
        let span = p.bump().span;
        let low = parse_additive(p)?;
        p.expect_keyword("and")?;
        let high = parse_additive(p)?;
        return Ok(Expr::new(
            ExprKind::Between {
                value: Box::new(lhs),
                low: Box::new(low),
                high: Box::new(high),
            },
            span,
        ));
    }

    const COMPARISONS: &[(&str, BinaryOp)] = &[
        ("equals", BinaryOp::Eq),
        ("is greater than or equal to", BinaryOp::Ge),
        ("is greater than", BinaryOp::Gt),
        ("is less than or equal to", BinaryOp::Le),
        ("is less than", BinaryOp::Lt),
        ("is at least", BinaryOp::Ge),
        ("is at most", BinaryOp::Le),
        ("is not equal to", BinaryOp::Ne),
    ];
    for (kw, op) in COMPARISONS {
        if p.check_keyword(kw) {
            let span = p.bump().span;
            let rhs = parse_additive(p)?;
            return Ok(Expr::new(
                ExprKind::Binary {
                    op: *op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            ));
        }
    }

    Ok(lhs)
}

fn parse_additive(p: &mut Parser) -> Result<Expr, ParseError> {
    let mut lhs = parse_multiplicative(p)?;
    loop {
        let op = if p.check_keyword("plus") {
            BinaryOp::Add
        } else if p.check_keyword("minus") {
            BinaryOp::Sub
        } else {
            break;
        };
        let span = p.bump().span;
        let rhs = parse_multiplicative(p)?;
        lhs = Expr::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        );
    }
    Ok(lhs)
}

fn parse_multiplicative(p: &mut Parser) -> Result<Expr, ParseError> {
    let mut lhs = parse_power(p)?;
    loop {
        let op = if p.check_keyword("times") {
            BinaryOp::Mul
        } else if p.check_keyword("divided by") {
            BinaryOp::Div
        } else if p.check_keyword("modulo") {
            BinaryOp::Mod
        } else {
            break;
        };
        let span = p.bump().span;
        let rhs = parse_power(p)?;
        lhs = Expr::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        );
    }
    Ok(lhs)
}

/// Right-associative (spec.md §4.2).
fn parse_power(p: &mut Parser) -> Result<Expr, ParseError> {
    let lhs = parse_unary(p)?;
    if p.check_keyword("to the power of") {
        let span = p.bump().span;
        let rhs = parse_power(p)?;
        return Ok(Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Pow,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        ));
    }
    Ok(lhs)
}

fn parse_unary(p: &mut Parser) -> Result<Expr, ParseError> {
    if p.check_keyword("negative") {
        let span = p.bump().span;
        let expr = parse_unary(p)?;
        return Ok(Expr::new(
            ExprKind::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(expr),
            },
            span,
        ));
    }
    if p.check_keyword("the square root of") {
        let span = p.bump().span;
        let expr = parse_unary(p)?;
        return Ok(Expr::new(
            ExprKind::Unary {
                op: UnaryOp::Sqrt,
                expr: Box::new(expr),
            },
            span,
        ));
    }
    if p.check_keyword("the absolute value of") {
        let span = p.bump().span;
        let expr = parse_unary(p)?;
        return Ok(Expr::new(
            ExprKind::Unary {
                op: UnaryOp::Abs,
                expr: Box::new(expr),
            },
            span,
        ));
    }
    if p.check_keyword("the address of") {
        let span = p.bump().span;
        let expr = parse_unary(p)?;
        return Ok(Expr::new(ExprKind::AddressOf(Box::new(expr)), span));
    }
    if p.check_keyword("the value at") {
        let span = p.bump().span;
        let expr = parse_unary(p)?;
        return Ok(Expr::new(ExprKind::Deref(Box::new(expr)), span));
    }
    parse_postfix(p)
}

/// Postfix chaining: possessive (`bob's age`) and dot (`bob.age`) field
/// access layer onto whatever [`parse_primary`] produced.
pub(crate) fn parse_postfix(p: &mut Parser) -> Result<Expr, ParseError> {
    let mut base = parse_primary(p)?;
    loop {
        if matches!(p.peek_kind(), TokenKind::Possessive) {
            p.bump();
            let (field, span) = p.ident()?;
            base = Expr::new(
                ExprKind::FieldAccess {
                    base: Box::new(base),
                    field,
                    possessive: true,
                },
                span,
            );
        } else if p.check_punct('.') {
            let span = p.bump().span;
            let (field, _) = p.ident()?;
            base = Expr::new(
                ExprKind::FieldAccess {
                    base: Box::new(base),
                    field,
                    possessive: false,
                },
                span,
            );
        } else {
            break;
        }
    }
    Ok(base)
}

fn parse_primary(p: &mut Parser) -> Result<Expr, ParseError> {
    let span = p.span();
    match p.peek_kind().clone() {
        TokenKind::IntLiteral(n) => {
            p.bump();
            Ok(Expr::new(ExprKind::IntLit(n), span))
        }
        TokenKind::DecimalLiteral(n) => {
            p.bump();
            Ok(Expr::new(ExprKind::DecimalLit(n), span))
        }
        TokenKind::StringLiteral(s) => {
            p.bump();
            Ok(Expr::new(ExprKind::StringLit(s), span))
        }
        TokenKind::CharLiteral(c) => {
            p.bump();
            Ok(Expr::new(ExprKind::CharLit(c), span))
        }
        TokenKind::Keyword(k) if k.as_str() == "true" || k.as_str() == "yes" => {
            p.bump();
            Ok(Expr::new(ExprKind::BoolLit(true), span))
        }
        TokenKind::Keyword(k) if k.as_str() == "false" || k.as_str() == "no" => {
            p.bump();
            Ok(Expr::new(ExprKind::BoolLit(false), span))
        }
        TokenKind::Keyword(k) if k.as_str() == "null" => {
            p.bump();
            Ok(Expr::new(ExprKind::NullLit, span))
        }
        TokenKind::Keyword(k) if k.as_str() == "the value of" => {
            p.bump();
            parse_postfix(p)
        }
        TokenKind::Keyword(k) if k.as_str() == "the result of" => {
            p.bump();
            parse_call(p, span)
        }
        TokenKind::Keyword(k) if k.as_str() == "item number" => {
            p.bump();
            let index = parse_additive(p)?;
            p.expect_keyword("in")?;
            let base = parse_postfix(p)?;
            Ok(Expr::new(
                ExprKind::Index {
                    base: Box::new(base),
                    index: Box::new(index),
                },
                span,
            ))
        }
        TokenKind::Keyword(k) if k.as_str() == "the first item in" => {
            p.bump();
            let base = parse_postfix(p)?;
            Ok(Expr::new(
                ExprKind::Index {
                    base: Box::new(base),
                    index: Box::new(Expr::new(ExprKind::IntLit(0), span)),
                },
                span,
            ))
        }
        TokenKind::Keyword(k) if k.as_str() == "the last item in" => {
            p.bump();
            let base = parse_postfix(p)?;
            let len = Expr::new(ExprKind::Length(Box::new(base.clone())), span);
            let index = Expr::new(
                ExprKind::Binary {
                    op: BinaryOp::Sub,
                    lhs: Box::new(len),
                    rhs: Box::new(Expr::new(ExprKind::IntLit(1), span)),
                },
                span,
            );
            Ok(Expr::new(
                ExprKind::Index {
                    base: Box::new(base),
                    index: Box::new(index),
                },
                span,
            ))
        }
        TokenKind::Keyword(k) if k.as_str() == "the length of" => {
            p.bump();
            let base = parse_postfix(p)?;
            Ok(Expr::new(ExprKind::Length(Box::new(base)), span))
        }
        TokenKind::Punct('(') => {
            p.bump();
            let inner = p.parse_expr()?;
            if !p.eat_punct(')') {
                return Err(p.unexpected("`)`".to_string()));
            }
            Ok(inner)
        }
        TokenKind::Ident(_) => {
            let words = p.peek_ident_words(8);
            if p.fn_trie.longest_match(&words) > 0 {
                parse_call(p, span)
            } else {
                let (name, span) = p.ident()?;
                Ok(Expr::new(ExprKind::Var(name), span))
            }
        }
        _ => Err(p.unexpected("an expression".to_string())),
    }
}

/// Parses a call by matching the longest run of identifier words against
/// the function table built by [`crate::items::prepass`], then an
/// optional `with` argument list (spec.md §9: call sites use the same
/// phrase shape as definitions).
pub(crate) fn parse_call(p: &mut Parser, span: zincc_util::Span) -> Result<Expr, ParseError> {
    let words = p.peek_ident_words(8);
    let matched = p.fn_trie.longest_match(&words);
    if matched == 0 {
        return Err(p.unexpected("a function name".to_string()));
    }
    for _ in 0..matched {
        p.bump();
    }
    let callee = Symbol::intern(&crate::items::sanitize_name(&words[..matched]));

    let mut args = Vec::new();
    if p.eat_keyword("with") {
        loop {
            args.push(parse_comparison(p)?);
            if !p.eat_keyword("and") {
                break;
            }
        }
    }

    Ok(Expr::new(ExprKind::Call { callee, args }, span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zincc_util::FileId;

    fn parse(source: &str) -> Expr {
        let tokens = zincc_lex::tokenize(source, FileId::DUMMY).unwrap();
        let mut p = Parser::new(tokens);
        p.parse_expr().unwrap()
    }

    #[test]
    fn arithmetic_precedence_matches_spec_example() {
        // `temp minus 32 times 5 divided by 9` (spec.md §9) parses as
        // `temp minus ((32 times 5) divided by 9)`.
        let expr = parse("temp minus 32 times 5 divided by 9");
        match expr.kind {
            ExprKind::Binary {
                op: BinaryOp::Sub,
                rhs,
                ..
            } => match rhs.kind {
                ExprKind::Binary {
                    op: BinaryOp::Div, ..
                } => {}
                other => panic!("expected division on the right, got {other:?}"),
            },
            other => panic!("expected subtraction at the top, got {other:?}"),
        }
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse("2 to the power of 3 to the power of 2");
        match expr.kind {
            ExprKind::Binary {
                op: BinaryOp::Pow,
                rhs,
                ..
            } => assert!(matches!(
                rhs.kind,
                ExprKind::Binary {
                    op: BinaryOp::Pow,
                    ..
                }
            )),
            other => panic!("expected power at the top, got {other:?}"),
        }
    }

    #[test]
    fn possessive_field_access() {
        let expr = parse("bob's age");
        match expr.kind {
            ExprKind::FieldAccess {
                field, possessive, ..
            } => {
                assert!(possessive);
                assert_eq!(field.as_str(), "age");
            }
            other => panic!("expected field access, got {other:?}"),
        }
    }

    #[test]
    fn is_between_desugars_to_composite() {
        let expr = parse("x is between 1 and 10");
        assert!(matches!(expr.kind, ExprKind::Between { .. }));
    }

    #[test]
    fn plain_identifier_not_matching_any_function_is_a_var() {
        let expr = parse("user_age_plus_one");
        match expr.kind {
            ExprKind::Var(s) => assert_eq!(s.as_str(), "user_age_plus_one"),
            other => panic!("expected var, got {other:?}"),
        }
    }
}
