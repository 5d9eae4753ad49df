//! Expression lowering: one Zinc [`Expr`] in, one parenthesized C
//! expression fragment out.

use zincc_par::ast::*;
use zincc_par::types::Type;

use crate::env::Env;

pub fn emit_expr(expr: &Expr, env: &Env) -> String {
    match &expr.kind {
        ExprKind::IntLit(n) => n.to_string(),
        ExprKind::DecimalLit(f) => format_decimal(*f),
        ExprKind::StringLit(s) => format!("\"{}\"", c_escape(&s.as_str())),
        ExprKind::CharLit(c) => format!("'{}'", c_escape_char(*c)),
        ExprKind::BoolLit(b) => if *b { "1" } else { "0" }.to_string(),
        ExprKind::NullLit => "NULL".to_string(),
        ExprKind::Var(name) => name.as_str(),
        ExprKind::Unary { op, expr: inner } => emit_unary(*op, inner, env),
        ExprKind::Binary { op, lhs, rhs } => emit_binary(*op, lhs, rhs, env),
        ExprKind::Index { base, index } => {
            format!("({})[{}]", emit_expr(base, env), emit_expr(index, env))
        }
        ExprKind::FieldAccess { base, field, .. } => {
            let sep = if matches!(env.infer(base), Type::Pointer(_)) {
                "->"
            } else {
                "."
            };
            format!("({}){}{}", emit_expr(base, env), sep, field.as_str())
        }
        ExprKind::AddressOf(inner) => format!("(&({}))", emit_expr(inner, env)),
        ExprKind::Deref(inner) => format!("(*({}))", emit_expr(inner, env)),
        ExprKind::Call { callee, args } => {
            let rendered: Vec<String> = args.iter().map(|a| emit_expr(a, env)).collect();
            format!("{}({})", callee.as_str(), rendered.join(", "))
        }
        ExprKind::Between { value, low, high } => {
            let v = emit_expr(value, env);
            format!(
                "(({}) >= ({}) && ({}) <= ({}))",
                v,
                emit_expr(low, env),
                v,
                emit_expr(high, env)
            )
        }
        ExprKind::Length(inner) => match env.infer(inner) {
            Type::FixedArray(_, n) => n.to_string(),
            _ => format!("((int)strlen({}))", emit_expr(inner, env)),
        },
        // Only reachable when a concatenation appears outside an output
        // statement (the parser desugars `say`/`print` concatenation
        // lists straight into `StmtKind::Output`'s item vector). There's
        // no single C expression for "these N values, stringified and
        // joined" outside of a `printf` call, so the first operand stands
        // in for the whole list.
        ExprKind::Concat(items) => items
            .first()
            .map(|e| emit_expr(e, env))
            .unwrap_or_else(|| "0".to_string()),
        ExprKind::RawC(text) => text.clone(),
    }
}

fn emit_unary(op: UnaryOp, inner: &Expr, env: &Env) -> String {
    let rendered = emit_expr(inner, env);
    match op {
        UnaryOp::Neg => format!("(-({rendered}))"),
        UnaryOp::Not => format!("(!({rendered}))"),
        UnaryOp::Sqrt => format!("sqrt((double)({rendered}))"),
        UnaryOp::Abs => {
            if env.infer(inner) == Type::Decimal {
                format!("fabs({rendered})")
            } else {
                format!("abs({rendered})")
            }
        }
    }
}

fn emit_binary(op: BinaryOp, lhs: &Expr, rhs: &Expr, env: &Env) -> String {
    let l = emit_expr(lhs, env);
    let r = emit_expr(rhs, env);
    let is_decimal = env.infer(lhs) == Type::Decimal || env.infer(rhs) == Type::Decimal;
    match op {
        BinaryOp::Add => format!("(({l}) + ({r}))"),
        BinaryOp::Sub => format!("(({l}) - ({r}))"),
        BinaryOp::Mul => format!("(({l}) * ({r}))"),
        BinaryOp::Div => format!("(({l}) / ({r}))"),
        BinaryOp::Mod => {
            if is_decimal {
                format!("fmod((double)({l}), (double)({r}))")
            } else {
                format!("(({l}) % ({r}))")
            }
        }
        BinaryOp::Pow => format!("pow((double)({l}), (double)({r}))"),
        BinaryOp::Eq => format!("(({l}) == ({r}))"),
        BinaryOp::Ne => format!("(({l}) != ({r}))"),
        BinaryOp::Lt => format!("(({l}) < ({r}))"),
        BinaryOp::Le => format!("(({l}) <= ({r}))"),
        BinaryOp::Gt => format!("(({l}) > ({r}))"),
        BinaryOp::Ge => format!("(({l}) >= ({r}))"),
        BinaryOp::And => format!("(({l}) && ({r}))"),
        BinaryOp::Or => format!("(({l}) || ({r}))"),
    }
}

/// Renders an `f64` as a C double literal that always carries a decimal
/// point or exponent, so `5.0` never round-trips through Rust's `Display`
/// as the bare (and, in C, integer-typed) token `5`.
fn format_decimal(f: f64) -> String {
    let s = format!("{f}");
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("nan") {
        s
    } else {
        format!("{s}.0")
    }
}

fn c_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn c_escape_char(c: char) -> String {
    match c {
        '\\' => "\\\\".to_string(),
        '\'' => "\\'".to_string(),
        '\n' => "\\n".to_string(),
        '\t' => "\\t".to_string(),
        _ => c.to_string(),
    }
}
