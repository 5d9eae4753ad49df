//! Statement lowering: walks a Zinc [`Block`] and appends one C statement
//! (or block) per node to a [`Writer`] (spec.md §4.4's lowering table).

use zincc_par::ast::*;
use zincc_par::types::Type;

use crate::env::Env;
use crate::expr::emit_expr;
use crate::types::{c_decl, c_type_name};
use crate::LowerError;

pub struct Writer {
    buf: String,
    indent: usize,
    /// Counter for synthesized loop variables (`repeat` counters, `for
    /// each` array indices), so nested loops at the same lexical depth
    /// never collide (spec.md §4.4: "`repeat N times` ... with unique
    /// counter").
    tmp_counter: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self {
            buf: String::new(),
            indent: 0,
            tmp_counter: 0,
        }
    }

    pub fn finish(self) -> String {
        self.buf
    }

    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.buf.push_str("    ");
        }
        self.buf.push_str(text.as_ref());
        self.buf.push('\n');
    }

    fn fresh_name(&mut self, prefix: &str) -> String {
        let n = self.tmp_counter;
        self.tmp_counter += 1;
        format!("{prefix}{n}")
    }
}

pub fn emit_block(w: &mut Writer, block: &Block, env: &mut Env) -> Result<(), LowerError> {
    for stmt in block {
        emit_stmt(w, stmt, env)?;
    }
    Ok(())
}

fn emit_stmt(w: &mut Writer, stmt: &Stmt, env: &mut Env) -> Result<(), LowerError> {
    match &stmt.kind {
        StmtKind::VarDecl { ty, name, init } => {
            let ty = ty.clone().unwrap_or(Type::Integer);
            env.declare(*name, ty.clone());
            match init {
                Some(value) => w.line(format!(
                    "{} = {};",
                    c_decl(&ty, &name.as_str()),
                    emit_expr(value, env)
                )),
                None => w.line(format!("{};", c_decl(&ty, &name.as_str()))),
            }
        }
        StmtKind::Assign { target, value } => {
            w.line(format!(
                "{} = {};",
                emit_expr(target, env),
                emit_expr(value, env)
            ));
        }
        StmtKind::CompoundAssign { op, target, value } => {
            let c_op = match op {
                CompoundOp::Add | CompoundOp::Increase => "+=",
                CompoundOp::Subtract | CompoundOp::Decrease => "-=",
                CompoundOp::Multiply => "*=",
                CompoundOp::Divide => "/=",
            };
            w.line(format!(
                "{} {} {};",
                emit_expr(target, env),
                c_op,
                emit_expr(value, env)
            ));
        }
        StmtKind::If {
            cond,
            then_block,
            else_ifs,
            else_block,
        } => {
            w.line(format!("if ({}) {{", emit_expr(cond, env)));
            w.indent += 1;
            emit_block(w, then_block, env)?;
            w.indent -= 1;
            for (cond, body) in else_ifs {
                w.line(format!("}} else if ({}) {{", emit_expr(cond, env)));
                w.indent += 1;
                emit_block(w, body, env)?;
                w.indent -= 1;
            }
            if let Some(body) = else_block {
                w.line("} else {");
                w.indent += 1;
                emit_block(w, body, env)?;
                w.indent -= 1;
            }
            w.line("}");
        }
        StmtKind::While { cond, body } => {
            w.line(format!("while ({}) {{", emit_expr(cond, env)));
            w.indent += 1;
            emit_block(w, body, env)?;
            w.indent -= 1;
            w.line("}");
        }
        StmtKind::ForRange {
            var,
            start,
            end,
            descending,
            body,
        } => {
            let var_name = var.as_str();
            let (cmp, step) = if *descending { (">=", "--") } else { ("<=", "++") };
            w.line(format!(
                "for (int {var_name} = {}; {var_name} {cmp} {}; {var_name}{step}) {{",
                emit_expr(start, env),
                emit_expr(end, env),
            ));
            w.indent += 1;
            env.declare(*var, Type::Integer);
            emit_block(w, body, env)?;
            w.indent -= 1;
            w.line("}");
        }
        StmtKind::ForEach { var, list, body } => {
            let elem_ty = match env.infer(list) {
                Type::FixedArray(inner, n) => (*inner, n),
                _ => {
                    return Err(LowerError::UnsupportedConstruct {
                        construct: "`for each ... in` over a list with no statically known length"
                            .to_string(),
                        span: stmt.span,
                    })
                }
            };
            let idx = w.fresh_name("_zn_idx");
            w.line(format!(
                "for (long long {idx} = 0; {idx} < {}; {idx}++) {{",
                elem_ty.1
            ));
            w.indent += 1;
            env.declare(*var, elem_ty.0.clone());
            w.line(format!(
                "{} = ({})[{idx}];",
                c_decl(&elem_ty.0, &var.as_str()),
                emit_expr(list, env)
            ));
            emit_block(w, body, env)?;
            w.indent -= 1;
            w.line("}");
        }
        StmtKind::RepeatTimes { count, body } => {
            let counter = w.fresh_name("_zn_rep");
            w.line(format!(
                "for (int {counter} = 0; {counter} < ({}); {counter}++) {{",
                emit_expr(count, env)
            ));
            w.indent += 1;
            emit_block(w, body, env)?;
            w.indent -= 1;
            w.line("}");
        }
        StmtKind::Break => w.line("break;"),
        StmtKind::Continue => w.line("continue;"),
        StmtKind::Return(value) => match value {
            Some(e) => w.line(format!("return {};", emit_expr(e, env))),
            None => w.line("return;"),
        },
        StmtKind::Call(expr) => w.line(format!("{};", emit_expr(expr, env))),
        StmtKind::ReadNumber { target } => {
            let fmt = match env.infer(target) {
                Type::Decimal => "%lf",
                Type::Character => " %c",
                _ => "%d",
            };
            w.line(format!(
                "scanf(\"{fmt}\", &({}));",
                emit_expr(target, env)
            ));
        }
        StmtKind::ReadText { target } => {
            w.line(format!("{} = zn_read_line();", emit_expr(target, env)));
        }
        StmtKind::Output { items } => emit_output(w, items, env),
        StmtKind::FileOpen { path, mode, handle } => {
            let mode_str = match mode {
                FileMode::Read => "r",
                FileMode::Write => "w",
                FileMode::Append => "a",
            };
            env.declare(*handle, Type::Pointer(Box::new(Type::Void)));
            w.line(format!(
                "FILE *{} = fopen({}, \"{mode_str}\");",
                handle.as_str(),
                emit_expr(path, env)
            ));
        }
        StmtKind::FileClose { handle } => {
            w.line(format!("fclose({});", emit_expr(handle, env)));
        }
        StmtKind::FileRead { handle, target } => {
            w.line(format!(
                "{} = zn_read_line_from({});",
                emit_expr(target, env),
                emit_expr(handle, env)
            ));
        }
        StmtKind::AllocateArray { count, elem_ty, name } => {
            env.declare(*name, Type::Pointer(Box::new(elem_ty.clone())));
            w.line(format!(
                "{} = malloc(sizeof({}) * ({}));",
                c_decl(&Type::Pointer(Box::new(elem_ty.clone())), &name.as_str()),
                c_type_name(elem_ty),
                emit_expr(count, env)
            ));
        }
        StmtKind::FreeMemory { target } => {
            w.line(format!("free({});", emit_expr(target, env)));
        }
        StmtKind::Graphics { call, args } => {
            let rendered: Vec<String> = args.iter().map(|a| emit_expr(a, env)).collect();
            w.line(format!("{}({});", call.as_str(), rendered.join(", ")));
        }
        StmtKind::RawC(text) => w.line(text),
    }
    Ok(())
}

fn emit_output(w: &mut Writer, items: &[Expr], env: &Env) {
    let mut fmt = String::new();
    let mut args = Vec::new();
    for item in items {
        fmt.push_str(specifier_for(&env.infer(item)));
        args.push(emit_expr(item, env));
    }
    if args.is_empty() {
        w.line("printf(\"\\n\");");
    } else {
        w.line(format!(
            "printf(\"{fmt}\\n\", {});",
            args.join(", ")
        ));
    }
}

fn specifier_for(ty: &Type) -> &'static str {
    match ty {
        Type::Integer | Type::Boolean => "%d",
        Type::Decimal => "%g",
        Type::Character => "%c",
        Type::Text => "%s",
        Type::Pointer(_) => "%p",
        Type::FixedArray(_, _) | Type::OpenArray(_) | Type::Struct(_) | Type::Void => "%d",
    }
}
