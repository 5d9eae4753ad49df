//! The per-function tree walk that binds locals/parameters into a
//! [`ScopeTree`] and records a [`NameKind`] for every name-bearing node it
//! visits (spec.md §4.3). Loop induction variables are bound only within
//! their own loop body, per spec.md's resolution of the `for each item in
//! the list` open question.

use std::collections::HashMap;

use zincc_par::ast::*;
use zincc_util::{Span, Symbol};

use crate::scope::{RibKind, ScopeTree};
use crate::{FuncSig, NameKind};

type Functions = HashMap<Symbol, FuncSig>;
type Kinds = HashMap<Span, NameKind>;

pub fn resolve_function(func: &FnDef, functions: &Functions, kinds: &mut Kinds) {
    let mut tree = ScopeTree::new();
    for param in &func.params {
        tree.bind(param.name, NameKind::Param);
        kinds.insert(param.span, NameKind::Param);
    }
    walk_block(&func.body, &mut tree, functions, kinds);
}

pub fn resolve_main(main: &MainDef, functions: &Functions, kinds: &mut Kinds) {
    let mut tree = ScopeTree::new();
    walk_block(&main.body, &mut tree, functions, kinds);
}

fn walk_block(block: &Block, tree: &mut ScopeTree, functions: &Functions, kinds: &mut Kinds) {
    for stmt in block {
        walk_stmt(stmt, tree, functions, kinds);
    }
}

fn walk_stmt(stmt: &Stmt, tree: &mut ScopeTree, functions: &Functions, kinds: &mut Kinds) {
    match &stmt.kind {
        StmtKind::VarDecl { name, init, .. } => {
            if let Some(init) = init {
                walk_expr(init, tree, functions, kinds);
            }
            tree.bind(*name, NameKind::Local);
            kinds.insert(stmt.span, NameKind::Local);
        }
        StmtKind::Assign { target, value } => {
            walk_expr(target, tree, functions, kinds);
            walk_expr(value, tree, functions, kinds);
        }
        StmtKind::CompoundAssign { target, value, .. } => {
            walk_expr(target, tree, functions, kinds);
            walk_expr(value, tree, functions, kinds);
        }
        StmtKind::If {
            cond,
            then_block,
            else_ifs,
            else_block,
        } => {
            walk_expr(cond, tree, functions, kinds);
            tree.enter(RibKind::Block);
            walk_block(then_block, tree, functions, kinds);
            tree.exit();
            for (cond, body) in else_ifs {
                walk_expr(cond, tree, functions, kinds);
                tree.enter(RibKind::Block);
                walk_block(body, tree, functions, kinds);
                tree.exit();
            }
            if let Some(body) = else_block {
                tree.enter(RibKind::Block);
                walk_block(body, tree, functions, kinds);
                tree.exit();
            }
        }
        StmtKind::While { cond, body } => {
            walk_expr(cond, tree, functions, kinds);
            tree.enter(RibKind::Loop);
            walk_block(body, tree, functions, kinds);
            tree.exit();
        }
        StmtKind::ForRange {
            var, start, end, body, ..
        } => {
            walk_expr(start, tree, functions, kinds);
            walk_expr(end, tree, functions, kinds);
            tree.enter(RibKind::Loop);
            tree.bind(*var, NameKind::Local);
            kinds.insert(stmt.span, NameKind::Local);
            walk_block(body, tree, functions, kinds);
            tree.exit();
        }
        StmtKind::ForEach { var, list, body } => {
            walk_expr(list, tree, functions, kinds);
            tree.enter(RibKind::Loop);
            tree.bind(*var, NameKind::Local);
            kinds.insert(stmt.span, NameKind::Local);
            walk_block(body, tree, functions, kinds);
            tree.exit();
        }
        StmtKind::RepeatTimes { count, body } => {
            walk_expr(count, tree, functions, kinds);
            tree.enter(RibKind::Loop);
            walk_block(body, tree, functions, kinds);
            tree.exit();
        }
        StmtKind::Break | StmtKind::Continue => {}
        StmtKind::Return(Some(value)) => walk_expr(value, tree, functions, kinds),
        StmtKind::Return(None) => {}
        StmtKind::Call(call) => walk_expr(call, tree, functions, kinds),
        StmtKind::ReadNumber { target } | StmtKind::ReadText { target } => {
            walk_expr(target, tree, functions, kinds);
        }
        StmtKind::Output { items } => {
            for item in items {
                walk_expr(item, tree, functions, kinds);
            }
        }
        StmtKind::FileOpen { path, handle, .. } => {
            walk_expr(path, tree, functions, kinds);
            tree.bind(*handle, NameKind::Local);
            kinds.insert(stmt.span, NameKind::Local);
        }
        StmtKind::FileClose { handle } => walk_expr(handle, tree, functions, kinds),
        StmtKind::FileRead { handle, target } => {
            walk_expr(handle, tree, functions, kinds);
            walk_expr(target, tree, functions, kinds);
        }
        StmtKind::AllocateArray { count, name, .. } => {
            walk_expr(count, tree, functions, kinds);
            tree.bind(*name, NameKind::Local);
            kinds.insert(stmt.span, NameKind::Local);
        }
        StmtKind::FreeMemory { target } => walk_expr(target, tree, functions, kinds),
        StmtKind::Graphics { args, .. } => {
            for arg in args {
                walk_expr(arg, tree, functions, kinds);
            }
        }
        StmtKind::RawC(_) => {}
    }
}

fn walk_expr(expr: &Expr, tree: &ScopeTree, functions: &Functions, kinds: &mut Kinds) {
    match &expr.kind {
        ExprKind::IntLit(_)
        | ExprKind::DecimalLit(_)
        | ExprKind::StringLit(_)
        | ExprKind::CharLit(_)
        | ExprKind::BoolLit(_)
        | ExprKind::NullLit
        | ExprKind::RawC(_) => {}
        ExprKind::Var(name) => {
            let kind = tree.resolve(*name).unwrap_or(NameKind::Passthrough);
            kinds.insert(expr.span, kind);
        }
        ExprKind::Unary { expr: inner, .. } => walk_expr(inner, tree, functions, kinds),
        ExprKind::Binary { lhs, rhs, .. } => {
            walk_expr(lhs, tree, functions, kinds);
            walk_expr(rhs, tree, functions, kinds);
        }
        ExprKind::Index { base, index } => {
            walk_expr(base, tree, functions, kinds);
            walk_expr(index, tree, functions, kinds);
        }
        ExprKind::FieldAccess { base, .. } => {
            walk_expr(base, tree, functions, kinds);
            kinds.insert(expr.span, NameKind::StructField);
        }
        ExprKind::AddressOf(inner) | ExprKind::Deref(inner) => {
            walk_expr(inner, tree, functions, kinds);
        }
        ExprKind::Call { callee, args } => {
            let kind = if functions.contains_key(callee) {
                NameKind::Function
            } else {
                NameKind::Passthrough
            };
            kinds.insert(expr.span, kind);
            for arg in args {
                walk_expr(arg, tree, functions, kinds);
            }
        }
        ExprKind::Between { value, low, high } => {
            walk_expr(value, tree, functions, kinds);
            walk_expr(low, tree, functions, kinds);
            walk_expr(high, tree, functions, kinds);
        }
        ExprKind::Length(inner) => walk_expr(inner, tree, functions, kinds),
        ExprKind::Concat(items) => {
            for item in items {
                walk_expr(item, tree, functions, kinds);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zincc_util::FileId;

    fn resolve(source: &str) -> crate::ResolvedProgram {
        let program = zincc_par::Parser::parse(source, FileId::DUMMY).unwrap();
        crate::resolve(program).unwrap()
    }

    #[test]
    fn loop_variable_is_scoped_to_its_body_only() {
        let resolved = resolve(
            "to do the main thing:\nfor each number i from 1 to 5:\nsay i\nend\nsay i\nend",
        );
        let main = resolved.program.main.as_ref().unwrap();
        let after_loop_say = &main.body[1];
        if let StmtKind::Output { items } = &after_loop_say.kind {
            assert_eq!(resolved.kind_at(items[0].span), NameKind::Passthrough);
        } else {
            panic!("expected output statement");
        }
    }

    #[test]
    fn call_to_known_function_is_tagged_function() {
        let resolved = resolve(
            "to greet:\nsay \"hi\"\nend\nto do the main thing:\ngreet\nend",
        );
        let main = resolved.program.main.as_ref().unwrap();
        if let StmtKind::Call(call) = &main.body[0].kind {
            assert_eq!(resolved.kind_at(call.span), NameKind::Function);
        } else {
            panic!("expected call statement");
        }
    }
}
