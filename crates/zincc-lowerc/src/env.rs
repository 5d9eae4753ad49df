//! A lightweight per-function type environment built while walking the
//! body (the resolver tags *names* with a resolution kind but, unlike
//! `zincc-bc`'s `Lowerer`, keeps no per-variable type table of its own —
//! §4.3 only promises kind tags, not types). The C backend needs variable
//! types to choose a `say` format specifier, pick `.`/`->` for field
//! access, and decide whether `divided by` lowers to integer or floating
//! division, so it tracks its own copy the same way `zincc_bc::lower`
//! does.

use std::collections::HashMap;

use zincc_par::ast::*;
use zincc_par::types::Type;
use zincc_sem::ResolvedProgram;
use zincc_util::Symbol;

pub struct Env<'a> {
    pub resolved: &'a ResolvedProgram,
    locals: HashMap<Symbol, Type>,
}

impl<'a> Env<'a> {
    pub fn new(resolved: &'a ResolvedProgram) -> Self {
        Self {
            resolved,
            locals: HashMap::new(),
        }
    }

    pub fn declare(&mut self, name: Symbol, ty: Type) {
        self.locals.insert(name, ty);
    }

    pub fn lookup(&self, name: Symbol) -> Option<&Type> {
        self.locals.get(&name)
    }

    /// Best-effort type of `expr`, for format-specifier and operator
    /// selection. An identifier the resolver tagged `Passthrough` (spec.md
    /// §4.3) has no Zinc type at all — it flows through to the C compiler,
    /// which is the only component that can ever reject it (spec.md §7) —
    /// so unresolved names default to `Integer` here, matching the
    /// documented "the lowering trusts the programmer" limitation already
    /// applied to `return` (spec.md's data-model invariants).
    pub fn infer(&self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::IntLit(_) => Type::Integer,
            ExprKind::DecimalLit(_) => Type::Decimal,
            ExprKind::StringLit(_) => Type::Text,
            ExprKind::CharLit(_) => Type::Character,
            ExprKind::BoolLit(_) => Type::Boolean,
            ExprKind::NullLit => Type::Pointer(Box::new(Type::Void)),
            ExprKind::Var(name) => self.lookup(*name).cloned().unwrap_or(Type::Integer),
            ExprKind::Unary { op, expr: inner } => match op {
                UnaryOp::Sqrt => Type::Decimal,
                UnaryOp::Not => Type::Boolean,
                UnaryOp::Neg | UnaryOp::Abs => self.infer(inner),
            },
            ExprKind::Binary { op, lhs, rhs } => match op {
                BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
                | BinaryOp::And
                | BinaryOp::Or => Type::Boolean,
                BinaryOp::Pow => Type::Decimal,
                _ => {
                    if self.infer(lhs) == Type::Decimal || self.infer(rhs) == Type::Decimal {
                        Type::Decimal
                    } else {
                        Type::Integer
                    }
                }
            },
            ExprKind::Index { base, .. } => match self.infer(base) {
                Type::FixedArray(inner, _) | Type::OpenArray(inner) | Type::Pointer(inner) => {
                    *inner
                }
                _ => Type::Integer,
            },
            ExprKind::FieldAccess { base, field, .. } => {
                let base_ty = self.infer(base);
                let struct_name = match strip_pointer(&base_ty) {
                    Type::Struct(name) => Some(*name),
                    _ => None,
                };
                struct_name
                    .and_then(|name| self.resolved.structs.get(&name))
                    .and_then(|layout| layout.field_type(*field))
                    .cloned()
                    .unwrap_or(Type::Integer)
            }
            ExprKind::AddressOf(inner) => Type::Pointer(Box::new(self.infer(inner))),
            ExprKind::Deref(inner) => match self.infer(inner) {
                Type::Pointer(inner) => *inner,
                other => other,
            },
            ExprKind::Call { callee, .. } => self
                .resolved
                .functions
                .get(callee)
                .and_then(|sig| sig.ret.clone())
                .unwrap_or(Type::Void),
            ExprKind::Between { .. } => Type::Boolean,
            ExprKind::Length(_) => Type::Integer,
            ExprKind::Concat(_) => Type::Text,
            ExprKind::RawC(_) => Type::Integer,
        }
    }
}

fn strip_pointer(ty: &Type) -> &Type {
    match ty {
        Type::Pointer(inner) => strip_pointer(inner),
        other => other,
    }
}
