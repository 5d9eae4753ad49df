//! Lowers a [`ResolvedProgram`] to bytecode (spec.md §4.5, the alternate
//! native-codegen path). Some surface constructs have no bytecode
//! equivalent at all — raw-C passthrough, file I/O, graphics calls, and
//! `for each` over a dynamically-sized list — and are rejected here with a
//! [`LowerError`] rather than silently miscompiled; programs using them
//! must go through `zincc-lowerc`'s C path instead.

use std::collections::HashMap;

use zincc_par::ast::*;
use zincc_par::types::Type;
use zincc_sem::ResolvedProgram;
use zincc_util::Symbol;

use crate::builder::Builder;
use crate::function::{Function, LocalId, Program, Reg};
use crate::instr::Instr;
use crate::opcode::{Const, Opcode};
use crate::LowerError;

pub fn lower_program(resolved: &ResolvedProgram) -> Result<Program, LowerError> {
    let mut functions = Vec::new();
    for def in &resolved.program.functions {
        functions.push(lower_function(def, resolved)?);
    }
    if let Some(main) = &resolved.program.main {
        functions.push(lower_main(main, resolved)?);
    }
    Ok(Program { functions })
}

fn lower_function(def: &FnDef, resolved: &ResolvedProgram) -> Result<Function, LowerError> {
    let mut lw = Lowerer::new(resolved, def.name, def.params.len(), def.ret_type.clone());
    for param in &def.params {
        lw.declare_local(Some(param.name), param.ty.clone());
    }
    lw.lower_block(&def.body)?;
    lw.builder.emit(Instr::Return { value: None });
    Ok(lw.builder.build())
}

fn lower_main(main: &MainDef, resolved: &ResolvedProgram) -> Result<Function, LowerError> {
    let mut lw = Lowerer::new(resolved, Symbol::intern("main"), 0, Some(Type::Integer));
    lw.lower_block(&main.body)?;
    let zero = lw.fresh();
    lw.builder.emit(Instr::LoadConst {
        dst: zero,
        value: Const::Int(0),
    });
    lw.builder.emit(Instr::Return { value: Some(zero) });
    Ok(lw.builder.build())
}

struct LoopCx {
    break_jumps: Vec<usize>,
    /// `continue` jumps are collected and patched once the loop's
    /// step/recheck point is known — for a `while` that's the condition
    /// re-check; for a counted loop it's the induction-variable increment,
    /// which is lowered *after* the body.
    continue_jumps: Vec<usize>,
}

struct Lowerer<'a> {
    resolved: &'a ResolvedProgram,
    builder: Builder,
    scopes: Vec<HashMap<Symbol, LocalId>>,
    next_reg: u32,
    loops: Vec<LoopCx>,
}

impl<'a> Lowerer<'a> {
    fn new(resolved: &'a ResolvedProgram, name: Symbol, param_count: usize, ret: Option<Type>) -> Self {
        Self {
            resolved,
            builder: Builder::new(name, param_count, ret),
            scopes: vec![HashMap::new()],
            next_reg: 0,
            loops: Vec::new(),
        }
    }

    fn fresh(&mut self) -> Reg {
        let reg = Reg(self.next_reg);
        self.next_reg += 1;
        reg
    }

    fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare_local(&mut self, name: Option<Symbol>, ty: Type) -> LocalId {
        let id = self.builder.add_local(name, ty);
        if let Some(name) = name {
            self.scopes.last_mut().unwrap().insert(name, id);
        }
        id
    }

    fn lookup_local(&self, name: Symbol) -> Option<LocalId> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&name).copied())
    }

    // --- minimal, best-effort type inference, sufficient to pick the
    // operand-typed opcode variant (spec.md §7 Non-goals: a full type
    // checker is out of scope, but lowering still needs *some* types).

    fn infer_type(&self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::IntLit(_) => Type::Integer,
            ExprKind::DecimalLit(_) => Type::Decimal,
            ExprKind::StringLit(_) => Type::Text,
            ExprKind::CharLit(_) => Type::Character,
            ExprKind::BoolLit(_) => Type::Boolean,
            ExprKind::NullLit => Type::Pointer(Box::new(Type::Void)),
            ExprKind::Var(name) => self
                .lookup_local(*name)
                .map(|id| self.builder.local_ty(id).clone())
                .unwrap_or(Type::Integer),
            ExprKind::Unary { op, expr } => match op {
                UnaryOp::Not => Type::Boolean,
                UnaryOp::Sqrt => Type::Decimal,
                UnaryOp::Neg | UnaryOp::Abs => self.infer_type(expr),
            },
            ExprKind::Binary { op, lhs, .. } => match op {
                BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
                | BinaryOp::And
                | BinaryOp::Or => Type::Boolean,
                _ => self.infer_type(lhs),
            },
            ExprKind::Index { base, .. } => match self.infer_type(base) {
                Type::FixedArray(inner, _) | Type::OpenArray(inner) | Type::Pointer(inner) => *inner,
                _ => Type::Integer,
            },
            ExprKind::FieldAccess { base, field, .. } => {
                let base_ty = self.infer_type(base);
                let struct_name = match base_ty {
                    Type::Struct(name) => Some(name),
                    Type::Pointer(inner) => match *inner {
                        Type::Struct(name) => Some(name),
                        _ => None,
                    },
                    _ => None,
                };
                struct_name
                    .and_then(|name| self.resolved.structs.get(&name))
                    .and_then(|layout| layout.field_type(*field))
                    .cloned()
                    .unwrap_or(Type::Integer)
            }
            ExprKind::AddressOf(inner) => Type::Pointer(Box::new(self.infer_type(inner))),
            ExprKind::Deref(inner) => match self.infer_type(inner) {
                Type::Pointer(inner) => *inner,
                _ => Type::Integer,
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

    fn print_opcode(&self, ty: &Type) -> Opcode {
        match ty {
            Type::Integer => Opcode::PrintInt,
            Type::Decimal => Opcode::PrintDecimal,
            Type::Text => Opcode::PrintText,
            Type::Character => Opcode::PrintChar,
            Type::Boolean => Opcode::PrintBool,
            _ => Opcode::PrintInt,
        }
    }

    fn cmp_opcode(&self, op: BinaryOp, ty: &Type) -> Opcode {
        let decimal = matches!(ty, Type::Decimal);
        match op {
            BinaryOp::Eq => if decimal { Opcode::EqDecimal } else { Opcode::EqInt },
            BinaryOp::Ne => if decimal { Opcode::NeDecimal } else { Opcode::NeInt },
            BinaryOp::Lt => if decimal { Opcode::LtDecimal } else { Opcode::LtInt },
            BinaryOp::Le => if decimal { Opcode::LeDecimal } else { Opcode::LeInt },
            BinaryOp::Gt => if decimal { Opcode::GtDecimal } else { Opcode::GtInt },
            BinaryOp::Ge => if decimal { Opcode::GeDecimal } else { Opcode::GeInt },
            other => unreachable!("{other:?} is not a comparison"),
        }
    }

    fn arith_opcode(&self, op: BinaryOp, ty: &Type) -> Opcode {
        let decimal = matches!(ty, Type::Decimal);
        match op {
            BinaryOp::Add => if decimal { Opcode::AddDecimal } else { Opcode::AddInt },
            BinaryOp::Sub => if decimal { Opcode::SubDecimal } else { Opcode::SubInt },
            BinaryOp::Mul => if decimal { Opcode::MulDecimal } else { Opcode::MulInt },
            BinaryOp::Div => if decimal { Opcode::DivDecimal } else { Opcode::DivInt },
            BinaryOp::Mod => if decimal { Opcode::ModDecimal } else { Opcode::ModInt },
            BinaryOp::Pow => if decimal { Opcode::PowDecimal } else { Opcode::PowInt },
            other => unreachable!("{other:?} is not arithmetic"),
        }
    }

    fn field_offset(&self, base: &Expr, field: Symbol, span: zincc_util::Span) -> Result<u32, LowerError> {
        let base_ty = self.infer_type(base);
        let struct_name = match base_ty {
            Type::Struct(name) => Some(name),
            Type::Pointer(inner) => match *inner {
                Type::Struct(name) => Some(name),
                _ => None,
            },
            _ => None,
        };
        struct_name
            .and_then(|name| self.resolved.structs.get(&name))
            .and_then(|layout| layout.field_index(field))
            .map(|idx| idx as u32)
            .ok_or(LowerError::UnsupportedConstruct {
                construct: "field access on a non-struct value".to_string(),
                span,
            })
    }

    fn lower_block(&mut self, block: &Block) -> Result<(), LowerError> {
        for stmt in block {
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    fn store_into(&mut self, target: &Expr, src: Reg) -> Result<(), LowerError> {
        match &target.kind {
            ExprKind::Var(name) => {
                let local = self.lookup_local(*name).ok_or(LowerError::UnsupportedConstruct {
                    construct: format!("assignment to unresolved name `{}`", name.as_str()),
                    span: target.span,
                })?;
                self.builder.emit(Instr::StoreLocal { local, src });
            }
            ExprKind::Index { base, index } => {
                let base_reg = self.lower_expr(base)?;
                let index_reg = self.lower_expr(index)?;
                self.builder.emit(Instr::ArrayStore {
                    base: base_reg,
                    index: index_reg,
                    src,
                });
            }
            ExprKind::FieldAccess { base, field, .. } => {
                let offset = self.field_offset(base, *field, target.span)?;
                let base_reg = self.lower_expr(base)?;
                self.builder.emit(Instr::FieldStore {
                    base: base_reg,
                    offset,
                    src,
                });
            }
            ExprKind::Deref(inner) => {
                let base_reg = self.lower_expr(inner)?;
                self.builder.emit(Instr::FieldStore {
                    base: base_reg,
                    offset: 0,
                    src,
                });
            }
            _ => {
                return Err(LowerError::UnsupportedConstruct {
                    construct: "assignment to this expression form".to_string(),
                    span: target.span,
                })
            }
        }
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), LowerError> {
        match &stmt.kind {
            StmtKind::VarDecl { ty, name, init } => {
                let declared_ty = ty.clone().unwrap_or_else(|| {
                    init.as_ref().map(|e| self.infer_type(e)).unwrap_or(Type::Integer)
                });
                if let Some(init) = init {
                    let src = self.lower_expr(init)?;
                    let local = self.declare_local(Some(*name), declared_ty);
                    self.builder.emit(Instr::StoreLocal { local, src });
                } else {
                    self.declare_local(Some(*name), declared_ty);
                }
            }
            StmtKind::Assign { target, value } => {
                let src = self.lower_expr(value)?;
                self.store_into(target, src)?;
            }
            StmtKind::CompoundAssign { op, target, value } => {
                let current = self.lower_expr(target)?;
                let rhs = self.lower_expr(value)?;
                let ty = self.infer_type(target);
                let bin_op = match op {
                    CompoundOp::Add | CompoundOp::Increase => BinaryOp::Add,
                    CompoundOp::Subtract | CompoundOp::Decrease => BinaryOp::Sub,
                    CompoundOp::Multiply => BinaryOp::Mul,
                    CompoundOp::Divide => BinaryOp::Div,
                };
                let dst = self.fresh();
                self.builder.emit(Instr::Arith {
                    op: self.arith_opcode(bin_op, &ty),
                    dst,
                    lhs: current,
                    rhs,
                });
                self.store_into(target, dst)?;
            }
            StmtKind::If {
                cond,
                then_block,
                else_ifs,
                else_block,
            } => {
                let mut end_jumps = Vec::new();
                let cond_reg = self.lower_expr(cond)?;
                let skip = self.builder.emit(Instr::BranchIfFalse {
                    cond: cond_reg,
                    target: 0,
                });
                self.enter_scope();
                self.lower_block(then_block)?;
                self.exit_scope();
                end_jumps.push(self.builder.emit(Instr::Jump { target: 0 }));
                self.builder.patch_target(skip, self.builder.next_index());

                for (cond, body) in else_ifs {
                    let cond_reg = self.lower_expr(cond)?;
                    let skip = self.builder.emit(Instr::BranchIfFalse {
                        cond: cond_reg,
                        target: 0,
                    });
                    self.enter_scope();
                    self.lower_block(body)?;
                    self.exit_scope();
                    end_jumps.push(self.builder.emit(Instr::Jump { target: 0 }));
                    self.builder.patch_target(skip, self.builder.next_index());
                }

                if let Some(body) = else_block {
                    self.enter_scope();
                    self.lower_block(body)?;
                    self.exit_scope();
                }

                let after = self.builder.next_index();
                for jump in end_jumps {
                    self.builder.patch_target(jump, after);
                }
            }
            StmtKind::While { cond, body } => {
                let loop_start = self.builder.next_index();
                let cond_reg = self.lower_expr(cond)?;
                let exit = self.builder.emit(Instr::BranchIfFalse {
                    cond: cond_reg,
                    target: 0,
                });
                self.loops.push(LoopCx {
                    break_jumps: Vec::new(),
                    continue_jumps: Vec::new(),
                });
                self.enter_scope();
                self.lower_block(body)?;
                self.exit_scope();
                self.builder.emit(Instr::Jump { target: loop_start });
                let after = self.builder.next_index();
                self.builder.patch_target(exit, after);
                let cx = self.loops.pop().unwrap();
                for jump in cx.break_jumps {
                    self.builder.patch_target(jump, after);
                }
                for jump in cx.continue_jumps {
                    self.builder.patch_target(jump, loop_start);
                }
            }
            StmtKind::ForRange {
                var,
                start,
                end,
                descending,
                body,
            } => {
                let start_reg = self.lower_expr(start)?;
                let end_reg = self.lower_expr(end)?;
                self.enter_scope();
                let var_local = self.declare_local(Some(*var), Type::Integer);
                self.builder.emit(Instr::StoreLocal {
                    local: var_local,
                    src: start_reg,
                });

                let loop_start = self.builder.next_index();
                let cur = self.fresh();
                self.builder.emit(Instr::LoadLocal {
                    dst: cur,
                    local: var_local,
                });
                let cmp_dst = self.fresh();
                self.builder.emit(Instr::Cmp {
                    op: if *descending { Opcode::GeInt } else { Opcode::LeInt },
                    dst: cmp_dst,
                    lhs: cur,
                    rhs: end_reg,
                });
                let exit = self.builder.emit(Instr::BranchIfFalse {
                    cond: cmp_dst,
                    target: 0,
                });

                self.loops.push(LoopCx {
                    break_jumps: Vec::new(),
                    continue_jumps: Vec::new(),
                });
                self.lower_block(body)?;

                let step_start = self.builder.next_index();
                let cur2 = self.fresh();
                self.builder.emit(Instr::LoadLocal {
                    dst: cur2,
                    local: var_local,
                });
                let one = self.fresh();
                self.builder.emit(Instr::LoadConst {
                    dst: one,
                    value: Const::Int(1),
                });
                let next = self.fresh();
                self.builder.emit(Instr::Arith {
                    op: if *descending { Opcode::SubInt } else { Opcode::AddInt },
                    dst: next,
                    lhs: cur2,
                    rhs: one,
                });
                self.builder.emit(Instr::StoreLocal {
                    local: var_local,
                    src: next,
                });
                self.builder.emit(Instr::Jump { target: loop_start });

                let after = self.builder.next_index();
                self.builder.patch_target(exit, after);
                let cx = self.loops.pop().unwrap();
                for jump in cx.break_jumps {
                    self.builder.patch_target(jump, after);
                }
                for jump in cx.continue_jumps {
                    self.builder.patch_target(jump, step_start);
                }
                self.exit_scope();
            }
            StmtKind::ForEach { var, list, body } => {
                let list_ty = self.infer_type(list);
                let (elem_ty, count) = match list_ty {
                    Type::FixedArray(elem, n) => (*elem, n as i64),
                    _ => {
                        return Err(LowerError::UnsupportedConstruct {
                            construct: "`for each` over a dynamically-sized list".to_string(),
                            span: stmt.span,
                        })
                    }
                };
                let list_reg = self.lower_expr(list)?;
                self.enter_scope();
                let idx_local = self.declare_local(None, Type::Integer);
                let var_local = self.declare_local(Some(*var), elem_ty);

                let zero = self.fresh();
                self.builder.emit(Instr::LoadConst {
                    dst: zero,
                    value: Const::Int(0),
                });
                self.builder.emit(Instr::StoreLocal {
                    local: idx_local,
                    src: zero,
                });

                let loop_start = self.builder.next_index();
                let idx_reg = self.fresh();
                self.builder.emit(Instr::LoadLocal {
                    dst: idx_reg,
                    local: idx_local,
                });
                let count_reg = self.fresh();
                self.builder.emit(Instr::LoadConst {
                    dst: count_reg,
                    value: Const::Int(count),
                });
                let cmp_dst = self.fresh();
                self.builder.emit(Instr::Cmp {
                    op: Opcode::LtInt,
                    dst: cmp_dst,
                    lhs: idx_reg,
                    rhs: count_reg,
                });
                let exit = self.builder.emit(Instr::BranchIfFalse {
                    cond: cmp_dst,
                    target: 0,
                });
                let elem_reg = self.fresh();
                self.builder.emit(Instr::ArrayLoad {
                    dst: elem_reg,
                    base: list_reg,
                    index: idx_reg,
                });
                self.builder.emit(Instr::StoreLocal {
                    local: var_local,
                    src: elem_reg,
                });

                self.loops.push(LoopCx {
                    break_jumps: Vec::new(),
                    continue_jumps: Vec::new(),
                });
                self.lower_block(body)?;

                let step_start = self.builder.next_index();
                let idx_reg2 = self.fresh();
                self.builder.emit(Instr::LoadLocal {
                    dst: idx_reg2,
                    local: idx_local,
                });
                let one = self.fresh();
                self.builder.emit(Instr::LoadConst {
                    dst: one,
                    value: Const::Int(1),
                });
                let next = self.fresh();
                self.builder.emit(Instr::Arith {
                    op: Opcode::AddInt,
                    dst: next,
                    lhs: idx_reg2,
                    rhs: one,
                });
                self.builder.emit(Instr::StoreLocal {
                    local: idx_local,
                    src: next,
                });
                self.builder.emit(Instr::Jump { target: loop_start });

                let after = self.builder.next_index();
                self.builder.patch_target(exit, after);
                let cx = self.loops.pop().unwrap();
                for jump in cx.break_jumps {
                    self.builder.patch_target(jump, after);
                }
                for jump in cx.continue_jumps {
                    self.builder.patch_target(jump, step_start);
                }
                self.exit_scope();
            }
            StmtKind::RepeatTimes { count, body } => {
                let count_reg = self.lower_expr(count)?;
                self.enter_scope();
                let idx_local = self.declare_local(None, Type::Integer);
                let zero = self.fresh();
                self.builder.emit(Instr::LoadConst {
                    dst: zero,
                    value: Const::Int(0),
                });
                self.builder.emit(Instr::StoreLocal {
                    local: idx_local,
                    src: zero,
                });

                let loop_start = self.builder.next_index();
                let idx_reg = self.fresh();
                self.builder.emit(Instr::LoadLocal {
                    dst: idx_reg,
                    local: idx_local,
                });
                let cmp_dst = self.fresh();
                self.builder.emit(Instr::Cmp {
                    op: Opcode::LtInt,
                    dst: cmp_dst,
                    lhs: idx_reg,
                    rhs: count_reg,
                });
                let exit = self.builder.emit(Instr::BranchIfFalse {
                    cond: cmp_dst,
                    target: 0,
                });

                self.loops.push(LoopCx {
                    break_jumps: Vec::new(),
                    continue_jumps: Vec::new(),
                });
                self.lower_block(body)?;

                let step_start = self.builder.next_index();
                let idx_reg2 = self.fresh();
                self.builder.emit(Instr::LoadLocal {
                    dst: idx_reg2,
                    local: idx_local,
                });
                let one = self.fresh();
                self.builder.emit(Instr::LoadConst {
                    dst: one,
                    value: Const::Int(1),
                });
                let next = self.fresh();
                self.builder.emit(Instr::Arith {
                    op: Opcode::AddInt,
                    dst: next,
                    lhs: idx_reg2,
                    rhs: one,
                });
                self.builder.emit(Instr::StoreLocal {
                    local: idx_local,
                    src: next,
                });
                self.builder.emit(Instr::Jump { target: loop_start });

                let after = self.builder.next_index();
                self.builder.patch_target(exit, after);
                let cx = self.loops.pop().unwrap();
                for jump in cx.break_jumps {
                    self.builder.patch_target(jump, after);
                }
                for jump in cx.continue_jumps {
                    self.builder.patch_target(jump, step_start);
                }
                self.exit_scope();
            }
            StmtKind::Break => {
                let jump = self.builder.emit(Instr::Jump { target: 0 });
                self.loops
                    .last_mut()
                    .ok_or(LowerError::UnsupportedConstruct {
                        construct: "`break` outside a loop".to_string(),
                        span: stmt.span,
                    })?
                    .break_jumps
                    .push(jump);
            }
            StmtKind::Continue => {
                let jump = self.builder.emit(Instr::Jump { target: 0 });
                self.loops
                    .last_mut()
                    .ok_or(LowerError::UnsupportedConstruct {
                        construct: "`continue` outside a loop".to_string(),
                        span: stmt.span,
                    })?
                    .continue_jumps
                    .push(jump);
            }
            StmtKind::Return(Some(value)) => {
                let reg = self.lower_expr(value)?;
                self.builder.emit(Instr::Return { value: Some(reg) });
            }
            StmtKind::Return(None) => {
                self.builder.emit(Instr::Return { value: None });
            }
            StmtKind::Call(call) => match &call.kind {
                ExprKind::Call { callee, args } => {
                    self.lower_call(*callee, args, call.span)?;
                }
                _ => {
                    self.lower_expr(call)?;
                }
            },
            StmtKind::ReadNumber { target } => {
                let ty = self.infer_type(target);
                let op = if matches!(ty, Type::Decimal) {
                    Opcode::ReadDecimal
                } else {
                    Opcode::ReadInt
                };
                let dst = self.fresh();
                self.builder.emit(Instr::Read { op, dst });
                self.store_into(target, dst)?;
            }
            StmtKind::ReadText { target } => {
                let dst = self.fresh();
                self.builder.emit(Instr::Read {
                    op: Opcode::ReadText,
                    dst,
                });
                self.store_into(target, dst)?;
            }
            StmtKind::Output { items } => {
                let mut flat = Vec::new();
                flatten_output_items(items, &mut flat);
                for item in flat {
                    let ty = self.infer_type(item);
                    let reg = self.lower_expr(item)?;
                    self.builder.emit(Instr::Print {
                        op: self.print_opcode(&ty),
                        src: reg,
                    });
                }
            }
            StmtKind::AllocateArray { count, elem_ty, name } => {
                let count_reg = self.lower_expr(count)?;
                let dst = self.fresh();
                self.builder.emit(Instr::AllocHeap {
                    dst,
                    count: count_reg,
                    elem_ty: elem_ty.clone(),
                });
                let local = self.declare_local(Some(*name), Type::Pointer(Box::new(elem_ty.clone())));
                self.builder.emit(Instr::StoreLocal { local, src: dst });
            }
            StmtKind::FreeMemory { target } => {
                let reg = self.lower_expr(target)?;
                self.builder.emit(Instr::FreeHeap { src: reg });
            }
            StmtKind::FileOpen { .. } | StmtKind::FileClose { .. } | StmtKind::FileRead { .. } => {
                return Err(LowerError::UnsupportedConstruct {
                    construct: "file I/O (supported only by the C backend)".to_string(),
                    span: stmt.span,
                });
            }
            StmtKind::Graphics { .. } => {
                return Err(LowerError::UnsupportedConstruct {
                    construct: "a graphics call (supported only by the C backend)".to_string(),
                    span: stmt.span,
                });
            }
            StmtKind::RawC(_) => {
                return Err(LowerError::UnsupportedConstruct {
                    construct: "raw C passthrough (supported only by the C backend)".to_string(),
                    span: stmt.span,
                });
            }
        }
        Ok(())
    }

    fn lower_expr(&mut self, expr: &Expr) -> Result<Reg, LowerError> {
        match &expr.kind {
            ExprKind::IntLit(n) => self.load_const(Const::Int(*n)),
            ExprKind::DecimalLit(f) => self.load_const(Const::Decimal(*f)),
            ExprKind::StringLit(s) => self.load_const(Const::Text(*s)),
            ExprKind::CharLit(c) => self.load_const(Const::Char(*c)),
            ExprKind::BoolLit(b) => self.load_const(Const::Bool(*b)),
            ExprKind::NullLit => self.load_const(Const::Null),
            ExprKind::Var(name) => {
                let local = self.lookup_local(*name).ok_or(LowerError::UnsupportedConstruct {
                    construct: format!("reference to unresolved name `{}`", name.as_str()),
                    span: expr.span,
                })?;
                let dst = self.fresh();
                self.builder.emit(Instr::LoadLocal { dst, local });
                Ok(dst)
            }
            ExprKind::Unary { op, expr: inner } => {
                let src = self.lower_expr(inner)?;
                let ty = self.infer_type(inner);
                let decimal = matches!(ty, Type::Decimal);
                let opcode = match op {
                    UnaryOp::Neg => if decimal { Opcode::NegDecimal } else { Opcode::NegInt },
                    UnaryOp::Abs => if decimal { Opcode::AbsDecimal } else { Opcode::AbsInt },
                    UnaryOp::Sqrt => Opcode::Sqrt,
                    UnaryOp::Not => {
                        let dst = self.fresh();
                        self.builder.emit(Instr::Logical {
                            op: Opcode::Not,
                            dst,
                            lhs: src,
                            rhs: None,
                        });
                        return Ok(dst);
                    }
                };
                let dst = self.fresh();
                self.builder.emit(Instr::UnaryArith { op: opcode, dst, src });
                Ok(dst)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs_reg = self.lower_expr(lhs)?;
                let rhs_reg = self.lower_expr(rhs)?;
                let ty = self.infer_type(lhs);
                let dst = self.fresh();
                match op {
                    BinaryOp::And | BinaryOp::Or => {
                        self.builder.emit(Instr::Logical {
                            op: if *op == BinaryOp::And { Opcode::And } else { Opcode::Or },
                            dst,
                            lhs: lhs_reg,
                            rhs: Some(rhs_reg),
                        });
                    }
                    BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                        self.builder.emit(Instr::Cmp {
                            op: self.cmp_opcode(*op, &ty),
                            dst,
                            lhs: lhs_reg,
                            rhs: rhs_reg,
                        });
                    }
                    _ => {
                        self.builder.emit(Instr::Arith {
                            op: self.arith_opcode(*op, &ty),
                            dst,
                            lhs: lhs_reg,
                            rhs: rhs_reg,
                        });
                    }
                }
                Ok(dst)
            }
            ExprKind::Index { base, index } => {
                let base_reg = self.lower_expr(base)?;
                let index_reg = self.lower_expr(index)?;
                let dst = self.fresh();
                self.builder.emit(Instr::ArrayLoad {
                    dst,
                    base: base_reg,
                    index: index_reg,
                });
                Ok(dst)
            }
            ExprKind::FieldAccess { base, field, .. } => {
                let offset = self.field_offset(base, *field, expr.span)?;
                let base_reg = self.lower_expr(base)?;
                let dst = self.fresh();
                self.builder.emit(Instr::FieldLoad {
                    dst,
                    base: base_reg,
                    offset,
                });
                Ok(dst)
            }
            ExprKind::AddressOf(inner) => match &inner.kind {
                ExprKind::Var(name) => {
                    let local = self.lookup_local(*name).ok_or(LowerError::UnsupportedConstruct {
                        construct: format!("address-of unresolved name `{}`", name.as_str()),
                        span: expr.span,
                    })?;
                    let dst = self.fresh();
                    self.builder.emit(Instr::AddrOf { dst, local });
                    Ok(dst)
                }
                _ => Err(LowerError::UnsupportedConstruct {
                    construct: "address-of a non-variable expression".to_string(),
                    span: expr.span,
                }),
            },
            ExprKind::Deref(inner) => {
                let src = self.lower_expr(inner)?;
                let dst = self.fresh();
                self.builder.emit(Instr::FieldLoad { dst, base: src, offset: 0 });
                Ok(dst)
            }
            ExprKind::Call { callee, args } => {
                let sig = self.resolved.functions.get(callee).ok_or(LowerError::UnresolvedCall {
                    name: callee.as_str(),
                    span: expr.span,
                })?;
                let is_void = matches!(sig.ret, None | Some(Type::Void));
                let mut arg_regs = Vec::with_capacity(args.len());
                for arg in args {
                    arg_regs.push(self.lower_expr(arg)?);
                }
                if is_void {
                    self.builder.emit(Instr::Call {
                        dst: None,
                        func: *callee,
                        args: arg_regs,
                    });
                    Err(LowerError::UnsupportedConstruct {
                        construct: format!("use of `{}`'s result, but it returns nothing", callee.as_str()),
                        span: expr.span,
                    })
                } else {
                    let dst = self.fresh();
                    self.builder.emit(Instr::Call {
                        dst: Some(dst),
                        func: *callee,
                        args: arg_regs,
                    });
                    Ok(dst)
                }
            }
            ExprKind::Between { value, low, high } => {
                let v = self.lower_expr(value)?;
                let l = self.lower_expr(low)?;
                let h = self.lower_expr(high)?;
                let ty = self.infer_type(value);
                let ge = self.fresh();
                self.builder.emit(Instr::Cmp {
                    op: self.cmp_opcode(BinaryOp::Ge, &ty),
                    dst: ge,
                    lhs: v,
                    rhs: l,
                });
                let le = self.fresh();
                self.builder.emit(Instr::Cmp {
                    op: self.cmp_opcode(BinaryOp::Le, &ty),
                    dst: le,
                    lhs: v,
                    rhs: h,
                });
                let dst = self.fresh();
                self.builder.emit(Instr::Logical {
                    op: Opcode::And,
                    dst,
                    lhs: ge,
                    rhs: Some(le),
                });
                Ok(dst)
            }
            ExprKind::Length(inner) => match self.infer_type(inner) {
                Type::FixedArray(_, n) => self.load_const(Const::Int(n as i64)),
                _ => Err(LowerError::UnsupportedConstruct {
                    construct: "the length of a dynamically-sized list".to_string(),
                    span: expr.span,
                }),
            },
            ExprKind::Concat(_) => Err(LowerError::UnsupportedConstruct {
                construct: "a concatenation list used as a value".to_string(),
                span: expr.span,
            }),
            ExprKind::RawC(_) => Err(LowerError::UnsupportedConstruct {
                construct: "raw C passthrough (supported only by the C backend)".to_string(),
                span: expr.span,
            }),
        }
    }

    fn load_const(&mut self, value: Const) -> Result<Reg, LowerError> {
        let dst = self.fresh();
        self.builder.emit(Instr::LoadConst { dst, value });
        Ok(dst)
    }
}

fn flatten_output_items<'a>(items: &'a [Expr], out: &mut Vec<&'a Expr>) {
    for item in items {
        if let ExprKind::Concat(inner) = &item.kind {
            flatten_output_items(inner, out);
        } else {
            out.push(item);
        }
    }
}
