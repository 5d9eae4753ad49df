//! The bytecode path's one optimization pass: straight-line constant
//! folding (SPEC_FULL.md §2, honoring `-O` without inventing a pass
//! pipeline spec.md never asked for).
//!
//! Registers are assigned exactly once by [`crate::lower`] (every operand
//! comes from a fresh `Builder::fresh()` call), so a single forward scan
//! that remembers which registers hold a known [`Const`] is enough — no
//! reassignment ever invalidates an earlier entry. Folded instructions are
//! rewritten in place rather than deleted: deleting would shift the
//! instruction indices that `Jump`/`BranchIfFalse` target, and nothing
//! downstream needs the dead `LoadConst`s gone to be correct.

use std::collections::HashMap;

use crate::function::{Function, Program, Reg};
use crate::instr::Instr;
use crate::opcode::{Const, Opcode};

/// Folds constant arithmetic, comparisons, and unary ops across every
/// function in `program`. Called when the driver's `-O` level is 1 or
/// higher; `-O 0` leaves the IR untouched (SPEC_FULL.md §2).
pub fn fold_constants(program: &mut Program) {
    for function in &mut program.functions {
        fold_function(function);
    }
}

fn fold_function(function: &mut Function) {
    let mut known: HashMap<Reg, Const> = HashMap::new();

    for instr in &mut function.instructions {
        match instr {
            Instr::LoadConst { dst, value } => {
                known.insert(*dst, value.clone());
            }
            Instr::Arith { op, dst, lhs, rhs } => {
                if let (Some(l), Some(r)) = (known.get(lhs), known.get(rhs)) {
                    if let Some(folded) = fold_arith(*op, l, r) {
                        known.insert(*dst, folded.clone());
                        *instr = Instr::LoadConst { dst: *dst, value: folded };
                    }
                }
            }
            Instr::Cmp { op, dst, lhs, rhs } => {
                if let (Some(l), Some(r)) = (known.get(lhs), known.get(rhs)) {
                    if let Some(folded) = fold_cmp(*op, l, r) {
                        known.insert(*dst, folded.clone());
                        *instr = Instr::LoadConst { dst: *dst, value: folded };
                    }
                }
            }
            Instr::UnaryArith { op, dst, src } => {
                if let Some(v) = known.get(src) {
                    if let Some(folded) = fold_unary(*op, v) {
                        known.insert(*dst, folded.clone());
                        *instr = Instr::LoadConst { dst: *dst, value: folded };
                    }
                }
            }
            _ => {}
        }
    }
}

fn fold_arith(op: Opcode, lhs: &Const, rhs: &Const) -> Option<Const> {
    match (lhs, rhs) {
        (Const::Int(a), Const::Int(b)) => {
            let (a, b) = (*a, *b);
            let v = match op {
                Opcode::AddInt => a.checked_add(b)?,
                Opcode::SubInt => a.checked_sub(b)?,
                Opcode::MulInt => a.checked_mul(b)?,
                Opcode::DivInt if b != 0 => a.checked_div(b)?,
                Opcode::ModInt if b != 0 => a.checked_rem(b)?,
                Opcode::PowInt if b >= 0 => a.checked_pow(b as u32)?,
                _ => return None,
            };
            Some(Const::Int(v))
        }
        (Const::Decimal(a), Const::Decimal(b)) => {
            let (a, b) = (*a, *b);
            let v = match op {
                Opcode::AddDecimal => a + b,
                Opcode::SubDecimal => a - b,
                Opcode::MulDecimal => a * b,
                Opcode::DivDecimal if b != 0.0 => a / b,
                Opcode::ModDecimal if b != 0.0 => a % b,
                Opcode::PowDecimal => a.powf(b),
                _ => return None,
            };
            Some(Const::Decimal(v))
        }
        _ => None,
    }
}

fn fold_cmp(op: Opcode, lhs: &Const, rhs: &Const) -> Option<Const> {
    let result = match (lhs, rhs) {
        (Const::Int(a), Const::Int(b)) => match op {
            Opcode::EqInt => a == b,
            Opcode::NeInt => a != b,
            Opcode::LtInt => a < b,
            Opcode::LeInt => a <= b,
            Opcode::GtInt => a > b,
            Opcode::GeInt => a >= b,
            _ => return None,
        },
        (Const::Decimal(a), Const::Decimal(b)) => match op {
            Opcode::EqDecimal => a == b,
            Opcode::NeDecimal => a != b,
            Opcode::LtDecimal => a < b,
            Opcode::LeDecimal => a <= b,
            Opcode::GtDecimal => a > b,
            Opcode::GeDecimal => a >= b,
            _ => return None,
        },
        _ => return None,
    };
    Some(Const::Int(result as i64))
}

fn fold_unary(op: Opcode, v: &Const) -> Option<Const> {
    match (op, v) {
        (Opcode::NegInt, Const::Int(a)) => Some(Const::Int(-a)),
        (Opcode::NegDecimal, Const::Decimal(a)) => Some(Const::Decimal(-a)),
        (Opcode::AbsInt, Const::Int(a)) => Some(Const::Int(a.abs())),
        (Opcode::AbsDecimal, Const::Decimal(a)) => Some(Const::Decimal(a.abs())),
        (Opcode::Sqrt, Const::Decimal(a)) if *a >= 0.0 => Some(Const::Decimal(a.sqrt())),
        (Opcode::Not, Const::Bool(a)) => Some(Const::Bool(!a)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::LocalSlot;
    use zincc_util::{IndexVec, Symbol};

    fn function_with(instrs: Vec<Instr>) -> Function {
        Function {
            name: Symbol::intern("f"),
            param_count: 0,
            ret: None,
            locals: IndexVec::<crate::function::LocalId, LocalSlot>::new(),
            instructions: instrs,
        }
    }

    #[test]
    fn folds_straight_line_arithmetic() {
        let mut program = Program {
            functions: vec![function_with(vec![
                Instr::LoadConst { dst: Reg(0), value: Const::Int(3) },
                Instr::LoadConst { dst: Reg(1), value: Const::Int(4) },
                Instr::Arith { op: Opcode::MulInt, dst: Reg(2), lhs: Reg(1), rhs: Reg(0) },
                Instr::LoadConst { dst: Reg(3), value: Const::Int(2) },
                Instr::Arith { op: Opcode::AddInt, dst: Reg(4), lhs: Reg(3), rhs: Reg(2) },
            ])],
        };
        fold_constants(&mut program);
        match &program.functions[0].instructions[4] {
            Instr::LoadConst { value: Const::Int(14), .. } => {}
            other => panic!("expected folded constant 14, got {other:?}"),
        }
    }

    #[test]
    fn leaves_jump_targets_untouched_by_keeping_instruction_count() {
        let before = function_with(vec![
            Instr::LoadConst { dst: Reg(0), value: Const::Int(1) },
            Instr::LoadConst { dst: Reg(1), value: Const::Int(1) },
            Instr::Cmp { op: Opcode::EqInt, dst: Reg(2), lhs: Reg(0), rhs: Reg(1) },
            Instr::BranchIfFalse { cond: Reg(2), target: 5 },
        ]);
        let before_len = before.instructions.len();
        let mut program = Program { functions: vec![before] };
        fold_constants(&mut program);
        assert_eq!(program.functions[0].instructions.len(), before_len);
        match &program.functions[0].instructions[3] {
            Instr::BranchIfFalse { target: 5, .. } => {}
            other => panic!("branch target shifted: {other:?}"),
        }
    }

    #[test]
    fn division_by_zero_is_not_folded() {
        let mut program = Program {
            functions: vec![function_with(vec![
                Instr::LoadConst { dst: Reg(0), value: Const::Int(5) },
                Instr::LoadConst { dst: Reg(1), value: Const::Int(0) },
                Instr::Arith { op: Opcode::DivInt, dst: Reg(2), lhs: Reg(0), rhs: Reg(1) },
            ])],
        };
        fold_constants(&mut program);
        assert!(matches!(
            program.functions[0].instructions[2],
            Instr::Arith { .. }
        ));
    }
}
