//! Textual dump of the bytecode IR for `-d`/`--disassemble` (spec.md §6
//! names the flag; SPEC_FULL.md §2 fixes the format spec.md leaves open).
//! One instruction per line: `<index>  <mnemonic> <operands>`, grouped
//! under a `fn <name>:` / `locals:` header per function.

use std::fmt::Write;

use crate::function::{Function, Program};
use crate::instr::Instr;
use crate::opcode::{Const, Opcode};

pub fn disassemble(program: &Program) -> String {
    let mut out = String::new();
    for function in &program.functions {
        disassemble_function(function, &mut out);
        out.push('\n');
    }
    out
}

fn disassemble_function(function: &Function, out: &mut String) {
    let _ = writeln!(out, "fn {}:", function.name.as_str());
    if !function.locals.is_empty() {
        let _ = writeln!(out, "  locals:");
        for (id, slot) in function.locals.iter_enumerated() {
            let name = slot.name.map(|s| s.as_str()).unwrap_or_else(|| "_".to_string());
            let _ = writeln!(out, "    %{:<4} {}: {:?}", id.0, name, slot.ty);
        }
    }
    let _ = writeln!(out, "  code:");
    for (index, instr) in function.instructions.iter().enumerate() {
        let _ = writeln!(out, "    {:>4}  {}", index, render_instr(instr));
    }
}

fn render_instr(instr: &Instr) -> String {
    match instr {
        Instr::LoadConst { dst, value } => format!("load_const  r{} <- {}", dst.0, render_const(value)),
        Instr::LoadLocal { dst, local } => format!("load_local  r{} <- %{}", dst.0, local.0),
        Instr::StoreLocal { local, src } => format!("store_local %{} <- r{}", local.0, src.0),
        Instr::LoadGlobal { dst, name } => format!("load_global r{} <- {}", dst.0, name.as_str()),
        Instr::StoreGlobal { name, src } => format!("store_global {} <- r{}", name.as_str(), src.0),
        Instr::Arith { op, dst, lhs, rhs } => {
            format!("{:<10}  r{} <- r{}, r{}", mnemonic(*op), dst.0, lhs.0, rhs.0)
        }
        Instr::UnaryArith { op, dst, src } => {
            format!("{:<10}  r{} <- r{}", mnemonic(*op), dst.0, src.0)
        }
        Instr::Cmp { op, dst, lhs, rhs } => {
            format!("{:<10}  r{} <- r{}, r{}", mnemonic(*op), dst.0, lhs.0, rhs.0)
        }
        Instr::Logical { op, dst, lhs, rhs } => match rhs {
            Some(rhs) => format!("{:<10}  r{} <- r{}, r{}", mnemonic(*op), dst.0, lhs.0, rhs.0),
            None => format!("{:<10}  r{} <- r{}", mnemonic(*op), dst.0, lhs.0),
        },
        Instr::ArrayLoad { dst, base, index } => {
            format!("array_load  r{} <- r{}[r{}]", dst.0, base.0, index.0)
        }
        Instr::ArrayStore { base, index, src } => {
            format!("array_store r{}[r{}] <- r{}", base.0, index.0, src.0)
        }
        Instr::FieldLoad { dst, base, offset } => {
            format!("field_load  r{} <- r{}+{}", dst.0, base.0, offset)
        }
        Instr::FieldStore { base, offset, src } => {
            format!("field_store r{}+{} <- r{}", base.0, offset, src.0)
        }
        Instr::AddrOf { dst, local } => format!("addr_of     r{} <- %{}", dst.0, local.0),
        Instr::Deref { dst, src } => format!("deref       r{} <- *r{}", dst.0, src.0),
        Instr::Call { dst, func, args } => {
            let args = args.iter().map(|r| format!("r{}", r.0)).collect::<Vec<_>>().join(", ");
            match dst {
                Some(dst) => format!("call        r{} <- {}({})", dst.0, func.as_str(), args),
                None => format!("call        {}({})", func.as_str(), args),
            }
        }
        Instr::Return { value } => match value {
            Some(r) => format!("return      r{}", r.0),
            None => "return".to_string(),
        },
        Instr::Jump { target } => format!("jump        {}", target),
        Instr::BranchIfFalse { cond, target } => format!("br_false    r{}, {}", cond.0, target),
        Instr::AllocHeap { dst, count, elem_ty } => {
            format!("alloc_heap  r{} <- r{} x {:?}", dst.0, count.0, elem_ty)
        }
        Instr::FreeHeap { src } => format!("free_heap   r{}", src.0),
        Instr::Print { op, src } => format!("{:<10}  r{}", mnemonic(*op), src.0),
        Instr::Read { op, dst } => format!("{:<10}  r{}", mnemonic(*op), dst.0),
    }
}

fn render_const(value: &Const) -> String {
    match value {
        Const::Int(v) => format!("int {v}"),
        Const::Decimal(v) => format!("decimal {v}"),
        Const::Bool(v) => format!("bool {v}"),
        Const::Char(v) => format!("char {v:?}"),
        Const::Text(s) => format!("text {:?}", s.as_str()),
        Const::Null => "null".to_string(),
    }
}

fn mnemonic(op: Opcode) -> &'static str {
    match op {
        Opcode::AddInt => "add_int",
        Opcode::SubInt => "sub_int",
        Opcode::MulInt => "mul_int",
        Opcode::DivInt => "div_int",
        Opcode::ModInt => "mod_int",
        Opcode::PowInt => "pow_int",
        Opcode::AddDecimal => "add_dec",
        Opcode::SubDecimal => "sub_dec",
        Opcode::MulDecimal => "mul_dec",
        Opcode::DivDecimal => "div_dec",
        Opcode::ModDecimal => "mod_dec",
        Opcode::PowDecimal => "pow_dec",
        Opcode::EqInt => "eq_int",
        Opcode::NeInt => "ne_int",
        Opcode::LtInt => "lt_int",
        Opcode::LeInt => "le_int",
        Opcode::GtInt => "gt_int",
        Opcode::GeInt => "ge_int",
        Opcode::EqDecimal => "eq_dec",
        Opcode::NeDecimal => "ne_dec",
        Opcode::LtDecimal => "lt_dec",
        Opcode::LeDecimal => "le_dec",
        Opcode::GtDecimal => "gt_dec",
        Opcode::GeDecimal => "ge_dec",
        Opcode::And => "and",
        Opcode::Or => "or",
        Opcode::Not => "not",
        Opcode::NegInt => "neg_int",
        Opcode::NegDecimal => "neg_dec",
        Opcode::Sqrt => "sqrt",
        Opcode::AbsInt => "abs_int",
        Opcode::AbsDecimal => "abs_dec",
        Opcode::PrintInt => "print_int",
        Opcode::PrintDecimal => "print_dec",
        Opcode::PrintText => "print_text",
        Opcode::PrintChar => "print_char",
        Opcode::PrintBool => "print_bool",
        Opcode::ReadInt => "read_int",
        Opcode::ReadDecimal => "read_dec",
        Opcode::ReadText => "read_text",
    }
}
