//! The per-function bytecode container: a flat instruction list plus a
//! local slot table (spec.md §4.5).

use zincc_par::types::Type;
use zincc_util::{define_idx, IndexVec, Symbol};

use crate::instr::Instr;

define_idx!(Reg);
define_idx!(LocalId);

/// One entry in a function's local slot table. Parameters occupy the first
/// `param_count` slots, in declaration order; declared variables, loop
/// induction variables, file handles, and `allocate ... and call it p`
/// names are appended as the lowering pass encounters them.
#[derive(Debug, Clone)]
pub struct LocalSlot {
    pub name: Option<Symbol>,
    pub ty: Type,
}

#[derive(Debug)]
pub struct Function {
    pub name: Symbol,
    pub param_count: usize,
    pub ret: Option<Type>,
    pub locals: IndexVec<LocalId, LocalSlot>,
    pub instructions: Vec<Instr>,
}

impl Function {
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }
}

/// A whole program's worth of compiled functions, ready for the native
/// codegen stage. Struct layouts travel alongside unchanged from
/// resolution — the bytecode IR addresses fields by offset (`field_index`),
/// not by name, so codegen consults the same table the resolver built.
#[derive(Debug)]
pub struct Program {
    pub functions: Vec<Function>,
}
