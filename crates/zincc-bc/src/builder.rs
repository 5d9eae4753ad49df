use zincc_par::types::Type;
use zincc_util::Symbol;

use crate::function::{Function, LocalId, LocalSlot, Reg};
use crate::instr::Instr;

/// Builds one [`Function`] at a time, in the order its body is walked.
pub struct Builder {
    function: Function,
}

impl Builder {
    pub fn new(name: Symbol, param_count: usize, ret: Option<Type>) -> Self {
        Self {
            function: Function {
                name,
                param_count,
                ret,
                locals: Default::default(),
                instructions: Vec::new(),
            },
        }
    }

    pub fn add_local(&mut self, name: Option<Symbol>, ty: Type) -> LocalId {
        self.function.locals.push(LocalSlot { name, ty })
    }

    pub fn emit(&mut self, instr: Instr) -> usize {
        let index = self.function.instructions.len();
        self.function.instructions.push(instr);
        index
    }

    /// The index the next instruction will land at, for computing forward
    /// jump targets before the jump's destination has been emitted.
    pub fn next_index(&self) -> usize {
        self.function.instructions.len()
    }

    /// Rewrites a previously-emitted `Jump`/`BranchIfFalse`'s target. Used
    /// to patch forward branches (e.g. an `if`'s jump-past-the-else-arm)
    /// once the arm's end is known.
    pub fn patch_target(&mut self, instr_index: usize, target: usize) {
        match &mut self.function.instructions[instr_index] {
            Instr::Jump { target: t } => *t = target,
            Instr::BranchIfFalse { target: t, .. } => *t = target,
            other => panic!("patch_target on non-branch instruction {other:?}"),
        }
    }

    pub fn local_ty(&self, id: LocalId) -> &Type {
        &self.function.locals[id].ty
    }

    pub fn build(self) -> Function {
        self.function
    }
}
