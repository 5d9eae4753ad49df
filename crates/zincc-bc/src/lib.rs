//! Bytecode IR and the resolved-AST-to-bytecode lowering pass (spec.md
//! §4.5, the alternate native-codegen path). A [`zincc_sem::ResolvedProgram`]
//! lowers to a [`function::Program`] of flat per-function instruction
//! streams; `zincc-gen` consumes that IR one function at a time.
//!
//! Not every surface construct has a bytecode equivalent — file I/O,
//! graphics calls, and raw-C passthrough only make sense against a C
//! runtime, so `lower` rejects them with [`LowerError::UnsupportedConstruct`]
//! rather than miscompiling them. Programs using those constructs must go
//! through `zincc-lowerc`'s C path instead.

pub mod builder;
pub mod disasm;
#[cfg(test)]
mod edge_cases;
pub mod function;
pub mod instr;
mod lower;
pub mod opcode;
pub mod optimize;

pub use builder::Builder;
pub use disasm::disassemble;
pub use function::{Function, LocalId, LocalSlot, Program, Reg};
pub use instr::Instr;
pub use lower::lower_program;
pub use opcode::{Const, Opcode};
pub use optimize::fold_constants;

use thiserror::Error;
use zincc_util::Span;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LowerError {
    #[error("`{construct}` has no bytecode lowering, at {}:{}", .span.line, .span.column)]
    UnsupportedConstruct { construct: String, span: Span },
    #[error("call to unresolved function `{name}`, at {}:{}", .span.line, .span.column)]
    UnresolvedCall { name: String, span: Span },
}
