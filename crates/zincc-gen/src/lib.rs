//! Native code generator: translates `zincc-bc`'s bytecode IR into LLVM IR
//! through `inkwell`, emits an object file, and invokes the system linker
//! (spec.md §4.5's alternate path to the C transpilation backend).

#[cfg(test)]
mod edge_cases;
pub mod error;
pub mod linker;
pub mod llvm;
pub mod types;

pub use error::{CodeGenError, Result};
pub use linker::Linker;
pub use llvm::LlvmBackend;
pub use types::TypeMapper;

use inkwell::targets::{InitializationConfig, Target, TargetMachine};

/// Initializes every LLVM target backend `inkwell`'s `target-all` feature
/// pulled in. Must run once before the first [`LlvmBackend`] is built;
/// `zincc-drv` calls this at process startup.
pub fn init_native_target() {
    Target::initialize_all(&InitializationConfig::default());
}

/// The host triple LLVM would pick with no `--target` override, used as
/// the driver's default when the user doesn't request cross-compilation
/// (spec.md has no cross-compilation flag — this is the only triple the
/// native path ever needs).
pub fn host_target_triple() -> String {
    TargetMachine::get_default_triple()
        .as_str()
        .to_string_lossy()
        .into_owned()
}
