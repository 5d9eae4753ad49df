//! Error types for native code generation.

use thiserror::Error;

/// Error type for LLVM code generation (spec.md §4.5's native backend).
#[derive(Debug, Error)]
pub enum CodeGenError {
    /// A jump or branch targets an instruction index with no basic block.
    #[error("branch target instruction {0} has no basic block")]
    BlockNotFound(usize),

    /// An LLVM builder call returned an error.
    #[error("LLVM operation failed: {0}")]
    LlvmOperationFailed(String),

    /// A call instruction names a function never declared in the module.
    #[error("function `{0}` not found")]
    FunctionNotFound(String),

    /// A field-offset instruction addressed a local whose type carries no
    /// struct layout (codegen has no struct table entry to GEP against).
    #[error("type mapping error: {0}")]
    TypeMappingError(String),

    /// A construct `zincc-bc` lowers that the native backend has no LLVM
    /// translation for, in function `function`.
    #[error("`{construct}` has no native codegen (in function `{function}`)")]
    UnsupportedConstruct { construct: String, function: String },

    /// Target machine creation, object emission, or linking failed.
    #[error("compilation error: {0}")]
    CompilationError(String),

    /// Indicates a codegen bug rather than an input error (e.g. a register
    /// read before it was ever written).
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CodeGenError>;
