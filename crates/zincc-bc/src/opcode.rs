//! The closed opcode vocabulary (spec.md §4.5: "a flat, typed stack and
//! register IR" with operations split by operand type rather than a single
//! polymorphic `Add`). [`Instr`] in `function.rs` carries an [`Opcode`] as a
//! tag on the handful of instruction shapes (arithmetic, comparison, print,
//! read) that come in one variant per operand type.

use zincc_util::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    // Arithmetic — integer.
    AddInt,
    SubInt,
    MulInt,
    DivInt,
    ModInt,
    PowInt,
    // Arithmetic — decimal.
    AddDecimal,
    SubDecimal,
    MulDecimal,
    DivDecimal,
    ModDecimal,
    PowDecimal,
    // Comparison — integer.
    EqInt,
    NeInt,
    LtInt,
    LeInt,
    GtInt,
    GeInt,
    // Comparison — decimal.
    EqDecimal,
    NeDecimal,
    LtDecimal,
    LeDecimal,
    GtDecimal,
    GeDecimal,
    // Logical.
    And,
    Or,
    Not,
    // Unary arithmetic.
    NegInt,
    NegDecimal,
    Sqrt,
    AbsInt,
    AbsDecimal,
    // Print, by operand type (spec.md §5: `say`/`print`/`show`/`display`).
    PrintInt,
    PrintDecimal,
    PrintText,
    PrintChar,
    PrintBool,
    // Blocking reads from standard input (spec.md §5).
    ReadInt,
    ReadDecimal,
    ReadText,
}

impl Opcode {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Opcode::EqInt
                | Opcode::NeInt
                | Opcode::LtInt
                | Opcode::LeInt
                | Opcode::GtInt
                | Opcode::GeInt
                | Opcode::EqDecimal
                | Opcode::NeDecimal
                | Opcode::LtDecimal
                | Opcode::LeDecimal
                | Opcode::GtDecimal
                | Opcode::GeDecimal
        )
    }
}

/// A compile-time-known constant value, carried inline in a [`Const`]
/// instruction rather than addressed through a constant pool — Zinc
/// programs are small enough that this costs nothing (spec.md §4.5).
#[derive(Debug, Clone, PartialEq)]
pub enum Const {
    Int(i64),
    Decimal(f64),
    Bool(bool),
    Char(char),
    /// An interned string literal, emitted by the native backend as a
    /// `@.str.N` global (spec.md §4.5 "string pool of deduplicated literal
    /// text").
    Text(Symbol),
    /// The `nothing` literal, for a pointer-typed or struct-typed slot.
    Null,
}
