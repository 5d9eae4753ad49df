//! AST node definitions (spec.md §3). Every node carries the [`Span`] of
//! its first token; expression and statement nodes are `{ kind, span }`
//! pairs so the span lives in one place instead of being threaded through
//! every variant.

use zincc_util::{Span, Symbol};

use crate::types::Type;

#[derive(Debug, Clone)]
pub struct Program {
    pub includes: Vec<Include>,
    pub structs: Vec<StructDef>,
    pub functions: Vec<FnDef>,
    pub main: Option<MainDef>,
}

#[derive(Debug, Clone)]
pub struct Include {
    /// The include target's phrase, verbatim lowercase (e.g. `"the standard
    /// input and output"`, or the literal filename for `the file called
    /// "X"`). Mapped to a `#include` line by `zincc-lowerc` (spec.md §6).
    pub target: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: Symbol,
    pub fields: Vec<FieldDef>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub ty: Type,
    pub name: Symbol,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FnDef {
    /// The multi-word name, already sanitized to snake_case (spec.md §4.4).
    pub name: Symbol,
    pub params: Vec<Param>,
    pub ret_type: Option<Type>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub ty: Type,
    pub name: Symbol,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MainDef {
    pub body: Block,
    pub span: Span,
}

pub type Block = Vec<Stmt>;

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    VarDecl {
        ty: Option<Type>,
        name: Symbol,
        init: Option<Expr>,
    },
    /// The five synonymous surface forms (`set`/`change`/`now`/`let …
    /// be`/`make … equal to`) all collapse to this one node (spec.md §4.2,
    /// §9 "Synonymous statements").
    Assign {
        target: Expr,
        value: Expr,
    },
    CompoundAssign {
        op: CompoundOp,
        target: Expr,
        value: Expr,
    },
    If {
        cond: Expr,
        then_block: Block,
        else_ifs: Vec<(Expr, Block)>,
        else_block: Option<Block>,
    },
    While {
        cond: Expr,
        body: Block,
    },
    ForRange {
        var: Symbol,
        start: Expr,
        end: Expr,
        descending: bool,
        body: Block,
    },
    /// `for each item in the list` (spec.md §9 Open Question): `list` is
    /// iterated with a loop variable bound only within `body`.
    ForEach {
        var: Symbol,
        list: Expr,
        body: Block,
    },
    RepeatTimes {
        count: Expr,
        body: Block,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    /// A call used as a statement (its result, if any, is discarded).
    Call(Expr),
    ReadNumber {
        target: Expr,
    },
    ReadText {
        target: Expr,
    },
    /// `say`/`print`/`show`/`display`, all synonymous (spec.md §9).
    Output {
        items: Vec<Expr>,
    },
    FileOpen {
        path: Expr,
        mode: FileMode,
        handle: Symbol,
    },
    FileClose {
        handle: Expr,
    },
    FileRead {
        handle: Expr,
        target: Expr,
    },
    AllocateArray {
        count: Expr,
        elem_ty: Type,
        name: Symbol,
    },
    FreeMemory {
        target: Expr,
    },
    Graphics {
        call: Symbol,
        args: Vec<Expr>,
    },
    /// The C fallback: an unrecognized statement captured verbatim
    /// (spec.md §4.2 "C fallback").
    RawC(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Increase,
    Decrease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
    Append,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLit(i64),
    DecimalLit(f64),
    StringLit(Symbol),
    CharLit(char),
    BoolLit(bool),
    NullLit,
    /// A name reference, resolved to variable/function/passthrough by
    /// `zincc-sem` (spec.md §4.3).
    Var(Symbol),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `item number N in X` / `X[N]`.
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    /// `X's field` (possessive) or `X.field` (dot form).
    FieldAccess {
        base: Box<Expr>,
        field: Symbol,
        possessive: bool,
    },
    AddressOf(Box<Expr>),
    Deref(Box<Expr>),
    Call {
        callee: Symbol,
        args: Vec<Expr>,
    },
    /// `X is between A and B`: a ternary-like composite built from a
    /// built-in phrase (spec.md §3).
    Between {
        value: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    /// `the length of X`.
    Length(Box<Expr>),
    /// `A and then B and then C` / `A followed by B`, desugared to an
    /// ordered operand list (spec.md §4.2 "Concatenation lists").
    Concat(Vec<Expr>),
    /// Raw source captured by the C-fallback rule when it occurs in
    /// expression position (e.g. inside a call argument list).
    RawC(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    Sqrt,
    Abs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}
