//! Resolver (spec.md §4.3): walks the parsed AST to build the global
//! function/struct tables and tag every name-bearing node with its
//! resolution kind (variable, function, struct field, or passthrough).
//!
//! The AST nodes produced by `zincc-par` carry no mutable annotation slot,
//! so rather than rewrite the tree in place, resolution produces a side
//! table keyed by each node's [`Span`] (every node's span is unique to its
//! first token — spec.md's own node-position invariant) alongside the
//! original, untouched `Program`. `zincc-lowerc` and `zincc-bc` both
//! consume a [`ResolvedProgram`] rather than a bare AST.

#[cfg(test)]
mod edge_cases;
pub mod scope;
mod walk;

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use zincc_lex::KeywordTrie;
use zincc_par::types::Type;
use zincc_par::Program;
use zincc_util::{DefId, DefIdGenerator, Span, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Local,
    Param,
    Function,
    StructField,
    /// Not a local, parameter, or known function — flows through to the
    /// C fallback untouched (spec.md §4.3, §7: "does not error on unknown
    /// identifiers").
    Passthrough,
}

#[derive(Debug, Clone)]
pub struct FuncSig {
    pub def_id: DefId,
    pub params: Vec<Type>,
    pub ret: Option<Type>,
}

#[derive(Debug, Clone)]
pub struct StructLayout {
    pub def_id: DefId,
    pub fields: Vec<(Symbol, Type)>,
}

impl StructLayout {
    pub fn field_index(&self, name: Symbol) -> Option<usize> {
        self.fields.iter().position(|(n, _)| *n == name)
    }

    pub fn field_type(&self, name: Symbol) -> Option<&Type> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, t)| t)
    }
}

/// The parsed program plus everything resolution learned about it.
pub struct ResolvedProgram {
    pub program: Program,
    pub functions: HashMap<Symbol, FuncSig>,
    pub structs: HashMap<Symbol, StructLayout>,
    name_kinds: HashMap<Span, NameKind>,
}

impl ResolvedProgram {
    /// The resolution kind recorded for the name-bearing node at `span`.
    /// A span resolution never visited defaults to `Passthrough`.
    pub fn kind_at(&self, span: Span) -> NameKind {
        self.name_kinds.get(&span).copied().unwrap_or(NameKind::Passthrough)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    #[error("duplicate function `{name}` at {}:{} (first defined at {}:{})", .second.line, .second.column, .first.line, .first.column)]
    DuplicateFunction {
        name: String,
        first: Span,
        second: Span,
    },
    #[error("duplicate struct `{name}` at {}:{} (first defined at {}:{})", .second.line, .second.column, .first.line, .first.column)]
    DuplicateStruct {
        name: String,
        first: Span,
        second: Span,
    },
    #[error("duplicate field `{field}` in struct `{struct_name}` at {}:{}", .span.line, .span.column)]
    DuplicateField {
        struct_name: String,
        field: String,
        span: Span,
    },
    #[error("`{word}` is a reserved word and cannot be used as an identifier, at {}:{}", .span.line, .span.column)]
    ReservedWord { word: String, span: Span },
}

/// Resolves `program`, returning the annotated result or every error found
/// (resolution does not stop at the first — the driver renders them all
/// before exiting, spec.md §7).
pub fn resolve(program: Program) -> Result<ResolvedProgram, Vec<ResolveError>> {
    let mut errors = Vec::new();
    let gen = DefIdGenerator::new();

    let structs = build_struct_table(&program, &gen, &mut errors);
    let functions = build_function_table(&program, &gen, &mut errors);
    check_reserved_words(&program, &mut errors);

    let mut name_kinds = HashMap::new();
    for func in &program.functions {
        walk::resolve_function(func, &functions, &mut name_kinds);
    }
    if let Some(main) = &program.main {
        walk::resolve_main(main, &functions, &mut name_kinds);
    }

    if errors.is_empty() {
        Ok(ResolvedProgram {
            program,
            functions,
            structs,
            name_kinds,
        })
    } else {
        Err(errors)
    }
}

fn build_struct_table(
    program: &Program,
    gen: &DefIdGenerator,
    errors: &mut Vec<ResolveError>,
) -> HashMap<Symbol, StructLayout> {
    let mut structs: HashMap<Symbol, StructLayout> = HashMap::new();
    let mut first_span: HashMap<Symbol, Span> = HashMap::new();

    for def in &program.structs {
        if let Some(&first) = first_span.get(&def.name) {
            errors.push(ResolveError::DuplicateStruct {
                name: def.name.as_str(),
                first,
                second: def.span,
            });
            continue;
        }
        first_span.insert(def.name, def.span);

        let mut fields = Vec::new();
        let mut seen = HashSet::new();
        for field in &def.fields {
            if !seen.insert(field.name) {
                errors.push(ResolveError::DuplicateField {
                    struct_name: def.name.as_str(),
                    field: field.name.as_str(),
                    span: field.span,
                });
                continue;
            }
            fields.push((field.name, field.ty.clone()));
        }

        structs.insert(
            def.name,
            StructLayout {
                def_id: gen.next(),
                fields,
            },
        );
    }
    structs
}

fn build_function_table(
    program: &Program,
    gen: &DefIdGenerator,
    errors: &mut Vec<ResolveError>,
) -> HashMap<Symbol, FuncSig> {
    let mut functions: HashMap<Symbol, FuncSig> = HashMap::new();
    let mut first_span: HashMap<Symbol, Span> = HashMap::new();

    for def in &program.functions {
        if let Some(&first) = first_span.get(&def.name) {
            errors.push(ResolveError::DuplicateFunction {
                name: def.name.as_str(),
                first,
                second: def.span,
            });
            continue;
        }
        first_span.insert(def.name, def.span);

        functions.insert(
            def.name,
            FuncSig {
                def_id: gen.next(),
                params: def.params.iter().map(|p| p.ty.clone()).collect(),
                ret: def.ret_type.clone(),
            },
        );
    }
    functions
}

/// Checks declared names (structs, fields, and parameters) against the
/// keyword table. In practice the lexer can never hand the parser an
/// identifier token whose text matches a registered keyword phrase, but
/// the check is cheap and is the resolver's documented responsibility
/// (spec.md §4.3, §7).
fn check_reserved_words(program: &Program, errors: &mut Vec<ResolveError>) {
    let trie = KeywordTrie::new();
    let is_reserved = |word: &str| trie.longest_match(&[word.to_string()]) == 1;

    for def in &program.structs {
        if is_reserved(&def.name.as_str()) {
            errors.push(ResolveError::ReservedWord {
                word: def.name.as_str(),
                span: def.span,
            });
        }
        for field in &def.fields {
            if is_reserved(&field.name.as_str()) {
                errors.push(ResolveError::ReservedWord {
                    word: field.name.as_str(),
                    span: field.span,
                });
            }
        }
    }
    for def in &program.functions {
        for param in &def.params {
            if is_reserved(&param.name.as_str()) {
                errors.push(ResolveError::ReservedWord {
                    word: param.name.as_str(),
                    span: param.span,
                });
            }
        }
    }
}
