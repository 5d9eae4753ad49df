//! C-lowering backend (spec.md §4.4): serializes a [`ResolvedProgram`]
//! into a single C translation unit string. The translation unit is, in
//! order: the fixed prelude, Zinc `include` directives mapped to
//! `#include` lines, struct declarations in source order, forward
//! declarations of every Zinc-defined function, the function definitions
//! themselves, and finally `main`, derived from `to do the main thing`.

mod env;
mod expr;
mod includes;
mod prelude;
mod stmt;
pub mod types;

use thiserror::Error;
use zincc_par::ast::*;
use zincc_sem::ResolvedProgram;
use zincc_util::Span;

use env::Env;
use stmt::Writer;
use types::c_decl;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LowerError {
    #[error("`{construct}` has no C lowering, at {}:{}", .span.line, .span.column)]
    UnsupportedConstruct { construct: String, span: Span },
}

/// Lowers `resolved` to a complete C translation unit.
pub fn lower_program(resolved: &ResolvedProgram) -> Result<String, LowerError> {
    let program = &resolved.program;
    let mut out = String::new();

    out.push_str(prelude::PRELUDE);
    out.push('\n');

    for include in &program.includes {
        out.push_str(&includes::map_include(&include.target));
        out.push('\n');
    }
    if !program.includes.is_empty() {
        out.push('\n');
    }

    for def in &program.structs {
        out.push_str(&emit_struct(def));
        out.push('\n');
    }

    for def in &program.functions {
        out.push_str(&fn_signature(def));
        out.push_str(";\n");
    }
    if !program.functions.is_empty() {
        out.push('\n');
    }

    for def in &program.functions {
        out.push_str(&emit_function(def, resolved)?);
        out.push('\n');
    }

    if let Some(main) = &program.main {
        out.push_str(&emit_main(main, resolved)?);
        out.push('\n');
    }

    Ok(out)
}

fn emit_struct(def: &StructDef) -> String {
    let mut s = format!("struct {} {{\n", def.name.as_str());
    for field in &def.fields {
        s.push_str("    ");
        s.push_str(&c_decl(&field.ty, &field.name.as_str()));
        s.push_str(";\n");
    }
    s.push_str("};\n");
    s
}

fn fn_signature(def: &FnDef) -> String {
    let ret = def
        .ret_type
        .clone()
        .map(|t| types::c_type_name(&t))
        .unwrap_or_else(|| "void".to_string());
    let params = if def.params.is_empty() {
        "void".to_string()
    } else {
        def.params
            .iter()
            .map(|p| c_decl(&p.ty, &p.name.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("{ret} {}({params})", def.name.as_str())
}

fn emit_function(def: &FnDef, resolved: &ResolvedProgram) -> Result<String, LowerError> {
    let mut env = Env::new(resolved);
    for param in &def.params {
        env.declare(param.name, param.ty.clone());
    }
    let mut w = Writer::new();
    stmt::emit_block(&mut w, &def.body, &mut env)?;
    Ok(format!("{} {{\n{}}}\n", fn_signature(def), w.finish()))
}

fn emit_main(main: &MainDef, resolved: &ResolvedProgram) -> Result<String, LowerError> {
    let mut env = Env::new(resolved);
    let mut w = Writer::new();
    stmt::emit_block(&mut w, &main.body, &mut env)?;
    Ok(format!("int main(void) {{\n{}    return 0;\n}}\n", w.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zincc_util::FileId;

    fn lower(source: &str) -> String {
        let program = zincc_par::Parser::parse(source, FileId::DUMMY).unwrap();
        let resolved = zincc_sem::resolve(program).unwrap();
        lower_program(&resolved).unwrap()
    }

    #[test]
    fn hello_world_prints_and_returns_zero() {
        let c = lower("to do the main thing:\nsay \"Hello, World!\"\nend");
        assert!(c.contains("int main(void)"));
        assert!(c.contains("printf(\"%s\\n\", \"Hello, World!\");"));
        assert!(c.contains("return 0;"));
    }

    #[test]
    fn arithmetic_precedence_matches_spec_example_2() {
        let c = lower(
            "to do the main thing:\nthere is a number called x which is 2 plus 3 times 4\nsay x\nend",
        );
        assert!(c.contains("int x = ((2) + ((3) * (4)));"));
    }

    #[test]
    fn ascending_for_range_uses_le_and_increment() {
        let c = lower("to do the main thing:\nfor each number i from 1 to 5:\nsay i\nend\nend");
        assert!(c.contains("for (int i = 1; i <= 5; i++) {"));
    }

    #[test]
    fn descending_for_range_uses_ge_and_decrement() {
        let c =
            lower("to do the main thing:\nfor each number i from 5 down to 1:\nsay i\nend\nend");
        assert!(c.contains("for (int i = 5; i >= 1; i--) {"));
    }

    #[test]
    fn possessive_field_assign_on_struct_value_uses_dot() {
        let c = lower(
            "define a Person as having:\na number called age\nend\nto do the main thing:\nthere is a Person called bob\nset bob's age to 30\nend",
        );
        assert!(c.contains("(bob).age = 30;"));
        assert!(!c.contains("(bob)->age"));
    }

    #[test]
    fn raw_c_passthrough_is_emitted_verbatim() {
        let c = lower("to do the main thing:\nprintf(\"raw %d\\n\", 42);\nend");
        assert!(c.contains("printf(\"raw %d\\n\", 42);"));
    }

    #[test]
    fn modulo_even_odd_example_compiles_to_ternary_if() {
        let c = lower(
            "to do the main thing:\nif 7 modulo 2 equals 0 then say \"even\" otherwise say \"odd\" end\nend",
        );
        assert!(c.contains("if ((((7) % (2))) == (0)) {"));
        assert!(c.contains("} else {"));
    }

    #[test]
    fn repeat_times_uses_a_unique_counter() {
        let c = lower("to do the main thing:\nrepeat 3 times:\nsay 1\nend\nend");
        assert!(c.contains("for (int _zn_rep0 = 0; _zn_rep0 < (3); _zn_rep0++) {"));
    }

    #[test]
    fn include_directive_maps_to_stdio() {
        let c = lower("include the standard input and output\nto do the main thing:\nend");
        assert!(c.contains("#include <stdio.h>\n#include <stdio.h>") == false);
        assert!(c.contains("#include <stdio.h>"));
    }

    #[test]
    fn graphics_call_emits_a_plain_c_function_call() {
        let c = lower(
            "include the graphics library\nto do the main thing:\nthere is a number called r which is 50\ncall the graphics function \"DrawCircle\" with 100 and 100 and r\nend",
        );
        assert!(c.contains("#include \"raylib.h\""));
        assert!(c.contains("DrawCircle(100, 100, r);"));
    }

    #[test]
    fn forward_declarations_precede_definitions() {
        let c = lower(
            "to square it with a number called x and return a number:\nreturn x times x\nend\nto do the main thing:\nend",
        );
        let decl_pos = c.find("int square_it(int x);").unwrap();
        let def_pos = c.find("int square_it(int x) {").unwrap();
        assert!(decl_pos < def_pos);
    }
}
