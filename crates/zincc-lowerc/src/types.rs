//! Maps Zinc's closed type system (spec.md §3) onto C type syntax.

use zincc_par::types::Type;

/// The bare C type name for `ty`, usable standalone in a cast or `sizeof`.
/// Not valid for a fixed-array declaration — use [`c_decl`] for that, since
/// C spells an array's size after the variable name rather than the type.
pub fn c_type_name(ty: &Type) -> String {
    match ty {
        Type::Integer => "int".to_string(),
        Type::Decimal => "double".to_string(),
        Type::Character => "char".to_string(),
        // Zinc's `string` is a pointer-to-character (spec.md §3).
        Type::Text => "char *".to_string(),
        // Booleans are represented as integers (spec.md §3).
        Type::Boolean => "int".to_string(),
        Type::Void => "void".to_string(),
        Type::Pointer(inner) => format!("{}*", c_type_name(inner)),
        Type::OpenArray(inner) => format!("{}*", c_type_name(inner)),
        Type::FixedArray(inner, _) => format!("{}*", c_type_name(inner)),
        Type::Struct(name) => format!("struct {}", name.as_str()),
    }
}

/// Renders a declaration of `name: ty` the way C spells it — fixed arrays
/// need their bound after the identifier (`int xs[10]`), everything else
/// is `<type> <name>`.
pub fn c_decl(ty: &Type, name: &str) -> String {
    match ty {
        Type::FixedArray(inner, n) => format!("{} {}[{}]", c_type_name(inner), name, n),
        other => format!("{} {}", c_type_name(other), name),
    }
}
