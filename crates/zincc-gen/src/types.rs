//! Maps [`zincc_par::types::Type`] onto LLVM IR types. Pointers are always
//! opaque (`ptr`, LLVM 15+'s default) so `Pointer`, `OpenArray`, and array
//! decay all collapse to the same representation; struct types are built
//! lazily and cached by name so repeated field accesses on the same struct
//! reuse one `StructType`.

use std::collections::HashMap;

use inkwell::context::Context;
use inkwell::types::{BasicType, BasicTypeEnum, StructType};
use inkwell::AddressSpace;

use zincc_par::types::Type;
use zincc_sem::StructLayout;
use zincc_util::Symbol;

pub struct TypeMapper<'ctx> {
    context: &'ctx Context,
    structs: HashMap<Symbol, StructLayout>,
    struct_types: HashMap<Symbol, StructType<'ctx>>,
}

impl<'ctx> TypeMapper<'ctx> {
    pub fn new(context: &'ctx Context, structs: HashMap<Symbol, StructLayout>) -> Self {
        Self {
            context,
            structs,
            struct_types: HashMap::new(),
        }
    }

    /// The LLVM type a Zinc value of type `ty` is stored as (in an alloca,
    /// a call argument, or a return value).
    pub fn map(&mut self, ty: &Type) -> BasicTypeEnum<'ctx> {
        match ty {
            Type::Integer | Type::Boolean => self.context.i32_type().into(),
            Type::Decimal => self.context.f64_type().into(),
            Type::Character => self.context.i8_type().into(),
            Type::Text => self.context.ptr_type(AddressSpace::default()).into(),
            Type::Pointer(_) | Type::OpenArray(_) => {
                self.context.ptr_type(AddressSpace::default()).into()
            }
            Type::FixedArray(elem, n) => {
                let elem_ty = self.map(elem);
                elem_ty.array_type(*n as u32).into()
            }
            Type::Struct(name) => self.struct_type(*name).into(),
            Type::Void => self.context.i32_type().into(),
        }
    }

    /// The cached named `StructType` for `name`, built on first request
    /// from the resolved field layout (spec.md §4.3's struct table).
    pub fn struct_type(&mut self, name: Symbol) -> StructType<'ctx> {
        if let Some(ty) = self.struct_types.get(&name) {
            return *ty;
        }
        let name_str = name.as_str();
        let opaque = self.context.opaque_struct_type(&name_str);
        self.struct_types.insert(name, opaque);
        if let Some(layout) = self.structs.get(&name).cloned() {
            let field_types: Vec<BasicTypeEnum<'ctx>> = layout
                .fields
                .iter()
                .map(|(_, field_ty)| self.map(field_ty))
                .collect();
            opaque.set_body(&field_types, false);
        }
        opaque
    }

    pub fn struct_layout(&self, name: Symbol) -> Option<&StructLayout> {
        self.structs.get(&name)
    }
}
