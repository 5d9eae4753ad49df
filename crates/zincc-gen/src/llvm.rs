//! Translates one `zincc_bc::Program` into an LLVM `Module` (spec.md
//! §4.5's native backend).
//!
//! The bytecode IR's registers are flat SSA-like values with no type tag of
//! their own, so this backend keeps a parallel `reg_types` map alongside
//! `reg_values`, populated the same way `zincc_bc::Lowerer` populates its
//! own local-type table while walking the AST — just one IR layer later.
//! Aggregates (`FixedArray`, `Struct`) are represented by the pointer to
//! their backing alloca rather than loaded by value; `LoadLocal` on an
//! aggregate-typed slot yields that pointer directly instead of an actual
//! `load`, and `StoreLocal` of one copies bytes with `memcpy` instead of a
//! scalar `store`.

use std::collections::HashMap;
use std::path::Path;

use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::types::{BasicMetadataTypeEnum, BasicType};
use inkwell::values::{BasicMetadataValueEnum, BasicValueEnum, FunctionValue, IntValue, PointerValue};
use inkwell::{AddressSpace, FloatPredicate, IntPredicate, OptimizationLevel};

use zincc_bc::{Const, Function, Instr, Opcode, Program, Reg};
use zincc_par::types::Type;
use zincc_sem::StructLayout;
use zincc_util::{Idx, Symbol};

use crate::error::{CodeGenError, Result};
use crate::types::TypeMapper;

pub struct LlvmBackend<'ctx> {
    context: &'ctx Context,
    module: Module<'ctx>,
    builder: Builder<'ctx>,
    target_triple: String,
    opt_level: OptimizationLevel,
    type_mapper: TypeMapper<'ctx>,
    functions: HashMap<Symbol, FunctionValue<'ctx>>,
    func_rets: HashMap<Symbol, Option<Type>>,
    strings: HashMap<Symbol, PointerValue<'ctx>>,
    format_strings: HashMap<&'static str, PointerValue<'ctx>>,
}

impl<'ctx> LlvmBackend<'ctx> {
    pub fn new(
        context: &'ctx Context,
        module_name: &str,
        target_triple: String,
        opt_level: OptimizationLevel,
        structs: HashMap<Symbol, StructLayout>,
    ) -> Self {
        let module = context.create_module(module_name);

        let triple = inkwell::targets::TargetTriple::create(&target_triple);
        module.set_triple(&triple);
        if let Ok(target) = inkwell::targets::Target::from_triple(&triple) {
            if let Some(target_machine) = target.create_target_machine(
                &triple,
                "generic",
                "",
                opt_level,
                inkwell::targets::RelocMode::Default,
                inkwell::targets::CodeModel::Default,
            ) {
                let data_layout = target_machine.get_target_data().get_data_layout();
                module.set_data_layout(&data_layout);
            }
        }

        let mut backend = Self {
            context,
            module,
            builder: context.create_builder(),
            target_triple,
            opt_level,
            type_mapper: TypeMapper::new(context, structs),
            functions: HashMap::new(),
            func_rets: HashMap::new(),
            strings: HashMap::new(),
            format_strings: HashMap::new(),
        };
        backend.declare_libc();
        backend
    }

    /// Declares the handful of C standard library functions the native
    /// backend calls out to for I/O, heap allocation, and the math
    /// operations LLVM has no instruction for (spec.md §4.5: the native
    /// path still shares libc with the C path rather than bundling its own
    /// runtime).
    fn declare_libc(&mut self) {
        let ptr_ty = self.context.ptr_type(AddressSpace::default());
        let i32_ty = self.context.i32_type();
        let i64_ty = self.context.i64_type();
        let f64_ty = self.context.f64_type();

        self.module.add_function(
            "printf",
            i32_ty.fn_type(&[ptr_ty.into()], true),
            Some(Linkage::External),
        );
        self.module.add_function(
            "scanf",
            i32_ty.fn_type(&[ptr_ty.into()], true),
            Some(Linkage::External),
        );
        self.module.add_function(
            "malloc",
            ptr_ty.fn_type(&[i64_ty.into()], false),
            Some(Linkage::External),
        );
        self.module.add_function(
            "free",
            self.context.void_type().fn_type(&[ptr_ty.into()], false),
            Some(Linkage::External),
        );
        self.module.add_function(
            "sqrt",
            f64_ty.fn_type(&[f64_ty.into()], false),
            Some(Linkage::External),
        );
        self.module.add_function(
            "fabs",
            f64_ty.fn_type(&[f64_ty.into()], false),
            Some(Linkage::External),
        );
        self.module.add_function(
            "pow",
            f64_ty.fn_type(&[f64_ty.into(), f64_ty.into()], false),
            Some(Linkage::External),
        );
    }

    fn libc(&self, name: &str) -> FunctionValue<'ctx> {
        self.module
            .get_function(name)
            .unwrap_or_else(|| panic!("libc function `{name}` was not declared"))
    }

    pub fn compile_program(&mut self, program: &Program) -> Result<()> {
        for func in &program.functions {
            self.declare_function(func);
        }
        for func in &program.functions {
            self.compile_function(func)?;
        }
        Ok(())
    }

    fn declare_function(&mut self, func: &Function) {
        let param_types: Vec<BasicMetadataTypeEnum> = func
            .locals
            .as_slice()
            .iter()
            .take(func.param_count)
            .map(|slot| self.type_mapper.map(&slot.ty).into())
            .collect();
        let fn_type = match &func.ret {
            Some(ty) => self.type_mapper.map(ty).fn_type(&param_types, false),
            None => self.context.void_type().fn_type(&param_types, false),
        };
        let name = func.name.as_str();
        let fn_val = self.module.add_function(&name, fn_type, Some(Linkage::External));
        self.functions.insert(func.name, fn_val);
        self.func_rets.insert(func.name, func.ret.clone());
    }

    fn compile_function(&mut self, func: &Function) -> Result<()> {
        let fn_val = *self
            .functions
            .get(&func.name)
            .ok_or_else(|| CodeGenError::FunctionNotFound(func.name.as_str()))?;

        let boundaries = block_boundaries(func);
        let mut blocks: HashMap<usize, BasicBlock<'ctx>> = HashMap::new();
        for &idx in &boundaries {
            blocks.insert(idx, self.context.append_basic_block(fn_val, &format!("bb{idx}")));
        }
        let entry = blocks[&0];
        self.builder.position_at_end(entry);

        let mut local_ptrs: Vec<PointerValue<'ctx>> = Vec::with_capacity(func.locals.len());
        for (id, slot) in func.locals.iter_enumerated() {
            let llvm_ty = self.type_mapper.map(&slot.ty);
            let ptr = self
                .builder
                .build_alloca(llvm_ty, &format!("local{}", id.index()))
                .map_err(llvm_err)?;
            local_ptrs.push(ptr);
        }
        for i in 0..func.param_count {
            if let Some(param) = fn_val.get_nth_param(i as u32) {
                self.builder
                    .build_store(local_ptrs[i], param)
                    .map_err(llvm_err)?;
            }
        }

        let mut reg_values: HashMap<Reg, BasicValueEnum<'ctx>> = HashMap::new();
        let mut reg_types: HashMap<Reg, Type> = HashMap::new();

        for (i, instr) in func.instructions.iter().enumerate() {
            if i != 0 {
                if let Some(&bb) = blocks.get(&i) {
                    if self
                        .builder
                        .get_insert_block()
                        .and_then(|b| b.get_terminator())
                        .is_none()
                    {
                        self.builder.build_unconditional_branch(bb).map_err(llvm_err)?;
                    }
                    self.builder.position_at_end(bb);
                }
            }
            self.compile_instr(
                instr,
                i,
                func,
                &local_ptrs,
                &blocks,
                &mut reg_values,
                &mut reg_types,
            )?;
        }

        if self
            .builder
            .get_insert_block()
            .and_then(|b| b.get_terminator())
            .is_none()
        {
            match &func.ret {
                Some(ty) => {
                    let zero = self.zero_value(ty);
                    self.builder.build_return(Some(&zero)).map_err(llvm_err)?;
                }
                None => {
                    self.builder.build_return(None).map_err(llvm_err)?;
                }
            }
        }
        Ok(())
    }

    fn zero_value(&mut self, ty: &Type) -> BasicValueEnum<'ctx> {
        self.type_mapper.map(ty).const_zero()
    }

    #[allow(clippy::too_many_arguments)]
    fn compile_instr(
        &mut self,
        instr: &Instr,
        index: usize,
        func: &Function,
        local_ptrs: &[PointerValue<'ctx>],
        blocks: &HashMap<usize, BasicBlock<'ctx>>,
        reg_values: &mut HashMap<Reg, BasicValueEnum<'ctx>>,
        reg_types: &mut HashMap<Reg, Type>,
    ) -> Result<()> {
        let func_name = func.name.as_str();
        match instr {
            Instr::LoadConst { dst, value } => {
                let (val, ty) = self.compile_const(value)?;
                reg_values.insert(*dst, val);
                reg_types.insert(*dst, ty);
            }
            Instr::LoadLocal { dst, local } => {
                let slot_ty = func.locals[*local].ty.clone();
                let ptr = local_ptrs[local.index()];
                let val = if is_aggregate(&slot_ty) {
                    ptr.into()
                } else {
                    let llvm_ty = self.type_mapper.map(&slot_ty);
                    self.builder.build_load(llvm_ty, ptr, "load").map_err(llvm_err)?
                };
                reg_values.insert(*dst, val);
                reg_types.insert(*dst, slot_ty);
            }
            Instr::StoreLocal { local, src } => {
                let slot_ty = func.locals[*local].ty.clone();
                let ptr = local_ptrs[local.index()];
                if is_aggregate(&slot_ty) {
                    self.memcpy_aggregate(ptr, reg_values[src].into_pointer_value(), &slot_ty)?;
                } else {
                    self.builder.build_store(ptr, reg_values[src]).map_err(llvm_err)?;
                }
            }
            Instr::LoadGlobal { .. } | Instr::StoreGlobal { .. } => {
                return Err(CodeGenError::UnsupportedConstruct {
                    construct: "module-level globals".to_string(),
                    function: func_name,
                });
            }
            Instr::Arith { op, dst, lhs, rhs } => {
                let (val, ty) = self.compile_arith(*op, reg_values[lhs], reg_values[rhs])?;
                reg_values.insert(*dst, val);
                reg_types.insert(*dst, ty);
            }
            Instr::UnaryArith { op, dst, src } => {
                let src_ty = reg_types.get(src).cloned().unwrap_or(Type::Integer);
                let (val, ty) = self.compile_unary(*op, reg_values[src], &src_ty)?;
                reg_values.insert(*dst, val);
                reg_types.insert(*dst, ty);
            }
            Instr::Cmp { op, dst, lhs, rhs } => {
                let val = self.compile_cmp(*op, reg_values[lhs], reg_values[rhs])?;
                reg_values.insert(*dst, val.into());
                reg_types.insert(*dst, Type::Boolean);
            }
            Instr::Logical { op, dst, lhs, rhs } => {
                let l = self.truthy(reg_values[lhs].into_int_value())?;
                let val = match (op, rhs) {
                    (Opcode::Not, None) => self.builder.build_not(l, "not").map_err(llvm_err)?,
                    (Opcode::And, Some(r)) => {
                        let r = self.truthy(reg_values[r].into_int_value())?;
                        self.builder.build_and(l, r, "and").map_err(llvm_err)?
                    }
                    (Opcode::Or, Some(r)) => {
                        let r = self.truthy(reg_values[r].into_int_value())?;
                        self.builder.build_or(l, r, "or").map_err(llvm_err)?
                    }
                    _ => {
                        return Err(CodeGenError::Internal(format!(
                            "malformed logical instruction {op:?}"
                        )))
                    }
                };
                let widened = self
                    .builder
                    .build_int_z_extend(val, self.context.i32_type(), "bool")
                    .map_err(llvm_err)?;
                reg_values.insert(*dst, widened.into());
                reg_types.insert(*dst, Type::Boolean);
            }
            Instr::ArrayLoad { dst, base, index } => {
                let elem_ty = element_type(reg_types.get(base).unwrap_or(&Type::Integer));
                let elem_llvm_ty = self.type_mapper.map(&elem_ty);
                let base_ptr = reg_values[base].into_pointer_value();
                let idx = reg_values[index].into_int_value();
                let gep = unsafe {
                    self.builder
                        .build_in_bounds_gep(elem_llvm_ty, base_ptr, &[idx], "arr.gep")
                        .map_err(llvm_err)?
                };
                let val = if is_aggregate(&elem_ty) {
                    gep.into()
                } else {
                    self.builder.build_load(elem_llvm_ty, gep, "arr.load").map_err(llvm_err)?
                };
                reg_values.insert(*dst, val);
                reg_types.insert(*dst, elem_ty);
            }
            Instr::ArrayStore { base, index, src } => {
                let elem_ty = element_type(reg_types.get(base).unwrap_or(&Type::Integer));
                let elem_llvm_ty = self.type_mapper.map(&elem_ty);
                let base_ptr = reg_values[base].into_pointer_value();
                let idx = reg_values[index].into_int_value();
                let gep = unsafe {
                    self.builder
                        .build_in_bounds_gep(elem_llvm_ty, base_ptr, &[idx], "arr.gep")
                        .map_err(llvm_err)?
                };
                if is_aggregate(&elem_ty) {
                    self.memcpy_aggregate(gep, reg_values[src].into_pointer_value(), &elem_ty)?;
                } else {
                    self.builder.build_store(gep, reg_values[src]).map_err(llvm_err)?;
                }
            }
            Instr::FieldLoad { dst, base, offset } => {
                let struct_name = struct_name_of(reg_types.get(base)).ok_or_else(|| {
                    CodeGenError::TypeMappingError(
                        "field access on a value with no known struct type".to_string(),
                    )
                })?;
                let struct_ty = self.type_mapper.struct_type(struct_name);
                let field_ty = self
                    .type_mapper
                    .struct_layout(struct_name)
                    .and_then(|layout| layout.fields.get(*offset as usize))
                    .map(|(_, t)| t.clone())
                    .unwrap_or(Type::Integer);
                let base_ptr = reg_values[base].into_pointer_value();
                let field_ptr = self
                    .builder
                    .build_struct_gep(struct_ty, base_ptr, *offset, "field.gep")
                    .map_err(llvm_err)?;
                let val = if is_aggregate(&field_ty) {
                    field_ptr.into()
                } else {
                    let llvm_ty = self.type_mapper.map(&field_ty);
                    self.builder.build_load(llvm_ty, field_ptr, "field.load").map_err(llvm_err)?
                };
                reg_values.insert(*dst, val);
                reg_types.insert(*dst, field_ty);
            }
            Instr::FieldStore { base, offset, src } => {
                let struct_name = struct_name_of(reg_types.get(base)).ok_or_else(|| {
                    CodeGenError::TypeMappingError(
                        "field assignment on a value with no known struct type".to_string(),
                    )
                })?;
                let struct_ty = self.type_mapper.struct_type(struct_name);
                let field_ty = self
                    .type_mapper
                    .struct_layout(struct_name)
                    .and_then(|layout| layout.fields.get(*offset as usize))
                    .map(|(_, t)| t.clone())
                    .unwrap_or(Type::Integer);
                let base_ptr = reg_values[base].into_pointer_value();
                let field_ptr = self
                    .builder
                    .build_struct_gep(struct_ty, base_ptr, *offset, "field.gep")
                    .map_err(llvm_err)?;
                if is_aggregate(&field_ty) {
                    self.memcpy_aggregate(field_ptr, reg_values[src].into_pointer_value(), &field_ty)?;
                } else {
                    self.builder.build_store(field_ptr, reg_values[src]).map_err(llvm_err)?;
                }
            }
            Instr::AddrOf { dst, local } => {
                reg_values.insert(*dst, local_ptrs[local.index()].into());
                reg_types.insert(*dst, Type::Pointer(Box::new(func.locals[*local].ty.clone())));
            }
            Instr::Deref { dst, src } => {
                let pointee = match reg_types.get(src) {
                    Some(Type::Pointer(inner)) => (**inner).clone(),
                    Some(other) => other.clone(),
                    None => Type::Integer,
                };
                let ptr = reg_values[src].into_pointer_value();
                let val = if is_aggregate(&pointee) {
                    ptr.into()
                } else {
                    let llvm_ty = self.type_mapper.map(&pointee);
                    self.builder.build_load(llvm_ty, ptr, "deref").map_err(llvm_err)?
                };
                reg_values.insert(*dst, val);
                reg_types.insert(*dst, pointee);
            }
            Instr::Call { dst, func: callee, args } => {
                let callee_val = *self
                    .functions
                    .get(callee)
                    .ok_or_else(|| CodeGenError::FunctionNotFound(callee.as_str()))?;
                let arg_vals: Vec<BasicMetadataValueEnum> =
                    args.iter().map(|r| reg_values[r].into()).collect();
                let call_site = self
                    .builder
                    .build_call(callee_val, &arg_vals, "call")
                    .map_err(llvm_err)?;
                if let Some(d) = dst {
                    let ret_ty = self.func_rets.get(callee).cloned().flatten().unwrap_or(Type::Void);
                    if let Some(val) = call_site.try_as_basic_value().left() {
                        reg_values.insert(*d, val);
                    }
                    reg_types.insert(*d, ret_ty);
                }
            }
            Instr::Return { value } => {
                match value {
                    Some(r) => {
                        let val = reg_values[r];
                        self.builder.build_return(Some(&val)).map_err(llvm_err)?;
                    }
                    None => {
                        self.builder.build_return(None).map_err(llvm_err)?;
                    }
                }
            }
            Instr::Jump { target } => {
                let bb = *blocks.get(target).ok_or(CodeGenError::BlockNotFound(*target))?;
                self.builder.build_unconditional_branch(bb).map_err(llvm_err)?;
            }
            Instr::BranchIfFalse { cond, target } => {
                let cond_i1 = self.truthy(reg_values[cond].into_int_value())?;
                let else_bb = *blocks.get(target).ok_or(CodeGenError::BlockNotFound(*target))?;
                let then_bb = *blocks
                    .get(&(index + 1))
                    .ok_or(CodeGenError::BlockNotFound(index + 1))?;
                self.builder
                    .build_conditional_branch(cond_i1, then_bb, else_bb)
                    .map_err(llvm_err)?;
            }
            Instr::AllocHeap { dst, count, elem_ty } => {
                let elem_llvm_ty = self.type_mapper.map(elem_ty);
                let size = elem_llvm_ty
                    .size_of()
                    .ok_or_else(|| CodeGenError::TypeMappingError("unsized element type".to_string()))?;
                let count64 = self
                    .builder
                    .build_int_z_extend(reg_values[count].into_int_value(), self.context.i64_type(), "count64")
                    .map_err(llvm_err)?;
                let bytes = self.builder.build_int_mul(count64, size, "bytes").map_err(llvm_err)?;
                let call = self
                    .builder
                    .build_call(self.libc("malloc"), &[bytes.into()], "malloc")
                    .map_err(llvm_err)?;
                let ptr = call
                    .try_as_basic_value()
                    .left()
                    .ok_or_else(|| CodeGenError::Internal("malloc returned no value".to_string()))?;
                reg_values.insert(*dst, ptr);
                reg_types.insert(*dst, Type::Pointer(Box::new(elem_ty.clone())));
            }
            Instr::FreeHeap { src } => {
                self.builder
                    .build_call(self.libc("free"), &[reg_values[src].into()], "free")
                    .map_err(llvm_err)?;
            }
            Instr::Print { op, src } => self.compile_print(*op, reg_values[src])?,
            Instr::Read { op, dst } => {
                let (val, ty) = self.compile_read(*op, func_name)?;
                reg_values.insert(*dst, val);
                reg_types.insert(*dst, ty);
            }
        }
        Ok(())
    }

    fn compile_const(&mut self, value: &Const) -> Result<(BasicValueEnum<'ctx>, Type)> {
        Ok(match value {
            Const::Int(n) => (
                self.context.i32_type().const_int(*n as u64, true).into(),
                Type::Integer,
            ),
            Const::Decimal(f) => (self.context.f64_type().const_float(*f).into(), Type::Decimal),
            Const::Bool(b) => (
                self.context.i32_type().const_int(*b as u64, false).into(),
                Type::Boolean,
            ),
            Const::Char(c) => (
                self.context.i8_type().const_int(*c as u64, false).into(),
                Type::Character,
            ),
            Const::Text(sym) => {
                let ptr = self.interned_string(*sym)?;
                (ptr.into(), Type::Text)
            }
            Const::Null => (
                self.context.ptr_type(AddressSpace::default()).const_null().into(),
                Type::Pointer(Box::new(Type::Void)),
            ),
        })
    }

    fn interned_string(&mut self, sym: Symbol) -> Result<PointerValue<'ctx>> {
        if let Some(ptr) = self.strings.get(&sym) {
            return Ok(*ptr);
        }
        let text = sym.as_str();
        let ptr = self
            .builder
            .build_global_string_ptr(&text, "str")
            .map_err(llvm_err)?
            .as_pointer_value();
        self.strings.insert(sym, ptr);
        Ok(ptr)
    }

    fn format_string(&mut self, fmt: &'static str) -> Result<PointerValue<'ctx>> {
        if let Some(ptr) = self.format_strings.get(fmt) {
            return Ok(*ptr);
        }
        let ptr = self
            .builder
            .build_global_string_ptr(fmt, "fmt")
            .map_err(llvm_err)?
            .as_pointer_value();
        self.format_strings.insert(fmt, ptr);
        Ok(ptr)
    }

    fn truthy(&self, val: IntValue<'ctx>) -> Result<IntValue<'ctx>> {
        if val.get_type().get_bit_width() == 1 {
            return Ok(val);
        }
        let zero = val.get_type().const_zero();
        self.builder
            .build_int_compare(IntPredicate::NE, val, zero, "tobool")
            .map_err(llvm_err)
    }

    fn memcpy_aggregate(
        &mut self,
        dst: PointerValue<'ctx>,
        src: PointerValue<'ctx>,
        ty: &Type,
    ) -> Result<()> {
        let llvm_ty = self.type_mapper.map(ty);
        let size = llvm_ty
            .size_of()
            .ok_or_else(|| CodeGenError::TypeMappingError("unsized aggregate type".to_string()))?;
        self.builder
            .build_memcpy(dst, 1, src, 1, size)
            .map_err(llvm_err)?;
        Ok(())
    }

    fn compile_arith(
        &mut self,
        op: Opcode,
        lhs: BasicValueEnum<'ctx>,
        rhs: BasicValueEnum<'ctx>,
    ) -> Result<(BasicValueEnum<'ctx>, Type)> {
        use Opcode::*;
        let val = match op {
            AddInt => self.builder.build_int_add(lhs.into_int_value(), rhs.into_int_value(), "add").map_err(llvm_err)?.into(),
            SubInt => self.builder.build_int_sub(lhs.into_int_value(), rhs.into_int_value(), "sub").map_err(llvm_err)?.into(),
            MulInt => self.builder.build_int_mul(lhs.into_int_value(), rhs.into_int_value(), "mul").map_err(llvm_err)?.into(),
            DivInt => self.builder.build_int_signed_div(lhs.into_int_value(), rhs.into_int_value(), "div").map_err(llvm_err)?.into(),
            ModInt => self.builder.build_int_signed_rem(lhs.into_int_value(), rhs.into_int_value(), "rem").map_err(llvm_err)?.into(),
            PowInt => {
                let l = self.builder.build_signed_int_to_float(lhs.into_int_value(), self.context.f64_type(), "l.f").map_err(llvm_err)?;
                let r = self.builder.build_signed_int_to_float(rhs.into_int_value(), self.context.f64_type(), "r.f").map_err(llvm_err)?;
                let call = self.builder.build_call(self.libc("pow"), &[l.into(), r.into()], "pow").map_err(llvm_err)?;
                let f = call.try_as_basic_value().left().unwrap().into_float_value();
                return Ok((
                    self.builder.build_float_to_signed_int(f, self.context.i32_type(), "pow.i").map_err(llvm_err)?.into(),
                    Type::Integer,
                ));
            }
            AddDecimal => self.builder.build_float_add(lhs.into_float_value(), rhs.into_float_value(), "add").map_err(llvm_err)?.into(),
            SubDecimal => self.builder.build_float_sub(lhs.into_float_value(), rhs.into_float_value(), "sub").map_err(llvm_err)?.into(),
            MulDecimal => self.builder.build_float_mul(lhs.into_float_value(), rhs.into_float_value(), "mul").map_err(llvm_err)?.into(),
            DivDecimal => self.builder.build_float_div(lhs.into_float_value(), rhs.into_float_value(), "div").map_err(llvm_err)?.into(),
            ModDecimal => self.builder.build_float_rem(lhs.into_float_value(), rhs.into_float_value(), "rem").map_err(llvm_err)?.into(),
            PowDecimal => {
                let call = self.builder.build_call(self.libc("pow"), &[lhs.into(), rhs.into()], "pow").map_err(llvm_err)?;
                return Ok((call.try_as_basic_value().left().unwrap(), Type::Decimal));
            }
            other => return Err(CodeGenError::Internal(format!("{other:?} is not arithmetic"))),
        };
        let ty = if matches!(op, AddDecimal | SubDecimal | MulDecimal | DivDecimal | ModDecimal) {
            Type::Decimal
        } else {
            Type::Integer
        };
        Ok((val, ty))
    }

    fn compile_unary(
        &mut self,
        op: Opcode,
        src: BasicValueEnum<'ctx>,
        src_ty: &Type,
    ) -> Result<(BasicValueEnum<'ctx>, Type)> {
        use Opcode::*;
        Ok(match op {
            NegInt => (
                self.builder.build_int_neg(src.into_int_value(), "neg").map_err(llvm_err)?.into(),
                Type::Integer,
            ),
            NegDecimal => (
                self.builder.build_float_neg(src.into_float_value(), "neg").map_err(llvm_err)?.into(),
                Type::Decimal,
            ),
            AbsInt => {
                let v = src.into_int_value();
                let zero = v.get_type().const_zero();
                let is_neg = self.builder.build_int_compare(IntPredicate::SLT, v, zero, "is_neg").map_err(llvm_err)?;
                let negated = self.builder.build_int_neg(v, "negated").map_err(llvm_err)?;
                (
                    self.builder.build_select(is_neg, negated, v, "abs").map_err(llvm_err)?,
                    Type::Integer,
                )
            }
            AbsDecimal => {
                let call = self.builder.build_call(self.libc("fabs"), &[src.into()], "fabs").map_err(llvm_err)?;
                (call.try_as_basic_value().left().unwrap(), Type::Decimal)
            }
            Sqrt => {
                let as_f64 = if matches!(src_ty, Type::Decimal) {
                    src.into_float_value()
                } else {
                    self.builder
                        .build_signed_int_to_float(src.into_int_value(), self.context.f64_type(), "to.f")
                        .map_err(llvm_err)?
                };
                let call = self.builder.build_call(self.libc("sqrt"), &[as_f64.into()], "sqrt").map_err(llvm_err)?;
                (call.try_as_basic_value().left().unwrap(), Type::Decimal)
            }
            other => return Err(CodeGenError::Internal(format!("{other:?} is not unary arithmetic"))),
        })
    }

    fn compile_cmp(
        &mut self,
        op: Opcode,
        lhs: BasicValueEnum<'ctx>,
        rhs: BasicValueEnum<'ctx>,
    ) -> Result<IntValue<'ctx>> {
        use Opcode::*;
        let i1 = match op {
            EqInt => self.builder.build_int_compare(IntPredicate::EQ, lhs.into_int_value(), rhs.into_int_value(), "eq").map_err(llvm_err)?,
            NeInt => self.builder.build_int_compare(IntPredicate::NE, lhs.into_int_value(), rhs.into_int_value(), "ne").map_err(llvm_err)?,
            LtInt => self.builder.build_int_compare(IntPredicate::SLT, lhs.into_int_value(), rhs.into_int_value(), "lt").map_err(llvm_err)?,
            LeInt => self.builder.build_int_compare(IntPredicate::SLE, lhs.into_int_value(), rhs.into_int_value(), "le").map_err(llvm_err)?,
            GtInt => self.builder.build_int_compare(IntPredicate::SGT, lhs.into_int_value(), rhs.into_int_value(), "gt").map_err(llvm_err)?,
            GeInt => self.builder.build_int_compare(IntPredicate::SGE, lhs.into_int_value(), rhs.into_int_value(), "ge").map_err(llvm_err)?,
            EqDecimal => self.builder.build_float_compare(FloatPredicate::OEQ, lhs.into_float_value(), rhs.into_float_value(), "eq").map_err(llvm_err)?,
            NeDecimal => self.builder.build_float_compare(FloatPredicate::ONE, lhs.into_float_value(), rhs.into_float_value(), "ne").map_err(llvm_err)?,
            LtDecimal => self.builder.build_float_compare(FloatPredicate::OLT, lhs.into_float_value(), rhs.into_float_value(), "lt").map_err(llvm_err)?,
            LeDecimal => self.builder.build_float_compare(FloatPredicate::OLE, lhs.into_float_value(), rhs.into_float_value(), "le").map_err(llvm_err)?,
            GtDecimal => self.builder.build_float_compare(FloatPredicate::OGT, lhs.into_float_value(), rhs.into_float_value(), "gt").map_err(llvm_err)?,
            GeDecimal => self.builder.build_float_compare(FloatPredicate::OGE, lhs.into_float_value(), rhs.into_float_value(), "ge").map_err(llvm_err)?,
            other => return Err(CodeGenError::Internal(format!("{other:?} is not a comparison"))),
        };
        self.builder
            .build_int_z_extend(i1, self.context.i32_type(), "bool")
            .map_err(llvm_err)
    }

    fn compile_print(&mut self, op: Opcode, src: BasicValueEnum<'ctx>) -> Result<()> {
        let fmt: &'static str = match op {
            Opcode::PrintInt | Opcode::PrintBool => "%d\n",
            Opcode::PrintDecimal => "%g\n",
            Opcode::PrintChar => "%c\n",
            Opcode::PrintText => "%s\n",
            other => return Err(CodeGenError::Internal(format!("{other:?} is not printable"))),
        };
        let fmt_ptr = self.format_string(fmt)?;
        self.builder
            .build_call(self.libc("printf"), &[fmt_ptr.into(), src.into()], "printf")
            .map_err(llvm_err)?;
        Ok(())
    }

    /// `ReadInt`/`ReadDecimal` scan straight into a temporary stack slot via
    /// `scanf`; `ReadText` has no portable line-reading primitive expressible
    /// in bare LLVM IR without bundling a runtime object, so programs using
    /// it must go through the C backend (spec.md §7's native-path scoping).
    fn compile_read(&mut self, op: Opcode, function: String) -> Result<(BasicValueEnum<'ctx>, Type)> {
        match op {
            Opcode::ReadInt => {
                let slot = self.builder.build_alloca(self.context.i32_type(), "scan.tmp").map_err(llvm_err)?;
                let fmt = self.format_string("%d")?;
                self.builder.build_call(self.libc("scanf"), &[fmt.into(), slot.into()], "scanf").map_err(llvm_err)?;
                let val = self.builder.build_load(self.context.i32_type(), slot, "scan.val").map_err(llvm_err)?;
                Ok((val, Type::Integer))
            }
            Opcode::ReadDecimal => {
                let slot = self.builder.build_alloca(self.context.f64_type(), "scan.tmp").map_err(llvm_err)?;
                let fmt = self.format_string("%lf")?;
                self.builder.build_call(self.libc("scanf"), &[fmt.into(), slot.into()], "scanf").map_err(llvm_err)?;
                let val = self.builder.build_load(self.context.f64_type(), slot, "scan.val").map_err(llvm_err)?;
                Ok((val, Type::Decimal))
            }
            Opcode::ReadText => Err(CodeGenError::UnsupportedConstruct {
                construct: "reading a line of text (use the C backend)".to_string(),
                function,
            }),
            other => Err(CodeGenError::Internal(format!("{other:?} is not a read"))),
        }
    }

    pub fn emit_llvm_ir(&self) -> String {
        self.module.print_to_string().to_string()
    }

    pub fn write_ir_to_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fs::File;
        use std::io::Write;
        let ir = self.emit_llvm_ir();
        let mut file = File::create(path)?;
        file.write_all(ir.as_bytes())?;
        Ok(())
    }

    pub fn get_module(&self) -> &Module<'ctx> {
        &self.module
    }

    pub fn write_object_file(&self, path: &Path) -> Result<()> {
        use inkwell::targets::{FileType, TargetTriple};

        let triple = TargetTriple::create(&self.target_triple);
        let target = inkwell::targets::Target::from_triple(&triple)
            .map_err(|e| CodeGenError::CompilationError(format!("failed to get target: {e}")))?;
        let target_machine = target
            .create_target_machine(
                &triple,
                "generic",
                "",
                self.opt_level,
                inkwell::targets::RelocMode::Default,
                inkwell::targets::CodeModel::Default,
            )
            .ok_or_else(|| CodeGenError::CompilationError("failed to create target machine".to_string()))?;
        target_machine
            .write_to_file(&self.module, FileType::Object, path)
            .map_err(|e| CodeGenError::CompilationError(format!("failed to write object file: {e}")))
    }
}

fn llvm_err(e: impl std::fmt::Display) -> CodeGenError {
    CodeGenError::LlvmOperationFailed(e.to_string())
}

fn is_aggregate(ty: &Type) -> bool {
    matches!(ty, Type::FixedArray(_, _) | Type::Struct(_))
}

fn element_type(ty: &Type) -> Type {
    match ty {
        Type::FixedArray(inner, _) | Type::OpenArray(inner) | Type::Pointer(inner) => (**inner).clone(),
        other => other.clone(),
    }
}

fn struct_name_of(ty: Option<&Type>) -> Option<Symbol> {
    match ty {
        Some(Type::Struct(name)) => Some(*name),
        Some(Type::Pointer(inner)) => match &**inner {
            Type::Struct(name) => Some(*name),
            _ => None,
        },
        _ => None,
    }
}

/// Every `Jump`/`BranchIfFalse` target, every instruction right after one
/// (so a conditional branch's fallthrough arm has somewhere to land), and
/// instruction 0 — one LLVM basic block per boundary.
fn block_boundaries(func: &Function) -> Vec<usize> {
    use std::collections::BTreeSet;
    let mut set = BTreeSet::new();
    set.insert(0);
    let len = func.instructions.len();
    for (i, instr) in func.instructions.iter().enumerate() {
        match instr {
            Instr::Jump { target } => {
                set.insert(*target);
                if i + 1 < len {
                    set.insert(i + 1);
                }
            }
            Instr::BranchIfFalse { target, .. } => {
                set.insert(*target);
                if i + 1 < len {
                    set.insert(i + 1);
                }
            }
            Instr::Return { .. } => {
                if i + 1 < len {
                    set.insert(i + 1);
                }
            }
            _ => {}
        }
    }
    set.into_iter().collect()
}
