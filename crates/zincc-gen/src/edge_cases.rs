//! Edge case tests for zincc-gen

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use inkwell::context::Context;
    use inkwell::OptimizationLevel;

    use crate::LlvmBackend;
    use zincc_util::FileId;

    fn compile(source: &str, opt: OptimizationLevel) -> String {
        let program = zincc_par::Parser::parse(source, FileId::DUMMY).unwrap();
        let resolved = zincc_sem::resolve(program).unwrap();
        let bc = zincc_bc::lower_program(&resolved).unwrap();
        let context = Context::create();
        let mut backend = LlvmBackend::new(
            &context,
            "test_module",
            "x86_64-unknown-linux-gnu".to_string(),
            opt,
            resolved.structs.clone(),
        );
        backend.compile_program(&bc).unwrap();
        backend.emit_llvm_ir()
    }

    // ==================== EDGE CASES ====================

    #[test]
    fn test_edge_new_backend_names_its_module() {
        let context = Context::create();
        let backend = LlvmBackend::new(
            &context,
            "test_module",
            "x86_64-unknown-linux-gnu".to_string(),
            OptimizationLevel::None,
            HashMap::new(),
        );
        assert_eq!(backend.get_module().get_name().to_str(), Ok("test_module"));
    }

    #[test]
    fn test_edge_empty_module_still_emits_ir_text() {
        let context = Context::create();
        let backend = LlvmBackend::new(
            &context,
            "empty",
            "x86_64-unknown-linux-gnu".to_string(),
            OptimizationLevel::None,
            HashMap::new(),
        );
        let ir = backend.emit_llvm_ir();
        assert!(!ir.is_empty());
        assert!(ir.contains("empty"));
    }

    #[test]
    fn test_edge_all_opt_levels_construct_without_panicking() {
        for opt in [
            OptimizationLevel::None,
            OptimizationLevel::Less,
            OptimizationLevel::Default,
            OptimizationLevel::Aggressive,
        ] {
            let context = Context::create();
            let _backend = LlvmBackend::new(
                &context,
                "test",
                "x86_64-unknown-linux-gnu".to_string(),
                opt,
                HashMap::new(),
            );
        }
    }

    #[test]
    fn test_edge_long_module_name() {
        let context = Context::create();
        let long_name = "module_".repeat(100);
        let backend = LlvmBackend::new(
            &context,
            &long_name,
            "x86_64-unknown-linux-gnu".to_string(),
            OptimizationLevel::None,
            HashMap::new(),
        );
        assert!(backend
            .get_module()
            .get_name()
            .to_str()
            .unwrap()
            .contains("module_"));
    }

    #[test]
    fn test_edge_hello_world_compiles_to_a_main_function() {
        let ir = compile(
            "to do the main thing:\nsay \"Hello, World!\"\nend",
            OptimizationLevel::None,
        );
        assert!(ir.contains("define i32 @main"));
    }

    #[test]
    fn test_edge_recursive_function_emits_its_own_definition() {
        let ir = compile(
            "to find the factorial with a number called n and return a number:\n\
             if n is less than or equal to 1:\nreturn 1\nend\n\
             return n times find the factorial with n minus 1\nend\n\
             to do the main thing:\nend",
            OptimizationLevel::Default,
        );
        assert!(ir.contains("define i64 @find_the_factorial") || ir.contains("define i32 @find_the_factorial"));
    }

    #[test]
    fn test_edge_struct_typed_program_compiles() {
        let ir = compile(
            "define a Point as having:\na number called x\na number called y\nend\n\
             to do the main thing:\nthere is a Point called p\nset p's x to 1\nend",
            OptimizationLevel::None,
        );
        assert!(ir.contains("define i32 @main"));
    }
}
