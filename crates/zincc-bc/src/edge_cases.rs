//! Edge case tests for zincc-bc

#[cfg(test)]
mod tests {
    use crate::{lower_program, LowerError};
    use zincc_util::FileId;

    fn lower(source: &str) -> Result<crate::Program, LowerError> {
        let program = zincc_par::Parser::parse(source, FileId::DUMMY).unwrap();
        let resolved = zincc_sem::resolve(program).unwrap();
        lower_program(&resolved)
    }

    // ==================== EDGE CASES ====================

    #[test]
    fn test_edge_main_with_no_statements() {
        let program = lower("to do the main thing:\nend").unwrap();
        let main = &program.functions[0];
        assert_eq!(main.name.as_str(), "main");
        // Always ends with a `Return` for its implicit `0` exit code.
        assert!(matches!(
            main.instructions.last(),
            Some(crate::Instr::Return { .. })
        ));
    }

    #[test]
    fn test_edge_recursive_function_lowers() {
        let program = lower(
            "to find the factorial with a number called n and return a number:\n\
             if n is less than or equal to 1:\nreturn 1\nend\n\
             return n times find the factorial with n minus 1\nend\n\
             to do the main thing:\nend",
        )
        .unwrap();
        assert_eq!(program.functions.len(), 2);
    }

    #[test]
    fn test_edge_while_loop_with_break_and_continue() {
        let program = lower(
            "to do the main thing:\nthere is a number called i which is 0\n\
             while i is less than 10:\nif i equals 5:\nbreak\nend\n\
             add 1 to i\ncontinue\nend\nend",
        )
        .unwrap();
        let main = &program.functions[0];
        assert!(main.instructions.iter().any(|i| matches!(i, crate::Instr::Jump { .. })));
    }

    #[test]
    fn test_edge_repeat_times_has_a_unique_counter_local() {
        let program = lower(
            "to do the main thing:\nrepeat 3 times:\nsay 1\nend\nrepeat 2 times:\nsay 2\nend\nend",
        )
        .unwrap();
        let main = &program.functions[0];
        // Two independent repeat loops need two distinct counter locals
        // beyond whatever params/locals preceded them.
        assert!(main.locals.len() >= 2);
    }

    #[test]
    fn test_edge_descending_for_range_lowers() {
        let program = lower(
            "to do the main thing:\nfor each number i from 5 down to 1:\nsay i\nend\nend",
        )
        .unwrap();
        assert!(!program.functions[0].instructions.is_empty());
    }

    #[test]
    fn test_edge_nested_function_calls() {
        let program = lower(
            "to add one with a number called n and return a number:\nreturn n plus 1\nend\n\
             to do the main thing:\nsay add one with add one with 1\nend",
        )
        .unwrap();
        let main = program.functions.iter().find(|f| f.name.as_str() == "main").unwrap();
        let call_count = main
            .instructions
            .iter()
            .filter(|i| matches!(i, crate::Instr::Call { .. }))
            .count();
        assert_eq!(call_count, 2);
    }

    #[test]
    fn test_edge_boolean_and_comparison_mix() {
        let program = lower(
            "to do the main thing:\nif 1 is less than 2 and 3 equals 3:\nsay \"yes\"\nend\nend",
        )
        .unwrap();
        assert!(!program.functions[0].instructions.is_empty());
    }

    #[test]
    fn test_edge_struct_field_assignment_lowers_by_offset() {
        let program = lower(
            "define a Point as having:\na number called x\nend\n\
             to do the main thing:\nthere is a Point called p\nset p's x to 5\nend",
        )
        .unwrap();
        let main = &program.functions[0];
        assert!(main.instructions.iter().any(|i| matches!(i, crate::Instr::FieldStore { .. })));
    }

    // ==================== ERROR CASES ====================

    #[test]
    fn test_err_raw_c_passthrough_has_no_bytecode_lowering() {
        let result = lower("to do the main thing:\nprintf(\"hi\");\nend");
        assert!(matches!(result, Err(LowerError::UnsupportedConstruct { .. })));
    }

    #[test]
    fn test_err_file_open_has_no_bytecode_lowering() {
        let result = lower(
            "to do the main thing:\nopen the file called \"a.txt\" for reading and call it f\nend",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_err_graphics_call_has_no_bytecode_lowering() {
        let result =
            lower("to do the main thing:\ncall the graphics function \"DrawFPS\" with 10 and 10\nend");
        assert!(matches!(result, Err(LowerError::UnsupportedConstruct { .. })));
    }
}
