//! Edge case tests for zincc-sem

#[cfg(test)]
mod tests {
    use crate::{resolve, NameKind, ResolveError};
    use zincc_util::FileId;

    fn resolve_source(source: &str) -> Result<crate::ResolvedProgram, Vec<ResolveError>> {
        let program = zincc_par::Parser::parse(source, FileId::DUMMY).unwrap();
        resolve(program)
    }

    // ==================== EDGE CASES ====================

    #[test]
    fn test_edge_empty_program_resolves() {
        assert!(resolve_source("").is_ok());
    }

    #[test]
    fn test_edge_main_only_resolves() {
        assert!(resolve_source("to do the main thing:\nend").is_ok());
    }

    #[test]
    fn test_edge_forward_reference_resolves_as_function() {
        let resolved = resolve_source(
            "to do the main thing:\nsay the result of helper with 1\nend\n\
             to helper with a number called n and return a number:\nreturn n\nend",
        )
        .unwrap();
        let main = resolved.program.main.as_ref().unwrap();
        let say_span = main.body[0].span;
        // The call isn't tagged itself (only name-bearing decl/var nodes
        // are); what matters is that the function table already knows
        // `helper` by the time the call in `main` is walked.
        assert!(resolved.functions.contains_key(&zincc_util::Symbol::intern("helper")));
        let _ = say_span;
    }

    #[test]
    fn test_edge_shadowing_in_nested_if_block() {
        let resolved = resolve_source(
            "to do the main thing:\nthere is a number called x which is 1\n\
             if x equals 1:\nthere is a number called x which is 2\nsay x\nend\n\
             say x\nend",
        )
        .unwrap();
        let main = resolved.program.main.as_ref().unwrap();
        // Both inner and outer `x` decls resolve as Local; nothing errors.
        let outer_decl_span = main.body[0].span;
        assert_eq!(resolved.kind_at(outer_decl_span), NameKind::Local);
    }

    #[test]
    fn test_edge_loop_induction_variable_is_local() {
        let resolved = resolve_source(
            "to do the main thing:\nfor each number i from 1 to 3:\nsay i\nend\nend",
        )
        .unwrap();
        let main = resolved.program.main.as_ref().unwrap();
        let for_span = main.body[0].span;
        assert_eq!(resolved.kind_at(for_span), NameKind::Local);
    }

    #[test]
    fn test_edge_struct_with_single_field_is_fine() {
        assert!(
            resolve_source("define a Pair as having:\na number called x\nend\nto do the main thing:\nend")
                .is_ok()
        );
    }

    #[test]
    fn test_edge_many_duplicate_functions_collect_one_error_each() {
        let source =
            "to greet:\nend\nto greet:\nend\nto greet:\nend\nto do the main thing:\nend";
        let errors = resolve_source(source).unwrap_err();
        // Two duplicates beyond the first definition.
        assert_eq!(
            errors
                .iter()
                .filter(|e| matches!(e, ResolveError::DuplicateFunction { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_edge_resolution_errors_accumulate_across_struct_and_function() {
        let source = "define a P as having:\na number called a\na number called a\nend\n\
                       to greet:\nend\nto greet:\nend\nto do the main thing:\nend";
        let errors = resolve_source(source).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ResolveError::DuplicateField { .. })));
        assert!(errors.iter().any(|e| matches!(e, ResolveError::DuplicateFunction { .. })));
    }

    #[test]
    fn test_edge_unresolved_span_defaults_to_passthrough() {
        let resolved = resolve_source("to do the main thing:\nend").unwrap();
        assert_eq!(resolved.kind_at(zincc_util::Span::DUMMY), NameKind::Passthrough);
    }

    // ==================== ERROR CASES ====================

    #[test]
    fn test_err_duplicate_struct_is_reported() {
        let source = "define a P as having:\na number called a\nend\n\
                       define a P as having:\na number called b\nend\n\
                       to do the main thing:\nend";
        let errors = resolve_source(source).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ResolveError::DuplicateStruct { .. })));
    }

    #[test]
    fn test_err_duplicate_function_preserves_both_spans() {
        let source = "to greet:\nend\nto greet:\nend\nto do the main thing:\nend";
        let errors = resolve_source(source).unwrap_err();
        match &errors[0] {
            ResolveError::DuplicateFunction { first, second, .. } => {
                assert_ne!(first.start, second.start);
            }
            other => panic!("expected DuplicateFunction, got {other:?}"),
        }
    }
}
