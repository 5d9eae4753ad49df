//! Edge case tests for zincc-par

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::Parser;
    use zincc_util::FileId;

    fn parse(source: &str) -> Program {
        Parser::parse(source, FileId::DUMMY).unwrap()
    }

    fn try_parse(source: &str) -> Result<Program, crate::ParseError> {
        Parser::parse(source, FileId::DUMMY)
    }

    // ==================== EDGE CASES ====================

    #[test]
    fn test_edge_empty_source() {
        let program = parse("");
        assert!(program.includes.is_empty());
        assert!(program.functions.is_empty());
        assert!(program.main.is_none());
    }

    #[test]
    fn test_edge_main_with_empty_body() {
        let program = parse("to do the main thing:\nend");
        assert_eq!(program.main.unwrap().body.len(), 0);
    }

    #[test]
    fn test_edge_main_without_colon() {
        // Optional punctuation: the introducer colon may be elided
        // (spec.md §4.2 "Optional punctuation").
        let program = parse("to do the main thing\nsay 1\nend");
        assert_eq!(program.main.unwrap().body.len(), 1);
    }

    #[test]
    fn test_edge_if_without_then() {
        let program = parse(
            "to do the main thing:\nif 1 equals 1 say \"yes\" end\nend",
        );
        let body = &program.main.unwrap().body;
        assert!(matches!(body[0].kind, StmtKind::If { .. }));
    }

    #[test]
    fn test_edge_blank_lines_between_statements() {
        let program = parse("to do the main thing:\n\n\nsay 1\n\n\nend");
        assert_eq!(program.main.unwrap().body.len(), 1);
    }

    #[test]
    fn test_edge_synonymous_assignment_forms_collapse() {
        let forms = [
            "set x to 5",
            "change x to 5",
            "now x is 5",
            "let x be 5",
            "make x equal to 5",
        ];
        for form in forms {
            let program = parse(&format!(
                "to do the main thing:\nthere is a number called x which is 0\n{form}\nend"
            ));
            let body = &program.main.unwrap().body;
            assert!(
                matches!(body[1].kind, StmtKind::Assign { .. }),
                "form `{form}` did not collapse to Assign"
            );
        }
    }

    #[test]
    fn test_edge_synonymous_output_verbs() {
        for verb in ["say", "print", "show", "display"] {
            let program = parse(&format!("to do the main thing:\n{verb} 1\nend"));
            let body = &program.main.unwrap().body;
            assert!(matches!(body[0].kind, StmtKind::Output { .. }));
        }
    }

    #[test]
    fn test_edge_forward_reference_call_resolves_before_definition() {
        let program = parse(
            "to do the main thing:\nsay the result of helper with 1\nend\n\
             to helper with a number called n and return a number:\nreturn n\nend",
        );
        assert_eq!(program.functions.len(), 1);
    }

    #[test]
    fn test_edge_descending_for_range() {
        let program = parse(
            "to do the main thing:\nfor each number i from 5 down to 1:\nsay i\nend\nend",
        );
        let body = &program.main.unwrap().body;
        match &body[0].kind {
            StmtKind::ForRange { descending, .. } => assert!(descending),
            other => panic!("expected ForRange, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_possessive_field_access() {
        let program = parse("to do the main thing:\nsay bob's age\nend");
        let body = &program.main.unwrap().body;
        match &body[0].kind {
            StmtKind::Output { items } => match &items[0].kind {
                ExprKind::FieldAccess { possessive, .. } => assert!(*possessive),
                other => panic!("expected FieldAccess, got {other:?}"),
            },
            other => panic!("expected Output, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_concat_list_with_and_then() {
        let program = parse("to do the main thing:\nsay \"a\" and then \"b\" and then \"c\"\nend");
        let body = &program.main.unwrap().body;
        match &body[0].kind {
            StmtKind::Output { items } => {
                assert_eq!(items.len(), 1);
                match &items[0].kind {
                    ExprKind::Concat(parts) => assert_eq!(parts.len(), 3),
                    other => panic!("expected Concat, got {other:?}"),
                }
            }
            other => panic!("expected Output, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_identifier_containing_operator_word_is_not_folded() {
        let program = parse(
            "to do the main thing:\nthere is a number called user_age_plus_one which is 0\nend",
        );
        let body = &program.main.unwrap().body;
        match &body[0].kind {
            StmtKind::VarDecl { name, .. } => {
                assert_eq!(name.as_str(), "user_age_plus_one")
            }
            other => panic!("expected VarDecl, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_arithmetic_precedence_matches_spec_example() {
        // `temp minus 32 times 5 divided by 9` parses as
        // `temp minus ((32 times 5) divided by 9)` (spec.md §9).
        let program = parse(
            "to do the main thing:\nthere is a number called temp which is 0\nsay temp minus 32 times 5 divided by 9\nend",
        );
        let body = &program.main.unwrap().body;
        match &body[1].kind {
            StmtKind::Output { items } => match &items[0].kind {
                ExprKind::Binary { op: BinaryOp::Sub, rhs, .. } => {
                    assert!(matches!(rhs.kind, ExprKind::Binary { op: BinaryOp::Div, .. }));
                }
                other => panic!("expected top-level Sub, got {other:?}"),
            },
            other => panic!("expected Output, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_c_fallback_captures_whole_line() {
        let program = parse("to do the main thing:\nprintf(\"raw %d\\n\", 42);\nend");
        let body = &program.main.unwrap().body;
        assert!(matches!(body[0].kind, StmtKind::RawC(_)));
    }

    #[test]
    fn test_edge_graphics_call_with_typed_args() {
        let program = parse(
            "to do the main thing:\nthere is a number called radius which is 50\n\
             call the graphics function \"DrawCircle\" with 100 and 100 and radius\nend",
        );
        let body = &program.main.unwrap().body;
        match &body[1].kind {
            StmtKind::Graphics { call, args } => {
                assert_eq!(call.as_str(), "DrawCircle");
                assert_eq!(args.len(), 3);
            }
            other => panic!("expected Graphics, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_graphics_call_with_no_args() {
        let program = parse(
            "to do the main thing:\ncall the graphics function \"CloseWindow\"\nend",
        );
        let body = &program.main.unwrap().body;
        match &body[0].kind {
            StmtKind::Graphics { args, .. } => assert!(args.is_empty()),
            other => panic!("expected Graphics, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_repeat_times_loop() {
        let program = parse("to do the main thing:\nrepeat 3 times:\nsay 1\nend\nend");
        let body = &program.main.unwrap().body;
        assert!(matches!(body[0].kind, StmtKind::RepeatTimes { .. }));
    }

    // ==================== ERROR CASES ====================

    #[test]
    fn test_err_unterminated_if_block() {
        assert!(try_parse("to do the main thing:\nif 1 equals 1 say \"x\"\n").is_err());
    }

    #[test]
    fn test_err_unexpected_token_at_program_level() {
        assert!(try_parse("923 abc").is_err());
    }

    #[test]
    fn test_err_missing_end_on_function() {
        assert!(try_parse("to greet:\nsay 1").is_err());
    }

    #[test]
    fn test_err_struct_def_missing_end() {
        assert!(try_parse("define a Person as having:\na number called age").is_err());
    }
}
