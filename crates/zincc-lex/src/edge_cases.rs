//! Edge case tests for zincc-lex

#[cfg(test)]
mod tests {
    use crate::{tokenize, TokenKind};
    use zincc_util::FileId;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source, FileId::DUMMY)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    // ==================== EDGE CASES ====================

    #[test]
    fn test_edge_empty_source() {
        let k = kinds("");
        assert_eq!(k, vec![TokenKind::Eof]);
    }

    #[test]
    fn test_edge_only_whitespace() {
        let k = kinds("   \t  ");
        assert_eq!(k, vec![TokenKind::Eof]);
    }

    #[test]
    fn test_edge_only_newlines() {
        let k = kinds("\n\n\n");
        assert!(k.iter().all(|t| matches!(t, TokenKind::Eol | TokenKind::Eof)));
    }

    #[test]
    fn test_edge_single_char_ident() {
        let k = kinds("x");
        assert!(matches!(k[0], TokenKind::Ident(s) if s.as_str() == "x"));
    }

    #[test]
    fn test_edge_long_identifier() {
        let name = "a".repeat(5000);
        let k = kinds(&name);
        assert!(matches!(&k[0], TokenKind::Ident(s) if s.as_str() == name));
    }

    #[test]
    fn test_edge_keyword_case_insensitive_but_identifier_case_preserved() {
        let k = kinds("SAY");
        assert!(matches!(k[0], TokenKind::Keyword(s) if s.as_str() == "say"));
    }

    #[test]
    fn test_edge_zero_integer() {
        let k = kinds("0");
        assert_eq!(k[0], TokenKind::IntLiteral(0));
    }

    #[test]
    fn test_edge_decimal_with_leading_zero() {
        let k = kinds("0.5");
        assert_eq!(k[0], TokenKind::DecimalLiteral(0.5));
    }

    #[test]
    fn test_edge_empty_string_literal() {
        let k = kinds("\"\"");
        assert!(matches!(&k[0], TokenKind::StringLiteral(s) if s.as_str().is_empty()));
    }

    #[test]
    fn test_edge_string_with_all_escapes() {
        let k = kinds(r#""\n\t\"\\\'""#);
        assert!(matches!(&k[0], TokenKind::StringLiteral(_)));
    }

    #[test]
    fn test_edge_longest_match_shares_prefix() {
        let k = kinds("is greater than or equal to");
        assert_eq!(k[0], TokenKind::keyword("is greater than or equal to"));
    }

    #[test]
    fn test_edge_shorter_phrase_when_longer_doesnt_match() {
        let k = kinds("is greater than x");
        assert_eq!(k[0], TokenKind::keyword("is greater than"));
    }

    #[test]
    fn test_edge_phrase_folding_stops_at_punct() {
        let k = kinds("is greater than(x)");
        assert_eq!(k[0], TokenKind::keyword("is greater than"));
    }

    #[test]
    fn test_edge_possessive_marker_distinct_from_plain_s() {
        let k = kinds("bob's age");
        assert!(k.contains(&TokenKind::Possessive));
    }

    #[test]
    fn test_edge_trailing_s_word_is_not_possessive() {
        let k = kinds("bobs age");
        assert!(!k.contains(&TokenKind::Possessive));
    }

    #[test]
    fn test_edge_nested_parens() {
        let k = kinds("((()))");
        assert_eq!(k.iter().filter(|t| t.is_punct('(')).count(), 3);
    }

    #[test]
    fn test_edge_character_literal_escape() {
        let k = kinds(r"'\n'");
        assert_eq!(k[0], TokenKind::CharLiteral('\n'));
    }

    #[test]
    fn test_edge_block_comment_does_not_fold_across_it() {
        let k = kinds("is greater /* nope */ than x");
        // "is greater" and "than" never fold together across the comment.
        assert!(!k.contains(&TokenKind::keyword("is greater than")));
    }

    #[test]
    fn test_edge_crlf_line_endings() {
        let k = kinds("say x\r\nsay y");
        assert!(k.iter().any(|t| matches!(t, TokenKind::Eol)));
    }

    #[test]
    fn test_edge_mixed_digits_and_letters_identifier() {
        let k = kinds("x1_y2");
        assert!(matches!(&k[0], TokenKind::Ident(s) if s.as_str() == "x1_y2"));
    }

    // ==================== ERROR CASES ====================

    #[test]
    fn test_err_unterminated_string() {
        assert!(tokenize("\"unterminated", FileId::DUMMY).is_err());
    }

    #[test]
    fn test_err_unterminated_char() {
        assert!(tokenize("'x", FileId::DUMMY).is_err());
    }

    #[test]
    fn test_err_unterminated_string_with_trailing_escape() {
        assert!(tokenize("\"abc\\", FileId::DUMMY).is_err());
    }

    #[test]
    fn test_err_position_reported_is_at_the_opening_quote_line() {
        match tokenize("say \"ok\"\n\"bad", FileId::DUMMY) {
            Err(crate::LexError::UnterminatedString { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected unterminated string error, got {other:?}"),
        }
    }
}
