//! Property-based tests for lexer span coverage
//! **Property: token spans tile the source with no gaps or overlaps**

use proptest::prelude::*;
use symmetric_template::{tokenize, TokenKind};

/// Strategy for one template fragment: plain text, a variable or a tag
fn fragment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        r"[a-zA-Z0-9 \n\t;(){}]{1,12}".prop_filter("no delimiters", |s| {
            !s.contains("{{") && !s.contains("{%") && !s.ends_with('{')
        }),
        "[a-z]{1,6}".prop_map(|name| format!("{{{{ {} }}}}", name)),
        "[a-z]{1,6}".prop_map(|name| format!("{{{{{}|upper}}}}", name)),
        Just("{% for x in items %}".to_string()),
        Just("{% endfor %}".to_string()),
        Just("{% if not last %}".to_string()),
        Just("{% else %}".to_string()),
        Just("{% endif %}".to_string()),
        Just("{% templatetag openbrace %}".to_string()),
    ]
}

fn source_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment_strategy(), 0..12).prop_map(|parts| parts.concat())
}

proptest! {
    /// Property: spans are contiguous, start at zero and end at the source length
    #[test]
    fn prop_spans_cover_source(source in source_strategy()) {
        let tokens = tokenize(&source).unwrap();

        let mut position = 0;
        for token in &tokens {
            prop_assert_eq!(token.span.start, position);
            prop_assert!(token.span.end > token.span.start);
            position = token.span.end;
        }
        prop_assert_eq!(position, source.len());
    }

    /// Property: literal tokens carry exactly the text their span covers
    #[test]
    fn prop_literals_match_spans(source in source_strategy()) {
        let tokens = tokenize(&source).unwrap();

        for token in &tokens {
            if let TokenKind::Literal(text) = &token.kind {
                prop_assert_eq!(text.as_str(), &source[token.span.clone()]);
            }
        }
    }

    /// Property: consecutive literal tokens are never produced
    #[test]
    fn prop_no_adjacent_literals(source in source_strategy()) {
        let tokens = tokenize(&source).unwrap();

        for pair in tokens.windows(2) {
            let both_literal = matches!(pair[0].kind, TokenKind::Literal(_))
                && matches!(pair[1].kind, TokenKind::Literal(_));
            prop_assert!(!both_literal);
        }
    }
}
