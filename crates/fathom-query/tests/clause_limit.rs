//! Clause ceiling enforcement.
//!
//! The ceiling is process-wide, so this lives in its own test binary: one
//! test owns the global for its whole run and restores the default.

use fathom_query::{
    max_clause_count, set_max_clause_count, QueryParseError, QueryParser, WhitespaceAnalyzer,
    DEFAULT_MAX_CLAUSE_COUNT,
};

#[test]
fn ceiling_is_enforced_and_restorable() {
    let parser = QueryParser::new(WhitespaceAnalyzer::new(false));

    assert_eq!(max_clause_count(), DEFAULT_MAX_CLAUSE_COUNT);

    set_max_clause_count(2);
    let err = parser.parse("one two three", "field").unwrap_err();
    assert_eq!(err, QueryParseError::TooManyClauses { limit: 2 });

    // two clauses still fit
    assert!(parser.parse("one two", "field").unwrap().is_some());

    // nested groups count toward the same total
    let err = parser.parse("(a b) (c d)", "field").unwrap_err();
    assert!(matches!(err, QueryParseError::TooManyClauses { .. }));

    // the ceiling is shared, not per-parser
    let other = QueryParser::new(WhitespaceAnalyzer::new(false));
    assert!(matches!(
        other.parse("one two three", "field").unwrap_err(),
        QueryParseError::TooManyClauses { .. }
    ));

    // values below one clamp up
    set_max_clause_count(0);
    assert_eq!(max_clause_count(), 1);

    set_max_clause_count(DEFAULT_MAX_CLAUSE_COUNT);
    assert!(parser.parse("one two three", "field").unwrap().is_some());
}
