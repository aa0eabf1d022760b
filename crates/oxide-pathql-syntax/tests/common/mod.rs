#![allow(dead_code)]

use oxide_pathql_syntax::ast::SelectStatement;
use oxide_pathql_syntax::{ParseError, Parser};

pub fn parse_select(sql: &str) -> SelectStatement {
    Parser::new(sql)
        .parse_query()
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn parse_err(sql: &str) -> ParseError {
    Parser::new(sql)
        .parse_query()
        .expect_err(&format!("Expected parse error for: {sql}"))
}

/// Verifies that `to_string()` produces a fixed point:
/// parse(sql).to_string() can be re-parsed and yields the same
/// string again.
pub fn round_trip(sql: &str) {
    let ast1 = parse_select(sql);
    let rendered1 = ast1.to_string();
    let ast2 = parse_select(&rendered1);
    let rendered2 = ast2.to_string();
    assert_eq!(
        rendered1, rendered2,
        "Round-trip failed.\n  Input:    {sql}\n  First:    {rendered1}\n  Second:   {rendered2}"
    );
}

/// Asserts that `sql` prints exactly as `expected`, and that `expected` is
/// itself a fixed point.
pub fn prints_as(sql: &str, expected: &str) {
    assert_eq!(parse_select(sql).to_string(), expected, "Input: {sql}");
    round_trip(expected);
}
