#![allow(dead_code)]

use oxide_pathql::{CompileError, CompileOptions, Compiler, DatabaseSchema};

const SHOP: &str = include_str!("../fixtures/shop.json");

/// Countries, addresses, companies, users, goods, transactions and a
/// self-referencing persons table.
pub fn shop() -> DatabaseSchema {
    serde_json::from_str(SHOP).unwrap_or_else(|e| panic!("Invalid fixture schema: {e}"))
}

pub fn compiler() -> Compiler {
    Compiler::new(shop())
}

pub fn compiler_with(options: CompileOptions) -> Compiler {
    Compiler::with_options(shop(), options)
}

pub fn compile(query: &str) -> String {
    compiler()
        .compile(query)
        .unwrap_or_else(|e| panic!("Failed to compile: {query}\nError: {e}"))
}

pub fn compile_err(query: &str) -> CompileError {
    compiler()
        .compile(query)
        .expect_err(&format!("Expected compile error for: {query}"))
}

/// Asserts that `query` compiles to `expected`.
pub fn compiles_to(query: &str, expected: &str) {
    assert_eq!(compile(query), expected, "Input: {query}");
}

/// Asserts that `query` compiles to itself.
pub fn unchanged(query: &str) {
    compiles_to(query, query);
}

/// Counts the entries of the compiled FROM clause.
pub fn from_entries(query: &str) -> usize {
    let statement = oxide_pathql_syntax::parse(query)
        .unwrap_or_else(|e| panic!("Failed to parse: {query}\nError: {e}"));
    compiler()
        .compile_statement(statement)
        .unwrap_or_else(|e| panic!("Failed to compile: {query}\nError: {e}"))
        .from
        .len()
}
