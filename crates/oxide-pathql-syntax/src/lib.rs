//! # oxide-pathql-syntax
//!
//! Lexer, parser, AST and printer for the SELECT dialect understood by the
//! `oxide-pathql` compiler.
//!
//! This crate provides:
//! - A hand-written lexer that keeps the path markers `\` (reverse relation)
//!   and `?` (nullable relation) attached to the identifier they mark
//! - A recursive descent parser with Pratt expression parsing, where column
//!   and table references may be dotted object paths of any length
//! - A closed AST whose `Display` implementation prints standard SQL
//!
//! ```rust
//! use oxide_pathql_syntax::parse;
//!
//! let query = parse("SELECT users.address.city FROM users WHERE users.id = 1").unwrap();
//! assert_eq!(
//!     query.to_string(),
//!     "SELECT users.address.city FROM users WHERE users.id = 1"
//! );
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{Expr, SelectStatement};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParseError, Parser};

/// Parses a single SELECT query.
///
/// # Errors
///
/// Returns a `ParseError` if the input is not a valid SELECT statement.
pub fn parse(input: &str) -> Result<SelectStatement, ParseError> {
    Parser::new(input).parse_query()
}
