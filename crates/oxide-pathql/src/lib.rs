//! # oxide-pathql
//!
//! Compiles SELECT queries whose column and table references are dotted
//! object paths into plain SQL. Each path segment follows a foreign key, and
//! the compiler writes the joins:
//!
//! ```rust
//! use oxide_pathql::{Compiler, DatabaseSchema, TableSchema};
//!
//! let schema = DatabaseSchema::new()
//!     .table(TableSchema::new("countries").columns(["id", "code"]))
//!     .table(TableSchema::new("users").column("id").references("country_id", "countries"));
//!
//! let sql = Compiler::new(schema)
//!     .compile("SELECT users.id WHERE users.country.code = 'FR'")
//!     .unwrap();
//! assert_eq!(
//!     sql,
//!     "SELECT users.id FROM users \
//!      INNER JOIN countries AS __anon__0 ON users.country_id = __anon__0.id \
//!      WHERE __anon__0.code = 'FR'"
//! );
//! ```
//!
//! ## Path syntax
//!
//! - `users.address` follows the `address` foreign key of `users`.
//! - `users.\seller` follows, backwards, every foreign key named `seller`
//!   that points at `users` (here `transactions.seller_id`).
//! - `users.?address` makes the join a LEFT JOIN, and so every join after it.
//! - After a reverse segment, a table name (`addresses.\address.users`)
//!   picks one of several tables owning a foreign key with that name.
//!
//! Joins are cached per query: the same path used in several clauses is
//! joined once. Subqueries are compiled in a scope of their own.

pub mod alias_tree;
pub mod compiler;
pub mod environment;
pub mod error;
pub mod object;
pub mod options;
pub mod path;
pub mod query;
pub mod schema;
pub mod token;

#[cfg(test)]
mod test_schema;

pub use compiler::Compiler;
pub use environment::{Relation, SchemaEnvironment};
pub use error::{CompileError, Result};
pub use options::CompileOptions;
pub use schema::{DatabaseSchema, ForeignKeySchema, TableSchema};
pub use token::PathToken;
