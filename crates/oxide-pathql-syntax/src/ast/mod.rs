//! Abstract Syntax Tree (AST) types for SQL SELECT statements.
//!
//! Column and table references keep their dotted object paths intact; the
//! compiler rewrites them into joins before printing.

mod display;
mod expression;
mod statement;
mod types;

pub use display::Ident;
pub use expression::{BinaryOp, Binding, Expr, FunctionCall, Literal, Qualifier, UnaryOp};
pub use statement::{
    FromItem, JoinClause, JoinType, NullOrdering, OrderBy, OrderDirection, SelectColumn,
    SelectStatement, TableRef,
};
pub use types::DataType;
