//! Parser for the SELECT dialect.
//!
//! Clauses are read by recursive descent and expressions by a Pratt loop
//! whose operator table lives in `pratt`.

mod error;
mod parser;
mod pratt;

pub use error::ParseError;
pub use parser::Parser;
