//! Hand-written lexer for the SELECT dialect.
//!
//! Path segments may start with a reverse marker (`\`) and a nullable
//! marker (`?`). Both stay part of the identifier text, which is how the
//! compiler reads them back.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::{Lexer, NULLABLE_MARKER, REVERSE_MARKER};
