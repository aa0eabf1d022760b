//! Errors reported while reading a query.

use std::fmt;

use crate::lexer::{Span, TokenKind};

/// Why and where a query could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    /// Points at the offending token; empty at the end of input.
    pub span: Span,
    /// What the grammar allowed here, for "unexpected token" errors.
    pub expected: Option<String>,
    pub found: Option<TokenKind>,
}

impl ParseError {
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            expected: None,
            found: None,
        }
    }

    /// `found` where `expected` was required. A lexer error token reports
    /// its own reason instead.
    #[must_use]
    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        let expected: String = expected.into();
        let message = match &found {
            TokenKind::Eof => format!("Unexpected end of input: expected {expected}"),
            TokenKind::Error(reason) => reason.clone(),
            other => format!("Unexpected token: expected {expected}, found {other}"),
        };
        Self {
            message,
            span,
            expected: Some(expected),
            found: Some(found),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message, self.span)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Keyword;

    #[test]
    fn test_unexpected_token_is_named() {
        let err = ParseError::unexpected(
            "identifier",
            TokenKind::Keyword(Keyword::From),
            Span::new(7, 11),
        );
        assert_eq!(
            err.to_string(),
            "Unexpected token: expected identifier, found FROM at position 7..11"
        );
    }

    #[test]
    fn test_unexpected_eof_message() {
        let err = ParseError::unexpected("identifier", TokenKind::Eof, Span::new(4, 4));
        assert_eq!(
            err.to_string(),
            "Unexpected end of input: expected identifier at position 4..4"
        );
    }

    #[test]
    fn test_lexer_error_is_reported_verbatim() {
        let err = ParseError::unexpected(
            "expression",
            TokenKind::Error(String::from("Unterminated string literal")),
            Span::new(0, 3),
        );
        assert_eq!(err.message, "Unterminated string literal");
        assert_eq!(err.expected.as_deref(), Some("expression"));
    }
}
