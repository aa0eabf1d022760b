//! Operator table for the Pratt expression parser.
//!
//! Binding powers come from [`BinaryOp::precedence`], which the printer also
//! uses, so a printed tree re-parses to the same shape.

use crate::ast::{BinaryOp, UnaryOp};
use crate::lexer::{Keyword, TokenKind};

/// Precedence level of comparisons and the keyword predicates.
const PREDICATE: u8 = 3;
/// Above every binary operator.
const SIGN: u8 = 10;

/// Something that can follow a complete operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infix {
    Binary(BinaryOp),
    /// `IS [NOT] NULL`
    Is,
    /// `IN (list)` or `IN (SELECT ...)`
    In,
    /// `BETWEEN low AND high`
    Between,
    /// `NOT`, only as the start of `NOT IN`, `NOT BETWEEN` or `NOT LIKE`.
    Not,
}

impl Infix {
    /// Reads the operator at `kind`, if any.
    #[must_use]
    pub const fn at(kind: &TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Keyword(Keyword::Is) => return Some(Self::Is),
            TokenKind::Keyword(Keyword::In) => return Some(Self::In),
            TokenKind::Keyword(Keyword::Between) => return Some(Self::Between),
            TokenKind::Keyword(Keyword::Not) => return Some(Self::Not),
            TokenKind::Keyword(Keyword::Or) => BinaryOp::Or,
            TokenKind::Keyword(Keyword::And) => BinaryOp::And,
            TokenKind::Keyword(Keyword::Like) => BinaryOp::Like,
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::BitOr => BinaryOp::BitOr,
            TokenKind::BitAnd => BinaryOp::BitAnd,
            TokenKind::LeftShift => BinaryOp::LeftShift,
            TokenKind::RightShift => BinaryOp::RightShift,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Concat => BinaryOp::Concat,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            _ => return None,
        };
        Some(Self::Binary(op))
    }

    /// `(left, right)` binding powers. Every operator is left-associative.
    #[must_use]
    pub const fn binding_power(self) -> (u8, u8) {
        let level = match self {
            Self::Binary(op) => op.precedence(),
            Self::Is | Self::In | Self::Between | Self::Not => PREDICATE,
        };
        (level * 2 - 1, level * 2)
    }
}

/// Reads a prefix operator and the binding power of its operand.
///
/// `NOT` binds looser than the comparisons and tighter than `AND`, so
/// `NOT a = b AND c` reads as `(NOT (a = b)) AND c`.
#[must_use]
pub const fn prefix(kind: &TokenKind) -> Option<(UnaryOp, u8)> {
    match kind {
        TokenKind::Keyword(Keyword::Not) => Some((UnaryOp::Not, PREDICATE * 2 - 1)),
        TokenKind::Minus => Some((UnaryOp::Neg, SIGN * 2)),
        TokenKind::BitNot => Some((UnaryOp::BitNot, SIGN * 2)),
        _ => None,
    }
}
