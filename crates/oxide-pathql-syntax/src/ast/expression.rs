//! Expressions, whose column qualifiers may be object paths.

use crate::lexer::Span;

use super::{DataType, SelectStatement};

/// A constant written in the query.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    /// Unescaped contents of a single-quoted string.
    String(String),
    /// `TRUE` or `FALSE`
    Boolean(bool),
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    And,
    Or,

    /// `||`
    Concat,
    Like,
    NotLike,

    BitAnd,
    BitOr,
    LeftShift,
    RightShift,
}

impl BinaryOp {
    /// The operator as printed.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Concat => "||",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
        }
    }

    /// Binding level; a higher level binds tighter.
    ///
    /// The parser derives its binding powers from this, and the printer uses
    /// it to decide where parentheses are needed.
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq
            | Self::NotEq
            | Self::Lt
            | Self::LtEq
            | Self::Gt
            | Self::GtEq
            | Self::Like
            | Self::NotLike => 3,
            Self::BitOr => 5,
            Self::BitAnd => 6,
            Self::LeftShift | Self::RightShift => 7,
            Self::Add | Self::Sub | Self::Concat => 8,
            Self::Mul | Self::Div | Self::Mod => 9,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Neg,
    Not,
    /// `~`
    BitNot,
}

impl UnaryOp {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "NOT",
            Self::BitNot => "~",
        }
    }
}

/// A back-reference from a column to the query object it was resolved to.
///
/// The number is an index into the arena of the scope that produced it and
/// means nothing outside that scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Binding(pub usize);

/// The part of a column reference in front of the column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    /// Dotted segments as written, e.g. `["users", "address"]` for
    /// `users.address.city`.
    Path(Vec<String>),
    /// Resolved to a query object; printed only after being settled back
    /// into a [`Qualifier::Path`].
    Bound(Binding),
}

impl Qualifier {
    /// Creates a single-segment qualifier.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Path(vec![name.into()])
    }

    /// Returns the written segments, or `None` once bound.
    #[must_use]
    pub fn segments(&self) -> Option<&[String]> {
        match self {
            Self::Path(segments) => Some(segments),
            Self::Bound(_) => None,
        }
    }
}

/// `name([DISTINCT] args)`. Function names are not interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub distinct: bool,
}

/// An expression. Column qualifiers may be object paths until compiled.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),

    /// `name`, `alias.name` or `path.to.name`.
    Column {
        qualifier: Option<Qualifier>,
        name: String,
        /// The whole dotted reference; default for synthesized columns.
        span: Span,
    },

    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    Function(FunctionCall),

    /// `(SELECT ...)` used as a value. Compiled in its own scope.
    Subquery(Box<SelectStatement>),

    /// `EXISTS (SELECT ...)`
    Exists(Box<SelectStatement>),

    /// `IS [NOT] NULL`
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },

    /// `[NOT] IN (a, b, ...)`
    In {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },

    /// `[NOT] IN (SELECT ...)`
    InSubquery {
        expr: Box<Expr>,
        query: Box<SelectStatement>,
        negated: bool,
    },

    /// `[NOT] BETWEEN low AND high`
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },

    /// `CASE [operand] WHEN .. THEN .. [ELSE ..] END`
    Case {
        operand: Option<Box<Expr>>,
        /// `(condition, result)` pairs.
        when_clauses: Vec<(Expr, Expr)>,
        else_clause: Option<Box<Expr>>,
    },

    /// `CAST(expr AS type)`
    Cast {
        expr: Box<Expr>,
        data_type: DataType,
    },

    /// Parentheses kept from the source text.
    Paren(Box<Expr>),

    /// A `?` or `:name` placeholder, passed through to the output.
    Parameter {
        /// `None` for `?`.
        name: Option<String>,
        /// 1-based index of a `?`; 0 for named placeholders.
        position: usize,
    },

    /// `*`, `users.*` or `users.address.*`.
    Wildcard {
        qualifier: Option<Qualifier>,
    },
}

impl Expr {
    /// An unqualified column.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column {
            qualifier: None,
            name: name.into(),
            span: Span::default(),
        }
    }

    /// A column behind a one-segment qualifier.
    #[must_use]
    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Column {
            qualifier: Some(Qualifier::name(table)),
            name: name.into(),
            span: Span::default(),
        }
    }

    /// A column resolved to a query object.
    #[must_use]
    pub fn bound_column(binding: Binding, name: impl Into<String>) -> Self {
        Self::Column {
            qualifier: Some(Qualifier::Bound(binding)),
            name: name.into(),
            span: Span::default(),
        }
    }

    /// An integer literal.
    #[must_use]
    pub const fn integer(value: i64) -> Self {
        Self::Literal(Literal::Integer(value))
    }

    /// `self op right`
    #[must_use]
    pub fn binary(self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    /// `self = right`
    #[must_use]
    pub fn eq(self, right: Self) -> Self {
        self.binary(BinaryOp::Eq, right)
    }

    /// `self > right`
    #[must_use]
    pub fn gt(self, right: Self) -> Self {
        self.binary(BinaryOp::Gt, right)
    }

    /// `self AND right`
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        self.binary(BinaryOp::And, right)
    }

    /// `self OR right`
    #[must_use]
    pub fn or(self, right: Self) -> Self {
        self.binary(BinaryOp::Or, right)
    }

    /// Combines predicates with AND, left to right.
    ///
    /// Returns `None` for an empty iterator.
    #[must_use]
    pub fn conjunction(predicates: impl IntoIterator<Item = Self>) -> Option<Self> {
        predicates.into_iter().reduce(Self::and)
    }

    /// Returns the direct sub-expressions. Subqueries are not entered; the
    /// operand of `IN (subquery)` is returned.
    pub fn children_mut(&mut self) -> Vec<&mut Self> {
        match self {
            Self::Literal(_)
            | Self::Column { .. }
            | Self::Subquery(_)
            | Self::Exists(_)
            | Self::Parameter { .. }
            | Self::Wildcard { .. } => Vec::new(),
            Self::Binary { left, right, .. } => vec![left.as_mut(), right.as_mut()],
            Self::Unary { operand, .. } => vec![operand.as_mut()],
            Self::Function(call) => call.args.iter_mut().collect(),
            Self::IsNull { expr, .. }
            | Self::InSubquery { expr, .. }
            | Self::Cast { expr, .. }
            | Self::Paren(expr) => vec![expr.as_mut()],
            Self::In { expr, list, .. } => std::iter::once(expr.as_mut())
                .chain(list.iter_mut())
                .collect(),
            Self::Between { expr, low, high, .. } => {
                vec![expr.as_mut(), low.as_mut(), high.as_mut()]
            }
            Self::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                let mut children = Vec::new();
                if let Some(operand) = operand {
                    children.push(operand.as_mut());
                }
                for (condition, result) in when_clauses {
                    children.push(condition);
                    children.push(result);
                }
                if let Some(else_clause) = else_clause {
                    children.push(else_clause.as_mut());
                }
                children
            }
        }
    }
}
