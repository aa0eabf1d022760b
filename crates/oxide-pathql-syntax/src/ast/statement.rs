//! The SELECT statement and its FROM clause.

use super::expression::Expr;

/// `ASC` or `DESC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// `NULLS FIRST` or `NULLS LAST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullOrdering {
    First,
    Last,
}

impl NullOrdering {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::First => "NULLS FIRST",
            Self::Last => "NULLS LAST",
        }
    }
}

/// One ORDER BY term.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub expr: Expr,
    /// The direction, when written explicitly.
    pub direction: Option<OrderDirection>,
    pub nulls: Option<NullOrdering>,
}

/// How a FROM item is joined. A bare `JOIN` parses as [`JoinType::Inner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }

    /// LEFT for a hop whose target may be missing, INNER otherwise.
    #[must_use]
    pub const fn for_nullability(nullable: bool) -> Self {
        if nullable {
            Self::Left
        } else {
            Self::Inner
        }
    }
}

/// The join part of a FROM item.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    /// `None` for CROSS joins, USING joins and auto-joins written without
    /// a condition.
    pub on: Option<Expr>,
    /// `USING (a, b)` columns.
    pub using: Vec<String>,
}

impl JoinClause {
    /// A join with an ON condition.
    #[must_use]
    pub const fn on(join_type: JoinType, on: Expr) -> Self {
        Self {
            join_type,
            on: Some(on),
            using: Vec::new(),
        }
    }
}

/// A table reference in a FROM item.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    /// A table name or a dotted object path (`users.address`).
    Table {
        /// Path segments. A single segment names a table or alias.
        path: Vec<String>,
        alias: Option<String>,
    },
    /// A derived table, `(SELECT ...) AS name`.
    Subquery {
        query: Box<SelectStatement>,
        /// Required by the grammar.
        alias: String,
    },
}

impl TableRef {
    /// A one-segment table reference.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table {
            path: vec![name.into()],
            alias: None,
        }
    }

    /// Replaces the alias.
    #[must_use]
    pub fn alias(self, alias: impl Into<String>) -> Self {
        match self {
            Self::Table { path, .. } => Self::Table {
                path,
                alias: Some(alias.into()),
            },
            Self::Subquery { query, .. } => Self::Subquery {
                query,
                alias: alias.into(),
            },
        }
    }
}

/// One entry of a FROM clause: the first table, a comma-separated table, or
/// a joined table.
#[derive(Debug, Clone, PartialEq)]
pub struct FromItem {
    pub table: TableRef,
    /// How the table is joined; `None` for the first item and for
    /// comma-separated items.
    pub join: Option<JoinClause>,
}

impl FromItem {
    /// A FROM item that is not joined.
    #[must_use]
    pub const fn new(table: TableRef) -> Self {
        Self { table, join: None }
    }

    /// A joined FROM item.
    #[must_use]
    pub const fn joined(table: TableRef, join: JoinClause) -> Self {
        Self {
            table,
            join: Some(join),
        }
    }
}

/// A SELECT statement, before or after path compilation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    pub distinct: bool,
    /// Never empty once parsed.
    pub columns: Vec<SelectColumn>,
    /// The FROM clause, in source order.
    pub from: Vec<FromItem>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
}

/// One entry of the select list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub expr: Expr,
    /// `AS name`
    pub alias: Option<String>,
}

impl SelectColumn {
    /// An entry without an alias.
    #[must_use]
    pub const fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    /// An entry with an alias.
    #[must_use]
    pub fn with_alias(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }
}
