//! SQL text generation.
//!
//! Every AST node implements [`fmt::Display`], so `stmt.to_string()` yields
//! SQL that parses back into the same tree. Parentheses are only added where
//! operator precedence requires them; parentheses written by the user survive
//! as [`Expr::Paren`].

use std::fmt::{self, Display, Write};

use crate::lexer::Keyword;

use super::{
    Expr, FromItem, FunctionCall, JoinClause, Literal, OrderBy, Qualifier, SelectColumn,
    SelectStatement, TableRef, UnaryOp,
};

/// Binding strength used by the printer. Atoms bind tightest.
const ATOM: u8 = u8::MAX;
/// `NOT` sits between `AND` and the comparisons.
const NOT: u8 = 5;
/// `IS`, `IN`, `BETWEEN` and comparisons.
const PREDICATE: u8 = 6;

/// An identifier, double-quoted when it is not a plain word.
#[derive(Debug, Clone, Copy)]
pub struct Ident<'a>(pub &'a str);

impl Ident<'_> {
    fn is_plain(&self) -> bool {
        let mut chars = self.0.chars();
        let starts_well = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        starts_well
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            && Keyword::lookup(self.0).is_none()
    }
}

impl Display for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_plain() {
            f.write_str(self.0)
        } else {
            f.write_char('"')?;
            f.write_str(&self.0.replace('"', "\"\""))?;
            f.write_char('"')
        }
    }
}

/// Writes `items` separated by `sep`.
fn write_list<T: Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_path(f: &mut fmt::Formatter<'_>, segments: &[String]) -> fmt::Result {
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            f.write_char('.')?;
        }
        write!(f, "{}", Ident(segment))?;
    }
    Ok(())
}

impl Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(segments) => write_path(f, segments),
            // Never valid SQL; only seen when printing an unsettled tree.
            Self::Bound(binding) => write!(f, "#{}", binding.0),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Boolean(true) => f.write_str("TRUE"),
            Self::Boolean(false) => f.write_str("FALSE"),
            Self::Null => f.write_str("NULL"),
        }
    }
}

impl Expr {
    /// How tightly this expression holds together when printed next to an
    /// operator.
    const fn binding(&self) -> u8 {
        match self {
            Self::Binary { op, .. } => op.precedence() * 2,
            Self::Unary {
                op: UnaryOp::Not, ..
            } => NOT,
            Self::IsNull { .. }
            | Self::In { .. }
            | Self::InSubquery { .. }
            | Self::Between { .. } => PREDICATE,
            _ => ATOM,
        }
    }
}

/// An operand, wrapped in parentheses when it binds looser than `min`.
struct Operand<'a>(&'a Expr, u8);

impl Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.binding() < self.1 {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

fn not_kw(negated: bool) -> &'static str {
    if negated {
        "NOT "
    } else {
        ""
    }
}

impl Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        write_list(f, &self.args, ", ")?;
        f.write_char(')')
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "{literal}"),
            Self::Column {
                qualifier, name, ..
            } => {
                if let Some(qualifier) = qualifier {
                    write!(f, "{qualifier}.")?;
                }
                write!(f, "{}", Ident(name))
            }
            Self::Binary { left, op, right } => {
                let binding = self.binding();
                // Left-associative: an equal-strength right operand needs parentheses.
                write!(
                    f,
                    "{} {} {}",
                    Operand(left, binding),
                    op.as_str(),
                    Operand(right, binding + 1)
                )
            }
            Self::Unary { op, operand } => match op {
                UnaryOp::Not => write!(f, "NOT {}", Operand(operand, NOT)),
                // `- -1` must not print as the comment marker `--1`.
                UnaryOp::Neg | UnaryOp::BitNot if matches!(**operand, Self::Unary { .. }) => {
                    write!(f, "{} {operand}", op.as_str())
                }
                UnaryOp::Neg | UnaryOp::BitNot => {
                    write!(f, "{}{}", op.as_str(), Operand(operand, ATOM))
                }
            },
            Self::Function(call) => write!(f, "{call}"),
            Self::Subquery(query) => write!(f, "({query})"),
            Self::Exists(query) => write!(f, "EXISTS ({query})"),
            Self::IsNull { expr, negated } => {
                write!(
                    f,
                    "{} IS {}NULL",
                    Operand(expr, PREDICATE),
                    not_kw(*negated)
                )
            }
            Self::In {
                expr,
                list,
                negated,
            } => {
                write!(f, "{} {}IN (", Operand(expr, PREDICATE), not_kw(*negated))?;
                write_list(f, list, ", ")?;
                f.write_char(')')
            }
            Self::InSubquery {
                expr,
                query,
                negated,
            } => write!(
                f,
                "{} {}IN ({query})",
                Operand(expr, PREDICATE),
                not_kw(*negated)
            ),
            Self::Between {
                expr,
                low,
                high,
                negated,
            } => write!(
                f,
                "{} {}BETWEEN {} AND {}",
                Operand(expr, PREDICATE),
                not_kw(*negated),
                Operand(low, PREDICATE + 1),
                Operand(high, PREDICATE + 1)
            ),
            Self::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                f.write_str("CASE")?;
                if let Some(operand) = operand {
                    write!(f, " {operand}")?;
                }
                for (when, then) in when_clauses {
                    write!(f, " WHEN {when} THEN {then}")?;
                }
                if let Some(else_clause) = else_clause {
                    write!(f, " ELSE {else_clause}")?;
                }
                f.write_str(" END")
            }
            Self::Cast { expr, data_type } => write!(f, "CAST({expr} AS {data_type})"),
            Self::Paren(inner) => write!(f, "({inner})"),
            Self::Parameter { name, .. } => match name {
                Some(name) => write!(f, ":{name}"),
                None => f.write_char('?'),
            },
            Self::Wildcard { qualifier } => match qualifier {
                Some(qualifier) => write!(f, "{qualifier}.*"),
                None => f.write_char('*'),
            },
        }
    }
}

impl Display for SelectColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {}", Ident(alias))?;
        }
        Ok(())
    }
}

impl Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table { path, alias } => {
                write_path(f, path)?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", Ident(alias))?;
                }
                Ok(())
            }
            Self::Subquery { query, alias } => write!(f, "({query}) AS {}", Ident(alias)),
        }
    }
}

impl Display for JoinClause {
    /// Writes the ON/USING tail; the join keyword and table are written by
    /// the owning [`FromItem`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(on) = &self.on {
            write!(f, " ON {on}")?;
        }
        if !self.using.is_empty() {
            f.write_str(" USING (")?;
            for (i, column) in self.using.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", Ident(column))?;
            }
            f.write_char(')')?;
        }
        Ok(())
    }
}

impl Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(direction) = self.direction {
            write!(f, " {}", direction.as_str())?;
        }
        if let Some(nulls) = self.nulls {
            write!(f, " {}", nulls.as_str())?;
        }
        Ok(())
    }
}

fn write_from(f: &mut fmt::Formatter<'_>, from: &[FromItem]) -> fmt::Result {
    for (i, item) in from.iter().enumerate() {
        match &item.join {
            Some(join) => write!(f, " {} {}{join}", join.join_type.as_str(), item.table)?,
            None if i == 0 => write!(f, " FROM {}", item.table)?,
            None => write!(f, ", {}", item.table)?,
        }
    }
    Ok(())
}

impl Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        write_list(f, &self.columns, ", ")?;
        write_from(f, &self.from)?;
        if let Some(where_clause) = &self.where_clause {
            write!(f, " WHERE {where_clause}")?;
        }
        if !self.group_by.is_empty() {
            f.write_str(" GROUP BY ")?;
            write_list(f, &self.group_by, ", ")?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {having}")?;
        }
        if !self.order_by.is_empty() {
            f.write_str(" ORDER BY ")?;
            write_list(f, &self.order_by, ", ")?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        if let Some(offset) = &self.offset {
            write!(f, " OFFSET {offset}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Binding, BinaryOp, JoinType};

    #[test]
    fn test_ident_quoting() {
        assert_eq!(Ident("users").to_string(), "users");
        assert_eq!(Ident("__anon__3").to_string(), "__anon__3");
        assert_eq!(Ident("order").to_string(), "\"order\"");
        assert_eq!(Ident("first name").to_string(), "\"first name\"");
        assert_eq!(Ident("\\?address").to_string(), "\"\\?address\"");
        assert_eq!(Ident("a\"b").to_string(), "\"a\"\"b\"");
    }

    #[test]
    fn test_literals() {
        assert_eq!(Literal::String(String::from("it's")).to_string(), "'it''s'");
        assert_eq!(Literal::Float(1.0).to_string(), "1.0");
        assert_eq!(Literal::Null.to_string(), "NULL");
    }

    #[test]
    fn test_precedence_parentheses() {
        let sum = Expr::integer(1).binary(BinaryOp::Add, Expr::integer(2));
        let product = sum.clone().binary(BinaryOp::Mul, Expr::integer(3));
        assert_eq!(product.to_string(), "(1 + 2) * 3");

        let right_nested = Expr::integer(1).binary(BinaryOp::Sub, sum);
        assert_eq!(right_nested.to_string(), "1 - (1 + 2)");

        let disjunction = Expr::column("a").or(Expr::column("b"));
        let conjunction = disjunction.and(Expr::column("c"));
        assert_eq!(conjunction.to_string(), "(a OR b) AND c");
    }

    #[test]
    fn test_not_operand() {
        let not_and = Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::column("a").and(Expr::column("b"))),
        };
        assert_eq!(not_and.to_string(), "NOT (a AND b)");

        let not_eq = Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::column("a").eq(Expr::integer(1))),
        };
        assert_eq!(not_eq.to_string(), "NOT a = 1");
    }

    #[test]
    fn test_bound_qualifier_is_visible() {
        let column = Expr::bound_column(Binding(4), "id");
        assert_eq!(column.to_string(), "#4.id");
    }

    #[test]
    fn test_select_with_joins() {
        let users = Expr::qualified_column("users", "address_id");
        let addresses = Expr::qualified_column("a", "id");
        let stmt = SelectStatement {
            columns: vec![SelectColumn::new(Expr::Wildcard {
                qualifier: Some(Qualifier::name("users")),
            })],
            from: vec![
                FromItem::new(TableRef::table("users")),
                FromItem::joined(
                    TableRef::table("addresses").alias("a"),
                    JoinClause::on(JoinType::Left, users.eq(addresses)),
                ),
                FromItem::new(TableRef::table("countries")),
            ],
            ..SelectStatement::default()
        };
        assert_eq!(
            stmt.to_string(),
            "SELECT users.* FROM users LEFT JOIN addresses AS a ON users.address_id = a.id, countries"
        );
    }
}
