//! Rewrites a parsed query so every dotted path becomes a join.

use std::sync::Arc;

use oxide_pathql_syntax::ast::{
    Expr, FromItem, JoinClause, JoinType, Qualifier, SelectStatement, TableRef,
};
use tracing::{debug, trace};

use crate::environment::SchemaEnvironment;
use crate::error::{CompileError, Result};
use crate::object::AliasGenerator;
use crate::options::CompileOptions;
use crate::query::QueryBuilder;
use crate::schema::DatabaseSchema;
use crate::token::PathToken;

/// Compiles object-path queries against one schema.
///
/// Cheap to clone; clones share the schema environment.
#[derive(Debug, Clone)]
pub struct Compiler {
    env: Arc<SchemaEnvironment>,
    options: CompileOptions,
}

impl Compiler {
    /// Creates a compiler with default options.
    #[must_use]
    pub fn new(schema: DatabaseSchema) -> Self {
        Self::with_options(schema, CompileOptions::default())
    }

    /// Creates a compiler with the given options.
    #[must_use]
    pub fn with_options(schema: DatabaseSchema, options: CompileOptions) -> Self {
        Self::from_environment(Arc::new(SchemaEnvironment::new(schema)), options)
    }

    /// Creates a compiler over an existing environment.
    #[must_use]
    pub const fn from_environment(env: Arc<SchemaEnvironment>, options: CompileOptions) -> Self {
        Self { env, options }
    }

    /// The schema environment.
    #[must_use]
    pub fn environment(&self) -> &SchemaEnvironment {
        &self.env
    }

    /// The options.
    #[must_use]
    pub const fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Parses, compiles and prints a query.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::Parse` for invalid SQL, or the error of the
    /// first path that cannot be compiled.
    pub fn compile(&self, query: &str) -> Result<String> {
        debug!(query = %query, "Compiling query");
        let statement = oxide_pathql_syntax::parse(query)?;
        let sql = self.compile_statement(statement)?.to_string();
        debug!(sql = %sql, "Compiled query");
        Ok(sql)
    }

    /// Compiles a parsed query.
    ///
    /// # Errors
    ///
    /// Returns the error of the first path that cannot be compiled.
    pub fn compile_statement(&self, statement: SelectStatement) -> Result<SelectStatement> {
        let compilation = Compilation {
            env: &self.env,
            options: &self.options,
            aliases: AliasGenerator::new(self.options.anonymous_prefix.clone()),
        };
        compilation.compile_query(statement)
    }
}

/// State shared by all scopes of one compile.
struct Compilation<'c> {
    env: &'c SchemaEnvironment,
    options: &'c CompileOptions,
    aliases: AliasGenerator,
}

impl Compilation<'_> {
    fn compile_query(&self, statement: SelectStatement) -> Result<SelectStatement> {
        let SelectStatement {
            distinct,
            columns,
            from,
            where_clause,
            group_by,
            having,
            order_by,
            limit,
            offset,
        } = statement;
        let mut query = QueryBuilder::new(self.env, self.options, &self.aliases);
        query.set_distinct(distinct);

        // FROM first: it declares the roots the other clauses navigate from.
        for item in from {
            self.from_item(item, &mut query)?;
        }
        for mut column in columns {
            self.rewrite(&mut column.expr, &mut query)?;
            query.select(column);
        }
        if let Some(mut predicate) = where_clause {
            self.rewrite(&mut predicate, &mut query)?;
            query.filter(predicate);
        }
        for mut order in order_by {
            self.rewrite(&mut order.expr, &mut query)?;
            query.order_by(order);
        }
        for mut expr in group_by {
            self.rewrite(&mut expr, &mut query)?;
            query.group_by(expr);
        }
        if let Some(mut predicate) = having {
            self.rewrite(&mut predicate, &mut query)?;
            query.having(predicate);
        }
        if let Some(mut expr) = limit {
            self.rewrite(&mut expr, &mut query)?;
            query.limit(expr);
        }
        if let Some(mut expr) = offset {
            self.rewrite(&mut expr, &mut query)?;
            query.offset(expr);
        }

        trace!(tree = %query.tree(), "Resolved scope");
        Ok(query.to_statement())
    }

    fn from_item(&self, item: FromItem, query: &mut QueryBuilder<'_>) -> Result<()> {
        let FromItem { table, join } = item;
        match table {
            TableRef::Table { path, alias } if path.len() > 1 => {
                self.auto_join(path, alias, join, query)
            }
            TableRef::Table { path, alias } => {
                let name = alias
                    .as_ref()
                    .or_else(|| path.first())
                    .cloned()
                    .unwrap_or_default();
                let known = path
                    .first()
                    .filter(|table| self.env.table(table).is_some())
                    .cloned();
                let nullable = outer_join_nullability(join.as_ref(), query);
                let object = query.declare(known, &name, nullable)?;
                let join = self.join_condition(join, query)?;
                query.push_from(
                    object,
                    FromItem {
                        table: TableRef::Table { path, alias },
                        join,
                    },
                );
                Ok(())
            }
            TableRef::Subquery {
                query: subquery,
                alias,
            } => {
                let compiled = self.compile_query(*subquery)?;
                let nullable = outer_join_nullability(join.as_ref(), query);
                let object = query.declare(None, &alias, nullable)?;
                let join = self.join_condition(join, query)?;
                query.push_from(
                    object,
                    FromItem {
                        table: TableRef::Subquery {
                            query: Box::new(compiled),
                            alias,
                        },
                        join,
                    },
                );
                Ok(())
            }
        }
    }

    fn join_condition(
        &self,
        join: Option<JoinClause>,
        query: &mut QueryBuilder<'_>,
    ) -> Result<Option<JoinClause>> {
        let Some(mut join) = join else {
            return Ok(None);
        };
        if let Some(on) = join.on.as_mut() {
            self.rewrite(on, query)?;
        }
        Ok(Some(join))
    }

    /// A FROM item whose table is a path. Its joins are synthesized in place
    /// of the item; a user ON condition is ANDed onto the join that
    /// materialized the path's last object, even one an earlier path created.
    fn auto_join(
        &self,
        mut path: Vec<String>,
        alias: Option<String>,
        join: Option<JoinClause>,
        query: &mut QueryBuilder<'_>,
    ) -> Result<()> {
        let full = path.join(".");
        let last = path.last().cloned().unwrap_or_default();
        let unsupported = |feature: &str| CompileError::UnsupportedFeature {
            feature: String::from(feature),
            segment: last.clone(),
            path: full.clone(),
        };

        let mut on = None;
        if let Some(join) = join {
            if !join.using.is_empty() {
                return Err(unsupported("USING on an auto-join"));
            }
            match join.join_type {
                JoinType::Inner => {}
                // An outer auto-join keeps rows whose first hop is missing,
                // which is the same as marking the first hop nullable.
                JoinType::Left => {
                    let first = path[1]
                        .parse::<PathToken>()
                        .map_err(|e| e.in_path(&full))?;
                    path[1] = first.nullable(true).to_string();
                }
                other => {
                    return Err(unsupported(&format!("{} on an auto-join", other.as_str())));
                }
            }
            on = join.on;
        }

        let object = query.resolve(&path, alias.as_deref())?;
        if let Some(mut predicate) = on {
            self.rewrite(&mut predicate, query)?;
            if !query.extend_join(object, predicate) {
                return Err(unsupported("ON clause on a path without a join"));
            }
        }
        Ok(())
    }

    fn rewrite(&self, expr: &mut Expr, query: &mut QueryBuilder<'_>) -> Result<()> {
        match expr {
            Expr::Column { qualifier, .. } | Expr::Wildcard { qualifier } => {
                if let Some(Qualifier::Path(segments)) = qualifier {
                    let object = query.resolve(segments, None)?;
                    *qualifier = Some(Qualifier::Bound(object.into()));
                }
                Ok(())
            }
            Expr::Subquery(subquery) | Expr::Exists(subquery) => self.nested(subquery),
            Expr::InSubquery {
                expr,
                query: subquery,
                ..
            } => {
                self.rewrite(expr, query)?;
                self.nested(subquery)
            }
            _ => expr
                .children_mut()
                .into_iter()
                .try_for_each(|child| self.rewrite(child, query)),
        }
    }

    /// Compiles a subquery in a scope of its own.
    fn nested(&self, subquery: &mut SelectStatement) -> Result<()> {
        let statement = std::mem::take(subquery);
        *subquery = self.compile_query(statement)?;
        Ok(())
    }
}

/// Applies the nullability an outer join introduces. A RIGHT or FULL join
/// makes everything already in scope nullable. Returns whether the joined
/// table itself is (LEFT or FULL).
fn outer_join_nullability(join: Option<&JoinClause>, query: &mut QueryBuilder<'_>) -> bool {
    let join_type = join.map(|join| join.join_type);
    if matches!(join_type, Some(JoinType::Right | JoinType::Full)) {
        query.mark_all_nullable();
    }
    matches!(join_type, Some(JoinType::Left | JoinType::Full))
}
