//! Per-scope query state: objects, the alias cache and output fragments.

use oxide_pathql_syntax::ast::{
    Expr, FromItem, JoinClause, JoinType, OrderBy, Qualifier, SelectColumn, SelectStatement,
    TableRef,
};
use tracing::{debug, trace};

use crate::alias_tree::{AliasTree, TreeDisplay};
use crate::environment::SchemaEnvironment;
use crate::error::{CompileError, Result};
use crate::object::{AliasGenerator, ObjectArena, ObjectId, QueryObject};
use crate::options::CompileOptions;
use crate::path::{Hop, ResolutionPath};
use crate::token::PathToken;

/// A join the builder synthesized for one hop.
#[derive(Debug, Clone)]
struct JoinFragment {
    object: ObjectId,
    join_type: JoinType,
    /// Predicates combined with AND; columns are bound to objects.
    on: Vec<Expr>,
}

#[derive(Debug, Clone)]
enum FromEntry {
    /// A FROM item written by the user.
    Given { object: ObjectId, item: FromItem },
    /// A table brought in by the first path of a query without FROM.
    Import(ObjectId),
    Join(JoinFragment),
}

impl FromEntry {
    const fn object(&self) -> ObjectId {
        match self {
            Self::Given { object, .. } | Self::Import(object) => *object,
            Self::Join(join) => join.object,
        }
    }

    /// Whether the entry opens a comma-separated group of the FROM clause.
    const fn starts_group(&self) -> bool {
        match self {
            Self::Given { item, .. } => item.join.is_none(),
            Self::Import(_) => true,
            Self::Join(_) => false,
        }
    }
}

/// State of one query scope.
///
/// Paths are resolved against the scope's [`AliasTree`]; joins that are
/// missing are synthesized and cached. Columns keep a binding to their
/// object until [`to_statement`](Self::to_statement) settles them into
/// aliases, so an alias promoted late is still printed everywhere.
#[derive(Debug)]
pub struct QueryBuilder<'c> {
    env: &'c SchemaEnvironment,
    options: &'c CompileOptions,
    aliases: &'c AliasGenerator,
    tree: AliasTree,
    arena: ObjectArena,
    from: Vec<FromEntry>,
    /// Every clause but FROM.
    output: SelectStatement,
}

impl<'c> QueryBuilder<'c> {
    /// Creates an empty scope.
    #[must_use]
    pub fn new(
        env: &'c SchemaEnvironment,
        options: &'c CompileOptions,
        aliases: &'c AliasGenerator,
    ) -> Self {
        Self {
            env,
            options,
            aliases,
            tree: AliasTree::new(),
            arena: ObjectArena::new(),
            from: Vec::new(),
            output: SelectStatement::default(),
        }
    }

    /// Registers a named table instance under `name`.
    ///
    /// `table` is `None` for derived tables and tables the schema does not
    /// know; paths cannot be followed from such objects. Paths followed from
    /// a `nullable` object are LEFT joined.
    ///
    /// # Errors
    ///
    /// `DuplicateAlias` if another named object of the scope is called
    /// `name`.
    pub fn declare(
        &mut self,
        table: Option<String>,
        name: &str,
        nullable: bool,
    ) -> Result<ObjectId> {
        self.claim(name, name)?;
        debug!(alias = %name, table = ?table, nullable, "Declared table");
        let id = self
            .arena
            .insert(QueryObject::named(table, name).with_nullable(nullable));
        self.tree.add(name, AliasTree::with_object(id));
        Ok(id)
    }

    /// Marks every object of the scope as possibly missing. A RIGHT or FULL
    /// join preserves the rows of the table it adds, so everything to its
    /// left may be NULL.
    pub fn mark_all_nullable(&mut self) {
        for object in self.arena.iter_mut() {
            object.mark_nullable();
        }
    }

    /// Frees `name` for a user alias. A generated identifier holding it is
    /// replaced.
    fn claim(&mut self, name: &str, path: &str) -> Result<()> {
        let Some(holder) = self.arena.find_identifier(name) else {
            return Ok(());
        };
        if !self.arena.get(holder).is_some_and(QueryObject::is_anonymous) {
            return Err(CompileError::DuplicateAlias {
                segment: String::from(name),
                path: String::from(path),
            });
        }
        let identifier = self.fresh_identifier();
        trace!(alias = %name, replacement = %identifier, "Moved generated alias");
        if let Some(object) = self.arena.get_mut(holder) {
            object.rename(identifier);
        }
        Ok(())
    }

    /// The next generated identifier that no object of the scope uses.
    fn fresh_identifier(&self) -> String {
        loop {
            let identifier = self.aliases.next_identifier();
            if self.arena.find_identifier(&identifier).is_none() {
                return identifier;
            }
            trace!(alias = %identifier, "Skipped generated alias already in use");
        }
    }

    /// Adds a bare FROM entry for `object`.
    pub fn import(&mut self, object: ObjectId) {
        debug!(table = ?self.arena.get(object).and_then(QueryObject::table), "Imported table");
        self.from.push(FromEntry::Import(object));
    }

    /// Resolves a dotted path to the object it designates, synthesizing
    /// the joins that do not exist yet.
    ///
    /// `segments` starts with an alias or table name. `name`, if given,
    /// becomes the alias of the terminal object.
    ///
    /// # Errors
    ///
    /// - `UnknownIdentifier` if the first segment is neither a known alias
    ///   nor a table that can be imported
    /// - `AliasConflict` if the terminal object already has another alias
    /// - `DuplicateAlias` if another named object is called `name`
    /// - any error of [`PathToken`] parsing or [`ResolutionPath::resolve`]
    pub fn resolve(&mut self, segments: &[String], name: Option<&str>) -> Result<ObjectId> {
        let path = segments.join(".");
        let Some((first, rest)) = segments.split_first() else {
            return Err(CompileError::UnresolvableProperty {
                segment: String::new(),
                path,
            });
        };

        let root_path = self.root(first, &path)?;
        let root = self
            .tree
            .get(&root_path)
            .and_then(AliasTree::object)
            .ok_or_else(|| CompileError::UnknownIdentifier {
                segment: first.clone(),
                path: path.clone(),
            })?;
        if rest.is_empty() {
            return Ok(root);
        }

        let tokens = rest
            .iter()
            .map(|segment| segment.parse::<PathToken>().map_err(|e| e.in_path(&path)))
            .collect::<Result<Vec<_>>>()?;

        let (table, nullable) = match self.arena.get(root) {
            Some(object) => match object.table() {
                Some(table) => (table.to_owned(), object.is_nullable()),
                None => {
                    return Err(CompileError::UnresolvableProperty {
                        segment: rest[0].clone(),
                        path,
                    })
                }
            },
            None => {
                return Err(CompileError::UnknownIdentifier {
                    segment: first.clone(),
                    path,
                })
            }
        };
        let hops = ResolutionPath::new(self.env, table, nullable, self.options)
            .resolve(&tokens, &path)?;
        let keys: Vec<String> = hops.iter().map(Hop::key).collect();

        let (reused, consumed) = match self.tree.get(&root_path) {
            Some(node) => {
                let (node, consumed) = node.deepest(&keys);
                (node.object().unwrap_or(root), consumed)
            }
            None => (root, 0),
        };
        if consumed > 0 {
            trace!(path = %path, reused = consumed, "Reusing joins");
        }

        let mut parent = reused;
        let mut created = Vec::with_capacity(hops.len() - consumed);
        for hop in &hops[consumed..] {
            let object = self.arena.insert(QueryObject::anonymous(
                hop.target_table(),
                self.fresh_identifier(),
                hop.is_nullable(),
            ));
            self.join(object, parent, hop);
            created.push(object);
            parent = object;
        }

        if !created.is_empty() {
            let mut node_path = root_path;
            node_path.extend_from_slice(&keys[..consumed]);
            if let Some(mut node) = self.tree.get_mut(&node_path) {
                for (key, object) in keys[consumed..].iter().zip(&created) {
                    node = node.add(key.clone(), AliasTree::with_object(*object));
                }
            }
        }

        if let Some(name) = name {
            self.promote(parent, name, &path)?;
        }
        Ok(parent)
    }

    /// Gives the terminal object of `path` the user alias `name`.
    fn promote(&mut self, object: ObjectId, name: &str, path: &str) -> Result<()> {
        let Some(existing) = self.arena.get(object) else {
            return Ok(());
        };
        if !existing.is_anonymous() {
            if existing.identifier() == name {
                return Ok(());
            }
            return Err(CompileError::AliasConflict {
                segment: String::from(name),
                path: String::from(path),
                existing: String::from(existing.identifier()),
            });
        }
        self.claim(name, path)?;
        if let Some(target) = self.arena.get_mut(object) {
            target.promote(name);
        }
        debug!(path = %path, alias = %name, "Promoted alias");
        Ok(())
    }

    /// Finds the tree path of the object a leading segment names, importing
    /// the table if the scope is still empty.
    fn root(&mut self, first: &str, path: &str) -> Result<Vec<String>> {
        if self.tree.child(first).is_some() {
            return Ok(vec![String::from(first)]);
        }
        if let Some(found) = self.tree.find(first, &self.arena) {
            trace!(alias = %first, depth = found.len(), "Found alias");
            return Ok(found);
        }
        if !self.tree.is_empty() || self.env.table(first).is_none() {
            return Err(CompileError::UnknownIdentifier {
                segment: String::from(first),
                path: String::from(path),
            });
        }
        let object = self.declare(Some(String::from(first)), first, false)?;
        self.import(object);
        Ok(vec![String::from(first)])
    }

    fn join(&mut self, object: ObjectId, parent: ObjectId, hop: &Hop<'_>) {
        let on = hop
            .relation()
            .column_pairs()
            .map(|(local, referenced)| {
                if hop.is_reverse() {
                    Expr::bound_column(parent.into(), referenced)
                        .eq(Expr::bound_column(object.into(), local))
                } else {
                    Expr::bound_column(parent.into(), local)
                        .eq(Expr::bound_column(object.into(), referenced))
                }
            })
            .collect();
        let join_type = JoinType::for_nullability(hop.is_nullable());
        let index = self.insertion_point(parent);

        debug!(
            hop = %hop,
            alias = ?self.arena.identifier(object),
            join = join_type.as_str(),
            position = index,
            "Synthesized join"
        );
        self.from.insert(
            index,
            FromEntry::Join(JoinFragment {
                object,
                join_type,
                on,
            }),
        );
    }

    /// Where a join hanging off `parent` goes: the end of the
    /// comma-separated group that holds `parent`, so its ON clause only
    /// names tables already in scope.
    fn insertion_point(&self, parent: ObjectId) -> usize {
        let Some(start) = self.from.iter().position(|entry| entry.object() == parent) else {
            return self.from.len();
        };
        self.from[start + 1..]
            .iter()
            .position(FromEntry::starts_group)
            .map_or(self.from.len(), |offset| start + 1 + offset)
    }

    fn join_mut(&mut self, object: ObjectId) -> Option<&mut JoinFragment> {
        self.from.iter_mut().find_map(|entry| match entry {
            FromEntry::Join(join) if join.object == object => Some(join),
            _ => None,
        })
    }

    /// ANDs `predicate` onto the ON clause of the join that materialized
    /// `object`.
    ///
    /// Returns `false` if no join materialized it (declared or imported
    /// tables).
    pub fn extend_join(&mut self, object: ObjectId, predicate: Expr) -> bool {
        let Some(join) = self.join_mut(object) else {
            return false;
        };
        join.on.push(predicate);
        true
    }

    /// Returns whether a join materialized `object`.
    #[must_use]
    pub fn is_joined(&self, object: ObjectId) -> bool {
        self.from
            .iter()
            .any(|entry| matches!(entry, FromEntry::Join(join) if join.object == object))
    }

    /// Gets an object of this scope.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&QueryObject> {
        self.arena.get(id)
    }

    /// Renders the alias tree for debug logging.
    #[must_use]
    pub const fn tree(&self) -> TreeDisplay<'_> {
        self.tree.display(&self.arena)
    }

    /// Appends a FROM item written by the user for the declared `object`.
    pub fn push_from(&mut self, object: ObjectId, item: FromItem) {
        self.from.push(FromEntry::Given { object, item });
    }

    /// Sets the DISTINCT flag.
    pub fn set_distinct(&mut self, distinct: bool) {
        self.output.distinct = distinct;
    }

    /// Appends a SELECT column.
    pub fn select(&mut self, column: SelectColumn) {
        self.output.columns.push(column);
    }

    /// Sets the WHERE clause.
    pub fn filter(&mut self, predicate: Expr) {
        self.output.where_clause = Some(predicate);
    }

    /// Appends an ORDER BY entry.
    pub fn order_by(&mut self, order: OrderBy) {
        self.output.order_by.push(order);
    }

    /// Appends a GROUP BY expression.
    pub fn group_by(&mut self, expr: Expr) {
        self.output.group_by.push(expr);
    }

    /// Sets the HAVING clause.
    pub fn having(&mut self, predicate: Expr) {
        self.output.having = Some(predicate);
    }

    /// Sets the LIMIT clause.
    pub fn limit(&mut self, expr: Expr) {
        self.output.limit = Some(expr);
    }

    /// Sets the OFFSET clause.
    pub fn offset(&mut self, expr: Expr) {
        self.output.offset = Some(expr);
    }

    /// Assembles the statement and replaces every binding with the final
    /// alias of its object.
    #[must_use]
    pub fn to_statement(self) -> SelectStatement {
        let Self {
            arena,
            from,
            mut output,
            ..
        } = self;

        output.from = from
            .into_iter()
            .map(|entry| match entry {
                FromEntry::Given { item, .. } => item,
                FromEntry::Import(object) => {
                    FromItem::new(TableRef::table(printed_table(&arena, object)))
                }
                FromEntry::Join(join) => {
                    let alias = arena.identifier(join.object).map(String::from);
                    let table = TableRef::Table {
                        path: vec![printed_table(&arena, join.object)],
                        alias,
                    };
                    FromItem::joined(
                        table,
                        JoinClause {
                            join_type: join.join_type,
                            on: Expr::conjunction(join.on),
                            using: Vec::new(),
                        },
                    )
                }
            })
            .collect();

        settle_statement(&mut output, &arena);
        output
    }
}

fn printed_table(arena: &ObjectArena, object: ObjectId) -> String {
    arena
        .get(object)
        .map(|o| o.table().unwrap_or(o.identifier()))
        .unwrap_or_default()
        .to_string()
}

/// Replaces bindings in every clause of `statement`. Subqueries were
/// settled by their own scope.
fn settle_statement(statement: &mut SelectStatement, arena: &ObjectArena) {
    for column in &mut statement.columns {
        settle(&mut column.expr, arena);
    }
    for item in &mut statement.from {
        if let Some(on) = item.join.as_mut().and_then(|join| join.on.as_mut()) {
            settle(on, arena);
        }
    }
    let clauses = statement
        .where_clause
        .iter_mut()
        .chain(statement.group_by.iter_mut())
        .chain(statement.having.iter_mut())
        .chain(statement.order_by.iter_mut().map(|order| &mut order.expr))
        .chain(statement.limit.iter_mut())
        .chain(statement.offset.iter_mut());
    for expr in clauses {
        settle(expr, arena);
    }
}

fn settle(expr: &mut Expr, arena: &ObjectArena) {
    match expr {
        Expr::Column { qualifier, .. } | Expr::Wildcard { qualifier } => {
            if let Some(Qualifier::Bound(binding)) = qualifier {
                if let Some(identifier) = arena.identifier((*binding).into()) {
                    *qualifier = Some(Qualifier::name(identifier));
                }
            }
        }
        _ => {
            for child in expr.children_mut() {
                settle(child, arena);
            }
        }
    }
}
