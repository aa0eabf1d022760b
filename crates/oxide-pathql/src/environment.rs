//! Property dictionary derived from a schema's foreign keys.
//!
//! Every foreign key becomes a named property of the table that owns it.
//! The name comes from, in order of preference:
//!
//! 1. a constraint name of the form `fk_<table>__<name>`,
//! 2. a single local column named `<name>_id` or `id_<name>`,
//! 3. the singular of the referenced table's name.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{trace, warn};

use crate::schema::{DatabaseSchema, ForeignKeySchema, TableSchema};

static SUFFIX_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)_id$").expect("Invalid regex pattern"));

static PREFIX_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^id_(.+)$").expect("Invalid regex pattern"));

/// A foreign key seen as a navigable property of its owning table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// The derived property name.
    pub name: String,
    /// The table that owns the foreign key.
    pub table: String,
    /// The foreign key.
    pub foreign_key: ForeignKeySchema,
}

impl Relation {
    /// The table that owns the foreign key.
    #[must_use]
    pub fn local_table(&self) -> &str {
        &self.table
    }

    /// The table the foreign key points at.
    #[must_use]
    pub fn referenced_table(&self) -> &str {
        &self.foreign_key.references_table
    }

    /// Pairs of (local column, referenced column).
    pub fn column_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.foreign_key
            .columns
            .iter()
            .zip(&self.foreign_key.references_columns)
            .map(|(local, referenced)| (local.as_str(), referenced.as_str()))
    }
}

/// Read-only view of a schema with a property dictionary per table.
///
/// Built once, then shared between compiles.
#[derive(Debug, Clone)]
pub struct SchemaEnvironment {
    schema: DatabaseSchema,
    /// Winning relations, in the order their property was first derived.
    relations: Vec<Relation>,
    /// table -> property name -> index into `relations`.
    properties: HashMap<String, HashMap<String, usize>>,
}

impl SchemaEnvironment {
    /// Derives the property dictionary of every table.
    #[must_use]
    pub fn new(schema: DatabaseSchema) -> Self {
        let mut relations: Vec<Relation> = Vec::new();
        let mut properties: HashMap<String, HashMap<String, usize>> = HashMap::new();

        for table in &schema.tables {
            let dictionary = properties.entry(table.name.clone()).or_default();
            for fk in &table.foreign_keys {
                let relation = Relation {
                    name: property_name(table, fk),
                    table: table.name.clone(),
                    foreign_key: fk.clone(),
                };
                trace!(
                    table = %table.name,
                    property = %relation.name,
                    references = %relation.referenced_table(),
                    "Derived property"
                );
                if let Some(&index) = dictionary.get(&relation.name) {
                    warn!(
                        table = %table.name,
                        property = %relation.name,
                        "Foreign key overwrites an earlier property with the same name"
                    );
                    relations[index] = relation;
                } else {
                    dictionary.insert(relation.name.clone(), relations.len());
                    relations.push(relation);
                }
            }
        }

        Self {
            schema,
            relations,
            properties,
        }
    }

    /// The underlying schema.
    #[must_use]
    pub const fn schema(&self) -> &DatabaseSchema {
        &self.schema
    }

    /// Gets a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.schema.get_table(name)
    }

    /// Returns whether `table` has a property called `name`.
    #[must_use]
    pub fn has_property(&self, table: &str, name: &str) -> bool {
        self.property(table, name).is_some()
    }

    /// Gets the property `name` of `table`.
    #[must_use]
    pub fn property(&self, table: &str, name: &str) -> Option<&Relation> {
        let index = *self.properties.get(table)?.get(name)?;
        self.relations.get(index)
    }

    /// Every property of `table`.
    pub fn properties(&self, table: &str) -> impl Iterator<Item = &Relation> {
        let table = table.to_owned();
        self.relations.iter().filter(move |r| r.table == table)
    }

    /// Every property in the schema called `name`, whichever table owns it.
    pub fn find_properties(&self, name: &str) -> impl Iterator<Item = &Relation> {
        let name = name.to_owned();
        self.relations.iter().filter(move |r| r.name == name)
    }
}

/// Derives the property name of a foreign key owned by `table`.
#[must_use]
pub fn property_name(table: &TableSchema, fk: &ForeignKeySchema) -> String {
    if let Some(name) = fk.name.as_deref() {
        let prefix = format!("fk_{}__", table.name);
        if let Some(suffix) = name.strip_prefix(&prefix) {
            if !suffix.is_empty() {
                return suffix.to_string();
            }
        }
    }

    if let [column] = fk.columns.as_slice() {
        let captures = SUFFIX_ID_PATTERN
            .captures(column)
            .or_else(|| PREFIX_ID_PATTERN.captures(column));
        if let Some(name) = captures.and_then(|c| c.get(1)) {
            return name.as_str().to_string();
        }
    }

    singularize(&fk.references_table)
}

/// Returns the singular of an English table name.
#[must_use]
pub fn singularize(word: &str) -> String {
    if word == "people" {
        return String::from("person");
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    for suffix in ["sses", "xes", "zes", "ches", "shes"] {
        if word.len() > suffix.len() && word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.len() > 3 && word.ends_with("ses") {
        return word[..word.len() - 1].to_string();
    }
    if word.len() > 1
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}
