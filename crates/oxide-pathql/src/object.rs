//! Table instances of a query scope.

use std::cell::Cell;

use oxide_pathql_syntax::ast::Binding;

/// Index of a [`QueryObject`] in its scope's [`ObjectArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<ObjectId> for Binding {
    fn from(id: ObjectId) -> Self {
        Self(id.0)
    }
}

impl From<Binding> for ObjectId {
    fn from(binding: Binding) -> Self {
        Self(binding.0)
    }
}

/// One instance of a table in a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryObject {
    table: Option<String>,
    identifier: String,
    anonymous: bool,
    nullable: bool,
}

impl QueryObject {
    /// Creates an object with a caller-chosen identifier.
    #[must_use]
    pub fn named(table: Option<String>, identifier: impl Into<String>) -> Self {
        Self {
            table,
            identifier: identifier.into(),
            anonymous: false,
            nullable: false,
        }
    }

    /// Sets whether the object may be missing.
    #[must_use]
    pub const fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Creates an object with a generated identifier.
    #[must_use]
    pub fn anonymous(table: impl Into<String>, identifier: String, nullable: bool) -> Self {
        Self {
            table: Some(table.into()),
            identifier,
            anonymous: true,
            nullable,
        }
    }

    /// The backing table, or `None` for derived tables and tables the
    /// schema does not know.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// The alias this object is printed with.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Whether the identifier was generated.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Whether the object may be missing (reached through an outer join).
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Replaces a generated identifier with a caller-chosen one.
    ///
    /// Returns `false` and leaves the object alone if it is already named.
    pub fn promote(&mut self, identifier: impl Into<String>) -> bool {
        if !self.anonymous {
            return false;
        }
        self.identifier = identifier.into();
        self.anonymous = false;
        true
    }

    /// Replaces a generated identifier with another generated one, to free
    /// the old one for a user alias. Named objects keep theirs.
    pub fn rename(&mut self, identifier: String) {
        if self.anonymous {
            self.identifier = identifier;
        }
    }

    /// Marks the object as possibly missing, for objects on the preserved
    /// side of a RIGHT or FULL join.
    pub const fn mark_nullable(&mut self) {
        self.nullable = true;
    }
}

/// Generates `<prefix><n>` identifiers, numbered from zero for one compile.
#[derive(Debug)]
pub struct AliasGenerator {
    prefix: String,
    next: Cell<usize>,
}

impl AliasGenerator {
    /// Creates a generator.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(0),
        }
    }

    /// Returns the next identifier.
    pub fn next_identifier(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("{}{n}", self.prefix)
    }
}

/// Owns the objects of one query scope.
#[derive(Debug, Clone, Default)]
pub struct ObjectArena {
    objects: Vec<QueryObject>,
}

impl ObjectArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object and returns its id.
    pub fn insert(&mut self, object: QueryObject) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    /// Gets an object.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&QueryObject> {
        self.objects.get(id.0)
    }

    /// Gets a mutable object.
    #[must_use]
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut QueryObject> {
        self.objects.get_mut(id.0)
    }

    /// Finds the object printed as `identifier`, named or not.
    #[must_use]
    pub fn find_identifier(&self, identifier: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|object| object.identifier == identifier)
            .map(ObjectId)
    }

    /// Every object, in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut QueryObject> {
        self.objects.iter_mut()
    }

    /// Returns the printed identifier of an object.
    #[must_use]
    pub fn identifier(&self, id: ObjectId) -> Option<&str> {
        self.get(id).map(QueryObject::identifier)
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_is_one_way() {
        let mut object = QueryObject::anonymous("countries", String::from("__anon__1"), false);
        assert!(object.is_anonymous());
        assert!(object.promote("country"));
        assert_eq!(object.identifier(), "country");
        assert!(!object.is_anonymous());
        assert!(!object.promote("nation"));
        assert_eq!(object.identifier(), "country");
    }

    #[test]
    fn test_rename_keeps_user_aliases() {
        let mut generated = QueryObject::anonymous("addresses", String::from("__anon__0"), false);
        generated.rename(String::from("__anon__1"));
        assert_eq!(generated.identifier(), "__anon__1");
        assert!(generated.is_anonymous());

        let mut named = QueryObject::named(Some(String::from("users")), "__anon__0");
        named.rename(String::from("__anon__1"));
        assert_eq!(named.identifier(), "__anon__0");
    }

    #[test]
    fn test_nullability() {
        let mut object = QueryObject::named(Some(String::from("users")), "u");
        assert!(!object.is_nullable());
        object.mark_nullable();
        assert!(object.is_nullable());
        assert!(QueryObject::named(None, "d").with_nullable(true).is_nullable());
    }

    #[test]
    fn test_named_object() {
        let object = QueryObject::named(Some(String::from("users")), "u");
        assert_eq!(object.table(), Some("users"));
        assert_eq!(object.identifier(), "u");
        assert!(!object.is_nullable());
    }

    #[test]
    fn test_alias_generator() {
        let aliases = AliasGenerator::new("__anon__");
        assert_eq!(aliases.next_identifier(), "__anon__0");
        assert_eq!(aliases.next_identifier(), "__anon__1");
    }

    #[test]
    fn test_arena() {
        let mut arena = ObjectArena::new();
        assert!(arena.is_empty());
        let users = arena.insert(QueryObject::named(Some(String::from("users")), "users"));
        let address = arena.insert(QueryObject::anonymous(
            "addresses",
            String::from("j0"),
            true,
        ));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.find_identifier("j0"), Some(address));
        assert_eq!(arena.find_identifier("j1"), None);
        assert_eq!(arena.identifier(users), Some("users"));
        assert!(arena.get(address).is_some_and(QueryObject::is_nullable));
        assert_eq!(Binding::from(address), Binding(1));
        assert_eq!(ObjectId::from(Binding(1)), address);
    }
}
