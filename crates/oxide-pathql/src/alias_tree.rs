//! Cache of the objects a query scope has declared or joined.
//!
//! Root children are keyed by alias. Deeper children are keyed by the hop
//! that reached them (see [`Hop::key`](crate::path::Hop::key)), so walking a
//! resolved chain down the tree finds every join that already exists.

use std::fmt;

use crate::object::{ObjectArena, ObjectId};

/// A node of the alias tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTree {
    object: Option<ObjectId>,
    children: Vec<(String, AliasTree)>,
}

impl AliasTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a leaf holding `object`.
    #[must_use]
    pub const fn with_object(object: ObjectId) -> Self {
        Self {
            object: Some(object),
            children: Vec::new(),
        }
    }

    /// The object held by this node.
    #[must_use]
    pub const fn object(&self) -> Option<ObjectId> {
        self.object
    }

    /// Whether the node holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.object.is_none() && self.children.is_empty()
    }

    /// Gets a direct child.
    #[must_use]
    pub fn child(&self, key: &str) -> Option<&Self> {
        self.children
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    /// Gets a mutable direct child.
    #[must_use]
    pub fn child_mut(&mut self, key: &str) -> Option<&mut Self> {
        self.children
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    /// Inserts `node` under `key`, replacing any node already there, and
    /// returns it.
    pub fn add(&mut self, key: impl Into<String>, node: Self) -> &mut Self {
        let key = key.into();
        let index = if let Some(index) = self.children.iter().position(|(k, _)| *k == key) {
            self.children[index].1 = node;
            index
        } else {
            self.children.push((key, node));
            self.children.len() - 1
        };
        &mut self.children[index].1
    }

    /// Follows `path` from this node.
    #[must_use]
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&Self> {
        path.iter().try_fold(self, |node, key| node.child(key.as_ref()))
    }

    /// Follows `path` from this node, mutably.
    #[must_use]
    pub fn get_mut<S: AsRef<str>>(&mut self, path: &[S]) -> Option<&mut Self> {
        path.iter()
            .try_fold(self, |node, key| node.child_mut(key.as_ref()))
    }

    /// Searches depth-first for a named object with this identifier and
    /// returns the keys leading to it.
    ///
    /// Generated identifiers never match.
    #[must_use]
    pub fn find(&self, identifier: &str, arena: &ObjectArena) -> Option<Vec<String>> {
        for (key, child) in &self.children {
            let named = child
                .object
                .and_then(|id| arena.get(id))
                .is_some_and(|o| !o.is_anonymous() && o.identifier() == identifier);
            if named {
                return Some(vec![key.clone()]);
            }
            if let Some(mut path) = child.find(identifier, arena) {
                path.insert(0, key.clone());
                return Some(path);
            }
        }
        None
    }

    /// Walks `keys` down from this node as far as they match.
    ///
    /// Returns the deepest node reached and the number of keys consumed.
    #[must_use]
    pub fn deepest<S: AsRef<str>>(&self, keys: &[S]) -> (&Self, usize) {
        let mut node = self;
        for (consumed, key) in keys.iter().enumerate() {
            match node.child(key.as_ref()) {
                Some(child) => node = child,
                None => return (node, consumed),
            }
        }
        (node, keys.len())
    }

    /// Renders the tree, one node per line, for debug logging.
    #[must_use]
    pub const fn display<'a>(&'a self, arena: &'a ObjectArena) -> TreeDisplay<'a> {
        TreeDisplay { tree: self, arena }
    }
}

/// Display adapter returned by [`AliasTree::display`].
#[derive(Debug)]
pub struct TreeDisplay<'a> {
    tree: &'a AliasTree,
    arena: &'a ObjectArena,
}

impl TreeDisplay<'_> {
    fn write_children(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: &AliasTree,
        depth: usize,
    ) -> fmt::Result {
        for (key, child) in &node.children {
            write!(f, "{:indent$}{key}", "", indent = depth * 2)?;
            if let Some(object) = child.object.and_then(|id| self.arena.get(id)) {
                write!(
                    f,
                    " -> {} ({})",
                    object.identifier(),
                    object.table().unwrap_or("?")
                )?;
            }
            writeln!(f)?;
            self.write_children(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_children(f, self.tree, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::QueryObject;

    fn table(name: &str) -> Option<String> {
        Some(String::from(name))
    }

    /// users -> address (anonymous) -> country (named "country")
    fn sample() -> (AliasTree, ObjectArena) {
        let mut arena = ObjectArena::new();
        let users = arena.insert(QueryObject::named(table("users"), "users"));
        let address = arena.insert(QueryObject::anonymous(
            "addresses",
            String::from("__anon__0"),
            false,
        ));
        let country = arena.insert(QueryObject::named(table("countries"), "country"));

        let mut tree = AliasTree::new();
        tree.add("users", AliasTree::with_object(users))
            .add("address", AliasTree::with_object(address))
            .add("country", AliasTree::with_object(country));
        (tree, arena)
    }

    #[test]
    fn test_empty() {
        assert!(AliasTree::new().is_empty());
        let (tree, _) = sample();
        assert!(!tree.is_empty());
    }

    #[test]
    fn test_get() {
        let (tree, arena) = sample();
        let node = tree.get(&["users", "address"]).unwrap();
        assert_eq!(arena.identifier(node.object().unwrap()), Some("__anon__0"));
        assert!(tree.get(&["users", "employer"]).is_none());
        assert!(tree.get::<&str>(&[]).is_some());
    }

    #[test]
    fn test_find_skips_anonymous() {
        let (tree, arena) = sample();
        assert_eq!(
            tree.find("country", &arena),
            Some(vec![
                String::from("users"),
                String::from("address"),
                String::from("country")
            ])
        );
        assert_eq!(tree.find("__anon__0", &arena), None);
        assert_eq!(tree.find("users", &arena), Some(vec![String::from("users")]));
    }

    #[test]
    fn test_deepest() {
        let (tree, _) = sample();
        let root = tree.get(&["users"]).unwrap();
        let (_, consumed) = root.deepest(&["address", "country", "code"]);
        assert_eq!(consumed, 2);
        let (node, consumed) = root.deepest(&["employer"]);
        assert_eq!(consumed, 0);
        assert_eq!(node, root);
    }

    #[test]
    fn test_add_overwrites() {
        let (mut tree, mut arena) = sample();
        let other = arena.insert(QueryObject::named(table("users"), "users"));
        tree.add("users", AliasTree::with_object(other));
        assert_eq!(tree.get(&["users"]).and_then(AliasTree::object), Some(other));
        assert!(tree.get(&["users", "address"]).is_none());
    }

    #[test]
    fn test_display() {
        let (tree, arena) = sample();
        assert_eq!(
            tree.display(&arena).to_string(),
            "users -> users (users)\n  address -> __anon__0 (addresses)\n    country -> country (countries)\n"
        );
    }
}
