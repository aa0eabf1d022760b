//! One segment of a dotted path, with its markers.

use std::fmt;
use std::str::FromStr;

use oxide_pathql_syntax::lexer::{NULLABLE_MARKER, REVERSE_MARKER};

use crate::error::CompileError;

const DISJUNCTION: char = '|';
const CONJUNCTION: char = '&';

/// A parsed path segment: `[\][?]name`.
///
/// A local token follows a foreign key owned by the current table. A
/// reverse token (`\name`) follows a foreign key owned by another table
/// that points at the current one. A nullable token (`?name`) asks for an
/// outer join.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathToken {
    name: String,
    local: bool,
    nullable: bool,
}

impl PathToken {
    /// Creates a local, non-nullable token.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local: true,
            nullable: false,
        }
    }

    /// Returns the property name without markers.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the token follows a foreign key of the current table.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        self.local
    }

    /// Returns whether the token was marked nullable.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Marks the token as a reverse token.
    #[must_use]
    pub const fn reverse(mut self) -> Self {
        self.local = false;
        self
    }

    /// Sets the nullable flag.
    #[must_use]
    pub const fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

impl FromStr for PathToken {
    type Err = CompileError;

    /// Parses a segment. The returned error's `path` is the segment itself;
    /// callers widen it with [`CompileError::in_path`].
    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        let (local, rest) = match segment.strip_prefix(REVERSE_MARKER) {
            Some(rest) => (false, rest),
            None => (true, segment),
        };
        let (nullable, name) = match rest.strip_prefix(NULLABLE_MARKER) {
            Some(name) => (true, name),
            None => (false, rest),
        };

        let unsupported = |feature: &str| CompileError::UnsupportedFeature {
            feature: String::from(feature),
            segment: String::from(segment),
            path: String::from(segment),
        };
        if name.contains(DISJUNCTION) {
            return Err(unsupported("path disjunction"));
        }
        if name.contains(CONJUNCTION) {
            return Err(unsupported("path conjunction"));
        }
        if name.is_empty() {
            return Err(CompileError::UnresolvableProperty {
                segment: String::from(segment),
                path: String::from(segment),
            });
        }

        Ok(Self {
            name: String::from(name),
            local,
            nullable,
        })
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.local {
            write!(f, "{REVERSE_MARKER}")?;
        }
        if self.nullable {
            write!(f, "{NULLABLE_MARKER}")?;
        }
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_token() {
        let token: PathToken = "address".parse().unwrap();
        assert_eq!(token.name(), "address");
        assert!(token.is_local());
        assert!(!token.is_nullable());
        assert_eq!(token, PathToken::new("address"));
    }

    #[test]
    fn test_markers() {
        let token: PathToken = "\\?seller".parse().unwrap();
        assert_eq!(token.name(), "seller");
        assert!(!token.is_local());
        assert!(token.is_nullable());

        let token: PathToken = "?parent_1".parse().unwrap();
        assert!(token.is_local());
        assert!(token.is_nullable());

        let token: PathToken = "\\good".parse().unwrap();
        assert!(!token.is_local());
        assert!(!token.is_nullable());
    }

    #[test]
    fn test_display_is_canonical() {
        for text in ["address", "?address", "\\address", "\\?address"] {
            let token: PathToken = text.parse().unwrap();
            assert_eq!(token.to_string(), text);
        }
        assert_eq!(
            PathToken::new("seller").reverse().nullable(true).to_string(),
            "\\?seller"
        );
    }

    #[test]
    fn test_combinators_are_rejected() {
        let err = "seller|buyer".parse::<PathToken>().unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnsupportedFeature { ref feature, .. } if feature == "path disjunction"
        ));

        let err = "\\seller&buyer".parse::<PathToken>().unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnsupportedFeature { ref feature, .. } if feature == "path conjunction"
        ));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        for text in ["", "\\", "?", "\\?"] {
            let err = text.parse::<PathToken>().unwrap_err();
            assert!(matches!(err, CompileError::UnresolvableProperty { .. }));
        }
    }
}
