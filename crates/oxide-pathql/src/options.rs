//! Compiler configuration.

use serde::{Deserialize, Serialize};

/// Default maximum number of segments after the root of a path.
pub const DEFAULT_MAX_PATH_DEPTH: usize = 32;
/// Default maximum number of candidate chains kept while resolving a path.
pub const DEFAULT_MAX_CANDIDATES: usize = 64;
/// Default prefix of generated aliases.
pub const DEFAULT_ANONYMOUS_PREFIX: &str = "__anon__";

/// Options controlling a [`Compiler`](crate::Compiler).
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Maximum number of segments after the root of a path.
    pub max_path_depth: usize,
    /// Maximum number of candidate chains kept while resolving a path.
    pub max_candidates: usize,
    /// Prefix of generated table aliases (`<prefix><n>`).
    pub anonymous_prefix: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_path_depth: DEFAULT_MAX_PATH_DEPTH,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            anonymous_prefix: String::from(DEFAULT_ANONYMOUS_PREFIX),
        }
    }
}

impl CompileOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum path depth.
    #[must_use]
    pub const fn max_path_depth(mut self, depth: usize) -> Self {
        self.max_path_depth = depth;
        self
    }

    /// Sets the maximum number of candidates.
    #[must_use]
    pub const fn max_candidates(mut self, candidates: usize) -> Self {
        self.max_candidates = candidates;
        self
    }

    /// Sets the prefix of generated aliases.
    #[must_use]
    pub fn anonymous_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.anonymous_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompileOptions::new();
        assert_eq!(options.max_path_depth, 32);
        assert_eq!(options.max_candidates, 64);
        assert_eq!(options.anonymous_prefix, "__anon__");
    }

    #[test]
    fn test_builder() {
        let options = CompileOptions::new()
            .max_path_depth(4)
            .max_candidates(2)
            .anonymous_prefix("j");
        assert_eq!(options.max_path_depth, 4);
        assert_eq!(options.max_candidates, 2);
        assert_eq!(options.anonymous_prefix, "j");
    }
}
