//! Error types for query compilation.

use oxide_pathql_syntax::ParseError;
use thiserror::Error;

/// Errors that can occur while compiling a query.
///
/// Every error is fatal: the whole compile is aborted and no partial SQL is
/// produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// The input is not valid SQL.
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),

    /// The leading segment of a path names neither a known alias nor a table
    /// that may be imported.
    #[error(
        "unknown identifier '{segment}' in '{path}': won't import an unrelated table without an explicit join"
    )]
    UnknownIdentifier {
        /// The offending segment.
        segment: String,
        /// The full path.
        path: String,
    },

    /// No foreign key matches a segment.
    #[error("cannot resolve '{segment}' in '{path}'")]
    UnresolvableProperty {
        /// The offending segment.
        segment: String,
        /// The full path.
        path: String,
    },

    /// More than one chain of foreign keys matches the path.
    #[error("ambiguous path '{path}': {candidates} candidates after '{segment}'")]
    AmbiguousPath {
        /// The last segment of the path.
        segment: String,
        /// The full path.
        path: String,
        /// Number of surviving candidates.
        candidates: usize,
    },

    /// An alias names a second object of the same scope.
    #[error("alias '{segment}' is already used in this query (at '{path}')")]
    DuplicateAlias {
        /// The alias.
        segment: String,
        /// The table or path it was given to.
        path: String,
    },

    /// A path whose object already has an alias is given another one.
    #[error("'{path}' is already aliased as '{existing}', cannot alias it as '{segment}'")]
    AliasConflict {
        /// The rejected alias.
        segment: String,
        /// The full path.
        path: String,
        /// The alias the object already has.
        existing: String,
    },

    /// Syntax that is recognized but not implemented.
    #[error("{feature} is not supported (at '{segment}' in '{path}')")]
    UnsupportedFeature {
        /// What is not supported.
        feature: String,
        /// The offending segment.
        segment: String,
        /// The full path.
        path: String,
    },

    /// The path exceeds a configured resolution limit.
    #[error("path '{path}' is too complex at '{segment}': {limit} exceeded")]
    PathTooComplex {
        /// The segment at which the limit was hit.
        segment: String,
        /// The full path.
        path: String,
        /// Which limit, e.g. `max_path_depth = 32`.
        limit: String,
    },
}

impl CompileError {
    /// Replaces the `path` of a path-related error with the full path it
    /// occurred in.
    #[must_use]
    pub fn in_path(mut self, full: &str) -> Self {
        match &mut self {
            Self::Parse(_) => {}
            Self::UnknownIdentifier { path, .. }
            | Self::UnresolvableProperty { path, .. }
            | Self::AmbiguousPath { path, .. }
            | Self::DuplicateAlias { path, .. }
            | Self::AliasConflict { path, .. }
            | Self::UnsupportedFeature { path, .. }
            | Self::PathTooComplex { path, .. } => *path = String::from(full),
        }
        self
    }

    /// Returns the offending segment, if the error has one.
    #[must_use]
    pub fn segment(&self) -> Option<&str> {
        match self {
            Self::Parse(_) => None,
            Self::UnknownIdentifier { segment, .. }
            | Self::UnresolvableProperty { segment, .. }
            | Self::AmbiguousPath { segment, .. }
            | Self::DuplicateAlias { segment, .. }
            | Self::AliasConflict { segment, .. }
            | Self::UnsupportedFeature { segment, .. }
            | Self::PathTooComplex { segment, .. } => Some(segment),
        }
    }
}

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;
