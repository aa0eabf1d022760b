//! Expansion of path tokens into a chain of foreign-key hops.
//!
//! A path may have several readings while it is being expanded. Every
//! reading is kept as a candidate chain; a token prunes the candidates it
//! does not fit. The path resolves only if exactly one candidate survives
//! the last token.

use std::fmt;

use tracing::trace;

use crate::environment::{Relation, SchemaEnvironment};
use crate::error::{CompileError, Result};
use crate::options::CompileOptions;
use crate::token::PathToken;

/// One step along a foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop<'e> {
    relation: &'e Relation,
    /// The token that produced the hop, carrying the effective nullability.
    token: PathToken,
}

impl<'e> Hop<'e> {
    /// The foreign key followed.
    #[must_use]
    pub const fn relation(&self) -> &'e Relation {
        self.relation
    }

    /// Whether the hop goes from the referenced table to the owning table.
    #[must_use]
    pub const fn is_reverse(&self) -> bool {
        !self.token.is_local()
    }

    /// Whether the hop needs an outer join.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.token.is_nullable()
    }

    /// The table the hop starts from.
    #[must_use]
    pub fn source_table(&self) -> &'e str {
        if self.is_reverse() {
            self.relation.referenced_table()
        } else {
            self.relation.local_table()
        }
    }

    /// The table the hop arrives at.
    #[must_use]
    pub fn target_table(&self) -> &'e str {
        if self.is_reverse() {
            self.relation.local_table()
        } else {
            self.relation.referenced_table()
        }
    }

    /// The alias-tree key of the hop: the canonical token, plus the owning
    /// table for reverse hops (`\?seller.transactions`).
    #[must_use]
    pub fn key(&self) -> String {
        if self.is_reverse() {
            format!("{}.{}", self.token, self.relation.local_table())
        } else {
            self.token.to_string()
        }
    }
}

impl fmt::Display for Hop<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -[{}]-> {}",
            self.source_table(),
            self.key(),
            self.target_table()
        )
    }
}

/// The set of candidate chains for a path being resolved.
#[derive(Debug, Clone)]
pub struct ResolutionPath<'e> {
    env: &'e SchemaEnvironment,
    start: String,
    nullable: bool,
    frontier: Vec<Vec<Hop<'e>>>,
    max_path_depth: usize,
    max_candidates: usize,
}

impl<'e> ResolutionPath<'e> {
    /// Starts a path at `table`. If the start is nullable, every hop is.
    #[must_use]
    pub fn new(
        env: &'e SchemaEnvironment,
        table: impl Into<String>,
        nullable: bool,
        options: &CompileOptions,
    ) -> Self {
        Self {
            env,
            start: table.into(),
            nullable,
            frontier: vec![Vec::new()],
            max_path_depth: options.max_path_depth,
            max_candidates: options.max_candidates,
        }
    }

    /// Number of live candidates.
    #[must_use]
    pub fn candidates(&self) -> usize {
        self.frontier.len()
    }

    /// Expands every candidate by one token.
    ///
    /// Candidates the token does not fit are dropped; a reverse token may
    /// fork a candidate.
    pub fn expand(&mut self, token: &PathToken) {
        self.nullable |= token.is_nullable();
        let token = token.clone().nullable(self.nullable);

        let frontier = std::mem::take(&mut self.frontier);
        for chain in frontier {
            self.expand_chain(chain, &token);
        }
        trace!(
            token = %token,
            candidates = self.frontier.len(),
            "Expanded path token"
        );
    }

    fn expand_chain(&mut self, chain: Vec<Hop<'e>>, token: &PathToken) {
        let env = self.env;
        let table = chain
            .last()
            .map_or(self.start.as_str(), Hop::target_table)
            .to_owned();

        if token.is_local() {
            // A table name after a reverse hop only confirms which table
            // the hop went to.
            if let Some(last) = chain.last() {
                if last.is_reverse() && last.relation.local_table() == token.name() {
                    self.frontier.push(chain);
                    return;
                }
            }
            if let Some(relation) = env.property(&table, token.name()) {
                self.push_hop(chain, relation, token);
            }
        } else {
            for relation in env.find_properties(token.name()) {
                if relation.referenced_table() == table {
                    self.push_hop(chain.clone(), relation, token);
                }
            }
        }
    }

    fn push_hop(&mut self, mut chain: Vec<Hop<'e>>, relation: &'e Relation, token: &PathToken) {
        chain.push(Hop {
            relation,
            token: token.clone(),
        });
        self.frontier.push(chain);
    }

    /// Expands all tokens and returns the single surviving chain.
    ///
    /// `path` is the full dotted path, used in errors.
    ///
    /// # Errors
    ///
    /// - `PathTooComplex` if there are more tokens than `max_path_depth` or
    ///   more candidates than `max_candidates`
    /// - `UnresolvableProperty` if a token leaves no candidate
    /// - `AmbiguousPath` if several candidates survive
    pub fn resolve(mut self, tokens: &[PathToken], path: &str) -> Result<Vec<Hop<'e>>> {
        if let Some(token) = tokens.get(self.max_path_depth) {
            return Err(CompileError::PathTooComplex {
                segment: token.to_string(),
                path: String::from(path),
                limit: format!("max_path_depth = {}", self.max_path_depth),
            });
        }

        for token in tokens {
            self.expand(token);
            if self.frontier.is_empty() {
                return Err(CompileError::UnresolvableProperty {
                    segment: token.to_string(),
                    path: String::from(path),
                });
            }
            if self.frontier.len() > self.max_candidates {
                return Err(CompileError::PathTooComplex {
                    segment: token.to_string(),
                    path: String::from(path),
                    limit: format!("max_candidates = {}", self.max_candidates),
                });
            }
        }

        match self.frontier.len() {
            1 => Ok(self.frontier.pop().unwrap_or_default()),
            candidates => Err(CompileError::AmbiguousPath {
                segment: tokens.last().map(ToString::to_string).unwrap_or_default(),
                path: String::from(path),
                candidates,
            }),
        }
    }
}
