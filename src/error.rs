//! Error types reported by tree edits, derivation counting and the [`TreeBuilder`](crate::TreeBuilder).
//!
//! Structural usage errors ([`EditError`]) are also logged through `tracing` where they occur. An
//! operation that fails with one leaves its tree unchanged, so callers driving hand-written rule
//! tables may log and continue.

use std::error::Error as StdError;

use text_size::TextRange;
use thiserror::Error;

use crate::tree::Identity;

/// Returned when counting derivations or building a derivation tree without a successful parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {operation} without a valid parse")]
pub struct InvalidParseError {
    operation: &'static str,
}

impl InvalidParseError {
    pub(crate) fn new(operation: &'static str) -> Self {
        Self { operation }
    }

    /// The operation that was attempted.
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

/// Misuse of one of the structural edit operators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("cannot {operation} the root node {node}")]
    RootNode { operation: &'static str, node: Identity },
    #[error("node {child} is not a child of {parent}")]
    ChildNotFound { parent: Identity, child: Identity },
    #[error("nodes supplied to gather are not the right siblings of {node}")]
    SiblingMismatch { node: Identity },
    #[error("no subtree was torn under id `{id}` for {node}")]
    UnknownTearId { node: Identity, id: String },
    #[error("extent {range:?} of {node} does not lie within the input")]
    ExtentOutOfInput { node: Identity, range: TextRange },
    #[error("invalid child position {position} for insert on {node}, which has {len} children")]
    PositionOutOfRange {
        node:     Identity,
        position: usize,
        len:      usize,
    },
}

/// Failure to count the derivations embedded in a forest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountError {
    #[error(transparent)]
    InvalidParse(#[from] InvalidParseError),
    /// The forest reaches `node` again while still counting it. Such forests embed infinitely many
    /// derivations.
    #[error("forest contains a cycle through {node}")]
    CyclicForest { node: String },
}

/// A violation of the link invariants of a [`DerivationTree`](crate::DerivationTree).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("{node} has no children but caches a last child")]
    LastChildWithoutChild { node: Identity },
    #[error("cached last child of {node} is not the tail of its child list")]
    StaleLastChild { node: Identity },
    #[error("{child} is in the child list of {node} but names a different parent")]
    ParentMismatch { node: Identity, child: Identity },
    #[error("child list of {node} contains a cycle")]
    SiblingCycle { node: Identity },
}

/// Failure of one of the [`TreeBuilder`](crate::TreeBuilder) pipeline stages.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    InvalidParse(#[from] InvalidParseError),
    #[error("cannot construct an AST before the forest has been reduced to a derivation tree")]
    NotFiltered,
    #[error("reduction to a derivation tree failed")]
    Reduction(#[source] Box<dyn StdError + Send + Sync + 'static>),
    #[error("transformation left the tree inconsistent")]
    Structure(#[from] StructureError),
}

impl BuildError {
    pub(crate) fn reduction<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        BuildError::Reduction(Box::new(error))
    }
}
