//! `foldtree` turns the result of a generalized parser into an abstract syntax tree.
//!
//! A generalized parser (GLL, GLR, ...) produces a shared packed parse forest (SPPF) embedding
//! every derivation of its input. This crate sits between such an engine and the rest of a
//! compiler front end:
//! - [`DerivationTree`] stores a single derivation, selected from the forest by an external
//!   [`Reductor`], as an arena of labelled nodes with parent, first-child and next-sibling links.
//! - The tree supports a small set of structural edits: [fold over](DerivationTree::fold_over),
//!   [fold under](DerivationTree::fold_under), [gather](DerivationTree::gather) and
//!   [tear](DerivationTree::tear_into)/[insert](DerivationTree::insert). They keep all links
//!   consistent and give every node a process-wide unique [`Identity`].
//! - A [`TransformationScheme`] applies these edits label by label to rewrite the derivation tree
//!   into an AST. [`RuleTable`] is a scheme given as data.
//! - [`DerivationCounter`] counts the derivations embedded in a [`Forest`], as an arbitrary
//!   precision integer, since ambiguous grammars embed exponentially many of them.
//!
//! [`TreeBuilder`] strings these stages together.
//!
//! The crate neither parses text nor decides how ambiguities are resolved; both are supplied by
//! the parsing engine through the [`Forest`], [`SymbolTable`] and [`Reductor`] traits.
//!
//! ```
//! use foldtree::{DerivationTree, LabelKind};
//!
//! let mut tree = DerivationTree::new();
//! let root = tree.node("expr", LabelKind::NonTerminal, 0, 5);
//! let wrapper = tree.push_child(root, "term", LabelKind::NonTerminal, 0, 5);
//! tree.push_child(wrapper, "x", LabelKind::CaseSensitiveTerminal, 0, 1);
//! tree.push_child(wrapper, "+", LabelKind::CaseSensitiveTerminal, 2, 3);
//! tree.push_child(wrapper, "y", LabelKind::CaseSensitiveTerminal, 4, 5);
//!
//! tree.fold_under(wrapper).unwrap();
//! assert_eq!(tree.to_tree_string(root), "expr(\n  'x'\n  '+'\n  'y'\n)");
//! ```
#![forbid(unconditional_recursion, future_incompatible)]
#![deny(unsafe_code)]

mod builder;
mod count;
pub mod error;
pub mod forest;
pub mod interning;
pub mod scheme;
#[cfg(feature = "serde1")]
mod serde_impls;
mod tree;
mod utility_types;

// Reexport types for working with extents.
pub use text_size::{TextRange, TextSize};

// Reexport the counting result type.
pub use num_bigint::BigUint;

pub use crate::{
    builder::{BuilderConfig, Reductor, TreeBuilder},
    count::DerivationCounter,
    error::{BuildError, CountError, EditError, InvalidParseError, StructureError},
    forest::{Forest, SymbolTable},
    scheme::{Action, Condition, Rule, RuleTable, TransformationScheme},
    tree::{DerivationTree, Identity, LabelKind, NodeId, Preorder, Siblings, END_OF_STREAM},
    utility_types::WalkEvent,
};

#[cfg(feature = "serde1")]
pub use crate::serde_impls::SerializeSubtree;
