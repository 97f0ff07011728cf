//! The pipeline from an accepted parse to an AST: reduce the forest to a derivation tree, copy it,
//! and rewrite the copy with a [`TransformationScheme`].

use std::error::Error as StdError;

use num_bigint::BigUint;
use tracing::{debug, info, warn};

use crate::{
    count::DerivationCounter,
    error::{BuildError, CountError, InvalidParseError},
    forest::Forest,
    scheme::TransformationScheme,
    tree::{DerivationTree, NodeId},
};

/// Collapses an ambiguous forest into a single derivation tree.
///
/// Disambiguation policy lives outside this crate; implementors materialize the derivation they
/// select into `tree`, typically through [`DerivationTree::symbol_node`], and return its root.
pub trait Reductor<F: Forest> {
    type Error: StdError + Send + Sync + 'static;

    fn reduce(&mut self, forest: &F, tree: &mut DerivationTree, input: &str) -> Result<NodeId, Self::Error>;
}

/// Options for a [`TreeBuilder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Report pipeline progress at `info` rather than `debug` level, including node counts.
    pub debugging:        bool,
    /// Check the link invariants of the AST after every transformation.
    pub verify_structure: bool,
}

impl BuilderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debugging(mut self, debugging: bool) -> Self {
        self.debugging = debugging;
        self
    }

    pub fn verify_structure(mut self, verify: bool) -> Self {
        self.verify_structure = verify;
        self
    }
}

/// Brings together a parse forest, a [`Reductor`] and a [`TransformationScheme`] to turn an
/// accepted input into an AST.
///
/// The derivation tree and the AST live in the same [`DerivationTree`] arena; the AST starts out
/// as a copy of the derivation tree, so the derivation tree stays available for inspection.
pub struct TreeBuilder<F, R, S> {
    forest:          F,
    reductor:        R,
    scheme:          S,
    config:          BuilderConfig,
    tree:            DerivationTree,
    input:           String,
    derivation_root: Option<NodeId>,
    ast_root:        Option<NodeId>,
}

impl<F, R, S> TreeBuilder<F, R, S>
where
    F: Forest,
    R: Reductor<F>,
    S: TransformationScheme,
{
    pub fn new(forest: F, reductor: R, scheme: S) -> Self {
        Self::with_config(forest, reductor, scheme, BuilderConfig::default())
    }

    pub fn with_config(forest: F, reductor: R, scheme: S, config: BuilderConfig) -> Self {
        Self {
            forest,
            reductor,
            scheme,
            config,
            tree: DerivationTree::new(),
            input: String::new(),
            derivation_root: None,
            ast_root: None,
        }
    }

    /// Sets the text the forest was parsed from.
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Reduces the forest to a derivation tree and prepares a copy of it for transformation.
    pub fn filter(&mut self) -> Result<NodeId, BuildError> {
        if !self.forest.accepted() {
            warn!("attempting to reduce the number of derivation trees without a valid parse");
            return Err(InvalidParseError::new("reduce the forest").into());
        }
        let root = self
            .reductor
            .reduce(&self.forest, &mut self.tree, &self.input)
            .map_err(BuildError::reduction)?;
        self.derivation_root = Some(root);
        self.ast_root = Some(self.tree.clone_subtree(root));
        if self.config.debugging {
            info!(nodes = self.tree.count_nodes(root), "derivation tree constructed");
        } else {
            debug!("derivation tree constructed");
        }
        Ok(root)
    }

    /// Runs the transformation scheme over the copy made by [`filter`](TreeBuilder::filter).
    pub fn to_ast(&mut self) -> Result<NodeId, BuildError> {
        let Some(root) = self.ast_root else {
            warn!("attempting to create an AST without disambiguation");
            return Err(BuildError::NotFiltered);
        };
        let root = self.scheme.to_ast(&mut self.tree, root, &self.input);
        self.ast_root = Some(root);
        if self.config.verify_structure {
            self.tree.check_structure(root)?;
        }
        if self.config.debugging {
            info!(nodes = self.tree.count_nodes(root), "AST constructed");
        } else {
            debug!("AST constructed");
        }
        Ok(root)
    }

    /// Sets the input, reduces the forest and transforms the result.
    pub fn generate_ast(&mut self, input: impl Into<String>) -> Result<NodeId, BuildError> {
        self.set_input(input);
        self.filter()?;
        self.to_ast()
    }

    /// Number of derivations the forest still embeds, i.e. those not suppressed by disambiguation.
    pub fn remaining_derivations(&self) -> Result<BigUint, CountError> {
        DerivationCounter::new(&self.forest).count()
    }

    /// The derivation tree in [tree string](DerivationTree::to_tree_string) form, or an empty
    /// string before [`filter`](TreeBuilder::filter).
    pub fn derivation_tree_string(&self) -> String {
        self.derivation_root
            .map(|root| self.tree.to_tree_string(root))
            .unwrap_or_default()
    }

    /// The AST in tree string form, or an empty string before [`filter`](TreeBuilder::filter).
    pub fn ast_tree_string(&self) -> String {
        self.ast_root.map(|root| self.tree.to_tree_string(root)).unwrap_or_default()
    }

    /// Number of nodes in the derivation tree, 0 if there is none yet.
    pub fn derivation_node_count(&self) -> usize {
        self.derivation_root.map_or(0, |root| self.tree.count_nodes(root))
    }

    /// Number of nodes in the AST, 0 if there is none yet.
    pub fn ast_node_count(&self) -> usize {
        self.ast_root.map_or(0, |root| self.tree.count_nodes(root))
    }

    #[inline]
    pub fn derivation_root(&self) -> Option<NodeId> {
        self.derivation_root
    }

    #[inline]
    pub fn ast_root(&self) -> Option<NodeId> {
        self.ast_root
    }

    #[inline]
    pub fn tree(&self) -> &DerivationTree {
        &self.tree
    }

    #[inline]
    pub fn tree_mut(&mut self) -> &mut DerivationTree {
        &mut self.tree
    }

    #[inline]
    pub fn forest(&self) -> &F {
        &self.forest
    }

    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[inline]
    pub fn scheme_mut(&mut self) -> &mut S {
        &mut self.scheme
    }
}
