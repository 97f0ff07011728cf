//! Read-only views of the parsing engine's results.
//!
//! The engine owns its shared packed parse forest (SPPF) and symbol tables; this crate only
//! queries them through [`Forest`] and [`SymbolTable`].

use std::{fmt, hash::Hash, iter::FusedIterator};

use crate::tree::LabelKind;

/// A shared packed parse forest.
///
/// A forest node either has arity 0 (it is a terminal and embeds exactly one derivation) or owns
/// a list of pack nodes. Every pack node decomposes its forest node into an optional left part and
/// a mandatory right part. Forest nodes may be reachable along several paths.
pub trait Forest {
    /// Handle to a forest node.
    type Node: Copy + Eq + Hash + fmt::Debug;
    /// Handle to a pack node.
    type Pack: Copy + fmt::Debug;

    /// Whether the last parse succeeded, i.e. whether the forest embeds any derivation at all.
    fn accepted(&self) -> bool;

    /// The node spanning the whole input. Only meaningful if [`accepted`](Forest::accepted).
    fn root(&self) -> Self::Node;

    fn arity(&self, node: Self::Node) -> usize;

    /// The first pack node of `node`, if any.
    fn first_pack(&self, node: Self::Node) -> Option<Self::Pack>;

    /// The pack node following `pack` in its forest node's pack list.
    fn next_pack(&self, pack: Self::Pack) -> Option<Self::Pack>;

    /// Suppressed pack nodes stand for alternatives that disambiguation filtered out.
    fn is_suppressed(&self, pack: Self::Pack) -> bool;

    fn left_child(&self, pack: Self::Pack) -> Option<Self::Node>;

    fn right_child(&self, pack: Self::Pack) -> Self::Node;

    /// Iterator over the pack nodes of `node`, suppressed ones included.
    #[inline]
    fn packs(&self, node: Self::Node) -> Packs<'_, Self>
    where
        Self: Sized,
    {
        Packs {
            forest: self,
            next:   self.first_pack(node),
        }
    }
}

/// An iterator over the pack nodes of a forest node.
pub struct Packs<'f, F: Forest> {
    forest: &'f F,
    next:   Option<F::Pack>,
}

impl<F: Forest> Iterator for Packs<'_, F> {
    type Item = F::Pack;

    #[inline]
    fn next(&mut self) -> Option<F::Pack> {
        let pack = self.next?;
        self.next = self.forest.next_pack(pack);
        Some(pack)
    }
}

impl<F: Forest> FusedIterator for Packs<'_, F> {}

/// The engine's grammar symbols, addressed by label number.
pub trait SymbolTable {
    fn label_kind(&self, label: u32) -> LabelKind;

    fn label_string(&self, label: u32) -> &str;
}
