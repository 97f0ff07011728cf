//! Tree iterators.

use std::iter::FusedIterator;

use super::{arena::DerivationTree, NodeId};
use crate::WalkEvent;

/// An iterator along a sibling chain, such as the children of a node.
#[derive(Clone, Debug)]
pub struct Siblings<'t> {
    tree: &'t DerivationTree,
    next: Option<NodeId>,
}

impl<'t> Iterator for Siblings<'t> {
    type Item = NodeId;

    #[inline]
    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}

impl FusedIterator for Siblings<'_> {}

/// A pre-order traversal of a subtree, reporting both entering and leaving every node.
#[derive(Clone, Debug)]
pub struct Preorder<'t> {
    tree:  &'t DerivationTree,
    start: NodeId,
    next:  Option<WalkEvent<NodeId>>,
}

impl<'t> Iterator for Preorder<'t> {
    type Item = WalkEvent<NodeId>;

    fn next(&mut self) -> Option<WalkEvent<NodeId>> {
        let next = self.next.take();
        self.next = next.and_then(|event| match event {
            WalkEvent::Enter(node) => Some(match self.tree.first_child(node) {
                Some(child) => WalkEvent::Enter(child),
                None => WalkEvent::Leave(node),
            }),
            WalkEvent::Leave(node) if node == self.start => None,
            WalkEvent::Leave(node) => match self.tree.next_sibling(node) {
                Some(sibling) => Some(WalkEvent::Enter(sibling)),
                None => self.tree.parent(node).map(WalkEvent::Leave),
            },
        });
        next
    }
}

impl FusedIterator for Preorder<'_> {}

impl DerivationTree {
    /// The children of `id`, in order.
    #[inline]
    pub fn children(&self, id: NodeId) -> Siblings<'_> {
        Siblings {
            tree: self,
            next: self.first_child(id),
        }
    }

    /// The nodes following `id` in its parent's child list.
    #[inline]
    pub fn right_siblings(&self, id: NodeId) -> Siblings<'_> {
        Siblings {
            tree: self,
            next: self.next_sibling(id),
        }
    }

    /// Walks the subtree rooted at `id` in pre-order.
    #[inline]
    pub fn preorder(&self, id: NodeId) -> Preorder<'_> {
        Preorder {
            tree:  self,
            start: id,
            next:  Some(WalkEvent::Enter(id)),
        }
    }

    /// All nodes of the subtree rooted at `id`, in pre-order.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.preorder(id).filter_map(|event| match event {
            WalkEvent::Enter(node) => Some(node),
            WalkEvent::Leave(_) => None,
        })
    }
}
