//! The fold, gather and tear operators used to turn a derivation tree into an AST.
//!
//! Every operator is expressed in terms of the link primitives of [`DerivationTree`]. On misuse an
//! operator logs a warning, returns an [`EditError`] and leaves the tree as it was.

use tracing::warn;

use super::{arena::DerivationTree, node::LabelKind, NodeId};
use crate::error::EditError;

impl DerivationTree {
    fn require_parent(&self, id: NodeId, operation: &'static str) -> Result<NodeId, EditError> {
        self.parent(id).ok_or_else(|| {
            let error = EditError::RootNode {
                operation,
                node: self.identity(id),
            };
            warn!(%error, "cannot apply operator to the root");
            error
        })
    }

    /// Relabels the parent of `id` with `id`'s label, then replaces `id` by its children.
    pub fn fold_over(&mut self, id: NodeId) -> Result<(), EditError> {
        let parent = self.require_parent(id, "fold over")?;
        let label = self.label_key(id);
        self.delete_child(parent, id)?;
        self.set_label_key(parent, label);
        Ok(())
    }

    /// Replaces `id` by its children, discarding `id`'s label.
    pub fn fold_under(&mut self, id: NodeId) -> Result<(), EditError> {
        let parent = self.require_parent(id, "fold under")?;
        self.delete_child(parent, id)
    }

    /// Inserts a new level below `id`: `id` keeps its place in the tree but is relabelled `to` and
    /// becomes a non-terminal, while a copy carrying its former label, kind and extents becomes its
    /// only child and takes over its children.
    ///
    /// Returns the copy, so that further edits can be applied to the gathered node.
    pub fn gather(&mut self, id: NodeId, to: &str) -> NodeId {
        let copy = self.copy_node(id);
        let children = self.first_child(id);
        self.set_child(copy, children);
        self.set_label(id, to);
        self.set_label_kind(id, LabelKind::NonTerminal);
        self.set_child(id, copy);
        copy
    }

    /// Like [`gather`](DerivationTree::gather), but the right siblings `siblings` of `id` are moved
    /// under the relabelled `id` as well, following the gathered copy. `id`'s right extent grows to
    /// cover them.
    ///
    /// `siblings` must be the sibling chain directly following `id`, in order (it need not reach
    /// the end of the child list). Anything else fails without changing the tree.
    pub fn gather_with_siblings(&mut self, id: NodeId, to: &str, siblings: &[NodeId]) -> Result<NodeId, EditError> {
        let mut after = self.next_sibling(id);
        for &sibling in siblings {
            if after != Some(sibling) {
                let error = EditError::SiblingMismatch {
                    node: self.identity(id),
                };
                warn!(%error, node = %self.describe(id), "cannot gather");
                return Err(error);
            }
            after = self.next_sibling(sibling);
        }

        let copy = self.gather(id, to);
        let Some(&last) = siblings.last() else {
            return Ok(copy);
        };
        self.data_mut(last).sibling = None;
        self.data_mut(copy).sibling = siblings.first().copied();
        self.reparent_chain(copy, Some(id));
        let right = self.right_extent(last);
        let data = self.data_mut(id);
        data.last_child = Some(last);
        data.sibling = after;
        data.right = right;
        if after.is_none() {
            if let Some(parent) = self.parent(id) {
                self.data_mut(parent).last_child = Some(id);
            }
        }
        Ok(copy)
    }

    /// Detaches the subtree rooted at `id` from its parent. The subtree stays intact in the arena
    /// as a new root.
    pub fn tear(&mut self, id: NodeId) -> Result<(), EditError> {
        let parent = self.require_parent(id, "tear")?;
        let prev = self.predecessor(parent, id)?;
        self.splice(parent, prev, id, None);
        Ok(())
    }

    /// Like [`tear`](DerivationTree::tear), but first stores a copy of the subtree under `key` in
    /// the tear store of `id`'s parent, from where [`insert`](DerivationTree::insert) can put it
    /// back. An earlier entry under the same key is replaced.
    pub fn tear_into(&mut self, id: NodeId, key: &str) -> Result<(), EditError> {
        let parent = self.require_parent(id, "tear")?;
        let prev = self.predecessor(parent, id)?;
        let copy = self.clone_subtree(id);
        self.tear_store_mut(parent).insert(key.to_owned(), copy);
        self.splice(parent, prev, id, None);
        Ok(())
    }

    /// Inserts a copy of the subtree stored under `key` as the `position`-th child of `id`, where
    /// `position` ranges from `0` (new first child) to the current number of children (new last
    /// child). The stored subtree stays available for further inserts.
    ///
    /// `key` is looked up in `id`'s tear store, which `id` shares with every node it was copied
    /// from or to.
    pub fn insert(&mut self, id: NodeId, position: usize, key: &str) -> Result<NodeId, EditError> {
        let Some(stored) = self.torn(id, key) else {
            let error = EditError::UnknownTearId {
                node: self.identity(id),
                id:   key.to_owned(),
            };
            warn!(%error, "cannot insert");
            return Err(error);
        };
        let len = self.children(id).count();
        if position > len {
            let error = EditError::PositionOutOfRange {
                node: self.identity(id),
                position,
                len,
            };
            warn!(%error, "cannot insert");
            return Err(error);
        }

        let subtree = self.clone_subtree(stored);
        let before = match position {
            0 => None,
            _ => self.children(id).nth(position - 1),
        };
        let after = match before {
            None => self.first_child(id),
            Some(before) => self.next_sibling(before),
        };
        match before {
            None => self.data_mut(id).child = Some(subtree),
            Some(before) => self.data_mut(before).sibling = Some(subtree),
        }
        let data = self.data_mut(subtree);
        data.parent = Some(id);
        data.sibling = after;
        if after.is_none() {
            self.data_mut(id).last_child = Some(subtree);
        }
        Ok(subtree)
    }
}
