use std::ops::Range;

use fxhash::{FxHashMap, FxHashSet};
use text_size::{TextRange, TextSize};
use tracing::warn;

use super::node::{LabelKind, NodeData, NodeId, TearStoreId};
use crate::{
    error::{EditError, StructureError},
    forest::SymbolTable,
    interning::{new_interner, LabelInterner, LabelKey},
    tree::Identity,
};

/// Storage for derivation trees.
///
/// All nodes, whether part of a live tree, a detached subtree or a tear store entry, live in one
/// arena and are addressed by [`NodeId`]. A tree is whatever is reachable from a root through the
/// `child`/`sibling` links; detaching a subtree only unlinks it. Slots are never reused.
///
/// Each node links to its parent, its first child, its next sibling and (as a cache) its last
/// child. Every mutator in this crate keeps these links consistent; see
/// [`check_structure`](DerivationTree::check_structure).
#[derive(Debug)]
pub struct DerivationTree {
    nodes:    Vec<NodeData>,
    tears:    Vec<FxHashMap<String, NodeId>>,
    interner: LabelInterner,
}

impl Default for DerivationTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DerivationTree {
    /// Constructs an empty arena.
    pub fn new() -> Self {
        Self {
            nodes:    Vec::new(),
            tears:    Vec::new(),
            interner: new_interner(),
        }
    }

    /// Creates a new, unlinked node with the given label and half-open extent `left..right` into
    /// the input.
    pub fn node(
        &mut self,
        label: &str,
        kind: LabelKind,
        left: impl Into<TextSize>,
        right: impl Into<TextSize>,
    ) -> NodeId {
        let label = self.interner.get_or_intern(label);
        let tears = self.new_tear_store();
        self.push(NodeData::new(label, kind, left.into(), right.into(), tears))
    }

    /// Creates a new, unlinked node for the engine symbol `label`, resolving its name and kind
    /// through `symbols`.
    pub fn symbol_node<S>(&mut self, symbols: &S, label: u32, left: impl Into<TextSize>, right: impl Into<TextSize>) -> NodeId
    where
        S: SymbolTable + ?Sized,
    {
        self.node(symbols.label_string(label), symbols.label_kind(label), left, right)
    }

    /// Creates a new node and appends it as the last child of `parent`.
    pub fn push_child(
        &mut self,
        parent: NodeId,
        label: &str,
        kind: LabelKind,
        left: impl Into<TextSize>,
        right: impl Into<TextSize>,
    ) -> NodeId {
        let child = self.node(label, kind, left, right);
        self.add_child(parent, child);
        child
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(data);
        id
    }

    fn new_tear_store(&mut self) -> TearStoreId {
        let id = TearStoreId(u32::try_from(self.tears.len()).expect("too many tear stores"));
        self.tears.push(FxHashMap::default());
        id
    }

    /// Allocates an unlinked copy of `id` with a fresh identity, sharing `id`'s tear store.
    pub(super) fn copy_node(&mut self, id: NodeId) -> NodeId {
        let data = self.data(id).detached_copy();
        self.push(data)
    }

    #[inline]
    pub(super) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(super) fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    pub(super) fn tear_store(&self, id: NodeId) -> &FxHashMap<String, NodeId> {
        &self.tears[self.data(id).tears.0 as usize]
    }

    pub(super) fn tear_store_mut(&mut self, id: NodeId) -> &mut FxHashMap<String, NodeId> {
        let store = self.data(id).tears.0 as usize;
        &mut self.tears[store]
    }

    /// Number of nodes ever allocated in this arena, including detached ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn label(&self, id: NodeId) -> &str {
        self.interner.resolve(&self.data(id).label)
    }

    /// The interned key of `id`'s label. Keys compare equal exactly when the labels do.
    #[inline]
    pub fn label_key(&self, id: NodeId) -> LabelKey {
        self.data(id).label
    }

    pub fn set_label(&mut self, id: NodeId, label: &str) {
        let key = self.interner.get_or_intern(label);
        self.data_mut(id).label = key;
    }

    pub(super) fn set_label_key(&mut self, id: NodeId, key: LabelKey) {
        self.data_mut(id).label = key;
    }

    #[inline]
    pub fn label_kind(&self, id: NodeId) -> LabelKind {
        self.data(id).kind
    }

    #[inline]
    pub fn set_label_kind(&mut self, id: NodeId, kind: LabelKind) {
        self.data_mut(id).kind = kind;
    }

    #[inline]
    pub fn left_extent(&self, id: NodeId) -> TextSize {
        self.data(id).left
    }

    #[inline]
    pub fn right_extent(&self, id: NodeId) -> TextSize {
        self.data(id).right
    }

    #[inline]
    pub fn set_left_extent(&mut self, id: NodeId, left: impl Into<TextSize>) {
        self.data_mut(id).left = left.into();
    }

    #[inline]
    pub fn set_right_extent(&mut self, id: NodeId, right: impl Into<TextSize>) {
        self.data_mut(id).right = right.into();
    }

    /// The span of input covered by `id`. An inverted extent yields an empty range at the left
    /// extent.
    #[inline]
    pub fn text_range(&self, id: NodeId) -> TextRange {
        let data = self.data(id);
        TextRange::new(data.left, data.right.max(data.left))
    }

    #[inline]
    pub fn identity(&self, id: NodeId) -> Identity {
        self.data(id).identity
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    #[inline]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).child
    }

    #[inline]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).last_child
    }

    #[inline]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).sibling
    }

    /// The root of the tree `id` currently belongs to.
    pub fn root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Whether `a` and `b` store torn subtrees in the same place, which is the case for a node and
    /// all copies made from it.
    pub fn shares_tear_store(&self, a: NodeId, b: NodeId) -> bool {
        self.data(a).tears == self.data(b).tears
    }

    /// The subtree stored under `key` by a keyed tear of one of `id`'s children.
    pub fn torn(&self, id: NodeId, key: &str) -> Option<NodeId> {
        self.tear_store(id).get(key).copied()
    }

    /// Appends `child`, together with the chain of its right siblings, to the children of
    /// `parent`. Passing `None` does nothing.
    pub fn add_child(&mut self, parent: NodeId, child: impl Into<Option<NodeId>>) {
        let Some(child) = child.into() else {
            return;
        };
        match self.data(parent).last_child {
            None => self.set_child(parent, child),
            Some(last) => {
                self.data_mut(last).sibling = Some(child);
                let tail = self.reparent_chain(child, Some(parent));
                self.data_mut(parent).last_child = Some(tail);
            }
        }
    }

    /// Replaces the children of `parent` with `child` and its right siblings.
    ///
    /// The previous children are not touched and keep pointing at `parent`; callers replacing a
    /// non-empty child list are expected to relink them.
    pub fn set_child(&mut self, parent: NodeId, child: impl Into<Option<NodeId>>) {
        let child = child.into();
        let tail = child.map(|child| self.reparent_chain(child, Some(parent)));
        let data = self.data_mut(parent);
        data.child = child;
        data.last_child = tail;
    }

    /// Replaces everything to the right of `id` with `sibling` and its right siblings.
    /// The new siblings are reparented to `id`'s parent, whose last child is updated.
    pub fn set_sibling(&mut self, id: NodeId, sibling: impl Into<Option<NodeId>>) {
        let sibling = sibling.into();
        let parent = self.parent(id);
        self.data_mut(id).sibling = sibling;
        let tail = match sibling {
            Some(sibling) => self.reparent_chain(sibling, parent),
            None => id,
        };
        if let Some(parent) = parent {
            self.data_mut(parent).last_child = Some(tail);
        }
    }

    /// Overwrites the parent link of `id` without touching any child list.
    #[inline]
    pub fn set_parent(&mut self, id: NodeId, parent: impl Into<Option<NodeId>>) {
        self.data_mut(id).parent = parent.into();
    }

    /// Points every node of the sibling chain starting at `first` to `parent`, returning the last
    /// node of the chain.
    pub(super) fn reparent_chain(&mut self, first: NodeId, parent: Option<NodeId>) -> NodeId {
        let mut tail = first;
        let mut cursor = Some(first);
        while let Some(node) = cursor {
            let data = self.data_mut(node);
            data.parent = parent;
            tail = node;
            cursor = data.sibling;
        }
        tail
    }

    /// Finds the sibling preceding `child` in the child list of `parent` (`None` if `child` is the
    /// first child). Fails if `child` is not a child of `parent`.
    pub(super) fn predecessor(&self, parent: NodeId, child: NodeId) -> Result<Option<NodeId>, EditError> {
        let mut prev = None;
        let mut cursor = self.first_child(parent);
        while let Some(node) = cursor {
            if node == child {
                return Ok(prev);
            }
            prev = Some(node);
            cursor = self.next_sibling(node);
        }
        let error = EditError::ChildNotFound {
            parent: self.identity(parent),
            child:  self.identity(child),
        };
        warn!(%error, "node not found");
        Err(error)
    }

    /// Replaces `node`, which directly follows `prev` in the child list of `parent`, by the chain
    /// `replacement` (given as first and last node, already reparented) or by nothing. `node` is
    /// left without parent and sibling.
    pub(super) fn splice(
        &mut self,
        parent: NodeId,
        prev: Option<NodeId>,
        node: NodeId,
        replacement: Option<(NodeId, NodeId)>,
    ) {
        let after = self.next_sibling(node);
        let head = match replacement {
            Some((head, tail)) => {
                self.data_mut(tail).sibling = after;
                Some(head)
            }
            None => after,
        };
        match prev {
            None => self.data_mut(parent).child = head,
            Some(prev) => self.data_mut(prev).sibling = head,
        }
        if after.is_none() {
            self.data_mut(parent).last_child = replacement.map(|(_, tail)| tail).or(prev);
        }
        let data = self.data_mut(node);
        data.parent = None;
        data.sibling = None;
    }

    /// Removes `child` from the children of `parent`. Any children of `child` take its place, in
    /// order, and become children of `parent`.
    ///
    /// Fails without changing the tree if `child` is not a child of `parent`.
    pub fn delete_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), EditError> {
        let prev = self.predecessor(parent, child)?;
        let orphans = self.first_child(child).map(|first| {
            let tail = self.reparent_chain(first, Some(parent));
            (first, tail)
        });
        self.splice(parent, prev, child, orphans);
        let data = self.data_mut(child);
        data.child = None;
        data.last_child = None;
        Ok(())
    }

    /// Deep-copies the subtree rooted at `id`. Copies get fresh identities but share tear stores
    /// with their originals. The copy is a new root.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let root = self.copy_node(id);
        let mut stack = vec![(id, root)];
        while let Some((original, copy)) = stack.pop() {
            let mut cursor = self.first_child(original);
            while let Some(child) = cursor {
                let child_copy = self.copy_node(child);
                self.add_child(copy, child_copy);
                if self.first_child(child).is_some() {
                    stack.push((child, child_copy));
                }
                cursor = self.next_sibling(child);
            }
        }
        root
    }

    /// Number of nodes in the subtree rooted at `id`, including `id`.
    pub fn count_nodes(&self, id: NodeId) -> usize {
        let mut stack = vec![id];
        let mut count = 1;
        while let Some(current) = stack.pop() {
            let mut cursor = self.first_child(current);
            while let Some(child) = cursor {
                count += 1;
                if self.first_child(child).is_some() {
                    stack.push(child);
                }
                cursor = self.next_sibling(child);
            }
        }
        count
    }

    /// The text of `input` covered by `id`, without surrounding whitespace. `None` if the extents
    /// of `id` are out of bounds for `input` or not on a char boundary.
    pub fn underlying_string<'i>(&self, id: NodeId, input: &'i str) -> Option<&'i str> {
        input.get(Range::<usize>::from(self.text_range(id))).map(str::trim)
    }

    /// Verifies the link invariants for every node of the subtree rooted at `id`:
    /// a node without children caches no last child, every child list ends at the cached last
    /// child without cycles, and every child points back to its parent.
    pub fn check_structure(&self, id: NodeId) -> Result<(), StructureError> {
        let mut stack = vec![id];
        let mut seen = FxHashSet::default();
        while let Some(node) = stack.pop() {
            let data = self.data(node);
            let Some(first) = data.child else {
                if data.last_child.is_some() {
                    return Err(StructureError::LastChildWithoutChild { node: data.identity });
                }
                continue;
            };
            let mut tail = first;
            let mut cursor = Some(first);
            while let Some(child) = cursor {
                if !seen.insert(child) {
                    return Err(StructureError::SiblingCycle { node: data.identity });
                }
                if self.parent(child) != Some(node) {
                    return Err(StructureError::ParentMismatch {
                        node:  data.identity,
                        child: self.identity(child),
                    });
                }
                stack.push(child);
                tail = child;
                cursor = self.next_sibling(child);
            }
            if data.last_child != Some(tail) {
                return Err(StructureError::StaleLastChild { node: data.identity });
            }
        }
        Ok(())
    }

    /// A one-line description of `id`: identity, label and extents.
    pub fn describe(&self, id: NodeId) -> String {
        let data = self.data(id);
        format!(
            "{}:{} {},{}",
            data.identity.get(),
            self.label(id),
            u32::from(data.left),
            u32::from(data.right)
        )
    }
}
