use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use text_size::TextSize;

use crate::interning::LabelKey;

/// Label of the end-of-stream sentinel emitted by the parsing engine.
/// It is printed as `ambig` in [tree strings](crate::DerivationTree::to_tree_string).
pub const END_OF_STREAM: &str = " EOS $";

/// The category of grammar symbol a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum LabelKind {
    Terminal,
    CaseInsensitiveTerminal,
    CaseSensitiveTerminal,
    CharacterTerminal,
    NonTerminal,
    Epsilon,
    Intermediate,
}

impl LabelKind {
    /// Whether this kind is one of the terminal variants.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LabelKind::Terminal
                | LabelKind::CaseInsensitiveTerminal
                | LabelKind::CaseSensitiveTerminal
                | LabelKind::CharacterTerminal
        )
    }
}

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(0);

/// Process-wide unique number of a node.
///
/// Copies made by [`clone_subtree`](crate::DerivationTree::clone_subtree), [`gather`] or a keyed
/// [`tear`] share label and extents with their originals; the identity tells them apart.
///
/// [`gather`]: crate::DerivationTree::gather
/// [`tear`]: crate::DerivationTree::tear_into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(u64);

impl Identity {
    pub(crate) fn fresh() -> Self {
        Identity(NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a node inside a [`DerivationTree`](crate::DerivationTree).
///
/// Slots are never recycled, so a `NodeId` stays valid (and keeps referring to the same node) for
/// the lifetime of its tree, even after the node has been detached. A `NodeId` must only be used
/// with the tree that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(super) fn from_index(index: usize) -> Self {
        NodeId(u32::try_from(index).expect("derivation tree exceeded u32::MAX nodes"))
    }

    #[inline]
    pub(super) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a tear store. Nodes copied from one another share the same store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct TearStoreId(pub(super) u32);

#[derive(Debug, Clone)]
pub(super) struct NodeData {
    pub(super) label:      LabelKey,
    pub(super) kind:       LabelKind,
    pub(super) left:       TextSize,
    pub(super) right:      TextSize,
    pub(super) identity:   Identity,
    pub(super) tears:      TearStoreId,
    pub(super) parent:     Option<NodeId>,
    pub(super) child:      Option<NodeId>,
    pub(super) sibling:    Option<NodeId>,
    pub(super) last_child: Option<NodeId>,
}

impl NodeData {
    pub(super) fn new(label: LabelKey, kind: LabelKind, left: TextSize, right: TextSize, tears: TearStoreId) -> Self {
        Self {
            label,
            kind,
            left,
            right,
            identity: Identity::fresh(),
            tears,
            parent: None,
            child: None,
            sibling: None,
            last_child: None,
        }
    }

    /// An unlinked copy with a fresh identity, sharing this node's tear store.
    pub(super) fn detached_copy(&self) -> Self {
        Self::new(self.label, self.kind, self.left, self.right, self.tears)
    }
}
