//! Serialization of (sub)trees, enabled by the `serde1` feature.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::tree::{DerivationTree, NodeId};

/// A serializable view of the subtree rooted at a node, created by
/// [`DerivationTree::serializable`].
///
/// Every node is written as a struct with its `label`, `kind`, `range` and `children`.
#[derive(Debug, Clone, Copy)]
pub struct SerializeSubtree<'t> {
    tree: &'t DerivationTree,
    node: NodeId,
}

impl DerivationTree {
    pub fn serializable(&self, node: NodeId) -> SerializeSubtree<'_> {
        SerializeSubtree { tree: self, node }
    }
}

impl Serialize for SerializeSubtree<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let tree = self.tree;
        let mut state = serializer.serialize_struct("Node", 4)?;
        state.serialize_field("label", tree.label(self.node))?;
        state.serialize_field("kind", &tree.label_kind(self.node))?;
        state.serialize_field("range", &tree.text_range(self.node))?;
        state.serialize_field("children", &Children(*self))?;
        state.end()
    }
}

struct Children<'t>(SerializeSubtree<'t>);

impl Serialize for Children<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let SerializeSubtree { tree, node } = self.0;
        serializer.collect_seq(tree.children(node).map(|child| tree.serializable(child)))
    }
}
