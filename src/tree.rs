//! The derivation tree: an arena of labelled nodes linked by parent, first-child and next-sibling
//! references, with the structural edits needed to rewrite it into an AST.

mod arena;
mod edit;
mod iter;
mod node;
mod print;

pub use self::{
    arena::DerivationTree,
    iter::{Preorder, Siblings},
    node::{Identity, LabelKind, NodeId, END_OF_STREAM},
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(miri, ignore)]
    fn assert_send() {
        fn f<T: Send>() {}
        f::<DerivationTree>();
        f::<NodeId>();
        f::<Identity>();
    }

    #[test]
    #[rustfmt::skip]
    fn assert_handle_sizes() {
        use std::mem::size_of;

        assert_eq!(size_of::<NodeId>(),         size_of::<u32>());
        assert_eq!(size_of::<Option<NodeId>>(), size_of::<u32>() * 2);
        assert_eq!(size_of::<Identity>(),       size_of::<u64>());
    }

    #[test]
    fn identities_increase() {
        let mut tree = DerivationTree::new();
        let a = tree.node("a", LabelKind::NonTerminal, 0, 0);
        let b = tree.node("a", LabelKind::NonTerminal, 0, 0);
        assert!(tree.identity(a) < tree.identity(b));
    }

    #[test]
    fn splice_keeps_last_child() {
        let mut tree = DerivationTree::new();
        let root = tree.node("root", LabelKind::NonTerminal, 0, 3);
        let a = tree.push_child(root, "a", LabelKind::Terminal, 0, 1);
        let b = tree.push_child(root, "b", LabelKind::Terminal, 1, 2);
        let x = tree.node("x", LabelKind::Terminal, 1, 2);
        let y = tree.node("y", LabelKind::Terminal, 1, 2);
        tree.set_parent(x, root);
        tree.set_parent(y, root);
        tree.data_mut(x).sibling = Some(y);

        let prev = tree.predecessor(root, b).unwrap();
        assert_eq!(prev, Some(a));
        tree.splice(root, prev, b, Some((x, y)));
        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![a, x, y]);
        assert_eq!(tree.last_child(root), Some(y));
        assert_eq!(tree.parent(b), None);
        tree.check_structure(root).unwrap();
    }
}
