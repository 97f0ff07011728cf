//! Transformation schemes: label-driven rewriting of a derivation tree into an AST.

mod rules;

pub use self::rules::{Action, Condition, Rule, RuleTable};

use crate::tree::{DerivationTree, NodeId};

/// Decides, node by node, which edits turn a derivation tree into an AST.
///
/// Implementors provide [`transform`](TransformationScheme::transform), which looks at a single
/// node (its label, its parent's label and its neighbours) and applies the edit operators of
/// [`DerivationTree`] as it sees fit. The provided [`to_ast`](TransformationScheme::to_ast) drives
/// it over a whole tree; see [`walk`] for the visiting order.
pub trait TransformationScheme {
    /// Applies the edits this scheme prescribes for `node`. `input` is the text the tree was
    /// parsed from, for recovering the literal text of leaves.
    fn transform(&mut self, tree: &mut DerivationTree, node: NodeId, input: &str);

    /// Transforms the tree rooted at `root` and returns the root of the result.
    fn to_ast(&mut self, tree: &mut DerivationTree, root: NodeId, input: &str) -> NodeId {
        walk(self, tree, root, input);
        root
    }
}

impl<S: TransformationScheme + ?Sized> TransformationScheme for &mut S {
    fn transform(&mut self, tree: &mut DerivationTree, node: NodeId, input: &str) {
        (**self).transform(tree, node, input)
    }

    fn to_ast(&mut self, tree: &mut DerivationTree, root: NodeId, input: &str) -> NodeId {
        (**self).to_ast(tree, root, input)
    }
}

/// Runs `scheme` over every descendant of `parent`, once each.
///
/// Children are visited left to right. The subtree of a child is transformed before the child
/// itself, since edits below a node change what the scheme sees at that node. `parent` itself is
/// not passed to the scheme.
///
/// Nodes that an edit moves into the current child list after their visit (promoted children of a
/// folded node, or siblings gathered under a new node) are not visited again.
pub fn walk<S>(scheme: &mut S, tree: &mut DerivationTree, parent: NodeId, input: &str)
where
    S: TransformationScheme + ?Sized,
{
    // one frame per level: the node whose children are walked, and the next child to visit
    let mut stack = vec![(parent, tree.first_child(parent))];
    while let Some(&(current, cursor)) = stack.last() {
        let node = match cursor {
            Some(node) => match tree.first_child(node) {
                Some(first) => {
                    stack.push((node, Some(first)));
                    continue;
                }
                None => node,
            },
            None => {
                // all children of `current` are done, so `current` is next in its parent's frame
                stack.pop();
                if stack.is_empty() {
                    break;
                }
                current
            }
        };
        let Some(frame) = stack.last_mut() else {
            break;
        };
        let next = tree.next_sibling(node);
        scheme.transform(tree, node, input);
        frame.1 = match tree.parent(node) {
            Some(owner) if owner == frame.0 => tree.next_sibling(node),
            _ => next,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::LabelKind;

    struct Recorder(Vec<String>);

    impl TransformationScheme for Recorder {
        fn transform(&mut self, tree: &mut DerivationTree, node: NodeId, _input: &str) {
            self.0.push(tree.label(node).to_owned());
        }
    }

    #[test]
    fn children_before_parents() {
        let mut tree = DerivationTree::new();
        let root = tree.node("root", LabelKind::NonTerminal, 0, 3);
        let a = tree.push_child(root, "a", LabelKind::NonTerminal, 0, 2);
        tree.push_child(a, "a1", LabelKind::Terminal, 0, 1);
        tree.push_child(a, "a2", LabelKind::Terminal, 1, 2);
        tree.push_child(root, "b", LabelKind::Terminal, 2, 3);

        let mut recorder = Recorder(Vec::new());
        recorder.to_ast(&mut tree, root, "xyz");
        assert_eq!(recorder.0, ["a1", "a2", "a", "b"]);
    }

    struct FoldAll;

    impl TransformationScheme for FoldAll {
        fn transform(&mut self, tree: &mut DerivationTree, node: NodeId, _input: &str) {
            if tree.label_kind(node) == LabelKind::NonTerminal {
                tree.fold_under(node).unwrap();
            }
        }
    }

    #[test]
    fn walk_continues_after_fold() {
        let mut tree = DerivationTree::new();
        let root = tree.node("root", LabelKind::NonTerminal, 0, 3);
        let a = tree.push_child(root, "a", LabelKind::NonTerminal, 0, 2);
        let x = tree.push_child(a, "x", LabelKind::Terminal, 0, 1);
        let inner = tree.push_child(root, "inner", LabelKind::NonTerminal, 1, 3);
        let y = tree.push_child(inner, "y", LabelKind::Terminal, 1, 3);

        FoldAll.to_ast(&mut tree, root, "abc");
        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![x, y]);
        tree.check_structure(root).unwrap();
    }
}
