use super::{
    arena::DerivationTree,
    node::{LabelKind, END_OF_STREAM},
    NodeId,
};
use crate::WalkEvent;

const INDENT: &str = "  ";

impl DerivationTree {
    /// Renders the subtree rooted at `id` as `Label(Child1 … ChildN)`.
    ///
    /// Case-insensitive terminals are wrapped in double quotes, case-sensitive terminals in single
    /// quotes, and character terminals are prefixed with a backtick. Epsilon nodes print as
    /// nothing and the end-of-stream sentinel prints as `ambig`. A node with a single non-epsilon
    /// child is printed on one line; otherwise every child goes on its own, indented line.
    ///
    /// The output is meant for humans and diffs, not for parsing.
    pub fn to_tree_string(&self, id: NodeId) -> String {
        let mut out = String::new();
        if self.label_kind(id) == LabelKind::Epsilon {
            return out;
        }
        // `Enter` carries whether the node starts its own line, `Leave` whether its children were
        // printed inline
        let mut stack = vec![WalkEvent::Enter((id, 0, false))];
        while let Some(event) = stack.pop() {
            match event {
                WalkEvent::Enter((node, depth, own_line)) => {
                    if own_line {
                        newline(&mut out, depth);
                    }
                    self.write_label(node, &mut out);
                    let Some(first) = self.first_child(node) else {
                        continue;
                    };
                    out.push('(');
                    let inline = self.label_kind(first) != LabelKind::Epsilon && self.next_sibling(first).is_none();
                    stack.push(WalkEvent::Leave((node, depth, inline)));
                    let mark = stack.len();
                    stack.extend(
                        self.children(node)
                            .filter(|&child| self.label_kind(child) != LabelKind::Epsilon)
                            .map(|child| WalkEvent::Enter((child, depth + 1, !inline))),
                    );
                    stack[mark..].reverse();
                }
                WalkEvent::Leave((_, depth, inline)) => {
                    if !inline {
                        newline(&mut out, depth);
                    }
                    out.push(')');
                }
            }
        }
        out
    }

    fn write_label(&self, id: NodeId, out: &mut String) {
        let kind = self.label_kind(id);
        match kind {
            LabelKind::CaseInsensitiveTerminal => out.push('"'),
            LabelKind::CaseSensitiveTerminal => out.push('\''),
            LabelKind::CharacterTerminal => out.push('`'),
            _ => {}
        }
        let label = self.label(id);
        out.push_str(if label == END_OF_STREAM { "ambig" } else { label });
        match kind {
            LabelKind::CaseInsensitiveTerminal => out.push('"'),
            LabelKind::CaseSensitiveTerminal => out.push('\''),
            _ => {}
        }
    }
}

fn newline(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
