//! Counting the derivations embedded in a shared packed parse forest.

use fxhash::FxHashMap;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use tracing::{trace, warn};

use crate::{
    error::{CountError, InvalidParseError},
    forest::Forest,
};

#[derive(Debug, Clone)]
enum Memo {
    /// On the traversal stack; meeting it again means the forest is cyclic.
    Counting,
    Counted(BigUint),
}

struct Frame<F: Forest> {
    node:  F::Node,
    pack:  Option<F::Pack>,
    total: BigUint,
}

/// Counts the derivations embedded in a [`Forest`].
///
/// The counter keeps a memo table for the duration of one count, so shared forest nodes are
/// counted once. It is cleared before and after every count. Concurrent counts each need their own
/// counter.
pub struct DerivationCounter<'f, F: Forest> {
    forest: &'f F,
    memo:   FxHashMap<F::Node, Memo>,
}

impl<'f, F: Forest> DerivationCounter<'f, F> {
    pub fn new(forest: &'f F) -> Self {
        Self {
            forest,
            memo: FxHashMap::default(),
        }
    }

    /// Counts the derivations below the forest's root, provided the forest was accepted.
    pub fn count(&mut self) -> Result<BigUint, CountError> {
        if !self.forest.accepted() {
            warn!("attempting to count without a valid parse");
            return Err(InvalidParseError::new("count derivations").into());
        }
        self.count_derivations(self.forest.root(), true)
    }

    /// Counts the derivations embedded in the forest below `root`.
    ///
    /// A leaf embeds one derivation. Every unsuppressed pack node of an inner node contributes the
    /// count of its right child, multiplied by the count of its left child if it has one, and the
    /// node's count is the sum over its pack nodes. Suppressed pack nodes contribute nothing.
    ///
    /// Fails if `valid_parse` is false, or if the forest reachable from `root` is cyclic.
    pub fn count_derivations(&mut self, root: F::Node, valid_parse: bool) -> Result<BigUint, CountError> {
        if !valid_parse {
            warn!("attempting to count without a valid parse");
            return Err(InvalidParseError::new("count derivations").into());
        }
        self.memo.clear();
        let count = self.count_from(root);
        self.memo.clear();
        if let Ok(count) = &count {
            trace!(%count, ?root, "counted derivations");
        }
        count
    }

    fn count_from(&mut self, root: F::Node) -> Result<BigUint, CountError> {
        let forest = self.forest;
        let mut stack: Vec<Frame<F>> = self.enter(root).into_iter().collect();

        while let Some(mut frame) = stack.pop() {
            let Some(pack) = frame.pack else {
                self.memo.insert(frame.node, Memo::Counted(frame.total));
                continue;
            };

            let left = forest.left_child(pack);
            let right = forest.right_child(pack);
            let uncounted = left.into_iter().chain([right]).find(|&child| !self.is_counted(child));
            if let Some(child) = uncounted {
                if self.memo.contains_key(&child) {
                    return Err(CountError::CyclicForest {
                        node: format!("{:?}", child),
                    });
                }
                stack.push(frame);
                stack.extend(self.enter(child));
                continue;
            }

            let contribution = match left {
                Some(left) => self.counted(left) * self.counted(right),
                None => self.counted(right),
            };
            frame.total += contribution;
            frame.pack = self.unsuppressed(forest.next_pack(pack));
            stack.push(frame);
        }

        Ok(self.counted(root))
    }

    /// Marks `node` as being counted. Leaves are counted right away; inner nodes yield the frame
    /// that sums up their pack nodes.
    fn enter(&mut self, node: F::Node) -> Option<Frame<F>> {
        if self.forest.arity(node) == 0 {
            self.memo.insert(node, Memo::Counted(BigUint::one()));
            return None;
        }
        self.memo.insert(node, Memo::Counting);
        Some(Frame {
            node,
            pack: self.unsuppressed(self.forest.first_pack(node)),
            total: BigUint::zero(),
        })
    }

    fn unsuppressed(&self, mut pack: Option<F::Pack>) -> Option<F::Pack> {
        while let Some(current) = pack {
            if !self.forest.is_suppressed(current) {
                break;
            }
            pack = self.forest.next_pack(current);
        }
        pack
    }

    fn is_counted(&self, node: F::Node) -> bool {
        matches!(self.memo.get(&node), Some(Memo::Counted(_)))
    }

    fn counted(&self, node: F::Node) -> BigUint {
        match self.memo.get(&node) {
            Some(Memo::Counted(count)) => count.clone(),
            _ => BigUint::zero(),
        }
    }
}
