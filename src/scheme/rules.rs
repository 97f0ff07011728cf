use fxhash::FxHashMap;
use tracing::{debug, warn};

use super::TransformationScheme;
use crate::{
    error::EditError,
    tree::{DerivationTree, NodeId},
};

/// When a [`Rule`] applies to a node carrying its label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum Condition {
    #[default]
    Always,
    /// The parent's label is one of the given labels.
    ParentIs(Vec<String>),
    /// The node is a root, or its parent's label is none of the given labels.
    ParentIsNot(Vec<String>),
    /// The node has no grandparent, or its grandparent's label is none of the given labels.
    GrandparentIsNot(Vec<String>),
    /// The node has a left or a right sibling.
    NotOnlyChild,
}

impl Condition {
    pub fn parent_is<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::ParentIs(labels.into_iter().map(Into::into).collect())
    }

    pub fn parent_is_not<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::ParentIsNot(labels.into_iter().map(Into::into).collect())
    }

    pub fn grandparent_is_not<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::GrandparentIsNot(labels.into_iter().map(Into::into).collect())
    }

    /// Whether the condition holds for `node` in its current position.
    pub fn holds(&self, tree: &DerivationTree, node: NodeId) -> bool {
        let label_in = |id: Option<NodeId>, labels: &[String]| {
            id.map_or(false, |id| {
                let label = tree.label(id);
                labels.iter().any(|it| it == label)
            })
        };
        match self {
            Condition::Always => true,
            Condition::ParentIs(labels) => label_in(tree.parent(node), labels),
            Condition::ParentIsNot(labels) => !label_in(tree.parent(node), labels),
            Condition::GrandparentIsNot(labels) => {
                !label_in(tree.parent(node).and_then(|parent| tree.parent(parent)), labels)
            }
            Condition::NotOnlyChild => {
                tree.next_sibling(node).is_some()
                    || tree.parent(node).map_or(false, |parent| tree.first_child(parent) != Some(node))
            }
        }
    }
}

/// An edit a [`Rule`] applies to its node.
///
/// Every action acts on a *focus* node, initially the node the rule matched. Only gathering the
/// focus itself moves the focus, to the gathered copy, so that a [`Sequence`](Action::Sequence) can
/// go on editing the node that now sits one level lower.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum Action {
    /// Relabels the focus with the input text it covers.
    Literal,
    FoldUnder,
    FoldOver,
    /// Gathers the focus under a new node with the given label.
    Gather(String),
    /// Gathers the focus together with all its right siblings.
    GatherWithSiblings(String),
    /// Gathers the focus together with the `count` right siblings following it. Fails if there
    /// are fewer.
    GatherWithNext { to: String, count: usize },
    /// Gathers all children of the focus under one new node with the given label.
    GatherChildren(String),
    /// Gathers the first child of the focus, leaving its siblings in place.
    GatherFirstChild(String),
    Tear,
    /// Tears the focus, keeping a copy in its parent's tear store under the given key.
    TearAs(String),
    /// Inserts the subtree stored under `id` as the `position`-th child of the focus.
    Insert { position: usize, id: String },
    Sequence(Vec<Action>),
}

impl Action {
    /// Applies this action to `focus`, returning the focus for the next action of a sequence.
    pub fn apply(&self, tree: &mut DerivationTree, focus: NodeId, input: &str) -> Result<NodeId, EditError> {
        match self {
            Action::Literal => {
                let Some(text) = tree.underlying_string(focus, input) else {
                    let error = EditError::ExtentOutOfInput {
                        node:  tree.identity(focus),
                        range: tree.text_range(focus),
                    };
                    warn!(%error, "cannot relabel with the input text");
                    return Err(error);
                };
                tree.set_label(focus, text);
                Ok(focus)
            }
            Action::FoldUnder => tree.fold_under(focus).map(|()| focus),
            Action::FoldOver => tree.fold_over(focus).map(|()| focus),
            Action::Gather(to) => Ok(tree.gather(focus, to)),
            Action::GatherWithSiblings(to) => {
                let siblings: Vec<_> = tree.right_siblings(focus).collect();
                tree.gather_with_siblings(focus, to, &siblings)
            }
            Action::GatherWithNext { to, count } => {
                let siblings: Vec<_> = tree.right_siblings(focus).take(*count).collect();
                if siblings.len() < *count {
                    let error = EditError::SiblingMismatch {
                        node: tree.identity(focus),
                    };
                    warn!(%error, available = siblings.len(), wanted = *count, "cannot gather");
                    return Err(error);
                }
                tree.gather_with_siblings(focus, to, &siblings)
            }
            Action::GatherFirstChild(to) => {
                if let Some(first) = tree.first_child(focus) {
                    tree.gather(first, to);
                }
                Ok(focus)
            }
            Action::GatherChildren(to) => {
                if let Some(first) = tree.first_child(focus) {
                    let siblings: Vec<_> = tree.right_siblings(first).collect();
                    tree.gather_with_siblings(first, to, &siblings)?;
                }
                Ok(focus)
            }
            Action::Tear => tree.tear(focus).map(|()| focus),
            Action::TearAs(id) => tree.tear_into(focus, id).map(|()| focus),
            Action::Insert { position, id } => tree.insert(focus, *position, id).map(|_| focus),
            Action::Sequence(actions) => actions
                .iter()
                .try_fold(focus, |focus, action| action.apply(tree, focus, input)),
        }
    }
}

/// One entry of a [`RuleTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    #[cfg_attr(feature = "serde1", serde(default))]
    pub when:   Condition,
    pub action: Action,
}

/// A [`TransformationScheme`] given as data: for every label, a list of rules of which the first
/// whose [`Condition`] holds is applied.
///
/// ```
/// use foldtree::{Action, Condition, RuleTable};
///
/// let rules = RuleTable::new()
///     .rule("identifier", Action::Literal)
///     .rule("statement_list", Action::FoldUnder)
///     .rule_when("argument_list", Condition::parent_is(["argument_list"]), Action::FoldUnder);
/// assert_eq!(rules.rules_for("argument_list").len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde1", serde(transparent))]
pub struct RuleTable {
    rules: FxHashMap<String, Vec<Rule>>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an unconditional rule for `label`.
    pub fn rule(self, label: impl Into<String>, action: Action) -> Self {
        self.rule_when(label, Condition::Always, action)
    }

    /// Adds a rule for `label` that applies when `when` holds.
    pub fn rule_when(mut self, label: impl Into<String>, when: Condition, action: Action) -> Self {
        self.add(label, Rule { when, action });
        self
    }

    /// Appends `rule` to the rules for `label`. Earlier rules take precedence.
    pub fn add(&mut self, label: impl Into<String>, rule: Rule) {
        self.rules.entry(label.into()).or_default().push(rule);
    }

    pub fn rules_for(&self, label: &str) -> &[Rule] {
        self.rules.get(label).map_or(&[], Vec::as_slice)
    }

    /// Number of labels with at least one rule.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl TransformationScheme for RuleTable {
    fn transform(&mut self, tree: &mut DerivationTree, node: NodeId, input: &str) {
        let Some(rule) = self.rules_for(tree.label(node)).iter().find(|rule| rule.when.holds(tree, node)) else {
            return;
        };
        if let Err(error) = rule.action.apply(tree, node, input) {
            debug!(%error, node = %tree.describe(node), "rule left the node unchanged");
        }
    }
}
