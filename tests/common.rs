#![allow(unused)]

use foldtree::{DerivationTree, Forest, LabelKind, NodeId, Reductor, SymbolTable};

/// A forest built by hand, node by node.
#[derive(Debug, Default)]
pub struct TestForest {
    nodes:    Vec<ForestNode>,
    packs:    Vec<PackNode>,
    root:     usize,
    accepted: bool,
}

#[derive(Debug)]
struct ForestNode {
    label: u32,
    left:  u32,
    right: u32,
    leaf:  bool,
    packs: Vec<usize>,
}

#[derive(Debug)]
struct PackNode {
    owner:      usize,
    left:       Option<usize>,
    right:      usize,
    suppressed: bool,
}

impl TestForest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leaf(&mut self, label: u32, left: u32, right: u32) -> usize {
        self.add(label, left, right, true)
    }

    pub fn inner(&mut self, label: u32, left: u32, right: u32) -> usize {
        self.add(label, left, right, false)
    }

    fn add(&mut self, label: u32, left: u32, right: u32, leaf: bool) -> usize {
        self.nodes.push(ForestNode {
            label,
            left,
            right,
            leaf,
            packs: Vec::new(),
        });
        self.nodes.len() - 1
    }

    pub fn pack(&mut self, node: usize, left: Option<usize>, right: usize) -> usize {
        self.packs.push(PackNode {
            owner: node,
            left,
            right,
            suppressed: false,
        });
        let pack = self.packs.len() - 1;
        self.nodes[node].packs.push(pack);
        pack
    }

    pub fn suppress(&mut self, pack: usize) {
        self.packs[pack].suppressed = true;
    }

    pub fn accept(&mut self, root: usize) {
        self.root = root;
        self.accepted = true;
    }

    pub fn label(&self, node: usize) -> u32 {
        self.nodes[node].label
    }

    pub fn extents(&self, node: usize) -> (u32, u32) {
        (self.nodes[node].left, self.nodes[node].right)
    }
}

impl Forest for TestForest {
    type Node = usize;
    type Pack = usize;

    fn accepted(&self) -> bool {
        self.accepted
    }

    fn root(&self) -> usize {
        self.root
    }

    fn arity(&self, node: usize) -> usize {
        let node = &self.nodes[node];
        if node.leaf {
            0
        } else {
            node.packs.len().max(1)
        }
    }

    fn first_pack(&self, node: usize) -> Option<usize> {
        self.nodes[node].packs.first().copied()
    }

    fn next_pack(&self, pack: usize) -> Option<usize> {
        let siblings = &self.nodes[self.packs[pack].owner].packs;
        let position = siblings.iter().position(|&it| it == pack)?;
        siblings.get(position + 1).copied()
    }

    fn is_suppressed(&self, pack: usize) -> bool {
        self.packs[pack].suppressed
    }

    fn left_child(&self, pack: usize) -> Option<usize> {
        self.packs[pack].left
    }

    fn right_child(&self, pack: usize) -> usize {
        self.packs[pack].right
    }
}

#[derive(Debug, Default)]
pub struct TestSymbols {
    symbols: Vec<(String, LabelKind)>,
}

impl TestSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbol(&mut self, name: &str, kind: LabelKind) -> u32 {
        self.symbols.push((name.to_owned(), kind));
        (self.symbols.len() - 1) as u32
    }
}

impl SymbolTable for TestSymbols {
    fn label_kind(&self, label: u32) -> LabelKind {
        self.symbols[label as usize].1
    }

    fn label_string(&self, label: u32) -> &str {
        &self.symbols[label as usize].0
    }
}

#[derive(Debug, thiserror::Error)]
#[error("every pack node of forest node {0} is suppressed")]
pub struct NoDerivation(pub usize);

/// Materializes the first unsuppressed derivation. Intermediate forest nodes are flattened into
/// their parent.
pub struct FirstDerivation {
    pub symbols: TestSymbols,
}

impl FirstDerivation {
    fn materialize(
        &self,
        forest: &TestForest,
        tree: &mut DerivationTree,
        node: usize,
    ) -> Result<NodeId, NoDerivation> {
        let (left, right) = forest.extents(node);
        let id = tree.symbol_node(&self.symbols, forest.label(node), left, right);
        self.expand(forest, tree, node, id)?;
        Ok(id)
    }

    fn expand(&self, forest: &TestForest, tree: &mut DerivationTree, node: usize, id: NodeId) -> Result<(), NoDerivation> {
        if forest.arity(node) == 0 {
            return Ok(());
        }
        let pack = forest
            .packs(node)
            .find(|&pack| !forest.is_suppressed(pack))
            .ok_or(NoDerivation(node))?;
        for child in forest.left_child(pack).into_iter().chain([forest.right_child(pack)]) {
            if self.symbols.label_kind(forest.label(child)) == LabelKind::Intermediate {
                self.expand(forest, tree, child, id)?;
            } else {
                let child = self.materialize(forest, tree, child)?;
                tree.add_child(id, child);
            }
        }
        Ok(())
    }
}

impl Reductor<TestForest> for FirstDerivation {
    type Error = NoDerivation;

    fn reduce(&mut self, forest: &TestForest, tree: &mut DerivationTree, _input: &str) -> Result<NodeId, NoDerivation> {
        self.materialize(forest, tree, forest.root())
    }
}

#[derive(Debug)]
pub enum Element<'s> {
    Node(&'s str, Vec<Element<'s>>),
    Token(&'s str),
}

/// `list(item(a) item(b)) tail`
pub fn two_level_tree() -> Element<'static> {
    use Element::*;
    Node(
        "root",
        vec![
            Node("list", vec![Node("item", vec![Token("a")]), Node("item", vec![Token("b")])]),
            Token("tail"),
        ],
    )
}

/// Builds `root` into a fresh tree. Tokens are laid out in order, separated by single spaces, and
/// returned as the input text; every node spans the tokens below it.
pub fn build_tree(root: &Element<'_>) -> (DerivationTree, NodeId, String) {
    let mut tree = DerivationTree::new();
    let mut input = String::new();
    let id = build_recursive(root, &mut tree, &mut input);
    (tree, id, input)
}

pub fn build_recursive(root: &Element<'_>, tree: &mut DerivationTree, input: &mut String) -> NodeId {
    match root {
        Element::Node(label, children) => {
            let left = input.len() as u32;
            let id = tree.node(label, LabelKind::NonTerminal, left, left);
            for child in children {
                let child = build_recursive(child, tree, input);
                tree.add_child(id, child);
            }
            let right = input.trim_end().len() as u32;
            tree.set_right_extent(id, right.max(left));
            id
        }
        Element::Token(text) => {
            let left = input.len() as u32;
            input.push_str(text);
            let right = input.len() as u32;
            input.push(' ');
            tree.node(text, LabelKind::CaseSensitiveTerminal, left, right)
        }
    }
}

pub fn labels(tree: &DerivationTree, parent: NodeId) -> Vec<&str> {
    tree.children(parent).map(|child| tree.label(child)).collect()
}
