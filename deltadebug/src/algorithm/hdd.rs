// PY_SOURCE: src/delta_debugging/algorithms/hdd.py:HDD

use std::fmt;

use tracing::debug;

use super::{Algorithm, Input, Tester};
use crate::{Configuration, Error, Node, Outcome, Parser, Result};

/// Hierarchical delta debugging: reduce a parse tree level by level, running
/// an inner algorithm over the children of each node.
pub struct Hdd {
    parser: Box<dyn Parser>,
    inner: Box<dyn Algorithm>,
}

impl Hdd {
    pub fn new(parser: Box<dyn Parser>, inner: Box<dyn Algorithm>) -> Self {
        Self { parser, inner }
    }
}

impl fmt::Display for Hdd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HDD with {} using {}", self.inner, self.parser)
    }
}

#[derive(Debug)]
struct TreeNode {
    start: usize,
    end: usize,
    exists: bool,
    children: Vec<usize>,
}

/// Arena copy of the parse tree with single-child chains collapsed.
struct Tree<'a> {
    data: &'a [u8],
    expand_whitespace: bool,
    nodes: Vec<TreeNode>,
}

impl<'a> Tree<'a> {
    const ROOT: usize = 0;

    fn new(root: &Node, data: &'a [u8], expand_whitespace: bool) -> Self {
        let mut tree = Self {
            data,
            expand_whitespace,
            nodes: Vec::new(),
        };
        tree.insert(root);
        tree
    }

    fn insert(&mut self, mut node: &Node) -> usize {
        while node.children.len() == 1 {
            node = &node.children[0];
        }
        let id = self.nodes.len();
        self.nodes.push(TreeNode {
            start: node.start,
            end: node.end,
            exists: true,
            children: Vec::new(),
        });
        let children = node.children.iter().map(|child| self.insert(child)).collect();
        self.nodes[id].children = children;
        id
    }

    fn live_children(&self, id: usize) -> Vec<usize> {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .filter(|&child| self.nodes[child].exists)
            .collect()
    }

    /// Existing nodes `level` steps below the root.
    fn level(&self, level: usize) -> Vec<usize> {
        let mut ids = vec![Self::ROOT];
        for _ in 0..level {
            ids = ids.iter().flat_map(|&id| self.live_children(id)).collect();
        }
        ids
    }

    fn leaf(&self, id: usize) -> Configuration {
        let node = &self.nodes[id];
        let end = node.end.min(self.data.len());
        let mut indices: Vec<usize> = (node.start.min(end)..end).collect();
        if self.expand_whitespace
            && self
                .data
                .get(node.end)
                .is_some_and(|b| b.is_ascii_whitespace())
        {
            indices.push(node.end);
        }
        indices.into_iter().collect()
    }

    /// Configuration of the whole tree. When `variant` names a node, only
    /// the listed positions among its live children are included.
    fn unparse(&self, variant: Option<(usize, &Configuration)>) -> Configuration {
        let mut parts = Vec::new();
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if !node.exists {
                continue;
            }
            if node.children.is_empty() {
                parts.push(self.leaf(id));
                continue;
            }
            let live = self.live_children(id);
            match variant {
                Some((target, kept)) if target == id => {
                    stack.extend(kept.iter().filter_map(|pos| live.get(pos).copied()));
                }
                _ => stack.extend(live),
            }
        }
        Configuration::concat(&parts)
    }

    fn prune(&mut self, id: usize, kept: &Configuration) {
        for (pos, child) in self.live_children(id).into_iter().enumerate() {
            if !kept.contains(pos) {
                self.nodes[child].exists = false;
            }
        }
    }
}

impl Algorithm for Hdd {
    fn run(&self, input: Input<'_>, tester: &mut Tester<'_>) -> Result<Configuration> {
        let data = input
            .as_bytes()
            .ok_or(Error::Unsupported("hierarchical reduction needs a byte input"))?;
        debug!(algorithm = %self, "starting HDD");
        let root = self.parser.parse(data)?;
        let mut tree = Tree::new(&root, data, self.parser.expand_whitespace());

        let mut level = 0;
        loop {
            let ids = tree.level(level);
            if ids.is_empty() {
                break;
            }
            for id in ids {
                let width = tree.live_children(id).len();
                if width < 2 {
                    continue;
                }
                let kept = {
                    let tree = &tree;
                    let mut test_fn = |config: &Configuration| -> Result<Outcome> {
                        tester.test(&tree.unparse(Some((id, config))))
                    };
                    let mut inner = Tester::new(&mut test_fn, None);
                    self.inner.run(Input::opaque(width), &mut inner)?
                };
                debug!(level, width, %kept, "reduced node children");
                tree.prune(id, &kept);
            }
            level += 1;
        }

        let config = tree.unparse(None);
        debug!(%config, "HDD finished");
        Ok(config)
    }
}
