// PY_SOURCE: src/delta_debugging/caches/tree.py:TreeCache

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use super::Cache;
use crate::{Configuration, Outcome};

#[derive(Debug, Default, Clone)]
struct TrieNode {
    outcome: Option<Outcome>,
    children: BTreeMap<usize, TrieNode>,
}

impl TrieNode {
    fn stored(&self) -> usize {
        self.children
            .values()
            .map(|child| child.outcome.is_some() as usize + child.stored())
            .sum()
    }
}

/// Trie over the index sequence of each configuration.
///
/// Storing a failing configuration drops every entry that extends it: once
/// the reduction has committed to a failing subset it only tests subsets of
/// it, so those longer paths are never looked up again.
#[derive(Debug, Default, Clone)]
pub struct TreeCache {
    root: TrieNode,
    len: usize,
}

impl TreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, config: &Configuration) -> Option<&TrieNode> {
        let mut node = &self.root;
        for index in config {
            node = node.children.get(&index)?;
        }
        Some(node)
    }
}

impl fmt::Display for TreeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Tree Cache")
    }
}

impl Cache for TreeCache {
    fn get(&self, config: &Configuration) -> Option<Outcome> {
        debug!(%config, "cache lookup");
        self.node(config).and_then(|node| node.outcome)
    }

    fn insert(&mut self, config: &Configuration, outcome: Outcome) {
        debug!(%config, %outcome, "cache insert");
        let mut node = &mut self.root;
        for index in config {
            node = node.children.entry(index).or_default();
        }
        if node.outcome.replace(outcome).is_none() {
            self.len += 1;
        }
        if outcome == Outcome::Fail {
            self.len -= node.stored();
            node.children.clear();
        }
    }

    fn remove(&mut self, config: &Configuration) -> Option<Outcome> {
        let mut node = &mut self.root;
        for index in config {
            node = node.children.get_mut(&index)?;
        }
        let removed = node.outcome.take();
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        debug!("clearing cache");
        self.root = TrieNode::default();
        self.len = 0;
    }

    fn configurations(&self) -> Vec<(Configuration, Outcome)> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<(Vec<usize>, &TrieNode)> = vec![(Vec::new(), &self.root)];
        while let Some((path, node)) = stack.pop() {
            if let Some(outcome) = node.outcome {
                out.push((Configuration::from_sorted(path.clone()), outcome));
            }
            for (&index, child) in &node.children {
                let mut next = path.clone();
                next.push(index);
                stack.push((next, child));
            }
        }
        out
    }
}
