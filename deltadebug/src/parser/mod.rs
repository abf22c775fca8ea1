// PY_SOURCE: src/delta_debugging/parser.py
//! Structural views of an input for hierarchical reduction.

mod elf;
mod source;

pub use elf::ElfParser;
pub use source::TreeSitterParser;

use std::fmt;

use crate::Result;

/// Byte range `start..end` of the input, with nested sub-ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub start: usize,
    pub end: usize,
    pub depth: usize,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>, start: usize, end: usize, depth: usize) -> Self {
        Self {
            name: name.into(),
            start,
            end: end.max(start),
            depth,
            children: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Indented one-line-per-node listing.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        out.push_str(&format!(
            "{}{} (start={}, end={})\n",
            "  ".repeat(self.depth),
            self.name,
            self.start,
            self.end
        ));
        for child in &self.children {
            child.render_into(out);
        }
    }
}

pub trait Parser: fmt::Display + Send + Sync {
    fn parse(&self, data: &[u8]) -> Result<Node>;

    /// Whether a leaf also owns the whitespace byte right after it.
    fn expand_whitespace(&self) -> bool {
        false
    }
}
