// PY_SOURCE: src/delta_debugging/parsers/tree_sitter.py:TreeSitterParser

use std::fmt;

use tree_sitter::{Language, Parser as TsParser};

use super::{Node, Parser};
use crate::{Error, Result};

/// Concrete syntax tree of source text, one node per tree-sitter node
/// (named and anonymous alike).
#[derive(Clone)]
pub struct TreeSitterParser {
    name: &'static str,
    language: Language,
    expand_whitespace: bool,
}

impl TreeSitterParser {
    pub fn new(name: &'static str, language: Language) -> Self {
        Self {
            name,
            language,
            expand_whitespace: true,
        }
    }

    pub fn c() -> Self {
        Self::new("c", tree_sitter_c::LANGUAGE.into())
    }

    pub fn with_expand_whitespace(mut self, expand: bool) -> Self {
        self.expand_whitespace = expand;
        self
    }
}

fn convert(node: tree_sitter::Node<'_>, depth: usize) -> Node {
    let mut out = Node::new(node.kind(), node.start_byte(), node.end_byte(), depth);
    let mut cursor = node.walk();
    out.children = node
        .children(&mut cursor)
        .map(|child| convert(child, depth + 1))
        .collect();
    out
}

impl fmt::Display for TreeSitterParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TreeSitterParser for {} (expand_whitespace={})",
            self.name, self.expand_whitespace
        )
    }
}

impl Parser for TreeSitterParser {
    fn parse(&self, data: &[u8]) -> Result<Node> {
        let mut parser = TsParser::new();
        parser
            .set_language(&self.language)
            .map_err(|err| Error::Parse(format!("{} grammar: {err}", self.name)))?;
        let tree = parser
            .parse(data, None)
            .ok_or_else(|| Error::Parse(format!("tree-sitter gave up on the {} input", self.name)))?;
        Ok(convert(tree.root_node(), 0))
    }

    fn expand_whitespace(&self) -> bool {
        self.expand_whitespace
    }
}
