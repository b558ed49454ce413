//! Descendant search by tag name
//!
//! `ElementsByTagName` walks a subtree lazily in document order
//! (depth-first, pre-order). The walk holds a shared borrow of the arena,
//! so the tree cannot change underneath it.

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{NodeId, NodeType};

/// Pattern matching every element
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy)]
enum TagPattern<'a> {
    Any,
    Name(&'a str),
}

impl<'a> TagPattern<'a> {
    fn parse(pattern: &'a str) -> Self {
        if pattern == WILDCARD {
            TagPattern::Any
        } else {
            TagPattern::Name(pattern)
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            TagPattern::Any => true,
            TagPattern::Name(expected) => *expected == name,
        }
    }
}

/// Lazy pre-order sequence of matching elements
#[derive(Debug, Clone)]
pub struct ElementsByTagName<'a> {
    arena: &'a DomArena,
    pattern: TagPattern<'a>,
    stack: Vec<NodeId>,
}

impl<'a> ElementsByTagName<'a> {
    /// Start a search at `root`. The root itself is yielded when it matches.
    pub fn new(arena: &'a DomArena, root: NodeId, pattern: &'a str) -> Result<Self> {
        arena.get(root)?;
        Ok(Self::starting_at(arena, root, pattern))
    }

    /// `root` must belong to `arena`
    pub(crate) fn starting_at(arena: &'a DomArena, root: NodeId, pattern: &'a str) -> Self {
        Self {
            arena,
            pattern: TagPattern::parse(pattern),
            stack: vec![root],
        }
    }
}

impl<'a> Iterator for ElementsByTagName<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node_id) = self.stack.pop() {
            let Ok(node) = self.arena.get(node_id) else {
                continue;
            };

            for &child_id in node.children_ids.iter().rev() {
                self.stack.push(child_id);
            }

            if node.node_type == NodeType::Element && self.pattern.matches(&node.node_name) {
                return Some(node_id);
            }
        }

        None
    }
}
