//! Arena-based DOM tree storage
//!
//! Every node of one document lives in a single `Vec`. Node ids are
//! indices into it, tagged with the owning document so that ids from
//! another arena are rejected instead of aliasing unrelated nodes.
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Document][root][Node2]...
//!         ↑ NodeId { document, index }
//! ```
//!
//! Nodes are never removed individually. Detached nodes stay in the arena
//! until the whole document is dropped.

use crate::error::{DomError, Result};
use crate::types::{DocumentId, DomNode, NodeId, NodeType};

#[derive(Debug)]
pub struct DomArena {
    document_id: DocumentId,
    nodes: Vec<DomNode>,
}

impl DomArena {
    pub fn new(document_id: DocumentId) -> Self {
        Self::with_capacity(document_id, 64)
    }

    pub fn with_capacity(document_id: DocumentId, capacity: usize) -> Self {
        Self {
            document_id,
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    /// Allocate a new unattached node, returns its ID
    pub fn add_node(&mut self, node_type: NodeType, node_name: String) -> Result<NodeId> {
        let index = u32::try_from(self.nodes.len())
            .map_err(|_| DomError::OutOfMemory("node index space exhausted".to_string()))?;
        self.nodes.try_reserve(1)?;

        let node_id = NodeId::new(self.document_id, index);
        self.nodes.push(DomNode::new(node_id, node_type, node_name));
        Ok(node_id)
    }

    fn check_owner(&self, node_id: NodeId) -> Result<()> {
        if node_id.document() != self.document_id {
            return Err(DomError::WrongDocument(node_id.to_string()));
        }
        Ok(())
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.check_owner(node_id)?;
        self.nodes
            .get(node_id.index() as usize)
            .ok_or_else(|| DomError::NotFound(node_id.to_string()))
    }

    /// Get node by ID (mutable)
    pub(crate) fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.check_owner(node_id)?;
        self.nodes
            .get_mut(node_id.index() as usize)
            .ok_or_else(|| DomError::NotFound(node_id.to_string()))
    }

    /// Total number of nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `ancestor` is `node_id` itself or lies on its parent chain
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node_id: NodeId) -> Result<bool> {
        let mut current = Some(node_id);

        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.get(id)?.parent_id;
        }

        Ok(false)
    }

    /// Traverse tree depth-first, pre-order (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(arena: &mut DomArena, name: &str) -> NodeId {
        arena.add_node(NodeType::Element, name.to_string()).unwrap()
    }

    fn link(arena: &mut DomArena, parent: NodeId, child: NodeId) {
        arena.get_mut(parent).unwrap().children_ids.push(child);
        arena.get_mut(child).unwrap().parent_id = Some(parent);
    }

    #[test]
    fn test_arena_basic() {
        let mut arena = DomArena::new(DocumentId::new());

        let id = element(&mut arena, "div");
        assert_eq!(id.index(), 0);
        assert_eq!(id.document(), arena.document_id());

        let retrieved = arena.get(id).unwrap();
        assert_eq!(retrieved.node_name, "div");
        assert!(retrieved.parent_id.is_none());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_foreign_id_rejected() {
        let mut a = DomArena::new(DocumentId::new());
        let mut b = DomArena::new(DocumentId::new());
        let id_a = element(&mut a, "div");
        element(&mut b, "div");

        assert!(matches!(b.get(id_a), Err(DomError::WrongDocument(_))));
        assert!(matches!(b.get_mut(id_a), Err(DomError::WrongDocument(_))));
    }

    #[test]
    fn test_traverse_df() {
        let mut arena = DomArena::new(DocumentId::new());

        // root -> [a -> [c], b]
        let root = element(&mut arena, "root");
        let a = element(&mut arena, "a");
        let b = element(&mut arena, "b");
        let c = element(&mut arena, "c");
        link(&mut arena, root, a);
        link(&mut arena, root, b);
        link(&mut arena, a, c);

        let mut visited = Vec::new();
        arena
            .traverse_df(root, |node| {
                visited.push(node.node_name.clone());
                Ok(())
            })
            .unwrap();

        assert_eq!(visited, vec!["root", "a", "c", "b"]);
        assert_eq!(arena.get(c).unwrap().parent_id, Some(a));
        assert_eq!(arena.get(root).unwrap().children_ids.len(), 2);
    }

    #[test]
    fn test_inclusive_ancestor() {
        let mut arena = DomArena::new(DocumentId::new());
        let root = element(&mut arena, "root");
        let child = element(&mut arena, "child");
        let other = element(&mut arena, "other");
        link(&mut arena, root, child);

        assert!(arena.is_inclusive_ancestor(root, child).unwrap());
        assert!(arena.is_inclusive_ancestor(child, child).unwrap());
        assert!(!arena.is_inclusive_ancestor(child, root).unwrap());
        assert!(!arena.is_inclusive_ancestor(other, child).unwrap());
    }
}
