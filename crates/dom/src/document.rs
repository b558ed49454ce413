//! Document - owner of every node and the entry point for building trees
//!
//! This handles:
//! - Document creation (root element, optional namespace and doctype)
//! - Node factories bound to this document
//! - Tree mutation (append/remove children, set/remove attributes)
//! - Read access to nodes and descendant queries
//!
//! Every mutation validates first and only then touches the arena, so a
//! failed call leaves the tree exactly as it was.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::query::{ElementsByTagName, WILDCARD};
use crate::types::{DocumentId, DocumentType, DomNode, NodeId, NodeType};
use crate::utils;
use tracing::{debug, trace};

const DOCUMENT_NAME: &str = "#document";
const TEXT_NAME: &str = "#text";

/// An XML document and all nodes created through it
///
/// Dropping the document releases the whole tree at once. Node ids handed
/// out earlier become meaningless; they are also rejected by every other
/// document.
#[derive(Debug)]
pub struct Document {
    arena: DomArena,
    document_node: NodeId,
    document_element: NodeId,
    doctype: Option<DocumentType>,
}

impl Document {
    /// Create a document whose root element is named `root_name`.
    ///
    /// An empty `namespace_uri` is treated as no namespace.
    pub fn new(
        namespace_uri: Option<&str>,
        root_name: &str,
        doctype: Option<DocumentType>,
    ) -> Result<Self> {
        utils::validate_name(root_name)?;

        let mut arena = DomArena::new(DocumentId::new());
        let document_node = arena.add_node(NodeType::Document, DOCUMENT_NAME.to_string())?;
        let document_element = arena.add_node(NodeType::Element, root_name.to_string())?;

        {
            let root = arena.get_mut(document_element)?;
            root.namespace_uri = normalize_namespace(namespace_uri);
            root.parent_id = Some(document_node);
        }
        arena
            .get_mut(document_node)?
            .children_ids
            .push(document_element);

        debug!(
            document = %arena.document_id(),
            root = root_name,
            "created document"
        );

        Ok(Self {
            arena,
            document_node,
            document_element,
            doctype,
        })
    }

    pub fn id(&self) -> DocumentId {
        self.arena.document_id()
    }

    /// The `Document` node itself
    pub fn document_node(&self) -> NodeId {
        self.document_node
    }

    /// The root element
    pub fn document_element(&self) -> NodeId {
        self.document_element
    }

    pub fn doctype(&self) -> Option<&DocumentType> {
        self.doctype.as_ref()
    }

    /// Number of nodes ever created in this document, attached or not
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    // ------------------------------------------------------------------
    // Factories
    // ------------------------------------------------------------------

    /// Create an unattached element
    pub fn create_element(&mut self, name: &str) -> Result<NodeId> {
        self.create_element_ns(None, name)
    }

    /// Create an unattached element carrying a namespace URI
    pub fn create_element_ns(&mut self, namespace_uri: Option<&str>, name: &str) -> Result<NodeId> {
        utils::validate_name(name)?;

        let id = self.arena.add_node(NodeType::Element, name.to_string())?;
        self.arena.get_mut(id)?.namespace_uri = normalize_namespace(namespace_uri);

        trace!(node = %id, name, "created element");
        Ok(id)
    }

    /// Create an unattached text node. `data` is stored verbatim.
    ///
    /// Control characters other than tab, newline and carriage return are
    /// accepted but cannot be serialized as well-formed XML 1.0.
    pub fn create_text_node(&mut self, data: &str) -> Result<NodeId> {
        let id = self.arena.add_node(NodeType::Text, TEXT_NAME.to_string())?;
        self.arena.get_mut(id)?.node_value = data.to_string();

        trace!(node = %id, len = data.len(), "created text node");
        Ok(id)
    }

    /// Create an unattached attribute with an empty value
    pub fn create_attribute(&mut self, name: &str) -> Result<NodeId> {
        utils::validate_name(name)?;

        let id = self.arena.add_node(NodeType::Attribute, name.to_string())?;
        trace!(node = %id, name, "created attribute");
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append `child` as the last child of `parent`, returns `child`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        let parent_node = self.arena.get(parent)?;
        let child_node = self.arena.get(child)?;

        if !parent_node.node_type.can_have_children() {
            return Err(DomError::InvalidState(format!(
                "{} node {} cannot have children",
                parent_node.node_type, parent
            )));
        }
        if parent_node.node_type == NodeType::Document {
            return Err(DomError::InvalidState(
                "document already has a root element".to_string(),
            ));
        }
        if !child_node.node_type.is_child_type() {
            return Err(DomError::InvalidState(format!(
                "{} node {} cannot be appended as a child",
                child_node.node_type, child
            )));
        }
        if let Some(current) = child_node.parent_id {
            return Err(DomError::InvalidState(format!(
                "node {} already has parent {}",
                child, current
            )));
        }
        if self.arena.is_inclusive_ancestor(child, parent)? {
            return Err(DomError::InvalidState(format!(
                "appending {} to {} would create a cycle",
                child, parent
            )));
        }

        let children = &mut self.arena.get_mut(parent)?.children_ids;
        children
            .try_reserve(1)
            .map_err(|err| DomError::OutOfMemory(format!("{:?}", err)))?;
        children.push(child);
        self.arena.get_mut(child)?.parent_id = Some(parent);

        trace!(parent = %parent, child = %child, "appended child");
        Ok(child)
    }

    /// Detach `child` from `parent`, returns `child`
    ///
    /// The node stays in the document and may be appended again.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        let parent_node = self.arena.get(parent)?;
        self.arena.get(child)?;

        let position = parent_node
            .children_ids
            .iter()
            .position(|&id| id == child)
            .ok_or_else(|| {
                DomError::NotFound(format!("{} is not a child of {}", child, parent))
            })?;

        if parent_node.node_type == NodeType::Document {
            return Err(DomError::InvalidState(
                "the document element cannot be removed".to_string(),
            ));
        }

        self.arena.get_mut(parent)?.children_ids.remove(position);
        self.arena.get_mut(child)?.parent_id = None;

        trace!(parent = %parent, child = %child, "removed child");
        Ok(child)
    }

    /// Set attribute `name` on `element`, overwriting any previous value
    ///
    /// A new attribute goes to the end of the attribute order, an
    /// overwritten one keeps its position. As with text, C0 control
    /// characters in `value` are kept but have no well-formed serialization.
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<()> {
        utils::validate_name(name)?;
        let existing = self.element(element)?.attributes.get(name).copied();

        match existing {
            Some(attr) => {
                self.arena.get_mut(attr)?.node_value = value.to_string();
            }
            None => {
                self.arena
                    .get_mut(element)?
                    .attributes
                    .try_reserve(1)
                    .map_err(|err| DomError::OutOfMemory(err.to_string()))?;

                let attr = self.arena.add_node(NodeType::Attribute, name.to_string())?;
                {
                    let attr_node = self.arena.get_mut(attr)?;
                    attr_node.node_value = value.to_string();
                    attr_node.parent_id = Some(element);
                }
                self.arena
                    .get_mut(element)?
                    .attributes
                    .insert(name.to_string(), attr);
            }
        }

        trace!(element = %element, name, "set attribute");
        Ok(())
    }

    /// Attach an attribute node to `element`
    ///
    /// Returns the attribute it replaced, now detached. Setting an
    /// attribute that is already owned by `element` is a no-op.
    pub fn set_attribute_node(&mut self, element: NodeId, attr: NodeId) -> Result<Option<NodeId>> {
        self.element(element)?;
        let attr_node = self.arena.get(attr)?;

        if attr_node.node_type != NodeType::Attribute {
            return Err(DomError::InvalidState(format!(
                "{} node {} is not an attribute",
                attr_node.node_type, attr
            )));
        }
        match attr_node.parent_id {
            Some(owner) if owner == element => return Ok(None),
            Some(owner) => {
                return Err(DomError::InvalidState(format!(
                    "attribute {} is already in use by element {}",
                    attr, owner
                )))
            }
            None => {}
        }

        let name = attr_node.node_name.clone();
        let attributes = &mut self.arena.get_mut(element)?.attributes;
        attributes
            .try_reserve(1)
            .map_err(|err| DomError::OutOfMemory(err.to_string()))?;
        let replaced = attributes.insert(name, attr);

        if let Some(old) = replaced {
            self.arena.get_mut(old)?.parent_id = None;
        }
        self.arena.get_mut(attr)?.parent_id = Some(element);

        trace!(element = %element, attr = %attr, "set attribute node");
        Ok(replaced)
    }

    /// Remove attribute `name` from `element`, returns the detached attribute
    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> Result<Option<NodeId>> {
        self.element(element)?;

        let removed = self.arena.get_mut(element)?.attributes.shift_remove(name);
        if let Some(attr) = removed {
            self.arena.get_mut(attr)?.parent_id = None;
            trace!(element = %element, name, "removed attribute");
        }

        Ok(removed)
    }

    /// Replace the data of a text node or the value of an attribute
    pub fn set_node_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let node = self.arena.get_mut(node_id)?;

        match node.node_type {
            NodeType::Text | NodeType::Attribute => {
                node.node_value = value.to_string();
                Ok(())
            }
            other => Err(DomError::InvalidState(format!(
                "{} node {} has no value",
                other, node_id
            ))),
        }
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    pub fn node(&self, node_id: NodeId) -> Result<&DomNode> {
        self.arena.get(node_id)
    }

    pub fn kind(&self, node_id: NodeId) -> Result<NodeType> {
        Ok(self.arena.get(node_id)?.node_type)
    }

    /// Tag name, attribute name, `#text` or `#document`
    pub fn node_name(&self, node_id: NodeId) -> Result<&str> {
        Ok(&self.arena.get(node_id)?.node_name)
    }

    /// Text data or attribute value; `None` for elements and the document
    pub fn node_value(&self, node_id: NodeId) -> Result<Option<&str>> {
        Ok(self.arena.get(node_id)?.value())
    }

    pub fn namespace_uri(&self, node_id: NodeId) -> Result<Option<&str>> {
        Ok(self.arena.get(node_id)?.namespace_uri.as_deref())
    }

    /// Parent node; for attributes this is the owner element
    pub fn parent(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.arena.get(node_id)?.parent_id)
    }

    /// Element an attribute is set on; `InvalidState` for other node types
    pub fn owner_element(&self, attr: NodeId) -> Result<Option<NodeId>> {
        let node = self.arena.get(attr)?;
        if node.node_type != NodeType::Attribute {
            return Err(DomError::InvalidState(format!(
                "{} is a {}, not an attribute",
                attr, node.node_type
            )));
        }
        Ok(node.parent_id)
    }

    pub fn children(&self, node_id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.arena.get(node_id)?.children_ids)
    }

    /// Value of attribute `name`, if set
    pub fn attribute(&self, element: NodeId, name: &str) -> Result<Option<&str>> {
        match self.element(element)?.attributes.get(name) {
            Some(&attr) => Ok(Some(&self.arena.get(attr)?.node_value)),
            None => Ok(None),
        }
    }

    /// Attribute node registered under `name`
    pub fn attribute_node(&self, element: NodeId, name: &str) -> Result<Option<NodeId>> {
        Ok(self.element(element)?.attributes.get(name).copied())
    }

    /// `(name, value)` pairs in attribute order
    pub fn attributes(&self, element: NodeId) -> Result<Vec<(&str, &str)>> {
        let node = self.element(element)?;
        let mut pairs = Vec::with_capacity(node.attributes.len());

        for (name, &attr) in &node.attributes {
            pairs.push((name.as_str(), self.arena.get(attr)?.node_value.as_str()));
        }
        Ok(pairs)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, node_id: NodeId) -> Result<String> {
        utils::get_text_content(&self.arena, node_id)
    }

    /// Elements named `pattern` (or all, for `"*"`) in the subtree of `root`
    pub fn get_elements_by_tag_name<'a>(
        &'a self,
        root: NodeId,
        pattern: &'a str,
    ) -> Result<ElementsByTagName<'a>> {
        ElementsByTagName::new(&self.arena, root, pattern)
    }

    /// Elements named `pattern` anywhere in the document
    pub fn elements_by_tag_name<'a>(&'a self, pattern: &'a str) -> ElementsByTagName<'a> {
        ElementsByTagName::starting_at(&self.arena, self.document_node, pattern)
    }

    /// Number of elements attached to the tree
    pub fn element_count(&self) -> usize {
        self.elements_by_tag_name(WILDCARD).count()
    }

    fn element(&self, node_id: NodeId) -> Result<&DomNode> {
        let node = self.arena.get(node_id)?;
        if node.node_type != NodeType::Element {
            return Err(DomError::InvalidState(format!(
                "{} node {} is not an element",
                node.node_type, node_id
            )));
        }
        Ok(node)
    }
}

fn normalize_namespace(namespace_uri: Option<&str>) -> Option<String> {
    namespace_uri.filter(|uri| !uri.is_empty()).map(String::from)
}
