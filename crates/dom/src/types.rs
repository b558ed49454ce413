//! Core type definitions for the document model
//!
//! Key design principles:
//! 1. Nodes are addressed by index into their document's arena
//! 2. A `NodeId` remembers which document issued it
//! 3. Use SmallVec for child lists (most elements have few children)

use crate::error::{DomError, Result};
use crate::utils;
use ahash::RandomState;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt;
use uuid::Uuid;

/// Identity of one document instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Node identifier: owning document plus index into its arena
///
/// Ids are only meaningful for the document that created them. Passing one
/// to any other document fails with `WrongDocument`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    document: DocumentId,
    index: u32,
}

impl NodeId {
    pub(crate) fn new(document: DocumentId, index: u32) -> Self {
        Self { document, index }
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Node type, numbered as in the DOM specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    Document = 9,
}

impl NodeType {
    /// Whether nodes of this type own an ordered child list
    pub fn can_have_children(self) -> bool {
        matches!(self, NodeType::Document | NodeType::Element)
    }

    /// Whether nodes of this type may appear in an element's child list
    pub fn is_child_type(self) -> bool {
        matches!(self, NodeType::Element | NodeType::Text)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Element => "element",
            NodeType::Attribute => "attribute",
            NodeType::Text => "text",
            NodeType::Document => "document",
        };
        f.write_str(name)
    }
}

/// Attribute name -> attribute node, in insertion order
pub type AttributeMap = IndexMap<String, NodeId, RandomState>;

/// One node in the arena
///
/// The meaning of `node_name` and `node_value` follows the DOM:
///
/// | type      | node_name       | node_value  |
/// |-----------|-----------------|-------------|
/// | Document  | `#document`     | empty       |
/// | Element   | tag name        | empty       |
/// | Text      | `#text`         | data        |
/// | Attribute | attribute name  | value       |
///
/// For attributes, `parent_id` is the owner element.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType,

    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>,

    pub node_name: String,
    pub node_value: String,
    pub namespace_uri: Option<String>,
    pub attributes: AttributeMap,
}

impl DomNode {
    pub fn new(node_id: NodeId, node_type: NodeType, node_name: String) -> Self {
        Self {
            node_id,
            node_type,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name,
            node_value: String::new(),
            namespace_uri: None,
            attributes: AttributeMap::default(),
        }
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Character data for text nodes, value for attributes
    pub fn value(&self) -> Option<&str> {
        match self.node_type {
            NodeType::Text | NodeType::Attribute => Some(&self.node_value),
            NodeType::Element | NodeType::Document => None,
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children_ids.is_empty()
    }
}

/// `<!DOCTYPE name PUBLIC "public_id" "system_id">`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentType {
    name: String,
    public_id: Option<String>,
    system_id: Option<String>,
}

impl DocumentType {
    /// Build a document type declaration.
    ///
    /// A public id requires a system id. Public ids are limited to XML
    /// public-id characters. System ids must be printable ASCII and may not
    /// contain both quote characters, since they could not be quoted.
    /// Ids are written without escaping.
    pub fn new(name: &str, public_id: Option<&str>, system_id: Option<&str>) -> Result<Self> {
        utils::validate_name(name)?;

        if public_id.is_some() && system_id.is_none() {
            return Err(DomError::InvalidArgument(format!(
                "doctype '{}' has a public id but no system id",
                name
            )));
        }

        if let Some(id) = public_id {
            if let Some(bad) = id.chars().find(|&c| !is_pubid_char(c)) {
                return Err(DomError::InvalidArgument(format!(
                    "public id {:?} contains {:?}",
                    id, bad
                )));
            }
        }

        if let Some(id) = system_id {
            if let Some(bad) = id.chars().find(|&c| !(c == ' ' || c.is_ascii_graphic())) {
                return Err(DomError::InvalidArgument(format!(
                    "system id {:?} contains {:?}",
                    id, bad
                )));
            }
            if id.contains('"') && id.contains('\'') {
                return Err(DomError::InvalidArgument(format!(
                    "system id cannot contain both quote characters: {}",
                    id
                )));
            }
        }

        Ok(Self {
            name: name.to_string(),
            public_id: public_id.map(String::from),
            system_id: system_id.map(String::from),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_id(&self) -> Option<&str> {
        self.public_id.as_deref()
    }

    pub fn system_id(&self) -> Option<&str> {
        self.system_id.as_deref()
    }
}

/// `PubidChar` from XML 1.0
fn is_pubid_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '\r' | '\n') || "-'()+,./:=?;!*#@$_%".contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_capabilities() {
        assert!(NodeType::Element.can_have_children());
        assert!(NodeType::Document.can_have_children());
        assert!(!NodeType::Text.can_have_children());
        assert!(!NodeType::Attribute.can_have_children());

        assert!(NodeType::Text.is_child_type());
        assert!(!NodeType::Attribute.is_child_type());
        assert!(!NodeType::Document.is_child_type());
        assert_eq!(NodeType::Document as u8, 9);
    }

    #[test]
    fn test_node_ids_remember_document() {
        let a = DocumentId::new();
        let b = DocumentId::new();
        assert_ne!(a, b);
        assert_ne!(NodeId::new(a, 1), NodeId::new(b, 1));
        assert_eq!(NodeId::new(a, 7).to_string(), "#7");
    }

    #[test]
    fn test_value_by_type() {
        let doc = DocumentId::new();
        let mut text = DomNode::new(NodeId::new(doc, 0), NodeType::Text, "#text".into());
        text.node_value = "hello".into();
        assert_eq!(text.value(), Some("hello"));
        assert!(text.tag_name().is_none());

        let element = DomNode::new(NodeId::new(doc, 1), NodeType::Element, "p".into());
        assert_eq!(element.value(), None);
        assert_eq!(element.tag_name(), Some("p"));
    }

    #[test]
    fn test_doctype_validation() {
        let dt = DocumentType::new("html", None, Some("about:legacy-compat")).unwrap();
        assert_eq!(dt.name(), "html");
        assert_eq!(dt.system_id(), Some("about:legacy-compat"));

        assert!(matches!(
            DocumentType::new("1html", None, None),
            Err(DomError::InvalidArgument(_))
        ));
        assert!(matches!(
            DocumentType::new("html", Some("-//W3C//DTD"), None),
            Err(DomError::InvalidArgument(_))
        ));
        assert!(matches!(
            DocumentType::new("html", None, Some("a\"b'c")),
            Err(DomError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_doctype_ids_are_ascii_only() {
        assert!(matches!(
            DocumentType::new("company", None, Some("caf\u{e9}.dtd")),
            Err(DomError::InvalidArgument(_))
        ));
        assert!(matches!(
            DocumentType::new("company", None, Some("tab\there.dtd")),
            Err(DomError::InvalidArgument(_))
        ));
        assert!(matches!(
            DocumentType::new("company", Some("-//\"quoted\"//EN"), Some("c.dtd")),
            Err(DomError::InvalidArgument(_))
        ));
        assert!(matches!(
            DocumentType::new("company", Some("-//Caf\u{e9}//EN"), Some("c.dtd")),
            Err(DomError::InvalidArgument(_))
        ));

        let dt = DocumentType::new("company", Some("-//Acme (v1)//EN"), Some("it's.dtd")).unwrap();
        assert_eq!(dt.public_id(), Some("-//Acme (v1)//EN"));
    }
}
