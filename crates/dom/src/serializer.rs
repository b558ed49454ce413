//! DOM Serializer - render a document as XML 1.0 text
//!
//! This module handles:
//! - The XML declaration and doctype
//! - Element, attribute and text escaping
//! - Optional pretty printing of element-only content
//! - Encoding the rendered text for the output sink
//!
//! Empty elements are written self-closed (`<name/>`). Attributes are
//! written in insertion order.

use crate::document::Document;
use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::Write;
use tracing::debug;

/// Serializer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// Emit `<?xml version="1.0"?>` before the document
    pub xml_declaration: bool,
    /// Encoding label declared in the header and used for the output bytes
    pub encoding: Option<String>,
    pub pretty_print: bool,
    /// Indentation unit when `pretty_print` is on; spaces and tabs only
    pub indent: String,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            xml_declaration: true,
            encoding: None,
            pretty_print: false,
            indent: "  ".to_string(),
        }
    }
}

impl SerializerConfig {
    /// Load a configuration from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that would otherwise leak into the markup
    pub fn validate(&self) -> Result<()> {
        if !self.indent.chars().all(|c| matches!(c, ' ' | '\t')) {
            return Err(DomError::Config(serde::de::Error::custom(format!(
                "indent {:?} must contain only spaces and tabs",
                self.indent
            ))));
        }
        Ok(())
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn with_pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }

    pub fn with_xml_declaration(mut self, xml_declaration: bool) -> Self {
        self.xml_declaration = xml_declaration;
        self
    }
}

/// Character encodings the serializer can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEncoding {
    Utf8,
    Latin1,
    Ascii,
}

impl OutputEncoding {
    /// Resolve an encoding label such as `UTF-8`, `us-ascii` or `ISO-8859-1`
    pub fn from_label(label: &str) -> Result<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        match normalized.as_str() {
            "UTF8" => Ok(OutputEncoding::Utf8),
            "ISO88591" | "LATIN1" => Ok(OutputEncoding::Latin1),
            "USASCII" | "ASCII" => Ok(OutputEncoding::Ascii),
            _ => Err(DomError::NotSupported(format!("encoding '{}'", label))),
        }
    }

    /// Name written in the XML declaration
    pub fn name(self) -> &'static str {
        match self {
            OutputEncoding::Utf8 => "UTF-8",
            OutputEncoding::Latin1 => "ISO-8859-1",
            OutputEncoding::Ascii => "US-ASCII",
        }
    }

    /// Highest code point written literally; anything above becomes a
    /// character reference
    fn max_literal(self) -> u32 {
        match self {
            OutputEncoding::Utf8 => u32::from(char::MAX),
            OutputEncoding::Latin1 => 0xFF,
            OutputEncoding::Ascii => 0x7F,
        }
    }

    fn encode(self, text: &str) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        bytes.try_reserve(text.len())?;

        if self == OutputEncoding::Utf8 {
            bytes.extend_from_slice(text.as_bytes());
            return Ok(bytes);
        }

        for ch in text.chars() {
            let code = u32::from(ch);
            // Rendering already replaced these with character references
            if code > self.max_literal() {
                return Err(DomError::Internal(format!(
                    "unescaped character U+{:04X} in {} output",
                    code,
                    self.name()
                )));
            }
            bytes.push(code as u8);
        }
        Ok(bytes)
    }
}

/// Work items for the iterative tree walk
enum Step<'a> {
    Enter {
        node: &'a DomNode,
        depth: usize,
        inherited_ns: Option<&'a str>,
        indented: bool,
    },
    Leave {
        name: &'a str,
        depth: usize,
        element_only: bool,
        indented: bool,
    },
}

/// XML serializer
pub struct DomSerializer {
    config: SerializerConfig,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    fn encoding(&self) -> Result<OutputEncoding> {
        self.config.validate()?;
        match &self.config.encoding {
            Some(label) => OutputEncoding::from_label(label),
            None => Ok(OutputEncoding::Utf8),
        }
    }

    /// Render the whole document, declaration included
    pub fn serialize(&self, document: &Document) -> Result<String> {
        let encoding = self.encoding()?;
        let mut out = String::new();
        out.try_reserve(document.node_count() * 16)?;

        if self.config.xml_declaration {
            out.push_str("<?xml version=\"1.0\"");
            if self.config.encoding.is_some() {
                out.push_str(" encoding=\"");
                out.push_str(encoding.name());
                out.push('"');
            }
            out.push_str("?>");
            self.newline(&mut out);
        }

        self.render_document_body(document, encoding, &mut out)?;
        Ok(out)
    }

    /// Render a single node and its subtree, without declaration
    ///
    /// The document node renders its doctype and root element, an
    /// attribute renders its escaped value.
    pub fn serialize_node(&self, document: &Document, node_id: NodeId) -> Result<String> {
        let encoding = self.encoding()?;
        let node = document.node(node_id)?;
        let mut out = String::new();

        match node.node_type {
            NodeType::Document => self.render_document_body(document, encoding, &mut out)?,
            NodeType::Attribute => {
                write_escaped_attr(&mut out, &node.node_value, encoding.max_literal())
            }
            NodeType::Element | NodeType::Text => {
                let inherited_ns = match document.parent(node_id)? {
                    Some(parent) => document.namespace_uri(parent)?,
                    None => None,
                };
                self.render_subtree(document, node, inherited_ns, encoding, &mut out)?;
            }
        }

        Ok(out)
    }

    /// Render the document in the configured encoding
    pub fn to_bytes(&self, document: &Document) -> Result<Vec<u8>> {
        let text = self.serialize(document)?;
        self.encoding()?.encode(&text)
    }

    /// Write the document to `sink`
    ///
    /// The document is rendered completely before the first byte is
    /// written, so rendering errors never leave partial output behind.
    pub fn write<W: Write>(&self, document: &Document, sink: &mut W) -> Result<()> {
        let bytes = self.to_bytes(document)?;
        sink.write_all(&bytes)?;
        sink.flush()?;

        debug!(
            document = %document.id(),
            bytes = bytes.len(),
            "serialized document"
        );
        Ok(())
    }

    fn newline(&self, out: &mut String) {
        if self.config.pretty_print {
            out.push('\n');
        }
    }

    fn indent(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str(&self.config.indent);
        }
    }

    fn render_document_body(
        &self,
        document: &Document,
        encoding: OutputEncoding,
        out: &mut String,
    ) -> Result<()> {
        if let Some(doctype) = document.doctype() {
            out.push_str("<!DOCTYPE ");
            out.push_str(doctype.name());
            match (doctype.public_id(), doctype.system_id()) {
                (Some(public_id), Some(system_id)) => {
                    out.push_str(" PUBLIC ");
                    push_quoted(out, public_id);
                    out.push(' ');
                    push_quoted(out, system_id);
                }
                (None, Some(system_id)) => {
                    out.push_str(" SYSTEM ");
                    push_quoted(out, system_id);
                }
                _ => {}
            }
            out.push('>');
            self.newline(out);
        }

        let root = document.node(document.document_element())?;
        self.render_subtree(document, root, None, encoding, out)?;
        self.newline(out);
        Ok(())
    }

    /// Depth-first walk with an explicit stack, so deep trees cannot
    /// overflow the call stack
    fn render_subtree<'a>(
        &self,
        document: &'a Document,
        start: &'a DomNode,
        inherited_ns: Option<&'a str>,
        encoding: OutputEncoding,
        out: &mut String,
    ) -> Result<()> {
        let max_literal = encoding.max_literal();
        let mut stack = vec![Step::Enter {
            node: start,
            depth: 0,
            inherited_ns,
            indented: false,
        }];

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter {
                    node,
                    depth,
                    inherited_ns,
                    indented,
                } => match node.node_type {
                    NodeType::Element => {
                        if indented {
                            self.indent(out, depth);
                        }
                        out.push('<');
                        out.push_str(&node.node_name);

                        let own_ns = node.namespace_uri.as_deref();
                        if own_ns != inherited_ns && !node.attributes.contains_key("xmlns") {
                            out.push_str(" xmlns=\"");
                            write_escaped_attr(out, own_ns.unwrap_or(""), max_literal);
                            out.push('"');
                        }

                        for (name, &attr_id) in &node.attributes {
                            let attr = document.node(attr_id)?;
                            out.push(' ');
                            out.push_str(name);
                            out.push_str("=\"");
                            write_escaped_attr(out, &attr.node_value, max_literal);
                            out.push('"');
                        }

                        if !node.has_children() {
                            out.push_str("/>");
                            if indented {
                                out.push('\n');
                            }
                            continue;
                        }

                        out.push('>');
                        let element_only =
                            self.config.pretty_print && is_element_only(document, node)?;
                        if element_only {
                            out.push('\n');
                        }

                        stack.push(Step::Leave {
                            name: &node.node_name,
                            depth,
                            element_only,
                            indented,
                        });
                        for &child_id in node.children_ids.iter().rev() {
                            let child = document.node(child_id)?;
                            if element_only && child.is_text() && child.node_value.trim().is_empty()
                            {
                                continue;
                            }
                            stack.push(Step::Enter {
                                node: child,
                                depth: depth + 1,
                                inherited_ns: own_ns,
                                indented: element_only,
                            });
                        }
                    }
                    NodeType::Text => write_escaped_text(out, &node.node_value, max_literal),
                    NodeType::Attribute | NodeType::Document => {
                        return Err(DomError::Internal(format!(
                            "{} node {} found in a child list",
                            node.node_type, node.node_id
                        )));
                    }
                },
                Step::Leave {
                    name,
                    depth,
                    element_only,
                    indented,
                } => {
                    if element_only {
                        self.indent(out, depth);
                    }
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                    if indented {
                        out.push('\n');
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for DomSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the element has element children and otherwise only
/// whitespace text, so indentation cannot change its content
fn is_element_only(document: &Document, node: &DomNode) -> Result<bool> {
    let mut has_element_child = false;

    for &child_id in &node.children_ids {
        let child = document.node(child_id)?;
        match child.node_type {
            NodeType::Element => has_element_child = true,
            NodeType::Text if !child.node_value.trim().is_empty() => return Ok(false),
            _ => {}
        }
    }

    Ok(has_element_child)
}

fn push_quoted(out: &mut String, value: &str) {
    let quote = if value.contains('"') { '\'' } else { '"' };
    out.push(quote);
    out.push_str(value);
    out.push(quote);
}

fn write_char_ref(out: &mut String, ch: char) {
    let _ = write!(out, "&#x{:X};", u32::from(ch));
}

/// Escape character data
///
/// `&`, `<`, `>` and `"` use named references. Carriage returns and
/// other control characters except tab and newline become hex
/// references, as does anything above `max_literal`.
///
/// XML 1.0 has no legal form for C0 controls other than tab, newline and
/// carriage return, so text holding them produces references like
/// `&#x1;` that strict parsers reject.
fn write_escaped_text(out: &mut String, text: &str, max_literal: u32) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' | '\n' => out.push(ch),
            c if u32::from(c) < 0x20 || u32::from(c) > max_literal => write_char_ref(out, c),
            _ => out.push(ch),
        }
    }
}

/// Escape an attribute value for a double-quoted attribute
///
/// Tab, newline and carriage return are referenced so that attribute
/// value normalization does not turn them into spaces.
fn write_escaped_attr(out: &mut String, value: &str, max_literal: u32) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c if u32::from(c) < 0x20 || u32::from(c) > max_literal => write_char_ref(out, c),
            _ => out.push(ch),
        }
    }
}
