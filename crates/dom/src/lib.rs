//! In-memory XML Document Object Model
//!
//! Build a document programmatically, query it by tag name and serialize
//! it back to XML text.
//!
//! ## Core Design
//!
//! ```text
//! Document::new → create_* / append_child / set_attribute → DomArena (owned)
//!                                                             ↓
//!                                       ElementsByTagName    DomSerializer → io::Write
//! ```
//!
//! All nodes of a document live in one arena and are addressed by
//! `NodeId`. Dropping the `Document` releases the whole tree.
//!
//! ```
//! use dom::{Document, DomSerializer, SerializerConfig};
//!
//! let mut doc = Document::new(None, "company", None)?;
//! let product = doc.create_element("product")?;
//! doc.append_child(doc.document_element(), product)?;
//! doc.set_attribute(product, "idea", "great")?;
//!
//! assert_eq!(doc.elements_by_tag_name("*").count(), 2);
//!
//! let serializer = DomSerializer::with_config(SerializerConfig::default());
//! assert_eq!(
//!     serializer.serialize(&doc)?,
//!     r#"<?xml version="1.0"?><company><product idea="great"/></company>"#
//! );
//! # Ok::<(), dom::DomError>(())
//! ```

pub mod arena;
pub mod document;
pub mod error;
pub mod query;
pub mod serializer;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use document::Document;
pub use error::{DomError, Result};
pub use query::{ElementsByTagName, WILDCARD};
pub use serializer::{DomSerializer, OutputEncoding, SerializerConfig};
pub use types::*;
