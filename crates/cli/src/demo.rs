//! The fixed demonstration tree
//!
//! ```text
//! <company>
//!     <product>Xerces-C</product>
//!     <category idea='great'>XML Parsing Tools</category>
//!     <developedBy>Apache Software Foundation</developedBy>
//! </company>
//! ```
//!
//! No whitespace text nodes are created between the elements.

use dom::{Document, NodeId, Result};

pub fn build_company_document() -> Result<Document> {
    let mut doc = Document::new(None, "company", None)?;
    let root = doc.document_element();

    append_text_element(&mut doc, root, "product", "Xerces-C")?;
    let category = append_text_element(&mut doc, root, "category", "XML Parsing Tools")?;
    doc.set_attribute(category, "idea", "great")?;
    append_text_element(&mut doc, root, "developedBy", "Apache Software Foundation")?;

    Ok(doc)
}

fn append_text_element(
    doc: &mut Document,
    parent: NodeId,
    name: &str,
    text: &str,
) -> Result<NodeId> {
    let element = doc.create_element(name)?;
    doc.append_child(parent, element)?;
    let data = doc.create_text_node(text)?;
    doc.append_child(element, data)?;
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{DomSerializer, WILDCARD};

    #[test]
    fn test_company_has_four_elements() {
        let doc = build_company_document().unwrap();
        let names: Vec<&str> = doc
            .elements_by_tag_name(WILDCARD)
            .map(|id| doc.node_name(id).unwrap())
            .collect();
        assert_eq!(names, vec!["company", "product", "category", "developedBy"]);
    }

    #[test]
    fn test_company_serialization() {
        let doc = build_company_document().unwrap();
        let output = DomSerializer::new().serialize(&doc).unwrap();
        assert_eq!(
            output,
            "<?xml version=\"1.0\"?><company><product>Xerces-C</product>\
             <category idea=\"great\">XML Parsing Tools</category>\
             <developedBy>Apache Software Foundation</developedBy></company>"
        );
    }
}
