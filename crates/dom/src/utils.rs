//! Utility functions for DOM processing

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{NodeId, NodeType};

/// Check whether `name` is a well-formed name token
///
/// Non-empty, ASCII letters, digits, `_`, `-` and `.` only, and not
/// starting with a digit.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if is_name_char(first) && !first.is_ascii_digit() => {}
        _ => return false,
    }

    chars.all(is_name_char)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Like [`is_valid_name`], but fails with `InvalidArgument`
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DomError::InvalidArgument("name must not be empty".to_string()));
    }
    if !is_valid_name(name) {
        return Err(DomError::InvalidArgument(format!(
            "'{}' is not a well-formed name",
            name
        )));
    }
    Ok(())
}

/// Get all text content from node and its descendants, in document order
pub fn get_text_content(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut text = String::new();

    arena.traverse_df(node_id, |node| {
        if matches!(node.node_type, NodeType::Text | NodeType::Attribute) {
            text.push_str(&node.node_value);
        }
        Ok(())
    })?;

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["company", "developedBy", "_x", "a-b.c", "h1", "X"] {
            assert!(is_valid_name(name), "{} should be valid", name);
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "1abc", "a b", "a:b", "<x>", "caf\u{e9}", "a/b"] {
            assert!(!is_valid_name(name), "{:?} should be rejected", name);
            assert!(matches!(validate_name(name), Err(DomError::InvalidArgument(_))));
        }
    }
}
