//! Host document abstraction
//!
//! The evaluation engine never talks to a browser directly. It walks any tree
//! that implements [`HostNode`]:
//! - SnapshotNode: serde representation of a captured page (also used by tests)
//! - ComputedStyle: the two style properties that drive visibility
//!
//! Shadow trees are exposed through [`HostNode::composed_children`], so the
//! cache builder stays host-agnostic.

pub mod snapshot;

pub use snapshot::SnapshotNode;

use serde::{Deserialize, Serialize};

/// Kind of a host node
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Element,
    Text,
    Comment,
    Document,
}

/// Computed visual style of an element
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComputedStyle {
    /// Value of the CSS `display` property
    #[serde(default)]
    pub display: String,

    /// Value of the CSS `visibility` property
    #[serde(default)]
    pub visibility: String,
}

impl ComputedStyle {
    /// Create a style from display and visibility values
    pub fn new(display: impl Into<String>, visibility: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            visibility: visibility.into(),
        }
    }

    /// `display: none`
    pub fn is_display_none(&self) -> bool {
        self.display.trim().eq_ignore_ascii_case("none")
    }

    /// `visibility: hidden` or `visibility: collapse`
    pub fn is_visibility_hidden(&self) -> bool {
        let visibility = self.visibility.trim();
        visibility.eq_ignore_ascii_case("hidden") || visibility.eq_ignore_ascii_case("collapse")
    }
}

/// A node of the host document
///
/// Implementations must return children in composed-tree order: when an
/// element hosts an open shadow root, its shadow content replaces its light
/// children.
pub trait HostNode {
    /// Node type
    fn kind(&self) -> NodeKind;

    /// Tag name for element nodes
    fn tag_name(&self) -> Option<&str>;

    /// Attribute lookup
    fn attribute(&self, name: &str) -> Option<&str>;

    /// All attributes in document order
    fn attributes(&self) -> Vec<(&str, &str)>;

    /// Character data for text nodes
    fn text(&self) -> Option<&str>;

    /// Children including shadow-tree content
    fn composed_children(&self) -> Vec<&Self>;

    /// Computed display/visibility of an element
    fn computed_style(&self) -> ComputedStyle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computed_style_flags() {
        assert!(ComputedStyle::new("none", "visible").is_display_none());
        assert!(ComputedStyle::new("block", "hidden").is_visibility_hidden());
        assert!(ComputedStyle::new("table-row", "collapse").is_visibility_hidden());

        let style = ComputedStyle::default();
        assert!(!style.is_display_none());
        assert!(!style.is_visibility_hidden());
    }

    #[test]
    fn test_snapshot_node_export() {
        let node = SnapshotNode::element("div");
        assert_eq!(node.tag_name(), Some("div"));
        assert_eq!(node.kind(), NodeKind::Element);
    }
}
