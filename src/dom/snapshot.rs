use crate::dom::{ComputedStyle, HostNode, NodeKind};
use crate::error::{EvalError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A captured document node
///
/// Produced by the in-page capture script or built by hand in tests. Slot
/// elements inside a shadow root carry their assigned nodes as children.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotNode {
    /// Node type
    #[serde(default)]
    pub node_type: NodeKind,

    /// Lowercase tag name (element nodes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,

    /// Element attributes (e.g., id, role, aria-label)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,

    /// Character data (text nodes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Light DOM children
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,

    /// Children of an attached open shadow root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_root: Option<Vec<SnapshotNode>>,

    /// Computed style of the element
    #[serde(default)]
    pub style: ComputedStyle,
}

impl SnapshotNode {
    /// Create a new element node
    pub fn element(tag_name: impl Into<String>) -> Self {
        Self {
            node_type: NodeKind::Element,
            tag_name: Some(tag_name.into().to_ascii_lowercase()),
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
            shadow_root: None,
            style: ComputedStyle::default(),
        }
    }

    /// Create a new text node
    pub fn text_node(text: impl Into<String>) -> Self {
        Self {
            node_type: NodeKind::Text,
            tag_name: None,
            attributes: IndexMap::new(),
            text: Some(text.into()),
            children: Vec::new(),
            shadow_root: None,
            style: ComputedStyle::default(),
        }
    }

    /// Create a document node wrapping the given root element
    pub fn document(root: SnapshotNode) -> Self {
        Self {
            node_type: NodeKind::Document,
            tag_name: None,
            attributes: IndexMap::new(),
            text: None,
            children: vec![root],
            shadow_root: None,
            style: ComputedStyle::default(),
        }
    }

    /// Builder method: set an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder method: append a text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(SnapshotNode::text_node(text));
        self
    }

    /// Builder method: append a child
    pub fn with_child(mut self, child: SnapshotNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<SnapshotNode>) -> Self {
        self.children = children;
        self
    }

    /// Builder method: attach an open shadow root
    pub fn with_shadow_root(mut self, children: Vec<SnapshotNode>) -> Self {
        self.shadow_root = Some(children);
        self
    }

    /// Builder method: set computed style
    pub fn with_style(mut self, display: impl Into<String>, visibility: impl Into<String>) -> Self {
        self.style = ComputedStyle::new(display, visibility);
        self
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Add a child node
    pub fn add_child(&mut self, child: SnapshotNode) {
        self.children.push(child);
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    /// Get element ID
    pub fn id(&self) -> Option<&String> {
        self.attributes.get("id")
    }

    /// Check if node is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name
            .as_deref()
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    }

    /// Decode a snapshot from the JSON produced by the capture script
    ///
    /// Page nesting is unbounded; deep trees grow the stack on the heap
    /// instead of hitting the parser's recursion limit.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        deserializer.disable_recursion_limit();

        let decoded = Self::deserialize(serde_stacker::Deserializer::new(&mut deserializer));
        decoded
            .and_then(|node| deserializer.end().map(|()| node))
            .map_err(|e| EvalError::SnapshotParse(format!("Failed to parse snapshot JSON: {}", e)))
    }

    /// Encode the snapshot as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EvalError::Serialization(format!("Failed to serialize snapshot: {}", e)))
    }

    /// Count element nodes in the composed tree
    pub fn count_elements(&self) -> usize {
        let own = usize::from(self.node_type == NodeKind::Element);
        own + self
            .composed_children()
            .into_iter()
            .map(|c| c.count_elements())
            .sum::<usize>()
    }
}

impl HostNode for SnapshotNode {
    fn kind(&self) -> NodeKind {
        self.node_type
    }

    fn tag_name(&self) -> Option<&str> {
        self.tag_name.as_deref()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn attributes(&self) -> Vec<(&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn composed_children(&self) -> Vec<&Self> {
        match &self.shadow_root {
            Some(shadow) => shadow.iter().collect(),
            None => self.children.iter().collect(),
        }
    }

    fn computed_style(&self) -> ComputedStyle {
        self.style.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_node_creation() {
        let node = SnapshotNode::element("INPUT")
            .with_attribute("id", "control-11")
            .with_attribute("type", "text");

        assert_eq!(node.tag_name.as_deref(), Some("input"));
        assert_eq!(node.id(), Some(&"control-11".to_string()));
        assert!(node.is_tag("input"));
        assert_eq!(node.attribute("type"), Some("text"));
        assert_eq!(node.attributes(), vec![("id", "control-11"), ("type", "text")]);
    }

    #[test]
    fn test_composed_children_prefer_shadow_root() {
        let host = SnapshotNode::element("my-widget")
            .with_child(SnapshotNode::element("span"))
            .with_shadow_root(vec![
                SnapshotNode::element("button").with_text("Go"),
                SnapshotNode::element("p"),
            ]);

        let children = host.composed_children();
        assert_eq!(children.len(), 2);
        assert!(children[0].is_tag("button"));
        assert!(children[1].is_tag("p"));
    }

    #[test]
    fn test_count_elements() {
        let root = SnapshotNode::element("body")
            .with_child(SnapshotNode::element("main").with_child(SnapshotNode::element("h1").with_text("Title")))
            .with_child(SnapshotNode::element("footer"));

        // body, main, h1, footer
        assert_eq!(root.count_elements(), 4);
    }

    #[test]
    fn test_json_decoding_with_defaults() {
        let json = r#"{
            "tag_name": "div",
            "attributes": {"aria-hidden": "true"},
            "style": {"display": "block"},
            "children": [{"node_type": "text", "text": "hello"}]
        }"#;

        let node = SnapshotNode::from_json(json).unwrap();
        assert_eq!(node.kind(), NodeKind::Element);
        assert_eq!(node.attribute("aria-hidden"), Some("true"));
        assert_eq!(node.style.display, "block");
        assert_eq!(node.style.visibility, "");
        assert_eq!(node.children[0].text(), Some("hello"));
    }

    #[test]
    fn test_deeply_nested_json() {
        let mut node = SnapshotNode::element("span").with_text("leaf");
        for _ in 0..300 {
            node = SnapshotNode::element("div").with_child(node);
        }
        let json = node.to_json().unwrap();

        let decoded = SnapshotNode::from_json(&json).unwrap();
        assert_eq!(decoded.count_elements(), 301);
    }

    #[test]
    fn test_trailing_characters_are_rejected() {
        let err = SnapshotNode::from_json(r#"{"tag_name": "div"} extra"#).unwrap_err();
        assert!(matches!(err, EvalError::SnapshotParse(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = SnapshotNode::from_json("{ not json").unwrap_err();
        assert!(matches!(err, EvalError::SnapshotParse(_)));
    }

    #[test]
    fn test_serialization() {
        let node = SnapshotNode::element("label")
            .with_attribute("for", "name")
            .with_text("Name")
            .with_style("inline", "visible");

        let json = node.to_json().unwrap();
        let decoded = SnapshotNode::from_json(&json).unwrap();
        assert_eq!(node, decoded);
    }
}
