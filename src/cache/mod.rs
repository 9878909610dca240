//! DOM cache: an immutable, index-addressed snapshot of a document
//!
//! The cache is produced once per evaluation by [`DomCacheBuilder`] and is
//! shared read-only by every rule. Nodes are stored in an arena and referenced
//! by [`NodeId`]; visibility is computed during the build and accessible names
//! are memoized on first use.

pub mod builder;
pub mod indexes;
pub mod roles;
pub mod visibility;

pub use builder::DomCacheBuilder;
pub use indexes::{HeadingsLandmarksIndex, IdIndex, PageIndexes, TimingIndex};
pub use visibility::{HidingFlags, Visibility};

use crate::accname::{self, AccessibleName};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use std::sync::OnceLock;

/// Index of a node inside its [`DomCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position in document order
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element-specific cached data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercase tag name
    pub tag_name: String,

    /// Attributes in document order
    pub attributes: IndexMap<String, String>,

    /// 1-based position among cached elements
    pub ordinal: usize,
}

/// Payload of a cached node
#[derive(Debug, Clone)]
pub enum NodeData {
    Element(ElementData),
    /// Merged, trimmed text of adjacent text nodes
    Text(String),
}

/// A cached element or text run
#[derive(Debug, Clone)]
pub struct NodeCache {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) data: NodeData,
    pub(crate) visibility: Visibility,
    pub(crate) role: Option<String>,
    pub(crate) explicit_role: bool,
    pub(crate) name: OnceLock<AccessibleName>,
}

impl NodeCache {
    pub(crate) fn new(id: NodeId, parent: Option<NodeId>, data: NodeData, visibility: Visibility) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            data,
            visibility,
            role: None,
            explicit_role: false,
            name: OnceLock::new(),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Element data, `None` for text runs
    pub fn element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    /// Merged text, `None` for elements
    pub fn text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.element().map(|e| e.tag_name.as_str())
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name().is_some_and(|t| t == tag)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.element()
            .and_then(|e| e.attributes.get(name))
            .map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Attributes in document order (empty for text runs)
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.element()
            .into_iter()
            .flat_map(|e| e.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Non-empty `id` attribute
    pub fn id(&self) -> Option<&str> {
        self.attribute("id").map(str::trim).filter(|id| !id.is_empty())
    }

    /// Effective `type` of an `input` element (defaults to `text`)
    pub fn input_type(&self) -> Option<String> {
        if !self.is_tag("input") {
            return None;
        }
        let input_type = self
            .attribute("type")
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "text".to_string());
        Some(input_type)
    }

    /// Explicit or implicit ARIA role
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// True when the role came from a `role` attribute
    pub fn has_explicit_role(&self) -> bool {
        self.explicit_role
    }

    /// Document-order position among elements (0 for text runs)
    pub fn ordinal(&self) -> usize {
        self.element().map(|e| e.ordinal).unwrap_or(0)
    }

    /// Visible to assistive technology
    pub fn is_visible(&self) -> bool {
        self.visibility.is_visible()
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    /// Memoized accessible name, if it has been resolved already
    pub fn cached_name(&self) -> Option<&AccessibleName> {
        self.name.get()
    }

    /// Short label used in result messages, e.g. `input[type=text]#email`
    pub fn element_name(&self) -> String {
        let Some(element) = self.element() else {
            return "#text".to_string();
        };
        let mut label = element.tag_name.clone();
        if let Some(input_type) = self.input_type() {
            label.push_str(&format!("[type={}]", input_type));
        }
        if self.explicit_role {
            if let Some(role) = self.role() {
                label.push_str(&format!("[role={}]", role));
            }
        }
        if let Some(id) = self.id() {
            label.push('#');
            label.push_str(id);
        }
        label
    }
}

/// Cached snapshot of one document
#[derive(Debug, Clone, Default)]
pub struct DomCache {
    pub(crate) nodes: Vec<NodeCache>,
    pub(crate) roots: Vec<NodeId>,
    pub(crate) indexes: PageIndexes,
}

impl DomCache {
    /// Number of cached nodes (elements and text runs)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of cached elements
    pub fn element_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_element()).count()
    }

    /// True if `id` belongs to this cache
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeCache> {
        self.nodes.get(id.0)
    }

    /// All nodes in document order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeCache> {
        self.nodes.iter()
    }

    /// All elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &NodeCache> {
        self.nodes.iter().filter(|n| n.is_element())
    }

    /// Top-level nodes
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// First top-level element (normally `html`)
    pub fn document_element(&self) -> Option<&NodeCache> {
        self.roots
            .iter()
            .filter_map(|&id| self.get(id))
            .find(|n| n.is_element())
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &NodeCache> {
        self.get(id)
            .into_iter()
            .flat_map(|n| n.children.iter())
            .filter_map(|&child| self.get(child))
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &NodeCache> {
        let mut next = self.get(id).and_then(|n| n.parent);
        std::iter::from_fn(move || {
            let node = self.get(next?)?;
            next = node.parent;
            Some(node)
        })
    }

    /// Descendants in document order (excluding the node itself)
    pub fn descendants(&self, id: NodeId) -> Vec<&NodeCache> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .get(id)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            if let Some(node) = self.get(current) {
                out.push(node);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Element whose `id` attribute equals `id` (first occurrence)
    pub fn element_by_id(&self, id: &str) -> Option<&NodeCache> {
        self.indexes.ids.get(id).and_then(|node| self.get(node))
    }

    /// `label` elements whose `for` attribute references `id`
    pub fn labels_for(&self, id: &str) -> impl Iterator<Item = &NodeCache> {
        self.indexes
            .label_for
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|&label| self.get(label))
    }

    /// Representative node for page-scoped rules
    pub fn page_element(&self) -> Option<&NodeCache> {
        self.indexes
            .headings_landmarks
            .page_element
            .and_then(|id| self.get(id))
    }

    pub fn indexes(&self) -> &PageIndexes {
        &self.indexes
    }

    /// `lang` of the document element
    pub fn lang(&self) -> Option<&str> {
        self.indexes.lang.as_deref()
    }

    /// Resolve nodes from an index
    pub fn resolve<'a>(&'a self, ids: &'a [NodeId]) -> impl Iterator<Item = &'a NodeCache> {
        ids.iter().filter_map(|&id| self.get(id))
    }

    /// Accessible name of a node, resolved once and memoized
    pub fn accessible_name(&self, id: NodeId) -> Option<&AccessibleName> {
        let node = self.get(id)?;
        Some(node.name.get_or_init(|| accname::resolve_name(id, self)))
    }

    /// Accessible name as a string (empty when the node has none)
    pub fn name_of(&self, id: NodeId) -> &str {
        self.accessible_name(id).map(|n| n.name.as_str()).unwrap_or("")
    }

    /// Accessible description of a node
    pub fn accessible_description(&self, id: NodeId) -> String {
        accname::resolve_description(id, self)
    }
}

impl Index<NodeId> for DomCache {
    type Output = NodeCache;

    fn index(&self, id: NodeId) -> &NodeCache {
        &self.nodes[id.0]
    }
}
