use crate::cache::indexes::PageIndexes;
use crate::cache::roles::{implicit_role, NAMED_LANDMARK_ROLES};
use crate::cache::visibility::{HidingFlags, Visibility};
use crate::cache::{DomCache, ElementData, NodeCache, NodeData, NodeId};
use crate::dom::{HostNode, NodeKind};
use indexmap::IndexMap;

/// Elements that are never cached, together with their subtrees
const SKIPPABLE_TAGS: &[&str] = &[
    "base", "content", "link", "meta", "noscript", "script", "shadow", "style", "template", "title",
];

/// Builds a [`DomCache`] from any [`HostNode`] tree
///
/// One depth-first pass over the composed tree. Visibility is derived from the
/// parent's memoized value, so the whole pass is linear in the node count.
#[derive(Debug, Default)]
pub struct DomCacheBuilder {
    nodes: Vec<NodeCache>,
    roots: Vec<NodeId>,
    indexes: PageIndexes,
    element_count: usize,
}

impl DomCacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the cache for a document (or a detached element subtree)
    pub fn build<N: HostNode>(root: &N) -> DomCache {
        let mut builder = Self::new();
        builder.visit(root, None);
        builder.finish()
    }

    fn visit<N: HostNode>(&mut self, node: &N, parent: Option<NodeId>) {
        match node.kind() {
            NodeKind::Document => self.visit_children(node, parent),
            NodeKind::Element => self.push_element(node, parent),
            NodeKind::Text => {
                if let Some(text) = node.text() {
                    self.push_text(text, parent);
                }
            }
            NodeKind::Comment => {}
        }
    }

    fn visit_children<N: HostNode>(&mut self, node: &N, parent: Option<NodeId>) {
        for child in node.composed_children() {
            self.visit(child, parent);
        }
    }

    fn push_text(&mut self, text: &str, parent: Option<NodeId>) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        // Text outside any element has nowhere to attach
        let Some(parent) = parent else {
            return;
        };

        let last_child = self.nodes[parent.index()].children.last().copied();
        if let Some(last) = last_child {
            if let NodeData::Text(existing) = &mut self.nodes[last.index()].data {
                existing.push(' ');
                existing.push_str(text);
                return;
            }
        }

        let visibility = Visibility::text(Some(&self.nodes[parent.index()].visibility));
        let id = self.alloc(Some(parent), NodeData::Text(text.to_string()), visibility);
        self.nodes[parent.index()].children.push(id);
    }

    fn push_element<N: HostNode>(&mut self, node: &N, parent: Option<NodeId>) {
        let Some(tag) = node.tag_name().map(str::to_ascii_lowercase) else {
            return;
        };

        let attributes: IndexMap<String, String> = node
            .attributes()
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
            .collect();
        let attribute = |name: &str| attributes.get(name).map(String::as_str);

        if is_skippable(&tag, attribute("type")) {
            return;
        }

        // Slots are transparent: assigned content belongs to the slot's parent
        if tag == "slot" {
            self.visit_children(node, parent);
            return;
        }

        let style = node.computed_style();
        let own = HidingFlags::from_element(attribute("hidden").is_some(), attribute("aria-hidden"), &style);
        let visibility = match parent {
            Some(parent) => Visibility::inherit(&self.nodes[parent.index()].visibility, own),
            None => Visibility::root(own),
        };

        self.element_count += 1;
        let data = NodeData::Element(ElementData {
            tag_name: tag,
            attributes,
            ordinal: self.element_count,
        });
        let id = self.alloc(parent, data, visibility);
        self.assign_role(id);

        let is_document_element = match parent {
            Some(parent) => {
                self.nodes[parent.index()].children.push(id);
                false
            }
            None => {
                let first = !self.roots.iter().any(|&r| self.nodes[r.index()].is_element());
                self.roots.push(id);
                first
            }
        };
        self.indexes.record(&self.nodes[id.index()], is_document_element);

        self.visit_children(node, Some(id));
    }

    fn alloc(&mut self, parent: Option<NodeId>, data: NodeData, visibility: Visibility) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(NodeCache::new(id, parent, data, visibility));
        id
    }

    fn assign_role(&mut self, id: NodeId) {
        let node = &self.nodes[id.index()];
        let explicit = node
            .attribute("role")
            .and_then(|r| r.split_whitespace().next())
            .map(str::to_ascii_lowercase);

        let (role, explicit_role) = match explicit {
            Some(role) => (Some(role), true),
            None => {
                let tag = node.tag_name().unwrap_or_default();
                let role = implicit_role(tag, |name| node.attribute(name));
                (role.map(str::to_string), false)
            }
        };

        let node = &mut self.nodes[id.index()];
        node.role = role;
        node.explicit_role = explicit_role;
    }

    /// Drop unnamed form/region landmarks and hand over the cache
    fn finish(self) -> DomCache {
        let mut cache = DomCache {
            nodes: self.nodes,
            roots: self.roots,
            indexes: self.indexes,
        };

        let document_element = cache.document_element().map(NodeCache::node_id);
        cache.indexes.finish(document_element);

        let landmarks: Vec<NodeId> = cache
            .indexes
            .headings_landmarks
            .landmarks
            .iter()
            .copied()
            .filter(|&id| {
                let needs_name = cache[id]
                    .role()
                    .is_some_and(|role| NAMED_LANDMARK_ROLES.contains(&role));
                !needs_name || !cache.name_of(id).is_empty()
            })
            .collect();
        cache.indexes.headings_landmarks.landmarks = landmarks;

        log::debug!(
            "DOM cache built: {} nodes, {} elements, {} landmarks, {} headings",
            cache.len(),
            cache.element_count(),
            cache.indexes.headings_landmarks.landmarks.len(),
            cache.indexes.headings_landmarks.headings.len()
        );

        cache
    }
}

fn is_skippable(tag: &str, input_type: Option<&str>) -> bool {
    if tag == "input" {
        return input_type.is_some_and(|t| t.trim().eq_ignore_ascii_case("hidden"));
    }
    SKIPPABLE_TAGS.contains(&tag)
}
