use crate::cache::roles::{is_form_control, is_landmark_role};
use crate::cache::{NodeCache, NodeId};
use indexmap::{IndexMap, IndexSet};

/// Elements whose content may move, blink or auto-update
const TIMING_TAGS: &[&str] = &["blink", "canvas", "embed", "marquee", "object", "svg", "video"];

/// Map of `id` attribute values to elements
///
/// The first element carrying an id wins; later ones are recorded as
/// duplicates so rules can report them.
#[derive(Debug, Clone, Default)]
pub struct IdIndex {
    map: IndexMap<String, NodeId>,
    duplicates: IndexSet<String>,
}

impl IdIndex {
    /// Record an element's id
    pub fn insert(&mut self, id: &str, node: NodeId) {
        if self.map.contains_key(id) {
            self.duplicates.insert(id.to_string());
        } else {
            self.map.insert(id.to_string(), node);
        }
    }

    /// Look up the element carrying `id`
    pub fn get(&self, id: &str) -> Option<NodeId> {
        self.map.get(id).copied()
    }

    /// Id values used by more than one element
    pub fn duplicates(&self) -> impl Iterator<Item = &str> {
        self.duplicates.iter().map(String::as_str)
    }

    /// Number of distinct ids
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if no element carries an id
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Page structure: headings and landmark regions
#[derive(Debug, Clone, Default)]
pub struct HeadingsLandmarksIndex {
    /// Representative node for page-scoped results
    pub page_element: Option<NodeId>,

    /// Elements with role heading, in document order
    pub headings: Vec<NodeId>,

    /// Landmark regions (form and region only when named)
    pub landmarks: Vec<NodeId>,

    /// Elements with role main
    pub main_elements: Vec<NodeId>,
}

/// Content that changes over time
#[derive(Debug, Clone, Default)]
pub struct TimingIndex {
    /// Representative node for page-scoped timing results
    pub page_element: Option<NodeId>,

    /// Media, animation and plugin elements
    pub timing_elements: Vec<NodeId>,
}

/// All secondary indexes of a [`DomCache`](crate::cache::DomCache)
///
/// Indexes hold [`NodeId`]s only; the nodes themselves live in the cache.
#[derive(Debug, Clone, Default)]
pub struct PageIndexes {
    pub ids: IdIndex,

    /// `label[for]` elements keyed by the referenced id
    pub label_for: IndexMap<String, Vec<NodeId>>,

    pub headings_landmarks: HeadingsLandmarksIndex,

    pub timing: TimingIndex,

    /// Form controls and buttons
    pub controls: Vec<NodeId>,

    /// Elements with role link
    pub links: Vec<NodeId>,

    /// `img`, `area` and elements with role img
    pub images: Vec<NodeId>,

    /// Elements carrying inline `on*` event handler attributes
    pub event_handlers: Vec<NodeId>,

    /// `lang` of the document element
    pub lang: Option<String>,
}

impl PageIndexes {
    /// Add a freshly cached element to every index it belongs to
    pub(crate) fn record(&mut self, node: &NodeCache, is_document_element: bool) {
        let Some(tag) = node.tag_name() else {
            return;
        };
        let id = node.node_id();

        if let Some(value) = node.id() {
            self.ids.insert(value, id);
        }

        if is_document_element {
            self.lang = node
                .attribute("lang")
                .map(str::trim)
                .filter(|lang| !lang.is_empty())
                .map(str::to_string);
        }

        if tag == "body" && self.headings_landmarks.page_element.is_none() {
            self.headings_landmarks.page_element = Some(id);
            self.timing.page_element = Some(id);
        }

        if tag == "label" {
            if let Some(target) = node.attribute("for").map(str::trim).filter(|t| !t.is_empty()) {
                self.label_for.entry(target.to_string()).or_default().push(id);
            }
        }

        match node.role() {
            Some("heading") => self.headings_landmarks.headings.push(id),
            Some("link") => self.links.push(id),
            Some("img") if tag != "img" => self.images.push(id),
            Some(role) if is_landmark_role(role) => {
                self.headings_landmarks.landmarks.push(id);
                if role == "main" {
                    self.headings_landmarks.main_elements.push(id);
                }
            }
            _ => {}
        }

        if is_form_control(tag) || tag == "button" {
            self.controls.push(id);
        }

        if tag == "img" || tag == "area" {
            self.images.push(id);
        }

        if TIMING_TAGS.contains(&tag) || is_animated_image(node) {
            self.timing.timing_elements.push(id);
        }

        if node
            .attributes()
            .any(|(name, _)| name.len() > 2 && name.starts_with("on"))
        {
            self.event_handlers.push(id);
        }
    }

    /// Fall back to the document element when the page has no body
    pub(crate) fn finish(&mut self, document_element: Option<NodeId>) {
        if self.headings_landmarks.page_element.is_none() {
            self.headings_landmarks.page_element = document_element;
        }
        if self.timing.page_element.is_none() {
            self.timing.page_element = self.headings_landmarks.page_element;
        }
    }
}

fn is_animated_image(node: &NodeCache) -> bool {
    node.is_tag("img")
        && node
            .attribute("src")
            .is_some_and(|src| src.trim().to_ascii_lowercase().ends_with(".gif"))
}
