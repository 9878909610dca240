//! Accessible name computation
//!
//! Priority chain, stopping at the first non-empty result:
//! 1. `aria-labelledby`
//! 2. `aria-label`
//! 3. native labelling (`label[for]`, wrapping `label`, `alt`, `value`,
//!    `legend`, `caption`, `figcaption`, `placeholder`)
//! 4. `title`
//! 5. visible content, for elements whose role allows it
//!
//! Text referenced through `aria-labelledby` is taken from the referenced
//! element's subtree. That element's own `aria-label` is only used when the
//! subtree yields no text.

use crate::cache::roles::{allows_name_from_contents, is_form_control};
use crate::cache::{DomCache, NodeCache, NodeData, NodeId};
use serde::{Deserialize, Serialize};

/// Step of the computation that produced a name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    AriaLabelledby,
    AriaLabel,
    LabelReference,
    LabelEncapsulation,
    Alt,
    Value,
    Default,
    Legend,
    Caption,
    Figcaption,
    Placeholder,
    Title,
    Contents,
    #[default]
    None,
}

/// A resolved accessible name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibleName {
    pub name: String,
    pub source: NameSource,
}

impl AccessibleName {
    fn new(name: String, source: NameSource) -> Self {
        Self { name, source }
    }

    /// True when no step produced a name
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// Resolve the accessible name of `id`
///
/// Prefer [`DomCache::accessible_name`], which memoizes the result.
pub fn resolve_name(id: NodeId, cache: &DomCache) -> AccessibleName {
    let Some(node) = cache.get(id) else {
        return AccessibleName::default();
    };

    let element = match node.data() {
        NodeData::Text(text) => return AccessibleName::new(text.clone(), NameSource::Contents),
        NodeData::Element(element) => element,
    };
    let tag = element.tag_name.as_str();

    if let Some(refs) = node.attribute("aria-labelledby") {
        let name = referenced_text(cache, refs);
        if !name.is_empty() {
            return AccessibleName::new(name, NameSource::AriaLabelledby);
        }
    }

    if let Some(label) = non_empty(node.attribute("aria-label")) {
        return AccessibleName::new(label, NameSource::AriaLabel);
    }

    if let Some(name) = native_name(cache, node, tag) {
        return name;
    }

    if let Some(title) = non_empty(node.attribute("title")) {
        return AccessibleName::new(title, NameSource::Title);
    }

    if allows_name_from_contents(tag, node.role()) {
        let name = visible_contents(cache, id, None);
        if !name.is_empty() {
            return AccessibleName::new(name, NameSource::Contents);
        }
    }

    AccessibleName::default()
}

/// Resolve the accessible description of `id`
///
/// `aria-describedby` first, then `title` when the title did not already
/// supply the name.
pub fn resolve_description(id: NodeId, cache: &DomCache) -> String {
    let Some(node) = cache.get(id) else {
        return String::new();
    };

    if let Some(refs) = node.attribute("aria-describedby") {
        let description = referenced_text(cache, refs);
        if !description.is_empty() {
            return description;
        }
    }

    let name_source = cache.accessible_name(id).map(|n| n.source);
    match non_empty(node.attribute("title")) {
        Some(title) if name_source != Some(NameSource::Title) => title,
        _ => String::new(),
    }
}

/// Text of the elements named by a whitespace-separated id list
fn referenced_text(cache: &DomCache, refs: &str) -> String {
    let mut parts = Vec::new();
    for reference in refs.split_whitespace() {
        let Some(target) = cache.element_by_id(reference) else {
            log::debug!("id reference '{}' does not resolve to an element", reference);
            continue;
        };

        // Referenced content counts even when the target itself is hidden
        let mut text = Vec::new();
        collect_contents(cache, target.node_id(), None, &mut text);
        let text = join(text);

        if !text.is_empty() {
            parts.push(text);
        } else if let Some(label) = non_empty(target.attribute("aria-label")) {
            parts.push(label);
        }
    }
    join(parts)
}

fn native_name(cache: &DomCache, node: &NodeCache, tag: &str) -> Option<AccessibleName> {
    let input_type = node.input_type();

    match (tag, input_type.as_deref()) {
        ("img" | "area", _) => {
            non_empty(node.attribute("alt")).map(|alt| AccessibleName::new(alt, NameSource::Alt))
        }
        ("input", Some("image")) => non_empty(node.attribute("alt"))
            .map(|alt| AccessibleName::new(alt, NameSource::Alt))
            .or_else(|| {
                non_empty(node.attribute("value"))
                    .map(|value| AccessibleName::new(value, NameSource::Value))
            }),
        ("input", Some(kind @ ("button" | "submit" | "reset"))) => {
            if let Some(value) = non_empty(node.attribute("value")) {
                return Some(AccessibleName::new(value, NameSource::Value));
            }
            if let Some(name) = label_name(cache, node) {
                return Some(name);
            }
            match kind {
                "submit" => Some(AccessibleName::new("Submit".to_string(), NameSource::Default)),
                "reset" => Some(AccessibleName::new("Reset".to_string(), NameSource::Default)),
                _ => None,
            }
        }
        ("input" | "textarea", _) => label_name(cache, node).or_else(|| {
            let text_like = tag == "textarea"
                || matches!(
                    input_type.as_deref(),
                    Some("text" | "email" | "password" | "search" | "tel" | "url" | "number")
                );
            if text_like {
                non_empty(node.attribute("placeholder"))
                    .map(|p| AccessibleName::new(p, NameSource::Placeholder))
            } else {
                None
            }
        }),
        ("select" | "button" | "meter" | "progress" | "output", _) => label_name(cache, node),
        ("fieldset", _) => child_contents(cache, node, "legend", NameSource::Legend),
        ("table", _) => child_contents(cache, node, "caption", NameSource::Caption),
        ("figure", _) => child_contents(cache, node, "figcaption", NameSource::Figcaption),
        _ => None,
    }
}

/// `label[for]` first, then a wrapping `label`
fn label_name(cache: &DomCache, node: &NodeCache) -> Option<AccessibleName> {
    if let Some(id) = node.id() {
        let referenced = cache
            .labels_for(id)
            .map(|label| visible_contents(cache, label.node_id(), Some(node.node_id())))
            .find(|text| !text.is_empty());
        if let Some(text) = referenced {
            return Some(AccessibleName::new(text, NameSource::LabelReference));
        }
    }

    let label = cache.ancestors(node.node_id()).find(|a| a.is_tag("label"))?;
    let text = visible_contents(cache, label.node_id(), Some(node.node_id()));
    (!text.is_empty()).then(|| AccessibleName::new(text, NameSource::LabelEncapsulation))
}

fn child_contents(
    cache: &DomCache,
    node: &NodeCache,
    child_tag: &str,
    source: NameSource,
) -> Option<AccessibleName> {
    let child = cache.children(node.node_id()).find(|c| c.is_tag(child_tag))?;
    let text = visible_contents(cache, child.node_id(), None);
    (!text.is_empty()).then(|| AccessibleName::new(text, source))
}

/// Content text of a node that must itself be visible
fn visible_contents(cache: &DomCache, id: NodeId, exclude: Option<NodeId>) -> String {
    if !cache.get(id).is_some_and(NodeCache::is_visible) {
        return String::new();
    }
    let mut parts = Vec::new();
    collect_contents(cache, id, exclude, &mut parts);
    join(parts)
}

/// Collect text below `id`, skipping descendants that hide themselves
fn collect_contents(cache: &DomCache, id: NodeId, exclude: Option<NodeId>, out: &mut Vec<String>) {
    for child in cache.children(id) {
        if Some(child.node_id()) == exclude {
            continue;
        }
        match child.data() {
            NodeData::Text(text) => out.push(text.clone()),
            NodeData::Element(element) => {
                if child.visibility().hides_self() {
                    continue;
                }
                if is_embedded_control(child) {
                    out.extend(embedded_value(cache, child));
                    continue;
                }
                if let Some(label) = non_empty(child.attribute("aria-label")) {
                    out.push(label);
                    continue;
                }
                match element.tag_name.as_str() {
                    "img" | "area" => out.extend(non_empty(child.attribute("alt"))),
                    tag if is_form_control(tag) => {
                        if child.input_type().as_deref() == Some("image") {
                            out.extend(non_empty(child.attribute("alt")));
                        }
                    }
                    _ => collect_contents(cache, child.node_id(), exclude, out),
                }
            }
        }
    }
}

/// Controls whose current value reads as part of surrounding text
fn is_embedded_control(node: &NodeCache) -> bool {
    let text_input = matches!(
        node.input_type().as_deref(),
        Some("button" | "email" | "number" | "password" | "range" | "tel" | "text" | "url")
    );
    text_input || node.is_tag("select") || matches!(node.role(), Some("slider" | "spinbutton"))
}

fn embedded_value(cache: &DomCache, node: &NodeCache) -> Option<String> {
    if node.is_tag("input") {
        return non_empty(node.attribute("value"));
    }
    if node.is_tag("select") {
        return selected_options(cache, node);
    }
    non_empty(node.attribute("aria-valuetext")).or_else(|| non_empty(node.attribute("aria-valuenow")))
}

/// Values of the selected options; a single select shows its first option by default
fn selected_options(cache: &DomCache, select: &NodeCache) -> Option<String> {
    let options: Vec<&NodeCache> = cache
        .descendants(select.node_id())
        .into_iter()
        .filter(|n| n.is_tag("option"))
        .collect();

    let mut selected: Vec<&NodeCache> = options.iter().copied().filter(|o| o.has_attribute("selected")).collect();
    if selected.is_empty() && !select.has_attribute("multiple") {
        selected.extend(options.first().copied());
    }

    let values: Vec<String> = selected
        .into_iter()
        .filter_map(|option| {
            non_empty(option.attribute("value")).or_else(|| {
                let mut text = Vec::new();
                collect_contents(cache, option.node_id(), None, &mut text);
                Some(join(text)).filter(|t| !t.is_empty())
            })
        })
        .collect();
    Some(join(values)).filter(|v| !v.is_empty())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(normalize)
        .filter(|v| !v.is_empty())
}

fn join(parts: Vec<String>) -> String {
    normalize(&parts.join(" "))
}

/// Collapse runs of whitespace and trim
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DomCacheBuilder;
    use crate::dom::SnapshotNode;

    fn build(children: Vec<SnapshotNode>) -> DomCache {
        DomCacheBuilder::build(&SnapshotNode::document(
            SnapshotNode::element("html")
                .with_child(SnapshotNode::element("body").with_children(children)),
        ))
    }

    fn name(cache: &DomCache, id: &str) -> AccessibleName {
        let node = cache.element_by_id(id).unwrap();
        cache.accessible_name(node.node_id()).cloned().unwrap()
    }

    fn input(id: &str) -> SnapshotNode {
        SnapshotNode::element("input")
            .with_attribute("id", id)
            .with_attribute("type", "text")
    }

    #[test]
    fn test_label_reference() {
        let cache = build(vec![
            SnapshotNode::element("label")
                .with_attribute("for", "control-11")
                .with_text("Label Reference 1"),
            input("control-11"),
        ]);
        let resolved = name(&cache, "control-11");
        assert_eq!(resolved.name, "Label Reference 1");
        assert_eq!(resolved.source, NameSource::LabelReference);
    }

    #[test]
    fn test_aria_label_beats_wrapping_label() {
        let cache = build(vec![
            SnapshotNode::element("label")
                .with_text("Y")
                .with_child(input("c").with_attribute("aria-label", "X")),
        ]);
        let resolved = name(&cache, "c");
        assert_eq!(resolved.name, "X");
        assert_eq!(resolved.source, NameSource::AriaLabel);
    }

    #[test]
    fn test_explicit_label_beats_encapsulation() {
        let cache = build(vec![
            SnapshotNode::element("label").with_attribute("for", "c").with_text("Explicit"),
            SnapshotNode::element("label").with_text("Wrapping").with_child(input("c")),
        ]);
        assert_eq!(name(&cache, "c").name, "Explicit");
    }

    #[test]
    fn test_encapsulating_label_excludes_control() {
        let cache = build(vec![
            SnapshotNode::element("label")
                .with_text("Email")
                .with_child(input("c").with_attribute("value", "me@example.com")),
        ]);
        let resolved = name(&cache, "c");
        assert_eq!(resolved.name, "Email");
        assert_eq!(resolved.source, NameSource::LabelEncapsulation);
    }

    #[test]
    fn test_embedded_controls_read_their_values() {
        let cache = build(vec![
            SnapshotNode::element("label")
                .with_attribute("for", "x")
                .with_text("Send ")
                .with_child(input("copies").with_attribute("value", "3"))
                .with_text(" copies"),
            input("x"),
            SnapshotNode::element("label")
                .with_attribute("for", "y")
                .with_text("Ship by")
                .with_child(
                    SnapshotNode::element("select")
                        .with_child(SnapshotNode::element("option").with_text("Air"))
                        .with_child(
                            SnapshotNode::element("option")
                                .with_attribute("selected", "")
                                .with_attribute("value", "Sea")
                                .with_text("Boat"),
                        ),
                ),
            input("y"),
            SnapshotNode::element("span")
                .with_attribute("id", "volume")
                .with_text("Volume")
                .with_child(
                    SnapshotNode::element("div")
                        .with_attribute("role", "slider")
                        .with_attribute("aria-valuenow", "7")
                        .with_attribute("aria-valuetext", "loud"),
                ),
            input("z").with_attribute("aria-labelledby", "volume"),
        ]);
        assert_eq!(name(&cache, "x").name, "Send 3 copies");
        assert_eq!(name(&cache, "y").name, "Ship by Sea");
        assert_eq!(name(&cache, "z").name, "Volume loud");
    }

    #[test]
    fn test_single_select_defaults_to_first_option() {
        let cache = build(vec![
            SnapshotNode::element("label")
                .with_attribute("for", "qty")
                .with_text("Buy")
                .with_child(
                    SnapshotNode::element("select")
                        .with_child(SnapshotNode::element("option").with_text("one"))
                        .with_child(SnapshotNode::element("option").with_text("two")),
                )
                .with_text("tickets"),
            input("qty"),
            SnapshotNode::element("label")
                .with_attribute("for", "pick")
                .with_text("Pick")
                .with_child(
                    SnapshotNode::element("select")
                        .with_attribute("multiple", "")
                        .with_child(SnapshotNode::element("option").with_text("red")),
                ),
            input("pick"),
        ]);
        assert_eq!(name(&cache, "qty").name, "Buy one tickets");
        assert_eq!(name(&cache, "pick").name, "Pick");
    }

    #[test]
    fn test_labelledby() {
        let cache = build(vec![
            SnapshotNode::element("span").with_attribute("id", "ref").with_text("Z"),
            input("c").with_attribute("aria-labelledby", "ref"),
        ]);
        let resolved = name(&cache, "c");
        assert_eq!(resolved.name, "Z");
        assert_eq!(resolved.source, NameSource::AriaLabelledby);
    }

    #[test]
    fn test_unresolved_labelledby_falls_through() {
        let cache = build(vec![
            input("c")
                .with_attribute("aria-labelledby", "missing")
                .with_attribute("aria-label", "Fallback"),
        ]);
        let resolved = name(&cache, "c");
        assert_eq!(resolved.name, "Fallback");
        assert_eq!(resolved.source, NameSource::AriaLabel);
    }

    #[test]
    fn test_labelledby_prefers_subtree_text() {
        let cache = build(vec![
            SnapshotNode::element("div")
                .with_attribute("id", "a")
                .with_attribute("aria-label", "Ignored")
                .with_text("Subtree"),
            SnapshotNode::element("div")
                .with_attribute("id", "b")
                .with_attribute("aria-label", "Used"),
            input("c").with_attribute("aria-labelledby", "a b"),
        ]);
        assert_eq!(name(&cache, "c").name, "Subtree Used");
    }

    #[test]
    fn test_labelledby_hidden_target_still_counts() {
        let cache = build(vec![
            SnapshotNode::element("div")
                .with_attribute("id", "ref")
                .with_attribute("hidden", "")
                .with_text("Hidden label")
                .with_child(
                    SnapshotNode::element("span")
                        .with_style("none", "")
                        .with_text("not this"),
                ),
            input("c").with_attribute("aria-labelledby", "ref"),
        ]);
        assert_eq!(name(&cache, "c").name, "Hidden label");
    }

    #[test]
    fn test_contents_skip_hidden_descendants() {
        let cache = build(vec![
            SnapshotNode::element("a")
                .with_attribute("id", "link")
                .with_attribute("href", "/")
                .with_text("Read")
                .with_child(SnapshotNode::element("span").with_attribute("aria-hidden", "true").with_text("icon"))
                .with_child(SnapshotNode::element("img").with_attribute("alt", "more")),
        ]);
        let resolved = name(&cache, "link");
        assert_eq!(resolved.name, "Read more");
        assert_eq!(resolved.source, NameSource::Contents);
    }

    #[test]
    fn test_title_before_contents() {
        let cache = build(vec![
            SnapshotNode::element("button")
                .with_attribute("id", "b")
                .with_attribute("title", "Close dialog")
                .with_text("X"),
        ]);
        assert_eq!(name(&cache, "b").source, NameSource::Title);
    }

    #[test]
    fn test_no_name_from_contents_for_generic_elements() {
        let cache = build(vec![SnapshotNode::element("div").with_attribute("id", "d").with_text("Text")]);
        let resolved = name(&cache, "d");
        assert!(resolved.is_empty());
        assert_eq!(resolved.source, NameSource::None);
    }

    #[test]
    fn test_native_extras() {
        let cache = build(vec![
            SnapshotNode::element("input").with_attribute("id", "s").with_attribute("type", "submit"),
            SnapshotNode::element("input")
                .with_attribute("id", "i")
                .with_attribute("type", "image")
                .with_attribute("alt", "Search"),
            input("p").with_attribute("placeholder", "Your name"),
            SnapshotNode::element("fieldset")
                .with_attribute("id", "f")
                .with_child(SnapshotNode::element("legend").with_text("Shipping")),
            SnapshotNode::element("img").with_attribute("id", "img").with_attribute("alt", " Logo "),
        ]);
        assert_eq!(name(&cache, "s"), AccessibleName::new("Submit".into(), NameSource::Default));
        assert_eq!(name(&cache, "i").source, NameSource::Alt);
        assert_eq!(name(&cache, "p").source, NameSource::Placeholder);
        assert_eq!(name(&cache, "f").name, "Shipping");
        assert_eq!(name(&cache, "img").name, "Logo");
    }

    #[test]
    fn test_description() {
        let cache = build(vec![
            SnapshotNode::element("p").with_attribute("id", "hint").with_text("8+ characters"),
            input("pw")
                .with_attribute("aria-label", "Password")
                .with_attribute("aria-describedby", "hint"),
            input("t").with_attribute("title", "Only title"),
        ]);
        let pw = cache.element_by_id("pw").unwrap().node_id();
        let t = cache.element_by_id("t").unwrap().node_id();
        assert_eq!(cache.accessible_description(pw), "8+ characters");
        assert_eq!(cache.accessible_description(t), "");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let cache = build(vec![
            SnapshotNode::element("label").with_attribute("for", "c").with_text("Name"),
            input("c"),
        ]);
        let id = cache.element_by_id("c").unwrap().node_id();
        assert_eq!(resolve_name(id, &cache), resolve_name(id, &cache));
        assert_eq!(cache.accessible_name(id).cloned().unwrap(), resolve_name(id, &cache));
    }
}
