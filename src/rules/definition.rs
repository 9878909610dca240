use crate::cache::NodeCache;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How often a rule runs per evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleScope {
    Element,
    Page,
    Website,
}

/// Rule category used for grouping results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleCategory {
    Landmarks,
    Headings,
    StylesReadability,
    Images,
    Links,
    Tables,
    Forms,
    WidgetsScripts,
    AudioVideo,
    KeyboardSupport,
    Timing,
    SiteNavigation,
}

impl RuleCategory {
    /// Every category, in report order
    pub const ALL: [RuleCategory; 12] = [
        RuleCategory::Landmarks,
        RuleCategory::Headings,
        RuleCategory::StylesReadability,
        RuleCategory::Images,
        RuleCategory::Links,
        RuleCategory::Tables,
        RuleCategory::Forms,
        RuleCategory::WidgetsScripts,
        RuleCategory::AudioVideo,
        RuleCategory::KeyboardSupport,
        RuleCategory::Timing,
        RuleCategory::SiteNavigation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RuleCategory::Landmarks => "Landmarks",
            RuleCategory::Headings => "Headings",
            RuleCategory::StylesReadability => "Styles/Content",
            RuleCategory::Images => "Images",
            RuleCategory::Links => "Links",
            RuleCategory::Tables => "Tables",
            RuleCategory::Forms => "Forms",
            RuleCategory::WidgetsScripts => "Widgets/Scripts",
            RuleCategory::AudioVideo => "Audio/Video",
            RuleCategory::KeyboardSupport => "Keyboard",
            RuleCategory::Timing => "Timing",
            RuleCategory::SiteNavigation => "Site Navigation",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity tier of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleGroup {
    /// Basic checks that apply to every page
    Group1,
    /// Checks for pages using ARIA and scripting
    Group2,
    /// Checks that need deeper manual review
    Group3,
}

/// A single entry of a rule's `target_resources`
///
/// Accepted forms: `tag`, `tag[attr]`, `tag[attr=value]`, `tag[attr$=suffix]`,
/// `[attr]`, `[attr=value]` and `[attr$=suffix]`. Values may be quoted and
/// compare case-insensitively. For `input`, a missing `type` attribute
/// matches `type=text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetResource {
    tag: Option<String>,
    attribute: Option<AttributeSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeSelector {
    name: String,
    value: Option<ValueMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ValueMatch {
    Equals(String),
    EndsWith(String),
}

impl ValueMatch {
    fn matches(&self, actual: &str) -> bool {
        match self {
            ValueMatch::Equals(expected) => expected == actual,
            ValueMatch::EndsWith(suffix) => actual.ends_with(suffix.as_str()),
        }
    }
}

impl TargetResource {
    /// Parse a target resource; returns `None` for malformed input
    pub fn parse(resource: &str) -> Option<Self> {
        let resource = resource.trim().to_ascii_lowercase();
        let (tag, rest) = match resource.find('[') {
            Some(pos) => (&resource[..pos], Some(&resource[pos..])),
            None => (resource.as_str(), None),
        };
        let tag = (!tag.is_empty()).then(|| tag.to_string());

        let attribute = match rest {
            None => None,
            Some(rest) => {
                let inner = rest.strip_prefix('[')?.strip_suffix(']')?;
                let (name, value) = match inner.split_once('=') {
                    Some((name, value)) => {
                        let value = value.trim().trim_matches(|c| c == '"' || c == '\'').to_string();
                        match name.strip_suffix('$') {
                            Some(_) if value.is_empty() => return None,
                            Some(name) => (name.trim(), Some(ValueMatch::EndsWith(value))),
                            None => (name.trim(), Some(ValueMatch::Equals(value))),
                        }
                    }
                    None => (inner.trim(), None),
                };
                if name.is_empty() {
                    return None;
                }
                Some(AttributeSelector {
                    name: name.to_string(),
                    value,
                })
            }
        };

        if tag.is_none() && attribute.is_none() {
            return None;
        }
        Some(Self { tag, attribute })
    }

    /// True if the cached element matches this resource
    pub fn matches(&self, node: &NodeCache) -> bool {
        let Some(tag_name) = node.tag_name() else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|tag| tag != tag_name) {
            return false;
        }
        let Some(selector) = &self.attribute else {
            return true;
        };
        let actual = if selector.name == "type" && tag_name == "input" {
            node.input_type()
        } else if selector.name == "role" {
            node.role().map(str::to_string)
        } else {
            node.attribute(&selector.name).map(|v| v.trim().to_ascii_lowercase())
        };
        match (&selector.value, actual) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(value), Some(actual)) => value.matches(&actual),
        }
    }
}

/// Immutable metadata of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub rule_id: String,
    pub scope: RuleScope,
    pub category: RuleCategory,
    pub group: RuleGroup,
    pub wcag_primary_id: String,
    #[serde(default)]
    pub wcag_related_ids: IndexSet<String>,
    /// Elements the rule applies to, e.g. `input[type=text]`
    #[serde(default)]
    pub target_resources: IndexSet<String>,
}

impl RuleDefinition {
    pub fn new(
        rule_id: impl Into<String>,
        scope: RuleScope,
        category: RuleCategory,
        group: RuleGroup,
        wcag_primary_id: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            scope,
            category,
            group,
            wcag_primary_id: wcag_primary_id.into(),
            wcag_related_ids: IndexSet::new(),
            target_resources: IndexSet::new(),
        }
    }

    /// Builder method: related WCAG success criteria
    pub fn with_related(mut self, ids: &[&str]) -> Self {
        self.wcag_related_ids
            .extend(ids.iter().map(|id| id.to_string()));
        self
    }

    /// Builder method: target resources
    pub fn with_targets(mut self, targets: &[&str]) -> Self {
        self.target_resources
            .extend(targets.iter().map(|t| t.to_string()));
        self
    }

    /// True if `node` matches one of the target resources
    ///
    /// Rules without target resources apply to every element.
    pub fn applies_to(&self, node: &NodeCache) -> bool {
        if !node.is_element() {
            return false;
        }
        if self.target_resources.is_empty() {
            return true;
        }
        self.target_resources
            .iter()
            .filter_map(|resource| TargetResource::parse(resource))
            .any(|resource| resource.matches(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DomCacheBuilder;
    use crate::dom::SnapshotNode;

    #[test]
    fn test_parse_target_resources() {
        let resource = TargetResource::parse("input[type=\"checkbox\"]").unwrap();
        assert_eq!(resource.tag.as_deref(), Some("input"));
        assert_eq!(
            resource.attribute,
            Some(AttributeSelector {
                name: "type".to_string(),
                value: Some(ValueMatch::Equals("checkbox".to_string())),
            })
        );

        let resource = TargetResource::parse("img[src$='.GIF']").unwrap();
        assert_eq!(
            resource.attribute.map(|a| a.value),
            Some(Some(ValueMatch::EndsWith(".gif".to_string())))
        );

        let resource = TargetResource::parse("[role=link]").unwrap();
        assert!(resource.tag.is_none());

        assert!(TargetResource::parse("").is_none());
        assert!(TargetResource::parse("input[type=text").is_none());
        assert!(TargetResource::parse("[]").is_none());
        assert!(TargetResource::parse("img[src$=]").is_none());
    }

    #[test]
    fn test_matching() {
        let root = SnapshotNode::element("form")
            .with_child(SnapshotNode::element("input"))
            .with_child(SnapshotNode::element("input").with_attribute("type", "Radio"))
            .with_child(SnapshotNode::element("span").with_attribute("role", "link"))
            .with_child(SnapshotNode::element("div").with_attribute("onclick", "go()"));
        let cache = DomCacheBuilder::build(&root);
        let nodes: Vec<_> = cache.elements().collect();

        let text = TargetResource::parse("input[type=text]").unwrap();
        assert!(text.matches(nodes[1]));
        assert!(!text.matches(nodes[2]));

        let radio = TargetResource::parse("input[type=radio]").unwrap();
        assert!(radio.matches(nodes[2]));

        assert!(TargetResource::parse("[role=link]").unwrap().matches(nodes[3]));
        assert!(TargetResource::parse("[onclick]").unwrap().matches(nodes[4]));
        assert!(!TargetResource::parse("[onclick]").unwrap().matches(nodes[3]));
    }

    #[test]
    fn test_suffix_matching() {
        let root = SnapshotNode::element("div")
            .with_child(SnapshotNode::element("img").with_attribute("src", "/media/Spinner.GIF "))
            .with_child(SnapshotNode::element("img").with_attribute("src", "logo.png"))
            .with_child(SnapshotNode::element("img"));
        let cache = DomCacheBuilder::build(&root);
        let images: Vec<_> = cache.elements().filter(|n| n.is_tag("img")).collect();

        let gif = TargetResource::parse("img[src$=.gif]").unwrap();
        assert!(gif.matches(images[0]));
        assert!(!gif.matches(images[1]));
        assert!(!gif.matches(images[2]));
    }

    #[test]
    fn test_definition_applies_to() {
        let definition = RuleDefinition::new(
            "CONTROL_1",
            RuleScope::Element,
            RuleCategory::Forms,
            RuleGroup::Group1,
            "3.3.2",
        )
        .with_related(&["1.3.1", "2.4.6"])
        .with_targets(&["input[type=text]", "select", "textarea"]);

        let root = SnapshotNode::element("div")
            .with_child(SnapshotNode::element("select"))
            .with_child(SnapshotNode::element("button"));
        let cache = DomCacheBuilder::build(&root);

        let applies: Vec<_> = cache
            .elements()
            .filter(|n| definition.applies_to(n))
            .filter_map(|n| n.tag_name())
            .collect();
        assert_eq!(applies, vec!["select"]);
        assert_eq!(definition.wcag_related_ids.len(), 2);
    }

    #[test]
    fn test_definition_serialization() {
        let definition = RuleDefinition::new(
            "LANGUAGE_1",
            RuleScope::Page,
            RuleCategory::StylesReadability,
            RuleGroup::Group2,
            "3.1.1",
        )
        .with_targets(&["html"]);

        let json = serde_json::to_value(&definition).unwrap();
        assert_eq!(json["scope"], "PAGE");
        assert_eq!(json["category"], "STYLES_READABILITY");
        assert_eq!(json["group"], "GROUP2");

        let decoded: RuleDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, definition);
    }
}
