use crate::error::Result;
use crate::result::ResultType;
use crate::rules::definition::{RuleCategory, RuleDefinition, RuleGroup, RuleScope};
use crate::rules::{RuleContext, StaticRule};

pub(super) fn rules() -> Vec<StaticRule> {
    vec![
        StaticRule::new(
            RuleDefinition::new("LINK_1", RuleScope::Element, RuleCategory::Links, RuleGroup::Group1, "2.4.4")
                .with_related(&["2.4.9", "4.1.2"])
                .with_targets(&["a[href]", "area[href]", "[role=link]"]),
            link_has_name,
        ),
        StaticRule::new(
            RuleDefinition::new("LINK_2", RuleScope::Element, RuleCategory::Links, RuleGroup::Group3, "2.4.4")
                .with_related(&["2.4.9"])
                .with_targets(&["a[href]", "area[href]"]),
            link_targets_resolve,
        ),
    ]
}

/// Links need a name; the name must describe the target, which needs review
fn link_has_name(context: &mut RuleContext<'_>) -> Result<()> {
    let cache = context.cache;

    for link in context.targets_in(&cache.indexes().links) {
        if !link.is_visible() {
            context.hidden(link)?;
            continue;
        }
        let name = context.name(link);
        if name.is_empty() {
            context.fail(link, "ELEMENT_FAIL_1", vec![link.element_name()])?;
        } else {
            context.manual_check(link, "ELEMENT_MC_1", vec![link.element_name(), name.to_string()])?;
        }
    }
    Ok(())
}

/// Broken link candidates, only when broken link testing is enabled
///
/// No request is made: links with a fetchable target become manual checks,
/// empty, `#` and `javascript:` targets fail, in-page and mail targets are
/// not applicable.
fn link_targets_resolve(context: &mut RuleContext<'_>) -> Result<()> {
    if !context.features.broken_link_testing {
        return Ok(());
    }

    for link in context.targets() {
        let href = link.attribute("href").map(str::trim).unwrap_or_default();
        if !link.is_visible() {
            context.hidden(link)?;
            continue;
        }

        let lower = href.to_ascii_lowercase();
        if href.is_empty() || href == "#" || lower.starts_with("javascript:") {
            context.fail(link, "ELEMENT_FAIL_1", vec![link.element_name(), href.to_string()])?;
        } else if lower.starts_with("mailto:") || lower.starts_with("tel:") || href.starts_with('#') {
            context.add_result(
                ResultType::NotApplicable,
                link.node_id(),
                "ELEMENT_NA_1",
                vec![href.to_string()],
            )?;
        } else {
            context.manual_check(link, "ELEMENT_MC_1", vec![href.to_string()])?;
        }
    }
    Ok(())
}
