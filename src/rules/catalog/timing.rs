use crate::error::Result;
use crate::rules::definition::{RuleCategory, RuleDefinition, RuleGroup, RuleScope};
use crate::rules::{RuleContext, StaticRule};

pub(super) fn rules() -> Vec<StaticRule> {
    vec![
        StaticRule::new(
            RuleDefinition::new("TIMING_1", RuleScope::Page, RuleCategory::Timing, RuleGroup::Group2, "2.2.1")
                .with_targets(&["body"]),
            time_limits_adjustable,
        ),
        StaticRule::new(
            RuleDefinition::new("TIMING_2", RuleScope::Page, RuleCategory::Timing, RuleGroup::Group2, "2.2.2")
                .with_related(&["2.3.1"])
                .with_targets(&[
                    "blink",
                    "canvas",
                    "embed",
                    "img[src$=.gif]",
                    "marquee",
                    "object",
                    "svg",
                    "video",
                ]),
            moving_content_controllable,
        ),
    ]
}

/// Time limits cannot be detected statically; every page needs a review
fn time_limits_adjustable(context: &mut RuleContext<'_>) -> Result<()> {
    let cache = context.cache;
    let Some(page) = cache.indexes().timing.page_element.and_then(|id| cache.get(id)) else {
        return Ok(());
    };
    context.manual_check(page, "PAGE_MC_1", vec![])
}

/// Moving, blinking or auto-updating content must be pausable
fn moving_content_controllable(context: &mut RuleContext<'_>) -> Result<()> {
    let cache = context.cache;

    let mut visible = 0;
    for element in context.targets_in(&cache.indexes().timing.timing_elements) {
        if !element.is_visible() {
            context.hidden(element)?;
            continue;
        }
        visible += 1;
        let tag = element.tag_name().unwrap_or_default();
        if matches!(tag, "blink" | "marquee") {
            context.fail(element, "ELEMENT_FAIL_1", vec![tag.to_string()])?;
        } else {
            context.manual_check(element, "ELEMENT_MC_1", vec![element.element_name()])?;
        }
    }

    if visible > 0 {
        if let Some(page) = cache.indexes().timing.page_element.and_then(|id| cache.get(id)) {
            context.manual_check(page, "PAGE_MC_1", vec![visible.to_string()])?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::SnapshotNode;
    use crate::evaluator::Features;
    use crate::result::ResultType;
    use crate::rules::catalog::test_support::{page, rule, run, types};

    #[test]
    fn test_timing_1() {
        let (cache, results) = run(&rule(rules(), "TIMING_1"), &page(vec![]), Features::default());
        assert_eq!(types(&results), vec![ResultType::ManualCheck]);
        assert!(cache[results[0].target].is_tag("body"));
    }

    #[test]
    fn test_timing_2() {
        let document = page(vec![
            SnapshotNode::element("marquee").with_text("Sale!"),
            SnapshotNode::element("video").with_attribute("src", "intro.mp4"),
            SnapshotNode::element("canvas").with_style("none", ""),
            SnapshotNode::element("p").with_text("static"),
        ]);
        let (_, results) = run(&rule(rules(), "TIMING_2"), &document, Features::default());

        assert_eq!(
            types(&results),
            vec![
                ResultType::Fail,
                ResultType::ManualCheck,
                ResultType::Hidden,
                ResultType::ManualCheck
            ]
        );
        assert_eq!(results[3].message_args, vec!["2"]);
    }

    #[test]
    fn test_timing_2_only_animated_images() {
        let document = page(vec![
            SnapshotNode::element("img").with_attribute("src", "logo.png").with_attribute("alt", "Logo"),
            SnapshotNode::element("img").with_attribute("src", "/img/Loader.GIF").with_attribute("alt", ""),
        ]);
        let (cache, results) = run(&rule(rules(), "TIMING_2"), &document, Features::default());

        assert_eq!(types(&results), vec![ResultType::ManualCheck, ResultType::ManualCheck]);
        assert_eq!(cache[results[0].target].attribute("src"), Some("/img/Loader.GIF"));
        assert!(cache[results[1].target].is_tag("body"));
    }

    #[test]
    fn test_timing_2_without_moving_content() {
        let (_, results) = run(&rule(rules(), "TIMING_2"), &page(vec![]), Features::default());
        assert!(results.is_empty());
    }
}
