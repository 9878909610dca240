use crate::error::Result;
use crate::evaluator::EventProcessing;
use crate::rules::definition::{RuleCategory, RuleDefinition, RuleGroup, RuleScope};
use crate::rules::{RuleContext, StaticRule};

const KEY_HANDLERS: &[&str] = &["onkeydown", "onkeypress", "onkeyup"];
const FOCUSABLE_TAGS: &[&str] = &["button", "input", "select", "textarea", "summary"];

pub(super) fn rules() -> Vec<StaticRule> {
    vec![StaticRule::new(
        RuleDefinition::new(
            "KEYBOARD_1",
            RuleScope::Element,
            RuleCategory::KeyboardSupport,
            RuleGroup::Group3,
            "2.1.1",
        )
        .with_related(&["4.1.2"])
        .with_targets(&["[onclick]", "[ondblclick]", "[onmousedown]", "[onmouseup]"]),
        mouse_handlers_have_keyboard_support,
    )]
}

/// Elements reacting to the mouse must be reachable and operable by keyboard
///
/// Only runs when event processing is allowed.
fn mouse_handlers_have_keyboard_support(context: &mut RuleContext<'_>) -> Result<()> {
    if context.features.event_processing == EventProcessing::None {
        return Ok(());
    }
    let cache = context.cache;

    for element in context.targets_in(&cache.indexes().event_handlers) {
        if !element.is_visible() {
            context.hidden(element)?;
            continue;
        }

        let tag = element.tag_name().unwrap_or_default();
        let natively_focusable =
            FOCUSABLE_TAGS.contains(&tag) || (tag == "a" && element.has_attribute("href"));
        let has_key_handler = KEY_HANDLERS.iter().any(|h| element.has_attribute(h));
        let has_tabindex = element
            .attribute("tabindex")
            .and_then(|t| t.trim().parse::<i32>().ok())
            .is_some_and(|t| t >= 0);

        if natively_focusable {
            context.pass(element, "ELEMENT_PASS_1", vec![element.element_name()])?;
        } else if has_tabindex && has_key_handler {
            context.manual_check(element, "ELEMENT_MC_1", vec![element.element_name()])?;
        } else {
            context.fail(element, "ELEMENT_FAIL_1", vec![element.element_name()])?;
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

    fn handlers() -> SnapshotNode {
        page(vec![
            SnapshotNode::element("button").with_attribute("onclick", "save()").with_text("Save"),
            SnapshotNode::element("div")
                .with_attribute("onclick", "open()")
                .with_attribute("onkeydown", "open()")
                .with_attribute("tabindex", "0"),
            SnapshotNode::element("span").with_attribute("onmousedown", "drag()"),
            SnapshotNode::element("div").with_attribute("onfocus", "noop()"),
        ])
    }

    #[test]
    fn test_keyboard_1_disabled_by_default() {
        let (_, results) = run(&rule(rules(), "KEYBOARD_1"), &handlers(), Features::default());
        assert!(results.is_empty());
    }

    #[test]
    fn test_keyboard_1() {
        let features = Features::default().with_event_processing(EventProcessing::Allowed);
        let (_, results) = run(&rule(rules(), "KEYBOARD_1"), &handlers(), features);

        assert_eq!(
            types(&results),
            vec![ResultType::Pass, ResultType::ManualCheck, ResultType::Fail]
        );
    }
}
