use crate::error::Result;
use crate::rules::definition::{RuleCategory, RuleDefinition, RuleGroup, RuleScope};
use crate::rules::{RuleContext, StaticRule};

pub(super) fn rules() -> Vec<StaticRule> {
    vec![
        StaticRule::new(
            RuleDefinition::new("CONTROL_1", RuleScope::Element, RuleCategory::Forms, RuleGroup::Group1, "3.3.2")
                .with_related(&["1.3.1", "2.4.6"])
                .with_targets(&[
                    "input[type=checkbox]",
                    "input[type=date]",
                    "input[type=email]",
                    "input[type=file]",
                    "input[type=number]",
                    "input[type=password]",
                    "input[type=radio]",
                    "input[type=range]",
                    "input[type=search]",
                    "input[type=tel]",
                    "input[type=text]",
                    "input[type=url]",
                    "select",
                    "textarea",
                    "meter",
                    "progress",
                ]),
            control_has_name,
        ),
        StaticRule::new(
            RuleDefinition::new("CONTROL_2", RuleScope::Element, RuleCategory::Forms, RuleGroup::Group1, "3.3.2")
                .with_related(&["1.1.1", "4.1.2"])
                .with_targets(&["input[type=image]"]),
            image_button_has_name,
        ),
    ]
}

/// Form controls must have an accessible name
fn control_has_name(context: &mut RuleContext<'_>) -> Result<()> {
    let cache = context.cache;

    for control in context.targets_in(&cache.indexes().controls) {
        if !control.is_visible() {
            context.hidden(control)?;
            continue;
        }
        let name = context.name(control);
        if name.is_empty() {
            context.fail(control, "ELEMENT_FAIL_1", vec![control.element_name()])?;
        } else {
            context.pass(control, "ELEMENT_PASS_1", vec![control.element_name(), name.to_string()])?;
        }
    }
    Ok(())
}

/// Image buttons need a text alternative
fn image_button_has_name(context: &mut RuleContext<'_>) -> Result<()> {
    for button in context.targets() {
        if !button.is_visible() {
            context.hidden(button)?;
            continue;
        }
        let name = context.name(button);
        if name.is_empty() {
            context.fail(button, "ELEMENT_FAIL_1", vec![])?;
        } else {
            context.pass(button, "ELEMENT_PASS_1", vec![name.to_string()])?;
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
    fn test_control_1() {
        let document = page(vec![
            SnapshotNode::element("label").with_attribute("for", "a").with_text("First name"),
            SnapshotNode::element("input").with_attribute("id", "a"),
            SnapshotNode::element("select").with_attribute("id", "b"),
            SnapshotNode::element("textarea").with_style("none", ""),
            SnapshotNode::element("input").with_attribute("type", "submit"),
        ]);
        let (cache, results) = run(&rule(rules(), "CONTROL_1"), &document, Features::default());

        assert_eq!(types(&results), vec![ResultType::Pass, ResultType::Fail, ResultType::Hidden]);
        assert_eq!(results[0].message_args, vec!["input[type=text]#a", "First name"]);
        assert!(cache[results[1].target].is_tag("select"));
    }

    #[test]
    fn test_control_2() {
        let document = page(vec![
            SnapshotNode::element("input").with_attribute("type", "image").with_attribute("alt", "Go"),
            SnapshotNode::element("input").with_attribute("type", "image").with_attribute("src", "go.png"),
        ]);
        let (_, results) = run(&rule(rules(), "CONTROL_2"), &document, Features::default());

        assert_eq!(types(&results), vec![ResultType::Pass, ResultType::Fail]);
        assert_eq!(results[0].message_args, vec!["Go"]);
    }
}
