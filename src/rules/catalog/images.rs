use crate::error::Result;
use crate::rules::definition::{RuleCategory, RuleDefinition, RuleGroup, RuleScope};
use crate::rules::{RuleContext, StaticRule};

pub(super) fn rules() -> Vec<StaticRule> {
    vec![StaticRule::new(
        RuleDefinition::new("IMAGE_1", RuleScope::Element, RuleCategory::Images, RuleGroup::Group1, "1.1.1")
            .with_targets(&["img", "area", "[role=img]"]),
        image_has_alternative,
    )]
}

/// Images must have a text alternative or be marked decorative
fn image_has_alternative(context: &mut RuleContext<'_>) -> Result<()> {
    let cache = context.cache;

    for image in context.targets_in(&cache.indexes().images) {
        if !image.is_visible() {
            context.hidden(image)?;
            continue;
        }

        let name = context.name(image);
        let decorative = matches!(image.attribute("role"), Some("presentation" | "none"))
            || (image.is_tag("img") && image.attribute("alt").is_some_and(|alt| alt.trim().is_empty()));

        if !name.is_empty() {
            context.pass(image, "ELEMENT_PASS_1", vec![image.element_name(), name.to_string()])?;
        } else if decorative {
            context.pass(image, "ELEMENT_PASS_2", vec![image.element_name()])?;
        } else {
            context.fail(image, "ELEMENT_FAIL_1", vec![image.element_name()])?;
        }
    }
    Ok(())
}
