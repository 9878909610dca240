use crate::error::Result;
use crate::rules::definition::{RuleCategory, RuleDefinition, RuleGroup, RuleScope};
use crate::rules::{RuleContext, StaticRule};

pub(super) fn rules() -> Vec<StaticRule> {
    vec![
        StaticRule::new(
            RuleDefinition::new("HEADING_1", RuleScope::Page, RuleCategory::Headings, RuleGroup::Group2, "1.3.1")
                .with_related(&["2.4.6", "2.4.10"])
                .with_targets(&["h1", "[aria-level=1]"]),
            page_has_h1,
        ),
        StaticRule::new(
            RuleDefinition::new("LANDMARK_1", RuleScope::Page, RuleCategory::Landmarks, RuleGroup::Group2, "2.4.1")
                .with_related(&["1.3.1", "2.4.6"])
                .with_targets(&["main", "[role=main]"]),
            page_has_main,
        ),
        StaticRule::new(
            RuleDefinition::new(
                "LANGUAGE_1",
                RuleScope::Page,
                RuleCategory::StylesReadability,
                RuleGroup::Group1,
                "3.1.1",
            )
            .with_targets(&["html"]),
            page_has_language,
        ),
    ]
}

/// The page needs at least one visible level one heading
fn page_has_h1(context: &mut RuleContext<'_>) -> Result<()> {
    let cache = context.cache;
    let Some(page) = context.page_element() else {
        return Ok(());
    };

    let mut visible = 0;
    for heading in context.targets_in(&cache.indexes().headings_landmarks.headings) {
        if heading.is_visible() {
            visible += 1;
            let name = context.name(heading);
            context.pass(heading, "ELEMENT_PASS_1", vec![name.to_string()])?;
        } else {
            context.hidden(heading)?;
        }
    }

    if visible > 0 {
        context.pass(page, "PAGE_PASS_1", vec![visible.to_string()])
    } else {
        context.fail(page, "PAGE_FAIL_1", vec![])
    }
}

/// The page needs exactly one main landmark
fn page_has_main(context: &mut RuleContext<'_>) -> Result<()> {
    let cache = context.cache;
    let Some(page) = context.page_element() else {
        return Ok(());
    };

    let mut visible = 0;
    for main in context.targets_in(&cache.indexes().headings_landmarks.main_elements) {
        if main.is_visible() {
            visible += 1;
            context.pass(main, "ELEMENT_PASS_1", vec![main.element_name()])?;
        } else {
            context.hidden(main)?;
        }
    }

    match visible {
        0 => context.fail(page, "PAGE_FAIL_1", vec![]),
        1 => context.pass(page, "PAGE_PASS_1", vec![]),
        n => context.fail(page, "PAGE_FAIL_2", vec![n.to_string()]),
    }
}

/// The document element must declare a valid language
fn page_has_language(context: &mut RuleContext<'_>) -> Result<()> {
    let Some(page) = context.page_element() else {
        return Ok(());
    };

    match context.cache.lang() {
        None => context.fail(page, "PAGE_FAIL_1", vec![]),
        Some(lang) if is_valid_language_code(lang) => context.pass(page, "PAGE_PASS_1", vec![lang.to_string()]),
        Some(lang) => context.fail(page, "PAGE_FAIL_2", vec![lang.to_string()]),
    }
}

/// BCP 47 shape check: alphabetic primary subtag of 2-3 letters (or `i`/`x`
/// private forms), followed by alphanumeric subtags of up to 8 characters
fn is_valid_language_code(code: &str) -> bool {
    let mut subtags = code.split(&['-', '_'][..]);
    let Some(primary) = subtags.next() else {
        return false;
    };
    let primary_ok = primary.chars().all(|c| c.is_ascii_alphabetic())
        && (matches!(primary.len(), 2 | 3) || primary.eq_ignore_ascii_case("i") || primary.eq_ignore_ascii_case("x"));

    primary_ok
        && subtags.all(|tag| (1..=8).contains(&tag.len()) && tag.chars().all(|c| c.is_ascii_alphanumeric()))
}
