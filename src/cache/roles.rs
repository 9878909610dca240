//! Role lookup tables
//!
//! Implicit roles follow the HTML-AAM mappings for the elements the rule
//! catalog cares about. Elements without a useful mapping get no role.

/// Roles that identify a landmark region
pub const LANDMARK_ROLES: &[&str] = &[
    "banner",
    "complementary",
    "contentinfo",
    "form",
    "main",
    "navigation",
    "region",
    "search",
];

/// Landmark roles that only count when the element has an accessible name
pub const NAMED_LANDMARK_ROLES: &[&str] = &["form", "region"];

/// Roles whose accessible name may be computed from their content
const NAME_FROM_CONTENT_ROLES: &[&str] = &[
    "button",
    "cell",
    "checkbox",
    "columnheader",
    "gridcell",
    "heading",
    "link",
    "menuitem",
    "menuitemcheckbox",
    "menuitemradio",
    "option",
    "radio",
    "row",
    "rowheader",
    "switch",
    "tab",
    "tooltip",
    "treeitem",
];

/// Tags whose accessible name may be computed from their content
const NAME_FROM_CONTENT_TAGS: &[&str] = &[
    "a", "button", "caption", "figcaption", "label", "legend", "option", "summary", "td", "th",
];

/// Form controls never take their name from their content
const FORM_CONTROL_TAGS: &[&str] = &["input", "select", "textarea", "meter", "progress", "output"];

/// Implicit ARIA role of an element
///
/// `attribute` looks up an attribute of the element by lowercase name.
pub fn implicit_role<'a>(tag: &str, attribute: impl Fn(&str) -> Option<&'a str>) -> Option<&'static str> {
    let role = match tag {
        "a" | "area" if attribute("href").is_some() => "link",
        "article" => "article",
        "aside" => "complementary",
        "button" => "button",
        "datalist" => "listbox",
        "details" => "group",
        "dialog" => "dialog",
        "fieldset" => "group",
        "footer" => "contentinfo",
        "form" => "form",
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading",
        "header" => "banner",
        "hr" => "separator",
        "img" => "img",
        "li" => "listitem",
        "main" => "main",
        "menu" | "ol" | "ul" => "list",
        "meter" => "meter",
        "nav" => "navigation",
        "option" => "option",
        "output" => "status",
        "progress" => "progressbar",
        "search" => "search",
        "section" => "region",
        "select" => select_role(attribute("multiple").is_some(), attribute("size")),
        "table" => "table",
        "tbody" | "tfoot" | "thead" => "rowgroup",
        "td" => "cell",
        "textarea" => "textbox",
        "th" => "columnheader",
        "tr" => "row",
        "input" => {
            let input_type = attribute("type")
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "text".to_string());
            return input_role(&input_type, attribute("list").is_some());
        }
        _ => return None,
    };
    Some(role)
}

/// `select` is a listbox when several options show at once
fn select_role(multiple: bool, size: Option<&str>) -> &'static str {
    let size = size.and_then(|s| s.trim().parse::<u32>().ok()).unwrap_or(0);
    if multiple || size > 1 { "listbox" } else { "combobox" }
}

fn input_role(input_type: &str, has_list: bool) -> Option<&'static str> {
    let role = match input_type {
        "button" | "image" | "reset" | "submit" => "button",
        "checkbox" => "checkbox",
        "radio" => "radio",
        "range" => "slider",
        "number" => "spinbutton",
        "search" if has_list => "combobox",
        "search" => "searchbox",
        "email" | "tel" | "text" | "url" if has_list => "combobox",
        "email" | "tel" | "text" | "url" => "textbox",
        _ => return None,
    };
    Some(role)
}

/// True if the role identifies a landmark
pub fn is_landmark_role(role: &str) -> bool {
    LANDMARK_ROLES.contains(&role)
}

/// True if the element is a form control
pub fn is_form_control(tag: &str) -> bool {
    FORM_CONTROL_TAGS.contains(&tag)
}

/// True if the element may take its accessible name from its content
pub fn allows_name_from_contents(tag: &str, role: Option<&str>) -> bool {
    if is_form_control(tag) {
        return false;
    }
    NAME_FROM_CONTENT_TAGS.contains(&tag)
        || role.is_some_and(|r| NAME_FROM_CONTENT_ROLES.contains(&r))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(tag: &str, attributes: &[(&'static str, &'static str)]) -> Option<&'static str> {
        implicit_role(tag, |name| {
            attributes
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
        })
    }

    #[test]
    fn test_implicit_roles() {
        assert_eq!(role("a", &[("href", "/")]), Some("link"));
        assert_eq!(role("a", &[]), None);
        assert_eq!(role("h3", &[]), Some("heading"));
        assert_eq!(role("section", &[]), Some("region"));
        assert_eq!(role("input", &[("type", "Checkbox")]), Some("checkbox"));
        assert_eq!(role("input", &[("list", "suggestions")]), Some("combobox"));
        assert_eq!(role("input", &[]), Some("textbox"));
        assert_eq!(role("input", &[("type", "color")]), None);
        assert_eq!(role("div", &[]), None);
    }

    #[test]
    fn test_select_roles() {
        assert_eq!(role("select", &[]), Some("combobox"));
        assert_eq!(role("select", &[("size", "1")]), Some("combobox"));
        assert_eq!(role("select", &[("multiple", "")]), Some("listbox"));
        assert_eq!(role("select", &[("size", " 4 ")]), Some("listbox"));
        assert_eq!(role("select", &[("size", "many")]), Some("combobox"));
    }

    #[test]
    fn test_name_from_contents() {
        assert!(allows_name_from_contents("a", Some("link")));
        assert!(allows_name_from_contents("div", Some("button")));
        assert!(allows_name_from_contents("h2", Some("heading")));
        assert!(!allows_name_from_contents("div", None));
        assert!(!allows_name_from_contents("select", Some("combobox")));
        assert!(!allows_name_from_contents("input", Some("button")));
    }

    #[test]
    fn test_landmarks() {
        assert!(is_landmark_role("navigation"));
        assert!(!is_landmark_role("heading"));
        assert!(NAMED_LANDMARK_ROLES.contains(&"region"));
    }
}
