use crate::dom::ComputedStyle;
use serde::{Deserialize, Serialize};

/// Conditions that hide an element from assistive technology
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HidingFlags {
    /// `hidden` attribute present
    pub hidden_attribute: bool,

    /// `aria-hidden="true"`
    pub aria_hidden: bool,

    /// `display: none`
    pub display_none: bool,

    /// `visibility: hidden` or `visibility: collapse`
    pub visibility_hidden: bool,
}

impl HidingFlags {
    /// Read the flags an element carries itself
    pub fn from_element(
        hidden_attribute: bool,
        aria_hidden: Option<&str>,
        style: &ComputedStyle,
    ) -> Self {
        Self {
            hidden_attribute,
            aria_hidden: aria_hidden.is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
            display_none: style.is_display_none(),
            visibility_hidden: style.is_visibility_hidden(),
        }
    }

    /// True when any condition is set
    pub fn any(&self) -> bool {
        self.hidden_attribute || self.aria_hidden || self.display_none || self.visibility_hidden
    }

    /// Union of two flag sets
    pub fn union(self, other: HidingFlags) -> Self {
        Self {
            hidden_attribute: self.hidden_attribute || other.hidden_attribute,
            aria_hidden: self.aria_hidden || other.aria_hidden,
            display_none: self.display_none || other.display_none,
            visibility_hidden: self.visibility_hidden || other.visibility_hidden,
        }
    }
}

/// Memoized visibility of a cached node
///
/// `own` holds the conditions found on the node itself, `effective` the union
/// over the node and all of its ancestors. A node is visible only when the
/// effective set is empty, so a hidden ancestor hides every descendant.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Visibility {
    pub own: HidingFlags,
    pub effective: HidingFlags,
}

impl Visibility {
    /// Visibility of a root node (no parent)
    pub fn root(own: HidingFlags) -> Self {
        Self {
            own,
            effective: own,
        }
    }

    /// Visibility of a node derived from its parent's memoized value
    pub fn inherit(parent: &Visibility, own: HidingFlags) -> Self {
        Self {
            own,
            effective: parent.effective.union(own),
        }
    }

    /// Visibility of a text run: same as the containing element
    pub fn text(parent: Option<&Visibility>) -> Self {
        Self {
            own: HidingFlags::default(),
            effective: parent.map(|p| p.effective).unwrap_or_default(),
        }
    }

    /// Visible to assistive technology
    pub fn is_visible(&self) -> bool {
        !self.effective.any()
    }

    /// Rendered on screen (ignores `aria-hidden`)
    pub fn is_visible_on_screen(&self) -> bool {
        let flags = self.effective;
        !(flags.hidden_attribute || flags.display_none || flags.visibility_hidden)
    }

    /// The node itself carries a hiding condition
    pub fn hides_self(&self) -> bool {
        self.own.any()
    }

    /// Names of the conditions that make the node invisible
    pub fn reasons(&self) -> Vec<&'static str> {
        let flags = self.effective;
        let mut reasons = Vec::new();
        if flags.hidden_attribute {
            reasons.push("hidden");
        }
        if flags.aria_hidden {
            reasons.push("aria-hidden");
        }
        if flags.display_none {
            reasons.push("display:none");
        }
        if flags.visibility_hidden {
            reasons.push("visibility:hidden");
        }
        reasons
    }
}
