//! ARIA vocabulary
//!
//! Only the roles and properties the usa_elements widgets write are modelled.

/// ARIA roles written by usa_elements widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AriaRole {
    Button,
    Combobox,
    Listbox,
    Option,
    Status,
}

impl AriaRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Combobox => "combobox",
            Self::Listbox => "listbox",
            Self::Option => "option",
            Self::Status => "status",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.trim().to_ascii_lowercase().as_str() {
            "button" => Self::Button,
            "combobox" => Self::Combobox,
            "listbox" => Self::Listbox,
            "option" => Self::Option,
            "status" => Self::Status,
            _ => return None,
        })
    }

    /// Live region politeness implied by the role
    pub fn implicit_live_mode(&self) -> Option<LiveMode> {
        match self {
            Self::Status => Some(LiveMode::Polite),
            _ => None,
        }
    }
}

/// `aria-live` politeness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LiveMode {
    #[default]
    Off,
    Polite,
    Assertive,
}

impl LiveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }
}

/// ARIA attribute names
pub mod attr {
    pub const ROLE: &str = "role";
    pub const ACTIVEDESCENDANT: &str = "aria-activedescendant";
    pub const AUTOCOMPLETE: &str = "aria-autocomplete";
    pub const CONTROLS: &str = "aria-controls";
    pub const DESCRIBEDBY: &str = "aria-describedby";
    pub const DISABLED: &str = "aria-disabled";
    pub const EXPANDED: &str = "aria-expanded";
    pub const HIDDEN: &str = "aria-hidden";
    pub const LABEL: &str = "aria-label";
    pub const LIVE: &str = "aria-live";
    pub const OWNS: &str = "aria-owns";
    pub const POSINSET: &str = "aria-posinset";
    pub const SELECTED: &str = "aria-selected";
    pub const SETSIZE: &str = "aria-setsize";
}

/// Render a boolean ARIA state
#[inline]
pub fn bool_value(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
