//! Combo box configuration
//!
//! Every user-facing string lives in [`ComboBoxMessages`] so a host can
//! localize the widget. Configuration can be built in code or loaded from
//! TOML:
//!
//! ```toml
//! id = "fruit"
//! placeholder = "Pick a fruit"
//!
//! [messages]
//! no_results = "Nothing matches"
//! status_many = "{count} fruits available."
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Placeholder substituted with the result count in status templates
pub const COUNT_PLACEHOLDER: &str = "{count}";

/// Combo box configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboBoxConfig {
    /// Base id for the input and its derived ids
    ///
    /// Defaults to the host control's id, then to a generated id.
    pub id: Option<String>,
    /// Placeholder text shown in the empty input
    pub placeholder: Option<String>,
    /// Height the popup list may grow to, used when choosing its placement
    pub list_max_height: f32,
    /// User-facing strings
    pub messages: ComboBoxMessages,
}

impl Default for ComboBoxConfig {
    fn default() -> Self {
        Self {
            id: None,
            placeholder: None,
            list_max_height: 240.0,
            messages: ComboBoxMessages::default(),
        }
    }
}

impl ComboBoxConfig {
    /// Parse a configuration from TOML; missing keys take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// User-facing strings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboBoxMessages {
    /// Text of the row shown when nothing matches
    pub no_results: String,
    /// Accessible name of the clear button
    pub clear_label: String,
    /// Accessible name of the toggle button
    pub toggle_label: String,
    /// Instructions read after the input's name
    pub assistive_hint: String,
    /// Status when the open list is empty
    pub status_none: String,
    /// Status when the open list has one result
    pub status_one: String,
    /// Status when the open list has several results; `{count}` is replaced
    pub status_many: String,
}

impl Default for ComboBoxMessages {
    fn default() -> Self {
        Self {
            no_results: "No results found".to_string(),
            clear_label: "Clear the select contents".to_string(),
            toggle_label: "Toggle the dropdown list".to_string(),
            assistive_hint: "When autocomplete results are available use up and down arrows \
                             to review and enter to select. Touch device users, explore by \
                             touch or with swipe gestures."
                .to_string(),
            status_none: "No results.".to_string(),
            status_one: "1 result available.".to_string(),
            status_many: "{count} results available.".to_string(),
        }
    }
}

impl ComboBoxMessages {
    /// Status text for an open list with `count` results
    pub fn status(&self, count: usize) -> String {
        match count {
            0 => self.status_none.clone(),
            1 => self.status_one.replace(COUNT_PLACEHOLDER, "1"),
            n => self.status_many.replace(COUNT_PLACEHOLDER, &n.to_string()),
        }
    }
}
