//! Combo box options and the sanitized option set

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{ComboBoxError, Result};

/// An option in the combo box list
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComboBoxOption {
    /// The value committed to the host control when selected
    pub value: String,
    /// The display label (used for the input text and for filtering)
    pub label: String,
    /// Whether this option is disabled
    #[serde(default)]
    pub disabled: bool,
}

impl ComboBoxOption {
    /// Create a new option with value and label
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }

    /// Mark this option as disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Whether the option may be highlighted and committed
    #[inline]
    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }
}

/// An immutable, ordered option sequence with unique, non-empty values
///
/// Cloning is cheap; the sequence is shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionSet {
    options: Arc<[ComboBoxOption]>,
}

impl Default for OptionSet {
    fn default() -> Self {
        Self {
            options: Arc::new([]),
        }
    }
}

impl OptionSet {
    /// An option set with no options
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an option set, rejecting empty or repeated values
    pub fn validate(options: impl IntoIterator<Item = ComboBoxOption>) -> Result<Self> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for opt in options {
            if opt.value.is_empty() {
                return Err(ComboBoxError::EmptyValue { label: opt.label });
            }
            if !seen.insert(opt.value.clone()) {
                return Err(ComboBoxError::DuplicateValue(opt.value));
            }
            out.push(opt);
        }
        Ok(Self {
            options: out.into(),
        })
    }

    /// Build an option set, dropping rows that would break its invariants
    ///
    /// Empty-value rows (the `- Select -` placeholder of a native select) and
    /// repeated values after their first occurrence are skipped.
    pub fn sanitize(options: impl IntoIterator<Item = ComboBoxOption>) -> Self {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for opt in options {
            if opt.value.is_empty() {
                tracing::debug!(label = %opt.label, "skipping placeholder option");
                continue;
            }
            if !seen.insert(opt.value.clone()) {
                tracing::warn!("{}", ComboBoxError::DuplicateValue(opt.value));
                continue;
            }
            out.push(opt);
        }
        Self {
            options: out.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ComboBoxOption> {
        self.options.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComboBoxOption> {
        self.options.iter()
    }

    pub fn as_slice(&self) -> &[ComboBoxOption] {
        &self.options
    }

    /// Position of the option with the given value
    pub fn position(&self, value: &str) -> Option<usize> {
        self.options.iter().position(|o| o.value == value)
    }

    /// Look up an option by value
    pub fn find(&self, value: &str) -> Option<&ComboBoxOption> {
        self.options.iter().find(|o| o.value == value)
    }

    /// Label of the option with the given value
    pub fn label_for(&self, value: &str) -> Option<&str> {
        self.find(value).map(|o| o.label.as_str())
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = &'a ComboBoxOption;
    type IntoIter = std::slice::Iter<'a, ComboBoxOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<ComboBoxOption> for OptionSet {
    fn from_iter<I: IntoIterator<Item = ComboBoxOption>>(iter: I) -> Self {
        Self::sanitize(iter)
    }
}
