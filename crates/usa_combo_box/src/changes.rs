//! Change detection between two states
//!
//! The controller re-renders only the document fragments whose inputs
//! changed. The input value in particular must not be rewritten while the
//! user types, or the caret resets.

use crate::state::ComboBoxState;

/// Which state fields differ between two states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StateChanges {
    /// List visibility changed
    pub open: bool,
    /// Input text changed
    pub query: bool,
    /// The filtered sequence changed (rows must be rebuilt)
    pub filtered: bool,
    /// The highlighted position changed
    pub highlighted: bool,
    /// The committed value changed
    pub selected: bool,
    /// The pristine flag changed (clear affordance)
    pub pristine: bool,
}

impl StateChanges {
    /// No changes
    pub fn none() -> Self {
        Self::default()
    }

    /// Every fragment, used for the first render
    pub fn all() -> Self {
        Self {
            open: true,
            query: true,
            filtered: true,
            highlighted: true,
            selected: true,
            pristine: true,
        }
    }

    /// Compare two states of the same widget
    pub fn between(prev: &ComboBoxState, next: &ComboBoxState) -> Self {
        Self {
            open: prev.is_open() != next.is_open(),
            query: prev.query() != next.query(),
            filtered: prev.filtered() != next.filtered(),
            highlighted: prev.highlighted() != next.highlighted(),
            selected: prev.selected() != next.selected(),
            pristine: prev.is_pristine() != next.is_pristine(),
        }
    }

    /// Returns true if any field changed
    pub fn any(&self) -> bool {
        self.open || self.query || self.filtered || self.highlighted || self.selected || self.pristine
    }

    /// Whether the status region may need a new announcement
    pub fn affects_status(&self) -> bool {
        self.open || self.filtered
    }
}
