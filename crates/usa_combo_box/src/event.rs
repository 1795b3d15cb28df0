//! Combo box events
//!
//! Every interaction reaches the state machine as a [`ComboBoxEvent`]. The
//! controller translates document events (key codes, clicks, focus changes)
//! into these before dispatching.

use usa_dom::key_codes;

/// An interaction with the combo box
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComboBoxEvent {
    /// Show the list
    Open,
    /// Hide the list
    Close,
    /// The input text changed to the given buffer
    Type(String),
    ArrowDown,
    ArrowUp,
    Home,
    End,
    /// Commit the highlighted option
    Enter,
    /// Close, or cancel the edit if already closed
    Escape,
    /// Focus left an element of the widget
    FocusOut {
        /// Whether focus moved to another element of the same widget
        inside: bool,
    },
    /// Reset the selection and the input
    Clear,
    /// The pointer moved over the row at a filtered position
    Hover(usize),
    /// The row at a filtered position was activated with the pointer
    Pick(usize),
}

impl ComboBoxEvent {
    /// Map a key code pressed in the input to an event
    ///
    /// Keys the combo box does not handle map to `None` and keep their
    /// default behaviour.
    pub fn from_key_code(key_code: u32) -> Option<Self> {
        Some(match key_code {
            key_codes::ARROW_DOWN => ComboBoxEvent::ArrowDown,
            key_codes::ARROW_UP => ComboBoxEvent::ArrowUp,
            key_codes::HOME => ComboBoxEvent::Home,
            key_codes::END => ComboBoxEvent::End,
            key_codes::ENTER => ComboBoxEvent::Enter,
            key_codes::ESCAPE => ComboBoxEvent::Escape,
            _ => return None,
        })
    }

    /// Whether this event commits a selection when it succeeds
    pub fn is_commit(&self) -> bool {
        matches!(self, ComboBoxEvent::Enter | ComboBoxEvent::Pick(_))
    }
}
