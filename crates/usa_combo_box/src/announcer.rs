//! Screen reader status announcements

use crate::config::ComboBoxMessages;
use crate::state::ComboBoxState;

/// Status text describing a state: empty while closed, the result count
/// while open
pub fn status_text(state: &ComboBoxState, messages: &ComboBoxMessages) -> String {
    if state.is_open() {
        messages.status(state.result_count())
    } else {
        String::new()
    }
}

/// New status text, if the transition changed what should be announced
///
/// Only a change in visibility or in the number of results is announced.
pub fn announce(
    prev: &ComboBoxState,
    next: &ComboBoxState,
    messages: &ComboBoxMessages,
) -> Option<String> {
    let changed = prev.is_open() != next.is_open() || prev.result_count() != next.result_count();
    changed.then(|| status_text(next, messages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ComboBoxEvent;
    use crate::machine::transition;
    use crate::option::{ComboBoxOption, OptionSet};

    fn state() -> ComboBoxState {
        ComboBoxState::new(
            OptionSet::sanitize([
                ComboBoxOption::new("apple", "Apple"),
                ComboBoxOption::new("apricot", "Apricot"),
                ComboBoxOption::new("banana", "Banana"),
            ]),
            None,
        )
    }

    #[test]
    fn test_open_announces_count() {
        let messages = ComboBoxMessages::default();
        let closed = state();
        let open = transition(&closed, &ComboBoxEvent::Open);
        assert_eq!(
            announce(&closed, &open, &messages).as_deref(),
            Some("3 results available.")
        );
    }

    #[test]
    fn test_filtering_announces_new_count() {
        let messages = ComboBoxMessages::default();
        let open = transition(&state(), &ComboBoxEvent::Open);
        let one = transition(&open, &ComboBoxEvent::Type("ban".into()));
        assert_eq!(
            announce(&open, &one, &messages).as_deref(),
            Some("1 result available.")
        );

        let none = transition(&one, &ComboBoxEvent::Type("xyz".into()));
        assert_eq!(announce(&one, &none, &messages).as_deref(), Some("No results."));
    }

    #[test]
    fn test_close_clears_status() {
        let messages = ComboBoxMessages::default();
        let open = transition(&state(), &ComboBoxEvent::Open);
        let closed = transition(&open, &ComboBoxEvent::Close);
        assert_eq!(announce(&open, &closed, &messages).as_deref(), Some(""));
    }

    #[test]
    fn test_highlight_moves_are_silent() {
        let messages = ComboBoxMessages::default();
        let open = transition(&state(), &ComboBoxEvent::ArrowDown);
        let moved = transition(&open, &ComboBoxEvent::ArrowDown);
        assert_eq!(announce(&open, &moved, &messages), None);
    }
}
