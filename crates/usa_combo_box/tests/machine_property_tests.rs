//! Property-based tests for the keyboard and focus state machine

use proptest::prelude::*;
use usa_combo_box::{transition, ComboBoxEvent, ComboBoxOption, ComboBoxState, OptionSet};

fn options_strategy() -> impl Strategy<Value = OptionSet> {
    prop::collection::vec(("[abc]{1,4}", prop::bool::weighted(0.25)), 0..8).prop_map(|rows| {
        OptionSet::sanitize(rows.into_iter().enumerate().map(|(i, (label, disabled))| {
            let option = ComboBoxOption::new(format!("v{i}"), label);
            if disabled {
                option.disabled()
            } else {
                option
            }
        }))
    })
}

fn event_strategy() -> impl Strategy<Value = ComboBoxEvent> {
    prop_oneof![
        Just(ComboBoxEvent::Open),
        Just(ComboBoxEvent::Close),
        "[abc]{0,2}".prop_map(ComboBoxEvent::Type),
        Just(ComboBoxEvent::ArrowDown),
        Just(ComboBoxEvent::ArrowUp),
        Just(ComboBoxEvent::Home),
        Just(ComboBoxEvent::End),
        Just(ComboBoxEvent::Enter),
        Just(ComboBoxEvent::Escape),
        any::<bool>().prop_map(|inside| ComboBoxEvent::FocusOut { inside }),
        Just(ComboBoxEvent::Clear),
        (0usize..10).prop_map(ComboBoxEvent::Hover),
        (0usize..10).prop_map(ComboBoxEvent::Pick),
    ]
}

/// Structural invariants that hold in every reachable state
fn check_invariants(state: &ComboBoxState) -> Result<(), TestCaseError> {
    if let Some(pos) = state.highlighted() {
        prop_assert!(pos < state.filtered().len());
        let option = state.highlighted_option().expect("highlight is in range");
        prop_assert!(option.is_enabled());
    }
    if let Some(value) = state.selected() {
        prop_assert!(state.options().find(value).is_some());
    }
    if state.is_pristine() {
        prop_assert_eq!(Some(state.query()), state.selected_label());
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_every_reachable_state_is_valid(
        options in options_strategy(),
        events in prop::collection::vec(event_strategy(), 0..40),
    ) {
        let mut state = ComboBoxState::new(options, None);
        check_invariants(&state)?;
        for event in &events {
            state = transition(&state, event);
            check_invariants(&state)?;
        }
    }

    #[test]
    fn prop_transition_is_deterministic(
        options in options_strategy(),
        events in prop::collection::vec(event_strategy(), 1..20),
    ) {
        let mut state = ComboBoxState::new(options, None);
        for event in &events {
            let left = transition(&state, event);
            let right = transition(&state, event);
            prop_assert_eq!(&left, &right);
            state = left;
        }
    }

    #[test]
    fn prop_successful_enter_closes_and_is_pristine(
        options in options_strategy(),
        events in prop::collection::vec(event_strategy(), 0..20),
    ) {
        let mut state = ComboBoxState::new(options, None);
        for event in &events {
            state = transition(&state, event);
        }
        let committed = state.highlighted_option().cloned();
        let next = transition(&state, &ComboBoxEvent::Enter);
        match committed {
            Some(option) => {
                prop_assert!(!next.is_open());
                prop_assert!(next.is_pristine());
                prop_assert_eq!(next.selected(), Some(option.value.as_str()));
                prop_assert_eq!(next.query(), option.label.as_str());
            }
            None => prop_assert_eq!(next, state),
        }
    }

    #[test]
    fn prop_clear_resets_selection_and_filter(
        options in options_strategy(),
        events in prop::collection::vec(event_strategy(), 0..20),
    ) {
        let mut state = ComboBoxState::new(options, None);
        for event in &events {
            state = transition(&state, event);
        }
        let cleared = transition(&state, &ComboBoxEvent::Clear);
        let all: Vec<usize> = (0..cleared.options().len()).collect();
        prop_assert_eq!(cleared.selected(), None);
        prop_assert_eq!(cleared.filtered(), all.as_slice());
        prop_assert_eq!(cleared.highlighted(), None);
        prop_assert_eq!(cleared.is_open(), state.is_open());
    }

    #[test]
    fn prop_arrows_clamp_at_enabled_bounds(
        options in options_strategy(),
        presses in 1usize..12,
    ) {
        let mut down = ComboBoxState::new(options, None);
        for _ in 0..presses {
            down = transition(&down, &ComboBoxEvent::ArrowDown);
        }
        let end = transition(&down, &ComboBoxEvent::End);
        if down.highlighted().is_some() {
            // Pressing past the last enabled row stays on it
            let further = transition(&down, &ComboBoxEvent::ArrowDown);
            prop_assert!(further.highlighted() <= end.highlighted());
        }

        let mut up = transition(&down, &ComboBoxEvent::Home);
        for _ in 0..presses {
            up = transition(&up, &ComboBoxEvent::ArrowUp);
        }
        prop_assert_eq!(up.highlighted(), transition(&up, &ComboBoxEvent::Home).highlighted());
    }
}
