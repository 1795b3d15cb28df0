//! Keyboard & focus state machine
//!
//! ```text
//!            Open / ArrowDown / ArrowUp / Type
//!   ┌────────┐ ─────────────────────────────▶ ┌──────┐
//!   │ Closed │                                │ Open │ ◀─┐ ArrowDown / ArrowUp /
//!   └────────┘ ◀───────────────────────────── └──────┘ ──┘ Home / End / Hover
//!     │  ▲      Close / Escape / Enter / Pick /
//!     └──┘      FocusOut (outside)
//!  Escape (cancel edit), Clear
//! ```
//!
//! [`transition`] is pure: it never reads the document and always returns the
//! same state for the same `(state, event)` pair.

use crate::event::ComboBoxEvent;
use crate::matcher;
use crate::state::ComboBoxState;

/// Compute the state that follows `event`
pub fn transition(state: &ComboBoxState, event: &ComboBoxEvent) -> ComboBoxState {
    let mut next = state.clone();
    apply(&mut next, event);
    next
}

fn apply(state: &mut ComboBoxState, event: &ComboBoxEvent) {
    match event {
        ComboBoxEvent::Open => {
            state.set_open(true);
            state.set_highlighted(None);
        }
        ComboBoxEvent::Close => state.set_open(false),
        ComboBoxEvent::Type(buffer) => {
            state.set_pristine(false);
            state.set_query(buffer.clone());
            state.set_open(true);
            state.set_highlighted(None);
        }
        ComboBoxEvent::ArrowDown => {
            let target = if state.is_open() {
                match state.highlighted() {
                    Some(pos) => next_enabled(state, pos).or(Some(pos)),
                    None => first_enabled(state),
                }
            } else {
                state.set_open(true);
                first_enabled(state)
            };
            state.set_highlighted(target);
        }
        ComboBoxEvent::ArrowUp => {
            let target = if state.is_open() {
                match state.highlighted() {
                    Some(pos) => previous_enabled(state, pos).or(Some(pos)),
                    None => last_enabled(state),
                }
            } else {
                state.set_open(true);
                last_enabled(state)
            };
            state.set_highlighted(target);
        }
        ComboBoxEvent::Home => {
            if state.is_open() {
                let target = first_enabled(state);
                state.set_highlighted(target);
            }
        }
        ComboBoxEvent::End => {
            if state.is_open() {
                let target = last_enabled(state);
                state.set_highlighted(target);
            }
        }
        ComboBoxEvent::Enter => commit_highlighted(state),
        ComboBoxEvent::Escape => {
            let was_open = state.is_open();
            state.set_open(false);
            let label = state.selected_label().map(str::to_string);
            match label {
                Some(label) => revert_to(state, label),
                None if !was_open => revert_to(state, String::new()),
                None => {}
            }
        }
        ComboBoxEvent::FocusOut { inside } => {
            if !inside {
                state.set_open(false);
            }
        }
        ComboBoxEvent::Clear => {
            state.set_selected(None);
            state.set_pristine(false);
            state.set_query(String::new());
            state.set_highlighted(None);
        }
        ComboBoxEvent::Hover(pos) => {
            if state.is_open() && is_selectable(state, *pos) {
                state.set_highlighted(Some(*pos));
            }
        }
        ComboBoxEvent::Pick(pos) => {
            if is_selectable(state, *pos) {
                state.set_highlighted(Some(*pos));
                commit_highlighted(state);
            }
        }
    }
}

/// Commit the highlighted option; a missing or disabled highlight is a no-op
fn commit_highlighted(state: &mut ComboBoxState) {
    let Some(option) = state.highlighted_option().filter(|o| o.is_enabled()) else {
        return;
    };
    let (value, label) = (option.value.clone(), option.label.clone());
    state.set_selected(Some(value));
    state.set_pristine(true);
    state.set_query(label);
    state.set_open(false);
}

/// Put the input text back to `label`; it is pristine when it names the selection
fn revert_to(state: &mut ComboBoxState, label: String) {
    let pristine = state.selected().is_some();
    state.set_query(label);
    state.set_pristine(pristine);
}

fn first_enabled(state: &ComboBoxState) -> Option<usize> {
    matcher::first_enabled(state.options().as_slice(), state.filtered())
}

fn last_enabled(state: &ComboBoxState) -> Option<usize> {
    matcher::last_enabled(state.options().as_slice(), state.filtered())
}

fn next_enabled(state: &ComboBoxState, from: usize) -> Option<usize> {
    matcher::next_enabled(state.options().as_slice(), state.filtered(), from)
}

fn previous_enabled(state: &ComboBoxState, from: usize) -> Option<usize> {
    matcher::previous_enabled(state.options().as_slice(), state.filtered(), from)
}

fn is_selectable(state: &ComboBoxState, pos: usize) -> bool {
    matcher::is_selectable(state.options().as_slice(), state.filtered(), pos)
}
