//! Combo box state
//!
//! [`ComboBoxState`] is a plain value. The controller owns the only live
//! instance and replaces it with the output of
//! [`transition`](crate::machine::transition) on every event.

use crate::matcher;
use crate::option::{ComboBoxOption, OptionSet};

/// Authoritative combo box state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComboBoxState {
    options: OptionSet,
    query: String,
    filtered: Vec<usize>,
    is_open: bool,
    highlighted: Option<usize>,
    selected: Option<String>,
    pristine: bool,
}

impl ComboBoxState {
    /// Fresh closed state over `options`
    ///
    /// An initial value naming an option becomes the committed selection and
    /// its label the input text. Any other initial value is ignored.
    pub fn new(options: OptionSet, initial_value: Option<&str>) -> Self {
        let committed = initial_value
            .and_then(|v| options.find(v))
            .map(|o| (o.value.clone(), o.label.clone()));

        let mut state = Self {
            options,
            query: String::new(),
            filtered: Vec::new(),
            is_open: false,
            highlighted: None,
            selected: None,
            pristine: false,
        };
        if let Some((value, label)) = committed {
            state.selected = Some(value);
            state.query = label;
            state.pristine = true;
        }
        state.refilter();
        state
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    /// Raw text of the filter input
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Indices into [`options`](Self::options), in display order
    pub fn filtered(&self) -> &[usize] {
        &self.filtered
    }

    /// The filtered options, in display order
    pub fn filtered_options(&self) -> impl Iterator<Item = &ComboBoxOption> + '_ {
        self.filtered.iter().filter_map(|i| self.options.get(*i))
    }

    /// Option shown at a filtered position
    pub fn option_at(&self, position: usize) -> Option<&ComboBoxOption> {
        self.filtered
            .get(position)
            .and_then(|i| self.options.get(*i))
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Highlighted position within [`filtered`](Self::filtered)
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlighted_option(&self) -> Option<&ComboBoxOption> {
        self.highlighted.and_then(|p| self.option_at(p))
    }

    /// Committed value
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The committed option
    pub fn selected_option(&self) -> Option<&ComboBoxOption> {
        self.selected.as_deref().and_then(|v| self.options.find(v))
    }

    /// Label of the committed option
    pub fn selected_label(&self) -> Option<&str> {
        self.selected_option().map(|o| o.label.as_str())
    }

    /// Whether the input text mirrors the committed label with no edits since
    pub fn is_pristine(&self) -> bool {
        self.pristine
    }

    /// Number of matches, excluding the no-results row
    pub fn result_count(&self) -> usize {
        self.filtered.len()
    }

    /// The query the list is filtered by
    ///
    /// While pristine the input shows the committed label, which is not an
    /// edit, so the list stays unfiltered.
    pub fn effective_query(&self) -> &str {
        if self.pristine {
            ""
        } else {
            &self.query
        }
    }

    // =========================================================================
    // Mutators (crate-private; only the state machine drives them)
    // =========================================================================

    pub(crate) fn set_query(&mut self, query: String) {
        self.query = query;
        self.refilter();
    }

    pub(crate) fn set_open(&mut self, open: bool) {
        self.is_open = open;
        if !open {
            self.highlighted = None;
        }
    }

    /// Highlight a position; positions that are out of range or disabled clear it
    pub(crate) fn set_highlighted(&mut self, position: Option<usize>) {
        self.highlighted = position
            .filter(|p| matcher::is_selectable(self.options.as_slice(), &self.filtered, *p));
    }

    pub(crate) fn set_selected(&mut self, value: Option<String>) {
        self.selected = value;
    }

    pub(crate) fn set_pristine(&mut self, pristine: bool) {
        if self.pristine != pristine {
            self.pristine = pristine;
            self.refilter();
        }
    }

    /// Recompute `filtered`; the highlight does not survive a new list
    fn refilter(&mut self) {
        let filtered = matcher::filter_options(self.options.as_slice(), self.effective_query());
        if filtered != self.filtered {
            self.filtered = filtered;
            self.highlighted = None;
        }
    }
}
