//! Projection of combo box state into the document
//!
//! [`ComboBoxView`] builds the enhanced markup once and afterwards only
//! patches the fragments named by a [`StateChanges`]. The input node lives
//! for the whole attachment; list rows are rebuilt only when the filtered
//! sequence changes.

use usa_dom::aria::{self, attr, AriaRole, LiveMode};
use usa_dom::{Document, NodeId, Rect};

use crate::changes::StateChanges;
use crate::config::ComboBoxConfig;
use crate::error::Result;
use crate::state::ComboBoxState;

/// Class names of the enhanced markup
pub mod classes {
    pub const CONTAINER: &str = "usa-combo-box";
    pub const PRISTINE: &str = "usa-combo-box--pristine";
    pub const DISABLED: &str = "usa-combo-box--disabled";
    pub const INPUT: &str = "usa-combo-box__input";
    pub const CLEAR_INPUT: &str = "usa-combo-box__clear-input";
    pub const SEPARATOR: &str = "usa-combo-box__input-button-separator";
    pub const TOGGLE_LIST: &str = "usa-combo-box__toggle-list";
    pub const LIST: &str = "usa-combo-box__list";
    pub const LIST_ABOVE: &str = "usa-combo-box__list--above";
    pub const OPTION: &str = "usa-combo-box__list-option";
    pub const OPTION_FOCUSED: &str = "usa-combo-box__list-option--focused";
    pub const OPTION_SELECTED: &str = "usa-combo-box__list-option--selected";
    pub const OPTION_DISABLED: &str = "usa-combo-box__list-option--disabled";
    pub const NO_RESULTS: &str = "usa-combo-box__list-option--no-results";
    pub const STATUS: &str = "usa-combo-box__status usa-sr-only";
    pub const SR_ONLY: &str = "usa-sr-only";
}

/// Document ids of the enhanced markup
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComboBoxIds {
    /// The input's id (the base every other id derives from)
    pub input: String,
    pub list: String,
    pub status: String,
    /// Id of the assistive hint referenced by `aria-describedby`
    pub hint: String,
}

impl ComboBoxIds {
    pub fn new(base: &str) -> Self {
        Self {
            input: base.to_string(),
            list: format!("{base}--list"),
            status: format!("{base}--status"),
            hint: format!("{base}--assistiveHint"),
        }
    }

    /// Id of the row at a filtered position
    pub fn option(&self, position: usize) -> String {
        format!("{}--option-{}", self.list, position)
    }
}

/// Nodes of the enhanced markup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComboBoxNodes {
    pub container: NodeId,
    pub input: NodeId,
    pub clear_button: NodeId,
    pub separator: NodeId,
    pub toggle_button: NodeId,
    pub list: NodeId,
    pub status: NodeId,
    pub hint: NodeId,
}

/// Where the popup list opens relative to the input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Placement {
    #[default]
    Below,
    Above,
}

impl Placement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Below => "below",
            Placement::Above => "above",
        }
    }

    /// Open below unless the list does not fit there and there is more room
    /// above
    pub fn choose(anchor: Rect, viewport: Rect, list_height: f32) -> Self {
        let below = viewport.bottom() - anchor.bottom();
        let above = anchor.y - viewport.y;
        if below < list_height && above > below {
            Placement::Above
        } else {
            Placement::Below
        }
    }
}

/// The enhanced markup of one attachment
#[derive(Debug)]
pub(crate) struct ComboBoxView {
    nodes: ComboBoxNodes,
    ids: ComboBoxIds,
    rows: Vec<NodeId>,
    no_results: Option<NodeId>,
}

impl ComboBoxView {
    /// Build the markup as the next sibling of `host` and render `state`
    pub(crate) fn build(
        doc: &mut Document,
        host: NodeId,
        ids: ComboBoxIds,
        config: &ComboBoxConfig,
        state: &ComboBoxState,
        disabled: bool,
    ) -> Result<Self> {
        let messages = &config.messages;

        let container = doc.create_element("div");
        doc.set_attribute(container, "class", classes::CONTAINER)?;
        doc.set_attribute(container, "data-enhanced", "pending")?;
        doc.insert_after(host, container)?;

        let input = append(
            doc,
            container,
            "input",
            &[
                ("id", ids.input.as_str()),
                ("class", classes::INPUT),
                ("type", "text"),
                (attr::ROLE, AriaRole::Combobox.as_str()),
                (attr::AUTOCOMPLETE, "list"),
                (attr::EXPANDED, "false"),
                (attr::CONTROLS, ids.list.as_str()),
                (attr::OWNS, ids.list.as_str()),
                (attr::DESCRIBEDBY, ids.hint.as_str()),
                ("autocomplete", "off"),
                ("autocapitalize", "off"),
            ],
        )?;
        doc.set_optional_attribute(input, "placeholder", config.placeholder.as_deref())?;

        let clear_button = append(
            doc,
            container,
            "button",
            &[
                ("type", "button"),
                ("class", classes::CLEAR_INPUT),
                (attr::LABEL, messages.clear_label.as_str()),
            ],
        )?;
        let separator = append(doc, container, "span", &[("class", classes::SEPARATOR)])?;
        let toggle_button = append(
            doc,
            container,
            "button",
            &[
                ("type", "button"),
                ("tabindex", "-1"),
                ("class", classes::TOGGLE_LIST),
                (attr::LABEL, messages.toggle_label.as_str()),
            ],
        )?;
        let list = append(
            doc,
            container,
            "ul",
            &[
                ("id", ids.list.as_str()),
                ("class", classes::LIST),
                ("tabindex", "-1"),
                (attr::ROLE, AriaRole::Listbox.as_str()),
            ],
        )?;
        let status = append(
            doc,
            container,
            "div",
            &[
                ("id", ids.status.as_str()),
                ("class", classes::STATUS),
                (attr::ROLE, AriaRole::Status.as_str()),
                (attr::LIVE, LiveMode::Polite.as_str()),
            ],
        )?;
        let hint = append(
            doc,
            container,
            "span",
            &[("id", ids.hint.as_str()), ("class", classes::SR_ONLY)],
        )?;
        doc.set_text_content(hint, messages.assistive_hint.as_str())?;

        if disabled {
            doc.add_class(container, classes::DISABLED)?;
            for node in [input, clear_button, toggle_button] {
                doc.set_flag(node, "disabled", true)?;
            }
        }

        let mut view = Self {
            nodes: ComboBoxNodes {
                container,
                input,
                clear_button,
                separator,
                toggle_button,
                list,
                status,
                hint,
            },
            ids,
            rows: Vec::new(),
            no_results: None,
        };
        view.patch(doc, state, state, StateChanges::all(), config)?;
        Ok(view)
    }

    pub(crate) fn nodes(&self) -> ComboBoxNodes {
        self.nodes
    }

    pub(crate) fn ids(&self) -> &ComboBoxIds {
        &self.ids
    }

    pub(crate) fn rows(&self) -> &[NodeId] {
        &self.rows
    }

    pub(crate) fn no_results_row(&self) -> Option<NodeId> {
        self.no_results
    }

    /// Bring the markup from `prev` to `next`, touching only changed fragments
    pub(crate) fn patch(
        &mut self,
        doc: &mut Document,
        prev: &ComboBoxState,
        next: &ComboBoxState,
        changes: StateChanges,
        config: &ComboBoxConfig,
    ) -> Result<()> {
        let nodes = self.nodes;

        if changes.open {
            doc.set_hidden(nodes.list, !next.is_open())?;
            doc.set_attribute(nodes.input, attr::EXPANDED, aria::bool_value(next.is_open()))?;
        }

        if changes.filtered {
            self.render_rows(doc, next, config)?;
        } else if changes.selected {
            self.mark_selected(doc, next)?;
        }

        if changes.filtered || changes.highlighted {
            if !changes.filtered {
                if let Some(&row) = prev.highlighted().and_then(|p| self.rows.get(p)) {
                    set_row_highlight(doc, row, false)?;
                }
            }
            if let Some(&row) = next.highlighted().and_then(|p| self.rows.get(p)) {
                set_row_highlight(doc, row, true)?;
            }
            let descendant = next.highlighted().map(|p| self.ids.option(p));
            doc.set_optional_attribute(nodes.input, attr::ACTIVEDESCENDANT, descendant.as_deref())?;
        }

        // The caret survives as long as the value is left alone
        if changes.query && doc.value(nodes.input) != Some(next.query()) {
            doc.set_value(nodes.input, Some(next.query()))?;
        }

        if changes.pristine {
            doc.toggle_class(nodes.container, classes::PRISTINE, next.is_pristine())?;
            doc.set_hidden(nodes.clear_button, !next.is_pristine())?;
        }
        Ok(())
    }

    pub(crate) fn set_status(&self, doc: &mut Document, text: &str) -> Result<()> {
        doc.set_text_content(self.nodes.status, text)?;
        Ok(())
    }

    /// Filtered position of the row containing `node`
    pub(crate) fn row_position(&self, doc: &Document, node: NodeId) -> Option<usize> {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.nodes.list {
                return None;
            }
            if let Some(position) = self.rows.iter().position(|&row| row == id) {
                return Some(position);
            }
            current = doc.parent(id);
        }
        None
    }

    /// Measure the input against the viewport and place the list
    pub(crate) fn place(&self, doc: &mut Document, list_max_height: f32) -> Result<Placement> {
        let placement = doc
            .bounds(self.nodes.input)
            .map(|anchor| Placement::choose(anchor, doc.viewport(), list_max_height))
            .unwrap_or_default();
        doc.set_attribute(self.nodes.list, "data-placement", placement.as_str())?;
        doc.toggle_class(self.nodes.list, classes::LIST_ABOVE, placement == Placement::Above)?;
        doc.set_attribute(self.nodes.container, "data-enhanced", "ready")?;
        Ok(placement)
    }

    /// Remove the markup from the document
    pub(crate) fn remove(&self, doc: &mut Document) -> Result<()> {
        if doc.exists(self.nodes.container) {
            doc.remove(self.nodes.container)?;
        }
        Ok(())
    }

    fn render_rows(
        &mut self,
        doc: &mut Document,
        state: &ComboBoxState,
        config: &ComboBoxConfig,
    ) -> Result<()> {
        for row in std::mem::take(&mut self.rows) {
            doc.remove(row)?;
        }
        if let Some(row) = self.no_results.take() {
            doc.remove(row)?;
        }

        let list = self.nodes.list;
        let total = state.result_count();
        if total == 0 {
            let row = append(doc, list, "li", &[("class", classes::NO_RESULTS)])?;
            doc.set_text_content(row, &config.messages.no_results)?;
            self.no_results = Some(row);
            return Ok(());
        }

        let set_size = total.to_string();
        for (position, option) in state.filtered_options().enumerate() {
            let row = append(
                doc,
                list,
                "li",
                &[
                    ("id", self.ids.option(position).as_str()),
                    ("class", classes::OPTION),
                    ("tabindex", "-1"),
                    (attr::ROLE, AriaRole::Option.as_str()),
                    (attr::SETSIZE, set_size.as_str()),
                    (attr::POSINSET, (position + 1).to_string().as_str()),
                    (attr::SELECTED, "false"),
                    ("data-value", option.value.as_str()),
                ],
            )?;
            doc.set_text_content(row, &option.label)?;
            if !option.is_enabled() {
                doc.add_class(row, classes::OPTION_DISABLED)?;
                doc.set_attribute(row, attr::DISABLED, "true")?;
            }
            if state.selected() == Some(option.value.as_str()) {
                doc.add_class(row, classes::OPTION_SELECTED)?;
            }
            self.rows.push(row);
        }
        tracing::trace!(rows = total, "rendered list rows");
        Ok(())
    }

    fn mark_selected(&self, doc: &mut Document, state: &ComboBoxState) -> Result<()> {
        for (&row, option) in self.rows.iter().zip(state.filtered_options()) {
            let selected = state.selected() == Some(option.value.as_str());
            doc.toggle_class(row, classes::OPTION_SELECTED, selected)?;
        }
        Ok(())
    }
}

fn append(
    doc: &mut Document,
    parent: NodeId,
    tag: &str,
    attrs: &[(&str, &str)],
) -> Result<NodeId> {
    let node = doc.create_element(tag);
    for (name, value) in attrs {
        doc.set_attribute(node, name, value)?;
    }
    doc.append_child(parent, node)?;
    Ok(node)
}

fn set_row_highlight(doc: &mut Document, row: NodeId, on: bool) -> Result<()> {
    doc.toggle_class(row, classes::OPTION_FOCUSED, on)?;
    doc.set_attribute(row, attr::SELECTED, aria::bool_value(on))?;
    doc.set_attribute(row, "tabindex", if on { "0" } else { "-1" })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ComboBoxEvent;
    use crate::machine::transition;
    use crate::option::{ComboBoxOption, OptionSet};

    fn setup() -> (Document, ComboBoxView, ComboBoxState, ComboBoxConfig) {
        let mut doc = Document::new();
        let host = doc.create_element("select");
        doc.append_child(doc.body(), host).unwrap();
        let state = ComboBoxState::new(
            OptionSet::sanitize([
                ComboBoxOption::new("apple", "Apple"),
                ComboBoxOption::new("apricot", "Apricot").disabled(),
                ComboBoxOption::new("banana", "Banana"),
            ]),
            None,
        );
        let config = ComboBoxConfig::default();
        let view =
            ComboBoxView::build(&mut doc, host, ComboBoxIds::new("fruit"), &config, &state, false)
                .unwrap();
        (doc, view, state, config)
    }

    fn step(
        doc: &mut Document,
        view: &mut ComboBoxView,
        state: &ComboBoxState,
        config: &ComboBoxConfig,
        event: ComboBoxEvent,
    ) -> ComboBoxState {
        let next = transition(state, &event);
        let changes = StateChanges::between(state, &next);
        view.patch(doc, state, &next, changes, config).unwrap();
        next
    }

    #[test]
    fn test_ids() {
        let ids = ComboBoxIds::new("fruit");
        assert_eq!(ids.list, "fruit--list");
        assert_eq!(ids.hint, "fruit--assistiveHint");
        assert_eq!(ids.option(2), "fruit--list--option-2");
    }

    #[test]
    fn test_build_structure() {
        let (doc, view, _, _) = setup();
        let nodes = view.nodes();
        let input = nodes.input;

        assert!(doc.has_class(nodes.container, classes::CONTAINER));
        assert_eq!(doc.parent(input), Some(nodes.container));
        assert_eq!(doc.attribute(input, "role"), Some("combobox"));
        assert_eq!(doc.attribute(input, "aria-controls"), Some("fruit--list"));
        assert_eq!(doc.attribute(input, "aria-describedby"), Some("fruit--assistiveHint"));
        assert_eq!(doc.attribute(input, "aria-expanded"), Some("false"));
        assert_eq!(doc.attribute(input, "aria-activedescendant"), None);
        assert_eq!(doc.attribute(nodes.list, "role"), Some("listbox"));
        assert!(doc.is_hidden(nodes.list));
        assert!(doc.is_hidden(nodes.clear_button));
        assert_eq!(doc.attribute(nodes.status, "aria-live"), Some("polite"));
        assert_eq!(doc.attribute(nodes.container, "data-enhanced"), Some("pending"));
        assert_eq!(view.rows().len(), 3);
    }

    #[test]
    fn test_rows() {
        let (doc, view, _, _) = setup();
        let rows = view.rows();
        assert_eq!(doc.attribute(rows[0], "id"), Some("fruit--list--option-0"));
        assert_eq!(doc.attribute(rows[0], "aria-setsize"), Some("3"));
        assert_eq!(doc.attribute(rows[2], "aria-posinset"), Some("3"));
        assert_eq!(doc.attribute(rows[1], "aria-disabled"), Some("true"));
        assert!(doc.has_class(rows[1], classes::OPTION_DISABLED));
        assert_eq!(doc.text_content(rows[2]), "Banana");
        assert_eq!(doc.attribute(rows[2], "data-value"), Some("banana"));
    }

    #[test]
    fn test_highlight_patch_keeps_rows() {
        let (mut doc, mut view, state, config) = setup();
        let rows_before = view.rows().to_vec();

        let open = step(&mut doc, &mut view, &state, &config, ComboBoxEvent::ArrowDown);
        assert_eq!(view.rows(), rows_before.as_slice());
        assert!(!doc.is_hidden(view.nodes().list));
        assert_eq!(doc.attribute(view.nodes().input, "aria-expanded"), Some("true"));
        assert!(doc.has_class(rows_before[0], classes::OPTION_FOCUSED));
        assert_eq!(
            doc.attribute(view.nodes().input, "aria-activedescendant"),
            Some("fruit--list--option-0")
        );

        step(&mut doc, &mut view, &open, &config, ComboBoxEvent::ArrowDown);
        assert!(!doc.has_class(rows_before[0], classes::OPTION_FOCUSED));
        assert_eq!(doc.attribute(rows_before[0], "aria-selected"), Some("false"));
        assert!(doc.has_class(rows_before[2], classes::OPTION_FOCUSED));
        assert_eq!(
            doc.attribute(view.nodes().input, "aria-activedescendant"),
            Some("fruit--list--option-2")
        );
    }

    #[test]
    fn test_no_results_row() {
        let (mut doc, mut view, state, config) = setup();
        let next = step(&mut doc, &mut view, &state, &config, ComboBoxEvent::Type("xyz".into()));
        assert!(view.rows().is_empty());
        let sentinel = view.no_results_row().unwrap();
        assert_eq!(doc.text_content(sentinel), "No results found");
        assert!(!doc.has_attribute(sentinel, "role"));

        step(&mut doc, &mut view, &next, &config, ComboBoxEvent::Clear);
        assert!(view.no_results_row().is_none());
        assert!(!doc.exists(sentinel));
        assert_eq!(view.rows().len(), 3);
    }

    #[test]
    fn test_typing_does_not_rewrite_input() {
        let (mut doc, mut view, state, config) = setup();
        let input = view.nodes().input;
        doc.set_value(input, Some("ban")).unwrap();
        let writes = doc.stats().value_writes;

        step(&mut doc, &mut view, &state, &config, ComboBoxEvent::Type("ban".into()));
        assert_eq!(doc.stats().value_writes, writes);
        assert_eq!(view.rows().len(), 1);
    }

    #[test]
    fn test_navigation_leaves_input_value_alone() {
        let (mut doc, mut view, state, config) = setup();
        let writes = doc.stats().value_writes;

        let open = step(&mut doc, &mut view, &state, &config, ComboBoxEvent::ArrowDown);
        step(&mut doc, &mut view, &open, &config, ComboBoxEvent::End);
        assert_eq!(doc.stats().value_writes, writes);
        assert_eq!(doc.value(view.nodes().input), Some(""));
    }

    #[test]
    fn test_commit_marks_selected_and_pristine() {
        let (mut doc, mut view, state, config) = setup();
        let open = step(&mut doc, &mut view, &state, &config, ComboBoxEvent::ArrowDown);
        step(&mut doc, &mut view, &open, &config, ComboBoxEvent::Enter);

        let nodes = view.nodes();
        assert_eq!(doc.value(nodes.input), Some("Apple"));
        assert!(doc.is_hidden(nodes.list));
        assert!(!doc.is_hidden(nodes.clear_button));
        assert!(doc.has_class(nodes.container, classes::PRISTINE));
        assert!(doc.has_class(view.rows()[0], classes::OPTION_SELECTED));
    }

    #[test]
    fn test_placement() {
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        assert_eq!(
            Placement::choose(Rect::new(0.0, 100.0, 200.0, 30.0), viewport, 240.0),
            Placement::Below
        );
        assert_eq!(
            Placement::choose(Rect::new(0.0, 500.0, 200.0, 30.0), viewport, 240.0),
            Placement::Above
        );
        // Neither side fits; below wins when it has more room
        assert_eq!(
            Placement::choose(Rect::new(0.0, 40.0, 200.0, 30.0), Rect::new(0.0, 0.0, 800.0, 200.0), 240.0),
            Placement::Below
        );
    }

    #[test]
    fn test_place_and_remove() {
        let (mut doc, view, _, _) = setup();
        let nodes = view.nodes();
        doc.set_bounds(nodes.input, Rect::new(0.0, 700.0, 200.0, 30.0)).unwrap();

        assert_eq!(view.place(&mut doc, 240.0).unwrap(), Placement::Above);
        assert_eq!(doc.attribute(nodes.list, "data-placement"), Some("above"));
        assert!(doc.has_class(nodes.list, classes::LIST_ABOVE));
        assert_eq!(doc.attribute(nodes.container, "data-enhanced"), Some("ready"));

        view.remove(&mut doc).unwrap();
        assert!(!doc.exists(nodes.container));
        assert!(!doc.exists(nodes.input));
    }

    #[test]
    fn test_row_position() {
        let (doc, view, _, _) = setup();
        assert_eq!(view.row_position(&doc, view.rows()[2]), Some(2));
        assert_eq!(view.row_position(&doc, view.nodes().list), None);
        assert_eq!(view.row_position(&doc, view.nodes().input), None);
    }
}
