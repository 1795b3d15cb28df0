//! Host form controls
//!
//! The combo box enhances an existing control that keeps participating in
//! form submission. [`HostControl`] is the seam between the widget and that
//! control; [`SelectHost`] implements it for a native `<select>`.

use usa_dom::{aria, Document, NodeId};

use crate::error::Result;
use crate::option::ComboBoxOption;

/// A form control whose value the combo box mirrors
pub trait HostControl {
    /// The control's node
    fn node(&self) -> NodeId;

    /// The control's submitted value
    fn value(&self, doc: &Document) -> Option<String>;

    /// Write the submitted value; writing the current value is a no-op
    fn set_value(&self, doc: &mut Document, value: Option<&str>) -> Result<()>;

    fn is_disabled(&self, doc: &Document) -> bool {
        doc.is_disabled(self.node())
    }

    fn focus(&self, doc: &mut Document) -> Result<()> {
        doc.focus(self.node())?;
        Ok(())
    }

    /// Options declared by the control itself, if any
    fn read_options(&self, _doc: &Document) -> Vec<ComboBoxOption> {
        Vec::new()
    }
}

/// A native `<select>` element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectHost {
    node: NodeId,
}

impl SelectHost {
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }

    fn option_nodes<'a>(&self, doc: &'a Document) -> impl Iterator<Item = NodeId> + 'a {
        doc.children(self.node)
            .iter()
            .copied()
            .filter(move |&child| doc.tag(child) == Some("option"))
    }

    /// An `<option>`'s value: its `value` attribute, else its text
    fn option_value(doc: &Document, option: NodeId) -> String {
        doc.attribute(option, "value")
            .map(str::to_string)
            .unwrap_or_else(|| doc.text_content(option).trim().to_string())
    }
}

impl HostControl for SelectHost {
    fn node(&self) -> NodeId {
        self.node
    }

    /// The live value, else the first `<option selected>`
    fn value(&self, doc: &Document) -> Option<String> {
        if let Some(value) = doc.value(self.node) {
            return Some(value.to_string()).filter(|v| !v.is_empty());
        }
        self.option_nodes(doc)
            .find(|&option| doc.has_attribute(option, "selected"))
            .map(|option| Self::option_value(doc, option))
            .filter(|v| !v.is_empty())
    }

    fn set_value(&self, doc: &mut Document, value: Option<&str>) -> Result<()> {
        let options: Vec<NodeId> = self.option_nodes(doc).collect();
        for option in options {
            let matches = value == Some(Self::option_value(doc, option).as_str());
            doc.set_flag(option, "selected", matches)?;
        }
        doc.set_value(self.node, Some(value.unwrap_or_default()))?;
        Ok(())
    }

    fn read_options(&self, doc: &Document) -> Vec<ComboBoxOption> {
        self.option_nodes(doc)
            .map(|node| {
                let option = ComboBoxOption::new(
                    Self::option_value(doc, node),
                    doc.text_content(node).trim(),
                );
                if doc.is_disabled(node) {
                    option.disabled()
                } else {
                    option
                }
            })
            .collect()
    }
}

/// Host attributes changed during enhancement, restored on detach
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HostSnapshot {
    node: NodeId,
    id: Option<String>,
    class: Option<String>,
    aria_hidden: Option<String>,
    tabindex: Option<String>,
}

/// Class that hides the host visually while keeping it in the form
pub(crate) const HOST_HIDDEN_CLASS: &str = "usa-sr-only";

impl HostSnapshot {
    pub(crate) fn capture(doc: &Document, node: NodeId) -> Self {
        let get = |name: &str| doc.attribute(node, name).map(str::to_string);
        Self {
            node,
            id: get("id"),
            class: get("class"),
            aria_hidden: get(aria::attr::HIDDEN),
            tabindex: get("tabindex"),
        }
    }

    pub(crate) fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Hide the host from sight, focus and assistive technology
    ///
    /// The host's id moves to the visible input so labels keep working.
    pub(crate) fn retire(&self, doc: &mut Document) -> Result<()> {
        doc.add_class(self.node, HOST_HIDDEN_CLASS)?;
        doc.set_attribute(self.node, aria::attr::HIDDEN, "true")?;
        doc.set_attribute(self.node, "tabindex", "-1")?;
        doc.remove_attribute(self.node, "id")?;
        Ok(())
    }

    pub(crate) fn restore(&self, doc: &mut Document) -> Result<()> {
        if !doc.exists(self.node) {
            return Ok(());
        }
        doc.set_optional_attribute(self.node, "id", self.id.as_deref())?;
        doc.set_optional_attribute(self.node, "class", self.class.as_deref())?;
        doc.set_optional_attribute(self.node, aria::attr::HIDDEN, self.aria_hidden.as_deref())?;
        doc.set_optional_attribute(self.node, "tabindex", self.tabindex.as_deref())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(doc: &mut Document, options: &[(&str, &str)]) -> NodeId {
        let select = doc.create_element("select");
        doc.append_child(doc.body(), select).unwrap();
        for (value, label) in options {
            let option = doc.create_element("option");
            doc.set_attribute(option, "value", value).unwrap();
            doc.set_text_content(option, label).unwrap();
            doc.append_child(select, option).unwrap();
        }
        select
    }

    #[test]
    fn test_read_options() {
        let mut doc = Document::new();
        let node = select(&mut doc, &[("", "- Select -"), ("apple", "Apple")]);
        let plain = doc.create_element("option");
        doc.set_text_content(plain, "  Banana ").unwrap();
        doc.set_flag(plain, "disabled", true).unwrap();
        doc.append_child(node, plain).unwrap();

        let options = SelectHost::new(node).read_options(&doc);
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].value, "");
        assert_eq!(options[1], ComboBoxOption::new("apple", "Apple"));
        assert_eq!(options[2], ComboBoxOption::new("Banana", "Banana").disabled());
    }

    #[test]
    fn test_value_from_selected_option() {
        let mut doc = Document::new();
        let node = select(&mut doc, &[("apple", "Apple"), ("banana", "Banana")]);
        let host = SelectHost::new(node);
        assert_eq!(host.value(&doc), None);

        let banana = doc.children(node)[1];
        doc.set_flag(banana, "selected", true).unwrap();
        assert_eq!(host.value(&doc).as_deref(), Some("banana"));
    }

    #[test]
    fn test_set_value_marks_option() {
        let mut doc = Document::new();
        let node = select(&mut doc, &[("apple", "Apple"), ("banana", "Banana")]);
        let host = SelectHost::new(node);

        host.set_value(&mut doc, Some("banana")).unwrap();
        assert_eq!(host.value(&doc).as_deref(), Some("banana"));
        assert!(doc.has_attribute(doc.children(node)[1], "selected"));
        assert!(!doc.has_attribute(doc.children(node)[0], "selected"));

        host.set_value(&mut doc, None).unwrap();
        assert_eq!(host.value(&doc), None);
        assert!(!doc.has_attribute(doc.children(node)[1], "selected"));
    }

    #[test]
    fn test_set_same_value_is_noop() {
        let mut doc = Document::new();
        let node = select(&mut doc, &[("apple", "Apple")]);
        let host = SelectHost::new(node);
        host.set_value(&mut doc, Some("apple")).unwrap();
        let before = doc.stats();
        host.set_value(&mut doc, Some("apple")).unwrap();
        assert_eq!(doc.stats(), before);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut doc = Document::new();
        let node = select(&mut doc, &[]);
        doc.set_attribute(node, "id", "fruit").unwrap();
        doc.set_attribute(node, "class", "usa-select").unwrap();

        let snapshot = HostSnapshot::capture(&doc, node);
        snapshot.retire(&mut doc).unwrap();
        assert!(doc.has_class(node, HOST_HIDDEN_CLASS));
        assert_eq!(doc.attribute(node, "id"), None);
        assert_eq!(doc.attribute(node, "aria-hidden"), Some("true"));

        snapshot.restore(&mut doc).unwrap();
        assert_eq!(doc.attribute(node, "id"), Some("fruit"));
        assert_eq!(doc.attribute(node, "class"), Some("usa-select"));
        assert!(!doc.has_attribute(node, "aria-hidden"));
        assert!(!doc.has_attribute(node, "tabindex"));
    }
}
