//! Document nodes
//!
//! Nodes live in a slotmap arena owned by the [`Document`](crate::Document).
//! A removed node's key is never reused for a different node, so a stale
//! [`NodeId`] held by a torn-down widget simply stops resolving.

use indexmap::IndexMap;
use slotmap::{new_key_type, Key};
use smallvec::SmallVec;

use crate::geometry::Rect;

new_key_type! {
    /// Stable identifier of a node in a document
    pub struct NodeId;
}

impl NodeId {
    /// Convert to a raw u64 representation
    ///
    /// Useful for building deterministic debug ids.
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }
}

/// Node payload
#[derive(Clone, Debug)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

/// Element-specific data
#[derive(Clone, Debug)]
pub struct ElementData {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes in insertion order
    pub attrs: IndexMap<String, String>,
    /// Live `value` property (inputs, selects)
    pub value: Option<String>,
    /// Layout box, reported by whoever lays the document out
    pub bounds: Option<Rect>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: IndexMap::new(),
            value: None,
            bounds: None,
        }
    }

    /// Iterate over the whitespace-separated entries of the `class` attribute
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .get("class")
            .map(|c| c.split_ascii_whitespace())
            .into_iter()
            .flatten()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    pub(crate) data: NodeData,
}

impl Node {
    pub(crate) fn element(tag: &str) -> Self {
        Self {
            parent: None,
            children: SmallVec::new(),
            data: NodeData::Element(ElementData::new(tag)),
        }
    }

    pub(crate) fn text(content: String) -> Self {
        Self {
            parent: None,
            children: SmallVec::new(),
            data: NodeData::Text(content),
        }
    }

    #[inline]
    pub(crate) fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    #[inline]
    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_is_lowercased() {
        let el = ElementData::new("SELECT");
        assert_eq!(el.tag, "select");
    }

    #[test]
    fn test_classes() {
        let mut el = ElementData::new("div");
        assert_eq!(el.classes().count(), 0);

        el.attrs
            .insert("class".into(), "usa-combo-box  usa-combo-box--pristine".into());
        assert!(el.has_class("usa-combo-box"));
        assert!(el.has_class("usa-combo-box--pristine"));
        assert!(!el.has_class("usa-combo"));
    }
}
