//! Event types and listener storage
//!
//! Listeners are registered per node and event type, and are dispatched by
//! [`Document::dispatch_event`](crate::Document::dispatch_event) along the
//! target's ancestor path.
//!
//! ```text
//! Document::dispatch_event(event)
//!     ↓ path = target, parent, ..., body
//! Listeners (indexed by NodeId, registration order)
//!     ↓ callbacks cloned out of the table
//! callback(&mut Document, &DomEvent)
//! ```
//!
//! Callbacks receive the document mutably so they can patch the tree while
//! handling an event. They are cloned out of the table before being invoked,
//! so a callback may add or remove listeners (including itself) safely.

use std::cell::Cell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::document::Document;
use crate::node::NodeId;

new_key_type! {
    /// Handle returned by `add_event_listener`, used to remove the listener
    pub struct ListenerId;
}

/// Callback for handling events
///
/// Uses Rc since the document is single-threaded.
pub type EventCallback = Rc<dyn Fn(&mut Document, &DomEvent)>;

/// Key codes delivered with [`EventType::KeyDown`]
pub mod key_codes {
    pub const TAB: u32 = 9;
    pub const ENTER: u32 = 13;
    pub const ESCAPE: u32 = 27;
    pub const END: u32 = 35;
    pub const HOME: u32 = 36;
    pub const ARROW_LEFT: u32 = 37;
    pub const ARROW_UP: u32 = 38;
    pub const ARROW_RIGHT: u32 = 39;
    pub const ARROW_DOWN: u32 = 40;
}

/// The kinds of events a document dispatches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    /// The value of an input changed through user editing
    Input,
    /// A form control committed a new value
    Change,
    KeyDown,
    FocusIn,
    FocusOut,
    MouseOver,
}

impl EventType {
    /// DOM name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::Input => "input",
            EventType::Change => "change",
            EventType::KeyDown => "keydown",
            EventType::FocusIn => "focusin",
            EventType::FocusOut => "focusout",
            EventType::MouseOver => "mouseover",
        }
    }
}

/// An event travelling through the document
#[derive(Debug)]
pub struct DomEvent {
    /// The type of event that occurred
    pub event_type: EventType,
    /// The node the event was dispatched at
    pub target: NodeId,
    /// Key code for KEY_DOWN events
    pub key_code: u32,
    /// Character for printable keys
    pub key_char: Option<char>,
    /// For focus events: the node losing or gaining focus on the other side
    pub related_target: Option<NodeId>,
    /// Event payload (new input text, committed value, ...)
    pub data: Option<String>,
    /// Whether the event travels to ancestors
    pub bubbles: bool,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl DomEvent {
    /// Create a new bubbling event
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            event_type,
            target,
            key_code: 0,
            key_char: None,
            related_target: None,
            data: None,
            bubbles: true,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// Set key code (for KEY_DOWN events)
    pub fn with_key_code(mut self, code: u32) -> Self {
        self.key_code = code;
        self
    }

    /// Set key character
    pub fn with_key_char(mut self, c: char) -> Self {
        self.key_char = Some(c);
        self
    }

    /// Set the related target (for focus events)
    pub fn with_related_target(mut self, related: Option<NodeId>) -> Self {
        self.related_target = related;
        self
    }

    /// Attach a payload
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Disable bubbling
    pub fn non_bubbling(mut self) -> Self {
        self.bubbles = false;
        self
    }

    /// Cancel the default action (form submission, caret movement, ...)
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Stop the event from reaching further ancestors
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

struct Listener {
    node: NodeId,
    event_type: EventType,
    callback: EventCallback,
}

/// Listener table owned by a document
#[derive(Default)]
pub(crate) struct Listeners {
    entries: SlotMap<ListenerId, Listener>,
    by_node: FxHashMap<NodeId, SmallVec<[ListenerId; 4]>>,
}

impl Listeners {
    pub(crate) fn add(
        &mut self,
        node: NodeId,
        event_type: EventType,
        callback: EventCallback,
    ) -> ListenerId {
        let id = self.entries.insert(Listener {
            node,
            event_type,
            callback,
        });
        self.by_node.entry(node).or_default().push(id);
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let Some(listener) = self.entries.remove(id) else {
            return false;
        };
        if let Some(ids) = self.by_node.get_mut(&listener.node) {
            ids.retain(|l| *l != id);
            if ids.is_empty() {
                self.by_node.remove(&listener.node);
            }
        }
        true
    }

    /// Drop every listener attached to `node`
    pub(crate) fn remove_node(&mut self, node: NodeId) -> usize {
        let Some(ids) = self.by_node.remove(&node) else {
            return 0;
        };
        for id in &ids {
            self.entries.remove(*id);
        }
        ids.len()
    }

    /// Clone out the callbacks registered on `node` for `event_type`
    pub(crate) fn callbacks(
        &self,
        node: NodeId,
        event_type: EventType,
    ) -> SmallVec<[EventCallback; 4]> {
        self.by_node
            .get(&node)
            .into_iter()
            .flatten()
            .filter_map(|id| self.entries.get(*id))
            .filter(|l| l.event_type == event_type)
            .map(|l| Rc::clone(&l.callback))
            .collect()
    }

    pub(crate) fn contains(&self, id: ListenerId) -> bool {
        self.entries.contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn node_ids(count: usize) -> Vec<NodeId> {
        let mut map: SlotMap<NodeId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_event_builder() {
        let ids = node_ids(2);
        let event = DomEvent::new(EventType::FocusOut, ids[0])
            .with_related_target(Some(ids[1]))
            .with_key_code(key_codes::ENTER);

        assert_eq!(event.related_target, Some(ids[1]));
        assert_eq!(event.key_code, 13);
        assert!(event.bubbles);
        assert!(!event.default_prevented());

        event.prevent_default();
        assert!(event.default_prevented());
    }

    #[test]
    fn test_listener_table() {
        let ids = node_ids(2);
        let mut listeners = Listeners::default();

        let a = listeners.add(ids[0], EventType::Click, Rc::new(|_: &mut Document, _: &DomEvent| {}));
        let _b = listeners.add(ids[0], EventType::KeyDown, Rc::new(|_: &mut Document, _: &DomEvent| {}));
        let _c = listeners.add(ids[1], EventType::Click, Rc::new(|_: &mut Document, _: &DomEvent| {}));

        assert_eq!(listeners.len(), 3);
        assert_eq!(listeners.callbacks(ids[0], EventType::Click).len(), 1);
        assert_eq!(listeners.callbacks(ids[0], EventType::Input).len(), 0);

        assert!(listeners.remove(a));
        assert!(!listeners.remove(a));
        assert!(!listeners.contains(a));

        assert_eq!(listeners.remove_node(ids[0]), 1);
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn test_event_type_names() {
        assert_eq!(EventType::FocusOut.as_str(), "focusout");
        assert_eq!(EventType::KeyDown.as_str(), "keydown");
    }
}
