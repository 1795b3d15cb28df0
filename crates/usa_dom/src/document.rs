//! The document: node arena, listeners, focus and frame queue

use std::rc::Rc;

use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::error::{DomError, Result};
use crate::event::{DomEvent, EventCallback, EventType, ListenerId, Listeners};
use crate::frame::{FrameCallback, FrameHandle, FrameQueue};
use crate::geometry::Rect;
use crate::node::{ElementData, Node, NodeData, NodeId};

/// Counters for observing how much a widget touches the document
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DomStats {
    /// Nodes created since the document was built
    pub nodes_created: usize,
    /// Nodes removed (subtree members included)
    pub nodes_removed: usize,
    /// Attribute writes that actually changed a value
    pub attribute_writes: usize,
    /// `value` property writes that actually changed a value
    pub value_writes: usize,
}

/// A single-threaded document
///
/// The document owns every node, every listener and the pending animation
/// frames. Widgets hold [`NodeId`]s and [`ListenerId`]s into it.
pub struct Document {
    nodes: SlotMap<NodeId, Node>,
    body: NodeId,
    listeners: Listeners,
    frames: FrameQueue,
    focused: Option<NodeId>,
    viewport: Rect,
    id_counter: u32,
    stats: DomStats,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("listeners", &self.listeners.len())
            .field("pending_frames", &self.frames.len())
            .field("focused", &self.focused)
            .finish()
    }
}

impl Document {
    /// Create an empty document with a `<body>` root
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let body = nodes.insert(Node::element("body"));
        Self {
            nodes,
            body,
            listeners: Listeners::default(),
            frames: FrameQueue::default(),
            focused: None,
            viewport: Rect::new(0.0, 0.0, 1024.0, 768.0),
            id_counter: 0,
            stats: DomStats {
                nodes_created: 1,
                ..DomStats::default()
            },
        }
    }

    /// The root element
    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn stats(&self) -> DomStats {
        self.stats
    }

    // =========================================================================
    // Tree structure
    // =========================================================================

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.stats.nodes_created += 1;
        self.nodes.insert(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.stats.nodes_created += 1;
        self.nodes.insert(Node::text(text.into()))
    }

    /// Whether the node still exists in this document
    pub fn exists(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Whether the node is reachable from the body
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.body, node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|c| *c == node)?;
        siblings.get(pos + 1).copied()
    }

    /// Inclusive descendant check: `contains(a, a)` is true
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.node(parent)?.children.len();
        self.insert_at(parent, child, index)
    }

    /// Insert `node` directly after `reference` under the same parent
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<()> {
        let parent = self
            .parent(reference)
            .ok_or(DomError::NodeNotFound(reference))?;
        if self.contains(node, parent) {
            return Err(DomError::HierarchyRequest {
                parent,
                child: node,
            });
        }
        self.detach_from_parent(node)?;
        let index = self
            .children(parent)
            .iter()
            .position(|c| *c == reference)
            .map(|p| p + 1)
            .ok_or(DomError::NodeNotFound(reference))?;
        self.insert_at(parent, node, index)
    }

    fn insert_at(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        self.element(parent)?;
        self.node(child)?;
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        self.detach_from_parent(child)?;

        let parent_node = self.node_mut(parent)?;
        let index = index.min(parent_node.children.len());
        parent_node.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn detach_from_parent(&mut self, node: NodeId) -> Result<()> {
        if let Some(old_parent) = self.node(node)?.parent {
            if let Some(p) = self.nodes.get_mut(old_parent) {
                p.children.retain(|c| *c != node);
            }
            self.node_mut(node)?.parent = None;
        }
        Ok(())
    }

    /// Remove a node and its whole subtree from the document
    ///
    /// Listeners registered on removed nodes are dropped, and focus inside the
    /// subtree is cleared without dispatching focus events.
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        if node == self.body {
            return Err(DomError::HierarchyRequest {
                parent: node,
                child: node,
            });
        }
        self.detach_from_parent(node)?;

        let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();
        stack.push(node);
        let mut dropped_listeners = 0;
        while let Some(id) = stack.pop() {
            if let Some(removed) = self.nodes.remove(id) {
                stack.extend(removed.children.iter().copied());
                dropped_listeners += self.listeners.remove_node(id);
                self.stats.nodes_removed += 1;
                if self.focused == Some(id) {
                    self.focused = None;
                }
            }
        }
        tracing::trace!(?node, dropped_listeners, "removed subtree");
        Ok(())
    }

    // =========================================================================
    // Elements & attributes
    // =========================================================================

    /// Lowercase tag name, `None` for text nodes
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes
            .get(node)
            .and_then(Node::as_element)
            .map(|e| e.tag.as_str())
    }

    /// Borrow the element data of a node
    pub fn element(&self, node: NodeId) -> Result<&ElementData> {
        self.node(node)?
            .as_element()
            .ok_or(DomError::NotAnElement(node))
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut ElementData> {
        self.node_mut(node)?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(node))
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .ok()
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// Set an attribute; writing an identical value is not counted as a write
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let element = self.element_mut(node)?;
        if element.attrs.get(name).map(String::as_str) == Some(value) {
            return Ok(());
        }
        element.attrs.insert(name.to_string(), value.to_string());
        self.stats.attribute_writes += 1;
        Ok(())
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<Option<String>> {
        let removed = self.element_mut(node)?.attrs.shift_remove(name);
        if removed.is_some() {
            self.stats.attribute_writes += 1;
        }
        Ok(removed)
    }

    /// Set or remove an attribute
    pub fn set_optional_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<()> {
        match value {
            Some(v) => self.set_attribute(node, name, v),
            None => self.remove_attribute(node, name).map(|_| ()),
        }
    }

    /// Toggle a boolean attribute (present as `""` when on)
    pub fn set_flag(&mut self, node: NodeId, name: &str, on: bool) -> Result<()> {
        if on {
            self.set_attribute(node, name, "")
        } else {
            self.remove_attribute(node, name).map(|_| ())
        }
    }

    pub fn set_hidden(&mut self, node: NodeId, hidden: bool) -> Result<()> {
        self.set_flag(node, "hidden", hidden)
    }

    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.has_attribute(node, "hidden")
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).map(|e| e.has_class(class)).unwrap_or(false)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        self.toggle_class(node, class, true)
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        self.toggle_class(node, class, false)
    }

    /// Force a class on or off
    pub fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) -> Result<()> {
        let element = self.element(node)?;
        if element.has_class(class) == on {
            return Ok(());
        }
        let mut classes: Vec<&str> = element.classes().filter(|c| *c != class).collect();
        if on {
            classes.push(class);
        }
        let joined = classes.join(" ");
        if joined.is_empty() {
            self.remove_attribute(node, "class").map(|_| ())
        } else {
            self.set_attribute(node, "class", &joined)
        }
    }

    /// Find a connected element by its `id` attribute
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();
        stack.push(self.body);
        while let Some(node) = stack.pop() {
            if self.attribute(node, "id") == Some(id) {
                return Some(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        None
    }

    /// Generate an id that is unique within this document
    pub fn unique_id(&mut self, prefix: &str) -> String {
        loop {
            self.id_counter += 1;
            let candidate = format!("{}-{}", prefix, self.id_counter);
            if self.get_element_by_id(&candidate).is_none() {
                return candidate;
            }
        }
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.nodes.get(node) else {
            return;
        };
        match &n.data {
            NodeData::Text(t) => out.push_str(t),
            NodeData::Element(_) => {
                for child in &n.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Replace the children of an element with a single text node
    ///
    /// An existing lone text child is updated in place.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<()> {
        self.element(node)?;
        let children: SmallVec<[NodeId; 4]> = self.children(node).iter().copied().collect();
        if let [only] = children.as_slice() {
            if let Some(NodeData::Text(existing)) = self.nodes.get_mut(*only).map(|n| &mut n.data)
            {
                if existing != text {
                    *existing = text.to_string();
                }
                return Ok(());
            }
        }
        for child in children {
            self.remove(child)?;
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(node, text_node)?;
        }
        Ok(())
    }

    // =========================================================================
    // Form values
    // =========================================================================

    /// The live `value` property
    pub fn value(&self, node: NodeId) -> Option<&str> {
        self.element(node).ok().and_then(|e| e.value.as_deref())
    }

    /// Set the live `value` property without dispatching events
    pub fn set_value(&mut self, node: NodeId, value: Option<&str>) -> Result<()> {
        let element = self.element_mut(node)?;
        if element.value.as_deref() == value {
            return Ok(());
        }
        element.value = value.map(str::to_string);
        self.stats.value_writes += 1;
        Ok(())
    }

    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.has_attribute(node, "disabled")
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn bounds(&self, node: NodeId) -> Option<Rect> {
        self.element(node).ok().and_then(|e| e.bounds)
    }

    /// Record the layout box of an element
    pub fn set_bounds(&mut self, node: NodeId, bounds: Rect) -> Result<()> {
        self.element_mut(node)?.bounds = Some(bounds);
        Ok(())
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    // =========================================================================
    // Focus
    // =========================================================================

    pub fn active_element(&self) -> Option<NodeId> {
        self.focused
    }

    /// Move focus to `node`
    ///
    /// Dispatches `focusout` at the previously focused node (with `node` as
    /// related target), then `focusin` at `node`. Focusing the focused node
    /// or a disabled element does nothing.
    pub fn focus(&mut self, node: NodeId) -> Result<()> {
        self.element(node)?;
        if self.focused == Some(node) || self.is_disabled(node) {
            return Ok(());
        }
        let previous = self.focused;
        self.focused = Some(node);
        if let Some(prev) = previous.filter(|p| self.exists(*p)) {
            self.dispatch_event(
                DomEvent::new(EventType::FocusOut, prev).with_related_target(Some(node)),
            );
        }
        self.dispatch_event(DomEvent::new(EventType::FocusIn, node).with_related_target(previous));
        Ok(())
    }

    /// Drop focus entirely (focus moves outside the document)
    pub fn blur(&mut self) {
        if let Some(prev) = self.focused.take() {
            if self.exists(prev) {
                self.dispatch_event(DomEvent::new(EventType::FocusOut, prev));
            }
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Register a listener on a node
    pub fn add_event_listener<F>(
        &mut self,
        node: NodeId,
        event_type: EventType,
        handler: F,
    ) -> Result<ListenerId>
    where
        F: Fn(&mut Document, &DomEvent) + 'static,
    {
        self.node(node)?;
        let callback: EventCallback = Rc::new(handler);
        Ok(self.listeners.add(node, event_type, callback))
    }

    /// Remove a listener; returns false if it was already gone
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.contains(id)
    }

    /// Total number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Dispatch an event at its target, bubbling to ancestors
    ///
    /// The propagation path is computed before any listener runs. Returns
    /// `false` if a listener called `prevent_default`.
    pub fn dispatch_event(&mut self, event: DomEvent) -> bool {
        if !self.exists(event.target) {
            tracing::trace!(target_node = ?event.target, "dispatch to removed node dropped");
            return true;
        }
        let mut path: SmallVec<[NodeId; 16]> = SmallVec::new();
        path.push(event.target);
        if event.bubbles {
            let mut current = self.parent(event.target);
            while let Some(id) = current {
                path.push(id);
                current = self.parent(id);
            }
        }

        for node in path {
            for callback in self.listeners.callbacks(node, event.event_type) {
                callback(self, &event);
            }
            if event.propagation_stopped() {
                break;
            }
        }
        !event.default_prevented()
    }

    /// Simulate a pointer click
    pub fn click(&mut self, node: NodeId) -> bool {
        if self.is_disabled(node) {
            return true;
        }
        self.dispatch_event(DomEvent::new(EventType::Click, node))
    }

    /// Simulate the pointer entering a node
    pub fn mouse_over(&mut self, node: NodeId) -> bool {
        self.dispatch_event(DomEvent::new(EventType::MouseOver, node))
    }

    /// Simulate a key press on a node
    pub fn key_down(&mut self, node: NodeId, key_code: u32) -> bool {
        self.dispatch_event(DomEvent::new(EventType::KeyDown, node).with_key_code(key_code))
    }

    /// Simulate user editing: replace the value and dispatch `input`
    pub fn type_text(&mut self, node: NodeId, text: &str) -> Result<bool> {
        self.set_value(node, Some(text))?;
        Ok(self.dispatch_event(DomEvent::new(EventType::Input, node).with_data(text)))
    }

    // =========================================================================
    // Animation frames
    // =========================================================================

    /// Request a one-shot callback on the next frame
    pub fn request_animation_frame<F>(&mut self, callback: F) -> FrameHandle
    where
        F: FnOnce(&mut Document) + 'static,
    {
        let callback: FrameCallback = Box::new(callback);
        self.frames.request(callback)
    }

    /// Cancel a pending frame callback; returns false if it already ran
    pub fn cancel_animation_frame(&mut self, handle: FrameHandle) -> bool {
        self.frames.cancel(handle)
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Run every callback queued before this call
    pub fn run_animation_frames(&mut self) -> usize {
        let due = self.frames.take();
        let count = due.len();
        for (_, callback) in due {
            callback(self);
        }
        count
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(DomError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(DomError::NodeNotFound(id))
    }
}
