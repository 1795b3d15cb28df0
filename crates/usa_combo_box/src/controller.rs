//! Enhancement controller
//!
//! [`ComboBox`] owns the lifecycle of one enhancement: it builds the markup
//! beside a host control, translates document events into
//! [`ComboBoxEvent`]s, runs them through [`transition`], patches the
//! document and keeps the host's value in sync.
//!
//! The live state sits behind `Rc<RefCell<_>>`. Document listeners and the
//! deferred placement frame hold only `Weak` handles, so nothing they capture
//! outlives a detach. Focus moves, `change` events and `on_change` callbacks
//! run after the state borrow is released and may re-enter the controller.
//!
//! An instance whose host has left the document tears itself down on the
//! next event or frame that reaches it.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use usa_dom::{Document, DomEvent, EventType, FrameHandle, ListenerId, NodeId};

use crate::announcer;
use crate::changes::StateChanges;
use crate::config::{ComboBoxConfig, ComboBoxMessages};
use crate::error::{ComboBoxError, Result};
use crate::event::ComboBoxEvent;
use crate::host::{HostControl, HostSnapshot};
use crate::machine::transition;
use crate::option::{ComboBoxOption, OptionSet};
use crate::render::{ComboBoxIds, ComboBoxNodes, ComboBoxView};
use crate::state::ComboBoxState;

/// Prefix of generated base ids
const GENERATED_ID_PREFIX: &str = "combo-box";

/// A committed selection change
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComboBoxChange {
    /// The new value, `None` when the selection was cleared
    pub value: Option<String>,
    /// Label of the new value
    pub label: Option<String>,
}

type ChangeCallback = Rc<dyn Fn(&ComboBoxChange)>;

type Shared = Rc<RefCell<Instance>>;

/// One live enhancement
struct Instance {
    host: Rc<dyn HostControl>,
    snapshot: HostSnapshot,
    view: ComboBoxView,
    state: ComboBoxState,
    config: Rc<ComboBoxConfig>,
    callbacks: Rc<[ChangeCallback]>,
    listeners: SmallVec<[ListenerId; 8]>,
    frame: Option<FrameHandle>,
    disabled: bool,
    attached: bool,
}

/// Work left for after the state borrow is released
struct Outcome {
    focus: Option<NodeId>,
    notify: Option<Notification>,
}

struct Notification {
    host: NodeId,
    change: ComboBoxChange,
    callbacks: Rc<[ChangeCallback]>,
}

impl Instance {
    fn messages(&self) -> &ComboBoxMessages {
        &self.config.messages
    }

    fn apply(&mut self, doc: &mut Document, event: &ComboBoxEvent) -> Result<Outcome> {
        let next = transition(&self.state, event);
        let changes = StateChanges::between(&self.state, &next);
        tracing::trace!(?event, ?changes, "combo box transition");

        let refocus = match event {
            ComboBoxEvent::Open | ComboBoxEvent::Close | ComboBoxEvent::Clear => true,
            event => event.is_commit() && changes.any(),
        };
        let mut outcome = Outcome {
            focus: refocus.then(|| self.view.nodes().input),
            notify: None,
        };
        if !changes.any() {
            return Ok(outcome);
        }

        if changes.selected {
            if let Err(err) = self.host.set_value(doc, next.selected()) {
                // Keep the old selection, only close the list
                let closed = transition(&self.state, &ComboBoxEvent::Close);
                self.render(doc, closed)?;
                return Err(err);
            }
            tracing::debug!(value = ?next.selected(), "synced host value");
            outcome.notify = Some(Notification {
                host: self.host.node(),
                change: ComboBoxChange {
                    value: next.selected().map(str::to_string),
                    label: next.selected_label().map(str::to_string),
                },
                callbacks: Rc::clone(&self.callbacks),
            });
        }

        self.render(doc, next)?;
        Ok(outcome)
    }

    /// Patch the document from the current state to `next` and adopt it
    fn render(&mut self, doc: &mut Document, next: ComboBoxState) -> Result<()> {
        let changes = StateChanges::between(&self.state, &next);
        if !changes.any() {
            return Ok(());
        }
        self.view.patch(doc, &self.state, &next, changes, &self.config)?;
        if changes.affects_status() {
            if let Some(text) = announcer::announce(&self.state, &next, self.messages()) {
                self.view.set_status(doc, &text)?;
            }
        }
        self.state = next;
        Ok(())
    }

    fn is_orphaned(&self, doc: &Document) -> bool {
        self.attached && !doc.is_connected(self.host.node())
    }

    fn teardown(&mut self, doc: &mut Document) -> Result<()> {
        self.attached = false;
        for id in self.listeners.drain(..) {
            doc.remove_event_listener(id);
        }
        if let Some(frame) = self.frame.take() {
            doc.cancel_animation_frame(frame);
        }

        let container = self.view.nodes().container;
        let had_focus = doc
            .active_element()
            .is_some_and(|focused| doc.contains(container, focused));
        self.view.remove(doc)?;
        self.snapshot.restore(doc)?;
        if had_focus && doc.is_connected(self.host.node()) {
            self.host.focus(doc)?;
        }
        Ok(())
    }
}

impl Outcome {
    fn deliver(self, doc: &mut Document) -> Result<()> {
        if let Some(node) = self.focus {
            if doc.exists(node) {
                doc.focus(node)?;
            }
        }
        if let Some(Notification {
            host,
            change,
            callbacks,
        }) = self.notify
        {
            let value = change.value.clone().unwrap_or_default();
            doc.dispatch_event(DomEvent::new(EventType::Change, host).with_data(value));
            for callback in callbacks.iter() {
                callback(&change);
            }
        }
        Ok(())
    }
}

/// Run one event through an instance
fn process(shared: &Shared, doc: &mut Document, event: &ComboBoxEvent) -> Result<()> {
    if reap_orphan(shared, doc) {
        return Ok(());
    }
    let outcome = {
        let Ok(mut instance) = shared.try_borrow_mut() else {
            tracing::warn!(?event, "re-entrant combo box event dropped");
            return Ok(());
        };
        if !instance.attached || instance.disabled {
            return Ok(());
        }
        instance.apply(doc, event)?
    };
    outcome.deliver(doc)
}

fn teardown(shared: &Shared, doc: &mut Document) -> bool {
    let Ok(mut instance) = shared.try_borrow_mut() else {
        tracing::warn!("combo box detach requested while it is handling an event");
        return false;
    };
    if !instance.attached {
        return false;
    }
    if let Err(err) = instance.teardown(doc) {
        tracing::warn!(%err, "combo box teardown incomplete");
    }
    tracing::debug!(id = %instance.view.ids().input, "combo box detached");
    true
}

/// Tear down an instance whose host left the document
fn reap_orphan(shared: &Shared, doc: &mut Document) -> bool {
    let orphaned = shared
        .try_borrow()
        .is_ok_and(|instance| instance.is_orphaned(doc));
    if orphaned {
        tracing::debug!("combo box host left the document");
        teardown(shared, doc);
    }
    orphaned
}

/// Register a listener that translates a document event for an instance
fn listen<F>(
    doc: &mut Document,
    weak: &Weak<RefCell<Instance>>,
    node: NodeId,
    event_type: EventType,
    translate: F,
) -> Result<ListenerId>
where
    F: Fn(&Instance, &Document, &DomEvent) -> Option<ComboBoxEvent> + 'static,
{
    let weak = weak.clone();
    let id = doc.add_event_listener(node, event_type, move |doc, dom_event| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        if reap_orphan(&shared, doc) {
            return;
        }
        let event = match shared.try_borrow() {
            Ok(instance) if instance.attached => translate(&instance, doc, dom_event),
            _ => None,
        };
        let Some(event) = event else {
            return;
        };
        if let Err(err) = process(&shared, doc, &event) {
            tracing::warn!(%err, ?event, "combo box event failed");
        }
    })?;
    Ok(id)
}

fn wire(shared: &Shared, doc: &mut Document) -> Result<SmallVec<[ListenerId; 8]>> {
    let weak = Rc::downgrade(shared);
    let nodes = shared.borrow().view.nodes();
    let mut ids = SmallVec::new();

    ids.push(listen(doc, &weak, nodes.input, EventType::KeyDown, |instance, _, e| {
        let event = ComboBoxEvent::from_key_code(e.key_code)?;
        let handled = match event {
            // Closed: leave caret movement and form submission alone
            ComboBoxEvent::Home | ComboBoxEvent::End | ComboBoxEvent::Enter => {
                instance.state.is_open()
            }
            _ => true,
        };
        if handled {
            e.prevent_default();
        }
        handled.then_some(event)
    })?);

    ids.push(listen(doc, &weak, nodes.input, EventType::Input, |instance, doc, e| {
        let text = e
            .data
            .clone()
            .or_else(|| doc.value(instance.view.nodes().input).map(str::to_string))
            .unwrap_or_default();
        Some(ComboBoxEvent::Type(text))
    })?);

    ids.push(listen(doc, &weak, nodes.input, EventType::Click, |instance, _, _| {
        (!instance.state.is_open()).then_some(ComboBoxEvent::Open)
    })?);

    ids.push(listen(doc, &weak, nodes.toggle_button, EventType::Click, |instance, _, _| {
        Some(if instance.state.is_open() {
            ComboBoxEvent::Close
        } else {
            ComboBoxEvent::Open
        })
    })?);

    ids.push(listen(doc, &weak, nodes.clear_button, EventType::Click, |_, _, _| {
        Some(ComboBoxEvent::Clear)
    })?);

    ids.push(listen(doc, &weak, nodes.list, EventType::Click, |instance, doc, e| {
        instance
            .view
            .row_position(doc, e.target)
            .map(ComboBoxEvent::Pick)
    })?);

    ids.push(listen(doc, &weak, nodes.list, EventType::MouseOver, |instance, doc, e| {
        instance
            .view
            .row_position(doc, e.target)
            .map(ComboBoxEvent::Hover)
    })?);

    ids.push(listen(doc, &weak, nodes.container, EventType::FocusOut, |instance, doc, e| {
        let container = instance.view.nodes().container;
        let inside = e
            .related_target
            .is_some_and(|related| doc.contains(container, related));
        Some(ComboBoxEvent::FocusOut { inside })
    })?);

    Ok(ids)
}

/// Place the list once layout is known
fn schedule_placement(shared: &Shared, doc: &mut Document) -> FrameHandle {
    let weak = Rc::downgrade(shared);
    doc.request_animation_frame(move |doc| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        if reap_orphan(&shared, doc) {
            return;
        }
        let Ok(mut instance) = shared.try_borrow_mut() else {
            return;
        };
        instance.frame = None;
        if !instance.attached {
            return;
        }
        match instance.view.place(doc, instance.config.list_max_height) {
            Ok(placement) => tracing::trace!(placement = placement.as_str(), "placed combo box list"),
            Err(err) => tracing::warn!(%err, "combo box placement failed"),
        }
    })
}

/// Handle to one attachment, returned by [`ComboBox::attach`]
///
/// Detaching through the handle and through [`ComboBox::detach`] are
/// equivalent; whichever runs second does nothing.
#[derive(Clone)]
pub struct Detach {
    instance: Weak<RefCell<Instance>>,
}

impl Detach {
    /// Tear the enhancement down; returns false if it was already detached
    pub fn detach(self, doc: &mut Document) -> bool {
        self.instance
            .upgrade()
            .is_some_and(|shared| teardown(&shared, doc))
    }

    pub fn is_attached(&self) -> bool {
        let Some(shared) = self.instance.upgrade() else {
            return false;
        };
        let attached = shared.try_borrow().map(|i| i.attached).unwrap_or(false);
        attached
    }
}

impl fmt::Debug for Detach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detach")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Combo box enhancement of a single-select host control
///
/// # Example
///
/// ```ignore
/// let mut combo = ComboBox::new()
///     .placeholder("Pick a fruit")
///     .on_change(|change| println!("selected {:?}", change.value));
///
/// combo.attach(&mut doc, SelectHost::new(select), options, Some("apple"))?;
/// ```
///
/// Dropping a `ComboBox` does not remove its markup; call
/// [`detach`](Self::detach) first.
pub struct ComboBox {
    config: ComboBoxConfig,
    callbacks: Vec<ChangeCallback>,
    instance: Option<Shared>,
    generated_id: Option<String>,
}

impl Default for ComboBox {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComboBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComboBox")
            .field("config", &self.config)
            .field("callbacks", &self.callbacks.len())
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl ComboBox {
    pub fn new() -> Self {
        Self {
            config: ComboBoxConfig::default(),
            callbacks: Vec::new(),
            instance: None,
            generated_id: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ComboBoxConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the base id of the input
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.config.id = Some(id.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.config.placeholder = Some(placeholder.into());
        self
    }

    pub fn messages(mut self, messages: ComboBoxMessages) -> Self {
        self.config.messages = messages;
        self
    }

    /// Register a callback for committed selection changes
    ///
    /// Callbacks registered while attached apply from the next attach.
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ComboBoxChange) + 'static,
    {
        self.callbacks.push(Rc::new(callback));
        self
    }

    /// Enhance `host`, detaching any previous enhancement first
    ///
    /// Empty values and duplicate values are dropped from `options`. The
    /// initial selection is the host's value if it names an option, else
    /// `initial_value` if it names one, else nothing; it is written back to
    /// the host without a change notification.
    pub fn attach<H>(
        &mut self,
        doc: &mut Document,
        host: H,
        options: impl IntoIterator<Item = ComboBoxOption>,
        initial_value: Option<&str>,
    ) -> Result<Detach>
    where
        H: HostControl + 'static,
    {
        self.attach_shared(doc, Rc::new(host), OptionSet::sanitize(options), initial_value)
    }

    /// Enhance `host` with the options it declares itself
    pub fn attach_host<H>(
        &mut self,
        doc: &mut Document,
        host: H,
        initial_value: Option<&str>,
    ) -> Result<Detach>
    where
        H: HostControl + 'static,
    {
        let options = host.read_options(doc);
        self.attach(doc, host, options, initial_value)
    }

    fn attach_shared(
        &mut self,
        doc: &mut Document,
        host: Rc<dyn HostControl>,
        options: OptionSet,
        initial_value: Option<&str>,
    ) -> Result<Detach> {
        self.detach(doc);

        let node = host.node();
        if !doc.exists(node) {
            return Err(ComboBoxError::HostNotFound(node));
        }
        if doc.parent(node).is_none() {
            return Err(ComboBoxError::HostDetached(node));
        }

        let names_option = |value: &&str| options.find(value).is_some();
        let host_value = host.value(doc);
        let resolved = host_value
            .as_deref()
            .filter(names_option)
            .or_else(|| initial_value.filter(names_option))
            .map(str::to_string);
        if host_value.is_some() && resolved != host_value {
            tracing::debug!(host_value = ?host_value, "host value names no option");
        }
        let state = ComboBoxState::new(options, resolved.as_deref());

        let snapshot = HostSnapshot::capture(doc, node);
        let base = self.resolve_id(doc, &snapshot);
        let disabled = host.is_disabled(doc);
        snapshot.retire(doc)?;

        let config = Rc::new(self.config.clone());
        let view = ComboBoxView::build(doc, node, ComboBoxIds::new(&base), &config, &state, disabled)?;
        host.set_value(doc, state.selected())?;

        tracing::debug!(
            id = %base,
            options = state.options().len(),
            selected = ?state.selected(),
            disabled,
            "combo box attached"
        );

        let shared: Shared = Rc::new(RefCell::new(Instance {
            host,
            snapshot,
            view,
            state,
            config,
            callbacks: self.callbacks.iter().cloned().collect(),
            listeners: SmallVec::new(),
            frame: None,
            disabled,
            attached: true,
        }));
        let listeners = wire(&shared, doc)?;
        let frame = schedule_placement(&shared, doc);
        {
            let mut instance = shared.borrow_mut();
            instance.listeners = listeners;
            instance.frame = Some(frame);
        }

        let detach = Detach {
            instance: Rc::downgrade(&shared),
        };
        self.instance = Some(shared);
        Ok(detach)
    }

    /// Base id: configured, else the host's, else generated once per controller
    fn resolve_id(&mut self, doc: &mut Document, snapshot: &HostSnapshot) -> String {
        if let Some(id) = &self.config.id {
            return id.clone();
        }
        if let Some(id) = snapshot.id() {
            return id.to_string();
        }
        self.generated_id
            .get_or_insert_with(|| doc.unique_id(GENERATED_ID_PREFIX))
            .clone()
    }

    /// Remove the enhancement and restore the host; returns false if nothing
    /// was attached
    pub fn detach(&mut self, doc: &mut Document) -> bool {
        self.instance
            .take()
            .is_some_and(|shared| teardown(&shared, doc))
    }

    /// Replace the option set, rebuilding the enhancement
    ///
    /// The selection is resynchronized from the host's value.
    pub fn set_options(
        &mut self,
        doc: &mut Document,
        options: impl IntoIterator<Item = ComboBoxOption>,
    ) -> Result<Detach> {
        let host = self
            .live(|instance| Rc::clone(&instance.host))
            .ok_or(ComboBoxError::NotAttached)?;
        self.attach_shared(doc, host, OptionSet::sanitize(options), None)
    }

    /// Rebuild with the same options, resynchronizing from the host's value
    pub fn refresh(&mut self, doc: &mut Document) -> Result<Detach> {
        let (host, options) = self
            .live(|instance| (Rc::clone(&instance.host), instance.state.options().clone()))
            .ok_or(ComboBoxError::NotAttached)?;
        self.attach_shared(doc, host, options, None)
    }

    /// Run an event through the state machine as if the user produced it
    ///
    /// Events are ignored while the host is disabled. If the host has left
    /// the document the enhancement is torn down and the event dropped.
    pub fn dispatch(&self, doc: &mut Document, event: ComboBoxEvent) -> Result<()> {
        match self.instance.as_ref() {
            Some(shared) if self.is_attached() => process(shared, doc, &event),
            _ => Err(ComboBoxError::NotAttached),
        }
    }

    fn live<R>(&self, f: impl FnOnce(&Instance) -> R) -> Option<R> {
        let shared = self.instance.as_ref()?;
        let instance = shared.try_borrow().ok()?;
        if !instance.attached {
            return None;
        }
        Some(f(&instance))
    }

    pub fn is_attached(&self) -> bool {
        self.live(|_| ()).is_some()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> Option<ComboBoxState> {
        self.live(|instance| instance.state.clone())
    }

    /// The committed value
    pub fn value(&self) -> Option<String> {
        self.live(|instance| instance.state.selected().map(str::to_string))
            .flatten()
    }

    pub fn ids(&self) -> Option<ComboBoxIds> {
        self.live(|instance| instance.view.ids().clone())
    }

    pub fn nodes(&self) -> Option<ComboBoxNodes> {
        self.live(|instance| instance.view.nodes())
    }

    /// Rendered rows, in filtered order
    pub fn rows(&self) -> Vec<NodeId> {
        self.live(|instance| instance.view.rows().to_vec())
            .unwrap_or_default()
    }

    /// The row shown when nothing matches, if it is rendered
    pub fn no_results_row(&self) -> Option<NodeId> {
        self.live(|instance| instance.view.no_results_row()).flatten()
    }

    pub fn is_disabled(&self) -> bool {
        self.live(|instance| instance.disabled).unwrap_or(false)
    }
}
