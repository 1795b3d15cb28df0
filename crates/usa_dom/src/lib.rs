//! usa_elements Document Model
//!
//! This crate provides the document that the usa_elements widgets project into:
//!
//! - **Arena tree**: Elements and text nodes addressed by stable [`NodeId`] keys
//! - **Attributes & classes**: Ordered attributes with class-list helpers
//! - **Form values**: The live `value` property of inputs and selects
//! - **Events**: Typed listeners with bubbling dispatch and `prevent_default`
//! - **Focus**: A single active element with `focusout`/`focusin` pairs
//! - **Animation frames**: One-shot deferred callbacks, cancellable by handle
//!
//! # Example
//!
//! ```rust
//! use usa_dom::{Document, EventType};
//!
//! let mut doc = Document::new();
//! let button = doc.create_element("button");
//! doc.append_child(doc.body(), button).unwrap();
//!
//! doc.add_event_listener(button, EventType::Click, |doc, event| {
//!     doc.set_attribute(event.target, "aria-pressed", "true").unwrap();
//! })
//! .unwrap();
//!
//! doc.click(button);
//! assert_eq!(doc.attribute(button, "aria-pressed"), Some("true"));
//! ```

pub mod aria;
pub mod document;
pub mod error;
pub mod event;
pub mod frame;
pub mod geometry;
pub mod node;

pub use aria::{AriaRole, LiveMode};
pub use document::{Document, DomStats};
pub use error::{DomError, Result};
pub use event::{key_codes, DomEvent, EventCallback, EventType, ListenerId};
pub use frame::{FrameCallback, FrameHandle};
pub use geometry::Rect;
pub use node::{NodeData, NodeId};
