//! usa_elements Combo Box
//!
//! Progressive enhancement of a single-select control into an accessible
//! ARIA combobox:
//!
//! - **Matching**: Case-insensitive typeahead with prefix matches first
//! - **State machine**: A pure [`transition`] over [`ComboBoxState`]
//! - **Keyboard & pointer**: Arrow, Home/End, Enter, Escape, hover and pick
//! - **Announcements**: Result counts for the polite live region
//! - **Host sync**: The enhanced control's value always mirrors the selection
//!
//! # Example
//!
//! ```rust
//! use usa_combo_box::prelude::*;
//! use usa_dom::{key_codes, Document};
//!
//! let mut doc = Document::new();
//! let select = doc.create_element("select");
//! doc.append_child(doc.body(), select).unwrap();
//!
//! let mut combo = ComboBox::new().placeholder("Pick a fruit");
//! combo
//!     .attach(
//!         &mut doc,
//!         SelectHost::new(select),
//!         [
//!             ComboBoxOption::new("apple", "Apple"),
//!             ComboBoxOption::new("apricot", "Apricot"),
//!             ComboBoxOption::new("banana", "Banana"),
//!         ],
//!         None,
//!     )
//!     .unwrap();
//!
//! let input = combo.nodes().unwrap().input;
//! doc.type_text(input, "ap").unwrap();
//! assert_eq!(combo.state().unwrap().result_count(), 2);
//!
//! doc.key_down(input, key_codes::ARROW_DOWN);
//! doc.key_down(input, key_codes::ENTER);
//! assert_eq!(combo.value().as_deref(), Some("apple"));
//! assert_eq!(doc.value(select), Some("apple"));
//! ```

pub mod announcer;
pub mod changes;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod host;
pub mod machine;
pub mod matcher;
pub mod option;
pub mod render;
pub mod state;

pub use changes::StateChanges;
pub use config::{ComboBoxConfig, ComboBoxMessages};
pub use controller::{ComboBox, ComboBoxChange, Detach};
pub use error::{ComboBoxError, Result};
pub use event::ComboBoxEvent;
pub use host::{HostControl, SelectHost};
pub use machine::transition;
pub use matcher::{filter_options, match_options, MatchRank};
pub use option::{ComboBoxOption, OptionSet};
pub use render::{ComboBoxIds, ComboBoxNodes, Placement};
pub use state::ComboBoxState;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ComboBoxConfig, ComboBoxMessages};
    pub use crate::controller::{ComboBox, ComboBoxChange, Detach};
    pub use crate::event::ComboBoxEvent;
    pub use crate::host::{HostControl, SelectHost};
    pub use crate::option::ComboBoxOption;
    pub use crate::state::ComboBoxState;
}
