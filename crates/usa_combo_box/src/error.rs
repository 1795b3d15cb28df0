//! Error types for usa_combo_box

use thiserror::Error;
use usa_dom::{DomError, NodeId};

/// Errors that can occur while configuring or attaching a combo box
#[derive(Error, Debug)]
pub enum ComboBoxError {
    /// An option has an empty value
    #[error("option {label:?} has an empty value")]
    EmptyValue { label: String },

    /// Two options share a value
    #[error("duplicate option value {0:?}")]
    DuplicateValue(String),

    /// The host control is not part of the document
    #[error("host control {0:?} is not in the document")]
    HostNotFound(NodeId),

    /// The host control has no parent to place the enhancement beside
    #[error("host control {0:?} is detached from the document tree")]
    HostDetached(NodeId),

    /// The operation needs an attached combo box
    #[error("combo box is not attached")]
    NotAttached,

    /// Failed to parse configuration
    #[error("invalid combo box configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Document operation failed
    #[error("document error: {0}")]
    Dom(#[from] DomError),
}

/// Result type for usa_combo_box operations
pub type Result<T> = std::result::Result<T, ComboBoxError>;
