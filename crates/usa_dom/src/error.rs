//! Error types for usa_dom

use thiserror::Error;

use crate::node::NodeId;

/// Errors that can occur while mutating a [`Document`](crate::Document)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The node was removed or never belonged to this document
    #[error("node {0:?} does not exist in this document")]
    NodeNotFound(NodeId),

    /// The operation requires an element but the node is text
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    /// Inserting the node would make it its own ancestor
    #[error("cannot insert {child:?} under {parent:?}: would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}

/// Result type for usa_dom operations
pub type Result<T> = std::result::Result<T, DomError>;
