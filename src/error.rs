//! Error types.
//!
//! Ordinary caller mistakes (a stale handle, an unknown identifier) are reported as
//! [`GraphError`] values and logged at the point of detection. Corrupted adjacency
//! is not a caller mistake and never surfaces as an error: it goes through
//! [`invariant_violation!`], which logs and panics.

use thiserror::Error;

use crate::graph::{EdgeIdx, NodeIdx};
use crate::object::{ObjectId, TypeTag};

/// Errors raised by the [`ObjectManager`](crate::ObjectManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The object was not issued by this manager, or was already handed back.
    #[error("{0} was not issued by this manager or has already been returned")]
    NotIssued(ObjectId),

    /// The object is in the wrong lifecycle state for the requested operation.
    #[error("{0} is in an invalid lifecycle state for this operation")]
    InvalidState(ObjectId),

    /// The object's type tag does not match the sub-pool of its Rust type.
    #[error("{id} does not belong to the sub-pool tagged {expected}")]
    TypeMismatch {
        /// Identity carried by the object.
        id: ObjectId,
        /// Tag of the sub-pool the object's type maps to.
        expected: TypeTag,
    },
}

/// Errors raised by graph operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The node handle does not name a live node of this graph.
    #[error("node {0} is not part of this graph")]
    UnknownNode(NodeIdx),

    /// The edge handle does not name a live edge of this graph.
    #[error("edge {0} is not part of this graph")]
    UnknownEdge(EdgeIdx),

    /// An edge was requested on an endpoint that is not a live node of this graph.
    #[error("cannot create an edge on missing node {0}")]
    MissingEndpoint(NodeIdx),

    /// A flat-graph identifier names no registered node or edge.
    #[error("no node or edge is registered under identifier {0:#x}")]
    UnknownIdentifier(u64),

    /// The object manager rejected an operation.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON for the target type.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but a value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Logs an internal consistency violation and panics.
///
/// Used where adjacency state contradicts itself, e.g. a live edge whose endpoint
/// slot is vacant. Continuing from there would spread the corruption.
macro_rules! invariant_violation {
    ($($arg:tt)*) => {{
        let message = format!($($arg)*);
        tracing::error!(target: "recycle_graph::invariant", "{}", message);
        panic!("graph invariant violated: {}", message)
    }};
}

pub(crate) use invariant_violation;
