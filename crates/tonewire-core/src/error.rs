//! Error types for host graph operations.

use thiserror::Error;

use crate::node::NodeId;
use crate::param::ParamName;

/// Errors reported by an [`AudioHost`](crate::AudioHost).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The node handle does not belong to this host.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// The node has no parameter with this name.
    #[error("node {node} has no parameter {param:?}")]
    UnknownParam {
        /// Node that was addressed.
        node: NodeId,
        /// Parameter that was requested.
        param: ParamName,
    },

    /// The connection is structurally invalid (e.g. out of the destination).
    #[error("invalid connection: {0}")]
    InvalidConnection(String),

    /// Start or stop was called on a node that is not a source.
    #[error("node {0} is not a source")]
    NotASource(NodeId),

    /// Source nodes can be started only once.
    #[error("source {0} was already started")]
    AlreadyStarted(NodeId),

    /// Stop was called before start.
    #[error("source {0} was never started")]
    NotStarted(NodeId),

    /// The node does not accept this kind of data or operation.
    #[error("node {node} does not accept {what}")]
    Unsupported {
        /// Node that was addressed.
        node: NodeId,
        /// What was asked for ("curve", "buffer", "filter type", "waveform", "removal").
        what: &'static str,
    },
}

/// Convenience alias for host results.
pub type HostResult<T> = Result<T, HostError>;
