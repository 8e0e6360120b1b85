//! Connections in the host audio graph.
//!
//! An edge runs from a node's output either into another node's input or into
//! one of its automatable parameters (how LFOs modulate filter cutoffs, pan
//! positions and delay times).

use crate::node::NodeId;
use crate::param::ParamName;

/// Unique identifier for an edge in the host graph.
///
/// Edge IDs are assigned sequentially and never reused within a host instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    /// Builds a handle from a raw identifier.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

impl core::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

/// Where an edge lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Port {
    /// The audio input of a node.
    Node(NodeId),
    /// An automatable parameter of a node.
    Param(NodeId, ParamName),
}

impl Port {
    /// The node that owns this port.
    pub fn node(self) -> NodeId {
        match self {
            Port::Node(id) | Port::Param(id, _) => id,
        }
    }
}

/// A directed connection in the host graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    /// Source node.
    pub from: NodeId,
    /// Destination port.
    pub to: Port,
}
