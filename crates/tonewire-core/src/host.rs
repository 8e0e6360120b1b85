//! Host audio API abstraction.
//!
//! [`AudioHost`] is the only boundary between tonewire and the platform that
//! actually renders audio. Everything tonewire does is expressed as calls on
//! this trait: create nodes, wire them, read and write parameters, schedule
//! automation against the host clock, and start/stop sources.
//!
//! ```text
//! ┌──────────────────────────────────┐
//! │  SoundModule / effect wrappers   │
//! └──────────────┬───────────────────┘
//!                │ &mut dyn AudioHost
//!                ▼
//! ┌──────────────────────────────────┐
//! │        AudioHost trait           │
//! └──────────────┬───────────────────┘
//!        ┌───────┴────────┐
//!        ▼                ▼
//! ┌─────────────┐  ┌──────────────┐
//! │  HostGraph  │  │ platform     │
//! │ (in-memory) │  │ bindings     │
//! └─────────────┘  └──────────────┘
//! ```
//!
//! The trait is object-safe so effect wrappers can take `&mut dyn AudioHost`
//! and stay independent of the concrete host.

use crate::edge::EdgeId;
use crate::error::HostResult;
use crate::node::{FilterType, NodeId, NodeKind, Waveform};
use crate::param::{Automation, ParamName};

/// Platform audio graph API.
pub trait AudioHost {
    /// Sample rate of the host graph in Hz.
    fn sample_rate(&self) -> f32;

    /// Current host time in seconds.
    fn current_time(&self) -> f64;

    /// The final output node.
    fn destination(&self) -> NodeId;

    /// The spatial listener node.
    fn listener(&self) -> NodeId;

    /// Creates a node of the given kind.
    fn create_node(&mut self, kind: NodeKind) -> NodeId;

    /// Returns the kind of a node.
    fn node_kind(&self, node: NodeId) -> HostResult<NodeKind>;

    /// Connects `from`'s output to `to`'s input.
    ///
    /// Connecting an already connected pair returns the existing edge.
    fn connect(&mut self, from: NodeId, to: NodeId) -> HostResult<EdgeId>;

    /// Connects `from`'s output to a parameter of `to`.
    fn connect_param(&mut self, from: NodeId, to: NodeId, param: ParamName) -> HostResult<EdgeId>;

    /// Removes every outgoing connection of `node`.
    fn disconnect(&mut self, node: NodeId) -> HostResult<()>;

    /// Releases `node` together with every edge into or out of it.
    ///
    /// The id is never reused. The destination and listener cannot be removed.
    fn remove_node(&mut self, node: NodeId) -> HostResult<()>;

    /// Reads a parameter's current value.
    fn param(&self, node: NodeId, param: ParamName) -> HostResult<f32>;

    /// Range the host reports for a parameter, if any.
    fn param_range(&self, node: NodeId, param: ParamName) -> Option<(f32, f32)>;

    /// Writes a parameter's value immediately.
    fn set_param(&mut self, node: NodeId, param: ParamName, value: f32) -> HostResult<()>;

    /// Schedules an automation event on a parameter.
    fn schedule(&mut self, node: NodeId, param: ParamName, event: Automation) -> HostResult<()>;

    /// Selects a biquad filter's response.
    fn set_filter_type(&mut self, node: NodeId, filter_type: FilterType) -> HostResult<()>;

    /// Selects an oscillator's waveform.
    fn set_waveform(&mut self, node: NodeId, waveform: Waveform) -> HostResult<()>;

    /// Sets a waveshaper's transfer curve.
    fn set_curve(&mut self, node: NodeId, curve: Vec<f32>) -> HostResult<()>;

    /// Sets a convolver's impulse response (one `Vec` per channel).
    fn set_buffer(&mut self, node: NodeId, channels: Vec<Vec<f32>>) -> HostResult<()>;

    /// Starts a source node at host time `when`.
    fn start(&mut self, node: NodeId, when: f64) -> HostResult<()>;

    /// Stops a source node at host time `when`.
    fn stop(&mut self, node: NodeId, when: f64) -> HostResult<()>;
}
