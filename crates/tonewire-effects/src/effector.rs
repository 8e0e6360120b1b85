//! The [`Effector`] capability interface and shared wiring helpers.
//!
//! Every element that can sit in a sound module's chain implements
//! [`Effector`]: the fourteen built-in effects and any plugin a user installs.
//! An effector owns host nodes, exposes an `input` and an `output` connection
//! point, can be switched on and off (bypassed), optionally runs time-varying
//! behavior between `start` and `stop`, and describes its parameters by index.
//!
//! ## Design Decisions
//!
//! - **Host passed in**: effectors hold only [`NodeId`] handles. Every call that
//!   touches the graph takes `&mut dyn AudioHost`, so one host can be shared by
//!   every effect without interior mutability.
//!
//! - **Reject, don't clamp**: `set_param` refuses out-of-range values with
//!   [`EffectError::OutOfRange`] and leaves the current value untouched.
//!
//! - **Typed snapshots**: [`Effector::snapshot`] walks the parameter
//!   descriptors; there is no open-ended reflection over fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tonewire_core::{AudioHost, HostResult, NodeId, NodeKind, ParamDescriptor, normalize_key};

use crate::error::{EffectError, EffectResult};

/// Snapshot of an effector's state and parameter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSnapshot {
    /// Effect kind (e.g. `"compressor"`).
    pub kind: String,
    /// Whether the effect is switched on.
    pub active: bool,
    /// Parameter values by name.
    pub params: BTreeMap<String, f32>,
}

/// Capability interface for chain elements.
///
/// # Example
///
/// ```rust
/// use tonewire_core::{AudioHost, HostGraph, NodeId, NodeKind, ParamDescriptor, ParamName};
/// use tonewire_effects::{EffectIo, EffectResult, Effector, validate_param};
///
/// /// Plain gain stage.
/// struct Boost {
///     io: EffectIo,
///     amp: NodeId,
/// }
///
/// impl Effector for Boost {
///     fn kind(&self) -> &'static str { "boost" }
///     fn input(&self) -> NodeId { self.io.input }
///     fn output(&self) -> NodeId { self.io.output }
///     fn nodes(&self) -> Vec<NodeId> { vec![self.io.input, self.io.output, self.amp] }
///     fn is_active(&self) -> bool { self.io.is_active() }
///     fn set_active(&mut self, host: &mut dyn AudioHost, active: bool) -> EffectResult<()> {
///         self.io.set_active(active);
///         Ok(self.io.series(host, &[self.amp])?)
///     }
///     fn param_count(&self) -> usize { 1 }
///     fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
///         (index == 0).then(|| ParamDescriptor::ratio("gain", 1.0))
///     }
///     fn get_param(&self, host: &dyn AudioHost, _index: usize) -> EffectResult<f32> {
///         Ok(host.param(self.amp, ParamName::Gain)?)
///     }
///     fn set_param(&mut self, host: &mut dyn AudioHost, index: usize, value: f32) -> EffectResult<()> {
///         validate_param(self, index, value)?;
///         Ok(host.set_param(self.amp, ParamName::Gain, value)?)
///     }
/// }
///
/// let mut host = HostGraph::new(48000.0);
/// let amp = host.create_node(NodeKind::Gain);
/// let mut boost = Boost { io: EffectIo::new(&mut host, false), amp };
/// boost.set_active(&mut host, true).unwrap();
/// assert!(host.has_path(boost.input(), boost.output()));
/// assert!(boost.set_param(&mut host, 0, 2.0).is_err());
/// ```
pub trait Effector {
    /// Stable kind identifier used in snapshots.
    fn kind(&self) -> &'static str;

    /// Node that receives the effect's input signal.
    fn input(&self) -> NodeId;

    /// Node that carries the effect's output signal.
    fn output(&self) -> NodeId;

    /// Every host node this effect owns.
    fn nodes(&self) -> Vec<NodeId>;

    /// Whether the effect is switched on.
    fn is_active(&self) -> bool;

    /// Switches the effect on or off and rewires its internal path.
    ///
    /// A switched-off effect routes input straight to output. Effects that
    /// are always on return [`EffectError::NotSwitchable`].
    fn set_active(&mut self, host: &mut dyn AudioHost, active: bool) -> EffectResult<()>;

    /// Starts time-varying behavior at host time `when`.
    ///
    /// LFO-driven effects start their oscillator even while bypassed, so
    /// switching them on mid-note picks up modulation already in motion.
    /// Envelope-driven effects (the filter) schedule nothing while switched
    /// off.
    fn start(&mut self, _host: &mut dyn AudioHost, _when: f64) -> EffectResult<()> {
        Ok(())
    }

    /// Stops time-varying behavior at host time `when`.
    fn stop(&mut self, _host: &mut dyn AudioHost, _when: f64) -> EffectResult<()> {
        Ok(())
    }

    /// Whether time-varying behavior has been started and not stopped.
    fn is_running(&self) -> bool {
        false
    }

    /// Number of parameters. Valid indices are `0..param_count()`.
    fn param_count(&self) -> usize;

    /// Descriptor of the parameter at `index`.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Current value of the parameter at `index`.
    fn get_param(&self, host: &dyn AudioHost, index: usize) -> EffectResult<f32>;

    /// Sets the parameter at `index`.
    ///
    /// Out-of-range values are rejected and leave the parameter unchanged.
    fn set_param(&mut self, host: &mut dyn AudioHost, index: usize, value: f32)
    -> EffectResult<()>;

    /// Finds a parameter index by name, ignoring case, hyphens and underscores.
    fn find_param_by_name(&self, name: &str) -> Option<usize> {
        let key = normalize_key(name);
        (0..self.param_count()).find(|&i| self.param_info(i).is_some_and(|d| d.name == key))
    }

    /// Captures state and parameter values.
    fn snapshot(&self, host: &dyn AudioHost) -> EffectResult<EffectSnapshot> {
        let mut params = BTreeMap::new();
        for index in 0..self.param_count() {
            if let Some(desc) = self.param_info(index) {
                params.insert(desc.name.to_string(), self.get_param(host, index)?);
            }
        }
        Ok(EffectSnapshot {
            kind: self.kind().to_string(),
            active: self.is_active(),
            params,
        })
    }

    /// Detaches the effect from the host graph.
    ///
    /// Stops running behavior at the current host time, then clears every
    /// outgoing connection of every owned node.
    fn release(&mut self, host: &mut dyn AudioHost) -> EffectResult<()> {
        if self.is_running() {
            let now = host.current_time();
            self.stop(host, now)?;
        }
        for node in self.nodes() {
            host.disconnect(node)?;
        }
        Ok(())
    }
}

/// Checks `value` against the descriptor at `index`.
///
/// Returns the descriptor so callers can use its name in further errors.
pub fn validate_param<E: Effector + ?Sized>(
    effect: &E,
    index: usize,
    value: f32,
) -> EffectResult<ParamDescriptor> {
    let desc = effect.param_info(index).ok_or(EffectError::UnknownParam {
        effect: effect.kind(),
        index,
    })?;
    if !desc.contains(value) {
        return Err(EffectError::OutOfRange {
            effect: effect.kind(),
            param: desc.name,
            value,
            min: desc.min,
            max: desc.max,
        });
    }
    Ok(desc)
}

/// Input/output gain pair with on/off state.
///
/// Every effect owns one. [`series()`](Self::series) covers effects whose
/// internal path is a straight line; effects with parallel dry/wet paths call
/// [`reset()`](Self::reset) and wire the rest themselves.
#[derive(Debug, Clone)]
pub struct EffectIo {
    /// Input connection point.
    pub input: NodeId,
    /// Output connection point.
    pub output: NodeId,
    active: bool,
}

impl EffectIo {
    /// Creates the input and output gain nodes.
    pub fn new(host: &mut dyn AudioHost, active: bool) -> Self {
        Self {
            input: host.create_node(NodeKind::Gain),
            output: host.create_node(NodeKind::Gain),
            active,
        }
    }

    /// Whether the effect is switched on.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Records the on/off state. Callers rewire afterwards.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Clears the outgoing connections of the input and of `internal`.
    ///
    /// The output node is left alone: it belongs to whatever follows the
    /// effect in the chain.
    pub fn reset(&self, host: &mut dyn AudioHost, internal: &[NodeId]) -> HostResult<()> {
        host.disconnect(self.input)?;
        for &node in internal {
            host.disconnect(node)?;
        }
        Ok(())
    }

    /// Wires `input → path[0] → ... → path[n-1] → output` when active, or
    /// `input → output` when switched off.
    pub fn series(&self, host: &mut dyn AudioHost, path: &[NodeId]) -> HostResult<()> {
        self.reset(host, path)?;
        if !self.active || path.is_empty() {
            host.connect(self.input, self.output)?;
            return Ok(());
        }
        let mut prev = self.input;
        for &node in path {
            host.connect(prev, node)?;
            prev = node;
        }
        host.connect(prev, self.output)?;
        Ok(())
    }
}

/// Connects each `(from, to)` pair in order.
pub fn connect_pairs(host: &mut dyn AudioHost, pairs: &[(NodeId, NodeId)]) -> HostResult<()> {
    for &(from, to) in pairs {
        host.connect(from, to)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonewire_core::HostGraph;

    #[test]
    fn series_bypass_and_active() {
        let mut host = HostGraph::new(48000.0);
        let mut io = EffectIo::new(&mut host, false);
        let a = host.create_node(NodeKind::Gain);
        let b = host.create_node(NodeKind::BiquadFilter);

        io.series(&mut host, &[a, b]).unwrap();
        assert!(host.is_connected(io.input, io.output));
        assert!(!host.is_connected(io.input, a));

        io.set_active(true);
        io.series(&mut host, &[a, b]).unwrap();
        assert!(!host.is_connected(io.input, io.output));
        assert!(host.is_connected(io.input, a));
        assert!(host.is_connected(a, b));
        assert!(host.is_connected(b, io.output));
    }

    #[test]
    fn reset_leaves_output_connections() {
        let mut host = HostGraph::new(48000.0);
        let io = EffectIo::new(&mut host, true);
        let dest = host.destination();
        host.connect(io.output, dest).unwrap();
        io.series(&mut host, &[]).unwrap();
        assert!(host.is_connected(io.output, dest));
    }
}
