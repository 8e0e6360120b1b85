//! Auto-panner: an LFO sweeps a stereo panner left and right.
//!
//! ```text
//! Input → StereoPanner → Output
//!             ↑ pan
//!        LFO(rate) × depth
//! ```

use tonewire_core::{AudioHost, NodeId, NodeKind, ParamDescriptor, ParamName};

use crate::effector::{EffectIo, Effector, validate_param};
use crate::error::{EffectError, EffectResult};
use crate::lfo::Lfo;

/// LFO-driven stereo panner. Inactive by default.
#[derive(Debug, Clone)]
pub struct Autopanner {
    io: EffectIo,
    panner: NodeId,
    lfo: Lfo,
}

impl Autopanner {
    /// Creates the panner and its LFO.
    pub fn new(host: &mut dyn AudioHost) -> EffectResult<Self> {
        let io = EffectIo::new(host, false);
        let panner = host.create_node(NodeKind::StereoPanner);
        let lfo = Lfo::new(host, &[(panner, ParamName::Pan)], 1.0)?;
        let effect = Self { io, panner, lfo };
        effect.wire(host)?;
        Ok(effect)
    }

    fn wire(&self, host: &mut dyn AudioHost) -> EffectResult<()> {
        Ok(self.io.series(host, &[self.panner])?)
    }

    /// The host stereo panner node.
    pub fn node(&self) -> NodeId {
        self.panner
    }

    /// The modulation source.
    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }
}

impl Effector for Autopanner {
    fn kind(&self) -> &'static str {
        "autopanner"
    }

    fn input(&self) -> NodeId {
        self.io.input
    }

    fn output(&self) -> NodeId {
        self.io.output
    }

    fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = vec![self.io.input, self.io.output, self.panner];
        nodes.extend(self.lfo.nodes());
        nodes
    }

    fn is_active(&self) -> bool {
        self.io.is_active()
    }

    fn set_active(&mut self, host: &mut dyn AudioHost, active: bool) -> EffectResult<()> {
        self.io.set_active(active);
        self.wire(host)
    }

    fn start(&mut self, host: &mut dyn AudioHost, when: f64) -> EffectResult<()> {
        Ok(self.lfo.start(host, when)?)
    }

    fn stop(&mut self, host: &mut dyn AudioHost, when: f64) -> EffectResult<()> {
        Ok(self.lfo.stop(host, when)?)
    }

    fn is_running(&self) -> bool {
        self.lfo.is_running()
    }

    fn param_count(&self) -> usize {
        2
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(ParamDescriptor::depth()),
            1 => Some(ParamDescriptor::rate()),
            _ => None,
        }
    }

    fn get_param(&self, _host: &dyn AudioHost, index: usize) -> EffectResult<f32> {
        match index {
            0 => Ok(self.lfo.depth()),
            1 => Ok(self.lfo.rate()),
            _ => Err(EffectError::UnknownParam {
                effect: self.kind(),
                index,
            }),
        }
    }

    fn set_param(
        &mut self,
        host: &mut dyn AudioHost,
        index: usize,
        value: f32,
    ) -> EffectResult<()> {
        validate_param(self, index, value)?;
        if index == 0 {
            self.lfo.set_depth(host, value)?;
        } else {
            self.lfo.set_rate(host, value)?;
        }
        Ok(())
    }
}
