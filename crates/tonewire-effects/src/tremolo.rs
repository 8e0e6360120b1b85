//! Tremolo: an LFO modulates the amplitude gain around unity.
//!
//! ```text
//! Input → Gain(1 + lfo) → Output
//!            ↑ gain
//!      LFO(rate, waveform) × depth
//! ```

use tonewire_core::{AudioHost, NodeId, NodeKind, ParamDescriptor, ParamName, Waveform};

use crate::effector::{EffectIo, Effector, validate_param};
use crate::error::{EffectError, EffectResult};
use crate::lfo::Lfo;

/// Amplitude modulation around unity gain. Inactive by default.
#[derive(Debug, Clone)]
pub struct Tremolo {
    io: EffectIo,
    amplitude: NodeId,
    lfo: Lfo,
}

impl Tremolo {
    /// Creates the amplitude gain and its LFO.
    pub fn new(host: &mut dyn AudioHost) -> EffectResult<Self> {
        let io = EffectIo::new(host, false);
        let amplitude = host.create_node(NodeKind::Gain);
        host.set_param(amplitude, ParamName::Gain, 1.0)?;
        let lfo = Lfo::new(host, &[(amplitude, ParamName::Gain)], 1.0)?;
        let effect = Self { io, amplitude, lfo };
        effect.wire(host)?;
        Ok(effect)
    }

    fn wire(&self, host: &mut dyn AudioHost) -> EffectResult<()> {
        Ok(self.io.series(host, &[self.amplitude])?)
    }

    /// Selects the LFO waveform.
    pub fn set_waveform(&mut self, host: &mut dyn AudioHost, waveform: Waveform) -> EffectResult<()> {
        Ok(self.lfo.set_waveform(host, waveform)?)
    }

    /// Current LFO waveform.
    pub fn waveform(&self) -> Waveform {
        self.lfo.waveform()
    }

    /// The modulated gain node.
    pub fn node(&self) -> NodeId {
        self.amplitude
    }

    /// The modulation source.
    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }
}

impl Effector for Tremolo {
    fn kind(&self) -> &'static str {
        "tremolo"
    }

    fn input(&self) -> NodeId {
        self.io.input
    }

    fn output(&self) -> NodeId {
        self.io.output
    }

    fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = vec![self.io.input, self.io.output, self.amplitude];
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
