//! Ring modulator: the signal is multiplied by a carrier oscillator.
//!
//! The amplitude gain rests at 0, so with the carrier stopped the effect is
//! silent; while running its gain follows the carrier scaled by `depth`.
//!
//! ```text
//! Input → Gain(0 + carrier) → Output
//!            ↑ gain
//!      carrier(rate) × depth
//! ```

use tonewire_core::{AudioHost, NodeId, NodeKind, ParamDescriptor, ParamName};

use crate::effector::{EffectIo, Effector, validate_param};
use crate::error::{EffectError, EffectResult};
use crate::lfo::Lfo;

const PARAMS: [ParamDescriptor; 2] = [
    ParamDescriptor::ratio("depth", 1.0),
    ParamDescriptor::hertz("rate", 0.0, 22050.0, 0.0),
];

/// Carrier multiplication. Inactive by default.
#[derive(Debug, Clone)]
pub struct RingModulator {
    io: EffectIo,
    amplitude: NodeId,
    carrier: Lfo,
}

impl RingModulator {
    /// Creates the amplitude gain and the carrier.
    pub fn new(host: &mut dyn AudioHost) -> EffectResult<Self> {
        let io = EffectIo::new(host, false);
        let amplitude = host.create_node(NodeKind::Gain);
        host.set_param(amplitude, ParamName::Gain, 0.0)?;
        let mut carrier = Lfo::new(host, &[(amplitude, ParamName::Gain)], 1.0)?;
        carrier.set_depth(host, PARAMS[0].default)?;
        let effect = Self {
            io,
            amplitude,
            carrier,
        };
        effect.wire(host)?;
        Ok(effect)
    }

    fn wire(&self, host: &mut dyn AudioHost) -> EffectResult<()> {
        Ok(self.io.series(host, &[self.amplitude])?)
    }

    /// The modulated gain node.
    pub fn node(&self) -> NodeId {
        self.amplitude
    }

    /// The carrier oscillator.
    pub fn carrier(&self) -> &Lfo {
        &self.carrier
    }
}

impl Effector for RingModulator {
    fn kind(&self) -> &'static str {
        "ringmodulator"
    }

    fn input(&self) -> NodeId {
        self.io.input
    }

    fn output(&self) -> NodeId {
        self.io.output
    }

    fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = vec![self.io.input, self.io.output, self.amplitude];
        nodes.extend(self.carrier.nodes());
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
        Ok(self.carrier.start(host, when)?)
    }

    fn stop(&mut self, host: &mut dyn AudioHost, when: f64) -> EffectResult<()> {
        Ok(self.carrier.stop(host, when)?)
    }

    fn is_running(&self) -> bool {
        self.carrier.is_running()
    }

    fn param_count(&self) -> usize {
        PARAMS.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        PARAMS.get(index).copied()
    }

    fn get_param(&self, _host: &dyn AudioHost, index: usize) -> EffectResult<f32> {
        match index {
            0 => Ok(self.carrier.depth()),
            1 => Ok(self.carrier.rate()),
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
            self.carrier.set_depth(host, value)?;
        } else {
            self.carrier.set_rate(host, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonewire_core::HostGraph;

    #[test]
    fn amplitude_rests_at_zero() {
        let mut host = HostGraph::new(48000.0);
        let ring = RingModulator::new(&mut host).unwrap();
        assert_eq!(host.param(ring.node(), ParamName::Gain).unwrap(), 0.0);
        assert_eq!(host.param(ring.carrier().depth_node(), ParamName::Gain).unwrap(), 1.0);
    }

    #[test]
    fn audio_rate_carrier() {
        let mut host = HostGraph::new(48000.0);
        let mut ring = RingModulator::new(&mut host).unwrap();
        let idx = ring.find_param_by_name("rate").unwrap();
        ring.set_param(&mut host, idx, 440.0).unwrap();
        ring.start(&mut host, 0.0).unwrap();
        let osc = ring.carrier().oscillator().unwrap();
        assert_eq!(host.param(osc, ParamName::Frequency).unwrap(), 440.0);
        assert!(ring.set_param(&mut host, idx, 30000.0).is_err());
    }
}
