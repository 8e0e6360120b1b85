//! Auto-wah: a resonant lowpass whose cutoff is swept by an LFO.
//!
//! The LFO depth is proportional to the cutoff, so `depth = 1` sweeps the
//! filter between 0 Hz and twice the cutoff.
//!
//! # Signal Flow
//!
//! ```text
//! Input → Lowpass(cutoff, resonance) → Output
//!              ↑ frequency
//!         LFO(rate) × cutoff·depth
//! ```

use tonewire_core::{AudioHost, FilterType, NodeId, NodeKind, ParamDescriptor, ParamName};

use crate::effector::{EffectIo, Effector, validate_param};
use crate::error::{EffectError, EffectResult};
use crate::lfo::Lfo;

/// LFO-swept lowpass. Inactive by default.
#[derive(Debug, Clone)]
pub struct Wah {
    io: EffectIo,
    lowpass: NodeId,
    lfo: Lfo,
    nyquist: f32,
}

impl Wah {
    /// Creates the filter and its LFO.
    pub fn new(host: &mut dyn AudioHost) -> EffectResult<Self> {
        let io = EffectIo::new(host, false);
        let lowpass = host.create_node(NodeKind::BiquadFilter);
        host.set_filter_type(lowpass, FilterType::Lowpass)?;
        let lfo = Lfo::new(host, &[(lowpass, ParamName::Frequency)], 0.0)?;
        let mut effect = Self {
            io,
            lowpass,
            lfo,
            nyquist: host.sample_rate() / 2.0,
        };
        for index in 0..effect.param_count() {
            if let Some(desc) = effect.param_info(index) {
                effect.set_param(host, index, desc.default)?;
            }
        }
        effect.wire(host)?;
        Ok(effect)
    }

    fn wire(&self, host: &mut dyn AudioHost) -> EffectResult<()> {
        Ok(self.io.series(host, &[self.lowpass])?)
    }

    /// The swept filter node.
    pub fn filter(&self) -> NodeId {
        self.lowpass
    }

    /// The modulation source.
    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }
}

impl Effector for Wah {
    fn kind(&self) -> &'static str {
        "wah"
    }

    fn input(&self) -> NodeId {
        self.io.input
    }

    fn output(&self) -> NodeId {
        self.io.output
    }

    fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = vec![self.io.input, self.io.output, self.lowpass];
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
        4
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(ParamDescriptor::hertz("cutoff", 20.0, self.nyquist, 350.0)),
            1 => Some(ParamDescriptor::depth()),
            2 => Some(ParamDescriptor::rate()),
            3 => Some(ParamDescriptor::resonance("resonance")),
            _ => None,
        }
    }

    fn get_param(&self, host: &dyn AudioHost, index: usize) -> EffectResult<f32> {
        match index {
            0 => Ok(host.param(self.lowpass, ParamName::Frequency)?),
            1 => Ok(self.lfo.depth()),
            2 => Ok(self.lfo.rate()),
            3 => Ok(host.param(self.lowpass, ParamName::Q)?),
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
        match index {
            0 => {
                host.set_param(self.lowpass, ParamName::Frequency, value)?;
                self.lfo.set_scale(host, value)?;
            }
            1 => self.lfo.set_depth(host, value)?,
            2 => self.lfo.set_rate(host, value)?,
            _ => host.set_param(self.lowpass, ParamName::Q, value)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonewire_core::HostGraph;

    #[test]
    fn depth_tracks_cutoff() {
        let mut host = HostGraph::new(48000.0);
        let mut wah = Wah::new(&mut host).unwrap();
        wah.set_param(&mut host, 1, 0.5).unwrap();
        let depth = wah.lfo().depth_node();
        assert_eq!(host.param(depth, ParamName::Gain).unwrap(), 175.0);

        wah.set_param(&mut host, 0, 1000.0).unwrap();
        assert_eq!(host.param(depth, ParamName::Gain).unwrap(), 500.0);
    }

    #[test]
    fn lfo_modulates_cutoff() {
        let mut host = HostGraph::new(48000.0);
        let mut wah = Wah::new(&mut host).unwrap();
        assert!(host.is_param_connected(
            wah.lfo().depth_node(),
            wah.filter(),
            ParamName::Frequency
        ));
        wah.set_param(&mut host, 2, 3.0).unwrap();
        wah.start(&mut host, 0.5).unwrap();
        let osc = wah.lfo().oscillator().unwrap();
        assert_eq!(host.param(osc, ParamName::Frequency).unwrap(), 3.0);
        assert!(wah.is_running());

        wah.stop(&mut host, 1.0).unwrap();
        assert_eq!(host.stop_time(osc), Some(1.0));
        assert!(!wah.is_running());
    }

    #[test]
    fn resonance_by_name() {
        let mut host = HostGraph::new(48000.0);
        let mut wah = Wah::new(&mut host).unwrap();
        let idx = wah.find_param_by_name("RESONANCE").unwrap();
        wah.set_param(&mut host, idx, 12.0).unwrap();
        assert_eq!(host.param(wah.filter(), ParamName::Q).unwrap(), 12.0);
        assert!(wah.set_param(&mut host, idx, 0.0).is_err());
    }
}
