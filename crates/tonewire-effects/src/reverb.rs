//! Convolution reverb.
//!
//! The impulse response is loaded by the caller with
//! [`set_impulse()`](Reverb::set_impulse); until one is loaded the wet path
//! carries the host convolver's default (silence on most hosts).
//!
//! # Signal Flow
//!
//! ```text
//!        ┌→ Gain(dry) ────────────────────────────────┐
//! Input ─┤                                            ├→ Output
//!        └→ Convolver(impulse) → Lowpass(tone) → Gain(wet)
//! ```

use tonewire_core::{AudioHost, FilterType, NodeId, NodeKind, ParamDescriptor, ParamName};

use crate::effector::{EffectIo, Effector, connect_pairs, validate_param};
use crate::error::{EffectError, EffectResult};

/// Convolution reverb. Inactive by default.
#[derive(Debug, Clone)]
pub struct Reverb {
    io: EffectIo,
    dry: NodeId,
    convolver: NodeId,
    tone: NodeId,
    wet: NodeId,
    nyquist: f32,
}

impl Reverb {
    /// Creates the convolver and level gains.
    pub fn new(host: &mut dyn AudioHost) -> EffectResult<Self> {
        let io = EffectIo::new(host, false);
        let dry = host.create_node(NodeKind::Gain);
        let convolver = host.create_node(NodeKind::Convolver);
        let tone = host.create_node(NodeKind::BiquadFilter);
        host.set_filter_type(tone, FilterType::Lowpass)?;
        let wet = host.create_node(NodeKind::Gain);
        let mut effect = Self {
            io,
            dry,
            convolver,
            tone,
            wet,
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
        self.io
            .reset(host, &[self.dry, self.convolver, self.tone, self.wet])?;
        if !self.is_active() {
            host.connect(self.io.input, self.io.output)?;
            return Ok(());
        }
        connect_pairs(
            host,
            &[
                (self.io.input, self.dry),
                (self.dry, self.io.output),
                (self.io.input, self.convolver),
                (self.convolver, self.tone),
                (self.tone, self.wet),
                (self.wet, self.io.output),
            ],
        )?;
        Ok(())
    }

    /// Loads an impulse response, one sample vector per channel.
    pub fn set_impulse(
        &mut self,
        host: &mut dyn AudioHost,
        channels: Vec<Vec<f32>>,
    ) -> EffectResult<()> {
        Ok(host.set_buffer(self.convolver, channels)?)
    }

    /// The host convolver node.
    pub fn convolver(&self) -> NodeId {
        self.convolver
    }

    fn param_node(&self, index: usize) -> Option<(NodeId, ParamName)> {
        match index {
            0 => Some((self.dry, ParamName::Gain)),
            1 => Some((self.wet, ParamName::Gain)),
            2 => Some((self.tone, ParamName::Frequency)),
            _ => None,
        }
    }
}

impl Effector for Reverb {
    fn kind(&self) -> &'static str {
        "reverb"
    }

    fn input(&self) -> NodeId {
        self.io.input
    }

    fn output(&self) -> NodeId {
        self.io.output
    }

    fn nodes(&self) -> Vec<NodeId> {
        vec![
            self.io.input,
            self.io.output,
            self.dry,
            self.convolver,
            self.tone,
            self.wet,
        ]
    }

    fn is_active(&self) -> bool {
        self.io.is_active()
    }

    fn set_active(&mut self, host: &mut dyn AudioHost, active: bool) -> EffectResult<()> {
        self.io.set_active(active);
        self.wire(host)
    }

    fn param_count(&self) -> usize {
        3
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(ParamDescriptor::ratio("dry", 1.0)),
            1 => Some(ParamDescriptor::ratio("wet", 0.0)),
            2 => Some(ParamDescriptor::hertz("tone", 20.0, self.nyquist, 4000.0)),
            _ => None,
        }
    }

    fn get_param(&self, host: &dyn AudioHost, index: usize) -> EffectResult<f32> {
        let (node, param) = self.param_node(index).ok_or(EffectError::UnknownParam {
            effect: self.kind(),
            index,
        })?;
        Ok(host.param(node, param)?)
    }

    fn set_param(
        &mut self,
        host: &mut dyn AudioHost,
        index: usize,
        value: f32,
    ) -> EffectResult<()> {
        validate_param(self, index, value)?;
        let (node, param) = self.param_node(index).ok_or(EffectError::UnknownParam {
            effect: self.kind(),
            index,
        })?;
        Ok(host.set_param(node, param, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonewire_core::HostGraph;

    #[test]
    fn impulse_reaches_convolver() {
        let mut host = HostGraph::new(48000.0);
        let mut reverb = Reverb::new(&mut host).unwrap();
        let ir = vec![vec![1.0, 0.5, 0.25], vec![1.0, 0.4, 0.2]];
        reverb.set_impulse(&mut host, ir.clone()).unwrap();
        assert_eq!(host.buffer(reverb.convolver()).unwrap(), ir.as_slice());
    }

    #[test]
    fn wet_path_when_active() {
        let mut host = HostGraph::new(48000.0);
        let mut reverb = Reverb::new(&mut host).unwrap();
        reverb.set_active(&mut host, true).unwrap();
        assert!(host.has_path(reverb.convolver(), reverb.output()));
        assert!(host.is_connected(reverb.input(), reverb.convolver()));

        reverb.set_active(&mut host, false).unwrap();
        assert!(!host.is_connected(reverb.input(), reverb.convolver()));
        assert!(host.is_connected(reverb.input(), reverb.output()));
    }
}
