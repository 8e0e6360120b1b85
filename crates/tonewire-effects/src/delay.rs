//! Feedback delay with separate dry and wet levels.
//!
//! # Signal Flow
//!
//! ```text
//!        ┌→ Gain(dry) ─────────────────────────────────┐
//! Input ─┤                                             ├→ Output
//!        └→ Lowpass(tone) → Delay(time) → Gain(wet) ───┘
//!                             ↑     │
//!                             └─ Gain(feedback)
//! ```

use tonewire_core::{AudioHost, FilterType, NodeId, NodeKind, ParamDescriptor, ParamName};

use crate::effector::{EffectIo, Effector, connect_pairs, validate_param};
use crate::error::{EffectError, EffectResult};

/// Longest delay time accepted, in seconds.
pub const MAX_TIME: f32 = 5.0;

/// Feedback delay. Inactive by default.
#[derive(Debug, Clone)]
pub struct Delay {
    io: EffectIo,
    dry: NodeId,
    tone: NodeId,
    delay: NodeId,
    wet: NodeId,
    feedback: NodeId,
    nyquist: f32,
}

impl Delay {
    /// Creates the delay line and its level gains.
    pub fn new(host: &mut dyn AudioHost) -> EffectResult<Self> {
        let io = EffectIo::new(host, false);
        let dry = host.create_node(NodeKind::Gain);
        let tone = host.create_node(NodeKind::BiquadFilter);
        host.set_filter_type(tone, FilterType::Lowpass)?;
        let delay = host.create_node(NodeKind::Delay { max_time: MAX_TIME });
        let wet = host.create_node(NodeKind::Gain);
        let feedback = host.create_node(NodeKind::Gain);
        let mut effect = Self {
            io,
            dry,
            tone,
            delay,
            wet,
            feedback,
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
        self.io.reset(
            host,
            &[self.dry, self.tone, self.delay, self.wet, self.feedback],
        )?;
        if !self.is_active() {
            host.connect(self.io.input, self.io.output)?;
            return Ok(());
        }
        connect_pairs(
            host,
            &[
                (self.io.input, self.dry),
                (self.dry, self.io.output),
                (self.io.input, self.tone),
                (self.tone, self.delay),
                (self.delay, self.wet),
                (self.wet, self.io.output),
                (self.delay, self.feedback),
                (self.feedback, self.delay),
            ],
        )?;
        Ok(())
    }

    /// The host delay node.
    pub fn delay_node(&self) -> NodeId {
        self.delay
    }

    fn param_node(&self, index: usize) -> Option<(NodeId, ParamName)> {
        match index {
            0 => Some((self.delay, ParamName::DelayTime)),
            1 => Some((self.dry, ParamName::Gain)),
            2 => Some((self.wet, ParamName::Gain)),
            3 => Some((self.feedback, ParamName::Gain)),
            4 => Some((self.tone, ParamName::Frequency)),
            _ => None,
        }
    }
}

impl Effector for Delay {
    fn kind(&self) -> &'static str {
        "delay"
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
            self.tone,
            self.delay,
            self.wet,
            self.feedback,
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
        5
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(ParamDescriptor::seconds("time", 0.0, MAX_TIME, 0.0)),
            1 => Some(ParamDescriptor::ratio("dry", 1.0)),
            2 => Some(ParamDescriptor::ratio("wet", 0.0)),
            3 => Some(ParamDescriptor::feedback()),
            4 => Some(ParamDescriptor::hertz("tone", 20.0, self.nyquist, 4000.0)),
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
