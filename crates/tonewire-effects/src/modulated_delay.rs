//! Short modulated delay shared by the flanger and the chorus.
//!
//! # Signal Flow
//!
//! ```text
//!        ┌──────────────────────────────────────────┐
//! Input ─┤                                          ├→ Output
//!        └→ Lowpass(tone) → Delay(time) → Gain(mix) ┘
//!                             ↑  │  ↑ delay time
//!           Gain(feedback) ───┘←─┘  LFO(rate) × time·depth
//! ```
//!
//! The two effects share topology and parameters; they differ in kind name
//! and in the settings users pick for them (flanger: shorter time, more
//! feedback).

use tonewire_core::{AudioHost, FilterType, NodeId, NodeKind, ParamDescriptor, ParamName};

use crate::effector::{EffectIo, Effector, connect_pairs, validate_param};
use crate::error::{EffectError, EffectResult};
use crate::lfo::Lfo;

/// Longest delay time accepted, in seconds.
pub const MAX_TIME: f32 = 0.05;

const TIME: usize = 0;
const DEPTH: usize = 1;
const RATE: usize = 2;
const MIX: usize = 3;
const FEEDBACK: usize = 4;
const TONE: usize = 5;

/// LFO-modulated delay line. Inactive by default.
#[derive(Debug, Clone)]
pub struct ModulatedDelay {
    kind: &'static str,
    io: EffectIo,
    tone: NodeId,
    delay: NodeId,
    mix: NodeId,
    feedback: NodeId,
    lfo: Lfo,
    nyquist: f32,
}

impl ModulatedDelay {
    /// Creates a flanger.
    pub fn flanger(host: &mut dyn AudioHost) -> EffectResult<Self> {
        Self::new(host, "flanger")
    }

    /// Creates a chorus.
    pub fn chorus(host: &mut dyn AudioHost) -> EffectResult<Self> {
        Self::new(host, "chorus")
    }

    fn new(host: &mut dyn AudioHost, kind: &'static str) -> EffectResult<Self> {
        let io = EffectIo::new(host, false);
        let tone = host.create_node(NodeKind::BiquadFilter);
        host.set_filter_type(tone, FilterType::Lowpass)?;
        let delay = host.create_node(NodeKind::Delay { max_time: 1.0 });
        let mix = host.create_node(NodeKind::Gain);
        let feedback = host.create_node(NodeKind::Gain);
        let lfo = Lfo::new(host, &[(delay, ParamName::DelayTime)], 0.0)?;
        let mut effect = Self {
            kind,
            io,
            tone,
            delay,
            mix,
            feedback,
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
        self.io
            .reset(host, &[self.tone, self.delay, self.mix, self.feedback])?;
        host.connect(self.io.input, self.io.output)?;
        if !self.is_active() {
            return Ok(());
        }
        connect_pairs(
            host,
            &[
                (self.io.input, self.tone),
                (self.tone, self.delay),
                (self.delay, self.mix),
                (self.mix, self.io.output),
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

    /// The modulation source.
    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }
}

impl Effector for ModulatedDelay {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn input(&self) -> NodeId {
        self.io.input
    }

    fn output(&self) -> NodeId {
        self.io.output
    }

    fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = vec![
            self.io.input,
            self.io.output,
            self.tone,
            self.delay,
            self.mix,
            self.feedback,
        ];
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
        6
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            TIME => Some(ParamDescriptor::seconds("time", 0.0, MAX_TIME, 0.0)),
            DEPTH => Some(ParamDescriptor::depth()),
            RATE => Some(ParamDescriptor::rate()),
            MIX => Some(ParamDescriptor::ratio("mix", 0.0)),
            FEEDBACK => Some(ParamDescriptor::feedback()),
            TONE => Some(ParamDescriptor::hertz("tone", 20.0, self.nyquist, 4000.0)),
            _ => None,
        }
    }

    fn get_param(&self, host: &dyn AudioHost, index: usize) -> EffectResult<f32> {
        match index {
            TIME => Ok(host.param(self.delay, ParamName::DelayTime)?),
            DEPTH => Ok(self.lfo.depth()),
            RATE => Ok(self.lfo.rate()),
            MIX => Ok(host.param(self.mix, ParamName::Gain)?),
            FEEDBACK => Ok(host.param(self.feedback, ParamName::Gain)?),
            TONE => Ok(host.param(self.tone, ParamName::Frequency)?),
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
            TIME => {
                host.set_param(self.delay, ParamName::DelayTime, value)?;
                self.lfo.set_scale(host, value)?;
            }
            DEPTH => self.lfo.set_depth(host, value)?,
            RATE => self.lfo.set_rate(host, value)?,
            MIX => host.set_param(self.mix, ParamName::Gain, value)?,
            FEEDBACK => host.set_param(self.feedback, ParamName::Gain, value)?,
            _ => host.set_param(self.tone, ParamName::Frequency, value)?,
        }
        Ok(())
    }
}
