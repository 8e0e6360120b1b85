//! Spectrum analyser tap.
//!
//! Sits on the master volume's output and passes audio through unchanged;
//! the host analyser node exposes time and frequency data to visualizers.
//!
//! ```text
//! Input → Analyser(fftsize, smoothing) → Output
//! ```

use tonewire_core::{AudioHost, NodeId, NodeKind, ParamDescriptor, ParamName, ParamUnit};

use crate::effector::{EffectIo, Effector, validate_param};
use crate::error::{EffectError, EffectResult};

const PARAMS: [(ParamDescriptor, ParamName); 4] = [
    (
        ParamDescriptor::new("fftsize", ParamUnit::None, 32.0, 32768.0, 2048.0),
        ParamName::FftSize,
    ),
    (
        ParamDescriptor::ratio("smoothing", 0.8),
        ParamName::SmoothingTimeConstant,
    ),
    (
        ParamDescriptor::decibels("mindecibels", -200.0, 0.0, -100.0),
        ParamName::MinDecibels,
    ),
    (
        ParamDescriptor::decibels("maxdecibels", -200.0, 0.0, -30.0),
        ParamName::MaxDecibels,
    ),
];

/// Pass-through analyser. Always active.
#[derive(Debug, Clone)]
pub struct Analyser {
    io: EffectIo,
    analyser: NodeId,
}

impl Analyser {
    /// Creates the analyser node.
    pub fn new(host: &mut dyn AudioHost) -> EffectResult<Self> {
        let io = EffectIo::new(host, true);
        let analyser = host.create_node(NodeKind::Analyser);
        for (desc, param) in &PARAMS {
            host.set_param(analyser, *param, desc.default)?;
        }
        let effect = Self { io, analyser };
        effect.io.series(host, &[analyser])?;
        Ok(effect)
    }

    /// The host analyser node.
    pub fn node(&self) -> NodeId {
        self.analyser
    }
}

impl Effector for Analyser {
    fn kind(&self) -> &'static str {
        "analyser"
    }

    fn input(&self) -> NodeId {
        self.io.input
    }

    fn output(&self) -> NodeId {
        self.io.output
    }

    fn nodes(&self) -> Vec<NodeId> {
        vec![self.io.input, self.io.output, self.analyser]
    }

    fn is_active(&self) -> bool {
        true
    }

    /// The analyser cannot be bypassed.
    fn set_active(&mut self, _host: &mut dyn AudioHost, _active: bool) -> EffectResult<()> {
        Err(EffectError::NotSwitchable { effect: self.kind() })
    }

    fn param_count(&self) -> usize {
        PARAMS.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        PARAMS.get(index).map(|(desc, _)| *desc)
    }

    fn get_param(&self, host: &dyn AudioHost, index: usize) -> EffectResult<f32> {
        let (_, param) = PARAMS.get(index).ok_or(EffectError::UnknownParam {
            effect: self.kind(),
            index,
        })?;
        Ok(host.param(self.analyser, *param)?)
    }

    fn set_param(
        &mut self,
        host: &mut dyn AudioHost,
        index: usize,
        value: f32,
    ) -> EffectResult<()> {
        let desc = validate_param(self, index, value)?;
        let (_, param) = PARAMS[index];
        match param {
            ParamName::FftSize if value.fract() != 0.0 || !(value as u32).is_power_of_two() => {
                return Err(EffectError::InvalidValue {
                    effect: self.kind(),
                    param: desc.name,
                    value,
                    reason: "fftsize must be a power of two",
                });
            }
            ParamName::MinDecibels | ParamName::MaxDecibels => {
                let (min, max) = if param == ParamName::MinDecibels {
                    (value, host.param(self.analyser, ParamName::MaxDecibels)?)
                } else {
                    (host.param(self.analyser, ParamName::MinDecibels)?, value)
                };
                if min >= max {
                    return Err(EffectError::InvalidValue {
                        effect: self.kind(),
                        param: desc.name,
                        value,
                        reason: "mindecibels must stay below maxdecibels",
                    });
                }
            }
            _ => {}
        }
        Ok(host.set_param(self.analyser, param, value)?)
    }
}
