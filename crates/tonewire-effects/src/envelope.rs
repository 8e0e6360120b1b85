//! ADSR envelope generator for source voices.
//!
//! Each voice gets its own gain node, created on demand by
//! [`ready()`](EnvelopeGenerator::ready) and wired between the voice's
//! source and its destination. [`start()`](EnvelopeGenerator::start) and
//! [`stop()`](EnvelopeGenerator::stop) schedule the gain contour on every
//! voice:
//!
//! ```text
//! gain
//!  1 ┤    /\
//!    │   /  \______ sustain
//!    │  /          \
//!  0 ┤_/            \___
//!    when +a  +d   stop  +r
//! ```
//!
//! The generator is driven by source types (oscillators, samplers), not by
//! the sound module's `on`/`off`.

use std::collections::BTreeMap;

use tonewire_core::{
    AudioHost, Automation, NodeId, NodeKind, ParamDescriptor, ParamName, normalize_key,
};

use crate::effector::EffectSnapshot;
use crate::error::{EffectError, EffectResult};

const PARAMS: [ParamDescriptor; 4] = [
    ParamDescriptor::seconds("attack", 0.0, 10.0, 0.01),
    ParamDescriptor::seconds("decay", 0.0, 10.0, 0.3),
    ParamDescriptor::ratio("sustain", 0.5),
    ParamDescriptor::seconds("release", 0.0, 10.0, 1.0),
];

/// Per-voice ADSR gain automation.
#[derive(Debug, Clone)]
pub struct EnvelopeGenerator {
    voices: Vec<Option<NodeId>>,
    values: [f32; 4],
    running: bool,
}

impl Default for EnvelopeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeGenerator {
    /// Creates a generator with no voices.
    pub fn new() -> Self {
        Self {
            voices: Vec::new(),
            values: PARAMS.map(|desc| desc.default),
            running: false,
        }
    }

    /// Wires `input → voice gain → output` for voice `index`.
    ///
    /// The voice gain is created on first use and reused afterwards; its
    /// previous outgoing connection is replaced.
    pub fn ready(
        &mut self,
        host: &mut dyn AudioHost,
        index: usize,
        input: NodeId,
        output: NodeId,
    ) -> EffectResult<NodeId> {
        if self.voices.len() <= index {
            self.voices.resize(index + 1, None);
        }
        let gain = match self.voices[index] {
            Some(gain) => {
                host.disconnect(gain)?;
                gain
            }
            None => {
                let gain = host.create_node(NodeKind::Gain);
                host.set_param(gain, ParamName::Gain, 0.0)?;
                self.voices[index] = Some(gain);
                gain
            }
        };
        host.connect(input, gain)?;
        host.connect(gain, output)?;
        Ok(gain)
    }

    /// Voice gain nodes created so far.
    pub fn voices(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.voices.iter().flatten().copied()
    }

    /// Gain node of one voice.
    pub fn voice(&self, index: usize) -> Option<NodeId> {
        self.voices.get(index).copied().flatten()
    }

    /// Schedules attack and decay on every voice from `when`.
    pub fn start(&mut self, host: &mut dyn AudioHost, when: f64) -> EffectResult<()> {
        let [attack, decay, sustain, _] = self.values;
        let peak_at = when + f64::from(attack);
        let sustain_at = peak_at + f64::from(decay);
        for gain in self.voices() {
            for event in [
                Automation::CancelScheduledValues { time: when },
                Automation::SetValueAtTime {
                    value: 0.0,
                    time: when,
                },
                Automation::LinearRampToValueAtTime {
                    value: 1.0,
                    time: peak_at,
                },
                Automation::LinearRampToValueAtTime {
                    value: sustain,
                    time: sustain_at,
                },
            ] {
                host.schedule(gain, ParamName::Gain, event)?;
            }
        }
        self.running = true;
        Ok(())
    }

    /// Schedules the release on every voice from `when`.
    pub fn stop(&mut self, host: &mut dyn AudioHost, when: f64) -> EffectResult<()> {
        let [_, _, sustain, release] = self.values;
        let end = when + f64::from(release);
        for gain in self.voices() {
            for event in [
                Automation::CancelScheduledValues { time: when },
                Automation::SetValueAtTime {
                    value: sustain,
                    time: when,
                },
                Automation::LinearRampToValueAtTime {
                    value: 0.0,
                    time: end,
                },
            ] {
                host.schedule(gain, ParamName::Gain, event)?;
            }
        }
        self.running = false;
        Ok(())
    }

    /// Whether the envelope is between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of parameters.
    pub fn param_count(&self) -> usize {
        PARAMS.len()
    }

    /// Descriptor of the parameter at `index`.
    pub fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        PARAMS.get(index).copied()
    }

    /// Finds a parameter index by name.
    pub fn find_param_by_name(&self, name: &str) -> Option<usize> {
        let key = normalize_key(name);
        PARAMS.iter().position(|desc| desc.name == key)
    }

    /// Current value of the parameter at `index`.
    pub fn get_param(&self, index: usize) -> EffectResult<f32> {
        self.values.get(index).copied().ok_or(EffectError::UnknownParam {
            effect: "envelopegenerator",
            index,
        })
    }

    /// Sets the parameter at `index`; takes effect on the next start/stop.
    pub fn set_param(&mut self, index: usize, value: f32) -> EffectResult<()> {
        let desc = self.param_info(index).ok_or(EffectError::UnknownParam {
            effect: "envelopegenerator",
            index,
        })?;
        if !desc.contains(value) {
            return Err(EffectError::OutOfRange {
                effect: "envelopegenerator",
                param: desc.name,
                value,
                min: desc.min,
                max: desc.max,
            });
        }
        self.values[index] = value;
        Ok(())
    }

    /// Captures the envelope settings.
    pub fn snapshot(&self) -> EffectSnapshot {
        EffectSnapshot {
            kind: "envelopegenerator".to_string(),
            active: self.running,
            params: PARAMS
                .iter()
                .zip(self.values)
                .map(|(desc, value)| (desc.name.to_string(), value))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    /// Disconnects every voice gain and forgets them.
    pub fn release(&mut self, host: &mut dyn AudioHost) -> EffectResult<()> {
        for gain in self.voices() {
            host.disconnect(gain)?;
        }
        self.voices.clear();
        self.running = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonewire_core::HostGraph;

    #[test]
    fn ready_creates_voice_gain_once() {
        let mut host = HostGraph::new(48000.0);
        let osc = host.create_node(NodeKind::Oscillator);
        let out = host.create_node(NodeKind::Gain);
        let mut eg = EnvelopeGenerator::new();

        let first = eg.ready(&mut host, 2, osc, out).unwrap();
        assert!(host.is_connected(osc, first));
        assert!(host.is_connected(first, out));
        assert_eq!(eg.voice(0), None);

        let again = eg.ready(&mut host, 2, osc, out).unwrap();
        assert_eq!(first, again);
        assert_eq!(eg.voices().count(), 1);
    }

    #[test]
    fn adsr_contour() {
        let mut host = HostGraph::new(48000.0);
        let osc = host.create_node(NodeKind::Oscillator);
        let out = host.create_node(NodeKind::Gain);
        let mut eg = EnvelopeGenerator::new();
        let gain = eg.ready(&mut host, 0, osc, out).unwrap();
        eg.set_param(0, 0.5).unwrap();
        eg.set_param(1, 0.5).unwrap();

        eg.start(&mut host, 1.0).unwrap();
        let at = |host: &HostGraph, t| host.value_at(gain, ParamName::Gain, t).unwrap();
        assert_eq!(at(&host, 1.0), 0.0);
        assert!((at(&host, 1.25) - 0.5).abs() < 1e-6);
        assert_eq!(at(&host, 1.5), 1.0);
        assert_eq!(at(&host, 2.0), 0.5);

        eg.stop(&mut host, 3.0).unwrap();
        assert_eq!(at(&host, 4.0), 0.0);
        assert!((at(&host, 3.5) - 0.25).abs() < 1e-6);
        assert!(!eg.is_running());
    }

    #[test]
    fn sustain_range() {
        let mut eg = EnvelopeGenerator::new();
        let idx = eg.find_param_by_name("Sustain").unwrap();
        assert!(eg.set_param(idx, 1.5).is_err());
        assert_eq!(eg.get_param(idx).unwrap(), 0.5);
        assert_eq!(eg.snapshot().params["release"], 1.0);
    }
}
