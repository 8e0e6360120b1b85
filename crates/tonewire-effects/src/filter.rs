//! Biquad filter with a cutoff envelope.
//!
//! When started, the cutoff follows an ADSR contour between
//! `frequency * range` (floor) and `frequency` (peak):
//!
//! ```text
//! cutoff
//!   ↑      peak
//!   │     /\
//!   │    /  \_______ sustain
//!   │   /           \
//!   │__/             \__ floor
//!   └──┴──┴──┴───────┴──→ t
//!    when  +attack  +decay     stop +release
//! ```
//!
//! The sustain level sits `sustain` of the way from floor to peak.

use tonewire_core::{
    AudioHost, Automation, FilterType, NodeId, NodeKind, ParamDescriptor, ParamName,
};

use crate::effector::{EffectIo, Effector, validate_param};
use crate::error::{EffectError, EffectResult};

const FREQUENCY: usize = 0;
const Q: usize = 1;
const GAIN: usize = 2;
const RANGE: usize = 3;
const ATTACK: usize = 4;
const DECAY: usize = 5;
const SUSTAIN: usize = 6;
const RELEASE: usize = 7;

/// Envelope timing and levels, in descriptor order after `gain`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Envelope {
    range: f32,
    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,
}

/// Biquad filter. Inactive by default.
#[derive(Debug, Clone)]
pub struct Filter {
    io: EffectIo,
    filter: NodeId,
    envelope: Envelope,
    nyquist: f32,
    running: bool,
}

impl Filter {
    /// Creates a lowpass at 350 Hz.
    pub fn new(host: &mut dyn AudioHost) -> EffectResult<Self> {
        let io = EffectIo::new(host, false);
        let filter = host.create_node(NodeKind::BiquadFilter);
        host.set_filter_type(filter, FilterType::Lowpass)?;
        let mut effect = Self {
            io,
            filter,
            envelope: Envelope {
                range: 0.0,
                attack: 0.0,
                decay: 0.0,
                sustain: 0.0,
                release: 0.0,
            },
            nyquist: host.sample_rate() / 2.0,
            running: false,
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
        Ok(self.io.series(host, &[self.filter])?)
    }

    /// The host filter node.
    pub fn node(&self) -> NodeId {
        self.filter
    }

    /// Selects the filter response.
    pub fn set_filter_type(
        &mut self,
        host: &mut dyn AudioHost,
        filter_type: FilterType,
    ) -> EffectResult<()> {
        Ok(host.set_filter_type(self.filter, filter_type)?)
    }

    /// Floor, peak and sustain cutoff for the current settings.
    fn levels(&self, host: &dyn AudioHost) -> EffectResult<(f32, f32, f32)> {
        let peak = host.param(self.filter, ParamName::Frequency)?;
        let floor = peak * self.envelope.range;
        let sustain = floor + (peak - floor) * self.envelope.sustain;
        Ok((floor, peak, sustain))
    }

    fn schedule(
        &self,
        host: &mut dyn AudioHost,
        events: &[Automation],
    ) -> EffectResult<()> {
        for event in events {
            host.schedule(self.filter, ParamName::Frequency, *event)?;
        }
        Ok(())
    }
}

impl Effector for Filter {
    fn kind(&self) -> &'static str {
        "filter"
    }

    fn input(&self) -> NodeId {
        self.io.input
    }

    fn output(&self) -> NodeId {
        self.io.output
    }

    fn nodes(&self) -> Vec<NodeId> {
        vec![self.io.input, self.io.output, self.filter]
    }

    fn is_active(&self) -> bool {
        self.io.is_active()
    }

    fn set_active(&mut self, host: &mut dyn AudioHost, active: bool) -> EffectResult<()> {
        self.io.set_active(active);
        self.wire(host)
    }

    /// Schedules attack and decay from `when`. No-op while switched off.
    fn start(&mut self, host: &mut dyn AudioHost, when: f64) -> EffectResult<()> {
        if !self.is_active() {
            return Ok(());
        }
        let (floor, peak, sustain) = self.levels(host)?;
        let peak_at = when + f64::from(self.envelope.attack);
        let sustain_at = peak_at + f64::from(self.envelope.decay);
        self.schedule(
            host,
            &[
                Automation::CancelScheduledValues { time: when },
                Automation::SetValueAtTime {
                    value: floor,
                    time: when,
                },
                Automation::LinearRampToValueAtTime {
                    value: peak,
                    time: peak_at,
                },
                Automation::LinearRampToValueAtTime {
                    value: sustain,
                    time: sustain_at,
                },
            ],
        )?;
        self.running = true;
        Ok(())
    }

    /// Schedules the release from `when`. No-op unless started.
    fn stop(&mut self, host: &mut dyn AudioHost, when: f64) -> EffectResult<()> {
        if !self.running {
            return Ok(());
        }
        let (floor, _, sustain) = self.levels(host)?;
        let end = when + f64::from(self.envelope.release);
        self.schedule(
            host,
            &[
                Automation::CancelScheduledValues { time: when },
                Automation::SetValueAtTime {
                    value: sustain,
                    time: when,
                },
                Automation::LinearRampToValueAtTime {
                    value: floor,
                    time: end,
                },
            ],
        )?;
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn param_count(&self) -> usize {
        8
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            FREQUENCY => Some(ParamDescriptor::hertz("frequency", 10.0, self.nyquist, 350.0)),
            Q => Some(ParamDescriptor::resonance("q")),
            GAIN => Some(ParamDescriptor::decibels("gain", -40.0, 40.0, 0.0)),
            RANGE => Some(ParamDescriptor::ratio("range", 0.1)),
            ATTACK => Some(ParamDescriptor::seconds("attack", 0.0, 10.0, 0.01)),
            DECAY => Some(ParamDescriptor::seconds("decay", 0.0, 10.0, 0.3)),
            SUSTAIN => Some(ParamDescriptor::ratio("sustain", 1.0)),
            RELEASE => Some(ParamDescriptor::seconds("release", 0.0, 10.0, 1.0)),
            _ => None,
        }
    }

    fn get_param(&self, host: &dyn AudioHost, index: usize) -> EffectResult<f32> {
        let env = &self.envelope;
        match index {
            FREQUENCY => Ok(host.param(self.filter, ParamName::Frequency)?),
            Q => Ok(host.param(self.filter, ParamName::Q)?),
            GAIN => Ok(host.param(self.filter, ParamName::Gain)?),
            RANGE => Ok(env.range),
            ATTACK => Ok(env.attack),
            DECAY => Ok(env.decay),
            SUSTAIN => Ok(env.sustain),
            RELEASE => Ok(env.release),
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
        let env = &mut self.envelope;
        match index {
            FREQUENCY => host.set_param(self.filter, ParamName::Frequency, value)?,
            Q => host.set_param(self.filter, ParamName::Q, value)?,
            GAIN => host.set_param(self.filter, ParamName::Gain, value)?,
            RANGE => env.range = value,
            ATTACK => env.attack = value,
            DECAY => env.decay = value,
            SUSTAIN => env.sustain = value,
            _ => env.release = value,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonewire_core::HostGraph;

    fn active_filter() -> (HostGraph, Filter) {
        let mut host = HostGraph::new(48000.0);
        let mut filter = Filter::new(&mut host).unwrap();
        filter.set_active(&mut host, true).unwrap();
        (host, filter)
    }

    #[test]
    fn defaults() {
        let mut host = HostGraph::new(48000.0);
        let filter = Filter::new(&mut host).unwrap();
        let snap = filter.snapshot(&host).unwrap();
        assert_eq!(snap.params["frequency"], 350.0);
        assert_eq!(snap.params["range"], 0.1);
        assert_eq!(snap.params["sustain"], 1.0);
        assert_eq!(host.filter_type(filter.node()), Some(FilterType::Lowpass));
    }

    #[test]
    fn start_schedules_attack_and_decay() {
        let (mut host, mut filter) = active_filter();
        filter.set_param(&mut host, FREQUENCY, 1000.0).unwrap();
        filter.set_param(&mut host, ATTACK, 0.5).unwrap();
        filter.set_param(&mut host, DECAY, 0.5).unwrap();
        filter.set_param(&mut host, SUSTAIN, 0.5).unwrap();
        filter.start(&mut host, 1.0).unwrap();

        let node = filter.node();
        let at = |t| host.value_at(node, ParamName::Frequency, t).unwrap();
        assert!((at(1.0) - 100.0).abs() < 1e-3);
        assert!((at(1.5) - 1000.0).abs() < 1e-3);
        assert!((at(2.0) - 550.0).abs() < 1e-3);
        assert!((at(1.25) - 550.0).abs() < 1e-3);
        assert!(filter.is_running());
    }

    #[test]
    fn stop_ramps_to_floor() {
        let (mut host, mut filter) = active_filter();
        filter.start(&mut host, 0.0).unwrap();
        filter.stop(&mut host, 2.0).unwrap();
        let node = filter.node();
        assert!((host.value_at(node, ParamName::Frequency, 3.0).unwrap() - 35.0).abs() < 1e-3);
        assert!(!filter.is_running());
    }

    #[test]
    fn start_while_off_does_nothing() {
        let mut host = HostGraph::new(48000.0);
        let mut filter = Filter::new(&mut host).unwrap();
        filter.start(&mut host, 0.0).unwrap();
        assert!(host.automation(filter.node(), ParamName::Frequency).is_empty());
        assert!(!filter.is_running());
    }

    #[test]
    fn restart_cancels_pending_events() {
        let (mut host, mut filter) = active_filter();
        filter.start(&mut host, 0.0).unwrap();
        filter.start(&mut host, 0.0).unwrap();
        assert_eq!(host.automation(filter.node(), ParamName::Frequency).len(), 3);
    }

    #[test]
    fn filter_type_setter() {
        let (mut host, mut filter) = active_filter();
        filter
            .set_filter_type(&mut host, FilterType::Highpass)
            .unwrap();
        assert_eq!(host.filter_type(filter.node()), Some(FilterType::Highpass));
    }
}
