//! Phaser: a cascade of allpass filters swept by an LFO, mixed with the dry
//! signal, with feedback around the cascade.
//!
//! # Signal Flow
//!
//! ```text
//!        ┌──────────────────────────────────────────┐
//! Input ─┤                                          ├→ Output
//!        └→ Allpass 1 → ... → Allpass N → Gain(mix) ┘
//!              ↑  ↑                 │
//!              │  └── Gain(feedback) ┘
//!          LFO(rate) × frequency·depth → every allpass frequency
//! ```
//!
//! `stage` picks the number of allpass filters. Changing it rebuilds the
//! cascade; a stage count of 0 leaves only the dry path.

use tonewire_core::{AudioHost, FilterType, NodeId, NodeKind, ParamDescriptor, ParamName, ParamUnit};

use crate::effector::{EffectIo, Effector, connect_pairs, validate_param};
use crate::error::{EffectError, EffectResult};
use crate::lfo::Lfo;

/// Accepted allpass stage counts.
pub const STAGES: [u32; 6] = [0, 2, 4, 8, 12, 24];

const STAGE: usize = 0;
const FREQUENCY: usize = 1;
const RESONANCE: usize = 2;
const DEPTH: usize = 3;
const RATE: usize = 4;
const MIX: usize = 5;
const FEEDBACK: usize = 6;

/// Allpass phaser. Inactive by default.
#[derive(Debug, Clone)]
pub struct Phaser {
    io: EffectIo,
    filters: Vec<NodeId>,
    mix: NodeId,
    feedback: NodeId,
    lfo: Lfo,
    frequency: f32,
    resonance: f32,
    nyquist: f32,
}

impl Phaser {
    /// Creates a twelve-stage phaser.
    pub fn new(host: &mut dyn AudioHost) -> EffectResult<Self> {
        let io = EffectIo::new(host, false);
        let mix = host.create_node(NodeKind::Gain);
        let feedback = host.create_node(NodeKind::Gain);
        let lfo = Lfo::new(host, &[], 0.0)?;
        let mut effect = Self {
            io,
            filters: Vec::new(),
            mix,
            feedback,
            lfo,
            frequency: 350.0,
            resonance: 1.0,
            nyquist: host.sample_rate() / 2.0,
        };
        for index in 0..effect.param_count() {
            if let Some(desc) = effect.param_info(index) {
                effect.set_param(host, index, desc.default)?;
            }
        }
        Ok(effect)
    }

    fn wire(&self, host: &mut dyn AudioHost) -> EffectResult<()> {
        let mut internal = self.filters.clone();
        internal.extend([self.mix, self.feedback]);
        self.io.reset(host, &internal)?;
        host.connect(self.io.input, self.io.output)?;

        let (Some(&first), Some(&last)) = (self.filters.first(), self.filters.last()) else {
            return Ok(());
        };
        if !self.is_active() {
            return Ok(());
        }
        host.connect(self.io.input, first)?;
        for pair in self.filters.windows(2) {
            host.connect(pair[0], pair[1])?;
        }
        connect_pairs(
            host,
            &[
                (last, self.mix),
                (self.mix, self.io.output),
                (last, self.feedback),
                (self.feedback, first),
            ],
        )?;
        Ok(())
    }

    /// Replaces the allpass cascade with `stages` fresh filters.
    fn rebuild(&mut self, host: &mut dyn AudioHost, stages: u32) -> EffectResult<()> {
        for &node in &self.filters {
            host.disconnect(node)?;
        }
        let mut filters = Vec::with_capacity(stages as usize);
        for _ in 0..stages {
            let node = host.create_node(NodeKind::BiquadFilter);
            host.set_filter_type(node, FilterType::Allpass)?;
            host.set_param(node, ParamName::Frequency, self.frequency)?;
            host.set_param(node, ParamName::Q, self.resonance)?;
            filters.push(node);
        }
        self.filters = filters;
        let targets: Vec<_> = self
            .filters
            .iter()
            .map(|&node| (node, ParamName::Frequency))
            .collect();
        self.lfo.retarget(host, &targets)?;
        self.wire(host)
    }

    fn set_filters(&self, host: &mut dyn AudioHost, param: ParamName, value: f32) -> EffectResult<()> {
        for &node in &self.filters {
            host.set_param(node, param, value)?;
        }
        Ok(())
    }

    /// Allpass filter nodes in cascade order.
    pub fn filters(&self) -> &[NodeId] {
        &self.filters
    }

    /// The modulation source.
    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }
}

impl Effector for Phaser {
    fn kind(&self) -> &'static str {
        "phaser"
    }

    fn input(&self) -> NodeId {
        self.io.input
    }

    fn output(&self) -> NodeId {
        self.io.output
    }

    fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = vec![self.io.input, self.io.output, self.mix, self.feedback];
        nodes.extend_from_slice(&self.filters);
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
        7
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            STAGE => Some(ParamDescriptor::new("stage", ParamUnit::None, 0.0, 24.0, 12.0)),
            FREQUENCY => Some(ParamDescriptor::hertz("frequency", 20.0, self.nyquist, 350.0)),
            RESONANCE => Some(ParamDescriptor::resonance("resonance")),
            DEPTH => Some(ParamDescriptor::depth()),
            RATE => Some(ParamDescriptor::rate()),
            MIX => Some(ParamDescriptor::ratio("mix", 0.0)),
            FEEDBACK => Some(ParamDescriptor::feedback()),
            _ => None,
        }
    }

    fn get_param(&self, host: &dyn AudioHost, index: usize) -> EffectResult<f32> {
        match index {
            STAGE => Ok(self.filters.len() as f32),
            FREQUENCY => Ok(self.frequency),
            RESONANCE => Ok(self.resonance),
            DEPTH => Ok(self.lfo.depth()),
            RATE => Ok(self.lfo.rate()),
            MIX => Ok(host.param(self.mix, ParamName::Gain)?),
            FEEDBACK => Ok(host.param(self.feedback, ParamName::Gain)?),
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
        let desc = validate_param(self, index, value)?;
        match index {
            STAGE => {
                let stages = STAGES
                    .iter()
                    .copied()
                    .find(|&s| s as f32 == value)
                    .ok_or(EffectError::InvalidValue {
                        effect: self.kind(),
                        param: desc.name,
                        value,
                        reason: "stage must be one of 0, 2, 4, 8, 12, 24",
                    })?;
                self.rebuild(host, stages)?;
            }
            FREQUENCY => {
                self.set_filters(host, ParamName::Frequency, value)?;
                self.lfo.set_scale(host, value)?;
                self.frequency = value;
            }
            RESONANCE => {
                self.set_filters(host, ParamName::Q, value)?;
                self.resonance = value;
            }
            DEPTH => self.lfo.set_depth(host, value)?,
            RATE => self.lfo.set_rate(host, value)?,
            MIX => host.set_param(self.mix, ParamName::Gain, value)?,
            _ => host.set_param(self.feedback, ParamName::Gain, value)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonewire_core::HostGraph;

    fn active_phaser() -> (HostGraph, Phaser) {
        let mut host = HostGraph::new(48000.0);
        let mut phaser = Phaser::new(&mut host).unwrap();
        phaser.set_active(&mut host, true).unwrap();
        (host, phaser)
    }

    #[test]
    fn twelve_stages_by_default() {
        let (host, phaser) = active_phaser();
        assert_eq!(phaser.filters().len(), 12);
        assert_eq!(host.filter_type(phaser.filters()[0]), Some(FilterType::Allpass));
        assert!(host.has_path(phaser.input(), phaser.filters()[11]));
        assert!(host.is_connected(phaser.input(), phaser.output()));
    }

    #[test]
    fn lfo_sweeps_every_stage() {
        let (host, phaser) = active_phaser();
        let depth = phaser.lfo().depth_node();
        assert!(
            phaser
                .filters()
                .iter()
                .all(|&f| host.is_param_connected(depth, f, ParamName::Frequency))
        );
    }

    #[test]
    fn stage_rebuilds_cascade() {
        let (mut host, mut phaser) = active_phaser();
        let old = phaser.filters()[0];
        phaser.set_param(&mut host, STAGE, 4.0).unwrap();
        assert_eq!(phaser.filters().len(), 4);
        assert!(!host.is_connected(old, phaser.filters()[0]));
        assert!(!host.is_param_connected(phaser.lfo().depth_node(), old, ParamName::Frequency));
        assert_eq!(phaser.get_param(&host, STAGE).unwrap(), 4.0);
    }

    #[test]
    fn invalid_stage_rejected() {
        let (mut host, mut phaser) = active_phaser();
        let err = phaser.set_param(&mut host, STAGE, 6.0).unwrap_err();
        assert!(matches!(err, EffectError::InvalidValue { param: "stage", .. }));
        assert_eq!(phaser.filters().len(), 12);
    }

    #[test]
    fn zero_stages_is_dry_only() {
        let (mut host, mut phaser) = active_phaser();
        phaser.set_param(&mut host, STAGE, 0.0).unwrap();
        assert!(phaser.filters().is_empty());
        assert_eq!(host.outputs(phaser.input()).len(), 1);
        assert!(host.is_connected(phaser.input(), phaser.output()));
    }

    #[test]
    fn frequency_applies_to_all_stages() {
        let (mut host, mut phaser) = active_phaser();
        phaser.set_param(&mut host, FREQUENCY, 800.0).unwrap();
        assert!(
            phaser
                .filters()
                .iter()
                .all(|&f| host.param(f, ParamName::Frequency).unwrap() == 800.0)
        );
    }
}
