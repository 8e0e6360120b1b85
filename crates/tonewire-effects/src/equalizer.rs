//! Four-band equalizer.
//!
//! # Signal Flow
//!
//! ```text
//! Input → Lowshelf(500 Hz) → Peaking(1 kHz) → Highshelf(2 kHz) → Peaking(3 kHz) → Output
//!           bass                middle            treble             presence
//! ```
//!
//! Band frequencies are fixed; each band's gain ranges over -40 to +40 dB.

use tonewire_core::{AudioHost, FilterType, NodeId, NodeKind, ParamDescriptor, ParamName};

use crate::effector::{EffectIo, Effector, validate_param};
use crate::error::{EffectError, EffectResult};

/// Band layout: parameter, filter response, center/corner frequency.
const BANDS: [(ParamDescriptor, FilterType, f32); 4] = [
    (
        ParamDescriptor::decibels("bass", -40.0, 40.0, 0.0),
        FilterType::Lowshelf,
        500.0,
    ),
    (
        ParamDescriptor::decibels("middle", -40.0, 40.0, 0.0),
        FilterType::Peaking,
        1000.0,
    ),
    (
        ParamDescriptor::decibels("treble", -40.0, 40.0, 0.0),
        FilterType::Highshelf,
        2000.0,
    ),
    (
        ParamDescriptor::decibels("presence", -40.0, 40.0, 0.0),
        FilterType::Peaking,
        3000.0,
    ),
];

/// Four fixed-frequency bands. Inactive by default.
#[derive(Debug, Clone)]
pub struct Equalizer {
    io: EffectIo,
    bands: [NodeId; 4],
}

impl Equalizer {
    /// Creates the four band filters.
    pub fn new(host: &mut dyn AudioHost) -> EffectResult<Self> {
        let io = EffectIo::new(host, false);
        let mut bands = [NodeId::from_raw(0); 4];
        for (slot, (desc, filter_type, frequency)) in bands.iter_mut().zip(&BANDS) {
            let node = host.create_node(NodeKind::BiquadFilter);
            host.set_filter_type(node, *filter_type)?;
            host.set_param(node, ParamName::Frequency, *frequency)?;
            host.set_param(node, ParamName::Gain, desc.default)?;
            *slot = node;
        }
        let effect = Self { io, bands };
        effect.wire(host)?;
        Ok(effect)
    }

    fn wire(&self, host: &mut dyn AudioHost) -> EffectResult<()> {
        Ok(self.io.series(host, &self.bands)?)
    }

    /// Band filter nodes, lowest first.
    pub fn bands(&self) -> &[NodeId; 4] {
        &self.bands
    }
}

impl Effector for Equalizer {
    fn kind(&self) -> &'static str {
        "equalizer"
    }

    fn input(&self) -> NodeId {
        self.io.input
    }

    fn output(&self) -> NodeId {
        self.io.output
    }

    fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = vec![self.io.input, self.io.output];
        nodes.extend_from_slice(&self.bands);
        nodes
    }

    fn is_active(&self) -> bool {
        self.io.is_active()
    }

    fn set_active(&mut self, host: &mut dyn AudioHost, active: bool) -> EffectResult<()> {
        self.io.set_active(active);
        self.wire(host)
    }

    fn param_count(&self) -> usize {
        BANDS.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        BANDS.get(index).map(|(desc, _, _)| *desc)
    }

    fn get_param(&self, host: &dyn AudioHost, index: usize) -> EffectResult<f32> {
        let node = self.bands.get(index).ok_or(EffectError::UnknownParam {
            effect: self.kind(),
            index,
        })?;
        Ok(host.param(*node, ParamName::Gain)?)
    }

    fn set_param(
        &mut self,
        host: &mut dyn AudioHost,
        index: usize,
        value: f32,
    ) -> EffectResult<()> {
        validate_param(self, index, value)?;
        Ok(host.set_param(self.bands[index], ParamName::Gain, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonewire_core::HostGraph;

    #[test]
    fn band_layout() {
        let mut host = HostGraph::new(48000.0);
        let eq = Equalizer::new(&mut host).unwrap();
        let [bass, middle, treble, presence] = *eq.bands();
        assert_eq!(host.filter_type(bass), Some(FilterType::Lowshelf));
        assert_eq!(host.filter_type(middle), Some(FilterType::Peaking));
        assert_eq!(host.filter_type(treble), Some(FilterType::Highshelf));
        assert_eq!(host.param(presence, ParamName::Frequency).unwrap(), 3000.0);
    }

    #[test]
    fn active_chain_runs_through_all_bands() {
        let mut host = HostGraph::new(48000.0);
        let mut eq = Equalizer::new(&mut host).unwrap();
        eq.set_active(&mut host, true).unwrap();
        let bands = *eq.bands();
        assert!(host.is_connected(eq.input(), bands[0]));
        assert!(host.is_connected(bands[3], eq.output()));
        assert!(!host.is_connected(eq.input(), eq.output()));
    }

    #[test]
    fn treble_gain() {
        let mut host = HostGraph::new(48000.0);
        let mut eq = Equalizer::new(&mut host).unwrap();
        let idx = eq.find_param_by_name("treble").unwrap();
        eq.set_param(&mut host, idx, -12.0).unwrap();
        assert_eq!(eq.get_param(&host, idx).unwrap(), -12.0);
        assert!(eq.set_param(&mut host, idx, 41.0).is_err());
        assert_eq!(eq.get_param(&host, idx).unwrap(), -12.0);
    }
}
