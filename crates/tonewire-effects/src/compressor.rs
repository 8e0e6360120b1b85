//! Dynamics compressor.
//!
//! Wraps the host's compressor node; every parameter is a host parameter.
//!
//! # Signal Flow
//!
//! ```text
//! Input → DynamicsCompressor → Output
//! ```
//!
//! # Parameters
//!
//! | Parameter | Range | Default |
//! |-----------|-------|---------|
//! | threshold | -100 to 0 dB | -24 |
//! | knee | 0 to 40 dB | 30 |
//! | ratio | 1 to 20 | 12 |
//! | attack | 0 to 1 s | 0.003 |
//! | release | 0 to 1 s | 0.25 |

use tonewire_core::{AudioHost, NodeId, NodeKind, ParamDescriptor, ParamName, ParamUnit};

use crate::effector::{EffectIo, Effector, validate_param};
use crate::error::{EffectError, EffectResult};

const PARAMS: [(ParamDescriptor, ParamName); 5] = [
    (
        ParamDescriptor::decibels("threshold", -100.0, 0.0, -24.0),
        ParamName::Threshold,
    ),
    (
        ParamDescriptor::decibels("knee", 0.0, 40.0, 30.0),
        ParamName::Knee,
    ),
    (
        ParamDescriptor::new("ratio", ParamUnit::None, 1.0, 20.0, 12.0),
        ParamName::Ratio,
    ),
    (
        ParamDescriptor::seconds("attack", 0.0, 1.0, 0.003),
        ParamName::Attack,
    ),
    (
        ParamDescriptor::seconds("release", 0.0, 1.0, 0.25),
        ParamName::Release,
    ),
];

/// Host dynamics compressor. Active by default.
#[derive(Debug, Clone)]
pub struct Compressor {
    io: EffectIo,
    compressor: NodeId,
}

impl Compressor {
    /// Creates the compressor and wires it in.
    pub fn new(host: &mut dyn AudioHost) -> EffectResult<Self> {
        let io = EffectIo::new(host, true);
        let compressor = host.create_node(NodeKind::DynamicsCompressor);
        for (desc, param) in &PARAMS {
            host.set_param(compressor, *param, desc.default)?;
        }
        let effect = Self { io, compressor };
        effect.wire(host)?;
        Ok(effect)
    }

    fn wire(&self, host: &mut dyn AudioHost) -> EffectResult<()> {
        Ok(self.io.series(host, &[self.compressor])?)
    }

    /// The host compressor node.
    pub fn node(&self) -> NodeId {
        self.compressor
    }
}

impl Effector for Compressor {
    fn kind(&self) -> &'static str {
        "compressor"
    }

    fn input(&self) -> NodeId {
        self.io.input
    }

    fn output(&self) -> NodeId {
        self.io.output
    }

    fn nodes(&self) -> Vec<NodeId> {
        vec![self.io.input, self.io.output, self.compressor]
    }

    fn is_active(&self) -> bool {
        self.io.is_active()
    }

    fn set_active(&mut self, host: &mut dyn AudioHost, active: bool) -> EffectResult<()> {
        self.io.set_active(active);
        self.wire(host)
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
        Ok(host.param(self.compressor, *param)?)
    }

    fn set_param(
        &mut self,
        host: &mut dyn AudioHost,
        index: usize,
        value: f32,
    ) -> EffectResult<()> {
        validate_param(self, index, value)?;
        Ok(host.set_param(self.compressor, PARAMS[index].1, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonewire_core::HostGraph;

    #[test]
    fn active_by_default() {
        let mut host = HostGraph::new(48000.0);
        let comp = Compressor::new(&mut host).unwrap();
        assert!(comp.is_active());
        assert!(host.is_connected(comp.input(), comp.node()));
        assert!(host.is_connected(comp.node(), comp.output()));
    }

    #[test]
    fn bypass_routes_around() {
        let mut host = HostGraph::new(48000.0);
        let mut comp = Compressor::new(&mut host).unwrap();
        comp.set_active(&mut host, false).unwrap();
        assert!(host.is_connected(comp.input(), comp.output()));
        assert!(!host.is_connected(comp.input(), comp.node()));
    }

    #[test]
    fn threshold_writes_host_param() {
        let mut host = HostGraph::new(48000.0);
        let mut comp = Compressor::new(&mut host).unwrap();
        let idx = comp.find_param_by_name("Threshold").unwrap();
        comp.set_param(&mut host, idx, -40.0).unwrap();
        assert_eq!(host.param(comp.node(), ParamName::Threshold).unwrap(), -40.0);
        assert_eq!(comp.get_param(&host, idx).unwrap(), -40.0);
    }

    #[test]
    fn out_of_range_ratio_is_rejected() {
        let mut host = HostGraph::new(48000.0);
        let mut comp = Compressor::new(&mut host).unwrap();
        let idx = comp.find_param_by_name("ratio").unwrap();
        let err = comp.set_param(&mut host, idx, 40.0).unwrap_err();
        assert!(matches!(err, EffectError::OutOfRange { param: "ratio", .. }));
        assert_eq!(comp.get_param(&host, idx).unwrap(), 12.0);
    }

    #[test]
    fn snapshot_lists_all_params() {
        let mut host = HostGraph::new(48000.0);
        let comp = Compressor::new(&mut host).unwrap();
        let snap = comp.snapshot(&host).unwrap();
        assert_eq!(snap.kind, "compressor");
        assert!(snap.active);
        assert_eq!(snap.params.len(), 5);
        assert_eq!(snap.params["knee"], 30.0);
    }
}
