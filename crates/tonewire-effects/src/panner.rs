//! 3D spatial panner.
//!
//! Positions the signal in space relative to the host listener. Distance
//! attenuation and cone parameters are forwarded to the host panner node.

use tonewire_core::{AudioHost, NodeId, NodeKind, ParamDescriptor, ParamName, ParamUnit};

use crate::effector::{EffectIo, Effector, validate_param};
use crate::error::{EffectError, EffectResult};

const PARAMS: [(ParamDescriptor, ParamName); 9] = [
    (
        ParamDescriptor::new("x", ParamUnit::Distance, -1000.0, 1000.0, 0.0),
        ParamName::PositionX,
    ),
    (
        ParamDescriptor::new("y", ParamUnit::Distance, -1000.0, 1000.0, 0.0),
        ParamName::PositionY,
    ),
    (
        ParamDescriptor::new("z", ParamUnit::Distance, -1000.0, 1000.0, 0.0),
        ParamName::PositionZ,
    ),
    (
        ParamDescriptor::new("refdistance", ParamUnit::Distance, 0.0, 10000.0, 1.0),
        ParamName::RefDistance,
    ),
    (
        ParamDescriptor::new("maxdistance", ParamUnit::Distance, 0.0, 10000.0, 10000.0),
        ParamName::MaxDistance,
    ),
    (
        ParamDescriptor::new("rolloff", ParamUnit::None, 0.0, 100.0, 1.0),
        ParamName::RolloffFactor,
    ),
    (
        ParamDescriptor::new("coneinner", ParamUnit::Degrees, 0.0, 360.0, 360.0),
        ParamName::ConeInnerAngle,
    ),
    (
        ParamDescriptor::new("coneouter", ParamUnit::Degrees, 0.0, 360.0, 360.0),
        ParamName::ConeOuterAngle,
    ),
    (
        ParamDescriptor::ratio("coneoutergain", 0.0),
        ParamName::ConeOuterGain,
    ),
];

/// Host spatial panner. Active by default.
#[derive(Debug, Clone)]
pub struct Panner {
    io: EffectIo,
    panner: NodeId,
}

impl Panner {
    /// Creates the panner and wires it in.
    pub fn new(host: &mut dyn AudioHost) -> EffectResult<Self> {
        let io = EffectIo::new(host, true);
        let panner = host.create_node(NodeKind::Panner);
        for (desc, param) in &PARAMS {
            host.set_param(panner, *param, desc.default)?;
        }
        let effect = Self { io, panner };
        effect.wire(host)?;
        Ok(effect)
    }

    fn wire(&self, host: &mut dyn AudioHost) -> EffectResult<()> {
        Ok(self.io.series(host, &[self.panner])?)
    }

    /// Moves the source to `(x, y, z)` in one call.
    pub fn set_position(
        &mut self,
        host: &mut dyn AudioHost,
        x: f32,
        y: f32,
        z: f32,
    ) -> EffectResult<()> {
        for (index, value) in [x, y, z].into_iter().enumerate() {
            validate_param(self, index, value)?;
        }
        for (index, value) in [x, y, z].into_iter().enumerate() {
            host.set_param(self.panner, PARAMS[index].1, value)?;
        }
        Ok(())
    }

    /// The host panner node.
    pub fn node(&self) -> NodeId {
        self.panner
    }
}

impl Effector for Panner {
    fn kind(&self) -> &'static str {
        "panner"
    }

    fn input(&self) -> NodeId {
        self.io.input
    }

    fn output(&self) -> NodeId {
        self.io.output
    }

    fn nodes(&self) -> Vec<NodeId> {
        vec![self.io.input, self.io.output, self.panner]
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
        Ok(host.param(self.panner, *param)?)
    }

    fn set_param(
        &mut self,
        host: &mut dyn AudioHost,
        index: usize,
        value: f32,
    ) -> EffectResult<()> {
        validate_param(self, index, value)?;
        Ok(host.set_param(self.panner, PARAMS[index].1, value)?)
    }
}
