//! Spatial listener.
//!
//! Wraps the host's listener: the position and orientation every
//! [`Panner`](crate::Panner) is heard from. The listener is not a chain
//! element; its input and output are the host listener node itself, which
//! accepts no connections.

use tonewire_core::{AudioHost, NodeId, ParamDescriptor, ParamName, ParamUnit};

use crate::effector::{Effector, validate_param};
use crate::error::{EffectError, EffectResult};

const fn axis(name: &'static str, default: f32) -> ParamDescriptor {
    ParamDescriptor::new(name, ParamUnit::Distance, -1000.0, 1000.0, default)
}

const PARAMS: [(ParamDescriptor, ParamName); 9] = [
    (axis("x", 0.0), ParamName::PositionX),
    (axis("y", 0.0), ParamName::PositionY),
    (axis("z", 0.0), ParamName::PositionZ),
    (axis("fx", 0.0), ParamName::ForwardX),
    (axis("fy", 0.0), ParamName::ForwardY),
    (axis("fz", -1.0), ParamName::ForwardZ),
    (axis("ux", 0.0), ParamName::UpX),
    (axis("uy", 1.0), ParamName::UpY),
    (axis("uz", 0.0), ParamName::UpZ),
];

/// Host listener position and orientation.
#[derive(Debug, Clone)]
pub struct Listener {
    node: NodeId,
}

impl Listener {
    /// Binds to the host listener and resets it to the defaults.
    pub fn new(host: &mut dyn AudioHost) -> EffectResult<Self> {
        let node = host.listener();
        for (desc, param) in &PARAMS {
            host.set_param(node, *param, desc.default)?;
        }
        Ok(Self { node })
    }

    fn set_group(
        &mut self,
        host: &mut dyn AudioHost,
        first: usize,
        values: [f32; 3],
    ) -> EffectResult<()> {
        for (offset, value) in values.into_iter().enumerate() {
            validate_param(self, first + offset, value)?;
        }
        for (offset, value) in values.into_iter().enumerate() {
            host.set_param(self.node, PARAMS[first + offset].1, value)?;
        }
        Ok(())
    }

    /// Moves the listener.
    pub fn set_position(
        &mut self,
        host: &mut dyn AudioHost,
        x: f32,
        y: f32,
        z: f32,
    ) -> EffectResult<()> {
        self.set_group(host, 0, [x, y, z])
    }

    /// Points the listener along `forward` with `up` as its top.
    pub fn set_orientation(
        &mut self,
        host: &mut dyn AudioHost,
        forward: [f32; 3],
        up: [f32; 3],
    ) -> EffectResult<()> {
        self.set_group(host, 3, forward)?;
        self.set_group(host, 6, up)
    }
}

impl Effector for Listener {
    fn kind(&self) -> &'static str {
        "listener"
    }

    fn input(&self) -> NodeId {
        self.node
    }

    fn output(&self) -> NodeId {
        self.node
    }

    /// The host owns the listener node.
    fn nodes(&self) -> Vec<NodeId> {
        Vec::new()
    }

    fn is_active(&self) -> bool {
        true
    }

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
        Ok(host.param(self.node, *param)?)
    }

    fn set_param(
        &mut self,
        host: &mut dyn AudioHost,
        index: usize,
        value: f32,
    ) -> EffectResult<()> {
        validate_param(self, index, value)?;
        Ok(host.set_param(self.node, PARAMS[index].1, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonewire_core::HostGraph;

    #[test]
    fn binds_to_host_listener() {
        let mut host = HostGraph::new(48000.0);
        let listener = Listener::new(&mut host).unwrap();
        assert_eq!(listener.input(), host.listener());
        assert!(listener.nodes().is_empty());
        assert_eq!(listener.get_param(&host, 5).unwrap(), -1.0);
        assert_eq!(listener.get_param(&host, 7).unwrap(), 1.0);
    }

    #[test]
    fn cannot_be_switched() {
        let mut host = HostGraph::new(48000.0);
        let mut listener = Listener::new(&mut host).unwrap();
        assert!(matches!(
            listener.set_active(&mut host, false),
            Err(EffectError::NotSwitchable { effect: "listener" })
        ));
        assert!(listener.is_active());
    }

    #[test]
    fn orientation_rejects_whole_group() {
        let mut host = HostGraph::new(48000.0);
        let mut listener = Listener::new(&mut host).unwrap();
        listener
            .set_orientation(&mut host, [0.0, 0.0, 1.0], [0.0, 1.0, 0.0])
            .unwrap();
        assert_eq!(host.param(host.listener(), ParamName::ForwardZ).unwrap(), 1.0);

        assert!(
            listener
                .set_orientation(&mut host, [2000.0, 0.0, 0.0], [0.0, 1.0, 0.0])
                .is_err()
        );
        assert_eq!(host.param(host.listener(), ParamName::ForwardX).unwrap(), 0.0);
    }

    #[test]
    fn position_by_name() {
        let mut host = HostGraph::new(48000.0);
        let mut listener = Listener::new(&mut host).unwrap();
        listener.set_position(&mut host, 1.0, 2.0, 3.0).unwrap();
        let snap = listener.snapshot(&host).unwrap();
        assert_eq!(snap.params["y"], 2.0);
    }
}
