//! Session sender tap.
//!
//! A gain node hung off the master volume from which a network relay pulls
//! audio. The relay itself lives outside tonewire; this module only tracks
//! whether one is attached.

use tonewire_core::{AudioHost, NodeId, NodeKind, ParamDescriptor};

use crate::effector::Effector;
use crate::error::{EffectError, EffectResult};

/// Sender tap for session relays.
#[derive(Debug, Clone)]
pub struct Session {
    sender: NodeId,
    connected: bool,
}

impl Session {
    /// Creates the sender node.
    pub fn new(host: &mut dyn AudioHost) -> Self {
        Self {
            sender: host.create_node(NodeKind::Gain),
            connected: false,
        }
    }

    /// The sender node.
    pub fn sender(&self) -> NodeId {
        self.sender
    }

    /// Whether a relay is attached.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Records a relay attaching or detaching.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Effector for Session {
    fn kind(&self) -> &'static str {
        "session"
    }

    fn input(&self) -> NodeId {
        self.sender
    }

    fn output(&self) -> NodeId {
        self.sender
    }

    fn nodes(&self) -> Vec<NodeId> {
        vec![self.sender]
    }

    fn is_active(&self) -> bool {
        self.connected
    }

    fn set_active(&mut self, _host: &mut dyn AudioHost, active: bool) -> EffectResult<()> {
        self.connected = active;
        Ok(())
    }

    fn param_count(&self) -> usize {
        0
    }

    fn param_info(&self, _index: usize) -> Option<ParamDescriptor> {
        None
    }

    fn get_param(&self, _host: &dyn AudioHost, index: usize) -> EffectResult<f32> {
        Err(EffectError::UnknownParam {
            effect: self.kind(),
            index,
        })
    }

    fn set_param(
        &mut self,
        _host: &mut dyn AudioHost,
        index: usize,
        _value: f32,
    ) -> EffectResult<()> {
        Err(EffectError::UnknownParam {
            effect: self.kind(),
            index,
        })
    }
}
