//! Low-frequency oscillator routed into host parameters.
//!
//! ```text
//! Oscillator (rate, waveform) → depth Gain ─┬→ target param
//!                                           └→ target param ...
//! ```
//!
//! Host oscillators are single-use sources, so every [`start()`](Lfo::start)
//! creates a fresh oscillator node and removes the one it replaces. The depth
//! gain and its parameter connections live as long as the LFO.
//!
//! The oscillator runs whether or not the owning effect is switched on; bypass
//! only reroutes audio around the modulated nodes.

use tonewire_core::{AudioHost, HostResult, NodeId, NodeKind, ParamName, Waveform};

/// LFO modulating one or more host parameters.
#[derive(Debug, Clone)]
pub struct Lfo {
    osc: Option<NodeId>,
    depth_node: NodeId,
    targets: Vec<(NodeId, ParamName)>,
    rate: f32,
    depth: f32,
    scale: f32,
    waveform: Waveform,
    running: bool,
}

impl Lfo {
    /// Creates the depth gain and connects it to every target.
    ///
    /// The depth gain carries `depth * scale`, so `scale` converts the
    /// normalized depth into the target's units (e.g. seconds of delay).
    pub fn new(
        host: &mut dyn AudioHost,
        targets: &[(NodeId, ParamName)],
        scale: f32,
    ) -> HostResult<Self> {
        let depth_node = host.create_node(NodeKind::Gain);
        host.set_param(depth_node, ParamName::Gain, 0.0)?;
        let lfo = Self {
            osc: None,
            depth_node,
            targets: targets.to_vec(),
            rate: 0.0,
            depth: 0.0,
            scale,
            waveform: Waveform::Sine,
            running: false,
        };
        lfo.connect_targets(host)?;
        Ok(lfo)
    }

    fn connect_targets(&self, host: &mut dyn AudioHost) -> HostResult<()> {
        for &(node, param) in &self.targets {
            host.connect_param(self.depth_node, node, param)?;
        }
        Ok(())
    }

    /// Replaces the modulated parameters.
    pub fn retarget(
        &mut self,
        host: &mut dyn AudioHost,
        targets: &[(NodeId, ParamName)],
    ) -> HostResult<()> {
        host.disconnect(self.depth_node)?;
        self.targets = targets.to_vec();
        self.connect_targets(host)
    }

    /// Starts a fresh oscillator at `when`, stopping and removing the
    /// previous one.
    pub fn start(&mut self, host: &mut dyn AudioHost, when: f64) -> HostResult<()> {
        if let Some(old) = self.osc.take() {
            if self.running {
                host.stop(old, when)?;
            }
            host.remove_node(old)?;
        }

        let osc = host.create_node(NodeKind::Oscillator);
        host.set_param(osc, ParamName::Frequency, self.rate)?;
        host.set_waveform(osc, self.waveform)?;
        host.connect(osc, self.depth_node)?;
        host.start(osc, when)?;

        self.osc = Some(osc);
        self.running = true;
        Ok(())
    }

    /// Stops the running oscillator at `when`. No-op when not running.
    pub fn stop(&mut self, host: &mut dyn AudioHost, when: f64) -> HostResult<()> {
        if let Some(osc) = self.osc
            && self.running
        {
            host.stop(osc, when)?;
        }
        self.running = false;
        Ok(())
    }

    /// Whether an oscillator is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current oscillator node, if one was started.
    pub fn oscillator(&self) -> Option<NodeId> {
        self.osc
    }

    /// Depth gain node.
    pub fn depth_node(&self) -> NodeId {
        self.depth_node
    }

    /// Modulation rate in Hz.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Sets the rate, updating a live oscillator.
    pub fn set_rate(&mut self, host: &mut dyn AudioHost, rate: f32) -> HostResult<()> {
        self.rate = rate;
        if let Some(osc) = self.osc {
            host.set_param(osc, ParamName::Frequency, rate)?;
        }
        Ok(())
    }

    /// Normalized modulation depth.
    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Sets the normalized depth.
    pub fn set_depth(&mut self, host: &mut dyn AudioHost, depth: f32) -> HostResult<()> {
        self.depth = depth;
        host.set_param(self.depth_node, ParamName::Gain, self.depth * self.scale)
    }

    /// Sets the depth-to-target scale factor.
    pub fn set_scale(&mut self, host: &mut dyn AudioHost, scale: f32) -> HostResult<()> {
        self.scale = scale;
        host.set_param(self.depth_node, ParamName::Gain, self.depth * self.scale)
    }

    /// Oscillator waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Sets the waveform, updating a live oscillator.
    pub fn set_waveform(&mut self, host: &mut dyn AudioHost, waveform: Waveform) -> HostResult<()> {
        self.waveform = waveform;
        if let Some(osc) = self.osc {
            host.set_waveform(osc, waveform)?;
        }
        Ok(())
    }

    /// Nodes owned by the LFO.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = vec![self.depth_node];
        nodes.extend(self.osc);
        nodes
    }
}
