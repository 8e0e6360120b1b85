//! In-memory host audio graph.
//!
//! [`HostGraph`] implements [`AudioHost`] without rendering audio. It keeps the
//! topology (nodes, edges into inputs and parameters), parameter values,
//! scheduled automation, waveshaper curves, convolver buffers and source
//! start/stop times, all driven by a manually advanced clock.
//!
//! It is the deterministic host used by tests and offline tooling: anything a
//! real platform would do with the calls can be observed afterwards through
//! the query methods ([`outputs()`](HostGraph::outputs),
//! [`has_path()`](HostGraph::has_path), [`value_at()`](HostGraph::value_at), ...).
//!
//! Feedback loops are legal (a delay feeding its own input through a gain),
//! so unlike a processing DAG no cycle check is made on connect.
//!
//! Node ids are handed out sequentially and never reused. A node released
//! with [`remove_node()`](AudioHost::remove_node) drops its state and every
//! edge touching it, so replacing single-use sources (LFO oscillators on each
//! restart) keeps the live graph bounded.

use std::collections::VecDeque;

use crate::edge::{Edge, EdgeId, Port};
use crate::error::{HostError, HostResult};
use crate::host::AudioHost;
use crate::node::{FilterType, NodeId, NodeKind, Waveform};
use crate::param::{Automation, ParamName, host_params};

/// State of one parameter on a node.
#[derive(Debug, Clone)]
struct ParamState {
    name: ParamName,
    value: f32,
    range: Option<(f32, f32)>,
    events: Vec<Automation>,
}

/// Internal bookkeeping for a node.
#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    params: Vec<ParamState>,
    /// Edges leaving this node.
    outgoing: Vec<EdgeId>,
    filter_type: FilterType,
    waveform: Waveform,
    curve: Option<Vec<f32>>,
    buffer: Option<Vec<Vec<f32>>>,
    started: Option<f64>,
    stopped: Option<f64>,
}

impl NodeData {
    fn new(kind: NodeKind, sample_rate: f32) -> Self {
        let params = host_params(kind, sample_rate)
            .into_iter()
            .map(|spec| ParamState {
                name: spec.name,
                value: spec.default,
                range: spec.range,
                events: Vec::new(),
            })
            .collect();
        Self {
            kind,
            params,
            outgoing: Vec::new(),
            filter_type: FilterType::default(),
            waveform: Waveform::default(),
            curve: None,
            buffer: None,
            started: None,
            stopped: None,
        }
    }

    fn param(&self, name: ParamName) -> Option<&ParamState> {
        self.params.iter().find(|p| p.name == name)
    }

    fn param_mut(&mut self, name: ParamName) -> Option<&mut ParamState> {
        self.params.iter_mut().find(|p| p.name == name)
    }
}

/// In-memory [`AudioHost`] implementation.
#[derive(Debug, Clone)]
pub struct HostGraph {
    sample_rate: f32,
    current_time: f64,
    nodes: Vec<Option<NodeData>>,
    edges: Vec<Option<Edge>>,
    destination: NodeId,
    listener: NodeId,
}

impl Default for HostGraph {
    fn default() -> Self {
        Self::new(44100.0)
    }
}

impl HostGraph {
    /// Creates an empty graph holding only the destination and listener nodes.
    pub fn new(sample_rate: f32) -> Self {
        let mut graph = Self {
            sample_rate,
            current_time: 0.0,
            nodes: Vec::new(),
            edges: Vec::new(),
            destination: NodeId(0),
            listener: NodeId(0),
        };
        graph.destination = graph.add_node(NodeKind::Destination);
        graph.listener = graph.add_node(NodeKind::Listener);
        graph
    }

    fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(NodeData::new(kind, self.sample_rate)));
        #[cfg(feature = "tracing")]
        tracing::trace!("host_add: {} node {id}", kind.name());
        id
    }

    fn slot(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn get_node(&self, id: NodeId) -> HostResult<&NodeData> {
        self.slot(id).ok_or(HostError::NodeNotFound(id))
    }

    fn get_node_mut(&mut self, id: NodeId) -> HostResult<&mut NodeData> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(HostError::NodeNotFound(id))
    }

    fn get_param_mut(&mut self, node: NodeId, param: ParamName) -> HostResult<&mut ParamState> {
        self.get_node_mut(node)?
            .param_mut(param)
            .ok_or(HostError::UnknownParam { node, param })
    }

    fn validate_connection(&self, from: NodeId, to: Port) -> HostResult<()> {
        let from_kind = self.get_node(from)?.kind;
        let to_node = self.get_node(to.node())?;
        if matches!(from_kind, NodeKind::Destination | NodeKind::Listener) {
            return Err(HostError::InvalidConnection(format!(
                "{} has no output",
                from_kind.name()
            )));
        }
        match to {
            Port::Node(_) => {
                if matches!(to_node.kind, NodeKind::Listener | NodeKind::Oscillator) {
                    return Err(HostError::InvalidConnection(format!(
                        "{} has no input",
                        to_node.kind.name()
                    )));
                }
            }
            Port::Param(node, param) => {
                if to_node.param(param).is_none() {
                    return Err(HostError::UnknownParam { node, param });
                }
            }
        }
        Ok(())
    }

    fn find_edge(&self, from: NodeId, to: Port) -> Option<EdgeId> {
        let node = self.slot(from)?;
        node.outgoing.iter().copied().find(|id| {
            self.edges
                .get(id.0 as usize)
                .and_then(|e| e.as_ref())
                .is_some_and(|e| e.to == to)
        })
    }

    fn connect_port(&mut self, from: NodeId, to: Port) -> HostResult<EdgeId> {
        self.validate_connection(from, to)?;

        if let Some(existing) = self.find_edge(from, to) {
            return Ok(existing);
        }

        let edge_id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(Edge { from, to }));
        self.get_node_mut(from)?.outgoing.push(edge_id);

        #[cfg(feature = "tracing")]
        tracing::trace!("host_connect: {from} → {to:?}");
        Ok(edge_id)
    }

    // --- Clock ---

    /// Moves the clock to `time` seconds.
    pub fn set_current_time(&mut self, time: f64) {
        self.current_time = time;
    }

    /// Advances the clock by `seconds`.
    pub fn advance(&mut self, seconds: f64) {
        self.current_time += seconds;
    }

    /// Overrides the range the host reports for a parameter.
    ///
    /// `None` makes the host report no range at all.
    pub fn set_param_range(
        &mut self,
        node: NodeId,
        param: ParamName,
        range: Option<(f32, f32)>,
    ) -> HostResult<()> {
        self.get_param_mut(node, param)?.range = range;
        Ok(())
    }

    // --- Queries ---

    /// Ports that `node`'s output currently feeds.
    pub fn outputs(&self, node: NodeId) -> Vec<Port> {
        self.slot(node)
            .map(|n| {
                n.outgoing
                    .iter()
                    .filter_map(|id| self.edges.get(id.0 as usize).and_then(|e| e.as_ref()))
                    .map(|e| e.to)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns `true` if `from`'s output feeds `to`'s input directly.
    pub fn is_connected(&self, from: NodeId, to: NodeId) -> bool {
        self.find_edge(from, Port::Node(to)).is_some()
    }

    /// Returns `true` if `from`'s output feeds a parameter of `to`.
    pub fn is_param_connected(&self, from: NodeId, to: NodeId, param: ParamName) -> bool {
        self.find_edge(from, Port::Param(to, param)).is_some()
    }

    /// Returns `true` if audio can flow from `from` to `to` through node inputs.
    pub fn has_path(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            if current == to {
                return true;
            }
            let idx = current.0 as usize;
            if idx >= visited.len() || visited[idx] {
                continue;
            }
            visited[idx] = true;
            for port in self.outputs(current) {
                if let Port::Node(next) = port {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// Automation events currently scheduled on a parameter.
    pub fn automation(&self, node: NodeId, param: ParamName) -> &[Automation] {
        self.slot(node)
            .and_then(|n| n.param(param))
            .map_or(&[], |p| p.events.as_slice())
    }

    /// Value of a parameter at host time `time`, following its automation.
    ///
    /// Linear ramps interpolate from the preceding event; before any event
    /// the static value applies.
    pub fn value_at(&self, node: NodeId, param: ParamName, time: f64) -> Option<f32> {
        let state = self.slot(node)?.param(param)?;
        let mut current = state.value;
        let mut anchor: Option<(f64, f32)> = None;
        for event in &state.events {
            match *event {
                Automation::SetValueAtTime { value, time: at }
                | Automation::LinearRampToValueAtTime { value, time: at }
                    if at <= time =>
                {
                    current = value;
                    anchor = Some((at, value));
                }
                Automation::LinearRampToValueAtTime { value, time: at } => {
                    if let Some((t0, v0)) = anchor
                        && at > t0
                    {
                        let progress = ((time - t0) / (at - t0)) as f32;
                        current = v0 + (value - v0) * progress;
                    }
                    break;
                }
                Automation::SetValueAtTime { .. } => break,
                Automation::CancelScheduledValues { .. } => {}
            }
        }
        Some(current)
    }

    /// Time a source was started at, if it was.
    pub fn start_time(&self, node: NodeId) -> Option<f64> {
        self.slot(node).and_then(|n| n.started)
    }

    /// Time a source was scheduled to stop at, if it was.
    pub fn stop_time(&self, node: NodeId) -> Option<f64> {
        self.slot(node).and_then(|n| n.stopped)
    }

    /// Returns `true` if the source has been started and not yet stopped.
    pub fn is_playing(&self, node: NodeId) -> bool {
        self.slot(node)
            .is_some_and(|n| n.started.is_some() && n.stopped.is_none())
    }

    /// Response type of a biquad node.
    pub fn filter_type(&self, node: NodeId) -> Option<FilterType> {
        self.slot(node)
            .filter(|n| matches!(n.kind, NodeKind::BiquadFilter))
            .map(|n| n.filter_type)
    }

    /// Waveform of an oscillator node.
    pub fn waveform(&self, node: NodeId) -> Option<Waveform> {
        self.slot(node)
            .filter(|n| matches!(n.kind, NodeKind::Oscillator))
            .map(|n| n.waveform)
    }

    /// Transfer curve of a waveshaper node.
    pub fn curve(&self, node: NodeId) -> Option<&[f32]> {
        self.slot(node).and_then(|n| n.curve.as_deref())
    }

    /// Impulse response loaded into a convolver node.
    pub fn buffer(&self, node: NodeId) -> Option<&[Vec<f32>]> {
        self.slot(node).and_then(|n| n.buffer.as_deref())
    }

    /// Number of live nodes (including destination and listener).
    ///
    /// Removed nodes are not counted; their ids are never handed out again.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_some()).count()
    }

    /// Number of nodes of a given kind.
    pub fn count_kind(&self, kind: NodeKind) -> usize {
        self.nodes.iter().flatten().filter(|n| n.kind == kind).count()
    }
}

impl AudioHost for HostGraph {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn destination(&self) -> NodeId {
        self.destination
    }

    fn listener(&self) -> NodeId {
        self.listener
    }

    fn create_node(&mut self, kind: NodeKind) -> NodeId {
        self.add_node(kind)
    }

    fn node_kind(&self, node: NodeId) -> HostResult<NodeKind> {
        Ok(self.get_node(node)?.kind)
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> HostResult<EdgeId> {
        self.connect_port(from, Port::Node(to))
    }

    fn connect_param(&mut self, from: NodeId, to: NodeId, param: ParamName) -> HostResult<EdgeId> {
        self.connect_port(from, Port::Param(to, param))
    }

    fn disconnect(&mut self, node: NodeId) -> HostResult<()> {
        let outgoing = std::mem::take(&mut self.get_node_mut(node)?.outgoing);
        for edge in outgoing {
            if let Some(slot) = self.edges.get_mut(edge.0 as usize) {
                *slot = None;
            }
        }
        #[cfg(feature = "tracing")]
        tracing::trace!("host_disconnect: {node}");
        Ok(())
    }

    fn remove_node(&mut self, node: NodeId) -> HostResult<()> {
        if node == self.destination || node == self.listener {
            return Err(HostError::Unsupported {
                node,
                what: "removal",
            });
        }
        self.get_node(node)?;

        for slot in &mut self.edges {
            if slot.is_some_and(|e| e.from == node || e.to.node() == node) {
                *slot = None;
            }
        }
        let edges = &self.edges;
        for data in self.nodes.iter_mut().flatten() {
            data.outgoing
                .retain(|id| edges.get(id.0 as usize).is_some_and(Option::is_some));
        }
        self.nodes[node.0 as usize] = None;

        #[cfg(feature = "tracing")]
        tracing::trace!("host_remove: {node}");
        Ok(())
    }

    fn param(&self, node: NodeId, param: ParamName) -> HostResult<f32> {
        self.get_node(node)?
            .param(param)
            .map(|p| p.value)
            .ok_or(HostError::UnknownParam { node, param })
    }

    fn param_range(&self, node: NodeId, param: ParamName) -> Option<(f32, f32)> {
        self.slot(node)
            .and_then(|n| n.param(param))
            .and_then(|p| p.range)
    }

    fn set_param(&mut self, node: NodeId, param: ParamName, value: f32) -> HostResult<()> {
        self.get_param_mut(node, param)?.value = value;
        Ok(())
    }

    fn schedule(&mut self, node: NodeId, param: ParamName, event: Automation) -> HostResult<()> {
        let state = self.get_param_mut(node, param)?;
        match event {
            Automation::CancelScheduledValues { time } => {
                state.events.retain(|e| e.time() < time);
            }
            _ => state.events.push(event),
        }
        Ok(())
    }

    fn set_filter_type(&mut self, node: NodeId, filter_type: FilterType) -> HostResult<()> {
        let data = self.get_node_mut(node)?;
        if !matches!(data.kind, NodeKind::BiquadFilter) {
            return Err(HostError::Unsupported {
                node,
                what: "filter type",
            });
        }
        data.filter_type = filter_type;
        Ok(())
    }

    fn set_waveform(&mut self, node: NodeId, waveform: Waveform) -> HostResult<()> {
        let data = self.get_node_mut(node)?;
        if !matches!(data.kind, NodeKind::Oscillator) {
            return Err(HostError::Unsupported {
                node,
                what: "waveform",
            });
        }
        data.waveform = waveform;
        Ok(())
    }

    fn set_curve(&mut self, node: NodeId, curve: Vec<f32>) -> HostResult<()> {
        let data = self.get_node_mut(node)?;
        if !matches!(data.kind, NodeKind::WaveShaper) {
            return Err(HostError::Unsupported { node, what: "curve" });
        }
        data.curve = Some(curve);
        Ok(())
    }

    fn set_buffer(&mut self, node: NodeId, channels: Vec<Vec<f32>>) -> HostResult<()> {
        let data = self.get_node_mut(node)?;
        if !matches!(data.kind, NodeKind::Convolver) {
            return Err(HostError::Unsupported {
                node,
                what: "buffer",
            });
        }
        data.buffer = Some(channels);
        Ok(())
    }

    fn start(&mut self, node: NodeId, when: f64) -> HostResult<()> {
        let data = self.get_node_mut(node)?;
        if !data.kind.is_source() {
            return Err(HostError::NotASource(node));
        }
        if data.started.is_some() {
            return Err(HostError::AlreadyStarted(node));
        }
        data.started = Some(when);
        #[cfg(feature = "tracing")]
        tracing::trace!("host_start: {node} at {when}");
        Ok(())
    }

    fn stop(&mut self, node: NodeId, when: f64) -> HostResult<()> {
        let data = self.get_node_mut(node)?;
        if !data.kind.is_source() {
            return Err(HostError::NotASource(node));
        }
        if data.started.is_none() {
            return Err(HostError::NotStarted(node));
        }
        data.stopped = Some(when);
        #[cfg(feature = "tracing")]
        tracing::trace!("host_stop: {node} at {when}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_graph_has_destination_and_listener() {
        let graph = HostGraph::new(48000.0);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node_kind(graph.destination()), Ok(NodeKind::Destination));
        assert_eq!(graph.node_kind(graph.listener()), Ok(NodeKind::Listener));
    }

    #[test]
    fn connect_is_idempotent() {
        let mut graph = HostGraph::new(48000.0);
        let a = graph.create_node(NodeKind::Gain);
        let dest = graph.destination();
        let first = graph.connect(a, dest).unwrap();
        let second = graph.connect(a, dest).unwrap();
        assert_eq!(first, second);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn disconnect_clears_outgoing_only() {
        let mut graph = HostGraph::new(48000.0);
        let a = graph.create_node(NodeKind::Gain);
        let b = graph.create_node(NodeKind::Gain);
        let dest = graph.destination();
        graph.connect(a, b).unwrap();
        graph.connect(b, dest).unwrap();

        graph.disconnect(a).unwrap();
        assert!(!graph.is_connected(a, b));
        assert!(graph.is_connected(b, dest));
    }

    #[test]
    fn remove_node_drops_edges_both_ways() {
        let mut graph = HostGraph::new(48000.0);
        let osc = graph.create_node(NodeKind::Oscillator);
        let depth = graph.create_node(NodeKind::Gain);
        let pan = graph.create_node(NodeKind::StereoPanner);
        graph.connect(osc, depth).unwrap();
        graph.connect_param(depth, pan, ParamName::Pan).unwrap();
        let dest = graph.destination();
        graph.connect(pan, dest).unwrap();

        graph.remove_node(depth).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.outputs(osc).is_empty());
        assert_eq!(graph.node_kind(depth), Err(HostError::NodeNotFound(depth)));
        assert_eq!(graph.remove_node(depth), Err(HostError::NodeNotFound(depth)));

        let next = graph.create_node(NodeKind::Gain);
        assert_ne!(next, depth);
        assert!(graph.connect(osc, next).is_ok());
    }

    #[test]
    fn fixed_nodes_cannot_be_removed() {
        let mut graph = HostGraph::new(48000.0);
        let dest = graph.destination();
        assert!(matches!(
            graph.remove_node(dest),
            Err(HostError::Unsupported { what: "removal", .. })
        ));
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn destination_has_no_output() {
        let mut graph = HostGraph::new(48000.0);
        let a = graph.create_node(NodeKind::Gain);
        let dest = graph.destination();
        assert!(matches!(
            graph.connect(dest, a),
            Err(HostError::InvalidConnection(_))
        ));
    }

    #[test]
    fn connect_param_requires_existing_param() {
        let mut graph = HostGraph::new(48000.0);
        let lfo = graph.create_node(NodeKind::Gain);
        let pan = graph.create_node(NodeKind::StereoPanner);
        assert!(graph.connect_param(lfo, pan, ParamName::Pan).is_ok());
        assert!(graph.is_param_connected(lfo, pan, ParamName::Pan));
        assert_eq!(
            graph.connect_param(lfo, pan, ParamName::Frequency),
            Err(HostError::UnknownParam {
                node: pan,
                param: ParamName::Frequency
            })
        );
    }

    #[test]
    fn feedback_loops_are_allowed() {
        let mut graph = HostGraph::new(48000.0);
        let delay = graph.create_node(NodeKind::Delay { max_time: 1.0 });
        let feedback = graph.create_node(NodeKind::Gain);
        graph.connect(delay, feedback).unwrap();
        assert!(graph.connect(feedback, delay).is_ok());
        assert!(graph.has_path(feedback, feedback));
    }

    #[test]
    fn has_path_follows_node_edges() {
        let mut graph = HostGraph::new(48000.0);
        let a = graph.create_node(NodeKind::Gain);
        let b = graph.create_node(NodeKind::BiquadFilter);
        let dest = graph.destination();
        graph.connect(a, b).unwrap();
        graph.connect(b, dest).unwrap();
        assert!(graph.has_path(a, dest));
        assert!(!graph.has_path(dest, a));
    }

    #[test]
    fn sources_start_once() {
        let mut graph = HostGraph::new(48000.0);
        let osc = graph.create_node(NodeKind::Oscillator);
        assert_eq!(graph.stop(osc, 0.0), Err(HostError::NotStarted(osc)));
        graph.start(osc, 1.0).unwrap();
        assert!(graph.is_playing(osc));
        assert_eq!(graph.start(osc, 2.0), Err(HostError::AlreadyStarted(osc)));
        graph.stop(osc, 3.0).unwrap();
        assert_eq!(graph.start_time(osc), Some(1.0));
        assert_eq!(graph.stop_time(osc), Some(3.0));
        assert!(!graph.is_playing(osc));
    }

    #[test]
    fn non_sources_cannot_start() {
        let mut graph = HostGraph::new(48000.0);
        let gain = graph.create_node(NodeKind::Gain);
        assert_eq!(graph.start(gain, 0.0), Err(HostError::NotASource(gain)));
    }

    #[test]
    fn cancel_drops_later_events() {
        let mut graph = HostGraph::new(48000.0);
        let filter = graph.create_node(NodeKind::BiquadFilter);
        let f = ParamName::Frequency;
        graph
            .schedule(filter, f, Automation::SetValueAtTime { value: 100.0, time: 0.0 })
            .unwrap();
        graph
            .schedule(filter, f, Automation::LinearRampToValueAtTime { value: 200.0, time: 1.0 })
            .unwrap();
        graph
            .schedule(filter, f, Automation::CancelScheduledValues { time: 0.5 })
            .unwrap();
        assert_eq!(graph.automation(filter, f).len(), 1);
    }

    #[test]
    fn value_at_interpolates_ramps() {
        let mut graph = HostGraph::new(48000.0);
        let gain = graph.create_node(NodeKind::Gain);
        let g = ParamName::Gain;
        graph
            .schedule(gain, g, Automation::SetValueAtTime { value: 0.0, time: 1.0 })
            .unwrap();
        graph
            .schedule(gain, g, Automation::LinearRampToValueAtTime { value: 1.0, time: 2.0 })
            .unwrap();

        assert_eq!(graph.value_at(gain, g, 0.5), Some(1.0));
        assert_eq!(graph.value_at(gain, g, 1.0), Some(0.0));
        assert_eq!(graph.value_at(gain, g, 1.5), Some(0.5));
        assert_eq!(graph.value_at(gain, g, 3.0), Some(1.0));
    }

    #[test]
    fn curve_only_on_waveshaper() {
        let mut graph = HostGraph::new(48000.0);
        let shaper = graph.create_node(NodeKind::WaveShaper);
        let gain = graph.create_node(NodeKind::Gain);
        graph.set_curve(shaper, vec![0.0, 1.0]).unwrap();
        assert_eq!(graph.curve(shaper), Some([0.0, 1.0].as_slice()));
        assert!(graph.set_curve(gain, vec![0.0]).is_err());
    }

    #[test]
    fn range_override() {
        let mut graph = HostGraph::new(48000.0);
        let gain = graph.create_node(NodeKind::Gain);
        assert_eq!(graph.param_range(gain, ParamName::Gain), None);
        graph
            .set_param_range(gain, ParamName::Gain, Some((0.0, 2.0)))
            .unwrap();
        assert_eq!(graph.param_range(gain, ParamName::Gain), Some((0.0, 2.0)));
    }
}
