//! Recording tap.
//!
//! The recorder owns a script-processor node hung off the master volume. The
//! host's processing callback hands captured blocks to
//! [`capture()`](Recorder::capture), which appends them to the active track
//! while recording.
//!
//! Tracks are numbered `0..track_count`. A track must be made ready before
//! recording starts.

use tonewire_core::{AudioHost, NodeId, NodeKind, ParamDescriptor};

use crate::effector::Effector;
use crate::error::{EffectError, EffectResult};

/// Most tracks a recorder can hold.
pub const MAX_TRACKS: usize = 10;

/// Recording state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// No track selected.
    #[default]
    Idle,
    /// A track is selected and waiting.
    Ready,
    /// Captured blocks are appended to the active track.
    Recording,
}

/// Per-track capture buffer with a recording state machine.
#[derive(Debug, Clone)]
pub struct Recorder {
    processor: NodeId,
    tracks: Vec<Vec<Vec<f32>>>,
    active_track: Option<usize>,
    state: RecordingState,
}

impl Recorder {
    /// Creates the tap node with `buffer_size` frames per callback.
    pub fn new(host: &mut dyn AudioHost, buffer_size: u32) -> Self {
        Self {
            processor: host.create_node(NodeKind::ScriptProcessor { buffer_size }),
            tracks: Vec::new(),
            active_track: None,
            state: RecordingState::Idle,
        }
    }

    /// Selects `track` for recording, creating empty tracks up to it.
    ///
    /// Fails for indices at or beyond [`MAX_TRACKS`] and while recording.
    pub fn ready(&mut self, track: usize) -> EffectResult<()> {
        if track >= MAX_TRACKS {
            return Err(self.invalid(track as f32, "track index out of range"));
        }
        if self.state == RecordingState::Recording {
            return Err(self.invalid(track as f32, "cannot change track while recording"));
        }
        if self.tracks.len() <= track {
            self.tracks.resize_with(track + 1, Vec::new);
        }
        self.active_track = Some(track);
        self.state = RecordingState::Ready;
        Ok(())
    }

    /// Begins appending captured blocks to the active track.
    pub fn start_recording(&mut self) -> EffectResult<()> {
        match self.state {
            RecordingState::Idle => Err(self.invalid(0.0, "no track is ready")),
            RecordingState::Ready | RecordingState::Recording => {
                self.state = RecordingState::Recording;
                Ok(())
            }
        }
    }

    /// Stops appending. The active track stays selected.
    pub fn stop_recording(&mut self) {
        if self.state == RecordingState::Recording {
            self.state = RecordingState::Ready;
        }
    }

    /// Appends one block of per-channel samples to the active track.
    ///
    /// Returns `false` (and drops the block) when not recording.
    pub fn capture(&mut self, channels: &[&[f32]]) -> bool {
        let Some(track) = self.active_track else {
            return false;
        };
        if self.state != RecordingState::Recording {
            return false;
        }
        let buffers = &mut self.tracks[track];
        if buffers.len() < channels.len() {
            buffers.resize_with(channels.len(), Vec::new);
        }
        for (buffer, block) in buffers.iter_mut().zip(channels) {
            buffer.extend_from_slice(block);
        }
        true
    }

    /// Clears one track, or every track with `None`.
    pub fn clear(&mut self, track: Option<usize>) {
        match track {
            Some(index) => {
                if let Some(buffers) = self.tracks.get_mut(index) {
                    buffers.clear();
                }
            }
            None => self.tracks.iter_mut().for_each(Vec::clear),
        }
    }

    /// Captured channels of a track.
    pub fn track(&self, index: usize) -> Option<&[Vec<f32>]> {
        self.tracks.get(index).map(Vec::as_slice)
    }

    /// Number of tracks created so far.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Selected track, if any.
    pub fn active_track(&self) -> Option<usize> {
        self.active_track
    }

    /// Current recording state.
    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// The tap node.
    pub fn processor(&self) -> NodeId {
        self.processor
    }

    fn invalid(&self, value: f32, reason: &'static str) -> EffectError {
        EffectError::InvalidValue {
            effect: "recorder",
            param: "track",
            value,
            reason,
        }
    }
}

impl Effector for Recorder {
    fn kind(&self) -> &'static str {
        "recorder"
    }

    fn input(&self) -> NodeId {
        self.processor
    }

    fn output(&self) -> NodeId {
        self.processor
    }

    fn nodes(&self) -> Vec<NodeId> {
        vec![self.processor]
    }

    fn is_active(&self) -> bool {
        true
    }

    fn set_active(&mut self, _host: &mut dyn AudioHost, _active: bool) -> EffectResult<()> {
        Err(EffectError::NotSwitchable { effect: self.kind() })
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

#[cfg(test)]
mod tests {
    use super::*;
    use tonewire_core::HostGraph;

    fn recorder() -> Recorder {
        let mut host = HostGraph::new(48000.0);
        Recorder::new(&mut host, 1024)
    }

    #[test]
    fn tap_node_has_buffer_size() {
        let mut host = HostGraph::new(48000.0);
        let rec = Recorder::new(&mut host, 2048);
        assert_eq!(
            host.node_kind(rec.processor()),
            Ok(NodeKind::ScriptProcessor { buffer_size: 2048 })
        );
        assert_eq!(rec.track_count(), 0);
    }

    #[test]
    fn stays_active_when_switched_off() {
        let mut host = HostGraph::new(48000.0);
        let mut rec = Recorder::new(&mut host, 1024);
        assert!(matches!(
            rec.set_active(&mut host, false),
            Err(EffectError::NotSwitchable { effect: "recorder" })
        ));
        assert!(rec.is_active());
    }

    #[test]
    fn capture_only_while_recording() {
        let mut rec = recorder();
        assert!(!rec.capture(&[&[0.1, 0.2]]));
        assert!(rec.start_recording().is_err());

        rec.ready(1).unwrap();
        assert_eq!(rec.track_count(), 2);
        assert!(!rec.capture(&[&[0.1, 0.2]]));

        rec.start_recording().unwrap();
        assert!(rec.capture(&[&[0.1, 0.2], &[0.3, 0.4]]));
        assert!(rec.capture(&[&[0.5], &[0.6]]));
        rec.stop_recording();
        assert!(!rec.capture(&[&[0.7]]));

        let track = rec.track(1).unwrap();
        assert_eq!(track[0], vec![0.1, 0.2, 0.5]);
        assert_eq!(track[1], vec![0.3, 0.4, 0.6]);
        assert_eq!(rec.state(), RecordingState::Ready);
    }

    #[test]
    fn track_limit() {
        let mut rec = recorder();
        assert!(rec.ready(MAX_TRACKS - 1).is_ok());
        assert!(rec.ready(MAX_TRACKS).is_err());
        assert_eq!(rec.active_track(), Some(MAX_TRACKS - 1));
    }

    #[test]
    fn cannot_switch_while_recording() {
        let mut rec = recorder();
        rec.ready(0).unwrap();
        rec.start_recording().unwrap();
        assert!(rec.ready(1).is_err());
        assert_eq!(rec.active_track(), Some(0));
    }

    #[test]
    fn clear_tracks() {
        let mut rec = recorder();
        rec.ready(0).unwrap();
        rec.start_recording().unwrap();
        rec.capture(&[&[1.0]]);
        rec.clear(Some(0));
        assert!(rec.track(0).unwrap().is_empty());
    }
}
