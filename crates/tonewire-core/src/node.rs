//! Host node handles and node kinds.
//!
//! Each node created through an [`AudioHost`](crate::AudioHost) is referred to
//! by a [`NodeId`]. The [`NodeKind`] determines which automatable parameters the
//! node carries and whether it can be started and stopped as a source.

use serde::{Deserialize, Serialize};

/// Handle to a node owned by the host audio graph.
///
/// Node IDs are assigned sequentially and never reused within a host instance.
/// They stay valid after the node is disconnected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    /// Builds a handle from a raw identifier.
    ///
    /// Intended for [`AudioHost`](crate::AudioHost) implementations outside
    /// this crate that allocate their own IDs.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// The type of a host node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Plain gain stage.
    Gain,
    /// Dynamics compressor.
    DynamicsCompressor,
    /// Second-order filter; its response is chosen with [`FilterType`].
    BiquadFilter,
    /// Variable delay line holding up to `max_time` seconds.
    Delay {
        /// Maximum delay time in seconds.
        max_time: f32,
    },
    /// Convolution node (impulse-response reverb).
    Convolver,
    /// Waveshaper driven by a transfer curve.
    WaveShaper,
    /// Equal-power stereo panner.
    StereoPanner,
    /// 3D spatial panner.
    Panner,
    /// Periodic oscillator, usable once as a source.
    Oscillator,
    /// Spectrum/time-domain analyser.
    Analyser,
    /// Block-processing callback node running at `buffer_size` frames.
    ScriptProcessor {
        /// Callback block size in sample frames.
        buffer_size: u32,
    },
    /// Final output of the host graph.
    Destination,
    /// The host's spatial listener.
    Listener,
}

impl NodeKind {
    /// Returns `true` for nodes that must be started before producing output.
    pub fn is_source(self) -> bool {
        matches!(self, NodeKind::Oscillator)
    }

    /// Short lowercase name for logging.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Gain => "gain",
            NodeKind::DynamicsCompressor => "compressor",
            NodeKind::BiquadFilter => "biquad",
            NodeKind::Delay { .. } => "delay",
            NodeKind::Convolver => "convolver",
            NodeKind::WaveShaper => "waveshaper",
            NodeKind::StereoPanner => "stereopanner",
            NodeKind::Panner => "panner",
            NodeKind::Oscillator => "oscillator",
            NodeKind::Analyser => "analyser",
            NodeKind::ScriptProcessor { .. } => "processor",
            NodeKind::Destination => "destination",
            NodeKind::Listener => "listener",
        }
    }
}

/// Response type of a [`NodeKind::BiquadFilter`] node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Second-order lowpass.
    #[default]
    Lowpass,
    /// Second-order highpass.
    Highpass,
    /// Bandpass around the center frequency.
    Bandpass,
    /// Low shelf boost/cut below the frequency.
    Lowshelf,
    /// High shelf boost/cut above the frequency.
    Highshelf,
    /// Peaking bell around the frequency.
    Peaking,
    /// Band reject.
    Notch,
    /// Phase-only allpass.
    Allpass,
}

/// Oscillator waveform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    /// Sine wave.
    #[default]
    Sine,
    /// Square wave.
    Square,
    /// Rising sawtooth.
    Sawtooth,
    /// Triangle wave.
    Triangle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_oscillators_are_sources() {
        assert!(NodeKind::Oscillator.is_source());
        assert!(!NodeKind::Gain.is_source());
        assert!(!NodeKind::ScriptProcessor { buffer_size: 256 }.is_source());
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId::from_raw(7).to_string(), "NodeId(7)");
        assert_eq!(NodeId::from_raw(7).index(), 7);
    }
}
