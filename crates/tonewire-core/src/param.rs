//! Automatable host parameters and their automation events.
//!
//! [`ParamName`] names every parameter a host node can expose. Which names a
//! node actually carries, and their defaults and host-reported ranges, depend
//! on its [`NodeKind`]; see [`host_params`].

use serde::{Deserialize, Serialize};

use crate::node::NodeKind;

/// Name of a host node parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamName {
    /// Linear gain (gain nodes) or boost in dB (shelf/peaking filters).
    Gain,
    /// Frequency in Hz (filters, oscillators).
    Frequency,
    /// Detune in cents.
    Detune,
    /// Filter quality factor.
    Q,
    /// Compressor threshold in dB.
    Threshold,
    /// Compressor knee width in dB.
    Knee,
    /// Compression ratio.
    Ratio,
    /// Compressor attack in seconds.
    Attack,
    /// Compressor release in seconds.
    Release,
    /// Delay time in seconds.
    DelayTime,
    /// Stereo pan position, -1 (left) to 1 (right).
    Pan,
    /// Spatial X position.
    PositionX,
    /// Spatial Y position.
    PositionY,
    /// Spatial Z position.
    PositionZ,
    /// Panner orientation X.
    OrientationX,
    /// Panner orientation Y.
    OrientationY,
    /// Panner orientation Z.
    OrientationZ,
    /// Distance at which attenuation starts.
    RefDistance,
    /// Distance beyond which attenuation stops.
    MaxDistance,
    /// Attenuation rolloff factor.
    RolloffFactor,
    /// Inner cone angle in degrees.
    ConeInnerAngle,
    /// Outer cone angle in degrees.
    ConeOuterAngle,
    /// Gain outside the outer cone.
    ConeOuterGain,
    /// Listener forward vector X.
    ForwardX,
    /// Listener forward vector Y.
    ForwardY,
    /// Listener forward vector Z.
    ForwardZ,
    /// Listener up vector X.
    UpX,
    /// Listener up vector Y.
    UpY,
    /// Listener up vector Z.
    UpZ,
    /// Analyser FFT size.
    FftSize,
    /// Analyser smoothing time constant.
    SmoothingTimeConstant,
    /// Analyser lower dB bound.
    MinDecibels,
    /// Analyser upper dB bound.
    MaxDecibels,
}

/// A scheduled change to a parameter's value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Automation {
    /// Jump to `value` at `time`.
    SetValueAtTime {
        /// Target value.
        value: f32,
        /// Host time in seconds.
        time: f64,
    },
    /// Ramp linearly from the previous event to `value`, arriving at `time`.
    LinearRampToValueAtTime {
        /// Target value.
        value: f32,
        /// Host time in seconds.
        time: f64,
    },
    /// Drop every event scheduled at or after `time`.
    CancelScheduledValues {
        /// Host time in seconds.
        time: f64,
    },
}

impl Automation {
    /// Host time the event refers to.
    pub fn time(&self) -> f64 {
        match *self {
            Automation::SetValueAtTime { time, .. }
            | Automation::LinearRampToValueAtTime { time, .. }
            | Automation::CancelScheduledValues { time } => time,
        }
    }
}

/// Default value and optional host-reported `(min, max)` range of a parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostParamSpec {
    /// Parameter name.
    pub name: ParamName,
    /// Value the node starts with.
    pub default: f32,
    /// Range the host reports, `None` when it reports none.
    pub range: Option<(f32, f32)>,
}

const fn spec(name: ParamName, default: f32, range: Option<(f32, f32)>) -> HostParamSpec {
    HostParamSpec {
        name,
        default,
        range,
    }
}

/// Parameters carried by a node of the given kind.
///
/// Gain nodes report no range, so callers fall back to their own bounds.
pub fn host_params(kind: NodeKind, sample_rate: f32) -> Vec<HostParamSpec> {
    use ParamName as P;

    let nyquist = sample_rate / 2.0;
    match kind {
        NodeKind::Gain => vec![spec(P::Gain, 1.0, None)],
        NodeKind::DynamicsCompressor => vec![
            spec(P::Threshold, -24.0, Some((-100.0, 0.0))),
            spec(P::Knee, 30.0, Some((0.0, 40.0))),
            spec(P::Ratio, 12.0, Some((1.0, 20.0))),
            spec(P::Attack, 0.003, Some((0.0, 1.0))),
            spec(P::Release, 0.25, Some((0.0, 1.0))),
        ],
        NodeKind::BiquadFilter => vec![
            spec(P::Frequency, 350.0, Some((0.0, nyquist))),
            spec(P::Detune, 0.0, Some((-153_600.0, 153_600.0))),
            spec(P::Q, 1.0, None),
            spec(P::Gain, 0.0, None),
        ],
        NodeKind::Delay { max_time } => vec![spec(P::DelayTime, 0.0, Some((0.0, max_time)))],
        NodeKind::StereoPanner => vec![spec(P::Pan, 0.0, Some((-1.0, 1.0)))],
        NodeKind::Panner => vec![
            spec(P::PositionX, 0.0, None),
            spec(P::PositionY, 0.0, None),
            spec(P::PositionZ, 0.0, None),
            spec(P::OrientationX, 1.0, None),
            spec(P::OrientationY, 0.0, None),
            spec(P::OrientationZ, 0.0, None),
            spec(P::RefDistance, 1.0, None),
            spec(P::MaxDistance, 10_000.0, None),
            spec(P::RolloffFactor, 1.0, None),
            spec(P::ConeInnerAngle, 360.0, Some((0.0, 360.0))),
            spec(P::ConeOuterAngle, 360.0, Some((0.0, 360.0))),
            spec(P::ConeOuterGain, 0.0, Some((0.0, 1.0))),
        ],
        NodeKind::Oscillator => vec![
            spec(P::Frequency, 440.0, Some((-nyquist, nyquist))),
            spec(P::Detune, 0.0, None),
        ],
        NodeKind::Analyser => vec![
            spec(P::FftSize, 2048.0, Some((32.0, 32_768.0))),
            spec(P::SmoothingTimeConstant, 0.8, Some((0.0, 1.0))),
            spec(P::MinDecibels, -100.0, None),
            spec(P::MaxDecibels, -30.0, None),
        ],
        NodeKind::Listener => vec![
            spec(P::PositionX, 0.0, None),
            spec(P::PositionY, 0.0, None),
            spec(P::PositionZ, 0.0, None),
            spec(P::ForwardX, 0.0, None),
            spec(P::ForwardY, 0.0, None),
            spec(P::ForwardZ, -1.0, None),
            spec(P::UpX, 0.0, None),
            spec(P::UpY, 1.0, None),
            spec(P::UpZ, 0.0, None),
        ],
        NodeKind::Convolver
        | NodeKind::WaveShaper
        | NodeKind::ScriptProcessor { .. }
        | NodeKind::Destination => Vec::new(),
    }
}
