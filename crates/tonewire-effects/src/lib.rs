//! Tonewire Effects - effect wrappers over host audio graph nodes
//!
//! Every effect here owns a handful of host nodes, exposes an input and an
//! output, and implements [`Effector`]:
//!
//! - [`Panner`] - 3D spatial panner
//! - [`Compressor`] - Dynamics compressor
//! - [`Distortion`] - Soft-clip waveshaper with tone and level
//! - [`Wah`] - LFO-swept resonant lowpass
//! - [`Equalizer`] - Four fixed bands (bass, middle, treble, presence)
//! - [`Filter`] - Biquad filter with a cutoff envelope
//! - [`Autopanner`] - LFO-driven stereo panner
//! - [`Tremolo`] - Amplitude LFO
//! - [`RingModulator`] - Carrier multiplication
//! - [`Phaser`] - Allpass cascade with feedback
//! - [`ModulatedDelay`] - Flanger and chorus
//! - [`Delay`] - Feedback delay with dry/wet
//! - [`Reverb`] - Convolution reverb
//!
//! Non-chain modules: [`Listener`], [`Analyser`], [`Recorder`], [`Session`]
//! and the voice-level [`EnvelopeGenerator`].
//!
//! ## Example
//!
//! ```rust
//! use tonewire_core::{AudioHost, HostGraph};
//! use tonewire_effects::{Delay, Effector};
//!
//! let mut host = HostGraph::new(48000.0);
//! let mut delay = Delay::new(&mut host).unwrap();
//!
//! delay.set_active(&mut host, true).unwrap();
//! let time = delay.find_param_by_name("time").unwrap();
//! delay.set_param(&mut host, time, 0.25).unwrap();
//!
//! let dest = host.destination();
//! host.connect(delay.output(), dest).unwrap();
//! assert!(host.has_path(delay.input(), dest));
//! ```

pub mod analyser;
pub mod autopanner;
pub mod compressor;
pub mod delay;
pub mod distortion;
pub mod effector;
pub mod envelope;
pub mod equalizer;
pub mod error;
pub mod filter;
pub mod lfo;
pub mod listener;
pub mod modulated_delay;
pub mod panner;
pub mod phaser;
pub mod recorder;
pub mod reverb;
pub mod ringmodulator;
pub mod session;
pub mod tremolo;
pub mod wah;

pub use analyser::Analyser;
pub use autopanner::Autopanner;
pub use compressor::Compressor;
pub use delay::Delay;
pub use distortion::{Distortion, soft_clip_curve};
pub use effector::{EffectIo, EffectSnapshot, Effector, connect_pairs, validate_param};
pub use envelope::EnvelopeGenerator;
pub use equalizer::Equalizer;
pub use error::{EffectError, EffectResult};
pub use filter::Filter;
pub use lfo::Lfo;
pub use listener::Listener;
pub use modulated_delay::ModulatedDelay;
pub use panner::Panner;
pub use phaser::Phaser;
pub use recorder::{MAX_TRACKS, Recorder, RecordingState};
pub use reverb::Reverb;
pub use ringmodulator::RingModulator;
pub use session::Session;
pub use tremolo::Tremolo;
pub use wah::Wah;
