//! Tonewire Module - effect chain orchestration
//!
//! A [`SoundModule`] owns a host audio graph and the fixed set of sub-modules
//! every sound source shares: fourteen chain effects, a listener, an
//! analyser, a recorder, a session tap and an envelope generator. It wires
//! a source through a chain of effects into a master volume, exposes every
//! sub-module by name, lets users install plugins into the chain and starts
//! or stops the modulated effects together.
//!
//! # Key Types
//!
//! - [`SoundModule`] - The orchestrator
//! - [`BufferSize`] - Validated processing block size
//! - [`ModuleId`] / [`ChainSlot`] / [`ParamKey`] - Typed names
//! - [`ModuleConfig`] - TOML configuration
//! - [`ModuleSnapshot`] - Serializable state
//!
//! # Example
//!
//! ```rust
//! use tonewire_core::{AudioHost, HostGraph, NodeKind};
//! use tonewire_module::{ModuleConfig, SoundModule};
//!
//! let config = ModuleConfig::from_toml_str(r#"
//!     buffer_size = 2048
//!     mastervolume = 0.8
//!     order = ["distortion", "delay"]
//!
//!     [effects.delay]
//!     active = true
//!     [effects.delay.params]
//!     time = "250ms"
//! "#).unwrap();
//!
//! let mut module = SoundModule::from_config(HostGraph::new(48000.0), &config).unwrap();
//! let source = module.host_mut().create_node(NodeKind::Oscillator);
//! module.connect(source, config.chain().as_deref()).unwrap();
//!
//! let started_at = module.on(None).unwrap();
//! assert_eq!(started_at, 0.0);
//! assert!(module.module("delay").unwrap().as_effect().unwrap().is_active());
//! ```

pub mod buffer_size;
pub mod config;
pub mod error;
pub mod module_id;
pub mod sound_module;

pub use buffer_size::BufferSize;
pub use config::{EffectSettings, ModuleConfig, ParamValue, parse_param_value};
pub use error::{ModuleError, ModuleResult};
pub use module_id::{ChainSlot, ModuleId, ParamKey};
pub use sound_module::{ModuleHandle, ModuleRef, ModuleSnapshot, Modules, SoundModule};
