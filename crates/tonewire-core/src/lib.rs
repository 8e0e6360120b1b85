//! Tonewire Core - host audio graph abstraction
//!
//! Tonewire orchestrates effect chains on top of a platform audio graph: the
//! platform renders audio, tonewire creates nodes, wires them and schedules
//! parameter changes. This crate defines that boundary.
//!
//! # Core Abstractions
//!
//! - [`AudioHost`] - Object-safe trait for the platform audio graph API
//! - [`HostGraph`] - In-memory, deterministic `AudioHost` for tests and tooling
//! - [`NodeId`] / [`NodeKind`] - Handles to host nodes and their types
//! - [`ParamName`] / [`Automation`] - Automatable parameters and scheduled events
//! - [`ParamDescriptor`] - Range and unit metadata used by effect wrappers
//!
//! # Example
//!
//! ```rust
//! use tonewire_core::{AudioHost, HostGraph, NodeKind, ParamName};
//!
//! let mut host = HostGraph::new(48000.0);
//! let gain = host.create_node(NodeKind::Gain);
//! let dest = host.destination();
//!
//! host.connect(gain, dest).unwrap();
//! host.set_param(gain, ParamName::Gain, 0.5).unwrap();
//!
//! assert!(host.is_connected(gain, dest));
//! assert_eq!(host.param(gain, ParamName::Gain).unwrap(), 0.5);
//! ```
//!
//! # Features
//!
//! - `tracing` - emit `trace!` events for every host graph mutation

pub mod edge;
pub mod error;
pub mod graph;
pub mod host;
pub mod node;
pub mod param;
pub mod param_info;

pub use edge::{Edge, EdgeId, Port};
pub use error::{HostError, HostResult};
pub use graph::HostGraph;
pub use host::AudioHost;
pub use node::{FilterType, NodeId, NodeKind, Waveform};
pub use param::{Automation, HostParamSpec, ParamName, host_params};
pub use param_info::{ParamDescriptor, ParamUnit, normalize_key};
