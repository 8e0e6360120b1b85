//! Error types for sound module operations.

use std::path::PathBuf;

use thiserror::Error;
use tonewire_core::HostError;
use tonewire_effects::EffectError;

/// Errors that can occur when building, wiring or configuring a sound module.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// The buffer size is not one of 256, 512, ..., 16384.
    #[error("invalid buffer size {0}: expected a power of two from 256 to 16384")]
    InvalidBufferSize(u32),

    /// No built-in module, extension or plugin has this name.
    #[error("unknown module: {0}")]
    UnknownModule(String),

    /// The module exists but cannot sit in the effect chain.
    #[error("module '{0}' cannot be placed in the effect chain")]
    NotChainable(String),

    /// No parameter has this name.
    #[error("unknown parameter: {0}")]
    UnknownParam(String),

    /// The value lies outside the parameter's range; nothing was changed.
    #[error("{param} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Parameter name.
        param: String,
        /// Rejected value.
        value: f32,
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },

    /// A textual value could not be parsed.
    #[error("invalid value '{value}' for parameter '{param}'")]
    InvalidValue {
        /// Parameter name.
        param: String,
        /// Rejected text.
        value: String,
    },

    /// Plugin names must contain at least one character besides hyphens.
    #[error("invalid plugin name: {0:?}")]
    InvalidPluginName(String),

    /// An effect rejected an operation.
    #[error(transparent)]
    Effect(#[from] EffectError),

    /// The host rejected a call.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Failed to render JSON
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModuleError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ModuleError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ModuleError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ModuleError::CreateDir {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for sound module results.
pub type ModuleResult<T> = Result<T, ModuleError>;
