//! TOML configuration for a sound module.
//!
//! # TOML Format
//!
//! ```toml
//! buffer_size = 2048
//! mastervolume = 0.8
//! order = ["compressor", "distortion", "delay"]
//!
//! [effects.distortion]
//! active = true
//! [effects.distortion.params]
//! amount = "70%"
//! tone = "2.5kHz"
//!
//! [effects.delay]
//! active = true
//! [effects.delay.params]
//! time = "250ms"
//! wet = 0.3
//! ```
//!
//! `platform` (a user-agent style string) picks the buffer size when
//! `buffer_size` is absent. Module and parameter names are matched
//! case-insensitively, ignoring hyphens and underscores.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tonewire_core::ParamUnit;

use crate::buffer_size::BufferSize;
use crate::error::{ModuleError, ModuleResult};
use crate::module_id::ChainSlot;

/// Sound module configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Frames per processing callback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_size: Option<u32>,

    /// Platform string used to pick a buffer size when none is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// Initial master volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mastervolume: Option<f32>,

    /// Chain order by module or plugin name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<String>>,

    /// Per-module settings keyed by module name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub effects: BTreeMap<String, EffectSettings>,
}

/// Settings for one module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectSettings {
    /// Switch the module on or off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// Parameter values by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, ParamValue>,
}

/// A parameter value: a bare number or text with a unit suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Plain number.
    Number(f32),
    /// Text such as `"50%"`, `"-6dB"`, `"250ms"` or `"1.2kHz"`.
    Text(String),
}

impl ParamValue {
    /// Resolves the value for a parameter measured in `unit`.
    pub fn resolve(&self, unit: ParamUnit) -> Option<f32> {
        match self {
            ParamValue::Number(v) => Some(*v),
            ParamValue::Text(text) => parse_param_value(text, unit),
        }
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl ModuleConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ModuleResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ModuleError::read_file(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> ModuleResult<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> ModuleResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> ModuleResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ModuleError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ModuleError::write_file(path, e))?;
        Ok(())
    }

    /// Buffer size from `buffer_size`, else `platform`, else the build OS.
    pub fn resolve_buffer_size(&self) -> ModuleResult<BufferSize> {
        match (self.buffer_size, &self.platform) {
            (Some(frames), _) => BufferSize::try_from(frames),
            (None, Some(platform)) => Ok(BufferSize::for_platform(platform)),
            (None, None) => Ok(BufferSize::for_host_os()),
        }
    }

    /// Chain order as slots, if one is configured.
    pub fn chain(&self) -> Option<Vec<ChainSlot>> {
        self.order
            .as_ref()
            .map(|names| names.iter().map(|name| ChainSlot::parse(name)).collect())
    }

    /// Add settings for one module.
    pub fn with_effect(mut self, name: impl Into<String>, settings: EffectSettings) -> Self {
        self.effects.insert(name.into(), settings);
        self
    }
}

impl EffectSettings {
    /// Settings that switch the module on or off.
    pub fn active(active: bool) -> Self {
        Self {
            active: Some(active),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter value.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

/// Parse a parameter value string into an f32.
///
/// Supports various formats:
/// - Plain numbers: "0.5", "1.2", "-0.3"
/// - Percentages: "50%", "120%" (divided by 100)
/// - Decibels: "-6dB", "+3dB" (kept as dB for decibel parameters, otherwise
///   converted to linear gain)
/// - Time in ms: "100ms" (converted to seconds)
/// - Time in s: "1.5s" (kept as seconds)
/// - Frequency in Hz: "440Hz"
/// - Frequency in kHz: "1.2kHz" (converted to Hz)
pub fn parse_param_value(value: &str, unit: ParamUnit) -> Option<f32> {
    let value = value.trim();

    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse::<f32>().ok().map(|v| v / 100.0);
    }

    if let Some(db) = value
        .strip_suffix("dB")
        .or_else(|| value.strip_suffix("db"))
    {
        let db = db.trim().parse::<f32>().ok()?;
        return Some(if unit == ParamUnit::Decibels {
            db
        } else {
            libm::powf(10.0, db / 20.0)
        });
    }

    if let Some(ms) = value.strip_suffix("ms") {
        return ms.trim().parse::<f32>().ok().map(|v| v / 1000.0);
    }

    if let Some(s) = value.strip_suffix('s') {
        return s.trim().parse::<f32>().ok();
    }

    if let Some(khz) = value
        .strip_suffix("kHz")
        .or_else(|| value.strip_suffix("khz"))
    {
        return khz.trim().parse::<f32>().ok().map(|v| v * 1000.0);
    }

    if let Some(hz) = value
        .strip_suffix("Hz")
        .or_else(|| value.strip_suffix("hz"))
    {
        return hz.trim().parse::<f32>().ok();
    }

    value.parse::<f32>().ok()
}
