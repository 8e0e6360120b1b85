//! Parameter metadata for effect wrappers.
//!
//! Every effect exposes its parameters by index, each described by a
//! [`ParamDescriptor`]: name, unit, range and default. The range is what an
//! effect enforces on writes; out-of-range values are rejected rather than
//! clamped so callers can tell a dropped write from an accepted one.
//!
//! # Example
//!
//! ```rust
//! use tonewire_core::{ParamDescriptor, ParamUnit};
//!
//! let depth = ParamDescriptor::ratio("depth", 0.0);
//! assert!(depth.contains(0.5));
//! assert!(!depth.contains(1.5));
//! assert_eq!(depth.unit, ParamUnit::Ratio);
//! ```

use serde::{Deserialize, Serialize};

/// Unit type for formatting and validating a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParamUnit {
    /// No unit (counts, factors).
    #[default]
    None,
    /// Unit interval 0.0-1.0 (depth, mix, gain).
    Ratio,
    /// Decibels.
    Decibels,
    /// Hertz.
    Hertz,
    /// Seconds.
    Seconds,
    /// Degrees of arc.
    Degrees,
    /// Spatial distance in host units.
    Distance,
}

impl ParamUnit {
    /// Returns the unit suffix for display.
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::None | ParamUnit::Ratio | ParamUnit::Distance => "",
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Seconds => " s",
            ParamUnit::Degrees => "°",
        }
    }
}

/// Describes a single parameter's metadata for display and validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Lowercase lookup name (e.g. `"threshold"`, `"coneoutergain"`).
    pub name: &'static str,

    /// Unit type for formatting the parameter value.
    pub unit: ParamUnit,

    /// Minimum accepted value.
    pub min: f32,

    /// Maximum accepted value.
    pub max: f32,

    /// Value the effect starts with.
    pub default: f32,
}

impl ParamDescriptor {
    /// Creates a descriptor with an explicit unit and range.
    pub const fn new(name: &'static str, unit: ParamUnit, min: f32, max: f32, default: f32) -> Self {
        Self {
            name,
            unit,
            min,
            max,
            default,
        }
    }

    /// Unit-interval parameter (0.0-1.0).
    pub const fn ratio(name: &'static str, default: f32) -> Self {
        Self::new(name, ParamUnit::Ratio, 0.0, 1.0, default)
    }

    /// Frequency parameter in Hz.
    pub const fn hertz(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self::new(name, ParamUnit::Hertz, min, max, default)
    }

    /// Time parameter in seconds.
    pub const fn seconds(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self::new(name, ParamUnit::Seconds, min, max, default)
    }

    /// Gain parameter in dB.
    pub const fn decibels(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self::new(name, ParamUnit::Decibels, min, max, default)
    }

    /// Standard LFO rate parameter (0-100 Hz, default 0).
    pub const fn rate() -> Self {
        Self::hertz("rate", 0.0, 100.0, 0.0)
    }

    /// Standard modulation depth parameter (0-1, default 0).
    pub const fn depth() -> Self {
        Self::ratio("depth", 0.0)
    }

    /// Standard feedback parameter (0-0.95, default 0).
    ///
    /// Capped below unity to keep feedback loops stable.
    pub const fn feedback() -> Self {
        Self::new("feedback", ParamUnit::Ratio, 0.0, 0.95, 0.0)
    }

    /// Filter resonance (Q) parameter.
    pub const fn resonance(name: &'static str) -> Self {
        Self::new(name, ParamUnit::None, 0.0001, 1000.0, 1.0)
    }

    /// Returns a copy with a different default.
    pub const fn with_default(mut self, default: f32) -> Self {
        self.default = default;
        self
    }

    /// Returns `true` if `value` is finite and inside `[min, max]`.
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// Clamps a value to this parameter's range.
    ///
    /// ```rust
    /// use tonewire_core::ParamDescriptor;
    ///
    /// let desc = ParamDescriptor::decibels("bass", -40.0, 40.0, 0.0);
    /// assert_eq!(desc.clamp(-100.0), -40.0);
    /// assert_eq!(desc.clamp(12.0), 12.0);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Formats a value with this parameter's unit.
    pub fn format_value(&self, value: f32) -> String {
        format!("{value}{}", self.unit.suffix())
    }
}

/// Normalizes a lookup key: lowercase, with hyphens and underscores removed.
///
/// Module names, parameter names and plugin names all go through this, so
/// `"Master-Volume"`, `"master_volume"` and `"mastervolume"` are the same key.
///
/// ```rust
/// use tonewire_core::normalize_key;
///
/// assert_eq!(normalize_key("Ring-Modulator"), "ringmodulator");
/// assert_eq!(normalize_key("cone_outer_gain"), "coneoutergain");
/// ```
pub fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
