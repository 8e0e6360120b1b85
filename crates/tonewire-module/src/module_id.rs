//! Typed names for built-in modules, chain slots and module-level parameters.
//!
//! Lookups by string go through [`normalize_key`], so `"Ring-Modulator"`,
//! `"ring_modulator"` and `"ringmodulator"` all name the same module.

use std::fmt;
use std::str::FromStr;

use tonewire_core::normalize_key;

use crate::error::ModuleError;

/// Built-in sub-module of a sound module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModuleId {
    /// Spatial listener.
    Listener,
    /// Spectrum analyser tap.
    Analyser,
    /// Recording tap.
    Recorder,
    /// Session sender tap.
    Session,
    /// Voice envelope generator.
    EnvelopeGenerator,
    /// 3D panner.
    Panner,
    /// Dynamics compressor.
    Compressor,
    /// Waveshaping distortion.
    Distortion,
    /// Auto-wah.
    Wah,
    /// Four-band equalizer.
    Equalizer,
    /// Biquad filter with envelope.
    Filter,
    /// Auto-panner.
    Autopanner,
    /// Tremolo.
    Tremolo,
    /// Ring modulator.
    RingModulator,
    /// Phaser.
    Phaser,
    /// Flanger.
    Flanger,
    /// Chorus.
    Chorus,
    /// Feedback delay.
    Delay,
    /// Convolution reverb.
    Reverb,
}

impl ModuleId {
    /// Every built-in module.
    pub const ALL: [ModuleId; 19] = [
        ModuleId::Listener,
        ModuleId::Analyser,
        ModuleId::Recorder,
        ModuleId::Session,
        ModuleId::EnvelopeGenerator,
        ModuleId::Panner,
        ModuleId::Compressor,
        ModuleId::Distortion,
        ModuleId::Wah,
        ModuleId::Equalizer,
        ModuleId::Filter,
        ModuleId::Autopanner,
        ModuleId::Tremolo,
        ModuleId::RingModulator,
        ModuleId::Phaser,
        ModuleId::Flanger,
        ModuleId::Chorus,
        ModuleId::Delay,
        ModuleId::Reverb,
    ];

    /// Chain order used when `connect` is given no explicit order.
    pub const DEFAULT_ORDER: [ModuleId; 14] = [
        ModuleId::Panner,
        ModuleId::Compressor,
        ModuleId::Distortion,
        ModuleId::Wah,
        ModuleId::Equalizer,
        ModuleId::Filter,
        ModuleId::Autopanner,
        ModuleId::Tremolo,
        ModuleId::RingModulator,
        ModuleId::Phaser,
        ModuleId::Flanger,
        ModuleId::Chorus,
        ModuleId::Delay,
        ModuleId::Reverb,
    ];

    /// Modules started by `on`, in order.
    pub const STARTED_BY_ON: [ModuleId; 8] = [
        ModuleId::Filter,
        ModuleId::Wah,
        ModuleId::Autopanner,
        ModuleId::Tremolo,
        ModuleId::RingModulator,
        ModuleId::Phaser,
        ModuleId::Flanger,
        ModuleId::Chorus,
    ];

    /// Modules stopped by `off`, in order. The filter is not among them.
    pub const STOPPED_BY_OFF: [ModuleId; 7] = [
        ModuleId::Wah,
        ModuleId::Autopanner,
        ModuleId::Tremolo,
        ModuleId::RingModulator,
        ModuleId::Phaser,
        ModuleId::Flanger,
        ModuleId::Chorus,
    ];

    /// Lookup name.
    pub const fn name(self) -> &'static str {
        match self {
            ModuleId::Listener => "listener",
            ModuleId::Analyser => "analyser",
            ModuleId::Recorder => "recorder",
            ModuleId::Session => "session",
            ModuleId::EnvelopeGenerator => "envelopegenerator",
            ModuleId::Panner => "panner",
            ModuleId::Compressor => "compressor",
            ModuleId::Distortion => "distortion",
            ModuleId::Wah => "wah",
            ModuleId::Equalizer => "equalizer",
            ModuleId::Filter => "filter",
            ModuleId::Autopanner => "autopanner",
            ModuleId::Tremolo => "tremolo",
            ModuleId::RingModulator => "ringmodulator",
            ModuleId::Phaser => "phaser",
            ModuleId::Flanger => "flanger",
            ModuleId::Chorus => "chorus",
            ModuleId::Delay => "delay",
            ModuleId::Reverb => "reverb",
        }
    }

    /// Whether the module can sit in the effect chain.
    pub fn is_chain_effect(self) -> bool {
        Self::DEFAULT_ORDER.contains(&self)
    }
}

impl FromStr for ModuleId {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        Self::ALL
            .into_iter()
            .find(|id| id.name() == key)
            .ok_or_else(|| ModuleError::UnknownModule(s.to_string()))
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One position in an effect chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChainSlot {
    /// A built-in effect.
    Builtin(ModuleId),
    /// An installed plugin, by normalized name.
    Plugin(String),
}

impl ChainSlot {
    /// Parses a name: built-in modules win, anything else names a plugin.
    pub fn parse(name: &str) -> Self {
        name.parse::<ModuleId>()
            .map_or_else(|_| ChainSlot::Plugin(normalize_key(name)), ChainSlot::Builtin)
    }
}

impl From<ModuleId> for ChainSlot {
    fn from(id: ModuleId) -> Self {
        ChainSlot::Builtin(id)
    }
}

impl fmt::Display for ChainSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainSlot::Builtin(id) => f.write_str(id.name()),
            ChainSlot::Plugin(name) => f.write_str(name),
        }
    }
}

/// Parameter of the sound module itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    /// Gain of the master volume node.
    MasterVolume,
}

impl ParamKey {
    /// Lookup name.
    pub const fn name(self) -> &'static str {
        match self {
            ParamKey::MasterVolume => "mastervolume",
        }
    }
}

impl FromStr for ParamKey {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "mastervolume" => Ok(ParamKey::MasterVolume),
            _ => Err(ModuleError::UnknownParam(s.to_string())),
        }
    }
}
