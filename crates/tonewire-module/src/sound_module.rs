//! The sound module: a fixed set of sub-modules, a configurable effect chain
//! and a plugin registry over one host graph.
//!
//! ```text
//!                 ┌──────────── chain (default order or custom) ───────────┐
//! source ──────▶  │ panner → compressor → ... → delay → reverb → plugins.. │ ──▶ mastervolume
//!                 └────────────────────────────────────────────────────────┘
//!
//! mastervolume ─┬─▶ analyser ─────▶ destination
//!               ├─▶ recorder tap ─▶ destination
//!               └─▶ session tap ──▶ destination
//! ```
//!
//! ## Design Decisions
//!
//! - **Typed lookup**: sub-modules are addressed by [`ModuleId`]; string
//!   lookups parse into it first, then fall back to extensions and plugins.
//! - **Validate before wiring**: [`SoundModule::connect`] resolves every chain
//!   slot before it touches the graph, so an unknown name leaves the previous
//!   wiring in place.
//! - **No partial construction**: buffer sizes are checked before any node is
//!   created.

use tonewire_core::{AudioHost, NodeId, NodeKind, ParamName, ParamUnit, normalize_key};
use tonewire_effects::{
    Analyser, Autopanner, Compressor, Delay, Distortion, EffectError, EffectResult, EffectSnapshot,
    Effector, EnvelopeGenerator, Equalizer, Filter, Listener, ModulatedDelay, Panner, Phaser,
    Recorder, Reverb, RingModulator, Session, Tremolo, Wah,
};
use tracing::{debug, warn};

use serde::{Deserialize, Serialize};

use crate::buffer_size::BufferSize;
use crate::config::{ModuleConfig, ParamValue, parse_param_value};
use crate::error::{ModuleError, ModuleResult};
use crate::module_id::{ChainSlot, ModuleId, ParamKey};

/// Every built-in sub-module, created together for one buffer size.
pub struct Modules {
    /// Block-processing node source types hook into.
    pub processor: NodeId,
    /// Spatial listener.
    pub listener: Listener,
    /// Spectrum analyser tap.
    pub analyser: Analyser,
    /// Recording tap.
    pub recorder: Recorder,
    /// Session sender tap.
    pub session: Session,
    /// Voice envelope generator.
    pub envelope: EnvelopeGenerator,
    /// 3D panner.
    pub panner: Panner,
    /// Dynamics compressor.
    pub compressor: Compressor,
    /// Waveshaping distortion.
    pub distortion: Distortion,
    /// Auto-wah.
    pub wah: Wah,
    /// Four-band equalizer.
    pub equalizer: Equalizer,
    /// Biquad filter with envelope.
    pub filter: Filter,
    /// Auto-panner.
    pub autopanner: Autopanner,
    /// Tremolo.
    pub tremolo: Tremolo,
    /// Ring modulator.
    pub ringmodulator: RingModulator,
    /// Phaser.
    pub phaser: Phaser,
    /// Flanger.
    pub flanger: ModulatedDelay,
    /// Chorus.
    pub chorus: ModulatedDelay,
    /// Feedback delay.
    pub delay: Delay,
    /// Convolution reverb.
    pub reverb: Reverb,
}

impl Modules {
    fn new(host: &mut dyn AudioHost, size: BufferSize) -> EffectResult<Self> {
        let frames = size.frames();
        Ok(Self {
            processor: host.create_node(NodeKind::ScriptProcessor {
                buffer_size: frames,
            }),
            listener: Listener::new(host)?,
            analyser: Analyser::new(host)?,
            recorder: Recorder::new(host, frames),
            session: Session::new(host),
            envelope: EnvelopeGenerator::new(),
            panner: Panner::new(host)?,
            compressor: Compressor::new(host)?,
            distortion: Distortion::new(host)?,
            wah: Wah::new(host)?,
            equalizer: Equalizer::new(host)?,
            filter: Filter::new(host)?,
            autopanner: Autopanner::new(host)?,
            tremolo: Tremolo::new(host)?,
            ringmodulator: RingModulator::new(host)?,
            phaser: Phaser::new(host)?,
            flanger: ModulatedDelay::flanger(host)?,
            chorus: ModulatedDelay::chorus(host)?,
            delay: Delay::new(host)?,
            reverb: Reverb::new(host)?,
        })
    }

    /// The sub-module as an [`Effector`]. `None` for the envelope generator.
    pub fn effect(&self, id: ModuleId) -> Option<&dyn Effector> {
        Some(match id {
            ModuleId::Listener => &self.listener,
            ModuleId::Analyser => &self.analyser,
            ModuleId::Recorder => &self.recorder,
            ModuleId::Session => &self.session,
            ModuleId::EnvelopeGenerator => return None,
            ModuleId::Panner => &self.panner,
            ModuleId::Compressor => &self.compressor,
            ModuleId::Distortion => &self.distortion,
            ModuleId::Wah => &self.wah,
            ModuleId::Equalizer => &self.equalizer,
            ModuleId::Filter => &self.filter,
            ModuleId::Autopanner => &self.autopanner,
            ModuleId::Tremolo => &self.tremolo,
            ModuleId::RingModulator => &self.ringmodulator,
            ModuleId::Phaser => &self.phaser,
            ModuleId::Flanger => &self.flanger,
            ModuleId::Chorus => &self.chorus,
            ModuleId::Delay => &self.delay,
            ModuleId::Reverb => &self.reverb,
        })
    }

    /// Mutable counterpart of [`effect()`](Self::effect).
    pub fn effect_mut(&mut self, id: ModuleId) -> Option<&mut dyn Effector> {
        Some(match id {
            ModuleId::Listener => &mut self.listener,
            ModuleId::Analyser => &mut self.analyser,
            ModuleId::Recorder => &mut self.recorder,
            ModuleId::Session => &mut self.session,
            ModuleId::EnvelopeGenerator => return None,
            ModuleId::Panner => &mut self.panner,
            ModuleId::Compressor => &mut self.compressor,
            ModuleId::Distortion => &mut self.distortion,
            ModuleId::Wah => &mut self.wah,
            ModuleId::Equalizer => &mut self.equalizer,
            ModuleId::Filter => &mut self.filter,
            ModuleId::Autopanner => &mut self.autopanner,
            ModuleId::Tremolo => &mut self.tremolo,
            ModuleId::RingModulator => &mut self.ringmodulator,
            ModuleId::Phaser => &mut self.phaser,
            ModuleId::Flanger => &mut self.flanger,
            ModuleId::Chorus => &mut self.chorus,
            ModuleId::Delay => &mut self.delay,
            ModuleId::Reverb => &mut self.reverb,
        })
    }

    fn release(&mut self, host: &mut dyn AudioHost) -> EffectResult<()> {
        for id in ModuleId::ALL {
            if let Some(effect) = self.effect_mut(id) {
                effect.release(host)?;
            }
        }
        self.envelope.release(host)?;
        host.disconnect(self.processor)?;
        Ok(())
    }
}

/// Shared view of one sub-module, extension or plugin.
#[derive(Clone, Copy)]
pub enum ModuleRef<'a> {
    /// Anything implementing [`Effector`].
    Effect(&'a dyn Effector),
    /// The voice envelope generator.
    EnvelopeGenerator(&'a EnvelopeGenerator),
}

impl ModuleRef<'_> {
    /// Kind identifier.
    pub fn kind(&self) -> &'static str {
        match self {
            ModuleRef::Effect(effect) => effect.kind(),
            ModuleRef::EnvelopeGenerator(_) => "envelopegenerator",
        }
    }

    /// Number of parameters.
    pub fn param_count(&self) -> usize {
        match self {
            ModuleRef::Effect(effect) => effect.param_count(),
            ModuleRef::EnvelopeGenerator(eg) => eg.param_count(),
        }
    }

    /// Finds a parameter index by name.
    pub fn find_param_by_name(&self, name: &str) -> Option<usize> {
        match self {
            ModuleRef::Effect(effect) => effect.find_param_by_name(name),
            ModuleRef::EnvelopeGenerator(eg) => eg.find_param_by_name(name),
        }
    }

    /// The effect, unless this is the envelope generator.
    pub fn as_effect(&self) -> Option<&dyn Effector> {
        match *self {
            ModuleRef::Effect(effect) => Some(effect),
            ModuleRef::EnvelopeGenerator(_) => None,
        }
    }

    /// Captures state and parameter values.
    pub fn snapshot(&self, host: &dyn AudioHost) -> EffectResult<EffectSnapshot> {
        match self {
            ModuleRef::Effect(effect) => effect.snapshot(host),
            ModuleRef::EnvelopeGenerator(eg) => Ok(eg.snapshot()),
        }
    }
}

enum Target<'a> {
    Effect(&'a mut dyn Effector),
    Envelope(&'a mut EnvelopeGenerator),
}

/// Mutable access to one sub-module, paired with the host it lives in.
///
/// Parameters are addressed by name.
pub struct ModuleHandle<'a> {
    target: Target<'a>,
    host: &'a mut dyn AudioHost,
}

impl ModuleHandle<'_> {
    /// Kind identifier.
    pub fn kind(&self) -> &'static str {
        match &self.target {
            Target::Effect(effect) => effect.kind(),
            Target::Envelope(_) => "envelopegenerator",
        }
    }

    fn param_index(&self, name: &str) -> ModuleResult<(usize, ParamUnit)> {
        let found = match &self.target {
            Target::Effect(effect) => effect
                .find_param_by_name(name)
                .and_then(|i| Some((i, effect.param_info(i)?.unit))),
            Target::Envelope(eg) => eg
                .find_param_by_name(name)
                .and_then(|i| Some((i, eg.param_info(i)?.unit))),
        };
        found.ok_or_else(|| ModuleError::UnknownParam(format!("{}.{name}", self.kind())))
    }

    /// Reads a parameter.
    pub fn param(&self, name: &str) -> ModuleResult<f32> {
        let (index, _) = self.param_index(name)?;
        Ok(match &self.target {
            Target::Effect(effect) => effect.get_param(&*self.host, index)?,
            Target::Envelope(eg) => eg.get_param(index)?,
        })
    }

    /// Writes a parameter. Out-of-range values leave it unchanged.
    pub fn set_param(&mut self, name: &str, value: f32) -> ModuleResult<()> {
        let (index, _) = self.param_index(name)?;
        match &mut self.target {
            Target::Effect(effect) => effect.set_param(&mut *self.host, index, value)?,
            Target::Envelope(eg) => eg.set_param(index, value)?,
        }
        Ok(())
    }

    /// Writes a parameter from text such as `"250ms"` or `"-24dB"`.
    pub fn set_param_str(&mut self, name: &str, text: &str) -> ModuleResult<()> {
        let (_, unit) = self.param_index(name)?;
        let value = parse_param_value(text, unit).ok_or_else(|| ModuleError::InvalidValue {
            param: name.to_string(),
            value: text.to_string(),
        })?;
        self.set_param(name, value)
    }

    /// Writes a configured parameter value.
    pub fn set_param_value(&mut self, name: &str, value: &ParamValue) -> ModuleResult<()> {
        match value {
            ParamValue::Number(v) => self.set_param(name, *v),
            ParamValue::Text(text) => self.set_param_str(name, text),
        }
    }

    /// Whether the module is switched on.
    pub fn is_active(&self) -> bool {
        match &self.target {
            Target::Effect(effect) => effect.is_active(),
            Target::Envelope(eg) => eg.is_running(),
        }
    }

    /// Switches the module on or off.
    ///
    /// The envelope generator, analyser, listener and recorder are always on
    /// and return [`EffectError::NotSwitchable`].
    pub fn set_active(&mut self, active: bool) -> ModuleResult<()> {
        match &mut self.target {
            Target::Effect(effect) => Ok(effect.set_active(&mut *self.host, active)?),
            Target::Envelope(_) => Err(EffectError::NotSwitchable {
                effect: "envelopegenerator",
            }
            .into()),
        }
    }

    /// Starts time-varying behavior at host time `when`.
    pub fn start(&mut self, when: f64) -> ModuleResult<()> {
        match &mut self.target {
            Target::Effect(effect) => effect.start(&mut *self.host, when)?,
            Target::Envelope(eg) => eg.start(&mut *self.host, when)?,
        }
        Ok(())
    }

    /// Stops time-varying behavior at host time `when`.
    pub fn stop(&mut self, when: f64) -> ModuleResult<()> {
        match &mut self.target {
            Target::Effect(effect) => effect.stop(&mut *self.host, when)?,
            Target::Envelope(eg) => eg.stop(&mut *self.host, when)?,
        }
        Ok(())
    }

    /// Captures state and parameter values.
    pub fn snapshot(&self) -> ModuleResult<EffectSnapshot> {
        Ok(match &self.target {
            Target::Effect(effect) => effect.snapshot(&*self.host)?,
            Target::Envelope(eg) => eg.snapshot(),
        })
    }
}

/// Serializable state of a whole sound module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSnapshot {
    /// Frames per processing callback.
    pub buffer_size: BufferSize,
    /// Master volume gain.
    pub mastervolume: f32,
    /// Sub-modules in a fixed order, then extensions, then plugins.
    pub modules: Vec<(String, EffectSnapshot)>,
}

type Registry = Vec<(String, Box<dyn Effector>)>;

/// Effect-chain orchestrator over one host graph.
///
/// # Example
///
/// ```rust
/// use tonewire_core::{AudioHost, HostGraph, NodeKind};
/// use tonewire_module::{ChainSlot, ModuleId, SoundModule};
///
/// let mut module = SoundModule::new(HostGraph::new(48000.0), Some(2048)).unwrap();
/// let source = module.host_mut().create_node(NodeKind::Oscillator);
///
/// module
///     .connect(source, Some(&[ChainSlot::Builtin(ModuleId::Delay)]))
///     .unwrap();
/// module.set_param("mastervolume", 0.5).unwrap();
///
/// let dest = module.host().destination();
/// assert!(module.host().has_path(source, dest));
/// ```
pub struct SoundModule<H: AudioHost> {
    host: H,
    buffer_size: BufferSize,
    mastervolume: NodeId,
    modules: Modules,
    extensions: Registry,
    plugins: Registry,
}

impl<H: AudioHost> SoundModule<H> {
    /// Creates a module with `buffer_size` frames, or a size picked for the
    /// build OS when `None`.
    pub fn new(host: H, buffer_size: Option<u32>) -> ModuleResult<Self> {
        let size = match buffer_size {
            Some(frames) => BufferSize::try_from(frames)?,
            None => BufferSize::for_host_os(),
        };
        Self::with_buffer_size(host, size)
    }

    /// Creates a module with a size picked from a user-agent style string.
    pub fn with_platform(host: H, platform: &str) -> ModuleResult<Self> {
        Self::with_buffer_size(host, BufferSize::for_platform(platform))
    }

    /// Creates a module with an already validated size.
    pub fn with_buffer_size(mut host: H, buffer_size: BufferSize) -> ModuleResult<Self> {
        let mastervolume = host.create_node(NodeKind::Gain);
        host.set_param(mastervolume, ParamName::Gain, 1.0)?;
        let modules = Modules::new(&mut host, buffer_size)?;

        let mut module = Self {
            host,
            buffer_size,
            mastervolume,
            modules,
            extensions: Vec::new(),
            plugins: Vec::new(),
        };
        module.wire_taps()?;

        debug!(buffer_size = buffer_size.frames(), "sound module created");
        Ok(module)
    }

    /// Creates a module from a configuration and applies its settings.
    pub fn from_config(host: H, config: &ModuleConfig) -> ModuleResult<Self> {
        let mut module = Self::with_buffer_size(host, config.resolve_buffer_size()?)?;
        module.apply_config(config)?;
        Ok(module)
    }

    /// Applies master volume and per-module settings.
    ///
    /// The chain order is not wired here; pass
    /// [`ModuleConfig::chain`] to [`connect()`](Self::connect).
    pub fn apply_config(&mut self, config: &ModuleConfig) -> ModuleResult<()> {
        if let Some(volume) = config.mastervolume {
            self.set_param(ParamKey::MasterVolume.name(), volume)?;
        }
        for (name, settings) in &config.effects {
            let mut handle = self
                .module_mut(name)
                .ok_or_else(|| ModuleError::UnknownModule(name.clone()))?;
            for (param, value) in &settings.params {
                handle.set_param_value(param, value)?;
            }
            if let Some(active) = settings.active {
                handle.set_active(active)?;
            }
        }
        Ok(())
    }

    /// Rebuilds every sub-module for a new buffer size.
    ///
    /// Old sub-modules are detached from the graph. Extensions and plugins
    /// are dropped; the master volume keeps its value.
    pub fn resize(&mut self, buffer_size: u32) -> ModuleResult<()> {
        let size = BufferSize::try_from(buffer_size)?;
        let modules = Modules::new(&mut self.host, size)?;
        let mut old = std::mem::replace(&mut self.modules, modules);
        old.release(&mut self.host)?;
        for (_, effect) in self.extensions.iter_mut().chain(self.plugins.iter_mut()) {
            effect.release(&mut self.host)?;
        }
        self.extensions.clear();
        self.plugins.clear();
        self.buffer_size = size;
        self.wire_taps()?;

        debug!(buffer_size = size.frames(), "sound module resized");
        Ok(())
    }

    /// Wires `source` through the chain into the master volume and the taps.
    ///
    /// `None` uses [`ModuleId::DEFAULT_ORDER`]; an empty slice connects the
    /// source straight to the master volume. Every slot is resolved before
    /// the graph is touched.
    pub fn connect(&mut self, source: NodeId, order: Option<&[ChainSlot]>) -> ModuleResult<()> {
        let chain = match order {
            Some(slots) => self.resolve_chain(slots)?,
            None => {
                let slots = ModuleId::DEFAULT_ORDER.map(ChainSlot::Builtin);
                self.resolve_chain(&slots)?
            }
        };

        self.host.disconnect(source)?;
        for &(_, output) in &chain {
            self.host.disconnect(output)?;
        }
        let mut prev = source;
        for &(input, output) in &chain {
            self.host.connect(prev, input)?;
            prev = output;
        }
        self.host.connect(prev, self.mastervolume)?;
        self.wire_taps()?;

        debug!(source = %source, modules = chain.len(), "chain connected");
        Ok(())
    }

    fn resolve_chain(&self, slots: &[ChainSlot]) -> ModuleResult<Vec<(NodeId, NodeId)>> {
        slots
            .iter()
            .map(|slot| {
                let effect = match slot {
                    ChainSlot::Builtin(id) if id.is_chain_effect() => self.modules.effect(*id),
                    ChainSlot::Builtin(_) => None,
                    ChainSlot::Plugin(name) => Some(
                        find(&self.plugins, &normalize_key(name))
                            .ok_or_else(|| ModuleError::UnknownModule(name.clone()))?,
                    ),
                };
                effect
                    .map(|e| (e.input(), e.output()))
                    .ok_or_else(|| ModuleError::NotChainable(slot.to_string()))
            })
            .collect()
    }

    fn wire_taps(&mut self) -> ModuleResult<()> {
        let dest = self.host.destination();
        let analyser = &self.modules.analyser;
        let recorder = self.modules.recorder.processor();
        let sender = self.modules.session.sender();

        for node in [self.mastervolume, analyser.output(), recorder, sender] {
            self.host.disconnect(node)?;
        }
        for (from, to) in [
            (self.mastervolume, analyser.input()),
            (analyser.output(), dest),
            (self.mastervolume, recorder),
            (recorder, dest),
            (self.mastervolume, sender),
            (sender, dest),
        ] {
            self.host.connect(from, to)?;
        }
        Ok(())
    }

    /// Reads a module-level parameter.
    pub fn param(&self, name: &str) -> ModuleResult<f32> {
        match name.parse::<ParamKey>()? {
            ParamKey::MasterVolume => Ok(self.host.param(self.mastervolume, ParamName::Gain)?),
        }
    }

    /// Writes a module-level parameter.
    ///
    /// The range comes from the host, or `[0, 1]` when the host reports none.
    /// Out-of-range values (NaN included) leave the parameter unchanged.
    pub fn set_param(&mut self, name: &str, value: f32) -> ModuleResult<()> {
        let key = name.parse::<ParamKey>()?;
        let (node, param) = match key {
            ParamKey::MasterVolume => (self.mastervolume, ParamName::Gain),
        };
        let (min, max) = self.host.param_range(node, param).unwrap_or((0.0, 1.0));
        if !(min..=max).contains(&value) {
            warn!(param = key.name(), value, min, max, "rejected out-of-range value");
            return Err(ModuleError::OutOfRange {
                param: key.name().to_string(),
                value,
                min,
                max,
            });
        }
        self.host.set_param(node, param, value)?;
        Ok(())
    }

    /// Writes a module-level parameter from text such as `"0.5"`, `"50%"`
    /// or `"-6dB"`.
    pub fn set_param_str(&mut self, name: &str, text: &str) -> ModuleResult<()> {
        let value =
            parse_param_value(text, ParamUnit::Ratio).ok_or_else(|| ModuleError::InvalidValue {
                param: name.to_string(),
                value: text.to_string(),
            })?;
        self.set_param(name, value)
    }

    /// Looks up a sub-module, then extensions, then plugins.
    pub fn module(&self, name: &str) -> Option<ModuleRef<'_>> {
        if let Ok(id) = name.parse::<ModuleId>() {
            return Some(self.module_by_id(id));
        }
        let key = normalize_key(name);
        find(&self.extensions, &key)
            .or_else(|| find(&self.plugins, &key))
            .map(ModuleRef::Effect)
    }

    /// A built-in sub-module.
    pub fn module_by_id(&self, id: ModuleId) -> ModuleRef<'_> {
        match self.modules.effect(id) {
            Some(effect) => ModuleRef::Effect(effect),
            None => ModuleRef::EnvelopeGenerator(&self.modules.envelope),
        }
    }

    /// Mutable access to a sub-module, extension or plugin.
    pub fn module_mut(&mut self, name: &str) -> Option<ModuleHandle<'_>> {
        let host: &mut dyn AudioHost = &mut self.host;
        let target = match name.parse::<ModuleId>() {
            Ok(ModuleId::EnvelopeGenerator) => Target::Envelope(&mut self.modules.envelope),
            Ok(id) => Target::Effect(self.modules.effect_mut(id)?),
            Err(_) => {
                let key = normalize_key(name);
                let (_, effect) = self
                    .extensions
                    .iter_mut()
                    .chain(self.plugins.iter_mut())
                    .find(|(n, _)| *n == key)?;
                Target::Effect(effect.as_mut())
            }
        };
        Some(ModuleHandle { target, host })
    }

    /// Registers a module owned by a source type built on this one.
    pub fn attach(&mut self, name: &str, module: Box<dyn Effector>) -> ModuleResult<()> {
        let key = plugin_key(name)?;
        debug!(name = %key, kind = module.kind(), "extension attached");
        self.extensions.push((key, module));
        Ok(())
    }

    /// Installs a plugin under `name`.
    ///
    /// Names are lowercased with hyphens and underscores removed. Names that
    /// end up empty are rejected and the registry is left as it was.
    pub fn install(&mut self, name: &str, plugin: Box<dyn Effector>) -> ModuleResult<()> {
        let key = plugin_key(name)?;
        debug!(name = %key, kind = plugin.kind(), "plugin installed");
        self.plugins.push((key, plugin));
        Ok(())
    }

    /// Builds a plugin against the host and installs it.
    pub fn install_with<F>(&mut self, name: &str, factory: F) -> ModuleResult<()>
    where
        F: FnOnce(&mut dyn AudioHost) -> Box<dyn Effector>,
    {
        plugin_key(name)?;
        let plugin = factory(&mut self.host);
        self.install(name, plugin)
    }

    /// Installed plugin names in install order.
    pub fn plugins(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|(name, _)| name.as_str())
    }

    /// Attached extension names.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(|(name, _)| name.as_str())
    }

    /// Starts modulated effects and every plugin.
    ///
    /// `when` is moved up to the current host time; `None` or NaN means now.
    /// Returns the time actually used.
    pub fn on(&mut self, when: Option<f64>) -> ModuleResult<f64> {
        let when = self.effective_time(when);
        for id in ModuleId::STARTED_BY_ON {
            if let Some(effect) = self.modules.effect_mut(id) {
                effect.start(&mut self.host, when)?;
            }
        }
        for (_, plugin) in &mut self.plugins {
            plugin.start(&mut self.host, when)?;
        }
        Ok(when)
    }

    /// Stops modulated effects and every plugin.
    ///
    /// The filter is left running; its envelope is released by the source
    /// types that drive it.
    pub fn off(&mut self, when: Option<f64>) -> ModuleResult<f64> {
        let when = self.effective_time(when);
        for id in ModuleId::STOPPED_BY_OFF {
            if let Some(effect) = self.modules.effect_mut(id) {
                effect.stop(&mut self.host, when)?;
            }
        }
        for (_, plugin) in &mut self.plugins {
            plugin.stop(&mut self.host, when)?;
        }
        Ok(when)
    }

    fn effective_time(&self, when: Option<f64>) -> f64 {
        let now = self.host.current_time();
        match when {
            Some(t) if !t.is_nan() => t.max(now),
            _ => now,
        }
    }

    /// Captures the master volume and every module's parameters.
    pub fn snapshot(&self) -> ModuleResult<ModuleSnapshot> {
        let host: &dyn AudioHost = &self.host;
        let mut modules = Vec::new();

        let fixed = ModuleId::DEFAULT_ORDER
            .into_iter()
            .chain([ModuleId::Analyser, ModuleId::EnvelopeGenerator, ModuleId::Listener]);
        for id in fixed {
            modules.push((id.name().to_string(), self.module_by_id(id).snapshot(host)?));
        }
        for (name, effect) in self.extensions.iter().chain(&self.plugins) {
            modules.push((name.clone(), effect.snapshot(host)?));
        }

        Ok(ModuleSnapshot {
            buffer_size: self.buffer_size,
            mastervolume: self.param(ParamKey::MasterVolume.name())?,
            modules,
        })
    }

    /// Renders [`snapshot()`](Self::snapshot) as pretty JSON.
    pub fn to_json(&self) -> ModuleResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot()?)?)
    }

    /// Frames per processing callback.
    pub fn buffer_size(&self) -> BufferSize {
        self.buffer_size
    }

    /// The master volume gain node.
    pub fn mastervolume(&self) -> NodeId {
        self.mastervolume
    }

    /// The block-processing node for source types.
    pub fn processor(&self) -> NodeId {
        self.modules.processor
    }

    /// The host graph.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host graph, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Every built-in sub-module.
    pub fn modules(&self) -> &Modules {
        &self.modules
    }

    /// The host and the sub-modules, for calls that need both.
    pub fn parts_mut(&mut self) -> (&mut H, &mut Modules) {
        (&mut self.host, &mut self.modules)
    }

    /// Gives the host back.
    pub fn into_host(self) -> H {
        self.host
    }
}

fn find<'a>(registry: &'a Registry, key: &str) -> Option<&'a dyn Effector> {
    registry
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, effect)| effect.as_ref())
}

fn plugin_key(name: &str) -> ModuleResult<String> {
    let key = normalize_key(name);
    if key.is_empty() {
        warn!(name, "rejected plugin name");
        return Err(ModuleError::InvalidPluginName(name.to_string()));
    }
    Ok(key)
}
