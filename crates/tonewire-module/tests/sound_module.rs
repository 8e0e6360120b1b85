//! Wiring, registry and start/stop behavior of a whole sound module.

use tonewire_core::{AudioHost, HostGraph, NodeId, NodeKind, ParamDescriptor, ParamName};
use tonewire_effects::{EffectError, EffectIo, EffectResult, Effector, validate_param};
use tonewire_module::{BufferSize, ChainSlot, ModuleError, ModuleId, SoundModule};

/// Gain stage that records start/stop calls.
struct Boost {
    io: EffectIo,
    amp: NodeId,
    running: bool,
}

impl Boost {
    fn new(host: &mut dyn AudioHost) -> Self {
        let amp = host.create_node(NodeKind::Gain);
        let mut boost = Self {
            io: EffectIo::new(host, true),
            amp,
            running: false,
        };
        boost.set_active(host, true).unwrap();
        boost
    }
}

impl Effector for Boost {
    fn kind(&self) -> &'static str {
        "boost"
    }

    fn input(&self) -> NodeId {
        self.io.input
    }

    fn output(&self) -> NodeId {
        self.io.output
    }

    fn nodes(&self) -> Vec<NodeId> {
        vec![self.io.input, self.io.output, self.amp]
    }

    fn is_active(&self) -> bool {
        self.io.is_active()
    }

    fn set_active(&mut self, host: &mut dyn AudioHost, active: bool) -> EffectResult<()> {
        self.io.set_active(active);
        Ok(self.io.series(host, &[self.amp])?)
    }

    fn start(&mut self, _host: &mut dyn AudioHost, _when: f64) -> EffectResult<()> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self, _host: &mut dyn AudioHost, _when: f64) -> EffectResult<()> {
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn param_count(&self) -> usize {
        1
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        (index == 0).then(|| ParamDescriptor::ratio("gain", 1.0))
    }

    fn get_param(&self, host: &dyn AudioHost, _index: usize) -> EffectResult<f32> {
        Ok(host.param(self.amp, ParamName::Gain)?)
    }

    fn set_param(
        &mut self,
        host: &mut dyn AudioHost,
        index: usize,
        value: f32,
    ) -> EffectResult<()> {
        validate_param(self, index, value)?;
        Ok(host.set_param(self.amp, ParamName::Gain, value)?)
    }
}

fn module() -> SoundModule<HostGraph> {
    SoundModule::new(HostGraph::new(48000.0), Some(2048)).unwrap()
}

fn source(m: &mut SoundModule<HostGraph>) -> NodeId {
    m.host_mut().create_node(NodeKind::Oscillator)
}

fn io(m: &SoundModule<HostGraph>, id: ModuleId) -> (NodeId, NodeId) {
    let module = m.module_by_id(id);
    let effect = module.as_effect().unwrap();
    (effect.input(), effect.output())
}

#[test]
fn every_valid_buffer_size_constructs() {
    for size in BufferSize::ALL {
        let m = SoundModule::new(HostGraph::new(44100.0), Some(size.frames())).unwrap();
        assert_eq!(m.buffer_size(), size);
    }
}

#[test]
fn invalid_buffer_size_is_rejected() {
    for frames in [0, 100, 1000, 32768] {
        let result = SoundModule::new(HostGraph::new(44100.0), Some(frames));
        assert!(matches!(result, Err(ModuleError::InvalidBufferSize(f)) if f == frames));
    }
}

#[test]
fn platform_picks_buffer_size() {
    let m = SoundModule::with_platform(HostGraph::new(48000.0), "Mozilla/5.0 (X11; Linux x86_64)")
        .unwrap();
    assert_eq!(m.buffer_size(), BufferSize::S8192);
}

#[test]
fn default_order_wiring() {
    let mut m = module();
    let src = source(&mut m);
    m.connect(src, None).unwrap();

    let host = m.host();
    let (first_in, _) = io(&m, ModuleId::Panner);
    assert!(host.is_connected(src, first_in));

    for pair in ModuleId::DEFAULT_ORDER.windows(2) {
        let (_, out) = io(&m, pair[0]);
        let (next_in, _) = io(&m, pair[1]);
        assert!(host.is_connected(out, next_in), "{} -> {}", pair[0], pair[1]);
    }

    let (_, last_out) = io(&m, ModuleId::Reverb);
    let mv = m.mastervolume();
    assert!(host.is_connected(last_out, mv));

    let analyser = &m.modules().analyser;
    assert!(host.is_connected(mv, analyser.input()));
    assert!(host.is_connected(analyser.output(), host.destination()));
    assert!(host.has_path(src, host.destination()));
}

#[test]
fn custom_order_wires_exactly_those_modules() {
    let mut m = module();
    let src = source(&mut m);
    let order = [
        ChainSlot::Builtin(ModuleId::Delay),
        ChainSlot::Builtin(ModuleId::Compressor),
        ChainSlot::Builtin(ModuleId::Tremolo),
    ];
    m.connect(src, Some(&order)).unwrap();

    let host = m.host();
    let (delay_in, delay_out) = io(&m, ModuleId::Delay);
    let (comp_in, comp_out) = io(&m, ModuleId::Compressor);
    let (trem_in, trem_out) = io(&m, ModuleId::Tremolo);
    assert_eq!(host.outputs(src).len(), 1);
    assert!(host.is_connected(src, delay_in));
    assert!(host.is_connected(delay_out, comp_in));
    assert!(host.is_connected(comp_out, trem_in));
    assert!(host.is_connected(trem_out, m.mastervolume()));

    let (panner_in, _) = io(&m, ModuleId::Panner);
    assert!(!host.has_path(src, panner_in));
}

#[test]
fn rewiring_replaces_previous_chain() {
    let mut m = module();
    let src = source(&mut m);
    m.connect(src, None).unwrap();
    m.connect(src, Some(&[ChainSlot::Builtin(ModuleId::Reverb)]))
        .unwrap();

    let (panner_in, _) = io(&m, ModuleId::Panner);
    let (reverb_in, _) = io(&m, ModuleId::Reverb);
    assert!(!m.host().is_connected(src, panner_in));
    assert!(m.host().is_connected(src, reverb_in));
}

#[test]
fn empty_order_connects_source_to_mastervolume() {
    let mut m = module();
    let src = source(&mut m);
    m.connect(src, Some(&[])).unwrap();

    let host = m.host();
    assert_eq!(host.outputs(src).len(), 1);
    assert!(host.is_connected(src, m.mastervolume()));
}

#[test]
fn taps_reach_destination() {
    let mut m = module();
    let src = source(&mut m);
    m.connect(src, Some(&[])).unwrap();

    let host = m.host();
    let dest = host.destination();
    let recorder = m.modules().recorder.processor();
    let sender = m.modules().session.sender();
    assert!(host.is_connected(m.mastervolume(), recorder));
    assert!(host.is_connected(recorder, dest));
    assert!(host.is_connected(m.mastervolume(), sender));
    assert!(host.is_connected(sender, dest));
}

#[test]
fn mastervolume_range() {
    let mut m = module();
    m.set_param("mastervolume", 0.25).unwrap();
    assert_eq!(m.param("masterVolume").unwrap(), 0.25);

    for bad in [1.5, -0.1, f32::NAN] {
        let err = m.set_param("mastervolume", bad).unwrap_err();
        assert!(matches!(err, ModuleError::OutOfRange { .. }));
        assert_eq!(m.param("mastervolume").unwrap(), 0.25);
    }

    m.set_param_str("master-volume", "50%").unwrap();
    assert_eq!(m.param("mastervolume").unwrap(), 0.5);
    assert!(matches!(
        m.set_param("volume", 0.5),
        Err(ModuleError::UnknownParam(_))
    ));
}

#[test]
fn mastervolume_uses_host_range() {
    let mut m = SoundModule::new(HostGraph::new(48000.0), Some(1024)).unwrap();
    let mv = m.mastervolume();
    m.host_mut()
        .set_param_range(mv, ParamName::Gain, Some((0.0, 2.0)))
        .unwrap();

    m.set_param("mastervolume", 1.5).unwrap();
    assert_eq!(m.param("mastervolume").unwrap(), 1.5);
    assert!(m.set_param("mastervolume", 2.5).is_err());
}

#[test]
fn installed_plugin_is_found_case_insensitively() {
    let mut m = module();
    m.install_with("My-Boost", |host| Box::new(Boost::new(host)))
        .unwrap();

    let plugin = m.module("myboost").unwrap();
    assert_eq!(plugin.kind(), "boost");
    assert_eq!(m.module("MYBOOST").unwrap().kind(), "boost");
    assert_eq!(m.plugins().collect::<Vec<_>>(), ["myboost"]);
}

#[test]
fn invalid_plugin_name_leaves_registry_unchanged() {
    let mut m = module();
    m.install_with("fuzz", |host| Box::new(Boost::new(host)))
        .unwrap();

    let mut built = false;
    let result = m.install_with("--", |host| {
        built = true;
        Box::new(Boost::new(host))
    });
    assert!(matches!(result, Err(ModuleError::InvalidPluginName(_))));
    assert!(!built);
    assert_eq!(m.plugins().count(), 1);
}

#[test]
fn duplicate_plugin_names_resolve_to_first_install() {
    let mut m = module();
    let mut first_input = None;
    m.install_with("dup", |host| {
        let boost = Boost::new(host);
        first_input = Some(boost.input());
        Box::new(boost)
    })
    .unwrap();
    m.install_with("D-U-P", |host| Box::new(Boost::new(host)))
        .unwrap();

    assert_eq!(m.plugins().collect::<Vec<_>>(), ["dup", "dup"]);
    let found = m.module("dup").unwrap().as_effect().unwrap().input();
    assert_eq!(Some(found), first_input);
    let found = m.module("D_U_P").unwrap().as_effect().unwrap().input();
    assert_eq!(Some(found), first_input);
}

#[test]
fn always_on_modules_refuse_to_switch() {
    let mut m = module();
    for name in ["analyser", "listener", "recorder"] {
        let result = m.module_mut(name).unwrap().set_active(false);
        assert!(
            matches!(result, Err(ModuleError::Effect(EffectError::NotSwitchable { .. }))),
            "{name} accepted set_active(false)"
        );
        assert!(m.module_mut(name).unwrap().is_active(), "{name} switched off");
    }

    let mut eg = m.module_mut("envelopegenerator").unwrap();
    assert!(matches!(
        eg.set_active(true),
        Err(ModuleError::Effect(EffectError::NotSwitchable {
            effect: "envelopegenerator"
        }))
    ));
    assert!(!eg.is_active());
}

#[test]
fn builtin_names_win_over_plugins() {
    let mut m = module();
    m.install_with("delay", |host| Box::new(Boost::new(host)))
        .unwrap();
    assert_eq!(m.module("delay").unwrap().kind(), "delay");
}

#[test]
fn plugin_joins_chain() {
    let mut m = module();
    m.install_with("boost", |host| Box::new(Boost::new(host)))
        .unwrap();
    let src = source(&mut m);
    let order = [
        ChainSlot::Builtin(ModuleId::Compressor),
        ChainSlot::parse("Boost"),
    ];
    m.connect(src, Some(&order)).unwrap();

    let module = m.module("boost").unwrap();
    let plugin = module.as_effect().unwrap();
    let (_, comp_out) = io(&m, ModuleId::Compressor);
    assert!(m.host().is_connected(comp_out, plugin.input()));
    assert!(m.host().is_connected(plugin.output(), m.mastervolume()));
}

#[test]
fn on_and_off_reach_plugins() {
    let mut m = module();
    m.install_with("boost", |host| Box::new(Boost::new(host)))
        .unwrap();

    m.on(None).unwrap();
    assert!(m.module("boost").unwrap().as_effect().unwrap().is_running());
    m.off(None).unwrap();
    assert!(!m.module("boost").unwrap().as_effect().unwrap().is_running());
}

#[test]
fn on_starts_modulated_effects() {
    let mut m = module();
    m.host_mut().set_current_time(1.0);
    let at = m.on(Some(0.5)).unwrap();
    assert_eq!(at, 1.0);

    for id in [ModuleId::Wah, ModuleId::Tremolo, ModuleId::Chorus] {
        assert!(m.module_by_id(id).as_effect().unwrap().is_running(), "{id}");
    }
    assert!(!m.module_by_id(ModuleId::Delay).as_effect().unwrap().is_running());

    m.off(Some(2.0)).unwrap();
    assert!(!m.module_by_id(ModuleId::Wah).as_effect().unwrap().is_running());
}

#[test]
fn off_never_touches_filter() {
    let mut m = module();
    m.module_mut("filter").unwrap().set_active(true).unwrap();

    m.on(None).unwrap();
    let filter = |m: &SoundModule<HostGraph>| {
        m.module_by_id(ModuleId::Filter)
            .as_effect()
            .unwrap()
            .is_running()
    };
    assert!(filter(&m));
    m.off(None).unwrap();
    assert!(filter(&m));

    m.module_mut("filter").unwrap().stop(0.0).unwrap();
    assert!(!filter(&m));
    m.off(None).unwrap();
    assert!(!filter(&m));
}

#[test]
fn resize_rebuilds_and_keeps_volume() {
    let mut m = module();
    m.install_with("boost", |host| Box::new(Boost::new(host)))
        .unwrap();
    m.set_param("mastervolume", 0.3).unwrap();
    let old_delay = io(&m, ModuleId::Delay).0;

    m.resize(512).unwrap();
    assert_eq!(m.buffer_size(), BufferSize::S512);
    assert_eq!(m.param("mastervolume").unwrap(), 0.3);
    assert_eq!(m.plugins().count(), 0);
    assert_ne!(io(&m, ModuleId::Delay).0, old_delay);
    assert!(m.host().outputs(old_delay).is_empty());
    assert_eq!(
        m.host().node_kind(m.processor()).unwrap(),
        NodeKind::ScriptProcessor { buffer_size: 512 }
    );

    assert!(matches!(
        m.resize(3000),
        Err(ModuleError::InvalidBufferSize(3000))
    ));
    assert_eq!(m.buffer_size(), BufferSize::S512);
}

#[test]
fn extensions_are_looked_up_before_plugins() {
    let mut m = module();
    m.install_with("voice", |host| Box::new(Boost::new(host)))
        .unwrap();
    let ext = Boost::new(m.host_mut());
    let ext_in = ext.input();
    m.attach("voice", Box::new(ext)).unwrap();

    let module = m.module("voice").unwrap();
    let found = module.as_effect().unwrap();
    assert_eq!(found.input(), ext_in);
    assert_eq!(m.extensions().collect::<Vec<_>>(), ["voice"]);
}

#[test]
fn handles_set_effect_params() {
    let mut m = module();
    {
        let mut reverb = m.module_mut("reverb").unwrap();
        reverb.set_active(true).unwrap();
        reverb.set_param("dry", 0.4).unwrap();
        assert!(reverb.is_active());
    }
    assert!(m.module_mut("nope").is_none());

    let snap = m.snapshot().unwrap();
    let (_, reverb) = snap.modules.iter().find(|(n, _)| n == "reverb").unwrap();
    assert!(reverb.active);
    assert!((reverb.params["dry"] - 0.4).abs() < 1e-6);
}

#[test]
fn snapshot_lists_plugins_last() {
    let mut m = module();
    m.install_with("boost", |host| Box::new(Boost::new(host)))
        .unwrap();
    m.set_param("mastervolume", 0.7).unwrap();

    let snap = m.snapshot().unwrap();
    assert_eq!(snap.mastervolume, 0.7);
    let (name, last) = snap.modules.last().unwrap();
    assert_eq!(name, "boost");
    assert_eq!(last.kind, "boost");

    let json = m.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["buffer_size"], 2048);
}
