//! Builds a sound module, wires a custom chain with a plugin, and prints the
//! resulting state.
//!
//! Run with: cargo run -p tonewire-module --example chain_demo
//! Set `RUST_LOG=debug` to see wiring events.

use tonewire_core::{AudioHost, HostGraph, NodeId, NodeKind, ParamDescriptor, ParamName};
use tonewire_effects::{EffectIo, EffectResult, Effector, validate_param};
use tonewire_module::{
    ChainSlot, ModuleError, ModuleHandle, ModuleId, ModuleResult, SoundModule,
};
use tracing_subscriber::EnvFilter;

/// Fixed-gain boost used as a plugin.
struct Boost {
    io: EffectIo,
    amp: NodeId,
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

fn handle<'a>(
    module: &'a mut SoundModule<HostGraph>,
    name: &str,
) -> ModuleResult<ModuleHandle<'a>> {
    module
        .module_mut(name)
        .ok_or_else(|| ModuleError::UnknownModule(name.to_string()))
}

fn main() -> ModuleResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    println!("=== Tonewire Chain Demo ===\n");

    let mut module = SoundModule::with_platform(HostGraph::new(48000.0), "Mozilla/5.0 (Macintosh)")?;
    println!("Buffer size: {} frames", module.buffer_size());

    module.install_with("boost", |host| {
        let amp = host.create_node(NodeKind::Gain);
        let io = EffectIo::new(host, false);
        Box::new(Boost { io, amp })
    })?;

    {
        let mut boost = handle(&mut module, "boost")?;
        boost.set_active(true)?;
        boost.set_param("gain", 0.8)?;
    }
    {
        let mut distortion = handle(&mut module, "distortion")?;
        distortion.set_active(true)?;
        distortion.set_param_str("amount", "60%")?;
    }
    {
        let mut delay = handle(&mut module, "delay")?;
        delay.set_active(true)?;
        delay.set_param_str("time", "300ms")?;
        delay.set_param("wet", 0.35)?;
    }
    module.set_param_str("mastervolume", "-3dB")?;

    let source = module.host_mut().create_node(NodeKind::Oscillator);
    let order = [
        ChainSlot::Builtin(ModuleId::Distortion),
        ChainSlot::parse("boost"),
        ChainSlot::Builtin(ModuleId::Delay),
    ];
    module.connect(source, Some(&order))?;

    let when = module.on(Some(0.1))?;
    println!("Started at t = {when:.2}s");
    println!(
        "Graph: {} nodes, {} edges",
        module.host().node_count(),
        module.host().edge_count()
    );

    println!("\nSnapshot:\n{}", module.to_json()?);

    module.host_mut().advance(2.0);
    let when = module.off(None)?;
    println!("\nStopped at t = {when:.2}s");

    Ok(())
}
