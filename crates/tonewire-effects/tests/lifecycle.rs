//! Start/stop and release behavior across the chain effects.

use tonewire_core::{AudioHost, HostGraph, NodeKind, ParamName};
use tonewire_effects::{
    Autopanner, Compressor, Delay, Effector, Filter, ModulatedDelay, Phaser, RingModulator,
    Tremolo, Wah,
};

fn lfo_effects(host: &mut HostGraph) -> Vec<Box<dyn Effector>> {
    vec![
        Box::new(Wah::new(host).unwrap()),
        Box::new(Autopanner::new(host).unwrap()),
        Box::new(Tremolo::new(host).unwrap()),
        Box::new(RingModulator::new(host).unwrap()),
        Box::new(Phaser::new(host).unwrap()),
        Box::new(ModulatedDelay::flanger(host).unwrap()),
        Box::new(ModulatedDelay::chorus(host).unwrap()),
    ]
}

#[test]
fn restarts_replace_the_oscillator() {
    let mut host = HostGraph::new(48000.0);
    let mut effects = lfo_effects(&mut host);
    let mut settled = 0;
    for round in 0..3 {
        for effect in &mut effects {
            effect.start(&mut host, f64::from(round)).unwrap();
            assert!(effect.is_running(), "{} not running", effect.kind());
        }
        if round == 0 {
            settled = host.node_count();
        }
    }
    assert_eq!(host.count_kind(NodeKind::Oscillator), effects.len());
    assert_eq!(host.node_count(), settled);
}

#[test]
fn stop_then_start_again() {
    let mut host = HostGraph::new(48000.0);
    let mut effects = lfo_effects(&mut host);
    for effect in &mut effects {
        effect.start(&mut host, 0.0).unwrap();
        effect.stop(&mut host, 1.0).unwrap();
        assert!(!effect.is_running());
        effect.start(&mut host, 2.0).unwrap();
        assert!(effect.is_running(), "{} failed to restart", effect.kind());
    }
}

#[test]
fn static_effects_ignore_start() {
    let mut host = HostGraph::new(48000.0);
    let mut comp = Compressor::new(&mut host).unwrap();
    let mut delay = Delay::new(&mut host).unwrap();
    comp.start(&mut host, 0.0).unwrap();
    delay.start(&mut host, 0.0).unwrap();
    assert!(!comp.is_running());
    assert!(!delay.is_running());
    assert_eq!(host.count_kind(NodeKind::Oscillator), 0);
}

#[test]
fn release_detaches_and_stops() {
    let mut host = HostGraph::new(48000.0);
    let mut wah = Wah::new(&mut host).unwrap();
    wah.set_active(&mut host, true).unwrap();
    wah.start(&mut host, 0.0).unwrap();
    host.set_current_time(4.0);

    wah.release(&mut host).unwrap();
    assert!(!wah.is_running());
    for node in wah.nodes() {
        assert!(host.outputs(node).is_empty());
    }
    let osc = wah.lfo().oscillator().unwrap();
    assert_eq!(host.stop_time(osc), Some(4.0));
}

#[test]
fn filter_is_envelope_not_oscillator() {
    let mut host = HostGraph::new(48000.0);
    let mut filter = Filter::new(&mut host).unwrap();
    filter.set_active(&mut host, true).unwrap();
    filter.start(&mut host, 0.0).unwrap();
    assert!(filter.is_running());
    assert_eq!(host.count_kind(NodeKind::Oscillator), 0);
}

#[test]
fn bypassed_lfo_runs_but_bypassed_filter_waits() {
    let mut host = HostGraph::new(48000.0);
    let mut wah = Wah::new(&mut host).unwrap();
    let mut filter = Filter::new(&mut host).unwrap();
    assert!(!wah.is_active());
    assert!(!filter.is_active());

    wah.start(&mut host, 0.0).unwrap();
    filter.start(&mut host, 0.0).unwrap();
    assert!(wah.is_running());
    assert!(!filter.is_running());
    assert!(host.automation(filter.node(), ParamName::Frequency).is_empty());

    let osc = wah.lfo().oscillator().unwrap();
    host.set_current_time(1.0);
    wah.set_active(&mut host, true).unwrap();
    assert_eq!(wah.lfo().oscillator(), Some(osc));
    assert!(host.is_playing(osc));
    assert!(host.has_path(wah.input(), wah.filter()));
}
