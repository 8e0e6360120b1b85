//! Waveshaping distortion.
//!
//! The host waveshaper applies a soft-clip transfer curve generated from
//! `amount`; a lowpass tames the fizz and an output gain sets the level.
//!
//! # Signal Flow
//!
//! ```text
//! Input → WaveShaper(curve) → Lowpass(tone) → Gain(level) → Output
//! ```

use tonewire_core::{
    AudioHost, FilterType, NodeId, NodeKind, ParamDescriptor, ParamName,
};

use crate::effector::{EffectIo, Effector, validate_param};
use crate::error::{EffectError, EffectResult};

/// Number of points in the generated transfer curve.
pub const CURVE_SIZE: usize = 4096;

/// Soft-clip transfer curve `y = (1 + k)x / (1 + k|x|)` with `k = 2a / (1 - a)`.
///
/// `amount` 0 yields the identity line; values approaching 1 approach a
/// hard clip.
pub fn soft_clip_curve(amount: f32) -> Vec<f32> {
    let a = amount.clamp(0.0, 0.999);
    let k = 2.0 * a / (1.0 - a);
    (0..CURVE_SIZE)
        .map(|i| {
            let x = (i as f32 * 2.0) / (CURVE_SIZE - 1) as f32 - 1.0;
            ((1.0 + k) * x) / (1.0 + k * x.abs())
        })
        .collect()
}

/// Waveshaping distortion. Inactive by default.
#[derive(Debug, Clone)]
pub struct Distortion {
    io: EffectIo,
    shaper: NodeId,
    tone: NodeId,
    level: NodeId,
    amount: f32,
    nyquist: f32,
}

impl Distortion {
    /// Creates the distortion nodes.
    pub fn new(host: &mut dyn AudioHost) -> EffectResult<Self> {
        let io = EffectIo::new(host, false);
        let shaper = host.create_node(NodeKind::WaveShaper);
        let tone = host.create_node(NodeKind::BiquadFilter);
        let level = host.create_node(NodeKind::Gain);
        let mut effect = Self {
            io,
            shaper,
            tone,
            level,
            amount: 0.0,
            nyquist: host.sample_rate() / 2.0,
        };
        host.set_filter_type(tone, FilterType::Lowpass)?;
        for index in 0..effect.param_count() {
            if let Some(desc) = effect.param_info(index) {
                effect.set_param(host, index, desc.default)?;
            }
        }
        effect.wire(host)?;
        Ok(effect)
    }

    fn wire(&self, host: &mut dyn AudioHost) -> EffectResult<()> {
        Ok(self.io.series(host, &[self.shaper, self.tone, self.level])?)
    }

    /// The host waveshaper node.
    pub fn shaper(&self) -> NodeId {
        self.shaper
    }
}

impl Effector for Distortion {
    fn kind(&self) -> &'static str {
        "distortion"
    }

    fn input(&self) -> NodeId {
        self.io.input
    }

    fn output(&self) -> NodeId {
        self.io.output
    }

    fn nodes(&self) -> Vec<NodeId> {
        vec![
            self.io.input,
            self.io.output,
            self.shaper,
            self.tone,
            self.level,
        ]
    }

    fn is_active(&self) -> bool {
        self.io.is_active()
    }

    fn set_active(&mut self, host: &mut dyn AudioHost, active: bool) -> EffectResult<()> {
        self.io.set_active(active);
        self.wire(host)
    }

    fn param_count(&self) -> usize {
        3
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(ParamDescriptor::ratio("amount", 0.5)),
            1 => Some(ParamDescriptor::hertz("tone", 20.0, self.nyquist, 4000.0)),
            2 => Some(ParamDescriptor::ratio("level", 1.0)),
            _ => None,
        }
    }

    fn get_param(&self, host: &dyn AudioHost, index: usize) -> EffectResult<f32> {
        match index {
            0 => Ok(self.amount),
            1 => Ok(host.param(self.tone, ParamName::Frequency)?),
            2 => Ok(host.param(self.level, ParamName::Gain)?),
            _ => Err(EffectError::UnknownParam {
                effect: self.kind(),
                index,
            }),
        }
    }

    fn set_param(
        &mut self,
        host: &mut dyn AudioHost,
        index: usize,
        value: f32,
    ) -> EffectResult<()> {
        validate_param(self, index, value)?;
        match index {
            0 => {
                host.set_curve(self.shaper, soft_clip_curve(value))?;
                self.amount = value;
            }
            1 => host.set_param(self.tone, ParamName::Frequency, value)?,
            _ => host.set_param(self.level, ParamName::Gain, value)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonewire_core::HostGraph;

    #[test]
    fn zero_amount_is_identity() {
        let curve = soft_clip_curve(0.0);
        assert_eq!(curve.len(), CURVE_SIZE);
        assert!((curve[0] + 1.0).abs() < 1e-6);
        assert!((curve[CURVE_SIZE - 1] - 1.0).abs() < 1e-6);
        let mid = CURVE_SIZE / 4;
        let x = (mid as f32 * 2.0) / (CURVE_SIZE - 1) as f32 - 1.0;
        assert!((curve[mid] - x).abs() < 1e-6);
    }

    #[test]
    fn curve_is_monotonic_and_bounded() {
        for amount in [0.1, 0.5, 0.9, 1.0] {
            let curve = soft_clip_curve(amount);
            assert!(curve.windows(2).all(|w| w[1] >= w[0]));
            assert!(curve.iter().all(|y| y.abs() <= 1.0 + 1e-5));
        }
    }

    #[test]
    fn amount_regenerates_curve() {
        let mut host = HostGraph::new(48000.0);
        let mut dist = Distortion::new(&mut host).unwrap();
        assert_eq!(host.curve(dist.shaper()).unwrap(), soft_clip_curve(0.5).as_slice());
        dist.set_param(&mut host, 0, 0.8).unwrap();
        assert_eq!(host.curve(dist.shaper()).unwrap(), soft_clip_curve(0.8).as_slice());
        assert_eq!(dist.get_param(&host, 0).unwrap(), 0.8);
    }

    #[test]
    fn inactive_by_default() {
        let mut host = HostGraph::new(48000.0);
        let dist = Distortion::new(&mut host).unwrap();
        assert!(!dist.is_active());
        assert!(host.is_connected(dist.input(), dist.output()));
    }

    #[test]
    fn tone_limited_by_nyquist() {
        let mut host = HostGraph::new(44100.0);
        let mut dist = Distortion::new(&mut host).unwrap();
        assert!(dist.set_param(&mut host, 1, 22050.0).is_ok());
        assert!(dist.set_param(&mut host, 1, 22051.0).is_err());
    }
}
