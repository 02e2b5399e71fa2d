//! Equal-power stereo panning from quarter-wave table lookups.
//!
//! The pan position `[-1, 1]` is mapped onto the first quarter of the cosine
//! and sine cycles, so the left weight falls from 1 to 0 while the right weight
//! rises from 0 to 1 and `left² + right² = 1` holds at every position.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use crate::wavetable::{Waveform, Wavetable, WavetableCache};

/// Stateless equal-power panner.
///
/// Holds shared handles to the cache's cosine and sine tables.
///
/// # Example
///
/// ```rust
/// use klimper_core::{Panner, WavetableCache};
///
/// let panner = Panner::new(&WavetableCache::default());
///
/// let (l, r) = panner.pan(1.0, 0.0);
/// assert!((l - r).abs() < 1e-3);
/// assert!((l * l + r * r - 1.0).abs() < 1e-3);
///
/// let (l, r) = panner.pan(0.5, -1.0);
/// assert!((l - 0.5).abs() < 1e-6);
/// assert!(r.abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct Panner {
    cosine: Arc<Wavetable>,
    sine: Arc<Wavetable>,
    quarter_scale: f32,
}

impl Panner {
    /// Creates a panner reading from `cache`.
    pub fn new(cache: &WavetableCache) -> Self {
        let cosine = cache.get(Waveform::Cosine);
        let sine = cache.get(Waveform::Sine);
        let quarter_scale = 0.125 * cosine.len() as f32;
        Self {
            cosine,
            sine,
            quarter_scale,
        }
    }

    /// Splits `sample` into `(left, right)` for pan position `pan`.
    ///
    /// `pan` is clamped to `[-1, 1]`; -1 is hard left.
    #[inline]
    pub fn pan(&self, sample: f32, pan: f32) -> (f32, f32) {
        let index = (pan.clamp(-1.0, 1.0) + 1.0) * self.quarter_scale;
        (
            sample * self.cosine.read(index),
            sample * self.sine.read(index),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_equal_split() {
        let panner = Panner::new(&WavetableCache::default());
        let (l, r) = panner.pan(1.0, 0.0);
        let expected = core::f32::consts::FRAC_1_SQRT_2;
        assert!((l - expected).abs() < 1e-3, "left {l}");
        assert!((r - expected).abs() < 1e-3, "right {r}");
    }

    #[test]
    fn test_hard_right() {
        let panner = Panner::new(&WavetableCache::default());
        let (l, r) = panner.pan(0.8, 1.0);
        assert!(l.abs() < 1e-6, "left should be silent, got {l}");
        assert!((r - 0.8).abs() < 1e-6, "right should carry the sample, got {r}");
    }

    #[test]
    fn test_out_of_range_pan_is_clamped() {
        let panner = Panner::new(&WavetableCache::default());
        assert_eq!(panner.pan(1.0, 4.0), panner.pan(1.0, 1.0));
        assert_eq!(panner.pan(1.0, -9.0), panner.pan(1.0, -1.0));
    }

    #[test]
    fn test_equal_power_sweep() {
        let panner = Panner::new(&WavetableCache::default());
        for step in 0..=200 {
            let pan = -1.0 + step as f32 * 0.01;
            let (l, r) = panner.pan(0.7, pan);
            let power = l * l + r * r;
            assert!(
                (power - 0.49).abs() < 1e-3,
                "pan {pan}: power {power} should equal 0.49"
            );
        }
    }
}
