//! Wavetable oscillator with a frequency-modulation input.
//!
//! The phase is a fractional index into the table rather than a normalized
//! `[0, 1)` value, so one tick is an interpolated read plus an add.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use klimper_core::Wavetable;
use libm::floorf;

/// FM depth scale applied to the modulation input.
///
/// Tuned by ear rather than derived; override it with
/// [`WavetableOscillator::set_fm_depth`].
pub const DEFAULT_FM_DEPTH: f32 = 0.01;

/// Euclidean remainder for f32, compatible with no_std.
#[inline]
fn rem_euclid_f32(a: f32, b: f32) -> f32 {
    let r = a - b * floorf(a / b);
    if r < 0.0 { r + b } else { r }
}

/// Phase-accumulator oscillator reading a shared [`Wavetable`].
///
/// # Example
///
/// ```rust
/// use klimper_core::{Waveform, WavetableCache};
/// use klimper_synth::WavetableOscillator;
///
/// let cache = WavetableCache::default();
/// let mut osc = WavetableOscillator::new(cache.get(Waveform::Sine), 44100.0);
/// osc.reinit(440.0, true);
///
/// // The first tick returns the sample at phase 0
/// assert!(osc.tick(0.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct WavetableOscillator {
    table: Arc<Wavetable>,
    table_len: f32,
    sample_rate: f32,
    frequency: f32,
    /// Table units per sample
    increment: f32,
    /// Current position in [0, table_len)
    phase: f32,
    /// Table units per unit of FM input
    fm_scale: f32,
    fm_depth: f32,
}

impl WavetableOscillator {
    /// Creates a silent oscillator (0 Hz) at phase 0.
    pub fn new(table: Arc<Wavetable>, sample_rate: f32) -> Self {
        let table_len = table.len() as f32;
        Self {
            table,
            table_len,
            sample_rate,
            frequency: 0.0,
            increment: 0.0,
            phase: 0.0,
            fm_scale: table_len * DEFAULT_FM_DEPTH,
            fm_depth: DEFAULT_FM_DEPTH,
        }
    }

    /// Sets the frequency and, when `reset_phase` is true, restarts the cycle at phase 0.
    pub fn reinit(&mut self, frequency: f32, reset_phase: bool) {
        self.frequency = frequency;
        self.increment = frequency * self.table_len / self.sample_rate;
        if reset_phase {
            self.phase = 0.0;
        }
    }

    /// Changes the sample rate, keeping the current frequency.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.reinit(self.frequency, false);
    }

    /// Sets how far one unit of FM input moves the phase, as a fraction of a cycle.
    pub fn set_fm_depth(&mut self, depth: f32) {
        self.fm_depth = depth;
        self.fm_scale = self.table_len * depth;
    }

    /// Reads the current sample, then advances the phase.
    ///
    /// `fm_input` is added to the phase increment scaled by the FM depth.
    #[inline]
    pub fn tick(&mut self, fm_input: f32) -> f32 {
        let sample = self.table.read(self.phase);

        let mut phase = self.phase + self.increment + fm_input * self.fm_scale;
        if phase >= self.table_len {
            phase -= self.table_len;
        } else if phase < 0.0 {
            phase += self.table_len;
        }
        // Only reached with increments beyond one cycle per sample.
        if !(0.0..self.table_len).contains(&phase) {
            phase = rem_euclid_f32(phase, self.table_len);
            if !(0.0..self.table_len).contains(&phase) {
                phase = 0.0;
            }
        }
        self.phase = phase;

        sample
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Phase increment in table units per sample.
    pub fn increment(&self) -> f32 {
        self.increment
    }

    /// Current phase in table units.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// FM depth scale.
    pub fn fm_depth(&self) -> f32 {
        self.fm_depth
    }

    /// Length of the table this oscillator reads.
    pub fn table_len(&self) -> f32 {
        self.table_len
    }
}
