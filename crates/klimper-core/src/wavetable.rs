//! Single-cycle wavetables with guard-point wraparound.
//!
//! A [`Wavetable`] stores one period of a waveform sampled at `length` equally
//! spaced points over `[0, 2π)`, followed by `guards` copies of the first samples.
//! The guard points let [`Wavetable::read`] interpolate between the last sample
//! and the first without a branch or a modulo on the audio path.
//!
//! Tables are immutable once built and are shared between oscillators through a
//! [`WavetableCache`], which builds each [`Waveform`] exactly once.
//!
//! # Example
//!
//! ```rust
//! use klimper_core::{Waveform, WavetableCache};
//!
//! let cache = WavetableCache::new(512, 1).unwrap();
//! let sine = cache.get(Waveform::Sine);
//!
//! assert_eq!(sine.len(), 512);
//! assert!(sine.read(0.0).abs() < 1e-6);
//! // A quarter of the way through the cycle is the sine peak
//! assert!((sine.read(128.0) - 1.0).abs() < 1e-6);
//! ```

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use core::f32::consts::TAU;
use core::fmt;

/// Default wavetable length in samples.
pub const DEFAULT_TABLE_LENGTH: usize = 512;

/// Guard points appended after the cycle.
pub const DEFAULT_GUARD_POINTS: usize = 1;

const _: () = assert!(DEFAULT_GUARD_POINTS > 0 && DEFAULT_GUARD_POINTS <= DEFAULT_TABLE_LENGTH);

/// Errors raised when a wavetable is constructed with an unusable shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavetableError {
    /// The cycle has no samples.
    EmptyTable,
    /// Fewer than one guard point was requested.
    MissingGuardPoints,
    /// More guard points than cycle samples were requested.
    TooManyGuardPoints {
        /// Requested guard count.
        guards: usize,
        /// Cycle length.
        length: usize,
    },
}

impl fmt::Display for WavetableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTable => write!(f, "wavetable length must be at least 1"),
            Self::MissingGuardPoints => write!(f, "wavetable needs at least one guard point"),
            Self::TooManyGuardPoints { guards, length } => write!(
                f,
                "{guards} guard points exceed the table length of {length}"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for WavetableError {}

/// Built-in waveform generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// `sin(x)`, used by oscillators and as the right-channel pan weight.
    Sine,
    /// `cos(x)`, used as the left-channel pan weight.
    Cosine,
}

impl Waveform {
    /// Every built-in waveform, in cache order.
    pub const ALL: [Waveform; 2] = [Waveform::Sine, Waveform::Cosine];

    /// Evaluates the generator at phase `x` (radians).
    #[inline]
    pub fn generate(self, x: f32) -> f32 {
        match self {
            Waveform::Sine => libm::sinf(x),
            Waveform::Cosine => libm::cosf(x),
        }
    }

    fn cache_index(self) -> usize {
        match self {
            Waveform::Sine => 0,
            Waveform::Cosine => 1,
        }
    }
}

/// One precomputed waveform cycle plus guard samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Wavetable {
    samples: Vec<f32>,
    length: usize,
    guards: usize,
}

impl Wavetable {
    /// Builds a table by sampling `generator` at `length` points over `[0, 2π)`.
    ///
    /// The first `guards` samples are repeated after the cycle so that any
    /// fractional index in `[0, length)` can be interpolated.
    pub fn new<F>(length: usize, guards: usize, generator: F) -> Result<Self, WavetableError>
    where
        F: Fn(f32) -> f32,
    {
        if length == 0 {
            return Err(WavetableError::EmptyTable);
        }
        if guards == 0 {
            return Err(WavetableError::MissingGuardPoints);
        }
        if guards > length {
            return Err(WavetableError::TooManyGuardPoints { guards, length });
        }
        Ok(Self::sample_cycle(length, guards, generator))
    }

    /// Requires `0 < guards <= length`.
    fn sample_cycle<F>(length: usize, guards: usize, generator: F) -> Self
    where
        F: Fn(f32) -> f32,
    {
        let mut samples = Vec::with_capacity(length + guards);
        let step = TAU / length as f32;
        for i in 0..length {
            samples.push(generator(i as f32 * step));
        }
        for i in 0..guards {
            samples.push(samples[i]);
        }

        Self {
            samples,
            length,
            guards,
        }
    }

    /// Builds a table for one of the built-in waveforms.
    pub fn from_waveform(
        waveform: Waveform,
        length: usize,
        guards: usize,
    ) -> Result<Self, WavetableError> {
        Self::new(length, guards, |x| waveform.generate(x))
    }

    /// Number of samples in one cycle (guard points excluded).
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Always false: construction rejects empty tables.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of guard samples after the cycle.
    #[inline]
    pub fn guards(&self) -> usize {
        self.guards
    }

    /// Raw samples, guard points included.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Linearly interpolated read at a fractional index.
    ///
    /// The caller keeps `index` inside `[0, len + guards - 1)`; oscillators do
    /// this by wrapping their phase into `[0, len)`.
    #[inline]
    pub fn read(&self, index: f32) -> f32 {
        let i = index as usize;
        let frac = index - i as f32;
        let a = self.samples[i];
        let b = self.samples[i + 1];
        a + frac * (b - a)
    }
}

/// Builds every [`Waveform`] once and hands out shared, read-only handles.
///
/// Construct one cache at startup and pass it to everything that needs tables.
/// Cloning the cache clones handles, not samples.
#[derive(Debug, Clone)]
pub struct WavetableCache {
    tables: [Arc<Wavetable>; 2],
}

impl WavetableCache {
    /// Builds the sine and cosine tables with the given shape.
    pub fn new(length: usize, guards: usize) -> Result<Self, WavetableError> {
        let sine = Wavetable::from_waveform(Waveform::Sine, length, guards)?;
        let cosine = Wavetable::from_waveform(Waveform::Cosine, length, guards)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(length, guards, "built wavetable cache");

        Ok(Self {
            tables: [Arc::new(sine), Arc::new(cosine)],
        })
    }

    /// Shared handle to the table for `waveform`.
    #[inline]
    pub fn get(&self, waveform: Waveform) -> Arc<Wavetable> {
        Arc::clone(&self.tables[waveform.cache_index()])
    }

    /// Cycle length shared by every table in the cache.
    pub fn table_length(&self) -> usize {
        self.tables[0].len()
    }
}

impl Default for WavetableCache {
    fn default() -> Self {
        let build = |waveform: Waveform| {
            Arc::new(Wavetable::sample_cycle(
                DEFAULT_TABLE_LENGTH,
                DEFAULT_GUARD_POINTS,
                |x| waveform.generate(x),
            ))
        };
        Self {
            tables: [build(Waveform::Sine), build(Waveform::Cosine)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_points_copy_cycle_start() {
        let table = Wavetable::new(8, 2, |x| x).unwrap();
        let samples = table.samples();
        assert_eq!(samples.len(), 10);
        assert_eq!(samples[8], samples[0]);
        assert_eq!(samples[9], samples[1]);
    }

    #[test]
    fn test_read_exact_index() {
        let table = Wavetable::from_waveform(Waveform::Sine, 64, 1).unwrap();
        for i in 0..64 {
            assert_eq!(
                table.read(i as f32),
                table.samples()[i],
                "integer index {i} must return the stored sample"
            );
        }
    }

    #[test]
    fn test_read_midpoint_is_mean() {
        let table = Wavetable::from_waveform(Waveform::Sine, 64, 1).unwrap();
        let s = table.samples();
        for i in 0..64 {
            let expected = (s[i] + s[i + 1]) * 0.5;
            let got = table.read(i as f32 + 0.5);
            assert!(
                (got - expected).abs() < 1e-6,
                "midpoint {i}.5: expected {expected}, got {got}"
            );
        }
    }

    #[test]
    fn test_last_segment_wraps_to_start() {
        let table = Wavetable::from_waveform(Waveform::Cosine, 16, 1).unwrap();
        let s = table.samples();
        let got = table.read(15.5);
        assert!((got - (s[15] + s[0]) * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert_eq!(
            Wavetable::new(0, 1, |x| x).unwrap_err(),
            WavetableError::EmptyTable
        );
        assert_eq!(
            Wavetable::new(16, 0, |x| x).unwrap_err(),
            WavetableError::MissingGuardPoints
        );
        assert!(matches!(
            WavetableCache::new(4, 5),
            Err(WavetableError::TooManyGuardPoints { guards: 5, length: 4 })
        ));
    }

    #[test]
    fn test_cache_shares_tables() {
        let cache = WavetableCache::new(256, 1).unwrap();
        let a = cache.get(Waveform::Sine);
        let b = cache.get(Waveform::Sine);
        assert!(Arc::ptr_eq(&a, &b), "cache must hand out the same table");
        assert_eq!(cache.table_length(), 256);
        assert!((cache.get(Waveform::Cosine).read(0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_cache_matches_built_cache() {
        let built = WavetableCache::new(DEFAULT_TABLE_LENGTH, DEFAULT_GUARD_POINTS).unwrap();
        let default = WavetableCache::default();
        for waveform in Waveform::ALL {
            assert_eq!(*built.get(waveform), *default.get(waveform));
        }
    }
}
