//! Klimper Core - DSP primitives for the klimper synthesizer
//!
//! This crate provides the allocation-free building blocks the synth engine is
//! assembled from. Everything on the audio path is `O(1)` per sample.
//!
//! # Core Abstractions
//!
//! ## Wavetables
//!
//! - [`Wavetable`] - One waveform cycle with guard points and linear interpolation
//! - [`WavetableCache`] - Builds each [`Waveform`] once and shares it via `Arc`
//!
//! ## Panning
//!
//! - [`Panner`] - Equal-power pan law from quarter-wave cosine/sine lookups
//!
//! ## Timing
//!
//! - [`NoteDivision`] / [`DurationTable`] - Integer sample counts for quarter,
//!   eighth and sixteenth notes at a given tempo
//!
//! ## Parameters
//!
//! - [`AtomicF32`] / [`AtomicParam`] / [`Generation`] - Lock-free values shared with
//!   a control thread
//! - [`ParameterInfo`] / [`ParamDescriptor`] - Discoverable ranges and encoder steps
//!
//! ## Utilities
//!
//! - [`midi_to_freq`], [`freq_to_midi`], [`sample_to_i16`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc` for the tables).
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! klimper-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use klimper_core::{Panner, Waveform, WavetableCache, midi_to_freq};
//!
//! let cache = WavetableCache::default();
//! let sine = cache.get(Waveform::Sine);
//! let panner = Panner::new(&cache);
//!
//! // Phase increment for middle C at 44.1 kHz
//! let increment = midi_to_freq(60.0) * sine.len() as f32 / 44100.0;
//! let mut phase = 0.0;
//! let mut out = [0.0f32; 2];
//! for _ in 0..64 {
//!     let (l, r) = panner.pan(sine.read(phase), 0.0);
//!     out[0] += l;
//!     out[1] += r;
//!     phase = (phase + increment) % sine.len() as f32;
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod math;
pub mod pan;
pub mod param;
pub mod param_info;
pub mod tempo;
pub mod wavetable;

pub use math::{A4_FREQUENCY, freq_to_midi, midi_to_freq, sample_to_i16};
pub use pan::Panner;
pub use param::{AtomicF32, AtomicParam, Generation};
pub use param_info::{ParamDescriptor, ParamUnit, ParameterInfo};
pub use tempo::{DurationTable, NoteDivision};
pub use wavetable::{
    DEFAULT_GUARD_POINTS, DEFAULT_TABLE_LENGTH, Waveform, Wavetable, WavetableCache,
    WavetableError,
};
