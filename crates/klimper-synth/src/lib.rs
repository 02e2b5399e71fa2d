//! Klimper Synth - Synthesis engine for the klimper synthesizer
//!
//! This crate turns the primitives from `klimper-core` into a playable
//! instrument: wavetable oscillators with frequency modulation, ADSR
//! envelopes, a fixed voice pool with stealing, and a generative sequencer.
//!
//! # Core Components
//!
//! ## Oscillators
//!
//! - [`WavetableOscillator`] - Table-lookup oscillator with a per-sample FM input
//!
//! ## Envelopes
//!
//! - [`Envelope`] - Linear attack/decay/sustain/release generator
//! - [`EnvelopeStage`] / [`AdsrValues`] - Stage tracking and segment settings
//!
//! ```rust
//! use klimper_synth::{AdsrValues, Envelope, EnvelopeStage};
//!
//! let mut env = Envelope::new(44100.0, AdsrValues::default());
//! env.trigger_attack();
//! let level = env.tick();
//! assert_eq!(env.stage(), EnvelopeStage::Attack);
//! assert!(level >= 0.0);
//! ```
//!
//! ## Voices
//!
//! - [`Voice`] - Carrier, modulator, two envelopes and a pan LFO
//! - [`VoicePool`] - Retrigger, then free slot, then quietest voice
//!
//! ## Instrument
//!
//! - [`Synth`] - Mixes all voices into interleaved stereo
//! - [`SynthParams`] - Lock-free parameter set for a control thread
//! - [`Sequencer`] - Random notes from a scale at quarter, eighth and
//!   sixteenth note lengths
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! klimper-synth = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use klimper_core::WavetableCache;
//! use klimper_synth::{Synth, SynthConfig};
//!
//! let cache = WavetableCache::default();
//! let mut synth = Synth::new(&SynthConfig::default(), &cache).unwrap();
//!
//! // C major triad
//! synth.note_on(60, 0.8);
//! synth.note_on(64, 0.8);
//! synth.note_on(67, 0.8);
//!
//! // 256 stereo frames
//! let mut buffer = vec![0.0f32; 512];
//! synth.process(&mut buffer);
//! assert_eq!(synth.active_voices(), 3);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod envelope;
pub mod error;
pub mod oscillator;
pub mod params;
pub mod sequencer;
pub mod synth;
pub mod voice;

pub use envelope::{AdsrValues, Envelope, EnvelopeStage, MIN_SEGMENT_SECONDS};
pub use error::SynthError;
pub use oscillator::{DEFAULT_FM_DEPTH, WavetableOscillator};
pub use params::{EnvelopeParams, SynthParams};
pub use sequencer::{
    SEQUENCER_POLYPHONY, Sequencer, SequencerConfig, SequencerParams, TrackedNote,
};
pub use synth::{FmConfig, NoteSink, PanConfig, Synth, SynthConfig};
pub use voice::{FmPatch, Voice, VoicePool, VoiceSetup};
