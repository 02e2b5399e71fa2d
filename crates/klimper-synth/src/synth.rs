//! Polyphonic wavetable/FM synthesizer.
//!
//! [`Synth`] owns the voice pool and mixes every active voice into an
//! interleaved stereo buffer. Control-thread changes arrive through the shared
//! [`SynthParams`] and are picked up at the start of the next block.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use klimper_core::{Panner, Waveform, WavetableCache};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::envelope::AdsrValues;
use crate::error::{SynthError, check_sample_rate};
use crate::oscillator::DEFAULT_FM_DEPTH;
use crate::params::SynthParams;
use crate::voice::{FmPatch, Voice, VoicePool, VoiceSetup};

/// Receiver of note events.
///
/// The [`Sequencer`](crate::Sequencer) drives any `NoteSink`; [`Synth`] is the
/// one that makes sound.
pub trait NoteSink {
    /// Starts `note` at `velocity` in `[0, 1]`.
    fn note_on(&mut self, note: u8, velocity: f32);

    /// Releases `note`.
    fn note_off(&mut self, note: u8);
}

/// Frequency-modulation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FmConfig {
    /// Modulator/carrier frequency ratios; one is picked at random per note.
    /// Empty disables the modulator.
    pub ratios: Vec<f32>,
    /// Lower bound of the per-note FM index.
    pub index_min: f32,
    /// Upper bound of the per-note FM index.
    pub index_max: f32,
    /// Fraction of a cycle the carrier phase moves per unit of modulator output.
    pub depth: f32,
}

impl Default for FmConfig {
    fn default() -> Self {
        Self {
            ratios: Vec::from([0.5, 1.0, 2.0, 3.0, 4.0]),
            index_min: 0.0,
            index_max: 1.0,
            depth: DEFAULT_FM_DEPTH,
        }
    }
}

/// Per-voice auto-pan settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanConfig {
    /// LFO output scale; 0 keeps every voice centered.
    pub spread: f32,
    /// Slowest LFO rate in Hz.
    pub lfo_min_hz: f32,
    /// Fastest LFO rate in Hz.
    pub lfo_max_hz: f32,
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            spread: 0.75,
            lfo_min_hz: 0.33,
            lfo_max_hz: 3.33,
        }
    }
}

/// Everything needed to build a [`Synth`].
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Number of voices. Fixed for the lifetime of the synth.
    pub polyphony: usize,
    /// Master volume in `[0, 1]`.
    pub volume: f32,
    /// Carrier envelope.
    pub envelope1: AdsrValues,
    /// Modulator envelope.
    pub envelope2: AdsrValues,
    /// Frequency modulation.
    pub fm: FmConfig,
    /// Auto-pan.
    pub pan: PanConfig,
    /// Seed for FM and pan LFO randomization.
    pub seed: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            polyphony: 8,
            volume: 0.2,
            envelope1: AdsrValues::default(),
            envelope2: AdsrValues {
                attack: 0.01,
                decay: 0.5,
                sustain: 0.2,
                release: 0.5,
                peak: 1.0,
            },
            fm: FmConfig::default(),
            pan: PanConfig::default(),
            seed: 0x4b4c_494d,
        }
    }
}

impl SynthConfig {
    /// Checks the configuration without building anything.
    ///
    /// Volume, envelope values and FM index bounds must lie within the ranges
    /// of their [`SynthParams`] controls.
    pub fn validate(&self) -> Result<(), SynthError> {
        check_sample_rate(self.sample_rate)?;
        if self.polyphony == 0 {
            return Err(SynthError::ZeroPolyphony);
        }
        SynthParams::check(
            self.volume,
            self.envelope1,
            self.envelope2,
            self.fm.index_min,
            self.fm.index_max,
        )?;
        let (min, max) = (self.fm.index_min, self.fm.index_max);
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(SynthError::InvalidFmIndexRange { min, max });
        }
        if let Some(&ratio) = self.fm.ratios.iter().find(|r| !(r.is_finite() && **r > 0.0)) {
            return Err(SynthError::InvalidFmRatio(ratio));
        }
        let (min, max) = (self.pan.lfo_min_hz, self.pan.lfo_max_hz);
        if !(min.is_finite() && max.is_finite() && min >= 0.0 && min <= max) {
            return Err(SynthError::InvalidLfoRange { min, max });
        }
        Ok(())
    }
}

/// Polyphonic synthesizer.
///
/// # Example
///
/// ```rust
/// use klimper_core::WavetableCache;
/// use klimper_synth::{Synth, SynthConfig};
///
/// let cache = WavetableCache::default();
/// let mut synth = Synth::new(&SynthConfig::default(), &cache).unwrap();
///
/// synth.note_on(60, 0.8);
/// synth.note_on(64, 0.8);
///
/// // 220 interleaved samples = 110 stereo frames
/// let mut block = vec![0.0f32; 220];
/// synth.process(&mut block);
/// assert_eq!(synth.active_voices(), 2);
/// ```
#[derive(Debug)]
pub struct Synth {
    pool: VoicePool,
    params: Arc<SynthParams>,
    panner: Panner,
    ratios: Vec<f32>,
    rng: SmallRng,
    sample_rate: f32,
    gain_staging: f32,
    pan_spread: f32,
    envelope1_generation: u32,
    envelope2_generation: u32,
}

impl Synth {
    /// Builds the synth and all of its voices.
    pub fn new(config: &SynthConfig, tables: &WavetableCache) -> Result<Self, SynthError> {
        config.validate()?;

        let params = Arc::new(SynthParams::new(
            config.volume,
            config.envelope1,
            config.envelope2,
            config.fm.index_min,
            config.fm.index_max,
        ));

        let mut rng = SmallRng::seed_from_u64(config.seed);
        // Voices start from the clamped values the control surface will show.
        let setup = VoiceSetup {
            sample_rate: config.sample_rate,
            table: tables.get(Waveform::Sine),
            envelope1: params.envelope1().load(),
            envelope2: params.envelope2().load(),
            fm_depth: config.fm.depth,
        };
        let lfo_rates: Vec<Option<f32>> = (0..config.polyphony)
            .map(|_| {
                (config.pan.spread != 0.0).then(|| {
                    let span = config.pan.lfo_max_hz - config.pan.lfo_min_hz;
                    config.pan.lfo_min_hz + rng.random::<f32>() * span
                })
            })
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate = config.sample_rate,
            polyphony = config.polyphony,
            fm_ratios = config.fm.ratios.len(),
            "created synth"
        );

        Ok(Self {
            pool: VoicePool::new(&setup, &lfo_rates),
            envelope1_generation: params.envelope1().generation(),
            envelope2_generation: params.envelope2().generation(),
            params,
            panner: Panner::new(tables),
            ratios: config.fm.ratios.clone(),
            rng,
            sample_rate: config.sample_rate,
            gain_staging: 1.0 / config.polyphony as f32,
            pan_spread: config.pan.spread,
        })
    }

    /// Shared parameter handle for a control thread.
    pub fn params(&self) -> Arc<SynthParams> {
        Arc::clone(&self.params)
    }

    /// Sets the master volume.
    pub fn set_volume(&self, volume: f32) {
        self.params.set_volume(volume);
    }

    /// Sets the carrier envelope for every voice from the next block on.
    pub fn set_envelope1(&self, values: AdsrValues) {
        self.params.envelope1().store(values);
    }

    /// Sets the modulator envelope for every voice from the next block on.
    pub fn set_envelope2(&self, values: AdsrValues) {
        self.params.envelope2().store(values);
    }

    /// Starts `note` and returns the voice slot it landed on.
    ///
    /// With FM enabled a ratio is drawn from the ratio table and an index from
    /// the current FM index range.
    pub fn note_on(&mut self, note: u8, velocity: f32) -> usize {
        let fm = self.choose_fm();
        self.pool.note_on(note, velocity, fm)
    }

    /// Releases every voice playing `note`. Returns how many were released.
    pub fn note_off(&mut self, note: u8) -> usize {
        self.pool.note_off(note)
    }

    /// Silences every voice immediately.
    pub fn all_notes_off(&mut self) {
        self.pool.all_notes_off();
    }

    /// Mixes all active voices into `buffer` (interleaved stereo).
    ///
    /// The buffer is added to, not overwritten; zero it before the first call
    /// of a block.
    pub fn process(&mut self, buffer: &mut [f32]) {
        self.apply_params();

        let gain = self.params.volume() * self.gain_staging;
        let frames = buffer.len() / 2;
        for voice in self.pool.voices_mut() {
            if voice.is_active() {
                voice.render(buffer, &self.panner, gain, self.pan_spread);
            } else {
                voice.advance_pan(frames);
            }
        }

        self.pool.refresh_activity();
    }

    /// Number of voices currently sounding.
    pub fn active_voices(&self) -> usize {
        self.pool.active_count()
    }

    /// Total number of voices.
    pub fn polyphony(&self) -> usize {
        self.pool.len()
    }

    /// Read access to the voices.
    pub fn voices(&self) -> &[Voice] {
        self.pool.voices()
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Per-voice gain applied so a full pool cannot clip.
    pub fn gain_staging(&self) -> f32 {
        self.gain_staging
    }

    fn choose_fm(&mut self) -> FmPatch {
        if self.ratios.is_empty() {
            return FmPatch::OFF;
        }
        let ratio = self.ratios[self.rng.random_range(0..self.ratios.len())];
        let (min, max) = self.params.fm_index_range();
        let index = min + self.rng.random::<f32>() * (max - min);
        FmPatch { ratio, index }
    }

    fn apply_params(&mut self) {
        let generation = self.params.envelope1().generation();
        if generation != self.envelope1_generation {
            self.envelope1_generation = generation;
            let values = self.params.envelope1().load();
            for voice in self.pool.voices_mut() {
                voice.set_envelope1(self.sample_rate, values);
            }
        }

        let generation = self.params.envelope2().generation();
        if generation != self.envelope2_generation {
            self.envelope2_generation = generation;
            let values = self.params.envelope2().load();
            for voice in self.pool.voices_mut() {
                voice.set_envelope2(self.sample_rate, values);
            }
        }
    }
}

impl NoteSink for Synth {
    fn note_on(&mut self, note: u8, velocity: f32) {
        Synth::note_on(self, note, velocity);
    }

    fn note_off(&mut self, note: u8) {
        Synth::note_off(self, note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EnvelopeStage;

    fn plain_config(polyphony: usize) -> SynthConfig {
        SynthConfig {
            polyphony,
            volume: 1.0,
            fm: FmConfig {
                ratios: Vec::new(),
                ..FmConfig::default()
            },
            pan: PanConfig {
                spread: 0.0,
                ..PanConfig::default()
            },
            ..SynthConfig::default()
        }
    }

    #[test]
    fn test_rejects_bad_config() {
        let cache = WavetableCache::default();
        let mut config = SynthConfig::default();
        config.polyphony = 0;
        assert_eq!(
            Synth::new(&config, &cache).unwrap_err(),
            SynthError::ZeroPolyphony
        );

        config = SynthConfig::default();
        config.sample_rate = 0.0;
        assert!(matches!(
            Synth::new(&config, &cache),
            Err(SynthError::InvalidSampleRate(_))
        ));

        config = SynthConfig::default();
        config.fm.index_min = 2.0;
        config.fm.index_max = 1.0;
        assert!(matches!(
            config.validate(),
            Err(SynthError::InvalidFmIndexRange { .. })
        ));

        config = SynthConfig::default();
        config.fm.ratios.push(-1.0);
        assert_eq!(config.validate(), Err(SynthError::InvalidFmRatio(-1.0)));
    }

    #[test]
    fn test_rejects_values_outside_control_ranges() {
        let mut config = SynthConfig::default();
        config.envelope1.attack = 20.0;
        assert_eq!(
            config.validate(),
            Err(SynthError::OutOfRange {
                name: "Attack",
                value: 20.0,
                min: 0.001,
                max: 10.0,
            })
        );

        config = SynthConfig::default();
        config.fm.index_max = 20.0;
        assert!(matches!(
            Synth::new(&config, &WavetableCache::default()),
            Err(SynthError::OutOfRange { name: "FM Index Max", .. })
        ));

        config = SynthConfig::default();
        config.envelope2.sustain = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(SynthError::OutOfRange { name: "Mod Sustain", .. })
        ));

        // Bounds themselves are accepted
        config = SynthConfig::default();
        config.envelope1.attack = 10.0;
        config.fm.index_max = 10.0;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_gain_staging() {
        let synth = Synth::new(&SynthConfig::default(), &WavetableCache::default()).unwrap();
        assert_eq!(synth.polyphony(), 8);
        assert_eq!(synth.gain_staging(), 0.125);
    }

    #[test]
    fn test_silent_without_notes() {
        let mut synth = Synth::new(&SynthConfig::default(), &WavetableCache::default()).unwrap();
        let mut buffer = vec![0.0; 880];
        synth.process(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_centered_voice_is_equal_in_both_channels() {
        let mut synth = Synth::new(&plain_config(1), &WavetableCache::default()).unwrap();
        synth.note_on(69, 1.0);
        let mut buffer = vec![0.0; 2000];
        synth.process(&mut buffer);
        for frame in buffer.chunks_exact(2) {
            assert!((frame[0] - frame[1]).abs() < 1e-4);
        }
        assert!(buffer.iter().any(|&s| s.abs() > 1e-3));
    }

    #[test]
    fn test_full_pool_stays_within_unity() {
        let mut config = SynthConfig::default();
        config.volume = 1.0;
        let mut synth = Synth::new(&config, &WavetableCache::default()).unwrap();
        for note in [48, 50, 52, 53, 55, 57, 59, 60] {
            synth.note_on(note, 1.0);
        }
        let mut buffer = vec![0.0; 44100];
        synth.process(&mut buffer);
        let peak = buffer.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak <= 1.0, "mix peaked at {peak}");
        assert_eq!(synth.active_voices(), 8);
    }

    #[test]
    fn test_envelope_change_applies_next_block() {
        let mut synth = Synth::new(&plain_config(2), &WavetableCache::default()).unwrap();
        synth.set_envelope1(AdsrValues {
            attack: 0.01,
            decay: 0.01,
            sustain: 1.0,
            release: 0.01,
            peak: 1.0,
        });
        synth.note_on(60, 1.0);
        let mut buffer = vec![0.0; 2 * 1000];
        synth.process(&mut buffer);
        assert_eq!(synth.voices()[0].stage(), EnvelopeStage::Sustain);
    }

    #[test]
    fn test_params_handle_controls_volume() {
        let mut synth = Synth::new(&plain_config(1), &WavetableCache::default()).unwrap();
        let params = synth.params();
        params.set_volume(0.0);
        synth.note_on(60, 1.0);
        let mut buffer = vec![0.0; 2000];
        synth.process(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.0));
        assert_eq!(synth.active_voices(), 1, "silent voices still run");
    }

    #[test]
    fn test_fm_choice_within_configured_ranges() {
        let mut config = SynthConfig::default();
        config.fm.ratios = vec![2.0, 3.0];
        config.fm.index_min = 0.5;
        config.fm.index_max = 1.5;
        let mut synth = Synth::new(&config, &WavetableCache::default()).unwrap();
        for note in 40..80 {
            let slot = synth.note_on(note, 1.0);
            let fm = synth.voices()[slot].fm();
            assert!(fm.ratio == 2.0 || fm.ratio == 3.0, "ratio {}", fm.ratio);
            assert!((0.5..=1.5).contains(&fm.index), "index {}", fm.index);
        }
    }

    #[test]
    fn test_pan_lfo_rates_within_range() {
        let synth = Synth::new(&SynthConfig::default(), &WavetableCache::default()).unwrap();
        for voice in synth.voices() {
            let hz = voice.pan_lfo_hz().unwrap();
            assert!((0.33..=3.33).contains(&hz), "lfo {hz} Hz");
        }
    }

    #[test]
    fn test_idle_voices_keep_panning() {
        let mut synth = Synth::new(&SynthConfig::default(), &WavetableCache::default()).unwrap();
        let before: Vec<_> = synth.voices().iter().map(Voice::pan_lfo_phase).collect();
        let mut buffer = vec![0.0; 880];
        synth.process(&mut buffer);
        assert_eq!(synth.active_voices(), 0);
        for (voice, start) in synth.voices().iter().zip(before) {
            assert_ne!(voice.pan_lfo_phase(), start, "voice {} LFO stood still", voice.slot());
        }
    }

    #[test]
    fn test_same_seed_renders_identically() {
        let cache = WavetableCache::default();
        let render = || {
            let mut synth = Synth::new(&SynthConfig::default(), &cache).unwrap();
            synth.note_on(60, 0.7);
            synth.note_on(67, 0.5);
            let mut buffer = vec![0.0; 4410];
            synth.process(&mut buffer);
            buffer
        };
        assert_eq!(render(), render());
    }
}
