//! Configuration file format.

use serde::{Deserialize, Serialize};
use std::path::Path;

use klimper_synth::{AdsrValues, FmConfig, PanConfig, SequencerConfig, SynthConfig};

use crate::error::ConfigError;
use crate::validation::validate_config;

/// Complete synthesizer configuration.
///
/// Every section is optional in the file; missing sections and fields take
/// the built-in defaults. Envelope tables, when present,
/// must list all five values.
///
/// # TOML Format
///
/// ```toml
/// name = "Glass"
/// description = "Slow bell tones"
///
/// [audio]
/// sample_rate = 44100
/// block_size = 880
/// sub_block_size = 220
///
/// [synth]
/// polyphony = 8
/// volume = 0.2
///
/// [synth.envelope1]
/// attack = 0.01
/// decay = 1.5
/// sustain = 0.0
/// release = 1.0
/// peak = 1.0
///
/// [synth.fm]
/// ratios = [2.0, 3.5]
/// index_min = 0.5
/// index_max = 2.0
///
/// [sequencer]
/// bpm = 72
/// scale = [60, 62, 64, 67, 69, 72]
/// seed = 7
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KlimperConfig {
    /// Display name (used by patches).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample rate and block layout.
    pub audio: AudioSection,

    /// Voices, envelopes, FM and panning.
    pub synth: SynthSection,

    /// Tempo, scale and transport.
    pub sequencer: SequencerSection,
}

/// `[audio]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioSection {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved stereo slots per output block.
    pub block_size: usize,
    /// Interleaved stereo slots per sequencer/synth step.
    pub sub_block_size: usize,
    /// Samples per wavetable cycle.
    pub table_length: usize,
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            block_size: 880,
            sub_block_size: 220,
            table_length: klimper_core::DEFAULT_TABLE_LENGTH,
        }
    }
}

/// One envelope table (`[synth.envelope1]` or `[synth.envelope2]`).
///
/// Times are in seconds, levels in `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EnvelopeSection {
    /// Rise time from silence to the peak.
    pub attack: f32,
    /// Fall time from the peak to the sustain level.
    pub decay: f32,
    /// Level held while the note is down.
    pub sustain: f32,
    /// Fall time from the sustain level to silence.
    pub release: f32,
    /// Level reached at the end of the attack.
    pub peak: f32,
}

impl From<AdsrValues> for EnvelopeSection {
    fn from(v: AdsrValues) -> Self {
        Self {
            attack: v.attack,
            decay: v.decay,
            sustain: v.sustain,
            release: v.release,
            peak: v.peak,
        }
    }
}

impl From<EnvelopeSection> for AdsrValues {
    fn from(e: EnvelopeSection) -> Self {
        Self {
            attack: e.attack,
            decay: e.decay,
            sustain: e.sustain,
            release: e.release,
            peak: e.peak,
        }
    }
}

/// `[synth.fm]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FmSection {
    /// Modulator/carrier ratios; one is drawn per note. Empty turns FM off.
    pub ratios: Vec<f32>,
    /// Lower bound of the per-note FM index.
    pub index_min: f32,
    /// Upper bound of the per-note FM index.
    pub index_max: f32,
    /// Carrier phase deviation per unit of modulator output, in cycles.
    pub depth: f32,
}

impl Default for FmSection {
    fn default() -> Self {
        let fm = FmConfig::default();
        Self {
            ratios: fm.ratios,
            index_min: fm.index_min,
            index_max: fm.index_max,
            depth: fm.depth,
        }
    }
}

/// `[synth.pan]` section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PanSection {
    /// Pan LFO depth; 0 keeps every voice centered.
    pub spread: f32,
    /// Slowest per-voice LFO rate in Hz.
    pub lfo_min_hz: f32,
    /// Fastest per-voice LFO rate in Hz.
    pub lfo_max_hz: f32,
}

impl Default for PanSection {
    fn default() -> Self {
        let pan = PanConfig::default();
        Self {
            spread: pan.spread,
            lfo_min_hz: pan.lfo_min_hz,
            lfo_max_hz: pan.lfo_max_hz,
        }
    }
}

/// `[synth]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthSection {
    /// Number of voices.
    pub polyphony: usize,
    /// Master volume in `[0, 1]`.
    pub volume: f32,
    /// Carrier envelope.
    pub envelope1: EnvelopeSection,
    /// Modulator envelope.
    pub envelope2: EnvelopeSection,
    /// Frequency modulation.
    pub fm: FmSection,
    /// Auto-pan.
    pub pan: PanSection,
}

impl Default for SynthSection {
    fn default() -> Self {
        let synth = SynthConfig::default();
        Self {
            polyphony: synth.polyphony,
            volume: synth.volume,
            envelope1: synth.envelope1.into(),
            envelope2: synth.envelope2.into(),
            fm: FmSection::default(),
            pan: PanSection::default(),
        }
    }
}

/// `[sequencer]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SequencerSection {
    /// Tempo in beats per minute.
    pub bpm: u32,
    /// MIDI notes to pick from.
    pub scale: Vec<u8>,
    /// Start playing immediately.
    pub running: bool,
    /// Random seed for notes, FM choices and pan rates. Absent uses a fixed
    /// built-in seed, so renders are reproducible either way.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SequencerSection {
    fn default() -> Self {
        let sequencer = SequencerConfig::default();
        Self {
            bpm: sequencer.bpm,
            scale: sequencer.scale,
            running: sequencer.running,
            seed: None,
        }
    }
}

impl KlimperConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every value; see [`validate_config`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_config(self)?;
        Ok(())
    }

    /// Engine settings for [`klimper_synth::Synth::new`].
    pub fn to_synth_config(&self) -> SynthConfig {
        let defaults = SynthConfig::default();
        let synth = &self.synth;
        SynthConfig {
            sample_rate: self.audio.sample_rate as f32,
            polyphony: synth.polyphony,
            volume: synth.volume,
            envelope1: synth.envelope1.into(),
            envelope2: synth.envelope2.into(),
            fm: FmConfig {
                ratios: synth.fm.ratios.clone(),
                index_min: synth.fm.index_min,
                index_max: synth.fm.index_max,
                depth: synth.fm.depth,
            },
            pan: PanConfig {
                spread: synth.pan.spread,
                lfo_min_hz: synth.pan.lfo_min_hz,
                lfo_max_hz: synth.pan.lfo_max_hz,
            },
            // Derived so the synth and sequencer streams differ for one seed
            seed: self
                .sequencer
                .seed
                .map_or(defaults.seed, |seed| seed.rotate_left(32) ^ defaults.seed),
        }
    }

    /// Sequencer settings for [`klimper_synth::Sequencer::new`].
    pub fn to_sequencer_config(&self) -> SequencerConfig {
        let sequencer = &self.sequencer;
        SequencerConfig {
            bpm: sequencer.bpm,
            scale: sequencer.scale.clone(),
            running: sequencer.running,
            seed: sequencer.seed.unwrap_or(SequencerConfig::default().seed),
        }
    }

    /// Display name, or `"Untitled"`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine() {
        let config = KlimperConfig::default();
        assert_eq!(config.to_synth_config(), SynthConfig::default());
        assert_eq!(config.to_sequencer_config(), SequencerConfig::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = KlimperConfig::from_toml("").unwrap();
        assert_eq!(config, KlimperConfig::default());
    }

    #[test]
    fn test_partial_section() {
        let config = KlimperConfig::from_toml(
            r#"
            [sequencer]
            bpm = 120

            [synth.pan]
            spread = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(config.sequencer.bpm, 120);
        assert_eq!(config.sequencer.scale, SequencerSection::default().scale);
        assert_eq!(config.synth.pan.spread, 0.0);
        assert_eq!(config.synth.pan.lfo_max_hz, 3.33);
        assert_eq!(config.audio, AudioSection::default());
    }

    #[test]
    fn test_incomplete_envelope_rejected() {
        let result = KlimperConfig::from_toml(
            r#"
            [synth.envelope1]
            attack = 0.2
            "#,
        );
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = KlimperConfig::default();
        config.name = Some("Test".into());
        config.sequencer.seed = Some(42);
        config.synth.envelope1.attack = 0.25;

        let text = config.to_toml().unwrap();
        let parsed = KlimperConfig::from_toml(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_seed_reaches_both_engines() {
        let mut a = KlimperConfig::default();
        let mut b = KlimperConfig::default();
        a.sequencer.seed = Some(1);
        b.sequencer.seed = Some(2);
        assert_ne!(a.to_synth_config().seed, b.to_synth_config().seed);
        assert_eq!(a.to_sequencer_config().seed, 1);
        assert_ne!(a.to_synth_config().seed, a.to_sequencer_config().seed);
    }

    #[test]
    fn test_display_name() {
        let mut config = KlimperConfig::default();
        assert_eq!(config.display_name(), "Untitled");
        config.name = Some("Pad".into());
        assert_eq!(config.display_name(), "Pad");
    }
}
