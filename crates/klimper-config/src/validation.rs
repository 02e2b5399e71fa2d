//! Configuration validation.
//!
//! Values that map onto a runtime parameter are checked against the same
//! [`ParamDescriptor`] ranges the control surface uses, so a file can never
//! ask for something the knobs could not reach. Everything else (block sizes,
//! scale notes, the FM ratio table) has its own rule here. Engine-level checks
//! are then repeated through [`klimper_synth::SynthConfig::validate`].
//!
//! # Example
//!
//! ```rust
//! use klimper_config::{KlimperConfig, validate_config};
//!
//! let mut config = KlimperConfig::default();
//! assert!(validate_config(&config).is_ok());
//!
//! config.audio.sub_block_size = 300;
//! assert!(validate_config(&config).is_err());
//! ```

use klimper_core::{ParamDescriptor, ParameterInfo};
use klimper_synth::{SequencerParams, SynthError, SynthParams};
use thiserror::Error;

use crate::config::{EnvelopeSection, KlimperConfig};

/// Largest voice count a configuration may ask for.
pub const MAX_POLYPHONY: usize = 64;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Value outside its parameter range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted path of the setting.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Zero sample rate.
    #[error("sample rate must be positive")]
    ZeroSampleRate,

    /// Zero voices.
    #[error("polyphony must be at least 1 voice")]
    ZeroPolyphony,

    /// Sub-block that is odd or does not divide the block.
    #[error("sub-block size {sub_block} must be even and divide the block size {block}")]
    InvalidBlockSize {
        /// Interleaved slots per output block.
        block: usize,
        /// Interleaved slots per synthesis step.
        sub_block: usize,
    },

    /// Lower bound above upper bound.
    #[error("'{param}' range is crossed: {min} > {max}")]
    CrossedRange {
        /// Dotted path of the range.
        param: String,
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },

    /// Scale entry outside the MIDI range.
    #[error("scale note {0} is outside 0..=127")]
    InvalidNote(u8),

    /// Rejected by the synth engine.
    #[error(transparent)]
    Synth(#[from] SynthError),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Checks every setting in `config`, reporting all problems at once.
pub fn validate_config(config: &KlimperConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();
    let synth_params = SynthParams::default();
    let sequencer_params = SequencerParams::new(80, true);

    let audio = &config.audio;
    if audio.sample_rate == 0 {
        errors.push(ValidationError::ZeroSampleRate);
    }
    if audio.block_size == 0
        || audio.sub_block_size == 0
        || audio.sub_block_size % 2 != 0
        || audio.block_size % audio.sub_block_size != 0
    {
        errors.push(ValidationError::InvalidBlockSize {
            block: audio.block_size,
            sub_block: audio.sub_block_size,
        });
    }
    if audio.table_length < 2 {
        errors.push(ValidationError::OutOfRange {
            param: "audio.table_length".into(),
            value: audio.table_length as f32,
            min: 2.0,
            max: f32::INFINITY,
        });
    }

    let synth = &config.synth;
    if synth.polyphony == 0 {
        errors.push(ValidationError::ZeroPolyphony);
    } else if synth.polyphony > MAX_POLYPHONY {
        errors.push(ValidationError::OutOfRange {
            param: "synth.polyphony".into(),
            value: synth.polyphony as f32,
            min: 1.0,
            max: MAX_POLYPHONY as f32,
        });
    }
    check_param(&mut errors, "synth.volume", synth.volume, &synth_params, 0);
    check_envelope(&mut errors, "synth.envelope1", &synth.envelope1, &synth_params, 1);
    check_envelope(&mut errors, "synth.envelope2", &synth.envelope2, &synth_params, 6);

    let fm = &synth.fm;
    check_param(&mut errors, "synth.fm.index_min", fm.index_min, &synth_params, 11);
    check_param(&mut errors, "synth.fm.index_max", fm.index_max, &synth_params, 12);
    check_range(&mut errors, "synth.fm.depth", fm.depth, 0.0, 1.0);

    let pan = &synth.pan;
    check_range(&mut errors, "synth.pan.spread", pan.spread, 0.0, 1.0);
    check_range(&mut errors, "synth.pan.lfo_min_hz", pan.lfo_min_hz, 0.0, 20.0);
    check_range(&mut errors, "synth.pan.lfo_max_hz", pan.lfo_max_hz, 0.0, 20.0);
    if pan.lfo_min_hz > pan.lfo_max_hz {
        errors.push(ValidationError::CrossedRange {
            param: "synth.pan.lfo_hz".into(),
            min: pan.lfo_min_hz,
            max: pan.lfo_max_hz,
        });
    }

    let sequencer = &config.sequencer;
    check_param(&mut errors, "sequencer.bpm", sequencer.bpm as f32, &sequencer_params, 0);
    for &note in &sequencer.scale {
        if note > 127 {
            errors.push(ValidationError::InvalidNote(note));
        }
    }

    // Engine checks only make sense once the basic shape is right
    if errors.is_empty()
        && let Err(err) = config.to_synth_config().validate()
    {
        errors.push(err.into());
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

fn check_envelope(
    errors: &mut Vec<ValidationError>,
    section: &str,
    envelope: &EnvelopeSection,
    params: &SynthParams,
    first_index: usize,
) {
    let fields = [
        ("attack", envelope.attack),
        ("decay", envelope.decay),
        ("sustain", envelope.sustain),
        ("release", envelope.release),
        ("peak", envelope.peak),
    ];
    for (offset, (name, value)) in fields.into_iter().enumerate() {
        let param = format!("{section}.{name}");
        check_param(errors, &param, value, params, first_index + offset);
    }
}

fn check_param(
    errors: &mut Vec<ValidationError>,
    param: &str,
    value: f32,
    params: &impl ParameterInfo,
    index: usize,
) {
    if let Some(ParamDescriptor { min, max, .. }) = params.param_info(index) {
        check_range(errors, param, value, min, max);
    }
}

fn check_range(errors: &mut Vec<ValidationError>, param: &str, value: f32, min: f32, max: f32) {
    if !(value.is_finite() && value >= min && value <= max) {
        errors.push(ValidationError::OutOfRange {
            param: param.to_string(),
            value,
            min,
            max,
        });
    }
}
