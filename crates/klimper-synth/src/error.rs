//! Construction errors for the synth engine.

use core::fmt;

use klimper_core::{ParamDescriptor, WavetableError};

/// Errors raised when a [`Synth`](crate::Synth) or [`Sequencer`](crate::Sequencer)
/// is built from an unusable configuration.
///
/// The render path itself cannot fail; everything is checked here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SynthError {
    /// Sample rate is zero, negative or not finite.
    InvalidSampleRate(f32),
    /// Polyphony of zero voices.
    ZeroPolyphony,
    /// FM index range with `min > max` or non-finite bounds.
    InvalidFmIndexRange {
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },
    /// FM ratio that is zero, negative or not finite.
    InvalidFmRatio(f32),
    /// Pan LFO rate range with `min > max` or negative bounds.
    InvalidLfoRange {
        /// Lower bound in Hz.
        min: f32,
        /// Upper bound in Hz.
        max: f32,
    },
    /// A value outside the range its control parameter allows.
    OutOfRange {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f32,
        /// Smallest allowed value.
        min: f32,
        /// Largest allowed value.
        max: f32,
    },
    /// The wavetables could not be built.
    Wavetable(WavetableError),
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSampleRate(sr) => write!(f, "sample rate must be positive, got {sr}"),
            Self::ZeroPolyphony => write!(f, "polyphony must be at least 1 voice"),
            Self::InvalidFmIndexRange { min, max } => {
                write!(f, "invalid FM index range {min}..{max}")
            }
            Self::InvalidFmRatio(ratio) => write!(f, "FM ratio must be positive, got {ratio}"),
            Self::InvalidLfoRange { min, max } => {
                write!(f, "invalid pan LFO rate range {min}..{max} Hz")
            }
            Self::OutOfRange {
                name,
                value,
                min,
                max,
            } => write!(f, "{name} = {value} outside {min}..={max}"),
            Self::Wavetable(err) => write!(f, "wavetable: {err}"),
        }
    }
}

impl From<WavetableError> for SynthError {
    fn from(err: WavetableError) -> Self {
        Self::Wavetable(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SynthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wavetable(err) => Some(err),
            _ => None,
        }
    }
}

/// Checks a sample rate for use by the engine.
pub(crate) fn check_sample_rate(sample_rate: f32) -> Result<(), SynthError> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(SynthError::InvalidSampleRate(sample_rate))
    }
}

/// Checks a value against a parameter's range.
pub(crate) fn check_range(desc: &ParamDescriptor, value: f32) -> Result<(), SynthError> {
    if value >= desc.min && value <= desc.max {
        Ok(())
    } else {
        Err(SynthError::OutOfRange {
            name: desc.name,
            value,
            min: desc.min,
            max: desc.max,
        })
    }
}
