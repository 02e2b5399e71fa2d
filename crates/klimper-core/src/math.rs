//! Pitch and sample-format helpers.
//!
//! - [`midi_to_freq`] / [`freq_to_midi`] - 12-TET pitch conversion, A4 = 440 Hz
//! - [`sample_to_i16`] - float to 16-bit PCM for the output transport

use libm::{log2f, powf, roundf};

/// Reference pitch of MIDI note 69 (A4).
pub const A4_FREQUENCY: f32 = 440.0;

/// Converts a (possibly fractional) MIDI note number to frequency in Hz.
///
/// # Example
/// ```rust
/// use klimper_core::midi_to_freq;
///
/// assert!((midi_to_freq(69.0) - 440.0).abs() < 1e-3);
/// assert!((midi_to_freq(60.0) - 261.6256).abs() < 1e-2);
/// ```
#[inline]
pub fn midi_to_freq(note: f32) -> f32 {
    A4_FREQUENCY * powf(2.0, (note - 69.0) / 12.0)
}

/// Converts a frequency in Hz to a fractional MIDI note number.
#[inline]
pub fn freq_to_midi(freq: f32) -> f32 {
    69.0 + 12.0 * log2f(freq / A4_FREQUENCY)
}

/// Converts a float sample to 16-bit PCM.
///
/// The sample is clamped to `[-1, 1]`, scaled to the `i16` range and rounded
/// to the nearest integer.
///
/// # Example
/// ```rust
/// use klimper_core::sample_to_i16;
///
/// assert_eq!(sample_to_i16(0.0), 0);
/// assert_eq!(sample_to_i16(1.0), i16::MAX);
/// assert_eq!(sample_to_i16(-3.0), -i16::MAX);
/// ```
#[inline]
pub fn sample_to_i16(sample: f32) -> i16 {
    roundf(sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}
