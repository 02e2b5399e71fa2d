//! Synth parameters shared with a control thread.
//!
//! [`SynthParams`] lives behind an `Arc`. A control surface writes through
//! [`ParameterInfo::set_param`] (or the typed setters) while the audio thread
//! reads the values at the start of every block. Each envelope's five values
//! are guarded by a [`Generation`] counter so the audio thread only re-applies
//! an envelope after it changed.

use klimper_core::{AtomicParam, Generation, ParamDescriptor, ParamUnit, ParameterInfo};

use crate::envelope::AdsrValues;
use crate::error::{SynthError, check_range};

const VOLUME: ParamDescriptor = ParamDescriptor::level("Volume", "Volume", 0.2);

const ATTACK: ParamDescriptor = ParamDescriptor::seconds("Attack", "Attack", 0.1);
const DECAY: ParamDescriptor = ParamDescriptor::seconds("Decay", "Decay", 0.3);
const SUSTAIN: ParamDescriptor = ParamDescriptor::level("Sustain", "Sustain", 0.5);
const RELEASE: ParamDescriptor = ParamDescriptor::seconds("Release", "Release", 0.5);
const PEAK: ParamDescriptor = ParamDescriptor::level("Peak", "Peak", 1.0);

const MOD_ATTACK: ParamDescriptor = ParamDescriptor::seconds("Mod Attack", "M.Attack", 0.01);
const MOD_DECAY: ParamDescriptor = ParamDescriptor::seconds("Mod Decay", "M.Decay", 0.5);
const MOD_SUSTAIN: ParamDescriptor = ParamDescriptor::level("Mod Sustain", "M.Sust", 0.2);
const MOD_RELEASE: ParamDescriptor = ParamDescriptor::seconds("Mod Release", "M.Rel", 0.5);
const MOD_PEAK: ParamDescriptor = ParamDescriptor::level("Mod Peak", "M.Peak", 1.0);

const FM_INDEX_MIN: ParamDescriptor =
    ParamDescriptor::custom("FM Index Min", "FM Min", ParamUnit::None, 0.0, 10.0, 0.0, 0.1);
const FM_INDEX_MAX: ParamDescriptor =
    ParamDescriptor::custom("FM Index Max", "FM Max", ParamUnit::None, 0.0, 10.0, 1.0, 0.1);

/// Atomic attack/decay/sustain/release/peak values for one envelope.
#[derive(Debug)]
pub struct EnvelopeParams {
    attack: AtomicParam,
    decay: AtomicParam,
    sustain: AtomicParam,
    release: AtomicParam,
    peak: AtomicParam,
    generation: Generation,
}

impl EnvelopeParams {
    fn new(descriptors: [ParamDescriptor; 5], values: AdsrValues) -> Self {
        let [attack, decay, sustain, release, peak] = descriptors;
        Self {
            attack: AtomicParam::with_value(attack, values.attack),
            decay: AtomicParam::with_value(decay, values.decay),
            sustain: AtomicParam::with_value(sustain, values.sustain),
            release: AtomicParam::with_value(release, values.release),
            peak: AtomicParam::with_value(peak, values.peak),
            generation: Generation::new(),
        }
    }

    /// Current values (each clamped to its descriptor range).
    pub fn load(&self) -> AdsrValues {
        AdsrValues {
            attack: self.attack.get(),
            decay: self.decay.get(),
            sustain: self.sustain.get(),
            release: self.release.get(),
            peak: self.peak.get(),
        }
    }

    /// Stores all five values, then marks the envelope as changed.
    ///
    /// Times are clamped to 1 ms..10 s and levels to `[0, 1]`.
    pub fn store(&self, values: AdsrValues) {
        self.attack.set(values.attack);
        self.decay.set(values.decay);
        self.sustain.set(values.sustain);
        self.release.set(values.release);
        self.peak.set(values.peak);
        self.generation.bump();
    }

    /// Change counter, bumped after every write.
    pub fn generation(&self) -> u32 {
        self.generation.current()
    }

    fn field(&self, index: usize) -> Option<&AtomicParam> {
        match index {
            0 => Some(&self.attack),
            1 => Some(&self.decay),
            2 => Some(&self.sustain),
            3 => Some(&self.release),
            4 => Some(&self.peak),
            _ => None,
        }
    }
}

fn check_envelope(
    descriptors: [ParamDescriptor; 5],
    values: AdsrValues,
) -> Result<(), SynthError> {
    let fields = [
        values.attack,
        values.decay,
        values.sustain,
        values.release,
        values.peak,
    ];
    for (desc, value) in descriptors.iter().zip(fields) {
        check_range(desc, value)?;
    }
    Ok(())
}

/// Global synth parameters.
///
/// | Index | Parameter |
/// |-------|-----------|
/// | 0 | Volume |
/// | 1-5 | Carrier envelope attack, decay, sustain, release, peak |
/// | 6-10 | Modulator envelope attack, decay, sustain, release, peak |
/// | 11 | FM index minimum |
/// | 12 | FM index maximum |
///
/// # Example
///
/// ```rust
/// use klimper_core::ParameterInfo;
/// use klimper_synth::{AdsrValues, SynthParams};
///
/// let params = SynthParams::new(0.2, AdsrValues::default(), AdsrValues::default(), 0.0, 1.0);
/// let attack = params.find_param_by_name("attack").unwrap();
/// let before = params.envelope1().generation();
///
/// params.set_param(attack, 0.25);
/// assert_eq!(params.envelope1().load().attack, 0.25);
/// assert_ne!(params.envelope1().generation(), before);
/// ```
#[derive(Debug)]
pub struct SynthParams {
    volume: AtomicParam,
    envelope1: EnvelopeParams,
    envelope2: EnvelopeParams,
    fm_index_min: AtomicParam,
    fm_index_max: AtomicParam,
}

impl SynthParams {
    /// Number of exposed parameters.
    pub const COUNT: usize = 13;

    /// Creates the parameter set with initial values.
    pub fn new(
        volume: f32,
        envelope1: AdsrValues,
        envelope2: AdsrValues,
        fm_index_min: f32,
        fm_index_max: f32,
    ) -> Self {
        Self {
            volume: AtomicParam::with_value(VOLUME, volume),
            envelope1: EnvelopeParams::new([ATTACK, DECAY, SUSTAIN, RELEASE, PEAK], envelope1),
            envelope2: EnvelopeParams::new(
                [MOD_ATTACK, MOD_DECAY, MOD_SUSTAIN, MOD_RELEASE, MOD_PEAK],
                envelope2,
            ),
            fm_index_min: AtomicParam::with_value(FM_INDEX_MIN, fm_index_min),
            fm_index_max: AtomicParam::with_value(FM_INDEX_MAX, fm_index_max),
        }
    }

    /// Master volume in `[0, 1]`.
    #[inline]
    pub fn volume(&self) -> f32 {
        self.volume.get()
    }

    /// Sets the master volume, clamped to `[0, 1]`.
    pub fn set_volume(&self, volume: f32) {
        self.volume.set(volume);
    }

    /// Carrier envelope values.
    pub fn envelope1(&self) -> &EnvelopeParams {
        &self.envelope1
    }

    /// Modulator envelope values.
    pub fn envelope2(&self) -> &EnvelopeParams {
        &self.envelope2
    }

    /// FM index range as `(min, max)`, ordered even if the bounds were set crossed.
    pub fn fm_index_range(&self) -> (f32, f32) {
        let a = self.fm_index_min.get();
        let b = self.fm_index_max.get();
        if a <= b { (a, b) } else { (b, a) }
    }

    /// Sets the FM index range. Each bound is clamped to `[0, 10]`.
    pub fn set_fm_index_range(&self, min: f32, max: f32) {
        self.fm_index_min.set(min);
        self.fm_index_max.set(max);
    }

    /// Checks initial values against the parameter ranges.
    ///
    /// [`new`](Self::new) clamps instead; this is for configurations that
    /// should be refused rather than silently changed.
    pub fn check(
        volume: f32,
        envelope1: AdsrValues,
        envelope2: AdsrValues,
        fm_index_min: f32,
        fm_index_max: f32,
    ) -> Result<(), SynthError> {
        check_range(&VOLUME, volume)?;
        check_envelope([ATTACK, DECAY, SUSTAIN, RELEASE, PEAK], envelope1)?;
        check_envelope(
            [MOD_ATTACK, MOD_DECAY, MOD_SUSTAIN, MOD_RELEASE, MOD_PEAK],
            envelope2,
        )?;
        check_range(&FM_INDEX_MIN, fm_index_min)?;
        check_range(&FM_INDEX_MAX, fm_index_max)
    }

    fn param(&self, index: usize) -> Option<&AtomicParam> {
        match index {
            0 => Some(&self.volume),
            1..=5 => self.envelope1.field(index - 1),
            6..=10 => self.envelope2.field(index - 6),
            11 => Some(&self.fm_index_min),
            12 => Some(&self.fm_index_max),
            _ => None,
        }
    }
}

impl Default for SynthParams {
    fn default() -> Self {
        Self::new(
            VOLUME.default,
            AdsrValues::default(),
            AdsrValues {
                attack: MOD_ATTACK.default,
                decay: MOD_DECAY.default,
                sustain: MOD_SUSTAIN.default,
                release: MOD_RELEASE.default,
                peak: MOD_PEAK.default,
            },
            FM_INDEX_MIN.default,
            FM_INDEX_MAX.default,
        )
    }
}

impl ParameterInfo for SynthParams {
    fn param_count(&self) -> usize {
        Self::COUNT
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        self.param(index).map(|p| *p.descriptor())
    }

    fn get_param(&self, index: usize) -> f32 {
        self.param(index).map_or(0.0, AtomicParam::get)
    }

    fn set_param(&self, index: usize, value: f32) {
        if let Some(param) = self.param(index) {
            param.set(value);
        }
        match index {
            1..=5 => self.envelope1.generation.bump(),
            6..=10 => self.envelope2.generation.bump(),
            _ => {}
        }
    }
}
