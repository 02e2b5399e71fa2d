//! Piecewise-linear ADSR envelope generator.
//!
//! Each segment moves by a fixed per-sample increment computed from the
//! segment's start and target levels and its duration. Segment durations have a
//! floor of 1% of the sample rate (10 ms), so a zero time never produces an
//! instantaneous jump.
//!
//! Triggering never resets the level: a retrigger ramps up from wherever the
//! envelope currently is, and a release ramps down from the current level, even
//! mid-attack.

/// Minimum segment duration as a fraction of the sample rate.
pub const MIN_SEGMENT_SECONDS: f32 = 0.01;

/// Envelope stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeStage {
    /// Silent. Output is zero until the next attack.
    #[default]
    Stopped,
    /// Rising toward the peak level.
    Attack,
    /// Falling from the peak toward the sustain level.
    Decay,
    /// Holding the sustain level until released.
    Sustain,
    /// Falling toward zero.
    Release,
}

/// Segment times (seconds) and levels for an [`Envelope`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdsrValues {
    /// Attack time in seconds.
    pub attack: f32,
    /// Decay time in seconds.
    pub decay: f32,
    /// Sustain level, clamped to `[0, peak]`.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
    /// Level reached at the end of the attack, clamped to `[0, 1]`.
    pub peak: f32,
}

impl Default for AdsrValues {
    fn default() -> Self {
        Self {
            attack: 0.1,
            decay: 0.3,
            sustain: 0.5,
            release: 0.5,
            peak: 1.0,
        }
    }
}

/// Linear ADSR envelope.
///
/// # Example
///
/// ```rust
/// use klimper_synth::{AdsrValues, Envelope, EnvelopeStage};
///
/// let mut env = Envelope::new(44100.0, AdsrValues::default());
/// env.trigger_attack();
///
/// // Attack takes about 0.1 s
/// for _ in 0..4500 {
///     env.tick();
/// }
/// assert_eq!(env.stage(), EnvelopeStage::Decay);
///
/// env.trigger_release();
/// while env.stage() != EnvelopeStage::Stopped {
///     env.tick();
/// }
/// assert_eq!(env.tick(), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Envelope {
    stage: EnvelopeStage,
    value: f32,
    values: AdsrValues,
    peak: f32,
    sustain: f32,
    attack_inc: f32,
    decay_inc: f32,
    release_inc: f32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new(44100.0, AdsrValues::default())
    }
}

impl Envelope {
    /// Creates a stopped envelope.
    pub fn new(sample_rate: f32, values: AdsrValues) -> Self {
        let mut env = Self {
            stage: EnvelopeStage::Stopped,
            value: 0.0,
            values,
            peak: 1.0,
            sustain: 0.5,
            attack_inc: 0.0,
            decay_inc: 0.0,
            release_inc: 0.0,
        };
        env.set_values(sample_rate, values);
        env
    }

    /// Recomputes the segment increments.
    ///
    /// Takes effect immediately, including for the segment in progress.
    pub fn set_values(&mut self, sample_rate: f32, values: AdsrValues) {
        let min_samples = sample_rate * MIN_SEGMENT_SECONDS;
        let samples = |seconds: f32| (seconds.max(0.0) * sample_rate).max(min_samples);

        let peak = values.peak.clamp(0.0, 1.0);
        let sustain = values.sustain.clamp(0.0, peak);
        // Released from a zero sustain, the envelope can only be mid-attack or
        // mid-decay, so the slope is taken from the peak instead.
        let release_span = if sustain > 0.0 {
            sustain
        } else if peak > 0.0 {
            peak
        } else {
            1.0
        };

        self.values = values;
        self.peak = peak;
        self.sustain = sustain;
        self.attack_inc = peak / samples(values.attack);
        self.decay_inc = (sustain - peak) / samples(values.decay);
        self.release_inc = -release_span / samples(values.release);
    }

    /// Starts (or restarts) the attack from the current level.
    pub fn trigger_attack(&mut self) {
        self.stage = EnvelopeStage::Attack;
    }

    /// Starts the release from the current level. Ignored when stopped.
    pub fn trigger_release(&mut self) {
        if self.stage != EnvelopeStage::Stopped {
            self.stage = EnvelopeStage::Release;
        }
    }

    /// Returns the current level, then advances one sample.
    #[inline]
    pub fn tick(&mut self) -> f32 {
        let out = self.value;

        match self.stage {
            EnvelopeStage::Stopped | EnvelopeStage::Sustain => {}
            EnvelopeStage::Attack => {
                self.value += self.attack_inc;
                if self.value >= self.peak {
                    self.value = self.peak;
                    self.stage = EnvelopeStage::Decay;
                }
            }
            EnvelopeStage::Decay => {
                self.value += self.decay_inc;
                if self.value <= self.sustain {
                    self.value = self.sustain;
                    self.stage = EnvelopeStage::Sustain;
                }
            }
            EnvelopeStage::Release => {
                self.value += self.release_inc;
                if self.value <= 0.0 {
                    self.value = 0.0;
                    self.stage = EnvelopeStage::Stopped;
                }
            }
        }

        out
    }

    /// Forces the envelope to stopped at zero.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Stopped;
        self.value = 0.0;
    }

    /// Current stage.
    #[inline]
    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Current level (the value the next [`tick`](Self::tick) returns).
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// True unless stopped.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Stopped
    }

    /// The values last passed to [`set_values`](Self::set_values).
    pub fn values(&self) -> AdsrValues {
        self.values
    }
}
