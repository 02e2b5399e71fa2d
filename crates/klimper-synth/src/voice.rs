//! Synth voices and the fixed-size voice pool.
//!
//! Every voice is a two-operator FM pair (carrier plus optional modulator),
//! each with its own linear envelope, and a free-running sine LFO that sweeps
//! the voice across the stereo field.
//!
//! The pool never grows or shrinks after construction. Note-on picks a slot
//! with this priority:
//!
//! 1. a slot already assigned to the same note (retrigger)
//! 2. any inactive slot
//! 3. the active slot with the lowest `velocity * envelope` (steal)
//!
//! Ties go to the lowest slot index.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use klimper_core::{Panner, Wavetable, midi_to_freq};

use crate::envelope::{AdsrValues, Envelope, EnvelopeStage};
use crate::oscillator::WavetableOscillator;

/// FM parameters chosen for one note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FmPatch {
    /// Modulator frequency as a multiple of the carrier frequency.
    pub ratio: f32,
    /// Modulator output gain before it reaches the carrier.
    pub index: f32,
}

impl FmPatch {
    /// Plain carrier, modulator silent.
    pub const OFF: FmPatch = FmPatch {
        ratio: 1.0,
        index: 0.0,
    };
}

/// Per-voice settings fixed at construction.
#[derive(Debug, Clone)]
pub struct VoiceSetup {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Table read by the carrier, modulator and pan LFO.
    pub table: Arc<Wavetable>,
    /// Carrier envelope.
    pub envelope1: AdsrValues,
    /// Modulator envelope.
    pub envelope2: AdsrValues,
    /// FM depth scale for the carrier oscillator.
    pub fm_depth: f32,
}

/// One slot of polyphony.
#[derive(Debug, Clone)]
pub struct Voice {
    slot: usize,
    note: Option<u8>,
    velocity: f32,
    carrier: WavetableOscillator,
    modulator: WavetableOscillator,
    carrier_env: Envelope,
    modulator_env: Envelope,
    pan_lfo: Option<WavetableOscillator>,
    fm: FmPatch,
    active: bool,
}

impl Voice {
    /// Creates an idle voice. `pan_lfo_hz` of `None` keeps the voice centered.
    pub fn new(slot: usize, setup: &VoiceSetup, pan_lfo_hz: Option<f32>) -> Self {
        let mut carrier = WavetableOscillator::new(Arc::clone(&setup.table), setup.sample_rate);
        carrier.set_fm_depth(setup.fm_depth);

        let pan_lfo = pan_lfo_hz.map(|hz| {
            let mut lfo = WavetableOscillator::new(Arc::clone(&setup.table), setup.sample_rate);
            lfo.reinit(hz, true);
            lfo
        });

        Self {
            slot,
            note: None,
            velocity: 0.0,
            carrier,
            modulator: WavetableOscillator::new(Arc::clone(&setup.table), setup.sample_rate),
            carrier_env: Envelope::new(setup.sample_rate, setup.envelope1),
            modulator_env: Envelope::new(setup.sample_rate, setup.envelope2),
            pan_lfo,
            fm: FmPatch::OFF,
            active: false,
        }
    }

    /// Starts `note`. Both oscillators restart at phase 0 and both envelopes
    /// attack from their current level.
    pub fn start(&mut self, note: u8, velocity: f32, fm: FmPatch) {
        self.note = Some(note);
        self.velocity = velocity;
        self.fm = fm;

        let freq = midi_to_freq(f32::from(note));
        self.carrier.reinit(freq, true);
        self.modulator.reinit(freq * fm.ratio, true);
        self.carrier_env.trigger_attack();
        self.modulator_env.trigger_attack();
        self.active = true;
    }

    /// Releases both envelopes. The voice stays active until the carrier
    /// envelope reaches zero.
    pub fn release(&mut self) {
        self.carrier_env.trigger_release();
        self.modulator_env.trigger_release();
    }

    /// Silences the voice immediately.
    pub fn kill(&mut self) {
        self.carrier_env.reset();
        self.modulator_env.reset();
        self.active = false;
    }

    /// Adds this voice into an interleaved stereo buffer.
    ///
    /// `gain` is the master volume times the gain-staging factor; `pan_spread`
    /// scales the pan LFO.
    #[inline]
    pub fn render(&mut self, buffer: &mut [f32], panner: &Panner, gain: f32, pan_spread: f32) {
        let level = self.velocity * gain;
        let fm_on = self.fm.index != 0.0;

        for frame in buffer.chunks_exact_mut(2) {
            let modulation = if fm_on {
                self.modulator.tick(0.0) * self.modulator_env.tick() * self.fm.index
            } else {
                0.0
            };
            let sample = self.carrier.tick(modulation) * self.carrier_env.tick() * level;

            let pan = match self.pan_lfo.as_mut() {
                Some(lfo) => lfo.tick(0.0) * pan_spread,
                None => 0.0,
            };
            let (left, right) = panner.pan(sample, pan);
            frame[0] += left;
            frame[1] += right;
        }
    }

    /// Runs the pan LFO for `frames` frames without producing sound.
    ///
    /// Idle voices keep their LFO turning so the next note starts wherever
    /// the sweep has got to.
    pub fn advance_pan(&mut self, frames: usize) {
        if let Some(lfo) = self.pan_lfo.as_mut() {
            for _ in 0..frames {
                lfo.tick(0.0);
            }
        }
    }

    /// Re-derives the active flag from the carrier envelope.
    #[inline]
    pub fn refresh_activity(&mut self) {
        self.active = self.carrier_env.is_active();
    }

    /// Applies new envelope values to the carrier envelope.
    pub fn set_envelope1(&mut self, sample_rate: f32, values: AdsrValues) {
        self.carrier_env.set_values(sample_rate, values);
    }

    /// Applies new envelope values to the modulator envelope.
    pub fn set_envelope2(&mut self, sample_rate: f32, values: AdsrValues) {
        self.modulator_env.set_values(sample_rate, values);
    }

    /// Current loudness used for stealing: velocity times carrier envelope level.
    #[inline]
    pub fn amplitude(&self) -> f32 {
        self.velocity * self.carrier_env.value()
    }

    /// Slot index in the pool.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Last note assigned to this slot, if any.
    pub fn note(&self) -> Option<u8> {
        self.note
    }

    /// Velocity of the current note.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// FM ratio and index chosen at the last note-on.
    pub fn fm(&self) -> FmPatch {
        self.fm
    }

    /// Whether the voice is sounding (including its release tail).
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stage of the carrier envelope.
    pub fn stage(&self) -> EnvelopeStage {
        self.carrier_env.stage()
    }

    /// Carrier envelope.
    pub fn carrier_envelope(&self) -> &Envelope {
        &self.carrier_env
    }

    /// Modulator envelope.
    pub fn modulator_envelope(&self) -> &Envelope {
        &self.modulator_env
    }

    /// Carrier oscillator.
    pub fn carrier(&self) -> &WavetableOscillator {
        &self.carrier
    }

    /// Pan LFO rate in Hz, if the voice has one.
    pub fn pan_lfo_hz(&self) -> Option<f32> {
        self.pan_lfo.as_ref().map(WavetableOscillator::frequency)
    }

    /// Pan LFO read position in table samples, if the voice has one.
    pub fn pan_lfo_phase(&self) -> Option<f32> {
        self.pan_lfo.as_ref().map(WavetableOscillator::phase)
    }
}

/// Fixed array of voices with retrigger/free/steal allocation.
///
/// # Example
///
/// ```rust
/// use klimper_core::{Waveform, WavetableCache};
/// use klimper_synth::{AdsrValues, FmPatch, VoicePool, VoiceSetup};
///
/// let cache = WavetableCache::default();
/// let setup = VoiceSetup {
///     sample_rate: 44100.0,
///     table: cache.get(Waveform::Sine),
///     envelope1: AdsrValues::default(),
///     envelope2: AdsrValues::default(),
///     fm_depth: 0.01,
/// };
/// let mut pool = VoicePool::new(&setup, &[None, None]);
///
/// let a = pool.note_on(60, 1.0, FmPatch::OFF);
/// let b = pool.note_on(60, 0.5, FmPatch::OFF);
/// assert_eq!(a, b, "same note retriggers the same slot");
/// ```
#[derive(Debug, Clone)]
pub struct VoicePool {
    voices: Vec<Voice>,
}

impl VoicePool {
    /// Creates one voice per entry in `pan_lfo_hz`.
    pub fn new(setup: &VoiceSetup, pan_lfo_hz: &[Option<f32>]) -> Self {
        let voices = pan_lfo_hz
            .iter()
            .enumerate()
            .map(|(slot, &hz)| Voice::new(slot, setup, hz))
            .collect();
        Self { voices }
    }

    /// Picks the slot a note-on for `note` would use.
    ///
    /// Returns `None` only for an empty pool.
    pub fn select_slot(&self, note: u8) -> Option<usize> {
        let mut retrigger = None;
        let mut free = None;
        let mut steal = None;
        let mut steal_amp = f32::MAX;

        for (i, voice) in self.voices.iter().enumerate() {
            if retrigger.is_none() && voice.note == Some(note) {
                retrigger = Some(i);
            }
            if !voice.active {
                if free.is_none() {
                    free = Some(i);
                }
            } else {
                let amp = voice.amplitude();
                if amp < steal_amp {
                    steal = Some(i);
                    steal_amp = amp;
                }
            }
        }

        retrigger.or(free).or(steal)
    }

    /// Starts `note` on the slot chosen by [`select_slot`](Self::select_slot)
    /// and returns that slot.
    pub fn note_on(&mut self, note: u8, velocity: f32, fm: FmPatch) -> usize {
        let slot = self.select_slot(note).unwrap_or(0);
        if let Some(voice) = self.voices.get_mut(slot) {
            voice.start(note, velocity.clamp(0.0, 1.0), fm);
        }
        slot
    }

    /// Releases every active voice playing `note`. Returns how many were released.
    pub fn note_off(&mut self, note: u8) -> usize {
        let mut released = 0;
        for voice in &mut self.voices {
            if voice.active && voice.note == Some(note) {
                voice.release();
                released += 1;
            }
        }
        released
    }

    /// Silences every voice immediately.
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
    }

    /// Re-derives every voice's active flag from its carrier envelope.
    pub fn refresh_activity(&mut self) {
        for voice in &mut self.voices {
            voice.refresh_activity();
        }
    }

    /// Number of voices.
    pub fn len(&self) -> usize {
        self.voices.len()
    }

    /// True for a pool with no voices.
    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Number of active voices.
    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }

    /// Read access to all voices.
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Mutable access to all voices.
    pub fn voices_mut(&mut self) -> &mut [Voice] {
        &mut self.voices
    }
}
