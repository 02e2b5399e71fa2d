//! Generative note sequencer.
//!
//! Every call to [`Sequencer::process`] advances the sequencer's clock by the
//! number of frames just rendered. Notes it started are released when their
//! duration runs out. While running, after each randomly chosen pause
//! (quarter, eighth or sixteenth note) it starts one random note from the scale
//! with a random duration and velocity, as long as it has a free tracking slot.
//!
//! The sequencer keeps its own book of sounding notes. It does not look at the
//! synth's voices, so a note it has released may still be fading out in a
//! voice, and a voice it started may have been stolen by another note.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use core::sync::atomic::{AtomicBool, Ordering};

use klimper_core::{
    AtomicParam, DurationTable, Generation, NoteDivision, ParamDescriptor, ParamUnit,
    ParameterInfo,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::{SynthError, check_range};
use crate::synth::NoteSink;

/// Maximum number of notes the default sequencer tracks at once.
pub const SEQUENCER_POLYPHONY: usize = 8;

const BPM: ParamDescriptor =
    ParamDescriptor::custom("Tempo", "BPM", ParamUnit::Bpm, 20.0, 300.0, 80.0, 1.0);
const RUNNING: ParamDescriptor =
    ParamDescriptor::custom("Running", "Run", ParamUnit::None, 0.0, 1.0, 1.0, 1.0);

/// Settings for a [`Sequencer`].
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerConfig {
    /// Tempo in beats per minute.
    pub bpm: u32,
    /// MIDI notes the sequencer picks from.
    pub scale: Vec<u8>,
    /// Whether the sequencer starts playing immediately.
    pub running: bool,
    /// Seed for note, duration and velocity choices.
    pub seed: u64,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            bpm: 80,
            // C major, C3 to C4
            scale: Vec::from([48, 50, 52, 53, 55, 57, 59, 60]),
            running: true,
            seed: 0x5345_5155,
        }
    }
}

/// Tempo and transport shared with a control thread.
#[derive(Debug)]
pub struct SequencerParams {
    bpm: AtomicParam,
    running: AtomicBool,
    transport: Generation,
}

impl SequencerParams {
    /// Creates the parameter set. The tempo is clamped to 20..=300 BPM.
    pub fn new(bpm: u32, running: bool) -> Self {
        Self {
            bpm: AtomicParam::with_value(BPM, bpm as f32),
            running: AtomicBool::new(running),
            transport: Generation::new(),
        }
    }

    /// Current tempo, rounded to whole beats per minute.
    pub fn bpm(&self) -> u32 {
        libm::roundf(self.bpm.get()) as u32
    }

    /// Sets the tempo, clamped to 20..=300 BPM.
    pub fn set_bpm(&self, bpm: u32) {
        self.bpm.set(bpm as f32);
    }

    /// Whether the sequencer should be starting notes.
    pub fn running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Starts or stops the sequencer. Either way the next note is due at once.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
        self.transport.bump();
    }
}

impl ParameterInfo for SequencerParams {
    fn param_count(&self) -> usize {
        2
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(*self.bpm.descriptor()),
            1 => Some(RUNNING),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.bpm.get(),
            1 => f32::from(u8::from(self.running())),
            _ => 0.0,
        }
    }

    fn set_param(&self, index: usize, value: f32) {
        match index {
            0 => self.bpm.set(libm::roundf(value)),
            1 => self.set_running(value >= 0.5),
            _ => {}
        }
    }
}

/// A note the sequencer started and has not released yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackedNote {
    /// MIDI note number.
    pub note: u8,
    /// Frames until the note is released.
    pub remaining: i64,
}

/// Random note generator with a fixed number of tracking slots.
///
/// `N` bounds how many of its own notes can sound at once.
///
/// # Example
///
/// ```rust
/// use klimper_core::WavetableCache;
/// use klimper_synth::{Sequencer, SequencerConfig, Synth, SynthConfig};
///
/// let cache = WavetableCache::default();
/// let mut synth = Synth::new(&SynthConfig::default(), &cache).unwrap();
/// let mut sequencer = Sequencer::new(&SequencerConfig::default(), 44100).unwrap();
///
/// let mut block = vec![0.0f32; 220];
/// for _ in 0..100 {
///     block.fill(0.0);
///     sequencer.process(&mut synth, block.len() / 2);
///     synth.process(&mut block);
/// }
/// assert!(sequencer.tracked_notes() >= 1);
/// ```
#[derive(Debug)]
pub struct Sequencer<const N: usize = SEQUENCER_POLYPHONY> {
    durations: DurationTable,
    scale: Vec<u8>,
    running: bool,
    pause_remaining: i64,
    notes: [Option<TrackedNote>; N],
    params: Arc<SequencerParams>,
    transport_generation: u32,
    rng: SmallRng,
}

impl Sequencer {
    /// Creates a sequencer tracking up to [`SEQUENCER_POLYPHONY`] notes.
    ///
    /// The tempo must lie within 20..=300 BPM.
    pub fn new(config: &SequencerConfig, sample_rate: u32) -> Result<Self, SynthError> {
        Self::with_polyphony(config, sample_rate)
    }
}

impl<const N: usize> Sequencer<N> {
    /// Creates a sequencer tracking up to `N` notes.
    ///
    /// The tempo must lie within 20..=300 BPM.
    pub fn with_polyphony(config: &SequencerConfig, sample_rate: u32) -> Result<Self, SynthError> {
        if sample_rate == 0 {
            return Err(SynthError::InvalidSampleRate(0.0));
        }
        check_range(&BPM, config.bpm as f32)?;
        let params = Arc::new(SequencerParams::new(config.bpm, config.running));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            bpm = params.bpm(),
            notes = config.scale.len(),
            polyphony = N,
            "created sequencer"
        );

        Ok(Self {
            durations: DurationTable::new(sample_rate, params.bpm()),
            scale: config.scale.clone(),
            running: config.running,
            pause_remaining: 0,
            notes: [None; N],
            transport_generation: params.transport.current(),
            params,
            rng: SmallRng::seed_from_u64(config.seed),
        })
    }

    /// Shared parameter handle for a control thread.
    pub fn params(&self) -> Arc<SequencerParams> {
        Arc::clone(&self.params)
    }

    /// Sets the tempo, clamped to 20..=300 BPM, and recomputes the note lengths.
    pub fn set_bpm(&mut self, bpm: u32) {
        self.params.set_bpm(bpm);
        self.durations.set_bpm(self.params.bpm());
    }

    /// Starts or stops generating notes. Notes already sounding still end on time.
    pub fn set_running(&mut self, running: bool) {
        self.params.set_running(running);
        self.sync_params();
    }

    /// Advances the sequencer by `frames` frames.
    ///
    /// Releases expired notes, then (when running and the pause is over) picks
    /// the next pause and starts at most one new note.
    pub fn process<S: NoteSink + ?Sized>(&mut self, sink: &mut S, frames: usize) {
        self.sync_params();
        let elapsed = frames as i64;

        for slot in &mut self.notes {
            if let Some(tracked) = slot {
                tracked.remaining -= elapsed;
                if tracked.remaining <= 0 {
                    sink.note_off(tracked.note);
                    *slot = None;
                }
            }
        }

        if !self.running {
            return;
        }

        self.pause_remaining -= elapsed;
        if self.pause_remaining > 0 {
            return;
        }
        let pause = self.random_division();
        self.pause_remaining = i64::from(self.durations.samples(pause));

        if self.scale.is_empty() {
            return;
        }
        let Some(free) = self.notes.iter().position(Option::is_none) else {
            return;
        };

        let note = self.scale[self.rng.random_range(0..self.scale.len())];
        let length = self.random_division();
        let remaining = i64::from(self.durations.samples(length));
        let velocity = self.rng.random::<f32>();

        self.notes[free] = Some(TrackedNote { note, remaining });
        sink.note_on(note, velocity);
    }

    /// Number of notes currently tracked as sounding.
    pub fn tracked_notes(&self) -> usize {
        self.notes.iter().filter(|n| n.is_some()).count()
    }

    /// The tracking slots.
    pub fn notes(&self) -> &[Option<TrackedNote>; N] {
        &self.notes
    }

    /// Note lengths at the current tempo.
    pub fn durations(&self) -> &DurationTable {
        &self.durations
    }

    /// Whether the sequencer is starting new notes.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Scale the sequencer picks from.
    pub fn scale(&self) -> &[u8] {
        &self.scale
    }

    /// Replaces the scale. Sounding notes are unaffected.
    pub fn set_scale(&mut self, scale: &[u8]) {
        self.scale.clear();
        self.scale.extend_from_slice(scale);
    }

    fn random_division(&mut self) -> NoteDivision {
        NoteDivision::from_index(self.rng.random_range(0..NoteDivision::ALL.len()))
    }

    fn sync_params(&mut self) {
        let bpm = self.params.bpm();
        if bpm != self.durations.bpm() {
            self.durations.set_bpm(bpm);
        }

        let generation = self.params.transport.current();
        if generation != self.transport_generation {
            self.transport_generation = generation;
            self.running = self.params.running();
            self.pause_remaining = 0;
        }
    }
}
