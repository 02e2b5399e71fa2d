//! Block driver: runs the sequencer and the synth in lockstep.
//!
//! An output block is split into sub-blocks. Before each sub-block the driver
//! drains queued [`NoteCommand`]s, advances the sequencer by the sub-block's
//! frame count and then lets the synth mix into it. Note timing therefore has
//! sub-block resolution (5 ms at the default layout).

use crossbeam_channel::{Receiver, Sender, TrySendError};
use klimper_core::{
    DEFAULT_GUARD_POINTS, DEFAULT_TABLE_LENGTH, ParamDescriptor, ParameterInfo, WavetableCache,
    sample_to_i16,
};
use klimper_synth::{
    Sequencer, SequencerConfig, SequencerParams, Synth, SynthConfig, SynthError, SynthParams,
};
use std::sync::Arc;

use crate::{Error, Result};

/// Interleaved slots per output block (440 stereo frames).
pub const DEFAULT_BLOCK_SIZE: usize = 880;

/// Interleaved slots per sequencer/synth step (110 stereo frames).
pub const DEFAULT_SUB_BLOCK_SIZE: usize = 220;

/// Capacity of the note command queue. Sends beyond it are dropped.
pub const NOTE_QUEUE_CAPACITY: usize = 64;

/// A note event queued from a control thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteCommand {
    /// Start `note` at `velocity` in `[0, 1]`.
    NoteOn {
        /// MIDI note number.
        note: u8,
        /// Velocity in `[0, 1]`.
        velocity: f32,
    },
    /// Release `note`.
    NoteOff {
        /// MIDI note number.
        note: u8,
    },
    /// Silence every voice at once.
    AllNotesOff,
}

/// Everything needed to build a [`RenderEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Synth settings. Its sample rate drives the whole engine.
    pub synth: SynthConfig,
    /// Sequencer settings.
    pub sequencer: SequencerConfig,
    /// Interleaved slots per output block.
    pub block_size: usize,
    /// Interleaved slots per step. Must be even and divide `block_size`.
    pub sub_block_size: usize,
    /// Wavetable length in samples.
    pub table_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            synth: SynthConfig::default(),
            sequencer: SequencerConfig::default(),
            block_size: DEFAULT_BLOCK_SIZE,
            sub_block_size: DEFAULT_SUB_BLOCK_SIZE,
            table_length: DEFAULT_TABLE_LENGTH,
        }
    }
}

impl EngineConfig {
    /// Checks the block layout.
    pub fn validate_layout(&self) -> Result<()> {
        let (block, sub) = (self.block_size, self.sub_block_size);
        if block == 0 || sub == 0 {
            return Err(Error::Engine(format!(
                "block sizes must be non-zero (block {block}, sub-block {sub})"
            )));
        }
        if sub % 2 != 0 {
            return Err(Error::Engine(format!(
                "sub-block size {sub} is not a whole number of stereo frames"
            )));
        }
        if block % sub != 0 {
            return Err(Error::Engine(format!(
                "sub-block size {sub} does not divide block size {block}"
            )));
        }
        Ok(())
    }
}

/// Owns the synth, the sequencer and the output buffers.
///
/// Nothing on the render path allocates or blocks, so the engine can be moved
/// into an audio callback as is.
pub struct RenderEngine {
    synth: Synth,
    sequencer: Sequencer,
    block: Vec<f32>,
    block_i16: Vec<i16>,
    sub_block_size: usize,
    sample_rate: u32,
    /// Read position in `block` for [`fill`](Self::fill).
    cursor: usize,
    commands: Receiver<NoteCommand>,
    sender: Sender<NoteCommand>,
}

impl RenderEngine {
    /// Builds the wavetables, the synth and the sequencer.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate_layout()?;

        let tables = WavetableCache::new(config.table_length, DEFAULT_GUARD_POINTS)
            .map_err(SynthError::from)?;
        let synth = Synth::new(&config.synth, &tables)?;
        let sample_rate = synth.sample_rate().round() as u32;
        let sequencer = Sequencer::new(&config.sequencer, sample_rate)?;
        let (sender, commands) = crossbeam_channel::bounded(NOTE_QUEUE_CAPACITY);

        tracing::info!(
            sample_rate,
            polyphony = synth.polyphony(),
            block_size = config.block_size,
            sub_block_size = config.sub_block_size,
            bpm = sequencer.durations().bpm(),
            "render engine ready"
        );

        Ok(Self {
            synth,
            sequencer,
            block: vec![0.0; config.block_size],
            block_i16: vec![0; config.block_size],
            sub_block_size: config.sub_block_size,
            sample_rate,
            cursor: config.block_size,
            commands,
            sender,
        })
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Interleaved slots per output block.
    pub fn block_size(&self) -> usize {
        self.block.len()
    }

    /// Interleaved slots per step.
    pub fn sub_block_size(&self) -> usize {
        self.sub_block_size
    }

    /// Stereo frames per output block.
    pub fn frames_per_block(&self) -> usize {
        self.block.len() / 2
    }

    /// Number of whole blocks needed to cover `seconds` of audio.
    pub fn blocks_for_seconds(&self, seconds: f64) -> usize {
        if seconds <= 0.0 {
            return 0;
        }
        let frames = seconds * f64::from(self.sample_rate);
        (frames / self.frames_per_block() as f64).ceil() as usize
    }

    /// The synth, for inspection.
    pub fn synth(&self) -> &Synth {
        &self.synth
    }

    /// The sequencer, for inspection.
    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Mutable access to the sequencer, e.g. to change its scale.
    pub fn sequencer_mut(&mut self) -> &mut Sequencer {
        &mut self.sequencer
    }

    /// A handle for changing parameters and sending notes from another thread.
    pub fn control_handle(&self) -> ControlHandle {
        ControlHandle {
            synth: self.synth.params(),
            sequencer: self.sequencer.params(),
            notes: self.sender.clone(),
        }
    }

    /// Renders one interleaved stereo block.
    pub fn render_block(&mut self) -> &[f32] {
        self.render();
        &self.block
    }

    /// Renders one block converted to 16-bit PCM.
    pub fn render_block_i16(&mut self) -> &[i16] {
        self.render();
        for (out, &sample) in self.block_i16.iter_mut().zip(self.block.iter()) {
            *out = sample_to_i16(sample);
        }
        &self.block_i16
    }

    /// The most recently rendered block, before 16-bit conversion.
    pub fn last_block(&self) -> &[f32] {
        &self.block
    }

    /// Fills an interleaved buffer of any length, rendering blocks as needed.
    ///
    /// Suited to device callbacks whose buffer size does not match the block.
    pub fn fill(&mut self, out: &mut [f32]) {
        let mut written = 0;
        while written < out.len() {
            if self.cursor >= self.block.len() {
                self.render();
            }
            let n = (out.len() - written).min(self.block.len() - self.cursor);
            out[written..written + n].copy_from_slice(&self.block[self.cursor..self.cursor + n]);
            written += n;
            self.cursor += n;
        }
    }

    fn render(&mut self) {
        self.block.fill(0.0);
        let frames = self.sub_block_size / 2;
        for chunk in self.block.chunks_exact_mut(self.sub_block_size) {
            while let Ok(command) = self.commands.try_recv() {
                match command {
                    NoteCommand::NoteOn { note, velocity } => {
                        self.synth.note_on(note, velocity);
                    }
                    NoteCommand::NoteOff { note } => {
                        self.synth.note_off(note);
                    }
                    NoteCommand::AllNotesOff => self.synth.all_notes_off(),
                }
            }
            self.sequencer.process(&mut self.synth, frames);
            self.synth.process(chunk);
        }
        self.cursor = 0;
    }
}

/// Control-thread access to a running [`RenderEngine`].
///
/// Parameter writes are lock-free and take effect at the next block. Notes go
/// through a bounded queue; a full queue drops the note and returns `false`.
///
/// As a [`ParameterInfo`] the handle lists the synth parameters first, then
/// the sequencer's.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    synth: Arc<SynthParams>,
    sequencer: Arc<SequencerParams>,
    notes: Sender<NoteCommand>,
}

impl ControlHandle {
    /// Synth parameters.
    pub fn synth_params(&self) -> &SynthParams {
        &self.synth
    }

    /// Sequencer parameters.
    pub fn sequencer_params(&self) -> &SequencerParams {
        &self.sequencer
    }

    /// Queues a note-on.
    pub fn note_on(&self, note: u8, velocity: f32) -> bool {
        self.send(NoteCommand::NoteOn { note, velocity })
    }

    /// Queues a note-off.
    pub fn note_off(&self, note: u8) -> bool {
        self.send(NoteCommand::NoteOff { note })
    }

    /// Queues silencing every voice.
    pub fn all_notes_off(&self) -> bool {
        self.send(NoteCommand::AllNotesOff)
    }

    /// Queues any command.
    pub fn send(&self, command: NoteCommand) -> bool {
        match self.notes.try_send(command) {
            Ok(()) => true,
            Err(TrySendError::Full(command)) => {
                tracing::warn!(?command, "note queue full, dropping command");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

impl ParameterInfo for ControlHandle {
    fn param_count(&self) -> usize {
        self.synth.param_count() + self.sequencer.param_count()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index.checked_sub(self.synth.param_count()) {
            None => self.synth.param_info(index),
            Some(i) => self.sequencer.param_info(i),
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index.checked_sub(self.synth.param_count()) {
            None => self.synth.get_param(index),
            Some(i) => self.sequencer.get_param(i),
        }
    }

    fn set_param(&self, index: usize, value: f32) {
        match index.checked_sub(self.synth.param_count()) {
            None => self.synth.set_param(index, value),
            Some(i) => self.sequencer.set_param(i, value),
        }
    }
}
