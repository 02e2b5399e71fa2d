//! Audio I/O layer for the klimper synthesizer.
//!
//! This crate provides:
//!
//! - **Block driver**: [`RenderEngine`] interleaves the sequencer and the synth
//!   in fixed sub-blocks and hands out finished stereo blocks
//! - **Control**: [`ControlHandle`] for parameter changes and notes from other threads
//! - **WAV output**: [`WavBlockWriter`] streams 16-bit blocks to disk; [`read_wav`]
//!   and [`read_wav_info`] load them back
//! - **Real-time output**: the [`AudioBackend`] trait with a cpal implementation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use klimper_io::{EngineConfig, RenderEngine, WavBlockWriter};
//!
//! let mut engine = RenderEngine::new(&EngineConfig::default())?;
//! let mut wav = WavBlockWriter::create("out.wav", engine.sample_rate())?;
//!
//! // Ten seconds of the default patch
//! for _ in 0..engine.blocks_for_seconds(10.0) {
//!     wav.write_block(engine.render_block_i16())?;
//! }
//! wav.finalize()?;
//! # Ok::<(), klimper_io::Error>(())
//! ```

pub mod backend;
pub mod cpal_backend;
mod devices;
mod engine;
mod wav;

pub use backend::{AudioBackend, BackendStreamConfig, ErrorCallback, OutputCallback, StreamHandle};
pub use cpal_backend::CpalBackend;
pub use devices::{AudioDevice, default_output_device, list_output_devices};
pub use engine::{
    ControlHandle, DEFAULT_BLOCK_SIZE, DEFAULT_SUB_BLOCK_SIZE, EngineConfig, NOTE_QUEUE_CAPACITY,
    NoteCommand, RenderEngine,
};
pub use wav::{WavBlockWriter, WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav};

use klimper_synth::SynthError;

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The device cannot play the requested format.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The synth engine or block layout could not be set up.
    #[error("Engine error: {0}")]
    Engine(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SynthError> for Error {
    fn from(err: SynthError) -> Self {
        Error::Engine(err.to_string())
    }
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
