//! Pluggable audio output abstraction.
//!
//! [`AudioBackend`] keeps the synth's block driver independent of the platform
//! audio API. [`CpalBackend`](crate::CpalBackend) is the desktop implementation;
//! tests and offline rendering need no backend at all.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │   klimper play / host app    │
//! └──────────────┬───────────────┘
//!                │ OutputCallback
//!                ▼
//! ┌──────────────────────────────┐
//! │      AudioBackend trait      │
//! └──────────────┬───────────────┘
//!                ▼
//!         ┌─────────────┐
//!         │ CpalBackend │
//!         └─────────────┘
//! ```
//!
//! Callbacks are boxed closures so the trait stays object-safe. Streams come
//! back as a type-erased [`StreamHandle`] that stops playback on drop.

use crate::{AudioDevice, Result};

/// Configuration for building an output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStreamConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Preferred buffer size in frames. `None` lets the device choose.
    pub buffer_size: Option<u32>,
    /// Number of audio channels.
    pub channels: u16,
    /// Optional device name filter (uses system default if `None`).
    pub device_name: Option<String>,
}

impl Default for BackendStreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: Some(440),
            channels: 2,
            device_name: None,
        }
    }
}

/// Type-erased audio stream handle.
///
/// The stream is active while this handle exists; dropping it stops playback.
pub struct StreamHandle {
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Wrap a backend-specific stream object.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Audio output callback.
///
/// Runs on the real-time audio thread and must fill the interleaved buffer
/// `[L0, R0, L1, R1, ...]`. Implementations must not allocate, lock or block.
pub type OutputCallback = Box<dyn FnMut(&mut [f32]) + Send>;

/// Called with a human-readable message when the stream reports an error.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Platform audio output.
pub trait AudioBackend: Send {
    /// Human-readable name of this backend.
    fn name(&self) -> &str;

    /// List available output devices.
    fn list_devices(&self) -> Result<Vec<AudioDevice>>;

    /// The default output device, if any.
    fn default_output_device(&self) -> Result<Option<AudioDevice>>;

    /// Build and start an output stream.
    ///
    /// `callback` is invoked per device buffer on the audio thread. Dropping
    /// the returned handle stops playback.
    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;
}
