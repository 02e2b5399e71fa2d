//! Configuration and patch management for the klimper synthesizer.
//!
//! # Features
//!
//! - **Config files**: Load and save [`KlimperConfig`] as TOML
//! - **Validation**: Ranges checked against the runtime parameter descriptors
//! - **Patches**: Built-in sounds plus user patch files
//! - **Paths**: Platform-specific config and patch directories
//!
//! # Example
//!
//! ```rust
//! use klimper_config::{KlimperConfig, patches};
//!
//! let mut config = patches::find("pluck").unwrap();
//! config.sequencer.bpm = 140;
//! config.validate().unwrap();
//!
//! let synth_config = config.to_synth_config();
//! assert_eq!(synth_config.sample_rate, 44100.0);
//!
//! let text = config.to_toml().unwrap();
//! assert_eq!(KlimperConfig::from_toml(&text).unwrap(), config);
//! ```

mod config;
mod error;

/// Platform-specific paths for configuration and patches.
#[cfg(feature = "std")]
pub mod paths;

/// Configuration validation.
pub mod validation;

/// Built-in patches.
pub mod patches;

pub use config::{
    AudioSection, EnvelopeSection, FmSection, KlimperConfig, PanSection, SequencerSection,
    SynthSection,
};
pub use error::ConfigError;
pub use validation::{MAX_POLYPHONY, ValidationError, ValidationResult, validate_config};
