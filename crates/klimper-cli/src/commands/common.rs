//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use clap::Args;
use klimper_config::{KlimperConfig, paths, patches};
use klimper_io::EngineConfig;
use std::path::PathBuf;

/// Options selecting the sound, shared by every command that builds an engine.
#[derive(Args, Debug, Clone, Default)]
pub struct SoundArgs {
    /// Configuration file (TOML)
    #[arg(short, long, conflicts_with = "patch")]
    pub config: Option<PathBuf>,

    /// Built-in patch name or patch file
    #[arg(short, long)]
    pub patch: Option<String>,

    /// Override the sequencer tempo
    #[arg(long)]
    pub bpm: Option<u32>,

    /// Override the random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Load the configuration the arguments ask for.
///
/// Searches in this order:
/// 1. `--config FILE`
/// 2. `--patch NAME` (built-in, then user patch directory, then path)
/// 3. The user's default config file, if present
/// 4. Built-in defaults
///
/// Overrides are applied afterwards and the result is validated.
pub fn load_config(args: &SoundArgs) -> anyhow::Result<KlimperConfig> {
    let mut config = if let Some(path) = &args.config {
        KlimperConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?
    } else if let Some(name) = &args.patch {
        patches::resolve(name).with_context(|| {
            format!("patch '{name}' not found. Use 'klimper patches' to see available patches.")
        })?
    } else {
        let default_path = paths::default_config_path();
        if default_path.is_file() {
            tracing::info!(path = %default_path.display(), "using default config file");
            KlimperConfig::load(&default_path)
                .with_context(|| format!("failed to load {}", default_path.display()))?
        } else {
            KlimperConfig::default()
        }
    };

    if let Some(bpm) = args.bpm {
        config.sequencer.bpm = bpm;
    }
    if let Some(seed) = args.seed {
        config.sequencer.seed = Some(seed);
    }

    config
        .validate()
        .with_context(|| format!("invalid configuration '{}'", config.display_name()))?;
    Ok(config)
}

/// Engine settings for a validated configuration.
pub fn engine_config(config: &KlimperConfig) -> EngineConfig {
    EngineConfig {
        synth: config.to_synth_config(),
        sequencer: config.to_sequencer_config(),
        block_size: config.audio.block_size,
        sub_block_size: config.audio.sub_block_size,
        table_length: config.audio.table_length,
    }
}
