//! Klimper CLI - render and play the generative synthesizer.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "klimper")]
#[command(author, version, about = "Klimper generative synthesizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the sequencer and synth to a WAV file
    Render(commands::render::RenderArgs),

    /// Play in real time on an audio device
    Play(commands::play::PlayArgs),

    /// List built-in and user patches
    Patches(commands::patches::PatchesArgs),

    /// List the adjustable parameters and their ranges
    Params(commands::params::ParamsArgs),

    /// List audio output devices
    Devices,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so rendered listings stay clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Play(args) => commands::play::run(args),
        Commands::Patches(args) => commands::patches::run(args),
        Commands::Params(args) => commands::params::run(args),
        Commands::Devices => commands::devices::run(),
    }
}
