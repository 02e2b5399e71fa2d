//! Offline rendering to a WAV file.

use super::common::{SoundArgs, engine_config, load_config};
use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use klimper_io::{RenderEngine, WavBlockWriter};
use std::path::PathBuf;

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Length of the render in seconds
    #[arg(short, long, default_value = "10")]
    seconds: f64,

    #[command(flatten)]
    sound: SoundArgs,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if !args.seconds.is_finite() || args.seconds <= 0.0 {
        anyhow::bail!("--seconds must be positive, got {}", args.seconds);
    }

    let config = load_config(&args.sound)?;
    let mut engine = RenderEngine::new(&engine_config(&config))?;
    let blocks = engine.blocks_for_seconds(args.seconds);

    println!(
        "Rendering '{}' to {}...",
        config.display_name(),
        args.output.display()
    );
    println!(
        "  {:.2}s, {} Hz, {} voices, {} bpm",
        args.seconds,
        engine.sample_rate(),
        config.synth.polyphony,
        config.sequencer.bpm
    );

    let mut wav = WavBlockWriter::create(&args.output, engine.sample_rate())
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let pb = ProgressBar::new(blocks as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} blocks ({eta})")?
            .progress_chars("##-"),
    );

    let mut peak = 0.0f32;
    let mut clipped = 0usize;
    for _ in 0..blocks {
        wav.write_block(engine.render_block_i16())?;
        for &sample in engine.last_block() {
            peak = peak.max(sample.abs());
            if sample.abs() > 1.0 {
                clipped += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let frames = wav.frames();
    wav.finalize()?;
    tracing::info!(path = %args.output.display(), frames, "render complete");

    println!("\nStats:");
    println!("  Frames:  {}", frames);
    println!("  Peak:    {:.1} dB", linear_to_db(peak));
    if clipped > 0 {
        println!("  Clipped: {} samples", clipped);
    }
    println!("Done!");
    Ok(())
}

fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}
