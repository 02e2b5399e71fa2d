//! Real-time playback.

use super::common::{SoundArgs, engine_config, load_config};
use clap::Args;
use klimper_io::{AudioBackend, BackendStreamConfig, CpalBackend, RenderEngine};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    sound: SoundArgs,

    /// Stop after this many seconds (plays until Ctrl+C otherwise)
    #[arg(short, long)]
    seconds: Option<f64>,

    /// Output device name (substring match)
    #[arg(short, long)]
    device: Option<String>,

    /// Let the device pick its buffer size instead of one block
    #[arg(long)]
    default_buffer: bool,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    if let Some(seconds) = args.seconds
        && (!seconds.is_finite() || seconds <= 0.0)
    {
        anyhow::bail!("--seconds must be positive, got {seconds}");
    }

    let config = load_config(&args.sound)?;
    let mut engine = RenderEngine::new(&engine_config(&config))?;
    let control = engine.control_handle();

    let backend = CpalBackend::new();
    let output_name = args
        .device
        .clone()
        .or(backend.default_output_device()?.map(|d| d.name))
        .unwrap_or_else(|| "none".to_string());

    let stream_config = BackendStreamConfig {
        sample_rate: engine.sample_rate(),
        buffer_size: (!args.default_buffer).then_some(engine.frames_per_block() as u32),
        channels: 2,
        device_name: args.device.clone(),
    };

    println!("Playing '{}'", config.display_name());
    println!("  Output:      {}", output_name);
    println!("  Sample rate: {} Hz", stream_config.sample_rate);
    println!("  Tempo:       {} bpm", config.sequencer.bpm);
    println!("\nPress Ctrl+C to stop...\n");

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        println!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    let stream = backend.build_output_stream(
        &stream_config,
        Box::new(move |data: &mut [f32]| engine.fill(data)),
        Box::new(|err: &str| tracing::error!(error = err, "output stream error")),
    )?;

    let started = Instant::now();
    let deadline = args.seconds.map(Duration::from_secs_f64);
    while running.load(Ordering::SeqCst) {
        if deadline.is_some_and(|d| started.elapsed() >= d) {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    // Silence first so the device drains zeros instead of cutting a note
    control.sequencer_params().set_running(false);
    control.all_notes_off();
    std::thread::sleep(Duration::from_millis(100));
    drop(stream);

    println!("Done!");
    Ok(())
}
