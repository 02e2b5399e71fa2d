//! Audio output device listing.

use klimper_io::{AudioBackend, CpalBackend};

pub fn run() -> anyhow::Result<()> {
    let backend = CpalBackend::new();
    let devices = backend.list_devices()?;
    let default = backend.default_output_device()?;

    if devices.is_empty() {
        println!("No output devices found.");
        return Ok(());
    }

    println!("Output devices ({}):", backend.name());
    for device in &devices {
        let marker = if default.as_ref().is_some_and(|d| d.name == device.name) {
            "*"
        } else {
            " "
        };
        println!(
            "  {} {} ({} Hz, {} ch)",
            marker, device.name, device.default_sample_rate, device.channels
        );
    }
    Ok(())
}
