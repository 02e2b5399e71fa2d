//! Output device discovery via cpal.

use crate::Result;
use cpal::Device;
use cpal::traits::{DeviceTrait, HostTrait};

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Audio output device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub channels: u16,
}

impl AudioDevice {
    fn from_cpal(device: &Device) -> Option<Self> {
        let name = device_name(device).ok()?;
        let (default_sample_rate, channels) = device
            .default_output_config()
            .map(|c| (c.sample_rate(), c.channels()))
            .unwrap_or((44100, 2));
        Some(Self {
            name,
            default_sample_rate,
            channels,
        })
    }
}

/// List the output devices of the default host.
pub fn list_output_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let Ok(outputs) = host.output_devices() else {
        return Ok(Vec::new());
    };
    Ok(outputs.filter_map(|d| AudioDevice::from_cpal(&d)).collect())
}

/// The default output device of the default host, if there is one.
pub fn default_output_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host
        .default_output_device()
        .and_then(|d| AudioDevice::from_cpal(&d)))
}
