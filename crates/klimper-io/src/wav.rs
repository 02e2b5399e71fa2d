//! WAV file reading and writing.
//!
//! Rendered audio is interleaved stereo. [`WavBlockWriter`] streams 16-bit
//! blocks straight from the engine; [`write_wav`] and [`read_wav`] handle whole
//! buffers.

use crate::Result;
use hound::{SampleFormat, WavReader, WavWriter};
use klimper_core::sample_to_i16;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let total_samples = reader.len() as u64;
    let num_frames = total_samples / spec.channels as u64;
    let duration_secs = num_frames as f64 / spec.sample_rate as f64;

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// WAV file specification.
///
/// Defaults to the synth's native output: stereo, 16-bit, 44.1 kHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample: 16 for PCM, 32 for float.
    pub bits_per_sample: u16,
}

impl WavSpec {
    /// 16-bit interleaved stereo at `sample_rate`.
    pub fn stereo_16(sample_rate: u32) -> Self {
        Self {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
        }
    }
}

impl Default for WavSpec {
    fn default() -> Self {
        Self::stereo_16(44100)
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Read a WAV file as interleaved f32 samples in `[-1, 1]`.
///
/// Channels are kept as they are in the file.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());

    let samples = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i32 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    Ok((samples, spec))
}

/// Write interleaved f32 samples to a WAV file.
///
/// 16-bit files use the same conversion as the live output path.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    match spec.bits_per_sample {
        32 => {
            for &sample in samples {
                writer.write_sample(sample)?;
            }
        }
        16 => {
            for &sample in samples {
                writer.write_sample(sample_to_i16(sample))?;
            }
        }
        bits => {
            let max_val = (1i32 << (bits - 1)) as f32;
            for &sample in samples {
                let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
                writer.write_sample(int_sample)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

/// Streams 16-bit stereo blocks to a WAV file.
///
/// The header is patched with the final length by [`finalize`](Self::finalize).
/// Dropping the writer without finalizing still produces a readable file, but
/// write errors during that last flush are lost.
pub struct WavBlockWriter {
    writer: WavWriter<BufWriter<File>>,
    frames: u64,
}

impl WavBlockWriter {
    /// Create `path` as a 16-bit stereo file at `sample_rate`.
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32) -> Result<Self> {
        let path = path.as_ref();
        let writer = WavWriter::create(path, WavSpec::stereo_16(sample_rate).into())?;
        tracing::debug!(path = %path.display(), sample_rate, "wav writer opened");
        Ok(Self { writer, frames: 0 })
    }

    /// Append one interleaved stereo block.
    pub fn write_block(&mut self, block: &[i16]) -> Result<()> {
        let mut samples = self.writer.get_i16_writer(block.len() as u32);
        for &sample in block {
            samples.write_sample(sample);
        }
        samples.flush()?;
        self.frames += (block.len() / 2) as u64;
        Ok(())
    }

    /// Frames written so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Flush and patch the header.
    pub fn finalize(self) -> Result<()> {
        let frames = self.frames;
        self.writer.finalize()?;
        tracing::debug!(frames, "wav writer finalized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_spec_is_stereo_16() {
        let spec = WavSpec::default();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_rate, 44100);

        let hound_spec = hound::WavSpec::from(spec);
        assert_eq!(hound_spec.sample_format, SampleFormat::Int);
    }

    #[test]
    fn test_float_spec_maps_to_float_format() {
        let spec = WavSpec {
            bits_per_sample: 32,
            ..WavSpec::default()
        };
        assert_eq!(hound::WavSpec::from(spec).sample_format, SampleFormat::Float);
    }

    #[test]
    fn test_block_writer_counts_frames() {
        let temp = NamedTempFile::with_suffix(".wav").unwrap();
        let mut writer = WavBlockWriter::create(temp.path(), 44100).unwrap();
        writer.write_block(&[0, 0, 100, -100]).unwrap();
        writer.write_block(&[i16::MAX, -i16::MAX]).unwrap();
        assert_eq!(writer.frames(), 3);
        writer.finalize().unwrap();

        let info = read_wav_info(temp.path()).unwrap();
        assert_eq!(info.num_frames, 3);
        assert_eq!(info.channels, 2);
        assert_eq!(info.format, WavFormat::Pcm);
    }

    #[test]
    fn test_sixteen_bit_write_clamps() {
        let temp = NamedTempFile::with_suffix(".wav").unwrap();
        write_wav(temp.path(), &[2.0, -2.0, 0.0, 0.5], WavSpec::default()).unwrap();

        let (samples, spec) = read_wav(temp.path()).unwrap();
        assert_eq!(spec, WavSpec::default());
        assert_eq!(samples.len(), 4);
        assert!(samples[0] > 0.999);
        assert!(samples[1] < -0.999);
        assert_eq!(samples[2], 0.0);
        assert!((samples[3] - 0.5).abs() < 1e-3);
    }
}
