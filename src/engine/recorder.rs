//! Offline rendering to WAV through hound

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use super::{Sequence, Synth};

/// Mono 32-bit float WAV writer
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    sample_rate: u32,
    frames: u64,
}

impl Recorder {
    pub fn create(path: &Path, sample_rate: u32) -> Result<Self> {
        let format = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let writer = WavWriter::create(path, format)
            .with_context(|| format!("failed to create WAV file {}", path.display()))?;

        Ok(Self {
            writer,
            sample_rate,
            frames: 0,
        })
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / f64::from(self.sample_rate)
    }

    pub fn write(&mut self, samples: &[f32]) -> Result<()> {
        for &sample in samples {
            self.writer
                .write_sample(sample)
                .context("failed to write sample")?;
        }
        self.frames += samples.len() as u64;
        Ok(())
    }

    /// Write the header and close the file, returning the recorded duration
    pub fn finalize(self) -> Result<f64> {
        let duration = self.duration_secs();
        self.writer
            .finalize()
            .context("failed to finalize WAV file")?;
        Ok(duration)
    }
}

/// Render `sequence` plus `tail` seconds to a WAV file, `block_size` frames
/// at a time
pub fn render_to_wav(
    path: &Path,
    synth: &mut Synth,
    sequence: &Sequence,
    tail: f64,
    block_size: usize,
) -> Result<f64> {
    let sample_rate = synth.sample_rate().round() as u32;
    let mut recorder = Recorder::create(path, sample_rate)?;

    sequence.render_blocks(synth, tail, block_size, |block| recorder.write(block))?;

    let duration = recorder.finalize()?;
    info!(path = %path.display(), duration, "rendered WAV");
    Ok(duration)
}
