//! Real-time output through cpal
//!
//! The output callback is the render clock: every frame it asks the engine for
//! one sample. The control side only locks the engine briefly to schedule
//! events, and the callback renders silence rather than wait for the lock.

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

use super::Synth;
use crate::error::SynthError;

/// An opened output device
pub struct Player {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
}

impl Player {
    /// Open the named output device, or the default one.
    ///
    /// Fails with [`SynthError::Unsupported`] when no usable device exists.
    pub fn open(device_name: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = match device_name {
            Some(name) => host
                .output_devices()
                .context("failed to enumerate output devices")?
                .find(|d| d.name().is_ok_and(|n| n == name))
                .ok_or_else(|| SynthError::Unsupported(format!("no output device named `{name}`")))?,
            None => host
                .default_output_device()
                .ok_or_else(|| SynthError::Unsupported("no default output device".to_string()))?,
        };

        let supported = device
            .default_output_config()
            .map_err(|err| SynthError::Unsupported(err.to_string()))?;
        let sample_format = supported.sample_format();

        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate = supported.sample_rate().0,
            "opened output device"
        );

        Ok(Self {
            device,
            config: supported.into(),
            sample_format,
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Sample rate the device renders at; the engine clock must match it
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Start rendering `synth` to the device
    pub fn start(&mut self, synth: Arc<Mutex<Synth>>) -> Result<()> {
        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();

        let stream = match self.sample_format {
            SampleFormat::F32 => self.build_stream::<f32>(synth, running)?,
            SampleFormat::I16 => self.build_stream::<i16>(synth, running)?,
            SampleFormat::U16 => self.build_stream::<u16>(synth, running)?,
            other => {
                return Err(SynthError::Unsupported(format!("sample format {other:?}")).into());
            }
        };

        stream.play().context("failed to start output stream")?;
        self.stream = Some(stream);
        Ok(())
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.stream = None;
    }

    fn build_stream<T>(&self, synth: Arc<Mutex<Synth>>, running: Arc<AtomicBool>) -> Result<Stream>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let channels = usize::from(self.config.channels);

        let stream = self.device.build_output_stream(
            &self.config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let guard = if running.load(Ordering::SeqCst) {
                    synth.try_lock().ok()
                } else {
                    None
                };

                let Some(mut synth) = guard else {
                    data.fill(T::from_sample(0.0f32));
                    return;
                };

                for frame in data.chunks_mut(channels) {
                    let sample = T::from_sample(synth.process() as f32);
                    frame.fill(sample);
                }
            },
            |err| error!(%err, "output stream error"),
            None,
        )?;

        Ok(stream)
    }
}

/// Name of the default output device
pub fn default_device_name() -> Option<String> {
    cpal::default_host()
        .default_output_device()
        .and_then(|d| d.name().ok())
}

/// Output devices with their default sample rate and channel count
pub fn list_output_devices() -> Result<Vec<(String, u32, u16)>> {
    let devices = cpal::default_host()
        .output_devices()
        .map_err(|err| anyhow!("failed to enumerate output devices: {err}"))?;

    Ok(devices
        .filter_map(|device| {
            let name = device.name().ok()?;
            let config = device.default_output_config().ok()?;
            Some((name, config.sample_rate().0, config.channels()))
        })
        .collect())
}
