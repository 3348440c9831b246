//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Output tap settings
    #[serde(default)]
    pub analyser: AnalyserConfig,
}

impl SynthConfig {
    pub fn validate(&self) -> Result<()> {
        if !(8000..=192_000).contains(&self.audio.sample_rate) {
            bail!("sample rate must be between 8000 and 192000");
        }
        if !(64..=8192).contains(&self.audio.buffer_size) {
            bail!("buffer size must be between 64 and 8192");
        }

        let fft_size = self.analyser.fft_size;
        if !fft_size.is_power_of_two() || !(32..=32768).contains(&fft_size) {
            bail!("fft size must be a power of two between 32 and 32768, got {fft_size}");
        }

        Ok(())
    }
}

/// Audio output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz for offline rendering (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Frames rendered per block (default: 512)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Output device name (None = default device)
    #[serde(default)]
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            device: None,
        }
    }
}

fn default_sample_rate() -> u32 { 44100 }
fn default_buffer_size() -> usize { 512 }

/// Output tap configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyserConfig {
    /// Analyser window in samples; frames are half as long (default: 256)
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: default_fft_size(),
        }
    }
}

fn default_fft_size() -> usize { 256 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SynthConfig::default();
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.audio.buffer_size, 512);
        assert_eq!(config.audio.device, None);
        assert_eq!(config.analyser.fft_size, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: SynthConfig = serde_yaml::from_str("audio:\n  sample_rate: 48000\n").unwrap();
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.audio.buffer_size, 512);
        assert_eq!(config.analyser.fft_size, 256);
    }

    #[test]
    fn test_config_validation() {
        let mut config = SynthConfig::default();
        config.audio.sample_rate = 4000;
        assert!(config.validate().is_err());

        let mut config = SynthConfig::default();
        config.audio.buffer_size = 16384;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fft_size_validation() {
        let mut config = SynthConfig::default();

        config.analyser.fft_size = 300;
        assert!(config.validate().is_err());

        config.analyser.fft_size = 16;
        assert!(config.validate().is_err());

        config.analyser.fft_size = 2048;
        assert!(config.validate().is_ok());
    }
}
