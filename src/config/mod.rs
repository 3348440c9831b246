//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<SynthConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: SynthConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Load `path` if given, otherwise use defaults
pub fn load_or_default(path: Option<&Path>) -> Result<SynthConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(SynthConfig::default()),
    }
}

/// Example configuration printed by `monosynth init`
pub fn example_yaml() -> &'static str {
    r#"# monosynth configuration

audio:
  # Sample rate for offline rendering (live playback follows the device)
  sample_rate: 44100
  # Frames rendered per block
  buffer_size: 512
  # Output device name; omit for the default device
  # device: "Built-in Output"

analyser:
  # Output tap window; frames are half this long
  fft_size: 256
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_minimal_config() {
        let file = write_config("audio:\n  sample_rate: 22050\n  buffer_size: 256\n");

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.audio.sample_rate, 22050);
        assert_eq!(config.audio.buffer_size, 256);
        assert_eq!(config.analyser.fft_size, 256);
    }

    #[test]
    fn test_example_is_valid() {
        let file = write_config(example_yaml());
        assert_eq!(load_config(file.path()).unwrap(), SynthConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let file = write_config("analyser:\n  fft_size: 100\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }

    #[test]
    fn test_load_or_default() {
        assert_eq!(load_or_default(None).unwrap(), SynthConfig::default());
    }
}
