//! Command line interface for monosynth

use clap::{Parser, Subcommand};
use monosynth::params::ParamId;
use std::path::PathBuf;

/// Monophonic subtractive synthesizer
#[derive(Parser)]
#[command(name = "monosynth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a note sequence to a WAV file
    Render {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Comma-separated note names (C-3 .. C-4) or frequencies in Hz
        #[arg(short, long, value_delimiter = ',', default_value = "A-3")]
        notes: Vec<String>,

        /// Seconds between note starts
        #[arg(short = 'l', long, default_value_t = 1.0)]
        note_length: f64,

        /// Fraction of the note length held before release
        #[arg(short, long, default_value_t = 0.5)]
        gate: f64,

        /// Seconds rendered after the last event
        #[arg(short, long, default_value_t = 1.0)]
        tail: f64,

        /// Parameter override, e.g. `--set waveform=1`
        #[arg(short, long = "set", value_parser = parse_assignment)]
        set: Vec<(ParamId, f64)>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Play live from the computer keyboard
    Play {
        /// Parameter override, e.g. `--set adsrTarget=1`
        #[arg(short, long = "set", value_parser = parse_assignment)]
        set: Vec<(ParamId, f64)>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List parameters, defaults and limits
    Params,

    /// List available audio output devices
    Devices,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "monosynth.yaml")]
        config: PathBuf,
    },

    /// Print an example configuration file
    Init,
}

/// Parse `name=value` into a parameter assignment
pub fn parse_assignment(s: &str) -> Result<(ParamId, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{s}`"))?;
    let id = name.trim().parse::<ParamId>().map_err(|e| e.to_string())?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for {id}: {e}"))?;
    Ok((id, value))
}
