//! monosynth - a monophonic subtractive synthesizer
//!
//! Three detuned oscillators feed an ADSR-shaped gain, a resonant low-pass
//! filter and a feedback echo. Note events and parameter edits schedule
//! automation against a sample clock; audio is rendered one frame at a time,
//! live through the output device or offline to a WAV file.

pub mod config;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod notes;
pub mod params;
pub mod synth;
pub mod viz;

pub use config::SynthConfig;
pub use engine::{AudioContext, Synth};
pub use error::SynthError;
pub use params::{AdsrTarget, ParamId, ParamSet, Waveform};
pub use viz::OutputTap;
