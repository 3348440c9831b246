//! Error types for the synthesis engine

use thiserror::Error;

/// Errors raised by the engine and its lookup tables
#[derive(Debug, Error)]
pub enum SynthError {
    /// The audio environment cannot host the engine (no device, unusable stream)
    #[error("audio output is not supported: {0}")]
    Unsupported(String),

    /// Sample rate is non-finite or not positive
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    /// Parameter name does not match any known parameter
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    /// Note name is not on the keyboard
    #[error("unknown note `{0}`")]
    UnknownNote(String),
}

pub type Result<T> = std::result::Result<T, SynthError>;
