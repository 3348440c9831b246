//! Render clock shared by every stage of one engine

use crate::error::{Result, SynthError};

/// Sample-accurate audio clock
///
/// Each engine owns its own context, so several engines can run side by side
/// (tests do this).
#[derive(Debug, Clone)]
pub struct AudioContext {
    sample_rate: f64,
    frames: u64,
}

impl AudioContext {
    pub fn new(sample_rate: f64) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SynthError::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            sample_rate,
            frames: 0,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Time of the next frame to render, in seconds
    pub fn current_time(&self) -> f64 {
        self.frames as f64 / self.sample_rate
    }

    /// Advance the clock by one frame
    pub fn tick(&mut self) {
        self.frames += 1;
    }
}
