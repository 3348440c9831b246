//! Synthesis building blocks
//!
//! Oscillators, the low-pass filter, the echo delay line, automation
//! timelines, the ADSR envelope and the monophonic voice slot.

mod automation;
mod delay;
mod envelope;
mod filter;
mod oscillator;
mod voice;

pub use automation::{Automation, AutomationEvent};
pub use delay::DelayLine;
pub use envelope::{Envelope, EnvelopeLevels, EnvelopeShape, EnvelopeStage};
pub use filter::Filter;
pub use oscillator::Oscillator;
pub use voice::{Voice, VoiceManager, VOICE_OSCILLATORS};
