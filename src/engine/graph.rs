//! Fixed processing graph
//!
//! ```text
//! adsr gain -> filter -+-> delay <-> feedback gain
//!                      |                  |
//!                      +-> output gain <--+ -> output tap
//! ```
//!
//! The topology never changes; only stage properties do. The ADSR gain and the
//! filter cutoff are automation timelines because the envelope drives them.
//! Volume, resonance, echo time and feedback are plain values set immediately.

use crate::params::{AdsrTarget, MAX_ECHO_DURATION};
use crate::synth::{Automation, DelayLine, Filter};

/// Signals produced by one sample of the graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphOutput {
    /// Filter stage output (the dry path)
    pub filtered: f64,
    /// Feedback gain output (the echo path)
    pub wet: f64,
    /// Output gain stage
    pub output: f64,
}

/// The engine's processing stages
#[derive(Debug, Clone)]
pub struct SignalGraph {
    sample_rate: f64,
    adsr_gain: Automation,
    filter_frequency: Automation,
    filter: Filter,
    delay: DelayLine,
    /// Echo delay in seconds
    delay_time: f64,
    feedback_gain: f64,
    output_gain: f64,
}

impl SignalGraph {
    /// Build the graph with unity gains, no echo and the given filter settings
    pub fn new(sample_rate: f64, cutoff: f64, q: f64) -> Self {
        Self {
            sample_rate,
            adsr_gain: Automation::new(1.0),
            filter_frequency: Automation::new(cutoff),
            filter: Filter::new(sample_rate, cutoff, q),
            delay: DelayLine::new(MAX_ECHO_DURATION, sample_rate),
            delay_time: 0.0,
            feedback_gain: 0.0,
            output_gain: 1.0,
        }
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Gain stage the amplitude envelope drives
    pub fn adsr_gain(&self) -> &Automation {
        &self.adsr_gain
    }

    pub fn adsr_gain_mut(&mut self) -> &mut Automation {
        &mut self.adsr_gain
    }

    /// Filter cutoff in Hz
    pub fn filter_frequency(&self) -> &Automation {
        &self.filter_frequency
    }

    pub fn filter_frequency_mut(&mut self) -> &mut Automation {
        &mut self.filter_frequency
    }

    /// The quantity an envelope with `target` automates
    pub fn envelope_target_mut(&mut self, target: AdsrTarget) -> &mut Automation {
        match target {
            AdsrTarget::Amplitude => &mut self.adsr_gain,
            AdsrTarget::Filter => &mut self.filter_frequency,
        }
    }

    /// Get the filter resonance in dB
    pub fn filter_q(&self) -> f64 {
        self.filter.q()
    }

    /// Resonance in dB
    pub fn set_filter_q(&mut self, q: f64) {
        self.filter.set_q(q);
    }

    /// Get the echo delay in seconds
    pub fn delay_time(&self) -> f64 {
        self.delay_time
    }

    /// Echo delay in seconds; the line holds at most [`MAX_ECHO_DURATION`]
    pub fn set_delay_time(&mut self, seconds: f64) {
        self.delay_time = seconds;
    }

    /// Get the echo feedback gain
    pub fn feedback_gain(&self) -> f64 {
        self.feedback_gain
    }

    /// Not clamped: a gain at or above 1 lets the echo grow without bound
    pub fn set_feedback_gain(&mut self, gain: f64) {
        self.feedback_gain = gain;
    }

    /// Get the master volume
    pub fn output_gain(&self) -> f64 {
        self.output_gain
    }

    pub fn set_output_gain(&mut self, gain: f64) {
        self.output_gain = gain;
    }

    /// Fold automation reached by the render clock
    pub fn advance(&mut self, now: f64) {
        self.adsr_gain.advance(now);
        self.filter_frequency.advance(now);
    }

    /// Run one source sample through every stage at time `t`
    pub fn process(&mut self, input: f64, t: f64) -> GraphOutput {
        let gained = input * self.adsr_gain.value_at(t);

        self.filter.set_cutoff(self.filter_frequency.value_at(t));
        let filtered = self.filter.process(gained);

        let delay_samples = (self.delay_time * self.sample_rate).round().max(0.0) as usize;
        let wet = self.delay.read(delay_samples) * self.feedback_gain;
        self.delay.write(filtered + wet);

        GraphOutput {
            filtered,
            wet,
            output: (filtered + wet) * self.output_gain,
        }
    }
}
