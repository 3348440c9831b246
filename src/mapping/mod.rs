//! Mapping functions from normalized parameters to physical quantities
//!
//! All functions are pure. Only the filter frequency is clamped, to an audible
//! floor and the Nyquist ceiling; everything else passes through unchecked.

use crate::params::{
    MAX_ADSR_STAGE_DURATION, MAX_ECHO_DURATION, MAX_FILTER_Q, MAX_UNISON_WIDTH, MIN_FILTER_FREQ,
};

/// Detune spread in cents
pub fn unison_width_cents(amount: f64) -> f64 {
    amount * MAX_UNISON_WIDTH
}

/// Filter cutoff in Hz, never below [`MIN_FILTER_FREQ`] nor above Nyquist
pub fn filter_frequency_hz(amount: f64, sample_rate: f64) -> f64 {
    let nyquist = sample_rate / 2.0;
    (amount * nyquist).max(MIN_FILTER_FREQ).min(nyquist)
}

/// Filter resonance in dB
pub fn filter_q(amount: f64) -> f64 {
    amount * MAX_FILTER_Q
}

/// Echo delay time in seconds
pub fn delay_time_seconds(amount: f64) -> f64 {
    amount * MAX_ECHO_DURATION
}

/// Echo feedback gain. Values at or above 1 make the echo loop unstable.
pub fn feedback_gain(amount: f64) -> f64 {
    amount
}

/// Duration of an attack, decay or release stage in seconds
pub fn adsr_stage_seconds(amount: f64) -> f64 {
    amount * MAX_ADSR_STAGE_DURATION
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 44100.0;

    #[test]
    fn test_filter_frequency_bounds() {
        for i in 0..=100 {
            let amount = i as f64 / 100.0;
            let hz = filter_frequency_hz(amount, SAMPLE_RATE);
            assert!(hz >= MIN_FILTER_FREQ, "{} Hz below floor", hz);
            assert!(hz <= SAMPLE_RATE / 2.0, "{} Hz above Nyquist", hz);
        }
    }

    #[test]
    fn test_filter_frequency_values() {
        assert_eq!(filter_frequency_hz(0.0, SAMPLE_RATE), MIN_FILTER_FREQ);
        assert_eq!(filter_frequency_hz(0.5, SAMPLE_RATE), 11025.0);
        assert_eq!(filter_frequency_hz(1.0, SAMPLE_RATE), 22050.0);
        assert_eq!(filter_frequency_hz(3.0, SAMPLE_RATE), 22050.0);
    }

    #[test]
    fn test_linear_mappings() {
        assert_eq!(unison_width_cents(0.5), 25.0);
        assert_eq!(filter_q(0.2), 6.0);
        assert_eq!(delay_time_seconds(0.25), 0.5);
        assert_eq!(adsr_stage_seconds(0.2), 0.4);
    }

    #[test]
    fn test_feedback_is_not_clamped() {
        assert_eq!(feedback_gain(0.5), 0.5);
        assert_eq!(feedback_gain(1.2), 1.2);
    }
}
