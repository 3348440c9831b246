//! Periodic oscillator with detune and scheduled start/stop

use std::f64::consts::PI;

use crate::params::Waveform;

/// A single oscillator of a voice
#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    phase: f64,
    frequency: f64,
    /// Pitch offset in cents
    detune: f64,
    /// Frequency after detune, cached
    effective_frequency: f64,
    sample_rate: f64,
    start_time: Option<f64>,
    stop_time: Option<f64>,
}

impl Oscillator {
    /// Create an oscillator; it stays silent until [`Oscillator::start`]
    pub fn new(waveform: Waveform, frequency: f64, detune: f64, sample_rate: f64) -> Self {
        let mut osc = Self {
            waveform,
            phase: 0.0,
            frequency,
            detune,
            effective_frequency: frequency,
            sample_rate,
            start_time: None,
            stop_time: None,
        };
        osc.update_effective_frequency();
        osc
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Nominal frequency in Hz
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn detune(&self) -> f64 {
        self.detune
    }

    /// Set the pitch offset in cents
    pub fn set_detune(&mut self, cents: f64) {
        self.detune = cents;
        self.update_effective_frequency();
    }

    /// Frequency actually rendered: `frequency * 2^(detune / 1200)`
    pub fn effective_frequency(&self) -> f64 {
        self.effective_frequency
    }

    pub fn start(&mut self, time: f64) {
        self.start_time = Some(time);
    }

    /// Schedule the end of the oscillator. The earliest requested stop wins.
    pub fn stop(&mut self, time: f64) {
        self.stop_time = Some(self.stop_time.map_or(time, |t| t.min(time)));
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    pub fn stop_time(&self) -> Option<f64> {
        self.stop_time
    }

    /// Whether the oscillator produces output at time `t`
    pub fn is_sounding_at(&self, t: f64) -> bool {
        match self.start_time {
            Some(start) => t >= start && !self.is_finished_at(t),
            None => false,
        }
    }

    /// Whether the stop time has been reached
    pub fn is_finished_at(&self, t: f64) -> bool {
        self.stop_time.is_some_and(|stop| t >= stop)
    }

    /// Render the sample at time `t`
    pub fn process(&mut self, t: f64) -> f64 {
        if !self.is_sounding_at(t) {
            return 0.0;
        }

        let sample = match self.waveform {
            Waveform::Sine => self.sine(),
            Waveform::Square => self.square(),
            Waveform::Triangle => self.triangle(),
            Waveform::Sawtooth => self.saw(),
        };

        self.phase += self.effective_frequency / self.sample_rate;
        self.phase -= self.phase.floor();

        sample
    }

    fn update_effective_frequency(&mut self) {
        self.effective_frequency = self.frequency * 2.0_f64.powf(self.detune / 1200.0);
    }

    fn sine(&self) -> f64 {
        (self.phase * 2.0 * PI).sin()
    }

    fn triangle(&self) -> f64 {
        let p = self.phase;
        if p < 0.25 {
            4.0 * p
        } else if p < 0.75 {
            2.0 - 4.0 * p
        } else {
            4.0 * p - 4.0
        }
    }

    fn saw(&self) -> f64 {
        2.0 * self.phase - 1.0
    }

    fn square(&self) -> f64 {
        if self.phase < 0.5 { 1.0 } else { -1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(waveform: Waveform, frequency: f64, sample_rate: f64) -> Oscillator {
        let mut osc = Oscillator::new(waveform, frequency, 0.0, sample_rate);
        osc.start(0.0);
        osc
    }

    #[test]
    fn test_sine_oscillator() {
        let mut osc = started(Waveform::Sine, 440.0, 44100.0);

        // First sample should be 0 (sin(0))
        assert!(osc.process(0.0).abs() < 0.001);
    }

    #[test]
    fn test_square_oscillator() {
        let mut osc = started(Waveform::Square, 1.0, 4.0);

        assert_eq!(osc.process(0.0), 1.0);
        assert_eq!(osc.process(0.25), 1.0);
        assert_eq!(osc.process(0.5), -1.0);
        assert_eq!(osc.process(0.75), -1.0);
    }

    #[test]
    fn test_saw_oscillator() {
        let mut osc = started(Waveform::Sawtooth, 1.0, 4.0);

        assert_eq!(osc.process(0.0), -1.0);
        assert_eq!(osc.process(0.25), -0.5);
        assert_eq!(osc.process(0.5), 0.0);
        assert_eq!(osc.process(0.75), 0.5);
    }

    #[test]
    fn test_triangle_oscillator() {
        let mut osc = started(Waveform::Triangle, 1.0, 4.0);

        assert_eq!(osc.process(0.0), 0.0);
        assert_eq!(osc.process(0.25), 1.0);
        assert_eq!(osc.process(0.5), 0.0);
        assert_eq!(osc.process(0.75), -1.0);
    }

    #[test]
    fn test_detune_shifts_frequency() {
        let mut osc = Oscillator::new(Waveform::Sine, 220.0, 1200.0, 44100.0);
        assert!((osc.effective_frequency() - 440.0).abs() < 1e-9);

        osc.set_detune(-1200.0);
        assert!((osc.effective_frequency() - 110.0).abs() < 1e-9);
        assert_eq!(osc.frequency(), 220.0);
    }

    #[test]
    fn test_silent_until_started() {
        let mut osc = Oscillator::new(Waveform::Square, 1.0, 0.0, 4.0);
        assert_eq!(osc.process(0.0), 0.0);
        assert!(!osc.is_sounding_at(0.0));

        osc.start(0.5);
        assert_eq!(osc.process(0.25), 0.0);
        assert_eq!(osc.process(0.5), 1.0);
    }

    #[test]
    fn test_stop_time() {
        let mut osc = started(Waveform::Square, 1.0, 4.0);
        osc.stop(0.5);

        assert_eq!(osc.process(0.25), 1.0);
        assert!(osc.is_finished_at(0.5));
        assert_eq!(osc.process(0.5), 0.0);
    }

    #[test]
    fn test_earliest_stop_wins() {
        let mut osc = started(Waveform::Sine, 440.0, 44100.0);
        osc.stop(0.8);
        osc.stop(0.2);
        osc.stop(0.5);

        assert_eq!(osc.stop_time(), Some(0.2));
    }
}
