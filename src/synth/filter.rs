//! Resonant low-pass biquad
//!
//! Coefficients follow the audio EQ cookbook low-pass with the resonance given
//! in dB, so `q = 0` is a flat, non-resonant response at the cutoff.

use std::f64::consts::PI;

/// Biquad filter coefficients, normalized by a0
#[derive(Debug, Clone, Copy, PartialEq)]
struct Coefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Coefficients {
    fn passthrough() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    fn silence() -> Self {
        Self {
            b0: 0.0,
            ..Self::passthrough()
        }
    }
}

/// Low-pass filter stage
#[derive(Debug, Clone)]
pub struct Filter {
    sample_rate: f64,
    cutoff: f64,
    /// Resonance in dB
    q: f64,

    coeffs: Coefficients,

    // Filter state (Direct Form II transposed)
    z1: f64,
    z2: f64,
}

impl Filter {
    pub fn new(sample_rate: f64, cutoff: f64, q: f64) -> Self {
        let mut filter = Self {
            sample_rate,
            cutoff,
            q,
            coeffs: Coefficients::passthrough(),
            z1: 0.0,
            z2: 0.0,
        };
        filter.calculate_coefficients();
        filter
    }

    /// Set cutoff frequency in Hz. Values at or above Nyquist pass everything.
    pub fn set_cutoff(&mut self, hz: f64) {
        if hz != self.cutoff {
            self.cutoff = hz;
            self.calculate_coefficients();
        }
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Set resonance in dB
    pub fn set_q(&mut self, q: f64) {
        if q != self.q {
            self.q = q;
            self.calculate_coefficients();
        }
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    fn calculate_coefficients(&mut self) {
        let nyquist = self.sample_rate / 2.0;
        if self.cutoff >= nyquist {
            self.coeffs = Coefficients::passthrough();
            return;
        }
        if self.cutoff <= 0.0 {
            self.coeffs = Coefficients::silence();
            return;
        }

        let omega = 2.0 * PI * self.cutoff / self.sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let resonance = 10.0_f64.powf(self.q / 20.0);
        let alpha = sin_omega / (2.0 * resonance);

        let b0 = (1.0 - cos_omega) / 2.0;
        let b1 = 1.0 - cos_omega;
        let b2 = (1.0 - cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        self.coeffs = Coefficients {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        };
    }

    /// Process a single sample through the filter
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.coeffs.b0 * input + self.z1;

        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;

        output
    }
}
