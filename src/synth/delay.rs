//! Circular delay line for the echo loop

/// Fixed-capacity delay line
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f64>,
    write_pos: usize,
}

impl DelayLine {
    /// Delay line able to hold `max_seconds` of audio
    pub fn new(max_seconds: f64, sample_rate: f64) -> Self {
        let capacity = (max_seconds * sample_rate).ceil().max(0.0) as usize + 2;
        Self {
            buffer: vec![0.0; capacity],
            write_pos: 0,
        }
    }

    /// Longest usable delay in samples
    pub fn max_delay(&self) -> usize {
        self.buffer.len() - 1
    }

    /// Sample written `delay` samples ago, clamped to `1..=max_delay()`
    pub fn read(&self, delay: usize) -> f64 {
        let len = self.buffer.len();
        let delay = delay.clamp(1, len - 1);
        self.buffer[(self.write_pos + len - delay) % len]
    }

    /// Append the newest sample
    pub fn write(&mut self, sample: f64) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }
}
