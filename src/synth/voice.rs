//! Unison voice and monophonic voice slot
//!
//! A voice is three oscillators sharing one pitch: a center oscillator and two
//! side oscillators detuned down and up by the unison spread. The manager holds
//! at most one active voice; replaced voices keep rendering until their stop
//! time and are then dropped.

use super::envelope::{Envelope, EnvelopeStage};
use super::oscillator::Oscillator;
use crate::params::Waveform;

/// Oscillators per voice
pub const VOICE_OSCILLATORS: usize = 3;

/// A sounding note
#[derive(Debug, Clone)]
pub struct Voice {
    oscillators: [Oscillator; VOICE_OSCILLATORS],
    envelope: Envelope,
}

impl Voice {
    /// Build the unison triad and start it when the envelope starts
    pub fn new(
        frequency: f64,
        waveform: Waveform,
        spread_cents: f64,
        sample_rate: f64,
        envelope: Envelope,
    ) -> Self {
        let mut oscillators = [
            Oscillator::new(waveform, frequency, 0.0, sample_rate),
            Oscillator::new(waveform, frequency, -spread_cents, sample_rate),
            Oscillator::new(waveform, frequency, spread_cents, sample_rate),
        ];
        for osc in &mut oscillators {
            osc.start(envelope.start());
        }

        Self {
            oscillators,
            envelope,
        }
    }

    /// Center, lower and upper oscillator, in that order
    pub fn oscillators(&self) -> &[Oscillator] {
        &self.oscillators
    }

    /// Re-detune the side oscillators without restarting the note
    pub fn set_spread(&mut self, cents: f64) {
        self.oscillators[1].set_detune(-cents);
        self.oscillators[2].set_detune(cents);
    }

    /// Schedule every oscillator to stop at `time`
    pub fn stop(&mut self, time: f64) {
        for osc in &mut self.oscillators {
            osc.stop(time);
        }
    }

    /// Time at which every oscillator has stopped, if scheduled
    pub fn stop_time(&self) -> Option<f64> {
        self.oscillators
            .iter()
            .map(Oscillator::stop_time)
            .try_fold(f64::NEG_INFINITY, |latest, stop| stop.map(|s| latest.max(s)))
    }

    /// Envelope captured when the note started
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }

    /// Whether every oscillator has reached its stop time
    pub fn is_finished_at(&self, t: f64) -> bool {
        self.oscillators.iter().all(|osc| osc.is_finished_at(t))
    }

    pub fn is_sounding_at(&self, t: f64) -> bool {
        self.oscillators.iter().any(|osc| osc.is_sounding_at(t))
    }

    /// Oscillators started and not yet stopped at `t`
    pub fn sounding_oscillators(&self, t: f64) -> usize {
        self.oscillators
            .iter()
            .filter(|osc| osc.is_sounding_at(t))
            .count()
    }

    /// Sum of the oscillators at time `t`
    pub fn process(&mut self, t: f64) -> f64 {
        self.oscillators.iter_mut().map(|osc| osc.process(t)).sum()
    }
}

/// Monophonic voice slot
#[derive(Debug, Default)]
pub struct VoiceManager {
    active: Option<Voice>,
    /// Voices replaced before their stop time was reached
    retiring: Vec<Voice>,
}

impl VoiceManager {
    /// Empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the active voice at `time` and vacate the slot
    pub fn kill(&mut self, time: f64) {
        if let Some(mut voice) = self.active.take() {
            voice.stop(time);
            self.retiring.push(voice);
        }
    }

    /// Place a voice in the slot, killing the previous one at the new start time
    pub fn start(&mut self, voice: Voice) {
        self.kill(voice.envelope().start());
        self.active = Some(voice);
    }

    /// Voice in the slot; it may be scheduled to start later
    pub fn active(&self) -> Option<&Voice> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut Voice> {
        self.active.as_mut()
    }

    /// The voice heard at `t`, newest first
    pub fn sounding_at(&self, t: f64) -> Option<&Voice> {
        self.active
            .iter()
            .chain(self.retiring.iter().rev())
            .find(|voice| voice.is_sounding_at(t))
    }

    /// Envelope stage of the voice heard at `t`
    pub fn stage_at(&self, t: f64) -> EnvelopeStage {
        self.sounding_at(t)
            .map_or(EnvelopeStage::Idle, |voice| voice.envelope().stage_at(t))
    }

    /// Re-detune every held voice, pending or sounding
    pub fn set_spread(&mut self, cents: f64) {
        for voice in self.active.iter_mut().chain(self.retiring.iter_mut()) {
            voice.set_spread(cents);
        }
    }

    /// Oscillators of every held voice sounding at `t`
    pub fn sounding_oscillators(&self, t: f64) -> usize {
        self.active
            .iter()
            .chain(self.retiring.iter())
            .map(|voice| voice.sounding_oscillators(t))
            .sum()
    }

    /// Mix every held voice at time `t`
    pub fn process(&mut self, t: f64) -> f64 {
        self.active
            .iter_mut()
            .chain(self.retiring.iter_mut())
            .map(|voice| voice.process(t))
            .sum()
    }

    /// Drop voices whose oscillators have all stopped
    pub fn collect_finished(&mut self, t: f64) {
        self.retiring.retain(|voice| !voice.is_finished_at(t));
        if self.active.as_ref().is_some_and(|voice| voice.is_finished_at(t)) {
            self.active = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::AdsrTarget;
    use crate::synth::automation::Automation;
    use crate::synth::envelope::{EnvelopeLevels, EnvelopeShape};

    const SAMPLE_RATE: f64 = 44100.0;

    fn envelope_at(start: f64) -> Envelope {
        let shape = EnvelopeShape {
            target: AdsrTarget::Amplitude,
            levels: EnvelopeLevels {
                off: 0.0,
                on: 1.0,
                sustain: 1.0,
            },
            attack: 0.0,
            decay: 0.0,
            release: 0.1,
        };
        Envelope::trigger(shape, &mut Automation::new(0.0), start)
    }

    #[test]
    fn test_voice_detune_spread() {
        let voice = Voice::new(220.0, Waveform::Square, 25.0, SAMPLE_RATE, envelope_at(0.0));
        let detunes: Vec<f64> = voice.oscillators().iter().map(|o| o.detune()).collect();

        assert_eq!(detunes, vec![0.0, -25.0, 25.0]);
        assert!(voice.oscillators().iter().all(|o| o.frequency() == 220.0));
        assert!(voice.oscillators().iter().all(|o| o.waveform() == Waveform::Square));
        assert!(voice.oscillators().iter().all(|o| o.start_time() == Some(0.0)));
    }

    #[test]
    fn test_set_spread_keeps_center() {
        let mut voice = Voice::new(220.0, Waveform::Sine, 0.0, SAMPLE_RATE, envelope_at(0.0));
        voice.set_spread(40.0);

        let detunes: Vec<f64> = voice.oscillators().iter().map(|o| o.detune()).collect();
        assert_eq!(detunes, vec![0.0, -40.0, 40.0]);
    }

    #[test]
    fn test_stop_time() {
        let mut voice = Voice::new(220.0, Waveform::Sine, 0.0, SAMPLE_RATE, envelope_at(0.0));
        assert_eq!(voice.stop_time(), None);

        voice.stop(0.4);
        assert_eq!(voice.stop_time(), Some(0.4));
        assert!(!voice.is_finished_at(0.3));
        assert!(voice.is_finished_at(0.4));
    }

    #[test]
    fn test_monophonic_slot() {
        let mut voices = VoiceManager::new();
        voices.start(Voice::new(220.0, Waveform::Sine, 0.0, SAMPLE_RATE, envelope_at(0.0)));
        voices.start(Voice::new(330.0, Waveform::Sine, 0.0, SAMPLE_RATE, envelope_at(0.0)));

        assert_eq!(voices.sounding_oscillators(0.0), VOICE_OSCILLATORS);
        assert_eq!(voices.active().map(|v| v.oscillators()[0].frequency()), Some(330.0));

        voices.collect_finished(0.0);
        assert!(voices.retiring.is_empty());
    }

    #[test]
    fn test_future_retrigger_keeps_old_voice_until_start() {
        let mut voices = VoiceManager::new();
        voices.start(Voice::new(220.0, Waveform::Sine, 0.0, SAMPLE_RATE, envelope_at(0.0)));
        voices.start(Voice::new(330.0, Waveform::Sine, 0.0, SAMPLE_RATE, envelope_at(0.5)));

        assert_eq!(voices.sounding_oscillators(0.25), VOICE_OSCILLATORS);
        assert_eq!(voices.sounding_oscillators(0.5), VOICE_OSCILLATORS);

        let heard = |t| voices.sounding_at(t).map(|v| v.oscillators()[0].frequency());
        assert_eq!(heard(0.25), Some(220.0));
        assert_eq!(heard(0.5), Some(330.0));
        assert_eq!(voices.stage_at(0.25), EnvelopeStage::Sustain);
    }

    #[test]
    fn test_spread_reaches_pending_and_sounding_voices() {
        let mut voices = VoiceManager::new();
        voices.start(Voice::new(220.0, Waveform::Sine, 0.0, SAMPLE_RATE, envelope_at(0.0)));
        voices.start(Voice::new(330.0, Waveform::Sine, 0.0, SAMPLE_RATE, envelope_at(0.5)));
        voices.set_spread(30.0);

        for t in [0.25, 0.5] {
            let detunes: Vec<f64> = voices
                .sounding_at(t)
                .unwrap()
                .oscillators()
                .iter()
                .map(|o| o.detune())
                .collect();
            assert_eq!(detunes, vec![0.0, -30.0, 30.0]);
        }
    }

    #[test]
    fn test_finished_voice_leaves_slot() {
        let mut voices = VoiceManager::new();
        voices.start(Voice::new(220.0, Waveform::Sine, 0.0, SAMPLE_RATE, envelope_at(0.0)));
        if let Some(voice) = voices.active_mut() {
            voice.stop(0.2);
        }

        voices.collect_finished(0.1);
        assert!(voices.active().is_some());

        voices.collect_finished(0.2);
        assert!(voices.active().is_none());
        assert_eq!(voices.stage_at(0.2), EnvelopeStage::Idle);
        assert_eq!(voices.process(0.3), 0.0);
    }
}
