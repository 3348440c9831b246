//! Monophonic synth engine
//!
//! [`Synth`] owns the render clock, the parameter store, the signal graph and
//! the voice slot. Parameter edits and note events only schedule changes
//! against the clock; samples come out of [`Synth::process`], which a player
//! or an offline render calls once per frame.

mod context;
mod graph;
pub mod player;
pub mod recorder;
mod sequence;

pub use context::AudioContext;
pub use graph::{GraphOutput, SignalGraph};
pub use sequence::{NoteEvent, NoteEventKind, Sequence};

use tracing::{debug, info};

use crate::mapping::{
    delay_time_seconds, feedback_gain, filter_frequency_hz, filter_q, unison_width_cents,
};
use crate::params::{AdsrTarget, ParamId, ParamSet};
use crate::synth::{Envelope, EnvelopeShape, EnvelopeStage, Voice, VoiceManager};
use crate::viz::OutputTap;

/// The synth engine
pub struct Synth {
    context: AudioContext,
    params: ParamSet,
    graph: SignalGraph,
    voices: VoiceManager,
    tap: OutputTap,
}

impl Synth {
    /// Engine with default parameters
    pub fn new(context: AudioContext) -> Self {
        Self::with_params(context, ParamSet::new())
    }

    /// Engine starting from `params`
    pub fn with_params(context: AudioContext, params: ParamSet) -> Self {
        let sample_rate = context.sample_rate();
        let graph = SignalGraph::new(
            sample_rate,
            filter_frequency_hz(params.get(ParamId::FilterFreq), sample_rate),
            filter_q(params.get(ParamId::FilterQ)),
        );

        let mut synth = Self {
            context,
            params,
            graph,
            voices: VoiceManager::new(),
            tap: OutputTap::default(),
        };
        for id in ParamId::ALL {
            synth.apply(id);
        }
        synth
    }

    /// Replace the output tap, e.g. with one sized from configuration
    pub fn with_tap(mut self, tap: OutputTap) -> Self {
        self.tap = tap;
        self
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> f64 {
        self.context.sample_rate()
    }

    /// Render time of the next frame
    pub fn current_time(&self) -> f64 {
        self.context.current_time()
    }

    /// Current value of every parameter
    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    /// Get one stored parameter value
    pub fn parameter(&self, id: ParamId) -> f64 {
        self.params.get(id)
    }

    /// Store `value` and update the live stage it drives
    pub fn set_parameter(&mut self, id: ParamId, value: f64) {
        debug!(param = %id, value, "set parameter");
        self.params.set(id, value);
        self.apply(id);
    }

    /// Set a parameter by its external name; unknown names are ignored
    pub fn set_parameter_by_name(&mut self, name: &str, value: f64) {
        match name.parse::<ParamId>() {
            Ok(id) => self.set_parameter(id, value),
            Err(err) => debug!(%err, "ignoring parameter"),
        }
    }

    fn apply(&mut self, id: ParamId) {
        let value = self.params.get(id);
        let now = self.current_time();

        match id {
            ParamId::UnisonWidth => self.voices.set_spread(unison_width_cents(value)),
            ParamId::Volume => self.graph.set_output_gain(value),
            ParamId::FilterFreq => {
                let cutoff = filter_frequency_hz(value, self.sample_rate());
                self.graph.filter_frequency_mut().set_value(cutoff, now);
            }
            ParamId::FilterQ => self.graph.set_filter_q(filter_q(value)),
            ParamId::EchoTime => self.graph.set_delay_time(delay_time_seconds(value)),
            ParamId::EchoFeedback => self.graph.set_feedback_gain(feedback_gain(value)),
            // Read at the next note-on
            ParamId::AdsrAttack
            | ParamId::AdsrDecay
            | ParamId::AdsrSustain
            | ParamId::AdsrRelease
            | ParamId::AdsrTarget
            | ParamId::Waveform => {}
        }
    }

    /// Clamp a requested event time to the render clock
    fn resolve_time(&self, at: Option<f64>) -> f64 {
        let now = self.current_time();
        at.map_or(now, |t| t.max(now))
    }

    /// Start a note at `at` (now if `None`), replacing any sounding voice
    pub fn note_on(&mut self, frequency: f64, at: Option<f64>) {
        let start = self.resolve_time(at);
        let sample_rate = self.sample_rate();

        self.voices.kill(start);

        let shape = EnvelopeShape::from_params(&self.params, sample_rate);
        self.graph.adsr_gain_mut().cancel_scheduled_values(start);
        self.graph.filter_frequency_mut().cancel_scheduled_values(start);

        // Hold the quantity the envelope does not drive
        match shape.target {
            AdsrTarget::Amplitude => {
                let cutoff = filter_frequency_hz(self.params.get(ParamId::FilterFreq), sample_rate);
                self.graph.filter_frequency_mut().set_value_at(cutoff, start);
            }
            AdsrTarget::Filter => self.graph.adsr_gain_mut().set_value_at(1.0, start),
        }

        let envelope = Envelope::trigger(shape, self.graph.envelope_target_mut(shape.target), start);
        let voice = Voice::new(
            frequency,
            self.params.waveform(),
            unison_width_cents(self.params.get(ParamId::UnisonWidth)),
            sample_rate,
            envelope,
        );
        self.voices.start(voice);

        info!(frequency, start, envelope = ?shape.target, "note on");
    }

    /// Release the sounding voice at `at` (now if `None`)
    pub fn note_off(&mut self, at: Option<f64>) {
        let at = self.resolve_time(at);

        let Some(voice) = self.voices.active_mut() else {
            debug!("note off without a voice");
            return;
        };
        if voice.envelope().is_released() {
            debug!("note off on a releasing voice");
            return;
        }

        let at = at.max(voice.envelope().start());
        let target = voice.envelope().target();
        let end = voice
            .envelope_mut()
            .release(self.graph.envelope_target_mut(target), at);
        voice.stop(end);

        info!(at, end, "note off");
    }

    /// Render one frame
    pub fn process(&mut self) -> f64 {
        let t = self.current_time();

        self.graph.advance(t);
        let source = self.voices.process(t);
        let output = self.graph.process(source, t).output;
        self.voices.collect_finished(t);

        self.tap.push(output as f32);
        self.context.tick();
        output
    }

    /// Fill a buffer with consecutive frames
    pub fn fill_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process() as f32;
        }
    }

    /// Render `frames` frames into a new buffer
    pub fn render(&mut self, frames: usize) -> Vec<f32> {
        let mut buffer = vec![0.0; frames];
        self.fill_buffer(&mut buffer);
        buffer
    }

    /// Get the signal graph
    pub fn graph(&self) -> &SignalGraph {
        &self.graph
    }

    /// Get the voice slot
    pub fn voices(&self) -> &VoiceManager {
        &self.voices
    }

    /// Oscillators sounding at the current render time
    pub fn active_oscillators(&self) -> usize {
        self.voices.sounding_oscillators(self.current_time())
    }

    /// Envelope stage of the voice being heard
    pub fn envelope_stage(&self) -> EnvelopeStage {
        self.voices.stage_at(self.current_time())
    }

    /// Get the output tap
    pub fn tap(&self) -> &OutputTap {
        &self.tap
    }

    /// Latest output snapshot as analyser bytes
    pub fn visualization_frame(&self) -> Option<Vec<u8>> {
        self.tap.byte_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Waveform;

    const SAMPLE_RATE: f64 = 44100.0;

    fn synth() -> Synth {
        Synth::new(AudioContext::new(SAMPLE_RATE).unwrap())
    }

    #[test]
    fn test_default_graph_state() {
        let synth = synth();

        assert_eq!(synth.graph().output_gain(), 0.3);
        assert_eq!(synth.graph().delay_time(), 0.0);
        assert_eq!(synth.graph().feedback_gain(), 0.0);
        assert!((synth.graph().filter_q() - 6.0).abs() < 1e-12);
        assert_eq!(
            synth.graph().filter_frequency().value_at(0.0),
            filter_frequency_hz(0.5, SAMPLE_RATE)
        );
    }

    #[test]
    fn test_silent_without_notes() {
        let mut synth = synth();
        let buffer = synth.render(512);

        assert!(buffer.iter().all(|&s| s == 0.0));
        assert_eq!(synth.active_oscillators(), 0);
        assert_eq!(synth.envelope_stage(), EnvelopeStage::Idle);
    }

    #[test]
    fn test_note_produces_audio() {
        let mut synth = synth();
        synth.note_on(220.0, None);

        let buffer = synth.render(4410);
        assert!(buffer.iter().any(|&s| s.abs() > 0.01));
        assert_eq!(synth.envelope_stage(), EnvelopeStage::Attack);
    }

    #[test]
    fn test_parameter_updates_graph() {
        let mut synth = synth();
        synth.set_parameter(ParamId::EchoTime, 0.25);
        synth.set_parameter(ParamId::EchoFeedback, 0.5);
        synth.set_parameter(ParamId::FilterQ, 0.5);

        assert_eq!(synth.graph().delay_time(), 0.5);
        assert_eq!(synth.graph().feedback_gain(), 0.5);
        assert_eq!(synth.graph().filter_q(), 15.0);
        assert_eq!(synth.parameter(ParamId::EchoTime), 0.25);
    }

    #[test]
    fn test_deferred_parameters_leave_voice_alone() {
        let mut synth = synth();
        synth.note_on(220.0, None);
        synth.set_parameter(ParamId::Waveform, 1.0);

        let voice = synth.voices().active().unwrap();
        assert!(voice
            .oscillators()
            .iter()
            .all(|o| o.waveform() == Waveform::Sawtooth));
    }

    #[test]
    fn test_unknown_parameter_name_is_ignored() {
        let mut synth = synth();
        let before = synth.params().clone();
        synth.set_parameter_by_name("resonance", 0.9);

        assert_eq!(synth.params(), &before);
    }

    #[test]
    fn test_parameter_by_name() {
        let mut synth = synth();
        synth.set_parameter_by_name("volume", 0.8);
        assert_eq!(synth.graph().output_gain(), 0.8);
    }

    #[test]
    fn test_past_times_are_clamped() {
        let mut synth = synth();
        synth.render(441);
        synth.note_on(220.0, Some(0.0));

        let start = synth.voices().active().unwrap().envelope().start();
        assert_eq!(start, synth.current_time());
    }

    #[test]
    fn test_note_off_without_voice() {
        let mut synth = synth();
        synth.note_off(None);
        assert!(synth.voices().active().is_none());
    }

    #[test]
    fn test_second_note_off_is_ignored() {
        let mut synth = synth();
        synth.note_on(220.0, Some(0.0));
        synth.note_off(Some(0.0));
        synth.note_off(Some(0.1));

        let voice = synth.voices().active().unwrap();
        assert!((voice.stop_time().unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_filter_target_holds_gain() {
        let mut synth = synth();
        synth.set_parameter(ParamId::AdsrTarget, 1.0);
        synth.note_on(220.0, Some(0.0));

        assert_eq!(synth.graph().adsr_gain().value_at(0.1), 1.0);
        assert_eq!(synth.graph().filter_frequency().value_at(0.0), 40.0);
    }

    #[test]
    fn test_voice_finishes_after_release() {
        let mut synth = synth();
        synth.set_parameter(ParamId::AdsrRelease, 0.05);
        synth.note_on(220.0, Some(0.0));
        synth.note_off(Some(0.0));

        synth.render(4410 + 1);
        assert!(synth.voices().active().is_none());
        assert_eq!(synth.envelope_stage(), EnvelopeStage::Idle);
    }
}
