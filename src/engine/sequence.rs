//! Timed note events for offline rendering

use std::convert::Infallible;

use tracing::debug;

use super::Synth;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteEventKind {
    On { frequency: f64 },
    Off,
}

/// A note event at an absolute render time in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub time: f64,
    pub kind: NoteEventKind,
}

/// Note events ordered by time
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    events: Vec<NoteEvent>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// One note after another, each `spacing` seconds apart and held for
    /// `gate * spacing` seconds before release
    pub fn from_notes(frequencies: &[f64], spacing: f64, gate: f64) -> Self {
        let mut sequence = Self::new();
        for (i, &frequency) in frequencies.iter().enumerate() {
            let start = i as f64 * spacing;
            sequence.note_on(frequency, start);
            sequence.note_off(start + spacing * gate);
        }
        sequence
    }

    pub fn note_on(&mut self, frequency: f64, time: f64) {
        self.insert(NoteEvent {
            time,
            kind: NoteEventKind::On { frequency },
        });
    }

    pub fn note_off(&mut self, time: f64) {
        self.insert(NoteEvent {
            time,
            kind: NoteEventKind::Off,
        });
    }

    fn insert(&mut self, event: NoteEvent) {
        let idx = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(idx, event);
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    /// Time of the last event
    pub fn end(&self) -> f64 {
        self.events.last().map_or(0.0, |e| e.time)
    }

    /// Render the sequence followed by `tail` seconds.
    pub fn render(&self, synth: &mut Synth, tail: f64) -> Vec<f32> {
        let mut output = Vec::new();
        let result: Result<(), Infallible> = self.render_blocks(synth, tail, 1024, |block| {
            output.extend_from_slice(block);
            Ok(())
        });
        match result {
            Ok(()) => output,
            Err(never) => match never {},
        }
    }

    /// Render the sequence plus `tail` seconds, handing `sink` one block of
    /// at most `block_size` frames at a time.
    ///
    /// Events are handed to the synth as the render clock reaches the frame
    /// they fall in, so each note-on and note-off sees the state left by the
    /// ones before it.
    pub fn render_blocks<E>(
        &self,
        synth: &mut Synth,
        tail: f64,
        block_size: usize,
        mut sink: impl FnMut(&[f32]) -> Result<(), E>,
    ) -> Result<(), E> {
        let sample_rate = synth.sample_rate();
        let origin = synth.current_time();
        let duration = self.end() + tail.max(0.0);
        let frames = (duration * sample_rate).ceil() as usize;

        let block_size = block_size.max(1);
        let mut block = Vec::with_capacity(block_size);
        let mut pending = self.events.iter().peekable();

        for _ in 0..frames {
            let frame_end = synth.current_time() + 1.0 / sample_rate;
            while let Some(event) = pending.next_if(|e| origin + e.time < frame_end) {
                let at = Some(origin + event.time);
                match event.kind {
                    NoteEventKind::On { frequency } => synth.note_on(frequency, at),
                    NoteEventKind::Off => synth.note_off(at),
                }
            }

            block.push(synth.process() as f32);
            if block.len() == block_size {
                sink(&block)?;
                block.clear();
            }
        }
        if !block.is_empty() {
            sink(&block)?;
        }

        debug!(frames, events = self.events.len(), "rendered sequence");
        Ok(())
    }
}
