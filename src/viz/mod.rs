//! Output tap and terminal view
//!
//! The [`OutputTap`] keeps the most recent analyser window of engine output.
//! The terminal view polls it for frames while turning key presses into note
//! events. A tap whose consumer went away is closed and stops producing
//! frames; the engine keeps running either way.

mod waveform;

pub use waveform::Scope;

use std::sync::{Arc, Mutex, TryLockError};
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tracing::warn;

use crate::engine::Synth;
use crate::notes;
use crate::params::{ParamId, Waveform};
use crate::synth::EnvelopeStage;

/// Analyser window used when none is configured
pub const DEFAULT_FFT_SIZE: usize = 256;

/// Ring buffer of recent output samples
pub struct SampleBuffer {
    samples: Vec<f32>,
    write_pos: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity.max(1)],
            write_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn push(&mut self, sample: f32) {
        self.samples[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.samples.len();
    }

    /// Contents from oldest to newest
    pub fn ordered(&self) -> Vec<f32> {
        let (newer, older) = self.samples.split_at(self.write_pos);
        older.iter().chain(newer).copied().collect()
    }
}

struct Analyser {
    window: SampleBuffer,
    open: bool,
}

/// Read-only snapshot point after the output gain
#[derive(Clone)]
pub struct OutputTap {
    analyser: Arc<Mutex<Analyser>>,
    fft_size: usize,
}

impl OutputTap {
    /// Tap holding an `fft_size` window; frames are half that long
    pub fn new(fft_size: usize) -> Self {
        let fft_size = fft_size.max(2);
        Self {
            analyser: Arc::new(Mutex::new(Analyser {
                window: SampleBuffer::new(fft_size),
                open: true,
            })),
            fft_size,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Length of every frame
    pub fn frame_len(&self) -> usize {
        self.fft_size / 2
    }

    /// Record one output sample; skipped if a reader holds the lock
    pub fn push(&self, sample: f32) {
        match self.analyser.try_lock() {
            Ok(mut analyser) if analyser.open => analyser.window.push(sample),
            Ok(_) | Err(TryLockError::WouldBlock) | Err(TryLockError::Poisoned(_)) => {}
        }
    }

    /// Stop producing frames
    pub fn close(&self) {
        if let Ok(mut analyser) = self.analyser.lock() {
            analyser.open = false;
        }
    }

    pub fn is_open(&self) -> bool {
        self.analyser.lock().map(|a| a.open).unwrap_or(false)
    }

    /// Start of the latest window as raw samples
    pub fn float_frame(&self) -> Option<Vec<f32>> {
        let analyser = self.analyser.lock().ok()?;
        if !analyser.open {
            return None;
        }
        let mut frame = analyser.window.ordered();
        frame.truncate(self.frame_len());
        Some(frame)
    }

    /// Start of the latest window as unsigned bytes centred on 128
    pub fn byte_frame(&self) -> Option<Vec<u8>> {
        self.float_frame()
            .map(|frame| frame.into_iter().map(sample_to_byte).collect())
    }
}

impl Default for OutputTap {
    fn default() -> Self {
        Self::new(DEFAULT_FFT_SIZE)
    }
}

/// Map [-1, 1] onto 0..=255 with silence at 128
pub fn sample_to_byte(sample: f32) -> u8 {
    (128.0 * (1.0 + f64::from(sample))).floor().clamp(0.0, 255.0) as u8
}

/// State of the interactive view
pub struct PlayState {
    running: bool,
    /// Name of the last note played, cleared on release
    pub note: Option<&'static str>,
}

impl PlayState {
    pub fn new() -> Self {
        Self {
            running: true,
            note: None,
        }
    }

    /// Check if the view should keep running
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }
}

impl Default for PlayState {
    fn default() -> Self {
        Self::new()
    }
}

/// What a key press asks the engine to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    NoteOn(&'static str, f64),
    NoteOff,
    Waveform(Waveform),
    /// Move a live parameter by a step
    Adjust(ParamId, f64),
    Quit,
}

/// Step applied by the parameter keys
pub const ADJUST_STEP: f64 = 0.05;

pub fn key_action(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyAction> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => Some(KeyAction::Quit),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(KeyAction::Quit),
        KeyCode::Char(' ') => Some(KeyAction::NoteOff),
        KeyCode::Up => Some(KeyAction::Adjust(ParamId::Volume, ADJUST_STEP)),
        KeyCode::Down => Some(KeyAction::Adjust(ParamId::Volume, -ADJUST_STEP)),
        KeyCode::Right => Some(KeyAction::Adjust(ParamId::FilterFreq, ADJUST_STEP)),
        KeyCode::Left => Some(KeyAction::Adjust(ParamId::FilterFreq, -ADJUST_STEP)),
        KeyCode::Char(']') => Some(KeyAction::Adjust(ParamId::EchoFeedback, ADJUST_STEP)),
        KeyCode::Char('[') => Some(KeyAction::Adjust(ParamId::EchoFeedback, -ADJUST_STEP)),
        KeyCode::Char('=') => Some(KeyAction::Adjust(ParamId::EchoTime, ADJUST_STEP)),
        KeyCode::Char('-') => Some(KeyAction::Adjust(ParamId::EchoTime, -ADJUST_STEP)),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            Some(KeyAction::Waveform(Waveform::ALL[index]))
        }
        KeyCode::Char(c) => notes::for_key(c).map(|(name, freq)| KeyAction::NoteOn(name, freq)),
        _ => None,
    }
}

/// Move `id` by `step`, keeping it within 0..=1
pub fn nudge(synth: &mut Synth, id: ParamId, step: f64) {
    let value = (synth.parameter(id) + step).clamp(0.0, 1.0);
    synth.set_parameter(id, value);
}

fn lock_synth(synth: &Mutex<Synth>) -> Result<std::sync::MutexGuard<'_, Synth>> {
    synth.lock().map_err(|_| anyhow!("synth lock poisoned"))
}

/// Run the interactive keyboard and scope until quit
pub fn run_play(synth: Arc<Mutex<Synth>>, tap: OutputTap, state: &mut PlayState) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &synth, &tap, state);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    synth: &Mutex<Synth>,
    tap: &OutputTap,
    state: &mut PlayState,
) -> Result<()> {
    let mut drawing = true;

    while state.is_running() {
        if drawing {
            let status = {
                let synth = lock_synth(synth)?;
                Status {
                    waveform: synth.params().waveform(),
                    stage: synth.envelope_stage(),
                    note: state.note,
                }
            };
            let frame = tap.float_frame();

            if let Err(err) = terminal.draw(|f| draw_ui(f, frame.as_deref(), &status)) {
                warn!(%err, "scope view failed, no longer drawing frames");
                tap.close();
                drawing = false;
            }
        }

        if !event::poll(Duration::from_millis(30))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key_action(key.code, key.modifiers) {
            Some(KeyAction::Quit) => state.stop(),
            Some(KeyAction::NoteOn(name, freq)) => {
                lock_synth(synth)?.note_on(freq, None);
                state.note = Some(name);
            }
            Some(KeyAction::NoteOff) => {
                lock_synth(synth)?.note_off(None);
                state.note = None;
            }
            Some(KeyAction::Waveform(waveform)) => {
                lock_synth(synth)?.set_parameter(ParamId::Waveform, waveform as usize as f64);
            }
            Some(KeyAction::Adjust(id, step)) => nudge(&mut *lock_synth(synth)?, id, step),
            None => {}
        }
    }

    Ok(())
}

struct Status {
    waveform: Waveform,
    stage: EnvelopeStage,
    note: Option<&'static str>,
}

fn draw_ui(f: &mut Frame, frame: Option<&[f32]>, status: &Status) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(f.area());

    draw_scope(f, chunks[0], frame);
    draw_status(f, chunks[1], status);
}

fn draw_scope(f: &mut Frame, area: Rect, frame: Option<&[f32]>) {
    let samples = frame.unwrap_or(&[]);
    let scope = Scope::new(samples)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Output "));

    f.render_widget(scope, area);
}

fn draw_status(f: &mut Frame, area: Rect, status: &Status) {
    let stage_color = match status.stage {
        EnvelopeStage::Idle => Color::DarkGray,
        EnvelopeStage::Release => Color::Yellow,
        _ => Color::Green,
    };

    let text = Line::from(vec![
        Span::raw(" "),
        Span::styled(status.waveform.abbreviation(), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::raw(status.note.unwrap_or("---")),
        Span::raw("  "),
        Span::styled(format!("{:?}", status.stage), Style::default().fg(stage_color)),
        Span::raw("  |  a-k: notes  space: release  1-4: waveform  up/down: volume"),
        Span::raw("  left/right: filter  [ ]: feedback  - =: echo  q: quit"),
    ]);

    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
        area,
    );
}
