//! Note names of the playable octave

use crate::error::{Result, SynthError};

/// Notes from C-3 to C-4 with their frequencies in Hz
pub const KEYBOARD: [(&str, f64); 13] = [
    ("C-3", 130.813),
    ("C#3", 138.591),
    ("D-3", 146.832),
    ("D#3", 155.563),
    ("E-3", 164.814),
    ("F-3", 174.614),
    ("F#3", 184.997),
    ("G-3", 195.998),
    ("G#3", 207.652),
    ("A-3", 220.0),
    ("A#3", 233.082),
    ("B-3", 246.942),
    ("C-4", 261.626),
];

/// Computer keys bound to [`KEYBOARD`], in the same order
pub const KEY_BINDINGS: [char; 13] = [
    'a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k',
];

pub fn frequency(name: &str) -> Option<f64> {
    KEYBOARD
        .iter()
        .find(|(note, _)| note.eq_ignore_ascii_case(name))
        .map(|&(_, freq)| freq)
}

/// Resolve a note name or a plain frequency in Hz
pub fn parse(input: &str) -> Result<f64> {
    let input = input.trim();
    if let Some(freq) = frequency(input) {
        return Ok(freq);
    }
    match input.parse::<f64>() {
        Ok(freq) if freq.is_finite() && freq > 0.0 => Ok(freq),
        _ => Err(SynthError::UnknownNote(input.to_string())),
    }
}

/// Note bound to a computer key
pub fn for_key(key: char) -> Option<(&'static str, f64)> {
    KEY_BINDINGS
        .iter()
        .position(|&k| k == key.to_ascii_lowercase())
        .map(|i| KEYBOARD[i])
}
