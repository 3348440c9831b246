//! Parameter store
//!
//! Every synthesis parameter is a normalized scalar addressed by a [`ParamId`].
//! A [`ParamSet`] always holds a value for every id; defaults are merged in at
//! construction so no partial set exists at runtime.

use std::fmt;
use std::str::FromStr;

use crate::error::SynthError;

/// Detune spread in cents at `unisonWidth = 1`
pub const MAX_UNISON_WIDTH: f64 = 50.0;
/// Longest attack, decay or release stage in seconds
pub const MAX_ADSR_STAGE_DURATION: f64 = 2.0;
/// Longest echo delay in seconds
pub const MAX_ECHO_DURATION: f64 = 2.0;
/// Lowest filter cutoff in Hz
pub const MIN_FILTER_FREQ: f64 = 40.0;
/// Filter resonance at `filterQ = 1`
pub const MAX_FILTER_Q: f64 = 30.0;

/// Identifier of a synthesis parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    UnisonWidth,
    Volume,
    AdsrAttack,
    AdsrDecay,
    AdsrSustain,
    AdsrRelease,
    AdsrTarget,
    FilterFreq,
    FilterQ,
    EchoTime,
    EchoFeedback,
    Waveform,
}

impl ParamId {
    pub const COUNT: usize = 12;

    /// All parameters in declaration order
    pub const ALL: [ParamId; ParamId::COUNT] = [
        ParamId::UnisonWidth,
        ParamId::Volume,
        ParamId::AdsrAttack,
        ParamId::AdsrDecay,
        ParamId::AdsrSustain,
        ParamId::AdsrRelease,
        ParamId::AdsrTarget,
        ParamId::FilterFreq,
        ParamId::FilterQ,
        ParamId::EchoTime,
        ParamId::EchoFeedback,
        ParamId::Waveform,
    ];

    /// The external name of this parameter
    pub fn name(self) -> &'static str {
        match self {
            ParamId::UnisonWidth => "unisonWidth",
            ParamId::Volume => "volume",
            ParamId::AdsrAttack => "adsrAttack",
            ParamId::AdsrDecay => "adsrDecay",
            ParamId::AdsrSustain => "adsrSustain",
            ParamId::AdsrRelease => "adsrRelease",
            ParamId::AdsrTarget => "adsrTarget",
            ParamId::FilterFreq => "filterFreq",
            ParamId::FilterQ => "filterQ",
            ParamId::EchoTime => "echoTime",
            ParamId::EchoFeedback => "echoFeedback",
            ParamId::Waveform => "waveform",
        }
    }

    /// Default normalized value
    pub fn default_value(self) -> f64 {
        match self {
            ParamId::UnisonWidth => 0.0,
            ParamId::Volume => 0.3,
            ParamId::AdsrAttack => 0.2,
            ParamId::AdsrDecay => 0.0,
            ParamId::AdsrSustain => 1.0,
            ParamId::AdsrRelease => 0.2,
            ParamId::AdsrTarget => 0.0,
            ParamId::FilterFreq => 0.5,
            ParamId::FilterQ => 0.2,
            ParamId::EchoTime => 0.0,
            ParamId::EchoFeedback => 0.0,
            ParamId::Waveform => 3.0,
        }
    }

    /// Labels of the discrete choices, or `None` for continuous parameters
    pub fn choices(self) -> Option<&'static [&'static str]> {
        match self {
            ParamId::Waveform => Some(&Waveform::NAMES),
            ParamId::AdsrTarget => Some(&AdsrTarget::NAMES),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamId {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamId::ALL
            .iter()
            .copied()
            .find(|id| id.name() == s)
            .ok_or_else(|| SynthError::UnknownParameter(s.to_string()))
    }
}

/// Oscillator shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Sawtooth,
    ];
    pub const NAMES: [&'static str; 4] = ["sine", "square", "triangle", "sawtooth"];
    pub const ABBREVIATIONS: [&'static str; 4] = ["sin", "squ", "tri", "saw"];

    /// Shape for a parameter index; unknown indices fall back to sine
    pub fn from_index(value: f64) -> Self {
        let idx = value.round();
        if idx >= 0.0 && (idx as usize) < Self::ALL.len() {
            Self::ALL[idx as usize]
        } else {
            Waveform::Sine
        }
    }

    pub fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    pub fn abbreviation(self) -> &'static str {
        Self::ABBREVIATIONS[self as usize]
    }
}

/// Which engine quantity the envelope automates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdsrTarget {
    Amplitude,
    Filter,
}

impl AdsrTarget {
    pub const NAMES: [&'static str; 2] = ["amplitude", "filter"];

    /// Target for a parameter index; anything but 1 selects amplitude
    pub fn from_index(value: f64) -> Self {
        if value.round() == 1.0 {
            AdsrTarget::Filter
        } else {
            AdsrTarget::Amplitude
        }
    }
}

/// A complete set of normalized parameter values
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSet {
    values: [f64; ParamId::COUNT],
}

impl ParamSet {
    /// Parameter set holding every default
    pub fn new() -> Self {
        let mut values = [0.0; ParamId::COUNT];
        for id in ParamId::ALL {
            values[id.index()] = id.default_value();
        }
        Self { values }
    }

    /// Defaults merged with the given overrides (later overrides win)
    pub fn with_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (ParamId, f64)>,
    {
        let mut set = Self::new();
        for (id, value) in overrides {
            set.set(id, value);
        }
        set
    }

    pub fn get(&self, id: ParamId) -> f64 {
        self.values[id.index()]
    }

    /// Store a value; range is not checked
    pub fn set(&mut self, id: ParamId, value: f64) {
        self.values[id.index()] = value;
    }

    pub fn waveform(&self) -> Waveform {
        Waveform::from_index(self.get(ParamId::Waveform))
    }

    pub fn adsr_target(&self) -> AdsrTarget {
        AdsrTarget::from_index(self.get(ParamId::AdsrTarget))
    }

    /// Iterate over `(id, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (ParamId, f64)> + '_ {
        ParamId::ALL.iter().map(move |&id| (id, self.get(id)))
    }
}

impl Default for ParamSet {
    fn default() -> Self {
        Self::new()
    }
}
