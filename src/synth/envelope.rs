//! ADSR envelope scheduled as automation
//!
//! The envelope does not generate samples itself. On trigger it writes an
//! attack ramp and a decay approach onto the target's [`Automation`]; on
//! release it captures the live value and ramps it to the "off" level. The
//! current stage is derived from the render time.

use super::automation::Automation;
use crate::mapping::{adsr_stage_seconds, filter_frequency_hz};
use crate::params::{AdsrTarget, ParamId, ParamSet};

/// Envelope stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Levels an envelope moves between, in the units of its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeLevels {
    pub off: f64,
    pub on: f64,
    pub sustain: f64,
}

impl EnvelopeLevels {
    /// Map the normalized levels for `target`.
    ///
    /// Amplitude levels are gain multipliers. Filter levels are mapped to Hz
    /// and never exceed the configured static cutoff.
    pub fn for_target(target: AdsrTarget, params: &ParamSet, sample_rate: f64) -> Self {
        let sustain = params.get(ParamId::AdsrSustain);
        match target {
            AdsrTarget::Amplitude => Self {
                off: 0.0,
                on: 1.0,
                sustain,
            },
            AdsrTarget::Filter => {
                let ceiling = filter_frequency_hz(params.get(ParamId::FilterFreq), sample_rate);
                let map = |value: f64| filter_frequency_hz(value, sample_rate).min(ceiling);
                Self {
                    off: map(0.0),
                    on: map(1.0),
                    sustain: map(sustain),
                }
            }
        }
    }
}

/// Envelope settings captured when a note starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeShape {
    pub target: AdsrTarget,
    pub levels: EnvelopeLevels,
    /// Attack duration in seconds
    pub attack: f64,
    /// Decay time constant in seconds
    pub decay: f64,
    /// Release duration in seconds
    pub release: f64,
}

impl EnvelopeShape {
    pub fn from_params(params: &ParamSet, sample_rate: f64) -> Self {
        let target = params.adsr_target();
        Self {
            target,
            levels: EnvelopeLevels::for_target(target, params, sample_rate),
            attack: adsr_stage_seconds(params.get(ParamId::AdsrAttack)),
            decay: adsr_stage_seconds(params.get(ParamId::AdsrDecay)),
            release: adsr_stage_seconds(params.get(ParamId::AdsrRelease)),
        }
    }
}

/// The envelope of one note
#[derive(Debug, Clone)]
pub struct Envelope {
    shape: EnvelopeShape,
    start: f64,
    release_start: Option<f64>,
}

impl Envelope {
    /// Schedule attack and decay on `param` starting at `start`.
    ///
    /// Pending automation at or after `start` is cancelled first so ramps from
    /// a previous note never stack with the new ones.
    pub fn trigger(shape: EnvelopeShape, param: &mut Automation, start: f64) -> Self {
        let levels = shape.levels;
        let attack_end = start + shape.attack;

        param.cancel_scheduled_values(start);
        param.set_value_at(levels.off, start);
        param.linear_ramp_to(levels.on, attack_end);
        param.set_target_at(levels.sustain, attack_end, shape.decay);

        Self {
            shape,
            start,
            release_start: None,
        }
    }

    /// Schedule the release on `param` at `at`, returning when it completes.
    ///
    /// The ramp starts from the value the target actually has at `at`, which
    /// may still be inside the attack or decay.
    pub fn release(&mut self, param: &mut Automation, at: f64) -> f64 {
        let live = param.value_at(at);
        let end = at + self.shape.release;

        param.cancel_scheduled_values(at);
        param.set_value_at(live, at);
        param.linear_ramp_to(self.shape.levels.off, end);

        self.release_start = Some(at);
        end
    }

    /// Settings captured at note-on
    pub fn shape(&self) -> &EnvelopeShape {
        &self.shape
    }

    /// Quantity this envelope drives
    pub fn target(&self) -> AdsrTarget {
        self.shape.target
    }

    /// Note start time in seconds
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Check if the release has been scheduled
    pub fn is_released(&self) -> bool {
        self.release_start.is_some()
    }

    /// Stage of the envelope at time `t`
    pub fn stage_at(&self, t: f64) -> EnvelopeStage {
        if t < self.start {
            return EnvelopeStage::Idle;
        }
        if let Some(release_start) = self.release_start {
            if t >= release_start {
                return if t < release_start + self.shape.release {
                    EnvelopeStage::Release
                } else {
                    EnvelopeStage::Idle
                };
            }
        }

        let attack_end = self.start + self.shape.attack;
        if t < attack_end {
            EnvelopeStage::Attack
        } else if t < attack_end + self.shape.decay {
            EnvelopeStage::Decay
        } else {
            EnvelopeStage::Sustain
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 44100.0;

    fn shape(attack: f64, decay: f64, sustain: f64, release: f64) -> EnvelopeShape {
        EnvelopeShape {
            target: AdsrTarget::Amplitude,
            levels: EnvelopeLevels {
                off: 0.0,
                on: 1.0,
                sustain,
            },
            attack,
            decay,
            release,
        }
    }

    #[test]
    fn test_shape_from_default_params() {
        let shape = EnvelopeShape::from_params(&ParamSet::new(), SAMPLE_RATE);

        assert_eq!(shape.target, AdsrTarget::Amplitude);
        assert!((shape.attack - 0.4).abs() < 1e-12);
        assert_eq!(shape.decay, 0.0);
        assert!((shape.release - 0.4).abs() < 1e-12);
        assert_eq!(shape.levels, EnvelopeLevels { off: 0.0, on: 1.0, sustain: 1.0 });
    }

    #[test]
    fn test_filter_levels_clamped_to_cutoff() {
        let params = ParamSet::with_overrides([
            (ParamId::AdsrTarget, 1.0),
            (ParamId::FilterFreq, 0.25),
            (ParamId::AdsrSustain, 0.5),
        ]);
        let levels = EnvelopeLevels::for_target(AdsrTarget::Filter, &params, SAMPLE_RATE);
        let ceiling = filter_frequency_hz(0.25, SAMPLE_RATE);

        assert_eq!(levels.off, 40.0);
        assert_eq!(levels.on, ceiling);
        assert_eq!(levels.sustain, ceiling);
    }

    #[test]
    fn test_filter_levels_below_ceiling_are_mapped() {
        let params = ParamSet::with_overrides([
            (ParamId::FilterFreq, 0.8),
            (ParamId::AdsrSustain, 0.5),
        ]);
        let levels = EnvelopeLevels::for_target(AdsrTarget::Filter, &params, SAMPLE_RATE);

        assert_eq!(levels.sustain, filter_frequency_hz(0.5, SAMPLE_RATE));
        assert_eq!(levels.on, filter_frequency_hz(0.8, SAMPLE_RATE));
    }

    #[test]
    fn test_attack_ramp() {
        let mut param = Automation::new(0.0);
        Envelope::trigger(shape(0.4, 0.0, 1.0, 0.4), &mut param, 0.0);

        assert_eq!(param.value_at(0.0), 0.0);
        assert!((param.value_at(0.2) - 0.5).abs() < 1e-9);
        assert_eq!(param.value_at(0.4), 1.0);
    }

    #[test]
    fn test_attack_decay_boundary_is_continuous() {
        let mut param = Automation::new(0.0);
        Envelope::trigger(shape(0.1, 0.3, 0.4, 0.2), &mut param, 1.0);

        assert_eq!(param.value_at(1.1), 1.0);
        assert!((param.value_at(1.1 + 1e-6) - 1.0).abs() < 1e-4);
        assert!((param.value_at(5.0) - 0.4).abs() < 1e-3);
    }

    #[test]
    fn test_release_starts_from_live_value() {
        let mut param = Automation::new(0.0);
        let mut env = Envelope::trigger(shape(0.4, 0.0, 1.0, 0.4), &mut param, 0.0);

        // Released halfway through the attack
        let end = env.release(&mut param, 0.2);

        assert!((end - 0.6).abs() < 1e-12);
        assert!((param.value_at(0.2) - 0.5).abs() < 1e-9);
        assert!((param.value_at(0.4) - 0.25).abs() < 1e-9);
        assert!(param.value_at(0.6).abs() < 1e-9);
        assert_eq!(param.value_at(1.0), 0.0);
    }

    #[test]
    fn test_retrigger_cancels_previous_schedule() {
        let mut param = Automation::new(0.0);
        Envelope::trigger(shape(1.0, 0.5, 0.5, 0.2), &mut param, 0.0);
        Envelope::trigger(shape(0.2, 0.0, 1.0, 0.2), &mut param, 0.5);

        assert_eq!(param.value_at(0.5), 0.0);
        assert!((param.value_at(0.6) - 0.5).abs() < 1e-9);
        assert_eq!(param.value_at(2.0), 1.0);
    }

    #[test]
    fn test_stages() {
        let mut param = Automation::new(0.0);
        let mut env = Envelope::trigger(shape(0.1, 0.2, 0.5, 0.3), &mut param, 1.0);

        assert_eq!(env.stage_at(0.5), EnvelopeStage::Idle);
        assert_eq!(env.stage_at(1.05), EnvelopeStage::Attack);
        assert_eq!(env.stage_at(1.2), EnvelopeStage::Decay);
        assert_eq!(env.stage_at(2.0), EnvelopeStage::Sustain);

        env.release(&mut param, 3.0);
        assert!(env.is_released());
        assert_eq!(env.stage_at(2.5), EnvelopeStage::Sustain);
        assert_eq!(env.stage_at(3.1), EnvelopeStage::Release);
        assert_eq!(env.stage_at(3.4), EnvelopeStage::Idle);
    }
}
