//! Time-stamped parameter automation
//!
//! An [`Automation`] is the timeline of one mutable engine quantity (a gain or a
//! filter cutoff). Callers schedule events against the render clock; the render
//! step reads the value at each sample time. Nothing is rendered synchronously.

/// A scheduled change of an automated value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    /// Jump to `value` at `time`
    SetValue { time: f64, value: f64 },
    /// Ramp linearly from the previous event to reach `value` at `time`
    LinearRamp { time: f64, value: f64 },
    /// Approach `target` exponentially from `time` on
    SetTarget {
        time: f64,
        target: f64,
        time_constant: f64,
    },
}

impl AutomationEvent {
    pub fn time(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { time, .. }
            | AutomationEvent::LinearRamp { time, .. }
            | AutomationEvent::SetTarget { time, .. } => time,
        }
    }
}

/// The curve in force after the last reached event
#[derive(Debug, Clone, Copy, PartialEq)]
enum Segment {
    Hold {
        time: f64,
        value: f64,
    },
    Approach {
        time: f64,
        from: f64,
        target: f64,
        time_constant: f64,
    },
}

impl Segment {
    fn value_at(&self, t: f64) -> f64 {
        match *self {
            Segment::Hold { value, .. } => value,
            Segment::Approach {
                time,
                from,
                target,
                time_constant,
            } => {
                if time_constant <= 0.0 {
                    target
                } else if t <= time {
                    from
                } else {
                    target + (from - target) * (-(t - time) / time_constant).exp()
                }
            }
        }
    }

    /// Start point a following linear ramp interpolates from
    fn origin(&self) -> (f64, f64) {
        match *self {
            Segment::Hold { time, value } => (time, value),
            Segment::Approach { time, from, .. } => (time, from),
        }
    }

    /// Segment in force once `event` has been reached
    fn then(self, event: &AutomationEvent) -> Segment {
        match *event {
            AutomationEvent::SetValue { time, value }
            | AutomationEvent::LinearRamp { time, value } => Segment::Hold { time, value },
            AutomationEvent::SetTarget {
                time,
                target,
                time_constant,
            } => Segment::Approach {
                time,
                from: self.value_at(time),
                target,
                time_constant,
            },
        }
    }
}

/// Automation timeline for a single value
#[derive(Debug, Clone)]
pub struct Automation {
    /// Curve produced by every event already folded away
    base: Segment,
    /// Pending events, ordered by time
    events: Vec<AutomationEvent>,
    /// Last time passed to `advance`
    now: f64,
}

impl Automation {
    /// Timeline holding `value` with nothing scheduled
    pub fn new(value: f64) -> Self {
        Self {
            base: Segment::Hold { time: 0.0, value },
            events: Vec::new(),
            now: 0.0,
        }
    }

    /// Assign a static value from `now` on
    pub fn set_value(&mut self, value: f64, now: f64) {
        self.set_value_at(value, now);
    }

    pub fn set_value_at(&mut self, value: f64, time: f64) {
        self.insert(AutomationEvent::SetValue { time, value });
    }

    pub fn linear_ramp_to(&mut self, value: f64, end_time: f64) {
        self.insert(AutomationEvent::LinearRamp {
            time: end_time,
            value,
        });
    }

    pub fn set_target_at(&mut self, target: f64, start_time: f64, time_constant: f64) {
        self.insert(AutomationEvent::SetTarget {
            time: start_time,
            target,
            time_constant,
        });
    }

    /// Drop every pending event scheduled at or after `time`
    pub fn cancel_scheduled_values(&mut self, time: f64) {
        self.events.retain(|event| event.time() < time);
    }

    /// Value of the timeline at time `t`
    pub fn value_at(&self, t: f64) -> f64 {
        let mut segment = self.base;

        for event in &self.events {
            if event.time() > t {
                if let AutomationEvent::LinearRamp { time, value } = *event {
                    let (t0, v0) = segment.origin();
                    if t <= t0 {
                        return v0;
                    }
                    return v0 + (value - v0) * (t - t0) / (time - t0);
                }
                return segment.value_at(t);
            }
            segment = segment.then(event);
        }

        segment.value_at(t)
    }

    /// Value at the last advanced time
    pub fn current_value(&self) -> f64 {
        self.value_at(self.now)
    }

    /// Move the timeline to `now`, folding events that have been reached
    pub fn advance(&mut self, now: f64) {
        self.now = now;

        let reached = self
            .events
            .iter()
            .take_while(|event| event.time() <= now)
            .count();
        for event in self.events.drain(..reached) {
            self.base = self.base.then(&event);
        }
    }

    /// Events not yet reached by the render clock
    pub fn pending(&self) -> &[AutomationEvent] {
        &self.events
    }

    fn insert(&mut self, event: AutomationEvent) {
        let time = event.time();
        let idx = self
            .events
            .iter()
            .position(|e| e.time() > time)
            .unwrap_or(self.events.len());
        self.events.insert(idx, event);
    }
}
