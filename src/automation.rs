// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Time based automation of numeric node parameters.

/// Anything that accepts scheduled value changes over time.
pub trait ParamSchedule {
    /// Jump to `value` at time `time` (in seconds) and hold it.
    fn set_value_at_time(&mut self, value: f64, time: f64);

    /// Ramp linearly from the previous scheduled value to `value`, arriving at `time`.
    fn linear_ramp_to_value_at_time(&mut self, value: f64, time: f64);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Set,
    LinearRamp,
}

/// A single scheduled change of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomationEvent {
    pub time: f64,
    pub value: f64,
    pub transition: Transition,
}

/// A parameter whose value follows a timeline of automation events.
///
/// Before the first event the parameter has its default value.
/// Between two events, the value ramps linearly if the later event is a ramp,
/// otherwise the value of the earlier event holds.
///
/// # Example
///
/// ```
/// use syn_organ::automation::*;
///
/// let mut p = AudioParam::new(1.0);
/// p.set_value_at_time(0.0, 1.0);
/// p.linear_ramp_to_value_at_time(0.5, 2.0);
/// p.set_value_at_time(0.25, 3.0);
///
/// assert_eq!(p.value_at(0.5), 1.0);
/// assert_eq!(p.value_at(1.0), 0.0);
/// assert_eq!(p.value_at(1.5), 0.25);
/// assert_eq!(p.value_at(2.5), 0.5);
/// assert_eq!(p.value_at(3.0), 0.25);
/// assert_eq!(p.value_at(100.0), 0.25);
/// ```
#[derive(Debug, Clone)]
pub struct AudioParam {
    default_value: f64,
    /// Sorted by time. Events at the same time stay in insertion order.
    events: Vec<AutomationEvent>,
}

impl AudioParam {
    pub fn new(default_value: f64) -> Self {
        Self {
            default_value,
            events: Vec::new(),
        }
    }

    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    /// Remove all scheduled events.
    pub fn cancel(&mut self) {
        self.events.clear();
    }

    fn insert(&mut self, event: AutomationEvent) {
        let at = self
            .events
            .iter()
            .position(|e| e.time > event.time)
            .unwrap_or_else(|| self.events.len());
        self.events.insert(at, event);
    }

    /// Evaluate the parameter at an absolute point in time.
    pub fn value_at(&self, time: f64) -> f64 {
        // index of the first event strictly after `time`
        let next = self
            .events
            .iter()
            .position(|e| e.time > time)
            .unwrap_or_else(|| self.events.len());

        let previous = match next.checked_sub(1) {
            Some(i) => self.events[i],
            None => return self.default_value,
        };

        match self.events.get(next) {
            Some(upcoming) if upcoming.transition == Transition::LinearRamp => {
                let progress = (time - previous.time) / (upcoming.time - previous.time);
                previous.value + (upcoming.value - previous.value) * progress
            }
            _ => previous.value,
        }
    }

    /// Whether no more scheduled changes happen after `time`.
    pub fn is_static_after(&self, time: f64) -> bool {
        self.events.last().map_or(true, |e| e.time <= time)
    }
}

impl ParamSchedule for AudioParam {
    fn set_value_at_time(&mut self, value: f64, time: f64) {
        self.insert(AutomationEvent {
            time,
            value,
            transition: Transition::Set,
        })
    }

    fn linear_ramp_to_value_at_time(&mut self, value: f64, time: f64) {
        self.insert(AutomationEvent {
            time,
            value,
            transition: Transition::LinearRamp,
        })
    }
}
