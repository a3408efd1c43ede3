// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Nodes generating sound by themselves.

use crate::automation::AudioParam;
use crate::oscillator::{Oscillator, WaveShape};
use crate::wave::Stereo;

use super::{Node, ParamKind, RenderIo};

/// When a source node is audible.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceSchedule {
    start: Option<f64>,
    stop: Option<f64>,
}

impl SourceSchedule {
    pub fn start(&mut self, when: f64) {
        self.start = Some(when);
    }

    /// Schedule the end of the sound. A later call replaces the previous stop time.
    pub fn stop(&mut self, when: f64) {
        self.stop = Some(when);
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start
    }

    pub fn stop_time(&self) -> Option<f64> {
        self.stop
    }

    /// Whether the source produces sound at the given time.
    pub fn is_playing(&self, time: f64) -> bool {
        match self.start {
            Some(start) => start <= time && self.stop.map_or(true, |stop| time < stop),
            None => false,
        }
    }
}

/// A periodic wave with automatable frequency.
pub struct OscillatorNode {
    oscillator: Oscillator,
    frequency: AudioParam,
    schedule: SourceSchedule,
}

impl OscillatorNode {
    /// Default frequency of new oscillators in Hz.
    pub const DEFAULT_FREQUENCY: f64 = 440.0;

    pub fn new(shape: WaveShape, sample_rate: f64) -> Self {
        Self {
            oscillator: Oscillator::new(shape, sample_rate),
            frequency: AudioParam::new(Self::DEFAULT_FREQUENCY),
            schedule: SourceSchedule::default(),
        }
    }
}

impl Node for OscillatorNode {
    fn name(&self) -> &'static str {
        "oscillator"
    }
    fn num_inputs(&self) -> usize {
        0
    }
    fn num_outputs(&self) -> usize {
        1
    }
    fn render(&mut self, rio: &mut RenderIo) {
        let (first, sample_rate) = (rio.start(), rio.sample_rate());
        for (n, out) in rio.output().iter_mut().enumerate() {
            let t = (first + n) as f64 / sample_rate;
            let value = if self.schedule.is_playing(t) {
                self.oscillator.next_sample(self.frequency.value_at(t))
            } else {
                0.0
            };
            *out = Stereo::mono(value);
        }
    }

    fn param_mut(&mut self, kind: ParamKind) -> Option<&mut AudioParam> {
        match kind {
            ParamKind::Frequency => Some(&mut self.frequency),
            _ => None,
        }
    }

    fn source_mut(&mut self) -> Option<&mut SourceSchedule> {
        Some(&mut self.schedule)
    }
}
