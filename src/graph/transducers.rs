// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use crate::automation::AudioParam;

use super::{Node, ParamKind, RenderIo};

/// Applies an automatable linear gain to the sum of its inputs.
pub struct GainNode {
    gain: AudioParam,
}

impl Default for GainNode {
    fn default() -> Self {
        Self::new()
    }
}

impl GainNode {
    /// Create a gain node passing its input through unchanged until automated.
    pub fn new() -> Self {
        Self {
            gain: AudioParam::new(1.0),
        }
    }
}

impl Node for GainNode {
    fn name(&self) -> &'static str {
        "gain"
    }
    fn num_inputs(&self) -> usize {
        1
    }
    fn num_outputs(&self) -> usize {
        1
    }
    fn render(&mut self, rio: &mut RenderIo) {
        let start = rio.time_at(0);
        if self.gain.is_static_after(start) {
            let gain = self.gain.value_at(start);
            let (input, output) = rio.io();
            for (i, o) in input.iter().zip(output.iter_mut()) {
                *o = *i * gain;
            }
        } else {
            let (first, sample_rate) = (rio.start(), rio.sample_rate());
            let (input, output) = rio.io();
            for (n, (i, o)) in input.iter().zip(output.iter_mut()).enumerate() {
                let t = (first + n) as f64 / sample_rate;
                *o = *i * self.gain.value_at(t);
            }
        }
    }

    fn param_mut(&mut self, kind: ParamKind) -> Option<&mut AudioParam> {
        match kind {
            ParamKind::Gain => Some(&mut self.gain),
            _ => None,
        }
    }
}

/// The final node of every graph. Its output is what gets played.
pub struct Destination;

impl Node for Destination {
    fn name(&self) -> &'static str {
        "destination"
    }
    fn num_inputs(&self) -> usize {
        1
    }
    /// Nothing can be connected to the output of the destination.
    fn num_outputs(&self) -> usize {
        0
    }
    fn render(&mut self, rio: &mut RenderIo) {
        let (input, output) = rio.io();
        output.copy_from_slice(input);
    }
}
