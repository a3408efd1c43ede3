// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use std::f64::consts::PI;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WaveShape {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl WaveShape {
    /// Value of the wave at a phase in `[0, 1)`, ranging from -1.0 to 1.0.
    pub fn eval(self, phase: f64) -> f64 {
        match self {
            WaveShape::Sine => (phase * 2.0 * PI).sin(),
            WaveShape::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            WaveShape::Sawtooth => 2.0 * phase - 1.0,
            WaveShape::Triangle => {
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    3.0 - 4.0 * phase
                }
            }
        }
    }
}

/// An oscillator sampling a wave of some shape at a fixed sample rate.
/// The frequency may change between samples without discontinuities.
#[derive(Debug)]
pub struct Oscillator {
    shape: WaveShape,
    sample_rate: f64,
    phase: f64,
}

impl Oscillator {
    pub fn new(shape: WaveShape, sample_rate: f64) -> Self {
        Self {
            shape,
            sample_rate,
            phase: 0.0,
        }
    }

    pub fn shape(&self) -> WaveShape {
        self.shape
    }

    pub fn next_sample(&mut self, frequency: f64) -> f64 {
        let value = self.shape.eval(self.phase);
        self.phase = (self.phase + frequency / self.sample_rate).rem_euclid(1.0);
        value
    }
}
