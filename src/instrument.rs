// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Timbre of the tones being played.

use crate::envelope::{EnvelopeParams, ORGAN_ENVELOPE};
use crate::oscillator::WaveShape;

/// An additive instrument: one oscillator per harmonic, all going through a
/// single envelope-shaped gain stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Organ {
    /// Multiples of the fundamental frequency that are sounded together.
    pub harmonics: &'static [f64],
    pub shape: WaveShape,
    pub envelope: EnvelopeParams,
}

/// Sine waves at the fundamental and its first two octaves.
pub const ORGAN: Organ = Organ {
    harmonics: &[1.0, 2.0, 4.0],
    shape: WaveShape::Sine,
    envelope: ORGAN_ENVELOPE,
};

impl Organ {
    /// Frequencies of all oscillators needed for a tone with the given fundamental.
    ///
    /// ```
    /// use syn_organ::instrument::ORGAN;
    ///
    /// let partials: Vec<f64> = ORGAN.partials(110.0).collect();
    /// assert_eq!(partials, vec![110.0, 220.0, 440.0]);
    /// ```
    pub fn partials(&self, fundamental: f64) -> impl Iterator<Item = f64> + '_ {
        self.harmonics.iter().map(move |h| fundamental * h)
    }
}
