// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Utility functions that I don't know where to put else

/// Compute a factor measured in octaves (one octave corresponds to a factor of two).
///
/// # Example
///
/// ```
/// # use syn_organ::util::*;
///
/// assert_eq!(from_octaves(3.0), 8.0);
/// assert_eq!(from_octaves(-1.0), 0.5);
/// ```
pub fn from_octaves(octaves: f64) -> f64 {
    2.0f64.powf(octaves)
}

/// Compute a factor measured in semitones (one octave consists of 12 semitones)
///
/// # Example
///
/// ```
/// # use syn_organ::util::*;
///
/// assert_eq!(from_semitones(12.0), 2.0);
/// assert_eq!(from_semitones(0.0), 1.0);
/// ```
pub fn from_semitones(semitones: f64) -> f64 {
    from_octaves(semitones / 12.0)
}
