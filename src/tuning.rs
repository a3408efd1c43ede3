// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Equal-tempered frequencies of all notes, computed once per process.

use lazy_static::lazy_static;

use crate::note::{Note, NOTE_COUNT};
use crate::util::from_semitones;

/// Defines the tuning of the note system by assigning a frequency to a reference note.
/// All other notes follow at a standard tuning of 12 half-tones per octave.
#[derive(Debug, Clone, Copy)]
pub struct Tuning {
    pub reference_note: Note,
    pub reference_frequency: f64,
}

impl Tuning {
    /// Return the frequency of a note relative to this tuning.
    pub fn frequency(&self, other: Note) -> f64 {
        let semitones = other.index() as f64 - self.reference_note.index() as f64;
        self.reference_frequency * from_semitones(semitones)
    }
}

/// Default concert tuning, where A4 corresponds to 440 Hz.
impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            reference_note: Note::A4,
            reference_frequency: 440.0,
        }
    }
}

/// Read-only lookup table from notes to their frequency in Hz.
pub struct FrequencyTable {
    frequencies: [f64; NOTE_COUNT],
}

impl FrequencyTable {
    pub fn new(tuning: Tuning) -> Self {
        let mut frequencies = [0.0; NOTE_COUNT];
        for note in Note::all() {
            frequencies[note.index()] = tuning.frequency(note);
        }
        Self { frequencies }
    }

    /// Frequency of a note given by its identifier, e.g. `"G5"` or `"F#5"`.
    /// Returns `None` if there is no such note.
    pub fn get(&self, name: &str) -> Option<f64> {
        Note::from_name(name).map(|note| self.frequency(note))
    }

    pub fn frequency(&self, note: Note) -> f64 {
        self.frequencies[note.index()]
    }

    /// All notes with their frequencies in chromatic order.
    pub fn iter(&self) -> impl Iterator<Item = (Note, f64)> + '_ {
        Note::all().map(move |note| (note, self.frequency(note)))
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }
}

lazy_static! {
    /// The process-wide table in concert tuning.
    pub static ref FREQUENCIES: FrequencyTable = FrequencyTable::new(Tuning::default());
}

/// Look up the frequency of a note identifier in concert tuning.
///
/// # Examples
///
/// ```
/// use syn_organ::tuning::frequency_of;
///
/// assert_eq!(frequency_of("A4"), Some(440.0));
/// assert_eq!(frequency_of("A3"), Some(220.0));
/// assert_eq!(frequency_of("silence"), None);
/// ```
pub fn frequency_of(name: &str) -> Option<f64> {
    FREQUENCIES.get(name)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reference_pitch_is_exact() {
        assert_eq!(frequency_of("A4"), Some(440.0));
    }

    #[test]
    fn octave_doubles_frequency() {
        let a5 = frequency_of("A5").unwrap();
        assert!((a5 - 880.0).abs() < 1e-9);
    }

    #[test]
    fn table_is_positive_and_increasing() {
        assert_eq!(FREQUENCIES.len(), 108);
        let freqs: Vec<f64> = FREQUENCIES.iter().map(|(_, f)| f).collect();
        assert_eq!(freqs.len(), 108);
        assert!(freqs.iter().all(|f| f.is_finite() && *f > 0.0));
        assert!(freqs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn matches_equal_temperament_formula() {
        for (note, freq) in FREQUENCIES.iter() {
            let expected = 440.0
                * 2.0f64.powf(
                    (note.octave() as f64 * 12.0 + note.semitone() as f64 - 57.0) / 12.0,
                );
            assert!((freq - expected).abs() < 1e-9, "{} is off", note);
            assert_eq!(frequency_of(&note.to_string()), Some(freq));
        }
    }

    #[test]
    fn unknown_names_are_absent() {
        assert_eq!(frequency_of("ZZ9"), None);
        assert_eq!(frequency_of("Db5"), None);
        assert_eq!(frequency_of("C9"), None);
    }

    #[test]
    fn custom_tuning() {
        let table = FrequencyTable::new(Tuning {
            reference_note: Note::A4,
            reference_frequency: 432.0,
        });
        assert_eq!(table.get("A4"), Some(432.0));
        assert_eq!(table.get("A3"), Some(216.0));
    }
}
