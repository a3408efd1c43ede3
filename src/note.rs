// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Definitions of what a note is.

use std::fmt;

/// Chromatic names of the twelve semitones of an octave, starting at C.
/// Only sharps are used for the black keys.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Number of octaves covered by the note system, starting at octave 0.
pub const OCTAVES: u8 = 9;

/// Total number of distinct notes.
pub const NOTE_COUNT: usize = OCTAVES as usize * NOTE_NAMES.len();

/// A note on the keyboard, identified by its octave and its semitone within that octave.
/// Notes are ordered from low to high.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Note {
    octave: u8,
    semitone: u8,
}

impl Note {
    /// Reference pitch of concert tuning.
    pub const A4: Note = Note {
        octave: 4,
        semitone: 9,
    };

    /// Construct a note from octave and semitone index, if both are in range.
    pub fn try_new(octave: u8, semitone: u8) -> Option<Note> {
        if octave < OCTAVES && (semitone as usize) < NOTE_NAMES.len() {
            Some(Note { octave, semitone })
        } else {
            None
        }
    }

    /// Parse a note identifier of the format `<name><octave>`, where the name is one of
    /// [`NOTE_NAMES`] and the octave is a single digit.
    /// Returns `None` for everything else, including flats and lowercase names.
    ///
    /// # Examples
    ///
    /// ```
    /// use syn_organ::note::*;
    ///
    /// assert_eq!(Note::from_name("A4"), Some(Note::A4));
    /// assert_eq!(Note::from_name("F#5"), Note::try_new(5, 6));
    /// assert_eq!(Note::from_name("C0"), Note::try_new(0, 0));
    /// assert_eq!(Note::from_name("Gb5"), None);
    /// assert_eq!(Note::from_name("a4"), None);
    /// assert_eq!(Note::from_name("A9"), None);
    /// assert_eq!(Note::from_name("ZZ9"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Note> {
        let split = name.len().checked_sub(1)?;
        if !name.is_char_boundary(split) {
            return None;
        }
        let (pitch, octave) = name.split_at(split);
        let octave = octave.chars().next()?.to_digit(10)? as u8;
        let semitone = NOTE_NAMES.iter().position(|n| *n == pitch)? as u8;
        Note::try_new(octave, semitone)
    }

    /// Iterate over all notes in chromatic order, from C0 to B8.
    pub fn all() -> impl Iterator<Item = Note> {
        (0..OCTAVES).flat_map(|octave| {
            (0..NOTE_NAMES.len() as u8).map(move |semitone| Note { octave, semitone })
        })
    }

    pub fn octave(self) -> u8 {
        self.octave
    }

    pub fn semitone(self) -> u8 {
        self.semitone
    }

    /// Position of the note counted in semitones from C0.
    /// A4 sits at index 57.
    pub fn index(self) -> usize {
        self.octave as usize * NOTE_NAMES.len() + self.semitone as usize
    }

    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.semitone as usize]
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.octave)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn index_of_reference_pitch() {
        assert_eq!(Note::from_name("A4").map(Note::index), Some(57));
    }

    #[test]
    fn all_notes_are_sorted() {
        let notes: Vec<_> = Note::all().collect();
        assert_eq!(notes.len(), NOTE_COUNT);
        assert!(notes.windows(2).all(|w| w[0] < w[1]));
        assert!(notes.iter().enumerate().all(|(i, n)| n.index() == i));
    }

    #[test]
    fn display_roundtrips_through_names() {
        for note in Note::all() {
            assert_eq!(Note::from_name(&note.to_string()), Some(note));
        }
    }

    #[test]
    fn rejects_malformed_names() {
        for name in &["", "5", "G", "G05", "G#", "H4", "silence", "C♯4", "E#4"] {
            assert_eq!(Note::from_name(name), None, "{:?} should be unknown", name);
        }
    }
}
