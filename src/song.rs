// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The melody, and the tempo it is played at.

use std::io;
use std::num::ParseIntError;
use std::str::FromStr;

use snafu::{ensure, OptionExt, ResultExt, Snafu};

use crate::tuning;

/// Name used in place of a note for a rest.
pub const SILENCE: &str = "silence";

/// Possible errors when parsing a time signature like `3/4`.
#[derive(Debug, Snafu)]
pub enum TimeSignatureError {
    #[snafu(display("Time signature {:?} is not of the form N/D", text))]
    MissingSlash { text: String },
    #[snafu(display("Invalid number in time signature {:?}: {}", text, source))]
    BadNumber { text: String, source: ParseIntError },
    #[snafu(display("Time signature {:?} contains a zero", text))]
    ZeroComponent { text: String },
}

/// Time signature of a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub beats_per_bar: u32,
    /// The denominator, i.e. which note value counts as one beat.
    pub beat_unit: u32,
}

impl FromStr for TimeSignature {
    type Err = TimeSignatureError;

    /// ```
    /// use syn_organ::song::TimeSignature;
    ///
    /// let sig: TimeSignature = "6/8".parse().unwrap();
    /// assert_eq!(sig, TimeSignature { beats_per_bar: 6, beat_unit: 8 });
    /// assert!("6".parse::<TimeSignature>().is_err());
    /// ```
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut parts = text.splitn(2, '/');
        let numerator = parts.next().unwrap_or_default();
        let denominator = parts.next().context(MissingSlash { text })?;

        let beats_per_bar: u32 = numerator.trim().parse().context(BadNumber { text })?;
        let beat_unit: u32 = denominator.trim().parse().context(BadNumber { text })?;
        ensure!(beats_per_bar > 0 && beat_unit > 0, ZeroComponent { text });

        Ok(TimeSignature {
            beats_per_bar,
            beat_unit,
        })
    }
}

/// The speed at which beats are turned into seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tempo {
    pub beats_per_minute: u32,
    pub time_signature: TimeSignature,
}

impl Tempo {
    /// Seconds per beat. The beat unit divides the beat, so 90 BPM in 3/4 gives 1/6 s.
    pub fn beat_duration(&self) -> f64 {
        60.0 / (f64::from(self.beats_per_minute) * f64::from(self.time_signature.beat_unit))
    }

    pub fn seconds(&self, beats: f64) -> f64 {
        beats * self.beat_duration()
    }
}

/// A note name, or [`SILENCE`], held for some number of beats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SongEntry {
    pub note: &'static str,
    pub beats: f64,
}

impl SongEntry {
    pub fn is_rest(&self) -> bool {
        self.note == SILENCE
    }
}

/// A melody played one entry after another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Song {
    pub tempo: Tempo,
    pub entries: &'static [SongEntry],
}

impl Song {
    /// Total length of the song in beats.
    pub fn beats(&self) -> f64 {
        self.entries.iter().map(|e| e.beats).sum()
    }

    /// Total length of the song in seconds, not counting the release of the last note.
    pub fn duration(&self) -> f64 {
        self.tempo.seconds(self.beats())
    }

    /// Write one line per entry with its position, length and frequency.
    pub fn dump<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "# {} BPM, {}/{}, beat = {:.4} s",
            self.tempo.beats_per_minute,
            self.tempo.time_signature.beats_per_bar,
            self.tempo.time_signature.beat_unit,
            self.tempo.beat_duration()
        )?;
        let mut position = 0.0;
        for entry in self.entries.iter() {
            let pitch = if entry.is_rest() {
                "-".to_string()
            } else {
                match tuning::frequency_of(entry.note) {
                    Some(f) => format!("{:.3} Hz", f),
                    None => "unknown note".to_string(),
                }
            };
            writeln!(
                out,
                "{:>6.2}\t{}\t{}\t{}",
                position, entry.note, entry.beats, pitch
            )?;
            position += entry.beats;
        }
        Ok(())
    }
}

const fn entry(note: &'static str, beats: f64) -> SongEntry {
    SongEntry { note, beats }
}

pub const TEMPO: Tempo = Tempo {
    beats_per_minute: 90,
    time_signature: TimeSignature {
        beats_per_bar: 3,
        beat_unit: 4,
    },
};

#[rustfmt::skip]
const ENTRIES: [SongEntry; 40] = [
    // 1st bar
    entry("G5", 1.0), entry(SILENCE, 1.0), entry("G5", 1.0),
    entry("A5", 1.0), entry("G5", 1.0), entry("F#5", 1.0), entry("E5", 2.0),
    entry("E5", 1.0), entry(SILENCE, 1.0), entry("E5", 2.0),

    // 2nd bar
    entry("A5", 1.0), entry(SILENCE, 1.0), entry("A5", 1.0),
    entry("B5", 1.0), entry("A5", 1.0), entry("G#5", 1.0), entry("F#5", 2.0),
    entry("F#5", 1.0), entry(SILENCE, 1.0), entry("F#5", 2.0),

    // 3rd bar
    entry("B5", 1.0), entry(SILENCE, 1.0), entry("B5", 1.0),
    entry("C#5", 1.0), entry("B5", 1.0), entry("A5", 1.0), entry("G5", 2.0),
    entry("E5", 1.0), entry(SILENCE, 1.0), entry("B4", 1.0), entry("C#5", 1.0),

    // 4th bar
    entry("D#5", 1.0), entry(SILENCE, 1.0), entry("A5", 1.0), entry(SILENCE, 1.0),
    entry("F5", 1.0), entry(SILENCE, 1.0), entry("G5", 2.0),
    entry(SILENCE, 2.0), entry("C#5", 2.0),
];

/// The organ melody.
pub const SONG: Song = Song {
    tempo: TEMPO,
    entries: &ENTRIES,
};

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn beat_duration_uses_the_denominator() {
        assert_eq!(TEMPO.beat_duration(), 60.0 / (90.0 * 4.0));
        assert!((TEMPO.beat_duration() - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(TEMPO.seconds(0.0), 0.0);
        assert!((TEMPO.seconds(2.0) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn song_tempo_matches_its_signature_text() {
        let sig: TimeSignature = "3/4".parse().unwrap();
        assert_eq!(sig, SONG.tempo.time_signature);
        assert_eq!(SONG.tempo.beats_per_minute, 90);
    }

    #[test]
    fn malformed_signatures() {
        assert!(matches!(
            "34".parse::<TimeSignature>(),
            Err(TimeSignatureError::MissingSlash { .. })
        ));
        assert!(matches!(
            "3/x".parse::<TimeSignature>(),
            Err(TimeSignatureError::BadNumber { .. })
        ));
        assert!(matches!(
            "3/-4".parse::<TimeSignature>(),
            Err(TimeSignatureError::BadNumber { .. })
        ));
        assert!(matches!(
            "0/4".parse::<TimeSignature>(),
            Err(TimeSignatureError::ZeroComponent { .. })
        ));
        assert_eq!(
            " 3 / 4 ".parse::<TimeSignature>().unwrap(),
            TimeSignature {
                beats_per_bar: 3,
                beat_unit: 4
            }
        );
    }

    #[test]
    fn song_contents() {
        assert_eq!(SONG.entries.len(), 40);
        assert_eq!(SONG.entries[0], entry("G5", 1.0));
        assert_eq!(SONG.entries[39], entry("C#5", 2.0));
        assert_eq!(SONG.entries.iter().filter(|e| e.is_rest()).count(), 10);
        // every note of the melody is playable
        for e in SONG.entries.iter().filter(|e| !e.is_rest()) {
            assert!(tuning::frequency_of(e.note).is_some(), "{}", e.note);
        }
        assert_eq!(SONG.beats(), 48.0);
    }

    #[test]
    fn dump_lists_every_entry() {
        let mut out = Vec::new();
        SONG.dump(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1 + SONG.entries.len());
        assert!(text.lines().nth(1).unwrap().contains("783.991 Hz"));
        assert!(text.lines().nth(2).unwrap().ends_with('-'));
    }
}
