// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Playing a song one entry after another.

use log::{debug, info};

use crate::graph::GraphError;
use crate::render::ToneOutcome;
use crate::song::{Song, Tempo};

/// Something that can play a single note and returns once it is over.
pub trait NoteRenderer {
    /// Play `note` for `beats` beats, converted to seconds with `tempo`.
    fn render_note(
        &mut self,
        note: &str,
        beats: f64,
        tempo: Tempo,
    ) -> Result<ToneOutcome, GraphError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    /// Waiting for the entry with this index to complete.
    PlayingEntry(usize),
    Finished,
}

/// Summary of a completed playback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackReport {
    pub entries: usize,
    pub tones: usize,
    pub rests: usize,
    /// Names of the notes that could not be played, in order of appearance.
    pub unknown_notes: Vec<String>,
    /// Seconds spent playing tones and rests.
    pub total_seconds: f64,
}

pub struct Sequencer {
    song: Song,
    state: SequencerState,
}

impl Sequencer {
    pub fn new(song: Song) -> Self {
        Self {
            song,
            state: SequencerState::Idle,
        }
    }

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Play all entries of the song in order, each one only after the previous one completed.
    /// The tempo of the song decides how long every entry lasts.
    ///
    /// A failing entry aborts the playback and the state stays at that entry.
    pub fn play<R: NoteRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
    ) -> Result<PlaybackReport, GraphError> {
        let mut report = PlaybackReport::default();
        let tempo = self.song.tempo;

        for (index, entry) in self.song.entries.iter().enumerate() {
            self.state = SequencerState::PlayingEntry(index);
            debug!("entry {}: {} x {}", index, entry.note, entry.beats);

            match renderer.render_note(entry.note, entry.beats, tempo)? {
                ToneOutcome::Rest { duration } => {
                    report.rests += 1;
                    report.total_seconds += duration;
                }
                ToneOutcome::UnknownNote => report.unknown_notes.push(entry.note.to_string()),
                ToneOutcome::Played { duration, .. } => {
                    report.tones += 1;
                    report.total_seconds += duration;
                }
            }
            report.entries += 1;
        }

        self.state = SequencerState::Finished;
        info!("Song playback finished");
        Ok(report)
    }
}
