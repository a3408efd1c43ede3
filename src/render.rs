// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Turning single notes into sound on an audio context.

use log::{debug, error, trace, warn};

use crate::automation::ParamSchedule;
use crate::graph::{AudioContext, GraphError, NodeId, ParamKind};
use crate::instrument::{Organ, ORGAN};
use crate::oscillator::WaveShape;
use crate::sequencer::NoteRenderer;
use crate::song::{Tempo, SILENCE};
use crate::tuning;

/// What happened when rendering a note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneOutcome {
    /// Nothing sounded, but the time of the rest has passed.
    Rest { duration: f64 },
    /// The note name is not known. No time has passed.
    UnknownNote,
    Played {
        frequency: f64,
        /// Time the note was held, in seconds.
        duration: f64,
        /// Absolute time at which the release of the note would have ended.
        envelope_end: f64,
    },
}

/// Plays notes one at a time on an instrument.
///
/// Rendering a note blocks (in context time) until the note is over,
/// and leaves no nodes behind in the context.
pub struct ToneRenderer<'a, C> {
    context: &'a mut C,
    instrument: Organ,
    destination: NodeId,
}

impl<'a, C: AudioContext> ToneRenderer<'a, C> {
    /// A renderer playing the organ into the destination of the context.
    pub fn new(context: &'a mut C) -> Self {
        let destination = context.destination();
        Self {
            context,
            instrument: ORGAN,
            destination,
        }
    }

    pub fn with_instrument(mut self, instrument: Organ) -> Self {
        self.instrument = instrument;
        self
    }

    /// Send the tones to some other node than the destination of the context.
    pub fn with_destination(mut self, destination: NodeId) -> Self {
        self.destination = destination;
        self
    }

    pub fn context(&self) -> &C {
        &*self.context
    }

    /// Play a note, or rest when the note is [`SILENCE`], for the given number of beats.
    /// Returns once the time of the note has passed.
    pub fn render_note(
        &mut self,
        note: &str,
        beats: f64,
        tempo: Tempo,
    ) -> Result<ToneOutcome, GraphError> {
        let duration = tempo.seconds(beats);

        if note == SILENCE {
            debug!("rest for {:.3} s", duration);
            self.context.sleep(duration)?;
            return Ok(ToneOutcome::Rest { duration });
        }

        let frequency = match tuning::frequency_of(note) {
            Some(frequency) => frequency,
            None => {
                error!("Invalid note: {}", note);
                return Ok(ToneOutcome::UnknownNote);
            }
        };

        debug!("play {} ({:.2} Hz) for {:.3} s", note, frequency, duration);
        let envelope_end = self.play_tone(frequency, duration)?;
        Ok(ToneOutcome::Played {
            frequency,
            duration,
            envelope_end,
        })
    }

    fn play_tone(&mut self, frequency: f64, duration: f64) -> Result<f64, GraphError> {
        let instrument = self.instrument;
        let destination = self.destination;
        let mut tone = ActiveTone::new(&mut *self.context);
        let now = tone.context.current_time();

        let gain = tone.create_gain();
        tone.context.connect(gain, destination)?;
        for partial in instrument.partials(frequency) {
            let osc = tone.create_oscillator(instrument.shape);
            tone.context
                .param_mut(osc, ParamKind::Frequency)?
                .set_value_at_time(partial, now);
            tone.context.connect(osc, gain)?;
        }

        let gain_param = tone.context.param_mut(gain, ParamKind::Gain)?;
        let envelope_end = instrument.envelope.shape(gain_param, now, duration);
        for &osc in tone.oscillators.iter() {
            tone.context.start(osc, now)?;
            tone.context.stop(osc, envelope_end)?;
        }

        // The release is cut off when the next note begins.
        tone.context.sleep(duration)?;
        Ok(envelope_end)
    }
}

impl<'a, C: AudioContext> NoteRenderer for ToneRenderer<'a, C> {
    fn render_note(
        &mut self,
        note: &str,
        beats: f64,
        tempo: Tempo,
    ) -> Result<ToneOutcome, GraphError> {
        ToneRenderer::render_note(self, note, beats, tempo)
    }
}

/// The nodes allocated for a single tone.
/// Dropping it disconnects and releases all of them.
struct ActiveTone<'c, C: AudioContext> {
    context: &'c mut C,
    gain: Option<NodeId>,
    oscillators: Vec<NodeId>,
}

impl<'c, C: AudioContext> ActiveTone<'c, C> {
    fn new(context: &'c mut C) -> Self {
        Self {
            context,
            gain: None,
            oscillators: Vec::new(),
        }
    }

    fn create_gain(&mut self) -> NodeId {
        let gain = self.context.create_gain();
        self.gain = Some(gain);
        gain
    }

    fn create_oscillator(&mut self, shape: WaveShape) -> NodeId {
        let osc = self.context.create_oscillator(shape);
        self.oscillators.push(osc);
        osc
    }

    fn free(&mut self, node: NodeId) {
        let result = self
            .context
            .disconnect(node)
            .and_then(|_| self.context.release(node));
        if let Err(err) = result {
            warn!("Failed to release {:?}: {}", node, err);
        }
    }
}

impl<'c, C: AudioContext> Drop for ActiveTone<'c, C> {
    fn drop(&mut self) {
        trace!("releasing tone at {:.3}", self.context.current_time());
        let oscillators = std::mem::take(&mut self.oscillators);
        for osc in oscillators {
            self.free(osc);
        }
        if let Some(gain) = self.gain.take() {
            self.free(gain);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::RenderContext;
    use crate::output::{AudioSink, MemorySink};
    use crate::song::TimeSignature;
    use crate::wave::Stereo;
    use std::io;

    /// Half a second per beat.
    const SLOW: Tempo = Tempo {
        beats_per_minute: 30,
        time_signature: TimeSignature {
            beats_per_bar: 4,
            beat_unit: 4,
        },
    };

    fn context() -> RenderContext<MemorySink> {
        RenderContext::new(8000, MemorySink::default())
    }

    #[test]
    fn silence_waits_without_nodes() {
        let mut ctx = context();
        let outcome = ToneRenderer::new(&mut ctx)
            .render_note(SILENCE, 1.0, SLOW)
            .unwrap();
        assert_eq!(outcome, ToneOutcome::Rest { duration: 0.5 });
        assert_eq!(ctx.current_time(), 0.5);
        assert_eq!(ctx.nodes_created(), 0);

        let samples = ctx.finish().unwrap().samples;
        assert_eq!(samples.len(), 4000);
        assert!(samples.iter().all(|s| *s == Stereo::mono(0.0)));
    }

    #[test]
    fn unknown_notes_complete_immediately() {
        let mut ctx = context();
        let mut renderer = ToneRenderer::new(&mut ctx);
        for note in ["ZZ9", "Db4", "C9", "", "silence "].iter() {
            assert_eq!(
                renderer.render_note(note, 1.0, SLOW).unwrap(),
                ToneOutcome::UnknownNote
            );
        }
        assert_eq!(ctx.current_time(), 0.0);
        assert_eq!(ctx.nodes_created(), 0);
    }

    #[test]
    fn played_note_is_audible_and_cleaned_up() {
        let mut ctx = context();
        let outcome = ToneRenderer::new(&mut ctx)
            .render_note("A4", 1.0, SLOW)
            .unwrap();

        match outcome {
            ToneOutcome::Played {
                frequency,
                duration,
                envelope_end,
            } => {
                assert_eq!(frequency, 440.0);
                assert_eq!(duration, 0.5);
                assert!((envelope_end - 1.288).abs() < 1e-9);
            }
            other => panic!("Expected a played note, got {:?}", other),
        }

        // one gain stage and three oscillators, all gone again
        assert_eq!(ctx.nodes_created(), 4);
        assert_eq!(ctx.live_nodes(), 0);
        assert!(ctx.graph().edges().is_empty());
        assert_eq!(ctx.current_time(), 0.5);

        // nothing sounds after the note is over
        ctx.sleep(0.1).unwrap();
        let samples = ctx.finish().unwrap().samples;
        assert_eq!(samples.len(), 4800);
        assert_eq!(samples[0], Stereo::mono(0.0));
        assert!(samples[..4000].iter().any(|s| s.left.abs() > 0.1));
        assert!(samples[4000..].iter().all(|s| *s == Stereo::mono(0.0)));
        // three partials at most at full gain
        assert!(samples.iter().all(|s| s.left.abs() <= 3.0 * 0.4 + 1e-9));
    }

    #[test]
    fn consecutive_notes_reuse_slots() {
        let mut ctx = context();
        let mut renderer = ToneRenderer::new(&mut ctx);
        renderer.render_note("C4", 0.5, SLOW).unwrap();
        renderer.render_note("E4", 0.5, SLOW).unwrap();
        renderer.render_note("G4", 0.5, SLOW).unwrap();
        assert_eq!(ctx.nodes_created(), 12);
        assert_eq!(ctx.live_nodes(), 0);
        assert!((ctx.current_time() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn custom_instrument_and_destination() {
        let mut ctx = context();
        let dest = ctx.destination();
        let mute = ctx.create_gain();
        ctx.param_mut(mute, ParamKind::Gain)
            .unwrap()
            .set_value_at_time(0.0, 0.0);
        ctx.connect(mute, dest).unwrap();

        let flute = Organ {
            harmonics: &[1.0],
            ..ORGAN
        };
        let mut renderer = ToneRenderer::new(&mut ctx)
            .with_instrument(flute)
            .with_destination(mute);
        renderer.render_note("C4", 1.0, SLOW).unwrap();
        assert_eq!(renderer.context().nodes_created(), 3);

        // only the muting stage is left
        assert_eq!(ctx.live_nodes(), 1);
        let samples = ctx.finish().unwrap().samples;
        assert!(samples.iter().all(|s| *s == Stereo::mono(0.0)));
    }

    struct BrokenSink;

    impl AudioSink for BrokenSink {
        fn write(&mut self, _samples: &[Stereo<f64>]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn nodes_are_released_on_errors() {
        let mut ctx = RenderContext::new(8000, BrokenSink);
        let result = ToneRenderer::new(&mut ctx).render_note("A4", 1.0, SLOW);
        assert!(matches!(result, Err(GraphError::SinkWrite { .. })));
        assert_eq!(ctx.nodes_created(), 4);
        assert_eq!(ctx.live_nodes(), 0);
    }
}
