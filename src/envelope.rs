// syn-organ -- a small organ sequencer on a synthesized audio graph
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use crate::automation::{ParamSchedule, Transition};

/// A Delay-Attack-Hold-Decay-Sustain-Release envelope for notes of known length.
/// After `delay` seconds of silence, the gain rises from zero to `max_gain` over `attack`
/// seconds and stays there for `hold` seconds. It then decays over `decay` seconds to
/// `sustain * max_gain`, where it stays for the duration of the note. Finally, the gain
/// falls back to zero over the next `release` seconds.
///
/// # Example
///
/// ```
/// use syn_organ::automation::*;
/// use syn_organ::envelope::*;
///
/// let e = EnvelopeParams {
///     delay: 0.0,
///     attack: 0.25,
///     hold: 0.25,
///     decay: 0.5,
///     sustain: 0.5,
///     release: 1.0,
///     max_gain: 1.0,
/// };
/// let mut gain = AudioParam::new(1.0);
/// let end = e.shape(&mut gain, 0.0, 2.0);
/// assert_eq!(end, 4.0);
///
/// assert_eq!(gain.value_at(0.0), 0.0);
/// assert_eq!(gain.value_at(0.125), 0.5);
/// assert_eq!(gain.value_at(0.25), 1.0);
/// assert_eq!(gain.value_at(0.5), 1.0);
/// assert_eq!(gain.value_at(0.75), 0.75);
/// assert_eq!(gain.value_at(1.0), 0.5);
/// assert_eq!(gain.value_at(3.0), 0.5);
/// assert_eq!(gain.value_at(3.5), 0.25);
/// assert_eq!(gain.value_at(4.0), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    /// Time in seconds before the attack starts.
    pub delay: f64,
    /// Time in seconds to go from 0.0 to `max_gain`.
    pub attack: f64,
    /// Time in seconds to stay at `max_gain`.
    pub hold: f64,
    /// Time in seconds to go from `max_gain` to the sustain level.
    pub decay: f64,
    /// Sustain level as a fraction of `max_gain`.
    pub sustain: f64,
    /// Time in seconds to go from the sustain level to 0.0.
    pub release: f64,
    /// Peak gain of the envelope.
    pub max_gain: f64,
}

/// The envelope shared by all organ notes.
pub const ORGAN_ENVELOPE: EnvelopeParams = EnvelopeParams {
    delay: 0.0,
    attack: 0.04,
    hold: 0.076,
    decay: 0.264,
    sustain: 0.092,
    release: 0.408,
    max_gain: 0.4,
};

/// One point of the gain curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    /// Absolute time in seconds.
    pub time: f64,
    pub gain: f64,
    /// How the curve arrives at this point.
    pub transition: Transition,
}

impl EnvelopeParams {
    pub fn sustain_level(&self) -> f64 {
        self.sustain * self.max_gain
    }

    /// The six control points of a note starting at `start` that is held for `note_duration`
    /// seconds. Only the last two points depend on the note duration.
    pub fn control_points(&self, start: f64, note_duration: f64) -> [ControlPoint; 6] {
        // also maps NaN to zero
        let note_duration = note_duration.max(0.0);

        let attack_end = start + self.delay + self.attack;
        let hold_end = attack_end + self.hold;
        let decay_end = hold_end + self.decay;
        let sustain_end = decay_end + note_duration;
        let release_end = sustain_end + self.release;

        let point = |time, gain, transition| ControlPoint {
            time,
            gain,
            transition,
        };
        [
            point(start, 0.0, Transition::Set),
            point(attack_end, self.max_gain, Transition::LinearRamp),
            point(hold_end, self.max_gain, Transition::Set),
            point(decay_end, self.sustain_level(), Transition::LinearRamp),
            point(sustain_end, self.sustain_level(), Transition::Set),
            point(release_end, 0.0, Transition::LinearRamp),
        ]
    }

    /// Schedule the envelope of a note on a gain parameter.
    /// Returns the absolute time at which the gain has returned to zero.
    pub fn shape<P: ParamSchedule + ?Sized>(
        &self,
        gain: &mut P,
        start: f64,
        note_duration: f64,
    ) -> f64 {
        let points = self.control_points(start, note_duration);
        for p in points.iter() {
            match p.transition {
                Transition::Set => gain.set_value_at_time(p.gain, p.time),
                Transition::LinearRamp => gain.linear_ramp_to_value_at_time(p.gain, p.time),
            }
        }
        points[points.len() - 1].time
    }

    /// Total length of the envelope of a note, measured from its start.
    pub fn length(&self, note_duration: f64) -> f64 {
        let points = self.control_points(0.0, note_duration);
        points[points.len() - 1].time
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::automation::AudioParam;

    #[test]
    fn release_tail_is_never_clipped() {
        for &start in &[0.0, 0.5, 17.25] {
            for &duration in &[1e-6, 0.1, 1.0 / 6.0, 1.0, 30.0] {
                let mut gain = AudioParam::new(1.0);
                let end = ORGAN_ENVELOPE.shape(&mut gain, start, duration);
                assert!(end > start + duration);
            }
        }
    }

    #[test]
    fn end_time_adds_all_stages() {
        let end = ORGAN_ENVELOPE.shape(&mut AudioParam::new(1.0), 1.0, 0.5);
        let expected = 1.0 + 0.04 + 0.076 + 0.264 + 0.5 + 0.408;
        assert!((end - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_duration_curve_is_monotonic() {
        let points = ORGAN_ENVELOPE.control_points(2.0, 0.0);
        assert!(points.windows(2).all(|w| w[0].time <= w[1].time));
        // sustain collapses to a single instant
        assert_eq!(points[3].time, points[4].time);

        let longer = ORGAN_ENVELOPE.control_points(2.0, 1.0);
        assert_eq!(points[..4], longer[..4]);
    }

    #[test]
    fn negative_duration_is_clamped() {
        assert_eq!(
            ORGAN_ENVELOPE.control_points(0.0, -3.0),
            ORGAN_ENVELOPE.control_points(0.0, 0.0)
        );
        assert_eq!(
            ORGAN_ENVELOPE.control_points(0.0, std::f64::NAN),
            ORGAN_ENVELOPE.control_points(0.0, 0.0)
        );
    }

    #[test]
    fn gain_follows_stages() {
        let mut gain = AudioParam::new(1.0);
        let start = 10.0;
        ORGAN_ENVELOPE.shape(&mut gain, start, 1.0);

        assert_eq!(gain.value_at(start), 0.0);
        assert!((gain.value_at(start + 0.02) - 0.2).abs() < 1e-9);
        assert!((gain.value_at(start + 0.1) - 0.4).abs() < 1e-9);
        let sustain = ORGAN_ENVELOPE.sustain_level();
        assert!((gain.value_at(start + 0.9) - sustain).abs() < 1e-9);
        assert_eq!(gain.value_at(start + ORGAN_ENVELOPE.length(1.0) + 1.0), 0.0);
        // never exceeds the peak
        let peak = (0..2000)
            .map(|i| gain.value_at(start + i as f64 * 0.001))
            .fold(0.0, f64::max);
        assert!(peak <= ORGAN_ENVELOPE.max_gain + 1e-12);
    }
}
