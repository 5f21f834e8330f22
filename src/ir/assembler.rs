//! Measure Assembler
//!
//! Groups one measure's events into beats following its beat map:
//!
//! 1. Pad an under-full measure with a single trailing rest
//! 2. Walk events against the beat breakpoints, splitting (and tying) events
//!    that cross a breakpoint; an event ending exactly on a later breakpoint
//!    is absorbed into a multi-beat beat
//! 3. Beam by position within the beat
//! 4. Flag tuplet beats
//! 5. Rescale sub-quarter durations to integers

use num_traits::{CheckedMul, One, Zero};

use crate::ir::factor::lcm;
use crate::ir::measurization::OpenMeasure;
use crate::ir::meter::{classify, MeterInfo};
use crate::ir::types::{Beat, Measure, TupletRatio};
use crate::models::duration::{self, Rational};
use crate::models::{
    AssemblySettings, BeamState, Event, NotationError, NotationResult, Rest, TailTie,
    TimeSignature,
};

/// Assemble a measure from raw events.
///
/// Fails with `MeasureOverflow` when the events exceed the meter capacity;
/// an under-full measure is padded with one rest.
pub fn assemble_measure(
    index: usize,
    time_signature: TimeSignature,
    events: Vec<Event>,
    settings: &AssemblySettings,
) -> NotationResult<Measure> {
    let meter = classify(time_signature)?;
    let open = OpenMeasure {
        index,
        meter,
        events,
    };

    let filled = open.filled()?;
    let capacity = open.meter.capacity();
    if filled > capacity {
        log::warn!(
            "Measure {} overflows: {} into capacity {}",
            index,
            filled,
            capacity
        );
        return Err(NotationError::MeasureOverflow {
            capacity,
            actual: filled,
        });
    }

    assemble_open(open, settings)
}

/// Assemble a measure produced by the sequencer
pub(crate) fn assemble_open(
    open: OpenMeasure,
    settings: &AssemblySettings,
) -> NotationResult<Measure> {
    let OpenMeasure {
        index,
        meter,
        events,
    } = open;

    let events = pad_to_capacity(events, meter.capacity())?;
    let tail = if settings.close_beat_ties {
        TailTie::Close
    } else {
        TailTie::Keep
    };

    let mut beats = group_into_beats(events, &meter, tail)?;
    for beat in &mut beats {
        apply_beams(beat);
        if settings.detect_tuplets {
            beat.tuplet = detect_tuplet(beat)?;
        }
    }

    let rescale = if settings.rescale_measures {
        rescale_beats(&mut beats)?
    } else {
        1
    };

    let breakpoints = meter.breakpoints();
    Ok(Measure {
        index,
        time_signature: meter.time_signature,
        meter,
        breakpoints,
        beats,
        rescale,
    })
}

/// Append one rest covering the shortfall, if any
fn pad_to_capacity(mut events: Vec<Event>, capacity: Rational) -> NotationResult<Vec<Event>> {
    let filled = duration::total(events.iter().map(Event::duration))?;
    if filled < capacity {
        let shortfall = duration::sub(capacity, filled)?;
        log::debug!("Padding measure with rest of {}", shortfall);
        events.push(Event::Rest(Rest::new(shortfall)?));
    }
    Ok(events)
}

/// Walks events against the breakpoint list, emitting closed beats
struct BeatWalker<'a> {
    slots: &'a [Rational],
    breakpoints: Vec<Rational>,
    tail: TailTie,
    beats: Vec<Beat>,
    open: Vec<Event>,
    /// Index of the first slot covered by the open beat
    first_slot: usize,
    /// Position (in quarters) where the open beat began
    beat_start: Rational,
    /// Position reached by the events in the open beat
    position: Rational,
}

impl<'a> BeatWalker<'a> {
    fn new(meter: &'a MeterInfo, tail: TailTie) -> Self {
        BeatWalker {
            slots: meter.beat_map.slots(),
            breakpoints: meter.breakpoints(),
            tail,
            beats: Vec::new(),
            open: Vec::new(),
            first_slot: 0,
            beat_start: Rational::zero(),
            position: Rational::zero(),
        }
    }

    /// Close the open beat at breakpoint `last_slot`
    fn close(&mut self, last_slot: usize) -> NotationResult<()> {
        let end = self.breakpoints[last_slot];
        let slot = self.slots[self.first_slot];
        let beat = Beat {
            events: std::mem::take(&mut self.open),
            slot,
            span: duration::sub(end, self.beat_start)?,
            subdivisions: slot,
            multi_beat: last_slot > self.first_slot,
            tuplet: None,
        };
        log::debug!(
            "Closed beat {}..={} with {} events{}",
            self.first_slot,
            last_slot,
            beat.events.len(),
            if beat.multi_beat { " (multi-beat)" } else { "" }
        );
        self.beats.push(beat);
        self.first_slot = last_slot + 1;
        self.beat_start = end;
        self.position = end;
        Ok(())
    }

    fn push(&mut self, event: Event) -> NotationResult<()> {
        let mut pending = event;
        loop {
            let Some(&boundary) = self.breakpoints.get(self.first_slot) else {
                // Only reachable if the events overfill the measure
                return Err(NotationError::MeasureOverflow {
                    capacity: self.breakpoints.last().copied().unwrap_or_else(Rational::zero),
                    actual: duration::add(self.position, pending.duration())?,
                });
            };

            let end = duration::add(self.position, pending.duration())?;
            if end < boundary {
                self.position = end;
                self.open.push(pending);
                return Ok(());
            }

            // Lands exactly on this or a later breakpoint: absorb
            if let Some(offset) = self.breakpoints[self.first_slot..]
                .iter()
                .position(|bp| *bp == end)
            {
                self.open.push(pending);
                return self.close(self.first_slot + offset);
            }

            // Crosses without landing. A non-empty beat closes at its own
            // breakpoint; an empty one takes every whole beat before the end.
            let split_slot = if self.open.is_empty() {
                self.breakpoints
                    .iter()
                    .rposition(|bp| *bp < end)
                    .unwrap_or(self.first_slot)
                    .max(self.first_slot)
            } else {
                self.first_slot
            };

            let older = duration::sub(self.breakpoints[split_slot], self.position)?;
            let (head, rest) = pending.split_with(older, self.tail)?;
            log::debug!(
                "Split {} at beat breakpoint {}",
                head.kind_name(),
                self.breakpoints[split_slot]
            );
            self.open.push(head);
            self.close(split_slot)?;
            pending = rest;
        }
    }

    fn finish(mut self) -> NotationResult<Vec<Beat>> {
        if !self.open.is_empty() {
            let last = self.breakpoints.len().saturating_sub(1);
            self.close(last)?;
        }
        Ok(self.beats)
    }
}

fn group_into_beats(
    events: Vec<Event>,
    meter: &MeterInfo,
    tail: TailTie,
) -> NotationResult<Vec<Beat>> {
    let mut walker = BeatWalker::new(meter, tail);
    for event in events {
        walker.push(event)?;
    }
    walker.finish()
}

/// First event in a beat starts the beam, the rest continue it
fn apply_beams(beat: &mut Beat) {
    for (position, event) in beat.events.iter_mut().enumerate() {
        let state = if position == 0 {
            BeamState::Start
        } else {
            BeamState::Continue
        };
        event.set_beam(state);
    }
}

/// Beats whose durations are not binary fractions of a quarter are tuplets
fn detect_tuplet(beat: &Beat) -> NotationResult<Option<TupletRatio>> {
    let non_binary = beat
        .events
        .iter()
        .any(|e| !e.duration().denom().unsigned_abs().is_power_of_two());
    if !non_binary {
        return Ok(None);
    }

    let Some(shortest) = beat.events.iter().map(Event::duration).min() else {
        return Ok(None);
    };
    let actual = duration::div(beat.span, shortest)?.ceil().to_integer().max(1);
    let actual_notes = u32::try_from(actual).unwrap_or(u32::MAX);
    let normal_notes = 1u32 << (31 - actual_notes.leading_zeros());

    Ok(Some(TupletRatio {
        actual_notes,
        normal_notes,
    }))
}

/// Pick the measure-local factor that makes every duration integral.
///
/// `1 / shortest` when that is a whole number and clears every
/// denominator; otherwise the LCM of the denominators.
pub(crate) fn rescale_factor(durations: &[Rational]) -> NotationResult<i64> {
    let Some(shortest) = durations.iter().copied().min() else {
        return Ok(1);
    };
    if shortest >= Rational::one() {
        return Ok(1);
    }

    let inverse = shortest.recip();
    let clears_all = durations
        .iter()
        .all(|d| d.checked_mul(&inverse).map_or(false, |scaled| scaled.is_integer()));
    if inverse.is_integer() && clears_all {
        return Ok(inverse.to_integer());
    }

    let factor = durations
        .iter()
        .map(|d| d.denom().unsigned_abs())
        .try_fold(1u64, lcm)?;
    i64::try_from(factor).map_err(|_| {
        NotationError::DurationOverflow(format!("rescale factor {} exceeds 64 bits", factor))
    })
}

fn rescale_beats(beats: &mut [Beat]) -> NotationResult<u64> {
    let durations: Vec<Rational> = beats
        .iter()
        .flat_map(|b| b.events.iter().map(Event::duration))
        .collect();
    let factor = rescale_factor(&durations)?;
    if factor == 1 {
        return Ok(1);
    }

    log::debug!("Rescaling measure durations by {}", factor);
    let scale = Rational::from_integer(factor);
    for beat in beats.iter_mut() {
        beat.subdivisions = duration::mul(beat.subdivisions, scale)?;
        beat.span = duration::mul(beat.span, scale)?;
        for event in &mut beat.events {
            event.scale_duration(scale)?;
        }
    }
    Ok(factor.unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chord, Note, TieState};

    fn q(n: i64) -> Rational {
        Rational::from_integer(n)
    }

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d)
    }

    fn note(duration: Rational) -> Event {
        Event::Note(Note::new(duration, 4, 0).unwrap())
    }

    fn ts(beats: u32, beat_type: u32) -> TimeSignature {
        TimeSignature::new(beats, beat_type).unwrap()
    }

    fn assemble(beats: u32, beat_type: u32, events: Vec<Event>) -> Measure {
        assemble_measure(0, ts(beats, beat_type), events, &AssemblySettings::default()).unwrap()
    }

    fn beat_durations(measure: &Measure) -> Vec<Vec<Rational>> {
        measure
            .beats
            .iter()
            .map(|b| b.events.iter().map(Event::duration).collect())
            .collect()
    }

    #[test]
    fn test_multi_beat_event_then_padding() {
        let measure = assemble(4, 4, vec![note(q(3))]);
        assert_eq!(beat_durations(&measure), vec![vec![q(3)], vec![q(1)]]);
        assert!(measure.beats[0].multi_beat);
        assert!(!measure.beats[1].multi_beat);
        assert!(measure.beats[1].events[0].is_rest());
        assert_eq!(measure.rescale, 1);
        assert!(measure.validate());
    }

    #[test]
    fn test_quarters_fill_one_beat_each() {
        let measure = assemble(4, 4, (0..4).map(|_| note(q(1))).collect());
        assert_eq!(measure.beats.len(), 4);
        assert!(measure.beats.iter().all(|b| !b.multi_beat));
    }

    #[test]
    fn test_beat_split_ties_symmetrically() {
        // eighth, quarter, ... : the quarter crosses the first breakpoint
        let events = vec![note(r(1, 2)), note(q(1)), note(r(1, 2)), note(q(2))];
        let measure = assemble(4, 4, events);
        assert_eq!(measure.rescale, 2);
        assert_eq!(
            beat_durations(&measure),
            vec![vec![q(1), q(1)], vec![q(1), q(1)], vec![q(4)]]
        );
        assert_eq!(measure.beats[0].events[1].tie(), TieState::Start);
        assert_eq!(measure.beats[1].events[0].tie(), TieState::End);
        assert!(measure.beats[2].multi_beat);
    }

    #[test]
    fn test_beat_split_keep_tail_mode() {
        let settings = AssemblySettings {
            close_beat_ties: false,
            ..AssemblySettings::default()
        };
        let events = vec![note(r(1, 2)), note(q(1)), note(r(5, 2))];
        let measure = assemble_measure(0, ts(4, 4), events, &settings).unwrap();
        assert_eq!(measure.beats[0].events[1].tie(), TieState::Start);
        assert_eq!(measure.beats[1].events[0].tie(), TieState::None);
    }

    #[test]
    fn test_empty_beat_absorbs_whole_beats_before_split() {
        // 3.5 from the downbeat: three whole beats, then a tied half beat
        let measure = assemble(4, 4, vec![note(r(7, 2))]);
        assert_eq!(measure.rescale, 2);
        assert_eq!(measure.beats.len(), 2);
        assert!(measure.beats[0].multi_beat);
        assert_eq!(measure.beats[0].events[0].duration(), q(6));
        assert_eq!(measure.beats[0].events[0].tie(), TieState::Start);
        assert_eq!(measure.beats[1].events[0].tie(), TieState::End);
        assert!(measure.beats[1].events[1].is_rest());
        assert!(measure.validate());
    }

    #[test]
    fn test_beams_follow_beat_position() {
        let events = (0..4).map(|_| note(r(1, 2))).collect();
        let measure = assemble(2, 4, events);
        for beat in &measure.beats {
            match (&beat.events[0], &beat.events[1]) {
                (Event::Note(a), Event::Note(b)) => {
                    assert_eq!(a.beam(), BeamState::Start);
                    assert_eq!(b.beam(), BeamState::Continue);
                }
                other => panic!("expected notes, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_chord_members_share_beam() {
        let chord = Chord::new(vec![
            Note::new(r(1, 2), 4, 0).unwrap(),
            Note::new(r(1, 2), 4, 4).unwrap(),
        ])
        .unwrap();
        let measure = assemble(1, 4, vec![Event::Chord(chord), note(r(1, 2))]);
        match &measure.beats[0].events[0] {
            Event::Chord(c) => assert!(c.notes().iter().all(|n| n.beam() == BeamState::Start)),
            other => panic!("expected chord, got {:?}", other),
        }
    }

    #[test]
    fn test_rescale_by_inverse_of_shortest() {
        let events = vec![note(r(1, 4)), note(r(3, 4)), note(q(3))];
        let measure = assemble(4, 4, events);
        assert_eq!(measure.rescale, 4);
        assert_eq!(beat_durations(&measure), vec![vec![q(1), q(3)], vec![q(12)]]);
        assert_eq!(measure.beats[0].subdivisions, q(4));
        assert_eq!(measure.quarter_duration().unwrap(), q(4));
    }

    #[test]
    fn test_rescale_falls_back_to_lcm() {
        // 1/shortest = 3 leaves 3/2 fractional
        assert_eq!(rescale_factor(&[r(1, 2), r(1, 3)]).unwrap(), 6);
        assert_eq!(rescale_factor(&[r(1, 2), r(1, 3), r(1, 6)]).unwrap(), 6);
        assert_eq!(rescale_factor(&[r(2, 3), r(3, 4)]).unwrap(), 12);
        assert_eq!(rescale_factor(&[q(1), q(2)]).unwrap(), 1);
        assert_eq!(rescale_factor(&[]).unwrap(), 1);
    }

    #[test]
    fn test_rescale_disabled() {
        let settings = AssemblySettings {
            rescale_measures: false,
            ..AssemblySettings::default()
        };
        let measure =
            assemble_measure(0, ts(2, 4), vec![note(r(1, 2)); 4], &settings).unwrap();
        assert_eq!(measure.rescale, 1);
        assert_eq!(measure.beats[0].events[0].duration(), r(1, 2));
    }

    #[test]
    fn test_triplet_beat() {
        let measure = assemble(1, 4, vec![note(r(1, 3)); 3]);
        let tuplet = measure.beats[0].tuplet.unwrap();
        assert_eq!(tuplet.actual_notes, 3);
        assert_eq!(tuplet.normal_notes, 2);
        assert_eq!(measure.rescale, 3);
    }

    #[test]
    fn test_quintuplet_and_binary_beats() {
        let measure = assemble(2, 4, [vec![note(r(1, 5)); 5], vec![note(r(1, 4)); 4]].concat());
        let tuplet = measure.beats[0].tuplet.unwrap();
        assert_eq!((tuplet.actual_notes, tuplet.normal_notes), (5, 4));
        assert!(measure.beats[1].tuplet.is_none());
    }

    #[test]
    fn test_compound_beats() {
        let measure = assemble(6, 8, vec![note(r(1, 2)); 6]);
        assert_eq!(measure.beats.len(), 2);
        assert_eq!(measure.beats[0].events.len(), 3);
        assert_eq!(measure.beats[0].slot, r(3, 2));
        assert_eq!(measure.beats[0].subdivisions, q(3));
    }

    #[test]
    fn test_additive_beats() {
        let measure = assemble(5, 8, (0..5).map(|_| note(q(1))).collect());
        let sizes: Vec<usize> = measure.beats.iter().map(|b| b.events.len()).collect();
        assert_eq!(sizes, vec![3, 2]);
    }

    #[test]
    fn test_overflow_rejected() {
        let err = assemble_measure(0, ts(3, 4), vec![note(q(4))], &AssemblySettings::default())
            .unwrap_err();
        assert_eq!(
            err,
            NotationError::MeasureOverflow {
                capacity: q(3),
                actual: q(4)
            }
        );
    }

    #[test]
    fn test_coprime_denominators_overflow_cleanly() {
        let primes = [127, 113, 109, 107, 103, 101, 97, 89, 83, 79, 73];
        let events = primes.iter().map(|&p| note(r(1, p))).collect();
        let err = assemble_measure(0, ts(4, 4), events, &AssemblySettings::default())
            .unwrap_err();
        assert!(matches!(err, NotationError::DurationOverflow(_)), "{:?}", err);

        // the lcm fallback of the rescale factor is checked too
        let durations: Vec<Rational> = primes.iter().map(|&p| r(1, p)).collect();
        assert!(matches!(
            rescale_factor(&durations),
            Err(NotationError::DurationOverflow(_))
        ));
    }

    #[test]
    fn test_empty_measure_is_one_rest() {
        let measure = assemble(3, 4, Vec::new());
        assert_eq!(measure.beats.len(), 1);
        assert!(measure.beats[0].multi_beat);
        assert!(measure.beats[0].events[0].is_rest());
        assert_eq!(measure.beats[0].events[0].duration(), q(3));
    }
}
