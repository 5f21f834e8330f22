//! Event Sequencer
//!
//! Walks a flat event sequence against a cyclic time-signature sequence and
//! cuts it into measures.
//!
//! ```text
//! events ──┐
//!          ├─► SEQUENCER ─► Vec<OpenMeasure> ─► assembler (beats, beams)
//! meters ──┘
//! ```
//!
//! Every measure except the last holds exactly its capacity. An event that
//! crosses a bar line is split into a tied head and a remainder; the
//! remainder is split again for every further bar it spans, so one event may
//! produce a start / continue / end chain over many measures.

use crate::ir::meter::{classify, MeterInfo};
use crate::models::duration::{self, Rational};
use crate::models::{Event, NotationError, NotationResult, TimeSignature};

/// A measure's worth of events, not yet grouped into beats
#[derive(Debug, Clone, PartialEq)]
pub struct OpenMeasure {
    pub index: usize,
    pub meter: MeterInfo,
    pub events: Vec<Event>,
}

impl OpenMeasure {
    pub fn filled(&self) -> NotationResult<Rational> {
        duration::total(self.events.iter().map(Event::duration))
    }
}

/// Classify every time signature of a cycle, failing on the first bad one
pub fn classify_cycle(time_signatures: &[TimeSignature]) -> NotationResult<Vec<MeterInfo>> {
    if time_signatures.is_empty() {
        log::warn!("Empty time-signature sequence");
        return Err(NotationError::invalid_meter(
            0,
            0,
            "time-signature sequence must not be empty",
        ));
    }
    time_signatures.iter().copied().map(classify).collect()
}

/// Tracks the measure being filled and the bars already closed
struct Sequencer<'a> {
    meters: &'a [MeterInfo],
    closed: Vec<OpenMeasure>,
    current: Vec<Event>,
    filled: Rational,
}

impl<'a> Sequencer<'a> {
    fn new(meters: &'a [MeterInfo]) -> Self {
        Sequencer {
            meters,
            closed: Vec::new(),
            current: Vec::new(),
            filled: Rational::from_integer(0),
        }
    }

    /// Meter of the open measure; the cycle repeats round-robin
    fn meter(&self) -> &MeterInfo {
        &self.meters[self.closed.len() % self.meters.len()]
    }

    fn space(&self) -> NotationResult<Rational> {
        duration::sub(self.meter().capacity(), self.filled)
    }

    fn close(&mut self) {
        let measure = OpenMeasure {
            index: self.closed.len(),
            meter: self.meter().clone(),
            events: std::mem::take(&mut self.current),
        };
        log::debug!(
            "Closed measure {} ({}) with {} events",
            measure.index,
            measure.meter.time_signature,
            measure.events.len()
        );
        self.closed.push(measure);
        self.filled = Rational::from_integer(0);
    }

    fn push(&mut self, event: Event) -> NotationResult<()> {
        let mut pending = event;
        loop {
            let space = self.space()?;
            let duration = pending.duration();

            if duration < space {
                self.filled = duration::add(self.filled, duration)?;
                self.current.push(pending);
                return Ok(());
            }

            if duration == space {
                self.current.push(pending);
                self.close();
                return Ok(());
            }

            // Crosses the bar line: the head fills the bar exactly
            let (head, rest) = pending.split(space)?;
            log::debug!(
                "Split {} of {} at bar line of measure {}",
                duration,
                head.kind_name(),
                self.closed.len()
            );
            self.current.push(head);
            self.close();
            pending = rest;
        }
    }

    fn finish(mut self) -> Vec<OpenMeasure> {
        if !self.current.is_empty() {
            self.close();
        }
        self.closed
    }
}

/// Cut `events` into measures following the time-signature cycle.
///
/// The final measure may be under-full; the assembler pads it with a rest.
/// An empty event sequence produces no measures.
pub fn sequence_events(
    events: Vec<Event>,
    time_signatures: &[TimeSignature],
) -> NotationResult<Vec<OpenMeasure>> {
    let meters = classify_cycle(time_signatures)?;
    sequence_with_meters(events, &meters)
}

pub(crate) fn sequence_with_meters(
    events: Vec<Event>,
    meters: &[MeterInfo],
) -> NotationResult<Vec<OpenMeasure>> {
    let mut sequencer = Sequencer::new(meters);
    for event in events {
        sequencer.push(event)?;
    }
    Ok(sequencer.finish())
}
