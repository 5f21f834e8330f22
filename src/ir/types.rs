//! Assembled score structure
//!
//! The engine output handed to interchange encoders:
//!
//! ```text
//! Score
//! └── ScorePart (name, one or more staves)
//!     └── Part (key, clef, divisions)
//!         └── Measure (time signature, breakpoints, rescale)
//!             └── Beat (slot, multi-beat and tuplet flags)
//!                 └── Event (Note / Rest / Chord)
//! ```
//!
//! Everything here derives `Serialize`; durations are written as
//! `[numerator, denominator]` pairs.

use serde::Serialize;

use crate::ir::meter::MeterInfo;
use crate::models::duration::{self, Rational};
use crate::models::{Clef, Event, KeyCenter, NotationResult, TimeSignature};

/// Tuplet ratio: `actual_notes` in the time of `normal_notes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TupletRatio {
    pub actual_notes: u32,
    pub normal_notes: u32,
}

/// Events grouped under one beat (or several, for multi-beat events)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Beat {
    pub events: Vec<Event>,

    /// Length of the first beat-map slot this beat covers, in quarter notes
    pub slot: Rational,

    /// Duration covered by the beat, in the measure's rescaled units
    pub span: Rational,

    /// Slot length multiplied by the measure's rescale factor
    pub subdivisions: Rational,

    /// Beat absorbed one or more following beat-map slots
    pub multi_beat: bool,

    pub tuplet: Option<TupletRatio>,
}

impl Beat {
    pub fn total_duration(&self) -> NotationResult<Rational> {
        duration::total(self.events.iter().map(Event::duration))
    }

    pub fn is_tuplet(&self) -> bool {
        self.tuplet.is_some()
    }
}

/// One bar of a part
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Measure {
    /// Position in the part, starting at 0
    pub index: usize,

    pub time_signature: TimeSignature,

    pub meter: MeterInfo,

    /// Prefix sums of the beat map, in quarter notes
    pub breakpoints: Vec<Rational>,

    pub beats: Vec<Beat>,

    /// Factor the stored durations were multiplied by (1 when untouched)
    pub rescale: u64,
}

impl Measure {
    /// Capacity in quarter notes
    pub fn capacity(&self) -> Rational {
        self.meter.capacity()
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.beats.iter().flat_map(|beat| beat.events.iter())
    }

    /// Sum of the stored (rescaled) durations
    pub fn total_duration(&self) -> NotationResult<Rational> {
        duration::total(self.events().map(Event::duration))
    }

    /// Sum of durations in quarter notes, undoing the rescale
    pub fn quarter_duration(&self) -> NotationResult<Rational> {
        duration::div(self.total_duration()?, Rational::from_integer(self.rescale as i64))
    }

    /// A measure is consistent when its events exactly fill its capacity
    pub fn validate(&self) -> bool {
        matches!(self.quarter_duration(), Ok(d) if d == self.capacity())
    }
}

/// One staff of assembled measures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part {
    pub name: Option<String>,
    pub key: KeyCenter,
    pub clef: Clef,

    /// Time-signature cycle the part was built from
    pub time_signatures: Vec<TimeSignature>,

    /// Ticks per quarter note on which every input duration is integral
    pub divisions: u64,

    pub measures: Vec<Measure>,
}

impl Part {
    pub fn measure_count(&self) -> usize {
        self.measures.len()
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.measures.iter().flat_map(|m| m.events())
    }

    /// Total duration in quarter notes across all measures
    pub fn quarter_duration(&self) -> NotationResult<Rational> {
        self.measures
            .iter()
            .try_fold(Rational::from_integer(0), |acc, m| {
                duration::add(acc, m.quarter_duration()?)
            })
    }
}

/// A named instrument part made of one or more staves
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScorePart {
    pub name: Option<String>,
    pub staves: Vec<Part>,
}

impl ScorePart {
    pub fn new(name: Option<String>, staves: Vec<Part>) -> Self {
        ScorePart { name, staves }
    }

    /// Single-staff part named after the staff
    pub fn single(part: Part) -> Self {
        ScorePart {
            name: part.name.clone(),
            staves: vec![part],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Score {
    pub title: Option<String>,
    pub composer: Option<String>,
    pub parts: Vec<ScorePart>,
}

impl Score {
    pub fn staves(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().flat_map(|p| p.staves.iter())
    }

    /// Measure count shared by every staff (0 for an empty score)
    pub fn measure_count(&self) -> usize {
        self.staves().map(Part::measure_count).max().unwrap_or(0)
    }
}
