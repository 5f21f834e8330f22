//! Part and score construction pipeline
//!
//! ```text
//! events + time signatures
//!     ↓  classify_cycle        (meter.rs)
//!     ↓  resolve_factor        (factor.rs)    → Part::divisions
//!     ↓  sequence_with_meters  (measurization.rs)
//!     ↓  assemble_open         (assembler.rs, once per measure)
//! Part
//!     ↓  align_score           (alignment.rs, once per score)
//! Score
//! ```
//!
//! Parts are built one after another; each depends only on its own events
//! and time-signature cycle, and alignment runs after the last one.

use std::collections::BTreeSet;

use crate::ir::alignment::align_score;
use crate::ir::assembler::assemble_open;
use crate::ir::factor::resolve_factor;
use crate::ir::measurization::{classify_cycle, sequence_with_meters};
use crate::ir::types::{Measure, Part, Score, ScorePart};
use crate::models::duration::Rational;
use crate::models::{AssemblySettings, Clef, Event, KeyCenter, NotationResult, TimeSignature};

/// Collects a part's inputs and metadata, then runs the assembly pipeline
#[derive(Debug, Clone)]
pub struct PartBuilder {
    events: Vec<Event>,
    time_signatures: Vec<TimeSignature>,
    key: KeyCenter,
    clef: Clef,
    name: Option<String>,
    settings: AssemblySettings,
}

impl PartBuilder {
    pub fn new(time_signatures: Vec<TimeSignature>) -> Self {
        PartBuilder {
            events: Vec::new(),
            time_signatures,
            key: KeyCenter::C,
            clef: Clef::Treble,
            name: None,
            settings: AssemblySettings::default(),
        }
    }

    pub fn events<I>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = Event>,
    {
        self.events.extend(events);
        self
    }

    pub fn push(mut self, event: impl Into<Event>) -> Self {
        self.events.push(event.into());
        self
    }

    pub fn key(mut self, key: KeyCenter) -> Self {
        self.key = key;
        self
    }

    pub fn clef(mut self, clef: Clef) -> Self {
        self.clef = clef;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn settings(mut self, settings: AssemblySettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> NotationResult<Part> {
        let PartBuilder {
            events,
            time_signatures,
            key,
            clef,
            name,
            settings,
        } = self;

        settings.validate()?;
        let meters = classify_cycle(&time_signatures)?;

        // Divisions cover the input durations and the beat-map slots in use
        let durations: BTreeSet<Rational> = events
            .iter()
            .map(Event::duration)
            .chain(meters.iter().flat_map(|m| m.beat_map.slots().iter().copied()))
            .collect();
        let denominators: Vec<u32> = time_signatures.iter().map(|ts| ts.beat_type).collect();
        let divisions = if events.is_empty() {
            1
        } else {
            resolve_factor(durations, &denominators, settings.max_denominator)?
        };

        let event_count = events.len();
        let measures = sequence_with_meters(events, &meters)?
            .into_iter()
            .map(|open| assemble_open(open, &settings))
            .collect::<NotationResult<Vec<Measure>>>()?;

        log::info!(
            "Built part {:?}: {} events into {} measures, divisions {}",
            name,
            event_count,
            measures.len(),
            divisions
        );

        Ok(Part {
            name,
            key,
            clef,
            time_signatures,
            divisions,
            measures,
        })
    }
}

impl Part {
    /// Build a part with default metadata and settings
    pub fn from_events(
        events: Vec<Event>,
        time_signatures: Vec<TimeSignature>,
    ) -> NotationResult<Part> {
        PartBuilder::new(time_signatures).events(events).build()
    }
}

/// Collects score parts and metadata, aligning staves on build
#[derive(Debug, Clone, Default)]
pub struct ScoreBuilder {
    title: Option<String>,
    composer: Option<String>,
    parts: Vec<ScorePart>,
    settings: AssemblySettings,
}

impl ScoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn composer(mut self, composer: impl Into<String>) -> Self {
        self.composer = Some(composer.into());
        self
    }

    pub fn part(mut self, part: ScorePart) -> Self {
        self.parts.push(part);
        self
    }

    /// Add a single-staff part
    pub fn staff(self, staff: Part) -> Self {
        self.part(ScorePart::single(staff))
    }

    /// Settings used for filler measures
    pub fn settings(mut self, settings: AssemblySettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> NotationResult<Score> {
        let mut score = Score {
            title: self.title,
            composer: self.composer,
            parts: self.parts,
        };
        align_score(&mut score, &self.settings)?;
        Ok(score)
    }
}

impl Score {
    /// Align `parts` into a score without title or composer
    pub fn assemble(parts: Vec<ScorePart>) -> NotationResult<Score> {
        parts
            .into_iter()
            .fold(ScoreBuilder::new(), ScoreBuilder::part)
            .build()
    }
}
