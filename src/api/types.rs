//! Input records for the API
//!
//! Producers (composition scripts, transcription pipelines, the browser)
//! send float durations; they are converted to bounded fractions here,
//! before anything reaches the engine.
//!
//! ```json
//! {
//!   "title": "Etude",
//!   "parts": [{
//!     "name": "Flute",
//!     "time_signatures": [{"beats": 4, "beat_type": 4}],
//!     "events": [
//!       {"type": "note", "duration": 1.5, "octave": 4, "pitch_class": 0},
//!       {"type": "rest", "duration": 0.5}
//!     ]
//!   }]
//! }
//! ```

use serde::Deserialize;

use crate::instruments;
use crate::ir::builder::PartBuilder;
use crate::ir::types::ScorePart;
use crate::models::duration;
use crate::models::{
    AssemblySettings, Chord, Clef, Event, KeyCenter, NotationError, NotationResult, Note, Rest,
    TimeSignature,
};

#[derive(Debug, Clone, Deserialize)]
pub struct NoteInput {
    pub duration: f64,
    pub octave: i32,
    pub pitch_class: i32,
    #[serde(default)]
    pub articulation: Option<String>,
}

impl NoteInput {
    fn to_note(&self, max_denominator: i64) -> NotationResult<Note> {
        let mut note = Note::new(
            duration::from_f64(self.duration, max_denominator)?,
            self.octave,
            self.pitch_class,
        )?;
        if let Some(name) = &self.articulation {
            note.add_articulation(name)?;
        }
        Ok(note)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventInput {
    Note(NoteInput),
    Rest { duration: f64 },
    Chord { notes: Vec<NoteInput> },
}

impl EventInput {
    pub fn to_event(&self, max_denominator: i64) -> NotationResult<Event> {
        Ok(match self {
            EventInput::Note(note) => Event::Note(note.to_note(max_denominator)?),
            EventInput::Rest { duration } => Event::Rest(Rest::new(duration::from_f64(
                *duration,
                max_denominator,
            )?)?),
            EventInput::Chord { notes } => {
                let notes = notes
                    .iter()
                    .map(|n| n.to_note(max_denominator))
                    .collect::<NotationResult<Vec<_>>>()?;
                Event::Chord(Chord::new(notes)?)
            }
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartInput {
    #[serde(default)]
    pub name: Option<String>,

    /// Instrument preset name; enables range clamping and keyboard staves
    #[serde(default)]
    pub instrument: Option<String>,

    pub time_signatures: Vec<TimeSignature>,

    pub events: Vec<EventInput>,

    /// Major-key tonic as a pitch class
    #[serde(default)]
    pub key: Option<u8>,

    #[serde(default)]
    pub clef: Option<String>,

    /// Overrides the score-level settings for this part
    #[serde(default)]
    pub settings: Option<AssemblySettings>,
}

impl PartInput {
    pub fn into_score_part(self, defaults: &AssemblySettings) -> NotationResult<ScorePart> {
        let settings = self.settings.unwrap_or_else(|| defaults.clone());
        settings.validate()?;

        let events = self
            .events
            .iter()
            .map(|e| e.to_event(settings.max_denominator))
            .collect::<NotationResult<Vec<_>>>()?;

        let key = self.key.map(KeyCenter::new).transpose()?.unwrap_or_default();
        let clef = self
            .clef
            .as_deref()
            .map(|c| c.parse::<Clef>().map_err(NotationError::Serialization))
            .transpose()?;

        if let Some(instrument) = &self.instrument {
            let preset = instruments::lookup(instrument)?;
            let mut part =
                preset.score_part(events, self.time_signatures, key, clef, &settings)?;
            if self.name.is_some() {
                part.name = self.name;
            }
            return Ok(part);
        }

        let mut builder = PartBuilder::new(self.time_signatures)
            .events(events)
            .key(key)
            .settings(settings);
        if let Some(clef) = clef {
            builder = builder.clef(clef);
        }
        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        Ok(ScorePart::single(builder.build()?))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub composer: Option<String>,
    pub parts: Vec<PartInput>,
    #[serde(default)]
    pub settings: Option<AssemblySettings>,
}
