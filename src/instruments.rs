//! Instrument presets
//!
//! Each preset is a small capability record (range, clef, transposition,
//! keyboard flag) looked up by name. Presets prepare event sequences before
//! assembly: notes are folded into range by octaves and keyboard
//! instruments are split across two staves at middle C.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

use crate::ir::builder::PartBuilder;
use crate::ir::types::{Part, ScorePart};
use crate::models::{
    AssemblySettings, Chord, Clef, Event, KeyCenter, NotationError, NotationResult, Note,
    Rational, Rest, TimeSignature,
};

/// Octave at which a keyboard part moves to the upper staff (middle C)
pub const KEYBOARD_SPLIT_OCTAVE: i32 = 4;

/// One end of an instrument's range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PitchBound {
    pub octave: i32,
    pub pitch_class: u8,
}

const fn bound(octave: i32, pitch_class: u8) -> PitchBound {
    PitchBound {
        octave,
        pitch_class,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstrumentPreset {
    pub name: &'static str,
    pub low: PitchBound,
    pub high: PitchBound,
    pub clef: Clef,
    /// Semitones added when writing the part (2 for B-flat instruments)
    pub transposition: i32,
    /// Split across a treble and a bass staff
    pub keyboard: bool,
}

const fn preset(
    name: &'static str,
    low: PitchBound,
    high: PitchBound,
    clef: Clef,
    transposition: i32,
) -> InstrumentPreset {
    InstrumentPreset {
        name,
        low,
        high,
        clef,
        transposition,
        keyboard: false,
    }
}

const PRESET_TABLE: [InstrumentPreset; 12] = [
    preset("flute", bound(4, 0), bound(7, 2), Clef::Treble, 0),
    preset("oboe", bound(4, 10), bound(7, 9), Clef::Treble, 0),
    preset("clarinet", bound(3, 4), bound(6, 9), Clef::Treble, 2),
    preset("bassoon", bound(1, 10), bound(5, 3), Clef::Bass, 0),
    preset("trumpet", bound(3, 6), bound(6, 0), Clef::Treble, 0),
    preset("horn", bound(2, 6), bound(6, 0), Clef::Treble, 0),
    preset("trombone", bound(2, 4), bound(5, 7), Clef::Bass, 0),
    preset("tuba", bound(0, 2), bound(4, 7), Clef::Bass, 0),
    preset("violin", bound(3, 7), bound(8, 11), Clef::Treble, 0),
    preset("viola", bound(2, 0), bound(6, 11), Clef::Alto, 0),
    preset("cello", bound(1, 0), bound(6, 4), Clef::Bass, 0),
    InstrumentPreset {
        name: "piano",
        low: bound(0, 9),
        high: bound(8, 0),
        clef: Clef::Treble,
        transposition: 0,
        keyboard: true,
    },
];

static PRESETS: Lazy<HashMap<&'static str, InstrumentPreset>> =
    Lazy::new(|| PRESET_TABLE.iter().map(|p| (p.name, *p)).collect());

/// Look up a preset by (case-insensitive) name
pub fn lookup(name: &str) -> NotationResult<InstrumentPreset> {
    let key = name.trim().to_lowercase();
    PRESETS.get(key.as_str()).copied().ok_or_else(|| {
        log::warn!("Unknown instrument preset '{}'", name);
        NotationError::UnknownInstrument(name.to_string())
    })
}

/// Preset names in score order
pub fn preset_names() -> Vec<&'static str> {
    PRESET_TABLE.iter().map(|p| p.name).collect()
}

impl InstrumentPreset {
    pub fn contains(&self, note: &Note) -> bool {
        let pitch = (note.octave(), note.pitch_class());
        pitch >= (self.low.octave, self.low.pitch_class)
            && pitch <= (self.high.octave, self.high.pitch_class)
    }

    /// Move a note by whole octaves toward the range.
    ///
    /// A note in a bound's octave but past the bound moves one octave
    /// inward; a note beyond a bound's octave is brought to that octave
    /// first.
    pub fn clamp_note(&self, note: &Note) -> Note {
        let pc = note.pitch_class();
        let mut octave = note.octave();

        if octave < self.low.octave {
            octave = self.low.octave;
        }
        if octave == self.low.octave && pc < self.low.pitch_class {
            octave += 1;
        }
        if octave > self.high.octave {
            octave = self.high.octave;
        }
        if octave == self.high.octave && pc > self.high.pitch_class {
            octave -= 1;
        }

        if octave != note.octave() {
            log::debug!(
                "{}: moved pc {} from octave {} to {}",
                self.name,
                pc,
                note.octave(),
                octave
            );
        }
        note.with_pitch(octave, pc as i32)
    }

    /// Clamp every note and chord member; rests pass through
    pub fn clamp(&self, events: Vec<Event>) -> NotationResult<Vec<Event>> {
        events
            .into_iter()
            .map(|event| {
                Ok(match event {
                    Event::Note(note) => Event::Note(self.clamp_note(&note)),
                    Event::Chord(chord) => Event::Chord(chord.map_notes(|n| self.clamp_note(n))?),
                    rest => rest,
                })
            })
            .collect()
    }

    /// Shift notes by the preset's transposition
    pub fn transpose(&self, events: Vec<Event>) -> NotationResult<Vec<Event>> {
        if self.transposition == 0 {
            return Ok(events);
        }
        let shift = |n: &Note| n.with_pitch(n.octave(), n.pitch_class() as i32 + self.transposition);
        events
            .into_iter()
            .map(|event| {
                Ok(match event {
                    Event::Note(note) => Event::Note(shift(&note)),
                    Event::Chord(chord) => Event::Chord(chord.map_notes(&shift)?),
                    rest => rest,
                })
            })
            .collect()
    }

    /// Clamp and assemble the staves for this instrument.
    ///
    /// Every staff carries `key`. Keyboard presets produce an upper (treble)
    /// and lower (bass) staff; other presets use `clef` when given, else
    /// their own clef.
    pub fn staves(
        &self,
        events: Vec<Event>,
        time_signatures: Vec<TimeSignature>,
        key: KeyCenter,
        clef: Option<Clef>,
        settings: &AssemblySettings,
    ) -> NotationResult<Vec<Part>> {
        let events = self.clamp(events)?;

        if !self.keyboard {
            let part = PartBuilder::new(time_signatures)
                .events(events)
                .key(key)
                .clef(clef.unwrap_or(self.clef))
                .name(self.name)
                .settings(settings.clone())
                .build()?;
            return Ok(vec![part]);
        }

        let (upper, lower) = split_keyboard(events)?;
        let upper = PartBuilder::new(time_signatures.clone())
            .events(upper)
            .key(key)
            .clef(Clef::Treble)
            .name(self.name)
            .settings(settings.clone())
            .build()?;
        let lower = PartBuilder::new(time_signatures)
            .events(lower)
            .key(key)
            .clef(Clef::Bass)
            .name(self.name)
            .settings(settings.clone())
            .build()?;
        Ok(vec![upper, lower])
    }

    pub fn score_part(
        &self,
        events: Vec<Event>,
        time_signatures: Vec<TimeSignature>,
        key: KeyCenter,
        clef: Option<Clef>,
        settings: &AssemblySettings,
    ) -> NotationResult<ScorePart> {
        let staves = self.staves(events, time_signatures, key, clef, settings)?;
        Ok(ScorePart::new(Some(self.name.to_string()), staves))
    }
}

/// Notes from middle C up go to the upper staff; the other staff gets a
/// rest of equal length. Rests are mirrored, chords split by member.
fn split_keyboard(events: Vec<Event>) -> NotationResult<(Vec<Event>, Vec<Event>)> {
    let mut upper = Vec::with_capacity(events.len());
    let mut lower = Vec::with_capacity(events.len());

    for event in events {
        let duration = event.duration();
        match event {
            Event::Note(note) => {
                let rest = Event::Rest(Rest::new(duration)?);
                if note.octave() >= KEYBOARD_SPLIT_OCTAVE {
                    upper.push(Event::Note(note));
                    lower.push(rest);
                } else {
                    lower.push(Event::Note(note));
                    upper.push(rest);
                }
            }
            Event::Rest(rest) => {
                upper.push(Event::Rest(rest.clone()));
                lower.push(Event::Rest(rest));
            }
            Event::Chord(chord) => {
                let (high, low): (Vec<Note>, Vec<Note>) = chord
                    .notes()
                    .iter()
                    .cloned()
                    .partition(|n| n.octave() >= KEYBOARD_SPLIT_OCTAVE);
                upper.push(staff_event(high, duration)?);
                lower.push(staff_event(low, duration)?);
            }
        }
    }

    Ok((upper, lower))
}

/// Chord members landing on one staff: a rest, a single note or a chord
fn staff_event(notes: Vec<Note>, duration: Rational) -> NotationResult<Event> {
    match notes.len() {
        0 => Ok(Event::Rest(Rest::new(duration)?)),
        1 => {
            let mut notes = notes;
            let mut note = notes.remove(0);
            note.set_chord_member(false);
            Ok(Event::Note(note))
        }
        _ => Ok(Event::Chord(Chord::new(notes)?)),
    }
}
