//! Events: notes, rests and chords
//!
//! Events are values. The engine never edits an event in place while
//! packing; splitting consumes an event and returns two new ones whose
//! durations sum to the original.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use super::duration::{self, Rational, DEFAULT_MAX_DENOMINATOR};
use super::errors::{NotationError, NotationResult};
use super::notation::{Articulation, BeamState, TieState};
use super::pitch::{normalize_pitch, KeyCenter, Spelling};

/// How the later half of a split is tied back to the earlier half
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailTie {
    /// Later half gains an incoming tie (start → end, start → continue → end)
    Close,
    /// Later half keeps the tie flags of the event before the split
    Keep,
}

fn check_split_point(duration: Rational, older: Rational) -> NotationResult<()> {
    if older <= Rational::from_integer(0) || older >= duration {
        return Err(NotationError::Construction(format!(
            "split point {} must lie strictly inside duration {}",
            older, duration
        )));
    }
    Ok(())
}

/// A single pitched note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    duration: Rational,
    octave: i32,
    pitch_class: u8,
    tie: TieState,
    beam: BeamState,
    articulation: Option<Articulation>,
    chord_member: bool,
}

impl Note {
    /// Build a note; the pitch class may lie outside 0..=11 and is folded
    /// into range with the octave adjusted.
    pub fn new(duration: Rational, octave: i32, pitch_class: i32) -> NotationResult<Self> {
        let duration = duration::ensure_positive(duration)?;
        let (octave, pitch_class) = normalize_pitch(octave, pitch_class);
        Ok(Note {
            duration,
            octave,
            pitch_class,
            tie: TieState::None,
            beam: BeamState::None,
            articulation: None,
            chord_member: false,
        })
    }

    /// Build a note from a float duration (bounded to 1/128 resolution)
    pub fn from_f64(duration: f64, octave: i32, pitch_class: i32) -> NotationResult<Self> {
        Note::new(
            duration::from_f64(duration, DEFAULT_MAX_DENOMINATOR)?,
            octave,
            pitch_class,
        )
    }

    pub fn duration(&self) -> Rational {
        self.duration
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn pitch_class(&self) -> u8 {
        self.pitch_class
    }

    pub fn tie(&self) -> TieState {
        self.tie
    }

    pub fn beam(&self) -> BeamState {
        self.beam
    }

    pub fn articulation(&self) -> Option<Articulation> {
        self.articulation
    }

    pub fn is_chord_member(&self) -> bool {
        self.chord_member
    }

    /// MIDI note number with C4 = 60
    pub fn midi_number(&self) -> i32 {
        (self.octave + 1) * 12 + self.pitch_class as i32
    }

    pub fn spelling(&self, key: KeyCenter) -> Spelling {
        key.spell(self.pitch_class)
    }

    /// Order by pitch only: octave first, then pitch class
    pub fn pitch_cmp(&self, other: &Note) -> Ordering {
        (self.octave, self.pitch_class).cmp(&(other.octave, other.pitch_class))
    }

    pub fn with_articulation(mut self, articulation: Articulation) -> Self {
        self.articulation = Some(articulation);
        self
    }

    /// Attach an articulation by its interchange name ("accent", "staccato", ...)
    pub fn add_articulation(&mut self, name: &str) -> NotationResult<()> {
        self.articulation = Some(name.parse()?);
        Ok(())
    }

    /// Mark the note as part of a tie chain. Continuation fragments do not
    /// re-articulate, so an incoming tie clears the articulation.
    pub fn set_tie(&mut self, tie: TieState) {
        self.tie = tie;
        if tie.is_incoming() {
            self.articulation = None;
        }
    }

    /// Same pitch and flags, new octave/pitch class (folded into range)
    pub fn with_pitch(&self, octave: i32, pitch_class: i32) -> Note {
        let (octave, pitch_class) = normalize_pitch(octave, pitch_class);
        Note {
            octave,
            pitch_class,
            ..self.clone()
        }
    }

    /// Cut the note at `older` quarters from its start, closing the tie on
    /// the later half.
    pub fn split(self, older: Rational) -> NotationResult<(Note, Note)> {
        self.split_with(older, TailTie::Close)
    }

    pub fn split_with(self, older: Rational, tail: TailTie) -> NotationResult<(Note, Note)> {
        check_split_point(self.duration, older)?;

        let mut head = self.clone();
        head.duration = older;
        head.tie = self.tie.older_half();

        let mut rest = self;
        rest.duration = duration::sub(rest.duration, older)?;
        if tail == TailTie::Close {
            let tie = rest.tie.newer_half();
            rest.set_tie(tie);
        }

        Ok((head, rest))
    }

    pub(crate) fn set_beam(&mut self, beam: BeamState) {
        self.beam = beam;
    }

    pub(crate) fn set_chord_member(&mut self, member: bool) {
        self.chord_member = member;
    }

    pub(crate) fn scale_duration(&mut self, factor: Rational) -> NotationResult<()> {
        self.duration = duration::mul(self.duration, factor)?;
        Ok(())
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Duration: {}, Octave: {}, Pitch Class: {}",
            self.duration, self.octave, self.pitch_class
        )
    }
}

/// A silence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rest {
    duration: Rational,
}

impl Rest {
    pub fn new(duration: Rational) -> NotationResult<Self> {
        Ok(Rest {
            duration: duration::ensure_positive(duration)?,
        })
    }

    pub fn from_f64(duration: f64) -> NotationResult<Self> {
        Rest::new(duration::from_f64(duration, DEFAULT_MAX_DENOMINATOR)?)
    }

    pub fn duration(&self) -> Rational {
        self.duration
    }

    /// Rests carry no tie, both halves are plain rests
    pub fn split(self, older: Rational) -> NotationResult<(Rest, Rest)> {
        check_split_point(self.duration, older)?;
        Ok((
            Rest { duration: older },
            Rest {
                duration: duration::sub(self.duration, older)?,
            },
        ))
    }

    pub(crate) fn scale_duration(&mut self, factor: Rational) -> NotationResult<()> {
        self.duration = duration::mul(self.duration, factor)?;
        Ok(())
    }
}

/// Simultaneous notes sharing one duration, sorted from lowest to highest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chord {
    notes: Vec<Note>,
}

impl Chord {
    pub fn new(notes: Vec<Note>) -> NotationResult<Self> {
        let first = notes.first().ok_or_else(|| {
            NotationError::Construction("chord needs at least one note".to_string())
        })?;

        let duration = first.duration();
        if let Some(odd) = notes.iter().find(|n| n.duration() != duration) {
            return Err(NotationError::HeterogeneousChord(format!(
                "all durations must be equal, found {} and {}",
                duration,
                odd.duration()
            )));
        }

        let mut notes = notes;
        notes.sort_by(|a, b| a.pitch_cmp(b));
        for (idx, note) in notes.iter_mut().enumerate() {
            note.set_chord_member(idx > 0);
        }

        log::debug!("Built chord of {} notes, duration {}", notes.len(), duration);
        Ok(Chord { notes })
    }

    /// Build a chord from generic events; every member must be a note
    pub fn from_events(events: Vec<Event>) -> NotationResult<Self> {
        let notes = events
            .into_iter()
            .map(|event| match event {
                Event::Note(note) => Ok(note),
                other => Err(NotationError::HeterogeneousChord(format!(
                    "chord members must be notes, found {}",
                    other.kind_name()
                ))),
            })
            .collect::<NotationResult<Vec<_>>>()?;
        Chord::new(notes)
    }

    pub fn duration(&self) -> Rational {
        self.notes[0].duration()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn tie(&self) -> TieState {
        self.notes[0].tie()
    }

    pub fn set_tie(&mut self, tie: TieState) {
        for note in &mut self.notes {
            note.set_tie(tie);
        }
    }

    /// Every member is cut at the same point, pitches untouched
    pub fn split(self, older: Rational) -> NotationResult<(Chord, Chord)> {
        self.split_with(older, TailTie::Close)
    }

    pub fn split_with(self, older: Rational, tail: TailTie) -> NotationResult<(Chord, Chord)> {
        check_split_point(self.duration(), older)?;

        let mut heads = Vec::with_capacity(self.notes.len());
        let mut tails = Vec::with_capacity(self.notes.len());
        for note in self.notes {
            let (head, rest) = note.split_with(older, tail)?;
            heads.push(head);
            tails.push(rest);
        }

        Ok((Chord { notes: heads }, Chord { notes: tails }))
    }

    /// Rebuild with new member pitches, re-sorting and re-flagging members
    pub(crate) fn map_notes<F>(&self, f: F) -> NotationResult<Chord>
    where
        F: FnMut(&Note) -> Note,
    {
        Chord::new(self.notes.iter().map(f).collect())
    }

    pub(crate) fn set_beam(&mut self, beam: BeamState) {
        for note in &mut self.notes {
            note.set_beam(beam);
        }
    }

    pub(crate) fn scale_duration(&mut self, factor: Rational) -> NotationResult<()> {
        for note in &mut self.notes {
            note.scale_duration(factor)?;
        }
        Ok(())
    }
}

/// Any duration-bearing unit placed in a score
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Note(Note),
    Rest(Rest),
    Chord(Chord),
}

impl Event {
    pub fn duration(&self) -> Rational {
        match self {
            Event::Note(note) => note.duration(),
            Event::Rest(rest) => rest.duration(),
            Event::Chord(chord) => chord.duration(),
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Event::Rest(_))
    }

    /// Tie state; rests are never tied
    pub fn tie(&self) -> TieState {
        match self {
            Event::Note(note) => note.tie(),
            Event::Rest(_) => TieState::None,
            Event::Chord(chord) => chord.tie(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Event::Note(_) => "note",
            Event::Rest(_) => "rest",
            Event::Chord(_) => "chord",
        }
    }

    pub fn split(self, older: Rational) -> NotationResult<(Event, Event)> {
        self.split_with(older, TailTie::Close)
    }

    pub fn split_with(self, older: Rational, tail: TailTie) -> NotationResult<(Event, Event)> {
        Ok(match self {
            Event::Note(note) => {
                let (a, b) = note.split_with(older, tail)?;
                (Event::Note(a), Event::Note(b))
            }
            Event::Rest(rest) => {
                let (a, b) = rest.split(older)?;
                (Event::Rest(a), Event::Rest(b))
            }
            Event::Chord(chord) => {
                let (a, b) = chord.split_with(older, tail)?;
                (Event::Chord(a), Event::Chord(b))
            }
        })
    }

    pub(crate) fn set_beam(&mut self, beam: BeamState) {
        match self {
            Event::Note(note) => note.set_beam(beam),
            Event::Rest(_) => {}
            Event::Chord(chord) => chord.set_beam(beam),
        }
    }

    pub(crate) fn scale_duration(&mut self, factor: Rational) -> NotationResult<()> {
        match self {
            Event::Note(note) => note.scale_duration(factor),
            Event::Rest(rest) => rest.scale_duration(factor),
            Event::Chord(chord) => chord.scale_duration(factor),
        }
    }
}

impl From<Note> for Event {
    fn from(note: Note) -> Self {
        Event::Note(note)
    }
}

impl From<Rest> for Event {
    fn from(rest: Rest) -> Self {
        Event::Rest(rest)
    }
}

impl From<Chord> for Event {
    fn from(chord: Chord) -> Self {
        Event::Chord(chord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d)
    }

    fn note(duration: i64, octave: i32, pc: i32) -> Note {
        Note::new(Rational::from_integer(duration), octave, pc).unwrap()
    }

    #[test]
    fn test_note_construction() {
        let n = note(10, 8, 2);
        assert_eq!(n.duration(), Rational::from_integer(10));
        assert_eq!(n.octave(), 8);
        assert_eq!(n.pitch_class(), 2);
        assert_eq!(n.tie(), TieState::None);
        assert_eq!(n.beam(), BeamState::None);
        assert!(!n.is_chord_member());
    }

    #[test]
    fn test_note_rejects_non_positive_duration() {
        assert!(matches!(
            Note::new(Rational::from_integer(0), 4, 0),
            Err(NotationError::Construction(_))
        ));
        assert!(Note::from_f64(-1.0, 4, 0).is_err());
        assert!(Rest::new(r(-1, 4)).is_err());
    }

    #[test]
    fn test_note_pitch_overflow_is_folded() {
        let n = note(1, 4, 14);
        assert_eq!((n.octave(), n.pitch_class()), (5, 2));
        let n = note(1, 4, -3);
        assert_eq!((n.octave(), n.pitch_class()), (3, 9));
    }

    #[test]
    fn test_fresh_notes_do_not_share_flags() {
        let mut a = note(1, 4, 0);
        a.set_tie(TieState::Start);
        let b = note(1, 4, 0);
        assert_eq!(b.tie(), TieState::None);
    }

    #[test]
    fn test_note_equality_and_pitch_order() {
        let a = note(1, 2, 3);
        let b = note(1, 2, 3);
        let c = note(9, 8, 7);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.pitch_cmp(&c), Ordering::Less);
        assert_eq!(note(1, 4, 1).pitch_cmp(&note(4, 4, 0)), Ordering::Greater);
    }

    #[test]
    fn test_midi_number() {
        assert_eq!(note(1, 4, 0).midi_number(), 60);
        assert_eq!(note(1, 4, 9).midi_number(), 69);
    }

    #[test]
    fn test_articulations_and_ties() {
        let mut n = note(4, 4, 0);
        n.add_articulation("accent").unwrap();
        n.set_tie(TieState::Start);
        assert_eq!(n.tie(), TieState::Start);
        assert_eq!(n.articulation(), Some(Articulation::Accent));

        let mut n = note(4, 4, 0).with_articulation(Articulation::Accent);
        n.set_tie(TieState::End);
        assert_eq!(n.articulation(), None);

        let mut n = note(4, 4, 0);
        assert!(n.add_articulation("slur").is_err());
    }

    #[test]
    fn test_note_split() {
        let (old, new) = note(8, 4, 0).split(Rational::from_integer(5)).unwrap();
        assert_eq!(old.duration(), Rational::from_integer(5));
        assert_eq!(new.duration(), Rational::from_integer(3));
        assert_eq!((old.octave(), old.pitch_class()), (4, 0));
        assert_eq!((new.octave(), new.pitch_class()), (4, 0));
        assert_eq!(old.tie(), TieState::Start);
        assert_eq!(new.tie(), TieState::End);
    }

    #[test]
    fn test_split_keeps_articulation_on_head_only() {
        let n = note(2, 4, 0).with_articulation(Articulation::Staccato);
        let (old, new) = n.split(Rational::from_integer(1)).unwrap();
        assert_eq!(old.articulation(), Some(Articulation::Staccato));
        assert_eq!(new.articulation(), None);
    }

    #[test]
    fn test_split_keep_tail_leaves_tail_untouched() {
        let n = note(2, 4, 0);
        let (old, new) = n.split_with(Rational::from_integer(1), TailTie::Keep).unwrap();
        assert_eq!(old.tie(), TieState::Start);
        assert_eq!(new.tie(), TieState::None);
    }

    #[test]
    fn test_split_rejects_outside_points() {
        assert!(note(2, 4, 0).split(Rational::from_integer(2)).is_err());
        assert!(note(2, 4, 0).split(Rational::from_integer(0)).is_err());
        assert!(Rest::new(r(1, 2)).unwrap().split(r(3, 4)).is_err());
    }

    #[test]
    fn test_rest_split_has_no_tie() {
        let (a, b) = Event::from(Rest::new(r(3, 2)).unwrap())
            .split(r(1, 2))
            .unwrap();
        assert_eq!(a.duration(), r(1, 2));
        assert_eq!(b.duration(), Rational::from_integer(1));
        assert_eq!(a.tie(), TieState::None);
        assert_eq!(b.tie(), TieState::None);
    }

    #[test]
    fn test_chord_sorts_and_flags_members() {
        let chord = Chord::new(vec![note(4, 4, 4), note(4, 4, 2), note(4, 4, 0)]).unwrap();
        let pcs: Vec<u8> = chord.notes().iter().map(|n| n.pitch_class()).collect();
        assert_eq!(pcs, vec![0, 2, 4]);
        assert!(!chord.notes()[0].is_chord_member());
        assert!(chord.notes()[1].is_chord_member());
        assert!(chord.notes()[2].is_chord_member());
        assert_eq!(chord.duration(), Rational::from_integer(4));
    }

    #[test]
    fn test_chord_octave_sorting() {
        let chord = Chord::new(vec![note(4, 5, 0), note(4, 4, 0)]).unwrap();
        assert_eq!(chord.notes()[0].octave(), 4);
        assert_eq!(chord.notes()[1].octave(), 5);
        assert!(chord.notes()[1].is_chord_member());
    }

    #[test]
    fn test_chord_rejects_mixed_durations() {
        let err = Chord::new(vec![note(4, 4, 0), note(2, 4, 2)]).unwrap_err();
        assert!(matches!(err, NotationError::HeterogeneousChord(_)));
    }

    #[test]
    fn test_chord_rejects_rests() {
        let events = vec![
            Event::from(Rest::new(Rational::from_integer(4)).unwrap()),
            Event::from(note(4, 4, 0)),
        ];
        let err = Chord::from_events(events).unwrap_err();
        assert!(matches!(err, NotationError::HeterogeneousChord(_)));
    }

    #[test]
    fn test_empty_chord_is_construction_error() {
        assert!(matches!(
            Chord::new(vec![]),
            Err(NotationError::Construction(_))
        ));
    }

    #[test]
    fn test_chord_split_ties_every_member() {
        let chord = Chord::new(vec![note(8, 4, 0), note(8, 4, 4), note(8, 4, 7)]).unwrap();
        let (old, new) = chord.split(Rational::from_integer(5)).unwrap();
        assert_eq!(old.duration(), Rational::from_integer(5));
        assert_eq!(new.duration(), Rational::from_integer(3));
        assert!(old.notes().iter().all(|n| n.tie() == TieState::Start));
        assert!(new.notes().iter().all(|n| n.tie() == TieState::End));
        let pcs: Vec<u8> = new.notes().iter().map(|n| n.pitch_class()).collect();
        assert_eq!(pcs, vec![0, 4, 7]);
        assert!(new.notes()[1].is_chord_member());
    }
}
