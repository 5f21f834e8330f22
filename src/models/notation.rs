//! Per-note notation flags: ties, beams, articulations, plus part clefs
//!
//! All flags are plain per-instance values. A freshly built note has no tie,
//! no beam and no articulation; nothing is inherited from a shared default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::NotationError;

/// Tie state of one note fragment
///
/// A tie has an incoming side (continues a previous fragment) and an
/// outgoing side (continues into the next fragment). The four states are
/// the four combinations of those two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieState {
    #[default]
    None,
    Start,
    Continue,
    End,
}

impl TieState {
    pub fn from_sides(incoming: bool, outgoing: bool) -> Self {
        match (incoming, outgoing) {
            (false, false) => TieState::None,
            (false, true) => TieState::Start,
            (true, true) => TieState::Continue,
            (true, false) => TieState::End,
        }
    }

    /// Tied from the previous fragment
    pub fn is_incoming(&self) -> bool {
        matches!(self, TieState::Continue | TieState::End)
    }

    /// Tied into the next fragment
    pub fn is_outgoing(&self) -> bool {
        matches!(self, TieState::Start | TieState::Continue)
    }

    /// Tie state of the earlier half when a fragment is cut in two
    pub fn older_half(&self) -> Self {
        TieState::from_sides(self.is_incoming(), true)
    }

    /// Tie state of the later half when a fragment is cut in two
    pub fn newer_half(&self) -> Self {
        TieState::from_sides(true, self.is_outgoing())
    }
}

/// Beam grouping of a note within its beat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamState {
    #[default]
    None,
    Start,
    Continue,
}

/// Articulations understood by the interchange encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Articulation {
    Accent,
    BreathMark,
    Caesura,
    DetachedLegato,
    Doit,
    Falloff,
    Plop,
    Scoop,
    Spiccato,
    Staccatissimo,
    Staccato,
    Stress,
    StrongAccent,
    Tenuto,
    Unstress,
}

impl Articulation {
    pub const ALL: [Articulation; 15] = [
        Articulation::Accent,
        Articulation::BreathMark,
        Articulation::Caesura,
        Articulation::DetachedLegato,
        Articulation::Doit,
        Articulation::Falloff,
        Articulation::Plop,
        Articulation::Scoop,
        Articulation::Spiccato,
        Articulation::Staccatissimo,
        Articulation::Staccato,
        Articulation::Stress,
        Articulation::StrongAccent,
        Articulation::Tenuto,
        Articulation::Unstress,
    ];

    /// Element name used by the interchange format
    pub fn as_str(&self) -> &'static str {
        match self {
            Articulation::Accent => "accent",
            Articulation::BreathMark => "breath-mark",
            Articulation::Caesura => "caesura",
            Articulation::DetachedLegato => "detached-legato",
            Articulation::Doit => "doit",
            Articulation::Falloff => "falloff",
            Articulation::Plop => "plop",
            Articulation::Scoop => "scoop",
            Articulation::Spiccato => "spiccato",
            Articulation::Staccatissimo => "staccatissimo",
            Articulation::Staccato => "staccato",
            Articulation::Stress => "stress",
            Articulation::StrongAccent => "strong-accent",
            Articulation::Tenuto => "tenuto",
            Articulation::Unstress => "unstress",
        }
    }
}

impl fmt::Display for Articulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Articulation {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Articulation::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == wanted)
            .ok_or_else(|| NotationError::InvalidArticulation(s.to_string()))
    }
}

/// Clef of a part or staff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clef {
    #[default]
    Treble,
    Bass,
    Alto,
    Tenor,
}

impl Clef {
    /// Clef sign letter ("G", "F", "C")
    pub fn sign(&self) -> &'static str {
        match self {
            Clef::Treble => "G",
            Clef::Bass => "F",
            Clef::Alto | Clef::Tenor => "C",
        }
    }

    /// Staff line the clef is centred on
    pub fn line(&self) -> u8 {
        match self {
            Clef::Treble => 2,
            Clef::Bass => 4,
            Clef::Alto => 3,
            Clef::Tenor => 4,
        }
    }
}

impl FromStr for Clef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "treble" | "g" => Ok(Clef::Treble),
            "bass" | "f" => Ok(Clef::Bass),
            "alto" | "c" => Ok(Clef::Alto),
            "tenor" => Ok(Clef::Tenor),
            _ => Err(format!("Invalid clef: '{}'. Expected treble, bass, alto or tenor", s)),
        }
    }
}
