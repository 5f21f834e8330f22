//! Pitch classes, key centers and letter-name spelling
//!
//! Pitches are stored as (octave, pitch class) with the pitch class always in
//! 0..=11. Spelling into letter name + alteration depends on the key center
//! of the part and uses fixed lookup tables.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{NotationError, NotationResult};
use Step::*;

/// Fold an arbitrary pitch class into 0..=11, carrying whole octaves.
///
/// ```
/// use notation_assembly::models::pitch::normalize_pitch;
///
/// assert_eq!(normalize_pitch(4, 14), (5, 2));
/// assert_eq!(normalize_pitch(4, -1), (3, 11));
/// ```
pub fn normalize_pitch(octave: i32, pitch_class: i32) -> (i32, u8) {
    let carry = pitch_class.div_euclid(12);
    let pc = pitch_class.rem_euclid(12);
    (octave + carry, pc as u8)
}

/// Letter name of a spelled pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::C => "C",
            Step::D => "D",
            Step::E => "E",
            Step::F => "F",
            Step::G => "G",
            Step::A => "A",
            Step::B => "B",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Printed accidental name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccidentalName {
    Natural,
    Sharp,
    Flat,
}

/// Letter name, chromatic alteration and accidental of one pitch class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spelling {
    pub step: Step,
    /// -1 flat, 0 natural, +1 sharp
    pub alter: i8,
    pub accidental: AccidentalName,
}

impl Spelling {
    const fn natural(step: Step) -> Self {
        Spelling {
            step,
            alter: 0,
            accidental: AccidentalName::Natural,
        }
    }

    const fn sharp(step: Step) -> Self {
        Spelling {
            step,
            alter: 1,
            accidental: AccidentalName::Sharp,
        }
    }

    const fn flat(step: Step) -> Self {
        Spelling {
            step,
            alter: -1,
            accidental: AccidentalName::Flat,
        }
    }
}

/// C major: the keyless default, mixing the most common spellings
const KEYLESS_SPELLINGS: [Spelling; 12] = [
    Spelling::natural(C),
    Spelling::sharp(C),
    Spelling::natural(D),
    Spelling::flat(E),
    Spelling::natural(E),
    Spelling::natural(F),
    Spelling::sharp(F),
    Spelling::natural(G),
    Spelling::flat(A),
    Spelling::natural(A),
    Spelling::flat(B),
    Spelling::natural(B),
];

const FLAT_SPELLINGS: [Spelling; 12] = [
    Spelling::natural(C),
    Spelling::flat(D),
    Spelling::natural(D),
    Spelling::flat(E),
    Spelling::natural(E),
    Spelling::natural(F),
    Spelling::flat(G),
    Spelling::natural(G),
    Spelling::flat(A),
    Spelling::natural(A),
    Spelling::flat(B),
    Spelling::natural(B),
];

const SHARP_SPELLINGS: [Spelling; 12] = [
    Spelling::natural(C),
    Spelling::sharp(C),
    Spelling::natural(D),
    Spelling::sharp(D),
    Spelling::natural(E),
    Spelling::natural(F),
    Spelling::sharp(F),
    Spelling::natural(G),
    Spelling::sharp(G),
    Spelling::natural(A),
    Spelling::sharp(A),
    Spelling::natural(B),
];

const FLAT_KEYS: [u8; 5] = [1, 3, 5, 8, 10];

/// Major-key tonic (as a pitch class) that selects a spelling table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct KeyCenter(u8);

impl KeyCenter {
    pub const C: KeyCenter = KeyCenter(0);

    pub fn new(pitch_class: u8) -> NotationResult<Self> {
        if pitch_class < 12 {
            Ok(KeyCenter(pitch_class))
        } else {
            Err(NotationError::InvalidKey(pitch_class))
        }
    }

    pub fn pitch_class(&self) -> u8 {
        self.0
    }

    pub fn uses_flats(&self) -> bool {
        FLAT_KEYS.contains(&self.0)
    }

    /// Position on the circle of fifths (-5..=6), flat keys negative
    pub fn fifths(&self) -> i32 {
        // 7 is the inverse of 7 mod 12, so pc * 7 walks the circle
        let position = (self.0 as i32 * 7).rem_euclid(12);
        if position > 6 {
            position - 12
        } else {
            position
        }
    }

    /// Spell a pitch class (0..=11) in this key
    pub fn spell(&self, pitch_class: u8) -> Spelling {
        let table = if self.0 == 0 {
            &KEYLESS_SPELLINGS
        } else if self.uses_flats() {
            &FLAT_SPELLINGS
        } else {
            &SHARP_SPELLINGS
        };
        table[(pitch_class % 12) as usize]
    }
}

impl TryFrom<u8> for KeyCenter {
    type Error = NotationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        KeyCenter::new(value)
    }
}

impl From<KeyCenter> for u8 {
    fn from(key: KeyCenter) -> u8 {
        key.0
    }
}
