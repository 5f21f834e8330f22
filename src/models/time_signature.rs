//! Time signatures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::{NotationError, NotationResult};

/// A (beats, beat type) pair such as 4/4 or 7/8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats: u32,
    pub beat_type: u32,
}

impl TimeSignature {
    pub const COMMON: TimeSignature = TimeSignature {
        beats: 4,
        beat_type: 4,
    };

    /// Both numbers must be strictly positive
    pub fn new(beats: u32, beat_type: u32) -> NotationResult<Self> {
        if beats == 0 {
            return Err(NotationError::invalid_meter(
                beats,
                beat_type,
                "numerator must be positive",
            ));
        }
        if beat_type == 0 {
            return Err(NotationError::invalid_meter(
                beats,
                beat_type,
                "denominator must be positive",
            ));
        }
        Ok(TimeSignature { beats, beat_type })
    }

    /// Re-check a value that may have been deserialized without `new`
    pub fn validate(&self) -> NotationResult<()> {
        TimeSignature::new(self.beats, self.beat_type).map(|_| ())
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature::COMMON
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.beat_type)
    }
}

impl FromStr for TimeSignature {
    type Err = NotationError;

    /// Parse "6/8" style strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 {
            return Err(NotationError::invalid_meter(
                0,
                0,
                format!("expected 'beats/beat_type', got '{}'", s),
            ));
        }
        let parse = |text: &str| {
            text.trim().parse::<u32>().map_err(|_| {
                NotationError::invalid_meter(0, 0, format!("not a positive integer: '{}'", text))
            })
        };
        TimeSignature::new(parse(parts[0])?, parse(parts[1])?)
    }
}

impl TryFrom<(u32, u32)> for TimeSignature {
    type Error = NotationError;

    fn try_from((beats, beat_type): (u32, u32)) -> Result<Self, Self::Error> {
        TimeSignature::new(beats, beat_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero() {
        assert!(matches!(
            TimeSignature::new(0, 4),
            Err(NotationError::InvalidMeter { beats: 0, beat_type: 4, .. })
        ));
        assert!(TimeSignature::new(4, 0).is_err());
        assert!(TimeSignature::new(7, 8).is_ok());
    }

    #[test]
    fn test_parse_and_display() {
        let ts: TimeSignature = "6/8".parse().unwrap();
        assert_eq!(ts, TimeSignature { beats: 6, beat_type: 8 });
        assert_eq!(ts.to_string(), "6/8");
        assert!("6-8".parse::<TimeSignature>().is_err());
        assert!("x/8".parse::<TimeSignature>().is_err());
        assert!("0/8".parse::<TimeSignature>().is_err());
    }

    #[test]
    fn test_deserialized_value_can_be_validated() {
        let ts: TimeSignature = serde_json::from_str(r#"{"beats":0,"beat_type":4}"#).unwrap();
        assert!(ts.validate().is_err());
    }
}
