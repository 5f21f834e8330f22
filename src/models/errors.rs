//! Error types for score assembly
//!
//! Every failure is fatal for the operation in progress: nothing is retried
//! internally and no partially assembled measure is ever handed back.

use thiserror::Error;

use super::duration::Rational;

/// Top-level error type for event construction and score assembly
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotationError {
    /// An event could not be constructed (non-positive duration, empty
    /// chord, split offset outside the event)
    #[error("Invalid event construction: {0}")]
    Construction(String),

    /// Chord members disagree on duration or are not all notes
    #[error("Heterogeneous chord: {0}")]
    HeterogeneousChord(String),

    /// Time signature cannot be classified into a beat map
    #[error("Invalid meter {beats}/{beat_type}: {reason}")]
    InvalidMeter {
        beats: u32,
        beat_type: u32,
        reason: String,
    },

    /// A measure was handed more duration than its meter holds
    #[error("Measure overflow: capacity {capacity}, received {actual}")]
    MeasureOverflow { capacity: Rational, actual: Rational },

    /// Exact duration bookkeeping left the 64-bit range (sums or grids of
    /// many coprime denominators)
    #[error("Duration arithmetic overflow: {0}")]
    DurationOverflow(String),

    #[error("Unknown articulation: {0}")]
    InvalidArticulation(String),

    /// Key centers are major-key pitch classes 0..=11
    #[error("Invalid key center: {0}")]
    InvalidKey(u8),

    #[error("Unknown instrument preset: {0}")]
    UnknownInstrument(String),

    /// Settings file missing or malformed
    #[error("Settings error: {0}")]
    Settings(String),

    /// JSON input or output failed at the API boundary
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl NotationError {
    pub(crate) fn invalid_meter(beats: u32, beat_type: u32, reason: impl Into<String>) -> Self {
        NotationError::InvalidMeter {
            beats,
            beat_type,
            reason: reason.into(),
        }
    }
}

pub type NotationResult<T> = Result<T, NotationError>;
