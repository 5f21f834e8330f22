//! Assembly engine
//!
//! Converts flat event sequences into measure/beat trees and aligns the
//! staves of a score.
//!
//! # Architecture
//!
//! ```text
//! Vec<Event> + Vec<TimeSignature>
//!     ↓
//! Meter Classifier + Duration-Factor Resolver (parameters)
//!     ↓
//! Event Sequencer (bar lines, ties)
//!     ↓
//! Measure Assembler (beats, beams, tuplets, rescale)
//!     ↓
//! Score Aligner (equal measure counts)
//!     ↓
//! Score → external encoder
//! ```
//!
//! # Modules
//!
//! - **meter**: time signature → beat map
//! - **factor**: part-wide division grid
//! - **measurization**: events → open measures
//! - **assembler**: open measure → beats
//! - **alignment**: pad staves to equal length
//! - **types**: Beat, Measure, Part, Score
//! - **builder**: PartBuilder / ScoreBuilder pipeline
//!
//! # Usage
//!
//! ```rust
//! use notation_assembly::ir::PartBuilder;
//! use notation_assembly::models::{Event, Note, Rational, TimeSignature};
//!
//! let note = Note::new(Rational::from_integer(5), 4, 0).unwrap();
//! let part = PartBuilder::new(vec![TimeSignature::COMMON])
//!     .push(Event::Note(note))
//!     .build()
//!     .unwrap();
//! assert_eq!(part.measures.len(), 2);
//! ```

pub mod alignment;
pub mod assembler;
pub mod builder;
pub mod factor;
pub mod measurization;
pub mod meter;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{Beat, Measure, Part, Score, ScorePart, TupletRatio};

pub use meter::{classify, BeatMap, MeterDivision, MeterInfo, MeterKind};

pub use builder::{PartBuilder, ScoreBuilder};

pub use alignment::{align_score, pad_staff};
pub use assembler::assemble_measure;
pub use factor::resolve_factor;
pub use measurization::{sequence_events, OpenMeasure};
