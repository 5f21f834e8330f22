//! Models module for notation assembly
//!
//! Value types consumed and produced by the assembly engine: events and
//! their flags, pitches, time signatures, settings and errors.

pub mod duration;
pub mod errors;
pub mod events;
pub mod notation;
pub mod pitch;
pub mod settings;
pub mod time_signature;

// Re-export commonly used types
pub use duration::{Rational, DEFAULT_MAX_DENOMINATOR};
pub use errors::{NotationError, NotationResult};
pub use events::{Chord, Event, Note, Rest, TailTie};
pub use notation::*;
pub use pitch::{AccidentalName, KeyCenter, Spelling, Step};
pub use settings::AssemblySettings;
pub use time_signature::TimeSignature;
