//! WASM API
//!
//! JavaScript-facing entry points plus the plain Rust JSON functions they
//! wrap.
//!
//! # Module Structure
//!
//! - `helpers`: console logging macros, JS (de)serialization, error conversion
//! - `types`: input records with float durations
//! - `export`: assemblePart / assembleScore / assembleScoreJson / classifyMeter

pub mod helpers;
pub mod types;
pub mod export;

pub use export::{
    assemble_part, assemble_score, assemble_score_input, assemble_score_json, classify_meter,
    instrument_presets, meter_info, score_json_from_input, score_to_json,
};
pub use types::{EventInput, NoteInput, PartInput, ScoreInput};
