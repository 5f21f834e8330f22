//! Notation assembly engine
//!
//! Turns flat, time-ordered sequences of notes, rests and chords into
//! measure/beat structured scores, splitting and tying events at beat and
//! bar boundaries and aligning the staves of a score.
//!
//! ```rust
//! use notation_assembly::ir::{PartBuilder, ScoreBuilder};
//! use notation_assembly::models::{Note, Rational, TimeSignature};
//!
//! let part = PartBuilder::new(vec![TimeSignature::COMMON])
//!     .push(Note::new(Rational::from_integer(9), 4, 0).unwrap())
//!     .build()
//!     .unwrap();
//! let score = ScoreBuilder::new().staff(part).build().unwrap();
//! assert_eq!(score.measure_count(), 3);
//! ```

pub mod models;
pub mod ir;
pub mod instruments;
pub mod api;

// Re-export commonly used types
pub use models::*;
pub use ir::{Beat, Measure, Part, PartBuilder, Score, ScoreBuilder, ScorePart};
pub use instruments::InstrumentPreset;
pub use api::{score_json_from_input, score_to_json};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    if console_log::init_with_level(log::Level::Debug).is_err() {
        return;
    }

    log::info!("Notation assembly WASM module initialized");
}
