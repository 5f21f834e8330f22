//! Score assembly entry points
//!
//! Plain Rust functions (`assemble_score_input`, `score_to_json`,
//! `score_json_from_input`) do the work; the `#[wasm_bindgen]` wrappers only
//! convert JS values and errors.

use wasm_bindgen::prelude::*;

use crate::api::helpers::{deserialize, js_error, serialize};
use crate::api::types::{PartInput, ScoreInput};
use crate::instruments;
use crate::ir::builder::ScoreBuilder;
use crate::ir::meter::{classify, MeterInfo};
use crate::ir::types::Score;
use crate::models::{AssemblySettings, NotationError, NotationResult, TimeSignature};
use crate::{wasm_info, wasm_log, wasm_warn};

/// Assemble every part of `input` and align them into one score
pub fn assemble_score_input(input: ScoreInput) -> NotationResult<Score> {
    let settings = input.settings.unwrap_or_default();
    settings.validate()?;

    let mut builder = ScoreBuilder::new().settings(settings.clone());
    if let Some(title) = input.title {
        builder = builder.title(title);
    }
    if let Some(composer) = input.composer {
        builder = builder.composer(composer);
    }
    for part in input.parts {
        builder = builder.part(part.into_score_part(&settings)?);
    }
    builder.build()
}

/// Serialize a finished score for an external encoder
pub fn score_to_json(score: &Score) -> NotationResult<String> {
    serde_json::to_string_pretty(score).map_err(|e| NotationError::Serialization(e.to_string()))
}

/// Classify `beats/beat_type`, warning on signatures outside the supported set
pub fn meter_info(beats: u32, beat_type: u32) -> NotationResult<MeterInfo> {
    TimeSignature::new(beats, beat_type)
        .and_then(classify)
        .map_err(|e| {
            wasm_warn!("Rejected time signature {}/{}: {}", beats, beat_type, e);
            e
        })
}

/// JSON in, JSON out: parse a `ScoreInput`, assemble it, serialize the score
pub fn score_json_from_input(json: &str) -> NotationResult<String> {
    let input: ScoreInput =
        serde_json::from_str(json).map_err(|e| NotationError::Serialization(e.to_string()))?;
    let score = assemble_score_input(input)?;
    score_to_json(&score)
}

// ============================================================================
// WASM bindings
// ============================================================================

/// Assemble a single part (one or more staves)
///
/// # Parameters
/// * `input` - a `PartInput` object
///
/// # Returns
/// The assembled `ScorePart`
#[wasm_bindgen(js_name = assemblePart)]
pub fn assemble_part(input: JsValue) -> Result<JsValue, JsValue> {
    wasm_info!("assemblePart called");
    let input: PartInput = deserialize(input, "Invalid part input")?;
    let part = input
        .into_score_part(&AssemblySettings::default())
        .map_err(|e| js_error("Part assembly error", e))?;
    wasm_log!(
        "  {} staves, {} measures",
        part.staves.len(),
        part.staves.first().map(|s| s.measure_count()).unwrap_or(0)
    );
    serialize(&part, "Part serialization error")
}

/// Assemble and align a full score
#[wasm_bindgen(js_name = assembleScore)]
pub fn assemble_score(input: JsValue) -> Result<JsValue, JsValue> {
    wasm_info!("assembleScore called");
    let input: ScoreInput = deserialize(input, "Invalid score input")?;
    let score = assemble_score_input(input).map_err(|e| js_error("Score assembly error", e))?;
    wasm_info!("  Score aligned to {} measures", score.measure_count());
    serialize(&score, "Score serialization error")
}

/// Same as `assembleScore` with JSON strings on both sides
#[wasm_bindgen(js_name = assembleScoreJson)]
pub fn assemble_score_json(json: &str) -> Result<String, JsValue> {
    wasm_info!("assembleScoreJson called ({} bytes)", json.len());
    let output = score_json_from_input(json).map_err(|e| js_error("Score assembly error", e))?;
    wasm_info!("  Score JSON generated: {} bytes", output.len());
    Ok(output)
}

/// Classify a time signature into its category and beat map
#[wasm_bindgen(js_name = classifyMeter)]
pub fn classify_meter(beats: u32, beat_type: u32) -> Result<JsValue, JsValue> {
    let info = meter_info(beats, beat_type).map_err(|e| js_error("Meter classification error", e))?;
    serialize(&info, "Meter serialization error")
}

/// Names of the available instrument presets
#[wasm_bindgen(js_name = instrumentPresets)]
pub fn instrument_presets() -> Result<JsValue, JsValue> {
    serialize(&instruments::preset_names(), "Preset serialization error")
}
