//! Score Aligner
//!
//! Column-aligned interchange output needs every staff of a score to have
//! the same number of measures. Shorter staves are extended with
//! fully-rested measures that copy the time signatures of the longest staff.

use crate::ir::assembler::assemble_measure;
use crate::ir::types::{Part, Score};
use crate::models::{AssemblySettings, NotationResult, TimeSignature};

/// Pad every staff of `score` to the longest staff's measure count.
///
/// Returns the number of staves that received filler measures.
pub fn align_score(score: &mut Score, settings: &AssemblySettings) -> NotationResult<usize> {
    let Some(template) = longest_staff_signatures(score) else {
        return Ok(0);
    };
    let target = template.len();

    let mut padded = 0;
    for staff in score.parts.iter_mut().flat_map(|p| p.staves.iter_mut()) {
        if pad_staff(staff, &template, settings)? > 0 {
            padded += 1;
        }
    }

    log::info!(
        "Aligned score to {} measures, padded {} staves",
        target,
        padded
    );
    Ok(padded)
}

/// Time signatures of the first staff with the most measures
fn longest_staff_signatures(score: &Score) -> Option<Vec<TimeSignature>> {
    let longest = score
        .staves()
        .fold(None::<&Part>, |best, staff| match best {
            Some(b) if b.measure_count() >= staff.measure_count() => Some(b),
            _ => Some(staff),
        })?;
    Some(longest.measures.iter().map(|m| m.time_signature).collect())
}

/// Append rest measures to `staff` until it matches `template`.
///
/// Returns how many measures were added.
pub fn pad_staff(
    staff: &mut Part,
    template: &[TimeSignature],
    settings: &AssemblySettings,
) -> NotationResult<usize> {
    let start = staff.measures.len();
    for (index, time_signature) in template.iter().enumerate().skip(start) {
        let filler = assemble_measure(index, *time_signature, Vec::new(), settings)?;
        staff.measures.push(filler);
    }

    let added = template.len().saturating_sub(start);
    if added > 0 {
        log::debug!(
            "Padded staff {:?} with {} rest measures",
            staff.name,
            added
        );
    }
    Ok(added)
}
