//! Meter Classifier
//!
//! Turns one time signature into a division label, a meter category and a
//! beat map: the ordered beat lengths (in quarter notes) that make up a
//! measure. Classification is a pure function of the numerator; the
//! denominator is only validated.
//!
//! | numerator                  | category | beat map          |
//! |----------------------------|----------|-------------------|
//! | ≥ 5 and divisible by 3     | Compound | 3/2 × N/3         |
//! | ≤ 4                        | Simple   | 1 × N             |
//! | even                       | Simple   | 1 × N             |
//! | anything else (5, 7, 11..) | Additive | front-loaded 3s/2s |

use serde::Serialize;

use crate::models::duration::Rational;
use crate::models::{NotationError, NotationResult, TimeSignature};

/// Number of beats in the measure, when it has a conventional name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MeterDivision {
    Duple,
    Triple,
    Quadruple,
}

impl MeterDivision {
    pub fn from_beats(beats: usize) -> Option<Self> {
        match beats {
            2 => Some(MeterDivision::Duple),
            3 => Some(MeterDivision::Triple),
            4 => Some(MeterDivision::Quadruple),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MeterKind {
    Simple,
    Compound,
    Additive,
}

/// Ordered beat lengths of one measure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BeatMap {
    slots: Vec<Rational>,
}

impl BeatMap {
    pub fn new(slots: Vec<Rational>) -> Self {
        BeatMap { slots }
    }

    pub fn slots(&self) -> &[Rational] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Prefix sums of the slots; the last value is the capacity
    pub fn breakpoints(&self) -> Vec<Rational> {
        self.slots
            .iter()
            .scan(Rational::from_integer(0), |acc, slot| {
                *acc += *slot;
                Some(*acc)
            })
            .collect()
    }

    /// Total duration a measure with this map must contain
    pub fn capacity(&self) -> Rational {
        self.breakpoints()
            .last()
            .copied()
            .unwrap_or_else(|| Rational::from_integer(0))
    }
}

/// Result of classifying one time signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeterInfo {
    pub time_signature: TimeSignature,
    pub division: Option<MeterDivision>,
    pub kind: MeterKind,
    pub beat_map: BeatMap,
}

impl MeterInfo {
    pub fn capacity(&self) -> Rational {
        self.beat_map.capacity()
    }

    pub fn breakpoints(&self) -> Vec<Rational> {
        self.beat_map.breakpoints()
    }
}

/// Classify a time signature into its category and beat map
///
/// # Examples
/// ```
/// use notation_assembly::ir::meter::{classify, MeterKind};
/// use notation_assembly::models::{Rational, TimeSignature};
///
/// let info = classify(TimeSignature::new(7, 8).unwrap()).unwrap();
/// assert_eq!(info.kind, MeterKind::Additive);
/// assert_eq!(
///     info.beat_map.slots(),
///     &[Rational::from_integer(3), Rational::from_integer(2), Rational::from_integer(2)]
/// );
/// ```
pub fn classify(time_signature: TimeSignature) -> NotationResult<MeterInfo> {
    if let Err(err) = time_signature.validate() {
        log::warn!("Rejecting time signature {}: {}", time_signature, err);
        return Err(err);
    }

    let n = time_signature.beats as usize;
    let whole = |count: usize| vec![Rational::from_integer(1); count];

    let (division, kind, slots) = if n >= 5 && n % 3 == 0 {
        let beats = n / 3;
        (
            MeterDivision::from_beats(beats),
            MeterKind::Compound,
            vec![Rational::new(3, 2); beats],
        )
    } else if n <= 4 || n % 2 == 0 {
        (MeterDivision::from_beats(n), MeterKind::Simple, whole(n))
    } else {
        (None, MeterKind::Additive, front_load(time_signature, n)?)
    };

    log::debug!(
        "Classified {} as {:?} {:?} with {} beats",
        time_signature,
        kind,
        division,
        slots.len()
    );

    Ok(MeterInfo {
        time_signature,
        division,
        kind,
        beat_map: BeatMap::new(slots),
    })
}

/// Partition `total` into `total / 2` slots, handing out the units beyond
/// one per slot round-robin from the front: 5 → [3, 2], 7 → [3, 2, 2].
fn front_load(time_signature: TimeSignature, total: usize) -> NotationResult<Vec<Rational>> {
    let slot_count = total / 2;
    if slot_count == 0 {
        return Err(NotationError::invalid_meter(
            time_signature.beats,
            time_signature.beat_type,
            "too few beats for an additive partition",
        ));
    }

    let mut counts = vec![1i64; slot_count];
    for idx in 0..(total - slot_count) {
        counts[idx % slot_count] += 1;
    }

    Ok(counts.into_iter().map(Rational::from_integer).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(beats: u32, beat_type: u32) -> TimeSignature {
        TimeSignature::new(beats, beat_type).unwrap()
    }

    fn ints(values: &[i64]) -> Vec<Rational> {
        values.iter().map(|v| Rational::from_integer(*v)).collect()
    }

    #[test]
    fn test_simple_meters() {
        let info = classify(ts(4, 4)).unwrap();
        assert_eq!(info.kind, MeterKind::Simple);
        assert_eq!(info.division, Some(MeterDivision::Quadruple));
        assert_eq!(info.beat_map.slots(), ints(&[1, 1, 1, 1]).as_slice());

        let info = classify(ts(3, 4)).unwrap();
        assert_eq!(info.kind, MeterKind::Simple);
        assert_eq!(info.division, Some(MeterDivision::Triple));
        assert_eq!(info.capacity(), Rational::from_integer(3));

        let info = classify(ts(2, 2)).unwrap();
        assert_eq!(info.division, Some(MeterDivision::Duple));
    }

    #[test]
    fn test_compound_meters() {
        let info = classify(ts(6, 8)).unwrap();
        assert_eq!(info.kind, MeterKind::Compound);
        assert_eq!(info.division, Some(MeterDivision::Duple));
        assert_eq!(info.beat_map.slots(), &[Rational::new(3, 2); 2]);

        let info = classify(ts(12, 8)).unwrap();
        assert_eq!(info.division, Some(MeterDivision::Quadruple));
        assert_eq!(info.beat_map.len(), 4);
        assert_eq!(info.capacity(), Rational::from_integer(6));

        // 15/8 has five dotted beats and no conventional name
        let info = classify(ts(15, 8)).unwrap();
        assert_eq!(info.kind, MeterKind::Compound);
        assert_eq!(info.division, None);
    }

    #[test]
    fn test_even_meters_are_simple() {
        let info = classify(ts(8, 8)).unwrap();
        assert_eq!(info.kind, MeterKind::Simple);
        assert_eq!(info.division, None);
        assert_eq!(info.beat_map.len(), 8);

        let info = classify(ts(10, 4)).unwrap();
        assert_eq!(info.kind, MeterKind::Simple);
        assert_eq!(info.beat_map.len(), 10);
    }

    #[test]
    fn test_additive_meters() {
        let info = classify(ts(5, 8)).unwrap();
        assert_eq!(info.kind, MeterKind::Additive);
        assert_eq!(info.division, None);
        assert_eq!(info.beat_map.slots(), ints(&[3, 2]).as_slice());

        let info = classify(ts(7, 8)).unwrap();
        assert_eq!(info.beat_map.slots(), ints(&[3, 2, 2]).as_slice());

        let info = classify(ts(11, 8)).unwrap();
        assert_eq!(info.beat_map.slots(), ints(&[3, 2, 2, 2, 2]).as_slice());
        assert_eq!(info.capacity(), Rational::from_integer(11));
    }

    #[test]
    fn test_breakpoints() {
        let info = classify(ts(7, 8)).unwrap();
        assert_eq!(info.breakpoints(), ints(&[3, 5, 7]));

        let info = classify(ts(6, 8)).unwrap();
        assert_eq!(info.breakpoints(), vec![Rational::new(3, 2), Rational::from_integer(3)]);
    }

    #[test]
    fn test_single_beat_meter() {
        let info = classify(ts(1, 4)).unwrap();
        assert_eq!(info.kind, MeterKind::Simple);
        assert_eq!(info.division, None);
        assert_eq!(info.beat_map.slots(), ints(&[1]).as_slice());
    }

    #[test]
    fn test_invalid_meter() {
        let bad = TimeSignature { beats: 0, beat_type: 4 };
        assert!(matches!(
            classify(bad),
            Err(NotationError::InvalidMeter { .. })
        ));
        let bad = TimeSignature { beats: 3, beat_type: 0 };
        assert!(classify(bad).is_err());
    }

    #[test]
    fn test_classification_is_deterministic() {
        for beats in 1..=16 {
            assert_eq!(classify(ts(beats, 8)).unwrap(), classify(ts(beats, 8)).unwrap());
        }
    }

    #[test]
    fn test_front_load_guard() {
        assert!(front_load(ts(1, 8), 1).is_err());
    }
}
