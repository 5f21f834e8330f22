//! Duration-Factor Resolver
//!
//! Finds the smallest tick grid (ticks per quarter note) on which every
//! duration of a part, and every meter denominator it uses, lands on a whole
//! number of ticks.

use std::collections::BTreeSet;

use crate::models::duration::{limit_denominator, Rational};
use crate::models::{NotationError, NotationResult};

/// Compute GCD of two numbers
pub(crate) fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// Compute LCM of two numbers, failing when it does not fit in a `u64`
pub(crate) fn lcm(a: u64, b: u64) -> NotationResult<u64> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    (a / gcd(a, b)).checked_mul(b).ok_or_else(|| {
        NotationError::DurationOverflow(format!("grid of {} and {} exceeds 64 bits", a, b))
    })
}

/// Resolve the integer factor for a set of durations and meter denominators.
///
/// Each duration is first bounded to `max_denominator`; the factor is the
/// pairwise LCM of the resulting denominators and the meter denominators.
/// With no durations the factor is 1. Fails with `DurationOverflow` when
/// the grid does not fit in a `u64`.
///
/// # Examples
/// ```
/// use notation_assembly::ir::factor::resolve_factor;
/// use notation_assembly::models::Rational;
///
/// let durations = [Rational::new(1, 2), Rational::new(1, 3)];
/// assert_eq!(resolve_factor(durations, &[4], 128).unwrap(), 12);
/// ```
pub fn resolve_factor<I>(
    durations: I,
    meter_denominators: &[u32],
    max_denominator: i64,
) -> NotationResult<u64>
where
    I: IntoIterator<Item = Rational>,
{
    let distinct: BTreeSet<Rational> = durations.into_iter().collect();
    if distinct.is_empty() {
        return Ok(1);
    }

    let duration_denominators = distinct
        .iter()
        .map(|d| limit_denominator(*d, max_denominator).denom().unsigned_abs());
    let meter_denominators = meter_denominators.iter().map(|d| u64::from(*d));

    let factor = duration_denominators
        .chain(meter_denominators)
        .filter(|d| *d > 0)
        .try_fold(1u64, lcm)
        .map_err(|err| {
            log::warn!("No tick grid for {} distinct durations: {}", distinct.len(), err);
            err
        })?;

    log::debug!(
        "Resolved factor {} from {} distinct durations",
        factor,
        distinct.len()
    );
    Ok(factor)
}
