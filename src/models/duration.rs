//! Exact rational durations
//!
//! Durations are measured in quarter-note units and kept as exact fractions
//! so that boundary comparisons never drift across long split chains.

use num_rational::Ratio;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, Signed, Zero};

use super::errors::{NotationError, NotationResult};

/// Duration in quarter notes (1 = quarter, 1/2 = eighth, 3/2 = dotted quarter)
pub type Rational = Ratio<i64>;

/// Default bound on denominators when approximating producer durations
pub const DEFAULT_MAX_DENOMINATOR: i64 = 128;

/// Reject zero and negative durations
pub fn ensure_positive(duration: Rational) -> NotationResult<Rational> {
    if duration > Rational::zero() {
        Ok(duration)
    } else {
        Err(NotationError::Construction(format!(
            "duration must be positive, got {}",
            duration
        )))
    }
}

/// Convert a floating-point duration from an upstream producer into a
/// fraction whose denominator does not exceed `max_denominator`.
///
/// # Examples
/// ```
/// use notation_assembly::models::duration::{from_f64, Rational};
///
/// assert_eq!(from_f64(0.75, 128).unwrap(), Rational::new(3, 4));
/// assert_eq!(from_f64(1.0 / 3.0, 128).unwrap(), Rational::new(1, 3));
/// ```
pub fn from_f64(value: f64, max_denominator: i64) -> NotationResult<Rational> {
    if !value.is_finite() || value <= 0.0 {
        return Err(NotationError::Construction(format!(
            "duration must be a positive finite number, got {}",
            value
        )));
    }

    let exact = Rational::approximate_float(value).ok_or_else(|| {
        NotationError::Construction(format!("duration {} is not representable", value))
    })?;

    ensure_positive(limit_denominator(exact, max_denominator))
}

/// Closest fraction to `value` with a denominator of at most `max_denominator`
///
/// Walks the continued-fraction expansion until the next convergent would
/// exceed the bound, then picks the nearer of the last convergent and the
/// best semiconvergent.
pub fn limit_denominator(value: Rational, max_denominator: i64) -> Rational {
    let max_denominator = max_denominator.max(1);
    if *value.denom() <= max_denominator {
        return value;
    }

    let negative = value.is_negative();
    let magnitude = value.abs();

    let (mut p0, mut q0, mut p1, mut q1) = (0i64, 1i64, 1i64, 0i64);
    let (mut n, mut d) = (*magnitude.numer(), *magnitude.denom());

    loop {
        let a = n / d;
        let q2 = q0 + a * q1;
        if q2 > max_denominator {
            break;
        }
        let p2 = p0 + a * p1;
        p0 = p1;
        q0 = q1;
        p1 = p2;
        q1 = q2;
        let r = n - a * d;
        n = d;
        d = r;
        if d == 0 {
            break;
        }
    }

    let k = (max_denominator - q0) / q1;
    let lower = Rational::new(p0 + k * p1, q0 + k * q1);
    let upper = Rational::new(p1, q1);

    let best = if (upper - magnitude).abs() <= (lower - magnitude).abs() {
        upper
    } else {
        lower
    };

    if negative {
        -best
    } else {
        best
    }
}

fn overflow(a: Rational, op: &str, b: Rational) -> NotationError {
    NotationError::DurationOverflow(format!("{} {} {}", a, op, b))
}

pub fn add(a: Rational, b: Rational) -> NotationResult<Rational> {
    a.checked_add(&b).ok_or_else(|| overflow(a, "+", b))
}

pub fn sub(a: Rational, b: Rational) -> NotationResult<Rational> {
    a.checked_sub(&b).ok_or_else(|| overflow(a, "-", b))
}

pub fn mul(a: Rational, b: Rational) -> NotationResult<Rational> {
    a.checked_mul(&b).ok_or_else(|| overflow(a, "*", b))
}

pub fn div(a: Rational, b: Rational) -> NotationResult<Rational> {
    a.checked_div(&b).ok_or_else(|| overflow(a, "/", b))
}

/// Sum of a sequence of durations
///
/// Fails with `DurationOverflow` when the common denominator of the
/// partial sums no longer fits in 64 bits.
pub fn total<I>(durations: I) -> NotationResult<Rational>
where
    I: IntoIterator<Item = Rational>,
{
    durations.into_iter().try_fold(Rational::zero(), add)
}
