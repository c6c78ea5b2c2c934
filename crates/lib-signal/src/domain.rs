//! Numeric helpers for domain coordinates.

use crate::error::{SignalError, SignalResult};
use std::ops::{Bound, RangeBounds};

/// Relative tolerance when comparing sampling periods between signals.
pub const PERIOD_REL_TOL: f64 = 1e-9;

/// Relative tolerance between a given period and the inverse of a given rate.
pub const PERIOD_RATE_REL_TOL: f64 = 1e-4;

/// Absolute tolerance for irregular domain value lookup.
pub const LOOKUP_ATOL: f64 = 1e-8;

/// Relative tolerance for irregular domain value lookup.
pub const LOOKUP_RTOL: f64 = 1e-5;

/// Round to the nearest integer, ties to even.
///
/// `0.5 -> 0`, `1.5 -> 2`, `2.5 -> 2`, `-2.5 -> -2`.
pub fn round_half_even(x: f64) -> f64 {
    let rounded = x.round();
    if (x - x.trunc()).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        rounded
    }
}

/// `|a - b| <= atol + rtol * |b|`.
#[inline]
pub fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= LOOKUP_ATOL + LOOKUP_RTOL * b.abs()
}

/// Equality with a relative tolerance scaled by the larger magnitude.
#[inline]
pub fn approx_equal(a: f64, b: f64, rel_tol: f64) -> bool {
    if a == b {
        return true;
    }
    (a - b).abs() <= rel_tol * a.abs().max(b.abs())
}

/// Resolve a sample range against a signal of `len` samples.
pub(crate) fn resolve_range<R: RangeBounds<usize>>(range: &R, len: usize) -> SignalResult<(usize, usize)> {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };
    if end > len {
        return Err(SignalError::IndexOutOfRange { index: end, len });
    }
    if start > end {
        return Err(SignalError::IndexOutOfRange { index: start, len: end });
    }
    Ok((start, end))
}
