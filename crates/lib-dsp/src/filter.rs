//! Linear-phase FIR low-pass filtering.
//!
//! Filters are designed with the window method: an ideal low-pass impulse
//! response (a sinc) is truncated to an odd number of taps, tapered by a
//! window and normalized to unit DC gain. Because the taps are symmetric,
//! applying them centered on each sample introduces no phase shift.

use crate::error::{DspError, DspResult};
use crate::window::WindowType;
use std::f64::consts::PI;

/// Normalized sinc, `sin(pi x) / (pi x)`.
#[inline]
pub(crate) fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        return 1.0;
    }
    (PI * x).sin() / (PI * x)
}

/// Design a low-pass FIR filter.
///
/// # Arguments
///
/// * `num_taps` - Filter length; must be odd so the filter has a center tap
/// * `cutoff` - Cutoff as a fraction of the Nyquist frequency, in `(0, 1]`
/// * `window` - Taper applied to the truncated sinc
///
/// # Returns
///
/// Symmetric taps summing to 1.
pub fn fir_lowpass(num_taps: usize, cutoff: f64, window: WindowType) -> DspResult<Vec<f64>> {
    if num_taps == 0 || num_taps % 2 == 0 {
        return Err(DspError::InvalidConfig(format!(
            "num_taps must be odd and positive, got {}",
            num_taps
        )));
    }
    if !(cutoff > 0.0 && cutoff <= 1.0) {
        return Err(DspError::InvalidConfig(format!(
            "cutoff must be in (0, 1], got {}",
            cutoff
        )));
    }

    let center = (num_taps - 1) as f64 / 2.0;
    let taper = window.coefficients(num_taps);

    let mut taps: Vec<f64> = taper
        .iter()
        .enumerate()
        .map(|(i, w)| cutoff * sinc(cutoff * (i as f64 - center)) * w)
        .collect();

    let sum: f64 = taps.iter().sum();
    if sum.abs() < f64::EPSILON {
        return Err(DspError::NumericalInstability(
            "FIR taps sum to zero".into(),
        ));
    }
    for t in taps.iter_mut() {
        *t /= sum;
    }

    Ok(taps)
}

/// Extend a signal by `pad` samples on both ends with odd reflection.
///
/// Odd reflection (`2*x[0] - x[k]`) keeps the signal and its slope
/// continuous at the edges, which keeps filter transients small. Signals
/// shorter than `pad` reuse the far edge sample.
fn extend_odd(signal: &[f64], pad: usize) -> Vec<f64> {
    let n = signal.len();
    let first = signal[0];
    let last = signal[n - 1];

    let mut out = Vec::with_capacity(n + 2 * pad);
    for k in (1..=pad).rev() {
        out.push(2.0 * first - signal[k.min(n - 1)]);
    }
    out.extend_from_slice(signal);
    for k in 1..=pad {
        out.push(2.0 * last - signal[(n - 1).saturating_sub(k)]);
    }
    out
}

/// Apply symmetric FIR taps centered on each sample.
///
/// Output has the same length as the input and no group delay.
pub fn zero_phase_fir(signal: &[f64], taps: &[f64]) -> DspResult<Vec<f64>> {
    if taps.is_empty() || taps.len() % 2 == 0 {
        return Err(DspError::InvalidConfig(format!(
            "zero-phase filtering needs an odd number of taps, got {}",
            taps.len()
        )));
    }
    if signal.is_empty() {
        return Ok(Vec::new());
    }

    let pad = taps.len() / 2;
    let extended = extend_odd(signal, pad);

    let output = (0..signal.len())
        .map(|i| {
            extended[i..i + taps.len()]
                .iter()
                .zip(taps)
                .map(|(x, h)| x * h)
                .sum()
        })
        .collect();

    Ok(output)
}
