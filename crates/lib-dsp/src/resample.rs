//! Decimation and fixed-count resampling of uniformly sampled data.
//!
//! Both primitives work on a single channel of raw samples. Sampling
//! metadata (origin, period, units) is the caller's concern.
//!
//! - [`decimate`] low-pass filters with a linear-phase FIR before keeping
//!   every `factor`-th sample, so content above the new Nyquist limit does
//!   not alias.
//! - [`fourier_resample`] truncates or zero-pads the spectrum to produce
//!   exactly the requested number of samples over the same span. The
//!   signal is treated as periodic.

use crate::error::{DspError, DspResult};
use crate::fft::FftEngine;
use crate::filter::{fir_lowpass, zero_phase_fir};
use crate::window::WindowType;
use num_complex::Complex64;

/// Taps per unit of decimation factor (filter order `20 * factor`).
const TAPS_PER_FACTOR: usize = 20;

/// Low-pass filter and downsample by an integer factor.
///
/// # Arguments
///
/// * `signal` - Input samples
/// * `factor` - Downsampling factor, at least 1
///
/// # Returns
///
/// `floor(len / factor)` samples taken at indices `0, factor, 2*factor, ...`
/// of the filtered signal.
pub fn decimate(signal: &[f64], factor: usize) -> DspResult<Vec<f64>> {
    decimate_with(signal, factor, WindowType::Hamming)
}

/// [`decimate`] with the anti-alias filter built on `window`.
pub fn decimate_with(signal: &[f64], factor: usize, window: WindowType) -> DspResult<Vec<f64>> {
    if factor == 0 {
        return Err(DspError::InvalidFactor(
            "decimation factor must be at least 1".into(),
        ));
    }
    if factor == 1 {
        return Ok(signal.to_vec());
    }

    let out_len = signal.len() / factor;
    if out_len == 0 {
        return Ok(Vec::new());
    }

    let taps = fir_lowpass(
        TAPS_PER_FACTOR * factor + 1,
        1.0 / factor as f64,
        window,
    )?;
    let filtered = zero_phase_fir(signal, &taps)?;

    tracing::trace!(
        "Decimating {} samples by {} with {} taps ({:?} window)",
        signal.len(),
        factor,
        taps.len(),
        window
    );

    Ok(filtered.into_iter().step_by(factor).take(out_len).collect())
}

/// Resample to exactly `num` samples using the Fourier method.
///
/// # Arguments
///
/// * `signal` - Input samples (at least one)
/// * `num` - Number of output samples (at least one)
///
/// # Notes
///
/// - Down-sampling discards spectral content above the new Nyquist limit
/// - When the retained band ends on an even-length Nyquist bin, that bin is
///   split (up-sampling) or folded (down-sampling) so energy is preserved
/// - Output is scaled by `num / len` to keep amplitudes unchanged
pub fn fourier_resample(signal: &[f64], num: usize) -> DspResult<Vec<f64>> {
    if signal.is_empty() {
        return Err(DspError::InsufficientData { needed: 1, got: 0 });
    }
    if num == 0 {
        return Err(DspError::InvalidFactor(
            "target sample count must be at least 1".into(),
        ));
    }

    let n = signal.len();
    if num == n {
        return Ok(signal.to_vec());
    }

    let mut engine = FftEngine::new();
    let spectrum = engine.rfft(signal)?;

    let mut resized = vec![Complex64::new(0.0, 0.0); num / 2 + 1];
    let m = n.min(num);
    let keep = m / 2 + 1;
    resized[..keep].copy_from_slice(&spectrum[..keep]);

    if m % 2 == 0 {
        if num < n {
            resized[m / 2] *= 2.0;
        } else {
            resized[m / 2] *= 0.5;
        }
    }

    let mut out = engine.irfft(&resized, num)?;
    let scale = num as f64 / n as f64;
    for v in out.iter_mut() {
        *v *= scale;
    }

    Ok(out)
}
