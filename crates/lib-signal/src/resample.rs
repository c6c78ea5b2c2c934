//! Sampling-rate changes for regular signals.
//!
//! Each channel is processed independently by the `lib-dsp` primitives. The
//! origin, unit, labels and annotations carry over unchanged; only the
//! sample count and sampling period change.

use crate::error::{SignalError, SignalResult};
use crate::regular::RegularSignal;
use lib_dsp::WindowType;
use lib_units::Quantity;
use ndarray::{Array2, Axis};

/// Run `f` over every channel and reassemble an `(rows, channels)` matrix.
fn map_channels<F>(signal: &RegularSignal, rows: usize, mut f: F) -> SignalResult<Array2<f64>>
where
    F: FnMut(&[f64]) -> SignalResult<Vec<f64>>,
{
    let columns = signal
        .data()
        .axis_iter(Axis(1))
        .map(|column| f(&column.to_vec()))
        .collect::<SignalResult<Vec<_>>>()?;

    for column in &columns {
        if column.len() != rows {
            return Err(SignalError::shape("resampled channel", rows, column.len()));
        }
    }
    Ok(Array2::from_shape_fn((rows, columns.len()), |(i, c)| columns[c][i]))
}

fn with_period(signal: &RegularSignal, data: Array2<f64>, period: f64) -> RegularSignal {
    RegularSignal::from_parts(
        data,
        signal.unit().clone(),
        signal.origin().clone(),
        Quantity::new(period, signal.domain_unit().clone()),
        signal.metadata().clone(),
        signal.owner(),
    )
}

/// Anti-alias filter then keep every `factor`-th sample.
///
/// The result has `floor(N / factor)` samples at `rate / factor`.
pub fn decimate(signal: &RegularSignal, factor: usize) -> SignalResult<RegularSignal> {
    decimate_with(signal, factor, WindowType::default())
}

/// [`decimate`] with an explicit anti-alias window.
pub fn decimate_with(
    signal: &RegularSignal,
    factor: usize,
    window: WindowType,
) -> SignalResult<RegularSignal> {
    if factor == 0 {
        return Err(SignalError::InvalidFactor(format!(
            "decimation factor must be at least 1, got {}",
            factor
        )));
    }
    if factor == 1 {
        return Ok(signal.clone());
    }

    let rows = signal.len() / factor;
    let data = map_channels(signal, rows, |column| {
        lib_dsp::decimate_with(column, factor, window).map_err(SignalError::from)
    })?;

    tracing::debug!(
        "Decimated {} samples by {} to {} samples",
        signal.len(),
        factor,
        rows
    );

    Ok(with_period(
        signal,
        data,
        signal.sampling_period().value * factor as f64,
    ))
}

/// Fourier-resample to exactly `sample_count` samples over the same span.
///
/// The new rate is `rate * sample_count / N`.
pub fn resample(signal: &RegularSignal, sample_count: usize) -> SignalResult<RegularSignal> {
    if sample_count == 0 {
        return Err(SignalError::InvalidFactor(
            "target sample count must be at least 1".into(),
        ));
    }
    if signal.is_empty() {
        return Err(SignalError::InvalidFactor(
            "cannot resample an empty signal".into(),
        ));
    }

    let data = map_channels(signal, sample_count, |column| {
        lib_dsp::fourier_resample(column, sample_count).map_err(SignalError::from)
    })?;
    let period = signal.sampling_period().value * signal.len() as f64 / sample_count as f64;

    tracing::debug!(
        "Resampled {} samples to {} (period {} {})",
        signal.len(),
        sample_count,
        period,
        signal.domain_unit()
    );

    Ok(with_period(signal, data, period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regular::RegularSignalBuilder;
    use lib_units::Unit;
    use std::f64::consts::PI;

    fn sine(n: usize, rate: f64, freq: f64) -> RegularSignal {
        let samples = (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / rate).sin())
            .collect();
        RegularSignalBuilder::from_samples(samples)
            .unit(Unit::millivolt())
            .sampling_rate(Quantity::hertz(rate))
            .origin(Quantity::seconds(1.0))
            .name("sine")
            .annotation("electrode", "A")
            .build()
            .unwrap()
    }

    #[test]
    fn test_decimate_rate_and_length() {
        let s = sine(100, 1000.0, 5.0);
        let out = decimate(&s, 4).unwrap();
        assert_eq!(out.len(), 25);
        assert!((out.sampling_rate().value_in(&Unit::hertz()).unwrap() - 250.0).abs() < 1e-9);
        assert_eq!(out.origin(), s.origin());
        assert_eq!(out.name(), Some("sine"));
        assert_eq!(out.metadata().annotations, s.metadata().annotations);
    }

    #[test]
    fn test_decimate_identity_and_invalid() {
        let s = sine(10, 100.0, 1.0);
        assert_eq!(decimate(&s, 1).unwrap(), s);
        assert!(matches!(decimate(&s, 0), Err(SignalError::InvalidFactor(_))));
    }

    #[test]
    fn test_decimate_multichannel() {
        let s = RegularSignal::builder(Array2::from_shape_fn((40, 3), |(_, c)| (c + 1) as f64))
            .build()
            .unwrap();
        let out = s.decimate(5).unwrap();
        assert_eq!(out.shape(), (8, 3));
        for c in 0..3 {
            assert!(out.data().column(c).iter().all(|v| (v - (c + 1) as f64).abs() < 1e-9));
        }
    }

    #[test]
    fn test_decimate_with_window() {
        let s = sine(200, 1000.0, 150.0);
        let hamming = decimate(&s, 4).unwrap();
        assert_eq!(decimate_with(&s, 4, WindowType::Hamming).unwrap(), hamming);

        let kaiser = s.decimate_with(4, WindowType::Kaiser { beta: 8.6 }).unwrap();
        assert_eq!(kaiser.shape(), hamming.shape());
        assert_eq!(kaiser.sampling_period(), hamming.sampling_period());
        assert_ne!(kaiser.data(), hamming.data());

        assert!(matches!(
            decimate_with(&s, 0, WindowType::Blackman),
            Err(SignalError::InvalidFactor(_))
        ));
    }

    #[test]
    fn test_resample_band_limited_sine() {
        let s = sine(64, 64.0, 4.0);
        let up = resample(&s, 128).unwrap();
        assert_eq!(up.len(), 128);
        assert!((up.sampling_rate().value_in(&Unit::hertz()).unwrap() - 128.0).abs() < 1e-9);
        for (i, v) in up.data().column(0).iter().enumerate() {
            let expected = (2.0 * PI * 4.0 * i as f64 / 128.0).sin();
            assert!((v - expected).abs() < 1e-9);
        }
        assert_eq!(up.duration(), s.duration());
    }

    #[test]
    fn test_resample_invalid() {
        let s = sine(8, 8.0, 1.0);
        assert!(matches!(resample(&s, 0), Err(SignalError::InvalidFactor(_))));

        let empty = s.slice(0..0).unwrap();
        assert!(matches!(resample(&empty, 4), Err(SignalError::InvalidFactor(_))));
    }
}
