//! Window functions for FIR filter design.
//!
//! Windows taper the truncated ideal (sinc) impulse response of a low-pass
//! filter. Stronger tapering buys stop-band attenuation at the cost of a
//! wider transition band.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Window function types for filter design.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    /// No tapering (truncated sinc).
    Rectangular,

    /// Hann (raised cosine) window.
    Hann,

    /// Hamming window. Default for decimation filters.
    Hamming,

    /// Blackman window - deeper stop band, wider transition.
    Blackman,

    /// Kaiser-Bessel window with configurable beta parameter.
    Kaiser { beta: f64 },
}

impl Default for WindowType {
    fn default() -> Self {
        Self::Hamming
    }
}

impl WindowType {
    /// Window value at normalized position `x` in `[0, 1]`.
    fn value(&self, x: f64) -> f64 {
        match *self {
            Self::Rectangular => 1.0,
            Self::Hann => 0.5 - 0.5 * (2.0 * PI * x).cos(),
            Self::Hamming => 0.54 - 0.46 * (2.0 * PI * x).cos(),
            Self::Blackman => {
                0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
            }
            Self::Kaiser { beta } => {
                let r = 2.0 * x - 1.0;
                bessel_i0(beta * (1.0 - r * r).max(0.0).sqrt()) / bessel_i0(beta)
            }
        }
    }

    /// Symmetric window of `length` points.
    pub fn coefficients(&self, length: usize) -> Vec<f64> {
        match length {
            0 => Vec::new(),
            1 => vec![1.0],
            _ => {
                let last = (length - 1) as f64;
                (0..length).map(|i| self.value(i as f64 / last)).collect()
            }
        }
    }
}

/// Zeroth-order modified Bessel function of the first kind, I_0(x).
///
/// Polynomial approximation (Abramowitz & Stegun 9.8.1 / 9.8.2).
fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();

    if ax < 3.75 {
        let t = (x / 3.75).powi(2);
        1.0 + t * (3.5156229
            + t * (3.0899424
                + t * (1.2067492
                    + t * (0.2659732
                        + t * (0.0360768 + t * 0.0045813)))))
    } else {
        let t = 3.75 / ax;
        (ax.exp() / ax.sqrt())
            * (0.39894228
                + t * (0.01328592
                    + t * (0.00225319
                        + t * (-0.00157565
                            + t * (0.00916281
                                + t * (-0.02057706
                                    + t * (0.02635537
                                        + t * (-0.01647633 + t * 0.00392377))))))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&WindowType::Blackman).unwrap(), "\"blackman\"");

        let kaiser: WindowType = serde_json::from_str(r#"{"kaiser": {"beta": 5.0}}"#).unwrap();
        assert_eq!(kaiser, WindowType::Kaiser { beta: 5.0 });

        assert!(serde_json::from_str::<WindowType>("\"triangle\"").is_err());
    }

    #[test]
    fn test_bessel_i0() {
        assert!((bessel_i0(0.0) - 1.0).abs() < 1e-10);
        assert!((bessel_i0(1.0) - 1.266).abs() < 0.001);
        assert!((bessel_i0(-2.0) - bessel_i0(2.0)).abs() < 1e-10);
    }

    #[test]
    fn test_hamming_endpoints() {
        let w = WindowType::Hamming.coefficients(21);
        assert_eq!(w.len(), 21);
        assert!((w[0] - 0.08).abs() < 1e-12);
        assert!((w[20] - 0.08).abs() < 1e-12);
        assert!((w[10] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_lengths() {
        assert!(WindowType::Hann.coefficients(0).is_empty());
        assert_eq!(WindowType::Blackman.coefficients(1), vec![1.0]);
        assert!(WindowType::Rectangular.coefficients(7).iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_window_symmetry() {
        for window in [
            WindowType::Hann,
            WindowType::Blackman,
            WindowType::Kaiser { beta: 6.0 },
        ] {
            let w = window.coefficients(65);
            for i in 0..32 {
                assert!(
                    (w[i] - w[64 - i]).abs() < 1e-10,
                    "{:?} asymmetric at index {}",
                    window,
                    i
                );
            }
        }
    }
}
