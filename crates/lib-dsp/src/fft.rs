//! Real-input FFT operations using realfft.
//!
//! This module provides a wrapper around realfft with:
//! - Planner caching for repeated transforms
//! - Arbitrary (not only power-of-two) transform lengths
//! - Normalized inverse transforms

use crate::error::{DspError, DspResult};
use num_complex::Complex64;
use realfft::RealFftPlanner;

/// FFT engine with a cached real-FFT planner.
pub struct FftEngine {
    real_planner: RealFftPlanner<f64>,
}

impl FftEngine {
    /// Create a new FFT engine.
    pub fn new() -> Self {
        Self {
            real_planner: RealFftPlanner::new(),
        }
    }

    /// Perform forward real-to-complex FFT.
    ///
    /// Input: N real samples
    /// Output: N/2 + 1 complex samples (Hermitian symmetry exploited)
    pub fn rfft(&mut self, data: &[f64]) -> DspResult<Vec<Complex64>> {
        let len = data.len();
        if len == 0 {
            return Err(DspError::InsufficientData { needed: 1, got: 0 });
        }

        let r2c = self.real_planner.plan_fft_forward(len);
        let mut input = data.to_vec();
        let mut output = r2c.make_output_vec();

        r2c.process(&mut input, &mut output)
            .map_err(|e| DspError::NumericalInstability(e.to_string()))?;

        Ok(output)
    }

    /// Perform inverse complex-to-real FFT.
    ///
    /// Input: N/2 + 1 complex samples
    /// Output: N real samples, scaled by 1/N
    ///
    /// The imaginary parts of the DC bin (and of the Nyquist bin for even
    /// N) are ignored.
    pub fn irfft(&mut self, data: &[Complex64], output_len: usize) -> DspResult<Vec<f64>> {
        if output_len == 0 {
            return Err(DspError::InsufficientData { needed: 1, got: 0 });
        }

        let expected_input_len = output_len / 2 + 1;
        if data.len() != expected_input_len {
            return Err(DspError::LengthMismatch {
                expected: expected_input_len,
                actual: data.len(),
            });
        }

        let c2r = self.real_planner.plan_fft_inverse(output_len);
        let mut input = data.to_vec();
        input[0].im = 0.0;
        if output_len % 2 == 0 {
            input[expected_input_len - 1].im = 0.0;
        }
        let mut output = c2r.make_output_vec();

        c2r.process(&mut input, &mut output)
            .map_err(|e| DspError::NumericalInstability(e.to_string()))?;

        // Normalize
        let scale = 1.0 / output_len as f64;
        for x in output.iter_mut() {
            *x *= scale;
        }

        Ok(output)
    }
}

impl Default for FftEngine {
    fn default() -> Self {
        Self::new()
    }
}
