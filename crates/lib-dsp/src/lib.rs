//! # lib-dsp
//!
//! Numeric backend primitives for the sampled-signal containers.
//!
//! This crate provides the black-box array operations the resampling engine
//! delegates to:
//!
//! - **FFT/IFFT**: Real-input transforms of arbitrary length
//! - **Windows**: Tapers for FIR filter design
//! - **Filtering**: Linear-phase FIR low-pass design and zero-phase application
//! - **Resampling**: Anti-aliased decimation and Fourier resampling
//! - **Interpolation**: Piecewise-linear interpolation over irregular abscissae

pub mod error;
pub mod fft;
pub mod filter;
pub mod interpolation;
pub mod resample;
pub mod window;

pub use error::{DspError, DspResult};
pub use fft::FftEngine;
pub use interpolation::{interpolate_linear, linspace};
pub use resample::{decimate, decimate_with, fourier_resample};
pub use window::WindowType;
