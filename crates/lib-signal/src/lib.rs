//! Unit-aware sampled signal containers.
//!
//! This crate provides:
//! - [`RegularSignal`]: samples at a fixed period from an origin
//! - [`IrregularSignal`]: samples with an explicit, non-decreasing domain
//! - [`Signal`]: either of the two behind one type
//! - Element-wise arithmetic that checks units and domains ([`algebra`])
//! - Channel merging, domain concatenation and splicing ([`concat`])
//! - Decimation and Fourier resampling ([`resample`])
//!
//! Every transforming operation returns a new signal; inputs are never
//! modified. Units come from `lib-units`, numeric kernels from `lib-dsp`.

pub mod algebra;
pub mod concat;
pub mod domain;
pub mod error;
pub mod irregular;
pub mod metadata;
pub mod regular;
pub mod resample;
pub mod signal;

pub use algebra::{BinaryOp, Operand, Sampled};
pub use concat::{concatenate, splice, ConcatOptions, Padding};
pub use error::{SignalError, SignalResult};
pub use irregular::{IrregularSignal, IrregularSignalBuilder};
pub use metadata::{merge_annotations, AnnotationValue, Annotations, ArrayAnnotations, Metadata, OwnerHandle};
pub use regular::{RegularSignal, RegularSignalBuilder};
pub use signal::{merge, Signal, SignalOperand};

pub use lib_dsp::WindowType;
pub use lib_units::{Quantity, QuantityArray, Unit};
