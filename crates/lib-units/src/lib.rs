//! # lib-units
//!
//! Physical units for the sampled-signal containers.
//!
//! This crate provides the unit facility used throughout the workspace:
//! - Dimension vectors over the SI base quantities
//! - A read-only registry of named units with SI prefixes
//! - A unit-expression parser (`"mV"`, `"pA/ms"`, `"m*s^-2"`)
//! - Scalar and array quantities with conversion and rescaling
//! - Best-effort classification of units into quantity families

pub mod convert;
pub mod dimension;
pub mod error;
pub mod family;
pub mod parser;
pub mod quantity;
pub mod registry;
pub mod unit;

pub use convert::{conversion_factor, convertible, rescale};
pub use dimension::Dimension;
pub use error::{UnitError, UnitResult};
pub use family::{families, family_name, QuantityFamily};
pub use quantity::{Quantity, QuantityArray};
pub use unit::Unit;
