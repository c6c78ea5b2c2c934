//! Best-effort classification of units into quantity families.
//!
//! The result is advisory text for naming domains and channels. Lookups
//! never fail: unknown dimensions map to `"unknown quantity"`.

use crate::dimension::Dimension;
use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic family of a physical quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityFamily {
    Time,
    Frequency,
    Length,
    Mass,
    Current,
    Temperature,
    Amount,
    LuminousIntensity,
    Velocity,
    Acceleration,
    Force,
    Energy,
    Torque,
    Power,
    Charge,
    Potential,
    Resistance,
    Conductance,
    Capacitance,
    Dimensionless,
}

const FAMILIES: &[(QuantityFamily, Dimension)] = &[
    (QuantityFamily::Time, Dimension::TIME),
    (QuantityFamily::Frequency, Dimension::FREQUENCY),
    (QuantityFamily::Length, Dimension::LENGTH),
    (QuantityFamily::Mass, Dimension::MASS),
    (QuantityFamily::Current, Dimension::CURRENT),
    (QuantityFamily::Temperature, Dimension::TEMPERATURE),
    (QuantityFamily::Amount, Dimension::AMOUNT),
    (QuantityFamily::LuminousIntensity, Dimension::LUMINOUS_INTENSITY),
    (QuantityFamily::Velocity, Dimension::VELOCITY),
    (QuantityFamily::Acceleration, Dimension::ACCELERATION),
    (QuantityFamily::Force, Dimension::FORCE),
    (QuantityFamily::Energy, Dimension::ENERGY),
    (QuantityFamily::Torque, Dimension::ENERGY),
    (QuantityFamily::Power, Dimension::POWER),
    (QuantityFamily::Charge, Dimension::CHARGE),
    (QuantityFamily::Potential, Dimension::POTENTIAL),
    (QuantityFamily::Resistance, Dimension::RESISTANCE),
    (QuantityFamily::Conductance, Dimension::CONDUCTANCE),
    (QuantityFamily::Capacitance, Dimension::CAPACITANCE),
    (QuantityFamily::Dimensionless, Dimension::DIMENSIONLESS),
];

pub const UNKNOWN_QUANTITY: &str = "unknown quantity";

impl QuantityFamily {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Frequency => "frequency",
            Self::Length => "length",
            Self::Mass => "mass",
            Self::Current => "current",
            Self::Temperature => "temperature",
            Self::Amount => "amount of substance",
            Self::LuminousIntensity => "luminous intensity",
            Self::Velocity => "velocity",
            Self::Acceleration => "acceleration",
            Self::Force => "force",
            Self::Energy => "energy",
            Self::Torque => "torque",
            Self::Power => "power",
            Self::Charge => "charge",
            Self::Potential => "electrical potential",
            Self::Resistance => "resistance",
            Self::Conductance => "conductance",
            Self::Capacitance => "capacitance",
            Self::Dimensionless => "dimensionless",
        }
    }
}

impl fmt::Display for QuantityFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All families sharing the unit's dimension, in table order.
pub fn families(unit: &Unit) -> Vec<QuantityFamily> {
    FAMILIES
        .iter()
        .filter(|(_, dim)| *dim == unit.dimension())
        .map(|(family, _)| *family)
        .collect()
}

/// Human-readable family name, e.g. `"time"` or `"energy or torque"`.
pub fn family_name(unit: &Unit) -> String {
    let found = families(unit);
    if found.is_empty() {
        tracing::debug!(
            "No quantity family for unit {} (dimension {})",
            unit,
            unit.dimension()
        );
        return UNKNOWN_QUANTITY.to_string();
    }
    found
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(" or ")
}
