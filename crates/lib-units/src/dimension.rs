//! Dimension vectors over the seven SI base quantities.
//!
//! Two units are convertible exactly when their dimensions are equal; the
//! scale factor relating them is carried separately by [`crate::Unit`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Div, Mul};

const BASE_SYMBOLS: [&str; 7] = ["L", "M", "T", "I", "Θ", "N", "J"];

/// Exponents of length, mass, time, current, temperature, amount and
/// luminous intensity, in that order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimension(pub [i8; 7]);

impl Dimension {
    pub const DIMENSIONLESS: Self = Self([0, 0, 0, 0, 0, 0, 0]);
    pub const LENGTH: Self = Self([1, 0, 0, 0, 0, 0, 0]);
    pub const MASS: Self = Self([0, 1, 0, 0, 0, 0, 0]);
    pub const TIME: Self = Self([0, 0, 1, 0, 0, 0, 0]);
    pub const CURRENT: Self = Self([0, 0, 0, 1, 0, 0, 0]);
    pub const TEMPERATURE: Self = Self([0, 0, 0, 0, 1, 0, 0]);
    pub const AMOUNT: Self = Self([0, 0, 0, 0, 0, 1, 0]);
    pub const LUMINOUS_INTENSITY: Self = Self([0, 0, 0, 0, 0, 0, 1]);

    pub const FREQUENCY: Self = Self([0, 0, -1, 0, 0, 0, 0]);
    pub const VELOCITY: Self = Self([1, 0, -1, 0, 0, 0, 0]);
    pub const ACCELERATION: Self = Self([1, 0, -2, 0, 0, 0, 0]);
    pub const FORCE: Self = Self([1, 1, -2, 0, 0, 0, 0]);
    pub const ENERGY: Self = Self([2, 1, -2, 0, 0, 0, 0]);
    pub const POWER: Self = Self([2, 1, -3, 0, 0, 0, 0]);
    pub const CHARGE: Self = Self([0, 0, 1, 1, 0, 0, 0]);
    pub const POTENTIAL: Self = Self([2, 1, -3, -1, 0, 0, 0]);
    pub const RESISTANCE: Self = Self([2, 1, -3, -2, 0, 0, 0]);
    pub const CONDUCTANCE: Self = Self([-2, -1, 3, 2, 0, 0, 0]);
    pub const CAPACITANCE: Self = Self([-2, -1, 4, 2, 0, 0, 0]);

    /// True for the dimension of pure numbers.
    #[inline]
    pub fn is_dimensionless(&self) -> bool {
        *self == Self::DIMENSIONLESS
    }

    /// Raise every exponent to an integer power.
    pub fn powi(self, n: i32) -> Self {
        let mut out = self.0;
        for e in out.iter_mut() {
            *e = (*e as i32 * n) as i8;
        }
        Self(out)
    }

    /// Dimension of the reciprocal quantity.
    #[inline]
    pub fn reciprocal(self) -> Self {
        self.powi(-1)
    }
}

impl Mul for Dimension {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (e, r) in out.iter_mut().zip(rhs.0) {
            *e += r;
        }
        Self(out)
    }
}

impl Div for Dimension {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (e, r) in out.iter_mut().zip(rhs.0) {
            *e -= r;
        }
        Self(out)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "1");
        }
        let parts: Vec<String> = self
            .0
            .iter()
            .zip(BASE_SYMBOLS)
            .filter(|(e, _)| **e != 0)
            .map(|(e, s)| if *e == 1 { s.to_string() } else { format!("{}^{}", s, e) })
            .collect();
        write!(f, "{}", parts.join("·"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_dimensions() {
        assert_eq!(Dimension::ENERGY / Dimension::TIME, Dimension::POWER);
        assert_eq!(Dimension::POWER / Dimension::CURRENT, Dimension::POTENTIAL);
        assert_eq!(Dimension::POTENTIAL / Dimension::CURRENT, Dimension::RESISTANCE);
        assert_eq!(Dimension::RESISTANCE.reciprocal(), Dimension::CONDUCTANCE);
        assert_eq!(Dimension::CHARGE / Dimension::POTENTIAL, Dimension::CAPACITANCE);
        assert_eq!(Dimension::TIME.reciprocal(), Dimension::FREQUENCY);
    }

    #[test]
    fn test_display() {
        assert_eq!(Dimension::DIMENSIONLESS.to_string(), "1");
        assert_eq!(Dimension::ACCELERATION.to_string(), "L·T^-2");
        assert_eq!(Dimension::POTENTIAL.to_string(), "L^2·M·T^-3·I^-1");
    }
}
