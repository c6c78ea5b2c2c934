//! Physical units.
//!
//! A [`Unit`] is an immutable value: a canonical symbol, a [`Dimension`] and
//! a scale factor to the SI-coherent reference unit of that dimension.
//! Units compare equal by identity (same symbol, dimension and scale); use
//! [`Unit::is_convertible_to`] to compare by dimension.

use crate::dimension::Dimension;
use crate::error::{UnitError, UnitResult};
use crate::parser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A physical measurement unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Unit {
    symbol: String,
    dimension: Dimension,
    scale: f64,
}

impl Unit {
    fn from_parts(symbol: impl Into<String>, dimension: Dimension, scale: f64) -> Self {
        Self {
            symbol: symbol.into(),
            dimension,
            scale,
        }
    }

    /// Parse a unit expression such as `"mV"`, `"pA/ms"` or `"m*s^-2"`.
    pub fn parse(expr: &str) -> UnitResult<Self> {
        parser::parse_unit(expr).map(Self::canonical)
    }

    /// Unit of the canonical symbol, with the scale that symbol parses to.
    ///
    /// Equal symbols then always carry bit-identical scales, whatever
    /// expression or arithmetic produced them.
    fn canonical(parsed: parser::ParsedUnit) -> Self {
        let parsed = match parser::parse_unit(&parsed.symbol) {
            Ok(reparsed) => reparsed,
            Err(_) => parsed,
        };
        Self::from_parts(parsed.symbol, parsed.dimension, parsed.scale)
    }

    pub fn dimensionless() -> Self {
        Self::from_parts("dimensionless", Dimension::DIMENSIONLESS, 1.0)
    }

    pub fn second() -> Self {
        Self::from_parts("s", Dimension::TIME, 1.0)
    }

    pub fn millisecond() -> Self {
        Self::from_parts("ms", Dimension::TIME, 1e-3)
    }

    pub fn hertz() -> Self {
        Self::from_parts("Hz", Dimension::FREQUENCY, 1.0)
    }

    pub fn volt() -> Self {
        Self::from_parts("V", Dimension::POTENTIAL, 1.0)
    }

    pub fn millivolt() -> Self {
        Self::from_parts("mV", Dimension::POTENTIAL, 1e-3)
    }

    pub fn ampere() -> Self {
        Self::from_parts("A", Dimension::CURRENT, 1.0)
    }

    pub fn picoampere() -> Self {
        Self::from_parts("pA", Dimension::CURRENT, 1e-12)
    }

    #[inline]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[inline]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Factor to the SI-coherent reference unit.
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn is_dimensionless(&self) -> bool {
        self.dimension.is_dimensionless()
    }

    /// True when both units measure the same dimension.
    #[inline]
    pub fn is_convertible_to(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }

    /// Multiplicative factor taking values in `self` to values in `other`.
    pub fn factor_to(&self, other: &Unit) -> UnitResult<f64> {
        if self == other {
            return Ok(1.0);
        }
        if !self.is_convertible_to(other) {
            return Err(UnitError::incompatible(self, other));
        }
        Ok(self.scale / other.scale)
    }

    /// Product unit, e.g. `V * s`.
    pub fn mul(&self, other: &Unit) -> Unit {
        compose(
            format!("({})*({})", self.symbol, other.symbol),
            self.dimension * other.dimension,
            self.scale * other.scale,
        )
    }

    /// Quotient unit, e.g. `mV / ms`.
    pub fn div(&self, other: &Unit) -> Unit {
        compose(
            format!("({})/({})", self.symbol, other.symbol),
            self.dimension / other.dimension,
            self.scale / other.scale,
        )
    }

    /// Integer power of the unit.
    pub fn powi(&self, n: i32) -> Unit {
        compose(
            format!("({})^{}", self.symbol, n),
            self.dimension.powi(n),
            self.scale.powi(n),
        )
    }

    /// Reciprocal unit, e.g. `1/ms` for a sampling rate.
    pub fn reciprocal(&self) -> Unit {
        compose(
            format!("1/({})", self.symbol),
            self.dimension.reciprocal(),
            1.0 / self.scale,
        )
    }
}

/// Build a derived unit, canonicalizing symbol and scale through the parser.
fn compose(expr: String, dimension: Dimension, scale: f64) -> Unit {
    match parser::parse_unit(&expr) {
        Ok(parsed) => Unit::canonical(parsed),
        Err(_) => Unit::from_parts(expr, dimension, scale),
    }
}

impl Default for Unit {
    fn default() -> Self {
        Self::dimensionless()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Unit {
    type Error = UnitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_vs_convertibility() {
        let ms = Unit::parse("ms").unwrap();
        assert_eq!(ms, Unit::millisecond());
        assert_ne!(ms, Unit::second());
        assert!(ms.is_convertible_to(&Unit::second()));
        assert!(!ms.is_convertible_to(&Unit::volt()));
    }

    #[test]
    fn test_factor_to() {
        let f = Unit::millivolt().factor_to(&Unit::volt()).unwrap();
        assert!((f - 1e-3).abs() < 1e-15);

        let f = Unit::second().factor_to(&Unit::millisecond()).unwrap();
        assert!((f - 1e3).abs() < 1e-9);

        let err = Unit::volt().factor_to(&Unit::ampere()).unwrap_err();
        assert!(matches!(err, UnitError::IncompatibleUnits { .. }));
    }

    #[test]
    fn test_derived_units() {
        let rate = Unit::millisecond().reciprocal();
        assert_eq!(rate.symbol(), "1/ms");
        assert_eq!(rate.dimension(), Dimension::FREQUENCY);
        assert!((rate.factor_to(&Unit::hertz()).unwrap() - 1e3).abs() < 1e-9);

        let charge = Unit::picoampere().mul(&Unit::second());
        assert_eq!(charge.symbol(), "pA*s");
        assert_eq!(charge.dimension(), Dimension::CHARGE);

        let slope = Unit::millivolt().div(&Unit::millisecond());
        assert_eq!(slope.symbol(), "mV/ms");

        let cancelled = Unit::volt().div(&Unit::volt());
        assert!(cancelled.is_dimensionless());
        assert_eq!(cancelled.symbol(), "dimensionless");
    }

    #[test]
    fn test_derived_units_equal_parsed_units() {
        let nanoamp = Unit::parse("nA").unwrap();
        assert_eq!(
            nanoamp.div(&Unit::millisecond()),
            Unit::parse("nA/ms").unwrap()
        );

        let prefixed: Vec<Unit> = ["p", "n", "u", "m", "", "k", "M"]
            .iter()
            .flat_map(|p| ["s", "A", "V", "Hz"].iter().map(move |u| format!("{}{}", p, u)))
            .map(|expr| Unit::parse(&expr).unwrap())
            .collect();

        for a in &prefixed {
            let inverse = a.reciprocal();
            assert_eq!(inverse, Unit::parse(inverse.symbol()).unwrap());
            for b in &prefixed {
                for derived in [a.mul(b), a.div(b)] {
                    let parsed = Unit::parse(derived.symbol()).unwrap();
                    assert_eq!(derived, parsed, "{} vs {}", derived.symbol(), parsed.symbol());
                    assert_eq!(derived.factor_to(&parsed).unwrap(), 1.0);
                }
            }
        }
    }

    #[test]
    fn test_parse_is_canonical() {
        let nested = Unit::parse("(mV/ms)*ms").unwrap();
        assert_eq!(nested.symbol(), "mV");
        assert_eq!(nested, Unit::millivolt());
    }

    #[test]
    fn test_serde_as_symbol() {
        let unit = Unit::parse("uV").unwrap();
        let json = serde_json::to_string(&unit).unwrap();
        assert_eq!(json, "\"uV\"");

        let back: Unit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, unit);

        let bad: Result<Unit, _> = serde_json::from_str("\"parsec\"");
        assert!(bad.is_err());
    }
}
