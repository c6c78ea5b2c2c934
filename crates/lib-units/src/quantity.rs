//! Unit-tagged numeric values.
//!
//! [`Quantity`] is a scalar magnitude with a unit; [`QuantityArray`] is a
//! one-dimensional array sharing one unit. Both convert by multiplying
//! with the factor between units, and keep their values untouched when the
//! target unit is identical.

use crate::error::{UnitError, UnitResult};
use crate::unit::Unit;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Div, Mul, Neg};

/// A scalar value with a unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    #[inline]
    pub fn seconds(value: f64) -> Self {
        Self::new(value, Unit::second())
    }

    #[inline]
    pub fn from_ms(ms: f64) -> Self {
        Self::new(ms, Unit::millisecond())
    }

    #[inline]
    pub fn hertz(value: f64) -> Self {
        Self::new(value, Unit::hertz())
    }

    /// Parse the unit expression and attach it to `value`.
    pub fn parse(value: f64, unit: &str) -> UnitResult<Self> {
        Ok(Self::new(value, Unit::parse(unit)?))
    }

    /// Zero in the given unit.
    pub fn zero(unit: Unit) -> Self {
        Self::new(0.0, unit)
    }

    /// Express this quantity in another unit.
    pub fn rescale(&self, to: &Unit) -> UnitResult<Self> {
        if &self.unit == to {
            return Ok(self.clone());
        }
        let factor = self.unit.factor_to(to)?;
        Ok(Self::new(self.value * factor, to.clone()))
    }

    /// Magnitude of this quantity in another unit.
    pub fn value_in(&self, unit: &Unit) -> UnitResult<f64> {
        Ok(self.value * self.unit.factor_to(unit)?)
    }

    /// Sum in the unit of `self`; `other` is converted first.
    pub fn checked_add(&self, other: &Quantity) -> UnitResult<Self> {
        Ok(Self::new(self.value + other.value_in(&self.unit)?, self.unit.clone()))
    }

    /// Difference in the unit of `self`; `other` is converted first.
    pub fn checked_sub(&self, other: &Quantity) -> UnitResult<Self> {
        Ok(Self::new(self.value - other.value_in(&self.unit)?, self.unit.clone()))
    }

    /// Ratio of two convertible quantities as a plain number.
    pub fn ratio(&self, other: &Quantity) -> UnitResult<f64> {
        Ok(self.value / other.value_in(&self.unit)?)
    }

    /// Product with combined unit.
    pub fn times(&self, other: &Quantity) -> Self {
        Self::new(self.value * other.value, self.unit.mul(&other.unit))
    }

    /// Quotient with combined unit.
    pub fn per(&self, other: &Quantity) -> Self {
        Self::new(self.value / other.value, self.unit.div(&other.unit))
    }

    /// Reciprocal value in the reciprocal unit.
    pub fn reciprocal(&self) -> Self {
        Self::new(1.0 / self.value, self.unit.reciprocal())
    }

    /// Compare after conversion with a relative tolerance.
    ///
    /// Non-convertible quantities are never approximately equal.
    pub fn approx_eq(&self, other: &Quantity, rel_tol: f64) -> bool {
        match other.value_in(&self.unit) {
            Ok(v) => {
                let scale = self.value.abs().max(v.abs());
                (self.value - v).abs() <= rel_tol * scale
            }
            Err(_) => false,
        }
    }
}

impl Mul<f64> for Quantity {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.value * rhs, self.unit)
    }
}

impl Div<f64> for Quantity {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self::new(self.value / rhs, self.unit)
    }
}

impl Neg for Quantity {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.value, self.unit)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// A one-dimensional array of values sharing one unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantityArray {
    pub values: Array1<f64>,
    pub unit: Unit,
}

impl QuantityArray {
    pub fn new(values: Array1<f64>, unit: Unit) -> Self {
        Self { values, unit }
    }

    pub fn from_vec(values: Vec<f64>, unit: Unit) -> Self {
        Self::new(Array1::from(values), unit)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Element `index` as a scalar quantity.
    pub fn get(&self, index: usize) -> Option<Quantity> {
        self.values
            .get(index)
            .map(|&v| Quantity::new(v, self.unit.clone()))
    }

    /// Express the array in another unit.
    pub fn rescale(&self, to: &Unit) -> UnitResult<Self> {
        if &self.unit == to {
            return Ok(self.clone());
        }
        let factor = self.unit.factor_to(to)?;
        Ok(Self::new(&self.values * factor, to.clone()))
    }

    /// Raw values converted into `unit`.
    pub fn values_in(&self, unit: &Unit) -> UnitResult<Array1<f64>> {
        Ok(self.rescale(unit)?.values)
    }

    /// First differences, `values[1:] - values[:-1]`.
    pub fn diff(&self) -> Self {
        let n = self.values.len();
        let values = if n < 2 {
            Array1::zeros(0)
        } else {
            &self.values.slice(ndarray::s![1..]) - &self.values.slice(ndarray::s![..n - 1])
        };
        Self::new(values, self.unit.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = Quantity> + '_ {
        self.values.iter().map(|&v| Quantity::new(v, self.unit.clone()))
    }
}

impl TryFrom<Vec<Quantity>> for QuantityArray {
    type Error = UnitError;

    /// Collect scalars into an array in the unit of the first element.
    fn try_from(items: Vec<Quantity>) -> Result<Self, Self::Error> {
        let unit = items.first().map(|q| q.unit.clone()).unwrap_or_default();
        let values = items
            .iter()
            .map(|q| q.value_in(&unit))
            .collect::<UnitResult<Vec<f64>>>()?;
        Ok(Self::from_vec(values, unit))
    }
}
