//! Free-function facade over unit conversion.

use crate::error::UnitResult;
use crate::quantity::Quantity;
use crate::unit::Unit;

/// True iff both units share reference dimensionality.
#[inline]
pub fn convertible(u1: &Unit, u2: &Unit) -> bool {
    u1.is_convertible_to(u2)
}

/// Factor that takes magnitudes in `from` to magnitudes in `to`.
#[inline]
pub fn conversion_factor(from: &Unit, to: &Unit) -> UnitResult<f64> {
    from.factor_to(to)
}

/// Express `value` in the unit `to`.
#[inline]
pub fn rescale(value: &Quantity, to: &Unit) -> UnitResult<Quantity> {
    value.rescale(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnitError;

    #[test]
    fn test_facade() {
        let mv = Unit::millivolt();
        let uv = Unit::parse("uV").unwrap();
        assert!(convertible(&mv, &uv));
        assert!(!convertible(&mv, &Unit::picoampere()));

        let factor = conversion_factor(&mv, &uv).unwrap();
        assert!((factor - 1e3).abs() < 1e-9);

        let q = rescale(&Quantity::new(-65.0, mv.clone()), &Unit::volt()).unwrap();
        assert!((q.value + 0.065).abs() < 1e-15);

        assert!(matches!(
            rescale(&Quantity::new(1.0, mv), &Unit::second()),
            Err(UnitError::IncompatibleUnits { .. })
        ));
    }
}
