//! Element-wise arithmetic between signals, quantities and scalars.
//!
//! Results keep the left operand's domain and owner. Add and subtract keep
//! the left unit and convert the right operand into it; multiply and divide
//! combine units. Plain `f64` operands leave the unit unchanged.
//!
//! Labels come from the left operand, joined with `;` when both operands
//! are signals with different labels. Annotations are not propagated; use
//! `with_annotations_from` to carry them over explicitly.

use crate::error::{SignalError, SignalResult};
use crate::irregular::IrregularSignal;
use crate::metadata::{join_pair, Metadata, OwnerHandle};
use crate::regular::RegularSignal;
use lib_units::{Quantity, Unit};
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Arithmetic operator kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    #[inline]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }

    /// Unit of `left op right`, with the right operand already in `right`.
    fn result_unit(self, left: &Unit, right: &Unit) -> Unit {
        match self {
            Self::Add | Self::Sub => left.clone(),
            Self::Mul => left.mul(right),
            Self::Div => left.div(right),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Right-hand operand of an arithmetic operation.
#[derive(Clone, Copy, Debug)]
pub enum Operand<'a, S> {
    Scalar(f64),
    Quantity(&'a Quantity),
    Signal(&'a S),
}

impl<'a, S> From<f64> for Operand<'a, S> {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl<'a, S> From<&'a Quantity> for Operand<'a, S> {
    fn from(value: &'a Quantity) -> Self {
        Self::Quantity(value)
    }
}

impl<'a> From<&'a RegularSignal> for Operand<'a, RegularSignal> {
    fn from(value: &'a RegularSignal) -> Self {
        Self::Signal(value)
    }
}

impl<'a> From<&'a IrregularSignal> for Operand<'a, IrregularSignal> {
    fn from(value: &'a IrregularSignal) -> Self {
        Self::Signal(value)
    }
}

/// Shared contract of sampled signals with a fixed domain.
///
/// Implementors expose their sample matrix and labels and know how to check
/// that another signal lies on the same domain. Arithmetic is provided on
/// top of that.
pub trait Sampled: Sized {
    fn data(&self) -> &Array2<f64>;

    fn unit(&self) -> &Unit;

    fn metadata(&self) -> &Metadata;

    fn owner(&self) -> Option<OwnerHandle>;

    /// Fail with `InconsistentSignals` unless `other` shares this domain.
    fn check_aligned(&self, other: &Self) -> SignalResult<()>;

    /// New signal on this domain with this owner and the given contents.
    fn derive(&self, data: Array2<f64>, unit: Unit, metadata: Metadata) -> Self;

    fn apply<'a>(&self, op: BinaryOp, rhs: impl Into<Operand<'a, Self>>) -> SignalResult<Self>
    where
        Self: 'a,
    {
        apply(self, op, rhs.into())
    }

    fn try_add<'a>(&self, rhs: impl Into<Operand<'a, Self>>) -> SignalResult<Self>
    where
        Self: 'a,
    {
        self.apply(BinaryOp::Add, rhs)
    }

    fn try_sub<'a>(&self, rhs: impl Into<Operand<'a, Self>>) -> SignalResult<Self>
    where
        Self: 'a,
    {
        self.apply(BinaryOp::Sub, rhs)
    }

    fn try_mul<'a>(&self, rhs: impl Into<Operand<'a, Self>>) -> SignalResult<Self>
    where
        Self: 'a,
    {
        self.apply(BinaryOp::Mul, rhs)
    }

    fn try_div<'a>(&self, rhs: impl Into<Operand<'a, Self>>) -> SignalResult<Self>
    where
        Self: 'a,
    {
        self.apply(BinaryOp::Div, rhs)
    }

    /// Element-wise negation.
    fn negate(&self) -> Self {
        self.derive(
            self.data().mapv(|v| -v),
            self.unit().clone(),
            self.metadata().labels_only(),
        )
    }

    /// Element-wise absolute value.
    fn rectify(&self) -> Self {
        self.derive(
            self.data().mapv(f64::abs),
            self.unit().clone(),
            self.metadata().labels_only(),
        )
    }
}

/// Apply `lhs op rhs`.
pub fn apply<S: Sampled>(lhs: &S, op: BinaryOp, rhs: Operand<'_, S>) -> SignalResult<S> {
    match rhs {
        Operand::Scalar(value) => Ok(apply_scalar(lhs, op, value)),
        Operand::Quantity(q) => apply_quantity(lhs, op, q),
        Operand::Signal(other) => apply_signal(lhs, op, other),
    }
}

/// Scalar operand: unit unchanged for every operator.
pub fn apply_scalar<S: Sampled>(lhs: &S, op: BinaryOp, value: f64) -> S {
    lhs.derive(
        lhs.data().mapv(|v| op.apply(v, value)),
        lhs.unit().clone(),
        lhs.metadata().labels_only(),
    )
}

fn apply_quantity<S: Sampled>(lhs: &S, op: BinaryOp, q: &Quantity) -> SignalResult<S> {
    let value = match op {
        BinaryOp::Add | BinaryOp::Sub => q.value_in(lhs.unit())?,
        BinaryOp::Mul | BinaryOp::Div => q.value,
    };
    Ok(lhs.derive(
        lhs.data().mapv(|v| op.apply(v, value)),
        op.result_unit(lhs.unit(), &q.unit),
        lhs.metadata().labels_only(),
    ))
}

fn apply_signal<S: Sampled>(lhs: &S, op: BinaryOp, rhs: &S) -> SignalResult<S> {
    lhs.check_aligned(rhs)?;
    if lhs.data().dim() != rhs.data().dim() {
        return Err(SignalError::InconsistentSignals(format!(
            "shapes differ: {:?} vs {:?}",
            lhs.data().dim(),
            rhs.data().dim()
        )));
    }

    let factor = match op {
        BinaryOp::Add | BinaryOp::Sub => rhs.unit().factor_to(lhs.unit())?,
        BinaryOp::Mul | BinaryOp::Div => 1.0,
    };

    let data = Zip::from(lhs.data())
        .and(rhs.data())
        .map_collect(|&a, &b| op.apply(a, b * factor));

    let left = lhs.metadata();
    let right = rhs.metadata();
    let metadata = Metadata {
        name: join_pair(&left.name, &right.name),
        description: join_pair(&left.description, &right.description),
        file_origin: join_pair(&left.file_origin, &right.file_origin),
        ..Metadata::default()
    };

    Ok(lhs.derive(data, op.result_unit(lhs.unit(), rhs.unit()), metadata))
}

macro_rules! scalar_operators {
    ($ty:ty) => {
        impl Add<f64> for &$ty {
            type Output = $ty;
            fn add(self, rhs: f64) -> $ty {
                apply_scalar(self, BinaryOp::Add, rhs)
            }
        }

        impl Sub<f64> for &$ty {
            type Output = $ty;
            fn sub(self, rhs: f64) -> $ty {
                apply_scalar(self, BinaryOp::Sub, rhs)
            }
        }

        impl Mul<f64> for &$ty {
            type Output = $ty;
            fn mul(self, rhs: f64) -> $ty {
                apply_scalar(self, BinaryOp::Mul, rhs)
            }
        }

        impl Div<f64> for &$ty {
            type Output = $ty;
            fn div(self, rhs: f64) -> $ty {
                apply_scalar(self, BinaryOp::Div, rhs)
            }
        }

        impl Neg for &$ty {
            type Output = $ty;
            fn neg(self) -> $ty {
                self.negate()
            }
        }
    };
}

scalar_operators!(RegularSignal);
scalar_operators!(IrregularSignal);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::AnnotationValue;
    use crate::regular::RegularSignalBuilder;
    use lib_units::Unit;
    use ndarray::array;

    fn signal(values: Vec<f64>, unit: Unit) -> RegularSignal {
        RegularSignalBuilder::from_samples(values)
            .unit(unit)
            .sampling_rate(Quantity::hertz(1000.0))
            .name("lfp")
            .annotation("trial", 3_i64)
            .build()
            .unwrap()
    }

    #[test]
    fn test_scalar_ops_keep_unit() {
        let s = signal(vec![1.0, 2.0, 3.0], Unit::millivolt());
        let doubled = &s * 2.0;
        assert_eq!(doubled.unit(), &Unit::millivolt());
        assert_eq!(doubled.data(), &array![[2.0], [4.0], [6.0]]);

        let shifted = &s - 1.0;
        assert_eq!(shifted.data(), &array![[0.0], [1.0], [2.0]]);

        let negated = -&s;
        assert_eq!(negated.data(), &array![[-1.0], [-2.0], [-3.0]]);
    }

    #[test]
    fn test_scalar_ops_drop_annotations() {
        let s = signal(vec![1.0], Unit::millivolt());
        let out = &s + 1.0;
        assert_eq!(out.name(), Some("lfp"));
        assert!(out.metadata().annotations.is_empty());

        let restored = out.with_annotations_from(&s).unwrap();
        assert_eq!(restored.metadata().annotations["trial"], AnnotationValue::Int(3));
    }

    #[test]
    fn test_quantity_add_converts() {
        let s = signal(vec![1.0, 2.0], Unit::millivolt());
        let out = s.try_add(&Quantity::new(0.001, Unit::volt())).unwrap();
        assert_eq!(out.unit(), &Unit::millivolt());
        assert!((out.data()[[0, 0]] - 2.0).abs() < 1e-12);
        assert!((out.data()[[1, 0]] - 3.0).abs() < 1e-12);

        let bad = s.try_add(&Quantity::new(1.0, Unit::ampere()));
        assert!(matches!(bad, Err(SignalError::IncompatibleUnits { .. })));
    }

    #[test]
    fn test_quantity_mul_combines_units() {
        let s = signal(vec![2.0], Unit::millivolt());
        let out = s.try_mul(&Quantity::new(3.0, Unit::picoampere())).unwrap();
        assert_eq!(out.data()[[0, 0]], 6.0);
        assert_eq!(
            out.unit().dimension(),
            Unit::volt().dimension() * Unit::ampere().dimension()
        );
        assert!((out.unit().scale() - 1e-15).abs() < 1e-27);
    }

    #[test]
    fn test_signal_add_rescales_right_operand() {
        let a = signal(vec![1.0, 2.0], Unit::millivolt());
        let b = signal(vec![0.001, 0.002], Unit::volt());
        let sum = a.try_add(&b).unwrap();
        assert_eq!(sum.unit(), &Unit::millivolt());
        assert!((sum.data()[[0, 0]] - 2.0).abs() < 1e-12);
        assert!((sum.data()[[1, 0]] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_signal_ops_reject_misaligned() {
        let a = signal(vec![1.0, 2.0], Unit::millivolt());
        let shorter = signal(vec![1.0], Unit::millivolt());
        assert!(matches!(
            a.try_sub(&shorter),
            Err(SignalError::InconsistentSignals(_))
        ));

        let shifted = a.shift(&Quantity::seconds(1.0)).unwrap();
        assert!(matches!(
            a.try_add(&shifted),
            Err(SignalError::InconsistentSignals(_))
        ));

        let current = signal(vec![1.0, 2.0], Unit::ampere());
        assert!(matches!(
            a.try_add(&current),
            Err(SignalError::IncompatibleUnits { .. })
        ));
    }

    #[test]
    fn test_signal_ops_join_names() {
        let a = signal(vec![4.0], Unit::millivolt());
        let b = RegularSignalBuilder::from_samples(vec![2.0])
            .unit(Unit::millivolt())
            .sampling_rate(Quantity::hertz(1000.0))
            .name("ref")
            .build()
            .unwrap();
        let ratio = a.try_div(&b).unwrap();
        assert_eq!(ratio.name(), Some("lfp;ref"));
        assert_eq!(ratio.data()[[0, 0]], 2.0);
        assert!(ratio.unit().is_dimensionless());
    }

    #[test]
    fn test_rectify() {
        let s = signal(vec![-1.5, 2.0], Unit::millivolt());
        assert_eq!(s.rectify().data(), &array![[1.5], [2.0]]);
    }
}
