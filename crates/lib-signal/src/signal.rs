//! Either kind of sampled signal behind one type.

use crate::algebra::{BinaryOp, Sampled};
use crate::concat;
use crate::error::{SignalError, SignalResult};
use crate::irregular::IrregularSignal;
use crate::metadata::{Metadata, OwnerHandle};
use crate::regular::RegularSignal;
use lib_units::{Quantity, QuantityArray, Unit};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A regularly or irregularly sampled signal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    Regular(RegularSignal),
    Irregular(IrregularSignal),
}

/// Right-hand operand for arithmetic on [`Signal`].
#[derive(Clone, Copy, Debug)]
pub enum SignalOperand<'a> {
    Scalar(f64),
    Quantity(&'a Quantity),
    Signal(&'a Signal),
}

impl From<f64> for SignalOperand<'_> {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl<'a> From<&'a Quantity> for SignalOperand<'a> {
    fn from(value: &'a Quantity) -> Self {
        Self::Quantity(value)
    }
}

impl<'a> From<&'a Signal> for SignalOperand<'a> {
    fn from(value: &'a Signal) -> Self {
        Self::Signal(value)
    }
}

impl From<RegularSignal> for Signal {
    fn from(signal: RegularSignal) -> Self {
        Self::Regular(signal)
    }
}

impl From<IrregularSignal> for Signal {
    fn from(signal: IrregularSignal) -> Self {
        Self::Irregular(signal)
    }
}

macro_rules! each {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Signal::Regular($s) => $body,
            Signal::Irregular($s) => $body,
        }
    };
}

macro_rules! each_into {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Signal::Regular($s) => Signal::Regular($body),
            Signal::Irregular($s) => Signal::Irregular($body),
        }
    };
}

impl Signal {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Regular(_) => "regular",
            Self::Irregular(_) => "irregular",
        }
    }

    pub fn as_regular(&self) -> Option<&RegularSignal> {
        match self {
            Self::Regular(s) => Some(s),
            Self::Irregular(_) => None,
        }
    }

    pub fn as_irregular(&self) -> Option<&IrregularSignal> {
        match self {
            Self::Irregular(s) => Some(s),
            Self::Regular(_) => None,
        }
    }

    pub fn data(&self) -> &Array2<f64> {
        each!(self, s => s.data())
    }

    pub fn len(&self) -> usize {
        each!(self, s => s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel_count(&self) -> usize {
        each!(self, s => s.channel_count())
    }

    pub fn shape(&self) -> (usize, usize) {
        each!(self, s => s.shape())
    }

    pub fn unit(&self) -> &Unit {
        each!(self, s => s.unit())
    }

    pub fn domain_unit(&self) -> &Unit {
        each!(self, s => s.domain_unit())
    }

    /// Domain coordinate of every sample.
    pub fn domain(&self) -> QuantityArray {
        match self {
            Self::Regular(s) => s.domain(),
            Self::Irregular(s) => s.domain().clone(),
        }
    }

    pub fn domain_name(&self) -> String {
        each!(self, s => s.domain_name())
    }

    pub fn duration(&self) -> Quantity {
        each!(self, s => s.duration())
    }

    pub fn metadata(&self) -> &Metadata {
        each!(self, s => s.metadata())
    }

    pub fn name(&self) -> Option<&str> {
        each!(self, s => s.name())
    }

    pub fn owner(&self) -> Option<OwnerHandle> {
        each!(self, s => s.owner())
    }

    pub fn set_owner(&mut self, owner: Option<OwnerHandle>) {
        each!(self, s => s.set_owner(owner))
    }

    pub fn at(&self, index: usize) -> SignalResult<QuantityArray> {
        each!(self, s => s.at(index))
    }

    pub fn get(&self, index: usize, channel: usize) -> SignalResult<Quantity> {
        each!(self, s => s.get(index, channel))
    }

    pub fn set(&mut self, index: usize, channel: usize, value: &Quantity) -> SignalResult<()> {
        each!(self, s => s.set(index, channel, value))
    }

    pub fn slice(&self, range: std::ops::Range<usize>) -> SignalResult<Self> {
        Ok(each_into!(self, s => s.slice(range.clone())?))
    }

    pub fn select_channels(&self, channels: &[usize]) -> SignalResult<Self> {
        Ok(each_into!(self, s => s.select_channels(channels)?))
    }

    /// Domain interval: rounded indices for regular signals, exact value
    /// lookup for irregular ones.
    pub fn interval(&self, start: Option<&Quantity>, stop: Option<&Quantity>) -> SignalResult<Self> {
        Ok(each_into!(self, s => s.interval(start, stop)?))
    }

    pub fn shift(&self, dt: &Quantity) -> SignalResult<Self> {
        Ok(each_into!(self, s => s.shift(dt)?))
    }

    pub fn rescale(&self, to: &Unit) -> SignalResult<Self> {
        Ok(each_into!(self, s => s.rescale(to)?))
    }

    pub fn rescale_domain(&self, to: &Unit) -> SignalResult<Self> {
        Ok(each_into!(self, s => s.rescale_domain(to)?))
    }

    pub fn mean(&self) -> QuantityArray {
        each!(self, s => s.mean())
    }

    pub fn nanmean(&self) -> QuantityArray {
        each!(self, s => s.nanmean())
    }

    /// `self op rhs`; signal operands must be of the same kind.
    pub fn apply<'a>(&self, op: BinaryOp, rhs: impl Into<SignalOperand<'a>>) -> SignalResult<Self> {
        match (self, rhs.into()) {
            (Self::Regular(s), SignalOperand::Scalar(v)) => Ok(Self::Regular(s.apply(op, v)?)),
            (Self::Irregular(s), SignalOperand::Scalar(v)) => Ok(Self::Irregular(s.apply(op, v)?)),
            (Self::Regular(s), SignalOperand::Quantity(q)) => Ok(Self::Regular(s.apply(op, q)?)),
            (Self::Irregular(s), SignalOperand::Quantity(q)) => {
                Ok(Self::Irregular(s.apply(op, q)?))
            }
            (Self::Regular(a), SignalOperand::Signal(Self::Regular(b))) => {
                Ok(Self::Regular(a.apply(op, b)?))
            }
            (Self::Irregular(a), SignalOperand::Signal(Self::Irregular(b))) => {
                Ok(Self::Irregular(a.apply(op, b)?))
            }
            (lhs, SignalOperand::Signal(rhs)) => Err(SignalError::InconsistentSignals(format!(
                "cannot combine {} and {} signals",
                lhs.kind(),
                rhs.kind()
            ))),
        }
    }
}

/// Stack the channels of signals of one kind sharing one domain.
pub fn merge(signals: &[&Signal]) -> SignalResult<Signal> {
    if let Some(regular) = signals.iter().map(|s| s.as_regular()).collect::<Option<Vec<_>>>() {
        return Ok(Signal::Regular(concat::merge(&regular)?));
    }
    if let Some(irregular) = signals.iter().map(|s| s.as_irregular()).collect::<Option<Vec<_>>>() {
        return Ok(Signal::Irregular(concat::merge(&irregular)?));
    }
    Err(SignalError::MergeError(
        "cannot merge regular and irregular signals".into(),
    ))
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} signal '{}': {} samples x {} channels in {}, {} in {}",
            self.kind(),
            self.name().unwrap_or("unnamed"),
            self.len(),
            self.channel_count(),
            self.unit(),
            self.domain_name(),
            self.domain_unit()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::irregular::IrregularSignalBuilder;
    use crate::regular::RegularSignalBuilder;

    fn regular() -> Signal {
        RegularSignalBuilder::from_samples(vec![1.0, 2.0, 3.0])
            .unit(Unit::millivolt())
            .name("r")
            .build()
            .unwrap()
            .into()
    }

    fn irregular() -> Signal {
        IrregularSignalBuilder::from_samples(
            vec![1.0, 2.0, 3.0],
            QuantityArray::from_vec(vec![0.0, 0.5, 2.0], Unit::second()),
        )
        .unit(Unit::millivolt())
        .build()
        .unwrap()
        .into()
    }

    #[test]
    fn test_dispatch() {
        let r = regular();
        let i = irregular();
        assert_eq!(r.kind(), "regular");
        assert_eq!(i.kind(), "irregular");
        assert_eq!(r.len(), 3);
        assert_eq!(i.duration(), Quantity::seconds(2.0));
        assert_eq!(r.domain().values.to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(i.slice(1..3).unwrap().len(), 2);
        assert_eq!(r.domain_name(), "time");
    }

    #[test]
    fn test_apply_same_kind_only() {
        let r = regular();
        let doubled = r.apply(BinaryOp::Mul, 2.0).unwrap();
        assert_eq!(doubled.data()[[2, 0]], 6.0);

        let sum = r.apply(BinaryOp::Add, &r).unwrap();
        assert_eq!(sum.data()[[1, 0]], 4.0);

        assert!(matches!(
            r.apply(BinaryOp::Add, &irregular()),
            Err(SignalError::InconsistentSignals(_))
        ));
    }

    #[test]
    fn test_merge_kinds() {
        let r = regular();
        let merged = merge(&[&r, &r]).unwrap();
        assert_eq!(merged.channel_count(), 2);
        assert_eq!(merged.name(), Some("r"));

        assert!(matches!(
            merge(&[&r, &irregular()]),
            Err(SignalError::MergeError(_))
        ));
    }

    #[test]
    fn test_tagged_serde() {
        let i = irregular();
        let json = serde_json::to_string(&i).unwrap();
        assert!(json.contains(r#""kind":"irregular""#));
        let back: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, i);
    }

    #[test]
    fn test_display() {
        let text = regular().to_string();
        assert!(text.starts_with("regular signal 'r': 3 samples x 1 channels"));
    }
}
