//! Irregularly sampled signals.
//!
//! An [`IrregularSignal`] carries an explicit, non-decreasing domain value
//! for every sample. Lookups by domain value use a closeness test rather
//! than rounding, so `interval` only succeeds for values that are present.

use crate::algebra::Sampled;
use crate::concat;
use crate::domain::{approx_equal, is_close, resolve_range, PERIOD_REL_TOL};
use crate::error::{SignalError, SignalResult};
use crate::metadata::{AnnotationValue, Metadata, OwnerHandle};
use crate::regular::{check_array_annotations, RegularSignal, RegularSignalBuilder};
use lib_dsp::{interpolate_linear, linspace};
use lib_units::{family_name, Quantity, QuantityArray, Unit};
use ndarray::{s, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::ops::RangeBounds;

/// Signal with an explicit domain value per sample.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "IrregularSignalRecord")]
pub struct IrregularSignal {
    data: Array2<f64>,
    unit: Unit,
    domain: QuantityArray,
    #[serde(flatten)]
    metadata: Metadata,
    #[serde(skip)]
    owner: Option<OwnerHandle>,
}

#[derive(Deserialize)]
struct IrregularSignalRecord {
    data: Array2<f64>,
    #[serde(default)]
    unit: Unit,
    domain: QuantityArray,
    #[serde(flatten)]
    metadata: Metadata,
}

impl TryFrom<IrregularSignalRecord> for IrregularSignal {
    type Error = SignalError;

    fn try_from(record: IrregularSignalRecord) -> SignalResult<Self> {
        IrregularSignalBuilder::new(record.data, record.domain)
            .unit(record.unit)
            .metadata(record.metadata)
            .build()
    }
}

/// Validating builder for [`IrregularSignal`].
#[derive(Clone, Debug)]
pub struct IrregularSignalBuilder {
    data: Array2<f64>,
    domain: QuantityArray,
    unit: Unit,
    metadata: Metadata,
    owner: Option<OwnerHandle>,
}

impl IrregularSignalBuilder {
    pub fn new(data: Array2<f64>, domain: QuantityArray) -> Self {
        Self {
            data,
            domain,
            unit: Unit::dimensionless(),
            metadata: Metadata::default(),
            owner: None,
        }
    }

    /// Single-channel signal from flat samples and domain values.
    pub fn from_samples(samples: Vec<f64>, domain: QuantityArray) -> Self {
        Self::new(Array1::from(samples).insert_axis(Axis(1)), domain)
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.metadata.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    pub fn file_origin(mut self, file_origin: impl Into<String>) -> Self {
        self.metadata.file_origin = Some(file_origin.into());
        self
    }

    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
        self.metadata.annotations.insert(key.into(), value.into());
        self
    }

    pub fn array_annotation(mut self, key: impl Into<String>, values: Vec<AnnotationValue>) -> Self {
        self.metadata.array_annotations.insert(key.into(), values);
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn owner(mut self, owner: OwnerHandle) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn build(self) -> SignalResult<IrregularSignal> {
        if self.domain.len() != self.data.nrows() {
            return Err(SignalError::shape(
                "domain",
                self.data.nrows(),
                self.domain.len(),
            ));
        }
        if let Some(bad) = self.domain.values.iter().find(|v| !v.is_finite()) {
            return Err(SignalError::InvalidDomain(format!(
                "domain values must be finite, got {}",
                bad
            )));
        }
        if let Some(k) = self
            .domain
            .values
            .windows(2)
            .into_iter()
            .position(|w| w[1] < w[0])
        {
            return Err(SignalError::InvalidDomain(format!(
                "domain decreases between samples {} and {}",
                k,
                k + 1
            )));
        }
        check_array_annotations(&self.metadata, self.data.ncols())?;

        Ok(IrregularSignal {
            data: self.data,
            unit: self.unit,
            domain: self.domain,
            metadata: self.metadata,
            owner: self.owner,
        })
    }
}

impl IrregularSignal {
    pub fn builder(data: Array2<f64>, domain: QuantityArray) -> IrregularSignalBuilder {
        IrregularSignalBuilder::new(data, domain)
    }

    fn from_parts(
        data: Array2<f64>,
        unit: Unit,
        domain: QuantityArray,
        metadata: Metadata,
        owner: Option<OwnerHandle>,
    ) -> Self {
        Self {
            data,
            unit,
            domain,
            metadata,
            owner,
        }
    }

    #[inline]
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn into_data(self) -> Array2<f64> {
        self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.data.ncols()
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    #[inline]
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    #[inline]
    pub fn domain(&self) -> &QuantityArray {
        &self.domain
    }

    #[inline]
    pub fn domain_unit(&self) -> &Unit {
        &self.domain.unit
    }

    /// First domain value, if any.
    pub fn start(&self) -> Option<Quantity> {
        self.domain.get(0)
    }

    /// Last domain value, if any.
    pub fn end(&self) -> Option<Quantity> {
        self.len().checked_sub(1).and_then(|k| self.domain.get(k))
    }

    /// `end - start`; zero for an empty signal.
    pub fn duration(&self) -> Quantity {
        let values = &self.domain.values;
        let span = match values.len() {
            0 => 0.0,
            n => values[n - 1] - values[0],
        };
        Quantity::new(span, self.domain.unit.clone())
    }

    /// Differences between consecutive domain values.
    pub fn sampling_intervals(&self) -> QuantityArray {
        self.domain.diff()
    }

    pub fn domain_name(&self) -> String {
        family_name(self.domain_unit())
    }

    #[inline]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.description.as_deref()
    }

    pub fn file_origin(&self) -> Option<&str> {
        self.metadata.file_origin.as_deref()
    }

    #[inline]
    pub fn owner(&self) -> Option<OwnerHandle> {
        self.owner
    }

    pub fn set_owner(&mut self, owner: Option<OwnerHandle>) {
        self.owner = owner;
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> SignalResult<Self> {
        check_array_annotations(&metadata, self.channel_count())?;
        self.metadata = metadata;
        Ok(self)
    }

    /// Copy annotations and array annotations from `source`.
    pub fn with_annotations_from(mut self, source: &Self) -> SignalResult<Self> {
        check_array_annotations(&source.metadata, self.channel_count())?;
        self.metadata.annotations = source.metadata.annotations.clone();
        self.metadata.array_annotations = source.metadata.array_annotations.clone();
        Ok(self)
    }

    fn check_index(&self, index: usize) -> SignalResult<()> {
        if index >= self.len() {
            return Err(SignalError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    fn check_channel(&self, channel: usize) -> SignalResult<()> {
        if channel >= self.channel_count() {
            return Err(SignalError::IndexOutOfRange {
                index: channel,
                len: self.channel_count(),
            });
        }
        Ok(())
    }

    pub fn at(&self, index: usize) -> SignalResult<QuantityArray> {
        self.check_index(index)?;
        Ok(QuantityArray::new(
            self.data.row(index).to_owned(),
            self.unit.clone(),
        ))
    }

    pub fn get(&self, index: usize, channel: usize) -> SignalResult<Quantity> {
        self.check_index(index)?;
        self.check_channel(channel)?;
        Ok(Quantity::new(self.data[[index, channel]], self.unit.clone()))
    }

    pub fn set(&mut self, index: usize, channel: usize, value: &Quantity) -> SignalResult<()> {
        self.check_index(index)?;
        self.check_channel(channel)?;
        let converted = value.value_in(&self.unit)?;
        self.data[[index, channel]] = converted;
        Ok(())
    }

    pub fn set_row(&mut self, index: usize, values: &[f64]) -> SignalResult<()> {
        self.check_index(index)?;
        if values.len() != self.channel_count() {
            return Err(SignalError::shape("row", self.channel_count(), values.len()));
        }
        for (dst, &src) in self.data.row_mut(index).iter_mut().zip(values) {
            *dst = src;
        }
        Ok(())
    }

    /// Copy of samples `range` with their domain values.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> SignalResult<Self> {
        let (start, stop) = resolve_range(&range, self.len())?;
        Ok(Self::from_parts(
            self.data.slice(s![start..stop, ..]).to_owned(),
            self.unit.clone(),
            QuantityArray::new(
                self.domain.values.slice(s![start..stop]).to_owned(),
                self.domain.unit.clone(),
            ),
            self.metadata.clone(),
            self.owner,
        ))
    }

    pub fn select_channels(&self, channels: &[usize]) -> SignalResult<Self> {
        for &c in channels {
            self.check_channel(c)?;
        }
        Ok(Self::from_parts(
            self.data.select(Axis(1), channels),
            self.unit.clone(),
            self.domain.clone(),
            self.metadata.select_channels(channels),
            self.owner,
        ))
    }

    /// Index of the first (or last) domain value close to `t`.
    fn find_close(&self, t: &Quantity, last: bool) -> SignalResult<usize> {
        let target = t.value_in(self.domain_unit())?;
        let mut hits = self
            .domain
            .values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| is_close(v, target))
            .map(|(k, _)| k);
        let found = if last { hits.last() } else { hits.next() };
        found.ok_or_else(|| SignalError::ValueNotFound(t.to_string()))
    }

    /// Samples from the one at `start` to the one at `stop`, inclusive.
    ///
    /// Both bounds must match a domain value; `None` means the first or last
    /// sample.
    pub fn interval(&self, start: Option<&Quantity>, stop: Option<&Quantity>) -> SignalResult<Self> {
        if self.is_empty() {
            return match (start, stop) {
                (None, None) => Ok(self.clone()),
                (Some(t), _) | (None, Some(t)) => Err(SignalError::ValueNotFound(t.to_string())),
            };
        }
        let i = match start {
            Some(t) => self.find_close(t, false)?,
            None => 0,
        };
        let j = match stop {
            Some(t) => self.find_close(t, true)?,
            None => self.len() - 1,
        };
        if i > j {
            return Err(SignalError::RangeError(format!(
                "start sample {} is after stop sample {}",
                i, j
            )));
        }
        self.slice(i..=j)
    }

    /// Samples with `start <= t <= stop`; `None` leaves that side open.
    pub fn range(&self, start: Option<&Quantity>, stop: Option<&Quantity>) -> SignalResult<Self> {
        let values = self.domain.values.to_vec();
        let i = match start {
            Some(t) => {
                let t = t.value_in(self.domain_unit())?;
                values.partition_point(|&v| v < t)
            }
            None => 0,
        };
        let j = match stop {
            Some(t) => {
                let t = t.value_in(self.domain_unit())?;
                values.partition_point(|&v| v <= t)
            }
            None => values.len(),
        };
        self.slice(i..j.max(i))
    }

    /// Copy with every domain value moved by `dt`.
    pub fn shift(&self, dt: &Quantity) -> SignalResult<Self> {
        let dt = dt.value_in(self.domain_unit())?;
        let mut shifted = self.clone();
        shifted.domain.values.mapv_inplace(|v| v + dt);
        Ok(shifted)
    }

    pub fn rescale(&self, to: &Unit) -> SignalResult<Self> {
        if &self.unit == to {
            tracing::trace!("Rescale to identical unit {}", to);
            return Ok(self.clone());
        }
        let factor = self.unit.factor_to(to)?;
        let mut out = self.clone();
        out.data.mapv_inplace(|v| v * factor);
        out.unit = to.clone();
        Ok(out)
    }

    pub fn rescale_domain(&self, to: &Unit) -> SignalResult<Self> {
        let mut out = self.clone();
        out.domain = self.domain.rescale(to)?;
        Ok(out)
    }

    /// Duration-weighted mean per channel.
    ///
    /// Sample `k` is weighted by the interval to sample `k + 1`; the last
    /// sample carries no weight.
    pub fn mean(&self) -> QuantityArray {
        self.weighted_mean(false)
    }

    /// Like [`mean`](Self::mean), skipping NaN samples and their intervals.
    pub fn nanmean(&self) -> QuantityArray {
        self.weighted_mean(true)
    }

    fn weighted_mean(&self, skip_nan: bool) -> QuantityArray {
        let domain = &self.domain.values;
        let n = self.len();

        let means = self
            .data
            .axis_iter(Axis(1))
            .map(|column| {
                if n < 2 {
                    return f64::NAN;
                }
                let mut weighted = 0.0;
                let mut total = 0.0;
                for k in 0..n - 1 {
                    let value = column[k];
                    if skip_nan && value.is_nan() {
                        continue;
                    }
                    let dt = domain[k + 1] - domain[k];
                    weighted += value * dt;
                    total += dt;
                }
                if total == 0.0 {
                    f64::NAN
                } else {
                    weighted / total
                }
            })
            .collect::<Array1<f64>>();

        QuantityArray::new(means, self.unit.clone())
    }

    /// Linearly interpolate onto `sample_count` evenly spaced points spanning
    /// `[start, end]`.
    pub fn to_regular(&self, sample_count: usize) -> SignalResult<RegularSignal> {
        if sample_count < 2 {
            return Err(SignalError::InvalidFactor(format!(
                "need at least 2 output samples, got {}",
                sample_count
            )));
        }
        if self.len() < 2 {
            return Err(SignalError::InvalidFactor(format!(
                "need at least 2 input samples, got {}",
                self.len()
            )));
        }

        let x = self.domain.values.to_vec();
        let first = x[0];
        let last = x[x.len() - 1];
        let grid = linspace(first, last, sample_count);

        let columns = self
            .data
            .axis_iter(Axis(1))
            .map(|column| interpolate_linear(&x, &column.to_vec(), &grid))
            .collect::<Result<Vec<_>, _>>()?;

        let data = Array2::from_shape_fn((sample_count, self.channel_count()), |(i, c)| columns[c][i]);
        let period = (last - first) / (sample_count - 1) as f64;

        tracing::debug!(
            "Interpolating {} irregular samples onto {} points, period {}",
            self.len(),
            sample_count,
            period
        );

        let mut builder = RegularSignalBuilder::new(data)
            .unit(self.unit.clone())
            .origin(Quantity::new(first, self.domain.unit.clone()))
            .sampling_period(Quantity::new(period, self.domain.unit.clone()))
            .metadata(self.metadata.clone());
        if let Some(owner) = self.owner {
            builder = builder.owner(owner);
        }
        builder.build()
    }

    /// Stack the channels of `other` after this signal's channels.
    pub fn merge(&self, other: &Self) -> SignalResult<Self> {
        concat::merge(&[self, other])
    }
}

impl Sampled for IrregularSignal {
    fn data(&self) -> &Array2<f64> {
        &self.data
    }

    fn unit(&self) -> &Unit {
        &self.unit
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn owner(&self) -> Option<OwnerHandle> {
        self.owner
    }

    fn check_aligned(&self, other: &Self) -> SignalResult<()> {
        if self.len() != other.len() {
            return Err(SignalError::InconsistentSignals(format!(
                "domains have different lengths: {} vs {}",
                self.len(),
                other.len()
            )));
        }
        let theirs = other
            .domain
            .values_in(self.domain_unit())
            .map_err(|e| SignalError::InconsistentSignals(e.to_string()))?;
        let same = theirs
            .iter()
            .zip(self.domain.values.iter())
            .all(|(a, b)| approx_equal(*a, *b, PERIOD_REL_TOL));
        if !same {
            return Err(SignalError::InconsistentSignals(
                "domain values differ".into(),
            ));
        }
        Ok(())
    }

    fn derive(&self, data: Array2<f64>, unit: Unit, metadata: Metadata) -> Self {
        Self::from_parts(data, unit, self.domain.clone(), metadata, self.owner)
    }
}

impl PartialEq for IrregularSignal {
    /// Same domain and shape, and equal samples after unit conversion.
    fn eq(&self, other: &Self) -> bool {
        if self.shape() != other.shape() || self.check_aligned(other).is_err() {
            return false;
        }
        match other.unit.factor_to(&self.unit) {
            Ok(factor) => self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| *a == b * factor),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;
    use ndarray::array;

    fn times(values: Vec<f64>) -> QuantityArray {
        QuantityArray::from_vec(values, Unit::second())
    }

    fn spikes() -> IrregularSignal {
        IrregularSignalBuilder::from_samples(
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            times(vec![0.0, 0.1, 0.3, 0.35, 1.0]),
        )
        .unit(Unit::millivolt())
        .name("v")
        .build()
        .unwrap()
    }

    #[test]
    fn test_builder_validation() {
        let err = IrregularSignalBuilder::from_samples(vec![1.0, 2.0], times(vec![0.0]))
            .build()
            .unwrap_err();
        assert_eq!(err, SignalError::shape("domain", 2, 1));

        let err = IrregularSignalBuilder::from_samples(vec![1.0, 2.0], times(vec![1.0, 0.5]))
            .build()
            .unwrap_err();
        assert!(matches!(err, SignalError::InvalidDomain(_)));

        let err = IrregularSignalBuilder::from_samples(vec![1.0], times(vec![f64::NAN]))
            .build()
            .unwrap_err();
        assert!(matches!(err, SignalError::InvalidDomain(_)));

        assert!(IrregularSignalBuilder::from_samples(vec![1.0, 2.0], times(vec![0.5, 0.5]))
            .build()
            .is_ok());
    }

    #[test]
    fn test_accessors() {
        let s = spikes();
        assert_eq!(s.start(), Some(Quantity::seconds(0.0)));
        assert_eq!(s.end(), Some(Quantity::seconds(1.0)));
        assert_eq!(s.duration(), Quantity::seconds(1.0));
        assert_eq!(s.domain_name(), "time");
        let intervals = s.sampling_intervals();
        assert_eq!(intervals.len(), 4);
        assert!((intervals.values[1] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_slice_keeps_domain() {
        let part = spikes().slice(1..3).unwrap();
        assert_eq!(part.domain().values, array![0.1, 0.3]);
        assert_eq!(part.data(), &array![[2.0], [3.0]]);
        assert!(spikes().slice(2..6).is_err());
    }

    #[test]
    fn test_interval_exact_lookup() {
        let s = spikes();
        let part = s
            .interval(Some(&Quantity::from_ms(100.0)), Some(&Quantity::seconds(0.35)))
            .unwrap();
        assert_eq!(part.data(), &array![[2.0], [3.0], [4.0]]);

        assert!(matches!(
            s.interval(Some(&Quantity::seconds(0.2)), None),
            Err(SignalError::ValueNotFound(_))
        ));
        assert!(matches!(
            s.interval(Some(&Quantity::seconds(1.0)), Some(&Quantity::seconds(0.1))),
            Err(SignalError::RangeError(_))
        ));
        assert_eq!(s.interval(None, None).unwrap().len(), 5);
    }

    #[test]
    fn test_range_scan() {
        let s = spikes();
        let part = s
            .range(Some(&Quantity::seconds(0.05)), Some(&Quantity::seconds(0.35)))
            .unwrap();
        assert_eq!(part.domain().values, array![0.1, 0.3, 0.35]);
        assert_eq!(s.range(None, Some(&Quantity::seconds(-1.0))).unwrap().len(), 0);
        assert_eq!(s.range(Some(&Quantity::seconds(0.3)), None).unwrap().len(), 3);
    }

    #[test]
    fn test_shift_and_rescale_domain() {
        let s = spikes().shift(&Quantity::from_ms(500.0)).unwrap();
        assert!((s.domain().values[0] - 0.5).abs() < 1e-12);

        let ms = s.rescale_domain(&Unit::millisecond()).unwrap();
        assert_eq!(ms.domain_unit(), &Unit::millisecond());
        assert!((ms.domain().values[4] - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_mean() {
        let s = IrregularSignalBuilder::from_samples(
            vec![1.0, 3.0, 100.0],
            times(vec![0.0, 1.0, 4.0]),
        )
        .build()
        .unwrap();
        // (1 * 1 + 3 * 3) / 4
        assert!((s.mean().values[0] - 2.5).abs() < 1e-12);

        let with_nan = IrregularSignalBuilder::from_samples(
            vec![f64::NAN, 3.0, 100.0],
            times(vec![0.0, 1.0, 4.0]),
        )
        .build()
        .unwrap();
        assert!(with_nan.mean().values[0].is_nan());
        assert!((with_nan.nanmean().values[0] - 3.0).abs() < 1e-12);

        let single = IrregularSignalBuilder::from_samples(vec![1.0], times(vec![0.0]))
            .build()
            .unwrap();
        assert!(single.mean().values[0].is_nan());
    }

    #[test]
    fn test_to_regular() {
        let s = IrregularSignalBuilder::from_samples(
            vec![0.0, 10.0, 30.0],
            times(vec![0.0, 1.0, 2.0]),
        )
        .unit(Unit::millivolt())
        .build()
        .unwrap();
        let regular = s.to_regular(5).unwrap();
        assert_eq!(regular.len(), 5);
        assert_eq!(regular.origin(), &Quantity::seconds(0.0));
        assert_eq!(regular.sampling_period(), &Quantity::seconds(0.5));
        let expected = [0.0, 5.0, 10.0, 20.0, 30.0];
        for (a, b) in regular.data().column(0).iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12);
        }

        assert!(matches!(s.to_regular(1), Err(SignalError::InvalidFactor(_))));
    }

    #[test]
    fn test_arithmetic_requires_same_domain() {
        let a = spikes();
        let b = a.rescale(&Unit::volt()).unwrap();
        let sum = a.try_add(&b).unwrap();
        assert!((sum.data()[[2, 0]] - 6.0).abs() < 1e-12);

        let shifted = a.shift(&Quantity::seconds(1.0)).unwrap();
        assert!(matches!(
            a.try_add(&shifted),
            Err(SignalError::InconsistentSignals(_))
        ));
    }

    #[test]
    fn test_arithmetic_converts_domain_unit() {
        let a = spikes();
        let in_ms = a.rescale_domain(&Unit::millisecond()).unwrap();
        assert!((in_ms.domain().values[2] - 300.0).abs() < 1e-9);

        let sum = a.try_add(&in_ms).unwrap();
        assert_eq!(sum.domain_unit(), &Unit::second());
        assert_eq!(sum.data()[[4, 0]], 10.0);

        let nudged = in_ms.shift(&Quantity::new(1e-3, Unit::millisecond())).unwrap();
        assert!(matches!(
            a.try_add(&nudged),
            Err(SignalError::InconsistentSignals(_))
        ));
    }

    #[test]
    fn test_merge_shared_domain() {
        let a = spikes();
        let b = IrregularSignalBuilder::from_samples(
            vec![10.0, 20.0, 30.0, 40.0, 50.0],
            times(vec![0.0, 0.1, 0.3, 0.35, 1.0]),
        )
        .unit(Unit::volt())
        .name("w")
        .build()
        .unwrap();

        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.shape(), (5, 2));
        assert_eq!(merged.unit(), &Unit::millivolt());
        assert_eq!(merged.domain(), a.domain());
        assert!((merged.data()[[1, 1]] - 20_000.0).abs() < 1e-9);
        assert_eq!(merged.name(), Some("merge(v, w)"));

        let via_enum = crate::signal::merge(&[&Signal::from(a.clone()), &Signal::from(b)]).unwrap();
        assert_eq!(via_enum.channel_count(), 2);
    }

    #[test]
    fn test_merge_rejects_other_domain() {
        let a = spikes();
        let b = IrregularSignalBuilder::from_samples(
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            times(vec![0.0, 0.1, 0.2, 0.35, 1.0]),
        )
        .unit(Unit::millivolt())
        .build()
        .unwrap();
        assert!(matches!(a.merge(&b), Err(SignalError::MergeError(_))));

        let shorter = a.slice(..4).unwrap();
        assert!(matches!(a.merge(&shorter), Err(SignalError::MergeError(_))));
    }

    #[test]
    fn test_merge_rejects_unrelated_unit() {
        let a = spikes();
        let current = IrregularSignalBuilder::from_samples(
            vec![0.0; 5],
            times(vec![0.0, 0.1, 0.3, 0.35, 1.0]),
        )
        .unit(Unit::picoampere())
        .build()
        .unwrap();
        assert!(matches!(
            concat::merge(&[&a, &current]),
            Err(SignalError::MergeError(_))
        ));
    }

    #[test]
    fn test_equality() {
        let s = spikes();
        assert_eq!(s, s.clone());
        assert_eq!(s, s.rescale_domain(&Unit::second()).unwrap());
        assert_ne!(s, s.slice(..4).unwrap());
    }

    #[test]
    fn test_serde_round_trip() {
        let s = spikes();
        let json = serde_json::to_string(&s).unwrap();
        let back: IrregularSignal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        assert_eq!(back.name(), Some("v"));
    }
}
