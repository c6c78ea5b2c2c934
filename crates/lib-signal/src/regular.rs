//! Regularly sampled signals.
//!
//! A [`RegularSignal`] stores an `(N, C)` sample matrix together with the
//! domain coordinate of the first sample (`origin`) and a fixed sampling
//! period. The domain of sample `k` is `origin + k * period`; it is only
//! materialized on request. The period is stored in the origin's unit and the
//! sampling rate is derived from it on read.

use crate::algebra::Sampled;
use crate::concat::{self, ConcatOptions};
use crate::domain::{approx_equal, resolve_range, round_half_even, PERIOD_RATE_REL_TOL, PERIOD_REL_TOL};
use crate::error::{SignalError, SignalResult};
use crate::metadata::{AnnotationValue, Metadata, OwnerHandle};
use crate::resample;
use lib_units::{family_name, Dimension, Quantity, QuantityArray, Unit};
use ndarray::{s, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::ops::RangeBounds;

/// Signal sampled at a fixed period.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "RegularSignalRecord")]
pub struct RegularSignal {
    data: Array2<f64>,
    unit: Unit,
    origin: Quantity,
    sampling_period: Quantity,
    #[serde(flatten)]
    metadata: Metadata,
    #[serde(skip)]
    owner: Option<OwnerHandle>,
}

/// Serialized form; deserialization re-validates through the builder.
#[derive(Deserialize)]
struct RegularSignalRecord {
    data: Array2<f64>,
    #[serde(default)]
    unit: Unit,
    origin: Quantity,
    sampling_period: Quantity,
    #[serde(flatten)]
    metadata: Metadata,
}

impl TryFrom<RegularSignalRecord> for RegularSignal {
    type Error = SignalError;

    fn try_from(record: RegularSignalRecord) -> SignalResult<Self> {
        RegularSignalBuilder::new(record.data)
            .unit(record.unit)
            .origin(record.origin)
            .sampling_period(record.sampling_period)
            .metadata(record.metadata)
            .build()
    }
}

/// Validating builder for [`RegularSignal`].
///
/// Either the sampling period, the sampling rate or both may be given. When
/// neither is set the period is one domain unit; the domain unit defaults to
/// seconds.
#[derive(Clone, Debug)]
pub struct RegularSignalBuilder {
    data: Array2<f64>,
    unit: Unit,
    origin: Option<Quantity>,
    sampling_period: Option<Quantity>,
    sampling_rate: Option<Quantity>,
    metadata: Metadata,
    owner: Option<OwnerHandle>,
}

impl RegularSignalBuilder {
    pub fn new(data: Array2<f64>) -> Self {
        Self {
            data,
            unit: Unit::dimensionless(),
            origin: None,
            sampling_period: None,
            sampling_rate: None,
            metadata: Metadata::default(),
            owner: None,
        }
    }

    /// Single-channel signal from a flat sample vector.
    pub fn from_samples(samples: Vec<f64>) -> Self {
        Self::new(Array1::from(samples).insert_axis(Axis(1)))
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn origin(mut self, origin: Quantity) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn sampling_period(mut self, period: Quantity) -> Self {
        self.sampling_period = Some(period);
        self
    }

    pub fn sampling_rate(mut self, rate: Quantity) -> Self {
        self.sampling_rate = Some(rate);
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

    /// Per-channel annotation; needs one value per channel.
    pub fn array_annotation(mut self, key: impl Into<String>, values: Vec<AnnotationValue>) -> Self {
        self.metadata.array_annotations.insert(key.into(), values);
        self
    }

    /// Replace all labels and annotations.
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn owner(mut self, owner: OwnerHandle) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn build(self) -> SignalResult<RegularSignal> {
        let domain_unit = self.origin.as_ref().map(|o| o.unit.clone());
        let period = resolve_period(domain_unit.as_ref(), self.sampling_period, self.sampling_rate)?;

        let origin = match self.origin {
            Some(origin) => origin,
            None => Quantity::zero(period.unit.clone()),
        };
        let sampling_period = period.rescale(&origin.unit)?;

        if !(sampling_period.value.is_finite() && sampling_period.value > 0.0) {
            return Err(SignalError::InconsistentSampling(format!(
                "sampling period must be positive and finite, got {}",
                sampling_period
            )));
        }
        if !origin.value.is_finite() {
            return Err(SignalError::InconsistentSampling(format!(
                "origin must be finite, got {}",
                origin
            )));
        }
        check_array_annotations(&self.metadata, self.data.ncols())?;

        Ok(RegularSignal {
            data: self.data,
            unit: self.unit,
            origin,
            sampling_period,
            metadata: self.metadata,
            owner: self.owner,
        })
    }
}

/// Work out the sampling period from whichever of period and rate is known.
fn resolve_period(
    domain_unit: Option<&Unit>,
    period: Option<Quantity>,
    rate: Option<Quantity>,
) -> SignalResult<Quantity> {
    match (period, rate) {
        (Some(period), Some(rate)) => {
            let from_rate = rate_to_period(&rate, Some(&period.unit))?;
            if !approx_equal(period.value, from_rate.value, PERIOD_RATE_REL_TOL) {
                return Err(SignalError::InconsistentSampling(format!(
                    "sampling period {} does not match sampling rate {}",
                    period, rate
                )));
            }
            Ok(period)
        }
        (Some(period), None) => Ok(period),
        (None, Some(rate)) => rate_to_period(&rate, domain_unit),
        (None, None) => Ok(Quantity::new(
            1.0,
            domain_unit.cloned().unwrap_or_else(Unit::second),
        )),
    }
}

/// Invert a rate into a period expressed in `domain_unit`.
///
/// Without a domain unit, frequencies map to seconds and anything else to
/// the reciprocal of the rate unit.
fn rate_to_period(rate: &Quantity, domain_unit: Option<&Unit>) -> SignalResult<Quantity> {
    let target = match domain_unit {
        Some(unit) => unit.clone(),
        None if rate.unit.dimension() == Dimension::FREQUENCY => Unit::second(),
        None => rate.unit.reciprocal(),
    };
    Ok(rate.reciprocal().rescale(&target)?)
}

pub(crate) fn check_array_annotations(metadata: &Metadata, channels: usize) -> SignalResult<()> {
    metadata
        .check_channels(channels)
        .map_err(|(expected, actual)| SignalError::shape("array annotation", expected, actual))
}

impl RegularSignal {
    pub fn builder(data: Array2<f64>) -> RegularSignalBuilder {
        RegularSignalBuilder::new(data)
    }

    /// Assemble without validation; callers uphold the invariants.
    pub(crate) fn from_parts(
        data: Array2<f64>,
        unit: Unit,
        origin: Quantity,
        sampling_period: Quantity,
        metadata: Metadata,
        owner: Option<OwnerHandle>,
    ) -> Self {
        Self {
            data,
            unit,
            origin,
            sampling_period,
            metadata,
            owner,
        }
    }

    #[inline]
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut Array2<f64> {
        &mut self.data
    }

    pub fn into_data(self) -> Array2<f64> {
        self.data
    }

    /// Number of samples.
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

    /// `(samples, channels)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    #[inline]
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    #[inline]
    pub fn domain_unit(&self) -> &Unit {
        &self.origin.unit
    }

    #[inline]
    pub fn origin(&self) -> &Quantity {
        &self.origin
    }

    #[inline]
    pub fn sampling_period(&self) -> &Quantity {
        &self.sampling_period
    }

    /// Reciprocal of the sampling period, in the reciprocal domain unit.
    pub fn sampling_rate(&self) -> Quantity {
        self.sampling_period.reciprocal()
    }

    /// `N * period`.
    pub fn duration(&self) -> Quantity {
        self.sampling_period.clone() * self.len() as f64
    }

    /// Exclusive stop of the domain, `origin + duration`.
    pub fn end(&self) -> Quantity {
        Quantity::new(
            self.origin.value + self.duration().value,
            self.origin.unit.clone(),
        )
    }

    /// Domain coordinate of every sample.
    pub fn domain(&self) -> QuantityArray {
        let origin = self.origin.value;
        let period = self.sampling_period.value;
        QuantityArray::new(
            Array1::from_shape_fn(self.len(), |k| origin + k as f64 * period),
            self.origin.unit.clone(),
        )
    }

    /// Quantity family of the domain, e.g. `"time"`.
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

    /// Replace labels and annotations.
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

    /// All channels of sample `index`.
    pub fn at(&self, index: usize) -> SignalResult<QuantityArray> {
        self.check_index(index)?;
        Ok(QuantityArray::new(
            self.data.row(index).to_owned(),
            self.unit.clone(),
        ))
    }

    /// One value.
    pub fn get(&self, index: usize, channel: usize) -> SignalResult<Quantity> {
        self.check_index(index)?;
        self.check_channel(channel)?;
        Ok(Quantity::new(self.data[[index, channel]], self.unit.clone()))
    }

    /// Overwrite one value; `value` is converted into the signal unit.
    pub fn set(&mut self, index: usize, channel: usize, value: &Quantity) -> SignalResult<()> {
        self.check_index(index)?;
        self.check_channel(channel)?;
        let converted = value.value_in(&self.unit)?;
        self.data[[index, channel]] = converted;
        Ok(())
    }

    /// Overwrite one sample across all channels, values in the signal unit.
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

    /// Copy of samples `range`; the origin moves to the first kept sample.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> SignalResult<Self> {
        let (start, stop) = resolve_range(&range, self.len())?;
        let origin = Quantity::new(
            self.origin.value + start as f64 * self.sampling_period.value,
            self.origin.unit.clone(),
        );
        Ok(Self::from_parts(
            self.data.slice(s![start..stop, ..]).to_owned(),
            self.unit.clone(),
            origin,
            self.sampling_period.clone(),
            self.metadata.clone(),
            self.owner,
        ))
    }

    /// Copy of the given channels, in the given order.
    pub fn select_channels(&self, channels: &[usize]) -> SignalResult<Self> {
        for &c in channels {
            self.check_channel(c)?;
        }
        Ok(Self::from_parts(
            self.data.select(Axis(1), channels),
            self.unit.clone(),
            self.origin.clone(),
            self.sampling_period.clone(),
            self.metadata.select_channels(channels),
            self.owner,
        ))
    }

    /// Sample index nearest to domain value `t`, ties to even.
    ///
    /// The result may lie outside `0..len`.
    pub fn domain_index(&self, t: &Quantity) -> SignalResult<i64> {
        let t = t.value_in(self.domain_unit())?;
        let k = round_half_even((t - self.origin.value) / self.sampling_period.value);
        if !k.is_finite() {
            return Err(SignalError::RangeError(format!(
                "domain value {} has no sample index",
                t
            )));
        }
        Ok(k as i64)
    }

    /// Samples whose domain lies in `[start, stop)`.
    ///
    /// `None` bounds mean the signal start or end.
    pub fn interval(&self, start: Option<&Quantity>, stop: Option<&Quantity>) -> SignalResult<Self> {
        let len = self.len() as i64;
        let i = match start {
            Some(t) => self.domain_index(t)?,
            None => 0,
        };
        let j = match stop {
            Some(t) => self.domain_index(t)?,
            None => len,
        };

        if i < 0 {
            return Err(SignalError::RangeError(format!(
                "start index {} lies before the signal origin {}",
                i, self.origin
            )));
        }
        if j > len {
            return Err(SignalError::RangeError(format!(
                "stop index {} lies after the signal end {}",
                j,
                self.end()
            )));
        }
        if i > j {
            return Err(SignalError::RangeError(format!(
                "start index {} is after stop index {}",
                i, j
            )));
        }

        self.slice(i as usize..j as usize)
    }

    /// Copy with the origin moved by `dt`.
    pub fn shift(&self, dt: &Quantity) -> SignalResult<Self> {
        let dt = dt.value_in(self.domain_unit())?;
        let mut shifted = self.clone();
        shifted.origin.value += dt;
        Ok(shifted)
    }

    /// Copy with the samples expressed in `to`.
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

    /// Copy with origin and period expressed in `to`.
    pub fn rescale_domain(&self, to: &Unit) -> SignalResult<Self> {
        let mut out = self.clone();
        out.origin = self.origin.rescale(to)?;
        out.sampling_period = self.sampling_period.rescale(to)?;
        Ok(out)
    }

    /// Arithmetic mean per channel; NaN for an empty signal.
    pub fn mean(&self) -> QuantityArray {
        let means = self
            .data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::from_elem(self.channel_count(), f64::NAN));
        QuantityArray::new(means, self.unit.clone())
    }

    /// Mean per channel ignoring NaN samples.
    pub fn nanmean(&self) -> QuantityArray {
        let means = self
            .data
            .axis_iter(Axis(1))
            .map(|column| {
                let (sum, count) = column
                    .iter()
                    .filter(|v| !v.is_nan())
                    .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                if count == 0 {
                    f64::NAN
                } else {
                    sum / count as f64
                }
            })
            .collect::<Array1<f64>>();
        QuantityArray::new(means, self.unit.clone())
    }

    /// Stack the channels of `other` after this signal's channels.
    pub fn merge(&self, other: &Self) -> SignalResult<Self> {
        concat::merge(&[self, other])
    }

    /// Join `other` along the domain.
    pub fn concatenate(&self, other: &Self, options: &ConcatOptions) -> SignalResult<Self> {
        concat::concatenate(&[self, other], options)
    }

    /// Overwrite the part of this signal covered by `other`.
    pub fn splice(&self, other: &Self) -> SignalResult<Self> {
        concat::splice(self, other)
    }

    /// Low-pass filter and keep every `factor`-th sample.
    pub fn decimate(&self, factor: usize) -> SignalResult<Self> {
        resample::decimate(self, factor)
    }

    /// [`decimate`](Self::decimate) with an explicit anti-alias window.
    pub fn decimate_with(&self, factor: usize, window: lib_dsp::WindowType) -> SignalResult<Self> {
        resample::decimate_with(self, factor, window)
    }

    /// Resample to exactly `sample_count` samples over the same span.
    pub fn resample(&self, sample_count: usize) -> SignalResult<Self> {
        resample::resample(self, sample_count)
    }
}

impl Sampled for RegularSignal {
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
        let unit = self.domain_unit();
        let same = |a: &Quantity, b: &Quantity| {
            b.value_in(unit)
                .map(|v| approx_equal(a.value, v, PERIOD_REL_TOL))
                .unwrap_or(false)
        };

        if !same(&self.origin, &other.origin) {
            return Err(SignalError::InconsistentSignals(format!(
                "origins differ: {} vs {}",
                self.origin, other.origin
            )));
        }
        if !same(&self.sampling_period, &other.sampling_period) {
            return Err(SignalError::InconsistentSignals(format!(
                "sampling periods differ: {} vs {}",
                self.sampling_period, other.sampling_period
            )));
        }
        Ok(())
    }

    fn derive(&self, data: Array2<f64>, unit: Unit, metadata: Metadata) -> Self {
        Self::from_parts(
            data,
            unit,
            self.origin.clone(),
            self.sampling_period.clone(),
            metadata,
            self.owner,
        )
    }
}

impl PartialEq for RegularSignal {
    /// Same origin, rate and shape, and equal samples after unit conversion.
    fn eq(&self, other: &Self) -> bool {
        let same_domain = matches!(
            other.origin.value_in(self.domain_unit()),
            Ok(v) if v == self.origin.value
        ) && matches!(
            other.sampling_period.value_in(self.domain_unit()),
            Ok(v) if v == self.sampling_period.value
        );
        if !same_domain || self.shape() != other.shape() {
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
