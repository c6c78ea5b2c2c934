//! Channel merging, domain concatenation and splicing.
//!
//! - [`merge`] stacks the channels of signals that share one domain.
//! - [`concatenate`] joins regular signals along the domain into one signal
//!   covering all of them, resolving overlaps by priority and optionally
//!   padding gaps.
//! - [`splice`] writes one regular signal into a copy of another.

use crate::algebra::Sampled;
use crate::domain::{approx_equal, round_half_even, PERIOD_REL_TOL};
use crate::error::{SignalError, SignalResult};
use crate::metadata::{
    common_array_annotations, join_labels, merge_annotations, stack_array_annotations, Annotations,
    Metadata,
};
use crate::regular::RegularSignal;
use lib_units::Quantity;
use ndarray::{s, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Upper bound on `samples * channels` of a concatenation result.
pub const MAX_CONCAT_VALUES: usize = 1 << 28;

/// How gaps between concatenated signals are treated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
    /// Gaps wider than one sampling period are an error.
    #[default]
    None,
    /// Fill gaps with NaN.
    Auto,
    /// Fill gaps with this value, converted into the signal unit.
    Value(Quantity),
}

/// Options for [`concatenate`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcatOptions {
    /// Later inputs win where inputs overlap; otherwise earlier inputs win.
    #[serde(default)]
    pub overwrite: bool,

    #[serde(default)]
    pub padding: Padding,
}

impl ConcatOptions {
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }
}

/// Combine labels of several inputs as `op(a, b, ...)`.
fn joined_metadata(op: &str, inputs: &[&Metadata]) -> Metadata {
    let annotations = inputs
        .iter()
        .fold(Annotations::new(), |acc, m| merge_annotations(&acc, &m.annotations));
    Metadata {
        name: join_labels(op, inputs.iter().map(|m| &m.name)),
        description: join_labels(op, inputs.iter().map(|m| &m.description)),
        file_origin: join_labels(op, inputs.iter().map(|m| &m.file_origin)),
        annotations,
        array_annotations: Default::default(),
    }
}

/// Stack the channels of signals sharing one domain.
///
/// Units are converted into the first input's unit. Inputs must have the
/// same domain, the same owner and convertible units.
pub fn merge<S: Sampled>(signals: &[&S]) -> SignalResult<S> {
    let (first, rest) = signals
        .split_first()
        .ok_or_else(|| SignalError::MergeError("nothing to merge".into()))?;

    for other in rest {
        if other.data().nrows() != first.data().nrows() {
            return Err(SignalError::MergeError(format!(
                "signals have different lengths: {} vs {}",
                first.data().nrows(),
                other.data().nrows()
            )));
        }
        first
            .check_aligned(other)
            .map_err(SignalError::into_merge_error)?;
        if other.owner() != first.owner() {
            return Err(SignalError::MergeError(
                "signals belong to different owners".into(),
            ));
        }
        if !other.unit().is_convertible_to(first.unit()) {
            return Err(SignalError::MergeError(format!(
                "cannot merge signals in {} and {}",
                first.unit(),
                other.unit()
            )));
        }
    }

    let unit = first.unit().clone();
    let blocks = signals
        .iter()
        .map(|s| -> SignalResult<Array2<f64>> {
            let factor = s.unit().factor_to(&unit)?;
            Ok(s.data().mapv(|v| v * factor))
        })
        .collect::<SignalResult<Vec<_>>>()?;
    let views: Vec<ArrayView2<f64>> = blocks.iter().map(|b| b.view()).collect();
    let data = ndarray::concatenate(Axis(1), &views)
        .map_err(|e| SignalError::MergeError(e.to_string()))?;

    let metas: Vec<&Metadata> = signals.iter().map(|s| s.metadata()).collect();
    let mut metadata = joined_metadata("merge", &metas);
    metadata.array_annotations = stack_array_annotations(&metas);

    Ok(first.derive(data, unit, metadata))
}

/// Coalesce sorted `[start, end)` spans that overlap or touch.
fn merge_spans(sorted: &[(f64, f64)], tolerance: f64) -> Vec<(f64, f64)> {
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(sorted.len());
    for &(start, end) in sorted {
        match merged.last_mut() {
            Some(last) if start <= last.1 + tolerance => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Copy the rows of `signal` into `data`, whose first row sits at `origin`.
///
/// Rows falling outside `data` are clipped.
fn splice_rows(data: &mut Array2<f64>, origin: f64, period: f64, signal: &RegularSignal) {
    let start = round_half_even((signal.origin().value - origin) / period) as i64;
    let skip = if start < 0 { start.unsigned_abs() as usize } else { 0 };
    let dest = start.max(0) as usize;
    if skip >= signal.len() || dest >= data.nrows() {
        return;
    }
    let count = (signal.len() - skip).min(data.nrows() - dest);
    data.slice_mut(s![dest..dest + count, ..])
        .assign(&signal.data().slice(s![skip..skip + count, ..]));
}

/// Join regular signals along their domain.
///
/// The result spans from the earliest origin to the latest end and is
/// filled from the inputs in priority order. Uncovered samples take the
/// padding value.
pub fn concatenate(signals: &[&RegularSignal], options: &ConcatOptions) -> SignalResult<RegularSignal> {
    let first = signals
        .first()
        .ok_or_else(|| SignalError::MergeError("nothing to concatenate".into()))?;
    let unit = first.unit().clone();
    let domain_unit = first.domain_unit().clone();
    let period = first.sampling_period().value;
    let channels = first.channel_count();

    let mut aligned = Vec::with_capacity(signals.len());
    for signal in signals {
        if signal.channel_count() != channels {
            return Err(SignalError::MergeError(format!(
                "channel counts differ: {} vs {}",
                channels,
                signal.channel_count()
            )));
        }
        let signal = signal
            .rescale(&unit)
            .and_then(|s| s.rescale_domain(&domain_unit))
            .map_err(SignalError::into_merge_error)?;
        if !approx_equal(signal.sampling_period().value, period, PERIOD_REL_TOL) {
            return Err(SignalError::MergeError(format!(
                "sampling periods differ: {} vs {}",
                first.sampling_period(),
                signal.sampling_period()
            )));
        }
        aligned.push(signal);
    }

    let fill = match &options.padding {
        Padding::Value(q) => q.value_in(&unit)?,
        Padding::None | Padding::Auto => f64::NAN,
    };

    let mut spans: Vec<(f64, f64)> = aligned
        .iter()
        .map(|s| (s.origin().value, s.end().value))
        .collect();
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    let covered = merge_spans(&spans, period * PERIOD_REL_TOL);

    let widest_gap = covered
        .windows(2)
        .map(|w| w[1].0 - w[0].1)
        .fold(0.0_f64, f64::max);
    if widest_gap > 0.0 {
        if options.padding == Padding::None && widest_gap > period * (1.0 + PERIOD_REL_TOL) {
            return Err(SignalError::MergeError("signals are not continuous".into()));
        }
        tracing::debug!(
            "Concatenation leaves {} gap(s), widest {} {}; filling with {}",
            covered.len() - 1,
            widest_gap,
            domain_unit,
            fill
        );
    }

    let t_start = covered.first().map(|c| c.0).unwrap_or(first.origin().value);
    let t_stop = covered.iter().map(|c| c.1).fold(t_start, f64::max);
    let samples = round_half_even((t_stop - t_start) / period).max(0.0);
    if !samples.is_finite() || samples * channels.max(1) as f64 > MAX_CONCAT_VALUES as f64 {
        return Err(SignalError::MergeError(format!(
            "concatenated signal would hold {} samples x {} channels",
            samples, channels
        )));
    }
    let len = samples as usize;

    let mut data = Array2::from_elem((len, channels), fill);
    let mut order: Vec<&RegularSignal> = aligned.iter().collect();
    if !options.overwrite {
        order.reverse();
    }
    for signal in order {
        splice_rows(&mut data, t_start, period, signal);
    }

    let metas: Vec<&Metadata> = aligned.iter().map(|s| s.metadata()).collect();
    let mut metadata = joined_metadata("concat", &metas);
    metadata.array_annotations = common_array_annotations(&metas);

    tracing::debug!(
        "Concatenated {} signals into {} samples from {} {}",
        signals.len(),
        len,
        t_start,
        domain_unit
    );

    Ok(RegularSignal::from_parts(
        data,
        unit,
        Quantity::new(t_start, domain_unit.clone()),
        Quantity::new(period, domain_unit),
        metadata,
        None,
    ))
}

/// Write `other` into a copy of `base` at the position of `other`'s origin.
///
/// Parts of `other` outside `base` are dropped.
pub fn splice(base: &RegularSignal, other: &RegularSignal) -> SignalResult<RegularSignal> {
    if other.channel_count() != base.channel_count() {
        return Err(SignalError::MergeError(format!(
            "channel counts differ: {} vs {}",
            base.channel_count(),
            other.channel_count()
        )));
    }
    let other = other
        .rescale(base.unit())?
        .rescale_domain(base.domain_unit())?;
    let period = base.sampling_period().value;
    if !approx_equal(other.sampling_period().value, period, PERIOD_REL_TOL) {
        return Err(SignalError::MergeError(format!(
            "sampling periods differ: {} vs {}",
            base.sampling_period(),
            other.sampling_period()
        )));
    }

    let mut out = base.clone();
    splice_rows(out.data_mut(), base.origin().value, period, &other);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::AnnotationValue;
    use crate::regular::RegularSignalBuilder;
    use lib_units::Unit;
    use ndarray::array;

    fn block(values: Vec<f64>, origin: f64, name: &str) -> RegularSignal {
        RegularSignalBuilder::from_samples(values)
            .unit(Unit::millivolt())
            .origin(Quantity::seconds(origin))
            .sampling_period(Quantity::seconds(1.0))
            .name(name)
            .build()
            .unwrap()
    }

    #[test]
    fn test_contiguous_concatenation_is_vstack() {
        let a = block(vec![1.0, 2.0, 3.0], 0.0, "a");
        let b = block(vec![4.0, 5.0], 3.0, "b");
        let out = concatenate(&[&a, &b], &ConcatOptions::default()).unwrap();
        assert_eq!(out.len(), 5);
        assert_eq!(out.origin(), &Quantity::seconds(0.0));
        assert_eq!(out.data(), &array![[1.0], [2.0], [3.0], [4.0], [5.0]]);
        assert_eq!(out.name(), Some("concat(a, b)"));
        assert_eq!(out.owner(), None);
    }

    #[test]
    fn test_input_order_does_not_matter_without_overlap() {
        let a = block(vec![1.0, 2.0], 0.0, "x");
        let b = block(vec![3.0, 4.0], 2.0, "x");
        let out = concatenate(&[&b, &a], &ConcatOptions::default()).unwrap();
        assert_eq!(out.data(), &array![[1.0], [2.0], [3.0], [4.0]]);
        assert_eq!(out.name(), Some("x"));
    }

    #[test]
    fn test_overlap_priority() {
        let a = block(vec![1.0, 1.0, 1.0], 0.0, "a");
        let b = block(vec![2.0, 2.0, 2.0], 2.0, "b");

        let earlier_wins = concatenate(&[&a, &b], &ConcatOptions::default()).unwrap();
        assert_eq!(earlier_wins.data().column(0).to_vec(), vec![1.0, 1.0, 1.0, 2.0, 2.0]);

        let later_wins = concatenate(&[&a, &b], &ConcatOptions::default().overwrite(true)).unwrap();
        assert_eq!(later_wins.data().column(0).to_vec(), vec![1.0, 1.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_gap_handling() {
        let a = block(vec![1.0, 2.0], 0.0, "a");
        let b = block(vec![3.0], 5.0, "b");

        assert_eq!(
            concatenate(&[&a, &b], &ConcatOptions::default()).unwrap_err(),
            SignalError::MergeError("signals are not continuous".into())
        );

        let auto = concatenate(&[&a, &b], &ConcatOptions::default().padding(Padding::Auto)).unwrap();
        assert_eq!(auto.len(), 6);
        assert!(auto.data().slice(s![2..5, 0]).iter().all(|v| v.is_nan()));
        assert_eq!(auto.data()[[5, 0]], 3.0);

        let padded = concatenate(
            &[&a, &b],
            &ConcatOptions::default().padding(Padding::Value(Quantity::new(0.0, Unit::volt()))),
        )
        .unwrap();
        assert_eq!(padded.data().column(0).to_vec(), vec![1.0, 2.0, 0.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_oversized_gap_is_rejected() {
        let ms = Quantity::from_ms(1.0);
        let near = RegularSignalBuilder::from_samples(vec![1.0, 2.0])
            .sampling_period(ms.clone())
            .build()
            .unwrap();
        let far = RegularSignalBuilder::from_samples(vec![3.0])
            .origin(Quantity::seconds(1e12))
            .sampling_period(ms)
            .build()
            .unwrap();

        let err = concatenate(&[&near, &far], &ConcatOptions::default().padding(Padding::Auto))
            .unwrap_err();
        assert!(matches!(err, SignalError::MergeError(msg) if msg.contains("would hold")));
    }

    #[test]
    fn test_concatenate_converts_units() {
        let a = block(vec![1.0], 0.0, "a");
        let b = RegularSignalBuilder::from_samples(vec![0.002])
            .unit(Unit::volt())
            .origin(Quantity::from_ms(1000.0))
            .sampling_period(Quantity::from_ms(1000.0))
            .build()
            .unwrap();
        let out = concatenate(&[&a, &b], &ConcatOptions::default()).unwrap();
        assert_eq!(out.unit(), &Unit::millivolt());
        assert_eq!(out.domain_unit(), &Unit::second());
        assert!((out.data()[[1, 0]] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_concatenate_rejects_mismatches() {
        let a = block(vec![1.0], 0.0, "a");
        let fast = RegularSignalBuilder::from_samples(vec![1.0])
            .unit(Unit::millivolt())
            .sampling_period(Quantity::seconds(0.5))
            .build()
            .unwrap();
        assert!(matches!(
            concatenate(&[&a, &fast], &ConcatOptions::default()),
            Err(SignalError::MergeError(_))
        ));

        let current = RegularSignalBuilder::from_samples(vec![1.0])
            .unit(Unit::ampere())
            .build()
            .unwrap();
        assert!(matches!(
            concatenate(&[&a, &current], &ConcatOptions::default()),
            Err(SignalError::MergeError(_))
        ));

        let wide = RegularSignal::builder(Array2::zeros((1, 2)))
            .unit(Unit::millivolt())
            .build()
            .unwrap();
        assert!(matches!(
            concatenate(&[&a, &wide], &ConcatOptions::default()),
            Err(SignalError::MergeError(_))
        ));
        assert!(concatenate(&[], &ConcatOptions::default()).is_err());
    }

    #[test]
    fn test_concatenate_merges_annotations() {
        let a = RegularSignalBuilder::from_samples(vec![1.0])
            .annotation("site", "CA1")
            .build()
            .unwrap();
        let b = RegularSignalBuilder::from_samples(vec![2.0])
            .origin(Quantity::seconds(1.0))
            .annotation("site", "CA3")
            .build()
            .unwrap();
        let out = concatenate(&[&a, &b], &ConcatOptions::default()).unwrap();
        assert_eq!(out.metadata().annotations["site"], AnnotationValue::from("CA1;CA3"));
    }

    #[test]
    fn test_merge_channels() {
        let a = RegularSignal::builder(array![[1.0], [2.0]])
            .unit(Unit::millivolt())
            .name("a")
            .array_annotation("ch", vec!["x".into()])
            .build()
            .unwrap();
        let b = RegularSignal::builder(array![[0.003, 0.005], [0.004, 0.006]])
            .unit(Unit::volt())
            .name("b")
            .array_annotation("ch", vec!["y".into(), "z".into()])
            .build()
            .unwrap();
        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.shape(), (2, 3));
        assert_eq!(merged.unit(), &Unit::millivolt());
        assert!((merged.data()[[1, 2]] - 6.0).abs() < 1e-12);
        assert_eq!(merged.name(), Some("merge(a, b)"));
        assert_eq!(merged.metadata().array_annotations["ch"].len(), 3);
    }

    #[test]
    fn test_merge_rejects_non_convertible_units() {
        let a = block(vec![1.0, 2.0], 0.0, "a");
        let b = RegularSignalBuilder::from_samples(vec![1.0, 2.0])
            .unit(Unit::picoampere())
            .build()
            .unwrap();
        assert!(matches!(a.merge(&b), Err(SignalError::MergeError(_))));
    }

    #[test]
    fn test_merge_rejects_other_domains() {
        let a = block(vec![1.0, 2.0], 0.0, "a");
        assert!(matches!(
            a.merge(&block(vec![1.0, 2.0], 1.0, "b")),
            Err(SignalError::MergeError(_))
        ));
        assert!(matches!(
            a.merge(&block(vec![1.0], 0.0, "b")),
            Err(SignalError::MergeError(_))
        ));

        let mut owned = block(vec![1.0, 2.0], 0.0, "b");
        owned.set_owner(Some(crate::OwnerHandle(1)));
        assert!(matches!(a.merge(&owned), Err(SignalError::MergeError(_))));
    }

    #[test]
    fn test_splice_clips() {
        let base = block(vec![0.0; 5], 0.0, "base");
        let patch = block(vec![7.0, 8.0, 9.0], 3.0, "patch");
        let out = splice(&base, &patch).unwrap();
        assert_eq!(out.data().column(0).to_vec(), vec![0.0, 0.0, 0.0, 7.0, 8.0]);
        assert_eq!(out.name(), Some("base"));

        let early = block(vec![1.0, 2.0, 3.0], -2.0, "early");
        let out = base.splice(&early).unwrap();
        assert_eq!(out.data().column(0).to_vec(), vec![3.0, 0.0, 0.0, 0.0, 0.0]);

        let outside = block(vec![1.0], 10.0, "far");
        assert_eq!(splice(&base, &outside).unwrap(), base);
    }

    #[test]
    fn test_splice_rejects_incompatible() {
        let base = block(vec![0.0; 5], 0.0, "base");
        let current = RegularSignalBuilder::from_samples(vec![1.0])
            .unit(Unit::ampere())
            .build()
            .unwrap();
        assert!(matches!(
            splice(&base, &current),
            Err(SignalError::IncompatibleUnits { .. })
        ));
    }

    #[test]
    fn test_merge_spans() {
        let spans = [(0.0, 2.0), (1.0, 3.0), (3.0, 4.0), (6.0, 7.0)];
        assert_eq!(merge_spans(&spans, 0.0), vec![(0.0, 4.0), (6.0, 7.0)]);
    }
}
