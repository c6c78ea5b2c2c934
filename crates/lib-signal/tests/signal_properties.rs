//! End-to-end behaviour of the signal containers.

use lib_signal::{
    concatenate, ConcatOptions, IrregularSignalBuilder, Padding, Quantity, QuantityArray, RegularSignal,
    RegularSignalBuilder, Sampled, SignalError, Unit,
};
use ndarray::{array, concatenate as stack, Axis};

fn ramp(n: usize, origin_s: f64, period_s: f64) -> RegularSignal {
    RegularSignalBuilder::from_samples((0..n).map(|i| i as f64).collect())
        .unit(Unit::millivolt())
        .origin(Quantity::seconds(origin_s))
        .sampling_period(Quantity::seconds(period_s))
        .build()
        .unwrap()
}

#[test]
fn slicing_moves_origin_by_whole_periods() {
    let s = ramp(20, 1.5, 0.25);
    for (i, j) in [(0, 20), (3, 9), (19, 20), (7, 7)] {
        let part = s.slice(i..j).unwrap();
        assert_eq!(part.len(), j - i);
        assert!((part.origin().value - (1.5 + i as f64 * 0.25)).abs() < 1e-12);
        assert_eq!(part.sampling_period(), s.sampling_period());
    }
}

#[test]
fn rescale_round_trip_restores_samples() {
    let s = ramp(50, 0.0, 0.001);
    let back = s
        .rescale(&Unit::parse("uV").unwrap())
        .unwrap()
        .rescale(&Unit::millivolt())
        .unwrap();
    for (a, b) in back.data().iter().zip(s.data().iter()) {
        assert!((a - b).abs() <= 1e-12 * b.abs().max(1.0));
    }
}

#[test]
fn interval_selects_rounded_indices() {
    let s = ramp(10, 0.0, 0.1);
    let part = s
        .interval(Some(&Quantity::seconds(0.3)), Some(&Quantity::seconds(0.5)))
        .unwrap();
    assert_eq!(part.data(), &array![[3.0], [4.0]]);
}

#[test]
fn decimation_divides_rate_and_length() {
    let s = RegularSignalBuilder::from_samples(vec![0.5; 100])
        .sampling_rate(Quantity::hertz(1000.0))
        .build()
        .unwrap();
    let out = s.decimate(4).unwrap();
    assert_eq!(out.len(), 25);
    let rate = out.sampling_rate().value_in(&Unit::hertz()).unwrap();
    assert!((rate - 250.0).abs() < 1e-9);
}

#[test]
fn contiguous_concatenation_stacks_data() {
    let a = ramp(5, 0.0, 1.0);
    let b = ramp(5, 5.0, 1.0);
    let out = concatenate(&[&a, &b], &ConcatOptions::default()).unwrap();

    assert_eq!(out.len(), a.len() + b.len());
    assert_eq!(out.origin(), &Quantity::seconds(0.0));
    let expected = stack(Axis(0), &[a.data().view(), b.data().view()]).unwrap();
    assert_eq!(out.data(), &expected);
}

#[test]
fn concatenation_with_gap_needs_padding() {
    let a = ramp(5, 0.0, 1.0);
    let b = ramp(5, 8.0, 1.0);
    assert!(matches!(
        concatenate(&[&a, &b], &ConcatOptions::default()),
        Err(SignalError::MergeError(_))
    ));

    let out = concatenate(&[&a, &b], &ConcatOptions::default().padding(Padding::Auto)).unwrap();
    assert_eq!(out.len(), 13);
    assert_eq!(out.data().iter().filter(|v| v.is_nan()).count(), 3);
}

#[test]
fn channel_merge_rejects_unrelated_units() {
    let voltage = ramp(4, 0.0, 1.0);
    let current = RegularSignalBuilder::from_samples(vec![0.0; 4])
        .unit(Unit::picoampere())
        .build()
        .unwrap();
    assert!(matches!(
        voltage.merge(&current),
        Err(SignalError::MergeError(_))
    ));
}

#[test]
fn irregular_domain_must_not_decrease() {
    let domain = QuantityArray::from_vec(vec![0.0, 0.2, 0.1], Unit::second());
    assert!(matches!(
        IrregularSignalBuilder::from_samples(vec![1.0, 2.0, 3.0], domain).build(),
        Err(SignalError::InvalidDomain(_))
    ));
}

#[test]
fn irregular_to_regular_then_arithmetic() {
    let domain = QuantityArray::from_vec(vec![0.0, 0.3, 1.0], Unit::second());
    let irregular = IrregularSignalBuilder::from_samples(vec![0.0, 3.0, 10.0], domain)
        .unit(Unit::millivolt())
        .build()
        .unwrap();
    let regular = irregular.to_regular(11).unwrap();
    assert_eq!(regular.len(), 11);

    let offset = regular.try_sub(&Quantity::new(0.001, Unit::volt())).unwrap();
    for (k, v) in offset.data().column(0).iter().enumerate() {
        let expected = k as f64 - 1.0;
        assert!((v - expected).abs() < 1e-9, "sample {}: {} vs {}", k, v, expected);
    }
}
