use actigraph_counts::{compute_counts, Axis, CountError, RawSample, RawSeries};
use std::f64::consts::PI;

const RATES: [u32; 8] = [30, 40, 50, 60, 70, 80, 90, 100];

/// Deterministic broadband signal: a few incommensurate tones per axis.
fn mixed(seconds: usize, rate: u32) -> RawSeries {
    let samples = (0..seconds * rate as usize)
        .map(|i| {
            let t = i as f64 / rate as f64;
            RawSample::new(
                0.6 * (2.0 * PI * 1.3 * t).sin() + 0.2 * (2.0 * PI * 4.1 * t).cos(),
                0.9 + 0.4 * (2.0 * PI * 0.45 * t).sin() * (2.0 * PI * 2.2 * t).sin(),
                -0.3 + 1.5 * (2.0 * PI * 0.8 * t + 1.0).sin().powi(3),
            )
        })
        .collect();
    RawSeries::new(samples, rate)
}

#[test]
fn test_determinism() {
    for rate in RATES {
        let series = mixed(40, rate);
        let first = compute_counts(&series, rate, 10).unwrap();
        let second = compute_counts(&series, rate, 10).unwrap();
        assert_eq!(first, second, "rate {}", rate);
    }
}

#[test]
fn test_length_law() {
    for rate in RATES {
        for (seconds, epoch_seconds, expected) in [(60, 10, 6), (65, 10, 6), (90, 30, 3), (59, 60, 0)] {
            let series = mixed(seconds, rate);
            let records = compute_counts(&series, rate, epoch_seconds).unwrap();
            assert_eq!(
                records.len(),
                expected,
                "rate {} duration {} epoch {}",
                rate,
                seconds,
                epoch_seconds
            );
        }
    }
}

#[test]
fn test_series_shorter_than_an_epoch_is_empty() {
    let series = RawSeries::new(vec![RawSample::new(0.1, 0.2, 0.3)], 30);
    assert_eq!(compute_counts(&series, 30, 1).unwrap(), Vec::new());
}

#[test]
fn test_counts_are_bounded() {
    // Each 10 Hz value is at most 128, so an epoch tops out at 1280 per second.
    for rate in [30, 80] {
        let records = compute_counts(&mixed(120, rate), rate, 10).unwrap();
        assert!(records
            .iter()
            .all(|r| Axis::ALL.iter().all(|&a| r.get(a) <= 12_800)));
        assert!(records.iter().any(|r| r.x > 0));
    }
}

#[test]
fn test_constant_input_yields_zero_counts() {
    let series = RawSeries::new(vec![RawSample::new(0.02, -0.98, 0.11); 30 * 120], 30);
    let records = compute_counts(&series, 30, 10).unwrap();
    assert_eq!(records.len(), 12);
    assert!(records.iter().all(|r| r.x == 0 && r.y == 0 && r.z == 0));
}

#[test]
fn test_constant_input_at_multiples_of_30hz_yields_zero_counts() {
    for rate in [60, 90] {
        let series = RawSeries::new(vec![RawSample::new(2.0, 1.0, 8.0); rate as usize * 60], rate);
        let records = compute_counts(&series, rate, 10).unwrap();
        assert!(records.iter().all(|r| r.vector_magnitude() == 0.0), "rate {}", rate);
    }
}

#[test]
fn test_constant_input_with_interpolation_settles_after_first_epoch() {
    // The interpolation low-pass starts from rest, so a constant offset
    // produces a step that the bandpass sees once.
    let series = RawSeries::new(vec![RawSample::new(2.0, 1.0, 8.0); 50 * 60], 50);
    let records = compute_counts(&series, 50, 10).unwrap();
    let counts: Vec<(u32, u32, u32)> = records.iter().map(|r| (r.x, r.y, r.z)).collect();
    assert_eq!(
        counts,
        vec![(4, 0, 43), (0, 0, 0), (0, 0, 0), (0, 0, 0), (0, 0, 0), (0, 0, 0)]
    );
}

#[test]
fn test_zero_input_yields_zero_counts_at_every_rate() {
    for rate in RATES {
        let series = RawSeries::new(vec![RawSample::new(0.0, 0.0, 0.0); rate as usize * 60], rate);
        let records = compute_counts(&series, rate, 10).unwrap();
        assert_eq!(records.len(), 6, "rate {}", rate);
        assert!(records.iter().all(|r| r.vector_magnitude() == 0.0), "rate {}", rate);
    }
}

#[test]
fn test_axis_permutation() {
    for rate in [30, 40] {
        let series = mixed(60, rate);
        let rotated = RawSeries::new(
            series
                .samples()
                .iter()
                .map(|s| RawSample::new(s.z, s.x, s.y))
                .collect(),
            rate,
        );
        let original = compute_counts(&series, rate, 10).unwrap();
        let permuted = compute_counts(&rotated, rate, 10).unwrap();
        for (a, b) in original.iter().zip(&permuted) {
            assert_eq!((b.x, b.y, b.z), (a.z, a.x, a.y));
        }
    }
}

#[test]
fn test_error_taxonomy() {
    let series = mixed(20, 30);
    assert!(matches!(
        compute_counts(&series, 30, 0),
        Err(CountError::InvalidInput(_))
    ));
    assert!(matches!(
        compute_counts(&RawSeries::new(Vec::new(), 30), 30, 10),
        Err(CountError::InvalidInput(_))
    ));

    let odd = mixed(20, 25);
    assert_eq!(compute_counts(&odd, 25, 10), Err(CountError::UnsupportedRate(25)));
}
