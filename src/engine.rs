use crate::bandpass::bandpass;
use crate::error::CountError;
use crate::quantize::{reduce_to_10hz, sum_epochs, trim, MAX_EPOCH_SECONDS};
use crate::resampling::{resample, ResamplePlan};
use crate::{Axis, CountRecord, RawSeries};
use log::debug;
use std::thread;

/// Knobs for one count extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountsConfig {
    pub epoch_seconds: u32,
    /// Narrower dead band that keeps low-amplitude movement.
    pub low_frequency_extension: bool,
    /// Process X, Y and Z on separate threads.
    pub parallel_axes: bool,
}

impl CountsConfig {
    pub fn new(epoch_seconds: u32) -> Self {
        CountsConfig {
            epoch_seconds,
            low_frequency_extension: false,
            parallel_axes: true,
        }
    }
}

/// Per-epoch activity counts for `series`, using the regular dead band.
pub fn compute_counts(
    series: &RawSeries,
    sample_rate: u32,
    epoch_seconds: u32,
) -> Result<Vec<CountRecord>, CountError> {
    compute_counts_with(series, sample_rate, &CountsConfig::new(epoch_seconds))
}

pub fn compute_counts_with(
    series: &RawSeries,
    sample_rate: u32,
    config: &CountsConfig,
) -> Result<Vec<CountRecord>, CountError> {
    validate(series, sample_rate, config)?;
    let plan = ResamplePlan::for_rate(sample_rate)?;
    debug!(
        "Extracting counts from {} samples ({:.1} s) at {} Hz (L={}, M={}), {} s epochs",
        series.len(),
        series.duration_seconds(),
        sample_rate,
        plan.upsample,
        plan.downsample,
        config.epoch_seconds
    );
    debug!("{} samples per axis at 30 Hz", plan.output_len(series.len()));

    let columns = Axis::ALL.map(|axis| series.axis(axis));
    let [x, y, z] = if config.parallel_axes {
        let plan = &plan;
        thread::scope(|scope| {
            columns
                .each_ref()
                .map(|column| scope.spawn(move || extract_axis(column, plan, config)))
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
        })
    } else {
        columns.each_ref().map(|column| extract_axis(column, &plan, config))
    };

    let records: Vec<CountRecord> = x
        .into_iter()
        .zip(y)
        .zip(z)
        .enumerate()
        .map(|(epoch_index, ((x, y), z))| CountRecord {
            epoch_index,
            x,
            y,
            z,
        })
        .collect();
    debug!("Produced {} epochs", records.len());
    Ok(records)
}

/// Run the full pipeline over one axis, returning its per-epoch counts.
pub(crate) fn extract_axis(samples: &[f64], plan: &ResamplePlan, config: &CountsConfig) -> Vec<u32> {
    let canonical = resample(samples, plan);
    let filtered = bandpass(&canonical);
    let trimmed: Vec<u32> = filtered
        .iter()
        .map(|&v| trim(v, config.low_frequency_extension))
        .collect();
    let tenths = reduce_to_10hz(&trimmed);
    sum_epochs(&tenths, config.epoch_seconds)
}

fn validate(series: &RawSeries, sample_rate: u32, config: &CountsConfig) -> Result<(), CountError> {
    if series.is_empty() {
        return Err(CountError::InvalidInput("series is empty".to_string()));
    }
    if sample_rate == 0 {
        return Err(CountError::InvalidInput("sample rate must be positive".to_string()));
    }
    if sample_rate != series.sample_rate() {
        return Err(CountError::InvalidInput(format!(
            "sample rate {} Hz does not match series rate {} Hz",
            sample_rate,
            series.sample_rate()
        )));
    }
    check_epoch_seconds(config.epoch_seconds)?;
    if let Some(index) = series.samples().iter().position(|s| !s.is_finite()) {
        return Err(CountError::InvalidInput(format!(
            "non-finite acceleration at sample {}",
            index
        )));
    }
    Ok(())
}

/// Epoch length must be positive and short enough that totals fit in `u32`.
pub(crate) fn check_epoch_seconds(epoch_seconds: u32) -> Result<(), CountError> {
    if epoch_seconds == 0 {
        return Err(CountError::InvalidInput("epoch length must be positive".to_string()));
    }
    if epoch_seconds > MAX_EPOCH_SECONDS {
        return Err(CountError::InvalidInput(format!(
            "epoch length {} s exceeds the maximum of {} s",
            epoch_seconds, MAX_EPOCH_SECONDS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawSample;

    fn still(n: usize, rate: u32) -> RawSeries {
        RawSeries::new(vec![RawSample::new(0.0, 0.0, -1.0); n], rate)
    }

    #[test]
    fn test_rejects_empty_series() {
        let series = RawSeries::new(Vec::new(), 30);
        assert!(matches!(
            compute_counts(&series, 30, 10),
            Err(CountError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_zero_parameters() {
        let series = still(300, 30);
        assert!(matches!(
            compute_counts(&series, 0, 10),
            Err(CountError::InvalidInput(_))
        ));
        assert!(matches!(
            compute_counts(&series, 30, 0),
            Err(CountError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_overlong_epoch() {
        let series = still(300, 30);
        assert!(compute_counts(&series, 30, MAX_EPOCH_SECONDS).is_ok());
        assert_eq!(
            compute_counts(&series, 30, MAX_EPOCH_SECONDS + 1),
            Err(CountError::InvalidInput(format!(
                "epoch length {} s exceeds the maximum of {} s",
                MAX_EPOCH_SECONDS + 1,
                MAX_EPOCH_SECONDS
            )))
        );
    }

    #[test]
    fn test_rejects_rate_mismatch() {
        let series = still(300, 30);
        assert!(matches!(
            compute_counts(&series, 40, 10),
            Err(CountError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unsupported_rate() {
        let series = still(330, 33);
        assert_eq!(
            compute_counts(&series, 33, 10),
            Err(CountError::UnsupportedRate(33))
        );
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut samples = vec![RawSample::new(0.0, 0.0, 1.0); 300];
        samples[17].y = f64::NAN;
        let series = RawSeries::new(samples, 30);
        let err = compute_counts(&series, 30, 10).unwrap_err();
        assert_eq!(
            err,
            CountError::InvalidInput("non-finite acceleration at sample 17".to_string())
        );
    }

    #[test]
    fn test_serial_and_parallel_agree() {
        let samples: Vec<RawSample> = (0..1800)
            .map(|i| {
                let t = i as f64 / 30.0;
                RawSample::new((4.0 * t).sin() * 0.4, (7.0 * t).cos() * 0.2 - 1.0, (2.5 * t).sin() * 0.3)
            })
            .collect();
        let series = RawSeries::new(samples, 30);
        let mut config = CountsConfig::new(10);
        let parallel = compute_counts_with(&series, 30, &config).unwrap();
        config.parallel_axes = false;
        let serial = compute_counts_with(&series, 30, &config).unwrap();
        assert_eq!(parallel, serial);
        assert_eq!(parallel.len(), 6);
    }

    #[test]
    fn test_epoch_indices_are_sequential() {
        let records = compute_counts(&still(30 * 35, 30), 30, 5).unwrap();
        let indices: Vec<usize> = records.iter().map(|r| r.epoch_index).collect();
        assert_eq!(indices, (0..7).collect::<Vec<_>>());
    }
}
