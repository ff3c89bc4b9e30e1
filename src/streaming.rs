//! Incremental count extraction.
//!
//! Runs the same stages as [`crate::engine`] one raw sample at a time, so a
//! recording of any length can be processed with constant memory. Counts are
//! identical to the batch engine for the same input.

use crate::bandpass::BandpassFilter;
use crate::engine::{check_epoch_seconds, CountsConfig};
use crate::error::CountError;
use crate::quantize::{trim, SAMPLES_PER_TENTH};
use crate::resampling::{ResamplePlan, Resampler};
use crate::{CountRecord, RawSample};

#[derive(Debug, Clone)]
struct AxisCounter {
    resampler: Resampler,
    // Seeded from the first canonical-rate sample.
    filter: Option<BandpassFilter>,
    low_frequency_extension: bool,
    tenth_sum: u32,
    tenth_len: usize,
    epoch_sum: u32,
    epoch_len: usize,
    tenths_per_epoch: usize,
}

impl AxisCounter {
    fn new(plan: ResamplePlan, config: &CountsConfig) -> Self {
        AxisCounter {
            resampler: Resampler::new(plan),
            filter: None,
            low_frequency_extension: config.low_frequency_extension,
            tenth_sum: 0,
            tenth_len: 0,
            epoch_sum: 0,
            epoch_len: 0,
            tenths_per_epoch: config.epoch_seconds as usize * 10,
        }
    }

    /// Returns the epoch total when this sample completes an epoch.
    fn push(&mut self, value: f64) -> Option<u32> {
        let canonical = self.resampler.push(value)?;
        let filter = self
            .filter
            .get_or_insert_with(|| BandpassFilter::primed(canonical));
        let trimmed = trim(filter.step_counts(canonical), self.low_frequency_extension);

        self.tenth_sum += trimmed;
        self.tenth_len += 1;
        if self.tenth_len < SAMPLES_PER_TENTH {
            return None;
        }
        let tenth = self.tenth_sum / SAMPLES_PER_TENTH as u32;
        self.tenth_sum = 0;
        self.tenth_len = 0;

        self.epoch_sum += tenth;
        self.epoch_len += 1;
        if self.epoch_len < self.tenths_per_epoch {
            return None;
        }
        let total = self.epoch_sum;
        self.epoch_sum = 0;
        self.epoch_len = 0;
        Some(total)
    }
}

/// Push-based counterpart of [`crate::compute_counts`].
#[derive(Debug, Clone)]
pub struct StreamingCounter {
    sample_rate: u32,
    axes: [AxisCounter; 3],
    samples_seen: usize,
    epochs_emitted: usize,
}

impl StreamingCounter {
    pub fn new(sample_rate: u32, config: &CountsConfig) -> Result<Self, CountError> {
        if sample_rate == 0 {
            return Err(CountError::InvalidInput("sample rate must be positive".to_string()));
        }
        check_epoch_seconds(config.epoch_seconds)?;
        let plan = ResamplePlan::for_rate(sample_rate)?;
        Ok(StreamingCounter {
            sample_rate,
            axes: [(); 3].map(|_| AxisCounter::new(plan, config)),
            samples_seen: 0,
            epochs_emitted: 0,
        })
    }

    /// Feed one raw sample; yields a record when it closes an epoch.
    pub fn push(&mut self, sample: RawSample) -> Result<Option<CountRecord>, CountError> {
        if !sample.is_finite() {
            return Err(CountError::InvalidInput(format!(
                "non-finite acceleration at sample {}",
                self.samples_seen
            )));
        }
        self.samples_seen += 1;

        let [x_axis, y_axis, z_axis] = &mut self.axes;
        let counts = (x_axis.push(sample.x), y_axis.push(sample.y), z_axis.push(sample.z));
        // All three axes advance in lockstep, so they close epochs together.
        let (Some(x), Some(y), Some(z)) = counts else {
            return Ok(None);
        };
        let record = CountRecord {
            epoch_index: self.epochs_emitted,
            x,
            y,
            z,
        };
        self.epochs_emitted += 1;
        Ok(Some(record))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples_seen(&self) -> usize {
        self.samples_seen
    }

    pub fn epochs_emitted(&self) -> usize {
        self.epochs_emitted
    }
}
