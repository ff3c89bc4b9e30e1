pub mod bandpass;
pub mod config;
pub mod data_loading;
pub mod engine;
pub mod error;
pub mod output;
pub mod quantize;
pub mod resampling;
pub mod streaming;

pub use engine::{compute_counts, compute_counts_with, CountsConfig};
pub use error::CountError;
pub use streaming::StreamingCounter;

use ndarray::ArrayView2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Column header used for this axis in input and output tables.
    pub fn column_name(&self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

/// One accelerometer reading, in g.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RawSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        RawSample { x, y, z }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Fixed-rate tri-axial recording. Sample time is implied by index and rate.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    samples: Vec<RawSample>,
    sample_rate: u32,
}

impl RawSeries {
    pub fn new(samples: Vec<RawSample>, sample_rate: u32) -> Self {
        RawSeries {
            samples,
            sample_rate,
        }
    }

    pub fn from_axes(x: &[f64], y: &[f64], z: &[f64], sample_rate: u32) -> Result<Self, CountError> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(CountError::InvalidInput(format!(
                "axis lengths differ: x={}, y={}, z={}",
                x.len(),
                y.len(),
                z.len()
            )));
        }
        let samples = x
            .iter()
            .zip(y)
            .zip(z)
            .map(|((&x, &y), &z)| RawSample::new(x, y, z))
            .collect();
        Ok(RawSeries::new(samples, sample_rate))
    }

    /// Build from an `n × 3` matrix whose columns are X, Y, Z.
    pub fn from_array(data: ArrayView2<'_, f64>, sample_rate: u32) -> Result<Self, CountError> {
        if data.ncols() != 3 {
            return Err(CountError::InvalidInput(format!(
                "expected 3 columns (X, Y, Z), got {}",
                data.ncols()
            )));
        }
        let samples = data
            .rows()
            .into_iter()
            .map(|row| RawSample::new(row[0], row[1], row[2]))
            .collect();
        Ok(RawSeries::new(samples, sample_rate))
    }

    pub fn samples(&self) -> &[RawSample] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Copy one axis out as a contiguous column.
    pub fn axis(&self, axis: Axis) -> Vec<f64> {
        self.samples.iter().map(|s| s.get(axis)).collect()
    }
}

/// Counts for one complete epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountRecord {
    pub epoch_index: usize,
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl CountRecord {
    pub fn get(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Euclidean norm of the three axis counts (the "AC" column).
    pub fn vector_magnitude(&self) -> f64 {
        let (x, y, z) = (self.x as f64, self.y as f64, self.z as f64);
        (x * x + y * y + z * z).sqrt()
    }
}
