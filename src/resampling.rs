use crate::error::CountError;
use log::debug;
use sci_rs::signal::filter::{design::Sos, sosfilt_dyn};
use std::f64::consts::PI;

/// Rate at which the bandpass coefficients are defined.
pub const CANONICAL_RATE: u32 = 30;

/// Rational resampling factors taking a supported input rate to 30 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResamplePlan {
    pub sample_rate: u32,
    pub upsample: usize,
    pub downsample: usize,
}

impl ResamplePlan {
    pub fn for_rate(sample_rate: u32) -> Result<Self, CountError> {
        let (upsample, downsample) = match sample_rate {
            30 => (1, 1),
            40 => (3, 4),
            50 => (3, 5),
            60 => (1, 2),
            70 => (3, 7),
            80 => (3, 8),
            90 => (1, 3),
            100 => (3, 10),
            _ => return Err(CountError::UnsupportedRate(sample_rate)),
        };
        Ok(ResamplePlan {
            sample_rate,
            upsample,
            downsample,
        })
    }

    pub fn is_passthrough(&self) -> bool {
        self.sample_rate == CANONICAL_RATE
    }

    /// Integer multiples of 30 Hz are decimated without interpolation filtering.
    pub fn needs_lowpass(&self) -> bool {
        self.sample_rate % CANONICAL_RATE != 0
    }

    /// Number of 30 Hz samples produced from `input_len` raw samples.
    pub fn output_len(&self, input_len: usize) -> usize {
        if self.is_passthrough() {
            input_len
        } else {
            (input_len * self.upsample).div_ceil(self.downsample)
        }
    }

    /// Gain (a·L) and pole (b) of the first-order interpolation low-pass.
    pub fn lowpass_coefficients(&self) -> (f64, f64) {
        let l = self.upsample as f64;
        let a = PI / (PI + 2.0 * l);
        let b = (PI - 2.0 * l) / (PI + 2.0 * l);
        (a * l, b)
    }
}

/// Round to three decimals, ties to even.
pub fn round_milli(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}

/// Bring one axis to the canonical rate: zero-stuff by L, low-pass when the
/// rate is not a multiple of 30 Hz, keep every M-th sample, round to 1 mg.
pub fn resample(data: &[f64], plan: &ResamplePlan) -> Vec<f64> {
    if plan.is_passthrough() {
        return data.iter().map(|&v| round_milli(v)).collect();
    }

    let mut upsampled = vec![0.0; data.len() * plan.upsample];
    for (i, &value) in data.iter().enumerate() {
        upsampled[i * plan.upsample] = value;
    }
    debug!(
        "Upsampled {} samples by {} to {}",
        data.len(),
        plan.upsample,
        upsampled.len()
    );

    let filtered = if plan.needs_lowpass() {
        let (gain, pole) = plan.lowpass_coefficients();
        let mut sections = vec![Sos::new([gain, gain, 0.0], [1.0, pole, 0.0])];
        sosfilt_dyn(upsampled.iter(), &mut sections)
    } else {
        upsampled
    };

    filtered
        .iter()
        .step_by(plan.downsample)
        .map(|&v| round_milli(v))
        .collect()
}

/// Sample-at-a-time counterpart of [`resample`]. Since L <= M for every
/// supported rate, each input yields at most one canonical-rate sample.
#[derive(Debug, Clone)]
pub struct Resampler {
    plan: ResamplePlan,
    lowpass: Option<(f64, f64)>,
    prev_input: f64,
    prev_output: f64,
    // Upsampled-stream index modulo M.
    position: usize,
}

impl Resampler {
    pub fn new(plan: ResamplePlan) -> Self {
        Resampler {
            plan,
            lowpass: plan.needs_lowpass().then(|| plan.lowpass_coefficients()),
            prev_input: 0.0,
            prev_output: 0.0,
            position: 0,
        }
    }

    pub fn push(&mut self, value: f64) -> Option<f64> {
        if self.plan.is_passthrough() {
            return Some(round_milli(value));
        }

        let mut emitted = None;
        for phase in 0..self.plan.upsample {
            let stuffed = if phase == 0 { value } else { 0.0 };
            let out = match self.lowpass {
                Some((gain, pole)) => {
                    let y = gain * stuffed + (gain * self.prev_input - pole * self.prev_output);
                    self.prev_input = stuffed;
                    self.prev_output = y;
                    y
                }
                None => stuffed,
            };
            if self.position == 0 {
                emitted = Some(round_milli(out));
            }
            self.position = (self.position + 1) % self.plan.downsample;
        }
        emitted
    }
}
