//! The 30 Hz activity bandpass.
//!
//! Coefficients are the published ActiGraph set. Both vectors carry a
//! trailing zero so the delay line has the same length as the firmware's.

use log::debug;

/// Feed-forward (numerator) coefficients.
pub const NUMERATOR: [f64; 9] = [
    -0.009341062898525,
    -0.025470289659360,
    -0.004235264826105,
    0.044152415456420,
    0.036493718347760,
    -0.011893961934740,
    -0.022917390623150,
    -0.006788163862310,
    0.000000000000000,
];

/// Feedback (denominator) coefficients, `a[0] == 1`.
pub const DENOMINATOR: [f64; 9] = [
    1.00000000000000000000,
    -3.63367395910957000000,
    5.03689812757486000000,
    -3.09612247819666000000,
    0.50620507633883000000,
    0.32421701566682000000,
    -0.15685485875559000000,
    0.01949130205890000000,
    0.00000000000000000000,
];

/// Scales filter output to count units (17.127 in ActiLife, 17.128 in firmware).
pub const COUNT_GAIN: f64 = (3.0 / 4096.0) / (2.6 / 256.0) * 237.5;

const ORDER: usize = NUMERATOR.len() - 1;

/// Delay-line state for which a unit step input is already at steady state.
pub fn steady_state() -> [f64; ORDER] {
    let (b, a) = (&NUMERATOR, &DENOMINATOR);
    let forced: f64 = (0..ORDER).map(|k| b[k + 1] - a[k + 1] * b[0]).sum();
    let mut zi = [0.0; ORDER];
    zi[0] = forced / a.iter().sum::<f64>();

    let mut a_sum = 1.0;
    let mut c_sum = 0.0;
    for k in 1..ORDER {
        a_sum += a[k];
        c_sum += b[k] - a[k] * b[0];
        zi[k] = a_sum * zi[0] - c_sum;
    }
    zi
}

/// Transposed direct-form II realization of the bandpass.
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    state: [f64; ORDER],
}

impl BandpassFilter {
    /// A filter whose delay line assumes `first` has been held forever, so a
    /// constant input produces no start-up transient.
    pub fn primed(first: f64) -> Self {
        BandpassFilter {
            state: steady_state().map(|z| z * first),
        }
    }

    pub fn step(&mut self, x: f64) -> f64 {
        let (b, a) = (&NUMERATOR, &DENOMINATOR);
        let y = self.state[0] + b[0] * x;
        for k in 0..ORDER - 1 {
            self.state[k] = self.state[k + 1] + b[k + 1] * x - a[k + 1] * y;
        }
        self.state[ORDER - 1] = b[ORDER] * x - a[ORDER] * y;
        y
    }

    /// Filtered value already scaled to count units.
    pub fn step_counts(&mut self, x: f64) -> f64 {
        self.step(x) * COUNT_GAIN
    }
}

/// Filter a whole 30 Hz axis, returning values in count units.
pub fn bandpass(data: &[f64]) -> Vec<f64> {
    let Some(&first) = data.first() else {
        return Vec::new();
    };
    debug!("Bandpass filtering {} samples", data.len());
    let mut filter = BandpassFilter::primed(first);
    data.iter().map(|&x| filter.step_counts(x)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_constant() {
        assert!((COUNT_GAIN - 17.127404).abs() < 1e-6);
    }

    #[test]
    fn test_steady_state_values() {
        let zi = steady_state();
        assert!((zi[0] - 0.009341062836136213).abs() < 1e-12);
        assert!((zi[3] + 0.00510579802920092).abs() < 1e-12);
        assert_eq!(zi[7], 0.0);
    }

    #[test]
    fn test_constant_input_has_no_transient() {
        let out = bandpass(&[0.987; 600]);
        assert!(out.iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn test_passband_response() {
        // 0.75 Hz sits near the peak of the response, 10 Hz is rejected.
        let tone = |freq: f64| -> f64 {
            let data: Vec<f64> = (0..1800)
                .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / 30.0).sin())
                .collect();
            bandpass(&data)[900..]
                .iter()
                .fold(0.0_f64, |acc, v| acc.max(v.abs()))
                / COUNT_GAIN
        };
        assert!(tone(0.75) > 3.0);
        assert!(tone(10.0) < 0.01);
    }

    #[test]
    fn test_empty_input() {
        assert!(bandpass(&[]).is_empty());
    }
}
