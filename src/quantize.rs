/// Largest count a single 30 Hz sample can contribute.
pub const MAX_SAMPLE_COUNT: f64 = 128.0;

/// Dead band below which regular mode discards a sample.
pub const DEAD_BAND: f64 = 4.0;

/// Dead band used with the low-frequency extension.
pub const LFE_DEAD_BAND: f64 = 1.0;

/// Canonical 30 Hz samples folded into one 10 Hz value.
pub const SAMPLES_PER_TENTH: usize = 3;

/// Longest epoch whose total cannot overflow a `u32` (ten tenths of at most
/// 128 each per second).
pub const MAX_EPOCH_SECONDS: u32 = u32::MAX / (MAX_SAMPLE_COUNT as u32 * 10);

/// Rectify, clip and quantize one filtered sample (in count units).
pub fn trim(value: f64, low_frequency_extension: bool) -> u32 {
    let magnitude = value.abs();
    if magnitude > MAX_SAMPLE_COUNT {
        return MAX_SAMPLE_COUNT as u32;
    }
    if low_frequency_extension {
        if magnitude < LFE_DEAD_BAND {
            0
        } else if magnitude < DEAD_BAND {
            (magnitude - 1.0).floor() as u32
        } else {
            magnitude.floor() as u32
        }
    } else if magnitude < DEAD_BAND {
        0
    } else {
        magnitude.floor() as u32
    }
}

/// Average each complete group of three 30 Hz counts, flooring to 10 Hz.
pub fn reduce_to_10hz(trimmed: &[u32]) -> Vec<u32> {
    trimmed
        .chunks_exact(SAMPLES_PER_TENTH)
        .map(|group| group.iter().sum::<u32>() / SAMPLES_PER_TENTH as u32)
        .collect()
}

/// Sum complete epochs of 10 Hz counts; a trailing partial epoch is dropped.
/// A zero-length epoch yields no epochs.
pub fn sum_epochs(tenths: &[u32], epoch_seconds: u32) -> Vec<u32> {
    if epoch_seconds == 0 {
        return Vec::new();
    }
    tenths
        .chunks_exact(epoch_seconds as usize * 10)
        .map(|block| block.iter().sum())
        .collect()
}
