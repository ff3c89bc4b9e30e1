use thiserror::Error;

/// Reasons a count extraction is rejected. Both are fatal to the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unsupported sample rate {0} Hz (supported: 30, 40, 50, 60, 70, 80, 90, 100)")]
    UnsupportedRate(u32),
}
