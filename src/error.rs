use thiserror::Error;

/// Errors surfaced by configuration (category 1 of the error taxonomy).
///
/// Transient data errors, validation failures and resource exhaustion never
/// reach this type: they are absorbed internally and expressed through
/// solution status / ratio sentinels instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("number of frequencies must be in 1..=NFREQ, got {0}")]
    InvalidFrequencyCount(usize),

    /// `navsys` did not select a single supported constellation.
    #[error("navsys mask selects no supported constellation")]
    EmptyNavSystemMask,

    #[error("maxtdiff must be finite and non-negative, got {0}")]
    InvalidMaxTDiff(f64),

    #[error("multi-hypothesis controller is already at capacity ({0} slots)")]
    ControllerFull(usize),

    #[error("hypothesis slot {0} is not active")]
    InactiveSlot(usize),

    #[error("hypothesis slot index {0} is out of range")]
    SlotIndexOutOfRange(usize),

    #[error("invalid command line argument: {0}")]
    InvalidCliArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
