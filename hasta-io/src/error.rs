//! Error types for HastaIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// HastaIO error types
///
/// A reply that never arrives is not an error: it is reported as
/// [`crate::core::types::Reply::NoReply`]. Only hard transport faults
/// propagate out of a control cycle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration (rejected before the control loop starts)
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parse error
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Configuration serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Tracker handed over a landmark set that cannot be mapped
    #[error("Invalid landmarks: {0}")]
    InvalidLandmarks(String),

    /// Malformed tracker input line
    #[error("Tracker input error: {0}")]
    TrackerInput(#[from] serde_json::Error),

    /// Worker thread panicked
    #[error("Thread panic")]
    ThreadPanic,

    /// Write did not complete in time
    #[error("Communication timeout")]
    Timeout,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
