//! Error types for chanhist-core.

use thiserror::Error;

/// Result type alias for chanhist operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for chanhist operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid axis, mask, or histogram configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The storage engine rejected an allocation descriptor.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// Channel id outside the declared channel range.
    #[error("invalid channel {channel}: declared range is 0..{n_channels}")]
    InvalidChannel {
        /// The offending external channel id.
        channel: usize,
        /// Number of declared channels.
        n_channels: usize,
    },

    /// Channel id inside the declared range but not marked used.
    #[error("channel {channel} is not marked used")]
    UnusedChannel {
        /// The offending external channel id.
        channel: usize,
    },

    /// Observable vector arity does not match the axis count.
    #[error("dimension mismatch: expected {expected} observables, got {actual}")]
    DimensionMismatch {
        /// Number of event-class axes.
        expected: usize,
        /// Number of observables supplied.
        actual: usize,
    },
}
