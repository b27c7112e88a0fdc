//! Analytics error types.
//!
//! Only invalid static configuration is an error. Numeric degenerate cases
//! (empty series, too few curve points, a rest day) produce zero results.

use thiserror::Error;

/// Errors that can occur while configuring or running analytics.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// FTP is used as a divisor and must be a positive, finite number of watts.
    #[error("Invalid FTP: {0} (must be a positive number of watts)")]
    InvalidFtp(f64),

    /// Zone bands are empty, overlapping, gapped or non-monotonic.
    #[error("Invalid zone model: {0}")]
    InvalidZoneModel(String),

    /// A parallel batch worker failed to complete.
    #[error("Batch worker failed: {0}")]
    Worker(String),
}

/// Result type for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
