//! Error types for the milepost library.

use thiserror::Error;

/// Errors that can occur when resolving a road position.
#[derive(Error, Debug)]
pub enum MilepostError {
    /// The descriptor did not match the road/mileage grammar.
    #[error("unrecognized pattern: {input:?}")]
    UnrecognizedPattern { input: String },

    /// A numeric token matched the grammar but could not be converted.
    ///
    /// This indicates a mismatch between the grammar and the conversion
    /// code, so callers should log it for investigation.
    #[error("invalid numeric value: {token:?}")]
    InvalidNumber { token: String },

    /// No pair of milestones brackets the queried mileage on that road.
    ///
    /// This is an expected outcome for mileages outside the recorded
    /// range, not a fault.
    #[error("no milestones bracket {road} at {mileage_meters}m")]
    NotFound { road: String, mileage_meters: f64 },

    /// The underlying milestone store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by a milestone store backend.
///
/// Distinct from "no matching record": an empty lookup result is
/// `Ok(None)` on the store trait, never a `StoreError`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// IO error while reading milestone data.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A milestone record that does not match the ingestion format.
    #[error("malformed milestone record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    /// Backend connectivity or quota failure.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

/// Result type alias using [`MilepostError`].
pub type Result<T> = std::result::Result<T, MilepostError>;
