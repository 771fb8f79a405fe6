//! Error types for tweet-echo wire formats.

use thiserror::Error;

/// Errors raised while converting timeline payloads into domain types.
#[derive(Debug, Error)]
pub enum WireError {
    /// `created_at` did not match the timeline timestamp format
    #[error("invalid timestamp {value:?}: {source}")]
    InvalidTimestamp {
        /// The raw timestamp string.
        value: String,
        /// Underlying parse error.
        #[source]
        source: chrono::ParseError,
    },

    /// A status carried neither `full_text` nor `text`
    #[error("status {id} has no text")]
    MissingText {
        /// ID of the offending status.
        id: String,
    },

    /// A status carried an empty ID
    #[error("status without an id")]
    MissingId,
}
