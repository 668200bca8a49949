use thiserror::Error;

/// Result alias for store writes.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures a store write can report.
///
/// Callers in the overlay never propagate these; they log and carry on as if
/// the write had not happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The value (or the store as a whole) exceeds the medium's capacity.
    #[error("storage capacity exceeded for key {key} ({len} bytes)")]
    CapacityExceeded {
        /// Key being written.
        key: String,
        /// Encoded length that was rejected.
        len: usize,
    },

    /// The medium refused the write (cookies disabled, sandboxed document).
    #[error("storage rejected write: {0}")]
    Rejected(String),
}

impl StoreError {
    /// Convenience constructor for rejected writes.
    pub fn rejected(msg: impl Into<String>) -> Self {
        StoreError::Rejected(msg.into())
    }
}
