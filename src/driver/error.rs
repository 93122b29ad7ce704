//! Driver error type.

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors surfaced by driver operations.
///
/// The proxy layer propagates inner errors unchanged; only [`Unsupported`]
/// originates from the proxy itself, when an optional-capability operation
/// is invoked on a driver that does not implement it.
///
/// [`Unsupported`]: DriverError::Unsupported
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The wrapped driver does not implement this optional operation.
    /// Callers should fall back to the mandatory path.
    #[error("operation not supported by the underlying driver")]
    Unsupported,

    #[error("connection is closed")]
    Closed,

    #[error("call canceled by caller")]
    Canceled,

    #[error("call deadline exceeded")]
    DeadlineExceeded,

    #[error("backend error: {0}")]
    Backend(String),
}

impl DriverError {
    /// True for the fixed unsupported-operation sentinel.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, DriverError::Unsupported)
    }
}
