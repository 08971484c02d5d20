//! Include server errors.

use thiserror::Error;

/// Errors from the include server's lifecycle.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ServeError {
    /// The server is already running.
    #[error("Include server already running on {address}")]
    ServerAlreadyRunning {
        /// Address the running server is bound to
        address: String,
    },

    /// The server is not running.
    #[error("Include server not running")]
    ServerNotRunning,

    /// Binding the listen address failed.
    #[error("Failed to bind {address}: {reason}")]
    Bind {
        /// The requested listen address
        address: String,
        /// Why binding failed
        reason: String,
    },
}

// Conversion from ServeError to the main Error type
impl From<ServeError> for crate::Error {
    fn from(err: ServeError) -> Self {
        crate::Error::Serve(err)
    }
}
