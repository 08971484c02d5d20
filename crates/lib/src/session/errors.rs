//! Write-session specific errors.

use thiserror::Error;

/// Errors that can occur while acquiring or committing a write session.
///
/// Both variants mean nothing was persisted: acquisition fails before any
/// change is staged, and a failed commit drops the staged batch at the
/// repository's transactional boundary.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
    /// A privileged write session could not be opened.
    #[error("Unable to open a write session: {reason}")]
    AcquisitionFailed {
        /// Why the repository refused a writer
        reason: String,
    },

    /// The staged batch could not be persisted.
    #[error("Commit failed: {reason}")]
    CommitFailed {
        /// Backend failure description
        reason: String,
    },
}

impl SessionError {
    /// Check if this error occurred before anything was staged.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(self, SessionError::AcquisitionFailed { .. })
    }

    /// Check if this error occurred while persisting the staged batch.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, SessionError::CommitFailed { .. })
    }
}

// Conversion from SessionError to the main Error type
impl From<SessionError> for crate::Error {
    fn from(err: SessionError) -> Self {
        crate::Error::Session(err)
    }
}
