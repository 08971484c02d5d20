//! Repository error types.
//!
//! This module defines structured error types for node storage operations,
//! providing error context and type safety for the storage seam.

use thiserror::Error;

use crate::path::PathBuf;

/// Errors that can occur during repository operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No node resolves at the given path.
    #[error("No node at path: {path}")]
    PathNotFound {
        /// The path that did not resolve
        path: PathBuf,
    },

    /// A node already exists where a creation was staged.
    ///
    /// With concurrent writers this is the backing store's conflict
    /// semantics surfacing; the per-path lease normally prevents it.
    #[error("Node already exists at path: {path}")]
    NodeExists {
        /// The path of the conflicting node
        path: PathBuf,
    },

    /// Privileged write access was refused.
    #[error("Write access denied: {reason}")]
    WriteAccessDenied {
        /// Why the repository refused a writer
        reason: String,
    },

    /// The backing store failed while persisting a batch.
    #[error("Storage failure: {reason}")]
    Storage {
        /// Backend-specific failure description
        reason: String,
    },
}

impl RepositoryError {
    /// Check if this error indicates a missing node.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::PathNotFound { .. })
    }

    /// Check if this error indicates a write conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::NodeExists { .. })
    }

    /// Check if this error indicates refused write access.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, RepositoryError::WriteAccessDenied { .. })
    }

    /// Get the path if this error carries one.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            RepositoryError::PathNotFound { path } | RepositoryError::NodeExists { path } => {
                Some(path)
            }
            _ => None,
        }
    }
}

// Conversion from RepositoryError to the main Error type
impl From<RepositoryError> for crate::Error {
    fn from(err: RepositoryError) -> Self {
        crate::Error::Repository(err)
    }
}
