//! Materializer specific errors.

use thiserror::Error;

use crate::path::PathBuf;

/// Errors that can occur while resolving or building a responsive include.
///
/// Failures of the underlying session (acquisition, commit) are not
/// surfaced here: they are logged and the resolver degrades to "no usable
/// target", so requests fail closed with an empty include instead of a
/// partial tree.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// The source path does not resolve to an authored node.
    #[error("No configuration to include at: {path}")]
    SourceNotFound {
        /// The source path that did not resolve
        path: PathBuf,
    },

    /// The source path lies outside every configured dialog root.
    #[error("Path not eligible for materialization: {path}")]
    OutsideConfiguredRoots {
        /// The offending source path (override prefix already stripped)
        path: PathBuf,
    },
}

impl MaterializeError {
    /// Check if this error means there is no content to include.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MaterializeError::SourceNotFound { .. })
    }

    /// The source path this error is about.
    pub fn path(&self) -> &PathBuf {
        match self {
            MaterializeError::SourceNotFound { path }
            | MaterializeError::OutsideConfiguredRoots { path } => path,
        }
    }
}

// Conversion from MaterializeError to the main Error type
impl From<MaterializeError> for crate::Error {
    fn from(err: MaterializeError) -> Self {
        crate::Error::Materialize(err)
    }
}
