//! Materializer configuration.
//!
//! In the original host this lives in activation-scoped component
//! configuration; here it is an explicit struct handed to the
//! materializer's constructor and loadable from a config file.

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{DEFAULT_CACHE_ROOT, DEFAULT_DIALOG_ROOTS};
use crate::path::PathBuf;

/// Errors raised by [`IncludeConfig::validate`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No dialog roots configured: nothing would ever be materialized.
    #[error("At least one dialog root must be configured")]
    NoDialogRoots,

    /// The cache root may not be the repository root.
    #[error("Cache root may not be the repository root")]
    CacheRootIsRepositoryRoot,

    /// The cache would be inspected as authored content, so generated
    /// trees could be expanded again.
    #[error("Cache root {cache_root} lies under dialog root {dialog_root}")]
    CacheRootUnderDialogRoot {
        cache_root: PathBuf,
        dialog_root: PathBuf,
    },
}

// Conversion from ConfigError to the main Error type
impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err)
    }
}

/// Configuration surface of the materializer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IncludeConfig {
    /// Root under which materialized trees are cached.
    pub cache_root: PathBuf,
    /// Only sources under these roots are eligible for materialization.
    pub dialog_roots: Vec<PathBuf>,
}

impl Default for IncludeConfig {
    fn default() -> Self {
        Self {
            cache_root: PathBuf::normalize(DEFAULT_CACHE_ROOT),
            dialog_roots: DEFAULT_DIALOG_ROOTS
                .iter()
                .map(PathBuf::normalize)
                .collect(),
        }
    }
}

impl IncludeConfig {
    /// Creates a configuration with explicit roots.
    pub fn new(cache_root: PathBuf, dialog_roots: Vec<PathBuf>) -> Self {
        Self {
            cache_root,
            dialog_roots,
        }
    }

    /// Checks the configuration for contradictions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dialog_roots.is_empty() {
            return Err(ConfigError::NoDialogRoots);
        }
        if self.cache_root.is_root() {
            return Err(ConfigError::CacheRootIsRepositoryRoot);
        }
        for root in &self.dialog_roots {
            if self.cache_root.starts_with(root) {
                return Err(ConfigError::CacheRootUnderDialogRoot {
                    cache_root: self.cache_root.clone(),
                    dialog_root: root.clone(),
                });
            }
        }
        Ok(())
    }

    /// Whether `path` lies under one of the configured dialog roots.
    pub fn covers(&self, path: &crate::path::Path) -> bool {
        self.dialog_roots.iter().any(|root| path.starts_with(root))
    }
}
