//! Scoped write sessions for atomic repository modifications.
//!
//! A [`WriteSession`] stages changes against a repository and commits them
//! as one atomic batch. Sessions are scoped to a single operation: opened,
//! used, then consumed by [`WriteSession::commit`] or dropped — never
//! pooled or shared. A materialization that fails mid-way therefore leaves
//! no partial tree behind.

pub mod errors;
pub mod lease;

use std::sync::Arc;

pub use errors::SessionError;
pub use lease::{Lease, LeaseSet};

use crate::Result;
use crate::node::Value;
use crate::path::Path;
use crate::repository::{ChangeSet, Repository};

/// A single, scoped write session against a repository.
///
/// All mutation methods only stage changes; nothing reaches the repository
/// until [`WriteSession::commit`]. Dropping the session discards the batch.
pub struct WriteSession {
    repository: Arc<dyn Repository>,
    changes: ChangeSet,
}

impl std::fmt::Debug for WriteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteSession")
            .field("changes", &self.changes)
            .finish_non_exhaustive()
    }
}

impl WriteSession {
    /// Opens a privileged write session.
    ///
    /// # Errors
    /// [`SessionError::AcquisitionFailed`] when the repository refuses a
    /// writer; nothing has been staged or written at that point.
    pub fn open(repository: Arc<dyn Repository>) -> Result<Self> {
        repository
            .writable()
            .map_err(|e| SessionError::AcquisitionFailed {
                reason: e.to_string(),
            })?;
        Ok(Self {
            repository,
            changes: ChangeSet::new(),
        })
    }

    /// Get-or-create: stages a node creation unless the node already exists
    /// in the repository or earlier in this session's batch.
    ///
    /// Returns `true` when a creation was staged. An existing node keeps
    /// its type and content untouched.
    pub fn ensure_node(&mut self, path: &Path, primary_type: &str) -> Result<bool> {
        if self.node_exists(path)? {
            return Ok(false);
        }
        self.changes.create_node(path.to_path_buf(), primary_type);
        Ok(true)
    }

    /// Whether a node exists at `path`, counting nodes staged for creation
    /// earlier in this session.
    pub fn node_exists(&self, path: &Path) -> Result<bool> {
        if self.changes.creates(path) {
            return Ok(true);
        }
        self.repository.exists(path)
    }

    /// Stages a property write on an existing or earlier-ensured node.
    pub fn set_property(
        &mut self,
        path: &Path,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.changes.set_property(path.to_path_buf(), name, value);
    }

    /// Stages removal of the whole subtree rooted at `path`.
    pub fn remove_tree(&mut self, path: &Path) {
        self.changes.remove_tree(path.to_path_buf());
    }

    /// Returns `true` if no changes are staged.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of staged changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Commits the staged batch atomically, consuming the session.
    ///
    /// # Errors
    /// [`SessionError::CommitFailed`] when the repository rejects the
    /// batch; the staged changes are dropped with the session and the
    /// repository is left untouched.
    pub fn commit(self) -> Result<()> {
        if self.changes.is_empty() {
            return Ok(());
        }
        self.repository
            .apply(self.changes)
            .map_err(|e| SessionError::CommitFailed {
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Discards the staged batch without writing anything.
    pub fn discard(self) {
        tracing::debug!(staged = self.changes.len(), "discarding write session");
    }
}
