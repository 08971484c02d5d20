//! Repository abstraction over hierarchical node storage.
//!
//! The [`Repository`] trait is the seam between the materializer and
//! whatever actually stores nodes. Reads return owned subtree copies;
//! writes arrive as a [`ChangeSet`] and apply atomically — all staged
//! changes land or none do. This keeps the core logic independent of the
//! storage mechanism and gives write sessions their transactional boundary.

use std::any::Any;

use crate::Result;
use crate::node::{Node, Value};
use crate::path::{Path, PathBuf};

pub mod errors;
pub mod in_memory;

pub use errors::RepositoryError;
pub use in_memory::InMemory;

/// A single staged write.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Create a node. Fails the batch if the parent is missing or a node
    /// already exists at `path` — existence checks belong to the caller.
    CreateNode {
        path: PathBuf,
        primary_type: String,
    },
    /// Set one property on an existing (or earlier-created) node.
    SetProperty {
        path: PathBuf,
        name: String,
        value: Value,
    },
    /// Remove the whole subtree rooted at `path`. Removing an absent path
    /// is a no-op, so invalidation is idempotent.
    RemoveTree { path: PathBuf },
}

/// An ordered batch of staged writes, applied atomically.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    /// Creates an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a node creation.
    pub fn create_node(&mut self, path: PathBuf, primary_type: impl Into<String>) {
        self.changes.push(Change::CreateNode {
            path,
            primary_type: primary_type.into(),
        });
    }

    /// Stages a property write.
    pub fn set_property(&mut self, path: PathBuf, name: impl Into<String>, value: impl Into<Value>) {
        self.changes.push(Change::SetProperty {
            path,
            name: name.into(),
            value: value.into(),
        });
    }

    /// Stages a subtree removal.
    pub fn remove_tree(&mut self, path: PathBuf) {
        self.changes.push(Change::RemoveTree { path });
    }

    /// The staged changes, in staging order.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Returns `true` if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of staged changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Whether a node creation for `path` is staged.
    pub fn creates(&self, path: &Path) -> bool {
        self.changes
            .iter()
            .any(|c| matches!(c, Change::CreateNode { path: p, .. } if **p == *path))
    }
}

/// Storage abstraction for hierarchical configuration content.
///
/// Implementations must be `Send + Sync` so a repository can be shared
/// between the serving layer and the materializer, and `Any` to allow
/// downcasting where a concrete backend is needed.
pub trait Repository: Send + Sync + Any {
    /// Retrieves an owned deep copy of the subtree rooted at `path`.
    ///
    /// # Returns
    /// The subtree, or [`RepositoryError::PathNotFound`] when nothing
    /// resolves at `path`.
    fn get(&self, path: &Path) -> Result<Node>;

    /// Returns whether a node exists at `path`.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Checks that a privileged write session may be opened against this
    /// repository. A refusal here is the session-acquisition failure of
    /// the error taxonomy: nothing has been written yet.
    fn writable(&self) -> Result<()>;

    /// Applies a batch of staged changes atomically, in staging order.
    ///
    /// Either every change lands or the repository is left untouched.
    /// Conflicts (creating over an existing node, writing under a missing
    /// parent) fail the whole batch.
    fn apply(&self, changes: ChangeSet) -> Result<()>;
}
