//! A simple in-memory repository backed by a single node tree.
//!
//! Suitable for testing, development, or embedders that handle durability
//! themselves: the whole tree can be saved to and loaded from a JSON file.
//!
//! Batch application is copy-on-write: changes are applied to a clone of
//! the tree which replaces the original only when every change succeeded,
//! so a failed batch leaves the store untouched.

use std::fs;
use std::sync::RwLock;

#[cfg(any(test, feature = "testing"))]
use std::sync::atomic::{AtomicBool, Ordering};

use crate::node::Node;
use crate::path::Path;
use crate::repository::{Change, ChangeSet, Repository, RepositoryError};
use crate::{Error, Result};

/// Primary type of the synthetic root node.
const NT_ROOT: &str = "rep:root";

/// In-memory repository implementation.
#[derive(Debug)]
pub struct InMemory {
    /// The whole content tree, rooted at `/`
    root: RwLock<Node>,
    /// When set, the next `apply` fails with a storage error
    #[cfg(any(test, feature = "testing"))]
    fail_next_apply: AtomicBool,
    /// When set, `writable` refuses new write sessions
    #[cfg(any(test, feature = "testing"))]
    deny_sessions: AtomicBool,
}

impl InMemory {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::with_root(Node::new("", NT_ROOT))
    }

    /// Creates a repository from an existing content tree.
    pub fn with_root(root: Node) -> Self {
        Self {
            root: RwLock::new(root),
            #[cfg(any(test, feature = "testing"))]
            fail_next_apply: AtomicBool::new(false),
            #[cfg(any(test, feature = "testing"))]
            deny_sessions: AtomicBool::new(false),
        }
    }

    /// Serializes the whole tree to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let root = self.root.read().unwrap();
        let json = serde_json::to_string_pretty(&*root)?;
        fs::write(path, json).map_err(Error::Io)
    }

    /// Loads a repository from a JSON file written by [`InMemory::save_to_file`].
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(Error::Io)?;
        let root: Node = serde_json::from_str(&json)?;
        Ok(Self::with_root(root))
    }

    /// Makes the next `apply` call fail after staging, without persisting
    /// anything. Lets tests exercise persistence-failure containment.
    #[cfg(any(test, feature = "testing"))]
    pub fn fail_next_apply(&self) {
        self.fail_next_apply.store(true, Ordering::SeqCst);
    }

    /// Toggles refusal of new write sessions.
    #[cfg(any(test, feature = "testing"))]
    pub fn deny_sessions(&self, deny: bool) {
        self.deny_sessions.store(deny, Ordering::SeqCst);
    }

    fn apply_change(root: &mut Node, change: Change) -> Result<()> {
        match change {
            Change::CreateNode { path, primary_type } => {
                let name = path.name().ok_or_else(|| RepositoryError::NodeExists {
                    path: path.clone(),
                })?;
                let parent_path = path.parent().expect("non-root path has a parent");
                let parent = root.node_at_mut(&parent_path).ok_or_else(|| {
                    RepositoryError::PathNotFound {
                        path: parent_path.clone(),
                    }
                })?;
                if parent.has_child(name) {
                    return Err(RepositoryError::NodeExists { path }.into());
                }
                parent.push_child(Node::new(name, primary_type));
                Ok(())
            }
            Change::SetProperty { path, name, value } => {
                let node = root
                    .node_at_mut(&path)
                    .ok_or(RepositoryError::PathNotFound { path })?;
                node.set_property(name, value);
                Ok(())
            }
            Change::RemoveTree { path } => {
                if let Some(name) = path.name()
                    && let Some(parent) = path.parent()
                    && let Some(parent_node) = root.node_at_mut(&parent)
                {
                    parent_node.remove_child(name);
                }
                Ok(())
            }
        }
    }
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for InMemory {
    fn get(&self, path: &Path) -> Result<Node> {
        let root = self.root.read().unwrap();
        root.node_at(path)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::PathNotFound {
                    path: path.to_path_buf(),
                }
                .into()
            })
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        let root = self.root.read().unwrap();
        Ok(root.node_at(path).is_some())
    }

    fn writable(&self) -> Result<()> {
        #[cfg(any(test, feature = "testing"))]
        if self.deny_sessions.load(Ordering::SeqCst) {
            return Err(RepositoryError::WriteAccessDenied {
                reason: "write sessions disabled".to_owned(),
            }
            .into());
        }
        Ok(())
    }

    fn apply(&self, changes: ChangeSet) -> Result<()> {
        let mut root = self.root.write().unwrap();

        #[cfg(any(test, feature = "testing"))]
        if self.fail_next_apply.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Storage {
                reason: "injected failure".to_owned(),
            }
            .into());
        }

        // Copy-on-write: a failing change must not leave earlier changes
        // of the same batch behind.
        let mut staged = root.clone();
        for change in changes.changes() {
            Self::apply_change(&mut staged, change.clone())?;
        }
        *root = staged;
        Ok(())
    }
}
