//! Per-path leases serializing materialization of a target path.
//!
//! Existence-check-then-create on a cache path races when two first
//! requests for the same source arrive together. A [`LeaseSet`] grants at
//! most one [`Lease`] per path at a time; the materializer acquires the
//! target path's lease, re-checks existence, and only then writes. The
//! backing store's conflict errors remain as the last line of defense for
//! writers that bypass the lease.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex};

use crate::path::{Path, PathBuf};

/// Registry of currently leased paths.
///
/// Acquisition blocks until the path is free; release happens when the
/// returned [`Lease`] drops. Leases on different paths never contend.
#[derive(Debug, Default)]
pub struct LeaseSet {
    held: Mutex<HashSet<PathBuf>>,
    released: Condvar,
}

/// An exclusive lease over one path, released on drop.
#[derive(Debug)]
pub struct Lease<'a> {
    set: &'a LeaseSet,
    path: PathBuf,
}

impl LeaseSet {
    /// Creates an empty lease registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lease for `path`, blocking while another holder exists.
    pub fn acquire(&self, path: &Path) -> Lease<'_> {
        let mut held = self.held.lock().unwrap();
        while held.contains(path) {
            held = self.released.wait(held).unwrap();
        }
        held.insert(path.to_path_buf());
        Lease {
            set: self,
            path: path.to_path_buf(),
        }
    }

    /// Whether the lease for `path` is currently held.
    pub fn is_held(&self, path: &Path) -> bool {
        self.held.lock().unwrap().contains(path)
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        let mut held = self.set.held.lock().unwrap();
        held.remove(&self.path);
        self.set.released.notify_all();
    }
}

impl Lease<'_> {
    /// The leased path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
