//! The responsive tree materializer.
//!
//! Given an authored configuration subtree and the request's ordered
//! breakpoint sequence, the [`Materializer`] produces a cached copy of the
//! subtree under the configured cache root. Wherever a node carries the
//! breakpoint-loop marker, its subtree is regenerated once per breakpoint
//! with suffixed names; everything else is copied verbatim.
//!
//! Materialization is lazy and cached: a request for an already
//! materialized path returns the cached tree untouched. Staleness is the
//! concern of an external collaborator, which calls
//! [`Materializer::invalidate`] and lets the next request rebuild.
//!
//! The whole tree for one request is written through a single scoped
//! [`WriteSession`] and commits atomically; on any failure the cache path
//! stays empty rather than holding a partial tree.

pub mod errors;

use std::sync::Arc;

pub use errors::MaterializeError;

use crate::breakpoint::{Breakpoint, RequestContext};
use crate::clock::{Clock, SystemClock};
use crate::config::IncludeConfig;
use crate::constants::{
    NT_FOLDER, OVERRIDE_PREFIX, PN_LAST_MODIFIED, PN_NAME, PN_RESOURCE_TYPE, PN_TITLE, PN_TYPE,
};
use crate::node::{Node, Value};
use crate::path::{Path, PathBuf};
use crate::repository::{Repository, RepositoryError};
use crate::session::{LeaseSet, WriteSession};
use crate::{Error, Result};

/// Materializes breakpoint-expanded copies of authored configuration trees.
pub struct Materializer {
    repository: Arc<dyn Repository>,
    config: IncludeConfig,
    clock: Arc<dyn Clock>,
    leases: LeaseSet,
}

impl Materializer {
    /// Creates a materializer over `repository` with the given configuration.
    pub fn new(repository: Arc<dyn Repository>, config: IncludeConfig) -> Result<Self> {
        Self::with_clock(repository, config, Arc::new(SystemClock))
    }

    /// Creates a materializer with an explicit time source.
    pub fn with_clock(
        repository: Arc<dyn Repository>,
        config: IncludeConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            repository,
            config,
            clock,
            leases: LeaseSet::new(),
        })
    }

    /// The repository this materializer reads from and writes into.
    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.repository
    }

    /// The active configuration.
    pub fn config(&self) -> &IncludeConfig {
        &self.config
    }

    /// Derives the cache path for a source path.
    ///
    /// The cache key is `cache_root` plus the source path with any leading
    /// override-mount prefix stripped, so the same authored tree maps to
    /// the same cache entry whichever mount served the request.
    pub fn include_path(&self, source: &Path) -> PathBuf {
        self.config.cache_root.join(raw_path(source).as_str())
    }

    /// Resolves the cached include for `source`, materializing on miss.
    ///
    /// Returns the target path when a usable tree exists there afterwards.
    /// Session-acquisition and commit failures are logged and degrade to
    /// `Ok(None)`: the caller serves an empty include, never a partial one.
    ///
    /// # Errors
    /// [`MaterializeError::SourceNotFound`] when the source path resolves
    /// to nothing, [`MaterializeError::OutsideConfiguredRoots`] when it is
    /// not under a configured dialog root.
    pub fn resolve_include(
        &self,
        source: &Path,
        ctx: &RequestContext,
    ) -> Result<Option<PathBuf>> {
        let raw = raw_path(source);
        let target = self.config.cache_root.join(raw.as_str());

        if self.repository.exists(&target)? {
            return Ok(Some(target));
        }
        if !self.config.covers(&raw) {
            return Err(MaterializeError::OutsideConfiguredRoots { path: raw }.into());
        }
        let source_root = match self.repository.get(&raw) {
            Ok(node) => node,
            Err(Error::Repository(RepositoryError::PathNotFound { path })) => {
                return Err(MaterializeError::SourceNotFound { path }.into());
            }
            Err(other) => return Err(other),
        };

        let _lease = self.leases.acquire(&target);
        // A concurrent first request may have built the tree while this one
        // waited for the lease.
        if self.repository.exists(&target)? {
            return Ok(Some(target));
        }

        if let Err(e) = self.build_include(&source_root, &target, ctx) {
            tracing::error!(source = %raw, error = %e, "unable to materialize responsive include");
        }
        Ok(self.repository.exists(&target)?.then_some(target))
    }

    /// Removes the cached tree for `source` wholesale.
    ///
    /// This is the hook the external staleness collaborator calls; the next
    /// `resolve_include` rebuilds lazily. Returns whether a tree existed.
    pub fn invalidate(&self, source: &Path) -> Result<bool> {
        let target = self.include_path(source);
        let _lease = self.leases.acquire(&target);
        if !self.repository.exists(&target)? {
            return Ok(false);
        }
        let mut session = WriteSession::open(Arc::clone(&self.repository))?;
        session.remove_tree(&target);
        session.commit()?;
        tracing::debug!(path = %target, "invalidated responsive include");
        Ok(true)
    }

    /// Builds the whole target tree in one write session.
    fn build_include(&self, source_root: &Node, target: &Path, ctx: &RequestContext) -> Result<()> {
        let mut session = WriteSession::open(Arc::clone(&self.repository))?;
        self.ensure_target_root(&mut session, source_root, target)?;
        self.write_tree(&mut session, source_root, target, ctx, None)?;
        session.commit()
    }

    /// Get-or-creates the target root and its ancestors as generic folders,
    /// stamps the last-modified time (target root only — staleness is
    /// tree-granular) and propagates the source's declared component type.
    fn ensure_target_root(
        &self,
        session: &mut WriteSession,
        source_root: &Node,
        target: &Path,
    ) -> Result<()> {
        let mut ancestor = PathBuf::root();
        for component in target.components() {
            ancestor = ancestor.join(component);
            session.ensure_node(&ancestor, NT_FOLDER)?;
        }
        session.set_property(target, PN_LAST_MODIFIED, self.clock.now_rfc3339());
        if let Some(resource_type) = source_root.property(PN_TYPE).and_then(Value::as_text) {
            session.set_property(target, PN_RESOURCE_TYPE, resource_type);
        }
        Ok(())
    }

    /// Recursively copies `conf`'s subtree onto `target`.
    ///
    /// `breakpoint` is the currently active tier. Expansion triggers only
    /// while no breakpoint is active, so markers on descendants of an
    /// expansion never compound: the outermost marker on any root-to-leaf
    /// path branches, deeper ones copy as plain content.
    fn write_tree(
        &self,
        session: &mut WriteSession,
        conf: &Node,
        target: &Path,
        ctx: &RequestContext,
        breakpoint: Option<&Breakpoint>,
    ) -> Result<()> {
        if breakpoint.is_none() && conf.is_breakpoint_loop() {
            self.loop_tree(session, conf, target, ctx)?;
        }
        self.copy_properties(session, conf, target, breakpoint);
        for child in conf.children() {
            let child_target = target.join(child.name());
            session.ensure_node(&child_target, child.primary_type())?;
            tracing::debug!(path = %child_target, "writing tree");
            self.write_tree(session, child, &child_target, ctx, breakpoint)?;
        }
        Ok(())
    }

    /// Regenerates `conf`'s subtree once per breakpoint, as suffixed
    /// children of `target`, in the order breakpoints were supplied.
    fn loop_tree(
        &self,
        session: &mut WriteSession,
        conf: &Node,
        target: &Path,
        ctx: &RequestContext,
    ) -> Result<()> {
        for breakpoint in &ctx.breakpoints {
            let child = target.join(format!("{}{}", conf.name(), breakpoint.property_suffix));
            session.ensure_node(&child, conf.primary_type())?;
            session.set_property(&child, PN_TITLE, breakpoint.label.as_str());
            tracing::debug!(path = %child, "writing responsive tree");
            self.write_tree(session, conf, &child, ctx, Some(breakpoint))?;
        }
        Ok(())
    }

    /// Copies every property of `conf` onto `target`. Under an active
    /// breakpoint the designated name property gets the breakpoint's
    /// suffix appended, so generated siblings stay individually
    /// addressable; everything else copies verbatim.
    fn copy_properties(
        &self,
        session: &mut WriteSession,
        conf: &Node,
        target: &Path,
        breakpoint: Option<&Breakpoint>,
    ) {
        for (name, value) in conf.properties() {
            let value = match breakpoint {
                Some(bp) if name == PN_NAME => {
                    Value::Text(format!("{value}{}", bp.property_suffix))
                }
                _ => value.clone(),
            };
            session.set_property(target, name, value);
        }
    }
}

/// Strips the override-mount prefix when it leads the path.
fn raw_path(source: &Path) -> PathBuf {
    let prefix = PathBuf::normalize(OVERRIDE_PREFIX);
    source
        .strip_prefix(&prefix)
        .unwrap_or_else(|| source.to_path_buf())
}
