//!
//! Foliate: a breakpoint-aware materialization cache for authored
//! configuration trees.
//!
//! Foliate generates and caches "responsive" variants of component
//! configuration subtrees stored in a hierarchical node repository. A node
//! flagged with the breakpoint-loop marker has its subtree regenerated once
//! per breakpoint with suffixed names; unflagged content is copied once,
//! verbatim. Results persist under a cache root and are reused until an
//! external staleness collaborator invalidates them.
//!
//! ## Core Concepts
//!
//! * **Nodes (`node::Node`)**: the unit of content — name, primary type,
//!   typed properties and ordered children.
//! * **Paths (`path::Path` / `path::PathBuf`)**: absolute, normalized
//!   repository paths, with the borrowed/owned split of `std::path`.
//! * **Repositories (`repository::Repository`)**: pluggable node storage
//!   with owned-copy reads and atomic batched writes.
//! * **Write sessions (`session::WriteSession`)**: per-operation staging of
//!   changes, committed atomically or not at all.
//! * **Breakpoints (`breakpoint::Breakpoint`)**: the responsive tiers the
//!   host supplies per request, in order.
//! * **The materializer (`materialize::Materializer`)**: resolves a source
//!   path to its cached include, building it on first request under a
//!   per-target-path lease.
//! * **The include server (`serve::IncludeServer`)**: the read-only HTTP
//!   surface streaming materialized trees as JSON, empty-bodied on failure.

pub mod breakpoint;
pub mod clock;
pub mod config;
pub mod constants;
pub mod materialize;
pub mod node;
pub mod path;
pub mod repository;
pub mod serve;
pub mod session;

pub use breakpoint::{Breakpoint, ContextProvider, FixedContext, RequestContext};
pub use clock::{Clock, SystemClock};
pub use config::IncludeConfig;
pub use materialize::Materializer;
pub use node::{Node, Value};
pub use serve::IncludeServer;
pub use session::WriteSession;

#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;

/// Result type used throughout the Foliate library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Foliate library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured storage errors from the repository module
    #[error(transparent)]
    Repository(repository::RepositoryError),

    /// Structured write-session errors from the session module
    #[error(transparent)]
    Session(session::SessionError),

    /// Structured materializer errors from the materialize module
    #[error(transparent)]
    Materialize(materialize::MaterializeError),

    /// Structured configuration errors from the config module
    #[error(transparent)]
    Config(config::ConfigError),

    /// Structured server errors from the serve module
    #[error(transparent)]
    Serve(serve::ServeError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Repository(_) => "repository",
            Error::Session(_) => "session",
            Error::Materialize(_) => "materialize",
            Error::Config(_) => "config",
            Error::Serve(_) => "serve",
        }
    }

    /// Check if this error indicates content that was not found —
    /// the "nothing to include" outcome.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Repository(e) => e.is_not_found(),
            Error::Materialize(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a write conflict on node creation.
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Repository(e) => e.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error means a write session could not be opened.
    pub fn is_session_acquisition_failure(&self) -> bool {
        match self {
            Error::Session(e) => e.is_acquisition_failure(),
            Error::Repository(e) => e.is_access_denied(),
            _ => false,
        }
    }

    /// Check if this error means a staged batch failed to persist.
    pub fn is_persistence_failure(&self) -> bool {
        match self {
            Error::Session(e) => e.is_persistence_failure(),
            _ => false,
        }
    }

    /// Check if this error is configuration-related.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}
