//! Constants used throughout the Foliate library.
//!
//! This module provides central definitions for the property names, node
//! types and path literals shared by the materializer, the repository
//! backends and the serving layer.

/// Property on a source root naming the component type the generated
/// target should be served as.
pub const PN_TYPE: &str = "resourceType";

/// Property written onto a generated target root carrying [`PN_TYPE`]'s value.
pub const PN_RESOURCE_TYPE: &str = "sling:resourceType";

/// Marker property flagging a source node for per-breakpoint expansion.
pub const PN_LOOP: &str = "dxResponsiveItem";

/// Conventional "name" property, suffixed per breakpoint on generated copies.
pub const PN_NAME: &str = "name";

/// Display title property.
pub const PN_TITLE: &str = "jcr:title";

/// Description property, copied verbatim.
pub const PN_DESCRIPTION: &str = "jcr:description";

/// Last-modified stamp written on generated target roots.
pub const PN_LAST_MODIFIED: &str = "jcr:lastModified";

/// Generic container node type used for generated target roots.
pub const NT_FOLDER: &str = "sling:Folder";

/// Default node type for nodes that declare none.
pub const NT_UNSTRUCTURED: &str = "nt:unstructured";

/// Override-mount prefix stripped from source paths before deriving the
/// cache path, so the cache key is stable regardless of which mount
/// served the request.
pub const OVERRIDE_PREFIX: &str = "/mnt/override";

/// Default root under which materialized trees are cached.
pub const DEFAULT_CACHE_ROOT: &str = "/var/dx/admin/responsiveinclude";

/// Default roots eligible for materialization.
pub const DEFAULT_DIALOG_ROOTS: &[&str] = &["/apps/dx"];
