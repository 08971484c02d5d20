//! Responsive breakpoints and the request-scoped context carrying them.
//!
//! A [`Breakpoint`] is one responsive tier (mobile, tablet, ...). The host
//! serving a request supplies an ordered sequence of them, together with
//! opaque policy maps, as a [`RequestContext`]. The materializer consumes
//! only the breakpoint sequence; everything else is carried through
//! untouched for downstream renderers.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One responsive design tier.
///
/// `property_suffix` disambiguates generated node names and `name` property
/// values; `label` is the display title written onto generated roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Stable identifier of the tier (e.g. `mobile`).
    pub key: String,
    /// Human-readable label (e.g. `Mobile`).
    pub label: String,
    /// Suffix appended to generated node names and `name` properties.
    pub property_suffix: String,
}

impl Breakpoint {
    /// Creates a breakpoint from its three parts.
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        property_suffix: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            property_suffix: property_suffix.into(),
        }
    }
}

/// Request-scoped context supplied by the host.
///
/// Order of `breakpoints` determines child-creation order during expansion,
/// nothing more. `policy` and `responsive_properties` are opaque here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    /// Ordered breakpoint sequence for this request. May be empty, in which
    /// case loop-marked nodes expand to nothing.
    pub breakpoints: Vec<Breakpoint>,
    /// Current policy values, opaque to the materializer.
    #[serde(default)]
    pub policy: JsonValue,
    /// Current responsive property map, opaque to the materializer.
    #[serde(default)]
    pub responsive_properties: JsonValue,
}

impl RequestContext {
    /// Creates a context carrying only a breakpoint sequence.
    pub fn with_breakpoints(breakpoints: Vec<Breakpoint>) -> Self {
        Self {
            breakpoints,
            ..Self::default()
        }
    }
}

/// Source of per-request context for the serving layer.
///
/// In the original host this is bound into the request by the scripting
/// engine; here it is an explicit seam so embedders can derive context from
/// session state, headers or configuration.
pub trait ContextProvider: Send + Sync {
    /// The context for the request currently being served.
    fn request_context(&self) -> RequestContext;
}

/// A [`ContextProvider`] returning the same context for every request.
#[derive(Debug, Clone)]
pub struct FixedContext {
    context: RequestContext,
}

impl FixedContext {
    /// Creates a provider with a fixed breakpoint sequence.
    pub fn new(breakpoints: Vec<Breakpoint>) -> Self {
        Self {
            context: RequestContext::with_breakpoints(breakpoints),
        }
    }
}

impl ContextProvider for FixedContext {
    fn request_context(&self) -> RequestContext {
        self.context.clone()
    }
}
