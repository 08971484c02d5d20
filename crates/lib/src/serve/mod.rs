//! Read-only HTTP endpoint serving materialized includes.
//!
//! This is the collaborator-facing surface: a request names a source path,
//! the handler resolves (and on first request materializes) the cached
//! tree and streams it back as a JSON document. The endpoint answers GET
//! only and exposes no other operations. Any failure — missing source,
//! refused session, commit failure — yields an empty body rather than a
//! partial include.
//!
//! First-request latency is proportional to subtree size and breakpoint
//! count; materialization runs inline with the triggering request.

pub mod errors;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path as RequestPath, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::sync::oneshot;

pub use errors::ServeError;

use crate::Result;
use crate::breakpoint::ContextProvider;
use crate::materialize::Materializer;
use crate::path::PathBuf;

/// Shared state for the include route.
struct ServeState {
    materializer: Arc<Materializer>,
    context: Arc<dyn ContextProvider>,
}

/// A running server's coordination handles.
struct RunningServer {
    address: String,
    shutdown: oneshot::Sender<()>,
}

/// HTTP server exposing materialized includes read-only.
pub struct IncludeServer {
    state: Arc<ServeState>,
    running: Option<RunningServer>,
}

impl IncludeServer {
    /// Creates a server over a materializer and a request-context source.
    pub fn new(materializer: Arc<Materializer>, context: Arc<dyn ContextProvider>) -> Self {
        Self {
            state: Arc::new(ServeState {
                materializer,
                context,
            }),
            running: None,
        }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/include/{*path}", get(handle_include))
            .with_state(Arc::clone(&self.state))
    }

    /// Starts serving on `addr` (port 0 picks a free port).
    pub async fn start(&mut self, addr: &str) -> Result<()> {
        if let Some(running) = &self.running {
            return Err(ServeError::ServerAlreadyRunning {
                address: running.address.clone(),
            }
            .into());
        }

        let socket_addr: SocketAddr = addr.parse().map_err(|e| ServeError::Bind {
            address: addr.to_string(),
            reason: format!("Invalid address: {e}"),
        })?;

        let listener = tokio::net::TcpListener::bind(socket_addr)
            .await
            .map_err(|e| ServeError::Bind {
                address: addr.to_string(),
                reason: e.to_string(),
            })?;
        let actual_addr = listener.local_addr().map_err(|e| ServeError::Bind {
            address: addr.to_string(),
            reason: e.to_string(),
        })?;

        let router = self.router();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                tracing::error!(error = %e, "include server failed");
            }
        });

        tracing::info!(address = %actual_addr, "include server started");
        self.running = Some(RunningServer {
            address: actual_addr.to_string(),
            shutdown: shutdown_tx,
        });
        Ok(())
    }

    /// Stops the server, completing in-flight requests.
    pub async fn stop(&mut self) -> Result<()> {
        let running = self.running.take().ok_or(ServeError::ServerNotRunning)?;
        let _ = running.shutdown.send(());
        tracing::info!(address = %running.address, "include server stopped");
        Ok(())
    }

    /// Whether the server is currently running.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// The bound address of the running server.
    pub fn address(&self) -> Result<String> {
        self.running
            .as_ref()
            .map(|r| r.address.clone())
            .ok_or_else(|| ServeError::ServerNotRunning.into())
    }
}

/// Handler for `GET /include/{*path}`.
///
/// Resolution and materialization are synchronous blocking work (lease
/// waits included), so they run on the blocking pool.
async fn handle_include(
    State(state): State<Arc<ServeState>>,
    RequestPath(path): RequestPath<String>,
) -> Response {
    let source = PathBuf::normalize(&path);
    let ctx = state.context.request_context();
    let materializer = Arc::clone(&state.materializer);

    let resolved = tokio::task::spawn_blocking(move || {
        let target = materializer.resolve_include(&source, &ctx)?;
        match target {
            Some(target) => materializer.repository().get(&target).map(Some),
            None => Ok(None),
        }
    })
    .await;

    match resolved {
        Ok(Ok(Some(node))) => Json(node).into_response(),
        Ok(Ok(None)) => empty_include(),
        Ok(Err(e)) => {
            if e.is_not_found() {
                tracing::debug!(error = %e, "no content to include");
            } else {
                tracing::error!(error = %e, "include resolution failed");
            }
            empty_include()
        }
        Err(e) => {
            tracing::error!(error = %e, "include task panicked");
            empty_include()
        }
    }
}

/// The fail-closed response: a well-formed empty body.
fn empty_include() -> Response {
    (StatusCode::OK, String::new()).into_response()
}
