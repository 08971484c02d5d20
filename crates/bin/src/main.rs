use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use foliate::{
    Breakpoint, FixedContext, IncludeConfig, IncludeServer, Materializer, repository::InMemory,
};
use signal_hook::flag as signal_flag;
use tracing_subscriber::EnvFilter;

const CONTENT_FILE: &str = "content.json";
const LISTEN_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("foliate=info".parse().unwrap()),
        )
        .init();

    // Load or create the content repository
    let repository = match InMemory::load_from_file(CONTENT_FILE) {
        Ok(repo) => {
            tracing::info!("Loaded content from {CONTENT_FILE}");
            Arc::new(repo)
        }
        Err(e) => {
            tracing::warn!("Failed to load content: {e:?}. Starting with an empty repository.");
            Arc::new(InMemory::new())
        }
    };

    let materializer = Arc::new(Materializer::new(repository, IncludeConfig::default())?);
    let context = Arc::new(FixedContext::new(vec![
        Breakpoint::new("mobile", "Mobile", "Mobile"),
        Breakpoint::new("tablet", "Tablet", "Tablet"),
        Breakpoint::new("desktop", "Desktop", "Desktop"),
    ]));

    let mut server = IncludeServer::new(materializer, context);
    server.start(LISTEN_ADDR).await?;
    tracing::info!("Serving responsive includes on http://{}", server.address()?);

    // Run until SIGINT/SIGTERM
    let term = Arc::new(AtomicBool::new(false));
    signal_flag::register(signal_hook::consts::SIGTERM, Arc::clone(&term))?;
    signal_flag::register(signal_hook::consts::SIGINT, Arc::clone(&term))?;
    while !term.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    tracing::info!("Shutting down");
    server.stop().await?;
    Ok(())
}
