//! Entry point for the `codebin-gateway` HTTP server.

use std::sync::Arc;

use codebin_gateway::{
    compile::HttpCompiler,
    config::GatewayConfig,
    routes::{create_router, AppState},
    scheduler::spawn_daily_sweep,
};
use codebin_store::{FileStore, MemoryStore, SnippetLifecycle, SnippetStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match GatewayConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let store: Arc<dyn SnippetStore> = match &config.data_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "using file store");
            Arc::new(FileStore::new(dir))
        }
        None => {
            info!("using in-memory store; snippets will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };
    if let Err(e) = store.health_check().await {
        tracing::error!(error = %e, "store is not usable");
        std::process::exit(1);
    }

    let lifecycle = Arc::new(SnippetLifecycle::new(store).with_ttl(config.ttl));
    let compiler = match HttpCompiler::new(config.compile_url.clone(), config.compile_timeout) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(error = %e, "failed to build compile client");
            std::process::exit(1);
        }
    };

    spawn_daily_sweep(Arc::clone(&lifecycle), config.sweep_at);

    let app = create_router(AppState::new(lifecycle, compiler));

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %config.listen_addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(
        addr = %config.listen_addr,
        ttl = %config.ttl,
        sweep_at = %config.sweep_at,
        compile_url = %config.compile_url,
        "codebin-gateway listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
