//! Entry point for the `algomarket-gateway` HTTP server.

use std::sync::Arc;

use algomarket_gateway::{
    routes::create_router,
    store::{MarketStore, DEMO_AUTHOR_TOKEN, DEMO_MODERATOR_TOKEN},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr = std::env::var("ALGOMARKET_LISTEN_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3456".to_owned());

    let store = Arc::new(MarketStore::with_demo_data());
    let app = create_router(store);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(
        addr = %addr,
        moderator_token = DEMO_MODERATOR_TOKEN,
        author_token = DEMO_AUTHOR_TOKEN,
        "algomarket-gateway listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
