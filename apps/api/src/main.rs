mod articles;
mod auth;
mod config;
mod errors;
mod export;
mod generation;
mod llm_client;
mod models;
mod render;
mod review;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::AzureClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lexpost API v{}", env!("CARGO_PKG_VERSION"));

    config.ensure_dirs()?;
    info!(
        "Articles: {}, exports: {}, images: {}",
        config.articles_dir.display(),
        config.generated_dir.display(),
        config.image_dir.display()
    );

    // Initialize the Azure OpenAI client
    let backend = AzureClient::new(config.azure.clone())?;
    info!(
        "Azure client initialized (text: {}, image: {})",
        config.azure.text_deployment, config.azure.image_deployment
    );

    let state = AppState::new(config.clone(), Arc::new(backend));

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the front-end host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
