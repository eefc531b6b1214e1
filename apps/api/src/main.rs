mod config;
mod editor;
mod errors;
mod generation;
mod identity;
mod llm_client;
mod models;
mod rich_text;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::identity::firebase::FirebaseIdentity;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    let generator = GeminiClient::new(config.gemini_api_key.clone())?;
    if generator.is_configured() {
        info!("Text generator initialized (model: {})", llm_client::MODEL);
    } else {
        warn!("GEMINI_API_KEY not set; generation endpoints will report missing configuration");
    }

    let identity = FirebaseIdentity::new(config.firebase_api_key.clone())?;
    if identity.is_configured() {
        info!("Identity provider initialized");
    } else {
        warn!("FIREBASE_API_KEY not set; auth endpoints will report missing configuration");
    }

    let state = AppState {
        generator: Arc::new(generator),
        identity: Arc::new(identity),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the editor has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
