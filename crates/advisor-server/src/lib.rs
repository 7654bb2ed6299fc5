//! Advisor Server Library
//!
//! Provides the HTTP/WebSocket surface for running advisory swarms.

pub mod routes;
pub mod state;

use advisor_core::{market, InMemoryLeadStore, ProviderRegistry, SwarmEngine};
use axum::{
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Once;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use state::AppState;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber (only once)
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(
                std::env::var("RUST_LOG").unwrap_or_else(|_| {
                    "advisor_server=info,advisor_core=info,tower_http=info".into()
                }),
            ))
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}

/// Build the Axum router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/leads", get(routes::list_leads))
        .route(
            "/api/leads/:id",
            get(routes::get_lead).put(routes::put_lead),
        )
        .route("/api/leads/:id/swarm", post(routes::run_swarm))
        .route("/api/leads/:id/ws", get(routes::websocket_handler))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the Advisor web server on the specified port
pub async fn run_server(port: u16) -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting Advisor Server...");

    let cwd = std::env::current_dir()?;
    let config = match advisor_core::load_config(&cwd) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load config; using defaults");
            advisor_core::AdvisorConfig::default()
        }
    };

    let registry = ProviderRegistry::from_config(&config)?;
    for info in registry.provider_info() {
        tracing::info!(provider = %info.id, "Provider ready: {}", info.display());
    }

    let engine = SwarmEngine::new(registry, config.run.clone())
        .with_market(market::from_config(&config.market));
    let state = AppState::new(engine, InMemoryLeadStore::new());

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/api/leads/:id/ws", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": advisor_core::version()
    }))
}
