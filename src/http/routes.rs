//! HTTP route definitions

use std::sync::atomic::Ordering;

use axum::{
    extract::State,
    http::{header, Method},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::app::AppState;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors_layer(&state.config.client_origins)),
        )
        .with_state(state)
}

/// CORS restricted to the configured origins, or open when none are set
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed_origins: Vec<header::HeaderValue> = origins
        .iter()
        .filter_map(|s| s.parse::<header::HeaderValue>().ok())
        .collect();
    cors.allow_origin(allowed_origins)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    tick: u64,
    connections: usize,
    players: usize,
    roster_size: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.arena.stats();

    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        tick: stats.tick.load(Ordering::Relaxed),
        connections: stats.connections.load(Ordering::Relaxed),
        players: stats.players.load(Ordering::Relaxed),
        roster_size: state.directory.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::identity::Directory;

    #[tokio::test]
    async fn health_reports_arena_counters() {
        let config = Config::from_lookup(|_| None).unwrap();
        let state = AppState::new(config, Directory::builtin());

        let Json(health) = health_handler(State(state)).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.players, 0);
        assert_eq!(health.connections, 0);
        assert_eq!(health.roster_size, 4);
    }
}
