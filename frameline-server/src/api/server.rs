//! HTTP server setup and routing
//!
//! Sets up the Axum HTTP server with routes for the catalog, per-room
//! playback control, threads and timeline pins, highlight signals,
//! presence, and the SSE event stream.

use crate::error::{Error, Result};
use crate::state::SharedState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub state: Arc<SharedState>,
}

/// Build the router with all routes
pub fn create_router(state: Arc<SharedState>) -> Router {
    let ctx = AppContext { state };

    Router::new()
        // Health endpoint
        .route("/health", get(super::handlers::health))

        // Resource catalog
        .route("/resources", get(super::handlers::list_resources))
        .route("/resources/:id", get(super::handlers::get_resource))
        .route(
            "/resources/:id/adjacent/:direction",
            get(super::handlers::navigate_resource),
        )

        // Playback transport
        .route("/rooms/:id/playback/state", get(super::handlers::get_transport))
        .route("/rooms/:id/playback/play", post(super::handlers::play))
        .route("/rooms/:id/playback/pause", post(super::handlers::pause))
        .route("/rooms/:id/playback/toggle", post(super::handlers::toggle_playing))
        .route("/rooms/:id/playback/progress", post(super::handlers::report_progress))
        .route("/rooms/:id/playback/duration", post(super::handlers::report_duration))
        .route("/rooms/:id/playback/ended", post(super::handlers::report_ended))
        .route("/rooms/:id/playback/scrub", post(super::handlers::scrub))
        .route("/rooms/:id/playback/scrub/commit", post(super::handlers::scrub_commit))
        .route("/rooms/:id/playback/skip-to", post(super::handlers::skip_to))
        .route("/rooms/:id/playback/volume", post(super::handlers::set_volume))
        .route("/rooms/:id/playback/mute", post(super::handlers::toggle_mute))
        .route("/rooms/:id/playback/loop", post(super::handlers::toggle_loop))
        .route("/rooms/:id/playback/fullscreen", post(super::handlers::toggle_fullscreen))
        .route(
            "/rooms/:id/playback/fullscreen/support",
            post(super::handlers::set_fullscreen_support),
        )
        .route("/rooms/:id/playback/speed", post(super::handlers::set_speed))
        .route("/rooms/:id/playback/quality", post(super::handlers::set_quality))
        .route("/rooms/:id/playback/options", get(super::handlers::get_player_options))
        .route("/rooms/:id/playback/key", post(super::handlers::press_key))

        // Threads, timeline pins, composer
        .route("/rooms/:id/threads", get(super::handlers::get_threads))
        .route("/rooms/:id/threads", post(super::handlers::create_thread))
        .route("/rooms/:id/timeline", get(super::handlers::get_timeline))
        .route("/rooms/:id/composer/focus", post(super::handlers::composer_focus))
        .route("/rooms/:id/composer/blur", post(super::handlers::composer_blur))

        // Highlight/skip coordination
        .route(
            "/rooms/:id/signals/highlight-thread",
            post(super::handlers::highlight_thread),
        )
        .route(
            "/rooms/:id/signals/highlight-pin",
            post(super::handlers::highlight_pin),
        )
        .route("/rooms/:id/signals/reset", post(super::handlers::reset_highlights))

        // Presence
        .route("/rooms/:id/presence", get(super::handlers::get_presence))
        .route("/rooms/:id/presence/join", post(super::handlers::presence_join))
        .route(
            "/rooms/:id/presence/:connection_id",
            delete(super::handlers::presence_leave),
        )
        .route(
            "/rooms/:id/presence/:connection_id/sync",
            post(super::handlers::presence_sync),
        )

        // SSE event stream
        .route("/rooms/:id/events", get(super::sse::event_stream))

        // Attach application context
        .with_state(ctx)

        // Request tracing and CORS for local review clients
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the HTTP API server
pub async fn run(port: u16, state: Arc<SharedState>) -> Result<()> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}
