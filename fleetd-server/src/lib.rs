//! # Fleetd Server
//!
//! Bookkeeping server for mobile robot fleets.
//!
//! ## Overview
//!
//! Two independently-lifecycled HTTP surfaces run against shared state:
//!
//! - **Public API**: fleet/task queries plus the task interruption and
//!   resume protocol, versioned under `/api/v1`.
//! - **Gateway**: the ingest surface used by the fleet-adapter middleware,
//!   the only writer path into the store in normal operation.
//!
//! Both surfaces are served by the [`runtime::DualSurfaceRuntime`], which
//! binds adjacent ports, supervises the two listeners, and drains them
//! together on shutdown.

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;
pub mod runtime;
pub mod signals;

pub use infra::app_state::AppState;

use axum::Router;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the public-surface application.
///
/// The versioned API is nested under the configured public URL path prefix.
pub fn create_public_app(state: AppState) -> Router {
    let api = routes::create_api_router();

    let cors_layer = if state.config.dev_mode {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .cors
            .allowed_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();
        let allow_origin = if origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        };
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = Router::new()
        .route("/ping", axum::routing::get(handlers::health::ping))
        .route("/health", axum::routing::get(handlers::health::health))
        .merge(api)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http());

    let prefix = state.config.server.public_url_prefix.trim_end_matches('/');
    let app = if prefix.is_empty() {
        app
    } else {
        Router::new().nest(prefix, app)
    };

    app.with_state(state)
}

/// Builds the gateway-surface application used by the fleet-adapter
/// middleware.
pub fn create_gateway_app(state: AppState) -> Router {
    Router::new()
        .route("/ping", axum::routing::get(handlers::health::ping))
        .route("/health", axum::routing::get(handlers::health::health))
        .merge(routes::create_gateway_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
