//! linkwatch-api — read-only HTTP API over the history store.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/v1/records` | All health records, keyed by target id |
//! | GET | `/api/v1/records/{id}` | One health record |
//! | GET | `/api/v1/targets` | Configured targets |
//! | GET | `/data` | All health records as a bare array |
//! | GET | `/healthz` | Daemon liveness |

pub mod handlers;

use axum::Router;
use axum::routing::get;
use linkwatch_core::TargetRegistry;
use linkwatch_state::HistoryStore;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: HistoryStore,
    pub registry: TargetRegistry,
}

/// Build the complete API router.
pub fn build_router(store: HistoryStore, registry: TargetRegistry) -> Router {
    let api_state = ApiState { store, registry };

    let api_routes = Router::new()
        .route("/records", get(handlers::list_records))
        .route("/records/{id}", get(handlers::get_record))
        .route("/targets", get(handlers::list_targets));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/data", get(handlers::legacy_data))
        .route("/healthz", get(handlers::healthz))
        .with_state(api_state)
}
