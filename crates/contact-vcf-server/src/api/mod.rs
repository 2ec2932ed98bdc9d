//! HTTP API for contact submission, review and export.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{logging_middleware, rate_limit_middleware, LimitScope, RateLimitState};
pub use types::*;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use contact_store::ContactStore;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Contact store
    pub store: Arc<ContactStore>,
    /// File name offered for the vCard download
    pub export_filename: Arc<str>,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: ContactStore, export_filename: impl Into<Arc<str>>) -> Self {
        Self {
            store: Arc::new(store),
            export_filename: export_filename.into(),
        }
    }
}

/// Create the API router with the default rate limits.
pub fn create_router(state: AppState) -> Router {
    create_router_with_rate_limit(state, RateLimitState::default())
}

/// Create the API router with custom rate limiting.
///
/// Administrator routes carry no authentication; deploy behind a gateway that
/// restricts `/api/contacts*`, `/api/update-status` and `/api/download-vcf`.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Public submission and self-check
        .route("/api/submit", post(handlers::submit_contact))
        .route("/api/status", get(handlers::status_by_query))
        .route("/api/status/:phone", get(handlers::status_by_path))
        // Administration
        .route("/api/contacts", get(handlers::list_contacts))
        .route("/api/contacts/:id", get(handlers::get_contact))
        .route("/api/contacts/:id/approve", post(handlers::approve_contact))
        .route("/api/contacts/:id/reject", post(handlers::reject_contact))
        .route("/api/update-status", post(handlers::update_status))
        // Export
        .route("/api/download-vcf", get(handlers::download_vcf))
        .layer(axum_middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
