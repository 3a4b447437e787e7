//! HTTP route handlers for the inventory API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (verifies Airtable access)
//!
//! # Auth
//! POST /auth/login             - Exchange credentials for an access token
//! GET  /auth/me                - Current user profile
//!
//! # Products (requires auth)
//! GET    /products             - List products for a channel
//! GET    /products/{id}        - Product by record ID
//! GET    /products/barcode/{barcode} - Product by barcode
//! POST   /products             - Create or upsert by barcode
//! PATCH  /products/{id}        - Partial update
//! DELETE /products/{id}        - Delete
//!
//! # Lookup (requires auth)
//! GET  /lookup                 - Resolve a barcode or product URL
//!
//! # Scan history (requires auth)
//! GET  /history                - Recent scans
//! POST /history                - Record a scan
//!
//! # Reporting (requires auth)
//! GET  /stats                  - Per-channel inventory statistics
//! GET  /export                 - CSV export of a channel table
//!
//! # Settings (requires auth)
//! GET  /settings               - All settings as a key/value map
//! PUT  /settings               - Upsert settings from a key/value map
//! ```

pub mod auth;
pub mod export;
pub mod health;
pub mod history;
pub mod lookup;
pub mod products;
pub mod settings;
pub mod stats;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::rate_limit::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router, with its own strict rate limit.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login).layer(auth_rate_limiter()))
        .route("/me", get(auth::me))
}

/// Create the authenticated API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list).post(products::upsert))
        .route(
            "/products/{id}",
            get(products::get_by_id)
                .patch(products::update)
                .delete(products::delete),
        )
        .route("/products/barcode/{barcode}", get(products::get_by_barcode))
        .route("/lookup", get(lookup::lookup))
        .route("/history", get(history::list).post(history::record))
        .route("/stats", get(stats::stats))
        .route("/export", get(export::export))
        .route("/settings", get(settings::list).put(settings::upsert))
        .layer(api_rate_limiter())
}

/// Create the health routes router. Unauthenticated and unlimited.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
}
