//! # Route Layer
//!
//! Endpoint paths, router construction, and shared request plumbing.
//!
//! ## Endpoints
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────┬─────────┐
//! │ Method & path                │ Operation                    │ Success │
//! ├──────────────────────────────┼──────────────────────────────┼─────────┤
//! │ POST   /products             │ Create product               │ 201     │
//! │ GET    /products             │ List products (paged)        │ 200     │
//! │ GET    /products/{id}        │ Fetch one product            │ 200     │
//! │ PATCH  /products/{id}        │ Partial update               │ 200     │
//! │ DELETE /products/{id}        │ Delete product               │ 204     │
//! │ POST   /transactions         │ Record a sale                │ 201     │
//! │ GET    /transactions         │ List transactions (paged)    │ 200     │
//! │ GET    /transactions/{id}    │ Fetch one transaction        │ 200     │
//! │ GET    /health               │ Liveness + database check    │ 200     │
//! └──────────────────────────────┴──────────────────────────────┴─────────┘
//! ```
//!
//! Handlers stay thin: deserialize, call the store, convert the result.
//! Every rule about pricing and stock lives in `till-core`/`till-store`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod product;
pub mod transaction;

// The API endpoint paths.
/// The route to create and list products.
pub const PRODUCTS: &str = "/products";
/// The route to fetch, patch, or delete a single product.
pub const PRODUCT: &str = "/products/{id}";
/// The route to record and list sales.
pub const TRANSACTIONS: &str = "/transactions";
/// The route to fetch a single sale.
pub const TRANSACTION: &str = "/transactions/{id}";
/// The route for liveness checks.
pub const HEALTH: &str = "/health";

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: i64 = 500;

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            PRODUCTS,
            get(product::list_products).post(product::create_product),
        )
        .route(
            PRODUCT,
            get(product::get_product)
                .patch(product::update_product)
                .delete(product::delete_product),
        )
        .route(
            TRANSACTIONS,
            get(transaction::list_transactions).post(transaction::create_transaction),
        )
        .route(TRANSACTION, get(transaction::get_transaction))
        .route(HEALTH, get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Pagination
// =============================================================================

/// Query parameters for paginated listings.
///
/// Both parameters are optional: `GET /products` is equivalent to
/// `GET /products?offset=0&limit=100`.
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    /// Rows to skip before the first returned row
    #[serde(default)]
    pub offset: i64,

    /// Maximum rows to return, capped at [`MAX_PAGE_SIZE`]
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl Pagination {
    /// Clamps the parameters into safe ranges: a non-negative offset and a
    /// limit in `0..=MAX_PAGE_SIZE`. A limit of zero is honoured as an
    /// empty page.
    pub fn clamp(&self) -> (i64, i64) {
        (self.offset.max(0), self.limit.clamp(0, MAX_PAGE_SIZE))
    }
}

// =============================================================================
// Health
// =============================================================================

/// Health check payload.
#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    database: bool,
}

/// Liveness endpoint. Reports whether the database still answers queries.
async fn health(State(state): State<AppState>) -> Json<Health> {
    let database = state.store.health_check().await;
    Json(Health {
        status: if database { "ok" } else { "degraded" },
        database,
    })
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use axum_test::TestServer;
    use till_store::{Store, StoreConfig};

    use super::build_router;
    use crate::AppState;

    /// Boots the full router on a fresh in-memory database.
    ///
    /// Returns the store alongside the server so tests can seed rows and
    /// inspect state without going through HTTP.
    pub(crate) async fn test_server() -> (TestServer, Store) {
        let store = Store::connect(StoreConfig::in_memory())
            .await
            .expect("Could not open in-memory store.");
        let app = build_router(AppState {
            store: store.clone(),
        });
        // TestServer::new is infallible; it panics itself if the router
        // cannot be served.
        let server = TestServer::new(app);
        (server, store)
    }
}
