//! # Product Routes
//!
//! Catalog CRUD over HTTP.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Product Request Flow                               │
//! │                                                                         │
//! │  POST /products {"name": "Soda", "price_cents": 150, "stock": 10}       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Json<NewProduct> ──► CatalogRepository::create                         │
//! │       │                    │                                            │
//! │       │                    ├─ validate fields (till-core)               │
//! │       │                    └─ INSERT + assign id/timestamps             │
//! │       ▼                                                                 │
//! │  201 + ProductResponse        errors surface as ApiError JSON           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Partial updates use PATCH with merge semantics: absent fields keep their
//! stored values, so `{"price_cents": 175}` changes only the price. An
//! explicit `{"description": null}` counts as supplied and clears the
//! description.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use till_core::{NewProduct, Product, ProductPatch};

use crate::error::ApiError;
use crate::routes::Pagination;
use crate::AppState;

/// Wire shape for a product.
///
/// Decouples the HTTP contract from the storage model so either can change
/// without breaking the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            price_cents: p.price_cents,
            stock: p.stock,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Creates a product and returns it with its assigned id and timestamps.
pub async fn create_product(
    State(state): State<AppState>,
    Json(new): Json<NewProduct>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let product = state.store.catalog().create(&new).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// Lists products ordered by creation time, oldest first.
pub async fn list_products(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let (offset, limit) = pagination.clamp();
    let products = state.store.catalog().list(offset, limit).await?;
    Ok(Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

/// Fetches a single product by id.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.store.catalog().get(&id).await?;
    Ok(Json(product.into()))
}

/// Applies a partial update and returns the product as stored afterwards.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.store.catalog().update(&id, &patch).await?;
    Ok(Json(product.into()))
}

/// Deletes a product.
///
/// Recorded sales keep their price and name snapshots; only future lookups
/// of this id stop resolving.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.catalog().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Unit Tests
// =============================================================================
