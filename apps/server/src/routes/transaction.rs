//! # Transaction Routes
//!
//! Sale recording and transaction history over HTTP.
//!
//! ## Sale Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Request Flow                                 │
//! │                                                                         │
//! │  POST /transactions                                                     │
//! │  {"items": [{"product_id": "...", "quantity": 3}]}                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TransactionRepository::create (single database transaction)            │
//! │       │                                                                 │
//! │       ├─ all products missing?      → 404 NOT_FOUND (every id named)    │
//! │       ├─ quantity <= 0 / no items?  → 400 VALIDATION_ERROR              │
//! │       ├─ stock short on any line?   → 400 INSUFFICIENT_STOCK            │
//! │       │                               (nothing written, nothing deducted)│
//! │       ▼                                                                 │
//! │  201 + TransactionResponse with priced, named line items                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices on recorded sales are snapshots. Later catalog edits or deletions
//! never change what a past response reports.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use till_core::{SaleLine, TransactionDetail, TransactionItemDetail};

use crate::error::ApiError;
use crate::routes::Pagination;
use crate::AppState;

/// Request body for recording a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    /// Requested lines, in the order the cashier rang them up
    pub items: Vec<SaleLine>,
}

/// Wire shape for a recorded sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: String,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub items: Vec<TransactionItemResponse>,
}

/// Wire shape for one line of a recorded sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionItemResponse {
    pub id: String,
    pub product_id: String,
    /// `null` when the product has since been deleted from the catalog
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl From<TransactionDetail> for TransactionResponse {
    fn from(detail: TransactionDetail) -> Self {
        TransactionResponse {
            id: detail.id,
            total_cents: detail.total_cents,
            created_at: detail.created_at,
            items: detail
                .items
                .into_iter()
                .map(TransactionItemResponse::from)
                .collect(),
        }
    }
}

impl From<TransactionItemDetail> for TransactionItemResponse {
    fn from(item: TransactionItemDetail) -> Self {
        TransactionItemResponse {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
            line_total_cents: item.line_total_cents,
        }
    }
}

/// Records a sale: prices every line at current catalog prices, deducts
/// stock, and returns the stored transaction.
pub async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let detail = state.store.transactions().create(&request.items).await?;
    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// Lists transactions ordered by creation time, oldest first, each with its
/// line items attached.
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let (offset, limit) = pagination.clamp();
    let transactions = state.store.transactions().list(offset, limit).await?;
    Ok(Json(
        transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect(),
    ))
}

/// Fetches a single transaction by id.
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let detail = state.store.transactions().get(&id).await?;
    Ok(Json(detail.into()))
}

// =============================================================================
// Unit Tests
// =============================================================================
