//! # Transaction Repository
//!
//! Atomic sale recording and transaction reads.
//!
//! ## Sale Recording Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Sale Recording Pipeline                             │
//! │                                                                         │
//! │  1. BEGIN: one database transaction for the whole request              │
//! │     └── pool.begin()                                                   │
//! │                                                                         │
//! │  2. FETCH: every distinct product id, one batched SELECT               │
//! │     └── fetch_by_ids(&mut *tx, ids)                                    │
//! │                                                                         │
//! │  3. PRICE: pure till-core pass over the fetched snapshot               │
//! │     └── price_sale() → validates, prices lines, plans deductions       │
//! │                                                                         │
//! │  4. DEDUCT: guarded UPDATE per distinct product                        │
//! │     └── SET stock = stock - n WHERE stock >= n                         │
//! │                                                                         │
//! │  5. INSERT: transaction row + one item row per request line            │
//! │                                                                         │
//! │  6. COMMIT: everything or nothing                                      │
//! │     └── any failure drops the transaction, rolling all of it back      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Item rows freeze `unit_price_cents` and `line_total_cents` at sale time.
//! Later price changes and even product deletion never touch recorded sales;
//! only the display name is resolved fresh on each read.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::repository::catalog;
use till_core::{
    distinct_product_ids, price_sale, CoreError, Product, SaleLine, Transaction,
    TransactionDetail, TransactionItem,
};

/// Repository for transaction database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = TransactionRepository::new(pool);
///
/// // Record a sale
/// let detail = repo.create(&lines).await?;
///
/// // Read it back
/// let detail = repo.get(&detail.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Records a sale: prices the requested lines, deducts stock, and
    /// persists the transaction with its items, all atomically.
    ///
    /// ## What This Does
    /// 1. Opens one database transaction for the entire request
    /// 2. Fetches every distinct referenced product in a single SELECT
    /// 3. Runs the pure pricing pass (validation, missing ids, stock check
    ///    with running deductions for duplicated products, line totals)
    /// 4. Applies each planned deduction with a stock guard
    /// 5. Inserts the transaction row and one item row per request line
    /// 6. Commits
    ///
    /// Any error on any step returns before the commit, which rolls back
    /// every deduction and insert. The catalog is left exactly as it was.
    ///
    /// ## Returns
    /// The materialized transaction, names resolved from the products
    /// fetched in step 2 without any further lookup.
    pub async fn create(&self, lines: &[SaleLine]) -> StoreResult<TransactionDetail> {
        debug!(lines = lines.len(), "Creating transaction");

        let mut tx = self.pool.begin().await?;

        // Single batched lookup of every distinct product referenced.
        let ids = distinct_product_ids(lines);
        let products: HashMap<String, Product> = catalog::fetch_by_ids(&mut *tx, &ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        // Validation, pricing and deduction planning are pure core logic
        // over the snapshot just fetched.
        let priced = price_sale(lines, &products)?;

        for deduction in &priced.deductions {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - ?2, updated_at = ?3
                WHERE id = ?1 AND stock >= ?2
                "#,
            )
            .bind(&deduction.product_id)
            .bind(deduction.quantity)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // The snapshot check passed but the guard refused the live
                // row. Re-read the current stock for the error and bail;
                // dropping `tx` rolls back earlier deductions.
                let available: i64 = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                    .bind(&deduction.product_id)
                    .fetch_one(&mut *tx)
                    .await?;
                let product = products
                    .get(&deduction.product_id)
                    .ok_or_else(|| StoreError::not_found("Product", &deduction.product_id))?;

                return Err(StoreError::Domain(CoreError::InsufficientStock {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    available,
                    requested: deduction.quantity,
                }));
            }
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(
            id = %id,
            total_cents = priced.total_cents,
            "Recording transaction"
        );

        sqlx::query(
            r#"
            INSERT INTO transactions (id, total_cents, created_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&id)
        .bind(priced.total_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(priced.lines.len());
        for (position, line) in priced.lines.iter().enumerate() {
            let item = TransactionItem {
                id: Uuid::new_v4().to_string(),
                transaction_id: id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line.line_total_cents,
                position: position as i64,
            };

            sqlx::query(
                r#"
                INSERT INTO transaction_items
                    (id, transaction_id, product_id, quantity,
                     unit_price_cents, line_total_cents, position)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.transaction_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.line_total_cents)
            .bind(item.position)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        tx.commit().await?;

        let transaction = Transaction {
            id,
            total_cents: priced.total_cents,
            created_at: now,
        };

        Ok(TransactionDetail::from_parts(&transaction, &items, &products))
    }

    /// Gets a transaction by ID, items in recorded order.
    ///
    /// Product names are resolved through one batched catalog fetch;
    /// deleted products resolve to `None`.
    pub async fn get(&self, id: &str) -> StoreResult<TransactionDetail> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, total_cents, created_at
            FROM transactions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Transaction", id))?;

        let items = sqlx::query_as::<_, TransactionItem>(
            r#"
            SELECT id, transaction_id, product_id, quantity,
                   unit_price_cents, line_total_cents, position
            FROM transaction_items
            WHERE transaction_id = ?1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let products = self.products_for_items(&items).await?;

        Ok(TransactionDetail::from_parts(&transaction, &items, &products))
    }

    /// Lists transactions with offset/limit pagination, each with its items.
    ///
    /// Negative parameters are treated as zero, never as SQLite's unbounded
    /// `LIMIT -1`.
    ///
    /// ## Query Shape
    /// Three queries total, independent of page size: the transaction page,
    /// all item rows for the page, and one batched product fetch for names.
    /// Never one query per transaction or per item.
    pub async fn list(&self, offset: i64, limit: i64) -> StoreResult<Vec<TransactionDetail>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, total_cents, created_at
            FROM transactions
            ORDER BY created_at, id
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(limit.max(0))
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await?;

        if transactions.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, transaction_id, product_id, quantity, \
             unit_price_cents, line_total_cents, position \
             FROM transaction_items WHERE transaction_id IN (",
        );
        let mut separated = builder.separated(", ");
        for transaction in &transactions {
            separated.push_bind(transaction.id.clone());
        }
        separated.push_unseparated(")");
        builder.push(" ORDER BY transaction_id, position");

        let items: Vec<TransactionItem> = builder
            .build_query_as::<TransactionItem>()
            .fetch_all(&self.pool)
            .await?;

        let products = self.products_for_items(&items).await?;

        let mut by_transaction: HashMap<String, Vec<TransactionItem>> = HashMap::new();
        for item in items {
            by_transaction
                .entry(item.transaction_id.clone())
                .or_default()
                .push(item);
        }

        let details = transactions
            .iter()
            .map(|transaction| {
                let items = by_transaction.remove(&transaction.id).unwrap_or_default();
                TransactionDetail::from_parts(transaction, &items, &products)
            })
            .collect();

        Ok(details)
    }

    /// One batched catalog fetch covering every product an item set
    /// references. Deleted products are simply absent from the map.
    async fn products_for_items(
        &self,
        items: &[TransactionItem],
    ) -> StoreResult<HashMap<String, Product>> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut ids: Vec<String> = Vec::new();
        for item in items {
            if seen.insert(item.product_id.as_str()) {
                ids.push(item.product_id.clone());
            }
        }

        let products = catalog::fetch_by_ids(&self.pool, &ids).await?;
        Ok(products.into_iter().map(|p| (p.id.clone(), p)).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
