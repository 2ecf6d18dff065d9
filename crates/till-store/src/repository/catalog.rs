//! # Catalog Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - CRUD with partial updates (merge semantics)
//! - Batched multi-id fetch for the transaction engine and read paths
//! - Guarded stock adjustment
//!
//! ## Partial Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Partial Updates Work                             │
//! │                                                                         │
//! │  PATCH { "price_cents": 1200 }                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductPatch { name: None, price_cents: Some(1200), .. }              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE products SET price_cents = ?, updated_at = ? WHERE id = ?      │
//! │       ▲                                                                 │
//! │       └── Only supplied columns appear in SET. A patch that does not   │
//! │           touch `stock` can never clobber a concurrent stock change.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use till_core::{CoreError, NewProduct, Product, ProductPatch};

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CatalogRepository::new(pool);
///
/// // Create a product
/// let product = repo.create(&new_product).await?;
///
/// // Get by ID
/// let product = repo.get("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Creates a product.
    ///
    /// ## What This Does
    /// 1. Validates the input fields (name, price, stock)
    /// 2. Assigns a fresh UUID and creation timestamps
    /// 3. Inserts the row
    ///
    /// ## Returns
    /// The stored product, identity and timestamps included.
    pub async fn create(&self, new: &NewProduct) -> StoreResult<Product> {
        new.validate().map_err(CoreError::from)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            description: new.description.clone(),
            price_cents: new.price_cents,
            stock: new.stock,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price_cents, stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by ID.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The product
    /// * `Err(StoreError::NotFound)` - No product with that id
    pub async fn get(&self, id: &str) -> StoreResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, stock, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or_else(|| StoreError::not_found("Product", id))
    }

    /// Lists products with offset/limit pagination.
    ///
    /// Ordered by `(created_at, id)` so pages are stable across requests.
    /// Negative parameters are treated as zero; SQLite reads `LIMIT -1` as
    /// unbounded, and no caller gets that by accident.
    pub async fn list(&self, offset: i64, limit: i64) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, stock, created_at, updated_at
            FROM products
            ORDER BY created_at, id
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(limit.max(0))
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Applies a partial update to a product.
    ///
    /// ## Merge Semantics
    /// Only fields supplied in the patch are written; `None` fields keep
    /// their stored value. A supplied `description` of `Some(None)` is an
    /// explicit null and clears the column. An empty patch is a no-op that
    /// still verifies the product exists.
    ///
    /// ## Returns
    /// The product as stored after the update.
    pub async fn update(&self, id: &str, patch: &ProductPatch) -> StoreResult<Product> {
        patch.validate().map_err(CoreError::from)?;

        if patch.is_empty() {
            return self.get(id).await;
        }

        debug!(id = %id, "Updating product");

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE products SET ");
        let mut fields = builder.separated(", ");
        if let Some(name) = &patch.name {
            fields.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(description) = &patch.description {
            // Binding the inner Option writes NULL for an explicit clear.
            fields
                .push("description = ")
                .push_bind_unseparated(description.clone());
        }
        if let Some(price_cents) = patch.price_cents {
            fields
                .push("price_cents = ")
                .push_bind_unseparated(price_cents);
        }
        if let Some(stock) = patch.stock {
            fields.push("stock = ").push_bind_unseparated(stock);
        }
        fields.push("updated_at = ").push_bind_unseparated(Utc::now());
        builder.push(" WHERE id = ").push_bind(id.to_string());

        let result = builder.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        self.get(id).await
    }

    /// Deletes a product.
    ///
    /// ## Historical Sales
    /// Transaction items referencing this product keep their rows; reads
    /// resolve their display name to `None` from then on. The price and
    /// quantity snapshots in those rows are untouched.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }

        Ok(())
    }

    /// Fetches several products by id in one query, keyed by id.
    ///
    /// Absent ids are simply missing from the map; callers decide whether
    /// that is an error.
    pub async fn get_many(&self, ids: &[String]) -> StoreResult<HashMap<String, Product>> {
        let products = fetch_by_ids(&self.pool, ids).await?;
        Ok(products.into_iter().map(|p| (p.id.clone(), p)).collect())
    }

    /// Atomically adjusts stock by a signed delta.
    ///
    /// ## How It Works
    /// The guard `stock + delta >= 0` is evaluated inside the UPDATE, so
    /// the check and the write are one statement. A delta that would drive
    /// stock negative affects zero rows and the call fails with
    /// InsufficientStock; stock is never written.
    ///
    /// ## Returns
    /// The product with its new stock level.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> StoreResult<Product> {
        debug!(id = %id, delta = delta, "Adjusting stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + ?2, updated_at = ?3
            WHERE id = ?1 AND stock + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Zero rows means the id is unknown or the guard refused the
            // delta. A fresh read distinguishes the two: get() reports
            // NotFound for the former, and the guard only refuses
            // negative deltas, so `requested` below is positive.
            let product = self.get(id).await?;
            return Err(StoreError::Domain(CoreError::InsufficientStock {
                product_id: product.id,
                name: product.name,
                available: product.stock,
                requested: -delta,
            }));
        }

        self.get(id).await
    }

    /// Counts all products.
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Fetches every product whose id appears in `ids`, in a single query.
///
/// Generic over the executor so the transaction engine can run it inside an
/// open database transaction and see uncommitted state.
pub(crate) async fn fetch_by_ids<'e, E>(executor: E, ids: &[String]) -> StoreResult<Vec<Product>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, name, description, price_cents, stock, created_at, updated_at \
         FROM products WHERE id IN (",
    );
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.clone());
    }
    separated.push_unseparated(")");

    let products = builder
        .build_query_as::<Product>()
        .fetch_all(executor)
        .await?;

    Ok(products)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};
    use till_core::ValidationError;

    async fn test_store() -> Store {
        Store::connect(StoreConfig::in_memory()).await.unwrap()
    }

    fn soda() -> NewProduct {
        NewProduct {
            name: "Soda Can".to_string(),
            description: Some("330ml".to_string()),
            price_cents: 150,
            stock: 10,
        }
    }

    #[tokio::test]
    async fn create_then_get_roundtrip() {
        let store = test_store().await;
        let repo = store.catalog();

        let created = repo.create(&soda()).await.unwrap();
        let fetched = repo.get(&created.id).await.unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.name, "Soda Can");
        assert_eq!(fetched.description.as_deref(), Some("330ml"));
        assert_eq!(fetched.price_cents, 150);
        assert_eq!(fetched.stock, 10);
    }

    #[tokio::test]
    async fn create_rejects_invalid_fields() {
        let store = test_store().await;
        let repo = store.catalog();

        let unnamed = NewProduct {
            name: "   ".to_string(),
            ..soda()
        };
        let err = repo.create(&unnamed).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let negative = NewProduct {
            price_cents: -1,
            ..soda()
        };
        let err = repo.create(&negative).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(CoreError::Validation(ValidationError::MustBeNonNegative { .. }))
        ));

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let store = test_store().await;

        let err = store.catalog().get("no-such-id").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_pages_are_stable_and_ordered() {
        let store = test_store().await;
        let repo = store.catalog();

        for i in 0..3 {
            repo.create(&NewProduct {
                name: format!("Product {i}"),
                description: None,
                price_cents: 100 + i,
                stock: 5,
            })
            .await
            .unwrap();
        }

        let all = repo.list(0, 10).await.unwrap();
        assert_eq!(all.len(), 3);

        // Listing order is (created_at, id).
        let keys: Vec<_> = all.iter().map(|p| (p.created_at, p.id.clone())).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        // Pages slice the same ordering.
        let first_two = repo.list(0, 2).await.unwrap();
        let rest = repo.list(2, 2).await.unwrap();
        assert_eq!(first_two.len(), 2);
        assert_eq!(rest.len(), 1);
        assert_eq!(first_two[0].id, all[0].id);
        assert_eq!(first_two[1].id, all[1].id);
        assert_eq!(rest[0].id, all[2].id);
    }

    #[tokio::test]
    async fn list_treats_negative_parameters_as_zero() {
        let store = test_store().await;
        let repo = store.catalog();
        repo.create(&soda()).await.unwrap();

        // A negative limit is an empty page, not an unbounded one.
        assert!(repo.list(0, -1).await.unwrap().is_empty());
        assert_eq!(repo.list(-3, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let store = test_store().await;
        let repo = store.catalog();
        let created = repo.create(&soda()).await.unwrap();

        let patch = ProductPatch {
            price_cents: Some(175),
            ..ProductPatch::default()
        };
        let updated = repo.update(&created.id, &patch).await.unwrap();

        assert_eq!(updated.price_cents, 175);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.stock, created.stock);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn explicit_null_clears_description() {
        let store = test_store().await;
        let repo = store.catalog();
        let created = repo.create(&soda()).await.unwrap();
        assert_eq!(created.description.as_deref(), Some("330ml"));

        // A patch that omits description leaves it alone.
        let patch = ProductPatch {
            price_cents: Some(200),
            ..ProductPatch::default()
        };
        let updated = repo.update(&created.id, &patch).await.unwrap();
        assert_eq!(updated.description.as_deref(), Some("330ml"));

        // An explicit null clears it.
        let patch = ProductPatch {
            description: Some(None),
            ..ProductPatch::default()
        };
        let updated = repo.update(&created.id, &patch).await.unwrap();
        assert_eq!(updated.description, None);
    }

    #[tokio::test]
    async fn empty_patch_is_a_no_op() {
        let store = test_store().await;
        let repo = store.catalog();
        let created = repo.create(&soda()).await.unwrap();

        let unchanged = repo
            .update(&created.id, &ProductPatch::default())
            .await
            .unwrap();

        assert_eq!(unchanged.name, created.name);
        assert_eq!(unchanged.price_cents, created.price_cents);
        assert_eq!(unchanged.stock, created.stock);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = test_store().await;

        let patch = ProductPatch {
            name: Some("Renamed".to_string()),
            ..ProductPatch::default()
        };
        let err = store.catalog().update("no-such-id", &patch).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_rejects_invalid_supplied_fields() {
        let store = test_store().await;
        let repo = store.catalog();
        let created = repo.create(&soda()).await.unwrap();

        let patch = ProductPatch {
            stock: Some(-5),
            ..ProductPatch::default()
        };
        let err = repo.update(&created.id, &patch).await.unwrap_err();
        assert!(matches!(err, StoreError::Domain(CoreError::Validation(_))));

        // Nothing was written.
        let fetched = repo.get(&created.id).await.unwrap();
        assert_eq!(fetched.stock, created.stock);
    }

    #[tokio::test]
    async fn delete_removes_the_product() {
        let store = test_store().await;
        let repo = store.catalog();
        let created = repo.create(&soda()).await.unwrap();

        repo.delete(&created.id).await.unwrap();

        let err = repo.get(&created.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        // A second delete reports NotFound too.
        let err = repo.delete(&created.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn get_many_skips_absent_ids() {
        let store = test_store().await;
        let repo = store.catalog();

        let a = repo.create(&soda()).await.unwrap();
        let b = repo
            .create(&NewProduct {
                name: "Chips".to_string(),
                description: None,
                price_cents: 250,
                stock: 3,
            })
            .await
            .unwrap();

        let ids = vec![a.id.clone(), "ghost".to_string(), b.id.clone()];
        let found = repo.get_many(&ids).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[&a.id].name, "Soda Can");
        assert_eq!(found[&b.id].name, "Chips");
        assert!(!found.contains_key("ghost"));
    }

    #[tokio::test]
    async fn get_many_with_no_ids_is_empty() {
        let store = test_store().await;

        let found = store.catalog().get_many(&[]).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn adjust_stock_applies_signed_deltas() {
        let store = test_store().await;
        let repo = store.catalog();
        let created = repo.create(&soda()).await.unwrap();

        let restocked = repo.adjust_stock(&created.id, 5).await.unwrap();
        assert_eq!(restocked.stock, 15);

        let sold = repo.adjust_stock(&created.id, -12).await.unwrap();
        assert_eq!(sold.stock, 3);
    }

    #[tokio::test]
    async fn adjust_stock_refuses_to_go_negative() {
        let store = test_store().await;
        let repo = store.catalog();
        let created = repo.create(&soda()).await.unwrap();

        let err = repo.adjust_stock(&created.id, -11).await.unwrap_err();
        match err {
            StoreError::Domain(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 10);
                assert_eq!(requested, 11);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // Stock untouched by the refused adjustment.
        let fetched = repo.get(&created.id).await.unwrap();
        assert_eq!(fetched.stock, 10);
    }

    #[tokio::test]
    async fn adjust_stock_unknown_id_is_not_found() {
        let store = test_store().await;

        let err = store.catalog().adjust_stock("no-such-id", -1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
