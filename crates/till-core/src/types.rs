//! # Domain Types
//!
//! Core domain types used throughout Till.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    Product      │   │  Transaction    │   │  TransactionItem    │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)          │   │
//! │  │  name           │   │  total_cents    │   │  transaction_id FK  │   │
//! │  │  price_cents    │   │  created_at     │   │  product_id (plain) │   │
//! │  │  stock          │   │                 │   │  unit_price (frozen)│   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────────┘   │
//! │                                                                         │
//! │  Input shapes:  NewProduct, ProductPatch, SaleLine                     │
//! │  Read shapes:   TransactionDetail (+ denormalized product names)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership Rules
//! - A TransactionItem is owned by its Transaction (created and deleted with it).
//! - The item's `product_id` is a plain, non-owning reference: the product may
//!   be edited or deleted later without touching the recorded item.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_price_cents, validate_product_name, validate_quantity, validate_stock,
};

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and in listings.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Current stock level. Never negative post-commit.
    pub stock: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Product Input Shapes
// =============================================================================

/// Fields for creating a product. Identity and timestamps are assigned by the
/// catalog on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    /// Initial stock level; defaults to zero.
    #[serde(default)]
    pub stock: i64,
}

impl NewProduct {
    /// Validates all fields up front, before any storage work happens.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_product_name(&self.name)?;
        validate_price_cents(self.price_cents)?;
        validate_stock(self.stock)?;
        Ok(())
    }
}

/// A partial update to a product. `None` fields are left unchanged (merge
/// semantics, not full replace).
///
/// `description` is nullable in storage, so it must keep "field absent" and
/// "explicit null" apart: the outer `Option` is presence, the inner one is
/// the value to store. `{"description": null}` clears the description;
/// omitting the field leaves it alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub stock: Option<i64>,
}

/// Deserializer for nullable patch fields. An absent field never reaches
/// this function (the `default` stays `None`); a present `null` becomes
/// `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ProductPatch {
    /// True when no field is supplied at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price_cents.is_none()
            && self.stock.is_none()
    }

    /// Validates the supplied fields with the same rules as creation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate_product_name(name)?;
        }
        if let Some(price_cents) = self.price_cents {
            validate_price_cents(price_cents)?;
        }
        if let Some(stock) = self.stock {
            validate_stock(stock)?;
        }
        Ok(())
    }
}

// =============================================================================
// Sale Input Shape
// =============================================================================

/// One requested line of a proposed sale: a product reference and a quantity.
///
/// This is the engine's input shape. Duplicated product ids across lines are
/// allowed; the engine tracks their combined stock demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
}

impl SaleLine {
    /// Validates the line's quantity (must be positive).
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_quantity(self.quantity)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A recorded sale. Immutable once created: no update or delete exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Transaction {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Total in cents. Equals the sum of the line totals, computed at
    /// creation time and never recomputed.
    pub total_cents: i64,

    /// When the sale was recorded.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A line item in a recorded sale.
/// Uses the snapshot pattern to freeze the unit price at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    /// Plain reference to the product; not kept consistent if the product is
    /// later deleted.
    pub product_id: String,
    /// Quantity sold. Always positive.
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Line total (unit price × quantity), frozen with the price.
    pub line_total_cents: i64,
    /// Zero-based position of the line within the original request.
    pub position: i64,
}

impl TransactionItem {
    /// Returns the unit price snapshot as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Materialized Read Shapes
// =============================================================================

/// A transaction with its line items and denormalized product names, the
/// shape returned to callers on create and on every read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub id: String,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    /// Line items in request order.
    pub items: Vec<TransactionItemDetail>,
}

/// A line item plus the product name resolved at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionItemDetail {
    pub id: String,
    pub product_id: String,
    /// Name of the referenced product, resolved from a batched catalog fetch
    /// at read time. `None` when the product has since been deleted.
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl TransactionDetail {
    /// Assembles the materialized shape from a transaction, its items, and an
    /// already-fetched product set. Never triggers a lookup of its own.
    pub fn from_parts(
        transaction: &Transaction,
        items: &[TransactionItem],
        products: &HashMap<String, Product>,
    ) -> Self {
        TransactionDetail {
            id: transaction.id.clone(),
            total_cents: transaction.total_cents,
            created_at: transaction.created_at,
            items: items
                .iter()
                .map(|item| TransactionItemDetail {
                    id: item.id.clone(),
                    product_id: item.product_id.clone(),
                    product_name: products.get(&item.product_id).map(|p| p.name.clone()),
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price_cents,
                    line_total_cents: item.line_total_cents,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(id: &str, name: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            price_cents,
            stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_item(id: &str, transaction_id: &str, product_id: &str, position: i64) -> TransactionItem {
        TransactionItem {
            id: id.to_string(),
            transaction_id: transaction_id.to_string(),
            product_id: product_id.to_string(),
            quantity: 2,
            unit_price_cents: 500,
            line_total_cents: 1000,
            position,
        }
    }

    #[test]
    fn test_new_product_validation() {
        let valid = NewProduct {
            name: "Cola 330ml".to_string(),
            description: None,
            price_cents: 199,
            stock: 24,
        };
        assert!(valid.validate().is_ok());

        let negative_price = NewProduct {
            price_cents: -1,
            ..valid.clone()
        };
        assert!(negative_price.validate().is_err());

        let negative_stock = NewProduct {
            stock: -5,
            ..valid.clone()
        };
        assert!(negative_stock.validate().is_err());

        let empty_name = NewProduct {
            name: "  ".to_string(),
            ..valid
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_patch_validates_only_supplied_fields() {
        // An entirely empty patch is valid input (a no-op merge).
        assert!(ProductPatch::default().validate().is_ok());
        assert!(ProductPatch::default().is_empty());

        let patch = ProductPatch {
            price_cents: Some(-10),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = ProductPatch {
            name: Some("Renamed".to_string()),
            stock: Some(0),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_sale_line_quantity_must_be_positive() {
        let line = SaleLine {
            product_id: "p-1".to_string(),
            quantity: 0,
        };
        assert!(line.validate().is_err());

        let line = SaleLine {
            product_id: "p-1".to_string(),
            quantity: 3,
        };
        assert!(line.validate().is_ok());
    }

    #[test]
    fn test_detail_resolves_names_from_fetched_set() {
        let product = test_product("p-1", "Cola 330ml", 500, 10);
        let products = HashMap::from([(product.id.clone(), product)]);

        let transaction = Transaction {
            id: "t-1".to_string(),
            total_cents: 2000,
            created_at: Utc::now(),
        };
        let items = vec![
            test_item("i-1", "t-1", "p-1", 0),
            // References a product missing from the fetched set (deleted).
            test_item("i-2", "t-1", "p-gone", 1),
        ];

        let detail = TransactionDetail::from_parts(&transaction, &items, &products);
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].product_name.as_deref(), Some("Cola 330ml"));
        assert_eq!(detail.items[1].product_name, None);
        assert_eq!(detail.total_cents, 2000);
    }

    #[test]
    fn test_wire_shapes_deserialize_snake_case() {
        let line: SaleLine =
            serde_json::from_str(r#"{"product_id": "p-1", "quantity": 3}"#).unwrap();
        assert_eq!(line.product_id, "p-1");
        assert_eq!(line.quantity, 3);

        let new_product: NewProduct =
            serde_json::from_str(r#"{"name": "Cola", "price_cents": 199}"#).unwrap();
        assert_eq!(new_product.stock, 0);
        assert_eq!(new_product.description, None);

        // Patch fields are optional across the board.
        let patch: ProductPatch = serde_json::from_str(r#"{"price_cents": 250}"#).unwrap();
        assert_eq!(patch.price_cents, Some(250));
        assert!(patch.name.is_none());
    }

    #[test]
    fn test_patch_keeps_null_distinct_from_absent() {
        let absent: ProductPatch = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(absent.description, None);
        assert!(absent.is_empty());

        // An explicit null is a supplied field: clear the description.
        let cleared: ProductPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));
        assert!(!cleared.is_empty());

        let set: ProductPatch = serde_json::from_str(r#"{"description": "330ml"}"#).unwrap();
        assert_eq!(set.description, Some(Some("330ml".to_string())));
    }
}
