//! # Sale Pricing
//!
//! The pure half of the transaction engine: given the requested lines and the
//! already-fetched products they reference, decide whether the sale is valid
//! and what it costs. No I/O happens here; the storage layer fetches products
//! first and applies the returned deductions afterwards.
//!
//! ## Engine Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    createTransaction Flow                               │
//! │                                                                         │
//! │  Request: [{product_id, quantity}, ...]                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  distinct_product_ids() ──► till-store fetches all of them at once    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price_sale()  ← THIS MODULE                                           │
//! │   ├── empty request?          → ValidationError                        │
//! │   ├── quantity <= 0?          → ValidationError                        │
//! │   ├── ids not in fetched set? → ProductsNotFound (every missing id)    │
//! │   ├── line exceeds remaining  → InsufficientStock (no partial result)  │
//! │   │   stock? (running, per-product, across duplicate lines)           │
//! │   └── all pass → PricedSale { lines, total, deductions }               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  till-store applies deductions + inserts rows in ONE storage txn       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Duplicate-Line Rule
//! The stock check runs against the pre-transaction snapshot with an
//! in-memory running deduction: if the same product appears on two lines
//! whose quantities individually fit but jointly exceed stock, the second
//! line fails. Nothing about the check depends on storage state changing
//! mid-request.

use std::collections::{HashMap, HashSet};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Product, SaleLine};

// =============================================================================
// Priced Output Shapes
// =============================================================================

/// One validated and priced line, in request order.
///
/// `unit_price_cents` is the product's price at this moment; it becomes the
/// frozen snapshot stored on the transaction item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// The net stock deduction for one product, aggregated across every line
/// that references it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDeduction {
    pub product_id: String,
    pub quantity: i64,
}

/// A fully validated, priced sale, ready to be committed atomically.
#[derive(Debug, Clone)]
pub struct PricedSale {
    /// Sum of all line totals, exactly.
    pub total_cents: i64,
    /// Priced lines, one per requested line, in request order.
    pub lines: Vec<PricedLine>,
    /// Per-product deductions, in first-reference order.
    pub deductions: Vec<StockDeduction>,
}

impl PricedSale {
    /// Returns the sale total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Engine Functions
// =============================================================================

/// Collects the distinct product ids referenced by a request, in
/// first-reference order.
///
/// The storage layer feeds this to one batched catalog lookup; the engine
/// never fetches per line.
pub fn distinct_product_ids(lines: &[SaleLine]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(lines.len());
    let mut ids = Vec::new();

    for line in lines {
        if seen.insert(line.product_id.as_str()) {
            ids.push(line.product_id.clone());
        }
    }

    ids
}

/// Validates and prices a proposed sale against a fetched product set.
///
/// ## Errors
/// - [`CoreError::Validation`] if the request is empty or a quantity is not
///   positive.
/// - [`CoreError::ProductsNotFound`] naming every requested id absent from
///   `products` (not just the first).
/// - [`CoreError::InsufficientStock`] if any line, in input order, asks for
///   more than the stock remaining after earlier lines of the same request.
///
/// On any error nothing is returned at all: the caller must not apply any
/// part of a failed sale.
pub fn price_sale(
    lines: &[SaleLine],
    products: &HashMap<String, Product>,
) -> CoreResult<PricedSale> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        }
        .into());
    }

    for line in lines {
        line.validate()?;
    }

    // Every missing id is collected before failing, so the caller learns the
    // full extent of the problem in one round trip.
    let missing: Vec<String> = distinct_product_ids(lines)
        .into_iter()
        .filter(|id| !products.contains_key(id))
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::ProductsNotFound { ids: missing });
    }

    // Stock check against the pre-transaction snapshot, with the running
    // deduction tracked per product across duplicate lines.
    let mut remaining: HashMap<&str, i64> = HashMap::new();
    let mut priced_lines = Vec::with_capacity(lines.len());
    let mut deductions: Vec<StockDeduction> = Vec::new();
    let mut deduction_index: HashMap<&str, usize> = HashMap::new();
    let mut total = Money::zero();

    for line in lines {
        // Every id was found above; a miss here is unreachable.
        let product = products
            .get(&line.product_id)
            .ok_or_else(|| CoreError::ProductsNotFound {
                ids: vec![line.product_id.clone()],
            })?;
        let available = remaining
            .entry(product.id.as_str())
            .or_insert(product.stock);

        if line.quantity > *available {
            return Err(CoreError::InsufficientStock {
                product_id: product.id.clone(),
                name: product.name.clone(),
                available: *available,
                requested: line.quantity,
            });
        }
        *available -= line.quantity;

        // Checked arithmetic: an extreme price times an extreme quantity
        // must fail the sale, not wrap the total.
        let line_total = product
            .price()
            .checked_mul_quantity(line.quantity)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "line_total".to_string(),
            })?;
        total = total
            .checked_add(line_total)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "total".to_string(),
            })?;

        priced_lines.push(PricedLine {
            product_id: product.id.clone(),
            quantity: line.quantity,
            unit_price_cents: product.price_cents,
            line_total_cents: line_total.cents(),
        });

        match deduction_index.get(product.id.as_str()) {
            Some(&idx) => deductions[idx].quantity += line.quantity,
            None => {
                deduction_index.insert(product.id.as_str(), deductions.len());
                deductions.push(StockDeduction {
                    product_id: product.id.clone(),
                    quantity: line.quantity,
                });
            }
        }
    }

    Ok(PricedSale {
        total_cents: total.cents(),
        lines: priced_lines,
        deductions,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

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

    fn catalog(products: Vec<Product>) -> HashMap<String, Product> {
        products.into_iter().map(|p| (p.id.clone(), p)).collect()
    }

    fn line(product_id: &str, quantity: i64) -> SaleLine {
        SaleLine {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_distinct_ids_first_reference_order() {
        let lines = [line("b", 1), line("a", 2), line("b", 3), line("c", 1)];
        assert_eq!(distinct_product_ids(&lines), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_empty_request_is_rejected() {
        let err = price_sale(&[], &HashMap::new()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_non_positive_quantity_is_rejected() {
        let products = catalog(vec![test_product("a", "Cola", 1000, 5)]);

        let err = price_sale(&[line("a", 0)], &products).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = price_sale(&[line("a", -2)], &products).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_missing_products_all_named() {
        let products = catalog(vec![test_product("a", "Cola", 1000, 5)]);
        let lines = [line("a", 1), line("ghost-1", 1), line("ghost-2", 2)];

        let err = price_sale(&lines, &products).unwrap_err();
        match err {
            CoreError::ProductsNotFound { ids } => {
                assert_eq!(ids, vec!["ghost-1".to_string(), "ghost-2".to_string()]);
            }
            other => panic!("expected ProductsNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_single_line_sale() {
        // Product A: price $10.00, stock 5. Selling 3 totals $30.00.
        let products = catalog(vec![test_product("a", "Cola", 1000, 5)]);

        let priced = price_sale(&[line("a", 3)], &products).unwrap();
        assert_eq!(priced.total_cents, 3000);
        assert_eq!(priced.lines.len(), 1);
        assert_eq!(priced.lines[0].unit_price_cents, 1000);
        assert_eq!(priced.lines[0].line_total_cents, 3000);
        assert_eq!(
            priced.deductions,
            vec![StockDeduction {
                product_id: "a".to_string(),
                quantity: 3,
            }]
        );
    }

    #[test]
    fn test_total_is_exact_sum_of_line_totals() {
        let products = catalog(vec![
            test_product("a", "Cola", 1099, 10),
            test_product("b", "Chips", 249, 10),
            test_product("c", "Freebie", 0, 10),
        ]);
        let lines = [line("a", 2), line("b", 3), line("c", 1)];

        let priced = price_sale(&lines, &products).unwrap();
        let summed: i64 = priced.lines.iter().map(|l| l.line_total_cents).sum();
        assert_eq!(priced.total_cents, summed);
        assert_eq!(priced.total_cents, 2 * 1099 + 3 * 249);
        assert_eq!(priced.total(), Money::from_cents(2945));
    }

    #[test]
    fn test_single_line_exceeding_stock_fails() {
        let products = catalog(vec![test_product("a", "Cola", 1000, 5)]);

        let err = price_sale(&[line("a", 6)], &products).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                product_id,
                name,
                available,
                requested,
            } => {
                assert_eq!(product_id, "a");
                assert_eq!(name, "Cola");
                assert_eq!(available, 5);
                assert_eq!(requested, 6);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_lines_jointly_exceeding_stock_fail() {
        // 3 + 3 > 5: each line fits alone, together they oversell.
        let products = catalog(vec![test_product("a", "Cola", 1000, 5)]);
        let lines = [line("a", 3), line("a", 3)];

        let err = price_sale(&lines, &products).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                // The second line sees the running deduction from the first.
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_lines_jointly_fitting_succeed() {
        let products = catalog(vec![test_product("a", "Cola", 1000, 5)]);
        let lines = [line("a", 2), line("a", 3)];

        let priced = price_sale(&lines, &products).unwrap();
        // Two distinct lines are preserved, not merged.
        assert_eq!(priced.lines.len(), 2);
        assert_eq!(priced.total_cents, 5000);
        // But the deduction is aggregated per product.
        assert_eq!(
            priced.deductions,
            vec![StockDeduction {
                product_id: "a".to_string(),
                quantity: 5,
            }]
        );
    }

    #[test]
    fn test_overflowing_line_total_is_rejected() {
        let products = catalog(vec![test_product("a", "Bullion", i64::MAX, 10)]);

        let err = price_sale(&[line("a", 2)], &products).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_lines_keep_request_order() {
        let products = catalog(vec![
            test_product("a", "Cola", 100, 10),
            test_product("b", "Chips", 200, 10),
        ]);
        let lines = [line("b", 1), line("a", 1), line("b", 2)];

        let priced = price_sale(&lines, &products).unwrap();
        let order: Vec<&str> = priced
            .lines
            .iter()
            .map(|l| l.product_id.as_str())
            .collect();
        assert_eq!(order, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_failure_returns_nothing_to_apply() {
        // A later bad line invalidates the whole request; earlier valid lines
        // must not leak out as partial results.
        let products = catalog(vec![
            test_product("a", "Cola", 100, 10),
            test_product("b", "Chips", 200, 1),
        ]);
        let lines = [line("a", 1), line("b", 5)];

        assert!(price_sale(&lines, &products).is_err());
    }
}
