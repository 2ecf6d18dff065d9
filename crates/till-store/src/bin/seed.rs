//! # Seed Data Generator
//!
//! Populates the database with demo products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 products (default)
//! cargo run -p till-store --bin seed
//!
//! # Generate custom amount
//! cargo run -p till-store --bin seed -- --count 30
//!
//! # Specify database path
//! cargo run -p till-store --bin seed -- --db ./till.db
//! ```
//!
//! ## Generated Products
//! Creates a cafe-style demo catalog: drinks and counter food in a few size
//! variants, with spread-out prices and stock levels.

use std::env;

use till_core::NewProduct;
use till_store::{Store, StoreConfig};

/// Base products with prices in cents
const BASE_ITEMS: &[(&str, i64)] = &[
    ("Espresso", 250),
    ("Americano", 300),
    ("Latte", 420),
    ("Cappuccino", 400),
    ("Flat White", 430),
    ("Mocha", 460),
    ("Hot Chocolate", 380),
    ("Chai Tea", 350),
    ("Green Tea", 280),
    ("Orange Juice", 320),
    ("Sparkling Water", 220),
    ("Still Water", 180),
    ("Croissant", 290),
    ("Pain au Chocolat", 330),
    ("Blueberry Muffin", 310),
    ("Banana Bread", 340),
    ("Bagel", 270),
    ("Granola Bowl", 520),
    ("Ham Sandwich", 580),
    ("Veggie Wrap", 550),
];

/// Size variants with price addons in cents
const SIZES: &[(&str, i64)] = &[("Small", 0), ("Regular", 50), ("Large", 100)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = env::var("TILL_DB_PATH").unwrap_or_else(|_| "./till.db".to_string());

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Till Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: $TILL_DB_PATH or ./till.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Till Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database (runs migrations)
    let store = Store::connect(StoreConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = store.catalog().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let catalog = store.catalog();
    let mut generated: usize = 0;
    let start = std::time::Instant::now();

    for (size_name, price_addon) in SIZES {
        for (item_idx, (item_name, base_price)) in BASE_ITEMS.iter().enumerate() {
            if generated >= count {
                break;
            }

            let new = NewProduct {
                name: format!("{} ({})", item_name, size_name),
                description: None,
                price_cents: base_price + price_addon,
                stock: ((item_idx * 7 + generated) % 40 + 5) as i64,
            };

            if let Err(e) = catalog.create(&new).await {
                eprintln!("Failed to insert {}: {}", new.name, e);
                continue;
            }

            generated += 1;
        }

        if generated >= count {
            break;
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    store.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
