//! Deterministic catalog fixtures for tests and benchmarks.
//!
//! # Usage
//!
//! ```
//! use choicetree::testing::synthetic_catalog;
//!
//! let table = synthetic_catalog(50, 7);
//! assert_eq!(table.n_rows(), 50);
//! assert_eq!(table, synthetic_catalog(50, 7));
//! ```

use rand::prelude::*;

use crate::data::RawTable;

// =============================================================================
// Fixed Catalogs
// =============================================================================

/// Four products with an id, a price and a rating.
pub fn tiny_catalog() -> RawTable {
    RawTable::from_strs(
        &["id", "price", "rating"],
        &[
            &["p1", "15", "4.2"],
            &["p2", "18", "4.0"],
            &["p3", "45", "4.8"],
            &["p4", "50", "4.9"],
        ],
    )
}

// =============================================================================
// Synthetic Catalogs
// =============================================================================

const COLORS: &[&str] = &["black", "white", "red", "blue", "green"];
const BRANDS: &[&str] = &["Acme", "Globex", "Initech", "Umbrella"];

/// Generate a product catalog with two overlapping market segments.
///
/// Columns: `sku`, `price`, `rating`, `shipping_days`, `weight_kg`, `color`, `brand`.
/// Premium products cost more, rate higher and ship faster. About 5% of `weight_kg`
/// cells are left empty.
pub fn synthetic_catalog(rows: usize, seed: u64) -> RawTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let headers = ["sku", "price", "rating", "shipping_days", "weight_kg", "color", "brand"];

    let data = (0..rows)
        .map(|i| {
            let premium = rng.gen_bool(0.4);
            let price: f64 = if premium {
                rng.gen_range(120.0..400.0)
            } else {
                rng.gen_range(10.0..90.0)
            };
            let rating: f64 = if premium {
                rng.gen_range(4.0..5.0)
            } else {
                rng.gen_range(2.5..4.5)
            };
            let shipping: u32 = if premium {
                rng.gen_range(1..4)
            } else {
                rng.gen_range(3..10)
            };
            let weight = if rng.gen_bool(0.05) {
                String::new()
            } else {
                format!("{:.1}", rng.gen_range(0.2..8.0))
            };
            let color = COLORS[rng.gen_range(0..COLORS.len())];
            let brand = if premium {
                BRANDS[rng.gen_range(0..2)]
            } else {
                BRANDS[rng.gen_range(2..BRANDS.len())]
            };
            vec![
                format!("SKU-{:05}", i),
                format!("{:.2}", price),
                format!("{:.1}", rating),
                shipping.to_string(),
                weight,
                color.to_string(),
                brand.to_string(),
            ]
        })
        .collect();

    RawTable::new(headers.iter().map(|h| h.to_string()).collect(), data)
}
