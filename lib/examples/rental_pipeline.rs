//! End-to-end rental pipeline on synthetic listings.
//!
//! This example demonstrates:
//! - Cleaning scraped rows with duplicates, malformed prices and
//!   out-of-region coordinates
//! - Keyword flags and landmark enrichment
//! - Random Forest training with median imputation of square footage
//! - Model serialization and inference on a new listing
//!
//! Run with: cargo run --example rental_pipeline

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rental_insights::{
    cleaning::clean_listings,
    config::PipelineConfig,
    dataset::RawListing,
    model::ForestConfig,
    modeling::{analyze, TrainedModel},
    Area,
};
use std::error::Error;

// Rough centres of the three areas the listings are scattered around
const CENTRES: [(f64, f64, f64); 3] = [
    (49.2775, -122.9146, 1100.0), // SFU
    (49.2606, -123.2460, 1500.0), // UBC
    (49.2859, -123.1207, 1800.0), // Downtown
];

fn synthetic_listings(n: usize, seed: u64) -> Vec<RawListing> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let (lat, lon, base) = CENTRES[i % 3];
            let sqft: f64 = rng.gen_range(250.0..900.0);
            let furnished = rng.gen_bool(0.4);
            let price = base + sqft * 0.6 + if furnished { 120.0 } else { 0.0 };
            let price = price + rng.gen_range(-80.0..80.0);
            RawListing {
                id: Some(format!("{}", 7_000_000_000u64 + i as u64)),
                title: Some(if furnished {
                    "Furnished room, students welcome".to_string()
                } else {
                    "Bright basement suite".to_string()
                }),
                price: Some(format!("${:.0}", price)),
                square_footage: rng.gen_bool(0.8).then(|| format!("{:.0} ft2", sqft)),
                latitude: Some(format!("{:.5}", lat + rng.gen_range(-0.02..0.02))),
                longitude: Some(format!("{:.5}", lon + rng.gen_range(-0.03..0.03))),
                description: Some("Close to transit. No pets.".to_string()),
                ..Default::default()
            }
        })
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== Rental Pipeline ===\n");

    // 1. Raw rows, plus a few that cleaning must reject
    let mut raw = synthetic_listings(300, 7);
    raw.push(raw[0].clone()); // duplicate
    raw.push(RawListing {
        id: Some("bad-price".into()),
        title: Some("Call for price".into()),
        price: Some("contact us".into()),
        latitude: Some("49.28".into()),
        longitude: Some("-123.12".into()),
        ..Default::default()
    });
    raw.push(RawListing {
        id: Some("seattle".into()),
        title: Some("Wrong city".into()),
        price: Some("$1,400".into()),
        latitude: Some("47.6062".into()),
        longitude: Some("-122.3321".into()),
        ..Default::default()
    });

    // 2. Cleaning
    let mut config = PipelineConfig::default();
    let cleaned = clean_listings(&raw, &config.cleaning)?;
    println!("{}\n", cleaned.report);

    let students = cleaned.listings.iter().filter(|l| l.student_flag).count();
    println!("Student-oriented listings: {}", students);
    for area in Area::ALL {
        let n = cleaned
            .listings
            .iter()
            .filter(|l| l.nearest_area == area)
            .count();
        println!("  nearest {}: {}", area, n);
    }

    // 3. Modeling (fewer trees to keep the example quick)
    config.modeling = config
        .modeling
        .with_forest(ForestConfig::default().with_n_trees(100));
    let analysis = analyze(&cleaned.listings, &config.modeling)?;

    println!("\nTest metrics:");
    println!("  MAE:  {:.2}", analysis.metrics.mae);
    println!("  RMSE: {:.2}", analysis.metrics.rmse);
    println!("  R²:   {:.4}", analysis.metrics.r_squared);

    println!("\nTop features:");
    for entry in analysis.importances.entries.iter().take(5) {
        println!("  {:<24} {:.4}", entry.feature_name, entry.importance_score);
    }

    println!("\nLargest errors:");
    for row in analysis.predictions.rows.iter().take(5) {
        println!(
            "  {}  actual {:>7.0}  predicted {:>7.1}  error {:>6.1}",
            row.listing_identifier, row.actual_price, row.predicted_price, row.abs_error
        );
    }

    // 4. Save, reload and predict a new listing
    let path = std::env::temp_dir().join("rental_forest.bin");
    analysis.model.save_to_file(&path)?;
    let loaded = TrainedModel::load_from_file(&path)?;
    println!("\nModel saved to {}", path.display());

    let mut new_listing = cleaned.listings[0].clone();
    new_listing.square_footage = None;
    let price = loaded.predict_listing(&new_listing)?;
    println!(
        "Predicted rent for {} (square footage unknown, imputed {:.0}): ${:.0}",
        new_listing.id,
        loaded.square_footage_fill(),
        price
    );

    std::fs::remove_file(&path)?;
    Ok(())
}
