//! Seeded synthetic listings for benchmarks.
//!
//! Rows are scattered around the three landmarks with prices driven by
//! area, square footage and a furnished premium. About one row in twenty is
//! a duplicate and one in twenty-five has an unparseable price, so the
//! cleaning benchmarks exercise the rejection paths too.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rental_insights::cleaning::clean_listings;
use rental_insights::config::CleaningConfig;
use rental_insights::dataset::{CleanListing, RawListing};
use rental_insights::PipelineError;

const CENTRES: [(f64, f64, f64); 3] = [
    (49.2775, -122.9146, 1100.0),
    (49.2606, -123.2460, 1500.0),
    (49.2859, -123.1207, 1750.0),
];

const TITLES: [&str; 4] = [
    "Furnished room near SFU, students welcome",
    "Bright 1 bedroom, parking included",
    "Basement suite, pet friendly",
    "Studio, utilities included",
];

/// `n` raw rows, deterministic for a given `seed`.
pub fn raw_listings(n: usize, seed: u64) -> Vec<RawListing> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows: Vec<RawListing> = Vec::with_capacity(n);
    for i in 0..n {
        if i > 0 && rng.gen_ratio(1, 20) {
            let j = rng.gen_range(0..rows.len());
            rows.push(rows[j].clone());
            continue;
        }
        let (lat, lon, base) = CENTRES[rng.gen_range(0..CENTRES.len())];
        let sqft: f64 = rng.gen_range(250.0..950.0);
        let title = TITLES[rng.gen_range(0..TITLES.len())];
        let price = base + 0.55 * sqft + rng.gen_range(-100.0..100.0);
        let price = if rng.gen_ratio(1, 25) {
            "call for price".to_string()
        } else {
            format!("${:.0}", price.min(2450.0))
        };
        rows.push(RawListing {
            id: Some(format!("{}", 7_500_000_000u64 + i as u64)),
            url: Some(format!(
                "https://vancouver.craigslist.org/apa/d/{}.html",
                7_500_000_000u64 + i as u64
            )),
            title: Some(title.to_string()),
            price: Some(price),
            square_footage: rng.gen_bool(0.75).then(|| format!("{:.0}ft2", sqft)),
            latitude: Some(format!("{:.5}", lat + rng.gen_range(-0.03..0.03))),
            longitude: Some(format!("{:.5}", lon + rng.gen_range(-0.04..0.04))),
            description: Some("Close to transit and shops.".to_string()),
            ..Default::default()
        });
    }
    rows
}

/// Clean listings obtained by running the default cleaning stage over
/// [`raw_listings`].
pub fn clean_listings_for(n: usize, seed: u64) -> Result<Vec<CleanListing>, PipelineError> {
    let raw = raw_listings(n, seed);
    Ok(clean_listings(&raw, &CleaningConfig::default())?.listings)
}
