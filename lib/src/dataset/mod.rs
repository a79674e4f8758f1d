//! Listing records and their tabular representations.
//!
//! # Core Concepts
//!
//! - [`RawListing`]: one scraped row, every field kept as optional text so
//!   that malformed values survive until the cleaning stage can judge them.
//! - [`CleanListing`]: a validated, enriched row. Produced by
//!   [`crate::cleaning::clean_listings`], persisted as the clean CSV and
//!   consumed by the modeling stage.
//! - [`ListingDataset`]: the numeric feature matrix and price target built
//!   from clean listings, backed by `ndarray`.
//!
//! CSV readers and writers own their file handles for the duration of one
//! call, so handles are released on every exit path.

use crate::geo::{Area, Coordinates};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod clean;
pub mod features;
pub mod raw;

pub use self::clean::{
    read_clean_listings, read_clean_listings_from_path, write_clean_listings,
    write_clean_listings_to_path, CLEAN_REQUIRED_COLUMNS,
};
pub use self::features::{ListingDataset, FEATURE_NAMES, N_FEATURES};
pub use self::raw::{read_raw_listings, read_raw_listings_from_path, RawSchema};

/// One scraped listing, exactly as the scraper wrote it.
///
/// Empty cells are `None`; everything else is free text that the
/// cleaning stage parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub id: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub price: Option<String>,
    pub square_footage: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub description: Option<String>,
    /// Attribute tags ("cats are OK", "w/d in unit", ...).
    pub attributes: Option<String>,
    pub furnished: Option<String>,
    pub pets_allowed: Option<String>,
    pub parking_available: Option<String>,
    pub utilities_included: Option<String>,
    pub post_date: Option<String>,
}

impl RawListing {
    /// Title, description and attributes joined for keyword matching.
    pub fn searchable_text(&self) -> String {
        [&self.title, &self.description, &self.attributes]
            .iter()
            .filter_map(|field| field.as_deref())
            .collect::<Vec<_>>()
            .join(" \n ")
    }
}

/// A validated, enriched listing.
///
/// Invariants upheld by the cleaning stage:
/// - `price` is strictly positive;
/// - `square_footage` is either positive or `None` (unknown, never zero);
/// - the coordinates lie inside the configured bounding box;
/// - `nearest_area` is the landmark at minimum distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanListing {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub price: f64,
    pub square_footage: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "distance_to_SFU")]
    pub distance_to_sfu: f64,
    #[serde(rename = "distance_to_UBC")]
    pub distance_to_ubc: f64,
    #[serde(rename = "distance_to_Downtown")]
    pub distance_to_downtown: f64,
    #[serde(default)]
    pub distance_to_transit: f64,
    pub nearest_area: Area,
    pub near_transit: bool,
    pub student_flag: bool,
    pub furnished: bool,
    pub pets_allowed: bool,
    pub parking_available: bool,
    #[serde(default)]
    pub utilities_included: bool,
    #[serde(default)]
    pub post_date: Option<NaiveDate>,
}

impl CleanListing {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Distance to the listing's nearest landmark.
    pub fn distance_to_nearest(&self) -> f64 {
        match self.nearest_area {
            Area::Sfu => self.distance_to_sfu,
            Area::Ubc => self.distance_to_ubc,
            Area::Downtown => self.distance_to_downtown,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_searchable_text_skips_missing_fields() {
        let raw = RawListing {
            title: Some("Room near SFU".to_string()),
            attributes: Some("furnished".to_string()),
            ..Default::default()
        };
        let text = raw.searchable_text();
        assert!(text.contains("Room near SFU"));
        assert!(text.contains("furnished"));
    }

    #[test]
    fn test_distance_to_nearest_follows_area() {
        let mut listing = fixtures::clean_listing("a", 1200.0);
        assert_eq!(listing.distance_to_nearest(), 0.4);
        listing.nearest_area = Area::Downtown;
        assert_eq!(listing.distance_to_nearest(), 15.0);
    }
}
