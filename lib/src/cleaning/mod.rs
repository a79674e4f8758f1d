//! Cleaning and enrichment stage.
//!
//! Turns scraped [`RawListing`]s into validated [`CleanListing`]s:
//!
//! 1. drop duplicates (first seen wins, keyed by id, url, or a composite of
//!    title, price and coordinates);
//! 2. validate title, price, square footage, coordinates and post date,
//!    dropping the row with a [`RowRejection`] on the first failure;
//! 3. compute landmark and transit distances and the nearest area;
//! 4. derive the keyword flags.
//!
//! Row-level problems never abort the stage; they are counted in the
//! [`CleaningReport`]. The stage fails only on an invalid configuration or
//! when no row survives.
//!
//! # Example
//! ```ignore
//! use rental_insights::cleaning::clean_listings;
//! use rental_insights::config::CleaningConfig;
//!
//! let output = clean_listings(&raw, &CleaningConfig::default())?;
//! println!("{}", output.report);
//! ```

pub mod dedup;
pub mod flags;
pub mod parse;

pub use dedup::{DedupKey, Deduplicator};
pub use flags::{FlagDetector, FlagRule, KeywordMatcher, ListingFlags};

use crate::config::CleaningConfig;
use crate::dataset::{CleanListing, RawListing};
use crate::error::{PipelineError, RowRejection};
use crate::geo::{nearest_station_km, round_to, Coordinates};
use chrono::{Duration, NaiveDate};
use parse::NumberParser;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Row accounting for one cleaning run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub raw_rows: usize,
    pub duplicates: usize,
    pub dropped: BTreeMap<RowRejection, usize>,
    pub kept: usize,
}

impl CleaningReport {
    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }

    pub fn dropped_for(&self, reason: RowRejection) -> usize {
        self.dropped.get(&reason).copied().unwrap_or(0)
    }

    fn record(&mut self, reason: RowRejection) {
        *self.dropped.entry(reason).or_insert(0) += 1;
    }

    /// Emit the report through `tracing`.
    pub fn log(&self) {
        info!(
            raw_rows = self.raw_rows,
            duplicates = self.duplicates,
            dropped = self.dropped_total(),
            kept = self.kept,
            "cleaning finished"
        );
        for (reason, count) in &self.dropped {
            info!(reason = reason.as_str(), count, "rows dropped");
        }
    }
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "raw rows: {}, duplicates: {}, dropped: {}, kept: {}",
            self.raw_rows,
            self.duplicates,
            self.dropped_total(),
            self.kept
        )?;
        for (reason, count) in &self.dropped {
            write!(f, "\n  {}: {}", reason, count)?;
        }
        Ok(())
    }
}

/// Clean listings plus the accounting that produced them.
#[derive(Debug, Clone)]
pub struct CleaningOutput {
    pub listings: Vec<CleanListing>,
    pub report: CleaningReport,
}

/// Validates and enriches single rows with a compiled configuration.
#[derive(Debug, Clone)]
pub struct Cleaner<'a> {
    config: &'a CleaningConfig,
    numbers: NumberParser,
    flags: FlagDetector,
    cutoff: Option<NaiveDate>,
}

impl<'a> Cleaner<'a> {
    /// Validate `config` and compile its patterns.
    pub fn new(config: &'a CleaningConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        let cutoff = match (config.max_age_days, config.as_of) {
            (Some(days), Some(as_of)) => Some(as_of - Duration::days(i64::from(days))),
            (Some(_), None) => {
                warn!("max_age_days is set without as_of; recency filter disabled");
                None
            }
            _ => None,
        };
        if config.transit_stations.is_empty() {
            warn!("no transit stations configured; near_transit uses the nearest landmark");
        }

        Ok(Self {
            config,
            numbers: NumberParser::new()?,
            flags: FlagDetector::from_config(config)?,
            cutoff,
        })
    }

    fn price(&self, raw: &RawListing) -> Result<f64, RowRejection> {
        let cell = raw.price.as_deref().filter(|t| !t.trim().is_empty());
        let price = match cell {
            Some(text) => self.numbers.price(Some(text))?,
            None if self.config.price_from_text => [&raw.title, &raw.description]
                .into_iter()
                .filter_map(|f| f.as_deref())
                .find_map(|t| self.numbers.dollar_amount(t))
                .filter(|v| *v > 0.0)
                .ok_or(RowRejection::EmptyPrice)?,
            None => return Err(RowRejection::EmptyPrice),
        };
        match self.config.price_range {
            Some(range) if !range.contains(price) => Err(RowRejection::PriceOutOfRange),
            _ => Ok(price),
        }
    }

    fn coordinates(&self, raw: &RawListing) -> Result<Coordinates, RowRejection> {
        let lat = parse::coordinate(raw.latitude.as_deref());
        let lon = parse::coordinate(raw.longitude.as_deref());
        let point = match (lat, lon) {
            (Ok(lat), Ok(lon)) => Coordinates::new(lat, lon),
            (Err(RowRejection::MissingCoordinates), _)
            | (_, Err(RowRejection::MissingCoordinates)) => {
                return Err(RowRejection::MissingCoordinates)
            }
            (Err(e), _) | (_, Err(e)) => return Err(e),
        };
        if self.config.bounding_box.contains(point) {
            Ok(point)
        } else {
            Err(RowRejection::CoordinatesOutOfBounds)
        }
    }

    fn post_date(&self, raw: &RawListing) -> Result<Option<NaiveDate>, RowRejection> {
        let date = parse::post_date(raw.post_date.as_deref());
        match (self.cutoff, date) {
            (Some(cutoff), Some(d)) if d < cutoff => Err(RowRejection::StalePosting),
            (Some(_), None) => Err(RowRejection::StalePosting),
            _ => Ok(date),
        }
    }

    /// Validate and enrich one row; `key` becomes the listing id.
    pub fn clean_row(
        &self,
        raw: &RawListing,
        key: &DedupKey,
    ) -> Result<CleanListing, RowRejection> {
        let title = raw
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if self.config.require_title && title.is_none() {
            return Err(RowRejection::MissingTitle);
        }

        let price = self.price(raw)?;
        let square_footage = self.numbers.square_footage(raw.square_footage.as_deref())?;
        let point = self.coordinates(raw)?;
        let post_date = self.post_date(raw)?;

        let decimals = self.config.distance_decimals;
        let distances = self.config.landmarks.distances(point, decimals);
        let distance_to_transit = nearest_station_km(point, &self.config.transit_stations)
            .map(|d| round_to(d, decimals))
            .unwrap_or_else(|| distances.min());
        let flags = self.flags.detect(raw);

        Ok(CleanListing {
            id: key.to_string(),
            url: raw.url.clone(),
            title: title.map(String::from),
            price,
            square_footage,
            latitude: point.lat,
            longitude: point.lon,
            distance_to_sfu: distances.sfu,
            distance_to_ubc: distances.ubc,
            distance_to_downtown: distances.downtown,
            distance_to_transit,
            nearest_area: distances.nearest(),
            near_transit: distance_to_transit <= self.config.transit_threshold_km,
            student_flag: flags.student_flag,
            furnished: flags.furnished,
            pets_allowed: flags.pets_allowed,
            parking_available: flags.parking_available,
            utilities_included: flags.utilities_included,
            post_date,
        })
    }
}

/// Run the cleaning stage over `raw`, preserving input order.
///
/// # Errors
/// - [`PipelineError::InvalidParameter`] if `config` is invalid
/// - [`PipelineError::InsufficientData`] if no row survives
pub fn clean_listings(
    raw: &[RawListing],
    config: &CleaningConfig,
) -> Result<CleaningOutput, PipelineError> {
    let cleaner = Cleaner::new(config)?;
    let mut dedup = Deduplicator::new();
    let mut report = CleaningReport {
        raw_rows: raw.len(),
        ..Default::default()
    };
    let mut listings = Vec::with_capacity(raw.len());

    for (row, listing) in raw.iter().enumerate() {
        let key = DedupKey::of(listing);
        if !dedup.first_seen(&key) {
            debug!(row, key = %key, "duplicate listing skipped");
            report.duplicates += 1;
            continue;
        }
        match cleaner.clean_row(listing, &key) {
            Ok(clean) => listings.push(clean),
            Err(reason) => {
                debug!(row, key = %key, reason = reason.as_str(), "row dropped");
                report.record(reason);
            }
        }
    }

    report.kept = listings.len();
    report.log();

    if listings.is_empty() {
        return Err(PipelineError::insufficient("cleaned listings", 0, 1));
    }
    Ok(CleaningOutput { listings, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PriceRange;
    use crate::geo::Area;

    fn raw(id: &str, price: &str, lat: &str, lon: &str) -> RawListing {
        RawListing {
            id: Some(id.to_string()),
            url: Some(format!("https://vancouver.craigslist.org/apa/{}.html", id)),
            title: Some(format!("Room {}", id)),
            price: Some(price.to_string()),
            square_footage: Some("600".to_string()),
            latitude: Some(lat.to_string()),
            longitude: Some(lon.to_string()),
            description: Some("Bright and quiet".to_string()),
            ..Default::default()
        }
    }

    fn sfu_row(id: &str, price: &str) -> RawListing {
        raw(id, price, "49.2781", "-122.9199")
    }

    #[test]
    fn test_sfu_listing_is_parsed_and_enriched() {
        let out = clean_listings(&[sfu_row("1", "$1,200")], &CleaningConfig::default()).unwrap();
        let l = &out.listings[0];
        assert_eq!(l.price, 1200.0);
        assert_eq!(l.nearest_area, Area::Sfu);
        assert!(l.distance_to_sfu < 1.0);
        assert!(l.distance_to_ubc > l.distance_to_sfu);
        assert_eq!(l.square_footage, Some(600.0));
        assert_eq!(out.report.kept, 1);
    }

    #[test]
    fn test_empty_price_dropped_and_counted() {
        let rows = [sfu_row("1", "$1,200"), sfu_row("2", ""), sfu_row("3", "$900")];
        let out = clean_listings(&rows, &CleaningConfig::default()).unwrap();
        assert_eq!(out.listings.len(), 2);
        assert_eq!(out.report.dropped_for(RowRejection::EmptyPrice), 1);
        assert_eq!(out.report.raw_rows, 3);
    }

    #[test]
    fn test_every_rejection_reason_is_counted() {
        let mut no_title = sfu_row("t", "$1000");
        no_title.title = None;
        let mut bad_sqft = sfu_row("s", "$1000");
        bad_sqft.square_footage = Some("huge".to_string());
        let mut no_lat = sfu_row("c", "$1000");
        no_lat.latitude = None;

        let rows = vec![
            no_title,
            sfu_row("m", "ask me"),
            sfu_row("z", "$0"),
            sfu_row("r", "$9,000"),
            bad_sqft,
            no_lat,
            raw("x", "$1000", "49.2", "west"),
            raw("o", "$1000", "47.6", "-122.3"), // Seattle
            sfu_row("ok", "$1000"),
        ];
        let out = clean_listings(&rows, &CleaningConfig::default()).unwrap();
        let r = &out.report;
        assert_eq!(r.dropped_for(RowRejection::MissingTitle), 1);
        assert_eq!(r.dropped_for(RowRejection::MalformedPrice), 1);
        assert_eq!(r.dropped_for(RowRejection::NonPositivePrice), 1);
        assert_eq!(r.dropped_for(RowRejection::PriceOutOfRange), 1);
        assert_eq!(r.dropped_for(RowRejection::MalformedSquareFootage), 1);
        assert_eq!(r.dropped_for(RowRejection::MissingCoordinates), 1);
        assert_eq!(r.dropped_for(RowRejection::MalformedCoordinates), 1);
        assert_eq!(r.dropped_for(RowRejection::CoordinatesOutOfBounds), 1);
        assert_eq!(r.kept, 1);
        assert_eq!(r.dropped_total() + r.kept + r.duplicates, r.raw_rows);
    }

    #[test]
    fn test_missing_coordinate_outranks_malformed_one() {
        let mut missing_lat = raw("a", "$1000", "49.2", "west");
        missing_lat.latitude = None;
        let mut missing_lon = raw("b", "$1000", "north", "-122.9");
        missing_lon.longitude = None;

        let out = clean_listings(&[missing_lat, missing_lon], &CleaningConfig::default()).unwrap();
        assert_eq!(out.report.dropped_for(RowRejection::MissingCoordinates), 2);
        assert_eq!(out.report.dropped_for(RowRejection::MalformedCoordinates), 0);
    }

    #[test]
    fn test_price_with_cents_is_kept_exact() {
        let out = clean_listings(&[sfu_row("1", "$1,299.99")], &CleaningConfig::default()).unwrap();
        assert_eq!(out.listings[0].price, 1299.99);
    }

    #[test]
    fn test_duplicates_first_seen_wins() {
        let mut later = sfu_row("1", "$2,000");
        later.title = Some("Updated".to_string());
        let rows = [sfu_row("1", "$1,200"), later, sfu_row("2", "$1,300")];
        let out = clean_listings(&rows, &CleaningConfig::default()).unwrap();
        assert_eq!(out.report.duplicates, 1);
        assert_eq!(out.listings.len(), 2);
        assert_eq!(out.listings[0].price, 1200.0);
        let ids: Vec<_> = out.listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_listing_without_id_uses_url() {
        let mut row = sfu_row("1", "$1,200");
        row.id = None;
        let out = clean_listings(&[row], &CleaningConfig::default()).unwrap();
        assert_eq!(
            out.listings[0].id,
            "https://vancouver.craigslist.org/apa/1.html"
        );
    }

    #[test]
    fn test_unknown_square_footage_kept() {
        let mut row = sfu_row("1", "$1,200");
        row.square_footage = Some("nan".to_string());
        let out = clean_listings(&[row], &CleaningConfig::default()).unwrap();
        assert!(out.listings[0].square_footage.is_none());
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let rows = vec![
            sfu_row("1", "$1,200"),
            sfu_row("1", "$1,200"),
            raw("2", "$1,500", "49.2827", "-123.1207"),
            raw("3", "$1,100", "49.2606", "-123.2460"),
            sfu_row("4", ""),
        ];
        let config = CleaningConfig::default();
        let a = clean_listings(&rows, &config).unwrap();
        let b = clean_listings(&rows, &config).unwrap();
        assert_eq!(a.listings, b.listings);
        assert_eq!(a.report, b.report);
    }

    #[test]
    fn test_price_band_can_be_disabled() {
        let config = CleaningConfig::default().with_price_range(None);
        let out = clean_listings(&[sfu_row("1", "$9,000")], &config).unwrap();
        assert_eq!(out.listings[0].price, 9000.0);

        let config = CleaningConfig::default().with_price_range(Some(PriceRange {
            min: 1000.0,
            max: 1100.0,
        }));
        assert!(clean_listings(&[sfu_row("1", "$900")], &config).is_err());
    }

    #[test]
    fn test_price_from_text_fallback() {
        let mut row = sfu_row("1", "");
        row.title = Some("Basement suite $1,150 all in".to_string());
        let strict = clean_listings(
            &[row.clone(), sfu_row("2", "$1000")],
            &CleaningConfig::default(),
        )
        .unwrap();
        assert_eq!(strict.report.dropped_for(RowRejection::EmptyPrice), 1);

        let lenient = clean_listings(&[row], &CleaningConfig::default().with_price_from_text(true))
            .unwrap();
        assert_eq!(lenient.listings[0].price, 1150.0);
    }

    #[test]
    fn test_title_optional_when_configured() {
        let mut row = sfu_row("1", "$1,200");
        row.title = Some("   ".to_string());
        let out = clean_listings(&[row], &CleaningConfig::default().with_require_title(false))
            .unwrap();
        assert!(out.listings[0].title.is_none());
    }

    #[test]
    fn test_recency_filter() {
        let as_of = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let config = CleaningConfig::default().with_recency(60, as_of);

        let mut fresh = sfu_row("fresh", "$1000");
        fresh.post_date = Some("2025-09-20T09:00:00-0700".to_string());
        let mut edge = sfu_row("edge", "$1000");
        edge.post_date = Some("2025-08-02".to_string());
        let mut stale = sfu_row("stale", "$1000");
        stale.post_date = Some("2025-06-01".to_string());
        let undated = sfu_row("undated", "$1000");

        let out = clean_listings(&[fresh, edge, stale, undated], &config).unwrap();
        let ids: Vec<_> = out.listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["fresh", "edge"]);
        assert_eq!(out.report.dropped_for(RowRejection::StalePosting), 2);
        assert_eq!(out.listings[0].post_date, NaiveDate::from_ymd_opt(2025, 9, 20));
    }

    #[test]
    fn test_near_transit_uses_stations() {
        // next to Metrotown station, far from every landmark
        let row = raw("m", "$1,300", "49.2260", "-123.0030");
        let out = clean_listings(&[row.clone()], &CleaningConfig::default()).unwrap();
        assert!(out.listings[0].near_transit);
        assert!(out.listings[0].distance_to_transit < 0.8);

        let no_stations = CleaningConfig::default().with_transit(Vec::new(), 0.8);
        let out = clean_listings(&[row], &no_stations).unwrap();
        assert!(!out.listings[0].near_transit);
        assert_eq!(
            out.listings[0].distance_to_transit,
            out.listings[0].distance_to_nearest()
        );
    }

    #[test]
    fn test_distances_rounded() {
        let out = clean_listings(&[sfu_row("1", "$1,200")], &CleaningConfig::default()).unwrap();
        let d = out.listings[0].distance_to_downtown;
        assert!((d * 1000.0 - (d * 1000.0).round()).abs() < 1e-6);
    }

    #[test]
    fn test_no_survivors_is_insufficient_data() {
        let result = clean_listings(&[sfu_row("1", "")], &CleaningConfig::default());
        assert!(matches!(
            result,
            Err(PipelineError::InsufficientData { found: 0, .. })
        ));
    }

    #[test]
    fn test_report_display_lists_reasons() {
        let rows = [sfu_row("1", "$1,200"), sfu_row("2", "")];
        let out = clean_listings(&rows, &CleaningConfig::default()).unwrap();
        let text = out.report.to_string();
        assert!(text.contains("kept: 1"));
        assert!(text.contains("empty_price: 1"));
    }
}
