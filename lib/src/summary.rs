//! Grouped price statistics over clean listings.
//!
//! One block of rows per grouping column (`nearest_area`, then each boolean
//! flag), each row holding count, median and quartiles of `price`. Empty
//! groups are omitted. Percentiles interpolate linearly between order
//! statistics.

use crate::dataset::CleanListing;
use crate::error::PipelineError;
use crate::geo::Area;
use crate::stats::{median, percentile};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Boolean columns summarized after `nearest_area`, in output order.
const FLAG_COLUMNS: [(&str, fn(&CleanListing) -> bool); 6] = [
    ("near_transit", |l: &CleanListing| l.near_transit),
    ("student_flag", |l: &CleanListing| l.student_flag),
    ("furnished", |l: &CleanListing| l.furnished),
    ("pets_allowed", |l: &CleanListing| l.pets_allowed),
    ("parking_available", |l: &CleanListing| l.parking_available),
    ("utilities_included", |l: &CleanListing| l.utilities_included),
];

/// Price statistics of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub summary_type: String,
    pub group: String,
    pub count: usize,
    pub median: f64,
    pub p25: f64,
    pub p75: f64,
}

/// Median price of one area, for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaPrice {
    pub area: Area,
    pub median_price: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSummary {
    pub rows: Vec<SummaryRow>,
    /// Areas from cheapest to most expensive median price.
    pub area_ranking: Vec<AreaPrice>,
}

fn summarize(summary_type: &str, group: String, prices: &mut [f64]) -> Option<SummaryRow> {
    if prices.is_empty() {
        return None;
    }
    // sorts `prices` for the quartiles below
    let median = median(prices);
    Some(SummaryRow {
        summary_type: summary_type.to_string(),
        group,
        count: prices.len(),
        median,
        p25: percentile(prices, 0.25),
        p75: percentile(prices, 0.75),
    })
}

impl PriceSummary {
    pub fn from_listings(listings: &[CleanListing]) -> Self {
        let mut rows = Vec::new();
        let mut area_ranking = Vec::new();

        for area in Area::ALL {
            let mut prices: Vec<f64> = listings
                .iter()
                .filter(|l| l.nearest_area == area)
                .map(|l| l.price)
                .collect();
            if let Some(row) = summarize("nearest_area", area.to_string(), &mut prices) {
                area_ranking.push(AreaPrice {
                    area,
                    median_price: row.median,
                });
                rows.push(row);
            }
        }

        for (name, flag) in FLAG_COLUMNS {
            for value in [false, true] {
                let mut prices: Vec<f64> = listings
                    .iter()
                    .filter(|l| flag(l) == value)
                    .map(|l| l.price)
                    .collect();
                rows.extend(summarize(name, value.to_string(), &mut prices));
            }
        }

        // stable sort keeps SFU, UBC, Downtown order on equal medians
        area_ranking.sort_by(|a, b| a.median_price.total_cmp(&b.median_price));

        Self { rows, area_ranking }
    }

    pub fn cheapest_area(&self) -> Option<AreaPrice> {
        self.area_ranking.first().copied()
    }

    pub fn most_expensive_area(&self) -> Option<AreaPrice> {
        self.area_ranking.last().copied()
    }

    /// Write `summary_type,group,count,median,p25,p75` rows.
    pub fn write_csv<W: Write>(&self, sink: W) -> Result<(), PipelineError> {
        let mut wtr = csv::Writer::from_writer(sink);
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let file = File::create(path.as_ref()).map_err(|e| {
            PipelineError::Io(format!("cannot create {}: {}", path.as_ref().display(), e))
        })?;
        self.write_csv(BufWriter::new(file))
    }
}
