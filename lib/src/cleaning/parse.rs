//! Field parsers for raw listing text.
//!
//! Each parser maps one raw cell to a typed value or the [`RowRejection`]
//! that drops the row. `None` input always means the cell was empty.

use crate::error::{PipelineError, RowRejection};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Placeholder strings scrapers and dataframes write for a missing value.
pub fn is_null_token(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "" | "nan" | "none" | "null" | "na" | "n/a"
    )
}

/// Price and square footage extraction.
#[derive(Debug, Clone)]
pub struct NumberParser {
    dollar_amount: Regex,
    first_number: Regex,
}

impl NumberParser {
    pub fn new() -> Result<Self, PipelineError> {
        Ok(Self {
            dollar_amount: Regex::new(r"\$\s*([0-9][0-9,]*(?:\.[0-9]+)?)")?,
            first_number: Regex::new(r"-?[0-9][0-9,]*(?:\.[0-9]+)?")?,
        })
    }

    /// First `$amount` in `text`, commas removed, cents kept.
    pub fn dollar_amount(&self, text: &str) -> Option<f64> {
        let caps = self.dollar_amount.captures(text)?;
        caps.get(1)?.as_str().replace(',', "").parse().ok()
    }

    /// Parse a price cell.
    ///
    /// A `$amount` anywhere in the text wins; otherwise every character but
    /// digits, `.` and `-` is stripped and the remainder parsed.
    pub fn price(&self, text: Option<&str>) -> Result<f64, RowRejection> {
        let text = match text {
            Some(t) if !t.trim().is_empty() => t.trim(),
            _ => return Err(RowRejection::EmptyPrice),
        };

        let value = match self.dollar_amount(text) {
            Some(v) => v,
            None => {
                let stripped: String = text
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                    .collect();
                stripped
                    .parse::<f64>()
                    .map_err(|_| RowRejection::MalformedPrice)?
            }
        };

        if !value.is_finite() {
            return Err(RowRejection::MalformedPrice);
        }
        if value <= 0.0 {
            return Err(RowRejection::NonPositivePrice);
        }
        Ok(value)
    }

    /// Parse a square footage cell; null tokens mean unknown.
    pub fn square_footage(&self, text: Option<&str>) -> Result<Option<f64>, RowRejection> {
        let text = match text {
            Some(t) if !is_null_token(t) => t,
            _ => return Ok(None),
        };
        let value: f64 = self
            .first_number
            .find(text)
            .and_then(|m| m.as_str().replace(',', "").parse().ok())
            .ok_or(RowRejection::MalformedSquareFootage)?;
        if value.is_finite() && value > 0.0 {
            Ok(Some(value))
        } else {
            Err(RowRejection::MalformedSquareFootage)
        }
    }
}

/// Parse one coordinate cell.
pub fn coordinate(text: Option<&str>) -> Result<f64, RowRejection> {
    let text = match text {
        Some(t) if !is_null_token(t) => t.trim(),
        _ => return Err(RowRejection::MissingCoordinates),
    };
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(RowRejection::MalformedCoordinates),
    }
}

/// Parse an explicit boolean cell. Unrecognized text yields `None`.
pub fn boolean(text: Option<&str>) -> Option<bool> {
    match text?.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Parse a post date.
///
/// Accepts RFC 3339, the scraper's `2025-09-30T10:00:00-0700` form, naive
/// timestamps and plain dates. Timestamps keep the calendar date they were
/// written in.
pub fn post_date(text: Option<&str>) -> Option<NaiveDate> {
    let text = text?.trim();
    if is_null_token(text) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}
