//! Clean dataset CSV reader and writer.

use crate::dataset::CleanListing;
use crate::error::PipelineError;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const CONTEXT: &str = "clean dataset";

/// Columns the modeling stage cannot work without.
pub const CLEAN_REQUIRED_COLUMNS: [&str; 14] = [
    "id",
    "price",
    "square_footage",
    "latitude",
    "longitude",
    "distance_to_SFU",
    "distance_to_UBC",
    "distance_to_Downtown",
    "nearest_area",
    "near_transit",
    "student_flag",
    "furnished",
    "pets_allowed",
    "parking_available",
];

/// Write clean listings with a header row, in the given order.
pub fn write_clean_listings<W: Write>(
    sink: W,
    listings: &[CleanListing],
) -> Result<(), PipelineError> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(sink);
    for listing in listings {
        wtr.serialize(listing)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_clean_listings_to_path<P: AsRef<Path>>(
    path: P,
    listings: &[CleanListing],
) -> Result<(), PipelineError> {
    let file = File::create(path.as_ref()).map_err(|e| {
        PipelineError::Io(format!("cannot create {}: {}", path.as_ref().display(), e))
    })?;
    write_clean_listings(BufWriter::new(file), listings)
}

/// Read a clean dataset, checking the header before decoding any row.
///
/// # Errors
/// - [`PipelineError::Schema`] if any of [`CLEAN_REQUIRED_COLUMNS`] is absent
/// - [`PipelineError::Csv`] if a row cannot be decoded
pub fn read_clean_listings<R: Read>(source: R) -> Result<Vec<CleanListing>, PipelineError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(source);

    let headers = rdr.headers()?.clone();
    for column in CLEAN_REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(PipelineError::schema(CONTEXT, column));
        }
    }

    rdr.deserialize()
        .map(|row| row.map_err(PipelineError::from))
        .collect()
}

pub fn read_clean_listings_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<CleanListing>, PipelineError> {
    let file = File::open(path.as_ref()).map_err(|e| {
        PipelineError::Io(format!("cannot open {}: {}", path.as_ref().display(), e))
    })?;
    read_clean_listings(BufReader::new(file))
}
