//! Raw listing CSV reader.
//!
//! Columns are located by header name, case-insensitively, and several
//! scraper spellings are accepted for each field (`price_text` for `price`,
//! `full_text` for `desc`, ...). A required field with no matching header
//! is a fatal schema error; a short or ragged row is not. Cells are decoded
//! lossily, so stray non-UTF-8 bytes in scraped text become `U+FFFD`.

use crate::dataset::RawListing;
use crate::error::PipelineError;
use csv::{ByteRecord, ReaderBuilder};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const CONTEXT: &str = "raw listings";

/// A raw field: canonical name, accepted header spellings, whether required.
struct RawColumn {
    name: &'static str,
    aliases: &'static [&'static str],
    required: bool,
}

impl RawColumn {
    const fn required(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            name,
            aliases,
            required: true,
        }
    }

    const fn optional(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            name,
            aliases,
            required: false,
        }
    }
}

const N_COLUMNS: usize = 14;

const COLUMNS: [RawColumn; N_COLUMNS] = [
    RawColumn::optional("id", &["id", "post_id"]),
    RawColumn::optional("url", &["url", "link"]),
    RawColumn::required("title", &["title"]),
    RawColumn::required("price", &["price", "price_text", "price_txt"]),
    RawColumn::required("sqft", &["sqft", "square_footage", "sqft_text"]),
    RawColumn::required("lat", &["lat", "latitude"]),
    RawColumn::required("lon", &["lon", "lng", "longitude"]),
    RawColumn::required("desc", &["desc", "description", "full_text"]),
    RawColumn::optional("attrs", &["attrs", "attrs_text", "amenities"]),
    RawColumn::optional("furnished", &["furnished"]),
    RawColumn::optional("pets_allowed", &["pets_allowed"]),
    RawColumn::optional("parking_available", &["parking_available"]),
    RawColumn::optional("utilities_included", &["utilities_included"]),
    RawColumn::optional("post_date", &["post_date", "posted_text"]),
];

const ID: usize = 0;
const URL: usize = 1;
const TITLE: usize = 2;
const PRICE: usize = 3;
const SQFT: usize = 4;
const LAT: usize = 5;
const LON: usize = 6;
const DESC: usize = 7;
const ATTRS: usize = 8;
const FURNISHED: usize = 9;
const PETS: usize = 10;
const PARKING: usize = 11;
const UTILITIES: usize = 12;
const POST_DATE: usize = 13;

/// Header positions of every known raw field.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSchema {
    positions: [Option<usize>; N_COLUMNS],
}

impl RawSchema {
    /// Resolve field positions from a header row.
    ///
    /// # Errors
    /// [`PipelineError::Schema`] naming the first required field that has no
    /// header, or `id/url` when neither identifier column exists.
    pub fn from_headers(headers: &ByteRecord) -> Result<Self, PipelineError> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| {
                String::from_utf8_lossy(h)
                    .trim()
                    .trim_start_matches('\u{feff}')
                    .to_ascii_lowercase()
            })
            .collect();

        let mut positions = [None; N_COLUMNS];
        for (slot, column) in positions.iter_mut().zip(COLUMNS.iter()) {
            // first alias wins, so `price` is preferred over `price_text`
            *slot = column
                .aliases
                .iter()
                .find_map(|alias| normalized.iter().position(|h| h == alias));
            if column.required && slot.is_none() {
                return Err(PipelineError::schema(CONTEXT, column.name));
            }
        }

        if positions[ID].is_none() && positions[URL].is_none() {
            return Err(PipelineError::schema(CONTEXT, "id/url"));
        }

        Ok(Self { positions })
    }

    fn field(&self, record: &ByteRecord, column: usize) -> Option<String> {
        let bytes = self.positions[column].and_then(|pos| record.get(pos))?;
        let text = String::from_utf8_lossy(bytes);
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Build a [`RawListing`] from one CSV record.
    pub fn listing(&self, record: &ByteRecord) -> RawListing {
        RawListing {
            id: self.field(record, ID),
            url: self.field(record, URL),
            title: self.field(record, TITLE),
            price: self.field(record, PRICE),
            square_footage: self.field(record, SQFT),
            latitude: self.field(record, LAT),
            longitude: self.field(record, LON),
            description: self.field(record, DESC),
            attributes: self.field(record, ATTRS),
            furnished: self.field(record, FURNISHED),
            pets_allowed: self.field(record, PETS),
            parking_available: self.field(record, PARKING),
            utilities_included: self.field(record, UTILITIES),
            post_date: self.field(record, POST_DATE),
        }
    }
}

/// Read raw listings from any CSV source with a header row.
pub fn read_raw_listings<R: Read>(source: R) -> Result<Vec<RawListing>, PipelineError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(source);

    let schema = RawSchema::from_headers(rdr.byte_headers()?)?;

    let mut listings = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        listings.push(schema.listing(&record));
    }
    Ok(listings)
}

/// Read raw listings from a CSV file.
pub fn read_raw_listings_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<RawListing>, PipelineError> {
    let file = File::open(path.as_ref()).map_err(|e| {
        PipelineError::Io(format!("cannot open {}: {}", path.as_ref().display(), e))
    })?;
    read_raw_listings(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_canonical_headers() {
        let csv = "id,url,title,price,sqft,lat,lon,desc\n\
                   1,https://x/1,Cozy room,\"$1,200\",650,49.2781,-122.9199,Near SFU\n";
        let listings = read_raw_listings(csv.as_bytes()).unwrap();
        assert_eq!(listings.len(), 1);
        let l = &listings[0];
        assert_eq!(l.id.as_deref(), Some("1"));
        assert_eq!(l.price.as_deref(), Some("$1,200"));
        assert_eq!(l.square_footage.as_deref(), Some("650"));
        assert_eq!(l.description.as_deref(), Some("Near SFU"));
        assert!(l.attributes.is_none());
    }

    #[test]
    fn test_accepts_scraper_aliases() {
        let csv = "post_id,Title,price_text,square_footage,latitude,longitude,full_text,attrs_text,posted_text\n\
                   77,Studio,$950,,49.26,-123.24,desc,cats are OK,2025-09-30T10:00:00-0700\n";
        let listings = read_raw_listings(csv.as_bytes()).unwrap();
        let l = &listings[0];
        assert_eq!(l.id.as_deref(), Some("77"));
        assert_eq!(l.title.as_deref(), Some("Studio"));
        assert_eq!(l.price.as_deref(), Some("$950"));
        assert!(l.square_footage.is_none());
        assert_eq!(l.attributes.as_deref(), Some("cats are OK"));
        assert!(l.post_date.is_some());
        assert!(l.url.is_none());
    }

    #[test]
    fn test_missing_required_column_names_it() {
        let csv = "id,title,sqft,lat,lon,desc\n1,t,500,49.2,-123.1,d\n";
        let err = read_raw_listings(csv.as_bytes()).unwrap_err();
        match err {
            PipelineError::Schema { column, .. } => assert_eq!(column, "price"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_identifier_columns() {
        let csv = "title,price,sqft,lat,lon,desc\nt,$1000,500,49.2,-123.1,d\n";
        let err = read_raw_listings(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::Schema { ref column, .. } if column == "id/url"));
    }

    #[test]
    fn test_short_rows_yield_missing_fields() {
        let csv = "id,title,price,sqft,lat,lon,desc\n5,Room,$800\n";
        let listings = read_raw_listings(csv.as_bytes()).unwrap();
        assert_eq!(listings[0].price.as_deref(), Some("$800"));
        assert!(listings[0].latitude.is_none());
        assert!(listings[0].description.is_none());
    }

    #[test]
    fn test_whitespace_cells_are_missing() {
        let csv = "id,title,price,sqft,lat,lon,desc\n5,Room,  ,   ,49.2,-123.1,d\n";
        let listings = read_raw_listings(csv.as_bytes()).unwrap();
        assert!(listings[0].price.is_none());
        assert!(listings[0].square_footage.is_none());
    }

    #[test]
    fn test_invalid_utf8_cell_keeps_every_row() {
        let mut csv = b"id,title,price,sqft,lat,lon,desc\n".to_vec();
        csv.extend_from_slice(b"1,Room A,$900,,49.2,-123.1,d\n");
        csv.extend_from_slice(b"2,Caf\xE9 room,$1000,,49.2,-123.1,d\n");
        csv.extend_from_slice(b"3,Room C,$1100,,49.2,-123.1,d\n");

        let listings = read_raw_listings(csv.as_slice()).unwrap();
        assert_eq!(listings.len(), 3);
        assert_eq!(listings[1].title.as_deref(), Some("Caf\u{FFFD} room"));
        assert_eq!(listings[1].price.as_deref(), Some("$1000"));
        assert_eq!(listings[2].id.as_deref(), Some("3"));
    }

    #[test]
    fn test_read_from_missing_path_is_io_error() {
        let err = read_raw_listings_from_path("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
