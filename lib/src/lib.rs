//! # rental_insights
//!
//! Cleaning, geographic enrichment and rent modeling for Metro Vancouver
//! rental listings.
//!
//! ## Core Design Principles
//!
//! - **Two pure stages**: [`cleaning::clean_listings`] turns raw scraped rows
//!   into validated listings; [`modeling::analyze`] fits and evaluates a
//!   Random Forest on them. File handling lives in [`pipeline`].
//! - **Row problems are data, not errors**: a malformed row is dropped with a
//!   [`RowRejection`] and counted; only configuration and schema problems
//!   abort a stage.
//! - **Stateful Type Safety**: models carry their training state in the type
//!   system (`Unfitted` vs `Fitted`), so predicting with an untrained forest
//!   does not compile.
//! - **Reproducibility**: every random choice is driven by a seed from
//!   [`config::ModelingConfig`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rental_insights::cleaning::clean_listings;
//! use rental_insights::config::PipelineConfig;
//! use rental_insights::dataset::read_raw_listings_from_path;
//! use rental_insights::modeling::analyze;
//!
//! let config = PipelineConfig::default();
//! let raw = read_raw_listings_from_path("raw.csv")?;
//! let cleaned = clean_listings(&raw, &config.cleaning)?;
//! let analysis = analyze(&cleaned.listings, &config.modeling)?;
//! println!("R² = {:.3}", analysis.metrics.r_squared);
//! ```
//!
//! ## Module Structure
//!
//! - `geo`: coordinates, haversine distance, landmarks and the bounding box
//! - `config`: every tunable constant, with JSON loading
//! - `dataset`: raw and clean listing records, CSV I/O, feature matrix
//! - `cleaning`: validation, deduplication, enrichment, keyword flags
//! - `preprocessing`: fit/transform seam and the imputer
//! - `model`: regression tree and Random Forest
//! - `modeling`: the end-to-end modeling stage and its reports
//! - `stats`: median and percentile helpers
//! - `summary`: grouped price statistics
//! - `pipeline`: file-based wrappers used by the `rentals` binary

/// Listing validation and enrichment.
pub mod cleaning;

/// Configuration for both stages.
pub mod config;

/// Listing records, CSV readers and writers, feature matrix.
pub mod dataset;

pub mod error;

/// Geographic primitives.
pub mod geo;

/// Regression evaluation metrics.
pub mod metrics;

/// Tree models with compile-time state safety.
pub mod model;

/// The modeling stage.
pub mod modeling;

pub mod pipeline;

/// Data preprocessing transformers.
pub mod preprocessing;

/// Parameter persistence.
pub mod serialization;

pub mod split;

/// Median and percentiles.
pub mod stats;

/// Grouped price statistics.
pub mod summary;

pub use error::{PipelineError, RowRejection};
pub use geo::{Area, Coordinates};
