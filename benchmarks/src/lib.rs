//! Benchmark utilities for rental_insights.
//!
//! - Seeded synthetic listings (raw and clean)
//! - Timing and statistics helpers

pub mod data;
pub mod utils;

pub use data::{clean_listings_for, raw_listings};
pub use utils::{benchmark_with_warmup, time_fn, BenchmarkStats, Timer};
