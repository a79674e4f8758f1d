//! Numeric feature matrix built from clean listings.
//!
//! The feature list is fixed and ordered; column `j` of the matrix is always
//! `FEATURE_NAMES[j]`. Booleans become `0.0`/`1.0`. Unknown square footage
//! is stored as `NaN` (to be imputed) alongside an explicit
//! `square_footage_unknown` indicator, so missing and zero stay distinct.

use crate::dataset::CleanListing;
use crate::error::PipelineError;
use ndarray::{Array1, Array2, Axis};

/// Model predictors, in matrix column order.
pub const FEATURE_NAMES: [&str; 12] = [
    "latitude",
    "longitude",
    "square_footage",
    "square_footage_unknown",
    "distance_to_SFU",
    "distance_to_UBC",
    "distance_to_Downtown",
    "near_transit",
    "student_flag",
    "furnished",
    "pets_allowed",
    "parking_available",
];

pub const N_FEATURES: usize = FEATURE_NAMES.len();

/// Column of the square footage feature (the only one that can be missing).
pub const SQUARE_FOOTAGE: usize = 2;

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn feature_row(listing: &CleanListing) -> [f64; N_FEATURES] {
    [
        listing.latitude,
        listing.longitude,
        listing.square_footage.unwrap_or(f64::NAN),
        flag(listing.square_footage.is_none()),
        listing.distance_to_sfu,
        listing.distance_to_ubc,
        listing.distance_to_downtown,
        flag(listing.near_transit),
        flag(listing.student_flag),
        flag(listing.furnished),
        flag(listing.pets_allowed),
        flag(listing.parking_available),
    ]
}

/// In-memory `(X, y)` pairs plus the listing identity of every row.
#[derive(Debug, Clone)]
pub struct ListingDataset {
    x: Array2<f64>,
    y: Array1<f64>,
    ids: Vec<String>,
}

impl ListingDataset {
    /// Build the feature matrix and price target for `listings`, in order.
    pub fn from_listings(listings: &[CleanListing]) -> Self {
        let mut x = Array2::<f64>::zeros((listings.len(), N_FEATURES));
        for (mut row, listing) in x.axis_iter_mut(Axis(0)).zip(listings) {
            for (cell, value) in row.iter_mut().zip(feature_row(listing)) {
                *cell = value;
            }
        }
        let y = listings.iter().map(|l| l.price).collect::<Array1<f64>>();
        let ids = listings.iter().map(|l| l.id.clone()).collect();
        Self { x, y, ids }
    }

    /// Assemble a dataset from parts.
    ///
    /// # Errors
    /// [`PipelineError::InvalidParameter`] if row counts disagree.
    pub fn new(x: Array2<f64>, y: Array1<f64>, ids: Vec<String>) -> Result<Self, PipelineError> {
        if x.nrows() != y.len() || y.len() != ids.len() {
            return Err(PipelineError::InvalidParameter(format!(
                "x has {} rows, y has {}, ids has {}",
                x.nrows(),
                y.len(),
                ids.len()
            )));
        }
        Ok(Self { x, y, ids })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn target(&self) -> &Array1<f64> {
        &self.y
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Rows at `indices`, in the order given.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
            ids: indices.iter().map(|&i| self.ids[i].clone()).collect(),
        }
    }

    /// Replace the feature matrix, e.g. after imputation.
    pub fn with_features(self, x: Array2<f64>) -> Result<Self, PipelineError> {
        Self::new(x, self.y, self.ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::clean_listing;

    #[test]
    fn test_feature_row_layout() {
        let mut listing = clean_listing("a", 1200.0);
        listing.furnished = true;
        let ds = ListingDataset::from_listings(&[listing]);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.n_features(), N_FEATURES);

        let x = ds.features();
        assert_eq!(x[[0, 0]], 49.2781);
        assert_eq!(x[[0, SQUARE_FOOTAGE]], 600.0);
        assert_eq!(x[[0, 3]], 0.0);
        assert_eq!(x[[0, 4]], 0.4);
        assert_eq!(x[[0, 9]], 1.0); // furnished
        assert_eq!(x[[0, 11]], 1.0); // parking
        assert_eq!(ds.target()[0], 1200.0);
        assert_eq!(ds.ids(), &["a".to_string()]);
    }

    #[test]
    fn test_unknown_square_footage_is_nan_with_indicator() {
        let mut listing = clean_listing("a", 1200.0);
        listing.square_footage = None;
        let ds = ListingDataset::from_listings(&[listing]);
        assert!(ds.features()[[0, SQUARE_FOOTAGE]].is_nan());
        assert_eq!(ds.features()[[0, 3]], 1.0);
    }

    #[test]
    fn test_select_keeps_ids_aligned() {
        let listings: Vec<_> = (0..5)
            .map(|i| clean_listing(&format!("id{}", i), 1000.0 + i as f64))
            .collect();
        let ds = ListingDataset::from_listings(&listings);
        let subset = ds.select(&[4, 1]);
        assert_eq!(subset.ids(), &["id4".to_string(), "id1".to_string()]);
        assert_eq!(subset.target().to_vec(), vec![1004.0, 1001.0]);
    }

    #[test]
    fn test_new_rejects_mismatched_lengths() {
        let result = ListingDataset::new(
            Array2::zeros((3, 2)),
            Array1::zeros(2),
            vec!["a".into(), "b".into()],
        );
        assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
    }

    #[test]
    fn test_feature_names_are_unique() {
        let set: std::collections::HashSet<_> = FEATURE_NAMES.iter().collect();
        assert_eq!(set.len(), N_FEATURES);
    }
}
