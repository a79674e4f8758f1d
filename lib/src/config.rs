//! Pipeline configuration.
//!
//! Every constant the stages depend on (landmarks, bounding box, keyword
//! lists, thresholds, seeds, forest hyperparameters) lives here and is passed
//! into the stage that uses it. Defaults mirror the values the rental study
//! was run with.
//!
//! Configuration can be loaded from JSON. All structs use `#[serde(default)]`
//! so a file only needs to name the values it overrides:
//!
//! ```json
//! { "cleaning": { "transit_threshold_km": 1.0 }, "modeling": { "seed": 7 } }
//! ```

use crate::error::PipelineError;
use crate::geo::{BoundingBox, Coordinates, LandmarkSet};
use crate::model::ForestConfig;
use crate::preprocessing::ImputeStrategy;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inclusive price band; listings outside it are treated as outliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Keyword detection rule for a boolean amenity flag.
///
/// The flag is set when any `include` keyword appears as a whole word and no
/// `exclude` keyword does. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeywordRule {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl KeywordRule {
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }
}

/// SkyTrain and Canada Line stations used for the `near_transit` flag.
pub fn default_transit_stations() -> Vec<Coordinates> {
    vec![
        Coordinates::new(49.2856, -123.1110), // Waterfront
        Coordinates::new(49.2833, -123.1165), // Burrard
        Coordinates::new(49.2796, -123.1098), // Stadium-Chinatown
        Coordinates::new(49.2626, -123.0693), // Commercial-Broadway
        Coordinates::new(49.2272, -123.0026), // Metrotown
        Coordinates::new(49.2664, -123.0017), // Brentwood Town Centre
        Coordinates::new(49.2484, -122.8970), // Lougheed Town Centre
        Coordinates::new(49.1896, -122.8489), // Surrey Central
        Coordinates::new(49.1664, -123.1365), // Richmond-Brighouse
    ]
}

/// Settings for the cleaning/enrichment stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub landmarks: LandmarkSet,
    pub bounding_box: BoundingBox,
    /// Stations for `distance_to_transit`. When empty, the nearest landmark
    /// distance is used instead.
    pub transit_stations: Vec<Coordinates>,
    pub transit_threshold_km: f64,
    /// Decimal places kept on every distance column.
    pub distance_decimals: u32,
    /// Outlier band on price; `None` keeps every positive price.
    pub price_range: Option<PriceRange>,
    /// Recover an empty price from a `$amount` in the title or description.
    pub price_from_text: bool,
    pub require_title: bool,
    /// Drop postings older than this many days before `as_of`.
    pub max_age_days: Option<u32>,
    pub as_of: Option<NaiveDate>,
    pub student_keywords: Vec<String>,
    pub furnished: KeywordRule,
    pub pets_allowed: KeywordRule,
    pub parking_available: KeywordRule,
    pub utilities_included: KeywordRule,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            landmarks: LandmarkSet::default(),
            bounding_box: BoundingBox::default(),
            transit_stations: default_transit_stations(),
            transit_threshold_km: 0.8,
            distance_decimals: 3,
            price_range: Some(PriceRange {
                min: 600.0,
                max: 2500.0,
            }),
            price_from_text: false,
            require_title: true,
            max_age_days: None,
            as_of: None,
            student_keywords: [
                "student",
                "students",
                "sfu",
                "ubc",
                "langara",
                "douglas",
                "bcit",
                "college",
                "university",
                "shared",
                "near campus",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            furnished: KeywordRule::new(
                ["furnished", "fully furnished", "fully-furnished"],
                ["unfurnished"],
            ),
            pets_allowed: KeywordRule::new(
                [
                    "pets ok",
                    "pet ok",
                    "pet friendly",
                    "pet-friendly",
                    "pets allowed",
                    "cats ok",
                    "cat ok",
                    "dogs ok",
                    "dog ok",
                ],
                ["no pets", "no pet"],
            ),
            parking_available: KeywordRule::new(
                [
                    "parking",
                    "parking included",
                    "street parking",
                    "underground parking",
                    "garage",
                ],
                ["no parking"],
            ),
            utilities_included: KeywordRule::new(
                [
                    "utilities included",
                    "utility included",
                    "hydro included",
                    "heat included",
                    "internet included",
                    "all inclusive",
                    "all-inclusive",
                ],
                Vec::<String>::new(),
            ),
        }
    }
}

impl CleaningConfig {
    pub fn with_price_range(mut self, range: Option<PriceRange>) -> Self {
        self.price_range = range;
        self
    }

    pub fn with_price_from_text(mut self, enabled: bool) -> Self {
        self.price_from_text = enabled;
        self
    }

    pub fn with_require_title(mut self, required: bool) -> Self {
        self.require_title = required;
        self
    }

    pub fn with_transit(mut self, stations: Vec<Coordinates>, threshold_km: f64) -> Self {
        self.transit_stations = stations;
        self.transit_threshold_km = threshold_km;
        self
    }

    /// Keep only postings at most `days` old relative to `as_of`.
    pub fn with_recency(mut self, days: u32, as_of: NaiveDate) -> Self {
        self.max_age_days = Some(days);
        self.as_of = Some(as_of);
        self
    }

    pub fn with_student_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.student_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.transit_threshold_km >= 0.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "transit_threshold_km must be non-negative, got {}",
                self.transit_threshold_km
            )));
        }
        if let Some(range) = self.price_range {
            if !(range.min > 0.0 && range.min <= range.max) {
                return Err(PipelineError::InvalidParameter(format!(
                    "price_range must satisfy 0 < min <= max, got {}..={}",
                    range.min, range.max
                )));
            }
        }
        let b = &self.bounding_box;
        if !(b.min_lat < b.max_lat && b.min_lon < b.max_lon) {
            return Err(PipelineError::InvalidParameter(
                "bounding_box minimums must be below maximums".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the modeling stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelingConfig {
    /// Share of rows held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the train/test shuffle.
    pub seed: u64,
    pub min_training_rows: usize,
    /// Rows kept in the prediction sample (largest errors first); `None`
    /// keeps the whole test split.
    pub prediction_sample_size: Option<usize>,
    /// Fill rule for unknown feature values, learned on the training split.
    pub imputation: ImputeStrategy,
    pub forest: ForestConfig,
}

impl Default for ModelingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            min_training_rows: 10,
            prediction_sample_size: Some(50),
            imputation: ImputeStrategy::Median,
            forest: ForestConfig::default(),
        }
    }
}

impl ModelingConfig {
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_min_training_rows(mut self, rows: usize) -> Self {
        self.min_training_rows = rows;
        self
    }

    pub fn with_prediction_sample_size(mut self, size: Option<usize>) -> Self {
        self.prediction_sample_size = size;
        self
    }

    pub fn with_imputation(mut self, strategy: ImputeStrategy) -> Self {
        self.imputation = strategy;
        self
    }

    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.min_training_rows == 0 {
            return Err(PipelineError::InvalidParameter(
                "min_training_rows must be at least 1".to_string(),
            ));
        }
        if let ImputeStrategy::Constant(value) = self.imputation {
            if !value.is_finite() {
                return Err(PipelineError::InvalidParameter(format!(
                    "constant imputation value must be finite, got {}",
                    value
                )));
            }
        }
        self.forest.validate()
    }
}

/// Configuration for both stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub cleaning: CleaningConfig,
    pub modeling: ModelingConfig,
}

impl PipelineConfig {
    /// Read a JSON configuration file; missing keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig = serde_json::from_str(text)?;
        config.cleaning.validate()?;
        config.modeling.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.cleaning.validate().is_ok());
        assert!(config.modeling.validate().is_ok());
        assert_eq!(config.modeling.seed, 42);
        assert_eq!(config.cleaning.transit_stations.len(), 9);
    }

    #[test]
    fn test_partial_json_overrides_only_named_fields() {
        let config = PipelineConfig::from_json_str(
            r#"{ "cleaning": { "transit_threshold_km": 1.0 }, "modeling": { "seed": 7 } }"#,
        )
        .unwrap();
        assert_eq!(config.cleaning.transit_threshold_km, 1.0);
        assert_eq!(config.modeling.seed, 7);
        assert_eq!(config.modeling.test_fraction, 0.2);
        assert!(config.cleaning.require_title);
    }

    #[test]
    fn test_invalid_test_fraction_rejected() {
        let result = PipelineConfig::from_json_str(r#"{ "modeling": { "test_fraction": 1.5 } }"#);
        assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let result = PipelineConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(PipelineError::Serialization(_))));
    }

    #[test]
    fn test_price_range_bounds_inclusive() {
        let range = PriceRange {
            min: 600.0,
            max: 2500.0,
        };
        assert!(range.contains(600.0));
        assert!(range.contains(2500.0));
        assert!(!range.contains(2500.01));
    }

    #[test]
    fn test_builder_setters() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let config = CleaningConfig::default()
            .with_price_range(None)
            .with_recency(60, date)
            .with_student_keywords(["campus"]);
        assert!(config.price_range.is_none());
        assert_eq!(config.max_age_days, Some(60));
        assert_eq!(config.as_of, Some(date));
        assert_eq!(config.student_keywords, vec!["campus".to_string()]);
    }

    #[test]
    fn test_imputation_strategy_from_json() {
        let config = PipelineConfig::default();
        assert_eq!(config.modeling.imputation, ImputeStrategy::Median);

        let config =
            PipelineConfig::from_json_str(r#"{ "modeling": { "imputation": "Mean" } }"#).unwrap();
        assert_eq!(config.modeling.imputation, ImputeStrategy::Mean);

        let config = PipelineConfig::from_json_str(
            r#"{ "modeling": { "imputation": { "Constant": 500.0 } } }"#,
        )
        .unwrap();
        assert_eq!(config.modeling.imputation, ImputeStrategy::Constant(500.0));
        assert_eq!(config.modeling.seed, 42);
    }

    #[test]
    fn test_non_finite_constant_imputation_rejected() {
        let config = ModelingConfig::default().with_imputation(ImputeStrategy::Constant(f64::NAN));
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = PipelineConfig::default();
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        let loaded = PipelineConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded.modeling.seed, config.modeling.seed);
        assert_eq!(loaded.modeling.forest.n_trees, config.modeling.forest.n_trees);
        assert_eq!(loaded.modeling.imputation, config.modeling.imputation);
        assert_eq!(loaded.cleaning.student_keywords, config.cleaning.student_keywords);
        assert_eq!(loaded.cleaning.furnished, config.cleaning.furnished);
        assert_eq!(
            loaded.cleaning.transit_stations.len(),
            config.cleaning.transit_stations.len()
        );
    }
}
