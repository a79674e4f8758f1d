//! Feature importance and prediction sample reports.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn write_rows<W: Write, T: Serialize>(sink: W, rows: &[T]) -> Result<(), PipelineError> {
    let mut wtr = csv::Writer::from_writer(sink);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, PipelineError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| PipelineError::Io(format!("cannot create {}: {}", path.display(), e)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature_name: String,
    pub importance_score: f64,
}

/// Importances sorted descending, ties broken by feature name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureImportanceReport {
    pub entries: Vec<FeatureImportance>,
}

impl FeatureImportanceReport {
    pub fn new<S: AsRef<str>>(names: &[S], scores: &[f64]) -> Result<Self, PipelineError> {
        if names.len() != scores.len() {
            return Err(PipelineError::FeatureMismatch {
                expected_features: names.len(),
                got_features: scores.len(),
            });
        }
        let mut entries: Vec<FeatureImportance> = names
            .iter()
            .zip(scores)
            .map(|(name, &score)| FeatureImportance {
                feature_name: name.as_ref().to_string(),
                importance_score: score,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.importance_score
                .total_cmp(&a.importance_score)
                .then_with(|| a.feature_name.cmp(&b.feature_name))
        });
        Ok(Self { entries })
    }

    pub fn get(&self, feature_name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.feature_name == feature_name)
            .map(|e| e.importance_score)
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.importance_score).sum()
    }

    /// Write `feature_name,importance_score` rows.
    pub fn write_csv<W: Write>(&self, sink: W) -> Result<(), PipelineError> {
        write_rows(sink, &self.entries)
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        self.write_csv(create(path.as_ref())?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub listing_identifier: String,
    pub actual_price: f64,
    pub predicted_price: f64,
    pub abs_error: f64,
}

/// Held-out predictions, largest absolute error first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredictionSample {
    pub rows: Vec<Prediction>,
}

impl PredictionSample {
    /// Pair ids with actual and predicted prices, sort by absolute error
    /// (descending, ties by id) and keep at most `limit` rows.
    pub fn new(
        ids: &[String],
        actual: &[f64],
        predicted: &[f64],
        limit: Option<usize>,
    ) -> Result<Self, PipelineError> {
        if ids.len() != actual.len() || actual.len() != predicted.len() {
            return Err(PipelineError::InvalidParameter(format!(
                "{} ids, {} actual prices, {} predictions",
                ids.len(),
                actual.len(),
                predicted.len()
            )));
        }
        let mut rows: Vec<Prediction> = ids
            .iter()
            .zip(actual.iter().zip(predicted))
            .map(|(id, (&actual_price, &predicted_price))| Prediction {
                listing_identifier: id.clone(),
                actual_price,
                predicted_price,
                abs_error: (actual_price - predicted_price).abs(),
            })
            .collect();
        rows.sort_by(|a, b| match b.abs_error.total_cmp(&a.abs_error) {
            Ordering::Equal => a.listing_identifier.cmp(&b.listing_identifier),
            other => other,
        });
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write `listing_identifier,actual_price,predicted_price,abs_error` rows.
    pub fn write_csv<W: Write>(&self, sink: W) -> Result<(), PipelineError> {
        write_rows(sink, &self.rows)
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        self.write_csv(create(path.as_ref())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_importances_sorted_with_name_ties() {
        let report =
            FeatureImportanceReport::new(&["b", "a", "c"], &[0.25, 0.25, 0.5]).unwrap();
        let names: Vec<_> = report.entries.iter().map(|e| e.feature_name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert!((report.total() - 1.0).abs() < 1e-12);
        assert_eq!(report.get("a"), Some(0.25));
    }

    #[test]
    fn test_importances_length_mismatch() {
        assert!(FeatureImportanceReport::new(&["a"], &[0.5, 0.5]).is_err());
    }

    #[test]
    fn test_importance_csv_header() {
        let report = FeatureImportanceReport::new(&["latitude"], &[1.0]).unwrap();
        let mut buf = Vec::new();
        report.write_csv(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "feature_name,importance_score\nlatitude,1.0\n"
        );
    }

    #[test]
    fn test_prediction_sample_sorted_and_truncated() {
        let ids: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let actual = [1000.0, 1200.0, 1500.0, 900.0];
        let predicted = [1100.0, 1200.0, 1200.0, 800.0];
        let sample = PredictionSample::new(&ids, &actual, &predicted, Some(3)).unwrap();

        let order: Vec<_> = sample.rows.iter().map(|r| r.listing_identifier.as_str()).collect();
        // c has error 300; a and d tie at 100 and are ordered by id
        assert_eq!(order, vec!["c", "a", "d"]);
        assert!((sample.rows[0].abs_error - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_prediction_sample_without_limit_keeps_all() {
        let ids = vec!["x".to_string(), "y".to_string()];
        let sample = PredictionSample::new(&ids, &[1.0, 2.0], &[1.0, 2.0], None).unwrap();
        assert_eq!(sample.len(), 2);
    }

    #[test]
    fn test_prediction_csv_header() {
        let ids = vec!["x".to_string()];
        let sample = PredictionSample::new(&ids, &[1000.0], &[950.0], None).unwrap();
        let mut buf = Vec::new();
        sample.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("listing_identifier,actual_price,predicted_price,abs_error\n"));
        assert!(text.contains("x,1000.0,950.0,50.0"));
    }
}
