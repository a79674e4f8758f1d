//! Error types for the cleaning and modeling stages.
//!
//! Two kinds of failure exist:
//! - [`RowRejection`]: a single raw row is unusable. The row is dropped and
//!   counted; the stage keeps going.
//! - [`PipelineError`]: the stage cannot produce a meaningful result
//!   (missing column, too little data, I/O failure) and aborts.

use std::fmt;

/// Reason a raw listing was dropped during cleaning.
///
/// Ordered so that reports list reasons in a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowRejection {
    /// Title is empty while titles are required.
    MissingTitle,
    /// Price cell is empty.
    EmptyPrice,
    /// Price cell has no parseable number.
    MalformedPrice,
    /// Price parsed to zero or a negative amount.
    NonPositivePrice,
    /// Price falls outside the configured band.
    PriceOutOfRange,
    /// Square footage is present but not a positive number.
    MalformedSquareFootage,
    /// Latitude or longitude is missing.
    MissingCoordinates,
    /// Latitude or longitude is not a finite number.
    MalformedCoordinates,
    /// Coordinates fall outside the Metro Vancouver bounding box.
    CoordinatesOutOfBounds,
    /// Post date is missing or older than the recency cutoff.
    StalePosting,
}

impl RowRejection {
    /// Short machine-friendly label, used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            RowRejection::MissingTitle => "missing_title",
            RowRejection::EmptyPrice => "empty_price",
            RowRejection::MalformedPrice => "malformed_price",
            RowRejection::NonPositivePrice => "non_positive_price",
            RowRejection::PriceOutOfRange => "price_out_of_range",
            RowRejection::MalformedSquareFootage => "malformed_square_footage",
            RowRejection::MissingCoordinates => "missing_coordinates",
            RowRejection::MalformedCoordinates => "malformed_coordinates",
            RowRejection::CoordinatesOutOfBounds => "coordinates_out_of_bounds",
            RowRejection::StalePosting => "stale_posting",
        }
    }
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal error raised by a pipeline stage.
#[derive(Debug)]
pub enum PipelineError {
    /// A required column is absent from an input file.
    Schema { context: String, column: String },
    /// Not enough rows to continue.
    InsufficientData {
        context: String,
        found: usize,
        required: usize,
    },
    /// Invalid configuration value.
    InvalidParameter(String),
    /// Feature dimension mismatch between a fitted component and its input.
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    /// I/O error during file operations.
    Io(String),
    /// CSV encoding or decoding error.
    Csv(String),
    /// Serialization or deserialization error (JSON config, bincode model).
    Serialization(String),
}

impl PipelineError {
    pub(crate) fn schema(context: impl Into<String>, column: impl Into<String>) -> Self {
        PipelineError::Schema {
            context: context.into(),
            column: column.into(),
        }
    }

    pub(crate) fn insufficient(context: impl Into<String>, found: usize, required: usize) -> Self {
        PipelineError::InsufficientData {
            context: context.into(),
            found,
            required,
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Schema { context, column } => {
                write!(
                    f,
                    "Schema error: required column `{}` is missing from {}",
                    column, context
                )
            }
            PipelineError::InsufficientData {
                context,
                found,
                required,
            } => {
                write!(
                    f,
                    "Insufficient data: {} has {} rows, at least {} required",
                    context, found, required
                )
            }
            PipelineError::InvalidParameter(msg) => {
                write!(f, "Invalid parameter: {}", msg)
            }
            PipelineError::FeatureMismatch {
                expected_features,
                got_features,
            } => {
                write!(
                    f,
                    "Feature mismatch: expected {} features, got {}",
                    expected_features, got_features
                )
            }
            PipelineError::Io(msg) => write!(f, "I/O error: {}", msg),
            PipelineError::Csv(msg) => write!(f, "CSV error: {}", msg),
            PipelineError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err.to_string())
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for PipelineError {
    fn from(err: bincode::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<regex::Error> for PipelineError {
    fn from(err: regex::Error) -> Self {
        PipelineError::InvalidParameter(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_column() {
        let err = PipelineError::schema("raw listings", "price");
        let msg = err.to_string();
        assert!(msg.contains("Schema error"));
        assert!(msg.contains("`price`"));
        assert!(msg.contains("raw listings"));
    }

    #[test]
    fn test_insufficient_data_reports_counts() {
        let err = PipelineError::insufficient("training split", 4, 10);
        let msg = err.to_string();
        assert!(msg.contains("4 rows"));
        assert!(msg.contains("at least 10"));
    }

    #[test]
    fn test_error_display_feature_mismatch() {
        let err = PipelineError::FeatureMismatch {
            expected_features: 12,
            got_features: 3,
        };
        assert!(err.to_string().contains("Feature mismatch"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: PipelineError = io_err.into();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[test]
    fn test_error_from_bincode_error() {
        let bad_bytes: &[u8] = &[0xff, 0xff, 0xff, 0xff];
        let result: Result<String, bincode::Error> = bincode::deserialize(bad_bytes);
        if let Err(e) = result {
            let err: PipelineError = e.into();
            assert!(matches!(err, PipelineError::Serialization(_)));
        }
    }

    #[test]
    fn test_error_is_std_error() {
        let err = PipelineError::InvalidParameter("test".to_string());
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn test_rejection_labels_are_distinct() {
        let all = [
            RowRejection::MissingTitle,
            RowRejection::EmptyPrice,
            RowRejection::MalformedPrice,
            RowRejection::NonPositivePrice,
            RowRejection::PriceOutOfRange,
            RowRejection::MalformedSquareFootage,
            RowRejection::MissingCoordinates,
            RowRejection::MalformedCoordinates,
            RowRejection::CoordinatesOutOfBounds,
            RowRejection::StalePosting,
        ];
        let labels: std::collections::HashSet<_> = all.iter().map(|r| r.as_str()).collect();
        assert_eq!(labels.len(), all.len());
    }
}
