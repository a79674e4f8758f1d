//! Seeded train/test splitting.

use crate::error::PipelineError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a generator seeded by `seed` and hold out
/// `ceil(n * test_fraction)` rows from the front of the permutation.
///
/// The same `n`, fraction and seed always give the same partition.
///
/// # Errors
/// [`PipelineError::InvalidParameter`] unless `0 < test_fraction < 1`.
pub fn train_test_split(
    n: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestIndices, PipelineError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::InvalidParameter(format!(
            "test_fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    let train = indices.split_off(n_test.min(n));
    Ok(TrainTestIndices {
        train,
        test: indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_hundred_rows_split_eighty_twenty() {
        let split = train_test_split(100, 0.2, 42).unwrap();
        assert_eq!(split.train.len(), 80);
        assert_eq!(split.test.len(), 20);

        let all: HashSet<usize> = split.train.iter().chain(&split.test).copied().collect();
        assert_eq!(all.len(), 100);
    }

    #[test]
    fn test_same_seed_same_membership() {
        let a = train_test_split(100, 0.2, 42).unwrap();
        let b = train_test_split(100, 0.2, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_membership() {
        let a = train_test_split(100, 0.2, 42).unwrap();
        let b = train_test_split(100, 0.2, 43).unwrap();
        assert_ne!(a.test, b.test);
    }

    #[test]
    fn test_test_size_rounds_up() {
        let split = train_test_split(11, 0.2, 1).unwrap();
        assert_eq!(split.test.len(), 3);
        assert_eq!(split.train.len(), 8);
    }

    #[test]
    fn test_empty_input() {
        let split = train_test_split(0, 0.2, 42).unwrap();
        assert!(split.train.is_empty());
        assert!(split.test.is_empty());
    }

    #[test]
    fn test_invalid_fraction() {
        assert!(train_test_split(10, 0.0, 42).is_err());
        assert!(train_test_split(10, 1.0, 42).is_err());
    }
}
