//! Order statistics shared by the imputer, the price summary and the
//! benchmark reports.

/// Median of `values`, sorting them in place.
///
/// `values` must be non-empty and NaN-free.
pub fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    }
}

/// Percentile `q` in `[0, 1]` of ascending-sorted, non-empty `sorted`,
/// interpolating linearly between order statistics.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&mut [5.0, 1.0, 3.0]), 3.0);
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&mut [7.0]), 7.0);
    }

    #[test]
    fn test_median_leaves_values_sorted() {
        let mut values = [3.0, -1.0, 2.0];
        median(&mut values);
        assert_eq!(values, [-1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&sorted, 0.25) - 1.75).abs() < 1e-9);
        assert!((percentile(&sorted, 0.5) - 2.5).abs() < 1e-9);
        assert!((percentile(&sorted, 0.75) - 3.25).abs() < 1e-9);
        assert_eq!(percentile(&[5.0], 0.75), 5.0);
    }

    #[test]
    fn test_percentile_clamps_q() {
        let sorted = [1.0, 2.0, 3.0];
        assert_eq!(percentile(&sorted, -0.5), 1.0);
        assert_eq!(percentile(&sorted, 2.0), 3.0);
        assert_eq!(percentile(&sorted, 0.5), median(&mut [3.0, 1.0, 2.0]));
    }
}
