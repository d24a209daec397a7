//! Aggregates over a slice of prices.
//!
//! Non-finite entries (NaN, infinities) are skipped. Each returns `None` when
//! no finite value is left so callers can tell "no data" apart from a genuine
//! zero.

fn finite(data: &[f64]) -> impl Iterator<Item = f64> + '_ {
    data.iter().copied().filter(|v| v.is_finite())
}

/// Compute the mean of a data slice.
pub fn mean(data: &[f64]) -> Option<f64> {
    let (sum, count) = finite(data).fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

pub fn max(data: &[f64]) -> Option<f64> {
    finite(data).reduce(f64::max)
}

pub fn min(data: &[f64]) -> Option<f64> {
    finite(data).reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slice_has_no_aggregate() {
        assert_eq!(mean(&[]), None);
        assert_eq!(max(&[]), None);
        assert_eq!(min(&[]), None);
    }

    #[test]
    fn test_aggregates() {
        let data = vec![3.0, 1.0, 4.0, 1.5];
        assert_eq!(max(&data), Some(4.0));
        assert_eq!(min(&data), Some(1.0));
        assert!((mean(&data).unwrap() - 2.375).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_values_are_skipped() {
        let data = vec![10.0, f64::NAN, 12.0, f64::INFINITY];
        assert_eq!(mean(&data), Some(11.0));
        assert_eq!(max(&data), Some(12.0));
        assert_eq!(min(&data), Some(10.0));

        assert_eq!(mean(&[f64::NAN]), None);
        assert_eq!(max(&[f64::NAN]), None);
    }
}
