//! Divisor operators: reduce a batch to the scalar relative values are taken against.

use crate::{ValueSelector, finite_or_zero};

// ============================================================================
// STRATEGY PATTERN: Divisor Operator
// ============================================================================

/// Strategy trait computing the divisor for a batch
///
/// Implementations are pure and total: they never fail and an empty batch
/// yields `0` (except [`Unit`]).
pub trait DivisorOperator<T>: Send + Sync {
    fn divisor(&self, batch: &[T], selector: &dyn ValueSelector<T>) -> f64;
}

/// Sum of all values; positive batches normalize to shares of the whole
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

impl<T> DivisorOperator<T> for Sum {
    fn divisor(&self, batch: &[T], selector: &dyn ValueSelector<T>) -> f64 {
        batch
            .iter()
            .map(|input| finite_or_zero(selector.select(input)))
            .sum()
    }
}

/// Largest absolute value; normalizes into `[-1, 1]`
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxAbs;

impl<T> DivisorOperator<T> for MaxAbs {
    fn divisor(&self, batch: &[T], selector: &dyn ValueSelector<T>) -> f64 {
        batch
            .iter()
            .map(|input| finite_or_zero(selector.select(input)).abs())
            .fold(0.0, f64::max)
    }
}

/// Constant divisor of `1`, used when no operator is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct Unit;

impl<T> DivisorOperator<T> for Unit {
    fn divisor(&self, _batch: &[T], _selector: &dyn ValueSelector<T>) -> f64 {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Identity;

    #[test]
    fn test_sum_divisor() {
        assert_eq!(Sum.divisor(&[10.0, 30.0], &Identity), 40.0);
        assert_eq!(Sum.divisor(&[-5.0, 5.0, 10.0], &Identity), 10.0);
    }

    #[test]
    fn test_sum_ignores_non_finite() {
        assert_eq!(Sum.divisor(&[f64::NAN, 2.0, f64::INFINITY], &Identity), 2.0);
    }

    #[test]
    fn test_max_abs_divisor() {
        assert_eq!(MaxAbs.divisor(&[-5.0, 5.0, 10.0], &Identity), 10.0);
        assert_eq!(MaxAbs.divisor(&[-12.0, 5.0], &Identity), 12.0);
    }

    #[test]
    fn test_empty_batch() {
        let empty: [f64; 0] = [];
        assert_eq!(Sum.divisor(&empty, &Identity), 0.0);
        assert_eq!(MaxAbs.divisor(&empty, &Identity), 0.0);
        assert_eq!(Unit.divisor(&empty, &Identity), 1.0);
    }
}
