//! Integration interval and uniform partitioning

use crate::{DomainError, TrapezoidTask};
use serde::{Deserialize, Serialize};

/// Closed integration domain `[lower, upper]` with `lower < upper`
///
/// # Examples
///
/// ```
/// use trapezium_domain::Interval;
///
/// let interval = Interval::new(2.0, 20.0).unwrap();
/// assert_eq!(interval.length(), 18.0);
///
/// assert!(Interval::new(5.0, 5.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    lower: f64,
    upper: f64,
}

impl Interval {
    /// Create a new interval, rejecting non-finite or non-increasing bounds
    pub fn new(lower: f64, upper: f64) -> Result<Self, DomainError> {
        let reason = if !lower.is_finite() || !upper.is_finite() {
            Some("bounds must be finite")
        } else if lower >= upper {
            Some("lower bound must be strictly less than upper bound")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(DomainError::InvalidInterval {
                lower,
                upper,
                reason: reason.to_string(),
            }),
            None => Ok(Self { lower, upper }),
        }
    }

    /// Lower bound
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper bound
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// `upper - lower`
    pub fn length(&self) -> f64 {
        self.upper - self.lower
    }

    /// Uniform subinterval width for `n` partitions
    pub fn width(&self, n: usize) -> Result<f64, DomainError> {
        if n == 0 {
            return Err(DomainError::InvalidPartitionCount(n));
        }
        Ok(self.length() / n as f64)
    }

    /// Split the interval into `n` contiguous trapezoid tasks
    ///
    /// Task `i` spans `[lower + i*w, lower + (i+1)*w]`. Neighbouring tasks
    /// share endpoints exactly and the last task ends at `upper`.
    pub fn partition(&self, n: usize) -> Result<Vec<TrapezoidTask>, DomainError> {
        let width = self.width(n)?;

        let tasks = (0..n)
            .map(|i| {
                let x1 = self.lower + i as f64 * width;
                let x2 = if i + 1 == n {
                    self.upper
                } else {
                    self.lower + (i + 1) as f64 * width
                };
                TrapezoidTask::new(x1, x2, width)
            })
            .collect();

        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_interval_creation() {
        let interval = Interval::new(2.0, 20.0).unwrap();
        assert_eq!(interval.lower(), 2.0);
        assert_eq!(interval.upper(), 20.0);
        assert_eq!(interval.length(), 18.0);
    }

    #[test]
    fn test_reversed_bounds_rejected() {
        let err = Interval::new(20.0, 2.0).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInterval { .. }));
        assert!(err.to_string().contains("strictly less"));
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        assert!(Interval::new(f64::NAN, 1.0).is_err());
        assert!(Interval::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_zero_partitions_rejected() {
        let interval = Interval::new(0.0, 1.0).unwrap();
        assert_eq!(
            interval.partition(0).unwrap_err(),
            DomainError::InvalidPartitionCount(0)
        );
    }

    #[test]
    fn test_single_partition_covers_interval() {
        let interval = Interval::new(2.0, 20.0).unwrap();
        let tasks = interval.partition(1).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].x1, 2.0);
        assert_eq!(tasks[0].x2, 20.0);
        assert_eq!(tasks[0].width, 18.0);
    }

    #[test]
    fn test_partition_is_contiguous() {
        let interval = Interval::new(-1.0, 3.0).unwrap();
        let tasks = interval.partition(8).unwrap();
        assert_eq!(tasks.len(), 8);
        for pair in tasks.windows(2) {
            assert_eq!(pair[0].x2, pair[1].x1);
        }
        assert_eq!(tasks[0].x1, -1.0);
        assert_eq!(tasks[7].x2, 3.0);
    }

    proptest! {
        #[test]
        fn prop_partition_tiles_interval(
            lower in -1.0e3f64..1.0e3,
            length in 1.0e-3f64..1.0e3,
            n in 1usize..500,
        ) {
            let upper = lower + length;
            prop_assume!(lower < upper);
            let interval = Interval::new(lower, upper).unwrap();
            let tasks = interval.partition(n).unwrap();

            prop_assert_eq!(tasks.len(), n);
            prop_assert_eq!(tasks[0].x1, lower);
            prop_assert_eq!(tasks[n - 1].x2, upper);

            for pair in tasks.windows(2) {
                prop_assert_eq!(pair[0].x2, pair[1].x1);
            }
            for task in &tasks {
                prop_assert!(task.x1 < task.x2);
                prop_assert!(task.width > 0.0);
            }

            let covered: f64 = tasks.iter().map(|t| t.x2 - t.x1).sum();
            let tolerance = 1e-9 * (1.0 + lower.abs() + upper.abs()) * n as f64;
            prop_assert!((covered - interval.length()).abs() <= tolerance);
        }
    }
}
