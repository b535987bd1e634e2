//! Polynomial evaluator with a closed-form integral

use crate::{EvaluationError, Evaluator, Interval};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Polynomial `c0 + c1*x + c2*x^2 + ...`
///
/// Coefficients are stored in ascending power order.
///
/// # Examples
///
/// ```
/// use trapezium_domain::{Evaluator, Interval, Polynomial};
///
/// let f = Polynomial::new(vec![0.5, 3.0, 2.0]);
/// assert_eq!(f.to_string(), "2x^2 + 3x + 0.5");
/// assert_eq!(f.evaluate(2.0).unwrap(), 14.5);
///
/// let interval = Interval::new(2.0, 20.0).unwrap();
/// assert!((f.exact_integral(&interval) - 5931.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    /// Create a polynomial from ascending-power coefficients
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// Coefficients in ascending power order
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Horner evaluation
    pub fn value_at(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * x + c)
    }

    /// Value of the antiderivative with zero constant term
    pub fn antiderivative_at(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .enumerate()
            .rev()
            .fold(0.0, |acc, (power, c)| acc * x + c / (power + 1) as f64)
            * x
    }

    /// Closed-form definite integral over `interval`
    pub fn exact_integral(&self, interval: &Interval) -> f64 {
        self.antiderivative_at(interval.upper()) - self.antiderivative_at(interval.lower())
    }
}

impl Evaluator for Polynomial {
    fn evaluate(&self, x: f64) -> Result<f64, EvaluationError> {
        let value = self.value_at(x);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvaluationError::NonFinite { x, value })
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<(usize, f64)> = self
            .coefficients
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, c)| *c != 0.0)
            .rev()
            .collect();

        if terms.is_empty() {
            return f.write_str("0");
        }

        for (i, (power, c)) in terms.iter().enumerate() {
            let magnitude = if i == 0 { *c } else { c.abs() };
            if i > 0 {
                f.write_str(if *c < 0.0 { " - " } else { " + " })?;
            }

            let coefficient = match (*power, magnitude) {
                (0, m) => m.to_string(),
                (_, m) if m == 1.0 => String::new(),
                (_, m) if m == -1.0 => "-".to_string(),
                (_, m) => m.to_string(),
            };

            match power {
                0 => write!(f, "{}", coefficient)?,
                1 => write!(f, "{}x", coefficient)?,
                p => write!(f, "{}x^{}", coefficient, p)?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_at() {
        let f = Polynomial::new(vec![0.5, 3.0, 2.0]);
        assert_eq!(f.value_at(0.0), 0.5);
        assert_eq!(f.value_at(20.0), 860.5);
    }

    #[test]
    fn test_exact_integral() {
        let f = Polynomial::new(vec![0.5, 3.0, 2.0]);
        let interval = Interval::new(2.0, 20.0).unwrap();
        assert!((f.exact_integral(&interval) - 5931.0).abs() < 1e-9);

        let square = Polynomial::new(vec![0.0, 0.0, 1.0]);
        let unit = Interval::new(0.0, 1.0).unwrap();
        assert!((square.exact_integral(&unit) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        assert_eq!(Polynomial::new(vec![0.5, 3.0, 2.0]).to_string(), "2x^2 + 3x + 0.5");
        assert_eq!(Polynomial::new(vec![0.0, -1.0, 0.0, 1.0]).to_string(), "x^3 - x");
        assert_eq!(Polynomial::new(vec![-4.0]).to_string(), "-4");
        assert_eq!(Polynomial::new(vec![0.0, 0.0, -1.0]).to_string(), "-x^2");
        assert_eq!(Polynomial::new(vec![]).to_string(), "0");
    }

    #[test]
    fn test_describe_matches_display() {
        let f = Polynomial::new(vec![1.0, 1.0]);
        assert_eq!(f.describe(), "x + 1");
    }

    #[test]
    fn test_overflow_is_error() {
        let f = Polynomial::new(vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert!(matches!(f.evaluate(1e300), Err(EvaluationError::NonFinite { .. })));
    }
}
