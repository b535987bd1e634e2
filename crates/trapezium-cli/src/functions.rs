//! Catalog of functions the CLI can integrate.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trapezium_domain::{EvaluationError, Evaluator, Interval, Polynomial};

/// Integrand selected on the command line or in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Integrand {
    /// Polynomial with coefficients in ascending power order
    Polynomial {
        /// `[c0, c1, c2, ...]` for `c0 + c1 x + c2 x^2 + ...`
        coefficients: Vec<f64>,
    },
    /// `sin(x)`
    Sin,
    /// `e^x`
    Exp,
    /// `sqrt(x)`, undefined for negative x
    Sqrt,
    /// `1/x`, undefined at zero
    Reciprocal,
}

impl Default for Integrand {
    /// `2x^2 + 3x + 0.5`
    fn default() -> Self {
        Integrand::Polynomial {
            coefficients: vec![0.5, 3.0, 2.0],
        }
    }
}

impl Integrand {
    /// Check the integrand can be evaluated.
    pub fn validate(&self) -> Result<()> {
        if let Integrand::Polynomial { coefficients } = self {
            if coefficients.is_empty() {
                return Err(CliError::InvalidInput(
                    "polynomial needs at least one coefficient".to_string(),
                ));
            }
            if coefficients.iter().any(|c| !c.is_finite()) {
                return Err(CliError::InvalidInput(
                    "polynomial coefficients must be finite".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Build the evaluator shared by the workers.
    pub fn evaluator(&self) -> Arc<dyn Evaluator> {
        match self {
            Integrand::Polynomial { coefficients } => {
                Arc::new(Polynomial::new(coefficients.clone()))
            }
            Integrand::Sin => Arc::new(Sin),
            Integrand::Exp => Arc::new(Exp),
            Integrand::Sqrt => Arc::new(Sqrt),
            Integrand::Reciprocal => Arc::new(Reciprocal),
        }
    }

    /// Closed-form integral over `interval`, when one exists.
    pub fn exact_integral(&self, interval: &Interval) -> Option<f64> {
        let (a, b) = (interval.lower(), interval.upper());
        match self {
            Integrand::Polynomial { coefficients } => {
                Some(Polynomial::new(coefficients.clone()).exact_integral(interval))
            }
            Integrand::Sin => Some(a.cos() - b.cos()),
            Integrand::Exp => Some(b.exp() - a.exp()),
            Integrand::Sqrt if a >= 0.0 => Some(2.0 / 3.0 * (b.powf(1.5) - a.powf(1.5))),
            // Both bounds on the same side of the pole
            Integrand::Reciprocal if a > 0.0 || b < 0.0 => Some((b / a).ln()),
            Integrand::Sqrt | Integrand::Reciprocal => None,
        }
    }
}

struct Sin;

impl Evaluator for Sin {
    fn evaluate(&self, x: f64) -> std::result::Result<f64, EvaluationError> {
        Ok(x.sin())
    }

    fn describe(&self) -> String {
        "sin(x)".to_string()
    }
}

struct Exp;

impl Evaluator for Exp {
    fn evaluate(&self, x: f64) -> std::result::Result<f64, EvaluationError> {
        let value = x.exp();
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvaluationError::NonFinite { x, value })
        }
    }

    fn describe(&self) -> String {
        "e^x".to_string()
    }
}

struct Sqrt;

impl Evaluator for Sqrt {
    fn evaluate(&self, x: f64) -> std::result::Result<f64, EvaluationError> {
        if x < 0.0 {
            return Err(EvaluationError::Domain {
                x,
                reason: "square root of a negative number".to_string(),
            });
        }
        Ok(x.sqrt())
    }

    fn describe(&self) -> String {
        "sqrt(x)".to_string()
    }
}

struct Reciprocal;

impl Evaluator for Reciprocal {
    fn evaluate(&self, x: f64) -> std::result::Result<f64, EvaluationError> {
        if x == 0.0 {
            return Err(EvaluationError::Domain {
                x,
                reason: "division by zero".to_string(),
            });
        }
        Ok(1.0 / x)
    }

    fn describe(&self) -> String {
        "1/x".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(a: f64, b: f64) -> Interval {
        Interval::new(a, b).unwrap()
    }

    #[test]
    fn test_default_is_quadratic() {
        let integrand = Integrand::default();
        assert_eq!(integrand.evaluator().describe(), "2x^2 + 3x + 0.5");
        let exact = integrand.exact_integral(&interval(2.0, 20.0)).unwrap();
        assert!((exact - 5931.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_polynomial_rejected() {
        let integrand = Integrand::Polynomial {
            coefficients: Vec::new(),
        };
        assert!(matches!(integrand.validate(), Err(CliError::InvalidInput(_))));
        assert!(Integrand::Sin.validate().is_ok());
    }

    #[test]
    fn test_exact_integrals() {
        let pi = std::f64::consts::PI;
        let sin = Integrand::Sin.exact_integral(&interval(0.0, pi)).unwrap();
        assert!((sin - 2.0).abs() < 1e-12);

        let exp = Integrand::Exp.exact_integral(&interval(0.0, 1.0)).unwrap();
        assert!((exp - (std::f64::consts::E - 1.0)).abs() < 1e-12);

        let sqrt = Integrand::Sqrt.exact_integral(&interval(0.0, 4.0)).unwrap();
        assert!((sqrt - 16.0 / 3.0).abs() < 1e-12);

        let recip = Integrand::Reciprocal.exact_integral(&interval(1.0, 2.0)).unwrap();
        assert!((recip - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_no_closed_form_across_singularity() {
        assert!(Integrand::Reciprocal.exact_integral(&interval(-1.0, 1.0)).is_none());
        assert!(Integrand::Sqrt.exact_integral(&interval(-1.0, 1.0)).is_none());
        let negative = Integrand::Reciprocal.exact_integral(&interval(-2.0, -1.0)).unwrap();
        assert!((negative + 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_domain_errors() {
        let sqrt = Integrand::Sqrt.evaluator();
        assert!(matches!(sqrt.evaluate(-1.0), Err(EvaluationError::Domain { .. })));
        assert_eq!(sqrt.evaluate(9.0).unwrap(), 3.0);

        let recip = Integrand::Reciprocal.evaluator();
        assert!(matches!(recip.evaluate(0.0), Err(EvaluationError::Domain { .. })));
        assert_eq!(recip.describe(), "1/x");

        assert!(matches!(
            Integrand::Exp.evaluator().evaluate(1000.0),
            Err(EvaluationError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_toml_shape() {
        let integrand: Integrand = toml::from_str("kind = \"polynomial\"\ncoefficients = [1.0, 0.0, 1.0]").unwrap();
        assert_eq!(
            integrand,
            Integrand::Polynomial {
                coefficients: vec![1.0, 0.0, 1.0]
            }
        );
        let integrand: Integrand = toml::from_str("kind = \"sin\"").unwrap();
        assert_eq!(integrand, Integrand::Sin);
    }
}
