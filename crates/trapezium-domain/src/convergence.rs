//! Rounded comparison of consecutive estimates

use serde::{Deserialize, Serialize};

/// Round `value` to `digits` decimal places (half away from zero)
///
/// # Examples
///
/// ```
/// use trapezium_domain::round_to;
///
/// assert_eq!(round_to(3.14159, 4), 3.1416);
/// assert_eq!(round_to(-2.5, 0), -3.0);
/// ```
pub fn round_to(value: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits as i32);
    (value * scale).round() / scale
}

/// Previous and current estimate, both rounded
///
/// `previous` is `None` until the first estimate has been observed, so the
/// very first iteration can never converge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceState {
    /// Number of decimal digits compared
    pub digits: u32,
    /// Last accepted estimate, rounded
    pub previous: Option<f64>,
    /// Most recent estimate, rounded
    pub current: Option<f64>,
}

impl ConvergenceState {
    /// Start with no history
    pub fn new(digits: u32) -> Self {
        Self {
            digits,
            previous: None,
            current: None,
        }
    }

    /// Record a new estimate and report whether it matches the previous one
    ///
    /// # Examples
    ///
    /// ```
    /// use trapezium_domain::ConvergenceState;
    ///
    /// let mut state = ConvergenceState::new(4);
    /// assert!(!state.observe(1.00004));
    /// assert!(state.observe(0.99996));
    /// ```
    pub fn observe(&mut self, area: f64) -> bool {
        let rounded = round_to(area, self.digits);
        self.previous = self.current;
        self.current = Some(rounded);
        self.is_converged()
    }

    /// Both values are present and equal
    pub fn is_converged(&self) -> bool {
        matches!((self.previous, self.current), (Some(p), Some(c)) if p == c)
    }
}
