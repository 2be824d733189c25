//! Numerical integration.
//!
//! Used where the exact engine does not apply: the polar double integral
//! takes user-supplied bounds that rarely admit closed forms, and numeric
//! values serve as a cross-check for exact results.
//!
//! # Example
//!
//! ```
//! use planum_calculus::numerical::{adaptive_integrate, QuadratureConfig};
//!
//! let result = adaptive_integrate(|x: f64| 1.0 / (1.0 + x * x), -10.0, 10.0, &QuadratureConfig::default());
//! assert!((result.value - 2.0 * 10.0_f64.atan()).abs() < 1e-9);
//! ```

pub mod adaptive;
pub mod gauss_kronrod;

use serde::{Deserialize, Serialize};

pub use adaptive::{adaptive_integrate, QuadratureResult};
pub use gauss_kronrod::{g7k15, RuleEstimate};

/// Tolerances for [`adaptive_integrate`], read from the `[quadrature]`
/// configuration section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadratureConfig {
    /// Absolute error tolerance.
    pub abs_tol: f64,
    /// Relative error tolerance.
    pub rel_tol: f64,
    /// Maximum number of bisections.
    pub max_subdivisions: usize,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self {
            abs_tol: 1e-10,
            rel_tol: 1e-10,
            max_subdivisions: 200,
        }
    }
}
