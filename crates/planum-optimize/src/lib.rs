//! # planum-optimize
//!
//! Extrema of functions.
//!
//! - [`extrema`]: critical points of `f(x)` classified by the second-derivative
//!   test, exact where `f'` is a polynomial
//! - [`lagrange`]: stationary points of `f` subject to `g = 0` in two or three
//!   variables
//! - [`poly`]: the dense rational polynomials behind exact root finding
//!
//! ```
//! use planum_optimize::{find_extrema, Classification, ExtremaConfig};
//!
//! let report = find_extrema("x**3 - 3*x + 2", &ExtremaConfig::default()).unwrap();
//! assert_eq!(report.points[0].classification, Classification::Maximum);
//! assert_eq!(report.points[1].classification, Classification::Minimum);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod extrema;
pub mod lagrange;
mod newton;
pub mod poly;

#[cfg(test)]
mod proptests;

pub use error::{OptimizeError, Result};
pub use extrema::{find_extrema, Classification, CriticalPoint, ExtremaConfig, ExtremaReport, RootMethod};
pub use lagrange::{solve_lagrange, Dimension, LagrangeConfig, LagrangeReport, SolveMethod, Solution};
pub use poly::DensePoly;

/// Formats a numeric result with at most ten decimals and no trailing zeros.
pub(crate) fn numeric_text(value: f64) -> String {
    let text = format!("{value:.10}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::numeric_text;

    #[test]
    fn test_numeric_text() {
        assert_eq!(numeric_text(0.5), "0.5");
        assert_eq!(numeric_text(2.0), "2");
        assert_eq!(numeric_text(-1e-12), "0");
        assert_eq!(numeric_text(std::f64::consts::PI), "3.1415926536");
    }
}
