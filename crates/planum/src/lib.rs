//! # Planum
//!
//! Multivariable calculus with exact arithmetic where it is available and
//! adaptive quadrature where it is not.
//!
//! ## Features
//!
//! - **Constrained expression grammar**: user text is parsed into a
//!   hash-consed arena, never evaluated as code
//! - **Exact calculus**: canonical expansion, differentiation and a table of
//!   closed-form antiderivatives over arbitrary precision rationals
//! - **Green's theorem**: rectangles, disks and right triangles with a LaTeX
//!   derivation for every step
//! - **Numeric fallbacks**: adaptive Gauss–Kronrod for polar double integrals,
//!   root isolation and multi-start Newton for optimization
//!
//! ## Quick Start
//!
//! ```
//! use planum::prelude::*;
//!
//! let region = Region::rectangle(
//!     Rational::from_integer(0),
//!     Rational::from_integer(2),
//!     Rational::from_integer(0),
//!     Rational::from_integer(3),
//! )
//! .unwrap();
//! let result = evaluate("x**2", "x*y", &region, &GreenOptions::default()).unwrap();
//! assert_eq!(result.exact_text, "9");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use planum_calculus as calculus;
pub use planum_core as core;
pub use planum_matrix as matrix;
pub use planum_optimize as optimize;
pub use planum_regions as regions;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use planum_calculus::{adaptive_integrate, Calculus, Expanded, QuadratureConfig};
    pub use planum_core::{parse_expression, ExprArena, ExprHandle, Rational, SymbolTable};
    pub use planum_matrix::{parse_matrix, verify_text, Matrix};
    pub use planum_optimize::{find_extrema, solve_lagrange, Dimension, ExtremaConfig, LagrangeConfig};
    pub use planum_regions::{evaluate, integrate_polar, GreenOptions, PolarProblem, Region};
}
