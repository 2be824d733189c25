//! # planum-matrix
//!
//! Exact rational matrices.
//!
//! - [`Matrix`]: dense row-major storage with products, row reduction,
//!   exact linear solves and determinants
//! - [`parse_matrix`]: reads a square matrix from rows of text
//! - [`cayley`]: characteristic polynomials and the Cayley–Hamilton check
//!
//! ```
//! use planum_matrix::verify_text;
//!
//! let report = verify_text("2 1\n1 2").unwrap();
//! assert_eq!(report.polynomial, "x**2 - 4*x + 3");
//! assert!(report.verified);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cayley;
pub mod error;
pub mod matrix;
pub mod parse;

#[cfg(test)]
mod proptests;

pub use cayley::{characteristic_polynomial, evaluate_polynomial, verify, verify_text, CayleyHamiltonReport};
pub use error::MatrixError;
pub use matrix::Matrix;
pub use parse::parse_matrix;
