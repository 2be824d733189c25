//! Symbolic calculus for planum.
//!
//! Works on expressions stored in a [`planum_core::ExprArena`], through a
//! [`Calculus`] engine that borrows the arena for the length of one request.
//!
//! # Quick Start
//!
//! ```
//! use planum_calculus::Calculus;
//! use planum_core::{parse_expression, ExprArena, SymbolTable};
//!
//! let mut arena = ExprArena::new();
//! let f = parse_expression(&mut arena, "x*sin(x)", &SymbolTable::new(["x"])).unwrap();
//!
//! let mut calc = Calculus::new(&mut arena);
//! let x = calc.variable("x");
//! let f = calc.expand(f).unwrap();
//! let antiderivative = calc.antiderivative(&f, x).unwrap();
//! assert_eq!(calc.diff(&antiderivative, x).unwrap(), f);
//! ```
//!
//! # Features
//!
//! - **Canonical form**: sums of rational multiples of atom products, so
//!   symbolic equality is structural equality of [`Expanded`] values
//! - **Differentiation**: product and chain rules over every atom kind
//! - **Exact integration**: power rule, tabular integration by parts,
//!   trigonometric linearization, `tan` and `log`
//! - **Interval checks**: poles and branch cuts on the path of a definite
//!   integral
//! - **Numerical integration**: adaptive Gauss–Kronrod quadrature

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod diff;
pub mod engine;
pub mod error;
pub mod expanded;
pub mod integrate;
pub mod numerical;
pub mod singular;
pub mod trig;

#[cfg(test)]
mod proptests;

pub use engine::{Calculus, MAX_EXPANSION_POWER, MAX_EXPONENT};
pub use error::{IntegrationError, Result};
pub use expanded::{Expanded, Monomial};
pub use numerical::{adaptive_integrate, QuadratureConfig, QuadratureResult};
pub use singular::Singularity;
pub use trig::MAX_TRIG_DEGREE;
