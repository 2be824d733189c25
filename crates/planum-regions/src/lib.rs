//! # planum-regions
//!
//! Double integrals over plane regions.
//!
//! - [`greens`]: Green's theorem for a vector field `(P, Q)` over a rectangle,
//!   a disk or a right triangle, integrated exactly with step-by-step output
//! - [`polar`]: numeric polar double integrals with user-supplied bounds
//! - [`plot`]: region outlines and their SVG rendering
//!
//! Every call builds its own [`planum_core::ExprArena`]; nothing is shared
//! between calls.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod field;
pub mod greens;
pub mod plot;
pub mod polar;
pub mod region;

#[cfg(test)]
mod proptests;

pub use error::{GreenError, QuadratureError, ShapeError};
pub use field::{Integrand, VectorField};
pub use greens::{evaluate, DiskMode, GreenOptions, IntegrationOrder, IntegrationResult, Step};
pub use plot::RegionPlot;
pub use polar::{integrate_polar, PolarProblem, PolarReport};
pub use region::{parse_parameter, Region};
