//! Error types for region integrals.

use planum_calculus::IntegrationError;
use planum_core::{EvalError, ParseError};
use thiserror::Error;

/// Invalid region parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// A parameter is not a decimal number.
    #[error("{name} = {text:?} is not a number")]
    InvalidNumber {
        /// Parameter name.
        name: &'static str,
        /// The rejected text.
        text: String,
    },

    /// Rectangle bounds in the wrong order.
    #[error("rectangle needs {low_name} <= {high_name}, got {low} > {high}")]
    Reversed {
        /// Name of the lower bound.
        low_name: &'static str,
        /// Name of the upper bound.
        high_name: &'static str,
        /// Lower bound as given.
        low: String,
        /// Upper bound as given.
        high: String,
    },

    /// A length that must be strictly positive.
    #[error("{name} must be positive, got {value}")]
    NotPositive {
        /// Parameter name.
        name: &'static str,
        /// The value given.
        value: String,
    },
}

/// Failures of the Green's theorem pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GreenError {
    #[error("cannot parse {component}: {source}")]
    Parse {
        component: &'static str,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Integration(#[from] IntegrationError),
}

/// Failures of the polar double integral.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuadratureError {
    #[error("cannot parse {component}: {source}")]
    Parse {
        component: &'static str,
        #[source]
        source: ParseError,
    },

    #[error("{component} at theta = {theta}: {source}")]
    Eval {
        component: &'static str,
        theta: f64,
        #[source]
        source: EvalError,
    },

    #[error("theta bounds must be finite, got [{min}, {max}]")]
    InvalidBounds { min: f64, max: f64 },
}
