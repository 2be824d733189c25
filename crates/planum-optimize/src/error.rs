//! Errors of the optimizers.

use planum_calculus::IntegrationError;
use planum_core::ParseError;
use thiserror::Error;

/// Failures of extremum search and the Lagrange solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    #[error("cannot parse {component}: {source}")]
    Parse {
        component: &'static str,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Calculus(#[from] IntegrationError),

    #[error("search interval must be finite and non-empty, got [{min}, {max}]")]
    InvalidInterval { min: f64, max: f64 },

    #[error("at least 2 samples are needed, got {0}")]
    TooFewSamples(usize),
}

/// Shorthand for optimizer results.
pub type Result<T> = std::result::Result<T, OptimizeError>;
