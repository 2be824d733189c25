//! Errors of the symbolic engine.

use planum_core::EvalError;
use thiserror::Error;

/// Failures of expansion, differentiation or exact integration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrationError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("{0} is undefined")]
    Undefined(String),

    #[error("{0} is not a real number")]
    NonReal(String),

    #[error("exponent {0} is too large to expand")]
    ExponentTooLarge(String),

    #[error("no closed-form antiderivative for {0}")]
    NoClosedForm(String),

    #[error("integral of {integrand} diverges on [{lower}, {upper}]")]
    Divergent {
        integrand: String,
        lower: String,
        upper: String,
    },

    #[error("numeric evaluation failed: {0}")]
    Eval(#[from] EvalError),
}

/// Shorthand for results of the symbolic engine.
pub type Result<T> = std::result::Result<T, IntegrationError>;
