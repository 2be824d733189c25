//! Errors raised by the expression core.

use thiserror::Error;

/// Why a user string could not be turned into an expression.
///
/// Offsets are byte positions into the original input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input was blank.
    #[error("empty expression")]
    Empty,

    /// A token appeared where the grammar does not allow it.
    #[error("unexpected {found} at position {offset}")]
    Unexpected {
        /// Where parsing stopped.
        offset: usize,
        /// The offending character, quoted, or `end of input`.
        found: String,
    },

    /// A name that is neither a declared variable nor `pi`.
    #[error("unknown symbol '{name}' at position {offset}")]
    UnknownSymbol {
        /// The name as typed.
        name: String,
        /// Where it starts.
        offset: usize,
    },

    /// A call to something outside the function whitelist.
    #[error("unknown function '{name}' at position {offset}")]
    UnknownFunction {
        /// The name as typed.
        name: String,
        /// Where it starts.
        offset: usize,
    },

    /// A function name used without an argument list.
    #[error("function '{name}' at position {offset} needs an argument")]
    MissingArgument {
        /// The function name.
        name: String,
        /// Where it starts.
        offset: usize,
    },

    /// A numeric literal that could not be read exactly.
    #[error("invalid number '{text}' at position {offset}")]
    InvalidNumber {
        /// The literal as typed.
        text: String,
        /// Where it starts.
        offset: usize,
    },

    /// Parentheses, calls, signs or exponents nested too deeply.
    #[error("expression nested deeper than {limit} levels at position {offset}")]
    TooDeep {
        /// Where the limit was hit.
        offset: usize,
        /// The nesting limit.
        limit: usize,
    },
}

/// Failures of floating-point evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The expression mentions a symbol with no bound value.
    #[error("no value bound for symbol '{0}'")]
    Unbound(String),

    /// The result was NaN or infinite.
    #[error("expression is not finite at the requested point")]
    NonFinite,
}
