//! # planum-core
//!
//! Expression engine shared by every planum calculator.
//!
//! This crate provides:
//! - Exact rational numbers backed by `dashu`
//! - Arena-allocated expression storage with hash-consing
//! - A whitelist parser for user formulas (`nom`)
//! - LaTeX and plain-text printers
//! - Floating-point evaluation
//!
//! ## Design Principles
//!
//! - **One arena per calculation**: nothing is shared between requests
//! - **Hash-Consing**: every structurally unique expression is stored once
//! - **No code execution**: input is parsed against a fixed grammar and
//!   resolved against an explicit [`SymbolTable`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod error;
pub mod eval;
pub mod expr;
pub mod handle;
pub mod intern;
pub mod parser;
pub mod printer;
pub mod rational;
pub mod symbols;

#[cfg(test)]
mod proptests;

pub use arena::ExprArena;
pub use error::{EvalError, ParseError};
pub use eval::{evaluate, Bindings};
pub use expr::{Constant, ExprNode, Func, SymbolId};
pub use handle::ExprHandle;
pub use parser::{parse_constant, parse_expression, MAX_DEPTH};
pub use printer::Notation;
pub use rational::{Rational, MAX_DECIMAL_SCALE};
pub use symbols::SymbolTable;
