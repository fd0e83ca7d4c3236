//! Error types.
//!
//! Evaluation failures are split into [`DomainError`] (the numbers left the
//! domain of an operator) and [`SymbolicError`] (the symbolic engine rejected
//! a formula or term). Neither is ever turned into a NaN or infinity.

use thiserror::Error;

/// Errors surfaced by [`Expr::nominal`][crate::ast::Expr::nominal] and
/// [`Expr::propagated_error`][crate::ast::Expr::propagated_error].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The symbolic engine failed. For rendered formulas this means the
    /// renderer and the engine disagree on the grammar.
    #[error("symbolic engine failure: {0}")]
    Symbolic(#[from] SymbolicError),

    #[error("expression depth {depth} exceeds the limit of {limit}")]
    TooDeep { depth: usize, limit: usize },

    #[error("formula references unknown variable `{0}`")]
    UnknownVariable(String),
}

impl Error {
    /// Returns `true` if this is a [`DomainError`].
    pub fn is_domain(&self) -> bool {
        matches!(self, Error::Domain(_))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("logarithm of non-positive value {value}")]
    LogOfNonPositive { value: f64 },

    #[error("zero raised to negative power {exponent}")]
    ZeroToNegativePower { exponent: f64 },

    #[error("`{op}` produced a non-finite result")]
    NonFinite { op: &'static str },

    #[error("partial derivative with respect to `{variable}` evaluated to {value}")]
    NonFiniteDerivative { variable: String, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SymbolicError {
    #[error("parse error at position {position}: {message}")]
    Parse { message: String, position: usize },

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("symbol `{0}` has no value bound")]
    Unbound(String),
}
