//! The symbolic engine behind error propagation.
//!
//! Propagation needs exactly four capabilities from a computer-algebra
//! system, captured by [`SymbolicEngine`]:
//!
//! 1. parse an infix formula into a term,
//! 2. differentiate a term with respect to a named symbol,
//! 3. substitute numbers for named symbols,
//! 4. evaluate a closed term to an `f64`.
//!
//! [`Calculus`] is the built-in implementation over [`Term`][term::Term].
//! Any other engine can be plugged into a
//! [`Propagator`][crate::propagate::Propagator] via
//! [`with_engine`][crate::propagate::Propagator::with_engine].
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use propeller_rs::symbolic::{Calculus, SymbolicEngine};
//!
//! let engine = Calculus;
//! let term = engine.parse("(x0 * sin(x1))").unwrap();
//! let d = engine.differentiate(&term, "x1").unwrap();
//! let at = HashMap::from([("x0".to_string(), 2.0), ("x1".to_string(), 0.0)]);
//! let value = engine.evaluate(&engine.substitute(&d, &at).unwrap()).unwrap();
//! assert_eq!(value, 2.0);
//! ```

use std::collections::HashMap;

use crate::error::SymbolicError;

pub mod diff;
pub mod lexer;
pub mod parser;
pub mod term;

use self::term::Term;

/// A computer-algebra backend.
///
/// Failures of any step are reported as [`SymbolicError`] and never masked
/// by the caller.
pub trait SymbolicEngine {
    type Term;

    fn parse(&self, formula: &str) -> Result<Self::Term, SymbolicError>;

    fn differentiate(&self, term: &Self::Term, var: &str) -> Result<Self::Term, SymbolicError>;

    fn substitute(&self, term: &Self::Term, bindings: &HashMap<String, f64>) -> Result<Self::Term, SymbolicError>;

    /// Evaluates a closed term. NaN and infinity are valid results here;
    /// the caller decides whether they are errors.
    fn evaluate(&self, term: &Self::Term) -> Result<f64, SymbolicError>;
}

/// Built-in symbolic engine: operator-precedence parsing and textbook
/// derivative rules over the [`Term`] arena.
#[derive(Debug, Copy, Clone, Default)]
pub struct Calculus;

impl SymbolicEngine for Calculus {
    type Term = Term;

    fn parse(&self, formula: &str) -> Result<Term, SymbolicError> {
        parser::parse(formula)
    }

    fn differentiate(&self, term: &Term, var: &str) -> Result<Term, SymbolicError> {
        Ok(diff::differentiate(term, var))
    }

    fn substitute(&self, term: &Term, bindings: &HashMap<String, f64>) -> Result<Term, SymbolicError> {
        Ok(term.substitute(bindings))
    }

    fn evaluate(&self, term: &Term) -> Result<f64, SymbolicError> {
        term.evaluate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_calculus_pipeline() {
        let engine = Calculus;
        let term = engine.parse("((x0 ^ 2) + (x0 * x1))").unwrap();
        let d = engine.differentiate(&term, "x0").unwrap();
        let at = HashMap::from([("x0".to_string(), 3.0), ("x1".to_string(), 5.0)]);
        let value = engine.evaluate(&engine.substitute(&d, &at).unwrap()).unwrap();
        assert_eq!(value, 11.0);
    }

    #[test]
    fn test_calculus_unbound_symbol() {
        let engine = Calculus;
        let term = engine.parse("(x0 + x1)").unwrap();
        let at = HashMap::from([("x0".to_string(), 3.0)]);
        let partial = engine.substitute(&term, &at).unwrap();
        assert_eq!(
            engine.evaluate(&partial),
            Err(SymbolicError::Unbound("x1".to_string()))
        );
    }

    #[test]
    fn test_calculus_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Calculus>();
        assert_send_sync::<Term>();
    }
}
