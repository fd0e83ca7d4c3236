//! Element-wise helpers for arrays of measurements.
//!
//! Nothing here is vectorized arithmetic: every element is an independent
//! scalar [`Expr`], built and evaluated on its own.
//!
//! ```
//! use propeller_rs::vector::{broadcast, evaluate_all, ezip, values};
//!
//! let xs = ezip(&[1.0, 2.0, 3.0], &[0.1, 0.1, 0.2]);
//! let ys = broadcast(&xs, |x| x * 2.0 + 1.0);
//! let results = evaluate_all(&ys).unwrap();
//! assert_eq!(values(&results), vec![3.0, 5.0, 7.0]);
//! ```

use crate::ast::Expr;
use crate::error::Error;
use crate::value::ErrVal;

/// Pairs `values[i]` with `errors[i]` into measured leaves.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn ezip(values: &[f64], errors: &[f64]) -> Vec<Expr> {
    assert_eq!(values.len(), errors.len(), "values and errors differ in length");
    values
        .iter()
        .zip(errors)
        .map(|(&value, &error)| Expr::measured(value, error))
        .collect()
}

/// Measured leaves sharing one error.
pub fn with_const_error(values: &[f64], error: f64) -> Vec<Expr> {
    values.iter().map(|&value| Expr::measured(value, error)).collect()
}

/// Applies a scalar builder to every element.
pub fn broadcast<F>(inputs: &[Expr], f: F) -> Vec<Expr>
where
    F: FnMut(&Expr) -> Expr,
{
    inputs.iter().map(f).collect()
}

/// Evaluates every element, stopping at the first failure.
pub fn evaluate_all(exprs: &[Expr]) -> Result<Vec<ErrVal>, Error> {
    exprs.iter().map(Expr::eval).collect()
}

/// Splits results into nominal values and errors.
pub fn unzip(results: &[ErrVal]) -> (Vec<f64>, Vec<f64>) {
    results.iter().map(|r| (r.value, r.error)).unzip()
}

pub fn values(results: &[ErrVal]) -> Vec<f64> {
    results.iter().map(|r| r.value).collect()
}

pub fn errors(results: &[ErrVal]) -> Vec<f64> {
    results.iter().map(|r| r.error).collect()
}
