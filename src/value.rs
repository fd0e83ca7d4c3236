//! Error-bearing values.
//!
//! An [`ErrVal`] is a nominal value together with its absolute one-sigma
//! uncertainty. It is both the payload of a measured leaf and the result of
//! evaluating an [`Expr`][crate::ast::Expr].

use std::cmp::Ordering;
use std::fmt;

/// A nominal value with an absolute one-sigma error.
///
/// # Invariants
///
/// - `error >= 0` (negative errors are stored as their absolute value)
///
/// # Equality
///
/// Two values are equal iff both `value` and `error` are exactly equal. The
/// propagator relies on this to recognize repeated uses of one variable, see
/// [`Deduplication`][crate::propagate::Deduplication]. Comparing against a
/// plain `f64` looks at the nominal value only.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ErrVal {
    pub value: f64,
    pub error: f64,
}

impl ErrVal {
    /// Creates a new value, normalizing `error` to `|error|`.
    pub fn new(value: f64, error: f64) -> Self {
        Self {
            value,
            error: error.abs(),
        }
    }

    /// Creates a value without uncertainty.
    pub fn exact(value: f64) -> Self {
        Self { value, error: 0.0 }
    }

    /// Relative error `error / |value|`.
    pub fn relative_error(&self) -> f64 {
        self.error / self.value.abs()
    }

    /// Checks whether the two values agree within their combined errors.
    pub fn within_deviation(&self, other: &ErrVal) -> bool {
        (self.value - other.value).abs() < self.error + other.error
    }

    /// The value cut to the decimal place of the error's leading digit.
    ///
    /// An error larger in magnitude than the value rounds to whole units.
    /// Exact and non-finite values are returned unchanged.
    ///
    /// ```
    /// use propeller_rs::ErrVal;
    ///
    /// assert_eq!(ErrVal::new(1234.5678, 0.023).rounded(), 1234.6);
    /// assert_eq!(ErrVal::new(1234.0, 56.0).rounded(), 1230.0);
    /// ```
    pub fn rounded(&self) -> f64 {
        if self.error == 0.0 || !self.value.is_finite() || !self.error.is_finite() {
            return self.value;
        }
        let error_magn = magnitude(self.error);
        let digits = if error_magn <= magnitude(self.value) { -error_magn } else { 0 };
        round_to(self.value, digits)
    }
}

impl From<f64> for ErrVal {
    fn from(value: f64) -> Self {
        ErrVal::exact(value)
    }
}

impl From<(f64, f64)> for ErrVal {
    fn from((value, error): (f64, f64)) -> Self {
        ErrVal::new(value, error)
    }
}

impl PartialEq<f64> for ErrVal {
    fn eq(&self, other: &f64) -> bool {
        self.value == *other
    }
}

/// Orders by nominal value. Values with equal nominal values but different
/// errors are unordered, so `<=` holds only for `<` or full equality.
impl PartialOrd for ErrVal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.value.partial_cmp(&other.value)? {
            Ordering::Equal if self.error != other.error => None,
            ordering => Some(ordering),
        }
    }
}

impl PartialOrd<f64> for ErrVal {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.value.partial_cmp(other)
    }
}

/// Truncated decimal order of magnitude of `x` (0 for zero or non-finite).
///
/// ```text
/// 1234.0 -> 3,  0.05 -> -1,  0.5 -> 0
/// ```
pub fn magnitude(x: f64) -> i32 {
    if x == 0.0 || !x.is_finite() {
        return 0;
    }
    x.abs().log10().trunc() as i32
}

/// Rounds `x` to `digits` decimal places (negative means tens, hundreds, ...).
fn round_to(x: f64, digits: i32) -> f64 {
    let p = 10f64.powi(digits.abs());
    if digits >= 0 {
        (x * p).round() / p
    } else {
        (x / p).round() * p
    }
}

/// Formats the value rounded to the leading digits of the error.
///
/// ```text
/// ErrVal::new(1.0, 2.0)      -> "1 ± 2"
/// ErrVal::new(1500.0, 230.0) -> "(15 ± 2.3)e2"
/// ```
impl fmt::Display for ErrVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.value.is_finite() || !self.error.is_finite() {
            return write!(f, "{} ± {}", self.value, self.error);
        }

        let error_magn = magnitude(self.error);
        let value_magn = magnitude(self.value);

        let value = round_to(self.value, 1 - error_magn);
        let error = round_to(self.error, 1 - error_magn);

        if error_magn == 0 || value_magn == 0 {
            return write!(f, "{} ± {}", value, error);
        }

        let scale = 10f64.powi(-error_magn);
        write!(
            f,
            "({} ± {})e{}",
            round_to(value * scale, 1),
            round_to(error * scale, 1),
            error_magn
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_new_normalizes_error() {
        let a = ErrVal::new(1.0, -2.0);
        assert_eq!(a.value, 1.0);
        assert_eq!(a.error, 2.0);
    }

    #[test]
    fn test_exact() {
        let a = ErrVal::exact(3.5);
        assert_eq!(a.error, 0.0);
        assert_eq!(ErrVal::from(3.5), a);
        assert_eq!(ErrVal::from((1.0, -0.5)), ErrVal::new(1.0, 0.5));
    }

    #[test]
    fn test_equality_is_exact_on_both_fields() {
        assert_eq!(ErrVal::new(1.0, 2.0), ErrVal::new(1.0, 2.0));
        assert_ne!(ErrVal::new(1.0, 2.0), ErrVal::new(1.0, 2.000001));
        assert_ne!(ErrVal::new(1.0, 2.0), ErrVal::new(1.000001, 2.0));
    }

    #[test]
    fn test_equality_with_number_ignores_error() {
        assert_eq!(ErrVal::new(1.0, 2.0), 1.0);
        assert_ne!(ErrVal::new(1.0, 2.0), 2.0);
    }

    #[test]
    fn test_ordering_by_value() {
        let a = ErrVal::new(1.0, 5.0);
        let b = ErrVal::new(2.0, 0.1);
        assert!(a < b);
        assert!(b > a);
        assert!(a <= b);
        assert!(!(a >= b));
    }

    #[test]
    fn test_ordering_equal_values_different_errors() {
        let a = ErrVal::new(1.0, 1.0);
        let b = ErrVal::new(1.0, 2.0);
        assert!(!(a < b));
        assert!(!(a > b));
        assert!(!(a <= b));
        assert!(!(a >= b));
        assert!(a <= ErrVal::new(1.0, 1.0));
    }

    #[test]
    fn test_ordering_with_number() {
        let a = ErrVal::new(1.0, 2.0);
        assert!(a < 1.5);
        assert!(a > 0.5);
        assert!(a <= 1.0);
        assert!(a >= 1.0);
    }

    #[test]
    fn test_within_deviation() {
        let a = ErrVal::new(1.0, 0.5);
        assert!(a.within_deviation(&ErrVal::new(1.8, 0.5)));
        assert!(!a.within_deviation(&ErrVal::new(2.0, 0.5)));
    }

    #[test]
    fn test_relative_error() {
        assert_eq!(ErrVal::new(-4.0, 1.0).relative_error(), 0.25);
    }

    #[test]
    fn test_magnitude() {
        assert_eq!(magnitude(0.0), 0);
        assert_eq!(magnitude(1234.0), 3);
        assert_eq!(magnitude(-1234.0), 3);
        assert_eq!(magnitude(0.5), 0);
        assert_eq!(magnitude(0.05), -1);
        assert_eq!(magnitude(f64::INFINITY), 0);
    }

    #[test]
    fn test_rounded() {
        assert_eq!(ErrVal::new(1234.5678, 0.023).rounded(), 1234.6);
        assert_eq!(ErrVal::new(1500.0, 230.0).rounded(), 1500.0);
        assert_eq!(ErrVal::new(1234.0, 56.0).rounded(), 1230.0);
        assert_eq!(ErrVal::new(-1.26, 0.5).rounded(), -1.0);
        assert_eq!(ErrVal::new(3.7, 20.0).rounded(), 4.0);
        assert_eq!(ErrVal::exact(0.123456).rounded(), 0.123456);
        assert_eq!(ErrVal::new(2.5, f64::INFINITY).rounded(), 2.5);
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrVal::new(1.0, 2.0).to_string(), "1 ± 2");
        assert_eq!(ErrVal::new(1500.0, 230.0).to_string(), "(15 ± 2.3)e2");
        assert_eq!(ErrVal::new(0.25, 0.5).to_string(), "0.3 ± 0.5");
    }
}
