//! Algebraic properties of propagated values and errors.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use proptest::prelude::*;

use propeller_rs::{ev, Expr};

fn measurement() -> impl Strategy<Value = (f64, f64)> {
    (-100.0..100.0f64, 0.0..10.0f64)
}

/// Builds three leaves with pairwise distinct values, so no two are merged.
fn leaves(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<(Expr, Expr, Expr)> {
    if a.0 == b.0 || b.0 == c.0 || a.0 == c.0 {
        return None;
    }
    Some((ev(a.0, a.1), ev(b.0, b.1), ev(c.0, c.1)))
}

proptest! {
    #[test]
    fn addition_is_commutative(a in measurement(), b in measurement()) {
        let (x, y) = (ev(a.0, a.1), ev(b.0, b.1));
        let lhs = (&x + &y).eval().unwrap();
        let rhs = (&y + &x).eval().unwrap();
        assert_eq!(lhs.value, rhs.value);
        assert_relative_eq!(lhs.error, rhs.error, max_relative = 1e-12);
    }

    #[test]
    fn multiplication_is_commutative(a in measurement(), b in measurement()) {
        let (x, y) = (ev(a.0, a.1), ev(b.0, b.1));
        let lhs = (&x * &y).eval().unwrap();
        let rhs = (&y * &x).eval().unwrap();
        assert_eq!(lhs.value, rhs.value);
        assert_relative_eq!(lhs.error, rhs.error, max_relative = 1e-12);
    }

    #[test]
    fn addition_is_associative(a in measurement(), b in measurement(), c in measurement()) {
        prop_assume!(leaves(a, b, c).is_some());
        let (x, y, z) = leaves(a, b, c).unwrap();
        let lhs = ((&x + &y) + &z).eval().unwrap();
        let rhs = (&x + (&y + &z)).eval().unwrap();
        assert_abs_diff_eq!(lhs.value, rhs.value, epsilon = 1e-9);
        assert_relative_eq!(lhs.error, rhs.error, epsilon = 1e-12, max_relative = 1e-9);
    }

    #[test]
    fn multiplication_is_associative(a in measurement(), b in measurement(), c in measurement()) {
        prop_assume!(leaves(a, b, c).is_some());
        let (x, y, z) = leaves(a, b, c).unwrap();
        let lhs = ((&x * &y) * &z).eval().unwrap();
        let rhs = (&x * (&y * &z)).eval().unwrap();
        assert_relative_eq!(lhs.value, rhs.value, epsilon = 1e-9, max_relative = 1e-9);
        assert_relative_eq!(lhs.error, rhs.error, epsilon = 1e-9, max_relative = 1e-9);
    }

    #[test]
    fn multiplication_distributes_over_addition(a in measurement(), b in measurement(), c in measurement()) {
        prop_assume!(leaves(a, b, c).is_some());
        let (x, y, z) = leaves(a, b, c).unwrap();
        let lhs = (&x * (&y + &z)).eval().unwrap();
        let rhs = (&x * &y + &x * &z).eval().unwrap();
        assert_relative_eq!(lhs.value, rhs.value, epsilon = 1e-9, max_relative = 1e-9);
        assert_relative_eq!(lhs.error, rhs.error, epsilon = 1e-9, max_relative = 1e-9);
    }

    #[test]
    fn self_difference_vanishes(a in measurement()) {
        let x = ev(a.0, a.1);
        let r = (&x - &x).eval().unwrap();
        assert_eq!(r.value, 0.0);
        assert_eq!(r.error, 0.0);
    }

    #[test]
    fn constant_scaling(a in measurement(), k in -10.0..10.0f64) {
        let x = ev(a.0, a.1);
        let r = (&x * k).eval().unwrap();
        assert_eq!(r.value, a.0 * k);
        assert_relative_eq!(r.error, (a.1 * k).abs(), epsilon = 1e-12, max_relative = 1e-12);
    }

    #[test]
    fn independent_sum_adds_in_quadrature(a in measurement(), b in measurement()) {
        prop_assume!(a.0 != b.0);
        let (x, y) = (ev(a.0, a.1), ev(b.0, b.1));
        let r = (&x + &y).eval().unwrap();
        assert_relative_eq!(r.error, a.1.hypot(b.1), epsilon = 1e-12, max_relative = 1e-12);
    }
}
