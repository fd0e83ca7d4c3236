//! End-to-end tests of value and error propagation.

use approx::assert_relative_eq;

use propeller_rs::error::DomainError;
use propeller_rs::{ev, Deduplication, ErrVal, Error, Expr, PropagationConfig};

use test_log::test;

// ─── Elementary Cases ──────────────────────────────────────────────────────────

#[test]
fn sum_of_two_measurements() {
    let a = ev(1.0, 2.0);
    let b = ev(2.0, 3.0);
    let r = (&a + &b).eval().unwrap();
    assert_eq!(r.value, 3.0);
    assert_relative_eq!(r.error, 13f64.sqrt(), max_relative = 1e-12);
}

#[test]
fn scaling_by_constant() {
    let a = ev(1.0, 2.0);
    assert_eq!((&a * 2.0).eval(), Ok(ErrVal::new(2.0, 4.0)));
}

#[test]
fn self_difference_is_exact() {
    let a = ev(1.0, 2.0);
    assert_eq!((&a - &a).eval(), Ok(ErrVal::new(0.0, 0.0)));
}

#[test]
fn negative_error_is_normalized() {
    let a = ev(1.0, -2.0);
    assert_eq!(a.eval(), Ok(ErrVal::new(1.0, 2.0)));
}

#[test]
fn single_leaf_keeps_its_error() {
    assert_eq!(ev(5.0, 0.25).eval(), Ok(ErrVal::new(5.0, 0.25)));
    assert_eq!(Expr::constant(5.0).eval(), Ok(ErrVal::new(5.0, 0.0)));
}

// ─── Functions ─────────────────────────────────────────────────────────────────

#[test]
fn product_of_measurements() {
    // s^2 = (b s_a)^2 + (a s_b)^2
    let a = ev(3.0, 0.1);
    let b = ev(4.0, 0.2);
    let r = (&a * &b).eval().unwrap();
    assert_eq!(r.value, 12.0);
    assert_relative_eq!(r.error, (0.4f64.powi(2) + 0.6f64.powi(2)).sqrt(), max_relative = 1e-12);
}

#[test]
fn quotient_of_measurements() {
    let a = ev(3.0, 0.1);
    let b = ev(4.0, 0.2);
    let r = (&a / &b).eval().unwrap();
    assert_eq!(r.value, 0.75);
    let expected = ((0.1 / 4.0f64).powi(2) + (3.0 * 0.2 / 16.0f64).powi(2)).sqrt();
    assert_relative_eq!(r.error, expected, max_relative = 1e-12);
}

#[test]
fn elementary_functions() {
    let x = 0.5;
    let s = 0.01;
    let a = ev(x, s);
    assert_relative_eq!(a.exp().propagated_error().unwrap(), x.exp() * s, max_relative = 1e-12);
    assert_relative_eq!(a.ln().propagated_error().unwrap(), s / x, max_relative = 1e-12);
    assert_relative_eq!(a.log10().propagated_error().unwrap(), s / (x * std::f64::consts::LN_10), max_relative = 1e-12);
    assert_relative_eq!(a.sin().propagated_error().unwrap(), x.cos() * s, max_relative = 1e-12);
    assert_relative_eq!(a.cos().propagated_error().unwrap(), x.sin() * s, max_relative = 1e-12);
    assert_relative_eq!(a.tan().propagated_error().unwrap(), s / x.cos().powi(2), max_relative = 1e-12);
    assert_relative_eq!(a.atan().propagated_error().unwrap(), s / (1.0 + x * x), max_relative = 1e-12);
    assert_relative_eq!(a.sqrt().propagated_error().unwrap(), s / (2.0 * x.sqrt()), max_relative = 1e-12);
    assert_relative_eq!((-&a).abs().propagated_error().unwrap(), s, max_relative = 1e-12);
}

#[test]
fn error_bearing_exponent() {
    // d(a^b)/da = b a^(b-1), d(a^b)/db = a^b ln a
    let a = ev(2.0, 0.1);
    let b = ev(3.0, 0.05);
    let r = a.pow(&b).eval().unwrap();
    assert_eq!(r.value, 8.0);
    let expected = ((12.0 * 0.1f64).powi(2) + (8.0 * 2f64.ln() * 0.05).powi(2)).sqrt();
    assert_relative_eq!(r.error, expected, max_relative = 1e-12);
}

#[test]
fn degrees_to_radians() {
    let angle = ev(90.0, 1.0);
    let r = angle.to_radians().sin().eval().unwrap();
    assert_relative_eq!(r.value, 1.0, max_relative = 1e-12);
    assert!(r.error < 1e-12);
}

// ─── Correlation ───────────────────────────────────────────────────────────────

#[test]
fn correlated_terms_combine_before_squaring() {
    // f = a^2 + 2a, df/da = 2a + 2
    let a = ev(3.0, 0.5);
    let f = a.pow(2.0) + 2.0 * &a;
    assert_eq!(f.propagated_error(), Ok(4.0));
}

#[test]
fn dedup_can_be_disabled() {
    let a = ev(3.0, 0.5);
    let f = &a + &a;
    let config = PropagationConfig {
        deduplication: Deduplication::Disabled,
        ..PropagationConfig::default()
    };
    assert_eq!(f.propagated_error(), Ok(1.0));
    assert_relative_eq!(f.propagated_error_with_config(&config).unwrap(), 0.5f64.hypot(0.5), max_relative = 1e-12);
}

#[test]
fn coincidentally_equal_measurements_are_merged() {
    // Known limitation: independence cannot be told apart from equality.
    let a = ev(1.0, 0.5);
    let b = ev(1.0, 0.5);
    assert_eq!((&a - &b).propagated_error(), Ok(0.0));
}

#[test]
fn sharing_a_subexpression_does_not_alias() {
    let a = ev(1.0, 0.1);
    let b = ev(2.0, 0.2);
    let shared = &a * &b;
    let f = &shared + 1.0;
    let g = &shared - &a;
    assert_eq!(shared.measured_count(), 2);
    assert_eq!(f.measured_count(), 2);
    assert_eq!(g.measured_count(), 3);
    assert_eq!(f.nominal(), Ok(3.0));
    assert_eq!(g.nominal(), Ok(1.0));
}

// ─── Domain Errors ─────────────────────────────────────────────────────────────

#[test]
fn division_by_zero_valued_leaf() {
    let a = ev(1.0, 2.0);
    let d = ev(0.0, 0.5);
    let err = (&a / &d).eval().unwrap_err();
    assert_eq!(err, Error::Domain(DomainError::DivisionByZero));
}

#[test]
fn logarithm_of_non_positive_leaf() {
    let c = ev(-1.0, 2.0);
    assert!(c.ln().eval().unwrap_err().is_domain());
    assert!(c.ln().propagated_error().unwrap_err().is_domain());
    let d = ev(0.0, 0.5);
    assert!(d.log10().eval().unwrap_err().is_domain());
}

#[test]
fn zero_to_negative_power() {
    let d = ev(0.0, 0.5);
    assert_eq!(
        d.pow(-2.0).eval(),
        Err(Error::Domain(DomainError::ZeroToNegativePower { exponent: -2.0 }))
    );
}

#[test]
fn deep_expressions_propagate() {
    let mut e = ev(1.0, 0.1);
    for _ in 0..1000 {
        e = e * 1.0;
    }
    assert_eq!(e.nominal(), Ok(1.0));
    assert_relative_eq!(e.propagated_error().unwrap(), 0.1, max_relative = 1e-12);

    let config = PropagationConfig {
        max_depth: 999,
        ..PropagationConfig::default()
    };
    assert_eq!(
        e.propagated_error_with_config(&config),
        Err(Error::TooDeep { depth: 1000, limit: 999 })
    );
}

#[test]
fn sum_of_a_thousand_measurements() {
    let values: Vec<f64> = (0..1000).map(|i| i as f64).collect();
    let errors: Vec<f64> = (0..1000).map(|i| 0.01 * (1 + i % 7) as f64).collect();
    let total: Expr = propeller_rs::vector::ezip(&values, &errors).into_iter().sum();

    let r = total.eval().unwrap();
    assert_eq!(r.value, 499_500.0);
    let expected = errors.iter().map(|s| s * s).sum::<f64>().sqrt();
    assert_relative_eq!(r.error, expected, max_relative = 1e-12);
}

#[test]
fn long_formula_text() {
    let bindings = std::collections::HashMap::from([("a".to_string(), ErrVal::new(1.0, 0.1))]);
    let f = Expr::parse(&vec!["a"; 20_000].join(" + "), &bindings).unwrap();
    assert_eq!(f.nominal(), Ok(20_000.0));
    // Every occurrence is the same measurement.
    assert_relative_eq!(f.propagated_error().unwrap(), 2000.0, max_relative = 1e-12);
}
