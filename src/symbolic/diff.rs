//! Symbolic differentiation.
//!
//! Textbook rules for the closed operator set of [`Term`]:
//!
//! ```text
//! (u ± v)'  = u' ± v'
//! (u v)'    = u' v + u v'
//! (u / v)'  = (u' v - u v') / v^2
//! (u^c)'    = c u^(c-1) u'                  c free of x
//! (c^v)'    = c^v ln(c) v'                  c free of x
//! (u^v)'    = u^v (v' ln(u) + v u' / u)
//! f(u)'     = f'(u) u'                      chain rule
//! ```
//!
//! The derivative of every node is computed once, in arena order, and refers
//! back to the nodes of the original term instead of copying them. A node
//! whose operands all have derivative `0` has derivative `0` itself, so `ln`
//! of a non-positive base never enters a derivative that does not need it.

use std::f64::consts::LN_10;

use log::trace;

use crate::symbolic::term::{Func, Term, TermIdx, TermNode};

/// Partial derivative of `term` with respect to the symbol `var`.
pub fn differentiate(term: &Term, var: &str) -> Term {
    let mut out = term.clone();
    let zero = out.num(0.0);
    let one = out.num(1.0);

    let uses = term.uses();
    let mut d: Vec<TermIdx> = Vec::with_capacity(uses.len());
    for (i, &used) in uses.iter().enumerate() {
        let node = term.get(TermIdx(i));
        let di = match node {
            _ if used == 0 => zero,
            TermNode::Num(_) => zero,
            TermNode::Sym(name) => {
                if name == var {
                    one
                } else {
                    zero
                }
            }
            _ if operands_constant(node, &d, &out) => zero,
            &TermNode::Neg(u) => out.neg(d[u.0]),
            &TermNode::Add(u, v) => out.add(d[u.0], d[v.0]),
            &TermNode::Sub(u, v) => out.sub(d[u.0], d[v.0]),
            &TermNode::Mul(u, v) => {
                let a = out.mul(d[u.0], v);
                let b = out.mul(u, d[v.0]);
                out.add(a, b)
            }
            &TermNode::Div(u, v) => {
                let a = out.mul(d[u.0], v);
                let b = out.mul(u, d[v.0]);
                let numerator = out.sub(a, b);
                let two = out.num(2.0);
                let denominator = out.pow(v, two);
                out.div(numerator, denominator)
            }
            &TermNode::Pow(u, v) => diff_pow(&mut out, TermIdx(i), u, v, d[u.0], d[v.0]),
            &TermNode::Call(func, u) => {
                let outer = diff_call(&mut out, TermIdx(i), func, u);
                out.mul(outer, d[u.0])
            }
        };
        d.push(di);
    }

    out.set_root(d[term.root().0]);
    trace!("d/d{}: {} nodes", var, out.len());
    out
}

/// Whether every operand of `node` has a zero derivative.
fn operands_constant(node: &TermNode, d: &[TermIdx], out: &Term) -> bool {
    let mut constant = true;
    node.fmap_ref(|c| constant &= out.is_zero(d[c.0]));
    constant
}

/// Derivative of `power = u ^ v`, given `du` and `dv`.
fn diff_pow(out: &mut Term, power: TermIdx, u: TermIdx, v: TermIdx, du: TermIdx, dv: TermIdx) -> TermIdx {
    if out.is_zero(dv) {
        // Power rule.
        let one = out.num(1.0);
        let exponent = out.sub(v, one);
        let p = out.pow(u, exponent);
        let c = out.mul(v, p);
        return out.mul(c, du);
    }

    let ln = out.call(Func::Ln, u);
    if out.is_zero(du) {
        let c = out.mul(power, ln);
        return out.mul(c, dv);
    }

    let a = out.mul(dv, ln);
    let vdu = out.mul(v, du);
    let b = out.div(vdu, u);
    let sum = out.add(a, b);
    out.mul(power, sum)
}

/// Outer derivative `f'(u)` of the call node `node = func(u)`.
fn diff_call(out: &mut Term, node: TermIdx, func: Func, u: TermIdx) -> TermIdx {
    let one = out.num(1.0);
    match func {
        Func::Exp => node,
        Func::Ln => out.div(one, u),
        Func::Log10 => {
            let ln10 = out.num(LN_10);
            let m = out.mul(u, ln10);
            out.div(one, m)
        }
        Func::Sin => out.call(Func::Cos, u),
        Func::Cos => {
            let s = out.call(Func::Sin, u);
            out.neg(s)
        }
        Func::Tan => {
            let c = out.call(Func::Cos, u);
            let two = out.num(2.0);
            let p = out.pow(c, two);
            out.div(one, p)
        }
        Func::Atan => {
            let two = out.num(2.0);
            let p = out.pow(u, two);
            let s = out.add(one, p);
            out.div(one, s)
        }
        Func::Abs => out.call(Func::Sign, u),
        Func::Sign => out.num(0.0),
        Func::Sqrt => {
            let two = out.num(2.0);
            let m = out.mul(two, node);
            out.div(one, m)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use approx::assert_relative_eq;

    use super::*;
    use crate::symbolic::parser::parse;

    use test_log::test;

    /// Evaluates d(formula)/d(var) at the given point.
    fn slope(formula: &str, var: &str, point: &[(&str, f64)]) -> f64 {
        let term = parse(formula).unwrap();
        let bindings: HashMap<String, f64> = point.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        differentiate(&term, var).substitute(&bindings).evaluate().unwrap()
    }

    /// The derivative, if it folded to a single number.
    fn folded(formula: &str, var: &str) -> Option<f64> {
        differentiate(&parse(formula).unwrap(), var).as_num()
    }

    #[test]
    fn test_constant_and_symbol() {
        assert_eq!(folded("3", "x"), Some(0.0));
        assert_eq!(folded("x", "x"), Some(1.0));
        assert_eq!(folded("y", "x"), Some(0.0));
    }

    #[test]
    fn test_linear_terms_fold_to_numbers() {
        assert_eq!(folded("(x * 2)", "x"), Some(2.0));
        assert_eq!(folded("(x + y)", "y"), Some(1.0));
        assert_eq!(folded("(x - x)", "x"), Some(0.0));
        assert_eq!(folded("(-x)", "x"), Some(-1.0));
        assert_eq!(folded("sin(y) * log(y)", "x"), Some(0.0));
    }

    #[test]
    fn test_product_and_quotient() {
        assert_eq!(slope("x * y", "x", &[("x", 2.0), ("y", 5.0)]), 5.0);
        assert_eq!(slope("x * x", "x", &[("x", 3.0)]), 6.0);
        assert_eq!(slope("x / y", "y", &[("x", 2.0), ("y", 4.0)]), -0.125);
        assert_eq!(slope("x / x", "x", &[("x", 7.0)]), 0.0);
    }

    #[test]
    fn test_powers() {
        assert_eq!(slope("x ^ 3", "x", &[("x", 2.0)]), 12.0);
        assert_eq!(slope("x ^ 0.5", "x", &[("x", 4.0)]), 0.25);
        assert_relative_eq!(slope("2 ^ x", "x", &[("x", 3.0)]), 8.0 * 2f64.ln(), max_relative = 1e-12);
        assert_relative_eq!(
            slope("x ^ y", "y", &[("x", 2.0), ("y", 3.0)]),
            8.0 * 2f64.ln(),
            max_relative = 1e-12
        );
        assert_relative_eq!(slope("x ^ x", "x", &[("x", 2.0)]), 4.0 * (2f64.ln() + 1.0), max_relative = 1e-12);
    }

    #[test]
    fn test_power_rule_with_negative_base() {
        // No ln(x) may appear when the exponent is constant.
        assert_eq!(slope("x ^ 2", "x", &[("x", -3.0)]), -6.0);
    }

    #[test]
    fn test_functions() {
        let x = 0.7;
        assert_relative_eq!(slope("exp(x)", "x", &[("x", x)]), x.exp(), max_relative = 1e-12);
        assert_relative_eq!(slope("log(x)", "x", &[("x", x)]), 1.0 / x, max_relative = 1e-12);
        assert_relative_eq!(slope("log10(x)", "x", &[("x", x)]), 1.0 / (x * LN_10), max_relative = 1e-12);
        assert_relative_eq!(slope("sin(x)", "x", &[("x", x)]), x.cos(), max_relative = 1e-12);
        assert_relative_eq!(slope("cos(x)", "x", &[("x", x)]), -x.sin(), max_relative = 1e-12);
        assert_relative_eq!(slope("tan(x)", "x", &[("x", x)]), 1.0 / x.cos().powi(2), max_relative = 1e-12);
        assert_relative_eq!(slope("atan(x)", "x", &[("x", x)]), 1.0 / (1.0 + x * x), max_relative = 1e-12);
        assert_relative_eq!(slope("sqrt(x)", "x", &[("x", x)]), 0.5 / x.sqrt(), max_relative = 1e-12);
        assert_eq!(slope("abs(x)", "x", &[("x", -x)]), -1.0);
    }

    #[test]
    fn test_chain_rule() {
        let x = 0.3;
        assert_relative_eq!(
            slope("sin(x * x)", "x", &[("x", x)]),
            (x * x).cos() * 2.0 * x,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            slope("exp(-x) * log(x + 1)", "x", &[("x", x)]),
            -(-x).exp() * (x + 1.0).ln() + (-x).exp() / (x + 1.0),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_derivative_shares_the_original_nodes() {
        // Both factors reuse the parsed (x * y) instead of copying it.
        let term = parse("(x * y) * sin(x * y)").unwrap();
        let d = differentiate(&term, "x");
        assert!(d.len() < 3 * term.len());
        assert_relative_eq!(
            slope("(x * y) * sin(x * y)", "x", &[("x", 0.5), ("y", 2.0)]),
            2.0 * 1f64.sin() + 2.0 * 1f64.cos(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_long_sum() {
        let formula = (0..5000).map(|i| format!("x{}", i)).collect::<Vec<_>>().join(" + ");
        let term = parse(&formula).unwrap();
        assert_eq!(differentiate(&term, "x2500").as_num(), Some(1.0));
        assert_eq!(differentiate(&term, "x5000").as_num(), Some(0.0));
    }

    #[test]
    fn test_long_product() {
        let formula = vec!["x"; 2000].join(" * ");
        // d/dx x^n = n x^(n-1), at x = 1.
        assert_relative_eq!(slope(&formula, "x", &[("x", 1.0)]), 2000.0, max_relative = 1e-12);
    }
}
