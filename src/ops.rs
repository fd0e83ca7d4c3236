//! Operator surface for building expressions.
//!
//! `+`, `-`, `*`, `/` and unary `-` work between any mix of [`Expr`], `&Expr`
//! and [`ErrVal`], and between those and a plain `f64` on either side. Plain
//! numbers become constant leaves, so `2.0 * a` builds exactly the same tree
//! as `Expr::constant(2.0) * a`. Borrowed operands are cloned; every
//! composition owns its operands.
//!
//! ```
//! use propeller_rs::{ev, Expr};
//!
//! let a = ev(1.0, 2.0);
//! let b = ev(2.0, 3.0);
//! let f = (&a + &b).sin() / a.pow(2.0) - 1.0;
//! assert_eq!(f.to_symbolic_string(), "((sin((x0 + x1)) / (x2 ^ 2)) - 1)");
//! ```

use std::f64::consts::PI;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::identity::{compose_binary, compose_unary};
use crate::value::ErrVal;

/// Makes a measured leaf; `error` is normalized to its absolute value.
pub fn ev(value: f64, error: f64) -> Expr {
    Expr::measured(value, error)
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<R: Into<Expr>> $trait<R> for Expr {
            type Output = Expr;

            fn $method(self, rhs: R) -> Self::Output {
                compose_binary($op, self, rhs.into())
            }
        }

        impl<R: Into<Expr>> $trait<R> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: R) -> Self::Output {
                compose_binary($op, self.clone(), rhs.into())
            }
        }

        impl<R: Into<Expr>> $trait<R> for ErrVal {
            type Output = Expr;

            fn $method(self, rhs: R) -> Self::Output {
                compose_binary($op, Expr::from(self), rhs.into())
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Self::Output {
                compose_binary($op, Expr::constant(self), rhs)
            }
        }

        impl $trait<&Expr> for f64 {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Self::Output {
                compose_binary($op, Expr::constant(self), rhs.clone())
            }
        }

        impl $trait<ErrVal> for f64 {
            type Output = Expr;

            fn $method(self, rhs: ErrVal) -> Self::Output {
                compose_binary($op, Expr::constant(self), Expr::from(rhs))
            }
        }
    };
}

impl_binary_op!(Add, add, BinaryOp::Add);
impl_binary_op!(Sub, sub, BinaryOp::Sub);
impl_binary_op!(Mul, mul, BinaryOp::Mul);
impl_binary_op!(Div, div, BinaryOp::Div);

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        compose_unary(UnaryOp::Neg, self)
    }
}

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        compose_unary(UnaryOp::Neg, self.clone())
    }
}

impl Neg for ErrVal {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        compose_unary(UnaryOp::Neg, Expr::from(self))
    }
}

/// Sums left to right; the empty sum is the constant `0`.
impl Sum for Expr {
    fn sum<I: Iterator<Item = Expr>>(iter: I) -> Self {
        iter.reduce(|acc, e| acc + e).unwrap_or_else(|| Expr::constant(0.0))
    }
}

impl Expr {
    fn unary(&self, op: UnaryOp) -> Expr {
        compose_unary(op, self.clone())
    }

    /// `self ^ exponent`; the exponent may itself carry an error.
    pub fn pow<R: Into<Expr>>(&self, exponent: R) -> Expr {
        compose_binary(BinaryOp::Pow, self.clone(), exponent.into())
    }

    /// `self ^ 0.5`.
    pub fn sqrt(&self) -> Expr {
        self.pow(0.5)
    }

    pub fn abs(&self) -> Expr {
        self.unary(UnaryOp::Abs)
    }

    pub fn exp(&self) -> Expr {
        self.unary(UnaryOp::Exp)
    }

    /// Natural logarithm.
    pub fn ln(&self) -> Expr {
        self.unary(UnaryOp::Ln)
    }

    pub fn log10(&self) -> Expr {
        self.unary(UnaryOp::Log10)
    }

    pub fn sin(&self) -> Expr {
        self.unary(UnaryOp::Sin)
    }

    pub fn cos(&self) -> Expr {
        self.unary(UnaryOp::Cos)
    }

    pub fn tan(&self) -> Expr {
        self.unary(UnaryOp::Tan)
    }

    pub fn atan(&self) -> Expr {
        self.unary(UnaryOp::Atan)
    }

    /// Converts degrees to radians.
    pub fn to_radians(&self) -> Expr {
        self * (PI / 180.0)
    }
}
