//! Building expressions from infix text.
//!
//! Identifiers name [`ErrVal`] bindings; `pi` and `e` are the usual
//! constants unless bound. Every occurrence of a name becomes its own leaf,
//! exactly as if the expression had been built with the operators, so
//! `"a - a"` produces two leaves that the propagator later merges.
//!
//! ```
//! use std::collections::HashMap;
//! use propeller_rs::{ErrVal, Expr};
//!
//! let bindings = HashMap::from([
//!     ("a".to_string(), ErrVal::new(1.0, 2.0)),
//!     ("b".to_string(), ErrVal::new(2.0, 3.0)),
//! ]);
//! let f = Expr::parse("a + b", &bindings).unwrap();
//! assert_eq!(f.nominal(), Ok(3.0));
//! assert!((f.propagated_error().unwrap() - 13f64.sqrt()).abs() < 1e-12);
//! ```

use std::collections::HashMap;
use std::f64::consts::{E, PI};

use log::debug;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{Error, SymbolicError};
use crate::identity::{compose_binary, compose_unary};
use crate::symbolic::parser;
use crate::symbolic::term::{Func, Term, TermNode};
use crate::value::ErrVal;

impl Expr {
    /// Parses `formula`, resolving identifiers through `bindings`.
    ///
    /// The grammar is the one of the built-in symbolic engine: `+ - * /`,
    /// `^` (or `**`), unary minus, parentheses and the functions `exp`,
    /// `log` (`ln`), `log10`, `sin`, `cos`, `tan`, `atan`, `abs`, `sqrt`.
    ///
    /// # Errors
    ///
    /// - [`Error::Symbolic`] if the text does not parse or calls a function
    ///   that has no counterpart on [`Expr`].
    /// - [`Error::UnknownVariable`] for an identifier that is neither bound
    ///   nor a known constant.
    pub fn parse(formula: &str, bindings: &HashMap<String, ErrVal>) -> Result<Expr, Error> {
        let term = parser::parse(formula)?;
        debug!("parse: {} -> {}", formula, term);
        from_term(&term, bindings)
    }
}

/// Folds the parsed term into an [`Expr`] without recursing, composing
/// children in the same order as the operators would.
fn from_term(term: &Term, bindings: &HashMap<String, ErrVal>) -> Result<Expr, Error> {
    term.try_fold(|node: TermNode<&String, Expr>| {
        let expr = match node {
            TermNode::Num(x) => Expr::constant(x),
            TermNode::Sym(name) => match (bindings.get(name), name.as_str()) {
                (Some(val), _) => Expr::from(*val),
                (None, "pi") => Expr::constant(PI),
                (None, "e") => Expr::constant(E),
                (None, _) => return Err(Error::UnknownVariable(name.clone())),
            },
            TermNode::Neg(a) => -a,
            TermNode::Add(a, b) => a + b,
            TermNode::Sub(a, b) => a - b,
            TermNode::Mul(a, b) => a * b,
            TermNode::Div(a, b) => a / b,
            TermNode::Pow(a, b) => compose_binary(BinaryOp::Pow, a, b),
            TermNode::Call(func, a) => {
                let op = match func {
                    Func::Exp => UnaryOp::Exp,
                    Func::Ln => UnaryOp::Ln,
                    Func::Log10 => UnaryOp::Log10,
                    Func::Sin => UnaryOp::Sin,
                    Func::Cos => UnaryOp::Cos,
                    Func::Tan => UnaryOp::Tan,
                    Func::Atan => UnaryOp::Atan,
                    Func::Abs => UnaryOp::Abs,
                    Func::Sqrt => return Ok(compose_binary(BinaryOp::Pow, a, Expr::constant(0.5))),
                    Func::Sign => {
                        return Err(Error::Symbolic(SymbolicError::UnknownFunction(func.name().to_string())))
                    }
                };
                compose_unary(op, a)
            }
        };
        Ok(expr)
    })
}
