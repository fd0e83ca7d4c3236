//! # propeller-rs: Gaussian error propagation in Rust
//!
//! **`propeller-rs`** computes how measurement uncertainties carry through arithmetic.
//! You build an expression from values with errors, and the library reports its nominal value
//! together with the first-order propagated error.
//!
//! ## What is error propagation?
//!
//! Given measured inputs `x_i ± s_i` and a function `f`, the propagated error is
//!
//! ```text
//! sigma_f = sqrt( sum_i (df/dx_i * s_i)^2 )
//! ```
//!
//! with every partial derivative taken at the nominal values. This is the **delta method**:
//! exact for linear `f` and a good approximation whenever the errors are small compared to the
//! curvature of `f`.
//!
//! ## Key Features
//!
//! - **Natural Syntax**: Expressions are built with `+ - * /`, unary `-` and methods like [`Expr::pow`] and [`Expr::sin`]. Plain numbers mix in as exact constants.
//! - **Symbolic Derivatives**: Partial derivatives are exact, computed by a small built-in computer-algebra engine ([`symbolic`]) rather than by finite differences.
//! - **Repeated Variables**: `a - a` has zero error. Leaves with identical value and error are recognized as one variable (see [`propagate`] for the caveats).
//! - **Checked Domains**: Division by zero, logarithms of non-positive values and other non-finite results are [`Error`]s, never silent NaNs.
//! - **Stack Safe**: Expressions and symbolic terms are flat arenas and the parser keeps explicit stacks, so long chains and deep nesting never recurse.
//!
//! ## Quick Start
//!
//! Add `propeller-rs` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! propeller-rs = "0.1"
//! ```
//!
//! ## Basic Usage
//!
//! ```rust
//! use propeller_rs::ev;
//!
//! // 1. Make measured values: value ± error
//! let a = ev(1.0, 2.0);
//! let b = ev(2.0, 3.0);
//!
//! // 2. Build an expression
//! let f = &a + &b;
//!
//! // 3. Evaluate: nominal value and propagated error
//! let r = f.eval().unwrap();
//! assert_eq!(r.value, 3.0);
//! assert!((r.error - 13f64.sqrt()).abs() < 1e-12);
//!
//! // 4. Constants carry no error
//! assert_eq!((&a * 2.0).propagated_error(), Ok(4.0));
//!
//! // 5. Repeated variables are correlated
//! assert_eq!((&a - &a).propagated_error(), Ok(0.0));
//! ```
//!
//! ## Core Components
//!
//! - **[`ast`]**: The [`Expr`] tree and numeric evaluation.
//! - **[`ops`]**: Operator overloads and elementary functions.
//! - **[`propagate`]**: The [`Propagator`] and its [`PropagationConfig`].
//! - **[`symbolic`]**: The [`SymbolicEngine`][symbolic::SymbolicEngine] contract and the built-in engine.
//! - **[`formula`]**: Building expressions from infix text.
//! - **[`vector`]**: Element-wise helpers for arrays of measurements.
//! - **[`dot`]**: Utilities for visualizing expressions using Graphviz.
//!
//! For the algorithm and its limitations, check the [`propagate`] module documentation.

pub mod ast;
pub mod dot;
pub mod error;
pub mod formula;
pub mod identity;
pub mod ops;
pub mod propagate;
pub mod render;
pub mod symbolic;
pub mod types;
pub mod value;
pub mod vector;

pub use crate::ast::Expr;
pub use crate::error::Error;
pub use crate::ops::ev;
pub use crate::propagate::{Deduplication, PropagationConfig, Propagator};
pub use crate::value::ErrVal;
