//! Gaussian error propagation.
//!
//! For an expression `f` over measured leaves `x_i` with errors `s_i`, the
//! propagated error is the first-order (delta method) estimate
//!
//! ```text
//! sigma = sqrt( sum_i (df/dx_i * s_i)^2 )
//! ```
//!
//! with every partial derivative evaluated at the nominal values. The
//! derivatives come from a [`SymbolicEngine`]: the tree is rendered as a
//! formula (see [`render`][crate::render]), parsed once, then differentiated
//! with respect to each variable.
//!
//! # Deduplication
//!
//! Composition gives every leaf occurrence its own id, so in `a - a` the two
//! copies of `a` are different variables. Before differentiating, leaves with
//! exactly equal value and error are merged into one class and rendered under
//! the name of the first member; `a - a` then has error `0`, as it should.
//!
//! The heuristic is keyed on numbers, not on provenance. Two independent
//! measurements that happen to agree in value and error are merged as well,
//! and correlated quantities with different values are never detected.
//! [`Deduplication::Disabled`] turns the merge off.
//!
//! # Examples
//!
//! ```
//! use propeller_rs::ev;
//!
//! let a = ev(1.0, 2.0);
//! let b = ev(2.0, 3.0);
//! let sigma = (&a + &b).propagated_error().unwrap();
//! assert!((sigma - 13f64.sqrt()).abs() < 1e-12);
//!
//! assert_eq!((&a - &a).propagated_error(), Ok(0.0));
//! ```

use std::collections::HashMap;

use log::debug;

use crate::ast::{Expr, Leaf};
use crate::error::{DomainError, Error};
use crate::render::render_aliased;
use crate::symbolic::{Calculus, SymbolicEngine};
use crate::types::VarId;
use crate::value::ErrVal;

/// Default for [`PropagationConfig::max_depth`].
///
/// Nothing on the symbolic path recurses, so the limit only bounds the work
/// spent on a single expression.
pub const DEFAULT_MAX_DEPTH: usize = 100_000;

/// How measured leaves are grouped into variables.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Deduplication {
    /// Leaves with exactly equal value and error are one variable.
    #[default]
    ByValue,
    /// Every leaf is an independent variable.
    Disabled,
}

/// Configuration of a [`Propagator`].
///
/// # Examples
///
/// ```
/// use propeller_rs::{ev, Deduplication, PropagationConfig};
///
/// let a = ev(1.0, 2.0);
/// let config = PropagationConfig {
///     deduplication: Deduplication::Disabled,
///     ..PropagationConfig::default()
/// };
/// let sigma = (&a - &a).propagated_error_with_config(&config).unwrap();
/// assert!((sigma - 8f64.sqrt()).abs() < 1e-12);
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PropagationConfig {
    /// Grouping of leaves into variables (default: [`Deduplication::ByValue`])
    pub deduplication: Deduplication,
    /// Deepest tree handed to the symbolic engine (default: [`DEFAULT_MAX_DEPTH`])
    pub max_depth: usize,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            deduplication: Deduplication::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// The contribution of one variable to the propagated error.
#[derive(Debug, Clone, PartialEq)]
pub struct Partial {
    /// Canonical leaf of the class, the first member in id order.
    pub id: VarId,
    /// Value and error shared by all members.
    pub value: ErrVal,
    /// Every leaf merged into this variable, including `id`.
    pub members: Vec<VarId>,
    /// `df/dx` at the nominal point.
    pub derivative: f64,
}

impl Partial {
    /// `|df/dx * s|`.
    pub fn contribution(&self) -> f64 {
        (self.derivative * self.value.error).abs()
    }
}

/// A set of leaves treated as one variable.
#[derive(Debug, Clone, PartialEq)]
struct Class {
    canonical: VarId,
    value: ErrVal,
    members: Vec<VarId>,
}

/// Error propagation driver over a [`SymbolicEngine`].
#[derive(Debug, Clone, Default)]
pub struct Propagator<E = Calculus> {
    engine: E,
    config: PropagationConfig,
}

impl Propagator<Calculus> {
    /// Propagator over the built-in engine with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PropagationConfig) -> Self {
        Self::with_engine(Calculus, config)
    }
}

impl<E: SymbolicEngine> Propagator<E> {
    pub fn with_engine(engine: E, config: PropagationConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    /// Propagated error of `expr`.
    ///
    /// # Errors
    ///
    /// - [`Error::TooDeep`] if `expr` is deeper than [`PropagationConfig::max_depth`].
    /// - [`Error::Domain`] if a leaf is not finite, the nominal evaluation
    ///   fails (see [`Expr::nominal`]), or a partial derivative evaluates to
    ///   NaN or infinity (e.g. `sqrt(x)` at `x = 0`).
    /// - [`Error::Symbolic`] if the engine rejects a step.
    pub fn propagate(&self, expr: &Expr) -> Result<f64, Error> {
        let partials = self.partials(expr)?;
        let sum: f64 = partials.iter().map(|p| p.contribution().powi(2)).sum();
        let sigma = sum.sqrt();
        debug!("propagate: sigma = {}", sigma);
        Ok(sigma)
    }

    /// One [`Partial`] per variable, in order of the canonical ids.
    pub fn partials(&self, expr: &Expr) -> Result<Vec<Partial>, Error> {
        check_finite(expr)?;

        let depth = expr.depth();
        if depth > self.config.max_depth {
            return Err(Error::TooDeep {
                depth,
                limit: self.config.max_depth,
            });
        }

        // Derivatives are only meaningful inside the domain of `expr`.
        expr.nominal()?;

        let classes = classes(&expr.measured_leaves(), self.config.deduplication);
        if classes.is_empty() {
            debug!("partials: no measured leaves");
            return Ok(Vec::new());
        }

        let aliases: HashMap<VarId, VarId> = classes
            .iter()
            .flat_map(|class| class.members.iter().map(move |&m| (m, class.canonical)))
            .filter(|(member, canonical)| member != canonical)
            .collect();
        let formula = render_aliased(expr, &aliases);
        debug!("partials: formula = {}", formula);
        debug!("partials: {} leaves in {} classes", expr.measured_count(), classes.len());

        let term = self.engine.parse(&formula)?;
        let bindings: HashMap<String, f64> = classes
            .iter()
            .map(|class| (class.canonical.to_string(), class.value.value))
            .collect();

        let mut partials = Vec::with_capacity(classes.len());
        for class in classes {
            let name = class.canonical.to_string();
            let derivative = self.engine.differentiate(&term, &name)?;
            let at = self.engine.substitute(&derivative, &bindings)?;
            let derivative = self.engine.evaluate(&at)?;
            if !derivative.is_finite() {
                return Err(DomainError::NonFiniteDerivative {
                    variable: name,
                    value: derivative,
                }
                .into());
            }
            debug!("partials: d/d{} = {} (members {:?})", name, derivative, class.members);
            partials.push(Partial {
                id: class.canonical,
                value: class.value,
                members: class.members,
                derivative,
            });
        }
        Ok(partials)
    }
}

/// Rejects NaN and infinite leaves before they reach the renderer.
fn check_finite(expr: &Expr) -> Result<(), DomainError> {
    for leaf in expr.leaves() {
        if !leaf.value().is_finite() {
            return Err(DomainError::NonFinite { op: "value" });
        }
        if let Leaf::Measured { val, .. } = leaf {
            if !val.error.is_finite() {
                return Err(DomainError::NonFinite { op: "error" });
            }
        }
    }
    Ok(())
}

/// Exact-equality key; `0.0` and `-0.0` compare equal and share a key.
fn key(x: f64) -> u64 {
    if x == 0.0 {
        0
    } else {
        x.to_bits()
    }
}

/// Partitions `vars` (sorted by id) into classes. The canonical member is
/// the first one, so classes come out sorted by canonical id.
fn classes(vars: &[(VarId, ErrVal)], mode: Deduplication) -> Vec<Class> {
    let mut classes: Vec<Class> = Vec::new();
    let mut index: HashMap<(u64, u64), usize> = HashMap::new();

    for &(id, val) in vars {
        if mode == Deduplication::ByValue {
            if let Some(&i) = index.get(&(key(val.value), key(val.error))) {
                classes[i].members.push(id);
                continue;
            }
            index.insert((key(val.value), key(val.error)), classes.len());
        }
        classes.push(Class {
            canonical: id,
            value: val,
            members: vec![id],
        });
    }

    classes
}

impl Expr {
    /// Propagated error with the built-in engine and default configuration.
    ///
    /// See [`Propagator::propagate`] for the errors.
    pub fn propagated_error(&self) -> Result<f64, Error> {
        Propagator::new().propagate(self)
    }

    pub fn propagated_error_with_config(&self, config: &PropagationConfig) -> Result<f64, Error> {
        Propagator::with_config(*config).propagate(self)
    }
}
