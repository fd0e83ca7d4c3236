//! Expression trees over error-bearing leaves.
//!
//! An [`Expr`] is stored as a flat arena of [`Node`]s, topologically sorted by
//! construction: every child precedes its parent and the root is the last
//! node. Traversals are a single forward sweep over the arena (see
//! [`Expr::collapse`]), so no operation on an `Expr` recurses on the call
//! stack, however deep the tree.
//!
//! Trees are built by the operator surface in [`ops`][crate::ops], which goes
//! through [`identity`][crate::identity] to keep variable ids unique.

use crate::error::{DomainError, Error};
use crate::types::VarId;
use crate::value::ErrVal;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UnaryOp {
    Neg,
    Abs,
    Exp,
    Ln,
    Log10,
    Sin,
    Cos,
    Tan,
    Atan,
}

impl UnaryOp {
    /// Function name understood by the symbolic engine.
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Abs => "abs",
            UnaryOp::Exp => "exp",
            UnaryOp::Ln => "log",
            UnaryOp::Log10 => "log10",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Atan => "atan",
        }
    }

    /// Numeric definition of the operator.
    pub fn apply(self, a: f64) -> Result<f64, DomainError> {
        let result = match self {
            UnaryOp::Neg => -a,
            UnaryOp::Abs => a.abs(),
            UnaryOp::Exp => a.exp(),
            UnaryOp::Ln | UnaryOp::Log10 if a <= 0.0 => {
                return Err(DomainError::LogOfNonPositive { value: a });
            }
            UnaryOp::Ln => a.ln(),
            UnaryOp::Log10 => a.log10(),
            UnaryOp::Sin => a.sin(),
            UnaryOp::Cos => a.cos(),
            UnaryOp::Tan => a.tan(),
            UnaryOp::Atan => a.atan(),
        };
        finite(self.name(), result)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    /// Infix symbol understood by the symbolic engine.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }

    /// Numeric definition of the operator.
    pub fn apply(self, a: f64, b: f64) -> Result<f64, DomainError> {
        let result = match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div if b == 0.0 => return Err(DomainError::DivisionByZero),
            BinaryOp::Div => a / b,
            BinaryOp::Pow if a == 0.0 && b < 0.0 => {
                return Err(DomainError::ZeroToNegativePower { exponent: b });
            }
            BinaryOp::Pow => a.powf(b),
        };
        finite(self.symbol(), result)
    }
}

fn finite(op: &'static str, x: f64) -> Result<f64, DomainError> {
    if x.is_finite() {
        Ok(x)
    } else {
        Err(DomainError::NonFinite { op })
    }
}

/// An atomic input of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    /// A measured quantity, identified within its expression by `id`.
    Measured { val: ErrVal, id: VarId },
    /// A plain number. Never differentiated; rendered as a literal.
    Constant(f64),
}

impl Leaf {
    pub fn value(&self) -> f64 {
        match self {
            Leaf::Measured { val, .. } => val.value,
            Leaf::Constant(c) => *c,
        }
    }

    pub fn error(&self) -> f64 {
        match self {
            Leaf::Measured { val, .. } => val.error,
            Leaf::Constant(_) => 0.0,
        }
    }

    /// Variable slot of a measured leaf, `None` for constants.
    pub fn id(&self) -> Option<VarId> {
        match self {
            Leaf::Measured { id, .. } => Some(*id),
            Leaf::Constant(_) => None,
        }
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, Leaf::Measured { .. })
    }
}

/// Index of a node inside its [`Expr`] arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Idx(pub(crate) usize);

impl Idx {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One layer of an expression, with children of type `I`.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<T = Leaf, I = Idx> {
    Leaf(T),
    Unary(UnaryOp, I),
    Binary(BinaryOp, I, I),
}

impl<T, A> Node<T, A> {
    #[inline(always)]
    pub fn fmap<B, F>(self, mut f: F) -> Node<T, B>
    where
        F: FnMut(A) -> B,
    {
        match self {
            Node::Leaf(t) => Node::Leaf(t),
            Node::Unary(op, a) => Node::Unary(op, f(a)),
            Node::Binary(op, a, b) => Node::Binary(op, f(a), f(b)),
        }
    }

    #[inline(always)]
    pub fn fmap_ref<B, F>(&self, mut f: F) -> Node<&T, B>
    where
        F: FnMut(&A) -> B,
    {
        match self {
            Node::Leaf(t) => Node::Leaf(t),
            Node::Unary(op, a) => Node::Unary(*op, f(a)),
            Node::Binary(op, a, b) => Node::Binary(*op, f(a), f(b)),
        }
    }
}

/// An arithmetic expression over [`Leaf`] values.
///
/// # Invariants
///
/// - The last node is the root; every child index is smaller than its parent's.
/// - Every node except the root has exactly one parent (a tree, never a DAG).
/// - The ids of measured leaves are exactly `0..measured_count()`.
///
/// Neither the value nor the error is cached: [`nominal`][Expr::nominal] and
/// [`propagated_error`][Expr::propagated_error] recompute from the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub(crate) nodes: Vec<Node>,
    pub(crate) measured: u32,
}

impl Expr {
    pub fn from_leaf(leaf: Leaf) -> Self {
        let measured = leaf.is_measured() as u32;
        Self {
            nodes: vec![Node::Leaf(leaf)],
            measured,
        }
    }

    /// A measured leaf; `error` is normalized to its absolute value.
    pub fn measured(value: f64, error: f64) -> Self {
        Self::from_leaf(Leaf::Measured {
            val: ErrVal::new(value, error),
            id: VarId::default(),
        })
    }

    pub fn constant(value: f64) -> Self {
        Self::from_leaf(Leaf::Constant(value))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get(&self, idx: Idx) -> &Node {
        &self.nodes[idx.0]
    }

    pub fn root(&self) -> &Node {
        &self.nodes[self.nodes.len() - 1]
    }

    /// Returns the leaf if this expression is a single leaf.
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self.nodes.as_slice() {
            [Node::Leaf(leaf)] => Some(leaf),
            _ => None,
        }
    }

    /// All leaves, in arena order.
    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        })
    }

    /// Measured leaves sorted by id, i.e. in left-to-right order.
    pub fn measured_leaves(&self) -> Vec<(VarId, ErrVal)> {
        let mut vars: Vec<(VarId, ErrVal)> = self
            .leaves()
            .filter_map(|leaf| match leaf {
                Leaf::Measured { val, id } => Some((*id, *val)),
                Leaf::Constant(_) => None,
            })
            .collect();
        vars.sort_by_key(|(id, _)| *id);
        vars
    }

    /// Number of measured leaves, which is also the next free [`VarId`].
    pub fn measured_count(&self) -> usize {
        self.measured as usize
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the tree (0 for a single leaf).
    pub fn depth(&self) -> usize {
        self.collapse(|node: Node<&Leaf, usize>| match node {
            Node::Leaf(_) => 0,
            Node::Unary(_, a) => 1 + a,
            Node::Binary(_, a, b) => 1 + a.max(b),
        })
    }
}

impl Expr {
    /// Folds the tree bottom-up with `collapse`, children before parents.
    pub fn collapse<R, F>(&self, mut collapse: F) -> R
    where
        F: FnMut(Node<&Leaf, R>) -> R,
    {
        let result: Result<R, std::convert::Infallible> = self.try_collapse(|node| Ok(collapse(node)));
        match result {
            Ok(r) => r,
            Err(never) => match never {},
        }
    }

    /// Like [`collapse`][Expr::collapse], stopping at the first error.
    pub fn try_collapse<R, E, F>(&self, mut collapse: F) -> Result<R, E>
    where
        F: FnMut(Node<&Leaf, R>) -> Result<R, E>,
    {
        let mut results: Vec<Option<R>> = std::iter::repeat_with(|| None).take(self.nodes.len()).collect();

        for (i, node) in self.nodes.iter().enumerate() {
            // Children have smaller indices, so they are already folded; each
            // has a single parent, so taking the result is safe.
            let node = node.fmap_ref(|idx| results[idx.0].take().expect("child folded before parent"));
            results[i] = Some(collapse(node)?);
        }

        Ok(results.pop().flatten().expect("root folded"))
    }

    /// Nominal value by plain numeric evaluation of the tree.
    ///
    /// # Errors
    ///
    /// Division by zero, the logarithm of a non-positive value, `0 ^ negative`
    /// and any non-finite intermediate result are reported as
    /// [`Error::Domain`] instead of being returned as NaN or infinity.
    pub fn nominal(&self) -> Result<f64, Error> {
        let value = self.try_collapse(|node| match node {
            Node::Leaf(leaf) => finite("value", leaf.value()),
            Node::Unary(op, a) => op.apply(a),
            Node::Binary(op, a, b) => op.apply(a, b),
        })?;
        Ok(value)
    }

    /// Nominal value and propagated error together.
    pub fn eval(&self) -> Result<ErrVal, Error> {
        Ok(ErrVal::new(self.nominal()?, self.propagated_error()?))
    }
}

impl From<Leaf> for Expr {
    fn from(leaf: Leaf) -> Self {
        Expr::from_leaf(leaf)
    }
}

impl From<ErrVal> for Expr {
    fn from(val: ErrVal) -> Self {
        Expr::from_leaf(Leaf::Measured {
            val,
            id: VarId::default(),
        })
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::constant(value)
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}
