//! Symbolic terms of the built-in engine.
//!
//! A [`Term`] is a flat arena of [`TermNode`]s in which every child precedes
//! its parent, like [`Expr`][crate::ast::Expr]. Unlike an `Expr`, a node may
//! be shared by several parents: derivatives point back into the term they
//! were taken from instead of copying its subterms. Nodes that are not
//! reachable from the root are ignored by every operation.
//!
//! All traversals are loops over the arena, so the length of a formula never
//! turns into call-stack depth.

use std::collections::HashMap;
use std::fmt;

use crate::error::SymbolicError;

/// Elementary functions known to the engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Func {
    Exp,
    Ln,
    Log10,
    Sin,
    Cos,
    Tan,
    Atan,
    Abs,
    Sign,
    Sqrt,
}

impl Func {
    /// Looks up a function by name. `ln` and `arctan` are accepted as aliases.
    pub fn from_name(name: &str) -> Option<Func> {
        let func = match name {
            "exp" => Func::Exp,
            "log" | "ln" => Func::Ln,
            "log10" => Func::Log10,
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "atan" | "arctan" => Func::Atan,
            "abs" => Func::Abs,
            "sign" => Func::Sign,
            "sqrt" => Func::Sqrt,
            _ => return None,
        };
        Some(func)
    }

    pub fn name(self) -> &'static str {
        match self {
            Func::Exp => "exp",
            Func::Ln => "log",
            Func::Log10 => "log10",
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Atan => "atan",
            Func::Abs => "abs",
            Func::Sign => "sign",
            Func::Sqrt => "sqrt",
        }
    }

    /// Plain `f64` evaluation; may return NaN or infinity.
    pub fn eval(self, x: f64) -> f64 {
        match self {
            Func::Exp => x.exp(),
            Func::Ln => x.ln(),
            Func::Log10 => x.log10(),
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Tan => x.tan(),
            Func::Atan => x.atan(),
            Func::Abs => x.abs(),
            Func::Sign => {
                if x == 0.0 || x.is_nan() {
                    x
                } else {
                    x.signum()
                }
            }
            Func::Sqrt => x.sqrt(),
        }
    }
}

/// Index of a node inside a [`Term`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TermIdx(pub(crate) usize);

/// One node of a [`Term`], generic over the symbol payload `S` and the child
/// representation `I` so that folds can swap children for results.
#[derive(Debug, Clone, PartialEq)]
pub enum TermNode<S = String, I = TermIdx> {
    Num(f64),
    Sym(S),
    Neg(I),
    Add(I, I),
    Sub(I, I),
    Mul(I, I),
    Div(I, I),
    Pow(I, I),
    Call(Func, I),
}

impl<S, A> TermNode<S, A> {
    pub fn fmap_ref<B, F>(&self, mut f: F) -> TermNode<&S, B>
    where
        F: FnMut(&A) -> B,
    {
        match self {
            TermNode::Num(x) => TermNode::Num(*x),
            TermNode::Sym(s) => TermNode::Sym(s),
            TermNode::Neg(a) => TermNode::Neg(f(a)),
            TermNode::Add(a, b) => TermNode::Add(f(a), f(b)),
            TermNode::Sub(a, b) => TermNode::Sub(f(a), f(b)),
            TermNode::Mul(a, b) => TermNode::Mul(f(a), f(b)),
            TermNode::Div(a, b) => TermNode::Div(f(a), f(b)),
            TermNode::Pow(a, b) => TermNode::Pow(f(a), f(b)),
            TermNode::Call(func, a) => TermNode::Call(*func, f(a)),
        }
    }

    /// Infix symbol and operands of a binary node.
    fn infix(&self) -> Option<(&'static str, &A, &A)> {
        match self {
            TermNode::Add(a, b) => Some(("+", a, b)),
            TermNode::Sub(a, b) => Some(("-", a, b)),
            TermNode::Mul(a, b) => Some(("*", a, b)),
            TermNode::Div(a, b) => Some(("/", a, b)),
            TermNode::Pow(a, b) => Some(("^", a, b)),
            _ => None,
        }
    }
}

/// A symbolic term.
///
/// [`Term::push`] appends a raw node. The lowercase builders ([`Term::add`],
/// [`Term::mul`], ...) fold numbers and drop neutral elements, which keeps
/// derivatives small. Both return the index of the resulting node; the term
/// itself stays rooted where it was until [`Term::set_root`].
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    nodes: Vec<TermNode>,
    root: TermIdx,
}

impl Term {
    /// An arena with no nodes; the root must be set before use.
    pub(crate) fn empty() -> Term {
        Term {
            nodes: Vec::new(),
            root: TermIdx(0),
        }
    }

    pub fn number(x: f64) -> Term {
        Term {
            nodes: vec![TermNode::Num(x)],
            root: TermIdx(0),
        }
    }

    pub fn symbol(name: impl Into<String>) -> Term {
        Term {
            nodes: vec![TermNode::Sym(name.into())],
            root: TermIdx(0),
        }
    }

    pub fn root(&self) -> TermIdx {
        self.root
    }

    /// Re-roots the term at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not a node of this term.
    pub fn set_root(&mut self, idx: TermIdx) {
        assert!(idx.0 < self.nodes.len(), "root {:?} out of bounds", idx);
        self.root = idx;
    }

    pub fn get(&self, idx: TermIdx) -> &TermNode {
        &self.nodes[idx.0]
    }

    /// Size of the arena, unreachable nodes included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends `node` as is.
    pub fn push(&mut self, node: TermNode) -> TermIdx {
        let idx = TermIdx(self.nodes.len());
        debug_assert!(
            {
                let mut ok = true;
                node.fmap_ref(|c| ok &= c.0 < idx.0);
                ok
            },
            "children must precede their parent"
        );
        self.nodes.push(node);
        idx
    }

    pub fn num(&mut self, x: f64) -> TermIdx {
        self.push(TermNode::Num(x))
    }

    pub fn sym(&mut self, name: impl Into<String>) -> TermIdx {
        self.push(TermNode::Sym(name.into()))
    }

    /// The number at `idx`, if that node is one.
    pub fn num_at(&self, idx: TermIdx) -> Option<f64> {
        match self.nodes[idx.0] {
            TermNode::Num(x) => Some(x),
            _ => None,
        }
    }

    /// The root as a number, if the whole term folded to one.
    pub fn as_num(&self) -> Option<f64> {
        self.num_at(self.root)
    }

    pub(crate) fn is_zero(&self, idx: TermIdx) -> bool {
        self.num_at(idx) == Some(0.0)
    }

    pub fn neg(&mut self, a: TermIdx) -> TermIdx {
        if let Some(x) = self.num_at(a) {
            return self.num(-x);
        }
        if let TermNode::Neg(inner) = self.get(a) {
            return *inner;
        }
        self.push(TermNode::Neg(a))
    }

    pub fn add(&mut self, a: TermIdx, b: TermIdx) -> TermIdx {
        match (self.num_at(a), self.num_at(b)) {
            (Some(x), Some(y)) => self.num(x + y),
            (Some(x), _) if x == 0.0 => b,
            (_, Some(y)) if y == 0.0 => a,
            _ => self.push(TermNode::Add(a, b)),
        }
    }

    pub fn sub(&mut self, a: TermIdx, b: TermIdx) -> TermIdx {
        match (self.num_at(a), self.num_at(b)) {
            (Some(x), Some(y)) => self.num(x - y),
            (_, Some(y)) if y == 0.0 => a,
            (Some(x), _) if x == 0.0 => self.neg(b),
            _ => self.push(TermNode::Sub(a, b)),
        }
    }

    pub fn mul(&mut self, a: TermIdx, b: TermIdx) -> TermIdx {
        match (self.num_at(a), self.num_at(b)) {
            (Some(x), Some(y)) => self.num(x * y),
            (Some(x), _) if x == 0.0 => self.num(0.0),
            (_, Some(y)) if y == 0.0 => self.num(0.0),
            (Some(x), _) if x == 1.0 => b,
            (_, Some(y)) if y == 1.0 => a,
            (Some(x), _) if x == -1.0 => self.neg(b),
            (_, Some(y)) if y == -1.0 => self.neg(a),
            _ => self.push(TermNode::Mul(a, b)),
        }
    }

    pub fn div(&mut self, a: TermIdx, b: TermIdx) -> TermIdx {
        match (self.num_at(a), self.num_at(b)) {
            (Some(x), Some(y)) if y != 0.0 => self.num(x / y),
            (Some(x), y) if x == 0.0 && y != Some(0.0) => a,
            (_, Some(y)) if y == 1.0 => a,
            _ => self.push(TermNode::Div(a, b)),
        }
    }

    pub fn pow(&mut self, a: TermIdx, b: TermIdx) -> TermIdx {
        match (self.num_at(a), self.num_at(b)) {
            (Some(x), Some(y)) if !(x == 0.0 && y < 0.0) => self.num(x.powf(y)),
            (_, Some(y)) if y == 0.0 => self.num(1.0),
            (_, Some(y)) if y == 1.0 => a,
            _ => self.push(TermNode::Pow(a, b)),
        }
    }

    pub fn call(&mut self, func: Func, a: TermIdx) -> TermIdx {
        match self.num_at(a) {
            Some(x) => self.num(func.eval(x)),
            None => self.push(TermNode::Call(func, a)),
        }
    }

    /// Number of reachable parents of every node; the root counts as used
    /// once, unreachable nodes as zero.
    pub(crate) fn uses(&self) -> Vec<usize> {
        let mut uses = vec![0; self.root.0 + 1];
        uses[self.root.0] = 1;
        for i in (0..=self.root.0).rev() {
            if uses[i] > 0 {
                self.nodes[i].fmap_ref(|c| uses[c.0] += 1);
            }
        }
        uses
    }

    /// Folds the reachable part bottom-up, children before parents.
    ///
    /// A shared node is folded once; its result is cloned for all but its
    /// last parent.
    pub fn try_fold<R, E, F>(&self, mut fold: F) -> Result<R, E>
    where
        R: Clone,
        F: FnMut(TermNode<&String, R>) -> Result<R, E>,
    {
        let mut uses = self.uses();
        let mut results: Vec<Option<R>> = std::iter::repeat_with(|| None).take(self.root.0 + 1).collect();

        for i in 0..=self.root.0 {
            if uses[i] == 0 {
                continue;
            }
            let node = self.nodes[i].fmap_ref(|c| {
                uses[c.0] -= 1;
                let result = if uses[c.0] == 0 {
                    results[c.0].take()
                } else {
                    results[c.0].clone()
                };
                result.expect("child folded before parent")
            });
            results[i] = Some(fold(node)?);
        }

        Ok(results[self.root.0].take().expect("root folded"))
    }

    /// Checks whether the symbol `name` occurs in this term.
    pub fn contains(&self, name: &str) -> bool {
        self.uses()
            .iter()
            .zip(&self.nodes)
            .any(|(&uses, node)| uses > 0 && matches!(node, TermNode::Sym(s) if s == name))
    }

    /// Replaces every bound symbol by its number.
    pub fn substitute(&self, bindings: &HashMap<String, f64>) -> Term {
        let nodes = self
            .nodes
            .iter()
            .map(|node| match node {
                TermNode::Sym(name) => match bindings.get(name) {
                    Some(&value) => TermNode::Num(value),
                    None => node.clone(),
                },
                _ => node.clone(),
            })
            .collect();
        Term { nodes, root: self.root }
    }

    /// Evaluates a closed term. The result may be NaN or infinite; callers
    /// decide whether that is an error.
    pub fn evaluate(&self) -> Result<f64, SymbolicError> {
        self.try_fold(|node: TermNode<&String, f64>| {
            let value = match node {
                TermNode::Num(x) => x,
                TermNode::Sym(name) => return Err(SymbolicError::Unbound(name.clone())),
                TermNode::Neg(a) => -a,
                TermNode::Add(a, b) => a + b,
                TermNode::Sub(a, b) => a - b,
                TermNode::Mul(a, b) => a * b,
                TermNode::Div(a, b) => a / b,
                TermNode::Pow(a, b) => a.powf(b),
                TermNode::Call(f, a) => f.eval(a),
            };
            Ok(value)
        })
    }
}

/// Fully parenthesized, in the syntax accepted by the parser.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Step {
            Node(TermIdx),
            Text(&'static str),
        }

        let mut stack = vec![Step::Node(self.root)];
        while let Some(step) = stack.pop() {
            let idx = match step {
                Step::Text(s) => {
                    f.write_str(s)?;
                    continue;
                }
                Step::Node(idx) => idx,
            };
            let node = &self.nodes[idx.0];
            if let Some((op, &a, &b)) = node.infix() {
                stack.extend([Step::Text(")"), Step::Node(b), Step::Text(" "), Step::Text(op), Step::Text(" ")]);
                stack.extend([Step::Node(a), Step::Text("(")]);
                continue;
            }
            match node {
                TermNode::Num(x) if *x < 0.0 => write!(f, "({})", x)?,
                TermNode::Num(x) => write!(f, "{}", x)?,
                TermNode::Sym(name) => f.write_str(name)?,
                TermNode::Neg(a) => stack.extend([Step::Text(")"), Step::Node(*a), Step::Text("(-")]),
                TermNode::Call(func, a) => {
                    stack.extend([Step::Text(")"), Step::Node(*a), Step::Text("("), Step::Text(func.name())])
                }
                _ => unreachable!("binary nodes are handled above"),
            }
        }
        Ok(())
    }
}
