//! Rendering expressions as symbolic formulas.
//!
//! The output is the input language of the symbolic engine:
//!
//! - constants are number literals, negatives wrapped as `(-2.5)`,
//! - measured leaves are their [`VarId`] names (`x0`, `x1`, ...),
//! - binary nodes are `(a + b)`, `(a - b)`, `(a * b)`, `(a / b)`, `(a ^ b)`,
//! - negation is `(-a)`, other unary nodes are `f(a)` with `f` one of
//!   `exp log log10 sin cos tan atan abs`.
//!
//! Every compound node is parenthesized, so the parse never depends on
//! operator precedence.

use std::collections::HashMap;

use crate::ast::{Expr, Idx, Leaf, Node, UnaryOp};
use crate::types::VarId;

/// Renders `expr`, naming every measured leaf after its own id.
pub fn render(expr: &Expr) -> String {
    render_with(expr, |id| id)
}

/// Renders `expr`, naming every measured leaf after `alias(id)`.
///
/// Deduplication uses this to give every member of a class the name of its
/// canonical leaf. The tree is walked with an explicit stack and written into
/// one buffer, so the cost is linear in the size of the output.
pub fn render_with<F>(expr: &Expr, alias: F) -> String
where
    F: Fn(VarId) -> VarId,
{
    enum Step {
        Node(Idx),
        Text(&'static str),
    }

    let mut out = String::new();
    let mut stack = vec![Step::Node(Idx(expr.size() - 1))];
    while let Some(step) = stack.pop() {
        let idx = match step {
            Step::Text(s) => {
                out.push_str(s);
                continue;
            }
            Step::Node(idx) => idx,
        };
        match expr.get(idx) {
            Node::Leaf(Leaf::Measured { id, .. }) => out.push_str(&alias(*id).to_string()),
            Node::Leaf(Leaf::Constant(c)) => out.push_str(&literal(*c)),
            Node::Unary(UnaryOp::Neg, a) => stack.extend([Step::Text(")"), Step::Node(*a), Step::Text("(-")]),
            Node::Unary(op, a) => {
                stack.extend([Step::Text(")"), Step::Node(*a), Step::Text("("), Step::Text(op.name())]);
            }
            Node::Binary(op, a, b) => {
                stack.extend([Step::Text(")"), Step::Node(*b), Step::Text(" "), Step::Text(op.symbol())]);
                stack.extend([Step::Text(" "), Step::Node(*a), Step::Text("(")]);
            }
        }
    }
    out
}

/// Renders with an explicit alias table; ids missing from `aliases` keep
/// their own name.
pub fn render_aliased(expr: &Expr, aliases: &HashMap<VarId, VarId>) -> String {
    render_with(expr, |id| aliases.get(&id).copied().unwrap_or(id))
}

/// Shortest decimal that reads back as exactly `c`.
fn literal(c: f64) -> String {
    if c.is_sign_negative() && c != 0.0 {
        format!("(-{})", -c)
    } else {
        format!("{}", c.abs())
    }
}

impl Expr {
    /// The symbolic formula of this expression, for diagnostics.
    pub fn to_symbolic_string(&self) -> String {
        render(self)
    }
}
