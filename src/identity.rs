//! Variable identity assignment.
//!
//! Every measured leaf of an [`Expr`] owns a [`VarId`] slot, and the slots of
//! one expression are exactly `0..measured_count()`. Composition keeps this
//! invariant by copying both operands and shifting the ids of the right-hand
//! side past those of the left-hand side:
//!
//! ```text
//! a = x0 * x1          (2 measured leaves)
//! b = sin(x0)          (1 measured leaf)
//! a + b = (x0 * x1) + sin(x2)
//! ```
//!
//! Identity is positional, not reference-based: `a + a` yields two distinct
//! slots `x0` and `x1` even though both came from the same leaf. Recognizing
//! them as one random variable is left to the deduplication pass in
//! [`propagate`][crate::propagate].

use crate::ast::{BinaryOp, Expr, Idx, Leaf, Node, UnaryOp};
use crate::types::VarId;

/// Builds `op(operand)`. Ids are unchanged.
pub fn compose_unary(op: UnaryOp, operand: Expr) -> Expr {
    let Expr { mut nodes, measured } = operand;
    let root = Idx(nodes.len() - 1);
    nodes.push(Node::Unary(op, root));
    Expr { nodes, measured }
}

/// Builds `lhs op rhs`, shifting the ids of `rhs` by `lhs.measured_count()`.
pub fn compose_binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    let Expr { mut nodes, measured } = lhs;
    let offset = nodes.len();
    let lhs_root = Idx(offset - 1);

    let mut rhs = rhs;
    let rhs_measured = rhs.measured;
    shift_ids(&mut rhs, measured);
    nodes.reserve(rhs.nodes.len() + 1);
    nodes.extend(rhs.nodes.into_iter().map(|node| node.fmap(|idx| Idx(idx.0 + offset))));
    let rhs_root = Idx(nodes.len() - 1);
    nodes.push(Node::Binary(op, lhs_root, rhs_root));

    let measured = measured.checked_add(rhs_measured).expect("Variable id overflow");
    Expr { nodes, measured }
}

/// Moves every measured id of `expr` up by `offset` slots.
///
/// The result no longer satisfies the `0..measured_count()` invariant on its
/// own; it is meant for placing `expr` after `offset` other variables.
pub fn shift_ids(expr: &mut Expr, offset: u32) {
    for node in expr.nodes.iter_mut() {
        if let Node::Leaf(Leaf::Measured { id, .. }) = node {
            *id = id.shifted(offset);
        }
    }
}

/// Checks that the measured ids of `expr` are exactly `0..measured_count()`.
pub fn check_ids(expr: &Expr) -> bool {
    let mut seen = vec![false; expr.measured_count()];
    for leaf in expr.leaves() {
        if let Some(id) = leaf.id() {
            match seen.get_mut(id.index()) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
    }
    seen.into_iter().all(|s| s)
}

/// Measured ids in left-to-right order.
pub fn ids(expr: &Expr) -> Vec<VarId> {
    expr.measured_leaves().into_iter().map(|(id, _)| id).collect()
}
