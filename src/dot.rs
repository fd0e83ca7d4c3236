//! Expression to DOT (Graphviz) conversion.
//!
//! This module renders the tree of an [`Expr`] in DOT format, which can be
//! visualized using Graphviz tools like `dot` or online viewers.
//!
//! # DOT Format
//!
//! The generated DOT output follows these conventions:
//! - **Measured leaves** are boxes labeled with their variable and `value ± error`,
//!   all at the bottom (sink rank)
//! - **Constant leaves** are plain-text nodes with their value
//! - **Operator nodes** are circles labeled with the operator symbol or function name
//! - **Edges** point from an operator to its operands; the right operand of a
//!   non-commutative operator (`-`, `/`, `^`) is dashed
//! - **The root** is drawn with a double border
//!
//! # Examples
//!
//! ```
//! use propeller_rs::ev;
//!
//! let a = ev(1.0, 0.1);
//! let b = ev(2.0, 0.2);
//! let f = (&a + &b).sin();
//!
//! let dot = f.to_dot().unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::fmt::Write as _;

use crate::ast::{BinaryOp, Expr, Leaf, Node, UnaryOp};

/// Configuration options for DOT output generation.
///
/// # Examples
///
/// ```
/// use propeller_rs::ev;
/// use propeller_rs::dot::DotConfig;
///
/// let x = ev(1.0, 0.1);
/// let config = DotConfig {
///     operator_shape: "circle",
///     measured_shape: "box",
///     constant_shape: "plaintext",
///     rhs_edge_style: "dashed",
///     show_values: true,
///     rankdir: "BT",
/// };
///
/// let dot = x.exp().to_dot_with_config(&config).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for operator nodes (default: "circle")
    pub operator_shape: &'static str,
    /// Shape for measured leaves (default: "box")
    pub measured_shape: &'static str,
    /// Shape for constant leaves (default: "plaintext")
    pub constant_shape: &'static str,
    /// Style for the right operand of `-`, `/` and `^` (default: "dashed")
    pub rhs_edge_style: &'static str,
    /// Whether measured leaves show `value ± error` next to the name (default: true)
    pub show_values: bool,
    /// Graph direction (default: "BT", leaves at the bottom)
    pub rankdir: &'static str,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            operator_shape: "circle",
            measured_shape: "box",
            constant_shape: "plaintext",
            rhs_edge_style: "dashed",
            show_values: true,
            rankdir: "BT",
        }
    }
}

fn operator_label(node: &Node) -> &'static str {
    match node {
        Node::Unary(UnaryOp::Neg, _) => "-",
        Node::Unary(op, _) => op.name(),
        Node::Binary(op, _, _) => op.symbol(),
        Node::Leaf(_) => unreachable!("leaves have no operator"),
    }
}

fn is_commutative(op: BinaryOp) -> bool {
    matches!(op, BinaryOp::Add | BinaryOp::Mul)
}

impl Expr {
    /// Converts the expression tree to DOT (Graphviz) format.
    ///
    /// Node `n{i}` is the `i`-th node of the arena; the root is the last one.
    /// Repeated uses of one value appear as separate leaves, exactly as the
    /// propagator sees them before deduplication.
    ///
    /// # Examples
    ///
    /// ```
    /// use propeller_rs::ev;
    ///
    /// let a = ev(1.0, 0.1);
    /// let f = &a * &a - 1.0;
    ///
    /// let dot = f.to_dot().unwrap();
    /// assert!(dot.contains("x1"));
    /// println!("{}", dot);
    /// ```
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the expression tree to DOT format with custom configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use propeller_rs::ev;
    /// use propeller_rs::dot::DotConfig;
    ///
    /// let f = ev(2.0, 0.1).ln();
    /// let config = DotConfig {
    ///     show_values: false,
    ///     ..DotConfig::default()
    /// };
    ///
    /// let dot = f.to_dot_with_config(&config).unwrap();
    /// assert!(!dot.contains("±"));
    /// ```
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "rankdir={};", config.rankdir)?;
        writeln!(dot, "node [shape={}];", config.operator_shape)?;

        let root = self.nodes.len() - 1;

        // Leaves, grouped at the sink
        writeln!(dot, "{{ rank=sink")?;
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf(Leaf::Measured { val, id }) => {
                    let label = if config.show_values {
                        format!("{}\\n{}", id, val)
                    } else {
                        id.to_string()
                    };
                    writeln!(dot, "n{} [shape={}, label=\"{}\"];", i, config.measured_shape, label)?;
                }
                Node::Leaf(Leaf::Constant(c)) => {
                    writeln!(dot, "n{} [shape={}, label=\"{}\"];", i, config.constant_shape, c)?;
                }
                _ => {}
            }
        }
        writeln!(dot, "}}")?;

        // Operators and their operand edges
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf(_) => continue,
                Node::Unary(_, a) => {
                    writeln!(dot, "n{} [label=\"{}\"];", i, operator_label(node))?;
                    writeln!(dot, "n{} -> n{};", i, a.index())?;
                }
                Node::Binary(op, a, b) => {
                    writeln!(dot, "n{} [label=\"{}\"];", i, operator_label(node))?;
                    writeln!(dot, "n{} -> n{};", i, a.index())?;
                    if is_commutative(*op) {
                        writeln!(dot, "n{} -> n{};", i, b.index())?;
                    } else {
                        writeln!(dot, "n{} -> n{} [style={}];", i, b.index(), config.rhs_edge_style)?;
                    }
                }
            }
        }

        writeln!(dot, "n{} [peripheries=2];", root)?;
        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
