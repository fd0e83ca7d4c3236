//! Type-safe identifier for measured leaves.
//!
//! Every measured leaf inside an [`Expr`][crate::ast::Expr] carries a [`VarId`].
//! Within one expression the ids of all measured leaves are exactly
//! `0..measured_count` with no repetition; see [`identity`][crate::identity].
use std::fmt;

/// A variable slot (0-indexed).
///
/// Ids are positional: they name the n-th measured leaf of an expression in
/// left-to-right order, not a particular source value. Composing two
/// expressions shifts the ids of the right-hand side.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct VarId(u32);

impl VarId {
    /// Creates a new variable id.
    pub const fn new(id: u32) -> Self {
        VarId(id)
    }

    /// Returns the raw id as a `u32`.
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the raw id as an index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns this id moved up by `offset` slots.
    ///
    /// # Panics
    ///
    /// Panics if the shifted id does not fit into `u32`.
    pub fn shifted(self, offset: u32) -> Self {
        VarId(self.0.checked_add(offset).expect("Variable id overflow"))
    }
}

/// Renders the symbolic name of the variable, e.g. `x3`.
impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<VarId> for u32 {
    fn from(var: VarId) -> Self {
        var.0
    }
}

impl From<u32> for VarId {
    fn from(id: u32) -> Self {
        VarId(id)
    }
}
