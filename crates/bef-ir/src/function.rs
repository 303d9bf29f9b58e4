//! Top-level function entities.

use std::sync::Arc;

use crate::region::Region;
use crate::types::Type;

/// Whether a function has a BEF-encoded body or is an external declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunctionKind {
    /// Body decoded from the `Functions` section.
    Bef,
    /// No body; represented by the host runtime (out of scope here).
    Native,
}

/// A top-level function in the decoded module.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    /// Unnamed functions never reach the module as a `Function` — they are
    /// consumed as nested regions by the region stitcher instead, so every
    /// `Function` here has a real name.
    pub name: Arc<str>,
    pub kind: FunctionKind,
    pub arg_types: Vec<Type>,
    pub result_types: Vec<Type>,
    /// `None` for `FunctionKind::Native`.
    pub body: Option<Region>,
}

impl Function {
    #[must_use]
    pub const fn is_native(&self) -> bool {
        matches!(self.kind, FunctionKind::Native)
    }
}
