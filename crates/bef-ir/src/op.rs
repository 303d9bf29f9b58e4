//! Operations: the decoded form of a BEF kernel.

use std::sync::Arc;

use crate::attribute::AttributeDict;
use crate::loc::SourceLoc;
use crate::region::Region;
use crate::types::Type;
use crate::value::Value;

/// A declared block argument.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockArgument {
    pub ty: Type,
}

/// A declared operation result.
#[derive(Clone, Debug, PartialEq)]
pub struct OpResult {
    pub ty: Type,
}

/// A single decoded operation (the IR form of a kernel, or the synthetic
/// trailing `return`).
#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    pub name: Arc<str>,
    pub loc: SourceLoc,
    pub operands: Vec<Value>,
    pub results: Vec<OpResult>,
    pub attributes: AttributeDict,
    /// Set from the one-byte non-strict marker that precedes a kernel's
    /// attributes in the stream, when present.
    pub non_strict: bool,
    /// Nested regions, filled in by the region stitcher for operations with
    /// unnamed-function references; empty for every other operation.
    pub regions: Vec<Region>,
    /// Name of a callee referenced by a *named* function index entry.
    pub symbol_ref: Option<Arc<str>>,
}

impl Operation {
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, loc: SourceLoc) -> Self {
        Self {
            name: name.into(),
            loc,
            operands: Vec::new(),
            results: Vec::new(),
            attributes: AttributeDict::new(),
            non_strict: false,
            regions: Vec::new(),
            symbol_ref: None,
        }
    }
}
