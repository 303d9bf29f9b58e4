//! Regions and blocks.

use crate::loc::SourceLoc;
use crate::op::{BlockArgument, Operation};

/// An ordered sequence of operations with typed block arguments.
///
/// BEF only ever produces single-block regions; `Block` is still its own
/// type (rather than folding its fields into `Region`) because an operation
/// addresses values by `(op_index, result_index)` *within a block*, and
/// keeping that addressing scope named makes the decoder's bookkeeping
/// read the same way the spec describes it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub arguments: Vec<BlockArgument>,
    pub operations: Vec<Operation>,
}

impl Block {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            arguments: Vec::new(),
            operations: Vec::new(),
        }
    }
}

/// The body of a function, or a nested region owned by an operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub loc: SourceLoc,
    pub block: Block,
}

impl Region {
    #[must_use]
    pub const fn new(loc: SourceLoc, block: Block) -> Self {
        Self { loc, block }
    }
}
