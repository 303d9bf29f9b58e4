//! Function-body decoding (component D) and region stitching (component E).
//!
//! `bef-tables` turns the fixed sections into queryable pools; this crate
//! walks the `Functions` payload, one function at a time, and turns each
//! into a [`bef_ir::Region`]. Functions don't reference each other's
//! register state, so they decode independently — [`decode_functions`]
//! fans them out across a [`rayon`] pool and [`stitcher::stitch`] wires the
//! independent results back together into one [`bef_ir::Module`].

mod attribute_names;
mod function_decoder;
mod kernel_entry;
mod registers;
mod stitcher;

use bef_ir::SourceLoc;
use rayon::prelude::*;

pub use attribute_names::AttributeNamesTable;
pub use function_decoder::{decode_function, DecodeContext, DecodedFunctionBody};
pub use registers::RegisterTypesTable;
pub use stitcher::stitch;

/// Decode every function body in `ctx.function_index`, in parallel, and
/// return the results in original function-index order.
pub fn decode_functions(ctx: &DecodeContext<'_>) -> Result<Vec<DecodedFunctionBody>, DecodeError> {
    (0..ctx.function_index.len())
        .into_par_iter()
        .map(|position| decode_function(ctx, position))
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Format(#[from] bef_format::FormatError),

    #[error(transparent)]
    Table(#[from] bef_tables::TableError),

    #[error("function body offset is out of range")]
    FunctionOutOfRange,

    #[error("kernel entry word offset is out of range")]
    KernelEntryOutOfRange,

    #[error("function has arguments but an empty kernel table")]
    BadKernelTable,

    #[error("arguments pseudo-kernel produced more results than the function declares arguments")]
    ArgumentCountMismatch,

    #[error("register used before it was defined")]
    UndefinedRegister,

    #[error("register was defined more than once")]
    RegisterRedefined,

    #[error("register declared as `{declared}` but a kernel produced `{produced}`")]
    RegisterTypeMismatch { declared: String, produced: String },

    #[error("attribute offset {0} has no entry in the attribute pool")]
    UnknownAttribute(u32),

    #[error("a nested function region was never consumed by its owning operation")]
    UnresolvedRegion,

    /// A register-state violation (`UndefinedRegister`, `RegisterRedefined`,
    /// `RegisterTypeMismatch`) re-raised with the kernel's resolved source
    /// location attached — `registers::Register` itself has no notion of
    /// location, so callers in `function_decoder` wrap its bare errors with
    /// whichever location was in scope at the point of use.
    #[error("{source} (at {loc})")]
    AtLocation {
        loc: SourceLoc,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    #[must_use]
    pub fn at(self, loc: &SourceLoc) -> Self {
        Self::AtLocation {
            loc: loc.clone(),
            source: Box::new(self),
        }
    }

    /// The location attached by [`DecodeError::at`], if this error carries one.
    #[must_use]
    pub fn location(&self) -> Option<&SourceLoc> {
        match self {
            Self::AtLocation { loc, .. } => Some(loc),
            _ => None,
        }
    }
}
