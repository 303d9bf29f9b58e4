//! Decoders for BEF's fixed table sections.
//!
//! Each loader here turns one section's raw payload (already split out by
//! `bef-format::SectionTable`) into a queryable pool: strings and
//! filenames by offset, types and kernel names positionally, locations by
//! record offset, attributes driven by their type descriptors, and the
//! function index as an ordered list of signatures. `bef-decode` composes
//! these pools while walking function bodies.

mod attributes;
mod function_index;
mod kernels;
mod locations;
mod strings;
mod types;

pub use attributes::AttributePool;
pub use function_index::{FunctionIndex, FunctionIndexEntry};
pub use kernels::KernelNamePool;
pub use locations::LocationTable;
pub use strings::{parse_filename_list, StringPool};
pub use types::TypePool;

/// The one format version this decoder understands.
pub const SUPPORTED_FORMAT_VERSION: u8 = 1;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error(transparent)]
    Format(#[from] bef_format::FormatError),

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),

    #[error("string handle {0} out of range")]
    StringOutOfRange(u32),

    #[error("type handle {0} out of range")]
    TypeOutOfRange(u32),

    #[error("unknown attribute descriptor kind {0}")]
    UnknownAttributeDescriptor(u32),

    #[error("malformed section: {what}")]
    BadSection { what: &'static str },
}

/// Parse and validate the `FormatVersion` section: exactly one byte, which
/// must equal [`SUPPORTED_FORMAT_VERSION`].
pub fn parse_format_version(payload: &[u8]) -> Result<u8, TableError> {
    match payload {
        [version] if *version == SUPPORTED_FORMAT_VERSION => Ok(*version),
        [version] => Err(TableError::UnsupportedVersion(*version)),
        _ => Err(TableError::BadSection {
            what: "FormatVersion: expected exactly one byte",
        }),
    }
}
