//! Byte-level reader and section container for the BEF binary format.
//!
//! This crate covers the first two stages of decoding: a raw [`ByteReader`]
//! cursor, and [`SectionTable`], which splits a whole file into its
//! length-prefixed, 8-byte-aligned sections. It knows nothing about what a
//! section's payload *means* — that's left to `bef-tables` and
//! `bef-decode`, which borrow sections out of a `SectionTable` and parse
//! them further.

mod reader;
mod reverse_varint;
mod section;

pub use reader::ByteReader;
pub use reverse_varint::read_reverse_varint;
pub use section::{SectionId, SectionTable};

#[cfg(any(test, feature = "test-support"))]
pub use reverse_varint::encode_reverse_varint;

/// The two magic bytes every BEF file must begin with.
pub const MAGIC: [u8; 2] = *b"BE";

/// Section payloads, and the file as a whole, are padded to this alignment.
pub const SECTION_ALIGNMENT: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("unexpected end of input: needed {needed} byte(s), {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("varint exceeds 64 bits")]
    VarintTooLong,

    #[error("bad magic bytes: expected {expected:02x?}, found {found:02x?}")]
    BadMagic { expected: [u8; 2], found: [u8; 2] },

    #[error("unknown section id {0:#x}")]
    BadSection(u8),

    #[error("section {id:#x} length {length} would extend past end of file")]
    SectionOverrun { id: u8, length: u64 },
}
