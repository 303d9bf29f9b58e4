//! Splits a whole BEF file into its raw sections.

use rustc_hash::FxHashMap;

use crate::reader::ByteReader;
use crate::{FormatError, MAGIC};

/// The closed set of section identifiers a decoder understands.
///
/// Any byte value outside this set is a *non-critical unknown section*: it
/// is retained in [`SectionTable::unknown`] under its raw id, never
/// rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SectionId {
    FormatVersion,
    LocationFilenames,
    LocationPositions,
    Strings,
    Attributes,
    Kernels,
    Types,
    Functions,
    FunctionIndex,
    AttributeTypes,
    AttributeNames,
    RegisterTypes,
}

impl SectionId {
    const ALL: [Self; 12] = [
        Self::FormatVersion,
        Self::LocationFilenames,
        Self::LocationPositions,
        Self::Strings,
        Self::Attributes,
        Self::Kernels,
        Self::Types,
        Self::Functions,
        Self::FunctionIndex,
        Self::AttributeTypes,
        Self::AttributeNames,
        Self::RegisterTypes,
    ];

    #[must_use]
    pub const fn raw_id(self) -> u8 {
        match self {
            Self::FormatVersion => 0,
            Self::LocationFilenames => 1,
            Self::LocationPositions => 2,
            Self::Strings => 3,
            Self::Attributes => 4,
            Self::Kernels => 5,
            Self::Types => 6,
            Self::Functions => 7,
            Self::FunctionIndex => 8,
            Self::AttributeTypes => 9,
            Self::AttributeNames => 10,
            Self::RegisterTypes => 11,
        }
    }

    #[must_use]
    pub fn from_raw_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.raw_id() == id)
    }

    /// Sections whose absence degrades decoding rather than aborting it.
    /// Splitting emits a warning, never an error, when one of these is
    /// missing.
    #[must_use]
    pub const fn is_optional(self) -> bool {
        matches!(
            self,
            Self::AttributeTypes | Self::AttributeNames | Self::RegisterTypes
        )
    }
}

/// The outer container parsed out of a whole BEF file: a mapping from
/// section identifier to its raw, still-unparsed payload slice.
///
/// `SectionTable` only understands the container framing. It has no opinion
/// about what a `Strings` or `Functions` payload looks like inside — that's
/// the job of the crates built on top of it.
#[derive(Debug)]
pub struct SectionTable<'a> {
    known: FxHashMap<SectionId, &'a [u8]>,
    /// Unknown section ids, retained verbatim for forward-compatibility.
    pub unknown: FxHashMap<u8, &'a [u8]>,
}

impl<'a> SectionTable<'a> {
    /// Parse the magic prefix and every section that follows it.
    ///
    /// Duplicate sections are last-writer-wins: a later occurrence of the
    /// same id silently replaces the payload recorded for an earlier one.
    pub fn parse(data: &'a [u8]) -> Result<Self, FormatError> {
        let mut reader = ByteReader::new(data);
        let found = [reader.read_u8()?, reader.read_u8()?];
        if found != MAGIC {
            return Err(FormatError::BadMagic {
                expected: MAGIC,
                found,
            });
        }

        let mut known = FxHashMap::default();
        let mut unknown = FxHashMap::default();

        while !reader.is_empty() {
            let id = reader.read_u8()?;
            let length = reader.read_varint()?;
            let payload = reader.take(usize::try_from(length).map_err(|_| {
                FormatError::SectionOverrun { id, length }
            })?)?;

            match SectionId::from_raw_id(id) {
                Some(section) => {
                    known.insert(section, payload);
                }
                None => {
                    unknown.insert(id, payload);
                }
            }
        }

        Ok(Self { known, unknown })
    }

    #[must_use]
    pub fn get(&self, section: SectionId) -> Option<&'a [u8]> {
        self.known.get(&section).copied()
    }

    /// Optional sections absent from this table, in declaration order.
    /// Callers use this to emit the single `MissingOptionalTable` warning
    /// per absent table that splitting promises.
    #[must_use]
    pub fn missing_optional_tables(&self) -> Vec<SectionId> {
        SectionId::ALL
            .into_iter()
            .filter(|s| s.is_optional() && !self.known.contains_key(s))
            .collect()
    }
}
