//! The `AttributeNames` section.
//!
//! Unlike the other tables, this one isn't addressed randomly: it's a
//! sequential stream consumed in lockstep with a function's ordinary
//! kernels, one non-strict marker byte and then one name per attribute,
//! in kernel-table order. Organizing it as a per-function sub-array (like
//! `RegisterTypes`) keeps each function's decode self-contained, which is
//! what lets `bef-decode` run functions in parallel.

use std::sync::Arc;

use bef_format::ByteReader;
use bef_ir::StringHandle;
use bef_tables::StringPool;

use crate::DecodeError;

#[derive(Debug, Default)]
pub struct AttributeNamesTable {
    per_function: Vec<Vec<u8>>,
}

impl AttributeNamesTable {
    pub fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(payload);
        let function_count = reader.read_varint()?;
        let mut per_function = Vec::with_capacity(usize::try_from(function_count).unwrap_or(0));
        for _ in 0..function_count {
            let len = reader.read_varint()?;
            let bytes = reader.take(usize::try_from(len).unwrap_or(0))?;
            per_function.push(bytes.to_vec());
        }
        Ok(Self { per_function })
    }

    /// A cursor over one function's slice of the stream. Returns an empty
    /// cursor (every kernel sees `non_strict = false`, zero attribute
    /// names) when the whole section is absent or this function has no
    /// entry.
    #[must_use]
    pub fn cursor(&self, function_index: usize) -> AttributeNameCursor<'_> {
        AttributeNameCursor {
            reader: ByteReader::new(
                self.per_function
                    .get(function_index)
                    .map_or(&[][..], Vec::as_slice),
            ),
        }
    }
}

pub struct AttributeNameCursor<'a> {
    reader: ByteReader<'a>,
}

impl AttributeNameCursor<'_> {
    /// Read the one-byte non-strict marker that precedes a kernel's
    /// attributes. Absence of the section (empty cursor) degrades to
    /// `false`.
    pub fn read_non_strict_marker(&mut self) -> Result<bool, DecodeError> {
        if self.reader.is_empty() {
            return Ok(false);
        }
        Ok(self.reader.read_u8()? != 0)
    }

    pub fn read_attribute_name(
        &mut self,
        strings: &StringPool<'_>,
        index: usize,
    ) -> Result<Arc<str>, DecodeError> {
        if self.reader.is_empty() {
            // Degraded mode: section absent or exhausted. Synthesize a name.
            return Ok(Arc::from(format!("attr{index}")));
        }
        let offset = self.reader.read_varint()?;
        let handle = StringHandle::new(u32::try_from(offset).unwrap_or(u32::MAX));
        Ok(strings.resolve_arc(handle)?)
    }
}
