//! The `LocationPositions` section: `(filename_index, line, column)`
//! records addressed by the byte offset of the record itself.

use bef_format::ByteReader;
use bef_ir::{LocationHandle, SourceLoc};

use crate::TableError;
use std::sync::Arc;

/// The raw `LocationPositions` payload, resolved lazily by offset.
///
/// Unlike `Strings`, records here aren't self-delimiting from an arbitrary
/// offset in isolation — resolving one re-parses the varint fields starting
/// at that offset. Entries are always pointed to from their own start, so
/// this is safe and keeps the loader from needing an up-front full scan.
#[derive(Debug)]
pub struct LocationTable<'a> {
    payload: &'a [u8],
    filenames: &'a [Arc<str>],
}

impl<'a> LocationTable<'a> {
    #[must_use]
    pub const fn new(payload: &'a [u8], filenames: &'a [Arc<str>]) -> Self {
        Self { payload, filenames }
    }

    /// Resolve the location record at `handle`.
    pub fn resolve(&self, handle: LocationHandle) -> Result<SourceLoc, TableError> {
        let offset = handle.index();
        if offset > self.payload.len() {
            return Err(TableError::BadSection {
                what: "LocationPositions",
            });
        }
        let mut reader = ByteReader::new(&self.payload[offset..]);
        let filename_index = reader.read_varint()?;
        let line = reader.read_varint()?;
        let column = reader.read_varint()?;

        let filename_index = usize::try_from(filename_index).unwrap_or(usize::MAX);
        let filename = self
            .filenames
            .get(filename_index)
            .ok_or(TableError::BadSection {
                what: "LocationPositions: filename_index out of range",
            })?
            .clone();

        Ok(SourceLoc::new(
            filename,
            u32::try_from(line).unwrap_or(u32::MAX),
            u32::try_from(column).unwrap_or(u32::MAX),
        ))
    }
}
