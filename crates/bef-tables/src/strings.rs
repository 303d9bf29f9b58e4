//! The `Strings` and `LocationFilenames` sections: both are concatenated
//! NUL-terminated byte strings addressed by byte offset, so they share one
//! loader.

use std::sync::Arc;

use bef_format::ByteReader;
use bef_ir::StringHandle;

use crate::TableError;

/// A pool of NUL-terminated strings, addressed by the byte offset of their
/// first character.
#[derive(Debug, Default)]
pub struct StringPool<'a> {
    data: &'a [u8],
}

impl<'a> StringPool<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Resolve a handle to the borrowed `&str` starting at its offset.
    ///
    /// The offset must land on a string start (the format's invariant);
    /// this only validates that the offset is in range and that the bytes
    /// up to the next NUL form valid UTF-8.
    pub fn resolve(&self, handle: StringHandle) -> Result<&'a str, TableError> {
        let start = handle.index();
        if start > self.data.len() {
            return Err(TableError::StringOutOfRange(handle.0));
        }
        let end = self.data[start..]
            .iter()
            .position(|&b| b == 0)
            .map_or(self.data.len(), |rel| start + rel);
        std::str::from_utf8(&self.data[start..end])
            .map_err(|_| TableError::StringOutOfRange(handle.0))
    }

    /// Resolve a handle to an owned, interned string.
    pub fn resolve_arc(&self, handle: StringHandle) -> Result<Arc<str>, TableError> {
        self.resolve(handle).map(Arc::from)
    }
}

/// Parse every NUL-terminated entry in `payload` into an ordered list,
/// used for `LocationFilenames` where entries are indexed positionally
/// rather than by offset.
pub fn parse_filename_list(payload: &[u8]) -> Result<Vec<Arc<str>>, TableError> {
    let mut reader = ByteReader::new(payload);
    let mut names = Vec::new();
    while !reader.is_empty() {
        let bytes = reader.read_cstr()?;
        let name = std::str::from_utf8(bytes).map_err(|_| TableError::BadSection {
            what: "LocationFilenames",
        })?;
        names.push(Arc::from(name));
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_string_by_offset() {
        let pool = StringPool::new(b"hello\0world\0");
        assert_eq!(pool.resolve(StringHandle::new(0)).unwrap(), "hello");
        assert_eq!(pool.resolve(StringHandle::new(6)).unwrap(), "world");
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        let pool = StringPool::new(b"hi\0");
        assert!(matches!(
            pool.resolve(StringHandle::new(100)),
            Err(TableError::StringOutOfRange(100))
        ));
    }

    #[test]
    fn filename_list_is_positional() {
        let names = parse_filename_list(b"a.rs\0b.rs\0").unwrap();
        assert_eq!(&*names[0], "a.rs");
        assert_eq!(&*names[1], "b.rs");
    }
}
