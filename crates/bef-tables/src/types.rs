//! The `Types` section: an array of string handles, each parsed as an IR
//! type and memoized positionally.

use bef_format::ByteReader;
use bef_ir::{StringHandle, Type, TypeHandle};

use crate::strings::StringPool;
use crate::TableError;

/// The decoded type pool: one [`Type`] per positional [`TypeHandle`].
#[derive(Debug, Default)]
pub struct TypePool {
    types: Vec<Type>,
}

impl TypePool {
    /// Parse `payload` as a varint-count-prefixed array of string handles,
    /// resolving each eagerly against `strings`.
    ///
    /// Per the table loader contract, parse failures for entries never
    /// referenced from a function signature or register table are
    /// tolerated here and only surface if [`TypePool::resolve`] is later
    /// called on that index — but `Type::parse` never actually fails, so
    /// in practice the only failure mode is an unresolvable string handle,
    /// which is reported immediately since it indicates section corruption
    /// rather than a forward-compat type name.
    pub fn parse(payload: &[u8], strings: &StringPool<'_>) -> Result<Self, TableError> {
        let mut reader = ByteReader::new(payload);
        let count = reader.read_varint()?;
        let mut types = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
        for _ in 0..count {
            let offset = reader.read_varint()?;
            let handle = StringHandle::new(u32::try_from(offset).unwrap_or(u32::MAX));
            let name = strings.resolve(handle)?;
            types.push(Type::parse(name));
        }
        Ok(Self { types })
    }

    pub fn resolve(&self, handle: TypeHandle) -> Result<&Type, TableError> {
        self.types
            .get(handle.index())
            .ok_or(TableError::TypeOutOfRange(handle.0))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
