//! The `Kernels` section: an array of string handles naming each kernel,
//! addressed positionally by [`KernelNameHandle`].

use std::sync::Arc;

use bef_format::ByteReader;
use bef_ir::{KernelNameHandle, StringHandle};

use crate::strings::StringPool;
use crate::TableError;

#[derive(Debug, Default)]
pub struct KernelNamePool {
    names: Vec<Arc<str>>,
}

impl KernelNamePool {
    pub fn parse(payload: &[u8], strings: &StringPool<'_>) -> Result<Self, TableError> {
        let mut reader = ByteReader::new(payload);
        let count = reader.read_varint()?;
        let mut names = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
        for _ in 0..count {
            let offset = reader.read_varint()?;
            let handle = StringHandle::new(u32::try_from(offset).unwrap_or(u32::MAX));
            names.push(strings.resolve_arc(handle)?);
        }
        Ok(Self { names })
    }

    pub fn resolve(&self, handle: KernelNameHandle) -> Result<Arc<str>, TableError> {
        self.names
            .get(handle.index())
            .cloned()
            .ok_or(TableError::BadSection { what: "Kernels" })
    }
}
