//! The `FunctionIndex` section: one record per function, giving its kind,
//! the byte offset of its body in `Functions`, its name, and its signature.

use bef_format::ByteReader;
use bef_ir::{FunctionKind, StringHandle, TypeHandle};

use crate::TableError;

/// One record from the function index.
#[derive(Clone, Debug)]
pub struct FunctionIndexEntry {
    pub kind: FunctionKind,
    pub function_offset: u32,
    pub name: StringHandle,
    pub arg_types: Vec<TypeHandle>,
    pub result_types: Vec<TypeHandle>,
}

/// The full, ordered function index. Position in this list is a function's
/// [`bef_ir::FuncIndex`].
#[derive(Debug, Default)]
pub struct FunctionIndex {
    entries: Vec<FunctionIndexEntry>,
}

fn read_type_handle_array(reader: &mut ByteReader<'_>) -> Result<Vec<TypeHandle>, TableError> {
    let count = reader.read_varint()?;
    let mut handles = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
    for _ in 0..count {
        let raw = reader.read_varint()?;
        handles.push(TypeHandle::new(u32::try_from(raw).unwrap_or(u32::MAX)));
    }
    Ok(handles)
}

impl FunctionIndex {
    pub fn parse(payload: &[u8]) -> Result<Self, TableError> {
        let mut reader = ByteReader::new(payload);
        let count = reader.read_varint()?;
        let mut entries = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
        for _ in 0..count {
            let kind_byte = reader.read_u8()?;
            let kind = match kind_byte {
                0 => FunctionKind::Bef,
                1 => FunctionKind::Native,
                _ => {
                    return Err(TableError::BadSection {
                        what: "FunctionIndex: unknown function kind byte",
                    })
                }
            };
            let function_offset = reader.read_varint()?;
            let name_offset = reader.read_varint()?;
            let arg_types = read_type_handle_array(&mut reader)?;
            let result_types = read_type_handle_array(&mut reader)?;

            entries.push(FunctionIndexEntry {
                kind,
                function_offset: u32::try_from(function_offset).unwrap_or(u32::MAX),
                name: StringHandle::new(u32::try_from(name_offset).unwrap_or(u32::MAX)),
                arg_types,
                result_types,
            });
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[FunctionIndexEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
