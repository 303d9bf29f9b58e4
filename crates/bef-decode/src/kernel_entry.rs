//! Decodes one kernel entry out of a function's word stream.
//!
//! A kernel entry is a fixed 6-word header followed by a flat run of
//! `u32`s whose boundaries are implied purely by the header counts:
//! arguments, then attributes, then callee function indices, then result
//! registers, then one used-by sub-run per result. There is no length
//! field for the entry as a whole — the cursor simply stops once it has
//! consumed exactly that many words.

use bef_ir::{AttrOffset, FuncIndex, KernelNameHandle, LocationHandle, RegisterIndex};

use crate::DecodeError;

/// A cursor over a function's kernel-entry word stream (the bytes left
/// after the register table, kernel table, result registers, and
/// 4-byte alignment have been consumed).
pub struct WordStream<'a> {
    words: &'a [u8],
}

impl<'a> WordStream<'a> {
    #[must_use]
    pub const fn new(words: &'a [u8]) -> Self {
        Self { words }
    }

    fn read_word(&self, word_index: u32) -> Result<u32, DecodeError> {
        let byte_offset = (word_index as usize)
            .checked_mul(4)
            .ok_or(DecodeError::KernelEntryOutOfRange)?;
        let bytes = self
            .words
            .get(byte_offset..byte_offset + 4)
            .ok_or(DecodeError::KernelEntryOutOfRange)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }
}

/// One decoded kernel entry, still in terms of raw handles — the caller
/// resolves names, locations, and attributes against the relevant pools.
#[derive(Debug)]
pub struct KernelEntry {
    pub name: KernelNameHandle,
    pub location: LocationHandle,
    pub arguments: Vec<RegisterIndex>,
    pub attributes: Vec<AttrOffset>,
    pub functions: Vec<FuncIndex>,
    pub results: Vec<RegisterIndex>,
    pub used_by: Vec<Vec<RegisterIndex>>,
}

/// Decode the kernel entry beginning at word index `entry_offset`.
pub fn decode_kernel_entry(stream: &WordStream<'_>, entry_offset: u32) -> Result<KernelEntry, DecodeError> {
    let mut cursor = entry_offset;
    let mut next = || -> Result<u32, DecodeError> {
        let w = stream.read_word(cursor)?;
        cursor += 1;
        Ok(w)
    };

    let name = KernelNameHandle::new(next()?);
    let location = LocationHandle::new(next()?);
    let num_arguments = next()?;
    let num_attributes = next()?;
    let num_functions = next()?;
    let num_results = next()?;

    let mut used_by_counts = Vec::with_capacity(num_results as usize);
    for _ in 0..num_results {
        used_by_counts.push(next()?);
    }

    let mut arguments = Vec::with_capacity(num_arguments as usize);
    for _ in 0..num_arguments {
        arguments.push(RegisterIndex::new(next()?));
    }

    let mut attributes = Vec::with_capacity(num_attributes as usize);
    for _ in 0..num_attributes {
        attributes.push(AttrOffset::new(next()?));
    }

    let mut functions = Vec::with_capacity(num_functions as usize);
    for _ in 0..num_functions {
        functions.push(FuncIndex::new(next()?));
    }

    let mut results = Vec::with_capacity(num_results as usize);
    for _ in 0..num_results {
        results.push(RegisterIndex::new(next()?));
    }

    let mut used_by = Vec::with_capacity(used_by_counts.len());
    for count in used_by_counts {
        let mut group = Vec::with_capacity(count as usize);
        for _ in 0..count {
            group.push(RegisterIndex::new(next()?));
        }
        used_by.push(group);
    }

    Ok(KernelEntry {
        name,
        location,
        arguments,
        attributes,
        functions,
        results,
        used_by,
    })
}
