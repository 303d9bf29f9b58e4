//! Per-function register tables.
//!
//! A register starts `Declared` (known type, zero uses so far) and becomes
//! `Defined` the moment some kernel's result assigns it. `bef-ir`'s
//! [`WriteOnce`] encodes that transition; this module adds the bookkeeping
//! `bef-decode` needs around it (declared use counts, the state machine's
//! error cases).

use bef_format::ByteReader;
use bef_ir::{RegisterIndex, Type, TypeHandle, Value, WriteOnce};

use crate::DecodeError;

/// The `RegisterTypes` section: one sub-array of type handles per function
/// with a body, in `FunctionIndex` order. Functions with no entry here (the
/// whole section is absent) default every register to [`Type::None`].
#[derive(Debug, Default)]
pub struct RegisterTypesTable {
    per_function: Vec<Vec<TypeHandle>>,
}

impl RegisterTypesTable {
    pub fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(payload);
        let function_count = reader.read_varint()?;
        let mut per_function = Vec::with_capacity(usize::try_from(function_count).unwrap_or(0));
        for _ in 0..function_count {
            let sub_len = reader.read_varint()?;
            let mut handles = Vec::with_capacity(usize::try_from(sub_len).unwrap_or(0));
            for _ in 0..sub_len {
                let raw = reader.read_varint()?;
                handles.push(TypeHandle::new(u32::try_from(raw).unwrap_or(u32::MAX)));
            }
            per_function.push(handles);
        }
        Ok(Self { per_function })
    }

    #[must_use]
    pub fn sub_array(&self, function_index: usize) -> Option<&[TypeHandle]> {
        self.per_function.get(function_index).map(Vec::as_slice)
    }
}

/// One function's register state during decode.
#[derive(Clone, Debug)]
pub struct Register {
    pub ty: Type,
    pub declared_uses: u64,
    pub seen_uses: u64,
    produced: WriteOnce<Value>,
}

impl Register {
    #[must_use]
    const fn new(ty: Type, declared_uses: u64) -> Self {
        Self {
            ty,
            declared_uses,
            seen_uses: 0,
            produced: WriteOnce::empty(),
        }
    }

    #[must_use]
    pub const fn is_defined(&self) -> bool {
        self.produced.is_set()
    }

    #[must_use]
    pub fn produced_value(&self) -> Option<Value> {
        self.produced.get().copied()
    }

    /// Record a use; callers compare `seen_uses` against `declared_uses`
    /// after decoding the function to surface a mismatch warning (a
    /// contract violation from the writer, not a structural error).
    pub fn record_use(&mut self) -> Result<Value, DecodeError> {
        let value = self
            .produced
            .get()
            .copied()
            .ok_or(DecodeError::UndefinedRegister)?;
        self.seen_uses += 1;
        Ok(value)
    }

    /// Define this register for the first time, adopting `produced_type`
    /// when the register's declared type is `Type::None` (missing
    /// `RegisterTypes`), else requiring an exact match.
    pub fn define(&mut self, produced_type: &Type, value: Value) -> Result<(), DecodeError> {
        if self.ty.is_none() {
            self.ty = produced_type.clone();
        } else if &self.ty != produced_type {
            return Err(DecodeError::RegisterTypeMismatch {
                declared: self.ty.to_string(),
                produced: produced_type.to_string(),
            });
        }
        if !self.produced.set(value) {
            return Err(DecodeError::RegisterRedefined);
        }
        Ok(())
    }
}

/// Build the register table for one function: zip its declared types
/// (defaulting to `Type::None` when `RegisterTypes` doesn't cover it) with
/// its register-uses counts.
pub fn build_register_table(
    declared_types: &[TypeHandle],
    type_pool: &bef_tables::TypePool,
    uses: &[u64],
) -> Result<Vec<Register>, DecodeError> {
    let mut registers = Vec::with_capacity(uses.len());
    for (i, &use_count) in uses.iter().enumerate() {
        let ty = match declared_types.get(i) {
            Some(handle) => type_pool.resolve(*handle)?.clone(),
            None => Type::None,
        };
        registers.push(Register::new(ty, use_count));
    }
    Ok(registers)
}

#[must_use]
pub fn register_index(raw: u32) -> RegisterIndex {
    RegisterIndex::new(raw)
}
