//! Decodes one function body (component D), and reserved nested-region
//! slots to be filled in later by the region stitcher (component E).

use bef_format::ByteReader;
use bef_ir::{
    AttrOffset, Attribute, Block, BlockArgument, DecodePolicy, Diagnostics, FuncIndex, FunctionKind,
    KernelNameHandle, LocationHandle, Operation, OpResult, Region, SourceLoc, StringHandle, Value,
};
use bef_tables::{AttributePool, FunctionIndex, KernelNamePool, LocationTable, StringPool, TypePool};

use crate::attribute_names::AttributeNamesTable;
use crate::kernel_entry::{decode_kernel_entry, KernelEntry, WordStream};
use crate::registers::{build_register_table, Register, RegisterTypesTable};
use crate::DecodeError;

/// Everything component D produces for one function: its region body (if
/// it has one) plus the nested-region references it still needs resolved
/// by the stitcher, keyed by the position of the referencing operation in
/// this function's own block.
#[derive(Debug, Default)]
pub struct DecodedFunctionBody {
    pub region: Option<Region>,
    /// `(operation index in this function's block, referenced unnamed function indices in order)`.
    pub deferred: Vec<(u32, Vec<FuncIndex>)>,
    pub diagnostics: Diagnostics,
}

/// Shared read-only context every function decode needs.
pub struct DecodeContext<'a> {
    pub functions_payload: &'a [u8],
    pub strings: &'a StringPool<'a>,
    pub types: &'a TypePool,
    pub kernels: &'a KernelNamePool,
    pub locations: &'a LocationTable<'a>,
    pub attributes: &'a AttributePool,
    pub attribute_names: &'a AttributeNamesTable,
    pub register_types: Option<&'a RegisterTypesTable>,
    pub function_index: &'a FunctionIndex,
    pub policy: DecodePolicy,
}

/// Decode the body of one function from the index.
pub fn decode_function(
    ctx: &DecodeContext<'_>,
    function_position: usize,
) -> Result<DecodedFunctionBody, DecodeError> {
    let entry = &ctx.function_index.entries()[function_position];
    if entry.kind == FunctionKind::Native {
        return Ok(DecodedFunctionBody::default());
    }
    tracing::trace!(function_position, "decoding function body");

    let start = entry.function_offset as usize;
    let body = ctx
        .functions_payload
        .get(start..)
        .ok_or(DecodeError::FunctionOutOfRange)?;
    let mut reader = ByteReader::new(body);

    let location_offset = reader.read_varint()?;
    let defining_loc = ctx
        .locations
        .resolve(LocationHandle::new(u32::try_from(location_offset).unwrap_or(u32::MAX)))?;

    let use_count = reader.read_varint()?;
    let mut uses = Vec::with_capacity(usize::try_from(use_count).unwrap_or(0));
    for _ in 0..use_count {
        uses.push(reader.read_varint()?);
    }
    let declared_types = ctx
        .register_types
        .and_then(|table| table.sub_array(function_position))
        .unwrap_or(&[]);
    let mut registers = build_register_table(declared_types, ctx.types, &uses)?;

    let kernel_count = reader.read_varint()?;
    let mut kernel_table = Vec::with_capacity(usize::try_from(kernel_count).unwrap_or(0));
    for _ in 0..kernel_count {
        let offset = reader.read_varint()?;
        let num_operands = reader.read_varint()?;
        kernel_table.push((
            u32::try_from(offset).unwrap_or(u32::MAX),
            num_operands,
        ));
    }

    // The function's declared result registers double as the trailing
    // return kernel's operands (see the writer's convention exercised in
    // the S2 fixture test below); here they're only bounds-checked, since
    // the return kernel itself is decoded through the ordinary kernel path.
    for _ in 0..entry.result_types.len() {
        let raw = reader.read_varint()?;
        let idx = usize::try_from(raw).unwrap_or(usize::MAX);
        if idx >= registers.len() {
            return Err(DecodeError::UndefinedRegister.at(&defining_loc));
        }
    }

    reader.read_aligned(4)?;
    let word_stream_bytes = reader.take(reader.remaining())?;
    let stream = WordStream::new(word_stream_bytes);

    let mut diagnostics = Diagnostics::new();
    let mut block = Block::new();
    let mut deferred = Vec::new();

    let mut attr_name_cursor = ctx.attribute_names.cursor(function_position);
    let mut kernel_cursor = 0usize;

    if !entry.arg_types.is_empty() {
        let (offset, _) = kernel_table
            .first()
            .copied()
            .ok_or(DecodeError::BadKernelTable)?;
        let pseudo = decode_kernel_entry(&stream, offset)?;
        for (i, result_reg) in pseudo.results.iter().enumerate() {
            let arg_type_handle = *entry
                .arg_types
                .get(i)
                .ok_or_else(|| DecodeError::ArgumentCountMismatch.at(&defining_loc))?;
            let arg_type = ctx.types.resolve(arg_type_handle)?.clone();
            block.arguments.push(BlockArgument {
                ty: arg_type.clone(),
            });
            registers[result_reg.index()]
                .define(&arg_type, Value::BlockArgument(i as u32))
                .map_err(|e| e.at(&defining_loc))?;
        }
        kernel_cursor = 1;
    }

    for &(offset, _num_operands) in &kernel_table[kernel_cursor..] {
        let raw_entry = decode_kernel_entry(&stream, offset)?;
        let op_index = block.operations.len() as u32;
        let op = decode_ordinary_kernel(
            ctx,
            raw_entry,
            &mut registers,
            op_index,
            &mut attr_name_cursor,
            &mut diagnostics,
            &mut deferred,
        )?;
        block.operations.push(op);
    }

    for register in &registers {
        if register.declared_uses != 0 && register.seen_uses != register.declared_uses {
            tracing::warn!(
                declared = register.declared_uses,
                observed = register.seen_uses,
                "register use-count mismatch"
            );
            diagnostics.push_warning(
                defining_loc.clone(),
                format!(
                    "register declared {} use(s) but {} observed",
                    register.declared_uses, register.seen_uses
                ),
            );
        }
    }

    let region = Region::new(defining_loc, block);
    Ok(DecodedFunctionBody {
        region: Some(region),
        deferred,
        diagnostics,
    })
}

#[allow(clippy::too_many_arguments)]
fn decode_ordinary_kernel(
    ctx: &DecodeContext<'_>,
    raw: KernelEntry,
    registers: &mut [Register],
    op_index: u32,
    attr_name_cursor: &mut crate::attribute_names::AttributeNameCursor<'_>,
    diagnostics: &mut Diagnostics,
    deferred: &mut Vec<(u32, Vec<FuncIndex>)>,
) -> Result<Operation, DecodeError> {
    let name = ctx.kernels.resolve(KernelNameHandle::new(raw.name.0))?;
    let loc = ctx.locations.resolve(raw.location)?;
    let mut op = Operation::new(name, loc.clone());

    for arg in &raw.arguments {
        let reg = registers
            .get_mut(arg.index())
            .ok_or_else(|| DecodeError::UndefinedRegister.at(&loc))?;
        op.operands.push(reg.record_use().map_err(|e| e.at(&loc))?);
    }

    op.non_strict = attr_name_cursor.read_non_strict_marker()?;

    for (i, attr_offset) in raw.attributes.iter().enumerate() {
        let attr_name = attr_name_cursor.read_attribute_name(ctx.strings, i)?;
        let value = resolve_attribute(ctx, *attr_offset, &loc, diagnostics)?;
        op.attributes.insert(attr_name, value);
    }

    let mut unnamed_refs = Vec::new();
    for func_index in &raw.functions {
        let referenced = ctx
            .function_index
            .entries()
            .get(func_index.index())
            .ok_or(DecodeError::FunctionOutOfRange)?;
        let name = ctx.strings.resolve(StringHandle::new(referenced.name.0));
        let is_named = name.map(|s| !s.is_empty()).unwrap_or(false);
        if is_named {
            op.symbol_ref = Some(ctx.strings.resolve_arc(StringHandle::new(referenced.name.0))?);
        } else {
            unnamed_refs.push(*func_index);
        }
    }
    if !unnamed_refs.is_empty() {
        deferred.push((op_index, unnamed_refs));
    }

    for (i, result_reg) in raw.results.iter().enumerate() {
        let reg = registers
            .get_mut(result_reg.index())
            .ok_or_else(|| DecodeError::UndefinedRegister.at(&loc))?;
        let produced_type = reg.ty.clone();
        reg.define(&produced_type, Value::op_result(op_index, i as u32))
            .map_err(|e| e.at(&loc))?;
        op.results.push(OpResult { ty: reg.ty.clone() });
    }

    Ok(op)
}

fn resolve_attribute(
    ctx: &DecodeContext<'_>,
    offset: AttrOffset,
    loc: &SourceLoc,
    diagnostics: &mut Diagnostics,
) -> Result<Attribute, DecodeError> {
    match ctx.attributes.get(offset) {
        Some(value) => Ok(value.clone()),
        None if ctx.policy.is_strict() => Err(DecodeError::UnknownAttribute(offset.0)),
        None => {
            tracing::warn!(offset = offset.0, "unrecognized attribute offset; substituting placeholder");
            diagnostics.push_warning(
                loc.clone(),
                format!("unrecognized attribute offset {offset}; substituting placeholder"),
            );
            Ok(Attribute::placeholder())
        }
    }
}
