//! Region stitcher (component E).
//!
//! Component D decodes every BEF-kind function — named or unnamed — into
//! an independent region, plus a per-function list of operations that
//! still reference unnamed functions by index. Stitching resolves those
//! references first (moving each unnamed region into the operation that
//! named it), then emits one [`Function`] per named entry in index order.
//! Resolving nested regions before top-level emission, rather than after,
//! lets both passes share one slot array instead of juggling two
//! containers for what is otherwise the same decoded data.

use bef_ir::{Function, FunctionKind, Module, StringHandle};
use bef_tables::{FunctionIndex, StringPool, TypePool};

use crate::function_decoder::DecodedFunctionBody;
use crate::DecodeError;

/// Move every deferred nested region into its referencing operation, then
/// assemble the module from the named top-level entries.
pub fn stitch(
    function_index: &FunctionIndex,
    bodies: Vec<DecodedFunctionBody>,
    strings: &StringPool<'_>,
    types: &TypePool,
) -> Result<Module, DecodeError> {
    let mut slots: Vec<Option<_>> = Vec::with_capacity(bodies.len());
    let mut deferred: Vec<_> = Vec::with_capacity(bodies.len());
    for body in bodies {
        slots.push(body.region);
        deferred.push(body.deferred);
    }

    // Pass 1: nested region resolution.
    for owner in 0..slots.len() {
        let owner_deferred = std::mem::take(&mut deferred[owner]);
        if owner_deferred.is_empty() {
            continue;
        }
        let mut region = slots[owner].take().ok_or(DecodeError::FunctionOutOfRange)?;
        for (op_index, refs) in owner_deferred {
            let mut resolved = Vec::with_capacity(refs.len());
            for func_ref in refs {
                let nested = slots
                    .get_mut(func_ref.index())
                    .and_then(Option::take)
                    .ok_or(DecodeError::UnresolvedRegion)?;
                resolved.push(nested);
            }
            let op = region
                .block
                .operations
                .get_mut(op_index as usize)
                .ok_or(DecodeError::FunctionOutOfRange)?;
            op.regions = resolved;
        }
        slots[owner] = Some(region);
    }

    // Every unnamed function's region must have been consumed exactly
    // once above; anything left over is a dangling reference the writer
    // never resolved.
    for (i, entry) in function_index.entries().iter().enumerate() {
        let is_named = strings
            .resolve(StringHandle::new(entry.name.0))
            .map(|s| !s.is_empty())
            .unwrap_or(false);
        if !is_named && entry.kind != FunctionKind::Native && slots[i].is_some() {
            return Err(DecodeError::UnresolvedRegion);
        }
    }

    // Pass 2: top-level emission, in function-index order.
    let mut module = Module::new();
    for (i, entry) in function_index.entries().iter().enumerate() {
        let name = strings.resolve(StringHandle::new(entry.name.0))?;
        if name.is_empty() {
            continue;
        }
        let arg_types = entry
            .arg_types
            .iter()
            .map(|h| types.resolve(*h).map(Clone::clone))
            .collect::<Result<Vec<_>, _>>()?;
        let result_types = entry
            .result_types
            .iter()
            .map(|h| types.resolve(*h).map(Clone::clone))
            .collect::<Result<Vec<_>, _>>()?;

        module.functions.push(Function {
            name: name.into(),
            kind: entry.kind,
            arg_types,
            result_types,
            body: slots[i].take(),
        });
    }

    Ok(module)
}
