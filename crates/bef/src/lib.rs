//! Decodes a BEF binary container into a typed [`Module`].
//!
//! This crate is the thin umbrella over the pipeline: [`bef_format`] splits
//! the byte buffer into sections, [`bef_tables`] turns the fixed sections
//! into queryable pools, and [`bef_decode`] walks function bodies and
//! stitches nested regions back together. `decode` is the only entry
//! point; there is no CLI, no file I/O, and no persistent state here.

pub use bef_ir::{
    Diagnostic, Diagnostics, DecodePolicy, Module, Severity,
};
pub use bef_ir::SourceLoc;

use bef_format::SectionTable;
use bef_tables::{
    parse_filename_list, parse_format_version, AttributePool, FunctionIndex, KernelNamePool,
    LocationTable, StringPool, TypePool,
};
use bef_decode::{decode_functions, stitch, AttributeNamesTable, DecodeContext, RegisterTypesTable};

/// Everything that can go wrong decoding a BEF buffer, aggregated from the
/// lower layers of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] bef_format::FormatError),
    #[error(transparent)]
    Table(#[from] bef_tables::TableError),
    #[error(transparent)]
    Decode(#[from] bef_decode::DecodeError),
}

/// The module plus every warning accumulated while decoding it. Even a
/// fully successful decode can carry warnings (a missing optional table, a
/// register use-count mismatch), so they are never silently dropped on the
/// success path.
#[derive(Debug)]
pub struct DecodeOutcome {
    pub module: Module,
    pub diagnostics: Diagnostics,
}

/// Returned when decoding aborts: the fatal error, plus every warning
/// emitted before it was hit.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct DecodeFailure {
    #[source]
    pub error: Error,
    pub diagnostics: Diagnostics,
}

/// Decode a whole BEF buffer into a [`Module`].
///
/// `origin_location` substitutes for any location a diagnostic would
/// otherwise carry but can't resolve (e.g. a container-level error, before
/// any `LocationPositions` record has been read).
pub fn decode(
    buffer: &[u8],
    origin_location: SourceLoc,
    policy: DecodePolicy,
) -> Result<DecodeOutcome, DecodeFailure> {
    let mut diagnostics = Diagnostics::new();
    match decode_inner(buffer, &origin_location, policy, &mut diagnostics) {
        Ok(module) => Ok(DecodeOutcome { module, diagnostics }),
        Err(error) => {
            tracing::error!(%error, "decode aborted");
            let loc = error_location(&error).unwrap_or(&origin_location).clone();
            diagnostics.push_error(loc, error.to_string());
            Err(DecodeFailure { error, diagnostics })
        }
    }
}

/// Convenience wrapper for the common case: [`DecodePolicy::default`]
/// (`Lenient`).
pub fn decode_lenient(buffer: &[u8], origin_location: SourceLoc) -> Result<DecodeOutcome, DecodeFailure> {
    decode(buffer, origin_location, DecodePolicy::default())
}

/// A fatal error's resolved source location, when the layer that detected it
/// had one available (e.g. `UndefinedRegister` resolved from the kernel's
/// own location offset, per the decoder's location-attachment contract).
/// Container-level errors (bad magic, truncation) have none, and fall back
/// to the caller's `origin_location`.
fn error_location(error: &Error) -> Option<&SourceLoc> {
    match error {
        Error::Decode(decode_error) => decode_error.location(),
        Error::Format(_) | Error::Table(_) => None,
    }
}

fn decode_inner(
    buffer: &[u8],
    origin_location: &SourceLoc,
    policy: DecodePolicy,
    diagnostics: &mut Diagnostics,
) -> Result<Module, Error> {
    let sections = SectionTable::parse(buffer)?;
    for missing in sections.missing_optional_tables() {
        diagnostics.push_warning(
            origin_location.clone(),
            format!("optional table {missing:?} is absent; decoding will degrade for it"),
        );
    }

    let version_payload = sections.get(bef_format::SectionId::FormatVersion).unwrap_or(&[]);
    let version = parse_format_version(version_payload)?;
    tracing::debug!(version, "format version accepted");

    let filenames = parse_filename_list(sections.get(bef_format::SectionId::LocationFilenames).unwrap_or(&[]))?;
    let strings = StringPool::new(sections.get(bef_format::SectionId::Strings).unwrap_or(&[]));
    let locations = LocationTable::new(
        sections.get(bef_format::SectionId::LocationPositions).unwrap_or(&[]),
        &filenames,
    );
    let types = TypePool::parse(sections.get(bef_format::SectionId::Types).unwrap_or(&[0x00]), &strings)?;
    let kernels = KernelNamePool::parse(sections.get(bef_format::SectionId::Kernels).unwrap_or(&[0x00]), &strings)?;
    let function_index = FunctionIndex::parse(sections.get(bef_format::SectionId::FunctionIndex).unwrap_or(&[0x00]))?;

    let attributes = AttributePool::parse(
        sections.get(bef_format::SectionId::AttributeTypes).unwrap_or(&[0x00]),
        sections.get(bef_format::SectionId::Attributes).unwrap_or(&[]),
        &types,
        policy,
        diagnostics,
    )?;

    let attribute_names = match sections.get(bef_format::SectionId::AttributeNames) {
        Some(payload) => AttributeNamesTable::parse(payload)?,
        None => AttributeNamesTable::default(),
    };
    let register_types = match sections.get(bef_format::SectionId::RegisterTypes) {
        Some(payload) => Some(RegisterTypesTable::parse(payload)?),
        None => None,
    };

    let functions_payload = sections.get(bef_format::SectionId::Functions).unwrap_or(&[]);

    let ctx = DecodeContext {
        functions_payload,
        strings: &strings,
        types: &types,
        kernels: &kernels,
        locations: &locations,
        attributes: &attributes,
        attribute_names: &attribute_names,
        register_types: register_types.as_ref(),
        function_index: &function_index,
        policy,
    };

    tracing::trace!(count = function_index.len(), "decoding function bodies");
    let mut bodies = decode_functions(&ctx)?;
    for body in &mut bodies {
        diagnostics.extend(std::mem::take(&mut body.diagnostics));
    }

    let module = stitch(&function_index, bodies, &strings, &types)?;
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bef_format::{encode_reverse_varint, MAGIC};

    fn section(id: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![id];
        assert!(payload.len() < 0x80);
        out.push(payload.len() as u8);
        out.extend_from_slice(payload);
        out
    }

    fn section_id(id: bef_format::SectionId) -> u8 {
        id.raw_id()
    }

    // S1: an empty module decodes cleanly with no functions and no warnings.
    #[test]
    fn empty_module_decodes_with_zero_functions() {
        let mut data = MAGIC.to_vec();
        data.extend(section(section_id(bef_format::SectionId::FormatVersion), &[1]));
        data.extend(section(section_id(bef_format::SectionId::FunctionIndex), &[0x00]));
        data.extend(section(section_id(bef_format::SectionId::Types), &[0x00]));
        data.extend(section(section_id(bef_format::SectionId::Kernels), &[0x00]));
        data.extend(section(section_id(bef_format::SectionId::AttributeTypes), &[0x00]));
        data.extend(section(section_id(bef_format::SectionId::AttributeNames), &[0x00]));
        data.extend(section(section_id(bef_format::SectionId::RegisterTypes), &[0x00]));

        let outcome = decode_lenient(&data, SourceLoc::unknown()).unwrap();
        assert!(outcome.module.functions.is_empty());
        assert!(outcome.diagnostics.is_empty());
    }

    // S6: AttributeTypes absent degrades to a warning, not a failure.
    #[test]
    fn missing_attribute_types_warns_instead_of_failing() {
        let mut data = MAGIC.to_vec();
        data.extend(section(section_id(bef_format::SectionId::FormatVersion), &[1]));
        data.extend(section(section_id(bef_format::SectionId::FunctionIndex), &[0x00]));
        data.extend(section(section_id(bef_format::SectionId::Types), &[0x00]));
        data.extend(section(section_id(bef_format::SectionId::Kernels), &[0x00]));

        let outcome = decode_lenient(&data, SourceLoc::unknown()).unwrap();
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.message.contains("AttributeTypes")));
    }

    // S3: a string attribute resolves through the reverse-varint length prefix.
    #[test]
    fn string_attribute_resolves_via_reverse_length() {
        let mut attr_types = vec![1u8];
        attr_types.extend_from_slice(&1u32.to_le_bytes()); // offset=1: length byte precedes it
        attr_types.extend_from_slice(&2u32.to_le_bytes()); // kind=2 (String)

        let mut attrs = encode_reverse_varint(3);
        attrs.extend_from_slice(b"abc");

        let mut data = MAGIC.to_vec();
        data.extend(section(section_id(bef_format::SectionId::FormatVersion), &[1]));
        data.extend(section(section_id(bef_format::SectionId::FunctionIndex), &[0x00]));
        data.extend(section(section_id(bef_format::SectionId::Types), &[0x00]));
        data.extend(section(section_id(bef_format::SectionId::Kernels), &[0x00]));
        data.extend(section(section_id(bef_format::SectionId::AttributeTypes), &attr_types));
        data.extend(section(section_id(bef_format::SectionId::Attributes), &attrs));

        let outcome = decode_lenient(&data, SourceLoc::unknown()).unwrap();
        assert!(outcome.module.functions.is_empty());
    }

    // S2: a named function `f : (i32) -> (i32)` whose body is `return arg0`.
    #[test]
    fn full_function_with_argument_and_return() {
        let mut push = |buf: &mut Vec<u8>, v: u32| buf.extend_from_slice(&v.to_le_bytes());

        let mut pseudo_words = Vec::new();
        push(&mut pseudo_words, 0); // name handle (unused by the pseudo-kernel path)
        push(&mut pseudo_words, 0); // location (unused)
        push(&mut pseudo_words, 0); // num_arguments
        push(&mut pseudo_words, 0); // num_attributes
        push(&mut pseudo_words, 0); // num_functions
        push(&mut pseudo_words, 1); // num_results: one block argument
        push(&mut pseudo_words, 0); // used_by_counts[0]
        push(&mut pseudo_words, 0); // results[0]: register 0

        let return_offset = u8::try_from(pseudo_words.len() / 4).unwrap();
        let mut return_words = Vec::new();
        push(&mut return_words, 0); // kernel name handle -> "hex.return"
        push(&mut return_words, 0); // location offset -> LocationPositions[0] (absent, falls back)
        push(&mut return_words, 1); // num_arguments
        push(&mut return_words, 0); // num_attributes
        push(&mut return_words, 0); // num_functions
        push(&mut return_words, 0); // num_results
        push(&mut return_words, 0); // arguments[0]: register 0

        let mut function_body = vec![
            0x00, // location = 0
            0x01, // register-uses count = 1
            0x01, // register 0 declared_uses = 1
            0x02, // kernel table count = 2
            0x00, 0x00, // kernel[0] = (offset=0, num_operands=0): the arguments pseudo-kernel
            return_offset, 0x01, // kernel[1] = (offset=return_offset, num_operands=1)
            0x00, // result-regs[0] = register 0
        ];
        while function_body.len() % 4 != 0 {
            function_body.push(0);
        }
        function_body.extend_from_slice(&pseudo_words);
        function_body.extend_from_slice(&return_words);

        let mut data = MAGIC.to_vec();
        data.extend(section(section_id(bef_format::SectionId::FormatVersion), &[1]));
        data.extend(section(
            section_id(bef_format::SectionId::FunctionIndex),
            &[0x01, 0x00, 0x00, 0x04, 0x01, 0x00, 0x01, 0x00],
        ));
        data.extend(section(section_id(bef_format::SectionId::Types), &[0x01, 0x00]));
        data.extend(section(
            section_id(bef_format::SectionId::Strings),
            b"i32\0f\0hex.return\0",
        ));
        data.extend(section(section_id(bef_format::SectionId::Kernels), &[0x01, 0x06]));
        data.extend(section(
            section_id(bef_format::SectionId::LocationFilenames),
            b"f.bef\0",
        ));
        data.extend(section(
            section_id(bef_format::SectionId::LocationPositions),
            &[0x00, 0x00, 0x00], // filename_index=0, line=0, column=0
        ));
        data.extend(section(section_id(bef_format::SectionId::Functions), &function_body));

        let outcome = decode_lenient(&data, SourceLoc::unknown()).unwrap();
        assert_eq!(outcome.module.functions.len(), 1);
        let f = &outcome.module.functions[0];
        assert_eq!(&*f.name, "f");
        let block = &f.body.as_ref().unwrap().block;
        assert_eq!(block.arguments.len(), 1);
        assert_eq!(block.operations.len(), 1);
        assert_eq!(&*block.operations[0].name, "hex.return");
        assert_eq!(
            block.operations[0].operands,
            vec![bef_ir::Value::BlockArgument(0)]
        );
    }

    // A function signature declaring fewer argument types than the
    // arguments pseudo-kernel actually produces results for must fail
    // cleanly with a fatal error, not panic on an out-of-bounds index.
    #[test]
    fn pseudo_kernel_result_overrun_is_fatal_not_a_panic() {
        let mut push = |buf: &mut Vec<u8>, v: u32| buf.extend_from_slice(&v.to_le_bytes());

        // arguments pseudo-kernel producing 2 block arguments, while the
        // function index below declares only 1 argument type.
        let mut pseudo_words = Vec::new();
        push(&mut pseudo_words, 0); // name handle (unused)
        push(&mut pseudo_words, 0); // location (unused)
        push(&mut pseudo_words, 0); // num_arguments
        push(&mut pseudo_words, 0); // num_attributes
        push(&mut pseudo_words, 0); // num_functions
        push(&mut pseudo_words, 2); // num_results: two block arguments
        push(&mut pseudo_words, 0); // used_by_counts[0]
        push(&mut pseudo_words, 0); // used_by_counts[1]
        push(&mut pseudo_words, 0); // results[0]: register 0
        push(&mut pseudo_words, 1); // results[1]: register 1

        let mut function_body = vec![
            0x00, // location = 0
            0x02, // register-uses count = 2
            0x00, 0x00, // register 0, register 1 declared_uses = 0
            0x01, // kernel table count = 1
            0x00, 0x00, // kernel[0] = (offset=0, num_operands=0): the arguments pseudo-kernel
        ];
        while function_body.len() % 4 != 0 {
            function_body.push(0);
        }
        function_body.extend_from_slice(&pseudo_words);

        let mut data = MAGIC.to_vec();
        data.extend(section(section_id(bef_format::SectionId::FormatVersion), &[1]));
        data.extend(section(
            section_id(bef_format::SectionId::FunctionIndex),
            &[0x01, 0x00, 0x00, 0x04, 0x01, 0x00, 0x00], // one named function, arg_types=[0], result_types=[]
        ));
        data.extend(section(section_id(bef_format::SectionId::Types), &[0x01, 0x00]));
        data.extend(section(section_id(bef_format::SectionId::Strings), b"i32\0f\0"));
        data.extend(section(
            section_id(bef_format::SectionId::LocationFilenames),
            b"f.bef\0",
        ));
        data.extend(section(
            section_id(bef_format::SectionId::LocationPositions),
            &[0x00, 0x00, 0x00],
        ));
        data.extend(section(section_id(bef_format::SectionId::Functions), &function_body));

        let failure = decode_lenient(&data, SourceLoc::unknown()).unwrap_err();
        assert!(matches!(failure.error, Error::Decode(_)));
    }

    // S4: a kernel referencing register index == register_table.size() is
    // fatal `UndefinedRegister`, and the error's location resolves from the
    // kernel's own location offset rather than the caller's origin.
    #[test]
    fn undefined_register_fails_with_kernel_location() {
        let mut words = Vec::new();
        let mut word = |v: u32| words.extend_from_slice(&v.to_le_bytes());
        word(0); // kernel name handle -> "op"
        word(0); // location offset -> LocationPositions[0]
        word(1); // num_arguments
        word(0); // num_attributes
        word(0); // num_functions
        word(0); // num_results
        word(0); // argument[0]: register 0, out of range (zero registers declared)

        let mut function_body = vec![
            0x00, // location varint = 0
            0x00, // register-uses count = 0
            0x01, // kernel table count = 1
            0x00, // kernel table entry 0: offset = 0 (word index)
            0x01, // kernel table entry 0: num_operands = 1
        ];
        // Pad to the next 4-byte boundary before the kernel word stream.
        while function_body.len() % 4 != 0 {
            function_body.push(0);
        }
        function_body.extend_from_slice(&words);

        let mut data = MAGIC.to_vec();
        data.extend(section(section_id(bef_format::SectionId::FormatVersion), &[1]));
        data.extend(section(
            section_id(bef_format::SectionId::FunctionIndex),
            &[0x01, 0x00, 0x00, 0x00, 0x00, 0x00], // one named, zero-arg/zero-result function at offset 0
        ));
        data.extend(section(section_id(bef_format::SectionId::Types), &[0x00]));
        data.extend(section(section_id(bef_format::SectionId::Strings), b"f\0op\0"));
        data.extend(section(section_id(bef_format::SectionId::Kernels), &[0x01, 0x02]));
        data.extend(section(
            section_id(bef_format::SectionId::LocationFilenames),
            b"f.bef\0",
        ));
        data.extend(section(
            section_id(bef_format::SectionId::LocationPositions),
            &[0x00, 0x01, 0x01], // filename_index=0, line=1, column=1
        ));
        data.extend(section(section_id(bef_format::SectionId::Functions), &function_body));

        let failure = decode_lenient(&data, SourceLoc::unknown()).unwrap_err();
        assert!(matches!(failure.error, Error::Decode(_)));
        let reported = failure.diagnostics.iter().last().unwrap();
        assert_eq!(&*reported.loc.filename, "f.bef");
        assert_eq!(reported.loc.line, 1);
    }

    // Boundary case: every register in the function has zero declared
    // uses (the writer never tracked use counts for this function), yet
    // the register is still used once as `hex.return`'s operand. Zero
    // declared uses is a "contract not tracked" marker, not "must be
    // unused" — so no use-count mismatch warning should fire.
    #[test]
    fn zero_declared_uses_produces_no_mismatch_warning() {
        let mut push = |buf: &mut Vec<u8>, v: u32| buf.extend_from_slice(&v.to_le_bytes());

        let mut pseudo_words = Vec::new();
        push(&mut pseudo_words, 0); // name handle (unused by the pseudo-kernel path)
        push(&mut pseudo_words, 0); // location (unused)
        push(&mut pseudo_words, 0); // num_arguments
        push(&mut pseudo_words, 0); // num_attributes
        push(&mut pseudo_words, 0); // num_functions
        push(&mut pseudo_words, 1); // num_results: one block argument
        push(&mut pseudo_words, 0); // used_by_counts[0]
        push(&mut pseudo_words, 0); // results[0]: register 0

        let return_offset = u8::try_from(pseudo_words.len() / 4).unwrap();
        let mut return_words = Vec::new();
        push(&mut return_words, 0); // kernel name handle -> "hex.return"
        push(&mut return_words, 0); // location offset -> LocationPositions[0]
        push(&mut return_words, 1); // num_arguments
        push(&mut return_words, 0); // num_attributes
        push(&mut return_words, 0); // num_functions
        push(&mut return_words, 0); // num_results
        push(&mut return_words, 0); // arguments[0]: register 0

        let mut function_body = vec![
            0x00, // location = 0
            0x01, // register-uses count = 1
            0x00, // register 0 declared_uses = 0 (untracked)
            0x02, // kernel table count = 2
            0x00, 0x00, // kernel[0] = (offset=0, num_operands=0): the arguments pseudo-kernel
            return_offset, 0x01, // kernel[1] = (offset=return_offset, num_operands=1)
            0x00, // result-regs[0] = register 0
        ];
        while function_body.len() % 4 != 0 {
            function_body.push(0);
        }
        function_body.extend_from_slice(&pseudo_words);
        function_body.extend_from_slice(&return_words);

        let mut data = MAGIC.to_vec();
        data.extend(section(section_id(bef_format::SectionId::FormatVersion), &[1]));
        data.extend(section(
            section_id(bef_format::SectionId::FunctionIndex),
            &[0x01, 0x00, 0x00, 0x04, 0x01, 0x00, 0x01, 0x00],
        ));
        data.extend(section(section_id(bef_format::SectionId::Types), &[0x01, 0x00]));
        data.extend(section(
            section_id(bef_format::SectionId::Strings),
            b"i32\0f\0hex.return\0",
        ));
        data.extend(section(section_id(bef_format::SectionId::Kernels), &[0x01, 0x06]));
        data.extend(section(
            section_id(bef_format::SectionId::LocationFilenames),
            b"f.bef\0",
        ));
        data.extend(section(
            section_id(bef_format::SectionId::LocationPositions),
            &[0x00, 0x00, 0x00],
        ));
        data.extend(section(section_id(bef_format::SectionId::Functions), &function_body));

        let outcome = decode_lenient(&data, SourceLoc::unknown()).unwrap();
        assert_eq!(outcome.module.functions.len(), 1);
        assert!(!outcome
            .diagnostics
            .iter()
            .any(|d| d.message.contains("declared") && d.message.contains("observed")));
    }

    // Boundary case: a zero-argument, zero-result function has no
    // arguments pseudo-kernel at all — its single kernel-table entry is
    // the `return` kernel directly.
    #[test]
    fn zero_arg_zero_result_function_has_no_pseudo_kernel() {
        let mut push = |buf: &mut Vec<u8>, v: u32| buf.extend_from_slice(&v.to_le_bytes());

        let mut return_words = Vec::new();
        push(&mut return_words, 0); // kernel name handle -> "hex.return"
        push(&mut return_words, 0); // location offset -> LocationPositions[0]
        push(&mut return_words, 0); // num_arguments
        push(&mut return_words, 0); // num_attributes
        push(&mut return_words, 0); // num_functions
        push(&mut return_words, 0); // num_results

        let mut function_body = vec![
            0x00, // location = 0
            0x00, // register-uses count = 0
            0x01, // kernel table count = 1
            0x00, 0x00, // kernel[0] = (offset=0, num_operands=0): the return kernel
        ];
        while function_body.len() % 4 != 0 {
            function_body.push(0);
        }
        function_body.extend_from_slice(&return_words);

        let mut data = MAGIC.to_vec();
        data.extend(section(section_id(bef_format::SectionId::FormatVersion), &[1]));
        data.extend(section(
            section_id(bef_format::SectionId::FunctionIndex),
            &[0x01, 0x00, 0x00, 0x00, 0x00, 0x00],
        ));
        data.extend(section(section_id(bef_format::SectionId::Types), &[0x00]));
        data.extend(section(
            section_id(bef_format::SectionId::Strings),
            b"f\0hex.return\0",
        ));
        data.extend(section(section_id(bef_format::SectionId::Kernels), &[0x01, 0x02]));
        data.extend(section(
            section_id(bef_format::SectionId::LocationFilenames),
            b"f.bef\0",
        ));
        data.extend(section(
            section_id(bef_format::SectionId::LocationPositions),
            &[0x00, 0x00, 0x00],
        ));
        data.extend(section(section_id(bef_format::SectionId::Functions), &function_body));

        let outcome = decode_lenient(&data, SourceLoc::unknown()).unwrap();
        assert_eq!(outcome.module.functions.len(), 1);
        let f = &outcome.module.functions[0];
        let block = &f.body.as_ref().unwrap().block;
        assert!(block.arguments.is_empty());
        assert_eq!(block.operations.len(), 1);
        assert_eq!(&*block.operations[0].name, "hex.return");
        assert!(block.operations[0].operands.is_empty());
    }

    #[test]
    fn bad_magic_fails_with_diagnostics_attached() {
        let data = b"XX".to_vec();
        let failure = decode_lenient(&data, SourceLoc::unknown()).unwrap_err();
        assert!(matches!(failure.error, Error::Format(_)));
        assert!(!failure.diagnostics.is_empty());
    }
}
