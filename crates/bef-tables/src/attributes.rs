//! The `AttributeTypes` and `Attributes` sections.
//!
//! `AttributeTypes` is a flat array of `(offset, descriptor)` pairs
//! describing how to interpret the byte region at `offset` in the
//! `Attributes` pool. Decoding walks that array once, building a growing
//! `offset -> Attribute` map; the writer's forward-only guarantee (an
//! offset-array's elements always appear earlier in the pool than the
//! array itself) means every reference resolves against an already-decoded
//! entry, so no two-pass fixup or cycle detection is needed here.

use rustc_hash::FxHashMap;

use bef_format::{read_reverse_varint, ByteReader};
use bef_ir::{
    Attribute, AttrOffset, DecodePolicy, DenseElements, Diagnostics, Scalar, SourceLoc, Type,
    TypeHandle,
};

use crate::types::TypePool;
use crate::TableError;

/// The decoded `kind` half of an attribute type descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttributeKind {
    Standard,
    Bool,
    String,
    TypeAttr,
    DenseElements,
    FlatArray,
    OffsetArray,
    /// A descriptor kind value the loader doesn't recognize (forward
    /// compatibility). Always resolves to a placeholder attribute; whether
    /// that is a warning or a fatal error is a `DecodePolicy` choice.
    Unknown(u32),
}

impl AttributeKind {
    const fn from_low_bits(bits: u32) -> Self {
        match bits {
            0 => Self::Standard,
            1 => Self::Bool,
            2 => Self::String,
            3 => Self::TypeAttr,
            4 => Self::DenseElements,
            5 => Self::FlatArray,
            6 => Self::OffsetArray,
            other => Self::Unknown(other),
        }
    }
}

/// One parsed `(offset, descriptor)` record from `AttributeTypes`.
#[derive(Clone, Copy, Debug)]
struct Descriptor {
    offset: AttrOffset,
    kind: AttributeKind,
    /// Type handle carried in the descriptor's high bits, meaningful only
    /// for `Standard` and `FlatArray`.
    payload_type: TypeHandle,
}

/// Parse the `AttributeTypes` section into its `(offset, descriptor)`
/// records, in on-disk order.
fn parse_descriptors(payload: &[u8]) -> Result<Vec<Descriptor>, TableError> {
    let mut reader = ByteReader::new(payload);
    let count = reader.read_varint()?;
    let mut out = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
    for _ in 0..count {
        let offset = reader.read_u32_le()?;
        let descriptor = reader.read_u32_le()?;
        let kind = AttributeKind::from_low_bits(descriptor & 0x7);
        let payload_type = TypeHandle::new(descriptor >> 3);
        out.push(Descriptor {
            offset: AttrOffset::new(offset),
            kind,
            payload_type,
        });
    }
    Ok(out)
}

fn read_scalar(reader: &mut ByteReader<'_>, ty: &Type) -> Result<Scalar, TableError> {
    Ok(match ty {
        Type::I1 => Scalar::I1(reader.read_u8()? != 0),
        Type::I32 => Scalar::I32(reader.read_u32_le()? as i32),
        Type::I64 => Scalar::I64(reader.read_u64_le()? as i64),
        Type::F16 => Scalar::F16(reader.read_u16_le()?),
        Type::F32 => Scalar::F32(reader.read_f32_le()?),
        Type::F64 => Scalar::F64(reader.read_f64_le()?),
        Type::None | Type::Other(_) => {
            return Err(TableError::BadSection {
                what: "Attributes: standard attribute with non-scalar type",
            })
        }
    })
}

fn dense_element_type(dtype_byte: u8) -> Result<Type, TableError> {
    Type::from_type_byte(dtype_byte).map_err(|_| TableError::BadSection {
        what: "Attributes: unrecognized dense-elements dtype",
    })
}

/// The fully decoded `Attributes` pool, keyed by byte offset.
#[derive(Debug, Default)]
pub struct AttributePool {
    decoded: FxHashMap<AttrOffset, Attribute>,
}

impl AttributePool {
    /// Decode every attribute described by `AttributeTypes` out of the raw
    /// `Attributes` payload.
    ///
    /// An unrecognized descriptor kind is a forward-compatibility case, not
    /// a corrupt file: under `DecodePolicy::Lenient` it becomes a
    /// placeholder attribute plus a warning in `diagnostics`; under
    /// `Strict` it aborts with `UnknownAttributeDescriptor`.
    pub fn parse(
        attribute_types_payload: &[u8],
        attributes_payload: &[u8],
        types: &TypePool,
        policy: DecodePolicy,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, TableError> {
        let descriptors = parse_descriptors(attribute_types_payload)?;
        tracing::trace!(count = descriptors.len(), "decoding attribute pool");
        let mut decoded = FxHashMap::default();

        for descriptor in descriptors {
            let value = match descriptor.kind {
                AttributeKind::Unknown(bits) if policy.is_strict() => {
                    return Err(TableError::UnknownAttributeDescriptor(bits))
                }
                AttributeKind::Unknown(bits) => {
                    diagnostics.push_warning(
                        SourceLoc::unknown(),
                        format!("attribute at offset {} has unrecognized descriptor kind {bits}; substituting placeholder", descriptor.offset),
                    );
                    Attribute::placeholder()
                }
                _ => decode_one(descriptor, attributes_payload, types, &decoded)?,
            };
            decoded.insert(descriptor.offset, value);
        }

        Ok(Self { decoded })
    }

    /// Look up an already-decoded attribute, or substitute a placeholder
    /// under `DecodePolicy::Lenient` (the caller is responsible for the
    /// warning; this just reports absence).
    #[must_use]
    pub fn get(&self, offset: AttrOffset) -> Option<&Attribute> {
        self.decoded.get(&offset)
    }
}

fn decode_one(
    descriptor: Descriptor,
    pool: &[u8],
    types: &TypePool,
    decoded_so_far: &FxHashMap<AttrOffset, Attribute>,
) -> Result<Attribute, TableError> {
    let start = descriptor.offset.index();
    match descriptor.kind {
        AttributeKind::Standard => {
            let ty = types.resolve(descriptor.payload_type)?;
            let sub = pool.get(start..).ok_or(TableError::BadSection {
                what: "Attributes: standard attribute offset out of range",
            })?;
            let mut reader = ByteReader::new(sub);
            Ok(Attribute::Scalar(read_scalar(&mut reader, ty)?))
        }
        AttributeKind::Bool => {
            let byte = *pool.get(start).ok_or(TableError::BadSection {
                what: "Attributes: bool attribute out of range",
            })?;
            Ok(Attribute::Bool(byte != 0))
        }
        AttributeKind::String => {
            let length = read_reverse_varint(pool, start)? as usize;
            let bytes = pool.get(start..start + length).ok_or(TableError::BadSection {
                what: "Attributes: string attribute out of range",
            })?;
            let s = std::str::from_utf8(bytes).map_err(|_| TableError::BadSection {
                what: "Attributes: string attribute is not valid UTF-8",
            })?;
            Ok(Attribute::Str(s.into()))
        }
        AttributeKind::TypeAttr => {
            let byte = *pool.get(start).ok_or(TableError::BadSection {
                what: "Attributes: type attribute out of range",
            })?;
            let ty = Type::from_type_byte(byte).map_err(|_| TableError::BadSection {
                what: "Attributes: unrecognized type attribute byte",
            })?;
            Ok(Attribute::TypeAttr(ty))
        }
        AttributeKind::DenseElements => {
            let sub = pool.get(start..).ok_or(TableError::BadSection {
                what: "Attributes: dense-elements offset out of range",
            })?;
            let mut reader = ByteReader::new(sub);
            let header = reader.read_u64_le()?;
            let dtype_byte = (header & 0xff) as u8;
            let rank = header >> 8;
            let element_type = dense_element_type(dtype_byte)?;
            let element_count = reader.read_u64_le()?;
            let mut shape = Vec::with_capacity(usize::try_from(rank).unwrap_or(0));
            for _ in 0..rank {
                shape.push(reader.read_u64_le()?);
            }
            let mut elements = Vec::with_capacity(usize::try_from(element_count).unwrap_or(0));
            for _ in 0..element_count {
                elements.push(read_scalar(&mut reader, &element_type)?);
            }
            Ok(Attribute::DenseElements(DenseElements {
                element_type,
                shape,
                elements,
            }))
        }
        AttributeKind::FlatArray => {
            let length = read_reverse_varint(pool, start)?;
            let ty = types.resolve(descriptor.payload_type)?;
            let sub = pool.get(start..).ok_or(TableError::BadSection {
                what: "Attributes: flat-array offset out of range",
            })?;
            let mut reader = ByteReader::new(sub);
            let mut elements = Vec::with_capacity(usize::try_from(length).unwrap_or(0));
            for _ in 0..length {
                elements.push(read_scalar(&mut reader, ty)?);
            }
            Ok(Attribute::Array(elements))
        }
        AttributeKind::OffsetArray => {
            let length = read_reverse_varint(pool, start)?;
            let sub = pool.get(start..).ok_or(TableError::BadSection {
                what: "Attributes: offset-array offset out of range",
            })?;
            let mut reader = ByteReader::new(sub);
            let mut elements = Vec::with_capacity(usize::try_from(length).unwrap_or(0));
            for _ in 0..length {
                let ref_offset = AttrOffset::new(reader.read_u32_le()?);
                let _ref_descriptor = reader.read_u32_le()?;
                let referenced = decoded_so_far.get(&ref_offset).cloned().ok_or(
                    TableError::BadSection {
                        what: "Attributes: offset-array references an undecoded attribute",
                    },
                )?;
                elements.push(referenced);
            }
            Ok(Attribute::OffsetArray(elements))
        }
        AttributeKind::Unknown(_) => unreachable!("filtered out by AttributePool::parse"),
    }
}
