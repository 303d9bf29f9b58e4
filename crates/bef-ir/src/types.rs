//! IR type representation.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A decoded IR type.
///
/// The type pool stores types as strings; [`Type::parse`] recognizes the
/// closed set of primitives the decoder must understand structurally
/// (register types, standard-attribute payload types) and falls back to
/// [`Type::Other`] for anything else, so an unrecognized-but-well-formed
/// type name never aborts a decode.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    I1,
    I32,
    I64,
    F16,
    F32,
    F64,
    /// Register type left unresolved because `RegisterTypes` was absent.
    None,
    /// Any type name the decoder doesn't special-case structurally.
    Other(Arc<str>),
}

impl Type {
    /// Parse a type string as decoded from the type pool.
    ///
    /// Never fails: unrecognized names become [`Type::Other`]. A `TypeParseError`
    /// exists for callers that want to treat an unrecognized type as fatal
    /// under a stricter policy; ordinary decoding uses [`Type::parse`] directly.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "i1" => Self::I1,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "f16" => Self::F16,
            "f32" => Self::F32,
            "f64" => Self::F64,
            other => Self::Other(Arc::from(other)),
        }
    }

    /// Decode the one-byte `type` attribute payload encoding.
    pub fn from_type_byte(byte: u8) -> Result<Self, TypeParseError> {
        match byte {
            0 => Ok(Self::I1),
            1 => Ok(Self::I32),
            2 => Ok(Self::I64),
            3 => Ok(Self::F16),
            4 => Ok(Self::F32),
            5 => Ok(Self::F64),
            other => Err(TypeParseError::UnknownTypeByte(other)),
        }
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I1 => write!(f, "i1"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::F16 => write!(f, "f16"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
            Self::None => write!(f, "none"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Errors from parsing a packed type byte (attribute kind `type`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeParseError {
    #[error("unknown packed type byte: {0}")]
    UnknownTypeByte(u8),
}
