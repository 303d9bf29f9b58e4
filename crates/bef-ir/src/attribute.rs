//! Decoded attribute values.

use std::sync::Arc;

use crate::types::Type;

/// The scalar payload of a `standard` attribute, identified by its type
/// handle at decode time.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    I1(bool),
    I32(i32),
    I64(i64),
    /// Half-precision float, stored as its raw bit pattern (no `f16` in
    /// stable `std`).
    F16(u16),
    F32(f32),
    F64(f64),
}

/// A ranked tensor constant (attribute kind `dense-elements`).
#[derive(Clone, Debug, PartialEq)]
pub struct DenseElements {
    pub element_type: Type,
    pub shape: Vec<u64>,
    pub elements: Vec<Scalar>,
}

/// A decoded attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum Attribute {
    Bool(bool),
    Scalar(Scalar),
    Str(Arc<str>),
    TypeAttr(Type),
    DenseElements(DenseElements),
    /// `flat-array`: homogeneous array of same-typed standard elements.
    Array(Vec<Scalar>),
    /// `offset-array`: heterogeneous array of attribute references, each
    /// already resolved at decode time.
    OffsetArray(Vec<Attribute>),
    /// Substituted when `AttributeTypes` is missing or the descriptor is
    /// unrecognized; see `DecodePolicy::Lenient`.
    Placeholder(u32),
}

/// The sentinel value substituted for attributes the decoder cannot
/// otherwise represent under `DecodePolicy::Lenient`.
pub const PLACEHOLDER_ATTRIBUTE: u32 = 0xDEAD_BEEF;

impl Attribute {
    #[must_use]
    pub fn placeholder() -> Self {
        Self::Placeholder(PLACEHOLDER_ATTRIBUTE)
    }
}

/// An operation's `name -> attribute` dictionary.
///
/// Insertion order is preserved (matching decode order) rather than using a
/// hash map, since dictionaries are typically small and printing/comparison
/// wants a stable order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeDict(Vec<(Arc<str>, Attribute)>);

impl AttributeDict {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, name: impl Into<Arc<str>>, value: Attribute) {
        self.0.push((name.into(), value));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.0.iter().find(|(n, _)| &**n == name).map(|(_, v)| v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Arc<str>, Attribute)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dict_preserves_insertion_order_and_lookup() {
        let mut dict = AttributeDict::new();
        dict.insert("b", Attribute::Bool(true));
        dict.insert("a", Attribute::Scalar(Scalar::I32(7)));

        let names: Vec<_> = dict.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(dict.get("a"), Some(&Attribute::Scalar(Scalar::I32(7))));
        assert_eq!(dict.get("missing"), None);
    }

    #[test]
    fn placeholder_uses_documented_sentinel() {
        assert_eq!(Attribute::placeholder(), Attribute::Placeholder(0xDEAD_BEEF));
    }
}
