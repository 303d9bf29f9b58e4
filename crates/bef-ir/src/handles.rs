//! Strongly-typed handles into the various BEF pools.
//!
//! Every cross-reference in BEF is a raw integer (a byte offset or a
//! positional index). Keeping them as plain `u32`s invites mixing up, say, a
//! type handle with a function index. Each pool gets its own newtype so the
//! compiler rejects that confusion.

use std::fmt;

macro_rules! handle_type {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
        pub struct $name(pub u32);

        impl $name {
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }
    };
}

handle_type!(StringHandle, "Byte offset of a NUL-terminated string in the string pool.");
handle_type!(TypeHandle, "Positional index into the type pool.");
handle_type!(KernelNameHandle, "Positional index into the kernel-name pool.");
handle_type!(AttrOffset, "Byte offset of an attribute in the attribute pool.");
handle_type!(FuncIndex, "Positional index into the function index.");
handle_type!(RegisterIndex, "Positional index into a function's register table.");
handle_type!(LocationHandle, "Byte offset of a record in the LocationPositions payload.");
