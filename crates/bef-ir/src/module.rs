//! The decoded module: the top-level output of `bef::decode`.

use crate::function::Function;

/// A fully decoded BEF module.
///
/// Owns every function, which owns its region, which owns its block, which
/// owns its operations — no shared ownership or interior mutability
/// anywhere in the tree once decoding has finished.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Module {
    pub functions: Vec<Function>,
}

impl Module {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            functions: Vec::new(),
        }
    }

    #[must_use]
    pub fn find_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| &*f.name == name)
    }
}
