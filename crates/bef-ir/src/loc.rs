//! Source locations.

use std::fmt;
use std::sync::Arc;

/// A resolved `file:line:column` source location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLoc {
    pub filename: Arc<str>,
    pub line: u32,
    pub column: u32,
}

impl SourceLoc {
    #[must_use]
    pub fn new(filename: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Self {
            filename: filename.into(),
            line,
            column,
        }
    }

    /// The location substituted when the decoder has nothing better: the
    /// caller-supplied origin passed to `decode`.
    #[must_use]
    pub fn unknown() -> Self {
        Self::new("<unknown>", 0, 0)
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}
