//! The decoder's single first-class configuration surface.

/// How the decoder treats conditions that the source format tolerates by
/// degrading rather than failing (an unrecognized attribute descriptor, a
/// missing optional table, an unrecognized type name reachable only from
/// forward-compatible code).
///
/// `Lenient` matches the behavior BEF writers have historically relied on:
/// substitute a placeholder, emit a warning, keep decoding. `Strict` turns
/// every one of those into a fatal error instead, for callers that would
/// rather reject a file than silently produce degraded IR.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    #[default]
    Lenient,
    Strict,
}

impl DecodePolicy {
    #[must_use]
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}
