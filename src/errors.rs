use thiserror::Error;

/// Error type for parsing, applying, converting, and transforming patches.
///
/// Every error is a plain value handed back to the caller; the library
/// never logs and never panics on malformed input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// The patch header or framing could not be parsed.
    #[error("invalid patch: {0}")]
    InvalidPatch(String),

    /// A diff could not be parsed, or an operation was handed a diff that
    /// violates the diff invariants.
    #[error("invalid diff: {0}")]
    InvalidDiff(String),

    /// A diff asserted text that does not match the supplied base string.
    #[error("invalid base: {0}")]
    InvalidBase(String),

    /// An offset or length reaches past the end of the base string.
    #[error(
        "offset out of range: attempting to reach {requested} code units starting at position \
         {position}, but the base only has {available} code units remaining"
    )]
    OffsetOutOfRange {
        /// The position where the operation starts
        position: usize,
        /// The number of code units requested
        requested: usize,
        /// The number of code units available from the position
        available: usize,
    },
}
