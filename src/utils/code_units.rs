//! Indexing strings by UTF-16 code units.
//!
//! Offsets and lengths throughout the crate count UTF-16 code units, the
//! convention of the collaborating editor clients. A `char` outside the
//! Basic Multilingual Plane encodes as two code units, so a code-unit
//! index can fall between the halves of a surrogate pair and match no
//! `char` boundary at all.

/// Number of UTF-16 code units needed to encode `text`.
#[must_use]
pub fn utf16_len(text: &str) -> usize { text.chars().map(char::len_utf16).sum() }

/// Why a code-unit index could not be resolved to a position in a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryError {
    /// The index is larger than the string's code-unit length.
    PastEnd,

    /// The index falls between the two code units of a surrogate pair.
    SplitsSurrogatePair,
}

/// Resolves a code-unit index to the corresponding byte index in `text`.
pub fn byte_offset(text: &str, code_units: usize) -> Result<usize, BoundaryError> {
    let mut remaining = code_units;

    for (byte_index, character) in text.char_indices() {
        if remaining == 0 {
            return Ok(byte_index);
        }

        let width = character.len_utf16();
        if remaining < width {
            return Err(BoundaryError::SplitsSurrogatePair);
        }
        remaining -= width;
    }

    if remaining == 0 {
        Ok(text.len())
    } else {
        Err(BoundaryError::PastEnd)
    }
}

/// Splits `text` directly after `code_units` UTF-16 code units.
pub fn split_at(text: &str, code_units: usize) -> Result<(&str, &str), BoundaryError> {
    let index = byte_offset(text, code_units)?;
    Ok(text.split_at(index))
}
