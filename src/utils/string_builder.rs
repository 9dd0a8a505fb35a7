use crate::{
    errors::PatchError,
    utils::code_units::{self, BoundaryError},
};

/// A helper for building a string from an original and a pass of
/// insertions and deletions applied in ascending offset order. All offsets
/// count UTF-16 code units.
///
/// Deletions must name the text they remove; a mismatch against the
/// original is reported instead of silently producing a diverged string.
#[derive(Debug, Clone)]
pub struct StringBuilder<'a> {
    remaining: &'a str,
    consumed: usize,
    buffer: String,
}

impl<'a> StringBuilder<'a> {
    pub fn new(original: &'a str) -> StringBuilder<'a> {
        StringBuilder {
            remaining: original,
            consumed: 0,
            buffer: String::with_capacity(original.len()),
        }
    }

    /// Copies the original up to `offset`, then appends `text`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), PatchError> {
        self.copy_until(offset)?;
        self.buffer.push_str(text);
        Ok(())
    }

    /// Copies the original up to `offset`, then skips `expected`, which
    /// must match the original at that position.
    pub fn delete(&mut self, offset: usize, expected: &str) -> Result<(), PatchError> {
        self.copy_until(offset)?;

        let length = code_units::utf16_len(expected);
        let (deleted, rest) = code_units::split_at(self.remaining, length)
            .map_err(|error| self.boundary_error(offset, length, error))?;

        if deleted != expected {
            return Err(PatchError::InvalidBase(format!(
                "expected `{expected}` at offset {offset}, found `{deleted}`"
            )));
        }

        self.remaining = rest;
        self.consumed += length;
        Ok(())
    }

    /// Appends the rest of the original and returns the built string.
    #[must_use]
    pub fn build(mut self) -> String {
        self.buffer.push_str(self.remaining);
        self.buffer
    }

    fn copy_until(&mut self, offset: usize) -> Result<(), PatchError> {
        let jump = offset.checked_sub(self.consumed).ok_or_else(|| {
            PatchError::InvalidDiff(format!(
                "offset {offset} is behind the already-built offset {}",
                self.consumed
            ))
        })?;

        let (copied, rest) = code_units::split_at(self.remaining, jump)
            .map_err(|error| self.boundary_error(self.consumed, jump, error))?;

        self.buffer.push_str(copied);
        self.remaining = rest;
        self.consumed = offset;
        Ok(())
    }

    fn boundary_error(&self, position: usize, requested: usize, error: BoundaryError) -> PatchError {
        match error {
            BoundaryError::PastEnd => PatchError::OffsetOutOfRange {
                position,
                requested,
                available: code_units::utf16_len(self.remaining),
            },
            BoundaryError::SplitsSurrogatePair => PatchError::InvalidBase(format!(
                "position {position} splits a surrogate pair in the base text"
            )),
        }
    }
}
