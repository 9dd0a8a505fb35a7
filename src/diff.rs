use core::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    errors::PatchError,
    utils::{code_units, string_builder::StringBuilder},
};

/// A single contiguous change anchored at an absolute offset of the base
/// string it applies to.
///
/// Offsets and lengths count UTF-16 code units, the indexing convention of
/// the collaborating editor clients. Deletions carry the full removed text
/// rather than just a length so that application can verify the diff still
/// matches the document it is being applied to.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diff {
    Insert { offset: usize, text: String },

    Delete { offset: usize, text: String },
}

impl Diff {
    /// Creates an insertion of `text` at `offset`. If the text is empty
    /// (meaning that the diff would be a no-op), returns None.
    #[must_use]
    pub fn create_insert(offset: usize, text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.is_empty() {
            return None;
        }

        Some(Diff::Insert { offset, text })
    }

    /// Creates a deletion of `text` at `offset`. If the text is empty
    /// (meaning that the diff would be a no-op), returns None.
    #[must_use]
    pub fn create_delete(offset: usize, text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.is_empty() {
            return None;
        }

        Some(Diff::Delete { offset, text })
    }

    #[must_use]
    pub fn is_insertion(&self) -> bool { matches!(self, Diff::Insert { .. }) }

    /// Offset of the first code unit the diff affects.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            Diff::Insert { offset, .. } | Diff::Delete { offset, .. } => *offset,
        }
    }

    /// The inserted text, or the text asserted to exist and then removed.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Diff::Insert { text, .. } | Diff::Delete { text, .. } => text,
        }
    }

    /// Length of the diff text in UTF-16 code units. It is always greater
    /// than 0 because empty diffs cannot be created.
    #[must_use]
    pub fn len(&self) -> usize { code_units::utf16_len(self.text()) }

    /// First offset past the affected range of the base string.
    #[must_use]
    pub fn end_offset(&self) -> usize { self.offset() + self.len() }

    /// Returns the inverse diff: applied to the result of applying `self`,
    /// it restores the prior text.
    #[must_use]
    pub fn undo(&self) -> Diff {
        match self {
            Diff::Insert { offset, text } => Diff::Delete {
                offset: *offset,
                text: text.clone(),
            },
            Diff::Delete { offset, text } => Diff::Insert {
                offset: *offset,
                text: text.clone(),
            },
        }
    }

    /// Applies the diff to `base`, producing the edited string.
    ///
    /// Deletions verify that the base contains the recorded text at the
    /// recorded offset and fail with [`PatchError::InvalidBase`] when it
    /// does not. Reaching past the end of the base fails with
    /// [`PatchError::OffsetOutOfRange`].
    pub fn apply(&self, base: &str) -> Result<String, PatchError> {
        let mut builder = StringBuilder::new(base);

        match self {
            Diff::Insert { offset, text } => builder.insert(*offset, text)?,
            Diff::Delete { offset, text } => builder.delete(*offset, text)?,
        }

        Ok(builder.build())
    }

    /// Rewrites the diff into the coordinate system produced by `applied`,
    /// a diff that has already been committed to the document.
    ///
    /// A deletion overlapping `applied` can shrink, split in two, or
    /// vanish entirely, so the result is a list. Every returned deletion
    /// still carries text matching the post-`applied` document.
    ///
    /// Two insertions anchored at the same offset are ordered by comparing
    /// their texts, so the outcome is the same no matter which of the two
    /// sides transforms against the other.
    ///
    /// Transformation is total over valid diffs; the only error path is an
    /// already-broken input, such as an insertion landing between the code
    /// units of a surrogate pair in the deleted text.
    pub fn transform(&self, applied: &Diff) -> Result<Vec<Diff>, PatchError> {
        let applied_len = applied.len();

        match (self, applied) {
            (
                Diff::Insert { offset, text },
                Diff::Insert {
                    offset: applied_offset,
                    text: applied_text,
                },
            ) => {
                let applied_first = match applied_offset.cmp(offset) {
                    Ordering::Less => true,
                    Ordering::Greater => false,
                    Ordering::Equal => applied_text <= text,
                };

                let offset = if applied_first { offset + applied_len } else { *offset };
                Ok(vec![Diff::Insert {
                    offset,
                    text: text.clone(),
                }])
            }

            (
                Diff::Delete { offset, text },
                Diff::Insert {
                    offset: applied_offset,
                    ..
                },
            ) => {
                if *applied_offset <= *offset {
                    Ok(vec![Diff::Delete {
                        offset: offset + applied_len,
                        text: text.clone(),
                    }])
                } else if *applied_offset >= self.end_offset() {
                    Ok(vec![self.clone()])
                } else {
                    // `applied` landed inside the deleted range: delete
                    // around it. The fragment past the insertion goes
                    // first so that both offsets stay valid when the
                    // changes are applied in order.
                    let (before, after) = split_text(text, applied_offset - offset)?;

                    Ok([
                        Diff::create_delete(applied_offset + applied_len, after),
                        Diff::create_delete(*offset, before),
                    ]
                    .into_iter()
                    .flatten()
                    .collect())
                }
            }

            (
                Diff::Insert { offset, text },
                Diff::Delete {
                    offset: applied_offset,
                    ..
                },
            ) => {
                let offset = if applied.end_offset() <= *offset {
                    offset - applied_len
                } else if *applied_offset >= *offset {
                    *offset
                } else {
                    // The insertion point was deleted; the insertion
                    // attaches to the surviving boundary.
                    *applied_offset
                };

                Ok(vec![Diff::Insert {
                    offset,
                    text: text.clone(),
                }])
            }

            (
                Diff::Delete { offset, text },
                Diff::Delete {
                    offset: applied_offset,
                    ..
                },
            ) => {
                if applied.end_offset() <= *offset {
                    Ok(vec![Diff::Delete {
                        offset: offset - applied_len,
                        text: text.clone(),
                    }])
                } else if *applied_offset >= self.end_offset() {
                    Ok(vec![self.clone()])
                } else {
                    // The ranges overlap and the intersected code units
                    // are already gone; only the rest still needs
                    // deleting.
                    let (surviving_prefix, _) =
                        split_text(text, applied_offset.saturating_sub(*offset))?;
                    let (_, surviving_suffix) =
                        split_text(text, (applied.end_offset() - offset).min(self.len()))?;

                    let surviving = format!("{surviving_prefix}{surviving_suffix}");
                    Ok(Diff::create_delete((*offset).min(*applied_offset), surviving)
                        .into_iter()
                        .collect())
                }
            }
        }
    }

    /// Folds the diff through `applied`, a sequence of already-committed
    /// diffs, in order. Each intermediate result is replaced by its
    /// pairwise transform against the next committed diff, concatenated.
    pub fn transform_many(&self, applied: &[Diff]) -> Result<Vec<Diff>, PatchError> {
        let mut transformed = vec![self.clone()];

        for applied_diff in applied {
            let mut next = Vec::with_capacity(transformed.len());
            for diff in &transformed {
                next.extend(diff.transform(applied_diff)?);
            }
            transformed = next;
        }

        Ok(transformed)
    }

    /// Rewrites the diff from LF to CRLF line endings given the LF base
    /// text it applies to. Every newline before the diff's offset widens
    /// to two code units, and newlines inside the diff text become `\r\n`.
    #[must_use]
    pub fn convert_to_crlf(&self, base: &str) -> Diff {
        let offset = self.offset() + newlines_before(base, self.offset());
        let text = self.text().replace('\n', "\r\n");

        self.with_parts(offset, text)
    }

    /// Rewrites the diff from CRLF to LF line endings given the CRLF base
    /// text it applies to. The offset shrinks by the number of complete
    /// `\r\n` pairs before it, and `\r\n` inside the diff text collapses
    /// to `\n`.
    ///
    /// A deletion may only remove whole `\r\n` pairs: a `\n` without a
    /// `\r` directly before it in the deleted text would leave half a pair
    /// behind, and is reported as [`PatchError::InvalidBase`].
    pub fn convert_to_lf(&self, base: &str) -> Result<Diff, PatchError> {
        if let Diff::Delete { text, .. } = self {
            check_deletes_whole_pairs(text)?;
        }

        let offset = self.offset() - crlf_pairs_before(base, self.offset());
        let text = self.text().replace("\r\n", "\n");

        Ok(self.with_parts(offset, text))
    }

    fn with_parts(&self, offset: usize, text: String) -> Diff {
        match self {
            Diff::Insert { .. } => Diff::Insert { offset, text },
            Diff::Delete { .. } => Diff::Delete { offset, text },
        }
    }
}

fn split_text(text: &str, at: usize) -> Result<(&str, &str), PatchError> {
    code_units::split_at(text, at).map_err(|_| {
        PatchError::InvalidDiff(format!(
            "diff text `{text}` cannot be split at code unit {at}"
        ))
    })
}

/// Counts the `\n` characters at code-unit positions strictly before
/// `offset` in `base`.
fn newlines_before(base: &str, offset: usize) -> usize {
    let mut units = 0;
    let mut count = 0;

    for character in base.chars() {
        if units >= offset {
            break;
        }
        if character == '\n' {
            count += 1;
        }
        units += character.len_utf16();
    }

    count
}

/// Counts the complete `\r\n` pairs lying entirely strictly before
/// `offset` in `base`.
fn crlf_pairs_before(base: &str, offset: usize) -> usize {
    let mut units = 0;
    let mut count = 0;
    let mut previous = None;

    for character in base.chars() {
        if units >= offset {
            break;
        }
        if character == '\n' && previous == Some('\r') {
            count += 1;
        }
        previous = Some(character);
        units += character.len_utf16();
    }

    count
}

fn check_deletes_whole_pairs(text: &str) -> Result<(), PatchError> {
    let mut previous = None;

    for character in text.chars() {
        if character == '\n' && previous != Some('\r') {
            return Err(PatchError::InvalidBase(
                "deleted text contains a line feed without a preceding carriage return".to_owned(),
            ));
        }
        previous = Some(character);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn insert(offset: usize, text: &str) -> Diff { Diff::create_insert(offset, text).unwrap() }

    fn delete(offset: usize, text: &str) -> Diff { Diff::create_delete(offset, text).unwrap() }

    #[test]
    fn test_empty_text_is_rejected() {
        assert_eq!(Diff::create_insert(3, ""), None);
        assert_eq!(Diff::create_delete(3, ""), None);
    }

    #[test]
    fn test_undo_flips_the_operation() {
        assert_eq!(insert(2, "ab").undo(), delete(2, "ab"));
        assert_eq!(delete(2, "ab").undo(), insert(2, "ab"));
    }

    #[test]
    fn test_apply_insertion() {
        assert_eq!(insert(1, "xy").apply("ab").unwrap(), "axyb");
        assert_eq!(insert(0, "xy").apply("ab").unwrap(), "xyab");
        assert_eq!(insert(2, "xy").apply("ab").unwrap(), "abxy");
    }

    #[test]
    fn test_apply_deletion() {
        assert_eq!(delete(1, "bc").apply("abcd").unwrap(), "ad");
    }

    #[test]
    fn test_apply_deletion_mismatch() {
        let error = delete(1, "xy").apply("abcd").unwrap_err();

        assert_eq!(
            error,
            PatchError::InvalidBase("expected `xy` at offset 1, found `bc`".to_owned())
        );
    }

    #[test]
    fn test_apply_past_the_end() {
        assert_eq!(
            insert(3, "x").apply("ab").unwrap_err(),
            PatchError::OffsetOutOfRange {
                position: 0,
                requested: 3,
                available: 2,
            }
        );
        assert_eq!(
            delete(1, "bcd").apply("ab").unwrap_err(),
            PatchError::OffsetOutOfRange {
                position: 1,
                requested: 3,
                available: 1,
            }
        );
    }

    #[test]
    fn test_offsets_count_utf16_code_units() {
        // "𝄞" takes two code units, so "b" sits at offset 3.
        assert_eq!(insert(3, "x").apply("a𝄞b").unwrap(), "a𝄞xb");
        assert_eq!(delete(1, "𝄞").apply("a𝄞b").unwrap(), "ab");
    }

    #[test]
    fn test_apply_inside_a_surrogate_pair() {
        assert_eq!(
            insert(2, "x").apply("a𝄞b").unwrap_err(),
            PatchError::InvalidBase(
                "position 0 splits a surrogate pair in the base text".to_owned()
            )
        );
    }

    #[test]
    fn test_transform_insertions_at_distinct_offsets() {
        let first = insert(0, "X");
        let second = insert(5, "Y");

        assert_eq!(first.transform(&second).unwrap(), vec![insert(0, "X")]);
        assert_eq!(second.transform(&first).unwrap(), vec![insert(6, "Y")]);
    }

    #[test]
    fn test_transform_insertions_at_the_same_offset() {
        let first = insert(1, "1");
        let second = insert(1, "2");

        // The text comparison puts "1" first on both sides.
        assert_eq!(second.transform(&first).unwrap(), vec![insert(2, "2")]);
        assert_eq!(first.transform(&second).unwrap(), vec![insert(1, "1")]);
    }

    #[test]
    fn test_transform_identical_insertions() {
        let first = insert(1, "x");
        let second = insert(1, "x");

        assert_eq!(second.transform(&first).unwrap(), vec![insert(2, "x")]);
        assert_eq!(first.transform(&second).unwrap(), vec![insert(2, "x")]);
    }

    #[test]
    fn test_transform_deletion_shifted_by_insertion() {
        let deletion = delete(2, "cd");

        assert_eq!(
            deletion.transform(&insert(0, "XY")).unwrap(),
            vec![delete(4, "cd")]
        );
        assert_eq!(
            deletion.transform(&insert(2, "XY")).unwrap(),
            vec![delete(4, "cd")]
        );
        assert_eq!(
            deletion.transform(&insert(4, "XY")).unwrap(),
            vec![delete(2, "cd")]
        );
    }

    #[test]
    fn test_transform_deletion_split_by_insertion() {
        // Base "abcdef": delete "bcde" while "X" lands at offset 3.
        let deletion = delete(1, "bcde");
        let insertion = insert(3, "X");

        let transformed = deletion.transform(&insertion).unwrap();
        assert_eq!(transformed, vec![delete(4, "de"), delete(1, "bc")]);

        // Both fragments still match the post-insertion document.
        let mut text = insertion.apply("abcdef").unwrap();
        for fragment in &transformed {
            text = fragment.apply(&text).unwrap();
        }
        assert_eq!(text, "aXf");
    }

    #[test]
    fn test_transform_insertion_into_deleted_range() {
        // The insertion point is gone; it attaches to the boundary.
        let insertion = insert(3, "X");
        let deletion = delete(1, "bcde");

        assert_eq!(insertion.transform(&deletion).unwrap(), vec![insert(1, "X")]);
    }

    #[test]
    fn test_transform_insertion_around_deletion() {
        let deletion = delete(2, "cd");

        assert_eq!(insert(4, "X").transform(&deletion).unwrap(), vec![insert(2, "X")]);
        assert_eq!(insert(2, "X").transform(&deletion).unwrap(), vec![insert(2, "X")]);
        assert_eq!(insert(1, "X").transform(&deletion).unwrap(), vec![insert(1, "X")]);
        assert_eq!(insert(3, "X").transform(&deletion).unwrap(), vec![insert(2, "X")]);
    }

    #[test]
    fn test_transform_overlapping_deletions() {
        // Base "abcdef": one side deletes "bcd", the other "cde".
        let ours = delete(1, "bcd");
        let theirs = delete(2, "cde");

        assert_eq!(ours.transform(&theirs).unwrap(), vec![delete(1, "b")]);
        assert_eq!(theirs.transform(&ours).unwrap(), vec![delete(1, "e")]);
    }

    #[test]
    fn test_transform_deletion_fully_covered() {
        let ours = delete(2, "cd");
        let theirs = delete(1, "bcde");

        assert_eq!(ours.transform(&theirs).unwrap(), vec![]);
    }

    #[test]
    fn test_transform_deletion_straddling_another() {
        let ours = delete(0, "abcdef");
        let theirs = delete(2, "cd");

        assert_eq!(ours.transform(&theirs).unwrap(), vec![delete(0, "abef")]);
    }

    #[test]
    fn test_transform_adjacent_deletions() {
        let ours = delete(1, "b");
        let theirs = delete(2, "c");

        assert_eq!(ours.transform(&theirs).unwrap(), vec![delete(1, "b")]);
        assert_eq!(theirs.transform(&ours).unwrap(), vec![delete(1, "c")]);
    }

    #[test]
    fn test_transform_many_folds_in_order() {
        // Base "abcdef": the deletion is split, then both fragments are
        // shifted by a later insertion at the front.
        let deletion = delete(1, "bcde");

        let transformed = deletion
            .transform_many(&[insert(3, "X"), insert(0, "!")])
            .unwrap();

        assert_eq!(transformed, vec![delete(5, "de"), delete(2, "bc")]);
    }

    #[test]
    fn test_transform_split_inside_a_surrogate_pair() {
        let deletion = delete(0, "𝄞");
        let insertion = insert(1, "x");

        assert_eq!(
            deletion.transform(&insertion).unwrap_err(),
            PatchError::InvalidDiff("diff text `𝄞` cannot be split at code unit 1".to_owned())
        );
    }

    #[test]
    fn test_convert_to_crlf_shifts_the_offset() {
        // Base (LF) "a\nb\nc": offset 3 has one newline before it.
        let diff = insert(3, "Z").convert_to_crlf("a\nb\nc");

        assert_eq!(diff, insert(4, "Z"));
    }

    #[test]
    fn test_convert_to_crlf_rewrites_the_text() {
        let diff = insert(2, "x\ny").convert_to_crlf("a\nb");

        assert_eq!(diff, insert(3, "x\r\ny"));
    }

    #[test]
    fn test_convert_to_lf_shifts_the_offset() {
        // Base (CRLF) "a\r\nb\r\nc": offset 4 has one pair before it.
        let diff = insert(4, "Z").convert_to_lf("a\r\nb\r\nc").unwrap();

        assert_eq!(diff, insert(3, "Z"));
    }

    #[test]
    fn test_convert_round_trip() {
        let lf_base = "a\nb\nc";
        let crlf_base = "a\r\nb\r\nc";
        let diff = delete(2, "b\nc");

        let converted = diff.convert_to_crlf(lf_base);
        assert_eq!(converted, delete(3, "b\r\nc"));
        assert_eq!(converted.convert_to_lf(crlf_base).unwrap(), diff);
    }

    #[test]
    fn test_convert_to_lf_rejects_half_pairs() {
        let error = delete(2, "\nb").convert_to_lf("a\r\nb").unwrap_err();

        assert_eq!(
            error,
            PatchError::InvalidBase(
                "deleted text contains a line feed without a preceding carriage return".to_owned()
            )
        );
    }

    #[test]
    fn test_convert_pair_directly_before_the_offset() {
        // The pair at offsets 1-2 lies entirely before offset 3.
        assert_eq!(insert(3, "x").convert_to_lf("a\r\nb").unwrap(), insert(2, "x"));
        // An offset between `\r` and `\n` does not count the pair.
        assert_eq!(insert(2, "x").convert_to_lf("a\r\nb").unwrap(), insert(2, "x"));
    }
}
