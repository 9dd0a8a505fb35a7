#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{diff::Diff, errors::PatchError};

/// A version-tagged sequence of changes to a document.
///
/// The changes apply left to right: each diff's offset refers to the text
/// produced by the diffs before it in the same patch. A patch with no
/// changes is a valid no-op.
///
/// Patches are value objects. Undoing, transforming, and converting all
/// produce new patches and leave the original untouched.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    base_version: i64,
    changes: Vec<Diff>,
}

impl Patch {
    #[must_use]
    pub fn new(base_version: i64, changes: Vec<Diff>) -> Self {
        Patch {
            base_version,
            changes,
        }
    }

    /// The document version this patch was authored against.
    #[must_use]
    pub fn base_version(&self) -> i64 { self.base_version }

    /// The changes in application order.
    #[must_use]
    pub fn changes(&self) -> &[Diff] { &self.changes }

    /// Applies every change in order to `base`.
    pub fn apply(&self, base: &str) -> Result<String, PatchError> {
        self.changes
            .iter()
            .try_fold(base.to_owned(), |text, diff| diff.apply(&text))
    }

    /// Returns a patch that undoes this one.
    ///
    /// The changes are inverted in reverse order: later diffs were
    /// authored against the text produced by the earlier ones, so their
    /// inverses must run first.
    #[must_use]
    pub fn undo(&self) -> Patch {
        Patch::new(
            self.base_version,
            self.changes.iter().rev().map(Diff::undo).collect(),
        )
    }

    /// Transforms this patch against `others`, the patches committed to
    /// the document after this patch's base version, in commit order.
    ///
    /// The result expresses the same edit relative to the document with
    /// `others` already applied, and its base version advances past the
    /// newest version seen.
    pub fn transform(&self, others: &[Patch]) -> Result<Patch, PatchError> {
        let mut transformed = self.changes.clone();
        let mut max_version_seen = self.base_version - 1;

        for other in others {
            let mut next = Vec::with_capacity(transformed.len());
            for diff in &transformed {
                next.extend(diff.transform_many(&other.changes)?);
            }

            transformed = next;
            max_version_seen = max_version_seen.max(other.base_version);
        }

        Ok(Patch::new(max_version_seen + 1, transformed))
    }

    /// Parses `others` from their wire form, then transforms against them.
    pub fn transform_from_strings(&self, others: &[&str]) -> Result<Patch, PatchError> {
        let others = others
            .iter()
            .map(|other| other.parse())
            .collect::<Result<Vec<Patch>, PatchError>>()?;

        self.transform(&others)
    }

    /// Rewrites every change from LF to CRLF line endings given the LF
    /// base text the patch applies to.
    ///
    /// Every change is converted against the original base: conversion is
    /// a coordinate change, not an application.
    #[must_use]
    pub fn convert_to_crlf(&self, base: &str) -> Patch {
        Patch::new(
            self.base_version,
            self.changes
                .iter()
                .map(|diff| diff.convert_to_crlf(base))
                .collect(),
        )
    }

    /// Rewrites every change from CRLF to LF line endings given the CRLF
    /// base text the patch applies to.
    pub fn convert_to_lf(&self, base: &str) -> Result<Patch, PatchError> {
        let changes = self
            .changes
            .iter()
            .map(|diff| diff.convert_to_lf(base))
            .collect::<Result<Vec<Diff>, PatchError>>()?;

        Ok(Patch::new(self.base_version, changes))
    }
}
