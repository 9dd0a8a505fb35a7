//! Patch representation and operational transformation for real-time
//! collaborative text editing.
//!
//! A [`Patch`] is an ordered list of [`Diff`]s tagged with the document
//! version it was authored against. Patches parse from and print to a
//! compact textual wire format, apply to a base string, invert, convert
//! between LF and CRLF line endings, and transform against concurrently
//! committed patches so that every client converges on the same document.
//!
//! ```
//! use patch_text::Patch;
//!
//! let ours: Patch = "v1:\n0:+1:X".parse().unwrap();
//! let theirs: Patch = "v1:\n5:+1:Y".parse().unwrap();
//!
//! let rebased = ours.transform(&[theirs.clone()]).unwrap();
//! let text = rebased.apply(&theirs.apply("hello").unwrap()).unwrap();
//! assert_eq!(text, "XhelloY");
//! ```
//!
//! # Note about offsets
//!
//! Offsets and lengths count **UTF-16 code units** to match the string
//! indexing of browser-based editor clients. A character outside the Basic
//! Multilingual Plane occupies two code units, so byte or codepoint
//! indexing would silently misalign any diff that follows such a
//! character.
//!
//! The crate is a pure value library: nothing here performs I/O, and every
//! operation returns new values instead of mutating its inputs.

mod diff;
mod errors;
mod patch;
mod utils;
mod wire;

pub use diff::Diff;
pub use errors::PatchError;
pub use patch::Patch;
