//! The textual wire format for diffs and patches.
//!
//! A diff is three colon-separated fields: the offset, the operation sign
//! with the text length, and the text itself:
//!
//! ```text
//! 3:+2:hi
//! ```
//!
//! A patch is a `v`-prefixed base version terminated by `":\n"`, followed
//! by its diffs joined with `",\n"`:
//!
//! ```text
//! v7:\n3:+2:hi,\n10:-4:abcd
//! ```
//!
//! The declared length counts UTF-16 code units and is authoritative: the
//! parser consumes exactly that many code units of text before looking
//! for the next separator, so diff text may itself contain raw newlines
//! and commas.

use core::{fmt, str::FromStr};

use crate::{diff::Diff, errors::PatchError, patch::Patch, utils::code_units};

const HEADER_SEPARATOR: &str = ":\n";
const DIFF_SEPARATOR: &str = ",\n";

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_insertion() { '+' } else { '-' };
        write!(f, "{}:{}{}:{}", self.offset(), sign, self.len(), self.text())
    }
}

impl FromStr for Diff {
    type Err = PatchError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (diff, rest) = parse_diff(input)?;

        if !rest.is_empty() {
            return Err(PatchError::InvalidDiff(format!(
                "unexpected `{}` after the declared text length",
                preview(rest)
            )));
        }

        Ok(diff)
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}{HEADER_SEPARATOR}", self.base_version())?;

        for (index, diff) in self.changes().iter().enumerate() {
            if index > 0 {
                f.write_str(DIFF_SEPARATOR)?;
            }
            write!(f, "{diff}")?;
        }

        Ok(())
    }
}

impl FromStr for Patch {
    type Err = PatchError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let Some((header, body)) = input.split_once(HEADER_SEPARATOR) else {
            return Err(PatchError::InvalidPatch(
                "missing `:` and newline after the version header".to_owned(),
            ));
        };

        let Some(version) = header.strip_prefix('v') else {
            return Err(PatchError::InvalidPatch(format!(
                "header `{}` does not start with `v`",
                preview(header)
            )));
        };
        if version.is_empty() {
            return Err(PatchError::InvalidPatch("empty base version".to_owned()));
        }

        let base_version = version.parse::<i64>().map_err(|_| {
            PatchError::InvalidPatch(format!("base version `{version}` is not a decimal number"))
        })?;

        let mut changes = Vec::new();
        if !body.is_empty() {
            let mut rest = body;
            loop {
                let (diff, after) = parse_diff(rest)?;
                changes.push(diff);

                if after.is_empty() {
                    break;
                }
                rest = after.strip_prefix(DIFF_SEPARATOR).ok_or_else(|| {
                    PatchError::InvalidPatch(format!(
                        "expected `,` and newline between diffs, found `{}`",
                        preview(after)
                    ))
                })?;
            }
        }

        Ok(Patch::new(base_version, changes))
    }
}

/// Parses a single diff from the start of `input`, returning the
/// remainder after the consumed text.
fn parse_diff(input: &str) -> Result<(Diff, &str), PatchError> {
    let Some((offset_field, rest)) = input.split_once(':') else {
        return Err(PatchError::InvalidDiff(format!(
            "`{}` has no `:` after the offset field",
            preview(input)
        )));
    };
    let offset = parse_number(offset_field, "offset")?;

    let Some((operation_field, rest)) = rest.split_once(':') else {
        return Err(PatchError::InvalidDiff(format!(
            "`{}` has no `:` after the operation field",
            preview(input)
        )));
    };

    let mut operation_chars = operation_field.chars();
    let insertion = match operation_chars.next() {
        Some('+') => true,
        Some('-') => false,
        Some(sign) => {
            return Err(PatchError::InvalidDiff(format!(
                "unknown operation `{sign}`, expected `+` or `-`"
            )));
        }
        None => return Err(PatchError::InvalidDiff("empty operation field".to_owned())),
    };

    let length = parse_number(operation_chars.as_str(), "length")?;
    if length == 0 {
        return Err(PatchError::InvalidDiff("diff text must not be empty".to_owned()));
    }

    let (text, remainder) = code_units::split_at(rest, length).map_err(|_| {
        PatchError::InvalidDiff(format!(
            "declared length {length} does not match the text `{}`",
            preview(rest)
        ))
    })?;

    let diff = if insertion {
        Diff::Insert {
            offset,
            text: text.to_owned(),
        }
    } else {
        Diff::Delete {
            offset,
            text: text.to_owned(),
        }
    };

    Ok((diff, remainder))
}

fn parse_number(field: &str, name: &str) -> Result<usize, PatchError> {
    field
        .parse::<u32>()
        .map(|value| value as usize)
        .map_err(|_| PatchError::InvalidDiff(format!("{name} `{field}` is not a decimal number")))
}

/// Keeps error messages short when the offending input is long.
fn preview(input: &str) -> &str {
    input.get(..24).unwrap_or(input)
}
