//! CSS `unicode-range` notation.

use std::{fmt::Write, ops::RangeInclusive};

use anyhow::{Context, Result, bail};

/// Renders codepoints as a `unicode-range` value, merging contiguous runs.
///
/// ```
/// use sunghyun_webfont_core::unicode_range::compress;
///
/// assert_eq!(compress(&[0x41, 0x42, 0x43, 0x61]), "U+0041-0043, U+0061");
/// ```
pub fn compress(codepoints: &[u32]) -> String {
    let mut sorted = codepoints.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut out = String::new();
    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return out;
    };

    let (mut start, mut end) = (first, first);
    for cp in iter {
        if cp == end + 1 {
            end = cp;
        } else {
            push_range(&mut out, start, end);
            (start, end) = (cp, cp);
        }
    }
    push_range(&mut out, start, end);
    out
}

fn push_range(out: &mut String, start: u32, end: u32) {
    if !out.is_empty() {
        out.push_str(", ");
    }
    let _ = if start == end {
        write!(out, "U+{start:04X}")
    } else {
        write!(out, "U+{start:04X}-{end:04X}")
    };
}

/// Parses a `unicode-range` value back into inclusive intervals.
///
/// Accepts the `U+X` and `U+X-Y` forms produced by [`compress`]; wildcards are
/// not supported.
pub fn parse(value: &str) -> Result<Vec<RangeInclusive<u32>>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let hex = part
                .strip_prefix("U+")
                .or_else(|| part.strip_prefix("u+"))
                .with_context(|| format!("Missing U+ prefix in {part:?}"))?;
            let (start, end) = match hex.split_once('-') {
                Some((start, end)) => (parse_hex(start)?, parse_hex(end)?),
                None => {
                    let cp = parse_hex(hex)?;
                    (cp, cp)
                }
            };
            if start > end {
                bail!("Inverted range {part:?}");
            }
            Ok(start..=end)
        })
        .collect()
}

fn parse_hex(digits: &str) -> Result<u32> {
    u32::from_str_radix(digits, 16).with_context(|| format!("Invalid hex codepoint {digits:?}"))
}

/// Expands a `unicode-range` value into the codepoints it covers.
pub fn expand(value: &str) -> Result<Vec<u32>> {
    Ok(parse(value)?.into_iter().flatten().collect())
}
