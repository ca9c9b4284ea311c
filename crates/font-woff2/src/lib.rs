//! WOFF2 container handling for web font builds.
//!
//! Web sources are usually shipped as WOFF2, which neither HarfBuzz nor `read-fonts`
//! parse directly. This crate converts between the container and a plain sfnt so the
//! rest of the pipeline can work on TrueType/OpenType bytes:
//!
//! - [`decode`] unwraps WOFF/WOFF2 into sfnt bytes (raw sfnt passes through)
//! - [`encode`] compresses sfnt bytes to WOFF2
//! - [`extract_codepoints`] lists every codepoint mapped by the font's `cmap`
//!
//! # Example
//!
//! ```no_run
//! use sunghyun_font_woff2::{decode, encode, extract_codepoints};
//!
//! let woff2_data: &[u8] = &[];
//! let sfnt = decode(woff2_data).unwrap();
//! let codepoints = extract_codepoints(&sfnt).unwrap();
//! let packed = encode(&sfnt).unwrap();
//! ```

use std::borrow::Cow;

use anyhow::{Context, Result, anyhow};
use read_fonts::{
    FontRef, TableProvider,
    tables::cmap::{Cmap, CmapSubtable},
};
use ttf2woff2::BrotliQuality;

/// WOFF2 signature (`wOF2`).
pub const WOFF2_SIGNATURE: &[u8; 4] = b"wOF2";

/// WOFF 1.0 signature (`wOFF`).
pub const WOFF_SIGNATURE: &[u8; 4] = b"wOFF";

/// Container format detected from the first four bytes of a font file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Woff2,
    Woff,
    Sfnt,
}

impl Container {
    pub fn detect(data: &[u8]) -> Self {
        match data.get(..4) {
            Some(sig) if sig == WOFF2_SIGNATURE => Container::Woff2,
            Some(sig) if sig == WOFF_SIGNATURE => Container::Woff,
            _ => Container::Sfnt,
        }
    }
}

/// Returns sfnt bytes for `data`, decompressing WOFF or WOFF2 containers.
///
/// Raw TrueType/OpenType input is borrowed unchanged.
pub fn decode(data: &[u8]) -> Result<Cow<'_, [u8]>> {
    match Container::detect(data) {
        Container::Woff2 => wuff::decompress_woff2(data)
            .map(Cow::Owned)
            .map_err(|e| anyhow!("Failed to decompress WOFF2: {e:?}")),
        Container::Woff => wuff::decompress_woff1(data)
            .map(Cow::Owned)
            .map_err(|e| anyhow!("Failed to decompress WOFF: {e:?}")),
        Container::Sfnt => Ok(Cow::Borrowed(data)),
    }
}

/// Compresses sfnt bytes into a WOFF2 file using the highest Brotli quality.
pub fn encode(sfnt: &[u8]) -> Result<Vec<u8>> {
    ttf2woff2::encode(sfnt, BrotliQuality::default())
        .map_err(|e| anyhow!("Failed to encode WOFF2: {e:?}"))
}

/// Returns the sorted, deduplicated codepoints mapped to a real glyph.
///
/// Accepts any container [`decode`] understands. Format 12 subtables are preferred
/// because they cover the full Unicode range; format 4 is the BMP fallback.
pub fn extract_codepoints(data: &[u8]) -> Result<Vec<u32>> {
    let sfnt = decode(data)?;
    let font = FontRef::new(&sfnt).context("Failed to parse font")?;
    let cmap = font.cmap().context("Failed to read cmap table")?;

    let mut codepoints = best_subtable_codepoints(&cmap);
    codepoints.sort_unstable();
    codepoints.dedup();
    Ok(codepoints)
}

fn best_subtable_codepoints(cmap: &Cmap) -> Vec<u32> {
    let records = cmap.encoding_records();

    for record in records.iter() {
        if let Ok(subtable @ CmapSubtable::Format12(_)) = record.subtable(cmap.offset_data()) {
            return mapped(&subtable);
        }
    }

    for record in records.iter() {
        if let Ok(subtable @ CmapSubtable::Format4(_)) = record.subtable(cmap.offset_data()) {
            return mapped(&subtable);
        }
    }

    Vec::new()
}

// gid 0 is .notdef; a codepoint mapped there is not covered by the font.
fn mapped(subtable: &CmapSubtable) -> Vec<u32> {
    subtable
        .iter()
        .filter(|(_, gid)| gid.to_u32() != 0)
        .map(|(cp, _)| cp)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_container() {
        assert_eq!(Container::detect(b"wOF2\0\x01\0\0"), Container::Woff2);
        assert_eq!(Container::detect(b"wOFF\0\x01\0\0"), Container::Woff);
        assert_eq!(Container::detect(b"\0\x01\0\0"), Container::Sfnt);
        assert_eq!(Container::detect(b"ab"), Container::Sfnt);
    }

    #[test]
    fn test_decode_passes_sfnt_through() {
        let data = font_test_data::CMAP12_FONT1;
        let decoded = decode(data).unwrap();
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(decoded.len(), data.len());
    }

    #[test]
    fn test_extract_codepoints_sorted_unique() {
        let codepoints = extract_codepoints(font_test_data::CMAP12_FONT1).unwrap();
        assert!(!codepoints.is_empty());
        assert!(codepoints.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_extract_codepoints_rejects_garbage() {
        assert!(extract_codepoints(b"not a font at all").is_err());
    }
}
