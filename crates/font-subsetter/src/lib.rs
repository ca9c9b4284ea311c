//! Font subsetting wrapper around hb-subset with builder pattern.
//!
//! This crate provides a high-level interface for cutting a font down to an explicit
//! list of codepoints using HarfBuzz's hb-subset library. It operates purely on byte
//! slices with no file I/O dependencies; input must be a plain sfnt (TrueType/OpenType).
//!
//! # Example
//!
//! ```no_run
//! use sunghyun_font_subsetter::{Subsetter, glyph_count};
//!
//! let font_data: &[u8] = &[];
//! let subset = Subsetter::new()
//!     .with_codepoints([0x41, 0x42, 0x43])
//!     .subset(font_data)
//!     .unwrap();
//! assert!(glyph_count(&subset).unwrap() > 1);
//! ```

use anyhow::{Context, Result};
use hb_subset::{Blob, FontFace, SubsetInput, Tag};
use read_fonts::{FontRef, TableProvider};

/// Layout features to retain during subsetting.
///
/// Web chunks keep every feature a browser may apply to the covered text, so
/// this is deliberately broader than HarfBuzz's default set.
pub const WEB_LAYOUT_FEATURES: &[&[u8; 4]] = &[
    b"aalt", b"c2sc", b"calt", b"case", b"ccmp", b"clig", b"cpsp", b"dlig", b"dnom", b"frac",
    b"fwid", b"halt", b"hwid", b"kern", b"liga", b"ljmo", b"lnum", b"locl", b"mark", b"mkmk",
    b"numr", b"onum", b"ordn", b"palt", b"pnum", b"pwid", b"rlig", b"rvrn", b"salt", b"sinf",
    b"smcp", b"ss01", b"ss02", b"ss03", b"ss04", b"ss05", b"ss06", b"ss07", b"ss08", b"ss09",
    b"ss10", b"subs", b"sups", b"tjmo", b"tnum", b"vert", b"vhal", b"vjmo", b"vkrn", b"vpal",
    b"vrt2", b"zero",
];

/// Font subsetter with builder pattern.
///
/// Provides a flexible way to configure font subsetting options before
/// performing the subset operation.
#[derive(Debug, Clone, Default)]
pub struct Subsetter {
    codepoints: Vec<u32>,
    retain_glyph_names: bool,
    layout_features: Vec<[u8; 4]>,
}

impl Subsetter {
    /// Creates a new subsetter with default settings.
    ///
    /// Default settings use [`WEB_LAYOUT_FEATURES`] and do not retain glyph names.
    pub fn new() -> Self {
        Self {
            layout_features: WEB_LAYOUT_FEATURES.iter().map(|f| **f).collect(),
            ..Default::default()
        }
    }

    /// Adds codepoints to keep in the subset.
    ///
    /// Values that are not Unicode scalar values are ignored at subset time.
    pub fn with_codepoints(mut self, codepoints: impl IntoIterator<Item = u32>) -> Self {
        self.codepoints.extend(codepoints);
        self
    }

    /// Sets whether to retain glyph names in the subset.
    ///
    /// Glyph names can be useful for debugging but increase file size.
    pub fn retain_glyph_names(mut self, retain: bool) -> Self {
        self.retain_glyph_names = retain;
        self
    }

    /// Sets the layout features to retain in the subset.
    ///
    /// Replaces any previously configured layout features.
    pub fn with_layout_features(
        mut self,
        features: impl IntoIterator<Item = [u8; 4]>,
    ) -> Self {
        self.layout_features = features.into_iter().collect();
        self
    }

    pub fn codepoints(&self) -> &[u32] {
        &self.codepoints
    }

    /// Subsets the font data and returns the result.
    ///
    /// # Arguments
    ///
    /// * `data` - The raw sfnt font data
    ///
    /// # Returns
    ///
    /// The subset font data as a byte vector, or an error if subsetting fails.
    pub fn subset(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut input = SubsetInput::new()?;

        if self.retain_glyph_names {
            input.flags().retain_glyph_names();
        }

        {
            let mut feature_set = input.layout_feature_tag_set();
            for tag in &self.layout_features {
                feature_set.insert(Tag::new(tag));
            }
        }

        {
            let mut unicode_set = input.unicode_set();
            for c in self.codepoints.iter().filter_map(|cp| char::from_u32(*cp)) {
                unicode_set.insert(c);
            }
        }

        let font = FontFace::new(Blob::from_bytes(data)?)?;
        let subset_font = input.subset_font(&font)?;
        Ok(subset_font.underlying_blob().to_vec())
    }
}

/// Returns the number of glyphs in a font, `.notdef` included.
pub fn glyph_count(data: &[u8]) -> Result<u16> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let maxp = font.maxp().context("Failed to read maxp table")?;
    Ok(maxp.num_glyphs())
}

/// Returns `true` when a font holds nothing beyond the `.notdef` placeholder.
pub fn is_placeholder_only(data: &[u8]) -> Result<bool> {
    Ok(glyph_count(data)? <= 1)
}
