//! Build configuration for the Sunghyun Sans web distribution.
//!
//! Everything here is fixed for the duration of a run. The pipeline never reads
//! these tables directly; it receives a [`BuildConfig`] so tests can swap in
//! synthetic families, weights, and sizes.

use std::{
    collections::HashSet,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use crate::error::BuildError;

/// Codepoints per dynamic-subset slice.
pub const SLICE_SIZE: NonZeroUsize = NonZeroUsize::new(150).unwrap();

/// Parallel subsetting workers.
pub const MAX_WORKERS: NonZeroUsize = NonZeroUsize::new(8).unwrap();

/// Weight whose cmap defines a family's codepoint set.
pub const REFERENCE_WEIGHT: &str = "Regular";

/// Below this many subset chunks the build is probably broken.
pub const MIN_SUBSET_FILES: usize = 2500;

/// CSS files emitted per family (full, full.min, dynamic-subset, dynamic-subset.min).
pub const CSS_FILES_PER_FAMILY: usize = 4;

/// Source fonts, relative to the project root.
pub const SOURCE_DIR: &str = "fonts/woff2";

/// Source font extension.
pub const SOURCE_EXTENSION: &str = "woff2";

/// Web distribution output, relative to the project root.
pub const DIST_DIR: &str = "dist/web";

pub const CSS_DIR: &str = "css";
pub const FULL_DIR: &str = "woff2";
pub const SUBSET_DIR: &str = "woff2-dynamic-subset";

/// Named weight with its CSS numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Weight {
    pub name: &'static str,
    pub value: u16,
}

impl Weight {
    pub const fn new(name: &'static str, value: u16) -> Self {
        Self { name, value }
    }
}

/// The nine static weights shipped for every family, lightest first.
pub const WEIGHTS: &[Weight] = &[
    Weight::new("Thin", 100),
    Weight::new("ExtraLight", 200),
    Weight::new("Light", 300),
    Weight::new("Regular", 400),
    Weight::new("Medium", 500),
    Weight::new("SemiBold", 600),
    Weight::new("Bold", 700),
    Weight::new("ExtraBold", 800),
    Weight::new("Black", 900),
];

/// A font family as published on the web.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontFamily {
    /// Stem for CSS file names.
    pub slug: &'static str,
    /// Value of the CSS `font-family` descriptor.
    pub display_name: &'static str,
    /// Stem for font file names (`{prefix}-{Weight}.woff2`).
    pub file_prefix: &'static str,
    pub is_cjk: bool,
    /// Static script range for CJK families; `None` for Latin-style families.
    pub unicode_range: Option<&'static str>,
}

impl FontFamily {
    pub const fn latin(
        slug: &'static str,
        display_name: &'static str,
        file_prefix: &'static str,
    ) -> Self {
        Self { slug, display_name, file_prefix, is_cjk: false, unicode_range: None }
    }

    pub const fn cjk(
        slug: &'static str,
        display_name: &'static str,
        file_prefix: &'static str,
        unicode_range: &'static str,
    ) -> Self {
        Self { slug, display_name, file_prefix, is_cjk: true, unicode_range: Some(unicode_range) }
    }
}

const HANGUL_RANGE: &str = "U+AC00-D7AF, U+1100-11FF, U+3130-318F, U+A960-A97F, U+D7B0-D7FF";

/// Families published by the project.
pub const FAMILIES: &[FontFamily] = &[
    FontFamily::latin("sunghyun-sans", "Sunghyun Sans", "SunghyunSans"),
    FontFamily::cjk("sunghyun-sans-kr", "Sunghyun Sans KR", "SunghyunSansKR", HANGUL_RANGE),
    FontFamily::cjk(
        "sunghyun-sans-jp",
        "Sunghyun Sans JP",
        "SunghyunSansJP",
        "U+3000-303F, U+3040-309F, U+30A0-30FF, U+31F0-31FF, \
         U+4E00-9FFF, U+3400-4DBF, U+F900-FAFF, U+FF00-FFEF",
    ),
    FontFamily::cjk(
        "sunghyun-sans-disambiguated",
        "Sunghyun Sans Disambiguated",
        "SunghyunSansDisambiguated",
        "U+AC00-D7AF, U+1100-11FF, U+3130-318F, U+A960-A97F, U+D7B0-D7FF, \
         U+3000-303F, U+3040-309F, U+30A0-30FF, U+31F0-31FF, \
         U+4E00-9FFF, U+3400-4DBF, U+F900-FAFF, U+FF00-FFEF",
    ),
];

/// Immutable inputs of one build run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub families: Vec<FontFamily>,
    pub weights: Vec<Weight>,
    pub reference_weight: &'static str,
    pub slice_size: NonZeroUsize,
    pub workers: NonZeroUsize,
    pub source_dir: PathBuf,
    pub source_extension: String,
    pub dist_dir: PathBuf,
    pub min_subset_files: usize,
}

impl BuildConfig {
    /// Default configuration for a checkout rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            families: FAMILIES.to_vec(),
            weights: WEIGHTS.to_vec(),
            reference_weight: REFERENCE_WEIGHT,
            slice_size: SLICE_SIZE,
            workers: MAX_WORKERS,
            source_dir: root.join(SOURCE_DIR),
            source_extension: SOURCE_EXTENSION.to_string(),
            dist_dir: root.join(DIST_DIR),
            min_subset_files: MIN_SUBSET_FILES,
        }
    }

    pub fn with_families(mut self, families: impl IntoIterator<Item = FontFamily>) -> Self {
        self.families = families.into_iter().collect();
        self
    }

    pub fn with_weights(mut self, weights: impl IntoIterator<Item = Weight>) -> Self {
        self.weights = weights.into_iter().collect();
        self
    }

    pub fn with_slice_size(mut self, slice_size: NonZeroUsize) -> Self {
        self.slice_size = slice_size;
        self
    }

    pub fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_min_subset_files(mut self, min: usize) -> Self {
        self.min_subset_files = min;
        self
    }

    /// Checks the tables for mistakes that would otherwise surface mid-build.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.weights.is_empty() {
            return Err(BuildError::InvalidConfig("weight list is empty".into()));
        }
        if self.reference_weight().is_none() {
            return Err(BuildError::InvalidConfig(format!(
                "reference weight {} is not in the weight list",
                self.reference_weight
            )));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.weights.iter().find(|w| !seen.insert(w.name)) {
            return Err(BuildError::InvalidConfig(format!("duplicate weight {}", dup.name)));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.families.iter().find(|f| !seen.insert(f.slug)) {
            return Err(BuildError::InvalidConfig(format!("duplicate family {}", dup.slug)));
        }

        Ok(())
    }

    pub fn reference_weight(&self) -> Option<&Weight> {
        self.weights.iter().find(|w| w.name == self.reference_weight)
    }

    pub fn expected_full_files(&self) -> usize {
        self.families.len() * self.weights.len()
    }

    pub fn expected_css_files(&self) -> usize {
        self.families.len() * CSS_FILES_PER_FAMILY
    }

    pub fn css_dir(&self) -> PathBuf {
        self.dist_dir.join(CSS_DIR)
    }

    pub fn full_dir(&self) -> PathBuf {
        self.dist_dir.join(FULL_DIR)
    }

    pub fn subset_dir(&self) -> PathBuf {
        self.dist_dir.join(SUBSET_DIR)
    }

    /// `{prefix}-{Weight}.{ext}`, shared by the source font and its full copy.
    pub fn font_file_name(&self, family: &FontFamily, weight: &Weight) -> String {
        format!("{}-{}.{}", family.file_prefix, weight.name, self.source_extension)
    }

    pub fn source_font(&self, family: &FontFamily, weight: &Weight) -> PathBuf {
        self.source_dir.join(self.font_file_name(family, weight))
    }

    pub fn subset_file_name(family: &FontFamily, weight: &Weight, index: usize) -> String {
        format!("{}-{}.subset.{index}.woff2", family.file_prefix, weight.name)
    }

    pub fn subset_artifact(&self, family: &FontFamily, weight: &Weight, index: usize) -> PathBuf {
        self.subset_dir().join(Self::subset_file_name(family, weight, index))
    }

    /// CSS `format()` hint for the full artifacts.
    pub fn full_format_hint(&self) -> &'static str {
        format_hint(&self.source_extension)
    }
}

/// Maps a font file extension to its CSS `format()` keyword.
pub fn format_hint(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "woff" => "woff",
        "ttf" => "truetype",
        "otf" => "opentype",
        _ => "woff2",
    }
}
