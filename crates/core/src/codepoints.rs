//! Codepoint sets and their extraction from source fonts.

use std::path::Path;

use anyhow::{Context, Result};

use crate::{
    config::FontFamily,
    engine::FontReader,
    error::BuildError,
    io::ArtifactStore,
};

/// Sorted, duplicate-free codepoints covered by a font.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodepointSet(Vec<u32>);

impl CodepointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, codepoint: u32) -> bool {
        self.0.binary_search(&codepoint).is_ok()
    }
}

impl FromIterator<u32> for CodepointSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut codepoints: Vec<u32> = iter.into_iter().collect();
        codepoints.sort_unstable();
        codepoints.dedup();
        Self(codepoints)
    }
}

impl From<Vec<u32>> for CodepointSet {
    fn from(codepoints: Vec<u32>) -> Self {
        codepoints.into_iter().collect()
    }
}

/// Reads a family's reference font and returns the codepoints it covers.
///
/// A missing source is fatal ([`BuildError::MissingSourceFont`]): without it
/// there is nothing to slice.
pub fn extract_codepoints(
    reader: &dyn FontReader,
    store: &dyn ArtifactStore,
    family: &FontFamily,
    source: &Path,
) -> Result<CodepointSet> {
    if !store.exists(source) {
        return Err(BuildError::MissingSourceFont {
            family: family.slug.to_string(),
            path: source.to_path_buf(),
        }
        .into());
    }

    let data = store.read(source)?;
    reader
        .codepoints(&data)
        .with_context(|| format!("Failed to read codepoints from {}", source.display()))
}
