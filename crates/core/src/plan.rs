//! Per-family slice plans, derived once per run from the reference weight.

use anyhow::Result;
use log::info;

use crate::{
    codepoints::{CodepointSet, extract_codepoints},
    config::{BuildConfig, FontFamily},
    engine::FontReader,
    error::BuildError,
    io::ArtifactStore,
    slicer::{Slice, make_slices},
};

#[derive(Debug, Clone)]
pub struct FamilyPlan {
    pub family: FontFamily,
    pub codepoints: CodepointSet,
    pub slices: Vec<Slice>,
}

/// Slices every configured family.
///
/// Fails on the first family whose reference font is missing or unreadable,
/// before any subsetting work has started.
pub fn plan_families(
    config: &BuildConfig,
    reader: &dyn FontReader,
    store: &dyn ArtifactStore,
) -> Result<Vec<FamilyPlan>> {
    let reference = *config.reference_weight().ok_or_else(|| {
        BuildError::InvalidConfig(format!("unknown reference weight {}", config.reference_weight))
    })?;

    config
        .families
        .iter()
        .map(|family| {
            let source = config.source_font(family, &reference);
            let codepoints = extract_codepoints(reader, store, family, &source)?;
            let slices = make_slices(&codepoints, config.slice_size);
            info!("{}: {} codepoints -> {} slices", family.slug, codepoints.len(), slices.len());
            Ok(FamilyPlan { family: *family, codepoints, slices })
        })
        .collect()
}
