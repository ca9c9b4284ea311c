//! Font capabilities used by the pipeline.
//!
//! The pipeline only needs two things from a font library: the codepoints a font
//! covers, and a reduced font for a list of codepoints. [`HarfBuzzEngine`] provides
//! both for real builds; tests plug in deterministic stubs.

use anyhow::Result;
use sunghyun_font_subsetter::{Subsetter, is_placeholder_only};
use sunghyun_font_woff2::{Container, decode, encode, extract_codepoints};

use crate::{codepoints::CodepointSet, error::SubsetError};

pub trait FontReader: Send + Sync {
    fn codepoints(&self, font_data: &[u8]) -> Result<CodepointSet>;
}

pub trait FontSubsetter: Send + Sync {
    /// Converts a source file, once per run, into the bytes every job for it receives.
    fn prepare_source(&self, font_data: Vec<u8>) -> Result<Vec<u8>> {
        Ok(font_data)
    }

    /// Returns the artifact bytes for `codepoints` cut out of `font_data`.
    fn subset(&self, font_data: &[u8], codepoints: &[u32]) -> Result<Vec<u8>, SubsetError>;
}

/// hb-subset based engine producing WOFF2 chunks from WOFF2 (or sfnt) sources.
#[derive(Debug, Clone, Default)]
pub struct HarfBuzzEngine {
    subsetter: Subsetter,
}

impl HarfBuzzEngine {
    pub fn new() -> Self {
        Self { subsetter: Subsetter::new() }
    }
}

impl FontReader for HarfBuzzEngine {
    fn codepoints(&self, font_data: &[u8]) -> Result<CodepointSet> {
        Ok(extract_codepoints(font_data)?.into())
    }
}

impl FontSubsetter for HarfBuzzEngine {
    /// Unwraps WOFF/WOFF2 sources so jobs skip the Brotli decode.
    fn prepare_source(&self, font_data: Vec<u8>) -> Result<Vec<u8>> {
        match Container::detect(&font_data) {
            Container::Sfnt => Ok(font_data),
            Container::Woff | Container::Woff2 => Ok(decode(&font_data)?.into_owned()),
        }
    }

    fn subset(&self, font_data: &[u8], codepoints: &[u32]) -> Result<Vec<u8>, SubsetError> {
        let sfnt = decode(font_data)?;
        let subset = self
            .subsetter
            .clone()
            .with_codepoints(codepoints.iter().copied())
            .subset(&sfnt)?;

        if is_placeholder_only(&subset)? {
            return Err(SubsetError::EmptyResult);
        }

        Ok(encode(&subset)?)
    }
}
