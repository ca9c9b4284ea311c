//! Error types for the web distribution build.

use std::path::PathBuf;

/// Fatal build errors.
///
/// Everything else (empty subsets, subsetter failures, missing artifacts,
/// count mismatches) is isolated per job and only logged.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing source font for {family}: {}", path.display())]
    MissingSourceFont { family: String, path: PathBuf },

    #[error("invalid build configuration: {0}")]
    InvalidConfig(String),
}

/// Why a single subsetting job produced no usable artifact.
#[derive(Debug, thiserror::Error)]
pub enum SubsetError {
    #[error("subset contains only the placeholder glyph")]
    EmptyResult,

    #[error("{0:#}")]
    Failed(#[from] anyhow::Error),
}
