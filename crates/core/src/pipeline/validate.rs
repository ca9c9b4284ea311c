//! Post-build artifact counts. Advisory only: findings become warnings.

use std::path::{Path, PathBuf};

use log::warn;

use crate::{config::BuildConfig, io::ArtifactStore};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationWarning {
    #[error("Expected {expected} full font files, got {found}")]
    FullFiles { expected: usize, found: usize },

    #[error("Expected {expected} CSS files, got {found}")]
    CssFiles { expected: usize, found: usize },

    #[error("Expected >{minimum} subset files, got {found}")]
    TooFewSubsets { minimum: usize, found: usize },

    #[error("{0} empty woff2 files found!")]
    EmptyFiles(usize),

    #[error("Could not list {}: {reason}", dir.display())]
    Unlisted { dir: PathBuf, reason: String },
}

/// What the output directories contain after a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub full_files: usize,
    pub subset_files: usize,
    pub css_files: usize,
    pub empty_files: usize,
    pub warnings: Vec<ValidationWarning>,
}

impl Validation {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

pub fn validate(config: &BuildConfig, store: &dyn ArtifactStore) -> Validation {
    let mut unlisted = Vec::new();
    let mut list = |dir: PathBuf, extension: &str| match store.list(&dir, extension) {
        Ok(paths) => paths,
        Err(e) => {
            unlisted.push(ValidationWarning::Unlisted { dir, reason: format!("{e:#}") });
            Vec::new()
        }
    };
    let full = list(config.full_dir(), &config.source_extension);
    let subsets = list(config.subset_dir(), "woff2");
    let css = list(config.css_dir(), "css");

    let is_empty = |path: &Path| store.size(path) == Some(0);
    let empty_files = full.iter().chain(&subsets).filter(|p| is_empty(p)).count();

    let mut validation = Validation {
        full_files: full.len(),
        subset_files: subsets.len(),
        css_files: css.len(),
        empty_files,
        warnings: unlisted,
    };

    let expected = config.expected_full_files();
    if validation.full_files != expected {
        validation
            .warnings
            .push(ValidationWarning::FullFiles { expected, found: validation.full_files });
    }

    let expected = config.expected_css_files();
    if validation.css_files != expected {
        validation
            .warnings
            .push(ValidationWarning::CssFiles { expected, found: validation.css_files });
    }

    if validation.empty_files > 0 {
        validation.warnings.push(ValidationWarning::EmptyFiles(validation.empty_files));
    }

    if validation.subset_files < config.min_subset_files {
        validation.warnings.push(ValidationWarning::TooFewSubsets {
            minimum: config.min_subset_files,
            found: validation.subset_files,
        });
    }

    for warning in &validation.warnings {
        warn!("{warning}");
    }

    validation
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, bail};

    use super::*;
    use crate::{
        config::{FAMILIES, WEIGHTS},
        io::MemoryStore,
    };

    /// Delegates to a [`MemoryStore`] but refuses to list `broken`.
    struct UnlistableStore {
        inner: MemoryStore,
        broken: PathBuf,
    }

    impl ArtifactStore for UnlistableStore {
        fn read(&self, path: &Path) -> Result<Vec<u8>> {
            self.inner.read(path)
        }

        fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
            self.inner.write(path, data)
        }

        fn copy(&self, from: &Path, to: &Path) -> Result<()> {
            self.inner.copy(from, to)
        }

        fn size(&self, path: &Path) -> Option<u64> {
            self.inner.size(path)
        }

        fn list(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
            if dir == self.broken {
                bail!("permission denied");
            }
            self.inner.list(dir, extension)
        }

        fn reset_dir(&self, dir: &Path) -> Result<()> {
            self.inner.reset_dir(dir)
        }
    }

    fn config() -> BuildConfig {
        BuildConfig::new("/root")
            .with_families([FAMILIES[0]])
            .with_weights(WEIGHTS[..2].to_vec())
            .with_min_subset_files(2)
    }

    #[test]
    fn test_expected_counts_are_clean() {
        let config = config();
        let store = MemoryStore::new();
        let family = config.families[0];
        for weight in &config.weights {
            let full = config.full_dir().join(config.font_file_name(&family, weight));
            store.insert(full, b"f".to_vec());
            store.insert(config.subset_artifact(&family, weight, 0), b"s".to_vec());
        }
        for name in ["a.css", "a.min.css", "b.css", "b.min.css"] {
            store.insert(config.css_dir().join(name), b"x".to_vec());
        }

        let validation = validate(&config, &store);
        assert!(validation.is_clean(), "{:?}", validation.warnings);
        assert_eq!(validation.full_files, 2);
        assert_eq!(validation.subset_files, 2);
        assert_eq!(validation.css_files, 4);
    }

    #[test]
    fn test_mismatches_become_warnings() {
        let config = config();
        let store = MemoryStore::new();
        let family = config.families[0];
        let full = config.full_dir().join(config.font_file_name(&family, &WEIGHTS[0]));
        store.insert(full, Vec::new());

        let validation = validate(&config, &store);
        assert_eq!(
            validation.warnings,
            vec![
                ValidationWarning::FullFiles { expected: 2, found: 1 },
                ValidationWarning::CssFiles { expected: 4, found: 0 },
                ValidationWarning::EmptyFiles(1),
                ValidationWarning::TooFewSubsets { minimum: 2, found: 0 },
            ]
        );
        assert_eq!(validation.warnings[0].to_string(), "Expected 2 full font files, got 1");
    }

    #[test]
    fn test_unlistable_dir_becomes_warning() {
        let config = config();
        let inner = MemoryStore::new();
        let family = config.families[0];
        for weight in &config.weights {
            let full = config.full_dir().join(config.font_file_name(&family, weight));
            inner.insert(full, b"f".to_vec());
            inner.insert(config.subset_artifact(&family, weight, 0), b"s".to_vec());
        }
        let store = UnlistableStore { inner, broken: config.css_dir() };

        let validation = validate(&config, &store);
        assert_eq!(validation.full_files, 2);
        assert_eq!(validation.subset_files, 2);
        assert_eq!(validation.css_files, 0);
        assert_eq!(
            validation.warnings,
            vec![
                ValidationWarning::Unlisted {
                    dir: config.css_dir(),
                    reason: "permission denied".to_string(),
                },
                ValidationWarning::CssFiles { expected: 4, found: 0 },
            ]
        );
    }
}
