use anyhow::Result;
use log::info;

use crate::{config::BuildConfig, io::ArtifactStore};

/// Wipes the distribution directory and recreates its three output folders.
pub fn clean(config: &BuildConfig, store: &dyn ArtifactStore) -> Result<()> {
    store.reset_dir(&config.dist_dir)?;
    info!("Cleaned {}", config.dist_dir.display());

    let dirs = [config.css_dir(), config.full_dir(), config.subset_dir()];
    for dir in &dirs {
        store.reset_dir(dir)?;
    }

    println!("  Prepared {} output directories in {}", dirs.len(), config.dist_dir.display());
    Ok(())
}
