//! Artifact storage.
//!
//! All filesystem side effects of the pipeline go through [`ArtifactStore`], so the
//! whole build can run against [`MemoryStore`] in tests.

use std::{
    collections::BTreeMap,
    fs::{copy, create_dir_all, metadata, read, remove_dir_all, write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use glob::glob;
use parking_lot::Mutex;

pub trait ArtifactStore: Send + Sync {
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Writes `data`, creating parent directories as needed.
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    /// Size in bytes, or `None` when the artifact does not exist.
    fn size(&self, path: &Path) -> Option<u64>;

    /// Files directly inside `dir` with the given extension, sorted.
    fn list(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>>;

    /// Removes `dir` with everything below it and recreates it empty.
    fn reset_dir(&self, dir: &Path) -> Result<()>;

    fn exists(&self, path: &Path) -> bool {
        self.size(path).is_some()
    }
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl ArtifactStore for FsStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        read(path).with_context(|| format!("Failed to read font: {}", path.display()))
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        ensure_parent_dir(path)?;
        write(path, data).with_context(|| format!("Failed to write: {}", path.display()))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        ensure_parent_dir(to)?;
        copy(from, to)
            .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
        Ok(())
    }

    fn size(&self, path: &Path) -> Option<u64> {
        metadata(path).ok().filter(|m| m.is_file()).map(|m| m.len())
    }

    fn list(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        let pattern = dir.join(format!("*.{extension}"));
        let pattern_str = pattern.to_str().context("Invalid pattern path")?;
        let mut paths: Vec<PathBuf> = glob(pattern_str)
            .with_context(|| format!("Failed to glob pattern: {pattern_str}"))?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn reset_dir(&self, dir: &Path) -> Result<()> {
        if dir.exists() {
            remove_dir_all(dir)
                .with_context(|| format!("Failed to remove directory: {}", dir.display()))?;
        }
        create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// In-memory store keyed by path. Directories are implicit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file, as if it had been written before the run.
    pub fn insert(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.files.lock().insert(path.into(), data.into());
    }

    pub fn get(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().get(path).cloned()
    }

    pub fn remove(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().remove(path)
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().keys().cloned().collect()
    }

    /// Path/content pairs below `dir`, in path order.
    pub fn snapshot(&self, dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        self.files
            .lock()
            .iter()
            .filter(|(p, _)| p.starts_with(dir))
            .map(|(p, d)| (p.clone(), d.clone()))
            .collect()
    }
}

impl ArtifactStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.get(path).ok_or_else(|| anyhow!("Failed to read font: {}", path.display()))
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        self.insert(path, data);
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let data = self.read(from)?;
        self.insert(to, data);
        Ok(())
    }

    fn size(&self, path: &Path) -> Option<u64> {
        self.files.lock().get(path).map(|d| d.len() as u64)
    }

    fn list(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        Ok(self
            .files
            .lock()
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .filter(|p| p.extension().is_some_and(|e| e == extension))
            .cloned()
            .collect())
    }

    fn reset_dir(&self, dir: &Path) -> Result<()> {
        self.files.lock().retain(|p, _| !p.starts_with(dir));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_list_is_shallow_and_filtered() {
        let store = MemoryStore::new();
        store.insert("/out/a.woff2", b"a".to_vec());
        store.insert("/out/b.css", b"b".to_vec());
        store.insert("/out/nested/c.woff2", b"c".to_vec());

        let listed = store.list(Path::new("/out"), "woff2").unwrap();
        assert_eq!(listed, vec![PathBuf::from("/out/a.woff2")]);
    }

    #[test]
    fn test_memory_store_reset_dir() {
        let store = MemoryStore::new();
        store.insert("/out/web/a.css", b"a".to_vec());
        store.insert("/out/other.txt", b"b".to_vec());

        store.reset_dir(Path::new("/out/web")).unwrap();
        assert_eq!(store.paths(), vec![PathBuf::from("/out/other.txt")]);
    }

    #[test]
    fn test_memory_store_size_and_copy() {
        let store = MemoryStore::new();
        store.insert("/src/a.woff2", vec![0u8; 12]);
        store.copy(Path::new("/src/a.woff2"), Path::new("/dst/a.woff2")).unwrap();

        assert_eq!(store.size(Path::new("/dst/a.woff2")), Some(12));
        assert_eq!(store.size(Path::new("/dst/missing.woff2")), None);
        assert!(store.read(Path::new("/dst/missing.woff2")).is_err());
    }

    #[test]
    fn test_fs_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore;
        let nested = dir.path().join("web/css/a.css");

        store.write(&nested, b"body{}").unwrap();
        assert_eq!(store.size(&nested), Some(6));
        assert_eq!(store.list(&dir.path().join("web/css"), "css").unwrap(), vec![nested.clone()]);

        store.reset_dir(&dir.path().join("web")).unwrap();
        assert!(!store.exists(&nested));
        assert!(dir.path().join("web").is_dir());
    }
}
