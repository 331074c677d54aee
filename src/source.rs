use std::{path::{Path, PathBuf}, sync::Arc};

use ahash::AHashMap;
use anyhow::{anyhow, Context, Result};
use walkdir::WalkDir;

use crate::registry::FileRef;

/// Read-only access to geometry files by data-root-relative locator, e.g.
/// "decoupage_administrative/commune_alhouz.geojson".
pub trait GeoSource {
    fn get(&self, file: &FileRef) -> Result<Vec<u8>>;
    fn has(&self, file: &FileRef) -> bool;
}

/// Files under a directory on disk.
pub struct DiskSource {
    root: PathBuf,
}

impl DiskSource {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    fn full(&self, file: &FileRef) -> PathBuf { self.root.join(file.as_str()) }
}

impl GeoSource for DiskSource {
    fn get(&self, file: &FileRef) -> Result<Vec<u8>> {
        let path = self.full(file);
        std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    fn has(&self, file: &FileRef) -> bool { self.full(file).is_file() }
}

/// In-memory files keyed by locator.
#[derive(Default, Clone)]
pub struct MemSource {
    files: AHashMap<String, Arc<[u8]>>,
}

impl MemSource {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, file: &str, bytes: impl Into<Vec<u8>>) {
        self.files.insert(file.to_string(), Arc::from(bytes.into()));
    }

    pub fn with(mut self, file: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(file, bytes);
        self
    }
}

impl GeoSource for MemSource {
    fn get(&self, file: &FileRef) -> Result<Vec<u8>> {
        self.files.get(file.as_str()).map(|b| b.to_vec())
            .ok_or_else(|| anyhow!("missing file: {file}"))
    }

    fn has(&self, file: &FileRef) -> bool { self.files.contains_key(file.as_str()) }
}

/// `.geojson` files under `path` in sorted order, or `path` itself if it is a file.
pub fn list_geojson(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
        let is_geojson = entry.path().extension().is_some_and(|ext| ext.eq_ignore_ascii_case("geojson"));
        if entry.file_type().is_file() && is_geojson {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
