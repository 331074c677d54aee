use std::{fmt, sync::Arc};

use ahash::AHashMap;
use anyhow::{bail, Result};
use geo::Point;
use serde::{Deserialize, Serialize};

/// Locator of a static geometry file, relative to the configured data root,
/// e.g. "buildings/before/Ourika.geojson".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(Arc<str>);

impl FileRef {
    pub fn new(rel: impl AsRef<str>) -> Self { Self(Arc::from(rel.as_ref())) }

    #[inline] pub fn as_str(&self) -> &str { &self.0 }

    /// Join onto a data root (a directory or URL prefix), inserting a single '/'.
    pub fn resolve(&self, root: &str) -> String {
        if root.is_empty() { return self.0.to_string() }
        format!("{}/{}", root.trim_end_matches('/'), self.0.trim_start_matches('/'))
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// One administrative unit (commune or damage zone) known to the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionEntry {
    pub name: Arc<str>,
    pub centroid: Point<f64>, // (lon, lat)
    pub boundary_ref: FileRef,
    pub buildings_ref: Option<FileRef>,
}

impl RegionEntry {
    pub fn new(name: &str, lon: f64, lat: f64, boundary_ref: FileRef, buildings_ref: Option<FileRef>) -> Self {
        Self { name: Arc::from(name), centroid: Point::new(lon, lat), boundary_ref, buildings_ref }
    }
}

/// Immutable name -> region lookup, iterated in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    regions: Vec<Arc<RegionEntry>>,
    index: AHashMap<Arc<str>, usize>,
}

impl Registry {
    /// Build a registry, rejecting duplicate names and non-finite centroids.
    pub fn new(regions: Vec<RegionEntry>) -> Result<Self> {
        let mut index = AHashMap::with_capacity(regions.len());
        for (i, region) in regions.iter().enumerate() {
            if !region.centroid.x().is_finite() || !region.centroid.y().is_finite() {
                bail!("Region {:?} has a non-finite centroid", region.name);
            }
            if index.insert(region.name.clone(), i).is_some() {
                bail!("Duplicate region name {:?} in registry", region.name);
            }
        }
        Ok(Self { regions: regions.into_iter().map(Arc::new).collect(), index })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<RegionEntry>> {
        self.index.get(name).map(|&i| &self.regions[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RegionEntry>> { self.regions.iter() }

    pub fn names(&self) -> Vec<&str> { self.regions.iter().map(|r| r.name.as_ref()).collect() }

    #[inline] pub fn len(&self) -> usize { self.regions.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.regions.is_empty() }

    /// Distinct boundary files, in first-seen order.
    pub fn boundary_refs(&self) -> Vec<FileRef> {
        let mut out: Vec<FileRef> = Vec::new();
        for region in &self.regions {
            if !out.contains(&region.boundary_ref) {
                out.push(region.boundary_ref.clone());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, boundary: &str) -> RegionEntry {
        RegionEntry::new(name, -7.0, 31.0, FileRef::new(boundary), None)
    }

    #[test]
    fn lookup_preserves_declaration_order() {
        let reg = Registry::new(vec![entry("B", "x.geojson"), entry("A", "x.geojson")]).unwrap();
        assert_eq!(reg.names(), vec!["B", "A"]);
        assert_eq!(reg.get("A").unwrap().name.as_ref(), "A");
        assert!(reg.get("C").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        assert!(Registry::new(vec![entry("A", "x"), entry("A", "y")]).is_err());
    }

    #[test]
    fn boundary_refs_are_distinct() {
        let reg = Registry::new(vec![entry("A", "x"), entry("B", "y"), entry("C", "x")]).unwrap();
        assert_eq!(reg.boundary_refs(), vec![FileRef::new("x"), FileRef::new("y")]);
    }

    #[test]
    fn resolve_joins_with_single_slash() {
        let f = FileRef::new("/buildings/A.geojson");
        assert_eq!(f.resolve("data/"), "data/buildings/A.geojson");
        assert_eq!(f.resolve(""), "/buildings/A.geojson");
    }
}
