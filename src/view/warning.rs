use serde::Serialize;
use thiserror::Error;

/// Non-fatal problems surfaced to the user. The dashboard stays interactive after any of them.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Warning {
    #[error("select a commune first")]
    NoRegionSelected,
    #[error("show the boundary layer before selecting a commune")]
    BoundariesHidden,
    #[error("unknown region {name:?}")]
    UnknownRegion { name: String },
    #[error("unknown size class {label:?}")]
    UnknownSizeClass { label: String },
    #[error("no building data for {region}")]
    MissingDataset { region: String },
    #[error("failed to load buildings for {region}: {reason}")]
    FetchFailed { region: String, reason: String },
    #[error("failed to load boundaries from {file}: {reason}")]
    BoundaryFetchFailed { file: String, reason: String },
    #[error("the {layer} layer is not available on this page")]
    LayerUnavailable { layer: String },
    #[error("failed to load the {layer} layer: {reason}")]
    LayerFetchFailed { layer: String, reason: String },
    #[error("map update failed: {reason}")]
    Surface { reason: String },
}

impl Warning {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Warning::NoRegionSelected => "no_region_selected",
            Warning::BoundariesHidden => "boundaries_hidden",
            Warning::UnknownRegion { .. } => "unknown_region",
            Warning::UnknownSizeClass { .. } => "unknown_size_class",
            Warning::MissingDataset { .. } => "missing_dataset",
            Warning::FetchFailed { .. } => "fetch_failed",
            Warning::BoundaryFetchFailed { .. } => "boundary_fetch_failed",
            Warning::LayerUnavailable { .. } => "layer_unavailable",
            Warning::LayerFetchFailed { .. } => "layer_fetch_failed",
            Warning::Surface { .. } => "surface",
        }
    }

    /// The region a warning is about, if any.
    pub fn region(&self) -> Option<&str> {
        match self {
            Warning::UnknownRegion { name } => Some(name),
            Warning::MissingDataset { region } | Warning::FetchFailed { region, .. } => Some(region),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failure_names_the_region() {
        let w = Warning::FetchFailed { region: "Ourika".into(), reason: "404".into() };
        assert_eq!(w.to_string(), "failed to load buildings for Ourika: 404");
        assert_eq!(w.region(), Some("Ourika"));
        assert_eq!(w.code(), "fetch_failed");
    }

    #[test]
    fn serializes_with_code_tag() {
        let v = serde_json::to_value(Warning::MissingDataset { region: "A".into() }).unwrap();
        assert_eq!(v, serde_json::json!({ "code": "missing_dataset", "region": "A" }));
    }
}
