use std::{fmt, str::FromStr};

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

use crate::chart::Metric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerName {
    Boundaries,
    Buildings,
    /// Modified Mercalli intensity choropleth.
    Intensity,
    /// Peak ground acceleration choropleth.
    Acceleration,
}

impl LayerName {
    pub fn to_str(&self) -> &'static str {
        match self {
            LayerName::Boundaries => "boundaries",
            LayerName::Buildings => "buildings",
            LayerName::Intensity => "intensity",
            LayerName::Acceleration => "acceleration",
        }
    }
}

impl FromStr for LayerName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boundaries" | "communes" | "zones" => Ok(LayerName::Boundaries),
            "buildings" => Ok(LayerName::Buildings),
            "intensity" | "mi" => Ok(LayerName::Intensity),
            "acceleration" | "pga" => Ok(LayerName::Acceleration),
            _ => Err(anyhow!("Unknown layer {s:?}. Expected one of: boundaries, buildings, intensity, acceleration")),
        }
    }
}

impl fmt::Display for LayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.to_str()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayName {
    Stats,
    Charts,
}

impl OverlayName {
    pub fn to_str(&self) -> &'static str {
        match self {
            OverlayName::Stats => "stats",
            OverlayName::Charts => "charts",
        }
    }
}

impl FromStr for OverlayName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stats" => Ok(OverlayName::Stats),
            "charts" => Ok(OverlayName::Charts),
            _ => Err(anyhow!("Unknown overlay {s:?}. Expected one of: stats, charts")),
        }
    }
}

/// A named mutation of the view state.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SelectRegion(String),
    ToggleLayer(LayerName),
    ToggleOverlay(OverlayName),
    ToggleSizeClass(String),
    SetMetric(Metric),
    ResetView,
}
