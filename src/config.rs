use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{classes::{SizeClass, SizeClasses}, view::OverlayPolicy};

/// A camera position: `center` is (lon, lat).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub center: [f64; 2],
    pub zoom: f64,
    #[serde(default)]
    pub pitch: f64,
}

/// Dashboard settings. Every field has a default, so a partial TOML file
/// (or an empty JS object) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Map style for the host to construct the widget with; see `Page::map_options`.
    pub style: String,
    /// Directory or URL prefix that file locators are resolved against.
    pub data_root: String,
    /// Camera when the map is mounted.
    pub initial_view: ViewConfig,
    /// Camera after a view reset.
    pub reset_view: ViewConfig,
    /// Camera of the seismic page, on mount and after a reset.
    pub seismic_view: ViewConfig,
    /// Zoom when flying to a selected commune.
    pub region_zoom: f64,
    /// Zoom when flying to a damage-analysis zone.
    pub zone_zoom: f64,
    pub fly_duration_ms: u32,
    /// Numeric footprint-area attribute of building features.
    pub area_attribute: String,
    /// Categorical damage attribute of building features.
    pub damage_attribute: String,
    /// Numeric attribute of ground-motion features.
    pub hazard_attribute: String,
    pub overlay_policy: OverlayPolicy,
    pub size_classes: Vec<SizeClass>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            style: "mapbox://styles/mapbox/satellite-v9".to_string(),
            data_root: "./src/assets/data".to_string(),
            initial_view: ViewConfig { center: [-8.1938, 30.9900], zoom: 7.0, pitch: 45.0 },
            reset_view: ViewConfig { center: [-8.1938, 30.9900], zoom: 9.0, pitch: 45.0 },
            seismic_view: ViewConfig { center: [-8.44, 31.11], zoom: 7.0, pitch: 0.0 },
            region_zoom: 15.0,
            zone_zoom: 13.0,
            fly_duration_ms: 2000,
            area_attribute: "area_in_meters".to_string(),
            damage_attribute: "degat".to_string(),
            hazard_attribute: "PARAMVALUE".to_string(),
            overlay_policy: OverlayPolicy::default(),
            size_classes: SizeClasses::default().iter().cloned().collect(),
        }
    }
}

impl DashboardConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DashboardConfig = toml::from_str(content)
            .context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject non-finite cameras, non-positive zooms and size classes that do not partition the domain.
    pub fn validate(&self) -> Result<()> {
        let views = [("initial_view", &self.initial_view), ("reset_view", &self.reset_view), ("seismic_view", &self.seismic_view)];
        for (name, view) in views {
            if !view.center.iter().chain([&view.zoom, &view.pitch]).all(|v| v.is_finite()) {
                bail!("{name} must contain only finite numbers");
            }
        }
        for (name, zoom) in [("region_zoom", self.region_zoom), ("zone_zoom", self.zone_zoom)] {
            if !zoom.is_finite() || zoom < 0.0 {
                bail!("{name} must be a non-negative finite number, got {zoom}");
            }
        }
        for (name, attr) in [("area_attribute", &self.area_attribute), ("hazard_attribute", &self.hazard_attribute)] {
            if attr.is_empty() {
                bail!("{name} must not be empty");
            }
        }
        self.size_classes()?;
        Ok(())
    }

    pub fn size_classes(&self) -> Result<SizeClasses> {
        SizeClasses::new(self.size_classes.clone()).context("Invalid size_classes")
    }
}
