use std::{fmt, str::FromStr};

use anyhow::{anyhow, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    config::{DashboardConfig, ViewConfig},
    dashboard::{Dashboard, DispatchReport},
    registry::Registry,
    surface::MapWidget,
    sync::Theme,
    view::{LayerName, LayerStore},
};

/// A dashboard page. Each page has its own registry and map theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    /// Al Haouz communes, buildings classified by footprint size.
    #[default]
    Overview,
    /// Damage zones, buildings colored by damage state.
    DamageAnalysis,
    /// Ground-motion fields of the event: intensity and peak acceleration.
    Seismic,
}

impl Page {
    pub fn to_str(&self) -> &'static str {
        match self {
            Page::Overview => "overview",
            Page::DamageAnalysis => "damage",
            Page::Seismic => "seismic",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Overview => "Al Haouz",
            Page::DamageAnalysis => "Analyse de dégâts",
            Page::Seismic => "Séisme d'Al Haouz 2023",
        }
    }

    pub fn registry(&self) -> Registry {
        match self {
            Page::Overview => Registry::al_haouz(),
            Page::DamageAnalysis => Registry::damage_zones(),
            Page::Seismic => Registry::default(),
        }
    }

    pub fn theme(&self) -> Theme {
        match self {
            Page::Overview => Theme::Communes,
            Page::DamageAnalysis => Theme::DamageZones,
            Page::Seismic => Theme::Seismic,
        }
    }

    /// Layers the user can toggle, in display order.
    pub fn layers(&self) -> &'static [LayerName] {
        match self {
            Page::Overview | Page::DamageAnalysis => LayerStore::REGION_LAYERS,
            Page::Seismic => &[LayerName::Intensity, LayerName::Acceleration],
        }
    }

    /// Camera when the page is mounted.
    pub fn initial_view<'a>(&self, config: &'a DashboardConfig) -> &'a ViewConfig {
        match self {
            Page::Overview | Page::DamageAnalysis => &config.initial_view,
            Page::Seismic => &config.seismic_view,
        }
    }

    /// Camera after `ResetView`.
    pub fn reset_view<'a>(&self, config: &'a DashboardConfig) -> &'a ViewConfig {
        match self {
            Page::Overview | Page::DamageAnalysis => &config.reset_view,
            Page::Seismic => &config.seismic_view,
        }
    }

    /// Constructor options for the host's map widget:
    /// `{ style, center, zoom, pitch }`.
    pub fn map_options(&self, config: &DashboardConfig) -> Value {
        let view = self.initial_view(config);
        json!({ "style": config.style, "center": view.center, "zoom": view.zoom, "pitch": view.pitch })
    }

    /// Zoom when flying to a region of this page.
    pub fn fly_zoom(&self, config: &DashboardConfig) -> f64 {
        match self {
            Page::Overview => config.region_zoom,
            Page::DamageAnalysis => config.zone_zoom,
            Page::Seismic => config.region_zoom,
        }
    }
}

impl FromStr for Page {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overview" | "alhaouz" => Ok(Page::Overview),
            "damage" | "damage-analysis" => Ok(Page::DamageAnalysis),
            "seismic" | "seisme" => Ok(Page::Seismic),
            _ => Err(anyhow!("Unknown page {s:?}. Expected one of: overview, damage, seismic")),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.to_str()) }
}

/// Holds the one mounted dashboard. Nothing carries over between pages.
pub struct Session<W: MapWidget> {
    config: DashboardConfig,
    current: Option<Dashboard<W>>,
}

impl<W: MapWidget> Session<W> {
    pub fn new(config: DashboardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, current: None })
    }

    /// Unmount the current page, then mount `page` on `widget`.
    pub fn open(&mut self, page: Page, widget: W) -> Result<DispatchReport> {
        self.close();
        let (dashboard, report) = Dashboard::mount(page, &self.config, widget)?;
        self.current = Some(dashboard);
        Ok(report)
    }

    /// Unmount the current page, destroying its widget.
    pub fn close(&mut self) {
        if let Some(mut dashboard) = self.current.take() {
            info!(page = %dashboard.page(), "closing page");
            dashboard.unmount();
        }
    }

    pub fn page(&self) -> Option<Page> { self.current.as_ref().map(Dashboard::page) }

    pub fn current(&self) -> Option<&Dashboard<W>> { self.current.as_ref() }

    pub fn current_mut(&mut self) -> Option<&mut Dashboard<W>> { self.current.as_mut() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{surface::MemoryWidget, view::Intent};

    #[test]
    fn switching_pages_destroys_the_previous_widget_first() {
        let mut session = Session::new(DashboardConfig::default()).unwrap();
        let first = MemoryWidget::new();
        session.open(Page::Overview, first.clone()).unwrap();
        session.current_mut().unwrap().dispatch(Intent::SelectRegion("Asni".into()));

        let second = MemoryWidget::new();
        let report = session.open(Page::DamageAnalysis, second.clone()).unwrap();
        assert_eq!(first.destroy_count(), 1);
        assert_eq!(second.destroy_count(), 0);
        assert_eq!(session.page(), Some(Page::DamageAnalysis));
        assert_eq!(report.fetches.len(), 5);
        assert_eq!(session.current().unwrap().state().selected_region(), None);

        session.close();
        assert_eq!(second.destroy_count(), 1);
    }

    #[test]
    fn page_names() {
        assert_eq!("alhaouz".parse::<Page>().unwrap(), Page::Overview);
        assert_eq!("damage".parse::<Page>().unwrap(), Page::DamageAnalysis);
        assert_eq!("seisme".parse::<Page>().unwrap(), Page::Seismic);
        assert!("seismique".parse::<Page>().is_err());
    }

    #[test]
    fn map_options_carry_style_and_page_camera() {
        let config = DashboardConfig { style: "mapbox://styles/custom".into(), ..DashboardConfig::default() };
        let options = Page::Overview.map_options(&config);
        assert_eq!(options["style"], "mapbox://styles/custom");
        assert_eq!(options["zoom"], 7.0);
        assert_eq!(Page::Seismic.map_options(&config)["center"], json!([-8.44, 31.11]));
    }
}
