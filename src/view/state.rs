use std::{collections::BTreeSet, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{chart::Metric, classes::SizeClasses};

use super::LayerName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerVisibility {
    pub boundaries: bool,
    pub buildings: bool,
    pub intensity: bool,
    pub acceleration: bool,
}

impl LayerVisibility {
    pub fn is_on(&self, layer: LayerName) -> bool {
        match layer {
            LayerName::Boundaries => self.boundaries,
            LayerName::Buildings => self.buildings,
            LayerName::Intensity => self.intensity,
            LayerName::Acceleration => self.acceleration,
        }
    }

    pub(super) fn set(&mut self, layer: LayerName, on: bool) {
        match layer {
            LayerName::Boundaries => self.boundaries = on,
            LayerName::Buildings => self.buildings = on,
            LayerName::Intensity => self.intensity = on,
            LayerName::Acceleration => self.acceleration = on,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverlayVisibility {
    pub stats: bool,
    pub charts: bool,
}

/// How the stats and charts panels interact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayPolicy {
    /// Each panel toggles on its own.
    #[default]
    Independent,
    /// Showing one panel hides the other.
    Exclusive,
}

/// What the user wants to see. Owned by `LayerStore` and only changed through intents.
///
/// Invariant: `layers.buildings` implies `selected_region.is_some()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub(super) selected_region: Option<Arc<str>>,
    pub(super) layers: LayerVisibility,
    pub(super) active_size_classes: BTreeSet<String>,
    pub(super) overlays: OverlayVisibility,
    pub(super) metric: Metric,
}

impl ViewState {
    /// Boundaries on, every other layer off, every size class active, stats panel shown, default metric.
    pub fn initial(classes: &SizeClasses) -> Self {
        Self {
            selected_region: None,
            layers: LayerVisibility { boundaries: true, buildings: false, intensity: false, acceleration: false },
            active_size_classes: classes.labels().map(str::to_string).collect(),
            overlays: OverlayVisibility { stats: true, charts: false },
            metric: Metric::default(),
        }
    }

    #[inline] pub fn selected_region(&self) -> Option<&str> { self.selected_region.as_deref() }

    #[inline] pub fn layers(&self) -> LayerVisibility { self.layers }

    #[inline] pub fn overlays(&self) -> OverlayVisibility { self.overlays }

    #[inline] pub fn metric(&self) -> Metric { self.metric }

    #[inline] pub fn active_size_classes(&self) -> &BTreeSet<String> { &self.active_size_classes }

    #[inline] pub fn is_class_active(&self, label: &str) -> bool { self.active_size_classes.contains(label) }
}
