use std::sync::Arc;

use tracing::{debug, warn};

use crate::{classes::SizeClasses, registry::Registry};

use super::{Intent, LayerName, OverlayName, OverlayPolicy, OverlayVisibility, ViewState, Warning};

/// A committed state transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub prev: ViewState,
    pub next: ViewState,
    /// The transition came from `ResetView`; the camera should return home.
    pub reset: bool,
    /// The already-selected region was selected again.
    pub reselected: bool,
}

impl Change {
    /// The region changed, or the same one was picked again.
    pub fn region_requested(&self) -> bool {
        self.reselected || self.prev.selected_region != self.next.selected_region
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Outcome {
    pub change: Option<Change>,
    pub warnings: Vec<Warning>,
}

impl Outcome {
    fn warning(w: Warning) -> Self {
        warn!(code = w.code(), "{w}");
        Self { change: None, warnings: vec![w] }
    }
}

/// Single authority over `ViewState`.
#[derive(Debug, Clone)]
pub struct LayerStore {
    registry: Arc<Registry>,
    classes: Arc<SizeClasses>,
    policy: OverlayPolicy,
    /// Layers the page lets the user toggle.
    offered: &'static [LayerName],
    state: ViewState,
}

impl LayerStore {
    pub const REGION_LAYERS: &'static [LayerName] = &[LayerName::Boundaries, LayerName::Buildings];

    /// A store offering the boundary and buildings layers.
    pub fn new(registry: Arc<Registry>, classes: Arc<SizeClasses>, policy: OverlayPolicy) -> Self {
        let state = ViewState::initial(&classes);
        Self { registry, classes, policy, offered: Self::REGION_LAYERS, state }
    }

    /// Restrict `ToggleLayer` to `layers`.
    pub fn offering(mut self, layers: &'static [LayerName]) -> Self {
        self.offered = layers;
        self
    }

    #[inline] pub fn offered(&self) -> &'static [LayerName] { self.offered }

    #[inline] pub fn state(&self) -> &ViewState { &self.state }

    #[inline] pub fn registry(&self) -> &Arc<Registry> { &self.registry }

    #[inline] pub fn classes(&self) -> &Arc<SizeClasses> { &self.classes }

    #[inline] pub fn policy(&self) -> OverlayPolicy { self.policy }

    /// Apply one intent. Rejected intents leave the state untouched and carry a warning.
    pub fn dispatch(&mut self, intent: Intent) -> Outcome {
        debug!(?intent, "dispatch");
        let prev = self.state.clone();
        let mut next = prev.clone();
        let mut reset = false;
        let mut reselected = false;

        if let Intent::ToggleLayer(layer) = intent {
            if !self.offered.contains(&layer) {
                return Outcome::warning(Warning::LayerUnavailable { layer: layer.to_str().to_string() });
            }
        }

        match intent {
            Intent::SelectRegion(name) => {
                let Some(entry) = self.registry.get(&name) else {
                    return Outcome::warning(Warning::UnknownRegion { name });
                };
                if !prev.layers.boundaries {
                    return Outcome::warning(Warning::BoundariesHidden);
                }
                reselected = prev.selected_region.as_deref() == Some(&*entry.name);
                next.selected_region = Some(entry.name.clone());
            }
            Intent::ToggleLayer(LayerName::Boundaries) => {
                if prev.layers.boundaries {
                    next.layers.boundaries = false;
                    next.layers.buildings = false;
                    next.selected_region = None;
                } else {
                    next.layers.boundaries = true;
                }
            }
            Intent::ToggleLayer(LayerName::Buildings) => {
                if prev.selected_region.is_none() {
                    return Outcome::warning(Warning::NoRegionSelected);
                }
                next.layers.buildings = !prev.layers.buildings;
            }
            Intent::ToggleLayer(layer @ (LayerName::Intensity | LayerName::Acceleration)) => {
                next.layers.set(layer, !prev.layers.is_on(layer));
            }
            Intent::ToggleOverlay(name) => {
                next.overlays = toggle_overlay(prev.overlays, name, self.policy);
            }
            Intent::ToggleSizeClass(label) => {
                if !self.classes.contains(&label) {
                    return Outcome::warning(Warning::UnknownSizeClass { label });
                }
                if !next.active_size_classes.remove(&label) {
                    next.active_size_classes.insert(label);
                }
            }
            Intent::SetMetric(metric) => next.metric = metric,
            Intent::ResetView => {
                next = ViewState::initial(&self.classes);
                reset = true;
            }
        }
        self.commit(prev, next, reset, reselected)
    }

    /// Record that `region`'s buildings are on the map. Only the synchronizer
    /// knows this; loads for a region no longer selected are dropped silently.
    pub(crate) fn buildings_loaded(&mut self, region: &str) -> Outcome {
        let prev = self.state.clone();
        let mut next = prev.clone();
        if prev.selected_region.as_deref() == Some(region) && prev.layers.boundaries {
            next.layers.buildings = true;
        }
        self.commit(prev, next, false, false)
    }

    fn commit(&mut self, prev: ViewState, next: ViewState, reset: bool, reselected: bool) -> Outcome {
        debug_assert!(!next.layers.buildings || next.selected_region.is_some());

        if next == prev && !reset && !reselected {
            return Outcome::default();
        }
        self.state = next.clone();
        Outcome { change: Some(Change { prev, next, reset, reselected }), warnings: Vec::new() }
    }
}

fn toggle_overlay(current: OverlayVisibility, name: OverlayName, policy: OverlayPolicy) -> OverlayVisibility {
    match (policy, name) {
        (OverlayPolicy::Independent, OverlayName::Stats) => OverlayVisibility { stats: !current.stats, ..current },
        (OverlayPolicy::Independent, OverlayName::Charts) => OverlayVisibility { charts: !current.charts, ..current },
        (OverlayPolicy::Exclusive, OverlayName::Stats) => OverlayVisibility { stats: !current.stats, charts: false },
        (OverlayPolicy::Exclusive, OverlayName::Charts) => OverlayVisibility { stats: false, charts: !current.charts },
    }
}
