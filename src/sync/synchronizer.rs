use std::sync::Arc;

use ahash::AHashMap;
use anyhow::Result;
use tracing::{debug, info, warn};

use crate::{
    classes::SizeClasses,
    expr::size_filter,
    geojson::{BuildingSummary, CommuneStats, GeoDocument},
    registry::{FileRef, RegionEntry, Registry},
    surface::{Camera, MapSurface, MapWidget, Slot},
    view::{Change, ViewState, Warning},
};

use super::{fetch::Pending, FetchKind, FetchRequest, Hazard, Theme, Ticket};

#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    pub theme: Theme,
    pub data_root: String,
    pub area_attribute: String,
    pub damage_attribute: String,
    /// Numeric attribute of ground-motion features.
    pub hazard_attribute: String,
    /// Zoom used when flying to a region that just loaded.
    pub fly_zoom: f64,
    pub fly_duration_ms: u32,
    pub reset_camera: Camera,
}

/// What one synchronization step produced.
#[derive(Debug, Default, PartialEq)]
pub struct SyncReport {
    /// New fetches for the host to perform.
    pub fetches: Vec<FetchRequest>,
    pub warnings: Vec<Warning>,
    /// Region whose buildings just went on the map. The store is told through
    /// `LayerStore::buildings_loaded`.
    pub loaded: Option<Arc<str>>,
}

impl SyncReport {
    fn warn(&mut self, warning: Warning) {
        warn!(code = warning.code(), "{warning}");
        self.warnings.push(warning);
    }

    /// Turn a failed widget call into a warning. Returns whether the call succeeded.
    fn check(&mut self, result: Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                self.warn(Warning::Surface { reason: format!("{e:#}") });
                false
            }
        }
    }
}

/// Brings the map in line with the view state, one transition at a time.
pub struct Synchronizer {
    settings: SyncSettings,
    registry: Arc<Registry>,
    classes: Arc<SizeClasses>,
    pending: Pending,
    boundary_files: Vec<FileRef>,
    boundary_docs: AHashMap<FileRef, GeoDocument>,
    /// Merged boundaries, once every file has loaded.
    boundaries: Option<GeoDocument>,
    stats: Option<CommuneStats>,
    /// Last buildings document that loaded, with its region.
    buildings: Option<(Arc<str>, GeoDocument)>,
    summary: Option<BuildingSummary>,
    hazards: AHashMap<Hazard, GeoDocument>,
}

impl Synchronizer {
    pub fn new(settings: SyncSettings, registry: Arc<Registry>, classes: Arc<SizeClasses>) -> Self {
        let boundary_files = registry.boundary_refs();
        Self {
            settings,
            registry,
            classes,
            pending: Pending::default(),
            boundary_files,
            boundary_docs: AHashMap::new(),
            boundaries: None,
            stats: None,
            buildings: None,
            summary: None,
            hazards: AHashMap::new(),
        }
    }

    #[inline] pub fn settings(&self) -> &SyncSettings { &self.settings }

    /// Aggregates over the loaded boundary features.
    #[inline] pub fn stats(&self) -> Option<&CommuneStats> { self.stats.as_ref() }

    /// Counts over the buildings currently on the map.
    #[inline] pub fn summary(&self) -> Option<&BuildingSummary> { self.summary.as_ref() }

    #[inline] pub fn pending_fetches(&self) -> usize { self.pending.len() }

    /// Bring a freshly mounted surface up to `state`.
    pub fn start<W: MapWidget>(&mut self, surface: &mut MapSurface<W>, state: &ViewState) -> SyncReport {
        let mut report = SyncReport::default();
        if state.layers().boundaries {
            self.show_boundaries(surface, &mut report);
        }
        for hazard in self.settings.theme.hazards() {
            if state.layers().is_on(hazard.layer()) {
                self.show_hazard(surface, *hazard, &mut report);
            }
        }
        report
    }

    /// Apply one store transition. Removals for a slot always precede additions.
    pub fn apply<W: MapWidget>(&mut self, surface: &mut MapSurface<W>, change: &Change) -> SyncReport {
        let mut report = SyncReport::default();
        let (prev, next) = (&change.prev, &change.next);

        for hazard in self.settings.theme.hazards() {
            let layer = hazard.layer();
            match (prev.layers().is_on(layer), next.layers().is_on(layer)) {
                (false, true) => self.show_hazard(surface, *hazard, &mut report),
                (true, false) => { report.check(surface.remove_layer_and_source(hazard.slot())); }
                _ => {}
            }
        }

        if change.reset {
            self.clear_buildings(surface, &mut report);
            if !next.layers().boundaries {
                report.check(surface.remove_layer_and_source(Slot::Boundaries));
            }
            report.check(surface.fly_to(&self.settings.reset_camera));
            if next.layers().boundaries {
                self.show_boundaries(surface, &mut report);
            }
            return report;
        }

        if prev.layers().boundaries && !next.layers().boundaries {
            self.clear_buildings(surface, &mut report);
            report.check(surface.remove_layer_and_source(Slot::Boundaries));
            return report;
        }
        if !prev.layers().boundaries && next.layers().boundaries {
            self.show_boundaries(surface, &mut report);
        }

        if change.region_requested() {
            if let Some(name) = next.selected_region() {
                self.request_buildings(surface, next, name, &mut report);
            }
        } else if prev.layers().buildings != next.layers().buildings {
            if !next.layers().buildings {
                self.clear_buildings(surface, &mut report);
            } else if let Some(name) = next.selected_region() {
                let shown = surface.loaded(Slot::Buildings).and_then(|l| l.tag.as_deref()) == Some(name);
                if !shown {
                    self.request_buildings(surface, next, name, &mut report);
                }
            }
        }

        if prev.active_size_classes() != next.active_size_classes()
            && self.settings.theme.filters_by_size()
            && surface.loaded(Slot::Buildings).is_some()
        {
            let filter = size_filter(&self.classes, |label| next.is_class_active(label), &self.settings.area_attribute);
            report.check(surface.set_filter(self.settings.theme.building_layer_id(), Some(&filter)));
        }

        report
    }

    /// Settle a fetch. `state` is the store's current state, used to discard stale results.
    pub fn complete<W: MapWidget>(
        &mut self,
        surface: &mut MapSurface<W>,
        state: &ViewState,
        ticket: Ticket,
        result: Result<Vec<u8>>,
    ) -> SyncReport {
        let mut report = SyncReport::default();
        let Some(request) = self.pending.take(ticket) else {
            debug!(%ticket, "ignoring unknown or settled ticket");
            return report;
        };
        let parsed = result.and_then(|bytes| GeoDocument::parse(&bytes));

        match request.kind {
            FetchKind::Boundaries => self.boundaries_loaded(surface, state, request.file, parsed, &mut report),
            FetchKind::Buildings { region } => self.buildings_loaded(surface, state, region, parsed, &mut report),
            FetchKind::Hazard { layer } => self.hazard_loaded(surface, state, layer, parsed, &mut report),
        }
        report
    }

    fn boundaries_loaded<W: MapWidget>(
        &mut self,
        surface: &mut MapSurface<W>,
        state: &ViewState,
        file: FileRef,
        parsed: Result<GeoDocument>,
        report: &mut SyncReport,
    ) {
        match parsed {
            Ok(doc) => {
                info!(%file, features = doc.len(), "boundaries loaded");
                self.boundary_docs.insert(file, doc);
            }
            Err(e) => report.warn(Warning::BoundaryFetchFailed { file: file.to_string(), reason: format!("{e:#}") }),
        }
        if self.pending.any_boundaries() {
            return;
        }

        // Files load independently; render once the batch is settled.
        let Some(merged) = self.merged_boundaries() else { return };
        if self.settings.theme.has_commune_stats() {
            self.stats = Some(CommuneStats::from_document(&merged));
        }
        if self.boundary_docs.len() == self.boundary_files.len() {
            self.boundaries = Some(merged.clone());
        }
        if state.layers().boundaries {
            let layers = self.settings.theme.boundary_layers();
            report.check(surface.load_slot(Slot::Boundaries, merged, &layers, None));
        }
    }

    fn buildings_loaded<W: MapWidget>(
        &mut self,
        surface: &mut MapSurface<W>,
        state: &ViewState,
        region: Arc<str>,
        parsed: Result<GeoDocument>,
        report: &mut SyncReport,
    ) {
        if state.selected_region() != Some(&*region) || !state.layers().boundaries {
            debug!(region = &*region, "discarding buildings for a region no longer selected");
            return;
        }
        let doc = match parsed {
            Ok(doc) => doc,
            Err(e) => {
                report.warn(Warning::FetchFailed { region: region.to_string(), reason: format!("{e:#}") });
                return;
            }
        };
        let Some(entry) = self.registry.get(&region).cloned() else { return };
        self.buildings = Some((region, doc.clone()));
        self.show_buildings(surface, state, &entry, doc, report);
    }

    fn request_buildings<W: MapWidget>(
        &mut self,
        surface: &mut MapSurface<W>,
        state: &ViewState,
        name: &str,
        report: &mut SyncReport,
    ) {
        let Some(entry) = self.registry.get(name).cloned() else {
            report.warn(Warning::UnknownRegion { name: name.to_string() });
            return;
        };
        let Some(file) = entry.buildings_ref.clone() else {
            report.warn(Warning::MissingDataset { region: name.to_string() });
            return;
        };

        let cached = match &self.buildings {
            Some((region, doc)) if **region == *name => Some(doc.clone()),
            _ => None,
        };
        if let Some(doc) = cached {
            debug!(region = name, "buildings served from cache");
            self.show_buildings(surface, state, &entry, doc, report);
            return;
        }

        let kind = FetchKind::Buildings { region: entry.name.clone() };
        if self.pending.is_pending(&kind, &file) {
            debug!(region = name, "buildings fetch already in flight");
            return;
        }
        report.fetches.push(self.pending.issue(kind, file, &self.settings.data_root));
    }

    /// Replace the buildings slot, filter it, then fly to the region.
    fn show_buildings<W: MapWidget>(
        &mut self,
        surface: &mut MapSurface<W>,
        state: &ViewState,
        entry: &RegionEntry,
        doc: GeoDocument,
        report: &mut SyncReport,
    ) {
        let settings = &self.settings;
        let spec = settings.theme.building_layer(&self.classes, state, &settings.area_attribute, &settings.damage_attribute);
        let summary = BuildingSummary::from_document(&doc, &self.classes, &settings.area_attribute, &settings.damage_attribute);
        if !report.check(surface.load_slot(Slot::Buildings, doc, &[spec], Some(entry.name.clone()))) {
            return;
        }
        self.summary = Some(summary);
        report.loaded = Some(entry.name.clone());
        let camera = Camera::new(entry.centroid, settings.fly_zoom, settings.fly_duration_ms);
        report.check(surface.fly_to(&camera));
    }

    fn clear_buildings<W: MapWidget>(&mut self, surface: &mut MapSurface<W>, report: &mut SyncReport) {
        self.summary = None;
        report.check(surface.remove_layer_and_source(Slot::Buildings));
    }

    fn show_boundaries<W: MapWidget>(&mut self, surface: &mut MapSurface<W>, report: &mut SyncReport) {
        if surface.loaded(Slot::Boundaries).is_some() {
            return;
        }
        if let Some(doc) = self.boundaries.clone() {
            let layers = self.settings.theme.boundary_layers();
            report.check(surface.load_slot(Slot::Boundaries, doc, &layers, None));
            return;
        }
        for file in &self.boundary_files {
            if self.boundary_docs.contains_key(file) || self.pending.is_pending(&FetchKind::Boundaries, file) {
                continue;
            }
            report.fetches.push(self.pending.issue(FetchKind::Boundaries, file.clone(), &self.settings.data_root));
        }
    }

    fn hazard_loaded<W: MapWidget>(
        &mut self,
        surface: &mut MapSurface<W>,
        state: &ViewState,
        hazard: Hazard,
        parsed: Result<GeoDocument>,
        report: &mut SyncReport,
    ) {
        match parsed {
            Ok(doc) => {
                info!(layer = hazard.abbreviation(), features = doc.len(), "ground motion loaded");
                self.hazards.insert(hazard, doc);
                if state.layers().is_on(hazard.layer()) {
                    self.show_hazard(surface, hazard, report);
                }
            }
            Err(e) => report.warn(Warning::LayerFetchFailed {
                layer: hazard.layer().to_str().to_string(),
                reason: format!("{e:#}"),
            }),
        }
    }

    /// Show a ground-motion layer from the cache, or fetch it once.
    fn show_hazard<W: MapWidget>(&mut self, surface: &mut MapSurface<W>, hazard: Hazard, report: &mut SyncReport) {
        if surface.loaded(hazard.slot()).is_some() {
            return;
        }
        if let Some(doc) = self.hazards.get(&hazard).cloned() {
            let spec = hazard.layer_spec(&self.settings.hazard_attribute);
            report.check(surface.load_slot(hazard.slot(), doc, &[spec], None));
            return;
        }
        let (kind, file) = (FetchKind::Hazard { layer: hazard }, hazard.file());
        if self.pending.is_pending(&kind, &file) {
            debug!(layer = hazard.abbreviation(), "ground motion fetch already in flight");
            return;
        }
        report.fetches.push(self.pending.issue(kind, file, &self.settings.data_root));
    }

    fn merged_boundaries(&self) -> Option<GeoDocument> {
        let mut docs = self.boundary_files.iter().filter_map(|f| self.boundary_docs.get(f));
        let first = docs.next()?.clone();
        Some(docs.fold(first, |acc, doc| acc.merge(doc)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        surface::{MemoryWidget, WidgetCall},
        view::{Intent, LayerName, LayerStore, OverlayPolicy},
    };
    use anyhow::anyhow;
    use geo::Point;
    use serde_json::json;

    struct Rig {
        store: LayerStore,
        sync: Synchronizer,
        surface: MapSurface<MemoryWidget>,
        widget: MemoryWidget,
    }

    fn buildings(areas: &[f64]) -> Vec<u8> {
        let features: Vec<_> = areas.iter()
            .map(|a| json!({ "type": "Feature", "properties": { "area_in_meters": a }, "geometry": null }))
            .collect();
        serde_json::to_vec(&json!({ "type": "FeatureCollection", "features": features })).unwrap()
    }

    impl Rig {
        fn new() -> Self { Self::build(Theme::Communes, Registry::al_haouz(), LayerStore::REGION_LAYERS) }

        fn seismic() -> Self {
            Self::build(Theme::Seismic, Registry::default(), &[LayerName::Intensity, LayerName::Acceleration])
        }

        fn build(theme: Theme, registry: Registry, offered: &'static [LayerName]) -> Self {
            let registry = Arc::new(registry);
            let classes = Arc::new(SizeClasses::default());
            let settings = SyncSettings {
                theme,
                data_root: "/data".into(),
                area_attribute: "area_in_meters".into(),
                damage_attribute: "degat".into(),
                hazard_attribute: "PARAMVALUE".into(),
                fly_zoom: 15.0,
                fly_duration_ms: 2000,
                reset_camera: Camera::new(Point::new(-8.1938, 30.99), 9.0, 2000),
            };
            let widget = MemoryWidget::new();
            Rig {
                store: LayerStore::new(registry.clone(), classes.clone(), OverlayPolicy::Independent).offering(offered),
                sync: Synchronizer::new(settings, registry, classes),
                surface: MapSurface::mount(widget.clone()),
                widget,
            }
        }

        fn dispatch(&mut self, intent: Intent) -> SyncReport {
            let outcome = self.store.dispatch(intent);
            match outcome.change {
                Some(change) => self.sync.apply(&mut self.surface, &change),
                None => SyncReport { warnings: outcome.warnings, ..Default::default() },
            }
        }

        fn complete(&mut self, ticket: Ticket, result: Result<Vec<u8>>) -> SyncReport {
            let state = self.store.state().clone();
            let report = self.sync.complete(&mut self.surface, &state, ticket, result);
            if let Some(region) = report.loaded.clone() {
                if let Some(change) = self.store.buildings_loaded(&region).change {
                    self.sync.apply(&mut self.surface, &change);
                }
            }
            report
        }
    }

    #[test]
    fn start_fetches_shared_boundary_file_once() {
        let mut rig = Rig::new();
        let state = rig.store.state().clone();
        let report = rig.sync.start(&mut rig.surface, &state);
        assert_eq!(report.fetches.len(), 1);
        assert_eq!(report.fetches[0].url, "/data/decoupage_administrative/commune_alhouz.geojson");
        assert!(rig.sync.start(&mut rig.surface, &state).fetches.is_empty());
    }

    #[test]
    fn boundaries_are_cached_across_toggles() {
        let mut rig = Rig::new();
        let state = rig.store.state().clone();
        let ticket = rig.sync.start(&mut rig.surface, &state).fetches[0].ticket;
        let doc = json!({ "type": "FeatureCollection", "features": [
            { "type": "Feature", "properties": { "Population": 100, "Nb_Menages": 20 }, "geometry": null }
        ]});
        rig.complete(ticket, Ok(serde_json::to_vec(&doc).unwrap()));
        assert_eq!(rig.widget.layer_ids(), ["communes-fill", "communes-line"]);
        assert_eq!(rig.sync.stats().unwrap().population, 100);

        rig.dispatch(Intent::ToggleLayer(LayerName::Boundaries));
        assert!(rig.widget.layer_ids().is_empty());
        let report = rig.dispatch(Intent::ToggleLayer(LayerName::Boundaries));
        assert!(report.fetches.is_empty());
        assert_eq!(rig.widget.source_ids(), ["boundaries"]);
    }

    #[test]
    fn failed_fetch_keeps_prior_buildings() {
        let mut rig = Rig::new();
        let t1 = rig.dispatch(Intent::SelectRegion("Asni".into())).fetches[0].ticket;
        rig.complete(t1, Ok(buildings(&[10.0])));
        assert_eq!(rig.surface.loaded(Slot::Buildings).unwrap().tag.as_deref(), Some("Asni"));

        let t2 = rig.dispatch(Intent::SelectRegion("Ourika".into())).fetches[0].ticket;
        let report = rig.complete(t2, Err(anyhow!("HTTP 404")));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].region(), Some("Ourika"));
        assert_eq!(rig.surface.loaded(Slot::Buildings).unwrap().tag.as_deref(), Some("Asni"));
        assert_eq!(rig.store.state().selected_region(), Some("Ourika"));

        // Retry by re-selecting.
        let retry = rig.dispatch(Intent::SelectRegion("Ourika".into()));
        assert_eq!(retry.fetches.len(), 1);
    }

    #[test]
    fn malformed_document_is_a_fetch_failure() {
        let mut rig = Rig::new();
        let ticket = rig.dispatch(Intent::SelectRegion("Asni".into())).fetches[0].ticket;
        let report = rig.complete(ticket, Ok(b"{ not json".to_vec()));
        assert_eq!(report.warnings[0].code(), "fetch_failed");
        assert!(rig.surface.loaded(Slot::Buildings).is_none());
        assert!(!rig.store.state().layers().buildings);
    }

    #[test]
    fn hiding_and_showing_buildings_uses_cache() {
        let mut rig = Rig::new();
        let ticket = rig.dispatch(Intent::SelectRegion("Asni".into())).fetches[0].ticket;
        rig.complete(ticket, Ok(buildings(&[10.0, 300.0])));
        rig.dispatch(Intent::ToggleLayer(LayerName::Buildings));
        assert!(rig.surface.loaded(Slot::Buildings).is_none());
        assert!(rig.sync.summary().is_none());

        let report = rig.dispatch(Intent::ToggleLayer(LayerName::Buildings));
        assert!(report.fetches.is_empty());
        assert_eq!(rig.sync.summary().unwrap().total, 2);
        assert!(rig.widget.layer_ids().contains(&"buildings-3d".to_string()));
    }

    #[test]
    fn duplicate_selection_does_not_refetch_in_flight() {
        let mut rig = Rig::new();
        assert_eq!(rig.dispatch(Intent::SelectRegion("Asni".into())).fetches.len(), 1);
        assert!(rig.dispatch(Intent::SelectRegion("Asni".into())).fetches.is_empty());
        assert_eq!(rig.sync.pending_fetches(), 1);
    }

    #[test]
    fn reset_removes_buildings_before_flying() {
        let mut rig = Rig::new();
        let ticket = rig.dispatch(Intent::SelectRegion("Asni".into())).fetches[0].ticket;
        rig.complete(ticket, Ok(buildings(&[10.0])));
        rig.widget.take_calls();

        rig.dispatch(Intent::ResetView);
        let calls = rig.widget.take_calls();
        assert_eq!(calls[0], WidgetCall::RemoveLayer { id: "buildings-3d".into() });
        assert_eq!(calls[1], WidgetCall::RemoveSource { id: "buildings".into() });
        assert_eq!(calls[2], WidgetCall::FlyTo { center: [-8.1938, 30.99], zoom: 9.0 });
    }

    fn hazard_bytes(values: &[f64]) -> Vec<u8> {
        let features: Vec<_> = values.iter()
            .map(|v| json!({ "type": "Feature", "properties": { "PARAMVALUE": v }, "geometry": null }))
            .collect();
        serde_json::to_vec(&json!({ "type": "FeatureCollection", "features": features })).unwrap()
    }

    #[test]
    fn ground_motion_layers_fetch_once_and_stack_in_slot_order() {
        let mut rig = Rig::seismic();
        let state = rig.store.state().clone();
        assert!(rig.sync.start(&mut rig.surface, &state).fetches.is_empty());

        let pga = rig.dispatch(Intent::ToggleLayer(LayerName::Acceleration)).fetches;
        assert_eq!(pga.len(), 1);
        assert_eq!(pga[0].file.as_str(), "pga.geojson");
        let mi = rig.dispatch(Intent::ToggleLayer(LayerName::Intensity)).fetches;
        assert_eq!(mi[0].kind, FetchKind::Hazard { layer: Hazard::Intensity });

        rig.complete(pga[0].ticket, Ok(hazard_bytes(&[0.05, 0.3])));
        rig.complete(mi[0].ticket, Ok(hazard_bytes(&[6.2])));
        assert_eq!(rig.widget.layer_ids(), ["seismic-mi-fill", "seismic-pga-fill"]);
        assert!(rig.sync.stats().is_none());

        rig.dispatch(Intent::ToggleLayer(LayerName::Intensity));
        assert_eq!(rig.widget.layer_ids(), ["seismic-pga-fill"]);
        assert_eq!(rig.widget.source_ids(), ["seismic-pga"]);
        let again = rig.dispatch(Intent::ToggleLayer(LayerName::Intensity));
        assert!(again.fetches.is_empty());
        assert_eq!(rig.widget.layer_ids(), ["seismic-mi-fill", "seismic-pga-fill"]);
    }

    #[test]
    fn ground_motion_toggled_off_before_load_stays_hidden() {
        let mut rig = Rig::seismic();
        let fetch = rig.dispatch(Intent::ToggleLayer(LayerName::Intensity)).fetches.remove(0);
        rig.dispatch(Intent::ToggleLayer(LayerName::Intensity));
        rig.complete(fetch.ticket, Ok(hazard_bytes(&[7.1])));
        assert!(rig.widget.layer_ids().is_empty());

        let report = rig.dispatch(Intent::ToggleLayer(LayerName::Intensity));
        assert!(report.fetches.is_empty());
        assert_eq!(rig.widget.layer_ids(), ["seismic-mi-fill"]);
    }

    #[test]
    fn failed_ground_motion_fetch_warns_and_can_be_retried() {
        let mut rig = Rig::seismic();
        let fetch = rig.dispatch(Intent::ToggleLayer(LayerName::Acceleration)).fetches.remove(0);
        let report = rig.complete(fetch.ticket, Err(anyhow!("HTTP 500")));
        assert_eq!(report.warnings[0].code(), "layer_fetch_failed");
        assert!(rig.widget.layer_ids().is_empty());

        rig.dispatch(Intent::ToggleLayer(LayerName::Acceleration));
        assert_eq!(rig.dispatch(Intent::ToggleLayer(LayerName::Acceleration)).fetches.len(), 1);
    }

    #[test]
    fn reset_removes_ground_motion_layers() {
        let mut rig = Rig::seismic();
        let fetch = rig.dispatch(Intent::ToggleLayer(LayerName::Intensity)).fetches.remove(0);
        rig.complete(fetch.ticket, Ok(hazard_bytes(&[6.8])));
        rig.dispatch(Intent::ResetView);
        assert!(rig.widget.layer_ids().is_empty());
        assert!(rig.widget.source_ids().is_empty());
    }
}
