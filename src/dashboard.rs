use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    classes::SizeClasses,
    config::DashboardConfig,
    geojson::{BuildingSummary, CommuneStats},
    registry::Registry,
    session::Page,
    shell::Panels,
    surface::{Camera, MapSurface, MapWidget},
    sync::{FetchRequest, SyncReport, SyncSettings, Synchronizer, Ticket},
    view::{Intent, LayerStore, ViewState, Warning},
};

/// Everything the host needs to act on after a call into the dashboard.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct DispatchReport {
    pub warnings: Vec<Warning>,
    /// Geometry files to fetch; hand each result back through `complete_fetch`.
    pub fetches: Vec<FetchRequest>,
}

/// One mounted dashboard page: store, synchronizer and map surface.
pub struct Dashboard<W: MapWidget> {
    page: Page,
    store: LayerStore,
    sync: Synchronizer,
    surface: MapSurface<W>,
}

impl<W: MapWidget> Dashboard<W> {
    /// Take ownership of `widget` and start loading the page's boundaries.
    pub fn mount(page: Page, config: &DashboardConfig, widget: W) -> Result<(Self, DispatchReport)> {
        config.validate()?;
        let registry = Arc::new(page.registry());
        let classes = Arc::new(config.size_classes()?);
        let settings = SyncSettings {
            theme: page.theme(),
            data_root: config.data_root.clone(),
            area_attribute: config.area_attribute.clone(),
            damage_attribute: config.damage_attribute.clone(),
            hazard_attribute: config.hazard_attribute.clone(),
            fly_zoom: page.fly_zoom(config),
            fly_duration_ms: config.fly_duration_ms,
            reset_camera: Camera::from_view(page.reset_view(config), config.fly_duration_ms),
        };

        info!(%page, regions = registry.len(), "mounting dashboard");
        let mut dashboard = Self {
            page,
            store: LayerStore::new(registry.clone(), classes.clone(), config.overlay_policy).offering(page.layers()),
            sync: Synchronizer::new(settings, registry, classes),
            surface: MapSurface::mount(widget),
        };
        let mut report = DispatchReport::default();
        // Jump, no animation.
        let initial = Camera::from_view(page.initial_view(config), 0);
        if let Err(e) = dashboard.surface.fly_to(&initial) {
            warn!("initial camera: {e:#}");
            report.warnings.push(Warning::Surface { reason: format!("{e:#}") });
        }
        let start = dashboard.sync.start(&mut dashboard.surface, dashboard.store.state());
        dashboard.absorb(start, &mut report);
        Ok((dashboard, report))
    }

    pub fn dispatch(&mut self, intent: Intent) -> DispatchReport {
        let mut report = DispatchReport::default();
        self.dispatch_into(intent, &mut report);
        report
    }

    /// Hand back the result of a fetch issued earlier.
    pub fn complete_fetch(&mut self, ticket: Ticket, result: Result<Vec<u8>>) -> DispatchReport {
        let mut report = DispatchReport::default();
        let sync = self.sync.complete(&mut self.surface, self.store.state(), ticket, result);
        self.absorb(sync, &mut report);
        report
    }

    fn dispatch_into(&mut self, intent: Intent, report: &mut DispatchReport) {
        let outcome = self.store.dispatch(intent);
        report.warnings.extend(outcome.warnings);
        if let Some(change) = outcome.change {
            let sync = self.sync.apply(&mut self.surface, &change);
            self.absorb(sync, report);
        }
    }

    fn absorb(&mut self, sync: SyncReport, report: &mut DispatchReport) {
        report.warnings.extend(sync.warnings);
        report.fetches.extend(sync.fetches);
        if let Some(region) = sync.loaded {
            let outcome = self.store.buildings_loaded(&region);
            report.warnings.extend(outcome.warnings);
            if let Some(change) = outcome.change {
                let sync = self.sync.apply(&mut self.surface, &change);
                self.absorb(sync, report);
            }
        }
    }

    #[inline] pub fn page(&self) -> Page { self.page }

    #[inline] pub fn state(&self) -> &ViewState { self.store.state() }

    #[inline] pub fn registry(&self) -> &Registry { self.store.registry() }

    #[inline] pub fn classes(&self) -> &SizeClasses { self.store.classes() }

    #[inline] pub fn stats(&self) -> Option<&CommuneStats> { self.sync.stats() }

    #[inline] pub fn summary(&self) -> Option<&BuildingSummary> { self.sync.summary() }

    #[inline] pub fn surface(&self) -> &MapSurface<W> { &self.surface }

    #[inline] pub fn is_mounted(&self) -> bool { self.surface.is_mounted() }

    pub fn panels(&self) -> Panels {
        Panels::compose(self.page, self.state(), self.registry(), self.classes(), self.stats(), self.summary())
    }

    /// Destroy the widget. The dashboard is inert afterwards.
    pub fn unmount(&mut self) {
        info!(page = %self.page, "unmounting dashboard");
        self.surface.unmount();
    }
}
