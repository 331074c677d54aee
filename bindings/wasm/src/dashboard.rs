use anyhow::anyhow;
use quakeview_core::{
    Dashboard, DashboardConfig, DispatchReport, Intent, LayerName, Metric, OverlayName, Page, Ticket,
};
use wasm_bindgen::{JsValue, prelude::wasm_bindgen};

use crate::{common::*, widget::JsMapWidget};

/// One dashboard page bound to a JS map object.
///
/// Intent methods return `{ warnings: [{code, ...}], fetches: [{ticket, kind, file, url}] }`.
/// The caller fetches each `url` and reports back with `complete_fetch` or `fail_fetch`.
#[wasm_bindgen]
pub struct WasmDashboard {
    inner: Dashboard<JsMapWidget>,
    initial: Option<DispatchReport>,
}

#[wasm_bindgen]
impl WasmDashboard {
    /// page: "overview" (default), "damage" or "seismic"; config: optional partial DashboardConfig object.
    /// Create `map` with the options from `map_options` so the style matches.
    #[wasm_bindgen(constructor)]
    pub fn new(map: JsValue, page: Option<String>, config: JsValue) -> Result<WasmDashboard, JsValue> {
        let (page, config) = parse_args(page, config)?;
        let widget = JsMapWidget::new(map).map_err(js_err)?;
        let (inner, initial) = Dashboard::mount(page, &config, widget).map_err(js_err)?;
        Ok(WasmDashboard { inner, initial: Some(initial) })
    }

    /// Fetches issued at mount. Returns them once; later calls return an empty report.
    pub fn start(&mut self) -> Result<JsValue, JsValue> {
        let report = self.initial.take().unwrap_or_default();
        self.report(report)
    }

    pub fn page(&self) -> String { self.inner.page().to_str().to_string() }

    pub fn select_region(&mut self, name: String) -> Result<JsValue, JsValue> {
        self.dispatch(Intent::SelectRegion(name))
    }

    /// layer: "boundaries" (alias "communes"), "buildings", "intensity" (alias "mi")
    /// or "acceleration" (alias "pga"). Layers the page does not offer give a warning.
    pub fn toggle_layer(&mut self, layer: String) -> Result<JsValue, JsValue> {
        let layer: LayerName = layer.parse().map_err(js_err)?;
        self.dispatch(Intent::ToggleLayer(layer))
    }

    /// overlay: "stats" or "charts".
    pub fn toggle_overlay(&mut self, overlay: String) -> Result<JsValue, JsValue> {
        let overlay: OverlayName = overlay.parse().map_err(js_err)?;
        self.dispatch(Intent::ToggleOverlay(overlay))
    }

    pub fn toggle_size_class(&mut self, label: String) -> Result<JsValue, JsValue> {
        self.dispatch(Intent::ToggleSizeClass(label))
    }

    /// metric: a display label such as "Matériaux de mur", or a short name.
    pub fn set_metric(&mut self, metric: String) -> Result<JsValue, JsValue> {
        let metric: Metric = metric.parse().map_err(js_err)?;
        self.dispatch(Intent::SetMetric(metric))
    }

    pub fn reset_view(&mut self) -> Result<JsValue, JsValue> {
        self.dispatch(Intent::ResetView)
    }

    /// Hand back the body of a successful fetch.
    pub fn complete_fetch(&mut self, ticket: u32, text: String) -> Result<JsValue, JsValue> {
        let report = self.inner.complete_fetch(Ticket(ticket.into()), Ok(text.into_bytes()));
        self.report(report)
    }

    /// Report a failed fetch (network error, HTTP status, ...).
    pub fn fail_fetch(&mut self, ticket: u32, message: String) -> Result<JsValue, JsValue> {
        let report = self.inner.complete_fetch(Ticket(ticket.into()), Err(anyhow!(message)));
        self.report(report)
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.state()).map_err(js_err)
    }

    pub fn panels(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.panels()).map_err(js_err)
    }

    #[wasm_bindgen(getter)]
    pub fn mounted(&self) -> bool { self.inner.is_mounted() }

    /// Destroy the map. The dashboard ignores further calls except to report warnings.
    pub fn unmount(&mut self) {
        self.inner.unmount();
    }

    fn dispatch(&mut self, intent: Intent) -> Result<JsValue, JsValue> {
        let report = self.inner.dispatch(intent);
        self.report(report)
    }

    fn report(&self, report: DispatchReport) -> Result<JsValue, JsValue> {
        for warning in &report.warnings {
            console_warn(&warning.to_string());
        }
        to_js(&report).map_err(js_err)
    }
}

fn parse_args(page: Option<String>, config: JsValue) -> Result<(Page, DashboardConfig), JsValue> {
    let page: Page = page.as_deref().unwrap_or("overview").parse().map_err(js_err)?;
    let config: DashboardConfig = if is_present(&config) {
        serde_wasm_bindgen::from_value(config).map_err(|e| js_err(format!("Invalid config: {e}")))?
    } else {
        DashboardConfig::default()
    };
    config.validate().map_err(js_err)?;
    Ok((page, config))
}

/// `{ style, center, zoom, pitch }` to construct the map with, before mounting a dashboard on it.
#[wasm_bindgen]
pub fn map_options(page: Option<String>, config: JsValue) -> Result<JsValue, JsValue> {
    let (page, config) = parse_args(page, config)?;
    to_js(&page.map_options(&config)).map_err(js_err)
}

/// Chart records for a metric label; unknown labels give an empty array.
#[wasm_bindgen]
pub fn chart_records(label: String) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&quakeview_core::chart_records_for_label(&label)).map_err(|e| e.into())
}
