//! View models for the dashboard chrome. Pure functions of state; every
//! control maps back to an `Intent`.

use serde::Serialize;

use crate::{
    chart::{chart_kind, chart_records, reference_lines, slice_color, ChartKind, ChartRecord, Metric, ReferenceLine},
    classes::{SizeClass, SizeClasses},
    geojson::{BuildingSummary, CommuneStats, DamageState},
    registry::Registry,
    session::Page,
    sync::Hazard,
    view::{LayerName, OverlayVisibility, ViewState},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerToggle {
    pub layer: LayerName,
    pub label: &'static str,
    pub on: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPicker {
    pub options: Vec<String>,
    pub selected: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeFilterRow {
    pub label: String,
    pub color: String,
    pub range: String,
    pub active: bool,
    /// Buildings of this class in the loaded dataset.
    pub count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPanel {
    pub metric: Metric,
    pub options: Vec<&'static str>,
    pub kind: ChartKind,
    pub records: Vec<ChartRecord>,
    /// Pie slice colors, parallel to `records`. Empty for bar charts.
    pub colors: Vec<&'static str>,
    pub reference_lines: Vec<ReferenceLine>,
}

impl ChartPanel {
    pub fn new(metric: Metric) -> Self {
        let records = chart_records(metric);
        let kind = chart_kind(metric);
        let (colors, reference_lines) = match kind {
            ChartKind::Pie => ((0..records.len()).map(slice_color).collect(), Vec::new()),
            ChartKind::BarWithReferenceLines => (Vec::new(), reference_lines().to_vec()),
        };
        Self {
            metric,
            options: Metric::ALL.iter().map(Metric::label).collect(),
            kind,
            records,
            colors,
            reference_lines,
        }
    }
}

/// Everything the shell renders, derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panels {
    pub title: &'static str,
    pub toggles: Vec<LayerToggle>,
    pub region_picker: Option<RegionPicker>,
    pub size_filters: Vec<SizeFilterRow>,
    pub legend: Vec<LegendEntry>,
    pub overlays: OverlayVisibility,
    pub stats: Option<CommuneStats>,
    pub buildings: Option<BuildingSummary>,
    pub chart: Option<ChartPanel>,
}

impl Panels {
    pub fn compose(
        page: Page,
        state: &ViewState,
        registry: &Registry,
        classes: &SizeClasses,
        stats: Option<&CommuneStats>,
        summary: Option<&BuildingSummary>,
    ) -> Self {
        let layers = state.layers();
        let overlays = state.overlays();
        let toggles = page.layers().iter()
            .map(|&layer| {
                let (label, enabled) = match (layer, page) {
                    (LayerName::Boundaries, Page::DamageAnalysis) => ("Zones", true),
                    (LayerName::Boundaries, _) => ("Communes", true),
                    (LayerName::Buildings, _) => ("Bâtiments", state.selected_region().is_some()),
                    (LayerName::Intensity, _) => (Hazard::Intensity.title(), true),
                    (LayerName::Acceleration, _) => (Hazard::Acceleration.title(), true),
                };
                LayerToggle { layer, label, on: layers.is_on(layer), enabled }
            })
            .collect();

        let region_picker = (layers.boundaries && !registry.is_empty()).then(|| RegionPicker {
            options: registry.names().into_iter().map(str::to_string).collect(),
            selected: state.selected_region().map(str::to_string),
        });

        let summary = summary.filter(|_| layers.buildings);
        let size_filters = match page {
            Page::Overview if layers.buildings => classes.iter()
                .map(|class| SizeFilterRow {
                    label: class.label.clone(),
                    color: class.color.clone(),
                    range: area_range(class),
                    active: state.is_class_active(&class.label),
                    count: summary.and_then(|s| s.count_for(&class.label)),
                })
                .collect(),
            _ => Vec::new(),
        };

        let legend = match page {
            Page::Seismic => Hazard::ALL.iter()
                .filter(|h| layers.is_on(h.layer()))
                .flat_map(|h| h.legend().into_iter().map(move |(range, color)| LegendEntry {
                    label: format!("{} {range}", h.abbreviation()),
                    color: color.to_string(),
                }))
                .collect(),
            _ if !layers.buildings => Vec::new(),
            Page::DamageAnalysis => DamageState::ALL.iter()
                .map(|d| LegendEntry { label: d.source_label().to_string(), color: d.color().to_string() })
                .collect(),
            _ => classes.iter()
                .map(|c| LegendEntry { label: c.label.clone(), color: c.color.clone() })
                .collect(),
        };

        Self {
            title: page.title(),
            toggles,
            region_picker,
            size_filters,
            legend,
            overlays,
            stats: stats.copied().filter(|_| overlays.stats),
            buildings: summary.cloned(),
            chart: overlays.charts.then(|| ChartPanel::new(state.metric())),
        }
    }
}

fn area_range(class: &SizeClass) -> String {
    match class.upper {
        Some(upper) => format!("{}-{} m²", class.lower, upper),
        None => format!("{}+ m²", class.lower),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::view::{Intent, LayerStore, OverlayPolicy};

    fn compose(state: &ViewState) -> Panels {
        let classes = SizeClasses::default();
        Panels::compose(Page::Overview, state, &Registry::al_haouz(), &classes, None, None)
    }

    #[test]
    fn initial_panels() {
        let panels = compose(&ViewState::initial(&SizeClasses::default()));
        assert_eq!(panels.title, "Al Haouz");
        assert!(!panels.toggles[1].enabled);
        assert_eq!(panels.region_picker.as_ref().unwrap().options.len(), 35);
        assert!(panels.size_filters.is_empty());
        assert!(panels.legend.is_empty());
        assert!(panels.chart.is_none());
    }

    #[test]
    fn seismic_panels_offer_ground_motion_toggles_and_legends() {
        let classes = SizeClasses::default();
        let registry = Registry::default();
        let mut store = LayerStore::new(Arc::new(registry.clone()), Arc::new(classes.clone()), OverlayPolicy::default())
            .offering(Page::Seismic.layers());
        let panels = Panels::compose(Page::Seismic, store.state(), &registry, &classes, None, None);
        let labels: Vec<_> = panels.toggles.iter().map(|t| t.label).collect();
        assert_eq!(labels, ["Intensité (MI)", "Accélération (PGA)"]);
        assert!(panels.region_picker.is_none());
        assert!(panels.legend.is_empty());

        store.dispatch(Intent::ToggleLayer(LayerName::Acceleration));
        let panels = Panels::compose(Page::Seismic, store.state(), &registry, &classes, None, None);
        assert!(panels.toggles[1].on);
        assert_eq!(panels.legend.len(), 5);
        assert_eq!(panels.legend[0].label, "PGA < 0.10 g");
        assert_eq!(panels.legend[4].color, "#800026");
    }

    #[test]
    fn area_ranges() {
        let classes = SizeClasses::default();
        let ranges: Vec<_> = classes.iter().map(area_range).collect();
        assert_eq!(ranges, ["0-50 m²", "50-100 m²", "100-200 m²", "200+ m²"]);
    }

    #[test]
    fn pie_panel_has_colors_and_no_reference_lines() {
        let panel = ChartPanel::new(Metric::WallMaterials);
        assert_eq!(panel.colors.len(), panel.records.len());
        assert!(panel.reference_lines.is_empty());
        let bar = ChartPanel::new(Metric::PovertyRate);
        assert_eq!(bar.reference_lines.len(), 3);
        assert_eq!(bar.options[0], "Taux de pauvreté");
    }
}
