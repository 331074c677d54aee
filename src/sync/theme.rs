use serde::Serialize;

use crate::{
    classes::SizeClasses,
    expr::{color_step, damage_color_match, population_ramp, size_color_step, size_filter},
    registry::FileRef,
    surface::{LayerKind, LayerSpec, Slot},
    view::{LayerName, ViewState},
};

/// How boundaries, buildings and ground-motion layers are drawn on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    /// Communes shaded by population, buildings colored and filtered by size class.
    Communes,
    /// Plain zone outlines, buildings colored by damage state.
    DamageZones,
    /// Ground-motion choropleths, no regions.
    Seismic,
}

impl Theme {
    pub fn building_layer_id(&self) -> &'static str {
        match self {
            Theme::DamageZones => "buildings-damage",
            Theme::Communes | Theme::Seismic => "buildings-3d",
        }
    }

    /// Whether the size-class filter drives the buildings layer.
    pub fn filters_by_size(&self) -> bool { matches!(self, Theme::Communes) }

    /// Whether boundary features carry commune population and household counts.
    pub fn has_commune_stats(&self) -> bool { matches!(self, Theme::Communes) }

    pub fn hazards(&self) -> &'static [Hazard] {
        match self {
            Theme::Seismic => &Hazard::ALL,
            Theme::Communes | Theme::DamageZones => &[],
        }
    }

    pub fn boundary_layers(&self) -> Vec<LayerSpec> {
        let source = Slot::Boundaries.source_id();
        match self {
            Theme::Communes => vec![
                LayerSpec::new("communes-fill", LayerKind::Fill, source)
                    .paint("fill-color", population_ramp().to_json())
                    .paint("fill-opacity", 0.6),
                LayerSpec::new("communes-line", LayerKind::Line, source)
                    .paint("line-color", "#000")
                    .paint("line-width", 1),
            ],
            Theme::DamageZones => vec![
                LayerSpec::new("zones-fill", LayerKind::Fill, source)
                    .paint("fill-color", "#ffffff")
                    .paint("fill-opacity", 0.5)
                    .paint("fill-outline-color", "#000000"),
            ],
            Theme::Seismic => Vec::new(),
        }
    }

    pub fn building_layer(&self, classes: &SizeClasses, state: &ViewState, area_attr: &str, damage_attr: &str) -> LayerSpec {
        let spec = LayerSpec::new(self.building_layer_id(), LayerKind::FillExtrusion, Slot::Buildings.source_id());
        let spec = match self {
            Theme::DamageZones => spec.paint("fill-extrusion-color", damage_color_match(damage_attr).to_json()),
            Theme::Communes | Theme::Seismic => spec
                .paint("fill-extrusion-color", size_color_step(classes, area_attr).to_json())
                .filter(size_filter(classes, |label| state.is_class_active(label), area_attr)),
        };
        spec.paint("fill-extrusion-height", 3).paint("fill-extrusion-opacity", 0.8)
    }
}

/// A ground-motion field of the 2023 event, one polygon file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Hazard {
    /// Modified Mercalli intensity.
    Intensity,
    /// Peak ground acceleration, in g.
    Acceleration,
}

const MI_SCALE: (&str, &[(f64, &str)]) =
    ("#f2f0f7", &[(6.0, "#cbc9e2"), (6.5, "#9e9ac8"), (7.0, "#756bb1"), (7.5, "#54278f")]);

const PGA_SCALE: (&str, &[(f64, &str)]) =
    ("#ffffcc", &[(0.10, "#fc4e2a"), (0.15, "#e31a1c"), (0.25, "#bd0026"), (0.34, "#800026")]);

impl Hazard {
    pub const ALL: [Hazard; 2] = [Hazard::Intensity, Hazard::Acceleration];

    pub fn from_layer(layer: LayerName) -> Option<Self> {
        match layer {
            LayerName::Intensity => Some(Hazard::Intensity),
            LayerName::Acceleration => Some(Hazard::Acceleration),
            LayerName::Boundaries | LayerName::Buildings => None,
        }
    }

    pub fn layer(&self) -> LayerName {
        match self {
            Hazard::Intensity => LayerName::Intensity,
            Hazard::Acceleration => LayerName::Acceleration,
        }
    }

    pub fn slot(&self) -> Slot {
        match self {
            Hazard::Intensity => Slot::Intensity,
            Hazard::Acceleration => Slot::Acceleration,
        }
    }

    pub fn file(&self) -> FileRef {
        match self {
            Hazard::Intensity => FileRef::new("mi.geojson"),
            Hazard::Acceleration => FileRef::new("pga.geojson"),
        }
    }

    pub fn layer_id(&self) -> &'static str {
        match self {
            Hazard::Intensity => "seismic-mi-fill",
            Hazard::Acceleration => "seismic-pga-fill",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Hazard::Intensity => "Intensité (MI)",
            Hazard::Acceleration => "Accélération (PGA)",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Hazard::Intensity => "MI",
            Hazard::Acceleration => "PGA",
        }
    }

    /// Colour below the first break, then (break, colour) pairs in ascending order.
    pub fn scale(&self) -> (&'static str, &'static [(f64, &'static str)]) {
        match self {
            Hazard::Intensity => MI_SCALE,
            Hazard::Acceleration => PGA_SCALE,
        }
    }

    pub fn layer_spec(&self, value_attr: &str) -> LayerSpec {
        let (base, stops) = self.scale();
        LayerSpec::new(self.layer_id(), LayerKind::Fill, self.slot().source_id())
            .paint("fill-color", color_step(value_attr, base, stops).to_json())
            .paint("fill-opacity", 0.8)
            .paint("fill-outline-color", "#fff")
    }

    /// (range label, colour) per class of the scale, lowest first.
    pub fn legend(&self) -> Vec<(String, &'static str)> {
        let (base, stops) = self.scale();
        let (digits, unit): (usize, &str) = match self {
            Hazard::Intensity => (1, ""),
            Hazard::Acceleration => (2, " g"),
        };
        let Some(&(first, _)) = stops.first() else { return vec![(String::new(), base)] };

        let mut out = vec![(format!("< {first:.digits$}{unit}"), base)];
        for (i, &(lower, color)) in stops.iter().enumerate() {
            let label = match stops.get(i + 1) {
                Some(&(upper, _)) => format!("{lower:.digits$} - {upper:.digits$}{unit}"),
                None => format!("≥ {lower:.digits$}{unit}"),
            };
            out.push((label, color));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn communes_buildings_carry_size_filter() {
        let classes = SizeClasses::default();
        let state = ViewState::initial(&classes);
        let spec = Theme::Communes.building_layer(&classes, &state, "area_in_meters", "degat");
        assert!(spec.filter.is_some());
        assert_eq!(spec.to_json()["paint"]["fill-extrusion-height"], json!(3));

        let spec = Theme::DamageZones.building_layer(&classes, &state, "area_in_meters", "degat");
        assert!(spec.filter.is_none());
        assert_eq!(spec.id, "buildings-damage");
    }

    #[test]
    fn hazard_fill_steps_on_the_scale() {
        let spec = Hazard::Acceleration.layer_spec("PARAMVALUE");
        assert_eq!(spec.source, "seismic-pga");
        assert_eq!(spec.to_json()["paint"]["fill-color"], json!([
            "step", ["get", "PARAMVALUE"], "#ffffcc", 0.1, "#fc4e2a", 0.15, "#e31a1c", 0.25, "#bd0026", 0.34, "#800026"
        ]));
        assert_eq!(Hazard::from_layer(LayerName::Intensity).map(|h| h.slot()), Some(Slot::Intensity));
        assert!(Hazard::from_layer(LayerName::Buildings).is_none());
    }

    #[test]
    fn hazard_legends() {
        let labels: Vec<_> = Hazard::Intensity.legend().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, ["< 6.0", "6.0 - 6.5", "6.5 - 7.0", "7.0 - 7.5", "≥ 7.5"]);
        let pga = Hazard::Acceleration.legend();
        assert_eq!(pga[0], ("< 0.10 g".to_string(), "#ffffcc"));
        assert_eq!(pga[4], ("≥ 0.34 g".to_string(), "#800026"));
    }

    #[test]
    fn only_the_seismic_theme_has_hazards() {
        assert_eq!(Theme::Seismic.hazards(), Hazard::ALL);
        assert!(Theme::Communes.hazards().is_empty());
        assert!(Theme::Seismic.boundary_layers().is_empty());
        assert!(!Theme::DamageZones.has_commune_stats());
    }
}
