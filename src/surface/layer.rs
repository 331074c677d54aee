use std::{fmt, sync::Arc};

use geo::Point;
use serde::Serialize;
use serde_json::{json, Map, Value};
use smallvec::SmallVec;

use crate::{config::ViewConfig, expr::Expr, geojson::GeoDocument};

/// A logical rendering category holding at most one loaded source at a time.
///
/// Declaration order is stacking order, bottom to top: a slot's layers are
/// always drawn below those of every later slot, whatever order they load in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Boundaries,
    Intensity,
    Acceleration,
    Buildings,
}

impl Slot {
    pub const COUNT: usize = 4;

    pub fn source_id(&self) -> &'static str {
        match self {
            Slot::Boundaries => "boundaries",
            Slot::Intensity => "seismic-mi",
            Slot::Acceleration => "seismic-pga",
            Slot::Buildings => "buildings",
        }
    }

    /// Slots drawn above this one, lowest first.
    pub fn above(&self) -> &'static [Slot] {
        match self {
            Slot::Boundaries => &[Slot::Intensity, Slot::Acceleration, Slot::Buildings],
            Slot::Intensity => &[Slot::Acceleration, Slot::Buildings],
            Slot::Acceleration => &[Slot::Buildings],
            Slot::Buildings => &[],
        }
    }

    #[inline]
    pub(super) fn index(&self) -> usize { *self as usize }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.source_id()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    Fill,
    Line,
    FillExtrusion,
}

impl LayerKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            LayerKind::Fill => "fill",
            LayerKind::Line => "line",
            LayerKind::FillExtrusion => "fill-extrusion",
        }
    }
}

/// A render layer definition in the widget's style format.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub kind: LayerKind,
    pub source: String,
    pub paint: Vec<(String, Value)>,
    pub filter: Option<Expr>,
}

impl LayerSpec {
    pub fn new(id: impl Into<String>, kind: LayerKind, source: impl Into<String>) -> Self {
        Self { id: id.into(), kind, source: source.into(), paint: Vec::new(), filter: None }
    }

    pub fn paint(mut self, property: &str, value: impl Into<Value>) -> Self {
        self.paint.push((property.to_string(), value.into()));
        self
    }

    pub fn filter(mut self, filter: Expr) -> Self {
        self.filter = Some(filter);
        self
    }

    /// `{ id, type, source, paint, filter? }`
    pub fn to_json(&self) -> Value {
        let paint: Map<String, Value> = self.paint.iter().cloned().collect();
        let mut out = json!({
            "id": self.id,
            "type": self.kind.to_str(),
            "source": self.source,
            "paint": paint,
        });
        if let Some(filter) = &self.filter {
            out["filter"] = filter.to_json();
        }
        out
    }
}

/// A camera target for `fly_to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: Point<f64>,
    pub zoom: f64,
    pub pitch: Option<f64>,
    pub duration_ms: u32,
}

impl Camera {
    pub fn new(center: Point<f64>, zoom: f64, duration_ms: u32) -> Self {
        Self { center, zoom, pitch: None, duration_ms }
    }

    pub fn from_view(view: &ViewConfig, duration_ms: u32) -> Self {
        let [lon, lat] = view.center;
        Self { center: Point::new(lon, lat), zoom: view.zoom, pitch: Some(view.pitch), duration_ms }
    }

    pub fn to_json(&self) -> Value {
        let mut out = json!({
            "center": [self.center.x(), self.center.y()],
            "zoom": self.zoom,
            "duration": self.duration_ms,
            "essential": true,
        });
        if let Some(pitch) = self.pitch {
            out["pitch"] = json!(pitch);
        }
        out
    }
}

/// What currently occupies a slot on the widget.
#[derive(Debug, Clone)]
pub struct LoadedLayer {
    pub slot: Slot,
    pub source_id: &'static str,
    /// Render layers as last applied, in stacking order.
    pub layers: SmallVec<[LayerSpec; 2]>,
    /// Region the geometry belongs to, when it belongs to one.
    pub tag: Option<Arc<str>>,
    pub data: GeoDocument,
}

impl LoadedLayer {
    pub fn layer_ids(&self) -> impl Iterator<Item = &str> { self.layers.iter().map(|l| l.id.as_str()) }
}
