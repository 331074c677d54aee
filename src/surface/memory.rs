use std::{cell::RefCell, fmt, rc::Rc};

use ahash::AHashMap;
use anyhow::{anyhow, bail, Result};
use serde_json::Value;

use crate::{expr::Expr, geojson::GeoDocument};

use super::{Camera, LayerSpec, MapWidget};

/// One call received by a `MemoryWidget`.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetCall {
    AddSource { id: String },
    SetSourceData { id: String },
    RemoveSource { id: String },
    AddLayer { id: String },
    RemoveLayer { id: String },
    SetFilter { layer: String, filter: Option<Value> },
    SetPaint { layer: String, property: String, value: Value },
    FlyTo { center: [f64; 2], zoom: f64 },
    Destroy,
}

impl fmt::Display for WidgetCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetCall::AddSource { id } => write!(f, "addSource {id}"),
            WidgetCall::SetSourceData { id } => write!(f, "setData {id}"),
            WidgetCall::RemoveSource { id } => write!(f, "removeSource {id}"),
            WidgetCall::AddLayer { id } => write!(f, "addLayer {id}"),
            WidgetCall::RemoveLayer { id } => write!(f, "removeLayer {id}"),
            WidgetCall::SetFilter { layer, filter: Some(filter) } => write!(f, "setFilter {layer} {filter}"),
            WidgetCall::SetFilter { layer, filter: None } => write!(f, "setFilter {layer} null"),
            WidgetCall::SetPaint { layer, property, value } => write!(f, "setPaintProperty {layer} {property} {value}"),
            WidgetCall::FlyTo { center: [lon, lat], zoom } => write!(f, "flyTo [{lon}, {lat}] zoom {zoom}"),
            WidgetCall::Destroy => f.write_str("remove"),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    calls: Vec<WidgetCall>,
    sources: AHashMap<String, GeoDocument>,
    layers: Vec<LayerSpec>,
    camera: Option<Camera>,
    destroyed: usize,
    failing_sources: Vec<String>,
}

/// A map widget that keeps everything in memory and records every call.
///
/// Clones share state, so a test can hand one clone to `MapSurface` and
/// inspect another.
#[derive(Debug, Clone, Default)]
pub struct MemoryWidget {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryWidget {
    pub fn new() -> Self { Self::default() }

    /// Make the next `add_source(id, ..)` fail.
    pub fn fail_next_source(&self, id: &str) {
        self.state.borrow_mut().failing_sources.push(id.to_string());
    }

    pub fn calls(&self) -> Vec<WidgetCall> { self.state.borrow().calls.clone() }

    /// Drain the call log.
    pub fn take_calls(&self) -> Vec<WidgetCall> { std::mem::take(&mut self.state.borrow_mut().calls) }

    pub fn source_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.state.borrow().sources.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn source_data(&self, id: &str) -> Option<GeoDocument> { self.state.borrow().sources.get(id).cloned() }

    /// Layer ids in stacking order.
    pub fn layer_ids(&self) -> Vec<String> { self.state.borrow().layers.iter().map(|l| l.id.clone()).collect() }

    pub fn layer(&self, id: &str) -> Option<LayerSpec> {
        self.state.borrow().layers.iter().find(|l| l.id == id).cloned()
    }

    pub fn camera(&self) -> Option<Camera> { self.state.borrow().camera }

    pub fn destroy_count(&self) -> usize { self.state.borrow().destroyed }
}

impl MapWidget for MemoryWidget {
    fn has_source(&self, id: &str) -> bool { self.state.borrow().sources.contains_key(id) }

    fn add_source(&mut self, id: &str, data: &GeoDocument) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(pos) = state.failing_sources.iter().position(|s| s == id) {
            state.failing_sources.remove(pos);
            bail!("source {id:?} rejected");
        }
        if state.sources.contains_key(id) {
            bail!("There is already a source with ID \"{id}\"");
        }
        state.sources.insert(id.to_string(), data.clone());
        state.calls.push(WidgetCall::AddSource { id: id.to_string() });
        Ok(())
    }

    fn set_source_data(&mut self, id: &str, data: &GeoDocument) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let Some(slot) = state.sources.get_mut(id) else { bail!("no source {id:?}") };
        *slot = data.clone();
        state.calls.push(WidgetCall::SetSourceData { id: id.to_string() });
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.layers.iter().any(|l| l.source == id) {
            bail!("Source \"{id}\" cannot be removed while layer uses it");
        }
        if state.sources.remove(id).is_none() {
            bail!("no source {id:?}");
        }
        state.calls.push(WidgetCall::RemoveSource { id: id.to_string() });
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool { self.state.borrow().layers.iter().any(|l| l.id == id) }

    fn add_layer(&mut self, spec: &LayerSpec, before: Option<&str>) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.sources.contains_key(&spec.source) {
            bail!("Source \"{}\" not found", spec.source);
        }
        if state.layers.iter().any(|l| l.id == spec.id) {
            bail!("Layer with id \"{}\" already exists", spec.id);
        }
        let pos = match before {
            Some(before) => state.layers.iter().position(|l| l.id == before)
                .ok_or_else(|| anyhow!("Cannot add layer \"{}\" before non-existing layer \"{before}\"", spec.id))?,
            None => state.layers.len(),
        };
        state.layers.insert(pos, spec.clone());
        state.calls.push(WidgetCall::AddLayer { id: spec.id.clone() });
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let Some(pos) = state.layers.iter().position(|l| l.id == id) else { bail!("no layer {id:?}") };
        state.layers.remove(pos);
        state.calls.push(WidgetCall::RemoveLayer { id: id.to_string() });
        Ok(())
    }

    fn set_filter(&mut self, layer_id: &str, filter: Option<&Expr>) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let Some(layer) = state.layers.iter_mut().find(|l| l.id == layer_id) else { bail!("no layer {layer_id:?}") };
        layer.filter = filter.cloned();
        state.calls.push(WidgetCall::SetFilter { layer: layer_id.to_string(), filter: filter.map(Expr::to_json) });
        Ok(())
    }

    fn set_paint(&mut self, layer_id: &str, property: &str, value: &Value) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let Some(layer) = state.layers.iter_mut().find(|l| l.id == layer_id) else { bail!("no layer {layer_id:?}") };
        match layer.paint.iter_mut().find(|(p, _)| p == property) {
            Some((_, v)) => *v = value.clone(),
            None => layer.paint.push((property.to_string(), value.clone())),
        }
        state.calls.push(WidgetCall::SetPaint { layer: layer_id.to_string(), property: property.to_string(), value: value.clone() });
        Ok(())
    }

    fn fly_to(&mut self, camera: &Camera) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.camera = Some(*camera);
        state.calls.push(WidgetCall::FlyTo { center: [camera.center.x(), camera.center.y()], zoom: camera.zoom });
        Ok(())
    }

    fn destroy(&mut self) {
        let mut state = self.state.borrow_mut();
        state.destroyed += 1;
        state.sources.clear();
        state.layers.clear();
        state.calls.push(WidgetCall::Destroy);
    }
}
