use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{expr::Expr, geojson::GeoDocument};

use super::{Camera, LayerSpec, LoadedLayer, MapWidget, Slot};

/// Owns the map widget from mount to unmount and keeps at most one
/// `LoadedLayer` per `Slot`. Every operation is idempotent.
pub struct MapSurface<W: MapWidget> {
    widget: Option<W>,
    loaded: [Option<LoadedLayer>; Slot::COUNT],
}

impl<W: MapWidget> MapSurface<W> {
    /// Take ownership of a freshly constructed widget.
    pub fn mount(widget: W) -> Self {
        info!("map surface mounted");
        Self { widget: Some(widget), loaded: Default::default() }
    }

    #[inline] pub fn is_mounted(&self) -> bool { self.widget.is_some() }

    #[inline] pub fn loaded(&self, slot: Slot) -> Option<&LoadedLayer> { self.loaded[slot.index()].as_ref() }

    fn widget_mut(&mut self) -> Result<&mut W> {
        self.widget.as_mut().ok_or_else(|| anyhow!("map surface is not mounted"))
    }

    /// Create the source, or replace its data in place.
    pub fn ensure_source(&mut self, id: &str, data: &GeoDocument) -> Result<()> {
        let widget = self.widget_mut()?;
        if widget.has_source(id) {
            debug!(id, "set source data");
            widget.set_source_data(id, data).with_context(|| format!("Failed to update source {id:?}"))
        } else {
            debug!(id, features = data.len(), "add source");
            widget.add_source(id, data).with_context(|| format!("Failed to add source {id:?}"))
        }
    }

    /// Create the layer unless one with the same id exists, below `before` if given.
    pub fn ensure_layer(&mut self, spec: &LayerSpec, before: Option<&str>) -> Result<()> {
        let widget = self.widget_mut()?;
        if widget.has_layer(&spec.id) {
            return Ok(());
        }
        debug!(id = spec.id.as_str(), source = spec.source.as_str(), before, "add layer");
        widget.add_layer(spec, before).with_context(|| format!("Failed to add layer {:?}", spec.id))
    }

    /// Remove a slot's render layers, then its source. Absent parts are skipped.
    pub fn remove_layer_and_source(&mut self, slot: Slot) -> Result<()> {
        let previous = self.loaded[slot.index()].take();
        let layers = previous.as_ref().map_or(&[][..], |p| &p.layers[..]);
        self.clear(slot, layers)?;
        if previous.is_some() {
            info!(%slot, "slot cleared");
        }
        Ok(())
    }

    fn clear(&mut self, slot: Slot, layers: &[LayerSpec]) -> Result<()> {
        let widget = self.widget_mut()?;
        for spec in layers {
            let id = spec.id.as_str();
            if widget.has_layer(id) {
                debug!(id, "remove layer");
                widget.remove_layer(id).with_context(|| format!("Failed to remove layer {id:?}"))?;
            }
        }
        let source = slot.source_id();
        if widget.has_source(source) {
            debug!(id = source, "remove source");
            widget.remove_source(source).with_context(|| format!("Failed to remove source {source:?}"))?;
        }
        Ok(())
    }

    pub fn set_filter(&mut self, layer_id: &str, filter: Option<&Expr>) -> Result<()> {
        let widget = self.widget_mut()?;
        if !widget.has_layer(layer_id) {
            return Ok(());
        }
        debug!(layer_id, filter = ?filter.map(Expr::to_json), "set filter");
        widget.set_filter(layer_id, filter).with_context(|| format!("Failed to set filter on {layer_id:?}"))?;
        if let Some(spec) = self.loaded_spec_mut(layer_id) {
            spec.filter = filter.cloned();
        }
        Ok(())
    }

    pub fn set_paint(&mut self, layer_id: &str, property: &str, value: &Value) -> Result<()> {
        let widget = self.widget_mut()?;
        if !widget.has_layer(layer_id) {
            return Ok(());
        }
        debug!(layer_id, property, "set paint");
        widget.set_paint(layer_id, property, value).with_context(|| format!("Failed to set {property} on {layer_id:?}"))?;
        if let Some(spec) = self.loaded_spec_mut(layer_id) {
            match spec.paint.iter_mut().find(|(p, _)| p == property) {
                Some((_, v)) => *v = value.clone(),
                None => spec.paint.push((property.to_string(), value.clone())),
            }
        }
        Ok(())
    }

    fn loaded_spec_mut(&mut self, layer_id: &str) -> Option<&mut LayerSpec> {
        self.loaded.iter_mut().flatten().flat_map(|l| l.layers.iter_mut()).find(|spec| spec.id == layer_id)
    }

    pub fn fly_to(&mut self, camera: &Camera) -> Result<()> {
        debug!(lon = camera.center.x(), lat = camera.center.y(), zoom = camera.zoom, "fly to");
        self.widget_mut()?.fly_to(camera).context("Failed to move the camera")
    }

    /// Put `data` into `slot`, replacing whatever was there. The previous
    /// occupant is removed, layers and source, before anything is added.
    ///
    /// If adding fails, the partial load is cleared and the previous
    /// occupant is put back, so the slot never ends up half-loaded.
    pub fn load_slot(&mut self, slot: Slot, data: GeoDocument, layers: &[LayerSpec], tag: Option<Arc<str>>) -> Result<()> {
        let previous = self.loaded[slot.index()].take();
        let previous_layers = previous.as_ref().map_or(&[][..], |p| &p.layers[..]);
        if let Err(e) = self.clear(slot, previous_layers) {
            self.loaded[slot.index()] = previous;
            return Err(e);
        }

        let Err(e) = self.install(slot, data, layers, tag) else { return Ok(()) };
        if let Err(cleanup) = self.clear(slot, layers) {
            warn!(%slot, "could not clear a partial load: {cleanup:#}");
        }
        if let Some(LoadedLayer { data, layers, tag, .. }) = previous {
            match self.install(slot, data, &layers, tag) {
                Ok(()) => info!(%slot, "previous layer restored"),
                Err(restore) => warn!(%slot, "could not restore the previous layer: {restore:#}"),
            }
        }
        Err(e)
    }

    fn install(&mut self, slot: Slot, data: GeoDocument, layers: &[LayerSpec], tag: Option<Arc<str>>) -> Result<()> {
        let source_id = slot.source_id();
        self.ensure_source(source_id, &data)?;
        let before = self.anchor_above(slot);
        for spec in layers {
            self.ensure_layer(spec, before.as_deref())?;
        }

        info!(%slot, tag = tag.as_deref(), features = data.len(), "slot loaded");
        let layers = layers.iter().cloned().collect();
        self.loaded[slot.index()] = Some(LoadedLayer { slot, source_id, layers, tag, data });
        Ok(())
    }

    /// Bottom layer of the lowest loaded slot above `slot`.
    fn anchor_above(&self, slot: Slot) -> Option<String> {
        slot.above().iter()
            .filter_map(|s| self.loaded(*s))
            .find_map(|l| l.layer_ids().next().map(str::to_string))
    }

    /// Destroy the widget. Later calls fail; a second unmount is a no-op.
    pub fn unmount(&mut self) {
        if let Some(mut widget) = self.widget.take() {
            self.loaded = Default::default();
            widget.destroy();
            info!("map surface unmounted");
        }
    }
}

impl<W: MapWidget> Drop for MapSurface<W> {
    fn drop(&mut self) { self.unmount(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{LayerKind, MemoryWidget, WidgetCall};
    use serde_json::json;

    fn doc(n: usize) -> GeoDocument {
        let features: Vec<_> = (0..n).map(|i| json!({ "type": "Feature", "properties": { "i": i }, "geometry": null })).collect();
        GeoDocument::from_value(json!({ "type": "FeatureCollection", "features": features })).unwrap()
    }

    fn spec(id: &str) -> LayerSpec { LayerSpec::new(id, LayerKind::Fill, "buildings") }

    #[test]
    fn ensure_source_updates_in_place() {
        let widget = MemoryWidget::new();
        let mut surface = MapSurface::mount(widget.clone());
        surface.ensure_source("buildings", &doc(1)).unwrap();
        surface.ensure_source("buildings", &doc(3)).unwrap();
        assert_eq!(widget.calls(), vec![
            WidgetCall::AddSource { id: "buildings".into() },
            WidgetCall::SetSourceData { id: "buildings".into() },
        ]);
        assert_eq!(widget.source_data("buildings").unwrap().len(), 3);
    }

    #[test]
    fn ensure_layer_is_idempotent() {
        let widget = MemoryWidget::new();
        let mut surface = MapSurface::mount(widget.clone());
        surface.ensure_source("buildings", &doc(1)).unwrap();
        surface.ensure_layer(&spec("a"), None).unwrap();
        surface.ensure_layer(&spec("a"), None).unwrap();
        assert_eq!(widget.layer_ids(), vec!["a".to_string()]);
    }

    #[test]
    fn remove_tolerates_absent() {
        let widget = MemoryWidget::new();
        let mut surface = MapSurface::mount(widget.clone());
        surface.remove_layer_and_source(Slot::Buildings).unwrap();
        assert!(widget.calls().is_empty());
    }

    #[test]
    fn load_slot_removes_before_adding() {
        let widget = MemoryWidget::new();
        let mut surface = MapSurface::mount(widget.clone());
        surface.load_slot(Slot::Buildings, doc(1), &[spec("b")], Some("A".into())).unwrap();
        widget.take_calls();
        surface.load_slot(Slot::Buildings, doc(2), &[spec("b")], Some("B".into())).unwrap();
        assert_eq!(widget.calls(), vec![
            WidgetCall::RemoveLayer { id: "b".into() },
            WidgetCall::RemoveSource { id: "buildings".into() },
            WidgetCall::AddSource { id: "buildings".into() },
            WidgetCall::AddLayer { id: "b".into() },
        ]);
        assert_eq!(surface.loaded(Slot::Buildings).unwrap().tag.as_deref(), Some("B"));
    }

    #[test]
    fn lower_slot_loads_below_upper_slot() {
        let widget = MemoryWidget::new();
        let mut surface = MapSurface::mount(widget.clone());
        surface.load_slot(Slot::Buildings, doc(1), &[spec("b")], None).unwrap();
        let fill = LayerSpec::new("fill", LayerKind::Fill, "boundaries");
        let line = LayerSpec::new("line", LayerKind::Line, "boundaries");
        surface.load_slot(Slot::Boundaries, doc(1), &[fill, line], None).unwrap();
        assert_eq!(widget.layer_ids(), ["fill", "line", "b"]);
    }

    #[test]
    fn failed_load_restores_previous_occupant() {
        let widget = MemoryWidget::new();
        let mut surface = MapSurface::mount(widget.clone());
        let mut old = spec("b");
        old.paint.push(("fill-color".into(), json!("#fff")));
        surface.load_slot(Slot::Buildings, doc(1), &[old], Some("A".into())).unwrap();
        surface.set_filter("b", Some(&Expr::Any(vec![]))).unwrap();

        widget.fail_next_source("buildings");
        let err = surface.load_slot(Slot::Buildings, doc(2), &[spec("b")], Some("B".into()));
        assert!(err.is_err());

        let loaded = surface.loaded(Slot::Buildings).unwrap();
        assert_eq!(loaded.tag.as_deref(), Some("A"));
        assert_eq!(widget.source_data("buildings").unwrap().len(), 1);
        let restored = widget.layer("b").unwrap();
        assert_eq!(restored.filter, Some(Expr::Any(vec![])));
        assert_eq!(restored.paint[0].1, json!("#fff"));
    }

    #[test]
    fn drop_destroys_once() {
        let widget = MemoryWidget::new();
        let mut surface = MapSurface::mount(widget.clone());
        surface.unmount();
        assert!(surface.fly_to(&Camera::new(geo::Point::new(0.0, 0.0), 1.0, 0)).is_err());
        drop(surface);
        assert_eq!(widget.destroy_count(), 1);
    }
}
