use anyhow::Result;
use serde_json::Value;

use crate::{geojson::GeoDocument, expr::Expr};

use super::{Camera, LayerSpec};

/// The rendering collaborator: an interactive map widget with named sources and layers.
///
/// Implementations forward each call to the widget as-is. Idempotence and slot
/// bookkeeping live in `MapSurface`, not here.
pub trait MapWidget {
    fn has_source(&self, id: &str) -> bool;
    fn add_source(&mut self, id: &str, data: &GeoDocument) -> Result<()>;
    /// Replace the data of an existing source in place.
    fn set_source_data(&mut self, id: &str, data: &GeoDocument) -> Result<()>;
    fn remove_source(&mut self, id: &str) -> Result<()>;

    fn has_layer(&self, id: &str) -> bool;
    /// Insert the layer directly below `before`, or on top of the stack when `None`.
    fn add_layer(&mut self, spec: &LayerSpec, before: Option<&str>) -> Result<()>;
    fn remove_layer(&mut self, id: &str) -> Result<()>;

    /// `None` clears the filter.
    fn set_filter(&mut self, layer_id: &str, filter: Option<&Expr>) -> Result<()>;
    fn set_paint(&mut self, layer_id: &str, property: &str, value: &Value) -> Result<()>;

    /// Start a camera animation, interrupting any animation in flight.
    fn fly_to(&mut self, camera: &Camera) -> Result<()>;

    /// Release the widget. Called exactly once, by `MapSurface`.
    fn destroy(&mut self);
}
