use anyhow::{anyhow, Result};
use js_sys::{Array, Function, Reflect};
use quakeview_core::{Camera, Expr, GeoDocument, LayerSpec, MapWidget};
use serde_json::{json, Value};
use wasm_bindgen::{JsCast, JsValue};

use crate::common::{console_warn, is_present, to_js};

/// A JavaScript map object (mapbox-gl / maplibre-gl `Map`) driven through reflection.
pub struct JsMapWidget {
    map: JsValue,
}

impl JsMapWidget {
    pub fn new(map: JsValue) -> Result<Self> {
        if !map.is_object() {
            return Err(anyhow!("map must be an object"));
        }
        Ok(Self { map })
    }

    fn method(target: &JsValue, name: &str) -> Result<Function> {
        let f = Reflect::get(target, &JsValue::from_str(name))
            .map_err(|e| anyhow!("error getting method '{name}': {e:?}"))?;
        f.dyn_into::<Function>().map_err(|_| anyhow!("'{name}' is not a function"))
    }

    fn call_on(target: &JsValue, name: &str, args: &[JsValue]) -> Result<JsValue> {
        let f = Self::method(target, name)?;
        let args: Array = args.iter().collect();
        f.apply(target, &args).map_err(|e| anyhow!("{name} failed: {e:?}"))
    }

    fn call(&self, name: &str, args: &[JsValue]) -> Result<JsValue> { Self::call_on(&self.map, name, args) }

    fn lookup(&self, getter: &str, id: &str) -> Option<JsValue> {
        self.call(getter, &[JsValue::from_str(id)]).ok().filter(is_present)
    }

    fn source_spec(data: &GeoDocument) -> Result<JsValue> {
        to_js(&json!({ "type": "geojson", "data": data.value() }))
    }
}

impl MapWidget for JsMapWidget {
    fn has_source(&self, id: &str) -> bool { self.lookup("getSource", id).is_some() }

    fn add_source(&mut self, id: &str, data: &GeoDocument) -> Result<()> {
        self.call("addSource", &[JsValue::from_str(id), Self::source_spec(data)?])?;
        Ok(())
    }

    fn set_source_data(&mut self, id: &str, data: &GeoDocument) -> Result<()> {
        let source = self.lookup("getSource", id).ok_or_else(|| anyhow!("no source {id:?}"))?;
        Self::call_on(&source, "setData", &[to_js(data.value())?])?;
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<()> {
        self.call("removeSource", &[JsValue::from_str(id)])?;
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool { self.lookup("getLayer", id).is_some() }

    fn add_layer(&mut self, spec: &LayerSpec, before: Option<&str>) -> Result<()> {
        let mut args = vec![to_js(&spec.to_json())?];
        args.extend(before.map(JsValue::from_str));
        self.call("addLayer", &args)?;
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<()> {
        self.call("removeLayer", &[JsValue::from_str(id)])?;
        Ok(())
    }

    fn set_filter(&mut self, layer_id: &str, filter: Option<&Expr>) -> Result<()> {
        let filter = filter.map(Expr::to_json).unwrap_or(Value::Null);
        self.call("setFilter", &[JsValue::from_str(layer_id), to_js(&filter)?])?;
        Ok(())
    }

    fn set_paint(&mut self, layer_id: &str, property: &str, value: &Value) -> Result<()> {
        self.call("setPaintProperty", &[JsValue::from_str(layer_id), JsValue::from_str(property), to_js(value)?])?;
        Ok(())
    }

    fn fly_to(&mut self, camera: &Camera) -> Result<()> {
        self.call("flyTo", &[to_js(&camera.to_json())?])?;
        Ok(())
    }

    fn destroy(&mut self) {
        if let Err(e) = self.call("remove", &[]) {
            console_warn(&format!("map.remove failed: {e:#}"));
        }
    }
}
