use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, GeodesicArea, LineString, MultiPolygon, Polygon};
use serde_json::{json, Value};

/// A validated GeoJSON FeatureCollection. Cheap to clone; the payload is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoDocument {
    value: Arc<Value>,
}

impl GeoDocument {
    /// Parse and validate a FeatureCollection from raw bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        if value["type"].as_str() != Some("FeatureCollection") {
            bail!("GeoJSON must be a FeatureCollection, found {}", value["type"]);
        }
        let features = value["features"].as_array()
            .ok_or_else(|| anyhow!("FeatureCollection has no \"features\" array"))?;
        if let Some(bad) = features.iter().position(|f| f["type"].as_str() != Some("Feature")) {
            bail!("Element {bad} of \"features\" is not a Feature");
        }
        Ok(Self { value: Arc::new(value) })
    }

    #[inline] pub fn value(&self) -> &Value { &self.value }

    pub fn features(&self) -> &[Value] {
        self.value["features"].as_array().map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline] pub fn len(&self) -> usize { self.features().len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features().is_empty() }

    /// Concatenate the features of `other` after ours.
    pub fn merge(&self, other: &GeoDocument) -> GeoDocument {
        let features: Vec<Value> = self.features().iter().chain(other.features()).cloned().collect();
        GeoDocument { value: Arc::new(json!({ "type": "FeatureCollection", "features": features })) }
    }
}

/// Footprint area of a building feature in square metres: the numeric
/// attribute when present, else the geodesic area of its polygon geometry.
pub fn footprint_area(feature: &Value, attr: &str) -> Option<f64> {
    if let Some(area) = feature["properties"].get(attr).and_then(Value::as_f64) {
        return Some(area);
    }
    let geometry = parse_polygonal(&feature["geometry"]).ok()??;
    Some(geometry.geodesic_area_unsigned())
}

/// Polygon and MultiPolygon geometries as a MultiPolygon; other types yield `None`.
fn parse_polygonal(geometry: &Value) -> Result<Option<MultiPolygon<f64>>> {
    let coords = geometry["coordinates"].as_array();
    match (geometry["type"].as_str(), coords) {
        (Some("Polygon"), Some(rings)) => Ok(Some(MultiPolygon(vec![parse_polygon(rings)?]))),
        (Some("MultiPolygon"), Some(polys)) => {
            let polygons = polys.iter()
                .map(|p| p.as_array().ok_or_else(|| anyhow!("Invalid MultiPolygon member")).and_then(|r| parse_polygon(r)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(MultiPolygon(polygons)))
        }
        _ => Ok(None),
    }
}

/// Rings are `[exterior, hole, hole, ...]`.
fn parse_polygon(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        ring.as_array().ok_or_else(|| anyhow!("Invalid polygon ring")).and_then(|r| parse_ring_coords(r))
    });
    let exterior = rings.next().ok_or_else(|| anyhow!("Invalid Polygon: missing exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring from `[[x, y], [x, y], ...]`, closing it if needed.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len() + 1);
    for pair in coords {
        let pair = pair.as_array().filter(|p| p.len() >= 2)
            .ok_or_else(|| anyhow!("Invalid coordinate: expected [x, y]"))?;
        let x = pair[0].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
        let y = pair[1].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
        points.push(Coord { x, y });
    }

    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first); }
    }
    Ok(LineString(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_feature_collections() {
        assert!(GeoDocument::parse(br#"{"type":"Feature","geometry":null,"properties":{}}"#).is_err());
        assert!(GeoDocument::parse(br#"{"type":"FeatureCollection"}"#).is_err());
        assert!(GeoDocument::parse(br#"{"type":"FeatureCollection","features":[1]}"#).is_err());
        assert!(GeoDocument::parse(b"not json").is_err());
    }

    #[test]
    fn merge_concatenates_features() {
        let a = GeoDocument::parse(br#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"n":1},"geometry":null}]}"#).unwrap();
        let b = GeoDocument::parse(br#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"n":2},"geometry":null}]}"#).unwrap();
        let merged = a.merge(&b);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.features()[1]["properties"]["n"], 2);
    }

    #[test]
    fn area_attribute_wins_over_geometry() {
        let f = json!({ "type": "Feature", "properties": { "area": 42.5 }, "geometry": null });
        assert_eq!(footprint_area(&f, "area"), Some(42.5));
    }

    #[test]
    fn area_falls_back_to_geodesic_area() {
        // ~0.0001 degree square near Marrakech: roughly 10m x 11m.
        let f = json!({
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-8.0, 31.6], [-7.9999, 31.6], [-7.9999, 31.6001], [-8.0, 31.6001]]]
            }
        });
        let area = footprint_area(&f, "area_in_meters").unwrap();
        assert!(area > 80.0 && area < 130.0, "area = {area}");
    }

    #[test]
    fn area_is_none_for_points_and_missing_geometry() {
        let p = json!({ "type": "Feature", "properties": {}, "geometry": { "type": "Point", "coordinates": [0.0, 0.0] } });
        assert_eq!(footprint_area(&p, "area"), None);
        let n = json!({ "type": "Feature", "properties": {}, "geometry": null });
        assert_eq!(footprint_area(&n, "area"), None);
    }
}
