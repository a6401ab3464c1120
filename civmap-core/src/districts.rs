//! District boundary features, name normalization, and lookup by name.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::map::Bounds;
use crate::model::Coordinates;
use crate::ports::CivmapError;

/// Property keys tried, in order, when naming a boundary feature.
///
/// Upstream district datasets disagree on the key; the first non-empty
/// string wins. The same list is tried again inside `properties.attributes`.
pub const NAME_KEYS: [&str; 8] = [
    "name",
    "NAME",
    "Name",
    "dname2019",
    "dname",
    "DNAME",
    "district",
    "District",
];

/// Property keys tried when naming an uploaded boundary.
pub const UPLOAD_NAME_KEYS: [&str; 3] = ["name", "NAME", "Name"];

#[derive(Debug, Clone, PartialEq)]
/// A named polygon geometry representing a district's extent.
pub struct BoundaryFeature {
    /// Normalized display name.
    pub name: String,
    /// Source properties; `name` is always set to [`BoundaryFeature::name`].
    pub properties: Map<String, Value>,
    /// Raw GeoJSON geometry object.
    pub geometry: Value,
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Optional descriptive figures shown in a district popup.
pub struct DistrictInfo {
    /// Resident population.
    pub population: Option<f64>,
    /// Area in km².
    pub area: Option<f64>,
    /// Residents per km².
    pub density: Option<f64>,
    /// Free-text description.
    pub description: Option<String>,
}

impl BoundaryFeature {
    /// Build a feature, writing the resolved name back into its properties.
    #[must_use]
    pub fn new(name: &str, mut properties: Map<String, Value>, geometry: Value) -> Self {
        let name = name.trim().to_owned();
        properties.insert("name".to_owned(), Value::String(name.clone()));
        Self {
            name,
            properties,
            geometry,
        }
    }

    /// Case-insensitive registry key.
    #[must_use]
    pub fn key(&self) -> String {
        district_key(&self.name)
    }

    /// Popup figures read from the feature properties.
    #[must_use]
    pub fn info(&self) -> DistrictInfo {
        DistrictInfo {
            population: self.properties.get("population").and_then(Value::as_f64),
            area: self.properties.get("area").and_then(Value::as_f64),
            density: self.properties.get("density").and_then(Value::as_f64),
            description: self
                .properties
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_owned),
        }
    }

    /// Exterior rings of every polygon in the geometry.
    #[must_use]
    pub fn rings(&self) -> Vec<Vec<Coordinates>> {
        let mut rings = Vec::new();
        collect_rings(&self.geometry, &mut rings);
        rings
    }

    /// Bounding box of all exterior rings.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::around(self.rings().iter().flatten())
    }
}

/// Normalize a district name into its lookup key.
#[must_use]
pub fn district_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn collect_rings(geometry: &Value, rings: &mut Vec<Vec<Coordinates>>) {
    match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => {
            if let Some(exterior) = geometry
                .get("coordinates")
                .and_then(Value::as_array)
                .and_then(|polygon| polygon.first())
            {
                rings.push(ring_points(exterior));
            }
        }
        Some("MultiPolygon") => {
            let polygons = geometry.get("coordinates").and_then(Value::as_array);
            for polygon in polygons.into_iter().flatten() {
                if let Some(exterior) = polygon.as_array().and_then(|parts| parts.first()) {
                    rings.push(ring_points(exterior));
                }
            }
        }
        Some("GeometryCollection") => {
            let members = geometry.get("geometries").and_then(Value::as_array);
            for member in members.into_iter().flatten() {
                collect_rings(member, rings);
            }
        }
        _ => {}
    }
}

fn ring_points(ring: &Value) -> Vec<Coordinates> {
    ring.as_array()
        .into_iter()
        .flatten()
        .filter_map(|position| {
            let pair = position.as_array()?;
            let lon = pair.first()?.as_f64()?;
            let lat = pair.get(1)?.as_f64()?;
            Some(Coordinates::new(lat, lon))
        })
        .collect()
}

fn first_name(properties: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match properties.get(*key) {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// Resolve a feature name from its properties, falling back to
/// `properties.attributes`.
#[must_use]
pub fn resolve_name(properties: &Map<String, Value>) -> Option<String> {
    first_name(properties, &NAME_KEYS).or_else(|| {
        properties
            .get("attributes")
            .and_then(Value::as_object)
            .and_then(|attributes| first_name(attributes, &NAME_KEYS))
    })
}

fn properties_of(feature: &Value) -> Map<String, Value> {
    feature
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Parse a boundary `FeatureCollection` into named features sorted by name.
///
/// Features without any usable name are skipped.
///
/// # Errors
///
/// Returns [`CivmapError::Json`] for malformed JSON and
/// [`CivmapError::InvalidGeoJson`] when there is no `features` array.
pub fn parse_boundary_collection(json: &str) -> Result<Vec<BoundaryFeature>, CivmapError> {
    let document: Value = serde_json::from_str(json)?;
    let features = document
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| CivmapError::InvalidGeoJson("missing features array".to_owned()))?;

    let mut named: Vec<BoundaryFeature> = features
        .iter()
        .filter_map(|feature| {
            let properties = properties_of(feature);
            let Some(name) = resolve_name(&properties) else {
                warn!("skipping boundary feature without a name");
                return None;
            };
            let geometry = feature.get("geometry").cloned().unwrap_or(Value::Null);
            Some(BoundaryFeature::new(&name, properties, geometry))
        })
        .collect();

    named.sort_by_key(BoundaryFeature::key);
    debug!(count = named.len(), "parsed boundary features");
    Ok(named)
}

/// Turn user-supplied GeoJSON into boundary features.
///
/// Accepts a `FeatureCollection`, a single `Feature`, or a bare `Polygon`,
/// `MultiPolygon`, or `GeometryCollection`. Unnamed features take
/// `fallback_name` (suffixed with a counter after the first); without a
/// fallback they are skipped.
///
/// # Errors
///
/// Returns [`CivmapError::UnsupportedGeoJson`] for any other structure.
pub fn parse_upload(
    document: &Value,
    fallback_name: Option<&str>,
) -> Result<Vec<BoundaryFeature>, CivmapError> {
    let kind = document.get("type").and_then(Value::as_str).unwrap_or("");
    let features: Vec<Value> = match kind {
        "FeatureCollection" => document
            .get("features")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| CivmapError::UnsupportedGeoJson(kind.to_owned()))?,
        "Feature" => vec![document.clone()],
        "Polygon" | "MultiPolygon" | "GeometryCollection" => vec![serde_json::json!({
            "type": "Feature",
            "properties": {},
            "geometry": document,
        })],
        other => return Err(CivmapError::UnsupportedGeoJson(other.to_owned())),
    };

    let mut unnamed = 0_usize;
    let mut boundaries = Vec::with_capacity(features.len());
    for feature in &features {
        let properties = properties_of(feature);
        let name = match first_name(&properties, &UPLOAD_NAME_KEYS) {
            Some(name) => name,
            None => {
                let Some(fallback) = fallback_name.map(str::trim).filter(|text| !text.is_empty())
                else {
                    warn!("skipping uploaded boundary without a name");
                    continue;
                };
                unnamed += 1;
                if unnamed == 1 {
                    fallback.to_owned()
                } else {
                    format!("{fallback}-{unnamed}")
                }
            }
        };
        let geometry = feature.get("geometry").cloned().unwrap_or(Value::Null);
        boundaries.push(BoundaryFeature::new(&name, properties, geometry));
    }
    Ok(boundaries)
}

/// Boundaries keyed by lowercase district name.
#[derive(Debug, Clone, Default)]
pub struct DistrictRegistry {
    features: BTreeMap<String, BoundaryFeature>,
}

impl DistrictRegistry {
    /// Build a registry; later features replace earlier ones with the same key.
    #[must_use]
    pub fn new(features: Vec<BoundaryFeature>) -> Self {
        let features = features
            .into_iter()
            .map(|feature| (feature.key(), feature))
            .collect();
        Self { features }
    }

    /// Resolve a district name case-insensitively.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&BoundaryFeature> {
        self.features.get(&district_key(name))
    }

    /// Add or replace a boundary, returning the one it replaced.
    pub fn register(&mut self, feature: BoundaryFeature) -> Option<BoundaryFeature> {
        self.features.insert(feature.key(), feature)
    }

    /// Boundaries sorted case-insensitively by name.
    pub fn iter(&self) -> impl Iterator<Item = &BoundaryFeature> {
        self.features.values()
    }

    /// Display names sorted case-insensitively.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|feature| feature.name.clone()).collect()
    }

    /// Number of registered boundaries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether no boundaries are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Bounding box over every boundary.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        let rings: Vec<Vec<Coordinates>> = self.iter().flat_map(BoundaryFeature::rings).collect();
        Bounds::around(rings.iter().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(name_key: &str, name: &str, west: f64, south: f64) -> Value {
        json!({
            "type": "Feature",
            "properties": { name_key: name },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [west, south], [west + 0.1, south], [west + 0.1, south + 0.1],
                    [west, south + 0.1], [west, south]
                ]]
            }
        })
    }

    fn collection(features: Vec<Value>) -> String {
        json!({ "type": "FeatureCollection", "features": features }).to_string()
    }

    #[test]
    fn resolves_names_from_alternative_keys() {
        let json = collection(vec![
            square("DNAME", "Wakiso", 32.3, 0.2),
            square("dname2019", "Kampala", 32.5, 0.3),
            json!({ "type": "Feature", "properties": { "attributes": { "District": "Mukono" } }, "geometry": null }),
        ]);
        let features = parse_boundary_collection(&json).unwrap();
        let names: Vec<&str> = features.iter().map(|feature| feature.name.as_str()).collect();
        assert_eq!(names, ["Kampala", "Mukono", "Wakiso"]);
        assert_eq!(
            features.first().and_then(|feature| feature.properties.get("name")),
            Some(&json!("Kampala"))
        );
    }

    #[test]
    fn prefers_earlier_keys_and_skips_blank_values() {
        let mut properties = Map::new();
        properties.insert("name".to_owned(), json!("  "));
        properties.insert("DNAME".to_owned(), json!("LUWEERO"));
        properties.insert("district".to_owned(), json!("Luwero"));
        assert_eq!(resolve_name(&properties).as_deref(), Some("LUWEERO"));
    }

    #[test]
    fn skips_unnamed_features() {
        let json = collection(vec![
            json!({ "type": "Feature", "properties": {}, "geometry": null }),
            square("name", "Mpigi", 32.0, 0.2),
        ]);
        let features = parse_boundary_collection(&json).unwrap();
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn rejects_documents_without_features() {
        let err = parse_boundary_collection(r#"{"type":"Polygon"}"#).unwrap_err();
        assert!(matches!(err, CivmapError::InvalidGeoJson(_)));
    }

    #[test]
    fn lookup_ignores_case() {
        let features = parse_boundary_collection(&collection(vec![square("name", "Kampala", 32.5, 0.3)])).unwrap();
        let registry = DistrictRegistry::new(features);
        let upper = registry.resolve("KAMPALA").unwrap();
        let lower = registry.resolve("kampala").unwrap();
        assert_eq!(upper, lower);
        assert!(registry.resolve("Gulu").is_none());
    }

    #[test]
    fn rings_and_bounds_use_lon_lat_order() {
        let feature = parse_boundary_collection(&collection(vec![square("name", "Kampala", 32.5, 0.3)]))
            .unwrap()
            .remove(0);
        let rings = feature.rings();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings.first().and_then(|ring| ring.first()), Some(&Coordinates::new(0.3, 32.5)));
        let bounds = feature.bounds().unwrap();
        assert!((bounds.south - 0.3).abs() < 1e-9);
        assert!((bounds.east - 32.6).abs() < 1e-9);
    }

    #[test]
    fn upload_accepts_bare_geometry_with_fallback_name() {
        let geometry = json!({
            "type": "MultiPolygon",
            "coordinates": [[[[32.0, 0.0], [32.1, 0.0], [32.1, 0.1], [32.0, 0.0]]]]
        });
        let features = parse_upload(&geometry, Some("Custom Area")).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features.first().map(BoundaryFeature::key).as_deref(), Some("custom area"));
    }

    #[test]
    fn upload_rejects_points() {
        let point = json!({ "type": "Point", "coordinates": [32.5, 0.3] });
        let err = parse_upload(&point, Some("x")).unwrap_err();
        assert!(matches!(err, CivmapError::UnsupportedGeoJson(kind) if kind == "Point"));
    }

    #[test]
    fn registering_same_key_replaces() {
        let mut registry = DistrictRegistry::default();
        assert!(registry.register(BoundaryFeature::new("Kampala", Map::new(), Value::Null)).is_none());
        let replaced = registry.register(BoundaryFeature::new("KAMPALA", Map::new(), Value::Null));
        assert_eq!(replaced.map(|feature| feature.name), Some("Kampala".to_owned()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), ["KAMPALA"]);
    }
}
