//! Serialization of the facility store into downloadable CSV, GeoJSON, and KML.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::model::{Category, Facility, FacilityId, FacilityType};
use crate::ports::{CivmapError, DatasetMeta};

/// Column header of the CSV export.
pub const CSV_HEADER: [&str; 12] = [
    "ID",
    "Name",
    "Type",
    "Category",
    "District",
    "Address",
    "Contact",
    "Email",
    "Latitude",
    "Longitude",
    "Services",
    "Opening Hours",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Supported export formats.
pub enum ExportFormat {
    /// Comma-separated values.
    Csv,
    /// GeoJSON `FeatureCollection` of points.
    GeoJson,
    /// Keyhole Markup Language placemarks.
    Kml,
}

impl ExportFormat {
    /// All formats in menu order.
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::GeoJson, ExportFormat::Kml];

    /// Default download file name.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "uganda-gis-facilities.csv",
            ExportFormat::GeoJson => "uganda-gis-facilities.geojson",
            ExportFormat::Kml => "uganda-gis-facilities.kml",
        }
    }

    /// MIME type of the produced document.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::GeoJson => "application/json",
            ExportFormat::Kml => "application/vnd.google-earth.kml+xml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExportFormat::Csv => "csv",
            ExportFormat::GeoJson => "geojson",
            ExportFormat::Kml => "kml",
        };
        formatter.pad(label)
    }
}

impl FromStr for ExportFormat {
    type Err = CivmapError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "geojson" | "json" => Ok(ExportFormat::GeoJson),
            "kml" => Ok(ExportFormat::Kml),
            other => Err(CivmapError::UnknownExportFormat(other.to_owned())),
        }
    }
}

/// Render `facilities` in the requested format.
///
/// # Errors
///
/// Returns [`CivmapError::Json`] if the GeoJSON document cannot be produced.
pub fn export(
    format: ExportFormat,
    dataset: &DatasetMeta,
    facilities: &[Facility],
) -> Result<String, CivmapError> {
    match format {
        ExportFormat::Csv => Ok(to_csv(facilities)),
        ExportFormat::GeoJson => to_geojson(facilities),
        ExportFormat::Kml => Ok(to_kml(dataset, facilities)),
    }
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// CSV with a fixed header; text fields are always quoted.
#[must_use]
pub fn to_csv(facilities: &[Facility]) -> String {
    let mut lines = Vec::with_capacity(facilities.len() + 1);
    lines.push(CSV_HEADER.join(","));
    for facility in facilities {
        let row = [
            facility.id.to_string(),
            quoted(&facility.name),
            quoted(facility.kind.label()),
            quoted(facility.category().label()),
            quoted(&facility.district),
            quoted(&facility.address),
            quoted(&facility.contact),
            quoted(facility.email.as_deref().unwrap_or("")),
            facility.coordinates.lat.to_string(),
            facility.coordinates.lon.to_string(),
            quoted(&facility.services.join("; ")),
            quoted(facility.opening_hours.as_deref().unwrap_or("")),
        ];
        lines.push(row.join(","));
    }
    lines.join("\n")
}

#[derive(Serialize)]
struct FeatureCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<PointFeature<'a>>,
}

#[derive(Serialize)]
struct PointFeature<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    properties: PointProperties<'a>,
    geometry: PointGeometry,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PointProperties<'a> {
    id: &'a FacilityId,
    name: &'a str,
    #[serde(rename = "type")]
    kind: FacilityType,
    category: Category,
    district: &'a str,
    address: &'a str,
    contact: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    services: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    opening_hours: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<f64>,
}

#[derive(Serialize)]
struct PointGeometry {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: [f64; 2],
}

/// Pretty-printed GeoJSON; point coordinates are `[lon, lat]`.
///
/// # Errors
///
/// Returns [`CivmapError::Json`] if serialization fails.
pub fn to_geojson(facilities: &[Facility]) -> Result<String, CivmapError> {
    let collection = FeatureCollection {
        kind: "FeatureCollection",
        features: facilities
            .iter()
            .map(|facility| PointFeature {
                kind: "Feature",
                properties: PointProperties {
                    id: &facility.id,
                    name: &facility.name,
                    kind: facility.kind,
                    category: facility.category(),
                    district: &facility.district,
                    address: &facility.address,
                    contact: &facility.contact,
                    email: facility.email.as_deref(),
                    services: &facility.services,
                    opening_hours: facility.opening_hours.as_deref(),
                    rating: facility.rating,
                },
                geometry: PointGeometry {
                    kind: "Point",
                    coordinates: facility.coordinates.lon_lat(),
                },
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&collection)?)
}

/// Escape the five XML special characters.
#[must_use]
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn placemark_description(facility: &Facility) -> String {
    let address = if facility.address.is_empty() {
        String::new()
    } else {
        format!("<strong>Address:</strong> {}<br>", escape_xml(&facility.address))
    };
    format!(
        "<strong>Type:</strong> {}<br><strong>District:</strong> {}<br><strong>Contact:</strong> {}<br>{address}",
        escape_xml(facility.kind.label()),
        escape_xml(&facility.district),
        escape_xml(&facility.contact),
    )
}

/// KML document with one placemark per facility; coordinates are `lon,lat,0`.
#[must_use]
pub fn to_kml(dataset: &DatasetMeta, facilities: &[Facility]) -> String {
    let placemarks: String = facilities
        .iter()
        .map(|facility| {
            format!(
                concat!(
                    "    <Placemark>\n",
                    "      <name>{name}</name>\n",
                    "      <description>{description}</description>\n",
                    "      <Point>\n",
                    "        <coordinates>{lon},{lat},0</coordinates>\n",
                    "      </Point>\n",
                    "    </Placemark>\n",
                ),
                name = escape_xml(&facility.name),
                description = escape_xml(&placemark_description(facility)),
                lon = facility.coordinates.lon,
                lat = facility.coordinates.lat,
            )
        })
        .collect();

    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n",
            "  <Document>\n",
            "    <name>{name}</name>\n",
            "    <description>{description}</description>\n",
            "{placemarks}",
            "  </Document>\n",
            "</kml>\n",
        ),
        name = escape_xml(&dataset.name),
        description = escape_xml(&dataset.description),
        placemarks = placemarks,
    )
}
