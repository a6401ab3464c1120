//! Exported documents parse back with independent readers.

use civmap_core::{
    CSV_HEADER, Coordinates, DatasetMeta, ExportFormat, Facility, FacilityId, FacilityType, export,
};
use serde_json::Value;

fn dataset() -> DatasetMeta {
    DatasetMeta {
        name: "Central Uganda Community Resources".to_owned(),
        description: "GIS mapping of healthcare, education, and public safety facilities".to_owned(),
    }
}

fn facilities() -> Vec<Facility> {
    vec![
        Facility {
            id: FacilityId::Number(1),
            name: "Mulago National Referral Hospital, Upper Mulago".to_owned(),
            kind: FacilityType::Hospital,
            district: "Kampala".to_owned(),
            coordinates: Coordinates::new(0.3386, 32.5753),
            contact: "+256-414-554-000".to_owned(),
            email: Some("info@mulago.go.ug".to_owned()),
            address: "Mulago Hill, Kampala".to_owned(),
            services: vec!["Emergency".to_owned(), "Surgery".to_owned()],
            opening_hours: Some("24/7".to_owned()),
            rating: Some(4.5),
            likes: 3,
            liked: false,
        },
        Facility {
            id: FacilityId::Number(24),
            name: "Gayaza \"High\" School".to_owned(),
            kind: FacilityType::School,
            district: "Wakiso".to_owned(),
            coordinates: Coordinates::new(0.449, 32.612),
            contact: "+256-414-371-302".to_owned(),
            email: None,
            address: String::new(),
            services: Vec::new(),
            opening_hours: None,
            rating: None,
            likes: 0,
            liked: false,
        },
    ]
}

#[test]
fn csv_parses_back_with_commas_and_quotes() {
    let document = export(ExportFormat::Csv, &dataset(), &facilities()).unwrap();
    let mut reader = csv::Reader::from_reader(document.as_bytes());

    let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_owned).collect();
    assert_eq!(header, CSV_HEADER);

    let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 2);

    let first = records.first().unwrap();
    assert_eq!(first.get(1), Some("Mulago National Referral Hospital, Upper Mulago"));
    assert_eq!(first.get(3), Some("Healthcare"));
    assert_eq!(first.get(8), Some("0.3386"));
    assert_eq!(first.get(9), Some("32.5753"));
    assert_eq!(first.get(10), Some("Emergency; Surgery"));

    let second = records.get(1).unwrap();
    assert_eq!(second.get(0), Some("24"));
    assert_eq!(second.get(1), Some("Gayaza \"High\" School"));
    assert_eq!(second.get(7), Some(""));
}

#[test]
fn geojson_points_are_lon_lat() {
    let document = export(ExportFormat::GeoJson, &dataset(), &facilities()).unwrap();
    let parsed: Value = serde_json::from_str(&document).unwrap();

    assert_eq!(parsed["type"], "FeatureCollection");
    let first = &parsed["features"][0];
    assert_eq!(first["geometry"]["type"], "Point");
    assert_eq!(first["geometry"]["coordinates"][0], 32.5753);
    assert_eq!(first["geometry"]["coordinates"][1], 0.3386);
    assert_eq!(first["properties"]["type"], "Hospital");
    assert_eq!(first["properties"]["openingHours"], "24/7");
    assert_eq!(first["properties"]["category"], "Healthcare");
    assert!(parsed["features"][1]["properties"].get("email").is_none());
}

#[test]
fn kml_names_document_and_places_every_facility() {
    let document = export(ExportFormat::Kml, &dataset(), &facilities()).unwrap();
    assert!(document.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(document.contains("<name>Central Uganda Community Resources</name>"));
    assert!(document.contains("<name>Gayaza &quot;High&quot; School</name>"));
    assert!(document.contains("<coordinates>32.612,0.449,0</coordinates>"));
    assert_eq!(document.matches("<Placemark>").count(), 2);
}
