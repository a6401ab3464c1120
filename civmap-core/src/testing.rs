//! Fixtures shared by unit tests.

use crate::model::{Coordinates, Facility, FacilityId, FacilityType};

pub(crate) fn facility(id: u32, name: &str, kind: &str, district: &str) -> Facility {
    Facility {
        id: FacilityId::Number(id),
        name: name.to_owned(),
        kind: kind.parse::<FacilityType>().expect("fixture type label"),
        district: district.to_owned(),
        coordinates: Coordinates::new(0.3476, 32.5825),
        contact: "+256-414-000-000".to_owned(),
        email: None,
        address: format!("{district} town"),
        services: Vec::new(),
        opening_hours: None,
        rating: None,
        likes: 0,
        liked: false,
    }
}

pub(crate) fn rated(id: u32, name: &str, kind: &str, district: &str, rating: f64) -> Facility {
    Facility {
        rating: Some(rating),
        ..facility(id, name, kind, district)
    }
}
