//! Domain data structures for facilities, their types, and locations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ports::CivmapError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
/// Identifier for a facility.
pub enum FacilityId {
    /// Stable numeric id of a stored facility.
    Number(u32),
    /// Sentinel id for ephemeral entries such as the user's current location.
    Sentinel(String),
}

impl fmt::Display for FacilityId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacilityId::Number(number) => write!(formatter, "{number}"),
            FacilityId::Sentinel(tag) => write!(formatter, "{tag}"),
        }
    }
}

impl From<u32> for FacilityId {
    fn from(number: u32) -> Self {
        FacilityId::Number(number)
    }
}

impl FromStr for FacilityId {
    type Err = CivmapError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CivmapError::InvalidFacility(
                "facility id must not be empty".to_owned(),
            ));
        }
        Ok(trimmed.parse::<u32>().map_or_else(
            |_| FacilityId::Sentinel(trimmed.to_owned()),
            FacilityId::Number,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Kinds of facility shown on the dashboard.
pub enum FacilityType {
    /// General or referral hospital.
    Hospital,
    /// Public health centre (levels II to IV).
    #[serde(rename = "Health Center")]
    HealthCenter,
    /// Private or outpatient clinic.
    Clinic,
    /// Primary or secondary school.
    School,
    /// Police station or post.
    #[serde(rename = "Police Station")]
    PoliceStation,
    /// University or tertiary institution.
    University,
    /// Fire and rescue station.
    #[serde(rename = "Fire Station")]
    FireStation,
    /// Public internet access point.
    #[serde(rename = "Internet Cafe")]
    InternetCafe,
}

impl FacilityType {
    /// Canonical display order used for chart labels.
    pub const CANONICAL_ORDER: [FacilityType; 8] = [
        FacilityType::Hospital,
        FacilityType::HealthCenter,
        FacilityType::Clinic,
        FacilityType::School,
        FacilityType::PoliceStation,
        FacilityType::University,
        FacilityType::FireStation,
        FacilityType::InternetCafe,
    ];

    /// Human-friendly label, also the serialized form.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FacilityType::Hospital => "Hospital",
            FacilityType::HealthCenter => "Health Center",
            FacilityType::Clinic => "Clinic",
            FacilityType::School => "School",
            FacilityType::PoliceStation => "Police Station",
            FacilityType::University => "University",
            FacilityType::FireStation => "Fire Station",
            FacilityType::InternetCafe => "Internet Cafe",
        }
    }

    /// Broad category the type belongs to.
    #[must_use]
    pub fn category(self) -> Category {
        match self {
            FacilityType::Hospital | FacilityType::HealthCenter | FacilityType::Clinic => {
                Category::Healthcare
            }
            FacilityType::School | FacilityType::University => Category::Education,
            FacilityType::PoliceStation | FacilityType::FireStation => Category::PublicSafety,
            FacilityType::InternetCafe => Category::Technology,
        }
    }

    /// Whether the analytics dashboard includes this type in its charts.
    #[must_use]
    pub fn is_charted(self) -> bool {
        !matches!(self, FacilityType::FireStation | FacilityType::InternetCafe)
    }
}

impl fmt::Display for FacilityType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

impl FromStr for FacilityType {
    type Err = CivmapError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        FacilityType::CANONICAL_ORDER
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CivmapError::UnknownFacilityType(raw.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Broad grouping of facility types.
pub enum Category {
    /// Hospitals, health centres, and clinics.
    Healthcare,
    /// Schools and universities.
    Education,
    /// Police and fire services.
    #[serde(rename = "Public Safety")]
    PublicSafety,
    /// Connectivity and technology access.
    Technology,
}

impl Category {
    /// Human-friendly label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Healthcare => "Healthcare",
            Category::Education => "Education",
            Category::PublicSafety => "Public Safety",
            Category::Technology => "Technology",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// WGS84 position of a facility.
pub struct Coordinates {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl Coordinates {
    /// Construct a coordinate pair.
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// `[lon, lat]` ordering used by GeoJSON and KML.
    #[must_use]
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A point-located civic resource.
pub struct Facility {
    /// Unique identifier within the store.
    pub id: FacilityId,
    /// Display name.
    pub name: String,
    /// Facility kind.
    #[serde(rename = "type")]
    pub kind: FacilityType,
    /// Administrative district the facility belongs to.
    pub district: String,
    /// Location of the facility.
    pub coordinates: Coordinates,
    /// Phone number.
    pub contact: String,
    /// Contact e-mail, when published.
    #[serde(default)]
    pub email: Option<String>,
    /// Street address or locality.
    pub address: String,
    /// Offered services in display order.
    #[serde(default)]
    pub services: Vec<String>,
    /// Free-text opening hours.
    #[serde(default)]
    pub opening_hours: Option<String>,
    /// Rating between 0 and 5.
    #[serde(default)]
    pub rating: Option<f64>,
    /// Number of likes.
    #[serde(default)]
    pub likes: u32,
    /// Whether this user liked the facility.
    #[serde(default)]
    pub liked: bool,
}

impl Facility {
    /// Category derived from the facility type.
    #[must_use]
    pub fn category(&self) -> Category {
        self.kind.category()
    }
}
