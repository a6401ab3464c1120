//! Map-side logic: marker styling, heatmap weights, bounds, and distances.

use std::ops::Range;

use crate::model::{Coordinates, Facility, FacilityId, FacilityType};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Initial viewport and zoom limits of the map.
pub struct MapSettings {
    /// Initial centre.
    pub center: Coordinates,
    /// Initial zoom level.
    pub zoom: u8,
    /// Furthest zoom-out.
    pub min_zoom: u8,
    /// Closest zoom-in.
    pub max_zoom: u8,
}

impl Default for MapSettings {
    fn default() -> Self {
        // Kampala, wide enough to show the central region.
        Self {
            center: Coordinates::new(0.3476, 32.5825),
            zoom: 9,
            min_zoom: 8,
            max_zoom: 18,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Marker appearance for a facility type.
pub struct MarkerStyle {
    /// Glyph drawn inside the marker.
    pub glyph: &'static str,
    /// Fill colour as `#rrggbb`.
    pub color: &'static str,
    /// Marker diameter in pixels.
    pub size: u8,
}

impl MarkerStyle {
    /// Fill colour split into RGB components.
    #[must_use]
    pub fn rgb(&self) -> (u8, u8, u8) {
        let channel = |range: Range<usize>| {
            self.color
                .get(range)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .unwrap_or(0)
        };
        (channel(1..3), channel(3..5), channel(5..7))
    }
}

impl FacilityType {
    /// Marker appearance for this type.
    #[must_use]
    pub fn marker_style(self) -> MarkerStyle {
        let (glyph, color, size) = match self {
            FacilityType::Hospital => ("🏥", "#e74c3c", 22),
            FacilityType::HealthCenter => ("⚕️", "#3498db", 20),
            FacilityType::Clinic => ("💊", "#2ecc71", 18),
            FacilityType::School => ("🏫", "#f39c12", 20),
            FacilityType::University => ("🎓", "#9b59b6", 24),
            FacilityType::PoliceStation => ("👮", "#34495e", 20),
            FacilityType::FireStation => ("🚒", "#e67e22", 20),
            FacilityType::InternetCafe => ("💻", "#27ae60", 18),
        };
        MarkerStyle { glyph, color, size }
    }

    /// Heatmap weight of a facility of this type.
    #[must_use]
    pub fn heat_intensity(self) -> f64 {
        match self {
            FacilityType::Hospital => 1.0,
            FacilityType::HealthCenter => 0.8,
            FacilityType::PoliceStation => 0.7,
            FacilityType::Clinic => 0.6,
            FacilityType::School
            | FacilityType::University
            | FacilityType::FireStation
            | FacilityType::InternetCafe => 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// A weighted heatmap sample.
pub struct HeatPoint {
    /// Sample position.
    pub position: Coordinates,
    /// Weight in `0..=1`.
    pub intensity: f64,
}

/// Heatmap samples for the given facilities.
#[must_use]
pub fn heat_points<'a>(facilities: impl IntoIterator<Item = &'a Facility>) -> Vec<HeatPoint> {
    facilities
        .into_iter()
        .map(|facility| HeatPoint {
            position: facility.coordinates,
            intensity: facility.kind.heat_intensity(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Axis-aligned latitude/longitude box.
pub struct Bounds {
    /// Minimum latitude.
    pub south: f64,
    /// Minimum longitude.
    pub west: f64,
    /// Maximum latitude.
    pub north: f64,
    /// Maximum longitude.
    pub east: f64,
}

impl Bounds {
    /// Smallest box containing every finite point; `None` when there are none.
    pub fn around<'a>(points: impl IntoIterator<Item = &'a Coordinates>) -> Option<Self> {
        points
            .into_iter()
            .filter(|point| point.is_finite())
            .fold(None, |acc: Option<Bounds>, point| {
                Some(match acc {
                    None => Bounds {
                        south: point.lat,
                        west: point.lon,
                        north: point.lat,
                        east: point.lon,
                    },
                    Some(bounds) => Bounds {
                        south: bounds.south.min(point.lat),
                        west: bounds.west.min(point.lon),
                        north: bounds.north.max(point.lat),
                        east: bounds.east.max(point.lon),
                    },
                })
            })
    }

    /// Grow the box by a fraction of its size on every side, with a minimum
    /// margin so single points still get a visible area.
    #[must_use]
    pub fn padded(&self, fraction: f64, minimum: f64) -> Self {
        let lat_pad = ((self.north - self.south) * fraction).max(minimum);
        let lon_pad = ((self.east - self.west) * fraction).max(minimum);
        Bounds {
            south: self.south - lat_pad,
            west: self.west - lon_pad,
            north: self.north + lat_pad,
            east: self.east + lon_pad,
        }
    }

    /// Centre of the box.
    #[must_use]
    pub fn center(&self) -> Coordinates {
        Coordinates::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Whether a point lies inside or on the edge of the box.
    #[must_use]
    pub fn contains(&self, point: &Coordinates) -> bool {
        (self.south..=self.north).contains(&point.lat) && (self.west..=self.east).contains(&point.lon)
    }
}

/// Great-circle distance in kilometres (haversine).
#[must_use]
pub fn distance_km(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lon - from.lon).to_radians();
    let half_chord = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let angle = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());
    EARTH_RADIUS_KM * angle
}

#[derive(Debug, Clone, PartialEq)]
/// A facility and its distance from a reference point.
pub struct Nearby<'a> {
    /// The facility.
    pub facility: &'a Facility,
    /// Distance in kilometres.
    pub distance_km: f64,
}

/// The `count` facilities closest to `origin`, nearest first.
#[must_use]
pub fn nearest<'a>(
    origin: &Coordinates,
    facilities: impl IntoIterator<Item = &'a Facility>,
    count: usize,
) -> Vec<Nearby<'a>> {
    let mut ranked: Vec<Nearby<'a>> = facilities
        .into_iter()
        .map(|facility| Nearby {
            facility,
            distance_km: distance_km(origin, &facility.coordinates),
        })
        .collect();
    ranked.sort_by(|left, right| left.distance_km.total_cmp(&right.distance_km));
    ranked.truncate(count);
    ranked
}

#[derive(Debug, Clone, PartialEq)]
/// Everything a facility popup or detail panel renders.
pub struct FacilityView {
    /// Facility id, for follow-up actions.
    pub id: FacilityId,
    /// Title.
    pub name: String,
    /// Type badge text.
    pub badge: &'static str,
    /// Marker style of the type.
    pub style: MarkerStyle,
    /// Star string, present when the facility is rated.
    pub stars: Option<String>,
    /// Numeric rating label such as `4.5/5`.
    pub rating_label: Option<String>,
    /// District line.
    pub district: String,
    /// Phone line.
    pub contact: String,
    /// E-mail line.
    pub email: Option<String>,
    /// Address line.
    pub address: String,
    /// Opening-hours line.
    pub opening_hours: Option<String>,
    /// Services list.
    pub services: Vec<String>,
    /// Current like count.
    pub likes: u32,
    /// Whether the like button is active.
    pub liked: bool,
}

/// Five-character star string: a filled star per whole point, a half star
/// when the fraction reaches one half, empty stars for the rest.
#[must_use]
pub fn star_string(rating: f64) -> String {
    let rating = rating.clamp(0.0, 5.0);
    let filled = (1..=5).filter(|star| f64::from(*star) <= rating).count();
    let half = usize::from(rating.fract() >= 0.5);
    let empty = 5_usize.saturating_sub(filled + half);
    format!("{}{}{}", "★".repeat(filled), "⯪".repeat(half), "☆".repeat(empty))
}

impl From<&Facility> for FacilityView {
    fn from(facility: &Facility) -> Self {
        Self {
            id: facility.id.clone(),
            name: facility.name.clone(),
            badge: facility.kind.label(),
            style: facility.kind.marker_style(),
            stars: facility.rating.map(star_string),
            rating_label: facility.rating.map(|rating| format!("{rating}/5")),
            district: facility.district.clone(),
            contact: facility.contact.clone(),
            email: facility.email.clone(),
            address: facility.address.clone(),
            opening_hours: facility.opening_hours.clone(),
            services: facility.services.clone(),
            likes: facility.likes,
            liked: facility.liked,
        }
    }
}
