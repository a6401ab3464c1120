//! Aggregations behind the analytics charts and the statistics panel.

use std::collections::{HashMap, HashSet};

use crate::model::{Facility, FacilityType};

/// Facility counts per type, in [`FacilityType::CANONICAL_ORDER`].
///
/// Types without facilities are omitted.
#[must_use]
pub fn count_by_type(facilities: &[Facility]) -> Vec<(FacilityType, usize)> {
    let mut counts: HashMap<FacilityType, usize> = HashMap::new();
    for facility in facilities {
        *counts.entry(facility.kind).or_default() += 1;
    }
    FacilityType::CANONICAL_ORDER
        .into_iter()
        .filter_map(|kind| counts.get(&kind).map(|count| (kind, *count)))
        .collect()
}

/// Facility counts per district, in first-seen order.
#[must_use]
pub fn count_by_district(facilities: &[Facility]) -> Vec<(String, usize)> {
    first_seen_counts(facilities.iter().map(|facility| facility.district.as_str()))
        .into_iter()
        .map(|(district, count)| (district.to_owned(), count))
        .collect()
}

/// Mean rating rounded to one decimal; `0.0` when nothing is rated.
#[must_use]
pub fn average_rating(facilities: &[Facility]) -> f64 {
    let ratings: Vec<f64> = facilities
        .iter()
        .filter_map(|facility| facility.rating)
        .filter(|rating| rating.is_finite())
        .collect();
    if ratings.is_empty() {
        return 0.0;
    }
    let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

fn first_seen_counts<K: PartialEq>(keys: impl Iterator<Item = K>) -> Vec<(K, usize)> {
    let mut counts: Vec<(K, usize)> = Vec::new();
    for key in keys {
        match counts.iter_mut().find(|(seen, _)| *seen == key) {
            Some((_, count)) => *count += 1,
            None => counts.push((key, 1)),
        }
    }
    counts
}

#[derive(Debug, Clone, PartialEq)]
/// Headline numbers shown on the analytics summary cards.
pub struct Summary {
    /// Facilities counted.
    pub total: usize,
    /// Distinct districts.
    pub districts: usize,
    /// Distinct facility types.
    pub types: usize,
    /// Average rating, one decimal.
    pub average_rating: f64,
}

/// Summary over the charted facility types.
#[must_use]
pub fn summary(facilities: &[Facility]) -> Summary {
    let charted: Vec<Facility> = facilities
        .iter()
        .filter(|facility| facility.kind.is_charted())
        .cloned()
        .collect();
    Summary {
        total: charted.len(),
        districts: charted
            .iter()
            .map(|facility| facility.district.as_str())
            .collect::<HashSet<_>>()
            .len(),
        types: charted
            .iter()
            .map(|facility| facility.kind)
            .collect::<HashSet<_>>()
            .len(),
        average_rating: average_rating(&charted),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Type × district counts for the grouped comparison chart.
pub struct ComparisonMatrix {
    /// Row labels, first-seen order.
    pub types: Vec<FacilityType>,
    /// Column labels, first-seen order.
    pub districts: Vec<String>,
    /// `counts[row][column]` facilities of that type in that district.
    pub counts: Vec<Vec<usize>>,
}

impl ComparisonMatrix {
    /// Count for a given type and district, zero when either is unknown.
    #[must_use]
    pub fn count(&self, kind: FacilityType, district: &str) -> usize {
        let row = self.types.iter().position(|seen| *seen == kind);
        let column = self.districts.iter().position(|seen| seen == district);
        match (row, column) {
            (Some(row), Some(column)) => self
                .counts
                .get(row)
                .and_then(|cells| cells.get(column))
                .copied()
                .unwrap_or(0),
            _ => 0,
        }
    }
}

/// Build the type × district comparison matrix.
#[must_use]
pub fn comparison_matrix(facilities: &[Facility]) -> ComparisonMatrix {
    let types: Vec<FacilityType> = first_seen_counts(facilities.iter().map(|facility| facility.kind))
        .into_iter()
        .map(|(kind, _)| kind)
        .collect();
    let districts: Vec<String> = count_by_district(facilities)
        .into_iter()
        .map(|(district, _)| district)
        .collect();

    let counts = types
        .iter()
        .map(|kind| {
            districts
                .iter()
                .map(|district| {
                    facilities
                        .iter()
                        .filter(|facility| facility.kind == *kind && facility.district == *district)
                        .count()
                })
                .collect()
        })
        .collect();

    ComparisonMatrix {
        types,
        districts,
        counts,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Statistics panel content for one district.
pub struct DistrictStats {
    /// District the numbers refer to.
    pub district: String,
    /// Facilities located in the district.
    pub total: usize,
    /// Per-type counts in first-seen order.
    pub by_type: Vec<(FacilityType, usize)>,
}

/// Statistics for facilities whose `district` matches case-insensitively.
#[must_use]
pub fn district_stats(facilities: &[Facility], district: &str) -> DistrictStats {
    let wanted = district.trim();
    let in_district: Vec<&Facility> = facilities
        .iter()
        .filter(|facility| facility.district.trim().eq_ignore_ascii_case(wanted))
        .collect();
    DistrictStats {
        district: wanted.to_owned(),
        total: in_district.len(),
        by_type: first_seen_counts(in_district.iter().map(|facility| facility.kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{facility, rated};

    fn twenty_with_thirteen_hospitals() -> Vec<Facility> {
        let mut facilities: Vec<Facility> = (1..=13)
            .map(|id| facility(id, &format!("Hospital {id}"), "Hospital", "Kampala"))
            .collect();
        facilities.extend((14..=17).map(|id| facility(id, &format!("Centre {id}"), "Health Center", "Wakiso")));
        facilities.extend((18..=20).map(|id| facility(id, &format!("Clinic {id}"), "Clinic", "Mukono")));
        facilities
    }

    #[test]
    fn counts_by_type_in_canonical_order() {
        let facilities = twenty_with_thirteen_hospitals();
        let counts = count_by_type(&facilities);
        assert_eq!(
            counts,
            vec![
                (FacilityType::Hospital, 13),
                (FacilityType::HealthCenter, 4),
                (FacilityType::Clinic, 3),
            ]
        );
    }

    #[test]
    fn canonical_order_ignores_input_order() {
        let facilities = vec![
            facility(1, "Police HQ", "Police Station", "Kampala"),
            facility(2, "Gayaza High School", "School", "Wakiso"),
            facility(3, "Mengo Hospital", "Hospital", "Kampala"),
        ];
        let kinds: Vec<FacilityType> = count_by_type(&facilities).into_iter().map(|(kind, _)| kind).collect();
        assert_eq!(
            kinds,
            [FacilityType::Hospital, FacilityType::School, FacilityType::PoliceStation]
        );
    }

    #[test]
    fn counts_by_district_in_first_seen_order() {
        let facilities = vec![
            facility(1, "A", "Clinic", "Wakiso"),
            facility(2, "B", "Clinic", "Kampala"),
            facility(3, "C", "Clinic", "Wakiso"),
        ];
        assert_eq!(
            count_by_district(&facilities),
            vec![("Wakiso".to_owned(), 2), ("Kampala".to_owned(), 1)]
        );
    }

    #[test]
    fn average_rating_rounds_to_one_decimal() {
        let facilities = vec![
            rated(1, "Mulago", "Hospital", "Kampala", 4.5),
            rated(2, "Mengo", "Hospital", "Kampala", 4.3),
            rated(3, "Nsambya", "Hospital", "Kampala", 4.4),
            facility(4, "Unrated", "Clinic", "Kampala"),
        ];
        assert!((average_rating(&facilities) - 4.4).abs() < f64::EPSILON);
    }

    #[test]
    fn average_rating_without_ratings_is_zero() {
        let facilities = vec![facility(1, "Unrated", "Clinic", "Kampala")];
        assert!(average_rating(&facilities).abs() < f64::EPSILON);
        assert!(average_rating(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_skips_uncharted_types() {
        let facilities = vec![
            rated(1, "Mengo", "Hospital", "Kampala", 4.0),
            rated(2, "Fire Brigade", "Fire Station", "Kampala", 1.0),
            facility(3, "Gayaza", "School", "Wakiso"),
        ];
        let summary = summary(&facilities);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.districts, 2);
        assert_eq!(summary.types, 2);
        assert!((summary.average_rating - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn comparison_matrix_counts_pairs() {
        let facilities = twenty_with_thirteen_hospitals();
        let matrix = comparison_matrix(&facilities);
        assert_eq!(matrix.districts, ["Kampala", "Wakiso", "Mukono"]);
        assert_eq!(matrix.count(FacilityType::Hospital, "Kampala"), 13);
        assert_eq!(matrix.count(FacilityType::Clinic, "Kampala"), 0);
        assert_eq!(matrix.count(FacilityType::Clinic, "Mukono"), 3);
        assert_eq!(matrix.count(FacilityType::School, "Mukono"), 0);
    }

    #[test]
    fn district_stats_match_case_insensitively() {
        let facilities = twenty_with_thirteen_hospitals();
        let stats = district_stats(&facilities, " wakiso ");
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_type, vec![(FacilityType::HealthCenter, 4)]);
    }
}
