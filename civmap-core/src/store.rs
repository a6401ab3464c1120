//! Validated in-memory facility store.

use std::collections::HashMap;

use crate::model::{Facility, FacilityId};
use crate::ports::CivmapError;

/// The single source of truth for facility records.
///
/// Records keep their load order; every consumer (search ties, district
/// first-seen order, exports) relies on it.
#[derive(Debug, Clone, Default)]
pub struct FacilityStore {
    facilities: Vec<Facility>,
    index: HashMap<FacilityId, usize>,
}

impl FacilityStore {
    /// Build a store, enforcing the record invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CivmapError::DuplicateFacility`] when two records share an id
    /// and [`CivmapError::InvalidFacility`] for an empty name, non-finite
    /// coordinates, or a rating outside `0..=5`.
    pub fn new(facilities: Vec<Facility>) -> Result<Self, CivmapError> {
        let mut index = HashMap::with_capacity(facilities.len());
        for (position, facility) in facilities.iter().enumerate() {
            validate(facility)?;
            if index.insert(facility.id.clone(), position).is_some() {
                return Err(CivmapError::DuplicateFacility(facility.id.clone()));
            }
        }
        Ok(Self { facilities, index })
    }

    /// All facilities in load order.
    #[must_use]
    pub fn all(&self) -> &[Facility] {
        &self.facilities
    }

    /// Number of stored facilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    /// Whether the store holds no facilities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// Look up a facility by id.
    #[must_use]
    pub fn get(&self, id: &FacilityId) -> Option<&Facility> {
        self.index
            .get(id)
            .and_then(|position| self.facilities.get(*position))
    }

    /// Mutable access for the like fields.
    pub(crate) fn get_mut(&mut self, id: &FacilityId) -> Option<&mut Facility> {
        let position = *self.index.get(id)?;
        self.facilities.get_mut(position)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Facility> {
        self.facilities.iter_mut()
    }
}

fn validate(facility: &Facility) -> Result<(), CivmapError> {
    if facility.name.trim().is_empty() {
        return Err(CivmapError::InvalidFacility(format!(
            "facility {} has an empty name",
            facility.id
        )));
    }
    if !facility.coordinates.is_finite() {
        return Err(CivmapError::InvalidFacility(format!(
            "facility {} has non-finite coordinates",
            facility.id
        )));
    }
    if let Some(rating) = facility.rating
        && !(0.0..=5.0).contains(&rating)
    {
        return Err(CivmapError::InvalidFacility(format!(
            "facility {} has rating {rating} outside 0..=5",
            facility.id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::facility;

    #[test]
    fn rejects_duplicate_ids() {
        let records = vec![
            facility(1, "Mengo Hospital", "Hospital", "Kampala"),
            facility(1, "Nsambya Hospital", "Hospital", "Kampala"),
        ];
        let err = FacilityStore::new(records).unwrap_err();
        assert!(matches!(err, CivmapError::DuplicateFacility(FacilityId::Number(1))));
    }

    #[test]
    fn rejects_rating_out_of_range() {
        let mut record = facility(2, "Case Hospital", "Hospital", "Kampala");
        record.rating = Some(5.5);
        let err = FacilityStore::new(vec![record]).unwrap_err();
        assert!(matches!(err, CivmapError::InvalidFacility(_)));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let mut record = facility(3, "Kisubi Hospital", "Hospital", "Wakiso");
        record.coordinates.lat = f64::NAN;
        assert!(FacilityStore::new(vec![record]).is_err());
    }

    #[test]
    fn looks_up_by_id_and_keeps_order() {
        let store = FacilityStore::new(vec![
            facility(10, "Lubaga Hospital", "Hospital", "Kampala"),
            facility(4, "Kira Health Centre IV", "Health Center", "Wakiso"),
        ])
        .unwrap();

        assert_eq!(store.len(), 2);
        let names: Vec<&str> = store.all().iter().map(|record| record.name.as_str()).collect();
        assert_eq!(names, ["Lubaga Hospital", "Kira Health Centre IV"]);
        assert_eq!(
            store.get(&FacilityId::Number(4)).map(|record| record.district.as_str()),
            Some("Wakiso")
        );
        assert!(store.get(&FacilityId::Number(99)).is_none());
    }
}
