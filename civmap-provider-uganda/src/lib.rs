//! Provider serving the bundled central Uganda facility dataset.

use async_trait::async_trait;
use tracing::debug;

use civmap_core::{
    model::Facility,
    ports::{CivmapError, DatasetMeta, FacilityPort},
};

const FACILITIES_JSON: &str = include_str!("../data/central_uganda_facilities.json");

/// Facility port backed by the records compiled into the binary.
pub struct UgandaFacilityPort {
    meta: DatasetMeta,
}

impl UgandaFacilityPort {
    /// Create a port over the bundled dataset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            meta: dataset_meta(),
        }
    }
}

impl Default for UgandaFacilityPort {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FacilityPort for UgandaFacilityPort {
    fn dataset(&self) -> &DatasetMeta {
        &self.meta
    }

    async fn facilities(&self) -> Result<Vec<Facility>, CivmapError> {
        let facilities: Vec<Facility> = serde_json::from_str(FACILITIES_JSON)?;
        debug!(count = facilities.len(), "loaded bundled facilities");
        Ok(facilities)
    }
}

/// Title and description used for the dashboard header and KML export.
#[must_use]
pub fn dataset_meta() -> DatasetMeta {
    DatasetMeta {
        name: String::from("Central Uganda Community Resources"),
        description: String::from(
            "GIS mapping of healthcare, education, and public safety facilities",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civmap_core::{FacilityId, FacilityStore, FacilityType, stats};

    async fn bundled() -> Vec<Facility> {
        UgandaFacilityPort::new().facilities().await.unwrap()
    }

    #[tokio::test]
    async fn bundled_records_pass_store_validation() {
        let store = FacilityStore::new(bundled().await).unwrap();
        assert!(store.len() >= 30, "only {} facilities", store.len());
        let mengo = store.get(&FacilityId::Number(2)).unwrap();
        assert_eq!(mengo.name, "Mengo Hospital");
        assert_eq!(mengo.district, "Kampala");
    }

    #[tokio::test]
    async fn bundled_records_cover_central_region() {
        let facilities = bundled().await;
        for facility in &facilities {
            assert!(
                (-0.5..=1.5).contains(&facility.coordinates.lat)
                    && (31.5..=33.5).contains(&facility.coordinates.lon),
                "{} lies outside central Uganda",
                facility.name
            );
        }
        let types: Vec<FacilityType> = stats::count_by_type(&facilities)
            .into_iter()
            .map(|(kind, _)| kind)
            .collect();
        assert_eq!(types, FacilityType::CANONICAL_ORDER);
    }

    #[test]
    fn dataset_meta_names_the_region() {
        let port = UgandaFacilityPort::default();
        assert_eq!(port.dataset().name, "Central Uganda Community Resources");
    }
}
