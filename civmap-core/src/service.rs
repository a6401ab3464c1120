//! Dashboard state and the operations the views drive.

use std::mem;

use serde_json::Value;
use tracing::{info, warn};

use crate::districts::{BoundaryFeature, DistrictRegistry, parse_upload};
use crate::export::{ExportFormat, export};
use crate::filter::{DistrictFilter, FilterState};
use crate::likes::{self, LikeLedger};
use crate::map::{Bounds, HeatPoint, MapSettings, Nearby, heat_points, nearest};
use crate::model::{Coordinates, Facility, FacilityId, FacilityType};
use crate::ports::{BoundaryPort, CivmapError, DatasetMeta, FacilityPort, LikeStore};
use crate::search::{self, SearchOutcome};
use crate::stats::{self, ComparisonMatrix, DistrictStats, Summary};
use crate::store::FacilityStore;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of selecting a district on the map or in the filter panel.
pub enum DistrictSelection {
    /// Selection cleared, every district visible.
    Cleared,
    /// The named boundary is selected.
    Selected(String),
    /// No boundary with that name; nothing changed.
    Unknown(String),
}

/// Public entry point owning the facility store, filters, boundaries, and likes.
pub struct CivmapService {
    dataset: DatasetMeta,
    store: FacilityStore,
    filter: FilterState,
    districts: DistrictRegistry,
    like_store: Box<dyn LikeStore>,
    map: MapSettings,
    notices: Vec<String>,
}

impl CivmapService {
    /// Load facilities and boundaries from their ports and overlay persisted likes.
    ///
    /// Boundary and like-state failures are logged and kept as notices; the
    /// dashboard still starts.
    ///
    /// # Errors
    ///
    /// Returns a [`CivmapError`] if the facility port fails or its records are invalid.
    pub async fn load(
        facilities: &dyn FacilityPort,
        boundaries: &dyn BoundaryPort,
        like_store: Box<dyn LikeStore>,
    ) -> Result<Self, CivmapError> {
        let records = facilities.facilities().await?;
        let mut notices = Vec::new();
        let features = match boundaries.boundaries().await {
            Ok(features) => features,
            Err(err) => {
                warn!(location = boundaries.location(), error = %err, "district boundaries unavailable");
                notices.push(format!("District boundaries unavailable: {err}"));
                Vec::new()
            }
        };
        let mut service = Self::from_parts(facilities.dataset().clone(), records, features, like_store)?;
        service.notices.extend(notices);
        Ok(service)
    }

    /// Build the service from already loaded records.
    ///
    /// # Errors
    ///
    /// Returns a [`CivmapError`] if the records violate a store invariant.
    pub fn from_parts(
        dataset: DatasetMeta,
        facilities: Vec<Facility>,
        boundaries: Vec<BoundaryFeature>,
        like_store: Box<dyn LikeStore>,
    ) -> Result<Self, CivmapError> {
        let mut store = FacilityStore::new(facilities)?;
        let mut notices = Vec::new();
        let ledger = like_store.load().unwrap_or_else(|err| {
            warn!(error = %err, "like state unreadable, starting empty");
            notices.push(format!("Like state unreadable: {err}"));
            LikeLedger::default()
        });
        ledger.apply(store.iter_mut());
        let districts = DistrictRegistry::new(boundaries);
        info!(
            facilities = store.len(),
            districts = districts.len(),
            "dashboard state loaded"
        );
        Ok(Self {
            dataset,
            store,
            filter: FilterState::default(),
            districts,
            like_store,
            map: MapSettings::default(),
            notices,
        })
    }

    /// Dataset title and description.
    #[must_use]
    pub fn dataset(&self) -> &DatasetMeta {
        &self.dataset
    }

    /// Initial map viewport.
    #[must_use]
    pub fn map_settings(&self) -> &MapSettings {
        &self.map
    }

    /// Drain the non-fatal problems collected while loading.
    pub fn take_notices(&mut self) -> Vec<String> {
        mem::take(&mut self.notices)
    }

    /// Every facility in store order.
    #[must_use]
    pub fn facilities(&self) -> &[Facility] {
        self.store.all()
    }

    /// Look up a single facility.
    #[must_use]
    pub fn facility(&self, id: &FacilityId) -> Option<&Facility> {
        self.store.get(id)
    }

    /// Current filter panel state.
    #[must_use]
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Facilities admitted by the type and district filters.
    #[must_use]
    pub fn visible_facilities(&self) -> Vec<&Facility> {
        self.filter.apply(self.store.all())
    }

    /// Enable or disable one facility type.
    pub fn toggle_type(&mut self, kind: FacilityType) {
        self.filter.toggle_type(kind);
    }

    /// Enable or disable every facility type at once.
    pub fn set_all_types(&mut self, enabled: bool) {
        self.filter.set_all_types(enabled);
    }

    /// Restore the default filters and clear the district selection.
    pub fn reset_filters(&mut self) {
        self.filter = FilterState::default();
    }

    /// Remember the search text; an empty query clears it.
    pub fn set_search_query(&mut self, query: &str) {
        if query.trim().is_empty() {
            self.filter.clear_search_query();
        } else {
            self.filter.set_search_query(query);
        }
    }

    /// Rank every facility against the remembered search text.
    ///
    /// # Errors
    ///
    /// Returns [`CivmapError::Pattern`] if the query cannot be compiled.
    pub fn search(&self) -> Result<SearchOutcome<'_>, CivmapError> {
        search::search(self.filter.search_query(), self.store.all())
    }

    /// Type-ahead suggestions for partially typed input.
    ///
    /// # Errors
    ///
    /// Returns [`CivmapError::Pattern`] if the input cannot be compiled.
    pub fn suggest(&self, input: &str) -> Result<SearchOutcome<'_>, CivmapError> {
        search::suggest(input, self.store.all())
    }

    /// Flip the like of a facility and persist both like maps.
    ///
    /// # Errors
    ///
    /// Returns [`CivmapError::UnknownFacility`] for an unknown id, or the store
    /// error if the ledger cannot be written; the facility is then unchanged.
    pub fn toggle_like(&mut self, id: &FacilityId) -> Result<&Facility, CivmapError> {
        let mut toggled = self
            .store
            .get(id)
            .ok_or_else(|| CivmapError::UnknownFacility(id.clone()))?
            .clone();
        likes::toggle(&mut toggled);

        let mut ledger = self.like_store.load().unwrap_or_else(|err| {
            warn!(error = %err, "like state unreadable, overwriting");
            LikeLedger::default()
        });
        ledger.record(&toggled);
        self.like_store.save(&ledger)?;

        let facility = self
            .store
            .get_mut(id)
            .ok_or_else(|| CivmapError::UnknownFacility(id.clone()))?;
        facility.likes = toggled.likes;
        facility.liked = toggled.liked;
        Ok(facility)
    }

    /// Registered district boundaries.
    #[must_use]
    pub fn districts(&self) -> &DistrictRegistry {
        &self.districts
    }

    /// Select a district by name; `"all"` or an empty name clears the selection.
    pub fn select_district(&mut self, name: &str) -> DistrictSelection {
        match DistrictFilter::from_selector(name) {
            DistrictFilter::All => {
                self.filter.set_district(DistrictFilter::All);
                DistrictSelection::Cleared
            }
            DistrictFilter::Named(requested) => match self.districts.resolve(&requested) {
                Some(feature) => {
                    let name = feature.name.clone();
                    self.filter.set_district(DistrictFilter::Named(name.clone()));
                    DistrictSelection::Selected(name)
                }
                None => {
                    warn!(district = %requested, "no boundary for district");
                    DistrictSelection::Unknown(requested)
                }
            },
        }
    }

    /// Boundary of the currently selected district.
    #[must_use]
    pub fn selected_district(&self) -> Option<&BoundaryFeature> {
        match self.filter.district() {
            DistrictFilter::All => None,
            DistrictFilter::Named(name) => self.districts.resolve(name),
        }
    }

    /// Register boundaries from an uploaded GeoJSON document, returning their names.
    ///
    /// # Errors
    ///
    /// Returns [`CivmapError::UnsupportedGeoJson`] for documents that hold no
    /// polygons, or [`CivmapError::InvalidGeoJson`] when nothing could be named.
    pub fn register_boundary(
        &mut self,
        document: &Value,
        fallback_name: Option<&str>,
    ) -> Result<Vec<String>, CivmapError> {
        let features = parse_upload(document, fallback_name)?;
        if features.is_empty() {
            return Err(CivmapError::InvalidGeoJson(
                "no named boundary in upload".to_owned(),
            ));
        }
        let names = features
            .into_iter()
            .map(|feature| {
                let name = feature.name.clone();
                if self.districts.register(feature).is_some() {
                    info!(district = %name, "replaced uploaded boundary");
                }
                name
            })
            .collect();
        Ok(names)
    }

    /// Summary cards over every facility.
    #[must_use]
    pub fn summary(&self) -> Summary {
        stats::summary(self.store.all())
    }

    /// Facility count per type in canonical order.
    #[must_use]
    pub fn count_by_type(&self) -> Vec<(FacilityType, usize)> {
        stats::count_by_type(self.store.all())
    }

    /// Facility count per district in first-seen order.
    #[must_use]
    pub fn count_by_district(&self) -> Vec<(String, usize)> {
        stats::count_by_district(self.store.all())
    }

    /// Type × district comparison.
    #[must_use]
    pub fn comparison(&self) -> ComparisonMatrix {
        stats::comparison_matrix(self.store.all())
    }

    /// Totals for one district.
    #[must_use]
    pub fn district_stats(&self, district: &str) -> DistrictStats {
        stats::district_stats(self.store.all(), district)
    }

    /// Export every facility.
    ///
    /// # Errors
    ///
    /// Returns [`CivmapError::Json`] if the GeoJSON document cannot be produced.
    pub fn export(&self, format: ExportFormat) -> Result<String, CivmapError> {
        export(format, &self.dataset, self.store.all())
    }

    /// Heatmap samples of the visible facilities.
    #[must_use]
    pub fn heat_points(&self) -> Vec<HeatPoint> {
        heat_points(self.visible_facilities())
    }

    /// The `count` facilities nearest to `origin`, excluding one at exactly that spot.
    #[must_use]
    pub fn nearest(&self, origin: &Coordinates, count: usize) -> Vec<Nearby<'_>> {
        nearest(
            origin,
            self.store
                .all()
                .iter()
                .filter(|facility| facility.coordinates != *origin),
            count,
        )
    }

    /// Box around the visible facilities, or the selected district when one is set.
    #[must_use]
    pub fn visible_bounds(&self) -> Option<Bounds> {
        self.selected_district()
            .and_then(BoundaryFeature::bounds)
            .or_else(|| {
                Bounds::around(
                    self.visible_facilities()
                        .into_iter()
                        .map(|facility| &facility.coordinates),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::likes::MemoryLikeStore;
    use crate::testing::{facility, rated};
    use serde_json::json;
    use std::io;

    /// Reads an empty ledger and refuses every write.
    struct ReadOnlyLikeStore;

    impl LikeStore for ReadOnlyLikeStore {
        fn load(&self) -> Result<LikeLedger, CivmapError> {
            Ok(LikeLedger::default())
        }

        fn save(&self, _ledger: &LikeLedger) -> Result<(), CivmapError> {
            Err(CivmapError::Io(io::Error::other("disk full")))
        }
    }

    fn square(name: &str, lat: f64, lon: f64) -> BoundaryFeature {
        let properties = serde_json::Map::new();
        let geometry = json!({
            "type": "Polygon",
            "coordinates": [[[lon, lat], [lon + 0.1, lat], [lon + 0.1, lat + 0.1], [lon, lat + 0.1], [lon, lat]]],
        });
        BoundaryFeature::new(name, properties, geometry)
    }

    fn service() -> CivmapService {
        let facilities = vec![
            rated(1, "Mulago National Referral Hospital", "Hospital", "Kampala", 4.5),
            facility(2, "Kawempe Health Centre IV", "Health Center", "Kampala"),
            facility(3, "Gayaza High School", "School", "Wakiso"),
            facility(7, "Mukono Central Police Station", "Police Station", "Mukono"),
        ];
        CivmapService::from_parts(
            DatasetMeta {
                name: "Test".to_owned(),
                description: "fixtures".to_owned(),
            },
            facilities,
            vec![square("Kampala", 0.25, 32.5), square("Wakiso", 0.35, 32.4)],
            Box::new(MemoryLikeStore::default()),
        )
        .unwrap()
    }

    #[test]
    fn selecting_districts_restricts_visibility() {
        let mut service = service();
        assert_eq!(
            service.select_district("KAMPALA"),
            DistrictSelection::Selected("Kampala".to_owned())
        );
        assert_eq!(service.visible_facilities().len(), 2);
        assert_eq!(service.selected_district().map(|feature| feature.name.as_str()), Some("Kampala"));

        assert_eq!(
            service.select_district("Mbarara"),
            DistrictSelection::Unknown("Mbarara".to_owned())
        );
        assert_eq!(service.visible_facilities().len(), 2);

        assert_eq!(service.select_district("all"), DistrictSelection::Cleared);
        assert_eq!(service.visible_facilities().len(), 4);
        assert!(service.selected_district().is_none());
    }

    #[test]
    fn toggling_like_persists_both_maps() {
        let mut service = service();
        let id = FacilityId::Number(7);
        let liked = service.toggle_like(&id).unwrap();
        assert_eq!((liked.likes, liked.liked), (1, true));

        let ledger = service.like_store.load().unwrap();
        assert_eq!(ledger.counts.get("7"), Some(&1));
        assert_eq!(ledger.liked.get("7"), Some(&true));

        let unliked = service.toggle_like(&id).unwrap();
        assert_eq!((unliked.likes, unliked.liked), (0, false));
        assert!(matches!(
            service.toggle_like(&FacilityId::Number(99)),
            Err(CivmapError::UnknownFacility(_))
        ));
    }

    #[test]
    fn failed_like_write_leaves_facility_unchanged() {
        let mut service = service();
        service.like_store = Box::new(ReadOnlyLikeStore);
        let id = FacilityId::Number(1);

        assert!(matches!(service.toggle_like(&id), Err(CivmapError::Io(_))));
        let record = service.facility(&id).unwrap();
        assert_eq!((record.likes, record.liked), (0, false));
    }

    #[test]
    fn persisted_likes_are_applied_on_load() {
        let mut ledger = LikeLedger::default();
        ledger.counts.insert("3".to_owned(), 11);
        ledger.liked.insert("3".to_owned(), true);
        let service = CivmapService::from_parts(
            DatasetMeta {
                name: "Test".to_owned(),
                description: String::new(),
            },
            vec![facility(3, "Gayaza High School", "School", "Wakiso")],
            Vec::new(),
            Box::new(MemoryLikeStore::with_ledger(ledger)),
        )
        .unwrap();
        let record = service.facility(&FacilityId::Number(3)).unwrap();
        assert_eq!((record.likes, record.liked), (11, true));
    }

    #[test]
    fn search_query_is_remembered_and_cleared() {
        let mut service = service();
        service.set_search_query("  police ");
        assert_eq!(service.filter().search_query(), "police");
        assert_eq!(service.search().unwrap().facilities().len(), 1);
        service.set_search_query("");
        assert_eq!(service.search().unwrap(), SearchOutcome::Cleared);
    }

    #[test]
    fn uploads_replace_same_key() {
        let mut service = service();
        let upload = json!({
            "type": "Feature",
            "properties": {"NAME": "kampala"},
            "geometry": {"type": "Polygon", "coordinates": [[[32.0, 0.0], [32.2, 0.0], [32.2, 0.2], [32.0, 0.0]]]},
        });
        assert_eq!(service.register_boundary(&upload, None).unwrap(), ["kampala"]);
        assert_eq!(service.districts().len(), 2);
        assert!(matches!(
            service.register_boundary(&json!({"type": "Point", "coordinates": [32.0, 0.0]}), None),
            Err(CivmapError::UnsupportedGeoJson(_))
        ));
    }

    #[test]
    fn bounds_follow_selected_district() {
        let mut service = service();
        service.select_district("Wakiso");
        let bounds = service.visible_bounds().unwrap();
        assert!(bounds.contains(&Coordinates::new(0.4, 32.45)));
        assert!(!bounds.contains(&Coordinates::new(0.3, 32.6)));
    }

    #[test]
    fn type_filter_hides_heat_points() {
        let mut service = service();
        service.toggle_type(FacilityType::Hospital);
        assert_eq!(service.heat_points().len(), 3);
        service.reset_filters();
        assert_eq!(service.heat_points().len(), 4);
    }
}
