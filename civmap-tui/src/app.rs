use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use civmap_core::{
    CivmapService, DISPLAY_LIMIT, DistrictSelection, ExportFormat, Facility, FacilityId,
    FacilityType, SUGGESTION_MIN_CHARS, SearchOutcome,
};
use serde_json::Value;
use tracing::{info, warn};

/// Number of neighbours listed on the details screen.
pub(crate) const NEARBY_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Facilities,
    Search,
    Analytics,
    Map,
    Details,
    Export,
    Upload,
}

pub(crate) struct Status {
    pub text: String,
    pub is_error: bool,
    pub at: DateTime<Local>,
}

pub(crate) struct App {
    pub service: CivmapService,
    pub export_dir: PathBuf,

    pub screen: Screen,
    pub return_to: Screen,
    pub table_index: usize,

    pub search_input: String,
    pub suggestions: Vec<FacilityId>,
    pub results: Vec<FacilityId>,
    pub result_index: usize,

    pub detail: Option<FacilityId>,
    pub district_index: usize,
    pub show_heat: bool,
    pub export_index: usize,
    pub upload_input: String,

    pub status: Option<Status>,
}

impl App {
    pub(crate) fn new(mut service: CivmapService, export_dir: PathBuf) -> Self {
        let notices = service.take_notices();
        let mut app = Self {
            service,
            export_dir,
            screen: Screen::Facilities,
            return_to: Screen::Facilities,
            table_index: 0,
            search_input: String::new(),
            suggestions: Vec::new(),
            results: Vec::new(),
            result_index: 0,
            detail: None,
            district_index: 0,
            show_heat: false,
            export_index: 0,
            upload_input: String::new(),
            status: None,
        };
        if !notices.is_empty() {
            app.error(notices.join("; "));
        }
        app
    }

    pub(crate) fn info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: false,
            at: Local::now(),
        });
    }

    pub(crate) fn error(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: true,
            at: Local::now(),
        });
    }

    pub(crate) fn visible(&self) -> Vec<&Facility> {
        self.service.visible_facilities()
    }

    pub(crate) fn clamp_table_index(&mut self) {
        let count = self.visible().len();
        self.table_index = self.table_index.min(count.saturating_sub(1));
    }

    pub(crate) fn current_facility_id(&self) -> Option<FacilityId> {
        self.visible()
            .get(self.table_index)
            .map(|facility| facility.id.clone())
    }

    pub(crate) fn open_details(&mut self, id: FacilityId) {
        if self.screen != Screen::Details {
            self.return_to = self.screen;
        }
        self.detail = Some(id);
        self.screen = Screen::Details;
    }

    pub(crate) fn detail_facility(&self) -> Option<&Facility> {
        self.detail.as_ref().and_then(|id| self.service.facility(id))
    }

    pub(crate) fn toggle_type_at(&mut self, position: usize) {
        if let Some(kind) = FacilityType::CANONICAL_ORDER.get(position) {
            self.service.toggle_type(*kind);
            self.clamp_table_index();
        }
    }

    pub(crate) fn toggle_all_types(&mut self) {
        let enable = !self.service.filter().all_types_enabled();
        self.service.set_all_types(enable);
        self.clamp_table_index();
    }

    pub(crate) fn reset_filters(&mut self) {
        self.service.reset_filters();
        self.district_index = 0;
        self.clamp_table_index();
        self.info("Filters reset");
    }

    /// The list shown under the search box: results once a search ran,
    /// suggestions while typing.
    pub(crate) fn search_list(&self) -> &[FacilityId] {
        if self.results.is_empty() {
            &self.suggestions
        } else {
            &self.results
        }
    }

    pub(crate) fn refresh_suggestions(&mut self) {
        self.results.clear();
        self.result_index = 0;
        let suggested = self.service.suggest(&self.search_input).map(|outcome| {
            (
                matches!(outcome, SearchOutcome::Cleared),
                outcome
                    .facilities()
                    .into_iter()
                    .map(|facility| facility.id.clone())
                    .collect::<Vec<_>>(),
            )
        });
        match suggested {
            Ok((cleared, ids)) => {
                if cleared && self.search_input.trim().chars().count() < SUGGESTION_MIN_CHARS {
                    self.service.set_search_query("");
                }
                self.suggestions = ids;
            }
            Err(err) => self.error(format!("Suggestion failed: {err}")),
        }
    }

    pub(crate) fn run_search(&mut self) {
        self.service.set_search_query(&self.search_input);
        let found = self.service.search().map(|outcome| match outcome {
            SearchOutcome::Cleared => (None, Vec::new()),
            SearchOutcome::Focus(facility) => (Some(facility.id.clone()), Vec::new()),
            SearchOutcome::Ranked(hits) => (
                None,
                hits.iter()
                    .take(DISPLAY_LIMIT)
                    .map(|hit| hit.facility.id.clone())
                    .collect(),
            ),
        });

        self.result_index = 0;
        match found {
            Ok((Some(focus), _)) => {
                self.results = vec![focus.clone()];
                self.open_details(focus);
            }
            Ok((None, ids)) => {
                if ids.is_empty() {
                    self.info(format!("No facilities match \"{}\"", self.search_input.trim()));
                } else {
                    self.info(format!("{} matching facilities", ids.len()));
                }
                self.results = ids;
            }
            Err(err) => self.error(format!("Search failed: {err}")),
        }
    }

    pub(crate) fn toggle_like(&mut self, id: &FacilityId) {
        let outcome = self
            .service
            .toggle_like(id)
            .map(|facility| (facility.name.clone(), facility.likes, facility.liked));
        match outcome {
            Ok((name, likes, true)) => self.info(format!("Liked {name} ({likes} likes)")),
            Ok((name, likes, false)) => self.info(format!("Unliked {name} ({likes} likes)")),
            Err(err) => self.error(format!("Could not save like: {err}")),
        }
    }

    /// Cycle through "all" and every registered district.
    pub(crate) fn cycle_district(&mut self) {
        let names = self.service.districts().names();
        let next = self.district_index + 1;
        self.district_index = if next > names.len() { 0 } else { next };
        let selector = self
            .district_index
            .checked_sub(1)
            .and_then(|position| names.get(position))
            .map_or("all", String::as_str);
        self.apply_district(selector);
    }

    pub(crate) fn clear_district(&mut self) {
        self.district_index = 0;
        self.apply_district("all");
    }

    fn apply_district(&mut self, selector: &str) {
        match self.service.select_district(selector) {
            DistrictSelection::Cleared => self.info("Showing all districts"),
            DistrictSelection::Selected(name) => {
                let stats = self.service.district_stats(&name);
                self.info(format!("{name}: {} facilities", stats.total));
            }
            DistrictSelection::Unknown(name) => self.error(format!("No boundary for {name}")),
        }
        self.clamp_table_index();
    }

    pub(crate) fn selected_export_format(&self) -> ExportFormat {
        ExportFormat::ALL
            .get(self.export_index)
            .copied()
            .unwrap_or(ExportFormat::Csv)
    }

    pub(crate) fn export(&mut self, format: ExportFormat) {
        match self.write_export(format) {
            Ok(path) => self.info(format!("Exported {format} to {}", path.display())),
            Err(err) => {
                warn!(error = %err, %format, "export failed");
                self.error(format!("Export failed: {err:#}"));
            }
        }
    }

    fn write_export(&self, format: ExportFormat) -> Result<PathBuf> {
        let path = self.export_dir.join(format.file_name());
        let document = self.service.export(format)?;
        fs::write(&path, document).with_context(|| format!("cannot write {}", path.display()))?;
        info!(path = %path.display(), %format, "wrote export");
        Ok(path)
    }

    pub(crate) fn upload(&mut self) {
        let location = self.upload_input.trim().to_owned();
        if location.is_empty() {
            self.error("Type the path of a GeoJSON file, then press Enter");
            return;
        }
        match self.register_upload(Path::new(&location)) {
            Ok(names) => {
                self.upload_input.clear();
                self.info(format!("Added boundary: {}", names.join(", ")));
            }
            Err(err) => self.error(format!("Upload failed: {err:#}")),
        }
    }

    fn register_upload(&mut self, path: &Path) -> Result<Vec<String>> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let document: Value = serde_json::from_str(&text).context("file is not valid JSON")?;
        let fallback = path.file_stem().and_then(|stem| stem.to_str());
        let names = self.service.register_boundary(&document, fallback)?;
        info!(path = %path.display(), count = names.len(), "registered uploaded boundary");
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civmap_core::{
        BoundaryFeature, DatasetMeta, FacilityPort, MemoryLikeStore, parse_boundary_collection,
    };
    use civmap_provider_uganda::UgandaFacilityPort;

    const DISTRICTS: &str = include_str!("../../data/central_uganda_districts.geojson");

    async fn app() -> App {
        let facilities = UgandaFacilityPort::new().facilities().await.unwrap();
        let boundaries: Vec<BoundaryFeature> = parse_boundary_collection(DISTRICTS).unwrap();
        let service = CivmapService::from_parts(
            DatasetMeta {
                name: "Test".to_owned(),
                description: String::new(),
            },
            facilities,
            boundaries,
            Box::new(MemoryLikeStore::default()),
        )
        .unwrap();
        App::new(service, std::env::temp_dir())
    }

    #[tokio::test]
    async fn exact_search_opens_details() {
        let mut app = app().await;
        app.search_input = "mengo hospital".to_owned();
        app.run_search();
        assert_eq!(app.screen, Screen::Details);
        assert_eq!(app.detail_facility().map(|facility| facility.name.as_str()), Some("Mengo Hospital"));
    }

    #[tokio::test]
    async fn ranked_search_is_capped() {
        let mut app = app().await;
        app.search_input = "hospital".to_owned();
        app.run_search();
        assert_eq!(app.results.len(), DISPLAY_LIMIT);
        assert_eq!(app.screen, Screen::Facilities);
    }

    #[tokio::test]
    async fn clearing_the_input_forgets_the_search_text() {
        let mut app = app().await;
        app.search_input = "hospital".to_owned();
        app.run_search();
        assert_eq!(app.service.filter().active_filter_count(), 1);

        app.search_input.pop();
        app.refresh_suggestions();
        assert_eq!(app.service.filter().search_query(), "hospital");

        app.search_input.clear();
        app.refresh_suggestions();
        assert_eq!(app.service.filter().search_query(), "");
        assert_eq!(app.service.filter().active_filter_count(), 0);
        assert!(app.suggestions.is_empty());
    }

    #[tokio::test]
    async fn district_cycle_wraps_back_to_all() {
        let mut app = app().await;
        let total = app.visible().len();
        let districts = app.service.districts().len();
        app.cycle_district();
        assert!(app.service.selected_district().is_some());
        assert!(app.visible().len() < total);
        for _ in 0..districts {
            app.cycle_district();
        }
        assert!(app.service.selected_district().is_none());
        assert_eq!(app.visible().len(), total);
    }

    #[tokio::test]
    async fn liking_reports_status() {
        let mut app = app().await;
        app.toggle_like(&FacilityId::Number(7));
        let status = app.status.as_ref().unwrap();
        assert!(!status.is_error);
        assert!(status.text.starts_with("Liked Lubaga Hospital"), "{}", status.text);
    }
}
