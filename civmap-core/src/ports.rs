//! Traits describing data sources and the shared error type.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::districts::BoundaryFeature;
use crate::likes::LikeLedger;
use crate::model::{Facility, FacilityId};

#[derive(thiserror::Error, Debug)]
/// Errors raised by civmap data sources and operations.
pub enum CivmapError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Reading or writing a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON could not be parsed or produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A search pattern could not be compiled.
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
    /// Boundary data is structurally invalid.
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),
    /// GeoJSON object type cannot be used as a boundary.
    #[error("Unsupported GeoJSON structure: {0}")]
    UnsupportedGeoJson(String),
    /// No facility with the given id exists.
    #[error("Unknown facility: {0}")]
    UnknownFacility(FacilityId),
    /// A facility record violates a store invariant.
    #[error("Invalid facility: {0}")]
    InvalidFacility(String),
    /// Two facilities share the same id.
    #[error("Duplicate facility id: {0}")]
    DuplicateFacility(FacilityId),
    /// An export format name is not recognised.
    #[error("Unknown export format: {0}")]
    UnknownExportFormat(String),
    /// A facility type label is not recognised.
    #[error("Unknown facility type: {0}")]
    UnknownFacilityType(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Metadata describing a facility dataset.
pub struct DatasetMeta {
    /// Short title, used as export document name.
    pub name: String,
    /// One-line description of the dataset.
    pub description: String,
}

#[async_trait]
/// Source of the facility store.
pub trait FacilityPort: Send + Sync {
    /// Metadata describing the dataset served by this port.
    fn dataset(&self) -> &DatasetMeta;

    /// Load all facility records.
    ///
    /// # Errors
    ///
    /// Returns a [`CivmapError`] when the records cannot be produced.
    async fn facilities(&self) -> Result<Vec<Facility>, CivmapError>;
}

#[async_trait]
/// Source of district boundary polygons.
pub trait BoundaryPort: Send + Sync {
    /// Human-readable location of the boundary data (path or URL).
    fn location(&self) -> &str;

    /// Fetch and normalize the named boundary features.
    ///
    /// # Errors
    ///
    /// Returns a [`CivmapError`] when the fetch fails or the document is not
    /// a usable GeoJSON feature collection.
    async fn boundaries(&self) -> Result<Vec<BoundaryFeature>, CivmapError>;
}

/// Key-value persistence for like counts and liked flags.
pub trait LikeStore: Send + Sync {
    /// Read the persisted ledger.
    ///
    /// # Errors
    ///
    /// Returns a [`CivmapError`] when stored state exists but cannot be read.
    fn load(&self) -> Result<LikeLedger, CivmapError>;

    /// Replace the persisted ledger.
    ///
    /// # Errors
    ///
    /// Returns a [`CivmapError`] when the state cannot be written.
    fn save(&self, ledger: &LikeLedger) -> Result<(), CivmapError>;
}
