//! Core types and service wiring for the central Uganda civic facility dashboard.

/// District boundary parsing and name resolution.
pub mod districts;
/// CSV, GeoJSON, and KML export of the facility store.
pub mod export;
/// Filter panel state.
pub mod filter;
/// Like counts, liked flags, and their persistence.
pub mod likes;
/// Marker styling, heatmap weights, bounds, and distances.
pub mod map;
/// Domain models and identifiers shared by all crates.
pub mod model;
/// Traits describing data sources and the shared error type.
pub mod ports;
/// Ranked search and type-ahead suggestions.
pub mod search;
/// High-level service facade used by clients.
pub mod service;
/// Aggregations behind the analytics charts.
pub mod stats;
/// Validated, id-indexed facility collection.
pub mod store;

#[cfg(test)]
mod testing;

pub use districts::*;
pub use export::*;
pub use filter::*;
pub use likes::*;
pub use map::*;
pub use model::*;
pub use ports::*;
pub use search::*;
pub use service::*;
pub use stats::*;
pub use store::*;
