//! Category, district, and search-text filters driven by the user.

use std::collections::BTreeSet;

use crate::model::{Facility, FacilityType};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// District restriction of the filter state.
pub enum DistrictFilter {
    /// Every district is visible.
    #[default]
    All,
    /// Only facilities in the named district are visible.
    Named(String),
}

impl DistrictFilter {
    /// Parse a selector value; empty input and `"all"` mean every district.
    #[must_use]
    pub fn from_selector(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            DistrictFilter::All
        } else {
            DistrictFilter::Named(trimmed.to_owned())
        }
    }

    fn admits(&self, facility: &Facility) -> bool {
        match self {
            DistrictFilter::All => true,
            DistrictFilter::Named(name) => facility.district.trim().eq_ignore_ascii_case(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What the user currently has selected in the filter panel.
pub struct FilterState {
    types: BTreeSet<FacilityType>,
    district: DistrictFilter,
    search_query: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            types: FacilityType::CANONICAL_ORDER.into_iter().collect(),
            district: DistrictFilter::All,
            search_query: String::new(),
        }
    }
}

impl FilterState {
    /// Whether a type is enabled.
    #[must_use]
    pub fn is_type_enabled(&self, kind: FacilityType) -> bool {
        self.types.contains(&kind)
    }

    /// Flip a single type checkbox.
    pub fn toggle_type(&mut self, kind: FacilityType) {
        if !self.types.remove(&kind) {
            self.types.insert(kind);
        }
    }

    /// The "select all" checkbox.
    pub fn set_all_types(&mut self, enabled: bool) {
        if enabled {
            self.types = FacilityType::CANONICAL_ORDER.into_iter().collect();
        } else {
            self.types.clear();
        }
    }

    /// Whether every type is enabled.
    #[must_use]
    pub fn all_types_enabled(&self) -> bool {
        self.types.len() == FacilityType::CANONICAL_ORDER.len()
    }

    /// Current district restriction.
    #[must_use]
    pub fn district(&self) -> &DistrictFilter {
        &self.district
    }

    /// Replace the district restriction.
    pub fn set_district(&mut self, district: DistrictFilter) {
        self.district = district;
    }

    /// Current search text.
    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Record the search text.
    pub fn set_search_query(&mut self, query: &str) {
        query.trim().clone_into(&mut self.search_query);
    }

    /// Forget the search text.
    pub fn clear_search_query(&mut self) {
        self.search_query.clear();
    }

    /// Number of filters narrowing the view: types, district, search text.
    #[must_use]
    pub fn active_filter_count(&self) -> usize {
        [
            !self.all_types_enabled(),
            self.district != DistrictFilter::All,
            !self.search_query.is_empty(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// Whether a facility passes the type and district filters.
    #[must_use]
    pub fn admits(&self, facility: &Facility) -> bool {
        self.types.contains(&facility.kind) && self.district.admits(facility)
    }

    /// Facilities passing the filters, in store order.
    #[must_use]
    pub fn apply<'a>(&self, facilities: &'a [Facility]) -> Vec<&'a Facility> {
        facilities
            .iter()
            .filter(|facility| self.admits(facility))
            .collect()
    }
}
