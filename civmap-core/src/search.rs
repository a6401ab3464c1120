//! Relevance ranking for the search box and its live suggestions.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

use crate::model::Facility;
use crate::ports::CivmapError;

/// Number of hits a results panel shows.
pub const DISPLAY_LIMIT: usize = 5;

/// Minimum input length before suggestions are computed.
pub const SUGGESTION_MIN_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
/// A ranked facility together with the spans of its name that matched.
pub struct SearchHit<'a> {
    /// Matched facility.
    pub facility: &'a Facility,
    /// Additive relevance score, always positive.
    pub score: u32,
    /// Byte ranges of case-insensitive query occurrences in the name.
    pub highlights: Vec<Range<usize>>,
}

#[derive(Debug, Clone, PartialEq)]
/// Result of running a query.
pub enum SearchOutcome<'a> {
    /// The query was empty (or too short for suggestions); results are cleared.
    Cleared,
    /// A single exact match the view should focus directly.
    Focus(&'a Facility),
    /// Scored matches, best first.
    Ranked(Vec<SearchHit<'a>>),
}

impl<'a> SearchOutcome<'a> {
    /// Facilities of the outcome in display order.
    #[must_use]
    pub fn facilities(&self) -> Vec<&'a Facility> {
        match self {
            SearchOutcome::Cleared => Vec::new(),
            SearchOutcome::Focus(facility) => vec![*facility],
            SearchOutcome::Ranked(hits) => hits.iter().map(|hit| hit.facility).collect(),
        }
    }

    /// Whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            SearchOutcome::Cleared => true,
            SearchOutcome::Focus(_) => false,
            SearchOutcome::Ranked(hits) => hits.is_empty(),
        }
    }
}

/// Word characters for boundary checks: ASCII letters, digits and `_`.
fn is_word_char(character: Option<char>) -> bool {
    character.is_some_and(|character| character.is_ascii_alphanumeric() || character == '_')
}

/// Whether a word boundary sits at byte `index` of `text`.
fn at_word_boundary(text: &str, index: usize) -> bool {
    let before = text.get(..index).and_then(|head| head.chars().next_back());
    let after = text.get(index..).and_then(|tail| tail.chars().next());
    is_word_char(before) != is_word_char(after)
}

/// Whether `needle` occurs in `text` starting on a word boundary, and also
/// ending on one when `whole_word` is set.
fn matches_on_boundary(text: &str, needle: &str, whole_word: bool) -> bool {
    text.char_indices().any(|(start, _)| {
        text.get(start..).is_some_and(|tail| tail.starts_with(needle))
            && at_word_boundary(text, start)
            && (!whole_word || at_word_boundary(text, start + needle.len()))
    })
}

/// Lowercased query plus the pattern used to highlight it.
struct QueryMatcher {
    needle: String,
    highlight: Regex,
}

impl QueryMatcher {
    fn new(query: &str) -> Result<Self, CivmapError> {
        let needle = query.trim().to_lowercase();
        Ok(Self {
            highlight: RegexBuilder::new(&regex::escape(&needle))
                .case_insensitive(true)
                .build()?,
            needle,
        })
    }

    fn highlights(&self, name: &str) -> Vec<Range<usize>> {
        self.highlight
            .find_iter(name)
            .map(|found| found.range())
            .collect()
    }

    /// Score used by the full search.
    fn search_score(&self, facility: &Facility) -> u32 {
        let name = facility.name.to_lowercase();
        let kind = facility.kind.label().to_lowercase();
        let needle = self.needle.as_str();

        let mut score = 0;
        if name == needle {
            score += 100;
        }
        if name.starts_with(needle) {
            score += 80;
        }
        if kind == needle {
            score += 70;
        }
        if matches_on_boundary(&name, needle, true) {
            score += 60;
        }
        if name.contains(needle) {
            score += 40;
        }
        if kind.starts_with(needle) {
            score += 20;
        }
        score
    }

    /// Score used by live suggestions, weighted toward prefixes.
    fn suggestion_score(&self, facility: &Facility) -> u32 {
        let name = facility.name.to_lowercase();
        let kind = facility.kind.label().to_lowercase();
        let needle = self.needle.as_str();

        let mut score = 0;
        if name.starts_with(needle) {
            score += 100;
        }
        if kind.starts_with(needle) {
            score += 80;
        }
        if matches_on_boundary(&name, needle, false) {
            score += 60;
        }
        if matches_on_boundary(&kind, needle, false) {
            score += 40;
        }
        if name.contains(needle) {
            score += 20;
        }
        if kind.contains(needle) {
            score += 10;
        }
        score
    }

    fn rank<'a>(
        &self,
        facilities: &'a [Facility],
        score: impl Fn(&Self, &Facility) -> u32,
    ) -> Vec<SearchHit<'a>> {
        let mut hits: Vec<SearchHit<'a>> = facilities
            .iter()
            .filter_map(|facility| {
                let points = score(self, facility);
                (points > 0).then(|| SearchHit {
                    facility,
                    score: points,
                    highlights: self.highlights(&facility.name),
                })
            })
            .collect();
        // `sort_by` is stable, so ties keep store order.
        hits.sort_by(|left, right| right.score.cmp(&left.score));
        hits
    }
}

/// Run the full search used by the search button and Enter key.
///
/// An exact case-insensitive name match short-circuits scoring and becomes
/// the single result.
///
/// # Errors
///
/// Returns [`CivmapError::Pattern`] if the query cannot be turned into a
/// matching pattern.
pub fn search<'a>(query: &str, facilities: &'a [Facility]) -> Result<SearchOutcome<'a>, CivmapError> {
    if query.trim().is_empty() {
        return Ok(SearchOutcome::Cleared);
    }
    let matcher = QueryMatcher::new(query)?;

    if let Some(exact) = facilities
        .iter()
        .find(|facility| facility.name.to_lowercase() == matcher.needle)
    {
        return Ok(SearchOutcome::Focus(exact));
    }

    Ok(SearchOutcome::Ranked(
        matcher.rank(facilities, QueryMatcher::search_score),
    ))
}

/// Compute up to [`DISPLAY_LIMIT`] live suggestions for partial input.
///
/// Input shorter than [`SUGGESTION_MIN_CHARS`] clears the suggestions. When
/// exactly one facility matches the input exactly by name or type, it is
/// returned as [`SearchOutcome::Focus`].
///
/// # Errors
///
/// Returns [`CivmapError::Pattern`] if the query cannot be turned into a
/// matching pattern.
pub fn suggest<'a>(query: &str, facilities: &'a [Facility]) -> Result<SearchOutcome<'a>, CivmapError> {
    if query.trim().chars().count() < SUGGESTION_MIN_CHARS {
        return Ok(SearchOutcome::Cleared);
    }
    let matcher = QueryMatcher::new(query)?;

    let mut exact = facilities.iter().filter(|facility| {
        facility.name.to_lowercase() == matcher.needle
            || facility.kind.label().to_lowercase() == matcher.needle
    });
    if let (Some(only), None) = (exact.next(), exact.next()) {
        return Ok(SearchOutcome::Focus(only));
    }

    let mut hits = matcher.rank(facilities, QueryMatcher::suggestion_score);
    hits.truncate(DISPLAY_LIMIT);
    Ok(SearchOutcome::Ranked(hits))
}

/// Score of a facility under the full-search table, exposed for callers that
/// need to explain a ranking.
///
/// # Errors
///
/// Returns [`CivmapError::Pattern`] if the query cannot be turned into a
/// matching pattern.
pub fn search_score(query: &str, facility: &Facility) -> Result<u32, CivmapError> {
    if query.trim().is_empty() {
        return Ok(0);
    }
    Ok(QueryMatcher::new(query)?.search_score(facility))
}
