//! Ordering properties of the ranked search over generated stores.

use civmap_core::{
    Coordinates, Facility, FacilityId, FacilityType, SearchOutcome, search, search_score, suggest,
};
use proptest::prelude::*;

const WORDS: [&str; 10] = [
    "Mulago", "Hospital", "Kampala", "Clinic", "Health", "Centre", "Police", "School", "Mengo",
    "Nsambya",
];

fn arb_name() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS.to_vec()), 1..4).prop_map(|words| words.join(" "))
}

fn arb_kind() -> impl Strategy<Value = FacilityType> {
    prop::sample::select(FacilityType::CANONICAL_ORDER.to_vec())
}

fn arb_store() -> impl Strategy<Value = Vec<Facility>> {
    prop::collection::vec((arb_name(), arb_kind()), 0..12).prop_map(|entries| {
        entries
            .into_iter()
            .zip(1_u32..)
            .map(|((name, kind), id)| Facility {
                id: FacilityId::Number(id),
                name,
                kind,
                district: "Kampala".to_owned(),
                coordinates: Coordinates::new(0.3476, 32.5825),
                contact: String::new(),
                email: None,
                address: String::new(),
                services: Vec::new(),
                opening_hours: None,
                rating: None,
                likes: 0,
                liked: false,
            })
            .collect()
    })
}

fn arb_query() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(WORDS.to_vec()).prop_map(str::to_lowercase),
        prop::sample::select(WORDS.to_vec()).prop_map(str::to_uppercase),
        "[a-z]{1,4}",
        "[a-z.+(]{1,3}",
    ]
}

fn position(store: &[Facility], facility: &Facility) -> usize {
    store
        .iter()
        .position(|candidate| candidate.id == facility.id)
        .unwrap_or(usize::MAX)
}

proptest! {
    #[test]
    fn ranked_hits_are_positive_descending_and_stable(store in arb_store(), query in arb_query()) {
        match search(&query, &store).unwrap() {
            SearchOutcome::Cleared => prop_assert!(query.trim().is_empty()),
            SearchOutcome::Focus(facility) => {
                prop_assert_eq!(facility.name.to_lowercase(), query.trim().to_lowercase());
            }
            SearchOutcome::Ranked(hits) => {
                for hit in &hits {
                    prop_assert!(hit.score > 0);
                    prop_assert_eq!(hit.score, search_score(&query, hit.facility).unwrap());
                }
                for pair in hits.windows(2) {
                    if let [first, second] = pair {
                        prop_assert!(first.score >= second.score);
                        if first.score == second.score {
                            prop_assert!(position(&store, first.facility) < position(&store, second.facility));
                        }
                    }
                }
                let ranked = hits.len();
                let positive = store
                    .iter()
                    .filter(|facility| search_score(&query, facility).unwrap() > 0)
                    .count();
                prop_assert_eq!(ranked, positive);
            }
        }
    }

    #[test]
    fn suggestions_never_exceed_display_limit(store in arb_store(), query in arb_query()) {
        let outcome = suggest(&query, &store).unwrap();
        prop_assert!(outcome.facilities().len() <= civmap_core::DISPLAY_LIMIT);
    }

    #[test]
    fn highlights_point_at_query_text(store in arb_store(), query in arb_query()) {
        if let SearchOutcome::Ranked(hits) = search(&query, &store).unwrap() {
            let needle = query.trim().to_lowercase();
            for hit in hits {
                for range in hit.highlights {
                    let matched = hit.facility.name.get(range).map(str::to_lowercase);
                    prop_assert_eq!(matched.as_deref(), Some(needle.as_str()));
                }
            }
        }
    }
}
