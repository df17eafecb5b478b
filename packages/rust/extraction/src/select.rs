//! Entity selection against a predicate profile.

use std::collections::HashSet;

use besluitpub_rdf::{Triple, expand_uri};

use crate::profiles::Profile;

/// Select every triple belonging to an entity of the profile's type whose
/// predicate is whitelisted.
///
/// Candidates are the subjects of `(s, rdf:type, profile.type_iri)` triples.
/// Input order is preserved; triples on candidate subjects with predicates
/// outside the profile are dropped.
pub fn select_entities(triples: &[Triple], profile: &Profile) -> Vec<Triple> {
    let candidates: HashSet<String> = triples
        .iter()
        .filter(|t| t.is_type_of(profile.type_iri))
        .map(|t| expand_uri(&t.subject))
        .collect();

    if candidates.is_empty() {
        return Vec::new();
    }

    let poi: HashSet<&'static str> = profile.predicates().collect();

    triples
        .iter()
        .filter(|t| {
            candidates.contains(&expand_uri(&t.subject))
                && poi.contains(expand_uri(&t.predicate).as_str())
        })
        .cloned()
        .collect()
}
