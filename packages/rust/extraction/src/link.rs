//! Linking of freshly extracted resources to their session, container, and
//! originating published resource.
//!
//! All three operations discover "the resources just extracted" by scanning
//! for `rdf:type` triples, so type declarations must be present before
//! linking is applied.

use besluitpub_rdf::Triple;
use besluitpub_rdf::vocab::{BESLUIT_ZITTING, PROV_WAS_DERIVED_FROM};

/// Subject of the first `besluit:Zitting` type declaration, if any.
///
/// Every input document is assumed to carry exactly one; the pipeline checks
/// this once up front and treats absence as a fatal data anomaly.
pub fn find_session_subject(triples: &[Triple]) -> Option<String> {
    triples
        .iter()
        .find(|t| t.is_type_of(BESLUIT_ZITTING))
        .map(|t| t.subject.clone())
}

/// Append `(session, predicate, s)` for every typed subject `s` in `triples`.
pub fn link_to_session(mut triples: Vec<Triple>, session: &str, predicate: &str) -> Vec<Triple> {
    let links: Vec<Triple> = typed_subjects(&triples)
        .map(|subject| Triple::new(session, predicate, subject))
        .collect();
    triples.extend(links);
    triples
}

/// Append `(container, predicate, s)` for every typed subject `s` in `triples`.
pub fn link_to_container(mut triples: Vec<Triple>, container: &str, predicate: &str) -> Vec<Triple> {
    let links: Vec<Triple> = typed_subjects(&triples)
        .map(|subject| Triple::new(container, predicate, subject))
        .collect();
    triples.extend(links);
    triples
}

/// Append `(s, prov:wasDerivedFrom, origin)` for every typed subject `s`.
pub fn link_to_origin(mut triples: Vec<Triple>, origin: &str) -> Vec<Triple> {
    let links: Vec<Triple> = typed_subjects(&triples)
        .map(|subject| Triple::new(subject, PROV_WAS_DERIVED_FROM, origin))
        .collect();
    triples.extend(links);
    triples
}

/// One entry per `rdf:type` triple — a multi-typed subject appears once per
/// type declaration, and so receives one link per declaration.
fn typed_subjects(triples: &[Triple]) -> impl Iterator<Item = String> + '_ {
    triples
        .iter()
        .filter(|t| t.is_type())
        .map(|t| t.subject.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use besluitpub_rdf::dedupe_triples;
    use besluitpub_rdf::vocab::{BESLUIT_AGENDAPUNT, BESLUIT_BEHANDELT, EXT_AGENDA_AGENDAPUNT};

    fn two_agendapunten() -> Vec<Triple> {
        vec![
            Triple::a("urn:ap1", BESLUIT_AGENDAPUNT),
            Triple::new("urn:ap1", "dct:title", "Eerste"),
            Triple::a("urn:ap2", BESLUIT_AGENDAPUNT),
        ]
    }

    #[test]
    fn finds_the_session_subject() {
        let triples = vec![
            Triple::new("urn:ap1", "dct:title", "los"),
            Triple::new("urn:z1", "a", "besluit:Zitting"),
        ];
        assert_eq!(find_session_subject(&triples).as_deref(), Some("urn:z1"));
        assert!(find_session_subject(&two_agendapunten()).is_none());
    }

    #[test]
    fn links_every_typed_subject_to_the_session_exactly_once() {
        let linked = link_to_session(two_agendapunten(), "urn:z1", BESLUIT_BEHANDELT);

        for subject in ["urn:ap1", "urn:ap2"] {
            let count = linked
                .iter()
                .filter(|t| {
                    t.subject == "urn:z1"
                        && t.predicate == BESLUIT_BEHANDELT
                        && t.object == subject
                })
                .count();
            assert_eq!(count, 1, "expected one session link for {subject}");
        }
        // untyped triples gain nothing
        assert_eq!(linked.len(), two_agendapunten().len() + 2);
    }

    #[test]
    fn links_into_container_and_origin() {
        let linked = link_to_container(two_agendapunten(), "urn:agenda1", EXT_AGENDA_AGENDAPUNT);
        assert!(linked.iter().any(|t| {
            t.subject == "urn:agenda1"
                && t.predicate == EXT_AGENDA_AGENDAPUNT
                && t.object == "urn:ap1"
        }));

        let derived = link_to_origin(two_agendapunten(), "urn:published1");
        assert!(derived.iter().any(|t| {
            t.subject == "urn:ap2"
                && t.predicate == PROV_WAS_DERIVED_FROM
                && t.object == "urn:published1"
        }));
    }

    #[test]
    fn multi_typed_subjects_get_one_link_per_type_triple() {
        let triples = vec![
            Triple::a("urn:ap1", BESLUIT_AGENDAPUNT),
            Triple::a("urn:ap1", "http://example.org/ExtraType"),
        ];
        let linked = link_to_session(triples, "urn:z1", BESLUIT_BEHANDELT);

        let links: Vec<&Triple> = linked
            .iter()
            .filter(|t| t.predicate == BESLUIT_BEHANDELT)
            .collect();
        // one link per type declaration; exact duplicates collapse in dedup
        assert_eq!(links.len(), 2);
        assert_eq!(
            dedupe_triples(linked.clone())
                .iter()
                .filter(|t| t.predicate == BESLUIT_BEHANDELT)
                .count(),
            1
        );
    }
}
