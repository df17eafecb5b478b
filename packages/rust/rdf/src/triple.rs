//! The flat triple model and its identity/deduplication helpers.

use serde::Serialize;

use crate::vocab::{self, RDF_TYPE};

/// A single extracted statement.
///
/// Subjects are IRIs or blank-node labels; predicates and objects may be
/// CURIEs (with `"a"` as the reserved alias for `rdf:type`) and must be
/// expanded before semantic comparisons. Typed literals carry their datatype
/// IRI in `datatype`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl Triple {
    /// A plain triple without datatype.
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            datatype: None,
        }
    }

    /// A triple with a typed-literal object.
    pub fn typed(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
        datatype: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            datatype: Some(datatype.into()),
        }
    }

    /// An `rdf:type` declaration.
    pub fn a(subject: impl Into<String>, type_iri: impl Into<String>) -> Self {
        Self::new(subject, RDF_TYPE, type_iri)
    }

    /// Whether this is an `rdf:type` triple (after expansion).
    pub fn is_type(&self) -> bool {
        vocab::expand_uri(&self.predicate) == RDF_TYPE
    }

    /// Whether this declares `rdf:type <type_iri>` (after expansion).
    pub fn is_type_of(&self, type_iri: &str) -> bool {
        self.is_type() && vocab::expand_uri(&self.object) == type_iri
    }

    /// Whether this triple's predicate expands to `predicate_iri`.
    pub fn has_predicate(&self, predicate_iri: &str) -> bool {
        vocab::expand_uri(&self.predicate) == predicate_iri
    }
}

/// Canonical string rendering of a triple, used only as a dedup key.
///
/// IRIs are wrapped in angle brackets, literals are quoted, datatypes are
/// suffixed. Languages are ignored, as they always have been in this service.
pub fn hash_triple(triple: &Triple) -> String {
    let subject = bracket(&triple.subject);
    let predicate = bracket(&triple.predicate);
    let object = if vocab::is_uri(&triple.object) {
        format!("<{}>", triple.object)
    } else if let Some(datatype) = &triple.datatype {
        format!("\"{}\"^^{}", triple.object, bracket(datatype))
    } else {
        format!("\"{}\"", triple.object)
    };
    format!("{subject} {predicate} {object}")
}

fn bracket(term: &str) -> String {
    if vocab::is_uri(term) {
        format!("<{term}>")
    } else {
        term.to_string()
    }
}

/// Stable, order-preserving removal of exact duplicates.
pub fn dedupe_triples(triples: Vec<Triple>) -> Vec<Triple> {
    let mut seen = std::collections::HashSet::with_capacity(triples.len());
    let mut deduped = Vec::with_capacity(triples.len());
    for triple in triples {
        if seen.insert(hash_triple(&triple)) {
            deduped.push(triple);
        }
    }
    deduped
}

/// First triple whose object equals `object_uri` (after expansion).
pub fn find_triple_with_object<'a>(triples: &'a [Triple], object_uri: &str) -> Option<&'a Triple> {
    let expanded = vocab::expand_uri(object_uri);
    triples
        .iter()
        .find(|t| vocab::expand_uri(&t.object) == expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{BESLUIT_ZITTING, XSD_DATE};

    #[test]
    fn hash_wraps_uris_and_quotes_literals() {
        let iri = Triple::a("http://example.org/z1", BESLUIT_ZITTING);
        assert_eq!(
            hash_triple(&iri),
            format!("<http://example.org/z1> <{RDF_TYPE}> <{BESLUIT_ZITTING}>")
        );

        let plain = Triple::new("urn:s1", "http://purl.org/dc/terms/title", "Zitting 12");
        assert_eq!(
            hash_triple(&plain),
            "urn:s1 <http://purl.org/dc/terms/title> \"Zitting 12\""
        );

        let typed = Triple::typed(
            "urn:s1",
            "http://data.europa.eu/eli/ontology#date_publication",
            "2021-03-01",
            XSD_DATE,
        );
        assert!(hash_triple(&typed).ends_with(&format!("\"2021-03-01\"^^<{XSD_DATE}>")));
    }

    #[test]
    fn dedupe_preserves_first_occurrence_order() {
        let a = Triple::new("urn:s1", "dct:title", "eerste");
        let b = Triple::new("urn:s2", "dct:title", "tweede");
        let deduped = dedupe_triples(vec![a.clone(), b.clone(), a.clone()]);
        assert_eq!(deduped, vec![a, b]);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let triples = vec![
            Triple::a("urn:s1", BESLUIT_ZITTING),
            Triple::new("urn:s1", "dct:title", "Zitting"),
            Triple::a("urn:s1", BESLUIT_ZITTING),
        ];
        let once = dedupe_triples(triples);
        let twice = dedupe_triples(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn dedupe_distinguishes_datatypes() {
        let plain = Triple::new("urn:s1", "schema:position", "0");
        let typed = Triple::typed(
            "urn:s1",
            "schema:position",
            "0",
            "http://www.w3.org/2001/XMLSchema#integer",
        );
        assert_eq!(dedupe_triples(vec![plain, typed]).len(), 2);
    }

    #[test]
    fn type_predicate_detection_handles_the_a_alias() {
        let aliased = Triple::new("urn:s1", "a", "besluit:Zitting");
        assert!(aliased.is_type());
        assert!(aliased.is_type_of(BESLUIT_ZITTING));
        assert!(!aliased.is_type_of("http://example.org/Other"));
    }

    #[test]
    fn finds_triples_by_object() {
        let triples = vec![
            Triple::new("urn:ap2", "besluit:aangebrachtNa", "urn:ap1"),
            Triple::new("urn:ap3", "besluit:aangebrachtNa", "urn:ap2"),
        ];
        let found = find_triple_with_object(&triples, "urn:ap2").expect("found");
        assert_eq!(found.subject, "urn:ap3");
        assert!(find_triple_with_object(&triples, "urn:ap9").is_none());
    }
}
