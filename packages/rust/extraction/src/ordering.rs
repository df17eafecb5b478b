//! Reconstruction of sibling order from the pairwise "occurs after" relation.

use besluitpub_rdf::vocab::{SCHEMA_POSITION, XSD_INTEGER};
use besluitpub_rdf::{Triple, expand_uri, is_uri};

/// Rebuild a total order over entities of `type_iri` from `after_predicate`
/// links (`child afterPredicate priorSibling`) and append one zero-based
/// `schema:position` triple per entity.
///
/// Expects the links to form a single chain: exactly one root (an entity
/// never appearing as a link subject) and one successor per entity. Anything
/// else is a data-quality anomaly: a warning is logged and the input is
/// returned unchanged — imperfect order beats no data at this stage.
pub fn order_chain(triples: Vec<Triple>, type_iri: &str, after_predicate: &str) -> Vec<Triple> {
    let links: Vec<&Triple> = triples
        .iter()
        .filter(|t| t.has_predicate(after_predicate))
        .collect();

    if links.is_empty() {
        return triples;
    }

    let link_subjects: Vec<String> = links.iter().map(|t| expand_uri(&t.subject)).collect();
    let roots: Vec<&str> = triples
        .iter()
        .filter(|t| t.is_type_of(type_iri))
        .map(|t| t.subject.as_str())
        .filter(|subject| !link_subjects.contains(&expand_uri(subject)))
        .collect();

    if roots.len() != 1 {
        tracing::warn!(
            type_iri,
            roots = roots.len(),
            "expected exactly one root for linear ordering, keeping source order"
        );
        return triples;
    }
    let root = roots[0];

    let mut positions = vec![position_triple(root, 0)];
    let mut current = expand_uri(root);

    for index in 1..=links.len() {
        let Some(next) = links.iter().find(|t| expand_uri(&t.object) == current) else {
            tracing::warn!(
                type_iri,
                after = %current,
                "ordering chain is broken, keeping source order"
            );
            return triples;
        };
        positions.push(position_triple(&next.subject, index));
        current = expand_uri(&next.subject);
    }

    let mut ordered = triples;
    ordered.extend(positions);
    ordered
}

/// Drop `after_predicate` triples whose object is not a URI. The relation
/// must point at a resource to be walkable; stray literal objects show up in
/// hand-edited documents.
pub fn retain_uri_links(triples: &[Triple], after_predicate: &str) -> Vec<Triple> {
    triples
        .iter()
        .filter(|t| !t.has_predicate(after_predicate) || is_uri(&t.object))
        .cloned()
        .collect()
}

fn position_triple(subject: &str, position: usize) -> Triple {
    Triple::typed(subject, SCHEMA_POSITION, position.to_string(), XSD_INTEGER)
}
