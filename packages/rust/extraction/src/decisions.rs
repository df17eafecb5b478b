//! Inferred annotations for decision sub-documents.
//!
//! Before an enriched snippet is persisted as an excerpt or as minutes, each
//! decision gains metadata links that are only implicit in the source
//! markup: the treatment that generated it, the agenda item it was treated
//! under (written on the session node), its publication date, and the
//! administrative body that passed it.

use chrono::NaiveDate;

use besluitpub_rdf::vocab::{
    BESLUIT_BEHANDELT, BESLUIT_BESLUIT, BESLUIT_IS_GEHOUDEN_DOOR, BESLUIT_ZITTING,
    DCT_SUBJECT, ELI_DATE_PUBLICATION, ELI_PASSED_BY, PROV_GENERATED, PROV_WAS_GENERATED_BY,
    XSD_DATE,
};
use besluitpub_rdf::{Triple, expand_uri};
use besluitpub_rdfa::Annotation;

/// Compute the annotation directives for every decision in the triple set.
pub fn decision_annotations(triples: &[Triple], today: NaiveDate) -> Vec<Annotation> {
    let mut annotations = Vec::new();

    let session = triples
        .iter()
        .find(|t| t.is_type_of(BESLUIT_ZITTING))
        .map(|t| t.subject.clone());

    let issuing_body = triples
        .iter()
        .find(|t| t.has_predicate(BESLUIT_IS_GEHOUDEN_DOOR))
        .map(|t| t.object.clone());

    for decision in decision_subjects(triples) {
        annotate_decision(
            triples,
            &decision,
            session.as_deref(),
            issuing_body.as_deref(),
            today,
            &mut annotations,
        );
    }

    annotations
}

fn annotate_decision(
    triples: &[Triple],
    decision: &str,
    session: Option<&str>,
    issuing_body: Option<&str>,
    today: NaiveDate,
    annotations: &mut Vec<Annotation>,
) {
    // There should be one treatment, but documents in a weird state can
    // carry several; take the first one that is linked to an agenda item.
    let decision_expanded = expand_uri(decision);
    let generated_by = triples
        .iter()
        .filter(|t| {
            t.has_predicate(PROV_GENERATED) && expand_uri(&t.object) == decision_expanded
        })
        .find_map(|treatment| {
            let agenda_item = triples.iter().find(|t| {
                expand_uri(&t.subject) == expand_uri(&treatment.subject)
                    && t.has_predicate(DCT_SUBJECT)
            })?;
            Some((treatment.subject.clone(), agenda_item.object.clone()))
        });

    if let Some((treatment, agenda_item)) = generated_by {
        annotations.push(Annotation::resource(
            decision,
            PROV_WAS_GENERATED_BY,
            treatment,
        ));
        if let Some(session) = session {
            // Cross-node write: the treated agenda item is recorded on the
            // session's node, not the decision's.
            annotations.push(Annotation::resource(session, BESLUIT_BEHANDELT, agenda_item));
        }
    }

    annotations.push(Annotation::literal(
        decision,
        ELI_DATE_PUBLICATION,
        today.format("%Y-%m-%d").to_string(),
        XSD_DATE,
    ));

    if let Some(body) = issuing_body {
        annotations.push(Annotation::resource(decision, ELI_PASSED_BY, body));
    }
}

/// Distinct decision subjects in document order.
fn decision_subjects(triples: &[Triple]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    triples
        .iter()
        .filter(|t| t.is_type_of(BESLUIT_BESLUIT))
        .filter(|t| seen.insert(expand_uri(&t.subject)))
        .map(|t| t.subject.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use besluitpub_rdfa::AnnotationValue;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, 1).expect("valid date")
    }

    fn decision_scenario() -> Vec<Triple> {
        vec![
            Triple::new("urn:s1", "a", "besluit:Zitting"),
            Triple::new("urn:s1", "besluit:isGehoudenDoor", "urn:orgaan1"),
            Triple::new("urn:t1", "a", "besluit:BehandelingVanAgendapunt"),
            Triple::new("urn:t1", "prov:generated", "urn:d1"),
            Triple::new("urn:t1", "dct:subject", "urn:ap1"),
            Triple::new("urn:d1", "a", "besluit:Besluit"),
        ]
    }

    fn find<'a>(annotations: &'a [Annotation], property: &str) -> Option<&'a Annotation> {
        annotations.iter().find(|a| a.property == property)
    }

    #[test]
    fn annotates_generating_treatment_and_session_back_link() {
        let annotations = decision_annotations(&decision_scenario(), fixed_today());

        let generated = find(&annotations, PROV_WAS_GENERATED_BY).expect("wasGeneratedBy");
        assert_eq!(generated.target, "urn:d1");
        assert_eq!(generated.value, AnnotationValue::Resource("urn:t1".into()));

        let treated = find(&annotations, BESLUIT_BEHANDELT).expect("behandelt");
        assert_eq!(treated.target, "urn:s1", "behandelt targets the session node");
        assert_eq!(treated.value, AnnotationValue::Resource("urn:ap1".into()));
    }

    #[test]
    fn always_appends_the_publication_date() {
        let annotations = decision_annotations(&decision_scenario(), fixed_today());
        let date = find(&annotations, ELI_DATE_PUBLICATION).expect("date_publication");
        assert_eq!(date.target, "urn:d1");
        assert_eq!(
            date.value,
            AnnotationValue::Literal {
                content: "2021-03-01".into(),
                datatype: Some(XSD_DATE.into()),
            }
        );
    }

    #[test]
    fn annotates_the_issuing_body_when_present() {
        let annotations = decision_annotations(&decision_scenario(), fixed_today());
        let passed = find(&annotations, ELI_PASSED_BY).expect("passed_by");
        assert_eq!(passed.value, AnnotationValue::Resource("urn:orgaan1".into()));

        let without_body: Vec<Triple> = decision_scenario()
            .into_iter()
            .filter(|t| !t.has_predicate(BESLUIT_IS_GEHOUDEN_DOOR))
            .collect();
        let annotations = decision_annotations(&without_body, fixed_today());
        assert!(find(&annotations, ELI_PASSED_BY).is_none());
    }

    #[test]
    fn treatment_without_agenda_item_only_dates_the_decision() {
        let triples = vec![
            Triple::new("urn:s1", "a", "besluit:Zitting"),
            Triple::new("urn:t1", "prov:generated", "urn:d1"),
            Triple::new("urn:d1", "a", "besluit:Besluit"),
        ];
        let annotations = decision_annotations(&triples, fixed_today());
        assert!(find(&annotations, PROV_WAS_GENERATED_BY).is_none());
        assert!(find(&annotations, BESLUIT_BEHANDELT).is_none());
        assert!(find(&annotations, ELI_DATE_PUBLICATION).is_some());
    }

    #[test]
    fn picks_the_first_treatment_linked_to_an_agenda_item() {
        let triples = vec![
            Triple::new("urn:s1", "a", "besluit:Zitting"),
            // treatment without dct:subject comes first and is skipped
            Triple::new("urn:t0", "prov:generated", "urn:d1"),
            Triple::new("urn:t1", "prov:generated", "urn:d1"),
            Triple::new("urn:t1", "dct:subject", "urn:ap1"),
            Triple::new("urn:d1", "a", "besluit:Besluit"),
        ];
        let annotations = decision_annotations(&triples, fixed_today());
        let generated = find(&annotations, PROV_WAS_GENERATED_BY).expect("wasGeneratedBy");
        assert_eq!(generated.value, AnnotationValue::Resource("urn:t1".into()));
    }

    #[test]
    fn every_decision_is_annotated() {
        let mut triples = decision_scenario();
        triples.push(Triple::new("urn:d2", "a", "besluit:Besluit"));
        let annotations = decision_annotations(&triples, fixed_today());

        let dates: Vec<&str> = annotations
            .iter()
            .filter(|a| a.property == ELI_DATE_PUBLICATION)
            .map(|a| a.target.as_str())
            .collect();
        assert_eq!(dates, vec!["urn:d1", "urn:d2"]);
    }
}
