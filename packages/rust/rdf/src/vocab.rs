//! Fixed vocabulary: prefix table, well-known IRIs, and CURIE expansion.
//!
//! The prefix table is configuration, not something derived at runtime. It
//! covers the vocabularies that occur in published municipal documents.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// `rdf:type`, also reachable through the reserved `"a"` alias.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Marker datatype for objects that sit in IRI position but are not valid
/// URIs (legacy parser artifact, filtered during preprocessing when blank).
pub const RDFS_RESOURCE: &str = "http://www.w3.org/2000/01/rdf-schema#Resource";

pub const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

// besluit — the Flemish decision-making vocabulary.
pub const BESLUIT_ZITTING: &str = "http://data.vlaanderen.be/ns/besluit#Zitting";
pub const BESLUIT_AGENDAPUNT: &str = "http://data.vlaanderen.be/ns/besluit#Agendapunt";
pub const BESLUIT_BVAP: &str = "http://data.vlaanderen.be/ns/besluit#BehandelingVanAgendapunt";
pub const BESLUIT_BESLUIT: &str = "http://data.vlaanderen.be/ns/besluit#Besluit";
pub const BESLUIT_STEMMING: &str = "http://data.vlaanderen.be/ns/besluit#Stemming";

pub const BESLUIT_AANGEBRACHT_NA: &str = "http://data.vlaanderen.be/ns/besluit#aangebrachtNa";
pub const BESLUIT_GEBEURT_NA: &str = "http://data.vlaanderen.be/ns/besluit#gebeurtNa";
pub const BESLUIT_BEHANDELT: &str = "http://data.vlaanderen.be/ns/besluit#behandelt";
pub const BESLUIT_HEEFT_AGENDAPUNT: &str = "http://data.vlaanderen.be/ns/besluit#heeftAgendapunt";
pub const BESLUIT_IS_GEHOUDEN_DOOR: &str = "http://data.vlaanderen.be/ns/besluit#isGehoudenDoor";
pub const BESLUIT_HEEFT_NOTULEN: &str = "http://data.vlaanderen.be/ns/besluit#heeftNotulen";
pub const BESLUIT_GEPLANDE_START: &str = "http://data.vlaanderen.be/ns/besluit#geplandeStart";
pub const BESLUIT_GEPLAND_OPENBAAR: &str = "http://data.vlaanderen.be/ns/besluit#geplandOpenbaar";
pub const BESLUIT_OPENBAAR: &str = "http://data.vlaanderen.be/ns/besluit#openbaar";
pub const BESLUIT_MOTIVERING: &str = "http://data.vlaanderen.be/ns/besluit#motivering";
pub const BESLUIT_ONDERWERP: &str = "http://data.vlaanderen.be/ns/besluit#onderwerp";
pub const BESLUIT_GEVOLG: &str = "http://data.vlaanderen.be/ns/besluit#gevolg";
pub const BESLUIT_HEEFT_AANWEZIGE: &str = "http://data.vlaanderen.be/ns/besluit#heeftAanwezige";
pub const BESLUIT_HEEFT_AANWEZIGE_BIJ_START: &str =
    "http://data.vlaanderen.be/ns/besluit#heeftAanwezigeBijStart";
pub const BESLUIT_HEEFT_SECRETARIS: &str = "http://data.vlaanderen.be/ns/besluit#heeftSecretaris";
pub const BESLUIT_HEEFT_STEMMING: &str = "http://data.vlaanderen.be/ns/besluit#heeftStemming";
pub const BESLUIT_HEEFT_VOORZITTER: &str = "http://data.vlaanderen.be/ns/besluit#heeftVoorzitter";
pub const BESLUIT_HEEFT_ONTWERPBESLUIT: &str =
    "http://data.vlaanderen.be/ns/besluit#heeftOntwerpbesluit";
pub const BESLUIT_HEEFT_ZITTINGSVERSLAG: &str =
    "http://data.vlaanderen.be/ns/besluit#heeftZittingsverslag";
pub const BESLUIT_AGENDAPUNT_TYPE: &str = "http://data.vlaanderen.be/ns/besluit#Agendapunt.type";

// prov
pub const PROV_VALUE: &str = "http://www.w3.org/ns/prov#value";
pub const PROV_WAS_DERIVED_FROM: &str = "http://www.w3.org/ns/prov#wasDerivedFrom";
pub const PROV_WAS_GENERATED_BY: &str = "http://www.w3.org/ns/prov#wasGeneratedBy";
pub const PROV_GENERATED: &str = "http://www.w3.org/ns/prov#generated";
pub const PROV_STARTED_AT_TIME: &str = "http://www.w3.org/ns/prov#startedAtTime";
pub const PROV_ENDED_AT_TIME: &str = "http://www.w3.org/ns/prov#endedAtTime";
pub const PROV_AT_LOCATION: &str = "http://www.w3.org/ns/prov#atLocation";

// eli
pub const ELI_DATE_PUBLICATION: &str = "http://data.europa.eu/eli/ontology#date_publication";
pub const ELI_DESCRIPTION: &str = "http://data.europa.eu/eli/ontology#description";
pub const ELI_TITLE: &str = "http://data.europa.eu/eli/ontology#title";
pub const ELI_TITLE_SHORT: &str = "http://data.europa.eu/eli/ontology#title_short";
pub const ELI_LANGUAGE: &str = "http://data.europa.eu/eli/ontology#language";
pub const ELI_HAS_PART: &str = "http://data.europa.eu/eli/ontology#has_part";
pub const ELI_REALIZES: &str = "http://data.europa.eu/eli/ontology#realizes";
pub const ELI_RELATED_TO: &str = "http://data.europa.eu/eli/ontology#related_to";
pub const ELI_PASSED_BY: &str = "http://data.europa.eu/eli/ontology#passed_by";

// dct
pub const DCT_SUBJECT: &str = "http://purl.org/dc/terms/subject";
pub const DCT_TITLE: &str = "http://purl.org/dc/terms/title";
pub const DCT_DESCRIPTION: &str = "http://purl.org/dc/terms/description";
pub const DCT_REFERENCES: &str = "http://purl.org/dc/terms/references";

// schema.org
pub const SCHEMA_POSITION: &str = "http://schema.org/position";

// mu
pub const MU_UUID: &str = "http://mu.semte.ch/vocabularies/core/uuid";

// ext — application-profile extensions for derived containers.
pub const EXT_AGENDA_TYPE: &str = "http://mu.semte.ch/vocabularies/ext/Agenda";
pub const EXT_BESLUITENLIJST_TYPE: &str = "http://mu.semte.ch/vocabularies/ext/Besluitenlijst";
pub const EXT_UITTREKSEL_TYPE: &str = "http://mu.semte.ch/vocabularies/ext/Uittreksel";
pub const EXT_NOTULEN_TYPE: &str = "http://mu.semte.ch/vocabularies/ext/Notulen";

pub const EXT_AGENDA: &str = "http://mu.semte.ch/vocabularies/ext/agenda";
pub const EXT_BESLUITENLIJST: &str = "http://mu.semte.ch/vocabularies/ext/besluitenlijst";
pub const EXT_UITTREKSEL: &str = "http://mu.semte.ch/vocabularies/ext/uittreksel";

pub const EXT_AGENDA_AGENDAPUNT: &str = "http://mu.semte.ch/vocabularies/ext/agendaAgendapunt";
pub const EXT_BESLUITENLIJST_BESLUIT: &str =
    "http://mu.semte.ch/vocabularies/ext/besluitenlijstBesluit";
pub const EXT_UITTREKSEL_BVAP: &str = "http://mu.semte.ch/vocabularies/ext/uittrekselBvap";

pub const EXT_LINKED_BESLUIT: &str =
    "http://mu.semte.ch/vocabularies/ext/besluitPublicatieLinkedBesluit";
pub const EXT_LINKED_BVAP: &str = "http://mu.semte.ch/vocabularies/ext/besluitPublicatieLinkedBvap";

// "publishes-X" gates on the published resource.
pub const EXT_PUBLISHES_AGENDA: &str = "http://mu.semte.ch/vocabularies/ext/publishesAgenda";
pub const EXT_PUBLISHES_BEHANDELING: &str =
    "http://mu.semte.ch/vocabularies/ext/publishesBehandeling";
pub const EXT_PUBLISHES_BESLUITENLIJST: &str =
    "http://mu.semte.ch/vocabularies/ext/publishesBesluitenlijst";
pub const EXT_PUBLISHES_NOTULEN: &str = "http://mu.semte.ch/vocabularies/ext/publishesNotulen";

/// The fixed prefix table for CURIE expansion.
pub static DEFAULT_PREFIXES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("ext", "http://mu.semte.ch/vocabularies/ext/"),
        ("mu", "http://mu.semte.ch/vocabularies/core/"),
        ("muSession", "http://mu.semte.ch/vocabularies/session/"),
        ("tmp", "http://mu.semte.ch/vocabularies/tmp/"),
        ("besluit", "http://data.vlaanderen.be/ns/besluit#"),
        ("bv", "http://data.vlaanderen.be/ns/besluitvorming#"),
        ("mandaat", "http://data.vlaanderen.be/ns/mandaat#"),
        ("persoon", "http://data.vlaanderen.be/ns/persoon#"),
        ("generiek", "http://data.vlaanderen.be/ns/generiek#"),
        ("mobiliteit", "https://data.vlaanderen.be/ns/mobiliteit#"),
        (
            "publicationStatus",
            "http://mu.semte.ch/vocabularies/ext/signing/publication-status/",
        ),
        ("eli", "http://data.europa.eu/eli/ontology#"),
        ("m8g", "http://data.europa.eu/m8g/"),
        ("dct", "http://purl.org/dc/terms/"),
        ("cpsv", "http://purl.org/vocab/cpsv#"),
        ("dul", "http://www.ontologydesignpatterns.org/ont/dul/DUL.owl#"),
        ("adms", "http://www.w3.org/ns/adms#"),
        ("person", "http://www.w3.org/ns/person#"),
        ("org", "http://www.w3.org/ns/org#"),
        ("prov", "http://www.w3.org/ns/prov#"),
        ("regorg", "https://www.w3.org/ns/regorg#"),
        ("skos", "http://www.w3.org/2004/02/skos/core#"),
        ("foaf", "http://xmlns.com/foaf/0.1/"),
        ("nao", "http://www.semanticdesktop.org/ontologies/2007/08/15/nao#"),
        ("pav", "http://purl.org/pav/"),
        ("schema", "http://schema.org/"),
        ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
        ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
        ("xsd", "http://www.w3.org/2001/XMLSchema#"),
        ("sign", "http://mu.semte.ch/vocabularies/ext/signing/"),
        ("lblodlg", "http://data.lblod.info/vocabularies/leidinggevenden/"),
        ("lblodmow", "http://data.lblod.info/vocabularies/mobiliteit/"),
        ("locn", "http://www.w3.org/ns/locn#"),
        ("adres", "https://data.vlaanderen.be/ns/adres#"),
        ("notulen", "http://lblod.data.gift/vocabularies/notulen/"),
        ("nfo", "http://www.semanticdesktop.org/ontologies/2007/03/22/nfo#"),
        ("nie", "http://www.semanticdesktop.org/ontologies/2007/01/19/nie#"),
        ("dbpedia", "http://dbpedia.org/ontology/"),
        ("besluittype", "https://data.vlaanderen.be/id/concept/BesluitType/"),
    ])
});

static URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://").expect("valid URI regex"));

/// Whether `s` is an absolute http(s) IRI. Used everywhere as the
/// discriminator between an IRI-valued term and a literal.
pub fn is_uri(s: &str) -> bool {
    URI_RE.is_match(s)
}

/// Expand a term against the fixed prefix table.
///
/// URIs pass through unchanged, `"a"` resolves to `rdf:type`, known
/// `prefix:local` CURIEs are concatenated, and anything else is returned
/// unchanged with a logged warning.
pub fn expand_uri(term: &str) -> String {
    expand_with(term, None)
}

/// Expand a term, consulting `local` prefix declarations before the fixed
/// table. Used by the RDFa flattener for element-level `prefix` attributes.
pub fn expand_uri_with(term: &str, local: &HashMap<String, String>) -> String {
    expand_with(term, Some(local))
}

fn expand_with(term: &str, local: Option<&HashMap<String, String>>) -> String {
    if is_uri(term) {
        return term.to_string();
    }
    if term == "a" {
        return RDF_TYPE.to_string();
    }
    if let Some((prefix, rest)) = term.split_once(':') {
        if let Some(expansion) = local.and_then(|m| m.get(prefix)) {
            return format!("{expansion}{rest}");
        }
        if let Some(expansion) = DEFAULT_PREFIXES.get(prefix) {
            return format!("{expansion}{rest}");
        }
        tracing::warn!(prefix, term, "prefix not in prefix table, not expanding");
    }
    term.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_uris() {
        assert!(is_uri("http://data.vlaanderen.be/ns/besluit#Zitting"));
        assert!(is_uri("https://data.vlaanderen.be/ns/adres#"));
        assert!(!is_uri("besluit:Zitting"));
        assert!(!is_uri("urn:uuid:1234"));
        assert!(!is_uri(""));
    }

    #[test]
    fn expands_reserved_a() {
        assert_eq!(expand_uri("a"), RDF_TYPE);
    }

    #[test]
    fn expands_known_curies() {
        assert_eq!(expand_uri("besluit:Zitting"), BESLUIT_ZITTING);
        assert_eq!(expand_uri("schema:position"), SCHEMA_POSITION);
        assert_eq!(expand_uri("dct:subject"), DCT_SUBJECT);
    }

    #[test]
    fn leaves_uris_and_unknowns_alone() {
        assert_eq!(expand_uri(BESLUIT_ZITTING), BESLUIT_ZITTING);
        assert_eq!(expand_uri("urn:s1"), "urn:s1");
        assert_eq!(expand_uri("nosuchprefix:thing"), "nosuchprefix:thing");
    }

    #[test]
    fn expansion_is_idempotent() {
        for term in ["a", "besluit:Zitting", "urn:s1", ELI_TITLE] {
            let once = expand_uri(term);
            assert_eq!(expand_uri(&once), once);
        }
    }

    #[test]
    fn local_prefixes_shadow_the_table() {
        let local = HashMap::from([("schema".to_string(), "http://example.org/s#".to_string())]);
        assert_eq!(
            expand_uri_with("schema:position", &local),
            "http://example.org/s#position"
        );
        // Unrelated prefixes still resolve through the fixed table.
        assert_eq!(expand_uri_with("prov:value", &local), PROV_VALUE);
    }

    #[test]
    fn curies_with_colons_in_local_part() {
        let expanded = expand_uri("besluit:Agendapunt.type");
        assert_eq!(expanded, BESLUIT_AGENDAPUNT_TYPE);
    }
}
