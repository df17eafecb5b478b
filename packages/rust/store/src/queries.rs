//! The publishing-protocol queries: unprocessed-resource discovery, status
//! bookkeeping, batched insertion with stable identifiers, file metadata,
//! and the session permalink.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use besluitpub_rdf::vocab::RDF_TYPE;
use besluitpub_rdf::{Triple, expand_uri};
use besluitpub_shared::{PublicatieError, PublicationStatus, PublishedResource, Result};

use crate::SparqlStore;
use crate::escape::{escape_int, escape_object, escape_string, escape_uri};
use crate::files::{self, FileMetadata};

const STATUS_PREDICATE: &str =
    "http://mu.semte.ch/vocabularies/ext/besluit-publicatie-publish-service/status";
const RETRIES_PREDICATE: &str =
    "http://mu.semte.ch/vocabularies/ext/besluit-publicatie-publish-service/number-of-retries";

impl SparqlStore {
    /// Published resources awaiting (re)processing.
    ///
    /// Resources without a status come first; earlier failures sort to the
    /// back by retry count. Resources stuck in `pending` re-enter only after
    /// `pending_timeout_hours`. File-stored snippets are resolved from the
    /// shared drive here, so the pipeline always receives inline content.
    pub async fn unprocessed_resources(
        &self,
        pending_timeout_hours: u32,
        max_attempts: u32,
    ) -> Result<Vec<PublishedResource>> {
        let query = format!(
            r#"PREFIX sign: <http://mu.semte.ch/vocabularies/ext/signing/>
PREFIX nie: <http://www.semanticdesktop.org/ontologies/2007/01/19/nie#>
PREFIX prov: <http://www.w3.org/ns/prov#>
PREFIX dct: <http://purl.org/dc/terms/>
SELECT DISTINCT ?graph ?resource ?rdfaSnippet ?filePath ?status ?created ?numberOfRetries {{
  VALUES ?graph {{ {graph} }}
  GRAPH ?graph {{
    ?resource a sign:PublishedResource; dct:created ?created.
    {{
      {{ ?resource sign:text ?content. BIND(?content AS ?rdfaSnippet) }}
      UNION
      {{ ?resource prov:generated ?file. ?fileOnDisk nie:dataSource ?file. BIND(STR(?fileOnDisk) AS ?filePath) }}
    }}
    OPTIONAL {{ ?resource {retries} ?numberOfRetries. }}
    OPTIONAL {{ ?resource {status} ?status. }}
    FILTER (
      (!BOUND(?status)) ||
      ((?status = {failed}) && (?numberOfRetries < {max_attempts_int})) ||
      (?status = {pending})
    )
  }}
}} ORDER BY ASC(?numberOfRetries) ASC(?created)"#,
            graph = escape_uri(&self.graph),
            retries = escape_uri(RETRIES_PREDICATE),
            status = escape_uri(STATUS_PREDICATE),
            failed = escape_uri(&PublicationStatus::Failed.as_uri()),
            pending = escape_uri(&PublicationStatus::Pending.as_uri()),
            max_attempts_int = escape_int(&max_attempts.to_string())?,
        );

        let rows = self.client().select(&query).await?;
        let now = Utc::now();

        let mut resources = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(resource) = row.get("resource") else {
                continue;
            };

            let snippet = match (row.get("rdfaSnippet"), row.get("filePath")) {
                (Some(snippet), _) => snippet.clone(),
                (None, Some(file_reference)) => {
                    match files::read_share_file(self.share_dir(), file_reference) {
                        Ok(content) => content,
                        Err(e) => {
                            tracing::warn!(
                                resource = %resource,
                                file = %file_reference,
                                error = %e,
                                "cannot resolve snippet file, skipping resource"
                            );
                            continue;
                        }
                    }
                }
                (None, None) => {
                    tracing::warn!(
                        resource = %resource,
                        "published resource carries no snippet, skipping"
                    );
                    continue;
                }
            };

            resources.push(PublishedResource {
                graph: row
                    .get("graph")
                    .cloned()
                    .unwrap_or_else(|| self.graph().to_string()),
                resource: resource.clone(),
                rdfa_snippet: snippet,
                number_of_retries: row
                    .get("numberOfRetries")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(0),
                status: row.get("status").cloned(),
                created: row.get("created").and_then(|v| parse_datetime(v)),
            });
        }

        resources.retain(|r| ready_for_processing(r, pending_timeout_hours, now));
        Ok(resources)
    }

    /// Replace a resource's status and retry counter.
    pub async fn update_status(
        &self,
        resource: &PublishedResource,
        status: PublicationStatus,
        attempts: u32,
    ) -> Result<()> {
        let graph = escape_uri(&resource.graph);
        let subject = escape_uri(&resource.resource);
        let status_predicate = escape_uri(STATUS_PREDICATE);
        let retries_predicate = escape_uri(RETRIES_PREDICATE);

        let update = format!(
            r#"DELETE {{
  GRAPH {graph} {{
    {subject} {status_predicate} ?status.
    {subject} {retries_predicate} ?retries.
  }}
}}
WHERE {{
  GRAPH {graph} {{
    OPTIONAL {{ {subject} {status_predicate} ?status. }}
    OPTIONAL {{ {subject} {retries_predicate} ?retries. }}
  }}
}}
;
INSERT DATA {{
  GRAPH {graph} {{
    {subject} {status_predicate} {status_uri}.
    {subject} {retries_predicate} {attempts_int}.
  }}
}}"#,
            status_uri = escape_uri(&status.as_uri()),
            attempts_int = escape_int(&attempts.to_string())?,
        );

        self.client().update(&update).await
    }

    /// Insert an extracted batch, grouped per subject, making sure every
    /// resource carries a `mu:uuid`. Triples are assumed expanded and
    /// profile-checked.
    pub async fn persist_extracted(&self, triples: &[Triple]) -> Result<()> {
        if triples.is_empty() {
            return Ok(());
        }

        let escaped = escape_batch(triples)?;
        let graph = escape_uri(self.graph());

        for subject in unique(escaped.iter().filter(|t| t.is_type).map(|t| &t.subject)) {
            self.ensure_uuid(subject, &graph).await?;
        }

        let mut inserted = 0usize;
        for subject in unique(escaped.iter().map(|t| &t.subject)) {
            let statements: Vec<String> = escaped
                .iter()
                .filter(|t| t.subject == *subject)
                .map(|t| format!("    {} {} {}.", t.subject, t.predicate, t.object))
                .collect();
            let update = format!(
                "INSERT DATA {{\n  GRAPH {graph} {{\n{}\n  }}\n}}",
                statements.join("\n")
            );

            if let Err(e) = self.client().update(&update).await {
                tracing::error!(error = %e, "error while trying to persist extracted data");
                tracing::info!(
                    persisted = inserted,
                    total = escaped.len(),
                    triples = %serde_json::to_string(triples).unwrap_or_default(),
                    "persistence state at failure"
                );
                return Err(e);
            }
            self.ensure_uuid(subject, &graph).await?;
            inserted += statements.len();
        }

        Ok(())
    }

    /// Give a resource a stable secondary identifier if it has none yet.
    async fn ensure_uuid(&self, escaped_subject: &str, escaped_graph: &str) -> Result<()> {
        let query = format!(
            "PREFIX mu: <http://mu.semte.ch/vocabularies/core/>\nSELECT DISTINCT ?uuid {{\n  GRAPH {escaped_graph} {{ {escaped_subject} mu:uuid ?uuid. }}\n}}"
        );
        if !self.client().select(&query).await?.is_empty() {
            return Ok(());
        }

        let uuid = Uuid::now_v7().to_string();
        let update = format!(
            "PREFIX mu: <http://mu.semte.ch/vocabularies/core/>\nINSERT DATA {{\n  GRAPH {escaped_graph} {{ {escaped_subject} mu:uuid {}. }}\n}}",
            escape_string(&uuid)
        );
        self.client().update(&update).await
    }

    /// Store logical + physical metadata for a file on the shared drive and
    /// return the logical file URI.
    pub async fn write_file_metadata(&self, metadata: &FileMetadata) -> Result<String> {
        let logical_uuid = Uuid::now_v7().to_string();
        let logical_uri = format!("http://lblod.data.gift/files/{logical_uuid}");
        let physical_uri = metadata.share_uri(self.share_dir());
        let created = crate::escape::escape_datetime(&Utc::now().to_rfc3339())?;
        let size = escape_int(&metadata.size.to_string())?;
        let filename = escape_string(&metadata.filename);

        let update = format!(
            r#"PREFIX mu: <http://mu.semte.ch/vocabularies/core/>
PREFIX nie: <http://www.semanticdesktop.org/ontologies/2007/01/19/nie#>
PREFIX nfo: <http://www.semanticdesktop.org/ontologies/2007/03/22/nfo#>
PREFIX dct: <http://purl.org/dc/terms/>
PREFIX dbpedia: <http://dbpedia.org/ontology/>
INSERT DATA {{
  GRAPH {graph} {{
    {logical} a nfo:FileDataObject;
        nfo:fileName {filename};
        mu:uuid {logical_uuid_literal};
        dct:format "text/html";
        dbpedia:fileExtension "html";
        nfo:fileSize {size};
        dct:created {created};
        dct:modified {created}.
    {physical} a nfo:FileDataObject;
        nie:dataSource {logical};
        nfo:fileName {filename};
        mu:uuid {physical_uuid_literal};
        nfo:fileSize {size};
        dbpedia:fileExtension "html";
        dct:created {created};
        dct:modified {created}.
  }}
}}"#,
            graph = escape_uri(self.graph()),
            logical = escape_uri(&logical_uri),
            physical = escape_uri(&physical_uri),
            logical_uuid_literal = escape_string(&logical_uuid),
            physical_uuid_literal = escape_string(&metadata.uuid),
        );

        self.client().update(&update).await?;
        Ok(logical_uri)
    }

    /// Derive the session's redirect permalink from the administrative-unit
    /// hierarchy already present in the store.
    pub async fn insert_session_permalink(&self, session_uri: &str) -> Result<()> {
        let session = escape_uri(session_uri);
        let update = format!(
            r#"PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
PREFIX mandaat: <http://data.vlaanderen.be/ns/mandaat#>
PREFIX besluit: <http://data.vlaanderen.be/ns/besluit#>
PREFIX mu: <http://mu.semte.ch/vocabularies/core/>
PREFIX foaf: <http://xmlns.com/foaf/0.1/>

INSERT {{
  GRAPH {graph} {{
    {session} foaf:page ?redirectUrl.
  }}
}}
WHERE {{
  {session} mu:uuid ?zittingUuid ;
      (besluit:isGehoudenDoor/mandaat:isTijdspecialisatieVan) ?administrativeUnit .
  ?administrativeUnit skos:prefLabel ?administrativeUnitFullName ;
      besluit:bestuurt ?bestuurseenheid .
  ?bestuurseenheid skos:prefLabel ?administrativeUnitName ;
      (besluit:classificatie/skos:prefLabel) ?administrativeUnitTypeName .
  BIND(
      CONCAT("/", ?administrativeUnitName, "/", ?administrativeUnitTypeName, "/zittingen/", ?zittingUuid)
      AS ?redirectUrl
  )
}}"#,
            graph = escape_uri(self.graph()),
        );

        self.client().update(&update).await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct EscapedTriple {
    subject: String,
    predicate: String,
    object: String,
    is_type: bool,
}

/// Serialize a batch using the profile value kinds. A predicate outside
/// every profile means the pipeline emitted something it should not have.
fn escape_batch(triples: &[Triple]) -> Result<Vec<EscapedTriple>> {
    triples
        .iter()
        .map(|triple| {
            let predicate_iri = expand_uri(&triple.predicate);
            let kind = besluitpub_extraction::value_kind(&predicate_iri).ok_or_else(|| {
                tracing::warn!(
                    predicate = %triple.predicate,
                    subject = %triple.subject,
                    "no value kind known for predicate"
                );
                PublicatieError::validation(format!(
                    "no escape kind for predicate {predicate_iri}"
                ))
            })?;

            let object = escape_object(kind, &triple.object).inspect_err(|_| {
                tracing::warn!(
                    subject = %triple.subject,
                    predicate = %triple.predicate,
                    object = %triple.object,
                    "failed to serialize triple object"
                );
            })?;

            Ok(EscapedTriple {
                subject: escape_uri(&expand_uri(&triple.subject)),
                predicate: escape_uri(&predicate_iri),
                object,
                is_type: predicate_iri == RDF_TYPE,
            })
        })
        .collect()
}

/// First occurrence of each value, preserving order.
fn unique<'a>(items: impl Iterator<Item = &'a String>) -> Vec<&'a String> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(item.as_str())).collect()
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Whether a resource may be picked up: anything not `pending`, or `pending`
/// rows older than the timeout (a worker died holding the lock).
fn ready_for_processing(
    resource: &PublishedResource,
    pending_timeout_hours: u32,
    now: DateTime<Utc>,
) -> bool {
    let pending = resource
        .status
        .as_deref()
        .map(expand_uri)
        .and_then(|uri| PublicationStatus::from_uri(&uri))
        == Some(PublicationStatus::Pending);
    if !pending {
        return true;
    }
    match resource.created {
        Some(created) => now - created >= chrono::Duration::hours(i64::from(pending_timeout_hours)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use besluitpub_rdf::vocab::{
        BESLUIT_AGENDAPUNT, BESLUIT_OPENBAAR, DCT_TITLE, SCHEMA_POSITION, XSD_INTEGER,
    };
    use besluitpub_shared::StoreConfig;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(endpoint: &str) -> SparqlStore {
        SparqlStore::new(&StoreConfig {
            endpoint: endpoint.into(),
            graph: "http://mu.semte.ch/graphs/public".into(),
            share_dir: "/tmp".into(),
        })
        .expect("store")
    }

    fn results_json(bindings: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "head": { "vars": ["doc"] },
            "results": { "bindings": bindings }
        })
    }

    // -----------------------------------------------------------------------
    // Batch serialization
    // -----------------------------------------------------------------------

    #[test]
    fn escape_batch_serializes_by_value_kind() {
        let triples = vec![
            Triple::a("urn:ap1", BESLUIT_AGENDAPUNT),
            Triple::typed("urn:ap1", SCHEMA_POSITION, "0", XSD_INTEGER),
            Triple::new("urn:bvap1", BESLUIT_OPENBAAR, "true"),
            Triple::new("urn:ap1", DCT_TITLE, "Eerste punt"),
        ];
        let escaped = escape_batch(&triples).expect("escape");

        assert!(escaped[0].is_type);
        assert_eq!(escaped[0].object, format!("<{BESLUIT_AGENDAPUNT}>"));
        assert_eq!(escaped[1].object, format!("\"0\"^^<{XSD_INTEGER}>"));
        assert!(escaped[2].object.starts_with("\"true\"^^"));
        assert_eq!(escaped[3].object, "\"\"\"Eerste punt\"\"\"");
        assert!(escaped.iter().skip(1).all(|t| !t.is_type));
    }

    #[test]
    fn escape_batch_rejects_unprofiled_predicates() {
        let triples = vec![Triple::new("urn:x", "http://example.org/unlisted", "y")];
        let err = escape_batch(&triples).expect_err("must reject");
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("unlisted"));
    }

    #[test]
    fn unique_preserves_first_occurrence_order() {
        let values = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        let unique_values = unique(values.iter());
        assert_eq!(unique_values, [&"b".to_string(), &"a".to_string()]);
    }

    // -----------------------------------------------------------------------
    // Pending / retry policy
    // -----------------------------------------------------------------------

    fn resource_with(status: Option<PublicationStatus>, age_hours: i64) -> PublishedResource {
        PublishedResource {
            graph: "http://mu.semte.ch/graphs/public".into(),
            resource: "http://data.lblod.info/published-resources/pr1".into(),
            rdfa_snippet: "<div/>".into(),
            number_of_retries: 0,
            status: status.map(|s| s.as_uri()),
            created: Some(Utc::now() - chrono::Duration::hours(age_hours)),
        }
    }

    #[test]
    fn fresh_pending_resources_stay_locked() {
        let now = Utc::now();
        assert!(!ready_for_processing(
            &resource_with(Some(PublicationStatus::Pending), 1),
            3,
            now
        ));
        assert!(ready_for_processing(
            &resource_with(Some(PublicationStatus::Pending), 4),
            3,
            now
        ));
        assert!(ready_for_processing(
            &resource_with(Some(PublicationStatus::Failed), 0),
            3,
            now
        ));
        assert!(ready_for_processing(&resource_with(None, 0), 3, now));
    }

    #[test]
    fn datetime_parsing_accepts_offset_and_naive() {
        assert!(parse_datetime("2021-03-01T19:00:00Z").is_some());
        assert!(parse_datetime("2021-03-01T19:00:00+01:00").is_some());
        assert!(parse_datetime("2021-03-01T19:00:00").is_some());
        assert!(parse_datetime("vandaag").is_none());
    }

    // -----------------------------------------------------------------------
    // Protocol over HTTP
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn belongs_to_type_reflects_result_rows() {
        use besluitpub_extraction::PublicationStore;

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("doc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results_json(
                serde_json::json!([{ "doc": { "type": "uri", "value": "http://x/doc1" } }]),
            )))
            .mount(&server)
            .await;

        let store = store_for(&server.uri());
        let resource = resource_with(None, 0);
        let gated = store
            .belongs_to_type(&resource, "http://mu.semte.ch/vocabularies/ext/publishesAgenda")
            .await
            .expect("query");
        assert!(gated);
    }

    #[tokio::test]
    async fn belongs_to_type_is_false_on_empty_results() {
        use besluitpub_extraction::PublicationStore;

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(results_json(serde_json::json!([]))),
            )
            .mount(&server)
            .await;

        let store = store_for(&server.uri());
        let resource = resource_with(None, 0);
        let gated = store
            .belongs_to_type(&resource, "http://mu.semte.ch/vocabularies/ext/publishesAgenda")
            .await
            .expect("query");
        assert!(!gated);
    }

    #[tokio::test]
    async fn persist_extracted_inserts_batches_and_uuids() {
        let server = MockServer::start().await;
        // SELECTs (uuid lookups) answer with empty result sets…
        Mock::given(method("POST"))
            .and(body_string_contains("SELECT"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(results_json(serde_json::json!([]))),
            )
            .mount(&server)
            .await;
        // …all other requests are updates.
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store = store_for(&server.uri());
        let triples = vec![
            Triple::a("urn:ap1", BESLUIT_AGENDAPUNT),
            Triple::new("urn:ap1", DCT_TITLE, "Eerste punt"),
        ];
        store.persist_extracted(&triples).await.expect("persist");

        let requests = server.received_requests().await.expect("requests");
        let bodies: Vec<String> = requests
            .iter()
            .map(|r| String::from_utf8_lossy(&r.body).into_owned())
            .collect();
        assert!(bodies.iter().any(|b| b.contains("INSERT")));
        assert!(bodies.iter().any(|b| b.contains("uuid")));
    }

    #[tokio::test]
    async fn empty_batches_skip_the_endpoint() {
        // no server running: any request would fail the test
        let store = store_for("http://127.0.0.1:9");
        store.persist_extracted(&[]).await.expect("no-op");
    }

    #[tokio::test]
    async fn unprocessed_resources_maps_rows() {
        let server = MockServer::start().await;
        let bindings = serde_json::json!([{
            "graph": { "type": "uri", "value": "http://mu.semte.ch/graphs/public" },
            "resource": { "type": "uri", "value": "http://data.lblod.info/published-resources/pr1" },
            "rdfaSnippet": { "type": "literal", "value": "<div typeof=\"besluit:Zitting\" resource=\"urn:z1\"></div>" },
            "created": { "type": "literal", "value": "2021-03-01T19:00:00Z" },
            "numberOfRetries": { "type": "literal", "value": "2" }
        }]);
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(results_json(bindings)))
            .mount(&server)
            .await;

        let store = store_for(&server.uri());
        let resources = store.unprocessed_resources(3, 10).await.expect("query");

        assert_eq!(resources.len(), 1);
        let resource = &resources[0];
        assert_eq!(
            resource.resource,
            "http://data.lblod.info/published-resources/pr1"
        );
        assert_eq!(resource.number_of_retries, 2);
        assert!(resource.rdfa_snippet.contains("besluit:Zitting"));
        assert!(resource.created.is_some());
    }

    #[tokio::test]
    async fn update_status_issues_an_update() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store = store_for(&server.uri());
        let resource = resource_with(None, 0);
        store
            .update_status(&resource, PublicationStatus::Pending, 1)
            .await
            .expect("update");

        let requests = server.received_requests().await.expect("requests");
        assert_eq!(requests.len(), 1);
        let body = String::from_utf8_lossy(&requests[0].body).into_owned();
        assert!(body.contains("DELETE"));
        assert!(body.contains("INSERT"));
        assert!(body.contains("pending"));
    }
}
