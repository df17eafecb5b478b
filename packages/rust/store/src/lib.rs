//! SPARQL triple-store client and the publishing protocol.
//!
//! [`SparqlStore`] implements the pipeline's
//! [`PublicationStore`](besluitpub_extraction::PublicationStore) contract on
//! top of a SPARQL 1.1 endpoint:
//! - capability checks for the "publishes-X" gates
//! - batched triple insertion with stable `mu:uuid` secondary identifiers
//! - status/retry bookkeeping for the retry-safe publishing loop
//! - shared-drive persistence of enriched minutes content
//! - session permalink resolution

mod escape;
mod files;
mod queries;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use url::Url;

use besluitpub_extraction::PublicationStore;
use besluitpub_rdf::Triple;
use besluitpub_shared::{PublicatieError, PublishedResource, Result, StoreConfig};

pub use escape::{escape_bool, escape_date, escape_datetime, escape_int, escape_object, escape_string, escape_uri};
pub use files::{FileMetadata, persist_content_to_file, read_share_file, share_path};

/// User-Agent for requests to the endpoint.
const USER_AGENT: &str = concat!("besluit-publicatie/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// SparqlClient
// ---------------------------------------------------------------------------

/// Thin HTTP client speaking the SPARQL 1.1 protocol.
pub struct SparqlClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl SparqlClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            PublicatieError::config(format!("invalid SPARQL endpoint '{endpoint}': {e}"))
        })?;

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| PublicatieError::Store(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoint })
    }

    /// Run a SELECT query and flatten the JSON results to one string map per
    /// row.
    pub async fn select(&self, query: &str) -> Result<Vec<HashMap<String, String>>> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/sparql-results+json")
            .form(&[("query", query)])
            .send()
            .await
            .map_err(|e| PublicatieError::Store(format!("query failed: {e}")))?;

        let response = check_status(response).await?;
        let results: SparqlResults = response
            .json()
            .await
            .map_err(|e| PublicatieError::Store(format!("invalid query response: {e}")))?;

        Ok(results
            .results
            .bindings
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(variable, term)| (variable, term.value))
                    .collect()
            })
            .collect())
    }

    /// Run a SPARQL update.
    pub async fn update(&self, update: &str) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .form(&[("update", update)])
            .send()
            .await
            .map_err(|e| PublicatieError::Store(format!("update failed: {e}")))?;

        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let excerpt: String = body.chars().take(200).collect();
    Err(PublicatieError::Store(format!(
        "endpoint returned {status}: {excerpt}"
    )))
}

#[derive(Deserialize)]
struct SparqlResults {
    results: SparqlResultSet,
}

#[derive(Deserialize)]
struct SparqlResultSet {
    #[serde(default)]
    bindings: Vec<HashMap<String, SparqlTerm>>,
}

#[derive(Deserialize)]
struct SparqlTerm {
    value: String,
}

// ---------------------------------------------------------------------------
// SparqlStore
// ---------------------------------------------------------------------------

/// The triple store as seen by the publishing service.
pub struct SparqlStore {
    client: SparqlClient,
    graph: String,
    share_dir: PathBuf,
}

impl SparqlStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        Ok(Self {
            client: SparqlClient::new(&config.endpoint)?,
            graph: config.graph.clone(),
            share_dir: PathBuf::from(&config.share_dir),
        })
    }

    /// Graph all extracted data is written to.
    pub fn graph(&self) -> &str {
        &self.graph
    }

    pub(crate) fn client(&self) -> &SparqlClient {
        &self.client
    }

    pub(crate) fn share_dir(&self) -> &std::path::Path {
        &self.share_dir
    }
}

#[async_trait]
impl PublicationStore for SparqlStore {
    async fn belongs_to_type(
        &self,
        resource: &PublishedResource,
        type_iri: &str,
    ) -> Result<bool> {
        let query = format!(
            "SELECT DISTINCT ?doc {{\n  GRAPH {} {{ {} {} ?doc. }}\n}}",
            escape_uri(&resource.graph),
            escape_uri(&resource.resource),
            escape_uri(type_iri),
        );
        Ok(!self.client.select(&query).await?.is_empty())
    }

    async fn persist(&self, triples: &[Triple]) -> Result<()> {
        self.persist_extracted(triples).await
    }

    async fn persist_snippet_file(&self, content: &str, subdir: &str) -> Result<String> {
        let metadata = files::persist_content_to_file(&self.share_dir, content, &[subdir])?;
        self.write_file_metadata(&metadata).await
    }

    async fn resolve_permalink(&self, session_uri: &str) -> Result<()> {
        self.insert_session_permalink(session_uri).await
    }
}
