//! Core domain types for the publication pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published document picked up from the store, ready for extraction.
///
/// Read-only to the extraction core; status transitions and retry accounting
/// are driven by the publisher around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedResource {
    /// Graph the resource lives in.
    pub graph: String,
    /// URI of the `sign:PublishedResource`.
    pub resource: String,
    /// The RDFa snippet to extract from. Always non-empty: file-stored
    /// snippets are resolved before the resource reaches the pipeline.
    pub rdfa_snippet: String,
    /// How many times processing has been attempted so far.
    pub number_of_retries: u32,
    /// Current publication status URI, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// When the resource was created upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

/// Processing status of a published resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicationStatus {
    Pending,
    Success,
    Failed,
}

impl PublicationStatus {
    const BASE: &'static str =
        "http://mu.semte.ch/vocabularies/ext/besluit-publicatie-publish-service/status/";

    /// The status URI written to the store.
    pub fn as_uri(&self) -> String {
        let suffix = match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        };
        format!("{}{suffix}", Self::BASE)
    }

    /// Parse a status URI back into a status, if it is one of ours.
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri.strip_prefix(Self::BASE)? {
            "pending" => Some(Self::Pending),
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uri_roundtrip() {
        for status in [
            PublicationStatus::Pending,
            PublicationStatus::Success,
            PublicationStatus::Failed,
        ] {
            assert_eq!(PublicationStatus::from_uri(&status.as_uri()), Some(status));
        }
        assert_eq!(PublicationStatus::from_uri("http://example.org/other"), None);
    }

    #[test]
    fn published_resource_serialization() {
        let resource = PublishedResource {
            graph: "http://mu.semte.ch/graphs/public".into(),
            resource: "http://data.lblod.info/published-resources/1".into(),
            rdfa_snippet: "<div/>".into(),
            number_of_retries: 2,
            status: Some(PublicationStatus::Failed.as_uri()),
            created: Some(Utc::now()),
        };

        let json = serde_json::to_string(&resource).expect("serialize");
        assert!(json.contains("number_of_retries"));
    }
}
