//! RDFa flattening and annotation for published meeting documents.
//!
//! This crate provides:
//! - [`RdfaDocument`] — a parsed RDFa snippet: flat triples plus a map of
//!   which DOM node introduced which subject (context tracking)
//! - [`Annotation`] / [`AnnotationValue`] — metadata-only directives applied
//!   by re-serializing the document with injected `<link>` nodes
//!
//! Parsing errors reported by the HTML parser are logged and never abort
//! flattening; whatever triples were emitted are kept.

mod annotate;
mod flatten;

use std::collections::HashMap;

use scraper::Html;
use ego_tree::NodeId;

use besluitpub_rdf::Triple;

pub use annotate::{Annotation, AnnotationValue};
pub use flatten::BASE_IRI;

/// An RDFa snippet as entered by a user in the frontend, parsed once and
/// queried for triples and annotation targets.
pub struct RdfaDocument {
    html: Html,
    triples: Vec<Triple>,
    subject_nodes: HashMap<String, NodeId>,
}

impl RdfaDocument {
    /// Parse a snippet and flatten it in a single pass.
    pub fn parse(snippet: &str) -> Self {
        let html = Html::parse_fragment(snippet);
        for error in &html.errors {
            tracing::warn!(%error, "parse anomaly in rdfa snippet");
        }

        let mut flattener = flatten::Flattener::default();
        flattener.run(&html);

        Self {
            html,
            triples: flattener.triples,
            subject_nodes: flattener.subject_nodes,
        }
    }

    /// Flatten a snippet without keeping the document around.
    pub fn flatten(snippet: &str) -> Vec<Triple> {
        Self::parse(snippet).triples
    }

    /// The triples emitted during flattening, in document order. Exact
    /// duplicates are not removed here; callers dedupe.
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Serialize the document with `<link>` annotation nodes injected as
    /// final children of each directive's target node. Directives whose
    /// target subject has no node in this document are logged and skipped.
    pub fn annotated_html(&self, annotations: &[Annotation]) -> String {
        annotate::serialize_annotated(&self.html, &self.subject_nodes, annotations)
    }
}
