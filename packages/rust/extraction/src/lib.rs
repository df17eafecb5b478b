//! Extraction-and-linking core of the besluit-publicatie service.
//!
//! Turns the flat triples of one published RDFa snippet into linked,
//! profiled entity groups and hands them to the persistence collaborator:
//!
//! - [`profiles`] — per-entity-type predicate whitelists with value kinds
//! - [`select`] — candidate selection against a profile
//! - [`ordering`] — "occurs after" chain reconstruction into positions
//! - [`link`] — session/container/origin linking
//! - [`decisions`] — inferred annotations for decision sub-documents
//! - [`pipeline`] — the per-resource orchestrator and the
//!   [`PublicationStore`](pipeline::PublicationStore) collaborator trait

pub mod decisions;
pub mod link;
pub mod ordering;
pub mod pipeline;
pub mod profiles;
pub mod select;

pub use decisions::decision_annotations;
pub use link::{find_session_subject, link_to_container, link_to_origin, link_to_session};
pub use ordering::{order_chain, retain_uri_links};
pub use pipeline::{PublicationStore, preprocess, run_pipeline};
pub use profiles::{Profile, ValueKind, value_kind};
pub use select::select_entities;
