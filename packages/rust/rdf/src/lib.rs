//! RDF term utilities for the besluit-publicatie pipeline.
//!
//! This crate provides:
//! - [`Triple`] — the flat statement model used throughout the pipeline
//! - [`hash_triple`] / [`dedupe_triples`] — identity-based deduplication
//! - [`vocab`] — the fixed prefix table, CURIE expansion, and well-known IRIs

pub mod triple;
pub mod vocab;

pub use triple::{Triple, dedupe_triples, find_triple_with_object, hash_triple};
pub use vocab::{DEFAULT_PREFIXES, expand_uri, expand_uri_with, is_uri};
