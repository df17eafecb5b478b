//! End-to-end extraction pipeline for one published resource.
//!
//! Assumes
//! ------
//!  - every RDFa snippet contains a Zitting;
//!  - all extracted resources are linked to that Zitting;
//!  - the application profile is extended with agenda, uittreksel and
//!    besluitenlijst container resources to ease management of extracted
//!    data.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sha2::{Digest, Sha256};
use tracing::instrument;
use uuid::Uuid;

use besluitpub_rdf::vocab::{
    BESLUIT_AANGEBRACHT_NA, BESLUIT_AGENDAPUNT, BESLUIT_BEHANDELT, BESLUIT_BVAP,
    BESLUIT_GEBEURT_NA, BESLUIT_HEEFT_AGENDAPUNT, BESLUIT_HEEFT_NOTULEN, ELI_DATE_PUBLICATION,
    EXT_AGENDA, EXT_AGENDA_AGENDAPUNT, EXT_AGENDA_TYPE, EXT_BESLUITENLIJST,
    EXT_BESLUITENLIJST_BESLUIT, EXT_BESLUITENLIJST_TYPE, EXT_NOTULEN_TYPE,
    EXT_PUBLISHES_AGENDA, EXT_PUBLISHES_BEHANDELING, EXT_PUBLISHES_BESLUITENLIJST,
    EXT_PUBLISHES_NOTULEN, EXT_UITTREKSEL, EXT_UITTREKSEL_BVAP, EXT_UITTREKSEL_TYPE,
    PROV_GENERATED, PROV_VALUE, RDFS_RESOURCE, XSD_DATE,
};
use besluitpub_rdf::{Triple, dedupe_triples, expand_uri};
use besluitpub_rdfa::RdfaDocument;
use besluitpub_shared::{PublicatieError, PublishedResource, Result};

use crate::decisions::decision_annotations;
use crate::link::{find_session_subject, link_to_container, link_to_origin, link_to_session};
use crate::ordering::{order_chain, retain_uri_links};
use crate::profiles;
use crate::select::select_entities;

const AGENDA_BASE: &str = "http://data.lblod.info/id/lblod/agendas/";
const UITTREKSEL_BASE: &str = "http://data.lblod.info/id/lblod/uittreksels/";
const BESLUITENLIJST_BASE: &str = "http://data.lblod.info/id/lblod/besluitenlijsten/";
const NOTULEN_BASE: &str = "http://data.lblod.info/id/lblod/notulen/";

/// External collaborators the pipeline drives: capability checks, triple
/// persistence, file persistence, and permalink resolution.
#[async_trait]
pub trait PublicationStore: Send + Sync {
    /// Whether the published resource declares the given "publishes-X" type.
    async fn belongs_to_type(
        &self,
        resource: &PublishedResource,
        type_iri: &str,
    ) -> Result<bool>;

    /// Persist one fully expanded, profile-checked triple batch.
    async fn persist(&self, triples: &[Triple]) -> Result<()>;

    /// Persist large snippet content to the shared drive and return the
    /// logical file URI it is reachable under.
    async fn persist_snippet_file(&self, content: &str, subdir: &str) -> Result<String>;

    /// Derive and store the session's permalink from organizational data
    /// already in the store.
    async fn resolve_permalink(&self, session_uri: &str) -> Result<()>;
}

/// Extract, link, and persist everything a published resource carries.
#[instrument(skip_all, fields(resource = %resource.resource))]
pub async fn run_pipeline<S: PublicationStore>(
    resource: &PublishedResource,
    store: &S,
) -> Result<()> {
    let doc = RdfaDocument::parse(&resource.rdfa_snippet);
    let triples = preprocess(dedupe_triples(doc.triples().to_vec()));

    // Everything below links against the session; check it once up front.
    let session =
        find_session_subject(&triples).ok_or(PublicatieError::MissingSession)?;
    let today = Utc::now().date_naive();

    insert_zitting(&triples, resource, store).await?;

    if store.belongs_to_type(resource, EXT_PUBLISHES_AGENDA).await? {
        insert_agenda(&triples, &session, resource, store).await?;
    }
    if store
        .belongs_to_type(resource, EXT_PUBLISHES_BEHANDELING)
        .await?
    {
        insert_uittreksel(&triples, &doc, &session, resource, today, store).await?;
    }
    if store
        .belongs_to_type(resource, EXT_PUBLISHES_BESLUITENLIJST)
        .await?
    {
        insert_besluitenlijst(&triples, &session, resource, today, store).await?;
    }
    if store.belongs_to_type(resource, EXT_PUBLISHES_NOTULEN).await? {
        insert_notulen(&triples, &doc, &session, resource, today, store).await?;
    }

    store.resolve_permalink(&session).await?;
    Ok(())
}

/// Remap the legacy agenda-item predicate and drop blank IRI-position
/// artifacts the parser produces for whitespace `resource` attributes.
pub fn preprocess(triples: Vec<Triple>) -> Vec<Triple> {
    triples
        .into_iter()
        .map(|mut t| {
            if t.has_predicate(BESLUIT_HEEFT_AGENDAPUNT) {
                t.predicate = BESLUIT_BEHANDELT.into();
            }
            t
        })
        .filter(|t| {
            !(t.datatype.as_deref().is_some_and(|d| expand_uri(d) == RDFS_RESOURCE)
                && t.object.trim().is_empty())
        })
        .collect()
}

/// The session entity itself: profiled source triples plus the origin link.
async fn insert_zitting<S: PublicationStore>(
    triples: &[Triple],
    resource: &PublishedResource,
    store: &S,
) -> Result<()> {
    let data = select_entities(triples, &profiles::ZITTING);
    let data = link_to_origin(data, &resource.resource);
    store.persist(&dedupe_triples(data)).await
}

/// Agenda: a minted container holding the ordered agenda items.
async fn insert_agenda<S: PublicationStore>(
    triples: &[Triple],
    session: &str,
    resource: &PublishedResource,
    store: &S,
) -> Result<()> {
    let agenda = mint_subject(AGENDA_BASE);
    let mut bundle = vec![Triple::a(agenda.as_str(), EXT_AGENDA_TYPE)];
    bundle = link_to_session(bundle, session, EXT_AGENDA);
    bundle.push(Triple::new(
        agenda.as_str(),
        PROV_VALUE,
        resource.rdfa_snippet.as_str(),
    ));
    bundle = link_to_origin(bundle, &resource.resource);

    // The order walk needs the relation to point at resources.
    let walkable = retain_uri_links(triples, BESLUIT_AANGEBRACHT_NA);
    let mut punten = select_entities(&walkable, &profiles::AGENDAPUNT);
    punten = link_to_session(punten, session, BESLUIT_BEHANDELT);
    punten = dedupe_triples(punten);
    punten = order_chain(punten, BESLUIT_AGENDAPUNT, BESLUIT_AANGEBRACHT_NA);
    punten = link_to_container(punten, &agenda, EXT_AGENDA_AGENDAPUNT);

    bundle.extend(punten);
    store.persist(&bundle).await
}

/// Uittreksel: the annotated snippet plus the treatments and decisions it
/// covers.
async fn insert_uittreksel<S: PublicationStore>(
    triples: &[Triple],
    doc: &RdfaDocument,
    session: &str,
    resource: &PublishedResource,
    today: NaiveDate,
    store: &S,
) -> Result<()> {
    let uittreksel = mint_subject(UITTREKSEL_BASE);
    let mut bundle = vec![Triple::a(uittreksel.as_str(), EXT_UITTREKSEL_TYPE)];
    bundle = link_to_session(bundle, session, EXT_UITTREKSEL);
    bundle = link_to_origin(bundle, &resource.resource);

    let enriched = doc.annotated_html(&decision_annotations(triples, today));
    bundle.push(Triple::new(uittreksel.as_str(), PROV_VALUE, enriched));

    let mut bvaps = select_entities(triples, &profiles::BVAP);
    bvaps = dedupe_triples(bvaps);
    bvaps = link_to_container(bvaps, &uittreksel, EXT_UITTREKSEL_BVAP);

    let besluiten = dedupe_triples(select_entities(triples, &profiles::BESLUIT));

    bundle.extend(bvaps);
    bundle.extend(besluiten);
    store.persist(&bundle).await
}

/// Besluitenlijst: a minted, dated container linking the decisions, with the
/// treatments ordered and the votes carried along.
async fn insert_besluitenlijst<S: PublicationStore>(
    triples: &[Triple],
    session: &str,
    resource: &PublishedResource,
    today: NaiveDate,
    store: &S,
) -> Result<()> {
    let lijst = mint_subject(BESLUITENLIJST_BASE);
    let mut bundle = vec![Triple::a(lijst.as_str(), EXT_BESLUITENLIJST_TYPE)];
    bundle = link_to_session(bundle, session, EXT_BESLUITENLIJST);
    bundle = link_to_origin(bundle, &resource.resource);
    bundle.push(Triple::new(
        lijst.as_str(),
        PROV_VALUE,
        resource.rdfa_snippet.as_str(),
    ));
    bundle.push(Triple::typed(
        lijst.as_str(),
        ELI_DATE_PUBLICATION,
        today.format("%Y-%m-%d").to_string(),
        XSD_DATE,
    ));

    let walkable = retain_uri_links(triples, BESLUIT_GEBEURT_NA);
    let mut bvaps = select_entities(&walkable, &profiles::BVAP);
    bvaps = dedupe_triples(bvaps);
    bvaps = order_chain(bvaps, BESLUIT_BVAP, BESLUIT_GEBEURT_NA);

    let mut besluiten = select_entities(triples, &profiles::BESLUIT);
    besluiten = link_to_container(besluiten, &lijst, EXT_BESLUITENLIJST_BESLUIT);
    besluiten = dedupe_triples(besluiten);

    let stemmingen = dedupe_triples(select_entities(triples, &profiles::STEMMING));

    bundle.extend(bvaps);
    bundle.extend(besluiten);
    bundle.extend(stemmingen);
    store.persist(&bundle).await
}

/// Notulen: the annotated snippet goes to the shared drive; the entity gets
/// a stable, session-derived identifier so re-publication stays idempotent.
async fn insert_notulen<S: PublicationStore>(
    triples: &[Triple],
    doc: &RdfaDocument,
    session: &str,
    resource: &PublishedResource,
    today: NaiveDate,
    store: &S,
) -> Result<()> {
    let subject = notulen_subject(session);
    let mut bundle = vec![Triple::a(subject.as_str(), EXT_NOTULEN_TYPE)];

    let enriched = doc.annotated_html(&decision_annotations(triples, today));
    let file_uri = store
        .persist_snippet_file(&enriched, "enriched-notulen")
        .await?;
    // prov:generated mirrors how file content is linked to published
    // resources coming in from the editor.
    bundle.push(Triple::new(subject.as_str(), PROV_GENERATED, file_uri));

    bundle = link_to_session(bundle, session, BESLUIT_HEEFT_NOTULEN);
    bundle = link_to_origin(bundle, &resource.resource);
    store.persist(&dedupe_triples(bundle)).await
}

fn mint_subject(base: &str) -> String {
    format!("{base}{}", Uuid::now_v7())
}

/// Stable identifier: hash of the session URI, so the same session's minutes
/// always resolve to the same subject.
fn notulen_subject(session: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(session.as_bytes());
    format!("{NOTULEN_BASE}{:x}", hasher.finalize())
}
