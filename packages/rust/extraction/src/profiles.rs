//! Per-entity-type predicate profiles ("points of interest").
//!
//! We are conservative in what we persist; the profiles follow the
//! applicatieprofiel. A triple on a matching subject whose predicate is not
//! listed is silently dropped — data minimization, not an accident.
//!
//! Each predicate carries a [`ValueKind`] so the persistence layer knows how
//! to serialize the object without a store-specific escape table in the core.

use besluitpub_rdf::vocab::*;

/// How a predicate's object should be serialized by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Uri,
    Text,
    Date,
    DateTime,
    Int,
    Bool,
}

/// A target entity type with its whitelisted predicates.
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    /// The `rdf:type` IRI this profile selects on.
    pub type_iri: &'static str,
    /// Allowed predicates and their serialization kinds.
    pub points_of_interest: &'static [(&'static str, ValueKind)],
}

impl Profile {
    /// The whitelisted predicate IRIs, in profile order.
    pub fn predicates(&self) -> impl Iterator<Item = &'static str> {
        self.points_of_interest.iter().map(|(p, _)| *p)
    }
}

use ValueKind::{Bool, Date, DateTime, Int, Text, Uri};

pub const ZITTING: Profile = Profile {
    type_iri: BESLUIT_ZITTING,
    points_of_interest: &[
        (RDF_TYPE, Uri),
        (BESLUIT_GEPLANDE_START, DateTime),
        (PROV_STARTED_AT_TIME, DateTime),
        (BESLUIT_IS_GEHOUDEN_DOOR, Uri),
        (BESLUIT_BEHANDELT, Uri),
        (PROV_ENDED_AT_TIME, DateTime),
        (BESLUIT_HEEFT_AANWEZIGE_BIJ_START, Uri),
        (BESLUIT_HEEFT_NOTULEN, Uri),
        (BESLUIT_HEEFT_SECRETARIS, Uri),
        (BESLUIT_HEEFT_VOORZITTER, Uri),
        (BESLUIT_HEEFT_ZITTINGSVERSLAG, Uri),
        (PROV_AT_LOCATION, Text),
        (PROV_WAS_DERIVED_FROM, Uri),
    ],
};

pub const AGENDAPUNT: Profile = Profile {
    type_iri: BESLUIT_AGENDAPUNT,
    points_of_interest: &[
        (RDF_TYPE, Uri),
        (BESLUIT_AANGEBRACHT_NA, Uri),
        (DCT_DESCRIPTION, Text),
        (BESLUIT_GEPLAND_OPENBAAR, Bool),
        (BESLUIT_HEEFT_ONTWERPBESLUIT, Uri),
        (DCT_REFERENCES, Uri),
        (DCT_TITLE, Text),
        (BESLUIT_AGENDAPUNT_TYPE, Uri),
        (SCHEMA_POSITION, Int),
        (PROV_WAS_DERIVED_FROM, Uri),
        (BESLUIT_BEHANDELT, Uri),
    ],
};

pub const BVAP: Profile = Profile {
    type_iri: BESLUIT_BVAP,
    points_of_interest: &[
        (RDF_TYPE, Uri),
        (BESLUIT_GEBEURT_NA, Uri),
        (PROV_GENERATED, Uri),
        (BESLUIT_HEEFT_AANWEZIGE, Uri),
        (DCT_SUBJECT, Uri),
        (BESLUIT_HEEFT_SECRETARIS, Uri),
        (BESLUIT_HEEFT_STEMMING, Uri),
        (BESLUIT_HEEFT_VOORZITTER, Uri),
        (BESLUIT_OPENBAAR, Bool),
        (SCHEMA_POSITION, Int),
        (PROV_WAS_DERIVED_FROM, Uri),
        (EXT_LINKED_BVAP, Uri),
    ],
};

pub const BESLUIT: Profile = Profile {
    type_iri: BESLUIT_BESLUIT,
    points_of_interest: &[
        (RDF_TYPE, Uri),
        (ELI_DESCRIPTION, Text),
        (ELI_TITLE_SHORT, Text),
        (BESLUIT_MOTIVERING, Text),
        (ELI_DATE_PUBLICATION, Date),
        (ELI_REALIZES, Uri),
        (PROV_WAS_GENERATED_BY, Uri),
        (ELI_TITLE, Text),
        (ELI_LANGUAGE, Text),
        (ELI_HAS_PART, Text),
        (PROV_VALUE, Text),
        (PROV_WAS_DERIVED_FROM, Uri),
        (EXT_LINKED_BESLUIT, Uri),
        (ELI_RELATED_TO, Uri),
    ],
};

pub const STEMMING: Profile = Profile {
    type_iri: BESLUIT_STEMMING,
    points_of_interest: &[
        (RDF_TYPE, Uri),
        (BESLUIT_ONDERWERP, Text),
        (BESLUIT_GEVOLG, Text),
    ],
};

// Derived containers. Nothing is selected from the source for these; their
// profiles describe the predicates the pipeline mints on them (and on the
// session pointing at them), so persistence can serialize the bundles.

pub const AGENDA: Profile = Profile {
    type_iri: EXT_AGENDA_TYPE,
    points_of_interest: &[
        (RDF_TYPE, Uri),
        (EXT_AGENDA_AGENDAPUNT, Uri),
        (PROV_VALUE, Text),
        (EXT_AGENDA, Uri),
        (PROV_WAS_DERIVED_FROM, Uri),
    ],
};

pub const BESLUITENLIJST: Profile = Profile {
    type_iri: EXT_BESLUITENLIJST_TYPE,
    points_of_interest: &[
        (RDF_TYPE, Uri),
        (EXT_BESLUITENLIJST_BESLUIT, Uri),
        (PROV_VALUE, Text),
        (ELI_DATE_PUBLICATION, Date),
        (EXT_BESLUITENLIJST, Uri),
        (PROV_WAS_DERIVED_FROM, Uri),
    ],
};

pub const UITTREKSEL: Profile = Profile {
    type_iri: EXT_UITTREKSEL_TYPE,
    points_of_interest: &[
        (RDF_TYPE, Uri),
        (EXT_UITTREKSEL_BVAP, Uri),
        (PROV_VALUE, Text),
        (EXT_UITTREKSEL, Uri),
        (PROV_WAS_DERIVED_FROM, Uri),
    ],
};

pub const NOTULEN: Profile = Profile {
    type_iri: EXT_NOTULEN_TYPE,
    points_of_interest: &[
        (RDF_TYPE, Uri),
        (PROV_VALUE, Text),
        (PROV_GENERATED, Uri),
        (BESLUIT_HEEFT_NOTULEN, Uri),
        (PROV_WAS_DERIVED_FROM, Uri),
    ],
};

/// All profiles, member entities first.
pub const ALL: &[Profile] = &[
    ZITTING,
    AGENDAPUNT,
    BVAP,
    BESLUIT,
    STEMMING,
    AGENDA,
    BESLUITENLIJST,
    UITTREKSEL,
    NOTULEN,
];

/// Serialization kind for an (expanded) predicate, looked up across every
/// profile. `None` means the pipeline never emits the predicate and the
/// store should refuse the triple.
pub fn value_kind(predicate_iri: &str) -> Option<ValueKind> {
    ALL.iter()
        .flat_map(|profile| profile.points_of_interest.iter())
        .find(|(predicate, _)| *predicate == predicate_iri)
        .map(|(_, kind)| *kind)
}
