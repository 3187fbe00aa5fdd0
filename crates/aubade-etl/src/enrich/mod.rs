//! Enrichment stage components.

pub mod coverart;
pub mod http;
pub mod lookup;
pub mod musicbrainz;
pub mod odesli;
pub mod resilience;
pub mod spotify;
pub mod stage;
pub mod wikidata;
pub mod wikipedia;
