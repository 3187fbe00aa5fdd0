//! External lookups and record enrichment for aubade.
//!
//! Implements the lookup orchestrator that finds an album in an external
//! catalog, the clients for each metadata source, and the stage that
//! fills in a per-date album record.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod enrich;
pub mod error;

pub use config::Config;
pub use enrich::lookup::{AlbumSearch, Found, LookupOrchestrator, SearchQuery};
pub use enrich::resilience::{RateLimiter, RetryPolicy};
pub use enrich::stage::EnrichStage;
pub use error::{EnrichError, EnrichResult};
