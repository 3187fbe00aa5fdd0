//! Lookup orchestration: find an album in an external catalog.
//!
//! The orchestrator widens the search gradually. For every pair of artist
//! and title variants it tries, in order:
//!
//! 1. title + artist + year
//! 2. title + artist
//! 3. artist + year
//! 4. artist
//!
//! each restricted to albums. Each query is retried on transient failures;
//! a query that still fails, or whose results do not match, moves the
//! search on to the next one. The first match wins. Not finding the album
//! is an ordinary outcome, not an error.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use aubade_core::matching::{AlbumTarget, MatchCandidate, MatchKind, Matcher};

use crate::enrich::resilience::RetryPolicy;
use crate::error::{EnrichError, EnrichResult};

/// One search against an external catalog. The release type is always
/// "album"; providers add it in their own query syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    pub artist: String,
    pub title: Option<String>,
    pub year: Option<String>,
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(title) = &self.title {
            write!(f, "title={title:?} ")?;
        }
        write!(f, "artist={:?}", self.artist)?;
        if let Some(year) = &self.year {
            write!(f, " year={year}")?;
        }
        Ok(())
    }
}

/// The prioritized, de-duplicated query list for `target`.
///
/// Queries that need a year are left out when the target has none. A
/// variant list that normalizes to nothing (non-Latin script, punctuation
/// only) falls back to the trimmed raw string, and the artist-only queries
/// are built even when there is no usable title.
pub fn build_queries(target: &AlbumTarget) -> Vec<SearchQuery> {
    let year = Some(target.year.clone()).filter(|y| !y.is_empty());
    let artists = variants_or_raw(target.artist_variants(), &target.artist);
    let titles = variants_or_raw(target.title_variants(), &target.title);
    let mut seen = HashSet::new();
    let mut queries = Vec::new();

    for artist in &artists {
        let title_shapes = titles
            .iter()
            .flat_map(|title| [(Some(title), true), (Some(title), false)]);
        let shapes = title_shapes.chain([(None, true), (None, false)]);
        for (title, with_year) in shapes {
            if with_year && year.is_none() {
                continue;
            }
            let query = SearchQuery {
                artist: artist.clone(),
                title: title.cloned(),
                year: if with_year { year.clone() } else { None },
            };
            if seen.insert(query.clone()) {
                queries.push(query);
            }
        }
    }

    queries
}

fn variants_or_raw(variants: &[String], raw: &str) -> Vec<String> {
    if !variants.is_empty() {
        return variants.to_vec();
    }
    let raw = raw.trim();
    if raw.is_empty() {
        Vec::new()
    } else {
        vec![raw.to_string()]
    }
}

/// An external catalog that can be searched for albums.
#[async_trait]
pub trait AlbumSearch: Send + Sync {
    /// Human-readable source name for logs.
    fn name(&self) -> &'static str;

    /// Whether the source can be queried at all (credentials present).
    fn is_available(&self) -> bool {
        true
    }

    /// Run one query and return the candidates in the source's order.
    async fn search(&self, query: &SearchQuery) -> EnrichResult<Vec<MatchCandidate>>;
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Found {
    pub candidate: MatchCandidate,
    pub kind: MatchKind,
    pub query: SearchQuery,
}

/// Drives an [`AlbumSearch`] through the query list.
#[derive(Debug, Clone, Copy)]
pub struct LookupOrchestrator {
    matcher: Matcher,
    retry: RetryPolicy,
    query_delay: Duration,
}

impl Default for LookupOrchestrator {
    fn default() -> Self {
        Self::new(Matcher::default(), RetryPolicy::default(), Duration::from_secs(1))
    }
}

impl LookupOrchestrator {
    pub fn new(matcher: Matcher, retry: RetryPolicy, query_delay: Duration) -> Self {
        Self {
            matcher,
            retry,
            query_delay,
        }
    }

    /// Search `source` for `target`, returning the first accepted match.
    pub async fn find(&self, source: &dyn AlbumSearch, target: &AlbumTarget) -> Option<Found> {
        let name = source.name();
        if !source.is_available() {
            log::info!("Skipping {} lookup: no credentials configured", name);
            return None;
        }

        let queries = build_queries(target);
        if queries.is_empty() {
            log::warn!(
                "Skipping {} lookup for '{}' by '{}': nothing to search for",
                name,
                target.title,
                target.artist
            );
            return None;
        }
        log::debug!(
            "{} lookup for '{}' by '{}': {} queries",
            name,
            target.title,
            target.artist,
            queries.len()
        );

        for (i, query) in queries.into_iter().enumerate() {
            if i > 0 && !self.query_delay.is_zero() {
                tokio::time::sleep(self.query_delay).await;
            }

            let what = format!("{name} search ({query})");
            let candidates = match self.retry.run(&what, || source.search(&query)).await {
                Ok(candidates) => candidates,
                Err(EnrichError::MissingCredentials { .. }) => {
                    log::info!("Skipping {} lookup: no credentials configured", name);
                    return None;
                }
                Err(e) => {
                    log::warn!("{} gave up: {}", what, e);
                    continue;
                }
            };

            log::debug!("{} returned {} candidates", what, candidates.len());
            if let Some(found) = self.matcher.best_match(target, &candidates) {
                log::info!(
                    "Found '{}' by '{}' in {} with query {} ({:?})",
                    found.candidate.title,
                    found.candidate.artist,
                    name,
                    query,
                    found.kind
                );
                return Some(Found {
                    candidate: found.candidate.clone(),
                    kind: found.kind,
                    query,
                });
            }
        }

        log::info!("No {} match for '{}' by '{}'", name, target.title, target.artist);
        None
    }
}
