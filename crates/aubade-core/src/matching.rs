//! Fuzzy cross-referencing of an album against external search results.
//!
//! A target album is compared to each candidate returned by an external
//! catalog. An exact match on the normalized artist and title (plus a
//! release-year prefix when the candidate has a date) wins outright.
//! Otherwise every candidate is scored with a token-order-insensitive
//! similarity over the artist and title variants, and the best candidate
//! is accepted only if its combined score reaches the threshold.

use serde::{Deserialize, Serialize};

use crate::text::{artist_variants, normalize, title_variants};

/// Minimum combined score (0-100) for a fuzzy match.
pub const DEFAULT_THRESHOLD: f64 = 80.0;

/// A search result from an external catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Artist credit; empty when the source did not supply one.
    pub artist: String,
    pub title: String,
    /// Identifier in the external catalog (MBID, Spotify ID, ...).
    pub external_id: String,
    /// Release date as reported by the source (`YYYY`, `YYYY-MM-DD`, ...).
    pub release_date: Option<String>,
}

impl MatchCandidate {
    #[must_use]
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        external_id: impl Into<String>,
    ) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            external_id: external_id.into(),
            release_date: None,
        }
    }

    #[must_use]
    pub fn with_release_date(mut self, date: impl Into<String>) -> Self {
        self.release_date = Some(date.into());
        self
    }
}

/// The album being looked up, with its comparison forms precomputed.
#[derive(Debug, Clone)]
pub struct AlbumTarget {
    pub artist: String,
    pub title: String,
    pub year: String,
    normalized_artist: String,
    normalized_title: String,
    artist_variants: Vec<String>,
    title_variants: Vec<String>,
}

impl AlbumTarget {
    #[must_use]
    pub fn new(artist: &str, title: &str, year: &str) -> Self {
        Self {
            artist: artist.to_string(),
            title: title.to_string(),
            year: year.trim().to_string(),
            normalized_artist: normalize(artist),
            normalized_title: normalize(title),
            artist_variants: artist_variants(artist),
            title_variants: title_variants(title),
        }
    }

    #[must_use]
    pub fn artist_variants(&self) -> &[String] {
        &self.artist_variants
    }

    #[must_use]
    pub fn title_variants(&self) -> &[String] {
        &self.title_variants
    }
}

/// How a candidate was accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    Exact,
    Fuzzy { score: f64 },
}

/// An accepted candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub candidate: &'a MatchCandidate,
    pub kind: MatchKind,
}

/// Component scores of one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub artist: f64,
    pub title: f64,
    pub combined: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    threshold: f64,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl Matcher {
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Pick the best candidate for `target`, exact matches first.
    #[must_use]
    pub fn best_match<'a>(
        &self,
        target: &AlbumTarget,
        candidates: &'a [MatchCandidate],
    ) -> Option<Match<'a>> {
        if let Some(candidate) = self.exact_match(target, candidates) {
            return Some(Match {
                candidate,
                kind: MatchKind::Exact,
            });
        }

        self.fuzzy_match(target, candidates)
            .map(|(candidate, score)| Match {
                candidate,
                kind: MatchKind::Fuzzy { score },
            })
    }

    /// First candidate whose normalized artist and title equal the target's
    /// and whose release date, if any, starts with the target year.
    ///
    /// A target whose artist or title normalizes to nothing never matches
    /// exactly.
    #[must_use]
    pub fn exact_match<'a>(
        &self,
        target: &AlbumTarget,
        candidates: &'a [MatchCandidate],
    ) -> Option<&'a MatchCandidate> {
        if target.normalized_artist.is_empty() || target.normalized_title.is_empty() {
            return None;
        }
        candidates.iter().find(|c| {
            normalize(&c.artist) == target.normalized_artist
                && normalize(&c.title) == target.normalized_title
                && year_matches(c.release_date.as_deref(), &target.year)
        })
    }

    /// Highest-scoring candidate at or above the threshold. Ties keep the
    /// earliest candidate.
    #[must_use]
    pub fn fuzzy_match<'a>(
        &self,
        target: &AlbumTarget,
        candidates: &'a [MatchCandidate],
    ) -> Option<(&'a MatchCandidate, f64)> {
        let mut best: Option<(&MatchCandidate, f64)> = None;

        for candidate in candidates {
            let score = self.score(target, candidate);
            log::trace!(
                "Scored '{}' - '{}': artist {:.1}, title {:.1}, combined {:.1}",
                candidate.artist,
                candidate.title,
                score.artist,
                score.title,
                score.combined
            );
            if best.map_or(true, |(_, s)| score.combined > s) {
                best = Some((candidate, score.combined));
            }
        }

        best.filter(|&(_, score)| score >= self.threshold)
    }

    #[must_use]
    pub fn score(&self, target: &AlbumTarget, candidate: &MatchCandidate) -> Score {
        // A missing credit still expands to one (empty) variant so the
        // title alone can carry the match.
        let mut candidate_artists = artist_variants(&candidate.artist);
        if candidate_artists.is_empty() {
            candidate_artists.push(String::new());
        }
        let mut candidate_titles = title_variants(&candidate.title);
        if candidate_titles.is_empty() {
            candidate_titles.push(String::new());
        }

        let artist = best_similarity(&candidate_artists, &target.artist_variants);
        let title = best_similarity(&candidate_titles, &target.title_variants);

        Score {
            artist,
            title,
            combined: (artist + title) / 2.0,
        }
    }
}

fn year_matches(release_date: Option<&str>, year: &str) -> bool {
    match release_date.map(str::trim) {
        Some(date) if !date.is_empty() && !year.is_empty() => date.starts_with(year),
        _ => true,
    }
}

fn best_similarity(left: &[String], right: &[String]) -> f64 {
    left.iter()
        .flat_map(|l| right.iter().map(move |r| token_sort_ratio(l, r)))
        .fold(0.0, f64::max)
}

/// Token-order-insensitive similarity on a 0-100 scale.
///
/// Both strings are split on whitespace, the tokens sorted and rejoined,
/// and the results compared with normalized Levenshtein similarity. The
/// same multiset of tokens always scores 100.
#[must_use]
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&sorted_tokens(a), &sorted_tokens(b)) * 100.0
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
