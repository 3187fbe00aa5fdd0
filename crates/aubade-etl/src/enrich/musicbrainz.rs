//! MusicBrainz release-group search and details.
//!
//! Search uses the Lucene query syntax of the `/release-group` endpoint.
//! Details fetch genres, tags and URL relations, from which the Wikidata,
//! Discogs and RateYourMusic links are taken.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use aubade_core::matching::MatchCandidate;

use crate::enrich::http::{base_url, client, get_json};
use crate::enrich::lookup::{AlbumSearch, SearchQuery};
use crate::enrich::resilience::RateLimiter;
use crate::error::EnrichResult;

const SOURCE: &str = "MusicBrainz";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "release-groups", default)]
    release_groups: Vec<MbReleaseGroup>,
}

#[derive(Debug, Deserialize)]
pub struct MbReleaseGroup {
    pub id: String,
    pub title: String,
    #[serde(rename = "first-release-date")]
    pub first_release_date: Option<String>,
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<MbArtistCredit>,
}

#[derive(Debug, Deserialize)]
pub struct MbArtistCredit {
    pub name: String,
}

/// A release group with genres, tags and URL relations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MbReleaseGroupDetails {
    pub id: String,
    #[serde(default)]
    pub genres: Vec<MbNamed>,
    #[serde(default)]
    pub tags: Vec<MbNamed>,
    #[serde(default)]
    pub relations: Vec<MbRelation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MbNamed {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MbRelation {
    #[serde(rename = "type")]
    pub relation_type: String,
    pub url: Option<MbUrl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MbUrl {
    pub resource: String,
}

impl MbReleaseGroupDetails {
    /// Genre names, falling back to folksonomy tags when there are none.
    pub fn genre_names(&self) -> Vec<String> {
        let source = if self.genres.is_empty() {
            &self.tags
        } else {
            &self.genres
        };
        source.iter().map(|g| g.name.clone()).collect()
    }

    fn first_url(&self, accept: impl Fn(&MbRelation, &str) -> bool) -> Option<String> {
        self.relations.iter().find_map(|rel| {
            rel.url
                .as_ref()
                .filter(|url| accept(rel, &url.resource))
                .map(|url| url.resource.clone())
        })
    }

    pub fn wikidata_url(&self) -> Option<String> {
        self.first_url(|rel, _| rel.relation_type == "wikidata")
    }

    pub fn discogs_url(&self) -> Option<String> {
        self.first_url(|rel, _| rel.relation_type == "discogs")
    }

    pub fn rateyourmusic_url(&self) -> Option<String> {
        self.first_url(|_, url| url.contains("rateyourmusic.com/release/"))
    }
}

/// MusicBrainz API client.
///
/// Calls are paced by a per-source [`RateLimiter`] at 1 request/second,
/// as required by the MusicBrainz API.
#[derive(Debug, Clone)]
pub struct MusicBrainzClient {
    http: Client,
    base_url: String,
    rate_limiter: RateLimiter,
}

impl MusicBrainzClient {
    /// Create a new MusicBrainz client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base: &str) -> EnrichResult<Self> {
        Ok(Self {
            http: client()?,
            base_url: base_url(base),
            rate_limiter: RateLimiter::new(1),
        })
    }

    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Search release groups, returning up to five candidates.
    pub async fn search_release_groups(&self, query: &SearchQuery) -> EnrichResult<Vec<MatchCandidate>> {
        self.rate_limiter.acquire().await;

        let lucene = lucene_query(query);
        let request = self
            .http
            .get(format!("{}/release-group/", self.base_url))
            .query(&[("query", lucene.as_str()), ("fmt", "json"), ("limit", "5")]);
        let response: SearchResponse = get_json(request, SOURCE).await?;

        Ok(response
            .release_groups
            .into_iter()
            .map(|rg| {
                let artist = rg
                    .artist_credit
                    .first()
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                let candidate = MatchCandidate::new(artist, rg.title, rg.id);
                match rg.first_release_date {
                    Some(date) if !date.is_empty() => candidate.with_release_date(date),
                    _ => candidate,
                }
            })
            .collect())
    }

    /// Get a release group with genres, tags and URL relations.
    pub async fn release_group(&self, mbid: &str) -> EnrichResult<MbReleaseGroupDetails> {
        self.rate_limiter.acquire().await;

        let url = format!(
            "{}/release-group/{}?inc=genres+tags+url-rels&fmt=json",
            self.base_url, mbid
        );
        get_json(self.http.get(&url), SOURCE).await
    }
}

#[async_trait]
impl AlbumSearch for MusicBrainzClient {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn search(&self, query: &SearchQuery) -> EnrichResult<Vec<MatchCandidate>> {
        self.search_release_groups(query).await
    }
}

/// Render a query in MusicBrainz Lucene syntax.
pub fn lucene_query(query: &SearchQuery) -> String {
    let mut terms = Vec::with_capacity(4);
    if let Some(title) = &query.title {
        terms.push(format!("releasegroup:\"{}\"", escape(title)));
    }
    terms.push(format!("artist:\"{}\"", escape(&query.artist)));
    if let Some(year) = &query.year {
        terms.push(format!("firstreleasedate:{}", escape(year)));
    }
    terms.push("primarytype:album".to_string());
    terms.join(" AND ")
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
