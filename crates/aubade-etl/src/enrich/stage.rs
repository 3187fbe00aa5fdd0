//! The enrichment stage for one album record.
//!
//! Sources are consulted one after another:
//!
//! - MusicBrainz search gives the release-group ID; its details give
//!   genres and the Wikidata, Discogs and RateYourMusic links.
//! - Cover Art Archive gives the front cover.
//! - Wikidata leads to the English Wikipedia article, whose summary
//!   becomes the description.
//! - Spotify search (credential-gated) gives the Spotify album, which
//!   Odesli expands into links on the other streaming platforms.
//!
//! Every step is best-effort. A failed or empty lookup leaves its fields
//! as they were and the stage carries on with the rest.

use std::future::Future;
use std::path::Path;

use aubade_core::matching::{AlbumTarget, Matcher};
use aubade_core::model::{AlbumRecord, ExternalIds, ExternalLinks};
use aubade_core::store::records::{read_record, write_record};

use crate::config::Config;
use crate::enrich::coverart::CoverArtClient;
use crate::enrich::lookup::{AlbumSearch, LookupOrchestrator};
use crate::enrich::musicbrainz::MusicBrainzClient;
use crate::enrich::odesli::{apply_platform_links, search_links, OdesliClient};
use crate::enrich::resilience::{RateLimiter, RetryPolicy};
use crate::enrich::spotify::{album_url, SpotifyClient};
use crate::enrich::wikidata::WikidataClient;
use crate::enrich::wikipedia::WikipediaClient;
use crate::error::EnrichResult;

#[derive(Debug)]
pub struct EnrichStage {
    musicbrainz: MusicBrainzClient,
    cover_art: CoverArtClient,
    wikidata: WikidataClient,
    wikipedia: WikipediaClient,
    spotify: SpotifyClient,
    odesli: OdesliClient,
    orchestrator: LookupOrchestrator,
    retry: RetryPolicy,
}

impl EnrichStage {
    /// Create a new `EnrichStage` from configuration.
    ///
    /// Spotify is enabled only when both client credentials are set.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be created.
    pub fn new(config: &Config) -> EnrichResult<Self> {
        let endpoints = &config.endpoints;
        let retry = RetryPolicy::new(config.requests.attempts, config.requests.retry_delay());

        let mut spotify = SpotifyClient::new(&endpoints.spotify_accounts, &endpoints.spotify_api)?;
        if let Some((id, secret)) = config.spotify_credentials() {
            spotify = spotify.with_credentials(id, secret);
        }

        Ok(Self {
            musicbrainz: MusicBrainzClient::new(&endpoints.musicbrainz)?,
            cover_art: CoverArtClient::new(&endpoints.cover_art)?,
            wikidata: WikidataClient::new(&endpoints.wikidata)?,
            wikipedia: WikipediaClient::new(&endpoints.wikipedia)?,
            spotify,
            odesli: OdesliClient::new(&endpoints.odesli)?,
            orchestrator: LookupOrchestrator::new(
                Matcher::new(config.match_threshold),
                retry,
                config.requests.query_delay(),
            ),
            retry,
        })
    }

    /// Replace the MusicBrainz rate limiter.
    #[must_use]
    pub fn with_musicbrainz_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.musicbrainz = self.musicbrainz.with_rate_limiter(rate_limiter);
        self
    }

    /// List which enrichment sources are enabled.
    #[must_use]
    pub fn enabled_sources(&self) -> Vec<&str> {
        let mut sources = vec!["musicbrainz", "coverartarchive", "wikidata", "wikipedia"];
        if self.spotify.is_available() {
            sources.push("spotify");
        }
        sources.push("odesli");
        sources
    }

    /// Fill in the enrichment fields of `record`.
    pub async fn enrich(&self, record: &mut AlbumRecord) {
        let target = AlbumTarget::new(&record.artist, &record.title, &record.year);
        log::info!("Enriching '{}' by '{}' ({})", record.title, record.artist, record.year);

        let mut ids = record.external_ids.take().unwrap_or_default();
        let mut links = record.external_links.take().unwrap_or_default();

        if let Some(found) = self.orchestrator.find(&self.musicbrainz, &target).await {
            let mbid = found.candidate.external_id;
            self.enrich_from_musicbrainz(&mbid, record, &mut links).await;
            ids.musicbrainz = Some(mbid);
        }
        if record.genres.is_none() {
            record.genres = Some(Vec::new());
        }

        if let Some(title) = self.wikipedia_title(&links).await {
            links.wikipedia = Some(self.wikipedia.article_url(&title));
            if let Some(description) = self
                .soft("Wikipedia summary", || self.wikipedia.summary(&title))
                .await
                .flatten()
            {
                record.description = Some(description);
            }
        }

        if let Some(found) = self.orchestrator.find(&self.spotify, &target).await {
            ids.spotify = Some(found.candidate.external_id);
        }
        self.enrich_streaming_links(record, &ids).await;

        record.external_ids = Some(ids);
        record.external_links = Some(links);
    }

    /// Enrich the record file at `path` in place.
    ///
    /// # Errors
    /// Returns an error only if the record cannot be read or written.
    pub async fn enrich_file(&self, path: &Path) -> EnrichResult<AlbumRecord> {
        let mut record = read_record(path)?;
        self.enrich(&mut record).await;
        write_record(path, &record)?;
        log::info!("Wrote enriched record {}", path.display());
        Ok(record)
    }

    async fn enrich_from_musicbrainz(
        &self,
        mbid: &str,
        record: &mut AlbumRecord,
        links: &mut ExternalLinks,
    ) {
        if let Some(details) = self
            .soft("MusicBrainz release group", || self.musicbrainz.release_group(mbid))
            .await
        {
            let genres = details.genre_names();
            if !genres.is_empty() {
                record.genres = Some(genres);
            }
            links.wikidata = details.wikidata_url().or(links.wikidata.take());
            links.discogs = details.discogs_url().or(links.discogs.take());
            links.rateyourmusic = details.rateyourmusic_url().or(links.rateyourmusic.take());
        }

        match self
            .soft("Cover Art Archive", || self.cover_art.front_cover(mbid))
            .await
            .flatten()
        {
            Some(cover) => record.cover_art = Some(cover),
            None => log::debug!("No cover art for release group {}", mbid),
        }
    }

    async fn wikipedia_title(&self, links: &ExternalLinks) -> Option<String> {
        let wikidata_url = links.wikidata.as_deref()?;
        self.soft("Wikidata entity", || self.wikidata.enwiki_title(wikidata_url))
            .await
            .flatten()
    }

    async fn enrich_streaming_links(&self, record: &mut AlbumRecord, ids: &ExternalIds) {
        let mut streaming = search_links(&record.artist, &record.title);

        if let Some(spotify_id) = &ids.spotify {
            let spotify_url = album_url(spotify_id);
            streaming.spotify.clone_from(&spotify_url);
            if let Some(platforms) = self
                .soft("Odesli links", || self.odesli.links(&spotify_url))
                .await
            {
                apply_platform_links(&mut streaming, &platforms);
            }
        }

        record.streaming_links = Some(streaming);
    }

    /// Run one call under the retry policy, turning failure into `None`.
    async fn soft<T, F, Fut>(&self, what: &str, op: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = EnrichResult<T>>,
    {
        match self.retry.run(what, op).await {
            Ok(value) => Some(value),
            Err(e) if e.is_not_found() => {
                log::debug!("{}: {}", what, e);
                None
            }
            Err(e) => {
                log::warn!("{} failed, leaving its fields unchanged: {}", what, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_sources_without_spotify() {
        let stage = EnrichStage::new(&Config::default()).unwrap();
        let sources = stage.enabled_sources();
        assert!(sources.contains(&"musicbrainz"));
        assert!(!sources.contains(&"spotify"));
    }

    #[test]
    fn test_enabled_sources_with_spotify() {
        let config = Config {
            spotify_client_id: Some("id".to_string()),
            spotify_client_secret: Some("secret".to_string()),
            ..Config::default()
        };
        let stage = EnrichStage::new(&config).unwrap();
        assert!(stage.enabled_sources().contains(&"spotify"));
    }
}
