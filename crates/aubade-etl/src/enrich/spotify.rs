//! Spotify album search via the client-credentials flow.
//!
//! Without both a client ID and secret the client reports itself as
//! unavailable and the lookup is skipped.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use aubade_core::matching::MatchCandidate;

use crate::enrich::http::{base_url, client, get_json};
use crate::enrich::lookup::{AlbumSearch, SearchQuery};
use crate::error::{EnrichError, EnrichResult};

const SOURCE: &str = "Spotify";

#[derive(Debug, Clone)]
struct Credentials {
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    albums: Option<AlbumPage>,
}

#[derive(Debug, Deserialize)]
struct AlbumPage {
    #[serde(default)]
    items: Vec<SpotifyAlbum>,
}

#[derive(Debug, Deserialize)]
struct SpotifyAlbum {
    id: String,
    name: String,
    release_date: Option<String>,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: String,
}

/// Public album page for a Spotify album ID.
pub fn album_url(id: &str) -> String {
    format!("https://open.spotify.com/album/{id}")
}

/// Render a query in Spotify's field-filter syntax.
pub fn spotify_query(query: &SearchQuery) -> String {
    let mut terms = vec![format!("artist:{}", query.artist)];
    if let Some(title) = &query.title {
        terms.push(format!("album:{title}"));
    }
    if let Some(year) = &query.year {
        terms.push(format!("year:{year}"));
    }
    terms.join(" ")
}

#[derive(Debug)]
pub struct SpotifyClient {
    http: Client,
    accounts_url: String,
    api_url: String,
    credentials: Option<Credentials>,
    token: Mutex<Option<String>>,
}

impl SpotifyClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(accounts_base: &str, api_base: &str) -> EnrichResult<Self> {
        Ok(Self {
            http: client()?,
            accounts_url: base_url(accounts_base),
            api_url: base_url(api_base),
            credentials: None,
            token: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn with_credentials(mut self, client_id: &str, client_secret: &str) -> Self {
        self.credentials = Some(Credentials {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        });
        self
    }

    /// A bearer token, fetched once and reused for the client's lifetime.
    async fn access_token(&self) -> EnrichResult<String> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| EnrichError::MissingCredentials {
                source_name: SOURCE.to_string(),
            })?;

        let mut token = self.token.lock().await;
        if let Some(cached) = token.as_ref() {
            return Ok(cached.clone());
        }

        let basic = BASE64.encode(format!(
            "{}:{}",
            credentials.client_id, credentials.client_secret
        ));
        let request = self
            .http
            .post(format!("{}/api/token", self.accounts_url))
            .header(AUTHORIZATION, format!("Basic {basic}"))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials");
        let response: TokenResponse = get_json(request, SOURCE).await?;

        log::debug!("Obtained Spotify access token");
        *token = Some(response.access_token.clone());
        Ok(response.access_token)
    }

    /// Search albums, returning up to five candidates.
    pub async fn search_albums(&self, query: &SearchQuery) -> EnrichResult<Vec<MatchCandidate>> {
        let token = self.access_token().await?;
        let q = spotify_query(query);
        let request = self
            .http
            .get(format!("{}/search", self.api_url))
            .bearer_auth(token)
            .query(&[("type", "album"), ("limit", "5"), ("q", q.as_str())]);
        let response: SearchResponse = get_json(request, SOURCE).await?;

        Ok(response
            .albums
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .map(|album| {
                let artist = album
                    .artists
                    .first()
                    .map(|a| a.name.clone())
                    .unwrap_or_default();
                let candidate = MatchCandidate::new(artist, album.name, album.id);
                match album.release_date {
                    Some(date) if !date.is_empty() => candidate.with_release_date(date),
                    _ => candidate,
                }
            })
            .collect())
    }
}

#[async_trait]
impl AlbumSearch for SpotifyClient {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn is_available(&self) -> bool {
        self.credentials.is_some()
    }

    async fn search(&self, query: &SearchQuery) -> EnrichResult<Vec<MatchCandidate>> {
        self.search_albums(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> SearchQuery {
        SearchQuery {
            artist: "radiohead".to_string(),
            title: Some("kid a".to_string()),
            year: Some("2000".to_string()),
        }
    }

    #[test]
    fn test_spotify_query() {
        assert_eq!(spotify_query(&query()), "artist:radiohead album:kid a year:2000");
        let bare = SearchQuery {
            artist: "can".to_string(),
            title: None,
            year: None,
        };
        assert_eq!(spotify_query(&bare), "artist:can");
    }

    #[test]
    fn test_album_url() {
        assert_eq!(album_url("abc"), "https://open.spotify.com/album/abc");
    }

    #[tokio::test]
    async fn test_without_credentials() {
        let client = SpotifyClient::new("http://127.0.0.1:9", "http://127.0.0.1:9").unwrap();
        assert!(!client.is_available());
        let result = client.search_albums(&query()).await;
        assert!(matches!(result, Err(EnrichError::MissingCredentials { .. })));
    }

    #[tokio::test]
    async fn test_search_reuses_token() {
        let mut server = mockito::Server::new_async().await;
        let token = server
            .mock("POST", "/api/token")
            .match_header("authorization", "Basic aWQ6c2VjcmV0")
            .match_body("grant_type=client_credentials")
            .with_status(200)
            .with_body(r#"{"access_token": "tok", "token_type": "Bearer", "expires_in": 3600}"#)
            .expect(1)
            .create_async()
            .await;
        let search = server
            .mock("GET", mockito::Matcher::Regex(r"^/search".to_string()))
            .match_header("authorization", "Bearer tok")
            .match_query(mockito::Matcher::UrlEncoded("type".into(), "album".into()))
            .with_status(200)
            .with_body(
                r#"{"albums": {"items": [
                    {"id": "6GjwtEZcfenmOf6l18N7T7", "name": "Kid A", "release_date": "2000-10-02",
                     "artists": [{"name": "Radiohead"}]}
                ]}}"#,
            )
            .expect(2)
            .create_async()
            .await;

        let client = SpotifyClient::new(&server.url(), &server.url())
            .unwrap()
            .with_credentials("id", "secret");
        assert!(client.is_available());

        for _ in 0..2 {
            let candidates = client.search_albums(&query()).await.unwrap();
            assert_eq!(candidates.len(), 1);
            assert_eq!(candidates[0].external_id, "6GjwtEZcfenmOf6l18N7T7");
            assert_eq!(candidates[0].artist, "Radiohead");
        }

        token.assert_async().await;
        search.assert_async().await;
    }
}
