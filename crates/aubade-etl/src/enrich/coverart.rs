//! Cover Art Archive front-image lookup.

use reqwest::Client;
use serde::Deserialize;

use crate::enrich::http::{base_url, client, get_json};
use crate::error::{EnrichError, EnrichResult};

const SOURCE: &str = "Cover Art Archive";

#[derive(Debug, Deserialize)]
struct CoverArtResponse {
    #[serde(default)]
    images: Vec<CoverArtImage>,
}

#[derive(Debug, Deserialize)]
struct CoverArtImage {
    #[serde(default)]
    front: bool,
    image: String,
}

#[derive(Debug, Clone)]
pub struct CoverArtClient {
    http: Client,
    base_url: String,
}

impl CoverArtClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base: &str) -> EnrichResult<Self> {
        Ok(Self {
            http: client()?,
            base_url: base_url(base),
        })
    }

    /// The front cover of a release group, served over https.
    ///
    /// Falls back to the first image when none is marked as front.
    /// Returns `Ok(None)` when the archive has no art for the group.
    pub async fn front_cover(&self, release_group_mbid: &str) -> EnrichResult<Option<String>> {
        let url = format!("{}/release-group/{}", self.base_url, release_group_mbid);
        let response: CoverArtResponse = match get_json(self.http.get(&url), SOURCE).await {
            Ok(response) => response,
            Err(EnrichError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let front = response
            .images
            .iter()
            .find(|img| img.front)
            .or_else(|| response.images.first());

        Ok(front.map(|img| upgrade_to_https(&img.image)))
    }
}

fn upgrade_to_https(url: &str) -> String {
    match url.strip_prefix("http:") {
        Some(rest) => format!("https:{rest}"),
        None => url.to_string(),
    }
}
