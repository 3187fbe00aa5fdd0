//! Streaming-platform links from Odesli (song.link).
//!
//! Odesli maps one platform URL to the same album on other platforms.
//! Platforms it cannot resolve keep a search-page fallback.

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;

use aubade_core::model::StreamingLinks;

use crate::enrich::http::{base_url, client, get_json};
use crate::error::EnrichResult;

const SOURCE: &str = "Odesli";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinksResponse {
    #[serde(default)]
    links_by_platform: HashMap<String, PlatformLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformLink {
    pub url: String,
}

/// Search-page links for every platform, keyed on "artist title".
pub fn search_links(artist: &str, title: &str) -> StreamingLinks {
    let q = urlencoding::encode(&format!("{artist} {title}")).into_owned();
    StreamingLinks {
        spotify: format!("https://open.spotify.com/search/{q}/albums"),
        apple_music: format!("https://music.apple.com/us/search?term={q}"),
        youtube: format!("https://www.youtube.com/results?search_query={q}"),
        youtube_music: format!("https://music.youtube.com/search?q={q}"),
        amazon_music: format!("https://music.amazon.com/search/{q}/albums"),
        tidal: format!("https://tidal.com/search/albums?q={q}"),
        deezer: format!("https://www.deezer.com/search/{q}/album"),
    }
}

/// Replace fallbacks with the platform links Odesli resolved.
pub fn apply_platform_links(links: &mut StreamingLinks, platforms: &HashMap<String, PlatformLink>) {
    let slots: [(&str, &mut String); 7] = [
        ("spotify", &mut links.spotify),
        ("appleMusic", &mut links.apple_music),
        ("youtube", &mut links.youtube),
        ("youtubeMusic", &mut links.youtube_music),
        ("amazonMusic", &mut links.amazon_music),
        ("tidal", &mut links.tidal),
        ("deezer", &mut links.deezer),
    ];
    for (platform, slot) in slots {
        if let Some(link) = platforms.get(platform).filter(|l| !l.url.is_empty()) {
            slot.clone_from(&link.url);
        }
    }
}

#[derive(Debug, Clone)]
pub struct OdesliClient {
    http: Client,
    base_url: String,
}

impl OdesliClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base: &str) -> EnrichResult<Self> {
        Ok(Self {
            http: client()?,
            base_url: base_url(base),
        })
    }

    /// Platform links for the album at `url`, keyed by Odesli platform name.
    pub async fn links(&self, url: &str) -> EnrichResult<HashMap<String, PlatformLink>> {
        let request = self
            .http
            .get(format!("{}/links", self.base_url))
            .query(&[("url", url)]);
        let response: LinksResponse = get_json(request, SOURCE).await?;
        Ok(response.links_by_platform)
    }
}
