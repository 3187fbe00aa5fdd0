//! Wikipedia article links and REST summaries.

use reqwest::Client;
use serde::Deserialize;

use crate::enrich::http::{base_url, client, get_json};
use crate::error::{EnrichError, EnrichResult};

const SOURCE: &str = "Wikipedia";

#[derive(Debug, Deserialize)]
struct Summary {
    extract: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WikipediaClient {
    http: Client,
    base_url: String,
}

impl WikipediaClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base: &str) -> EnrichResult<Self> {
        Ok(Self {
            http: client()?,
            base_url: base_url(base),
        })
    }

    /// Article URL for a page title, spaces as underscores.
    pub fn article_url(&self, title: &str) -> String {
        format!("{}/wiki/{}", self.base_url, title.replace(' ', "_"))
    }

    /// Plain-text lead extract of an article, if it has one.
    pub async fn summary(&self, title: &str) -> EnrichResult<Option<String>> {
        let url = format!(
            "{}/api/rest_v1/page/summary/{}",
            self.base_url,
            urlencoding::encode(title)
        );
        match get_json::<Summary>(self.http.get(&url), SOURCE).await {
            Ok(summary) => Ok(summary.extract.filter(|s| !s.trim().is_empty())),
            Err(EnrichError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
