//! Wikidata entity lookup, used to reach the album's English Wikipedia
//! article from the Wikidata link MusicBrainz provides.

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;

use crate::enrich::http::{base_url, client, get_json};
use crate::error::{EnrichError, EnrichResult};

const SOURCE: &str = "Wikidata";

/// Wrapper for the Wikidata `Special:EntityData` JSON response.
#[derive(Debug, Deserialize)]
struct EntityDataWrapper {
    entities: HashMap<String, WikidataEntity>,
}

/// The parts of a Wikidata entity that enrichment reads.
#[derive(Debug, Clone, Deserialize)]
pub struct WikidataEntity {
    /// The QID of this entity (e.g. "Q12345").
    pub id: String,

    /// Links to articles on Wikimedia sites, keyed by site ID ("enwiki").
    #[serde(default)]
    pub sitelinks: HashMap<String, Sitelink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sitelink {
    pub title: String,
}

impl WikidataEntity {
    /// Title of the English Wikipedia article, if the entity has one.
    pub fn enwiki_title(&self) -> Option<&str> {
        self.sitelinks.get("enwiki").map(|s| s.title.as_str())
    }
}

/// Extract the QID from a Wikidata entity URL such as
/// `https://www.wikidata.org/wiki/Q213982`.
pub fn qid_from_url(url: &str) -> Option<&str> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| id.starts_with('Q') && id.len() > 1)
}

#[derive(Debug, Clone)]
pub struct WikidataClient {
    http: Client,
    base_url: String,
}

impl WikidataClient {
    /// Create a new Wikidata client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base: &str) -> EnrichResult<Self> {
        Ok(Self {
            http: client()?,
            base_url: base_url(base),
        })
    }

    /// Fetch entity data for a Wikidata QID.
    ///
    /// # Errors
    /// Returns an error on HTTP failure, parse failure, or when the entity
    /// is not found in the response.
    pub async fn get_entity(&self, qid: &str) -> EnrichResult<WikidataEntity> {
        let url = format!("{}/wiki/Special:EntityData/{}.json", self.base_url, qid);
        let wrapper: EntityDataWrapper = get_json(self.http.get(&url), SOURCE).await?;

        let mut entities = wrapper.entities;
        entities
            .remove(qid)
            .or_else(|| entities.into_values().next())
            .ok_or(EnrichError::NotFound {
                entity: qid.to_string(),
                source_name: SOURCE.to_string(),
            })
    }

    /// English Wikipedia title for the entity behind `wikidata_url`.
    ///
    /// `Ok(None)` when the URL has no QID or the entity has no article.
    pub async fn enwiki_title(&self, wikidata_url: &str) -> EnrichResult<Option<String>> {
        let Some(qid) = qid_from_url(wikidata_url) else {
            log::debug!("No QID in Wikidata URL {}", wikidata_url);
            return Ok(None);
        };

        let entity = self.get_entity(qid).await?;
        let title = entity.enwiki_title().map(String::from);
        if title.is_none() {
            log::debug!("Wikidata entity {} has no English Wikipedia article", qid);
        }
        Ok(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qid_from_url() {
        assert_eq!(qid_from_url("https://www.wikidata.org/wiki/Q213982"), Some("Q213982"));
        assert_eq!(qid_from_url("https://www.wikidata.org/wiki/Q213982/"), Some("Q213982"));
        assert_eq!(qid_from_url("https://www.wikidata.org/wiki/"), None);
        assert_eq!(qid_from_url(""), None);
    }

    #[tokio::test]
    async fn test_enwiki_title() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/wiki/Special:EntityData/Q213982.json")
            .with_status(200)
            .with_body(
                r#"{"entities": {"Q213982": {"id": "Q213982",
                    "sitelinks": {"enwiki": {"site": "enwiki", "title": "OK Computer"}}}}}"#,
            )
            .create_async()
            .await;

        let client = WikidataClient::new(&server.url()).unwrap();
        let title = client
            .enwiki_title("https://www.wikidata.org/wiki/Q213982")
            .await
            .unwrap();
        assert_eq!(title.as_deref(), Some("OK Computer"));
    }

    #[tokio::test]
    async fn test_entity_without_article() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/wiki/Special:EntityData/Q1.json")
            .with_status(200)
            .with_body(r#"{"entities": {"Q1": {"id": "Q1", "sitelinks": {}}}}"#)
            .create_async()
            .await;

        let client = WikidataClient::new(&server.url()).unwrap();
        assert_eq!(
            client.enwiki_title("https://www.wikidata.org/wiki/Q1").await.unwrap(),
            None
        );
    }
}
