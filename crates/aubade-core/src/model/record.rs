use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// The output of one selection cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResult {
    pub date: NaiveDate,
    pub row_id: u32,
    pub artist: String,
    pub title: String,
    pub year: String,
    pub curated_lists: Vec<String>,
}

/// The per-date album record consumed by the site and the share tooling.
///
/// Selection writes the first four fields. Enrichment later fills in the
/// optional ones; a field that could not be looked up stays `None` so the
/// site can still render with partial data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumRecord {
    pub artist: String,
    pub title: String,
    #[serde(deserialize_with = "deserialize_year")]
    pub year: String,
    #[serde(default)]
    pub curated_lists: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_art: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ids: Option<ExternalIds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_links: Option<ExternalLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming_links: Option<StreamingLinks>,
}

/// Canonical identifiers of the album in external catalogs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIds {
    /// `MusicBrainz` release-group ID.
    pub musicbrainz: Option<String>,
    /// Spotify album ID.
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLinks {
    pub wikidata: Option<String>,
    pub wikipedia: Option<String>,
    pub discogs: Option<String>,
    pub rateyourmusic: Option<String>,
}

/// Per-platform listening links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingLinks {
    pub spotify: String,
    pub apple_music: String,
    pub youtube: String,
    pub youtube_music: String,
    pub amazon_music: String,
    pub tidal: String,
    pub deezer: String,
}

impl AlbumRecord {
    #[must_use]
    pub fn from_selection(selection: &SelectionResult) -> Self {
        let mut record = Self::default();
        record.apply_selection(selection);
        record
    }

    /// Overwrite the selection fields, leaving enrichment data untouched.
    pub fn apply_selection(&mut self, selection: &SelectionResult) {
        self.artist.clone_from(&selection.artist);
        self.title.clone_from(&selection.title);
        self.year.clone_from(&selection.year);
        self.curated_lists.clone_from(&selection.curated_lists);
    }

    /// Whether enrichment has run on this record.
    #[must_use]
    pub fn is_enriched(&self) -> bool {
        self.external_ids.is_some() || self.streaming_links.is_some()
    }
}

/// Hand-edited records sometimes carry the year as a JSON number.
fn deserialize_year<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Year {
        Text(String),
        Number(i64),
    }

    Ok(match Year::deserialize(deserializer)? {
        Year::Text(s) => s,
        Year::Number(n) => n.to_string(),
    })
}
