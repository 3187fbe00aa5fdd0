use serde::{Deserialize, Serialize};

/// A row of the album catalog.
///
/// `row_id` is the 1-based line number of the row in the catalog file
/// (the header occupies line 1, so the first album is row 2). It is
/// positional and must stay stable while the history ledger refers to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub row_id: u32,
    pub artist: String,
    pub title: String,
    pub year: String,
}

impl CatalogEntry {
    #[must_use]
    pub fn new(
        row_id: u32,
        artist: impl Into<String>,
        title: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            row_id,
            artist: artist.into(),
            title: title.into(),
            year: year.into(),
        }
    }

    /// Exact (artist, title, year) triple equality.
    #[must_use]
    pub fn is_album(&self, artist: &str, title: &str, year: &str) -> bool {
        self.artist == artist && self.title == title && self.year == year
    }
}
