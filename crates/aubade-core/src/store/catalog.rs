use std::path::Path;

use crate::error::{Error, Result};
use crate::model::CatalogEntry;

/// Line number of the first data row (the header is line 1).
const FIRST_ROW_ID: u32 = 2;

/// The fixed, ordered album catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    #[must_use]
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Load the catalog from `artist,title,year` CSV.
    ///
    /// A missing file is an empty catalog; the selector decides whether
    /// that is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Catalog {} does not exist", path.display());
            return Ok(Self::default());
        }
        let reader = csv_reader().from_path(path)?;
        Self::from_reader(reader)
    }

    /// Parse a catalog from CSV text (header row included).
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_reader(csv_reader().from_reader(text.as_bytes()))
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut entries = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let field = |i: usize| record.get(i).unwrap_or_default().to_string();
            let row_id = u32::try_from(idx)
                .ok()
                .and_then(|i| i.checked_add(FIRST_ROW_ID))
                .ok_or_else(|| Error::InvalidData(format!("catalog row {idx} out of range")))?;
            entries.push(CatalogEntry {
                row_id,
                artist: field(0),
                title: field(1),
                year: field(2),
            });
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, row_id: u32) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.row_id == row_id)
    }
}

pub(crate) fn csv_reader() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true).trim(csv::Trim::None);
    builder
}
