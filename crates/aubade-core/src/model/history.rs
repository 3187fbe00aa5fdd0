use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::CatalogEntry;

/// One past selection, as stored in the history ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub row_id: u32,
    pub artist: String,
    pub title: String,
    pub year: String,
}

impl HistoryEntry {
    #[must_use]
    pub fn from_catalog(date: NaiveDate, entry: &CatalogEntry) -> Self {
        Self {
            date,
            row_id: entry.row_id,
            artist: entry.artist.clone(),
            title: entry.title.clone(),
            year: entry.year.clone(),
        }
    }
}

/// The append-only selection ledger.
///
/// Entries are kept in insertion order, which is the selection order.
/// There is at most one entry per date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<HistoryEntry>,
}

impl Ledger {
    /// Build a ledger from entries read from storage.
    ///
    /// Hand-edited ledgers may repeat a date; those rows are kept (they
    /// still mark their catalog rows as used) but lookups by date return
    /// the first one.
    #[must_use]
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.date) {
                log::warn!("History has more than one entry for {}", entry.date);
            }
        }
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
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
    pub fn find_by_date(&self, date: NaiveDate) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.date == date)
    }

    /// The most recently appended entry (ledger order, not date order).
    #[must_use]
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn used_rows(&self) -> HashSet<u32> {
        self.entries.iter().map(|e| e.row_id).collect()
    }

    /// Append a new entry.
    ///
    /// # Errors
    /// Returns [`Error::InvalidData`] if the date already has an entry.
    pub fn push(&mut self, entry: HistoryEntry) -> Result<()> {
        if self.find_by_date(entry.date).is_some() {
            return Err(Error::InvalidData(format!(
                "history already has an entry for {}",
                entry.date
            )));
        }
        self.entries.push(entry);
        Ok(())
    }
}
