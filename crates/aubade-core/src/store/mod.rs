//! File-backed storage under the data directory.
//!
//! ```text
//! data/
//!   albums.csv            catalog (artist,title,year)
//!   history.csv           active ledger (date,row,artist,title,year)
//!   history.<N>.csv       archived ledgers
//!   curated-lists/*.csv   curated lists (artist,title,year)
//!   album-of-the-day/     one <date>.json record per selected date
//! ```

pub mod catalog;
pub mod curated;
pub mod ledger;
pub mod records;

use std::path::{Path, PathBuf};

pub use catalog::Catalog;
pub use curated::CuratedLists;
pub use ledger::LedgerStore;
pub use records::RecordStore;

/// Paths of the files that make up a data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.root.join("albums.csv")
    }

    #[must_use]
    pub fn history_path(&self) -> PathBuf {
        self.root.join("history.csv")
    }

    #[must_use]
    pub fn curated_lists_dir(&self) -> PathBuf {
        self.root.join("curated-lists")
    }

    #[must_use]
    pub fn records_dir(&self) -> PathBuf {
        self.root.join("album-of-the-day")
    }

    #[must_use]
    pub fn ledger_store(&self) -> LedgerStore {
        LedgerStore::new(self.history_path())
    }

    #[must_use]
    pub fn record_store(&self) -> RecordStore {
        RecordStore::new(self.records_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_layout() {
        let dir = DataDir::new("/srv/data");
        assert_eq!(dir.catalog_path(), PathBuf::from("/srv/data/albums.csv"));
        assert_eq!(dir.history_path(), PathBuf::from("/srv/data/history.csv"));
        assert_eq!(dir.curated_lists_dir(), PathBuf::from("/srv/data/curated-lists"));
        assert_eq!(dir.records_dir(), PathBuf::from("/srv/data/album-of-the-day"));
    }
}
