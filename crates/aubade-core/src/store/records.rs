//! Per-date album records (`album-of-the-day/<date>.json`).

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::model::{AlbumRecord, SelectionResult};

#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", date.format("%Y-%m-%d")))
    }

    /// Write the selection fields of the record for `selection.date`.
    ///
    /// An existing record keeps its enrichment fields, so re-running the
    /// pick for an already enriched date does not discard metadata.
    pub fn write_selection(&self, selection: &SelectionResult) -> Result<PathBuf> {
        let path = self.path_for(selection.date);
        let record = if path.exists() {
            let mut existing = read_record(&path)?;
            existing.apply_selection(selection);
            existing
        } else {
            AlbumRecord::from_selection(selection)
        };
        write_record(&path, &record)?;
        Ok(path)
    }

    pub fn read(&self, date: NaiveDate) -> Result<Option<AlbumRecord>> {
        let path = self.path_for(date);
        if !path.exists() {
            return Ok(None);
        }
        read_record(&path).map(Some)
    }

    /// Every record dated on or before `today` (all of them when
    /// `include_future`), sorted by date.
    pub fn list(&self, today: NaiveDate, include_future: bool) -> Result<Vec<(NaiveDate, AlbumRecord)>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(date) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            else {
                log::debug!("Skipping {}: not a dated record", path.display());
                continue;
            };
            if include_future || date <= today {
                records.push((date, read_record(&path)?));
            }
        }
        records.sort_by_key(|(date, _)| *date);
        Ok(records)
    }
}

/// Read a record file.
pub fn read_record(path: &Path) -> Result<AlbumRecord> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::InvalidData(format!("cannot read record {}: {e}", path.display()))
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Write a record file as pretty-printed JSON, creating parent directories.
pub fn write_record(path: &Path, record: &AlbumRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn selection(d: &str, artist: &str) -> SelectionResult {
        SelectionResult {
            date: date(d),
            row_id: 2,
            artist: artist.to_string(),
            title: "T".to_string(),
            year: "2000".to_string(),
            curated_lists: vec![],
        }
    }

    #[test]
    fn test_write_selection_creates_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path().join("album-of-the-day"));
        let path = store.write_selection(&selection("2025-06-12", "A")).unwrap();

        assert_eq!(path, temp_dir.path().join("album-of-the-day/2025-06-12.json"));
        let record = store.read(date("2025-06-12")).unwrap().unwrap();
        assert_eq!(record.artist, "A");
        assert!(store.read(date("2025-06-13")).unwrap().is_none());
    }

    #[test]
    fn test_write_selection_preserves_enrichment() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path());
        let path = store.write_selection(&selection("2025-06-12", "A")).unwrap();

        let mut record = read_record(&path).unwrap();
        record.genres = Some(vec!["krautrock".to_string()]);
        write_record(&path, &record).unwrap();

        store.write_selection(&selection("2025-06-12", "A")).unwrap();
        let record = read_record(&path).unwrap();
        assert_eq!(record.genres, Some(vec!["krautrock".to_string()]));
    }

    #[test]
    fn test_list_filters_future_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path());
        for (d, artist) in [("2025-06-13", "B"), ("2025-06-11", "A"), ("2025-06-20", "C")] {
            store.write_selection(&selection(d, artist)).unwrap();
        }
        std::fs::write(temp_dir.path().join("README.json"), "{}").unwrap();

        let published = store.list(date("2025-06-13"), false).unwrap();
        let artists: Vec<_> = published.iter().map(|(_, r)| r.artist.as_str()).collect();
        assert_eq!(artists, vec!["A", "B"]);

        assert_eq!(store.list(date("2025-06-13"), true).unwrap().len(), 3);
    }
}
