//! CSV persistence for the history ledger.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::model::{HistoryEntry, Ledger};
use crate::store::catalog::csv_reader;

const HEADER: &str = "date,row,artist,title,year";

/// Reads, writes and rotates the ledger file.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger. A missing file is an empty ledger.
    pub fn load(&self) -> Result<Ledger> {
        if !self.path.exists() {
            return Ok(Ledger::default());
        }
        let mut reader = csv_reader().from_path(&self.path)?;
        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record?;
            let field = |i: usize| record.get(i).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(field(0), "%Y-%m-%d").map_err(|e| {
                Error::InvalidData(format!("bad date {:?} in {}: {e}", field(0), self.path.display()))
            })?;
            let row_id = field(1).parse::<u32>().map_err(|e| {
                Error::InvalidData(format!("bad row {:?} in {}: {e}", field(1), self.path.display()))
            })?;
            entries.push(HistoryEntry {
                date,
                row_id,
                artist: record.get(2).unwrap_or_default().to_string(),
                title: record.get(3).unwrap_or_default().to_string(),
                year: record.get(4).unwrap_or_default().to_string(),
            });
        }
        Ok(Ledger::from_entries(entries))
    }

    /// Write the whole ledger, replacing the file.
    pub fn save(&self, ledger: &Ledger) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = BufWriter::new(File::create(&self.path)?);
        writeln!(file, "{HEADER}")?;

        // Artist and title are always quoted, even when they look numeric.
        for entry in ledger.entries() {
            writeln!(
                file,
                "{},{},{},{},{}",
                entry.date.format("%Y-%m-%d"),
                entry.row_id,
                quoted(&entry.artist),
                quoted(&entry.title),
                bare(&entry.year),
            )?;
        }
        file.flush()?;
        Ok(())
    }

    /// Archive the current ledger as `history.<N>.csv` (smallest unused
    /// positive `N`) and leave a header-only ledger in its place.
    ///
    /// Returns the archive path.
    pub fn rotate(&self) -> Result<PathBuf> {
        let archive = self.next_archive_path();
        if self.path.exists() {
            std::fs::rename(&self.path, &archive)?;
        } else {
            Self::new(archive.clone()).save(&Ledger::default())?;
        }
        self.save(&Ledger::default())?;
        log::info!(
            "Rotated history {} to {}",
            self.path.display(),
            archive.display()
        );
        Ok(archive)
    }

    /// Existing archives, ordered by suffix.
    pub fn archives(&self) -> Result<Vec<PathBuf>> {
        let (dir, stem) = self.dir_and_stem();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut numbered = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let suffix = name
                .strip_prefix(&format!("{stem}."))
                .and_then(|rest| rest.strip_suffix(".csv"))
                .and_then(|n| n.parse::<u32>().ok());
            if let Some(n) = suffix {
                numbered.push((n, path));
            }
        }
        numbered.sort_by_key(|(n, _)| *n);
        Ok(numbered.into_iter().map(|(_, p)| p).collect())
    }

    fn next_archive_path(&self) -> PathBuf {
        let (dir, stem) = self.dir_and_stem();
        (1u32..)
            .map(|n| dir.join(format!("{stem}.{n}.csv")))
            .find(|p| !p.exists())
            .unwrap_or_else(|| dir.join(format!("{stem}.archive.csv")))
    }

    fn dir_and_stem(&self) -> (PathBuf, String) {
        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("history")
            .to_string();
        (dir, stem)
    }
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn bare(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        quoted(field)
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CatalogEntry;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ledger_with(entries: &[(&str, u32, &str)]) -> Ledger {
        let mut ledger = Ledger::default();
        for (d, row, artist) in entries {
            ledger
                .push(HistoryEntry::from_catalog(
                    date(d),
                    &CatalogEntry::new(*row, *artist, "Title, Part 1", "2000"),
                ))
                .unwrap();
        }
        ledger
    }

    #[test]
    fn test_load_missing_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path().join("history.csv"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_format() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path().join("history.csv"));
        store.save(&ledger_with(&[("2025-06-12", 2, "Say \"Hi\"")])).unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            text,
            "date,row,artist,title,year\n2025-06-12,2,\"Say \"\"Hi\"\"\",\"Title, Part 1\",2000\n"
        );
    }

    #[test]
    fn test_save_quotes_numeric_text_fields() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path().join("history.csv"));
        let mut ledger = Ledger::default();
        ledger
            .push(HistoryEntry::from_catalog(
                date("2025-06-12"),
                &CatalogEntry::new(7, "311", "1989", "1996"),
            ))
            .unwrap();
        store.save(&ledger).unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(text.lines().nth(1), Some("2025-06-12,7,\"311\",\"1989\",1996"));
        assert_eq!(store.load().unwrap().entries()[0].title, "1989");
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path().join("history.csv"));
        let ledger = ledger_with(&[("2025-06-12", 2, "A"), ("2025-06-13", 5, "B")]);
        store.save(&ledger).unwrap();
        assert_eq!(store.load().unwrap(), ledger);
    }

    #[test]
    fn test_load_unquoted_legacy_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history.csv");
        std::fs::write(
            &path,
            "date,row,artist,title,year\n2025-06-10,2,\"A\",\"A\",2000\n2025-06-11,3,\"B\",\"B\",2001\n",
        )
        .unwrap();
        let ledger = LedgerStore::new(path).load().unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.entries()[1].row_id, 3);
        assert_eq!(ledger.entries()[1].date, date("2025-06-11"));
    }

    #[test]
    fn test_load_rejects_bad_date() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history.csv");
        std::fs::write(&path, "date,row,artist,title,year\nyesterday,2,\"A\",\"A\",2000\n").unwrap();
        assert!(matches!(LedgerStore::new(path).load(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_rotate_uses_lowest_free_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path().join("history.csv"));
        let ledger = ledger_with(&[("2025-06-12", 2, "A")]);

        std::fs::write(temp_dir.path().join("history.2.csv"), "date,row,artist,title,year\n").unwrap();
        store.save(&ledger).unwrap();

        let archive = store.rotate().unwrap();
        assert_eq!(archive, temp_dir.path().join("history.1.csv"));
        assert_eq!(LedgerStore::new(&archive).load().unwrap(), ledger);
        assert!(store.load().unwrap().is_empty());
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            "date,row,artist,title,year\n"
        );

        store.save(&ledger).unwrap();
        let archive = store.rotate().unwrap();
        assert_eq!(archive, temp_dir.path().join("history.3.csv"));
        assert_eq!(store.archives().unwrap().len(), 3);
    }
}
