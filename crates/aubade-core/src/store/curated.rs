//! Curated-list membership lookup.
//!
//! Each `<slug>.csv` file in the curated-lists directory holds
//! `artist,title,year` rows. An album belongs to a list when a row matches
//! its triple exactly.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::store::Catalog;

#[derive(Debug, Clone)]
struct CuratedList {
    slug: String,
    albums: Catalog,
}

/// The curated lists found in one directory, ordered by slug.
#[derive(Debug, Clone, Default)]
pub struct CuratedLists {
    lists: Vec<CuratedList>,
}

impl CuratedLists {
    /// Read every `*.csv` file in `dir`. A missing directory means no lists.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Ok(Self::default());
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        paths.sort();

        let mut lists = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            lists.push(CuratedList {
                slug: slug.to_string(),
                albums: Catalog::load(&path)?,
            });
        }

        log::debug!("Loaded {} curated lists from {}", lists.len(), dir.display());
        Ok(Self { lists })
    }

    /// Build from in-memory `(slug, csv text)` pairs.
    pub fn from_sources<'a>(sources: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut lists = sources
            .into_iter()
            .map(|(slug, text)| {
                Ok(CuratedList {
                    slug: slug.to_string(),
                    albums: Catalog::parse(text)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        lists.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(Self { lists })
    }

    /// Slugs of every list containing the exact (artist, title, year) triple.
    #[must_use]
    pub fn memberships(&self, artist: &str, title: &str, year: &str) -> Vec<String> {
        self.lists
            .iter()
            .filter(|list| {
                list.albums
                    .entries()
                    .iter()
                    .any(|e| e.is_album(artist, title, year))
            })
            .map(|list| list.slug.clone())
            .collect()
    }

    #[must_use]
    pub fn slugs(&self) -> Vec<&str> {
        self.lists.iter().map(|l| l.slug.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memberships_exact_triple() {
        let lists = CuratedLists::from_sources([
            ("list2", "artist,title,year\n\"B\",\"B\",2001\n\"A\",\"A\",2000\n"),
            ("list1", "artist,title,year\n\"A\",\"A\",2000\n"),
            ("list3", "artist,title,year\n\"A\",\"A\",1999\n"),
        ])
        .unwrap();

        assert_eq!(lists.memberships("A", "A", "2000"), vec!["list1", "list2"]);
        assert_eq!(lists.memberships("B", "B", "2001"), vec!["list2"]);
        assert!(lists.memberships("a", "A", "2000").is_empty());
    }

    #[test]
    fn test_load_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("curated-lists");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("wire-100.csv"), "artist,title,year\n\"Can\",\"Tago Mago\",1971\n").unwrap();
        std::fs::write(dir.join("notes.txt"), "not a list").unwrap();

        let lists = CuratedLists::load(&dir).unwrap();
        assert_eq!(lists.slugs(), vec!["wire-100"]);
        assert_eq!(lists.memberships("Can", "Tago Mago", "1971"), vec!["wire-100"]);
    }

    #[test]
    fn test_load_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let lists = CuratedLists::load(&temp_dir.path().join("nope")).unwrap();
        assert!(lists.slugs().is_empty());
    }
}
