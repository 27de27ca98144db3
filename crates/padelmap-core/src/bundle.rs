//! Bundled static listings used when the database is unavailable.
//!
//! The two JSON files under `data/` are compiled into the binary and share
//! the shape of the remote tables. A directory containing `clubs.json` and/or
//! `communities.json` can replace either file at runtime.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::models::{Club, Community};

const CLUBS_FILE: &str = "clubs.json";
const COMMUNITIES_FILE: &str = "communities.json";

const EMBEDDED_CLUBS: &str = include_str!("../data/clubs.json");
const EMBEDDED_COMMUNITIES: &str = include_str!("../data/communities.json");

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    pub clubs: Vec<Club>,
    pub communities: Vec<Community>,
}

impl Bundle {
    /// The listings compiled into the binary.
    pub fn embedded() -> Result<Self> {
        let clubs = parse(CLUBS_FILE, EMBEDDED_CLUBS)?;
        let communities = parse(COMMUNITIES_FILE, EMBEDDED_COMMUNITIES)?;
        Self::validated(clubs, communities)
    }

    /// Load listings from `dir`, using the embedded copy for any missing file.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let clubs = match read_file(dir, CLUBS_FILE)? {
            Some(contents) => parse(CLUBS_FILE, &contents)?,
            None => parse(CLUBS_FILE, EMBEDDED_CLUBS)?,
        };
        let communities = match read_file(dir, COMMUNITIES_FILE)? {
            Some(contents) => parse(COMMUNITIES_FILE, &contents)?,
            None => parse(COMMUNITIES_FILE, EMBEDDED_COMMUNITIES)?,
        };
        Self::validated(clubs, communities)
    }

    pub fn load(data_dir: Option<&Path>) -> Result<Self> {
        match data_dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::embedded(),
        }
    }

    /// Write both collections to `dir` in the bundled file layout.
    pub fn write_to_dir(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        write_file(dir, CLUBS_FILE, &self.clubs)?;
        write_file(dir, COMMUNITIES_FILE, &self.communities)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.clubs.is_empty() && self.communities.is_empty()
    }

    fn validated(clubs: Vec<Club>, communities: Vec<Community>) -> Result<Self> {
        ensure_unique(CLUBS_FILE, clubs.iter().map(|c| c.id.as_str()))?;
        ensure_unique(COMMUNITIES_FILE, communities.iter().map(|c| c.id.as_str()))?;
        debug!(clubs = clubs.len(), communities = communities.len(), "Bundle loaded");
        Ok(Self { clubs, communities })
    }
}

fn read_file(dir: &Path, name: &str) -> Result<Option<String>> {
    let path = dir.join(name);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;
    Ok(Some(contents))
}

fn parse<T: DeserializeOwned>(name: &str, contents: &str) -> Result<Vec<T>> {
    serde_json::from_str(contents).with_context(|| format!("Failed to parse data file: {}", name))
}

fn write_file<T: Serialize>(dir: &Path, name: &str, rows: &[T]) -> Result<()> {
    let path = dir.join(name);
    let contents = serde_json::to_string_pretty(rows)?;
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write data file: {}", path.display()))?;
    Ok(())
}

fn ensure_unique<'a>(name: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            bail!("Duplicate id '{}' in {}", id, name);
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_bundle_parses() {
        let bundle = Bundle::embedded().unwrap();
        assert!(!bundle.clubs.is_empty());
        assert!(!bundle.communities.is_empty());
    }

    #[test]
    fn test_embedded_communities_are_largest_first() {
        let bundle = Bundle::embedded().unwrap();
        let members: Vec<u32> = bundle.communities.iter().map(|c| c.members).collect();
        let mut sorted = members.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(members, sorted);
    }

    #[test]
    fn test_from_dir_overrides_one_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(COMMUNITIES_FILE), "[]").unwrap();

        let bundle = Bundle::from_dir(dir.path()).unwrap();
        let embedded = Bundle::embedded().unwrap();
        assert!(bundle.communities.is_empty());
        assert_eq!(bundle.clubs, embedded.clubs);
    }

    #[test]
    fn test_from_dir_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let row = r#"{"id": "dup", "name": "A", "platform": "App"}"#;
        std::fs::write(dir.path().join(COMMUNITIES_FILE), format!("[{row}, {row}]")).unwrap();

        let err = Bundle::from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Duplicate id 'dup'"));
    }

    #[test]
    fn test_from_dir_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CLUBS_FILE), "{ not json").unwrap();

        let err = Bundle::from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse data file: clubs.json"));
    }

    #[test]
    fn test_write_then_load_preserves_listings() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = Bundle::embedded().unwrap();
        bundle.write_to_dir(&dir.path().join("export")).unwrap();

        let reloaded = Bundle::from_dir(&dir.path().join("export")).unwrap();
        assert_eq!(reloaded, bundle);
    }
}
